use crate::trend::Trend;

/// Line break understood by the VRChat chatbox.
pub(crate) const CHATBOX_LINE_SEPARATOR: char = '\u{000B}';

/// Titles Spotify reports when nothing is playing.
pub(crate) const NO_MEDIA_TITLES: [&str; 2] = ["Spotify", "Spotify Free"];

pub(crate) fn is_no_media(title: &str) -> bool {
    NO_MEDIA_TITLES.contains(&title)
}

/// Builds the chatbox text, e.g. `"75 BPM⤴️\v♫ Artist - Song ♫"`.
pub(crate) fn compose(value: &str, trend: Trend, now_playing: Option<&str>) -> String {
    let mut message = format!("{value} BPM");

    if let Some(glyph) = trend.glyph() {
        message.push_str(glyph);
    }

    if let Some(title) = now_playing.filter(|title| !is_no_media(title)) {
        message.push(CHATBOX_LINE_SEPARATOR);
        message.push_str("♫ ");
        message.push_str(title);
        message.push_str(" ♫");
    }

    message
}
