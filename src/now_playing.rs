use std::time::Duration;

use async_trait::async_trait;
use log::trace;
use tokio::process::Command;
use tokio::time;

use crate::error::AnnotationError;
use crate::status::NO_MEDIA_TITLES;

pub(crate) const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Whether the Spotify lookup can run on this platform at all.
pub(crate) const SUPPORTED: bool = cfg!(windows);

// Spotify puts "Artist - Song" in its main window title while playing.
// chcp 65001 keeps non-ASCII titles from coming back as replacement chars.
const SPOTIFY_QUERY: &str = "Get-Process | Where-Object { $_.ProcessName -eq 'Spotify' -and $_.MainWindowTitle -ne '' } | Select-Object MainWindowTitle | Format-Table -AutoSize";

/// Something that can name the media currently playing.
#[async_trait]
pub(crate) trait NowPlaying: Send {
    /// Returns the current title, or one of the no-media placeholders.
    async fn now_playing(&mut self) -> Result<String, AnnotationError>;
}

pub(crate) struct SpotifyWindowTitle {
    timeout: Duration,
}

impl SpotifyWindowTitle {
    pub(crate) fn new() -> Self {
        Self {
            timeout: LOOKUP_TIMEOUT,
        }
    }
}

#[async_trait]
impl NowPlaying for SpotifyWindowTitle {
    async fn now_playing(&mut self) -> Result<String, AnnotationError> {
        let mut command = Command::new("powershell.exe");
        command
            .args(["-c", "chcp", "65001", ">", "$null", ";", SPOTIFY_QUERY])
            .kill_on_drop(true);

        let output = time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| AnnotationError::Timeout)?
            .map_err(AnnotationError::Spawn)?;
        if !output.status.success() {
            return Err(AnnotationError::Exited(output.status));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        trace!("Spotify lookup output: {:?}", stdout);
        Ok(parse_window_title(&stdout))
    }
}

/// Picks the title row out of the `Format-Table` output:
/// a blank line, the `MainWindowTitle` header, a dashed rule, then the title.
pub(crate) fn parse_window_title(output: &str) -> String {
    output
        .split('\n')
        .nth(3)
        .unwrap_or(NO_MEDIA_TITLES[0])
        .to_string()
}
