use std::future::Future;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::time;

use crate::error::SourceError;
use crate::games::vrchat::StatusSink;
use crate::now_playing::NowPlaying;
use crate::source::{MetricSource, Reading};
use crate::status;
use crate::trend::{Trend, TrendTracker};

/// VRChat's chatbox ratelimit is about one message per 3 seconds.
pub(crate) const CHATBOX_INTERVAL: Duration = Duration::from_secs(3);

/// Shown in place of the heart rate when a cycle has no reading.
const FALLBACK_VALUE: &str = "0";

/// Everything one run of the fetch, compose, send loop needs.
pub(crate) struct Session {
    source: Box<dyn MetricSource>,
    sink: Option<Box<dyn StatusSink>>,
    now_playing: Option<Box<dyn NowPlaying>>,
    trend: Option<TrendTracker>,
    interval: Duration,
}

impl Session {
    /// A session with trend and now-playing both off.
    pub(crate) fn new(source: Box<dyn MetricSource>, sink: Option<Box<dyn StatusSink>>) -> Self {
        Self {
            source,
            sink,
            now_playing: None,
            trend: None,
            interval: CHATBOX_INTERVAL,
        }
    }

    pub(crate) fn with_trend(mut self, enabled: bool) -> Self {
        self.trend = enabled.then(TrendTracker::new);
        self
    }

    pub(crate) fn with_now_playing(mut self, provider: Option<Box<dyn NowPlaying>>) -> Self {
        self.now_playing = provider;
        self
    }

    #[cfg(test)]
    pub(crate) fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Runs cycles until `shutdown` resolves. Shutdown is only observed
    /// between cycles, never halfway through one.
    pub(crate) async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            self.cycle().await;
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Stopping chatbox updates");
                    return;
                }
                _ = time::sleep(self.interval) => {}
            }
        }
    }

    /// One fetch, trend, compose and send pass. Returns the message sent.
    pub(crate) async fn cycle(&mut self) -> String {
        let reading = self.fetch().await;

        let trend = match (self.trend.as_mut(), reading.as_ref()) {
            (Some(tracker), Some(reading)) => {
                tracker.observe(reading.value);
                tracker.trend()
            }
            _ => Trend::Flat,
        };

        let title = self.now_playing().await;
        let value = reading.as_ref().map_or(FALLBACK_VALUE, |r| r.raw.as_str());
        let message = status::compose(value, trend, title.as_deref());
        info!("Chatbox : {:?}", message);

        match self.sink.as_mut() {
            Some(sink) => sink.send(&message).await,
            None => debug!("No OSC socket, message dropped"),
        }
        message
    }

    async fn fetch(&mut self) -> Option<Reading> {
        match self.source.fetch().await {
            Ok(reading) => Some(reading),
            Err(SourceError::NotReady) => {
                info!("Heart rate not ready yet, waiting...");
                None
            }
            Err(err) => {
                error!("{err}");
                None
            }
        }
    }

    async fn now_playing(&mut self) -> Option<String> {
        let provider = self.now_playing.as_mut()?;
        match provider.now_playing().await {
            Ok(title) => {
                let title = title.trim();
                if title.is_empty() || status::is_no_media(title) {
                    None
                } else {
                    Some(title.to_string())
                }
            }
            Err(err) => {
                warn!("{err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use reqwest::StatusCode;
    use url::Url;

    use crate::error::AnnotationError;
    use crate::source::{HttpSource, SourceKind};

    /// Replays canned fetch results, then reports not-ready forever.
    struct ScriptedSource {
        script: VecDeque<Result<Reading, SourceError>>,
    }

    impl ScriptedSource {
        fn boxed(script: Vec<Result<Reading, SourceError>>) -> Box<dyn MetricSource> {
            Box::new(Self {
                script: script.into(),
            })
        }
    }

    #[async_trait]
    impl MetricSource for ScriptedSource {
        async fn fetch(&mut self) -> Result<Reading, SourceError> {
            self.script.pop_front().unwrap_or(Err(SourceError::NotReady))
        }

        fn describe(&self) -> String {
            String::from("scripted")
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSink {
        sent: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingSink {
        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait(?Send)]
    impl StatusSink for RecordingSink {
        async fn send(&mut self, text: &str) {
            self.sent.lock().unwrap().push(text.to_string());
        }
    }

    struct FixedTitle(Option<&'static str>);

    #[async_trait]
    impl NowPlaying for FixedTitle {
        async fn now_playing(&mut self) -> Result<String, AnnotationError> {
            self.0.map(String::from).ok_or(AnnotationError::Timeout)
        }
    }

    fn ok(body: &str) -> Result<Reading, SourceError> {
        Reading::parse(body)
    }

    fn session(script: Vec<Result<Reading, SourceError>>) -> (Session, RecordingSink) {
        let sink = RecordingSink::default();
        let session = Session::new(ScriptedSource::boxed(script), Some(Box::new(sink.clone())));
        (session, sink)
    }

    fn window(session: &Session) -> Vec<f64> {
        session.trend.as_ref().unwrap().samples().collect()
    }

    #[tokio::test]
    async fn rising_heart_rate_gets_rising_glyph() {
        let (session, sink) = session(vec![ok("60"), ok("65"), ok("70"), ok("75")]);
        let mut session = session.with_trend(true);

        for _ in 0..4 {
            session.cycle().await;
        }

        assert_eq!(
            sink.sent(),
            vec!["60 BPM", "65 BPM⤴️", "70 BPM⤴️", "75 BPM⤴️"]
        );
    }

    #[tokio::test]
    async fn trend_disabled_never_adds_a_glyph() {
        let (mut session, sink) = session(vec![ok("60"), ok("65"), ok("70")]);

        for _ in 0..3 {
            session.cycle().await;
        }

        assert_eq!(sink.sent(), vec!["60 BPM", "65 BPM", "70 BPM"]);
        assert!(session.trend.is_none());
    }

    #[tokio::test]
    async fn failed_fetches_show_zero_and_skip_the_window() {
        let (session, sink) = session(vec![
            ok("60"),
            Err(SourceError::NotReady),
            ok("70"),
            Err(SourceError::Status(StatusCode::BAD_GATEWAY)),
            Err(SourceError::InvalidSourceConfig(String::from("NOPE"))),
        ]);
        let mut session = session.with_trend(true);

        for _ in 0..5 {
            session.cycle().await;
        }

        assert_eq!(window(&session), vec![60.0, 70.0]);
        assert_eq!(
            sink.sent(),
            vec!["60 BPM", "0 BPM", "70 BPM⤴️", "0 BPM", "0 BPM"]
        );
    }

    #[tokio::test]
    async fn unreachable_source_is_not_a_zero_reading() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let url = Url::parse(&format!("http://{addr}/hr")).unwrap();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .no_proxy()
            .build()
            .unwrap();
        let source = HttpSource::with_client(SourceKind::Url(url), String::from("key"), client);

        let sink = RecordingSink::default();
        let mut session =
            Session::new(Box::new(source), Some(Box::new(sink.clone()))).with_trend(true);

        assert_eq!(session.cycle().await, "0 BPM");
        assert!(window(&session).is_empty());
    }

    #[tokio::test]
    async fn window_never_exceeds_four() {
        let script = ["70", "71", "72", "73", "74", "75"].map(ok).into();
        let (session, _) = session(script);
        let mut session = session.with_trend(true);

        for _ in 0..6 {
            session.cycle().await;
        }

        assert_eq!(window(&session), vec![72.0, 73.0, 74.0, 75.0]);
    }

    #[tokio::test]
    async fn now_playing_title_is_trimmed_and_appended() {
        let (session, _) = session(vec![ok("88")]);
        let mut session =
            session.with_now_playing(Some(Box::new(FixedTitle(Some("  Artist - Song\r  ")))));

        assert_eq!(session.cycle().await, "88 BPM\u{000B}♫ Artist - Song ♫");
    }

    #[tokio::test]
    async fn no_media_and_lookup_failures_drop_the_annotation() {
        for title in [Some("Spotify"), Some("Spotify Free\r"), Some("   "), None] {
            let (session, _) = session(vec![ok("88")]);
            let mut session = session.with_now_playing(Some(Box::new(FixedTitle(title))));
            assert_eq!(session.cycle().await, "88 BPM", "title {title:?}");
        }
    }

    #[tokio::test]
    async fn missing_sink_still_composes() {
        let mut session = Session::new(ScriptedSource::boxed(vec![ok("64")]), None);
        assert_eq!(session.cycle().await, "64 BPM");
    }

    #[tokio::test]
    async fn run_stops_on_shutdown() {
        let (session, sink) = session(vec![ok("60"), ok("61"), ok("62"), ok("63")]);
        let mut session = session.with_interval(Duration::from_millis(10));

        let watched = sink.clone();
        let shutdown = async move {
            while watched.sent().len() < 3 {
                time::sleep(Duration::from_millis(1)).await;
            }
        };
        time::timeout(Duration::from_secs(5), session.run(shutdown))
            .await
            .expect("run did not stop");

        let sent = sink.sent();
        assert!(sent.len() >= 3, "{sent:?}");
        assert_eq!(&sent[..3], ["60 BPM", "61 BPM", "62 BPM"]);
    }
}
