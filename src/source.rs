use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reqwest::{Client, StatusCode};
use url::Url;

use crate::config::Config;
use crate::error::SourceError;

const PULSOID_SOURCE: &str = "PULSOID";
// text_plain_only_heart_rate returns the bare number instead of JSON
const PULSOID_ENDPOINT: &str =
    "https://dev.pulsoid.net/api/v1/data/heart_rate/latest?response_mode=text_plain_only_heart_rate";

pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// One successful heart rate fetch.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Reading {
    /// Text shown in the chatbox, as the provider sent it.
    pub(crate) raw: String,
    pub(crate) value: f64,
}

impl Reading {
    pub(crate) fn parse(body: &str) -> Result<Self, SourceError> {
        let raw = body.trim();
        let value: f64 = raw.parse().map_err(|source| SourceError::Parse {
            body: raw.to_string(),
            source,
        })?;
        if !value.is_finite() {
            return Err(SourceError::NotFinite(raw.to_string()));
        }
        Ok(Self {
            raw: raw.to_string(),
            value,
        })
    }
}

#[async_trait]
pub(crate) trait MetricSource: Send {
    async fn fetch(&mut self) -> Result<Reading, SourceError>;

    fn describe(&self) -> String;
}

/// Where the heart rate comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SourceKind {
    Pulsoid,
    /// Any endpoint that answers with a bare number and accepts a bearer token.
    Url(Url),
}

impl SourceKind {
    pub(crate) fn resolve(identifier: &str) -> Result<Self, SourceError> {
        if identifier == PULSOID_SOURCE {
            return Ok(SourceKind::Pulsoid);
        }
        match Url::parse(identifier) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(SourceKind::Url(url)),
            _ => Err(SourceError::InvalidSourceConfig(identifier.to_string())),
        }
    }

    pub(crate) fn endpoint(&self) -> &str {
        match self {
            SourceKind::Pulsoid => PULSOID_ENDPOINT,
            SourceKind::Url(url) => url.as_str(),
        }
    }
}

pub(crate) struct HttpSource {
    kind: SourceKind,
    api_key: String,
    client: Client,
}

impl HttpSource {
    pub(crate) fn new(kind: SourceKind, api_key: String) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(kind, api_key, client))
    }

    pub(crate) fn with_client(kind: SourceKind, api_key: String, client: Client) -> Self {
        Self {
            kind,
            api_key,
            client,
        }
    }
}

#[async_trait]
impl MetricSource for HttpSource {
    async fn fetch(&mut self) -> Result<Reading, SourceError> {
        trace!("GET {}", self.kind.endpoint());
        let response = self
            .client
            .get(self.kind.endpoint())
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(SourceError::Request)?;

        let status = response.status();
        if status == StatusCode::PRECONDITION_FAILED {
            return Err(SourceError::NotReady);
        }
        if !status.is_success() {
            return Err(SourceError::Status(status));
        }

        let body = response.text().await.map_err(SourceError::Body)?;
        debug!("Heart rate body: {:?}", body);
        Reading::parse(&body)
    }

    fn describe(&self) -> String {
        match &self.kind {
            SourceKind::Pulsoid => String::from(PULSOID_SOURCE),
            SourceKind::Url(url) => url.to_string(),
        }
    }
}

/// Stands in for a source identifier that could not be resolved, so every
/// cycle reports the misconfiguration instead of the process exiting.
pub(crate) struct UnresolvedSource {
    identifier: String,
}

#[async_trait]
impl MetricSource for UnresolvedSource {
    async fn fetch(&mut self) -> Result<Reading, SourceError> {
        Err(SourceError::InvalidSourceConfig(self.identifier.clone()))
    }

    fn describe(&self) -> String {
        format!("{} (invalid)", self.identifier)
    }
}

/// Random-walk heart rate for trying the chatbox without a sensor.
pub(crate) struct DryRunSource {
    rng: StdRng,
    bpm: f64,
}

impl DryRunSource {
    const MIN_BPM: f64 = 55.0;
    const MAX_BPM: f64 = 150.0;

    pub(crate) fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub(crate) fn with_rng(rng: StdRng) -> Self {
        Self { rng, bpm: 75.0 }
    }
}

#[async_trait]
impl MetricSource for DryRunSource {
    async fn fetch(&mut self) -> Result<Reading, SourceError> {
        let step: f64 = self.rng.gen_range(-4.0..=4.0);
        self.bpm = (self.bpm + step).clamp(Self::MIN_BPM, Self::MAX_BPM).round();
        Ok(Reading {
            raw: format!("{}", self.bpm),
            value: self.bpm,
        })
    }

    fn describe(&self) -> String {
        String::from("dry run")
    }
}

/// Builds the configured source. An unknown identifier is logged and yields a
/// source that fails every cycle.
pub(crate) fn from_config(config: &Config) -> reqwest::Result<Box<dyn MetricSource>> {
    match SourceKind::resolve(&config.heart_rate_source) {
        Ok(kind) => Ok(Box::new(HttpSource::new(
            kind,
            config.heart_rate_api_key.clone(),
        )?)),
        Err(err) => {
            error!("{err}");
            Ok(Box::new(UnresolvedSource {
                identifier: config.heart_rate_source.clone(),
            }))
        }
    }
}
