use std::io;
use std::num::ParseFloatError;
use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write config {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

#[derive(Debug, Error)]
pub(crate) enum SourceError {
    #[error("'{0}' is an invalid heart rate source")]
    InvalidSourceConfig(String),
    /// Provider answered 412, the sensor has not published a reading yet.
    #[error("heart rate not ready yet")]
    NotReady,
    #[error("failed grabbing heart rate: {0}")]
    Request(#[source] reqwest::Error),
    #[error("heart rate source answered {0}")]
    Status(StatusCode),
    #[error("error reading heart rate body: {0}")]
    Body(#[source] reqwest::Error),
    #[error("failed to parse heart rate {body:?}: {source}")]
    Parse {
        body: String,
        source: ParseFloatError,
    },
    #[error("heart rate {0:?} is not a finite number")]
    NotFinite(String),
}

#[derive(Debug, Error)]
pub(crate) enum AnnotationError {
    #[error("failed to start now-playing lookup: {0}")]
    Spawn(#[source] io::Error),
    #[error("now-playing lookup timed out")]
    Timeout,
    #[error("now-playing lookup exited with {0}")]
    Exited(std::process::ExitStatus),
}

#[derive(Debug, Error)]
pub(crate) enum SinkError {
    #[error("failed to open OSC socket for {addr}: {source}")]
    Bind {
        addr: String,
        source: async_osc::Error,
    },
    #[error("failed to send OSC message: {0}")]
    Send(#[source] async_osc::Error),
}
