use std::time::Duration;

use hyper::StatusCode;
use thiserror::Error;

use crate::shrink::ShrinkError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Shrink(#[from] ShrinkError),
    #[error("channel {index}: {source}")]
    Channel { index: usize, source: ShrinkError },
    #[error("no channel data")]
    NoChannels,
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid url: {0}")]
    InvalidUri(#[from] hyper::http::uri::InvalidUri),
    #[error("http error: {0}")]
    Http(#[from] hyper::http::Error),
    #[error("request failed: {0}")]
    Hyper(#[from] hyper::Error),
    #[error("upload timed out after {0:?}")]
    Timeout(Duration),
    #[error("upload rejected with status {code}: {body}")]
    Status { code: StatusCode, body: String },
    #[error("malformed upload response: missing {0}")]
    MalformedResponse(&'static str),
}
