use thiserror::Error;

/// Errors surfaced by the price schedule pipeline.
///
/// Every failure falls into one of three classes: broken configuration
/// (unresolvable time zone, incomplete price table), a failed or malformed
/// calendar fetch, or a structurally invalid day-color sequence. None of
/// them are retried or patched over here; they propagate to the caller.
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("tempo calendar fetch failed: {0}")]
    Fetch(String),

    #[error("invalid day color data: {0}")]
    Data(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Fetch(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Fetch(format!("malformed response body: {}", err))
    }
}
