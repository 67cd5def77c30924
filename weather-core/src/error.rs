use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures surfaced by the dashboard core.
///
/// None of these are fatal: the dashboard logs them and either keeps the
/// previous snapshot on screen or shows an inline message.
#[derive(Debug, Error)]
pub enum Error {
    #[error("request to {url} failed: {cause}")]
    RequestFailed {
        url: String,
        #[source]
        cause: RequestFailure,
    },

    #[error("geolocation unavailable: {0}")]
    GeolocationDenied(String),

    #[error("could not parse local time '{0}'")]
    LocalTimeParse(String),

    #[error("request cancelled")]
    Cancelled,
}

/// Underlying cause of a [`Error::RequestFailed`].
#[derive(Debug, Error)]
pub enum RequestFailure {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn request(url: &str, cause: impl Into<RequestFailure>) -> Self {
        Self::RequestFailed { url: redact_query(url), cause: cause.into() }
    }

    /// HTTP status of a failed request, when the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::RequestFailed { cause: RequestFailure::Status { status, .. }, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

/// Drop the query string so API keys never end up in logs or messages.
fn redact_query(url: &str) -> String {
    match url.split_once('?') {
        Some((base, _)) => base.to_string(),
        None => url.to_string(),
    }
}
