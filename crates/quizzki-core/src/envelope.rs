//! The `{status, message, data}` response envelope.
//!
//! Every response goes through [`classify`] (or [`classify_ack`] for
//! endpoints whose payload is irrelevant). The body is parsed once and the
//! three failure shapes (non-2xx HTTP, `"ERROR"` status, missing `data`)
//! map onto distinct [`ApiError`] variants that all carry the server message.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ApiError;

/// Status tag the server uses to flag a failed operation.
pub const ERROR_STATUS: &str = "ERROR";

/// The raw envelope as it comes off the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl Envelope {
    /// Whether the status tag signals failure. Case is not significant.
    pub fn is_error(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case(ERROR_STATUS)
    }
}

/// A successfully classified response.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply<T> {
    pub message: String,
    pub data: T,
}

impl<T> Reply<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reply<U> {
        Reply {
            message: self.message,
            data: f(self.data),
        }
    }
}

/// Shown for a failed HTTP status with neither an envelope message nor a
/// canonical reason phrase.
pub const UNKNOWN_STATUS: &str = "Unexpected HTTP status";

/// Checks shared by both classifiers: HTTP status, envelope shape, status tag.
fn open(http_status: u16, reason: Option<&str>, body: &str) -> Result<Envelope, ApiError> {
    let parsed = serde_json::from_str::<Envelope>(body);

    if !(200..300).contains(&http_status) {
        let message = match &parsed {
            Ok(env) if !env.message.trim().is_empty() => env.message.clone(),
            _ => reason.unwrap_or(UNKNOWN_STATUS).to_string(),
        };
        return Err(ApiError::Http {
            status: http_status,
            message,
        });
    }

    let envelope = parsed.map_err(|e| ApiError::UnexpectedFormat {
        detail: e.to_string(),
    })?;

    if envelope.is_error() {
        return Err(ApiError::Server {
            message: envelope.message,
        });
    }

    Ok(envelope)
}

/// Decode a response whose `data` is required.
///
/// `reason` is the status line's reason phrase. It becomes the message of a
/// non-2xx reply whose body carries none.
pub fn classify<T: DeserializeOwned>(
    http_status: u16,
    reason: Option<&str>,
    body: &str,
) -> Result<Reply<T>, ApiError> {
    let envelope = open(http_status, reason, body)?;

    let data = match envelope.data {
        Some(serde_json::Value::Null) | None => {
            return Err(ApiError::MissingData {
                message: envelope.message,
            })
        }
        Some(data) => data,
    };

    let data = serde_json::from_value(data).map_err(|e| ApiError::UnexpectedFormat {
        detail: e.to_string(),
    })?;

    Ok(Reply {
        message: envelope.message,
        data,
    })
}

/// Decode an acknowledgement: success is a non-error status; `data` is ignored.
pub fn classify_ack(
    http_status: u16,
    reason: Option<&str>,
    body: &str,
) -> Result<Reply<()>, ApiError> {
    let envelope = open(http_status, reason, body)?;
    Ok(Reply {
        message: envelope.message,
        data: (),
    })
}
