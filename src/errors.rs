use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Json(serde_json::Error),
    Reqwest(reqwest::Error),
    /// Non-2xx response: status plus the raw response body.
    Http(StatusCode, String),
    /// Error envelope decoded from an API response.
    Api {
        status: StatusCode,
        message: String,
        request_id: Option<String>,
    },
    /// The renewal call failed; shared by every request blocked on that cycle.
    SessionRenewal(Arc<Error>),
    /// The request that owned the renewal cycle was dropped before it settled.
    RenewalAbandoned,
    /// A redirect-style endpoint answered without a `Location` header.
    MissingRedirect(StatusCode),
    Config(String),
    Timeout(Duration),
}

impl Error {
    /// True for the 401 signal that starts session renewal.
    pub fn is_auth_expiry(&self) -> bool {
        matches!(self, Error::Http(status, _) if *status == StatusCode::UNAUTHORIZED)
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Http(status, _) => Some(*status),
            Error::Api { status, .. } => Some(*status),
            Error::Reqwest(err) => err.status(),
            Error::SessionRenewal(inner) => inner.status(),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "io error: {err}"),
            Error::Json(err) => write!(f, "json error: {err}"),
            Error::Reqwest(err) => write!(f, "transport error: {err}"),
            Error::Http(status, body) => write!(f, "http {status}: {body}"),
            Error::Api {
                status,
                message,
                request_id,
            } => match request_id {
                Some(id) => write!(f, "api error {status}: {message} (request_id={id})"),
                None => write!(f, "api error {status}: {message}"),
            },
            Error::SessionRenewal(inner) => write!(f, "session renewal failed: {inner}"),
            Error::RenewalAbandoned => write!(f, "session renewal abandoned before completion"),
            Error::MissingRedirect(status) => {
                write!(f, "response {status} carried no Location header")
            }
            Error::Config(msg) => write!(f, "config error: {msg}"),
            Error::Timeout(after) => write!(f, "request timed out after {after:?}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Reqwest(err) => Some(err),
            Error::SessionRenewal(inner) => Some(inner.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Reqwest(err)
    }
}
