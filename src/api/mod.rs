//! Typed handles for the ticketing API resources.

mod auth;
mod registrants;
mod tickets;
mod users;

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::errors::Error;

pub use auth::AuthApi;
pub use registrants::RegistrantApi;
pub use tickets::TicketApi;
pub use users::UserApi;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ApiMeta {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub request_id: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
    pub meta: ApiMeta,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    meta: ApiMeta,
}

/// Turns an error response carrying the API envelope into `Error::Api`.
pub(crate) fn into_api_error(err: Error) -> Error {
    match err {
        Error::Http(status, body) => match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => Error::Api {
                status,
                message: envelope.meta.message,
                request_id: envelope.meta.request_id,
            },
            Err(_) => Error::Http(status, body),
        },
        other => other,
    }
}

pub(crate) fn segment(raw: &str) -> Cow<'_, str> {
    urlencoding::encode(raw)
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;

    #[test]
    fn error_envelope_becomes_api_error() {
        let body = r#"{"data":null,"meta":{"success":false,"message":"ticket quota has been exhausted","request_id":"abc"}}"#;
        match into_api_error(Error::Http(StatusCode::INTERNAL_SERVER_ERROR, body.into())) {
            Error::Api {
                status,
                message,
                request_id,
            } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(message, "ticket quota has been exhausted");
                assert_eq!(request_id.as_deref(), Some("abc"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn non_envelope_body_is_kept() {
        let err = into_api_error(Error::Http(StatusCode::BAD_GATEWAY, "<html>".into()));
        assert!(matches!(err, Error::Http(StatusCode::BAD_GATEWAY, _)));
    }

    #[test]
    fn renewal_failure_is_not_rewritten() {
        let inner = std::sync::Arc::new(Error::Http(StatusCode::UNAUTHORIZED, "{}".into()));
        let err = into_api_error(Error::SessionRenewal(inner));
        assert!(matches!(err, Error::SessionRenewal(_)));
    }

    #[test]
    fn segments_are_percent_encoded() {
        assert_eq!(segment("a b/c"), "a%20b%2Fc");
        assert_eq!(segment("plain"), "plain");
    }
}
