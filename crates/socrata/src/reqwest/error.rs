//! Error types for the reqwest transport.

use reqwest::StatusCode;
use thiserror::Error;

/// Failures raised while talking to the platform over HTTP.
#[derive(Debug, Error)]
pub enum Error {
    /// The request could not be sent or its response not read.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// The platform answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Response status.
        status: StatusCode,
        /// Response body, possibly empty.
        body: String,
    },
    /// The response body was not valid JSON.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<Error> for crate::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Reqwest(e) => {
                let message = if e.is_timeout() {
                    "Request timed out".to_owned()
                } else if e.is_connect() {
                    "Connection failed".to_owned()
                } else {
                    e.to_string()
                };
                crate::Error::transport().with_message(message).with_source(e)
            }
            Error::Status { .. } => crate::Error::transport().with_message(err.to_string()),
            Error::Serde(e) => crate::Error::serialization()
                .with_message(e.to_string())
                .with_source(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_status_maps_to_transport_failure() {
        let error: crate::Error = Error::Status {
            status: StatusCode::FORBIDDEN,
            body: "{\"message\":\"nope\"}".into(),
        }
        .into();

        assert_eq!(error.kind(), ErrorKind::TransportFailure);
        assert!(error.to_string().contains("403"));
    }

    #[test]
    fn test_serde_maps_to_serialization() {
        let serde_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: crate::Error = Error::from(serde_error).into();
        assert_eq!(error.kind(), ErrorKind::Serialization);
    }
}
