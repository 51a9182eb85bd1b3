//! Internal error types for hireflow-reqwest.

use reqwest::StatusCode;
use thiserror::Error;

/// Internal error type for hireflow-reqwest operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed at the transport level.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// The response status code.
        status: StatusCode,
        /// The response body, truncated for logging.
        body: String,
    },
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<Error> for hireflow_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Reqwest(e) => {
                if e.is_timeout() {
                    hireflow_core::Error::timeout()
                        .with_message(e.to_string())
                        .with_source(e)
                } else if e.is_connect() {
                    hireflow_core::Error::network_error()
                        .with_message("Connection failed")
                        .with_source(e)
                } else {
                    hireflow_core::Error::network_error()
                        .with_message(e.to_string())
                        .with_source(e)
                }
            }
            Error::Status { status, body } => {
                let core = match status {
                    StatusCode::UNAUTHORIZED => hireflow_core::Error::authentication(),
                    StatusCode::FORBIDDEN => hireflow_core::Error::authorization(),
                    StatusCode::NOT_FOUND => hireflow_core::Error::not_found(),
                    StatusCode::CONFLICT => hireflow_core::Error::conflict(),
                    StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                        hireflow_core::Error::invalid_input()
                    }
                    _ => hireflow_core::Error::external_error(),
                };
                core.with_message(format!("HTTP {status}: {body}"))
            }
            Error::Serde(e) => hireflow_core::Error::serialization()
                .with_message(e.to_string())
                .with_source(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hireflow_core::ErrorKind;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (StatusCode::UNAUTHORIZED, ErrorKind::Authentication),
            (StatusCode::FORBIDDEN, ErrorKind::Authorization),
            (StatusCode::NOT_FOUND, ErrorKind::NotFound),
            (StatusCode::UNPROCESSABLE_ENTITY, ErrorKind::InvalidInput),
            (StatusCode::INTERNAL_SERVER_ERROR, ErrorKind::ExternalError),
        ];
        for (status, expected) in cases {
            let err = Error::Status {
                status,
                body: String::new(),
            };
            let core: hireflow_core::Error = err.into();
            assert_eq!(core.kind(), expected, "status {status}");
        }
    }
}
