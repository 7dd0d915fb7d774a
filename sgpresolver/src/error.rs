//! Error types for the page resolver

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Result type alias for resolver operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving a page URL
///
/// Every variant maps to an HTTP status through [`Error::status_code`]; none
/// of them is fatal to the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The `url` query parameter is absent or empty
    #[error("Missing url param. Use /resolve?url=<page-url>")]
    MissingParameter,

    /// The `url` query parameter is not a well-formed URL
    #[error("Invalid url param: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The page host is not the allowed domain or one of its subdomains
    #[error("Only {allowed} URLs are allowed by this resolver.")]
    ForbiddenHost { host: String, allowed: String },

    /// The hosting site answered with a non-success status
    #[error("Failed to fetch page")]
    UpstreamFetchFailed { status: u16 },

    /// The page could not be fetched at all (DNS, TLS, timeout, ...)
    #[error("Failed to fetch page: {0}")]
    Http(#[from] reqwest::Error),

    /// None of the extraction patterns matched
    #[error("Could not find an audio URL on that page.")]
    AudioNotFound,

    /// Regex error
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl Error {
    /// HTTP status used when the error is returned by the `/resolve` endpoint
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingParameter | Error::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            Error::ForbiddenHost { .. } => StatusCode::FORBIDDEN,
            Error::UpstreamFetchFailed { .. } | Error::Http(_) => StatusCode::BAD_GATEWAY,
            Error::AudioNotFound => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Regex(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON body: `{"error": …}`, plus the upstream `status` for fetch failures
    pub fn body(&self) -> serde_json::Value {
        match self {
            Error::UpstreamFetchFailed { status } => serde_json::json!({
                "error": self.to_string(),
                "status": status,
            }),
            _ => serde_json::json!({ "error": self.to_string() }),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        crate::api::json_response(self.status_code(), &self.body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::MissingParameter.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            Error::InvalidUrl(url::ParseError::RelativeUrlWithoutBase).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::ForbiddenHost {
                host: "example.com".into(),
                allowed: "soundgasm.net".into()
            }
            .status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            Error::UpstreamFetchFailed { status: 404 }.status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            Error::AudioNotFound.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_upstream_body_carries_status() {
        let body = Error::UpstreamFetchFailed { status: 503 }.body();
        assert_eq!(body["status"], 503);
        assert_eq!(body["error"], "Failed to fetch page");

        let body = Error::AudioNotFound.body();
        assert!(body.get("status").is_none());
    }
}
