//! Error types for the gateway HTTP client.
//!
//! # Design
//! A single request attempt fails in one of six ways, one per step of the
//! executor. `AttemptError` carries the underlying error for that step and
//! `FailureCategory` is the bare tag callers match on. `RequestError` is the
//! default rendering of an `AttemptError`, prefixed with the identity of the
//! request that failed. `RetryError` wraps the last `RequestError` once every
//! retry has been spent.

use std::fmt;
use std::num::ParseIntError;

use crate::types::RequestSpec;

/// Maximum number of response body bytes quoted in an error.
pub const BODY_PREVIEW_LIMIT: usize = 200;

/// The step of a request attempt that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureCategory {
    /// The request could not be constructed (bad URI, bad header).
    NewRequest,
    /// The input value could not be serialized to JSON.
    MarshalInput,
    /// The response body could not be deserialized into the output type.
    UnmarshalOutput,
    /// The server answered with a status other than 200.
    StatusNotOk,
    /// The transport failed to send the request or receive a response.
    Send,
    /// The response body could not be read.
    ReadBody,
}

impl FailureCategory {
    /// Fixed clause used when describing a failure of this category.
    pub fn clause(&self) -> &'static str {
        match self {
            FailureCategory::NewRequest => "new fail",
            FailureCategory::MarshalInput => "in parameter marshal to json fail",
            FailureCategory::UnmarshalOutput => "out parameter unmarshal from json fail",
            FailureCategory::StatusNotOk => "get code is not ok",
            FailureCategory::Send => "do fail",
            FailureCategory::ReadBody => "read body fail",
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.clause())
    }
}

/// Why the request could not be constructed.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("invalid url {url:?}: {source}")]
    Uri {
        url: String,
        #[source]
        source: ureq::http::uri::InvalidUri,
    },

    #[error("invalid header name {0:?}")]
    HeaderName(String),

    #[error("invalid value for header {0:?}")]
    HeaderValue(String),
}

/// Failure reported by the transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Http(#[from] ureq::http::Error),

    #[error("{0}")]
    Ureq(#[from] ureq::Error),
}

/// The outcome of one failed request attempt.
#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    #[error("{0}")]
    NewRequest(#[source] BuildError),

    #[error("{0}")]
    MarshalInput(#[source] serde_json::Error),

    #[error("{source}, body:{body}")]
    UnmarshalOutput {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    #[error("code: {status}, message: {body}")]
    StatusNotOk { status: u16, body: String },

    #[error("{0}")]
    Send(#[source] TransportError),

    #[error("{0}")]
    ReadBody(#[source] std::io::Error),
}

impl AttemptError {
    pub fn category(&self) -> FailureCategory {
        match self {
            AttemptError::NewRequest(_) => FailureCategory::NewRequest,
            AttemptError::MarshalInput(_) => FailureCategory::MarshalInput,
            AttemptError::UnmarshalOutput { .. } => FailureCategory::UnmarshalOutput,
            AttemptError::StatusNotOk { .. } => FailureCategory::StatusNotOk,
            AttemptError::Send(_) => FailureCategory::Send,
            AttemptError::ReadBody(_) => FailureCategory::ReadBody,
        }
    }
}

/// Render at most `BODY_PREVIEW_LIMIT` bytes of a body for error context.
pub(crate) fn body_preview(body: &[u8]) -> String {
    let end = body.len().min(BODY_PREVIEW_LIMIT);
    String::from_utf8_lossy(&body[..end]).into_owned()
}

/// A failed attempt described together with the request it belonged to.
#[derive(Debug, thiserror::Error)]
#[error(
    "request(method:{method} path:{path} cluster:{cluster} host:{host}) {}:{source}",
    .source.category().clause()
)]
pub struct RequestError {
    pub method: String,
    pub path: String,
    pub cluster: String,
    pub host: String,
    #[source]
    pub source: AttemptError,
}

impl RequestError {
    pub fn new(spec: &RequestSpec, source: AttemptError) -> Self {
        Self {
            method: spec.method.to_string(),
            path: spec.path.clone(),
            cluster: spec.cluster_name.clone(),
            host: spec.host.clone(),
            source,
        }
    }

    pub fn category(&self) -> FailureCategory {
        self.source.category()
    }
}

/// Every attempt allowed by the retry policy failed.
#[derive(Debug, thiserror::Error)]
#[error("request error, retry at maxtimes:{max_attempts}, path:{path}, err:{last}")]
pub struct RetryError {
    pub max_attempts: u32,
    pub path: String,
    #[source]
    pub last: RequestError,
}

/// Errors from `parse_url`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlError {
    #[error("invalid host: {0}")]
    InvalidHost(String),

    #[error("invalid port in {url}: {source}")]
    InvalidPort {
        url: String,
        #[source]
        source: ParseIntError,
    },
}

/// Errors from loading or validating `ClientConfig`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid internal server: {0}")]
    InternalServer(#[from] UrlError),

    #[error("invalid {var}: {source}")]
    Timeout {
        var: &'static str,
        #[source]
        source: ParseIntError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    fn spec() -> RequestSpec {
        RequestSpec::new(HttpMethod::Post, "/handshake")
            .cluster("alice-to-bob")
            .source("alice")
            .host("bob")
    }

    #[test]
    fn every_category_has_its_clause() {
        let cases = [
            (FailureCategory::NewRequest, "new fail"),
            (FailureCategory::MarshalInput, "in parameter marshal to json fail"),
            (FailureCategory::UnmarshalOutput, "out parameter unmarshal from json fail"),
            (FailureCategory::StatusNotOk, "get code is not ok"),
            (FailureCategory::Send, "do fail"),
            (FailureCategory::ReadBody, "read body fail"),
        ];
        for (category, clause) in cases {
            assert_eq!(category.clause(), clause);
            assert_eq!(category.to_string(), clause);
        }
    }

    #[test]
    fn status_error_carries_code_and_body() {
        let err = AttemptError::StatusNotOk {
            status: 503,
            body: "busy".to_string(),
        };
        assert_eq!(err.category(), FailureCategory::StatusNotOk);
        assert_eq!(err.to_string(), "code: 503, message: busy");
    }

    #[test]
    fn body_preview_truncates_to_limit() {
        let body = vec![b'x'; 500];
        assert_eq!(body_preview(&body).len(), BODY_PREVIEW_LIMIT);
        assert_eq!(body_preview(b"short"), "short");
        assert_eq!(body_preview(b""), "");
    }

    #[test]
    fn body_preview_tolerates_split_utf8() {
        let mut body = vec![b'a'; BODY_PREVIEW_LIMIT - 1];
        body.extend_from_slice("é".as_bytes());
        let preview = body_preview(&body);
        assert!(preview.starts_with("aaa"));
        assert!(preview.ends_with('\u{FFFD}'));
    }

    #[test]
    fn request_error_has_prefix_and_clause() {
        let source = AttemptError::Send(TransportError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        )));
        let err = RequestError::new(&spec(), source);
        assert_eq!(err.category(), FailureCategory::Send);
        assert_eq!(
            err.to_string(),
            "request(method:POST path:/handshake cluster:alice-to-bob host:bob) do fail:connection refused"
        );
    }

    #[test]
    fn request_error_exposes_attempt_as_source() {
        let source = AttemptError::StatusNotOk {
            status: 500,
            body: String::new(),
        };
        let err = RequestError::new(&spec(), source);
        let inner = std::error::Error::source(&err).unwrap();
        assert_eq!(inner.to_string(), "code: 500, message: ");
    }

    #[test]
    fn retry_error_names_attempts_and_path() {
        let last = RequestError::new(
            &spec(),
            AttemptError::StatusNotOk {
                status: 502,
                body: "bad gateway".to_string(),
            },
        );
        let err = RetryError {
            max_attempts: 3,
            path: "/handshake".to_string(),
            last,
        };
        let text = err.to_string();
        assert!(text.starts_with("request error, retry at maxtimes:3, path:/handshake, err:"));
        assert!(text.ends_with("get code is not ok:code: 502, message: bad gateway"));
    }

    #[test]
    fn url_error_quotes_input() {
        let err = UrlError::InvalidHost("ftp://x".to_string());
        assert_eq!(err.to_string(), "invalid host: ftp://x");
    }
}
