//! Blocking JSON client for a co-located internal gateway.
//!
//! # Overview
//! Builds one request from a `RequestSpec`, injects the routing and identity
//! headers the gateway expects, sends it over a `Transport`, and decodes the
//! JSON reply. Failures are classified by the step that failed
//! (`FailureCategory`) so callers can decide how to react.
//!
//! # Design
//! - `GatewayClient::attempt` returns a tagged `Result`; the handler, plain
//!   and retrying entry points are thin layers over it.
//! - The internal server base and handshake header prefix come from
//!   `ClientConfig` rather than globals, so tests can point clients at any
//!   number of simulated gateways.
//! - The transport is a trait. `UreqTransport` is the blocking default;
//!   unit tests use in-memory stubs.
//! - Response bodies are fully buffered; error messages quote at most
//!   `BODY_PREVIEW_LIMIT` bytes of them.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod retry;
pub mod types;
pub mod url;

pub use client::GatewayClient;
pub use config::ClientConfig;
pub use error::{
    AttemptError, BuildError, ConfigError, FailureCategory, RequestError, RetryError, TransportError,
    UrlError, BODY_PREVIEW_LIMIT,
};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use retry::{run_with_retry, RetryPolicy};
pub use types::RequestSpec;
pub use url::{parse_url, ParsedUrl, Protocol};
