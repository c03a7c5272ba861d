//! Request executor for the internal gateway.
//!
//! # Design
//! `GatewayClient` owns its configuration and transport and carries no
//! mutable state between calls. One attempt runs a fixed sequence of steps:
//! serialize the input (non-GET only), build the request, attach identity
//! headers, send, read the body, check the status, decode. Whichever step
//! fails determines the `FailureCategory`, and nothing after it runs.
//!
//! The attempt itself is a plain `Result`. `do_http_with_handler` exposes the
//! callback form, `do_http` the default-formatted error, and
//! `do_http_with_retry` the bounded retry on top of `do_http`.

use std::fmt;
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use ureq::http::{HeaderName, HeaderValue, Uri};

use crate::config::{ClientConfig, CONTENT_TYPE_JSON, HOST_HEADER, SOURCE_HEADER};
use crate::error::{body_preview, AttemptError, BuildError, FailureCategory, RequestError, RetryError};
use crate::http::{HttpRequest, Transport, UreqTransport};
use crate::retry::{run_with_retry, RetryPolicy};
use crate::types::RequestSpec;

/// The only status treated as success.
const STATUS_OK: u16 = 200;

type Sleeper = Arc<dyn Fn(Duration) + Send + Sync>;

/// Blocking JSON client for the co-located gateway.
pub struct GatewayClient<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
    sleeper: Sleeper,
}

impl GatewayClient<UreqTransport> {
    /// Client over a `ureq` transport using the config's timeout.
    pub fn new(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout());
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> GatewayClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            sleeper: Arc::new(std::thread::sleep),
        }
    }

    /// Replace the blocking sleep used between retry attempts.
    pub fn with_sleeper(mut self, sleeper: impl Fn(Duration) + Send + Sync + 'static) -> Self {
        self.sleeper = Arc::new(sleeper);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build the outgoing request for `spec` with an already-serialized body.
    ///
    /// Standard headers are set first and the spec's extra headers last, so a
    /// caller header with the same name (in any case) wins.
    pub fn build_request(
        &self,
        spec: &RequestSpec,
        body: Option<Vec<u8>>,
    ) -> Result<HttpRequest, BuildError> {
        let url = format!("{}{}", self.config.base_url(), spec.path);
        if let Err(source) = url.parse::<Uri>() {
            return Err(BuildError::Uri { url, source });
        }

        let mut request = HttpRequest {
            method: spec.method,
            url,
            headers: Vec::new(),
            body,
        };
        request.set_header("Content-Type", CONTENT_TYPE_JSON);
        request.set_header(&self.config.cluster_header(), &spec.cluster_name);
        request.set_header(SOURCE_HEADER, &spec.source);
        request.set_header(HOST_HEADER, &spec.host);
        for (name, value) in &spec.headers {
            request.set_header(name, value);
        }

        for (name, value) in &request.headers {
            HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| BuildError::HeaderName(name.clone()))?;
            HeaderValue::from_str(value).map_err(|_| BuildError::HeaderValue(name.clone()))?;
        }
        Ok(request)
    }

    /// Run one attempt and decode the response body as `O`.
    pub fn attempt<I, O>(&self, spec: &RequestSpec, input: &I) -> Result<O, AttemptError>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        let body = if spec.method.carries_body() {
            Some(serde_json::to_vec(input).map_err(AttemptError::MarshalInput)?)
        } else {
            None
        };
        let request = self.build_request(spec, body).map_err(AttemptError::NewRequest)?;

        debug!(
            method = %spec.method,
            url = %request.url,
            cluster = %spec.cluster_name,
            host = %spec.host,
            "sending gateway request"
        );
        let mut response = self.transport.send(&request).map_err(AttemptError::Send)?;

        let mut body = Vec::new();
        response
            .body
            .read_to_end(&mut body)
            .map_err(AttemptError::ReadBody)?;

        if response.status != STATUS_OK {
            return Err(AttemptError::StatusNotOk {
                status: response.status,
                body: body_preview(&body),
            });
        }

        serde_json::from_slice(&body).map_err(|source| AttemptError::UnmarshalOutput {
            source,
            body: body_preview(&body),
        })
    }

    /// Run one attempt, writing the decoded response into `out` on success
    /// and calling `handler` exactly once on failure.
    pub fn do_http_with_handler<I, O, H>(&self, input: &I, out: &mut O, spec: &RequestSpec, handler: H)
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
        H: FnOnce(FailureCategory, AttemptError),
    {
        match self.attempt(spec, input) {
            Ok(value) => *out = value,
            Err(err) => {
                let category = err.category();
                debug!(%category, path = %spec.path, error = %err, "gateway request failed");
                handler(category, err);
            }
        }
    }

    /// Run one attempt, returning the failure rendered with the request's
    /// method, path, cluster and host.
    pub fn do_http<I, O>(&self, input: &I, out: &mut O, spec: &RequestSpec) -> Result<(), RequestError>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        let mut failure = None;
        self.do_http_with_handler(input, out, spec, |_, err| {
            failure = Some(RequestError::new(spec, err));
        });
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// `do_http` repeated under `policy`, sleeping between failed attempts.
    pub fn do_http_with_retry<I, O>(
        &self,
        input: &I,
        out: &mut O,
        spec: &RequestSpec,
        policy: &RetryPolicy,
    ) -> Result<(), RetryError>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        let sleeper = &self.sleeper;
        run_with_retry(policy, |delay| sleeper(delay), |_| self.do_http(input, &mut *out, spec)).map_err(
            |last| {
                warn!(
                    path = %spec.path,
                    max_attempts = policy.attempts(),
                    error = %last,
                    "gateway request retries exhausted"
                );
                RetryError {
                    max_attempts: policy.attempts(),
                    path: spec.path.clone(),
                    last,
                }
            },
        )
    }
}

impl<T: fmt::Debug> fmt::Debug for GatewayClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayClient")
            .field("config", &self.config)
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}
