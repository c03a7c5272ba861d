//! Request descriptor for calls to the internal gateway.
//!
//! # Design
//! `RequestSpec` is a plain value describing one call: routing identity plus
//! any extra headers. Extra headers live in a `BTreeMap` so names are unique
//! and the outgoing header order is deterministic.

use std::collections::BTreeMap;

use crate::http::HttpMethod;

/// Description of one call to the internal gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub method: HttpMethod,
    /// Path appended to the internal server base, e.g. `/handshake`.
    pub path: String,
    /// Logical cluster name sent in the handshake cluster header.
    pub cluster_name: String,
    /// Identity of the calling party.
    pub source: String,
    /// Identity of the destination host.
    pub host: String,
    /// Extra headers applied last; they override the standard ones.
    pub headers: BTreeMap<String, String>,
}

impl RequestSpec {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            cluster_name: String::new(),
            source: String::new(),
            host: String::new(),
            headers: BTreeMap::new(),
        }
    }

    pub fn cluster(mut self, cluster_name: impl Into<String>) -> Self {
        self.cluster_name = cluster_name.into();
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_fills_every_field() {
        let spec = RequestSpec::new(HttpMethod::Post, "/handshake")
            .cluster("alice-to-bob")
            .source("alice")
            .host("bob")
            .header("X-Trace", "1");
        assert_eq!(spec.method, HttpMethod::Post);
        assert_eq!(spec.path, "/handshake");
        assert_eq!(spec.cluster_name, "alice-to-bob");
        assert_eq!(spec.source, "alice");
        assert_eq!(spec.host, "bob");
        assert_eq!(spec.headers.get("X-Trace").map(String::as_str), Some("1"));
    }

    #[test]
    fn repeated_header_keeps_last_value() {
        let spec = RequestSpec::new(HttpMethod::Get, "/")
            .header("X-Trace", "1")
            .header("X-Trace", "2");
        assert_eq!(spec.headers.len(), 1);
        assert_eq!(spec.headers["X-Trace"], "2");
    }

    #[test]
    fn new_spec_has_empty_identity() {
        let spec = RequestSpec::new(HttpMethod::Get, "/status");
        assert!(spec.cluster_name.is_empty());
        assert!(spec.source.is_empty());
        assert!(spec.host.is_empty());
        assert!(spec.headers.is_empty());
    }
}
