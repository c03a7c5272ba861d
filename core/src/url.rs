//! Textual URL splitting for `http://` and `https://` addresses.

use std::fmt;

use crate::error::UrlError;

/// Scheme accepted by `parse_url`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Http,
    Https,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Protocol::Http => 80,
            Protocol::Https => 443,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The pieces of a URL: `protocol://host:port` followed by `path`.
///
/// `path` is either empty or starts with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    pub protocol: Protocol,
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl fmt::Display for ParsedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}{}", self.protocol, self.host, self.port, self.path)
    }
}

/// Split `url` into protocol, host, port and path.
///
/// Only `http://` and `https://` are accepted. A missing port defaults to the
/// scheme's well-known port; a missing path yields an empty path. No network
/// access is performed.
///
/// # Examples
///
/// - `"http://example.com/foo"` → `http`, `example.com`, `80`, `/foo`
/// - `"https://example.com:8443"` → `https`, `example.com`, `8443`, `""`
pub fn parse_url(url: &str) -> Result<ParsedUrl, UrlError> {
    let (protocol, rest) = if let Some(rest) = url.strip_prefix("http://") {
        (Protocol::Http, rest)
    } else if let Some(rest) = url.strip_prefix("https://") {
        (Protocol::Https, rest)
    } else {
        return Err(UrlError::InvalidHost(url.to_string()));
    };

    let (host_port, path) = match rest.split_once('/') {
        Some((host_port, path)) => (host_port, format!("/{path}")),
        None => (rest, String::new()),
    };

    let fields: Vec<&str> = host_port.split(':').collect();
    let (host, port) = match fields.as_slice() {
        [host] => (*host, protocol.default_port()),
        [host, port] => {
            let port = port.parse::<u16>().map_err(|source| UrlError::InvalidPort {
                url: url.to_string(),
                source,
            })?;
            (*host, port)
        }
        _ => return Err(UrlError::InvalidHost(url.to_string())),
    };

    if host.is_empty() {
        return Err(UrlError::InvalidHost(url.to_string()));
    }

    Ok(ParsedUrl {
        protocol,
        host: host.to_string(),
        port,
        path,
    })
}
