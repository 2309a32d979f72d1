//! The network boundary.
//!
//! A [`Transport`] takes a [`Request`] and answers it later through a
//! [`Responder`]. [`StubTransport`] queues requests for tests to resolve by
//! hand; `ReqwestTransport` (feature `http`) performs real HTTP on the current
//! tokio runtime.

#[cfg(feature = "http")]
mod http;
mod stub;

#[cfg(feature = "http")]
pub use http::{HttpConfig, ReqwestTransport};
pub use stub::{PendingRequest, StubTransport};

use std::fmt;

use serde_json::Value;

use crate::error::TransportError;
use crate::record::Attributes;

/// Receives the decoded response body, or the failure. Called exactly once.
pub type Responder = Box<dyn FnOnce(Result<Value, TransportError>) + Send>;

/// Sends requests without blocking the caller.
pub trait Transport: Send + Sync {
    fn send(&self, request: Request, respond: Responder);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a response body is decoded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DataFormat {
    #[default]
    Json,
    Text,
}

impl DataFormat {
    pub fn mime(self) -> &'static str {
        match self {
            DataFormat::Json => "application/json",
            DataFormat::Text => "text/plain",
        }
    }

    /// Decode a raw body. A blank JSON body decodes to `null`.
    pub fn decode(self, body: &str) -> Result<Value, TransportError> {
        match self {
            DataFormat::Json if body.trim().is_empty() => Ok(Value::Null),
            DataFormat::Json => {
                serde_json::from_str(body).map_err(|e| TransportError::Decode(e.to_string()))
            }
            DataFormat::Text => Ok(Value::String(body.to_string())),
        }
    }
}

/// One outgoing call. `body` is the flat submission-params mapping, absent for
/// `DELETE`.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub body: Option<Attributes>,
    pub format: DataFormat,
}
