//! HTTP transport backed by reqwest.
//!
//! Requires the `http` feature. Requests are spawned on a tokio runtime so
//! `send` returns immediately; the responder runs on that runtime.
//!
//! ```ignore
//! use model_rust::{HttpConfig, Model, ReqwestTransport, RestPersistence};
//!
//! let transport = ReqwestTransport::new(HttpConfig::new("https://api.example.com"))?;
//! let post = Model::builder("post")
//!     .persistence(RestPersistence::new("/posts", transport))
//!     .build();
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::runtime::Handle;

use crate::error::TransportError;
use crate::record::Attributes;

use super::{Method, Request, Responder, Transport};

/// Connection settings for [`ReqwestTransport`].
///
/// Deserializable so it can sit inside an application's config file; missing
/// fields take their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Prefix for request paths that are not already absolute URLs.
    pub base_url: String,
    /// Whole-request timeout. `None` waits indefinitely.
    pub timeout_ms: Option<u64>,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            base_url: String::new(),
            timeout_ms: Some(30_000),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpConfig {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout_ms = timeout.map(|t| t.as_millis() as u64);
        self
    }

    /// Absolute URL for `path`.
    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") || self.base_url.is_empty() {
            return path.to_string();
        }
        let path = path.strip_prefix("./").unwrap_or(path);
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Real HTTP transport. Bodies are sent form-encoded (`post[title]=Foo`);
/// responses are decoded according to the request's `DataFormat`.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    config: HttpConfig,
    runtime: Handle,
}

impl ReqwestTransport {
    /// Build a transport that spawns onto the tokio runtime it is created in.
    pub fn new(config: HttpConfig) -> Result<Self, TransportError> {
        let runtime =
            Handle::try_current().map_err(|e| TransportError::Unavailable(e.to_string()))?;
        Self::with_runtime(config, runtime)
    }

    pub fn with_runtime(config: HttpConfig, runtime: Handle) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Unavailable(e.to_string()))?;
        Ok(ReqwestTransport {
            client,
            config,
            runtime,
        })
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: Request, respond: Responder) {
        let client = self.client.clone();
        let url = self.config.resolve(&request.url);
        self.runtime.spawn(async move {
            let result = execute(&client, &url, request).await;
            if let Err(error) = &result {
                tracing::debug!(%url, %error, "http request failed");
            }
            respond(result);
        });
    }
}

async fn execute(
    client: &reqwest::Client,
    url: &str,
    request: Request,
) -> Result<Value, TransportError> {
    let method = match request.method {
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    };
    let mut builder = client
        .request(method, url)
        .header(reqwest::header::ACCEPT, request.format.mime());
    if let Some(body) = &request.body {
        builder = builder.form(&form_fields(body));
    }

    let response = builder.send().await.map_err(map_error)?;
    let status = response.status();
    let text = response.text().await.map_err(map_error)?;
    if !status.is_success() {
        return Err(TransportError::Status {
            status: status.as_u16(),
            body: text,
        });
    }
    request.format.decode(&text)
}

/// Flatten submission params into form pairs. Strings go as-is, everything
/// else as its JSON rendering.
fn form_fields(body: &Attributes) -> Vec<(String, String)> {
    body.iter()
        .map(|(name, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (name.clone(), value)
        })
        .collect()
}

fn map_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Connection(error.to_string())
    }
}
