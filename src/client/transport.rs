use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

/// Everything a transport needs to issue one request. The credential is
/// attached by the sync layer, never by the caller.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub method: Method,
    pub url: String,
    pub credential: Option<String>,
    pub body: Option<Value>,
}

/// A failed request. `status` is the HTTP status code, or 0 when the request
/// never reached the server.
#[derive(Debug, Clone, Error)]
#[error("request failed with status {status}: {message}")]
pub struct TransportError {
    pub status: u16,
    pub message: String,
}

impl TransportError {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: 0,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// Issues requests against the remote API. Implementations resolve with the
/// decoded JSON body, or a [`TransportError`] carrying the status code.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: RequestConfig) -> Result<Value, TransportError>;
}
