//! HTTP plumbing shared by every endpoint client.
//!
//! `Transport` is the seam between the typed API surface and the network:
//! the browser build uses `HttpTransport` (reqwest over `fetch`), tests swap
//! in a recording mock so they can assert exactly which calls were issued.

use async_trait::async_trait;
use futures_util::StreamExt;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ScantonError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            body: Some(body),
        }
    }

    pub fn delete(url: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method: Method::Delete,
            url: url.into(),
            body,
        }
    }
}

#[async_trait(?Send)]
pub trait Transport {
    /// Issue a request and decode the body as JSON. An empty body is `Null`.
    async fn send(&self, request: ApiRequest) -> Result<Value, ScantonError>;

    /// Issue a request and hand each body chunk to `on_chunk` as it arrives.
    async fn stream(
        &self,
        request: ApiRequest,
        on_chunk: &mut (dyn for<'c> FnMut(&'c [u8])),
    ) -> Result<(), ScantonError>;
}

/// reqwest-backed transport. On wasm32 reqwest rides on the browser `fetch`.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, ScantonError> {
        let builder = reqwest::Client::builder();

        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder
            .user_agent("SCANTON/0.1")
            .timeout(std::time::Duration::from_secs(30));

        let client = builder
            .build()
            .map_err(|e| ScantonError::Network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    async fn execute(&self, request: &ApiRequest) -> Result<reqwest::Response, ScantonError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
            Method::Delete => self.client.delete(&request.url),
        };
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!("{:?} {}", request.method, request.url);
        let response = builder
            .send()
            .await
            .map_err(|e| ScantonError::Network(format!("{}: {}", request.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            warn!("{:?} {} returned {}", request.method, request.url, status);
            return Err(ScantonError::Http {
                status: status.as_u16(),
                url: request.url.clone(),
            });
        }
        Ok(response)
    }
}

#[async_trait(?Send)]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, ScantonError> {
        let response = self.execute(&request).await?;
        let text = response
            .text()
            .await
            .map_err(|e| ScantonError::Network(format!("Failed to read body from {}: {}", request.url, e)))?;

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| ScantonError::Decode(format!("{}: {}", request.url, e)))
    }

    async fn stream(
        &self,
        request: ApiRequest,
        on_chunk: &mut (dyn for<'c> FnMut(&'c [u8])),
    ) -> Result<(), ScantonError> {
        let response = self.execute(&request).await?;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk
                .map_err(|e| ScantonError::Network(format!("Stream from {} broke: {}", request.url, e)))?;
            on_chunk(&chunk);
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use std::cell::RefCell;

    use super::*;

    #[derive(Debug, Clone)]
    pub enum Reply {
        Json(Value),
        Status(u16),
        Chunks(Vec<String>),
    }

    /// Routes are matched in insertion order against the URL path suffix.
    /// Unmatched requests fail with a 404.
    #[derive(Default)]
    pub struct MockTransport {
        routes: RefCell<Vec<(Method, String, Reply)>>,
        calls: RefCell<Vec<ApiRequest>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn on(self, method: Method, path: &str, reply: Reply) -> Self {
            self.routes
                .borrow_mut()
                .push((method, path.to_string(), reply));
            self
        }

        pub fn calls(&self) -> Vec<ApiRequest> {
            self.calls.borrow().clone()
        }

        pub fn count(&self, method: Method) -> usize {
            self.calls
                .borrow()
                .iter()
                .filter(|c| c.method == method)
                .count()
        }

        fn reply_for(&self, request: &ApiRequest) -> Option<Reply> {
            self.calls.borrow_mut().push(request.clone());
            let path = request.url.split('?').next().unwrap_or_default();
            self.routes
                .borrow()
                .iter()
                .find(|(m, p, _)| *m == request.method && path.ends_with(p.as_str()))
                .map(|(_, _, r)| r.clone())
        }
    }

    #[async_trait(?Send)]
    impl Transport for MockTransport {
        async fn send(&self, request: ApiRequest) -> Result<Value, ScantonError> {
            match self.reply_for(&request) {
                Some(Reply::Json(v)) => Ok(v),
                Some(Reply::Status(status)) => Err(ScantonError::Http {
                    status,
                    url: request.url,
                }),
                Some(Reply::Chunks(_)) | None => Err(ScantonError::Http {
                    status: 404,
                    url: request.url,
                }),
            }
        }

        async fn stream(
            &self,
            request: ApiRequest,
            on_chunk: &mut (dyn for<'c> FnMut(&'c [u8])),
        ) -> Result<(), ScantonError> {
            match self.reply_for(&request) {
                Some(Reply::Chunks(chunks)) => {
                    for c in chunks {
                        on_chunk(c.as_bytes());
                    }
                    Ok(())
                }
                Some(Reply::Status(status)) => Err(ScantonError::Http {
                    status,
                    url: request.url,
                }),
                _ => Err(ScantonError::Http {
                    status: 404,
                    url: request.url,
                }),
            }
        }
    }
}
