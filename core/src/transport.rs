//! Pluggable executor for `HttpRequest` values.
//!
//! `Fetcher` is generic over this trait so tests can script responses and
//! hosts can bring their own HTTP stack. The reqwest implementation is
//! behind the default `reqwest` feature.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes one request and returns the response as plain data.
///
/// Any status code, including 4xx/5xx, is a successful execution; an `Err`
/// means no response was received at all. Implementations must not retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request).await
    }
}

#[cfg(feature = "reqwest")]
pub use self::reqwest_transport::ReqwestTransport;

#[cfg(feature = "reqwest")]
mod reqwest_transport {
    use std::error::Error as _;

    use async_trait::async_trait;

    use crate::config::ClientConfig;
    use crate::error::{TransportError, TransportErrorKind};
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    use super::Transport;

    /// `Transport` backed by a pooled [`reqwest::Client`].
    #[derive(Debug, Clone)]
    pub struct ReqwestTransport {
        client: reqwest::Client,
    }

    impl ReqwestTransport {
        pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
            let client = reqwest::Client::builder()
                .timeout(config.request_timeout)
                .connect_timeout(config.connect_timeout)
                .user_agent(config.user_agent.clone())
                .build()
                .map_err(|e| TransportError::other(describe(&e)))?;
            Ok(Self { client })
        }

        /// Reuse an existing client, e.g. to share its connection pool.
        pub fn with_client(client: reqwest::Client) -> Self {
            Self { client }
        }
    }

    #[async_trait]
    impl Transport for ReqwestTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            let mut builder = match request.method {
                HttpMethod::Get => self.client.get(&request.url),
            };
            for (key, value) in &request.headers {
                builder = builder.header(key.as_str(), value.as_str());
            }

            let response = builder.send().await.map_err(classify)?;
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
                .collect();
            let body = response.text().await.map_err(classify)?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }

    fn classify(err: reqwest::Error) -> TransportError {
        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_connect() {
            TransportErrorKind::Connect
        } else {
            TransportErrorKind::Other
        };
        TransportError::new(kind, describe(&err))
    }

    /// reqwest's top-level message hides the useful part ("connection
    /// refused") in the source chain.
    fn describe(err: &reqwest::Error) -> String {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}
