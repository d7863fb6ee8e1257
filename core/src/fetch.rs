//! Async fetch operations: build, execute, parse.
//!
//! `Fetcher` owns an immutable `CatalogClient` and a `Transport` and nothing
//! else, so one instance can serve any number of concurrent callers. Each
//! call is a single request/response exchange with no retry.

use tokio_util::sync::CancellationToken;

use crate::client::CatalogClient;
use crate::error::CatalogError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{Character, PageEnvelope};

#[cfg(feature = "reqwest")]
use crate::config::ClientConfig;
#[cfg(feature = "reqwest")]
use crate::transport::ReqwestTransport;

#[derive(Debug, Clone)]
pub struct Fetcher<T> {
    client: CatalogClient,
    transport: T,
}

#[cfg(feature = "reqwest")]
impl Fetcher<ReqwestTransport> {
    /// Fetcher talking to `config.base_url` over reqwest.
    pub fn from_config(config: &ClientConfig) -> Result<Self, CatalogError> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::new(CatalogClient::from_config(config), transport))
    }
}

impl<T: Transport> Fetcher<T> {
    pub fn new(client: CatalogClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &CatalogClient {
        &self.client
    }

    /// Fetch one page of characters; `None` means the first page.
    pub async fn fetch_page(&self, page: Option<i64>) -> Result<PageEnvelope, CatalogError> {
        self.page(page, None).await
    }

    pub async fn fetch_by_id(&self, id: i64) -> Result<Character, CatalogError> {
        self.by_id(id, None).await
    }

    /// Like [`fetch_page`](Self::fetch_page), but fails with `Cancelled` as
    /// soon as `cancel` fires.
    pub async fn fetch_page_with_cancel(
        &self,
        page: Option<i64>,
        cancel: &CancellationToken,
    ) -> Result<PageEnvelope, CatalogError> {
        self.page(page, Some(cancel)).await
    }

    pub async fn fetch_by_id_with_cancel(
        &self,
        id: i64,
        cancel: &CancellationToken,
    ) -> Result<Character, CatalogError> {
        self.by_id(id, Some(cancel)).await
    }

    #[tracing::instrument(level = "debug", skip(self, cancel))]
    async fn page(
        &self,
        page: Option<i64>,
        cancel: Option<&CancellationToken>,
    ) -> Result<PageEnvelope, CatalogError> {
        let request = self.client.build_fetch_page(page)?;
        let response = self.send(request, cancel).await?;
        self.client.parse_fetch_page(response)
    }

    #[tracing::instrument(level = "debug", skip(self, cancel))]
    async fn by_id(
        &self,
        id: i64,
        cancel: Option<&CancellationToken>,
    ) -> Result<Character, CatalogError> {
        let request = self.client.build_fetch_by_id(id)?;
        let response = self.send(request, cancel).await?;
        self.client.parse_fetch_by_id(id, response)
    }

    async fn send(
        &self,
        request: HttpRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<HttpResponse, CatalogError> {
        tracing::debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let Some(cancel) = cancel else {
            return Ok(self.transport.execute(request).await?);
        };
        if cancel.is_cancelled() {
            return Err(CatalogError::Cancelled);
        }
        // Dropping the transport future aborts the in-flight request.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("fetch cancelled");
                Err(CatalogError::Cancelled)
            }
            result = self.transport.execute(request) => {
                let response = result?;
                tracing::debug!(status = response.status, "received response");
                Ok(response)
            }
        }
    }
}
