//! Map image fetcher.

use std::future::Future;

use tracing::{debug, info};

use super::client::ImageClient;
use super::error::FetchError;
use super::request::MapRequest;
use crate::time::CacheBuster;

/// A downloaded map image and the request that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct MapImage {
    pub data: Vec<u8>,
    pub request: MapRequest,
}

/// Issues image requests against one image service.
pub struct MapFetcher<C> {
    client: C,
    base_url: String,
    cache_buster: CacheBuster,
}

impl<C: ImageClient> MapFetcher<C> {
    pub fn new(client: C, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            cache_buster: CacheBuster::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch one image.
    ///
    /// `on_content_length` receives the declared `Content-Length` as soon
    /// as the response head arrives, whether or not the request ultimately
    /// succeeds. The body is not read until its future completes.
    pub async fn fetch<F, Fut>(
        &self,
        request: &MapRequest,
        on_content_length: F,
    ) -> Result<MapImage, FetchError>
    where
        F: FnOnce(u64) -> Fut + Send,
        Fut: Future<Output = ()> + Send,
    {
        let url = request.url(&self.base_url, self.cache_buster.next());
        debug!(url = %url, "Requesting map image");

        let response = self.client.get(&url).await?;
        if let Some(length) = response.content_length {
            on_content_length(length).await;
        }

        if !response.is_success() {
            return Err(FetchError::Status {
                status: response.status,
            });
        }

        let data = response.bytes().await?;
        info!(
            lat = request.position.latitude,
            lon = request.position.longitude,
            hdg = request.heading,
            zoom = request.zoom,
            bytes = data.len(),
            "Map image received"
        );

        Ok(MapImage {
            data,
            request: *request,
        })
    }
}
