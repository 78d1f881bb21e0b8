//! HTTP client abstraction for testability.
//!
//! [`ImageClient`] separates the response head from the body so that the
//! declared `Content-Length` can be accounted before the body is read.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use reqwest::header::CONTENT_LENGTH;
use tracing::{debug, trace, warn};

use super::error::FetchError;

/// Default timeout for a complete image request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("navmap/", env!("CARGO_PKG_VERSION"));

/// Response head plus a deferred body.
pub struct ImageResponse {
    pub status: u16,
    /// Declared `Content-Length`, if the header was present and numeric
    pub content_length: Option<u64>,
    body: BoxFuture<'static, Result<Vec<u8>, FetchError>>,
}

impl ImageResponse {
    pub fn new<F>(status: u16, content_length: Option<u64>, body: F) -> Self
    where
        F: Future<Output = Result<Vec<u8>, FetchError>> + Send + 'static,
    {
        Self {
            status,
            content_length,
            body: body.boxed(),
        }
    }

    /// A response whose body is already in memory.
    pub fn ready(status: u16, content_length: Option<u64>, data: Vec<u8>) -> Self {
        Self::new(status, content_length, async move { Ok(data) })
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Read the body.
    pub async fn bytes(self) -> Result<Vec<u8>, FetchError> {
        self.body.await
    }
}

impl fmt::Debug for ImageResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageResponse")
            .field("status", &self.status)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Trait for issuing image GET requests.
pub trait ImageClient: Send + Sync {
    /// Send a GET request and return once the response head has arrived.
    fn get(&self, url: &str) -> impl Future<Output = Result<ImageResponse, FetchError>> + Send;
}

/// Async HTTP client using reqwest.
#[derive(Clone)]
pub struct ReqwestImageClient {
    client: reqwest::Client,
}

impl ReqwestImageClient {
    /// Creates a client with the default request timeout.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

impl ImageClient for ReqwestImageClient {
    async fn get(&self, url: &str) -> Result<ImageResponse, FetchError> {
        trace!(url = url, "HTTP GET request starting");

        let response = match self.client.get(url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(
                    url = url,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    "HTTP request failed"
                );
                return Err(FetchError::Request(e.to_string()));
            }
        };

        let status = response.status().as_u16();
        let content_length = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        debug!(url = url, status, content_length, "HTTP response received");

        let body = async move {
            response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| FetchError::Body(e.to_string()))
        };

        Ok(ImageResponse::new(status, content_length, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ready_response() {
        let response = ImageResponse::ready(200, Some(3), vec![1, 2, 3]);
        assert!(response.is_success());
        assert_eq!(response.content_length, Some(3));
        assert_eq!(response.bytes().await.unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_status_classification() {
        assert!(!ImageResponse::ready(404, None, Vec::new()).is_success());
        assert!(!ImageResponse::ready(500, None, Vec::new()).is_success());
        assert!(ImageResponse::ready(204, None, Vec::new()).is_success());
    }

    #[test]
    fn test_reqwest_client_builds() {
        assert!(ReqwestImageClient::with_timeout(Duration::from_secs(5)).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_request_error() {
        let client = ReqwestImageClient::with_timeout(Duration::from_secs(2)).unwrap();
        // Port 9 (discard) on localhost is not expected to accept connections
        let result = client.get("http://127.0.0.1:9/get_image").await;
        assert!(matches!(result, Err(FetchError::Request(_))));
    }
}
