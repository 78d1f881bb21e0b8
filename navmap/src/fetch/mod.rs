//! Map image fetching.
//!
//! [`MapFetcher`] builds the image service URL for a [`MapRequest`], reports
//! the declared response size for traffic accounting and returns the image
//! bytes. Failures are returned to the caller; nothing is retried here.

mod client;
mod error;
mod fetcher;
mod request;

pub use client::{ImageClient, ImageResponse, ReqwestImageClient, DEFAULT_REQUEST_TIMEOUT};
pub use error::FetchError;
pub use fetcher::{MapFetcher, MapImage};
pub use request::{MapRequest, DEFAULT_BASE_URL, IMAGE_PATH};
