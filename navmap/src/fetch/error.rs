//! Error types for map image fetching.

use thiserror::Error;

/// Errors that can occur while fetching a map image.
///
/// None of these are fatal to a session: the previous image stays on
/// display and the next trigger simply issues a new request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The HTTP client could not be constructed.
    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    /// Connecting or sending the request failed.
    #[error("Request failed: {0}")]
    Request(String),

    /// The image service answered with a non-success status.
    #[error("HTTP {status} from image service")]
    Status { status: u16 },

    /// The response body could not be read.
    #[error("Failed to read image body: {0}")]
    Body(String),
}
