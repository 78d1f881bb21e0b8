use thiserror::Error;

/// Errors surfaced by the sentence transport.
///
/// Link failures never stop the session; they are logged and the link
/// reconnects. Only endpoint validation and a stopped driver reach callers.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid transport endpoint '{host}:{port}'")]
    InvalidEndpoint { host: String, port: u16 },

    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },

    #[error("websocket stream error: {0}")]
    Stream(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("transport task has stopped")]
    Stopped,
}

/// Builds the `ws://host:port` URL of a sentence stream.
pub fn endpoint_url(host: &str, port: u16) -> Result<String, TransportError> {
    let host = host.trim();
    if host.is_empty() || port == 0 || host.contains(['/', ' ']) {
        return Err(TransportError::InvalidEndpoint {
            host: host.to_string(),
            port,
        });
    }
    Ok(format!("ws://{}:{}", host, port))
}
