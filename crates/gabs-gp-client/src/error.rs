use thiserror::Error;

/// GP client errors (§7 taxonomy items 7-9).
#[derive(Debug, Error)]
pub enum GpClientError {
    #[error("malformed backoff spec `{0}`, expected `<min>..<max>` with durations like `250ms`/`5s` or `inf` for max")]
    BadBackoffSpec(String),

    #[error("failed to connect to 127.0.0.1:{port} after {attempts} attempts: {source}")]
    ConnectExhausted {
        port: u16,
        attempts: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("handshake failed: {0}")]
    HandshakeFailed(String),

    #[error("request `{method}` timed out after {elapsed_secs}s")]
    Timeout { method: String, elapsed_secs: u64 },

    #[error("mod returned error {code}: {message}")]
    RequestError { code: i64, message: String },

    #[error("connection closed")]
    Closed,

    #[error(transparent)]
    Protocol(#[from] gabs_protocol::ProtocolError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
