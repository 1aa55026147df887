//! AP-level JSON-RPC error codes and the crate's own error type.

use thiserror::Error;

/// JSON-RPC error codes the bridge returns on its Agent Protocol surface (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApErrorCode {
    InvalidRequest,
    UnknownMethod,
    InvalidParams,
    HandlerException,
}

impl ApErrorCode {
    pub const fn code(self) -> i64 {
        match self {
            ApErrorCode::InvalidRequest => -32600,
            ApErrorCode::UnknownMethod => -32601,
            ApErrorCode::InvalidParams => -32602,
            ApErrorCode::HandlerException => -32603,
        }
    }
}

/// Errors surfaced while framing or parsing protocol messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("frame exceeded maximum size of {max} bytes")]
    FrameTooLarge { max: usize },

    #[error("connection closed before a complete frame was read")]
    ConnectionClosed,

    #[error("malformed JSON frame: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
