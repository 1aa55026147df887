//! Wire-level building blocks shared by the GABS bridge.
//!
//! This crate has no knowledge of games, mods, or agents. It only knows how
//! to shape and frame JSON-RPC messages for the two protocols the bridge
//! speaks (Agent Protocol and Game Protocol) and how to turn an arbitrary
//! mod-supplied tool name into a conservative agent-facing identifier.

pub mod envelope;
pub mod error;
pub mod framing;
pub mod ids;
pub mod normalize;

pub use envelope::{
    ErrorObject, GpEvent, JsonRpcMessage, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse,
    RpcId, JSONRPC_VERSION,
};
pub use error::{ApErrorCode, ProtocolError};
pub use framing::{read_frame, write_frame, MAX_FRAME_BYTES};
pub use ids::new_request_id;
pub use normalize::{normalize_tool_name, NormalizeConfig, DEFAULT_MAX_LENGTH};
