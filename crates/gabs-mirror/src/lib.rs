//! Bridges one GP client (one game) to the AP registry: fetches the mod's
//! tools, registers them under a game-scoped namespace, forwards
//! invocations, exposes a per-game event-log resource, and reconnects in
//! the background when the connection drops (§4.5).

mod error;
mod mirror;
mod reconnect;
mod ring_buffer;
mod sync;

pub use error::MirrorError;
pub use mirror::Mirror;
pub use ring_buffer::{EventLog, DEFAULT_CAPACITY};
pub use sync::{expose_resources, sync_tools};
