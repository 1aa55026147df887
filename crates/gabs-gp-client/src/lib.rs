//! The Game Protocol client: one duplex connection per live game to the
//! mod's loopback socket (§4.3).

mod backoff;
mod client;
mod error;
mod handshake;

pub use backoff::BackoffConfig;
pub use client::{EventHandler, GpClient, LaunchIdentity};
pub use error::GpClientError;
pub use handshake::{Capabilities, ClientInfo, HelloParams, Welcome};

pub use gabs_protocol::GpEvent;
