//! Tool/resource registries, AP dispatch, and the stdio/HTTP transports
//! (§4.4). Orchestrating actual games is out of this crate's reach by
//! design: it depends only on [`gabs_protocol`] and [`gabs_config`], and
//! calls into [`orchestrator::GameOrchestrator`] for everything that would
//! otherwise pull in the process controller, the GP client, or the mirror.

mod builtins;
mod dispatch;
mod orchestrator;
mod registries;
mod transport;
mod types;

use std::sync::Arc;

pub use builtins::register_builtin_tools;
pub use dispatch::dispatch;
pub use orchestrator::{GameDetail, GameOrchestrator, GameStatus, GameSummary, OrchestratorError};
pub use registries::{FrameWriter, Registries};
pub use transport::http::router as http_router;
pub use transport::stdio::serve_stdio;
pub use types::{
    BoxFuture, ContentBlock, ResourceContent, ResourceDescriptor, ResourceHandler, ResourceResult, ToolDescriptor,
    ToolHandler, ToolMeta, ToolResult,
};

pub use gabs_protocol::NormalizeConfig;

/// Bundles a registry with the builtins already registered against it. The
/// binary crate wraps this in whatever it needs for GP-mirrored tools
/// (see `gabs-mirror`) and for wiring transports.
pub struct Server {
    pub registries: Arc<Registries>,
}

impl Server {
    pub fn new(normalize: Option<NormalizeConfig>, orchestrator: Arc<dyn GameOrchestrator>) -> Self {
        let registries = Arc::new(Registries::new(normalize));
        register_builtin_tools(&registries, orchestrator);
        Self { registries }
    }
}
