//! The single reader/writer lock guarding every registry (§4.4, §5
//! "Shared-resource policy"). Handler invocation always happens after the
//! lock is released.

use std::collections::HashMap;

use gabs_protocol::{normalize_tool_name, NormalizeConfig};
use parking_lot::RwLock;
use tokio::sync::mpsc::UnboundedSender;

use crate::types::{ResourceDescriptor, ResourceHandler, ToolDescriptor, ToolHandler};

struct ToolEntry {
    descriptor: ToolDescriptor,
    handler: ToolHandler,
}

struct ResourceEntry {
    descriptor: ResourceDescriptor,
    handler: ResourceHandler,
}

/// One outbound frame writer per active agent connection, used to
/// broadcast `*_list_changed` notifications (§4.4).
pub type FrameWriter = UnboundedSender<serde_json::Value>;

#[derive(Default)]
struct Inner {
    tools: HashMap<String, ToolEntry>,
    resources: HashMap<String, ResourceEntry>,
    game_tools: HashMap<String, Vec<String>>,
    game_resources: HashMap<String, Vec<String>>,
    writers: Vec<FrameWriter>,
}

#[derive(Default)]
pub struct Registries {
    inner: RwLock<Inner>,
    normalize: Option<NormalizeConfig>,
}

impl Registries {
    pub fn new(normalize: Option<NormalizeConfig>) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            normalize,
        }
    }

    pub fn add_writer(&self, writer: FrameWriter) {
        self.inner.write().writers.push(writer);
    }

    /// Register a tool, optionally under a game, applying normalization if
    /// configured. Overwrites an existing entry of the same name
    /// (last-writer-wins within a game context, §4.4).
    pub fn register_tool(&self, game_id: Option<&str>, descriptor: ToolDescriptor, handler: ToolHandler) -> String {
        let name = self.normalize_name(&descriptor.name);
        let mut descriptor = descriptor;
        descriptor.name = name.clone();

        let mut inner = self.inner.write();
        inner.tools.insert(name.clone(), ToolEntry { descriptor, handler });
        if let Some(game_id) = game_id {
            inner.game_tools.entry(game_id.to_string()).or_default().push(name.clone());
        }
        name
    }

    pub fn register_resource(&self, game_id: Option<&str>, descriptor: ResourceDescriptor, handler: ResourceHandler) {
        let uri = descriptor.uri.clone();
        let mut inner = self.inner.write();
        inner.resources.insert(uri.clone(), ResourceEntry { descriptor, handler });
        if let Some(game_id) = game_id {
            inner.game_resources.entry(game_id.to_string()).or_default().push(uri);
        }
    }

    fn normalize_name(&self, name: &str) -> String {
        match self.normalize {
            Some(config) => normalize_tool_name(name, config),
            None => name.to_string(),
        }
    }

    pub fn tools_snapshot(&self) -> Vec<ToolDescriptor> {
        self.inner.read().tools.values().map(|e| e.descriptor.clone()).collect()
    }

    pub fn resources_snapshot(&self) -> Vec<ResourceDescriptor> {
        self.inner.read().resources.values().map(|e| e.descriptor.clone()).collect()
    }

    /// Tool names belonging to `game_id` (prefix match on `<gameId>.`), or
    /// every tool if `game_id` is `None` (§4.4 `games.tools`).
    pub fn game_tool_names(&self, game_id: Option<&str>) -> Vec<String> {
        let inner = self.inner.read();
        match game_id {
            Some(id) => inner.game_tools.get(id).cloned().unwrap_or_default(),
            None => inner.tools.keys().cloned().collect(),
        }
    }

    pub fn tool_handler(&self, name: &str) -> Option<ToolHandler> {
        self.inner.read().tools.get(name).map(|e| e.handler.clone())
    }

    pub fn resource_handler(&self, uri: &str) -> Option<ResourceHandler> {
        self.inner.read().resources.get(uri).map(|e| e.handler.clone())
    }

    /// Remove every tool/resource tracked under `game_id`. Returns
    /// `(tools_removed, resources_removed)` so the caller knows which
    /// `*_list_changed` notifications to emit (§4.5 "Cleanup on game
    /// stop").
    pub fn cleanup_game_resources(&self, game_id: &str) -> (bool, bool) {
        let mut inner = self.inner.write();
        let tool_names = inner.game_tools.remove(game_id).unwrap_or_default();
        for name in &tool_names {
            inner.tools.remove(name);
        }
        let resource_uris = inner.game_resources.remove(game_id).unwrap_or_default();
        for uri in &resource_uris {
            inner.resources.remove(uri);
        }
        (!tool_names.is_empty(), !resource_uris.is_empty())
    }

    /// Broadcast a `*_list_changed` notification to every writer. Dead
    /// writers (their connection closed) are pruned.
    pub fn broadcast_list_changed(&self, method: &str) {
        let mut inner = self.inner.write();
        let notification = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
        });
        inner.writers.retain(|writer| writer.send(notification.clone()).is_ok());
    }
}
