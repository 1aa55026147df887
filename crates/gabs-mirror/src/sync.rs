//! `SyncTools` and `ExposeResources` (§4.5).

use std::sync::Arc;

use gabs_gp_client::GpClient;
use gabs_server::{ResourceContent, ResourceDescriptor, ResourceResult, Registries, ToolDescriptor, ToolMeta, ToolResult};
use serde_json::{json, Value};

use crate::error::MirrorError;
use crate::ring_buffer::EventLog;

/// Fetch GP `tools/list`, namespace and register each tool, and broadcast
/// `tools/list_changed` once if anything was registered. Returns the
/// number of tools synced.
pub async fn sync_tools(game_id: &str, gp: &Arc<GpClient>, registries: &Arc<Registries>) -> Result<usize, MirrorError> {
    let response = gp.request("tools/list", json!({})).await?;
    let tools = response.get("tools").and_then(Value::as_array).cloned().unwrap_or_default();

    let mut synced = 0;
    for tool in tools {
        let Some(original_name) = tool.get("name").and_then(Value::as_str).map(str::to_string) else {
            continue;
        };
        let namespaced = format!("{game_id}.{}", original_name.replace('/', "."));
        let descriptor = ToolDescriptor {
            name: namespaced,
            description: tool
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            input_schema: tool.get("inputSchema").cloned().unwrap_or_else(|| json!({ "type": "object" })),
            meta: Some(ToolMeta {
                original_name: original_name.clone(),
            }),
        };

        let gp = Arc::clone(gp);
        let original_name = original_name.clone();
        registries.register_tool(
            Some(game_id),
            descriptor,
            Arc::new(move |args| {
                let gp = Arc::clone(&gp);
                let original_name = original_name.clone();
                Box::pin(async move { forward_call(&gp, &original_name, args).await })
            }),
        );
        synced += 1;
    }

    if synced > 0 {
        registries.broadcast_list_changed("tools/list_changed");
    }
    Ok(synced)
}

/// Forward a tool call to the mod, mapping its result into an AP tool
/// result. GP-level errors are reported as `isError: true`, never as
/// JSON-RPC errors (§7 "Propagation policy").
async fn forward_call(gp: &GpClient, original_name: &str, arguments: Value) -> ToolResult {
    let params = json!({ "name": original_name, "parameters": arguments });
    match gp.request("tools/call", params).await {
        Ok(value) => map_gp_result(value),
        Err(err) => ToolResult::error(err.to_string()),
    }
}

/// The mod's structured return value becomes `structuredContent` on the AP
/// result, with its `text` field (if present) as the first text block
/// (scenario 5).
fn map_gp_result(value: Value) -> ToolResult {
    let text = value.get("text").and_then(Value::as_str).map(str::to_string);
    ToolResult::structured(text, value)
}

/// Register `gab://<gameId>/events/logs`, backed by `event_log`, and
/// broadcast `resources/list_changed`.
pub fn expose_resources(game_id: &str, event_log: Arc<EventLog>, registries: &Arc<Registries>) {
    let uri = format!("gab://{game_id}/events/logs");
    let descriptor = ResourceDescriptor {
        uri: uri.clone(),
        name: format!("{game_id} event log"),
        description: Some("Most recent events observed on this game's GP connection".to_string()),
        mime_type: Some("application/json".to_string()),
    };

    registries.register_resource(
        Some(game_id),
        descriptor,
        Arc::new(move || {
            let event_log = Arc::clone(&event_log);
            let uri = uri.clone();
            Box::pin(async move {
                let events = event_log.snapshot();
                let text = serde_json::to_string(&events).unwrap_or_default();
                ResourceResult {
                    contents: vec![ResourceContent {
                        uri,
                        text: Some(text),
                        mime_type: Some("application/json".to_string()),
                    }],
                }
            })
        }),
    );
    registries.broadcast_list_changed("resources/list_changed");
}
