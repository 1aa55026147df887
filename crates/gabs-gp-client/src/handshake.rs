//! `session/hello` / `session/welcome` shapes (§4.3, §6).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HelloParams {
    pub token: String,
    #[serde(rename = "bridgeVersion")]
    pub bridge_version: String,
    pub platform: String,
    #[serde(rename = "launchId")]
    pub launch_id: String,
    #[serde(rename = "clientInfo")]
    pub client_info: ClientInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Capabilities {
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default)]
    pub events: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub limits: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Welcome {
    #[serde(rename = "agentId")]
    pub agent_id: String,
    pub capabilities: Capabilities,
    #[serde(rename = "schemaVersion")]
    pub schema_version: Option<String>,
    #[serde(rename = "serverInfo")]
    pub server_info: Option<serde_json::Value>,
}
