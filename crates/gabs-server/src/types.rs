//! Tool/resource shapes and the handler abstraction (§4.4, §9 "Dynamic
//! polymorphism over handlers": handlers are uniform `(args) -> result`
//! closures, not a class hierarchy).

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// `(args) -> result`, installed identically whether it forwards to a GP
/// connection or implements a built-in `games.*` tool.
pub type ToolHandler = Arc<dyn Fn(Value) -> BoxFuture<ToolResult> + Send + Sync>;

/// `() -> result`; registered once per resource URI.
pub type ResourceHandler = Arc<dyn Fn() -> BoxFuture<ResourceResult> + Send + Sync>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "inputSchema", default = "default_input_schema")]
    pub input_schema: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ToolMeta>,
}

fn default_input_schema() -> Value {
    serde_json::json!({ "type": "object" })
}

/// Carries the pre-normalization name (§3 "Store the original name in
/// `meta.originalName`") so an agent can recover it after namespacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolMeta {
    #[serde(rename = "originalName")]
    pub original_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub uri: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "mimeType", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text { text: String },
}

/// A `tools/call` result. Semantic tool failures are `isError: true`
/// successful responses, never JSON-RPC errors (§7 "Propagation policy").
#[derive(Debug, Clone, Serialize)]
pub struct ToolResult {
    pub content: Vec<ContentBlock>,
    #[serde(rename = "isError")]
    pub is_error: bool,
    #[serde(rename = "structuredContent", skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
}

impl ToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text { text: text.into() }],
            is_error: false,
            structured_content: None,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text { text: text.into() }],
            is_error: true,
            structured_content: None,
        }
    }

    pub fn structured(text: Option<String>, structured: Value) -> Self {
        Self {
            content: text.into_iter().map(|t| ContentBlock::Text { text: t }).collect(),
            is_error: false,
            structured_content: Some(structured),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceContent {
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceResult {
    pub contents: Vec<ResourceContent>,
}
