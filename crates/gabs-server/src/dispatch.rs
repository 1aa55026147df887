//! AP method dispatch (§4.4 "AP methods dispatched").

use gabs_protocol::{ApErrorCode, ErrorObject, JsonRpcRequest, JsonRpcResponse, RpcId};
use serde_json::{json, Value};

use crate::registries::Registries;

const PROTOCOL_VERSION: &str = "2024-11-05";

pub async fn dispatch(registries: &Registries, request: JsonRpcRequest) -> JsonRpcResponse {
    match request.method.as_str() {
        "initialize" => JsonRpcResponse::ok(
            request.id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": { "listChanged": true },
                    "resources": { "listChanged": true, "subscribe": false },
                },
                "serverInfo": { "name": "gabs", "version": env!("CARGO_PKG_VERSION") },
            }),
        ),

        "tools/list" => {
            let tools = registries.tools_snapshot();
            JsonRpcResponse::ok(request.id, json!({ "tools": tools }))
        }

        "tools/call" => dispatch_tools_call(registries, request).await,

        "resources/list" => {
            let resources = registries.resources_snapshot();
            JsonRpcResponse::ok(request.id, json!({ "resources": resources }))
        }

        "resources/read" => dispatch_resources_read(registries, request).await,

        _ => method_not_found(request.id),
    }
}

async fn dispatch_tools_call(registries: &Registries, request: JsonRpcRequest) -> JsonRpcResponse {
    let params = request.params.clone().unwrap_or(Value::Null);
    let name = match params.get("name").and_then(Value::as_str) {
        Some(name) => name.to_string(),
        None => return invalid_params(request.id, "tools/call requires a string `name`"),
    };
    let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

    let handler = registries.tool_handler(&name);
    match handler {
        Some(handler) => {
            let result = handler(arguments).await;
            JsonRpcResponse::ok(
                request.id,
                serde_json::to_value(result).expect("ToolResult always serializes"),
            )
        }
        None => JsonRpcResponse::err(
            request.id,
            ErrorObject::new(ApErrorCode::UnknownMethod.code(), format!("unknown tool `{name}`")),
        ),
    }
}

async fn dispatch_resources_read(registries: &Registries, request: JsonRpcRequest) -> JsonRpcResponse {
    let params = request.params.clone().unwrap_or(Value::Null);
    let uri = match params.get("uri").and_then(Value::as_str) {
        Some(uri) => uri.to_string(),
        None => return invalid_params(request.id, "resources/read requires a string `uri`"),
    };

    match registries.resource_handler(&uri) {
        Some(handler) => {
            let result = handler().await;
            JsonRpcResponse::ok(
                request.id,
                serde_json::to_value(result).expect("ResourceResult always serializes"),
            )
        }
        None => JsonRpcResponse::err(
            request.id,
            ErrorObject::new(ApErrorCode::UnknownMethod.code(), format!("unknown resource `{uri}`")),
        ),
    }
}

fn invalid_params(id: RpcId, message: impl Into<String>) -> JsonRpcResponse {
    JsonRpcResponse::err(id, ErrorObject::new(ApErrorCode::InvalidParams.code(), message))
}

fn method_not_found(id: RpcId) -> JsonRpcResponse {
    JsonRpcResponse::err(id, ErrorObject::new(ApErrorCode::UnknownMethod.code(), "unknown method"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ToolDescriptor, ToolResult};
    use std::sync::Arc;

    #[tokio::test]
    async fn unknown_method_returns_minus_32601() {
        let registries = Registries::new(None);
        let request = JsonRpcRequest::new(RpcId::Number(1), "not/a/method", None);
        let response = dispatch(&registries, request).await;
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn tools_call_to_unknown_tool_is_a_jsonrpc_error_not_an_is_error_result() {
        let registries = Registries::new(None);
        let request = JsonRpcRequest::new(
            RpcId::Number(1),
            "tools/call",
            Some(json!({ "name": "nope", "arguments": {} })),
        );
        let response = dispatch(&registries, request).await;
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn tools_call_invokes_the_registered_handler() {
        let registries = Registries::new(None);
        registries.register_tool(
            None,
            ToolDescriptor {
                name: "echo".to_string(),
                description: String::new(),
                input_schema: json!({}),
                meta: None,
            },
            Arc::new(|args| Box::pin(async move { ToolResult::text(args["msg"].as_str().unwrap_or("").to_string()) })),
        );

        let request = JsonRpcRequest::new(
            RpcId::Number(2),
            "tools/call",
            Some(json!({ "name": "echo", "arguments": { "msg": "hi" } })),
        );
        let response = dispatch(&registries, request).await;
        let result = response.result.unwrap();
        assert_eq!(result["content"][0]["text"], "hi");
        assert_eq!(result["isError"], false);
    }

    #[tokio::test]
    async fn initialize_advertises_list_changed_capabilities() {
        let registries = Registries::new(None);
        let request = JsonRpcRequest::new(RpcId::Number(1), "initialize", None);
        let response = dispatch(&registries, request).await;
        let result = response.result.unwrap();
        assert_eq!(result["capabilities"]["tools"]["listChanged"], true);
        assert_eq!(result["capabilities"]["resources"]["subscribe"], false);
    }
}
