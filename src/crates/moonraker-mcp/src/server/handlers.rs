//! HTTP handlers for the MCP endpoint and health check

use super::protocol::{
    CallToolResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse, ToolCallParams,
    JSONRPC_VERSION, PROTOCOL_VERSION, SERVER_NAME,
};
use super::AppState;
use crate::tools::ToolRegistry;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tracing::{debug, info};

/// Handler for GET /health
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Handler for POST /mcp
///
/// Notifications get 202 with an empty body; everything else gets a
/// JSON-RPC response, including protocol errors.
pub async fn mcp(State(state): State<AppState>, body: Bytes) -> Response {
    let value: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(err) => {
            return Json(JsonRpcResponse::error(Value::Null, JsonRpcError::parse_error(err)))
                .into_response()
        }
    };

    let request: JsonRpcRequest = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(err) => {
            return Json(JsonRpcResponse::error(
                Value::Null,
                JsonRpcError::invalid_request(format!("Invalid request: {}", err)),
            ))
            .into_response()
        }
    };

    match handle_request(&state.registry, request).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Route one JSON-RPC request; `None` for notifications
pub async fn handle_request(
    registry: &ToolRegistry,
    request: JsonRpcRequest,
) -> Option<JsonRpcResponse> {
    let Some(id) = request.id.clone() else {
        debug!(method = %request.method, "Notification received");
        return None;
    };

    if request.jsonrpc != JSONRPC_VERSION {
        return Some(JsonRpcResponse::error(
            id,
            JsonRpcError::invalid_request(format!(
                "Unsupported jsonrpc version '{}'",
                request.jsonrpc
            )),
        ));
    }

    let response = match request.method.as_str() {
        "initialize" => JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {"tools": {}},
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        ),

        "ping" => JsonRpcResponse::success(id, json!({})),

        "tools/list" => JsonRpcResponse::success(id, json!({"tools": registry.definitions()})),

        "tools/call" => {
            let params: ToolCallParams = match request.params.map(serde_json::from_value) {
                Some(Ok(params)) => params,
                Some(Err(err)) => {
                    return Some(JsonRpcResponse::error(
                        id,
                        JsonRpcError::invalid_params(format!("Invalid tools/call params: {}", err)),
                    ))
                }
                None => {
                    return Some(JsonRpcResponse::error(
                        id,
                        JsonRpcError::invalid_params("Missing params for tools/call"),
                    ))
                }
            };

            info!(tool = %params.name, "Tool call");
            let arguments = params.arguments.unwrap_or(Value::Null);
            let result = registry.call(&params.name, &arguments).await;
            let payload = CallToolResult::from(&result);

            match serde_json::to_value(payload) {
                Ok(value) => JsonRpcResponse::success(id, value),
                Err(err) => JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params(format!("Unserializable tool result: {}", err)),
                ),
            }
        }

        other => JsonRpcResponse::error(id, JsonRpcError::method_not_found(other)),
    };

    Some(response)
}
