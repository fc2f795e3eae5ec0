//! MCP endpoint tests through the full router

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use common::{MockTransport, MockVisionModel, BASE_URL};
use moonraker_mcp::server::{create_router, SecurityState};
use moonraker_mcp::{ActionDispatcher, ToolRegistry, VisionAnalysisAdapter};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use utils::RemoteReply;

const TOKEN: &str = "test-token";

fn registry(transport: Arc<MockTransport>) -> ToolRegistry {
    let dispatcher = ActionDispatcher::new(transport.clone(), BASE_URL);
    let vision = VisionAnalysisAdapter::new(transport, BASE_URL)
        .with_model(Arc::new(MockVisionModel::answering("looks fine")));
    ToolRegistry::new(dispatcher, vision)
}

fn app(transport: Arc<MockTransport>, security: SecurityState) -> Router {
    create_router(registry(transport), security, Duration::from_secs(5))
}

fn printer_ready() -> Arc<MockTransport> {
    Arc::new(MockTransport::json(
        200,
        json!({"result": {"state": "ready", "state_message": "Printer is ready"}}),
    ))
}

fn rpc(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/mcp")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn test_health_is_open() {
    let app = app(printer_ready(), SecurityState::new(Some(TOKEN.into())));
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_token_required_when_configured() {
    let transport = printer_ready();
    let app = app(transport.clone(), SecurityState::new(Some(TOKEN.into())));
    let call = json!({
        "jsonrpc": "2.0", "id": 1, "method": "tools/call",
        "params": {"name": "get_printer_state", "arguments": {}}
    });

    let (status, body) = send(app.clone(), rpc(call.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
    assert_eq!(transport.call_count(), 0);

    let mut request = rpc(call);
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {}", TOKEN).parse().unwrap(),
    );
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["isError"], false);
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_open_gate() {
    let app = app(printer_ready(), SecurityState::open());
    let (status, body) = send(app, rpc(json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"jsonrpc": "2.0", "id": 1, "result": {}}));
}

#[tokio::test]
async fn test_initialize() {
    let app = app(printer_ready(), SecurityState::open());
    let (_, body) = send(
        app,
        rpc(json!({
            "jsonrpc": "2.0", "id": "init", "method": "initialize",
            "params": {"protocolVersion": "2024-11-05", "capabilities": {}}
        })),
    )
    .await;

    assert_eq!(body["id"], "init");
    assert_eq!(body["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(body["result"]["serverInfo"]["name"], "moonraker-mcp");
    assert!(body["result"]["capabilities"]["tools"].is_object());
}

#[tokio::test]
async fn test_tools_list() {
    let app = app(printer_ready(), SecurityState::open());
    let (_, body) = send(app, rpc(json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}))).await;

    let tools = body["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 22);

    let remove_job = tools.iter().find(|t| t["name"] == "remove_job").unwrap();
    assert_eq!(remove_job["inputSchema"]["type"], "object");
    assert!(remove_job["inputSchema"]["properties"]["job_ids"].is_object());

    let analyze = tools.iter().find(|t| t["name"] == "analyze_snapshot").unwrap();
    assert_eq!(analyze["inputSchema"]["required"], json!(["prompt"]));
}

#[tokio::test]
async fn test_tools_call_success() {
    let transport = printer_ready();
    let app = app(transport, SecurityState::open());
    let (_, body) = send(
        app,
        rpc(json!({
            "jsonrpc": "2.0", "id": 3, "method": "tools/call",
            "params": {"name": "get_printer_state", "arguments": {}}
        })),
    )
    .await;

    let result = &body["result"];
    assert_eq!(result["isError"], false);
    assert_eq!(result["structuredContent"]["state"], "ready");
    assert_eq!(result["content"][0]["type"], "text");

    let text: Value = serde_json::from_str(result["content"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(text, result["structuredContent"]);
}

#[tokio::test]
async fn test_tools_call_failure_is_tool_error() {
    let transport = Arc::new(MockTransport::json(200, json!({})));
    let app = app(transport, SecurityState::open());

    let (status, body) = send(
        app.clone(),
        rpc(json!({
            "jsonrpc": "2.0", "id": 4, "method": "tools/call",
            "params": {"name": "pause_print"}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("error").is_none());
    assert_eq!(body["result"]["isError"], true);
    assert_eq!(body["result"]["structuredContent"]["raw_response"], json!({}));

    let (_, body) = send(
        app,
        rpc(json!({
            "jsonrpc": "2.0", "id": 5, "method": "tools/call",
            "params": {"name": "greet", "arguments": {"name": "Ada"}}
        })),
    )
    .await;
    assert_eq!(body["result"]["isError"], true);
    assert_eq!(
        body["result"]["structuredContent"]["error"],
        "Unknown action 'greet'"
    );
}

#[tokio::test]
async fn test_analyze_snapshot_call() {
    let transport = Arc::new(MockTransport::new(Ok(
        RemoteReply::new(200, vec![0xff, 0xd8, 0xff]).with_content_type("image/jpeg")
    )));
    let app = app(transport, SecurityState::open());

    let (_, body) = send(
        app,
        rpc(json!({
            "jsonrpc": "2.0", "id": 6, "method": "tools/call",
            "params": {"name": "analyze_snapshot", "arguments": {"prompt": "Any spaghetti?"}}
        })),
    )
    .await;
    assert_eq!(
        body["result"]["structuredContent"],
        json!({"description": "looks fine"})
    );
}

#[tokio::test]
async fn test_protocol_errors() {
    let app = app(printer_ready(), SecurityState::open());

    let (_, body) = send(
        app.clone(),
        rpc(json!({"jsonrpc": "2.0", "id": 7, "method": "resources/list"})),
    )
    .await;
    assert_eq!(body["error"]["code"], -32601);
    assert_eq!(body["id"], 7);

    let request = Request::builder()
        .method("POST")
        .uri("/mcp")
        .body(Body::from("{not json"))
        .unwrap();
    let (_, body) = send(app.clone(), request).await;
    assert_eq!(body["error"]["code"], -32700);
    assert_eq!(body["id"], Value::Null);

    let (_, body) = send(app.clone(), rpc(json!({"jsonrpc": "2.0", "id": 8}))).await;
    assert_eq!(body["error"]["code"], -32600);

    let (_, body) = send(
        app,
        rpc(json!({"jsonrpc": "2.0", "id": 9, "method": "tools/call", "params": {"arguments": {}}})),
    )
    .await;
    assert_eq!(body["error"]["code"], -32602);
}

#[tokio::test]
async fn test_notification_accepted() {
    let transport = printer_ready();
    let app = app(transport.clone(), SecurityState::open());

    let (status, body) = send(
        app,
        rpc(json!({"jsonrpc": "2.0", "method": "notifications/initialized"})),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body, Value::Null);
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_null_id_is_answered() {
    let transport = Arc::new(MockTransport::json(200, json!({"result": "ok"})));
    let app = app(transport.clone(), SecurityState::open());

    let (status, body) = send(
        app,
        rpc(json!({
            "jsonrpc": "2.0", "id": null, "method": "tools/call",
            "params": {"name": "emergency_stop"}
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], Value::Null);
    assert!(body.get("id").is_some());
    assert_eq!(body["result"]["isError"], false);
    assert_eq!(transport.call_count(), 1);
}
