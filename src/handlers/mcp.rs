//! JSON-RPC 2.0 endpoint speaking the tool protocol.
//!
//! Supported methods:
//!
//! - `initialize`: negotiates the protocol version and opens a session
//! - `ping`
//! - `tools/list`: every tool with its input and output schema
//! - `tools/call`: runs one tool
//!
//! Requests without an `id` are notifications and get `202 Accepted` with no
//! body. A tool that fails still produces a successful JSON-RPC response; the
//! failure is reported in the result with `isError: true` so the agent can
//! read the message and correct its call.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    app::AppState,
    error::AppError,
    models::jsonrpc::{
        INVALID_PARAMS, INVALID_REQUEST, JSONRPC_VERSION, JsonRpcRequest, JsonRpcResponse,
        METHOD_NOT_FOUND, PARSE_ERROR, ToolCallParams,
    },
    tools::{self, ToolOutput},
};

pub const SESSION_HEADER: &str = "mcp-session-id";

/// Protocol revisions this server understands, newest first.
const PROTOCOL_VERSIONS: [&str; 3] = ["2025-06-18", "2025-03-26", "2024-11-05"];

pub async fn handle_rpc(State(state): State<AppState>, body: Bytes) -> Response {
    let value: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            return reply(JsonRpcResponse::failure(
                Value::Null,
                PARSE_ERROR,
                format!("Parse error: {e}"),
            ));
        }
    };

    if value.is_array() {
        return reply(JsonRpcResponse::failure(
            Value::Null,
            INVALID_REQUEST,
            "Batch requests are not supported",
        ));
    }

    let id_hint = value.get("id").cloned().unwrap_or(Value::Null);
    let request: JsonRpcRequest = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(e) => {
            return reply(JsonRpcResponse::failure(
                id_hint,
                INVALID_REQUEST,
                format!("Invalid request: {e}"),
            ));
        }
    };

    if request.jsonrpc != JSONRPC_VERSION {
        return reply(JsonRpcResponse::failure(
            id_hint,
            INVALID_REQUEST,
            "jsonrpc must be \"2.0\"",
        ));
    }

    if request.is_notification() {
        tracing::debug!("Notification: {}", request.method);
        return StatusCode::ACCEPTED.into_response();
    }
    let id = request.id.clone().unwrap_or_default();

    match request.method.as_str() {
        "initialize" => initialize(id, request.params.as_ref()),
        "ping" => reply(JsonRpcResponse::success(id, json!({}))),
        "tools/list" => reply(JsonRpcResponse::success(
            id,
            json!({ "tools": tools::definitions() }),
        )),
        "tools/call" => reply(call(&state, id, request.params).await),
        other => reply(JsonRpcResponse::failure(
            id,
            METHOD_NOT_FOUND,
            format!("Method not found: {other}"),
        )),
    }
}

fn reply(response: JsonRpcResponse) -> Response {
    (StatusCode::OK, Json(response)).into_response()
}

fn initialize(id: Value, params: Option<&Value>) -> Response {
    let requested = params
        .and_then(|p| p.get("protocolVersion"))
        .and_then(Value::as_str);
    let version = PROTOCOL_VERSIONS
        .iter()
        .copied()
        .find(|known| Some(*known) == requested)
        .unwrap_or(PROTOCOL_VERSIONS[0]);

    let result = json!({
        "protocolVersion": version,
        "capabilities": { "tools": { "listChanged": false } },
        "serverInfo": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        },
        "instructions": "Personal finance ledger. Amounts are decimals in currency units; \
                         negative amounts are expenses. Accounts, categories and payees \
                         can be referenced by id or by name.",
    });

    let session = Uuid::new_v4().to_string();
    tracing::info!("Session {} initialized (protocol {})", session, version);

    let mut response = reply(JsonRpcResponse::success(id, result));
    if let Ok(value) = HeaderValue::from_str(&session) {
        response.headers_mut().insert(SESSION_HEADER, value);
    }
    response
}

async fn call(state: &AppState, id: Value, params: Option<Value>) -> JsonRpcResponse {
    let Some(params) = params else {
        return JsonRpcResponse::failure(id, INVALID_PARAMS, "tools/call requires params");
    };
    let call: ToolCallParams = match serde_json::from_value(params) {
        Ok(call) => call,
        Err(e) => {
            return JsonRpcResponse::failure(id, INVALID_PARAMS, format!("Invalid params: {e}"));
        }
    };

    tracing::info!("Tool call: {}", call.name);
    match tools::call_tool(state.ledger.as_ref(), &call.name, call.arguments).await {
        Ok(output) => JsonRpcResponse::success(id, tool_result(output)),
        Err(AppError::UnknownTool(name)) => {
            JsonRpcResponse::failure(id, INVALID_PARAMS, format!("Unknown tool: {name}"))
        }
        Err(err) => {
            tracing::warn!("Tool {} failed [{}]: {}", call.name, err.code(), err);
            JsonRpcResponse::success(id, tool_error(&err))
        }
    }
}

fn tool_result(output: ToolOutput) -> Value {
    json!({
        "content": [{ "type": "text", "text": output.text }],
        "structuredContent": output.structured,
        "isError": false,
    })
}

fn tool_error(err: &AppError) -> Value {
    json!({
        "content": [{ "type": "text", "text": err.to_string() }],
        "isError": true,
    })
}
