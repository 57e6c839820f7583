use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::Value;
use crate::server::AppState;
use crate::shim::DatabaseApi;
use crate::Error;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl ToString) -> ApiError {
    (status, Json(ErrorResponse { error: error.to_string() }))
}

/// Body is a JSON array of positional arguments. An empty body means no
/// arguments; a single non-array value is taken as the only argument.
fn parse_args(body: &[u8]) -> Result<Vec<Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    match serde_json::from_slice(body) {
        Ok(Value::Array(args)) => Ok(args),
        Ok(value) => Ok(vec![value]),
        Err(e) => Err(api_error(StatusCode::BAD_REQUEST, format!("Invalid JSON body: {}", e))),
    }
}

pub async fn list_exposed() -> Json<Vec<&'static str>> {
    Json(DatabaseApi::exposed_names().collect())
}

pub async fn invoke(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let args = parse_args(&body)?;

    match state.api.call(&name, args).await {
        Ok(value) => Ok(Json(value)),
        Err(e @ Error::NotExposed(_)) => Err(api_error(StatusCode::NOT_FOUND, e)),
        Err(e) => Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::Bridge;
    use crate::storage::ItemStore;
    use serde_json::json;

    fn state() -> Arc<AppState> {
        let bridge = Bridge::with_store(ItemStore::open_in_memory().unwrap());
        Arc::new(AppState { api: DatabaseApi::new(Arc::new(bridge)) })
    }

    async fn call(state: &Arc<AppState>, name: &str, body: &str) -> Result<Value, StatusCode> {
        invoke(
            State(state.clone()),
            Path(name.to_string()),
            Bytes::from(body.to_string()),
        )
        .await
        .map(|Json(v)| v)
        .map_err(|(status, _)| status)
    }

    #[test]
    fn test_parse_args() {
        assert!(parse_args(b"").unwrap().is_empty());
        assert!(parse_args(b"  \n").unwrap().is_empty());
        assert_eq!(parse_args(br#"["a", 1]"#).unwrap(), vec![json!("a"), json!(1)]);
        assert_eq!(parse_args(b"\"solo\"").unwrap(), vec![json!("solo")]);
        assert_eq!(parse_args(b"{oops").unwrap_err().0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invoke_exposed_functions() {
        let state = state();

        let added = call(&state, "addItem", r#"["from http"]"#).await.unwrap();
        assert_eq!(added["success"], true);

        let listed = call(&state, "getItems", "").await.unwrap();
        assert_eq!(listed["items"][0]["message"], "from http");

        let id = added["item"]["id"].as_i64().unwrap();
        let deleted = call(&state, "deleteItem", &format!("[{}]", id)).await.unwrap();
        assert_eq!(deleted["success"], true);
    }

    #[tokio::test]
    async fn test_invoke_unexposed_is_not_found() {
        let state = state();
        assert_eq!(call(&state, "db:get-items", "").await.unwrap_err(), StatusCode::NOT_FOUND);
        assert_eq!(call(&state, "ipcRenderer", "").await.unwrap_err(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_exposed() {
        let Json(names) = list_exposed().await;
        assert_eq!(names, vec!["test", "addItem", "getItems", "deleteItem"]);
    }
}
