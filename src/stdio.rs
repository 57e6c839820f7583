//! Newline-delimited JSON host for an embedding shell.
//!
//! Each input line is `{"id": .., "method": "addItem", "params": ["hi"]}`;
//! each output line is `{"id": .., "result": {..}}` or `{"id": .., "error": ".."}`.
//! Requests run concurrently, so responses may come back out of order and
//! must be matched by `id`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use crate::shim::DatabaseApi;

#[derive(Debug, Deserialize)]
pub struct StdioRequest {
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Vec<Value>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct StdioResponse {
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StdioResponse {
    fn result(id: Value, result: Value) -> Self {
        Self { id, result: Some(result), error: None }
    }

    fn error(id: Value, error: impl Into<String>) -> Self {
        Self { id, result: None, error: Some(error.into()) }
    }
}

/// Handle one input line. Blank lines produce no response.
pub async fn handle_line(api: &DatabaseApi, line: &str) -> Option<StdioResponse> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let request: StdioRequest = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => return Some(StdioResponse::error(Value::Null, format!("Invalid request: {}", e))),
    };

    let response = match api.call(&request.method, request.params).await {
        Ok(result) => StdioResponse::result(request.id, result),
        Err(e) => StdioResponse::error(request.id, e.to_string()),
    };
    Some(response)
}

/// Serve requests from `reader` until EOF, writing responses to `writer`.
/// Returns the writer once every in-flight request has been answered.
pub async fn serve<R, W>(api: DatabaseApi, reader: R, writer: W) -> anyhow::Result<W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (write_tx, mut write_rx) = mpsc::channel::<String>(32);

    // Writer
    let writer_task = tokio::spawn(async move {
        let mut writer = writer;
        while let Some(msg) = write_rx.recv().await {
            writer.write_all(msg.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
        Ok::<_, std::io::Error>(writer)
    });

    let mut reader = reader;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let line = String::from_utf8(std::mem::take(&mut buf));
        let api = api.clone();
        let write_tx = write_tx.clone();
        tokio::spawn(async move {
            let response = match line {
                Ok(line) => handle_line(&api, &line).await,
                Err(e) => Some(StdioResponse::error(Value::Null, format!("Invalid request: {}", e))),
            };
            let Some(response) = response else {
                return;
            };
            match serde_json::to_string(&response) {
                Ok(msg) => {
                    if write_tx.send(msg).await.is_err() {
                        tracing::warn!("Output closed before response {} was written", response.id);
                    }
                }
                Err(e) => tracing::error!("Failed to serialize response: {}", e),
            }
        });
    }

    tracing::debug!("stdin closed, waiting for in-flight requests");
    drop(write_tx);
    let writer = writer_task.await??;
    Ok(writer)
}

/// Serve the process's stdin/stdout
pub async fn run_stdio(api: DatabaseApi) -> anyhow::Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    serve(api, stdin, tokio::io::stdout()).await?;
    Ok(())
}
