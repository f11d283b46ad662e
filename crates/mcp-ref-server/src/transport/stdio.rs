//! Line-delimited STDIO transport (spec.md §6): one JSON-RPC message per
//! line on stdin/stdout, a single session for the connection's lifetime,
//! stderr reserved for logs. EOF on stdin triggers graceful shutdown.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tokio::sync::{mpsc, Mutex};

use crate::protocol::jsonrpc::{error_code, JsonRpcRequest, JsonRpcResponse};
use crate::protocol::router::OutboundSink;
use crate::server::McpServer;

pub async fn run(server: Arc<McpServer>) -> anyhow::Result<()> {
    let stdin = tokio::io::stdin();
    let stdout = Arc::new(Mutex::new(tokio::io::stdout()));
    let mut reader = BufReader::new(stdin);
    let mut line = String::new();

    let session = server.sessions.create_session().await;

    let (notif_tx, mut notif_rx) = mpsc::unbounded_channel::<serde_json::Value>();
    let notif_stdout = stdout.clone();
    tokio::spawn(async move {
        while let Some(frame) = notif_rx.recv().await {
            write_line(&notif_stdout, &frame).await;
        }
    });
    let outbound: OutboundSink = Arc::new(move |frame| {
        let _ = notif_tx.send(frame);
    });

    tracing::info!("stdio transport ready, waiting for requests");

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            tracing::info!("stdin closed, shutting down");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let request: JsonRpcRequest = match serde_json::from_str(trimmed) {
            Ok(req) => req,
            Err(e) => {
                let response = JsonRpcResponse::error(None, error_code::PARSE_ERROR, format!("Parse error: {e}"));
                write_line(&stdout, &serde_json::to_value(&response)?).await;
                continue;
            }
        };

        tracing::debug!(method = %request.method, "received request");

        let server = server.clone();
        let session = session.clone();
        let outbound = outbound.clone();
        let stdout = stdout.clone();
        tokio::spawn(async move {
            if let Some(response) = server.router.route(&session, request, outbound).await {
                match serde_json::to_value(&response) {
                    Ok(value) => write_line(&stdout, &value).await,
                    Err(e) => tracing::error!(error = %e, "failed to serialize response"),
                }
            }
        });
    }

    server.shutdown.shutdown().await;
    Ok(())
}

async fn write_line(stdout: &Mutex<Stdout>, value: &serde_json::Value) {
    let Ok(mut text) = serde_json::to_string(value) else {
        tracing::error!("failed to serialize outbound frame");
        return;
    };
    text.push('\n');
    let mut stdout = stdout.lock().await;
    if let Err(e) = stdout.write_all(text.as_bytes()).await {
        tracing::error!(error = %e, "failed to write to stdout");
        return;
    }
    let _ = stdout.flush().await;
}
