use crate::config::presets;
use crate::server::session::{Command, Session, SessionState};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use serde_json::Value;
use std::time::Duration;

const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

pub async fn upgrade(ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(handle_socket)
}

/// One session's cooperative task pair, collapsed into a single `select!`
/// loop: the `recv()` branch is the receiver, the pending compute handle
/// is the worker. Either side ending the loop ends the session, matching
/// the join semantics of two separate tasks without needing to split the
/// socket into independent read/write halves.
async fn handle_socket(mut socket: WebSocket) {
    let mut session = Session::new();
    let mut compute: Option<tokio::task::JoinHandle<Result<Value, String>>> = None;
    let mut keepalive = tokio::time::interval(KEEPALIVE_INTERVAL);
    keepalive.reset();

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                match incoming {
                    None | Some(Err(_)) => {
                        session.on_peer_disconnected();
                        break;
                    }
                    Some(Ok(Message::Close(_))) => {
                        session.on_peer_disconnected();
                        break;
                    }
                    Some(Ok(Message::Text(text))) => {
                        handle_text_command(&text, &mut session, &mut compute);
                    }
                    Some(Ok(_)) => {}
                }
            }
            result = poll_compute(&mut compute), if compute.is_some() => {
                compute = None;
                session.on_compute_finished();
                let body = match result {
                    Ok(value) => value,
                    Err(message) => serde_json::json!({"error": message}),
                };
                if socket.send(Message::Text(body.to_string())).await.is_err() {
                    session.on_peer_disconnected();
                    break;
                }
            }
            _ = keepalive.tick(), if session.state() == SessionState::Idle => {
                if socket.send(Message::Ping(Vec::new())).await.is_err() {
                    session.on_peer_disconnected();
                    break;
                }
            }
        }

        if session.state() == SessionState::Closed {
            break;
        }
    }
}

fn handle_text_command(
    text: &str,
    session: &mut Session,
    compute: &mut Option<tokio::task::JoinHandle<Result<Value, String>>>,
) {
    match Command::parse(text) {
        Ok(Command::Configure(payload)) => {
            session.on_command(&Command::Configure(payload.clone()));
            *compute = Some(tokio::task::spawn_blocking(move || run_compute(payload)));
        }
        Ok(cmd) => session.on_command(&cmd),
        Err(e) => tracing::warn!(error = %e, "discarding malformed websocket message"),
    }
}

async fn poll_compute(
    compute: &mut Option<tokio::task::JoinHandle<Result<Value, String>>>,
) -> Result<Value, String> {
    match compute.as_mut().expect("guarded by select's `if compute.is_some()`").await {
        Ok(result) => result,
        Err(join_err) => Err(join_err.to_string()),
    }
}

fn run_compute(payload: Value) -> Result<Value, String> {
    let mut config = presets::load_defaults().map_err(|e| e.to_string())?;
    config.merge(&payload).map_err(|e| e.to_string())?;
    let (dataset, metrics) = crate::simulate::run(&config).map_err(|e| e.to_string())?;
    Ok(serde_json::json!({"dataset": dataset, "metrics": metrics}))
}
