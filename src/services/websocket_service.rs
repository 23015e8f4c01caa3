use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::ws::ClientMessage,
    services::coordinator::Command,
    state::SharedState,
};

/// Handle the full lifecycle of a player WebSocket connection.
///
/// Every connection gets a fresh identity. Parsed messages are forwarded to the session
/// coordinator; the coordinator answers through the connection registry.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let client = Uuid::new_v4();
    state.connections().register(client, outbound_tx.clone());
    info!(%client, "player connected");

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => {
                debug!(%client, payload = %text, "received player message");

                match ClientMessage::from_json_str(&text) {
                    Ok(message) => state.dispatch(Command::Client { client, message }),
                    Err(err) => {
                        warn!(%client, error = %err, "failed to parse or validate player message");
                    }
                }
            }
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                info!(%client, "player closed connection");
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) => {}
            Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(%client, error = %err, "websocket error");
                break;
            }
        }
    }

    state.connections().unregister(&client);
    state.dispatch(Command::Disconnect { client });
    info!(%client, "player disconnected");

    finalize(writer_task, outbound_tx).await;
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
