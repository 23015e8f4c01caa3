use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::warn;

use crate::{
    dto::ws::ServerMessage,
    services::transport::Transport,
    state::room::ClientId,
};

/// Registry of open player sockets keyed by their connection identity.
#[derive(Default)]
pub struct ConnectionRegistry {
    sockets: DashMap<ClientId, mpsc::UnboundedSender<Message>>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Track the writer channel of a freshly upgraded socket.
    pub fn register(&self, client: ClientId, tx: mpsc::UnboundedSender<Message>) {
        self.sockets.insert(client, tx);
    }

    /// Forget a socket once it closed.
    pub fn unregister(&self, client: &ClientId) {
        self.sockets.remove(client);
    }

    /// Number of open sockets.
    pub fn len(&self) -> usize {
        self.sockets.len()
    }

    /// Whether no socket is open.
    pub fn is_empty(&self) -> bool {
        self.sockets.is_empty()
    }
}

impl Transport for ConnectionRegistry {
    fn deliver(&self, recipients: &[ClientId], message: &ServerMessage) {
        let payload = match serde_json::to_string(message) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "failed to serialize message `{message:?}`");
                return;
            }
        };

        for client in recipients {
            let Some(tx) = self.sockets.get(client).map(|entry| entry.clone()) else {
                continue;
            };

            if tx.send(Message::Text(payload.clone().into())).is_err() {
                warn!(%client, "send failed (writer closed), removing connection");
                self.sockets.remove(client);
            }
        }
    }
}
