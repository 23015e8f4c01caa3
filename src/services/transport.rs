//! Delivery of outbound events to player connections.

use crate::{
    dto::ws::ServerMessage,
    state::room::{ClientId, Room},
};

/// Pushes events to connected clients, addressed by identity.
pub trait Transport: Send + Sync {
    /// Send `message` to every client in `recipients`. Unknown or closed clients are skipped.
    fn deliver(&self, recipients: &[ClientId], message: &ServerMessage);
}

/// A message together with the clients it is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    /// Target clients.
    pub recipients: Vec<ClientId>,
    /// Event to send.
    pub message: ServerMessage,
}

/// Messages produced while handling one command, flushed once the handler is done mutating.
#[derive(Debug, Default)]
pub struct Outbox {
    dispatches: Vec<Dispatch>,
}

impl Outbox {
    /// Create an empty outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a message for a single client.
    pub fn to_client(&mut self, client: ClientId, message: ServerMessage) {
        self.dispatches.push(Dispatch {
            recipients: vec![client],
            message,
        });
    }

    /// Queue a message for every current member of `room`.
    pub fn to_room(&mut self, room: &Room, message: ServerMessage) {
        self.dispatches.push(Dispatch {
            recipients: room.player_ids(),
            message,
        });
    }

    /// Hand every queued message to `transport`, in order.
    pub fn flush(self, transport: &dyn Transport) {
        for dispatch in &self.dispatches {
            if dispatch.recipients.is_empty() {
                continue;
            }
            transport.deliver(&dispatch.recipients, &dispatch.message);
        }
    }
}
