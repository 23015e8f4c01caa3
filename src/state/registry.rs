use std::collections::HashMap;

use rand::Rng;
use tracing::debug;

use crate::{
    error::GameError,
    state::room::{Player, Room, RoomId},
};

/// Characters room codes are drawn from.
const CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
/// Length of generated room codes.
pub const CODE_LENGTH: usize = 4;

/// Process-wide table of live rooms keyed by their code.
///
/// Owned by the session coordinator; nothing else holds references to rooms.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<String, Room>,
    last_id: RoomId,
}

impl RoomRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a room with a code unused among live rooms and `host` as its only player.
    pub fn create_room(&mut self, host: Player) -> &mut Room {
        let mut rng = rand::rng();
        self.create_room_with(host, &mut rng)
    }

    /// Same as [`RoomRegistry::create_room`] with an explicit random source.
    pub fn create_room_with<R>(&mut self, host: Player, rng: &mut R) -> &mut Room
    where
        R: Rng + ?Sized,
    {
        let code = loop {
            let candidate = generate_code(rng);
            if !self.rooms.contains_key(&candidate) {
                break candidate;
            }
            debug!(code = %candidate, "room code collision; regenerating");
        };

        self.last_id += 1;
        let id = self.last_id;
        self.rooms
            .entry(code.clone())
            .or_insert_with(|| Room::new(id, code, host))
    }

    /// Look a room up by code.
    pub fn lookup(&self, code: &str) -> Result<&Room, GameError> {
        self.rooms
            .get(code)
            .ok_or_else(|| GameError::RoomNotFound(code.to_string()))
    }

    /// Look a room up by code for mutation.
    pub fn lookup_mut(&mut self, code: &str) -> Result<&mut Room, GameError> {
        self.rooms
            .get_mut(code)
            .ok_or_else(|| GameError::RoomNotFound(code.to_string()))
    }

    /// Look up the room instance `id` by code. `None` once that instance is gone, even if
    /// a newer room took over its code.
    pub fn instance_mut(&mut self, code: &str, id: RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(code).filter(|room| room.id() == id)
    }

    /// Destroy a room, returning it if it existed.
    pub fn remove(&mut self, code: &str) -> Option<Room> {
        self.rooms.remove(code)
    }

    /// Whether a room uses this code.
    pub fn contains(&self, code: &str) -> bool {
        self.rooms.contains_key(code)
    }

    /// Number of live rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Whether no room is live.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

/// Draw a random code of [`CODE_LENGTH`] upper-case alphanumeric characters.
pub fn generate_code<R>(rng: &mut R) -> String
where
    R: Rng + ?Sized,
{
    (0..CODE_LENGTH)
        .map(|_| char::from(CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())]))
        .collect()
}

/// Case-normalise a code typed by a player.
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}
