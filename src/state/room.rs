use indexmap::IndexMap;
use uuid::Uuid;

use crate::{
    services::round_timer::RoundTimer,
    state::{
        deck::{RoundDeck, RoundTarget},
        state_machine::{InvalidTransition, RoomEvent, RoomPhase, RoomStateMachine},
    },
};

/// Connection-scoped opaque identity of a player.
pub type ClientId = Uuid;

/// Identity of one room instance. Unlike codes, never reused within a process.
pub type RoomId = u64;

/// Display name given to a room creator who did not pick one.
pub const DEFAULT_HOST_NAME: &str = "Host";

/// Player info tracked while they stay in a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Identity of the connection the player uses.
    pub id: ClientId,
    /// Display name.
    pub name: String,
    /// Rounds won in the current game.
    pub score: u32,
}

impl Player {
    /// Build a player with a zero score.
    pub fn new(id: ClientId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            score: 0,
        }
    }
}

/// Outcome of removing a player from a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    /// The player that left.
    pub player: Player,
    /// Identity of the new host when the departing player was hosting.
    pub new_host: Option<ClientId>,
}

/// Per-room entity: players, scores, deck, current round and countdown.
///
/// Players are kept in join order; the earliest remaining player becomes host when the
/// host leaves.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    code: String,
    players: IndexMap<ClientId, Player>,
    host: ClientId,
    machine: RoomStateMachine,
    deck: RoundDeck,
    current: Option<RoundTarget>,
    time_left: u32,
    round_number: usize,
    total_rounds: usize,
    round_generation: u64,
    start_attempt: u64,
    timer: RoundTimer,
}

impl Room {
    /// Create a waiting room with `host` as its only player.
    pub fn new(id: RoomId, code: String, host: Player) -> Self {
        let host_id = host.id;
        let mut players = IndexMap::new();
        players.insert(host_id, host);

        Self {
            id,
            code,
            players,
            host: host_id,
            machine: RoomStateMachine::new(),
            deck: RoundDeck::default(),
            current: None,
            time_left: 0,
            round_number: 0,
            total_rounds: 0,
            round_generation: 0,
            start_attempt: 0,
            timer: RoundTimer::new(),
        }
    }

    /// Instance identity; delayed commands carry it to tell a room from a successor
    /// that reuses its code.
    pub fn id(&self) -> RoomId {
        self.id
    }

    /// Room code shared with players.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Identity of the current host.
    pub fn host(&self) -> ClientId {
        self.host
    }

    /// Whether `id` hosts this room.
    pub fn is_host(&self, id: ClientId) -> bool {
        self.host == id
    }

    /// Current phase.
    pub fn phase(&self) -> RoomPhase {
        self.machine.phase()
    }

    /// Players in join order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// Player identities in join order.
    pub fn player_ids(&self) -> Vec<ClientId> {
        self.players.keys().copied().collect()
    }

    /// Look a player up by identity.
    pub fn player(&self, id: ClientId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// Whether `id` is a member of this room.
    pub fn contains(&self, id: ClientId) -> bool {
        self.players.contains_key(&id)
    }

    /// Number of players.
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Whether the last player left.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Append a player. A missing name defaults to `Player N`, N being the join position.
    pub fn add_player(&mut self, id: ClientId, name: Option<String>) -> &Player {
        let position = self.players.len() + 1;
        let name = name.unwrap_or_else(|| format!("Player {position}"));
        self.players.entry(id).or_insert_with(|| Player::new(id, name))
    }

    /// Remove a player, reassigning the host to the earliest remaining player if needed.
    pub fn remove_player(&mut self, id: ClientId) -> Option<Departure> {
        let player = self.players.shift_remove(&id)?;

        let mut new_host = None;
        if self.host == id {
            if let Some(next) = self.players.keys().next().copied() {
                self.host = next;
                new_host = Some(next);
            }
        }

        Some(Departure { player, new_host })
    }

    /// Add one point to a player's score, returning the updated player.
    pub fn award_point(&mut self, id: ClientId) -> Option<&Player> {
        let player = self.players.get_mut(&id)?;
        player.score += 1;
        Some(player)
    }

    /// Apply a phase transition.
    pub fn apply(&mut self, event: RoomEvent) -> Result<RoomPhase, InvalidTransition> {
        self.machine.apply(event)
    }

    /// Leave the lobby, returning the id of this start attempt.
    pub fn begin_start(&mut self) -> Result<u64, InvalidTransition> {
        self.apply(RoomEvent::StartRequested)?;
        self.start_attempt += 1;
        Ok(self.start_attempt)
    }

    /// Id of the latest start attempt.
    pub fn start_attempt(&self) -> u64 {
        self.start_attempt
    }

    /// Return to the lobby after a failed start, discarding any prepared deck.
    pub fn abort_start(&mut self) -> Result<RoomPhase, InvalidTransition> {
        let phase = self.apply(RoomEvent::StartAborted)?;
        self.deck = RoundDeck::default();
        self.current = None;
        self.total_rounds = 0;
        self.round_number = 0;
        Ok(phase)
    }

    /// Install the deck for a fresh game and reset every score.
    pub fn install_deck(&mut self, deck: RoundDeck) {
        self.total_rounds = deck.len();
        self.round_number = 0;
        self.deck = deck;
        self.current = None;
        for player in self.players.values_mut() {
            player.score = 0;
        }
    }

    /// Draw the next round target and make it current.
    pub fn draw_round(&mut self) -> Option<&RoundTarget> {
        let target = self.deck.next()?;
        self.round_number += 1;
        Some(self.current.insert(target))
    }

    /// Forget the current round once the game is over.
    pub fn clear_round(&mut self) {
        self.current = None;
        self.time_left = 0;
    }

    /// Target of the current (or just finished) round.
    pub fn current_target(&self) -> Option<&RoundTarget> {
        self.current.as_ref()
    }

    /// Seconds left in the current round.
    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    /// Update the seconds left in the current round.
    pub fn set_time_left(&mut self, seconds: u32) {
        self.time_left = seconds;
    }

    /// 1-based index of the current round.
    pub fn round_number(&self) -> usize {
        self.round_number
    }

    /// Number of rounds the deck held when the game started.
    pub fn total_rounds(&self) -> usize {
        self.total_rounds
    }

    /// Invalidate previously scheduled round starts and return the new generation.
    pub fn next_round_generation(&mut self) -> u64 {
        self.round_generation += 1;
        self.round_generation
    }

    /// Generation a scheduled round start must carry to be honoured.
    pub fn round_generation(&self) -> u64 {
        self.round_generation
    }

    /// Round countdown.
    pub fn timer(&self) -> &RoundTimer {
        &self.timer
    }

    /// Mutable round countdown.
    pub fn timer_mut(&mut self) -> &mut RoundTimer {
        &mut self.timer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room_with(names: &[&str]) -> (Room, Vec<ClientId>) {
        let ids: Vec<ClientId> = names.iter().map(|_| Uuid::new_v4()).collect();
        let mut room = Room::new(1, "AB12".into(), Player::new(ids[0], names[0]));
        for (id, name) in ids.iter().zip(names).skip(1) {
            room.add_player(*id, Some((*name).to_string()));
        }
        (room, ids)
    }

    #[test]
    fn default_names_follow_join_order() {
        let host = Uuid::new_v4();
        let mut room = Room::new(1, "AB12".into(), Player::new(host, DEFAULT_HOST_NAME));

        let second = room.add_player(Uuid::new_v4(), None).name.clone();
        let third = room.add_player(Uuid::new_v4(), None).name.clone();

        assert_eq!(second, "Player 2");
        assert_eq!(third, "Player 3");
    }

    #[test]
    fn host_passes_to_earliest_remaining_player() {
        let (mut room, ids) = room_with(&["Alice", "Bob", "Carol"]);

        let departure = room.remove_player(ids[0]).unwrap();
        assert_eq!(departure.player.name, "Alice");
        assert_eq!(departure.new_host, Some(ids[1]));
        assert!(room.is_host(ids[1]));

        let names: Vec<&str> = room.players().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Bob", "Carol"]);
    }

    #[test]
    fn non_host_departure_keeps_host() {
        let (mut room, ids) = room_with(&["Alice", "Bob", "Carol"]);

        let departure = room.remove_player(ids[1]).unwrap();
        assert_eq!(departure.new_host, None);
        assert!(room.is_host(ids[0]));
    }

    #[test]
    fn last_departure_empties_room() {
        let (mut room, ids) = room_with(&["Alice"]);

        let departure = room.remove_player(ids[0]).unwrap();
        assert_eq!(departure.new_host, None);
        assert!(room.is_empty());
        assert!(room.remove_player(ids[0]).is_none());
    }

    #[test]
    fn installing_a_deck_resets_scores() {
        let (mut room, ids) = room_with(&["Alice", "Bob"]);
        room.award_point(ids[1]);
        assert_eq!(room.player(ids[1]).unwrap().score, 1);

        room.install_deck(RoundDeck::default());
        assert!(room.players().all(|p| p.score == 0));
    }

    #[test]
    fn start_attempts_are_numbered() {
        let (mut room, _) = room_with(&["Alice", "Bob"]);

        assert_eq!(room.begin_start().unwrap(), 1);
        assert!(room.begin_start().is_err());
        room.abort_start().unwrap();
        assert_eq!(room.begin_start().unwrap(), 2);
        assert_eq!(room.phase(), RoomPhase::Starting);
    }
}
