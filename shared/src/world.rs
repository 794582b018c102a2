//! World state held by every participant
//!
//! The server owns the authoritative copy; each client builds a replica purely
//! by applying received [`Command`](crate::commands::Command)s.

use crate::commands::LatestOnly;
use crate::physics::Player;
use crate::protocol::PlayerId;
use crate::ARENA_START_RADIUS;
use std::collections::BTreeMap;

/// Highest sequence number applied so far for each latest-only command type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Watermarks {
    set_radius: u64,
    set_player_position: u64,
}

impl Watermarks {
    /// Returns true and advances the watermark when `seq` is not older than
    /// anything already applied for `kind`. Equal sequence numbers are
    /// admitted so replays stay idempotent.
    pub fn admit(&mut self, kind: LatestOnly, seq: u64) -> bool {
        let watermark = self.slot(kind);
        if seq >= *watermark {
            *watermark = seq;
            true
        } else {
            false
        }
    }

    pub fn get(&self, kind: LatestOnly) -> u64 {
        match kind {
            LatestOnly::SetRadius => self.set_radius,
            LatestOnly::SetPlayerPosition => self.set_player_position,
        }
    }

    fn slot(&mut self, kind: LatestOnly) -> &mut u64 {
        match kind {
            LatestOnly::SetRadius => &mut self.set_radius,
            LatestOnly::SetPlayerPosition => &mut self.set_player_position,
        }
    }
}

#[derive(Debug, Clone)]
pub struct World {
    pub players: BTreeMap<PlayerId, Player>,
    /// The local participant's own id, once the server has assigned it
    pub own_id: Option<PlayerId>,
    pub arena_radius: f32,
    pub watermarks: Watermarks,
}

impl World {
    pub fn new() -> Self {
        Self {
            players: BTreeMap::new(),
            own_id: None,
            arena_radius: ARENA_START_RADIUS,
            watermarks: Watermarks::default(),
        }
    }

    pub fn own_player(&self) -> Option<&Player> {
        self.own_id.and_then(|id| self.players.get(&id))
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.keys().copied().collect()
    }

    /// Players whose center lies outside the arena
    pub fn outside_arena(&self) -> Vec<PlayerId> {
        self.players
            .values()
            .filter(|player| player.position.magnitude() > self.arena_radius)
            .map(|player| player.id)
            .collect()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::Vector2;

    #[test]
    fn test_world_creation() {
        let world = World::new();
        assert!(world.players.is_empty());
        assert_eq!(world.own_id, None);
        assert_eq!(world.arena_radius, ARENA_START_RADIUS);
        assert!(world.own_player().is_none());
    }

    #[test]
    fn test_watermark_admits_equal_and_newer() {
        let mut watermarks = Watermarks::default();
        assert!(watermarks.admit(LatestOnly::SetRadius, 5));
        assert!(watermarks.admit(LatestOnly::SetRadius, 5));
        assert!(watermarks.admit(LatestOnly::SetRadius, 7));
        assert!(!watermarks.admit(LatestOnly::SetRadius, 6));
        assert_eq!(watermarks.get(LatestOnly::SetRadius), 7);
    }

    #[test]
    fn test_watermarks_are_per_type() {
        let mut watermarks = Watermarks::default();
        assert!(watermarks.admit(LatestOnly::SetRadius, 100));
        assert!(watermarks.admit(LatestOnly::SetPlayerPosition, 1));
        assert_eq!(watermarks.get(LatestOnly::SetPlayerPosition), 1);
    }

    #[test]
    fn test_outside_arena() {
        let mut world = World::new();
        world.arena_radius = 3.0;
        world
            .players
            .insert(PlayerId(1), Player::at(PlayerId(1), Vector2::new(1.0, 1.0)));
        world
            .players
            .insert(PlayerId(2), Player::at(PlayerId(2), Vector2::new(3.0, 0.5)));

        assert_eq!(world.outside_arena(), vec![PlayerId(2)]);
    }
}
