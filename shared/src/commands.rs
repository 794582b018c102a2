//! Replicated world-state mutations
//!
//! Every change the server makes to the world is described by a [`Command`] and
//! sent to clients, which fold them into their own [`World`] with
//! [`Command::apply`].
//!
//! `SetRadius` and `SetPlayerPosition` are latest-only: each instance carries a
//! sequence number drawn from a process-wide counter for its type, and a
//! receiver ignores any instance older than the newest one it has applied for
//! that type. The watermark is kept per type, not per player, so a stale update
//! about one player can be dropped because a newer update about another player
//! already arrived. Every player is re-sent each tick, which makes this harmless.

use crate::physics::{Player, Vector2};
use crate::protocol::PlayerId;
use crate::world::World;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static SET_RADIUS_SEQUENCE: AtomicU64 = AtomicU64::new(0);
static SET_PLAYER_POSITION_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// The command types that carry sequence numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LatestOnly {
    SetRadius,
    SetPlayerPosition,
}

impl LatestOnly {
    /// Draws the next sequence number for this command type
    pub fn next_sequence(self) -> u64 {
        let counter = match self {
            LatestOnly::SetRadius => &SET_RADIUS_SEQUENCE,
            LatestOnly::SetPlayerPosition => &SET_PLAYER_POSITION_SEQUENCE,
        };
        counter.fetch_add(1, Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Tells a client which player it controls
    SetId(PlayerId),
    SetRadius {
        seq: u64,
        radius: f32,
    },
    /// Upserts a player and overwrites its kinematic state
    SetPlayerPosition {
        seq: u64,
        id: PlayerId,
        position: Vector2,
        last_acceleration: Vector2,
        velocity: Vector2,
    },
    RemovePlayer(PlayerId),
}

impl Command {
    pub fn set_radius(radius: f32) -> Self {
        Command::SetRadius {
            seq: LatestOnly::SetRadius.next_sequence(),
            radius,
        }
    }

    /// Snapshot of a player's kinematic state
    pub fn set_player_position(player: &Player) -> Self {
        Command::SetPlayerPosition {
            seq: LatestOnly::SetPlayerPosition.next_sequence(),
            id: player.id,
            position: player.position,
            last_acceleration: player.last_acceleration,
            velocity: player.velocity,
        }
    }

    /// The latest-only type and sequence number, if this command has one
    pub fn sequence(&self) -> Option<(LatestOnly, u64)> {
        match self {
            Command::SetRadius { seq, .. } => Some((LatestOnly::SetRadius, *seq)),
            Command::SetPlayerPosition { seq, .. } => {
                Some((LatestOnly::SetPlayerPosition, *seq))
            }
            Command::SetId(_) | Command::RemovePlayer(_) => None,
        }
    }

    pub fn needs_ack(&self) -> bool {
        matches!(self, Command::SetId(_) | Command::RemovePlayer(_))
    }

    /// Applies the mutation to `world`. Latest-only commands older than the
    /// watermark for their type are ignored.
    pub fn apply(&self, world: &mut World) {
        if let Some((kind, seq)) = self.sequence() {
            if !world.watermarks.admit(kind, seq) {
                return;
            }
        }

        match self {
            Command::SetId(id) => {
                world.own_id = Some(*id);
            }
            Command::SetRadius { radius, .. } => {
                world.arena_radius = *radius;
            }
            Command::SetPlayerPosition {
                id,
                position,
                last_acceleration,
                velocity,
                ..
            } => {
                let player = world.players.entry(*id).or_insert_with(|| Player::new(*id));
                player.position = *position;
                player.last_acceleration = *last_acceleration;
                player.velocity = *velocity;
            }
            Command::RemovePlayer(id) => {
                world.players.remove(id);
            }
        }
    }
}
