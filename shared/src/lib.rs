//! Protocol, replication model and physics shared by the arena server and client

use std::time::Duration;

pub mod codec;
pub mod commands;
pub mod error;
pub mod physics;
pub mod protocol;
pub mod world;

pub use commands::{Command, LatestOnly};
pub use error::{CodecError, NetworkError};
pub use physics::{Player, Vector2};
pub use protocol::{Input, Key, Message, PlayerId};
pub use world::{Watermarks, World};

/// Prefix of every datagram, sent little-endian
pub const PROTOCOL_ID: u32 = 718420690;
pub const PORT: u16 = 39311;
pub const MAX_DATAGRAM_SIZE: usize = 4096;

/// Peers silent for longer than this are considered gone
pub const DEFAULT_CLIENT_TIMEOUT: Duration = Duration::from_secs(2);

pub const ARENA_START_RADIUS: f32 = 20.0;
pub const ARENA_MIN_RADIUS: f32 = 2.0;
/// Arena shrink speed in units per second
pub const ARENA_SHRINK_RATE: f32 = 0.4;

/// Distance from the arena center at which new players appear
pub const SPAWN_DISTANCE: f32 = 5.0;
