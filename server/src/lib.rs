//! # Arena Server Library
//!
//! Authoritative server for the shrinking-arena game. It owns the canonical
//! world, runs the physics and streams every change to clients as replicated
//! commands over UDP.
//!
//! ## Architecture Design
//!
//! ### Single-Threaded Polling
//! [`network::Server::step`] performs one non-blocking cycle: drain the socket,
//! evict idle peers, run the game tick, resend unacknowledged messages. Nothing
//! is shared across threads; [`network::Server::serve`] just calls `step` on a
//! fixed interval.
//!
//! ### Inferred Disconnects
//! Peers never say goodbye. Any datagram from an unknown address is a new
//! connection, and a peer that stays quiet for longer than the idle timeout
//! is dropped. Clients send a ping every frame to stay alive.
//!
//! ### Selective Reliability
//! Most traffic is fire-and-forget because it is superseded every tick.
//! Player id assignment and player removal are resent every step until the
//! client acknowledges them.
//!
//! ## Module Organization
//!
//! - `network`: socket polling, the [`network::Handler`] hooks and sending
//! - `peers`: address-keyed registry with idle tracking
//! - `reliability`: messages awaiting acknowledgement
//! - `game`: the arena simulation ([`game::GameServer`])
//! - `echo`: a handler that rebroadcasts everything
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::game::GameServer;
//! use server::network::Server;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut server = Server::bind(("0.0.0.0", shared::PORT), GameServer::new())?;
//!     server.serve(Duration::from_millis(16)).await?;
//!     Ok(())
//! }
//! ```

pub mod echo;
pub mod error;
pub mod game;
pub mod network;
pub mod peers;
pub mod reliability;

pub use error::ServerError;
pub use network::{Handler, Network, Server};
