//! # Arena Client Library
//!
//! Thin client for the shrinking-arena game. The client never simulates
//! anything: it forwards key edges to the server and draws whatever the
//! replicated commands say the world looks like.
//!
//! ## Architecture Overview
//!
//! ### Replica, Not Prediction
//! [`game::ClientGame`] holds a [`shared::World`] that changes only when a
//! command arrives. Position and radius updates carry sequence numbers, so a
//! late datagram never rolls the replica back.
//!
//! ### Keep-Alive
//! Servers infer disconnects from silence. [`input::InputManager`] emits a
//! ping every frame on top of any key edges, which keeps the connection open
//! while the window is up.
//!
//! ### Acknowledgements
//! [`network::Client::receive`] answers reliable messages (id assignment and
//! player removal) as soon as they are read, so the server stops resending.
//!
//! ## Module Organization
//!
//! - `game`: the world replica
//! - `input`: keyboard mapping and per-frame inputs
//! - `network`: the UDP client socket
//! - `rendering`: camera and macroquad drawing
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::game::ClientGame;
//! use client::network::Client;
//! use shared::Input;
//!
//! let client = Client::connect(("127.0.0.1", shared::PORT))?;
//! let mut game = ClientGame::new();
//!
//! client.send(&Input::Ping.into())?;
//! game.poll(&client);
//! println!("{} players", game.world().players.len());
//! # Ok::<(), shared::NetworkError>(())
//! ```

pub mod game;
pub mod input;
pub mod network;
pub mod rendering;

pub use game::ClientGame;
pub use network::Client;
