//! # Tic-Tac-Toe Room Server Library
//!
//! Authoritative server for two-player tic-tac-toe played in rooms. Clients
//! open a room, share its six character code with an opponent, and play
//! alternating moves. The server owns every board; clients only render what
//! the server broadcasts.
//!
//! ## Core Responsibilities
//!
//! ### Room Bookkeeping
//! The session registry maps room codes to game sessions and connections to
//! rooms. Both maps sit behind one lock, so concurrent moves and disconnects
//! on the same room always see a consistent picture.
//!
//! ### Rule Enforcement
//! A move is accepted only while the game is in progress, only from the
//! player whose turn it is, and only on an empty cell. Anything else is
//! dropped without a reply.
//!
//! ### Notification
//! Every accepted action is broadcast to the room: moves, game over, resets,
//! and the departure of an opponent.
//!
//! ## Module Organization
//!
//! ### Client Manager Module (`client_manager`)
//! Connection IDs, address lookup, liveness and timeouts.
//!
//! ### Game Session Module (`game_session`)
//! Board, turn and status of one room; the per-room state machine.
//!
//! ### Session Registry Module (`session_registry`)
//! Concurrency-safe ownership of all sessions and room codes.
//!
//! ### Hub Module (`hub`)
//! The `Gateway` trait and the `GameHub` that turns client actions into
//! registry calls and broadcasts.
//!
//! ### Network Module (`network`)
//! UDP transport: packet receive/send tasks, timeout checking and the main
//! dispatch loop.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::{Server, ServerConfig};
//! use server::session_registry::SessionRegistry;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Arc::new(SessionRegistry::new());
//!     let mut server = Server::new(ServerConfig::default(), registry).await?;
//!
//!     // Receives packets, dispatches room actions, broadcasts outcomes
//!     // and disconnects clients that stop sending heartbeats
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod error;
pub mod game_session;
pub mod hub;
pub mod network;
pub mod session_registry;
