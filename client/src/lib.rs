//! # Tic-Tac-Toe Client Library
//!
//! Graphical client for the room server. The client is deliberately thin:
//! it never predicts or validates moves, it only forwards the player's
//! actions and redraws from the server's broadcasts.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! Local mirror of the current room: board, own symbol, turn, status and the
//! message shown to the player. Updated exclusively from server packets.
//!
//! ### Input Module (`input`)
//! Keyboard shortcuts, room code entry and mapping of board clicks to cells.
//!
//! ### Network Module (`network`)
//! UDP socket on a background thread, heartbeats, and channels to and from
//! the render loop.
//!
//! ### Rendering Module (`rendering`)
//! Board layout and drawing with macroquad.

pub mod game;
pub mod input;
pub mod network;
pub mod rendering;
