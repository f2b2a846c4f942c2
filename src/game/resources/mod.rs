//! Game state owned by the session
//!
//! # Resource Categories
//!
//! ## Turn Management
//! - [`TurnFlow`] / [`TurnPhase`] - phase within the current turn
//!
//! ## Per-Team State
//! - [`PlayerState`] - check status plus the derived [`TeamAggregate`]
//! - [`PlayerCheckState`] - in check, double check, blocking squares
//!
//! ## Game History
//! - [`MoveHistory`] - applied moves, read by the en passant rule
//! - [`CapturedPieces`] - material tracking and advantage calculation

pub mod captured;
pub mod history;
pub mod player;
pub mod turn_state;

pub use captured::*;
pub use history::*;
pub use player::*;
pub use turn_state::*;
