//! Chess game logic
//!
//! # Module Organization
//!
//! - `types` - squares, files and ranks
//! - `rules` - pure chess logic (move generation, pins, check, special moves)
//! - `resources` - per-team check state, aggregates, turn flow, history
//! - `events` - [`GameEvent`] and the observer bus
//! - `session` - [`GameSession`], the owner of the board and the move pipeline
//! - `error` - [`GameError`]
//!
//! # Move Pipeline
//!
//! 1. Input (`select`, `move_selected`, `play`, `castle`, `execute`)
//! 2. Board mutation and turn flip
//! 3. Check detection for the side that moved
//! 4. Aggregate regeneration for both sides

pub mod error;
pub mod events;
pub mod resources;
pub mod rules;
pub mod session;
pub mod types;

pub use error::{GameError, GameResult};
pub use events::{ChannelObserver, EventBus, GameEvent, GameObserver, TracingObserver};
pub use session::{GameSession, SessionBuilder};
pub use types::{parse_coordinate_move, Square};
