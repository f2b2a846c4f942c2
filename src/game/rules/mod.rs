//! Chess rules module - pure game logic with no event or session coupling
//!
//! Move generation, pin and check analysis and the special moves all read a
//! [`Board`] and never mutate it; only [`GameSession`](crate::game::GameSession)
//! applies moves.
//!
//! # Module Structure
//!
//! - `piece` - teams, kinds, data-driven movement capability, moves
//! - `board_state` - square → piece mapping, turn and history
//! - `path` - path tracing between aligned squares and pin detection
//! - `piece_moves` - raw ray scans and legal-move filtering
//! - `check` - check and double-check detection
//! - `special` - castling and en passant

pub mod board_state;
pub mod check;
pub mod path;
pub mod piece;
pub mod piece_moves;
pub mod special;


// Re-export commonly used items
pub use board_state::Board;
pub use check::{find_checks, CheckInfo};
pub use path::{in_reach, path_between, pin_line, Path};
pub use piece::{
    Capability, Move, MoveDir, MoveSpecial, Piece, PieceId, PieceKind, SpecialRule, Team,
};
pub use piece_moves::{attacked_by, scan_piece, MoveGenerator, Overlay, PieceScan};
pub use special::{castling_moves, en_passant_move, rook_castle, CastleSide};
