//! Captured pieces tracking
//!
//! Tracks pieces captured by each side and the resulting material balance.
//!
//! # Material Values
//!
//! Standard chess piece values in pawns:
//! - Pawn: 1
//! - Knight/Bishop: 3
//! - Rook: 5
//! - Queen: 9
//! - King: 0 (never captured in a legal game)
//!
//! Positive advantage means White is ahead, negative means Black is ahead.

use serde::Serialize;

use crate::game::rules::{PieceKind, Team};

/// Pieces taken by each side
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CapturedPieces {
    /// Pieces captured by white (black pieces taken)
    pub white_captured: Vec<PieceKind>,
    /// Pieces captured by black (white pieces taken)
    pub black_captured: Vec<PieceKind>,
}

impl CapturedPieces {
    /// Record a capture of a `captured_team` piece
    pub fn add_capture(&mut self, captured_team: Team, kind: PieceKind) {
        match captured_team {
            Team::White => self.black_captured.push(kind),
            Team::Black => self.white_captured.push(kind),
        }
    }

    /// Pieces `team` has taken from its opponent
    pub fn taken_by(&self, team: Team) -> &[PieceKind] {
        match team {
            Team::White => &self.white_captured,
            Team::Black => &self.black_captured,
        }
    }

    /// Material difference in pawn units, White minus Black
    pub fn material_advantage(&self) -> i32 {
        let white_score: i32 = self.white_captured.iter().map(|p| piece_value(*p)).sum();
        let black_score: i32 = self.black_captured.iter().map(|p| piece_value(*p)).sum();
        white_score - black_score
    }
}

/// Pawn-unit value of a piece kind
pub fn piece_value(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::Pawn => 1,
        PieceKind::Knight => 3,
        PieceKind::Bishop => 3,
        PieceKind::Rook => 5,
        PieceKind::Queen => 9,
        PieceKind::King => 0,
    }
}
