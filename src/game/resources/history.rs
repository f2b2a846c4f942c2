//! Move history owned by the board
//!
//! Chronological record of every applied move. Besides review and replay,
//! the en passant rule reads [`MoveHistory::last_move`] to see whether the
//! previous ply was a two-square pawn advance.

use serde::Serialize;

use crate::game::rules::{MoveSpecial, PieceId, PieceKind, Team};
use crate::game::types::Square;

/// One applied move, captured at the moment it was played
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveRecord {
    pub piece: PieceId,
    pub kind: PieceKind,
    pub team: Team,
    pub from: Square,
    pub to: Square,
    /// Piece removed by this move (including an en passant victim)
    pub captured: Option<(PieceId, PieceKind)>,
    pub special: MoveSpecial,
    /// Set by the session once check analysis for this ply has run
    pub gave_check: bool,
}

impl MoveRecord {
    /// True for a pawn advancing two ranks in one move
    pub fn is_double_pawn_advance(&self) -> bool {
        let (_, dr) = self.from.delta(self.to);
        self.kind == PieceKind::Pawn && dr.abs() == 2
    }
}

/// Ordered list of applied moves
///
/// Index 0 = White's first move, index 1 = Black's reply, and so on.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MoveHistory {
    moves: Vec<MoveRecord>,
}

impl MoveHistory {
    pub fn add_move(&mut self, record: MoveRecord) {
        self.moves.push(record);
    }

    /// Get the most recent move, if any
    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.moves.last()
    }

    pub(crate) fn last_move_mut(&mut self) -> Option<&mut MoveRecord> {
        self.moves.last_mut()
    }

    /// Number of half-moves (ply) made
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Get a specific move by ply index
    pub fn get_move(&self, index: usize) -> Option<&MoveRecord> {
        self.moves.get(index)
    }

    /// Iterate over all moves in chronological order
    pub fn iter(&self) -> std::slice::Iter<'_, MoveRecord> {
        self.moves.iter()
    }
}
