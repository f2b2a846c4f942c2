//! Per-team state: check status and the derived move/threat aggregate
//!
//! [`PlayerCheckState`] is set by check analysis and cleared explicitly when
//! the team completes a move. [`TeamAggregate`] is rebuilt from scratch after
//! every move; nothing patches it incrementally.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::game::rules::{Move, PieceId, Team};
use crate::game::types::Square;

/// Whether a team is in check and what resolves it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlayerCheckState {
    in_check: bool,
    double_check: bool,
    blocking_squares: Option<Vec<Square>>,
}

impl PlayerCheckState {
    pub fn in_check(&self) -> bool {
        self.in_check
    }

    pub fn double_check(&self) -> bool {
        self.double_check
    }

    /// Squares a non-king piece may occupy or capture on to resolve check
    pub fn blocking_squares(&self) -> Option<&[Square]> {
        self.blocking_squares.as_deref()
    }

    /// Record a checking piece; a second check while already in check is a
    /// double check
    pub fn on_check(&mut self, blocking_squares: Vec<Square>) {
        if self.in_check {
            self.double_check = true;
        }
        self.in_check = true;
        self.blocking_squares = Some(blocking_squares);
    }

    /// Reset to not-in-check; returns whether the team was in check
    pub fn clear(&mut self) -> bool {
        let was_in_check = self.in_check;
        *self = PlayerCheckState::default();
        was_in_check
    }

    /// Whether a non-king piece may land on `square` given the check status
    pub fn permits(&self, square: Square) -> bool {
        if !self.in_check {
            return true;
        }
        if self.double_check {
            return false;
        }
        self.blocking_squares
            .as_ref()
            .is_some_and(|squares| squares.contains(&square))
    }
}

/// Derived state of one piece after a regeneration pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PieceState {
    /// Legal moves
    pub moves: Vec<Move>,
    /// Squares the piece attacks or defends
    pub threats: Vec<Square>,
    /// Enemy pieces its rays reach
    pub attacks: Vec<PieceId>,
}

/// Piece → derived state for every active piece of one team
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamAggregate {
    pieces: BTreeMap<PieceId, PieceState>,
}

impl TeamAggregate {
    pub(crate) fn insert(&mut self, id: PieceId, state: PieceState) {
        self.pieces.insert(id, state);
    }

    pub fn get(&self, id: PieceId) -> Option<&PieceState> {
        self.pieces.get(&id)
    }

    /// Legal moves of `id`, empty if the piece is unknown or captured
    pub fn moves_of(&self, id: PieceId) -> &[Move] {
        self.pieces.get(&id).map(|state| state.moves.as_slice()).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (PieceId, &PieceState)> {
        self.pieces.iter().map(|(id, state)| (*id, state))
    }

    /// Every legal move of the team, in piece order
    pub fn all_moves(&self) -> impl Iterator<Item = &Move> {
        self.pieces.values().flat_map(|state| state.moves.iter())
    }

    pub fn total_moves(&self) -> usize {
        self.pieces.values().map(|state| state.moves.len()).sum()
    }

    /// True if any piece of the team threatens `square`
    pub fn threatens(&self, square: Square) -> bool {
        self.pieces.values().any(|state| state.threats.contains(&square))
    }

    /// Pieces of the team whose rays reach `target`
    pub fn attackers_of(&self, target: PieceId) -> Vec<PieceId> {
        self.pieces
            .iter()
            .filter(|(_, state)| state.attacks.contains(&target))
            .map(|(id, _)| *id)
            .collect()
    }
}

/// Everything the session tracks for one side
#[derive(Debug, Clone)]
pub struct PlayerState {
    pub team: Team,
    pub check: PlayerCheckState,
    pub aggregate: TeamAggregate,
}

impl PlayerState {
    pub fn new(team: Team) -> Self {
        Self {
            team,
            check: PlayerCheckState::default(),
            aggregate: TeamAggregate::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn test_check_then_double_check() {
        let mut state = PlayerCheckState::default();
        assert!(state.permits(sq("a3")));

        state.on_check(vec![sq("e2"), sq("e3")]);
        assert!(state.in_check());
        assert!(!state.double_check());
        assert!(state.permits(sq("e3")));
        assert!(!state.permits(sq("d3")));

        state.on_check(vec![sq("d2")]);
        assert!(state.double_check());
        assert!(!state.permits(sq("d2")), "only the king may move in double check");
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut state = PlayerCheckState::default();
        assert!(!state.clear());
        state.on_check(vec![sq("f7")]);
        assert!(state.clear());
        assert_eq!(state, PlayerCheckState::default());
        assert!(state.blocking_squares().is_none());
    }

    #[test]
    fn test_aggregate_queries() {
        let mut aggregate = TeamAggregate::default();
        let rook = PieceId(3);
        aggregate.insert(
            rook,
            PieceState {
                moves: vec![Move::new(rook, sq("a1"), sq("a2"))],
                threats: vec![sq("a2"), sq("b1")],
                attacks: vec![PieceId(20)],
            },
        );

        assert_eq!(aggregate.moves_of(rook).len(), 1);
        assert!(aggregate.moves_of(PieceId(9)).is_empty());
        assert!(aggregate.threatens(sq("b1")));
        assert!(!aggregate.threatens(sq("c1")));
        assert_eq!(aggregate.attackers_of(PieceId(20)), vec![rook]);
        assert_eq!(aggregate.total_moves(), 1);
    }
}
