//! Check detection
//!
//! A check exists when the raw scan of one of the attacking team's pieces
//! ends on the enemy king. Raw scans are used so a pinned piece still gives
//! check.

use serde::Serialize;
use tracing::debug;

use crate::game::rules::path::path_between;
use crate::game::rules::piece::{PieceId, Team};
use crate::game::rules::piece_moves::MoveGenerator;
use crate::game::types::Square;

/// One piece giving check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckInfo {
    pub checker: PieceId,
    /// Squares a defender may occupy or capture on, ending with the checker's
    /// own square
    pub blocking_squares: Vec<Square>,
}

/// Every check `attacker_team` currently gives the enemy king
///
/// Two entries mean double check.
pub fn find_checks(generator: &MoveGenerator<'_>, attacker_team: Team) -> Vec<CheckInfo> {
    let board = generator.board();
    let defender = attacker_team.other();
    let Some(king) = board.king(defender) else {
        return Vec::new();
    };
    let Some(king_square) = king.square else {
        return Vec::new();
    };
    let king = king.id;

    generator
        .team_scans(attacker_team)
        .filter(|(_, scan)| scan.attacks.contains(&king))
        .filter_map(|(checker, _)| {
            let checker_square = board.piece(checker).ok()?.square?;
            let path = path_between(board, king_square, checker_square);
            let blocking_squares = if path.is_empty() {
                vec![checker_square]
            } else {
                path.squares
            };
            debug!(
                "[RULES] {:?} king on {} checked from {}",
                defender, king_square, checker_square
            );
            Some(CheckInfo { checker, blocking_squares })
        })
        .collect()
}
