//! Castling and en passant
//!
//! Both rules are layered on top of the directional scan: the generator asks
//! for candidates here once the plain moves of a king or pawn are known.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::game::error::{GameError, GameResult};
use crate::game::rules::board_state::Board;
use crate::game::rules::piece::{Move, Piece, PieceId, PieceKind, SpecialRule, Team};
use crate::game::types::Square;

/// King file on the back rank for castling
const KING_FILE: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CastleSide {
    KingSide,
    QueenSide,
}

impl CastleSide {
    pub const BOTH: [CastleSide; 2] = [CastleSide::KingSide, CastleSide::QueenSide];

    /// File the rook starts on
    pub fn rook_file(self) -> u8 {
        match self {
            CastleSide::KingSide => 7,
            CastleSide::QueenSide => 0,
        }
    }

    /// File the rook lands on
    pub fn rook_target_file(self) -> u8 {
        match self {
            CastleSide::KingSide => 5,
            CastleSide::QueenSide => 3,
        }
    }

    /// File the king lands on
    pub fn king_target_file(self) -> u8 {
        match self {
            CastleSide::KingSide => 6,
            CastleSide::QueenSide => 2,
        }
    }

    /// Files strictly between king and rook, all of which must be empty
    pub fn between_files(self) -> &'static [u8] {
        match self {
            CastleSide::KingSide => &[5, 6],
            CastleSide::QueenSide => &[1, 2, 3],
        }
    }

    /// King start, the square it passes and its destination
    pub fn transit_files(self) -> [u8; 3] {
        match self {
            CastleSide::KingSide => [4, 5, 6],
            CastleSide::QueenSide => [4, 3, 2],
        }
    }

    /// Side whose king destination is `to`, when `from` is a king start square
    pub fn from_king_step(from: Square, to: Square) -> Option<CastleSide> {
        if from.rank() != to.rank() || from.file().index() != KING_FILE {
            return None;
        }
        CastleSide::BOTH
            .into_iter()
            .find(|side| side.king_target_file() == to.file().index())
    }
}

fn back_rank_square(team: Team, file: u8) -> Option<Square> {
    Square::new(file, team.back_rank()).ok()
}

/// The unmoved friendly rook castling on `side` would use, if present
fn castling_rook(board: &Board, team: Team, side: CastleSide) -> Option<&Piece> {
    let square = back_rank_square(team, side.rook_file())?;
    board
        .occupant_at(square)
        .filter(|rook| rook.kind == PieceKind::Rook && rook.team == team && !rook.has_moved)
}

/// Castle moves available to `king`
///
/// `threatened` reports whether the enemy currently covers a square. The king
/// must be unmoved on its start square, every square between king and rook
/// empty, the rook unmoved, and no transit square threatened.
pub fn castling_moves(
    board: &Board,
    king: &Piece,
    threatened: impl Fn(Square) -> bool,
) -> Vec<Move> {
    let mut moves = Vec::new();
    if king.capability().rule != SpecialRule::Castling || king.has_moved {
        return moves;
    }
    let team = king.team;
    let Some(from) = king.square else {
        return moves;
    };
    if Some(from) != back_rank_square(team, KING_FILE) {
        return moves;
    }

    for side in CastleSide::BOTH {
        if castling_rook(board, team, side).is_none() {
            continue;
        }
        let path_clear = side
            .between_files()
            .iter()
            .filter_map(|file| back_rank_square(team, *file))
            .all(|square| board.is_empty(square));
        if !path_clear {
            continue;
        }
        let transit_safe = side
            .transit_files()
            .iter()
            .filter_map(|file| back_rank_square(team, *file))
            .all(|square| !threatened(square));
        if !transit_safe {
            debug!("[RULES] {:?} {:?} castling revoked: transit square attacked", team, side);
            continue;
        }
        if let Some(to) = back_rank_square(team, side.king_target_file()) {
            moves.push(Move::castle(king.id, from, to, side));
        }
    }
    moves
}

/// En passant candidate for `pawn`, before king-safety checks
///
/// Only a pawn on its en passant rank qualifies, and only right after an
/// enemy double step landing beside it.
pub fn en_passant_move(board: &Board, pawn: &Piece) -> Option<Move> {
    if pawn.capability().rule != SpecialRule::Pawn {
        return None;
    }
    let from = pawn.square?;
    if from.rank().index() != pawn.team.en_passant_rank() {
        return None;
    }

    let last = board.history().last_move()?;
    if last.team == pawn.team || !last.is_double_pawn_advance() {
        return None;
    }
    let victim_square = last.to;
    let (df, dr) = from.delta(victim_square);
    if dr != 0 || df.abs() != 1 {
        return None;
    }
    if board.piece_id_at(victim_square) != Some(last.piece) {
        return None;
    }

    let to = victim_square.offset(0, pawn.team.forward())?;
    if !board.is_empty(to) {
        return None;
    }
    Some(Move::en_passant(pawn.id, from, to, last.piece, victim_square))
}

/// Move the castling rook beside the king
///
/// Runs before the king itself moves. The rook's own move rules are bypassed.
/// A missing or moved rook means the board and the legal move lists have
/// diverged, which is reported as [`GameError::CastlingRookMissing`] without
/// touching the board.
pub fn rook_castle(board: &mut Board, team: Team, side: CastleSide) -> GameResult<PieceId> {
    let off_board = |file: u8| GameError::InvalidCoordinates {
        file: file as i16,
        rank: team.back_rank() as i16,
    };
    let corner = back_rank_square(team, side.rook_file())
        .ok_or_else(|| off_board(side.rook_file()))?;
    let target = back_rank_square(team, side.rook_target_file())
        .ok_or_else(|| off_board(side.rook_target_file()))?;

    let Some(rook) = castling_rook(board, team, side).map(|rook| rook.id) else {
        error!("[RULES] {:?} {:?} castle has no rook on {}", team, side, corner);
        return Err(GameError::CastlingRookMissing { square: corner });
    };

    board.place(rook, target)?;
    board.mark_moved(rook);
    info!("[RULES] {:?} rook {} -> {} ({:?})", team, corner, target, side);
    Ok(rook)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn test_side_geometry() {
        assert_eq!(CastleSide::KingSide.king_target_file(), 6);
        assert_eq!(CastleSide::QueenSide.rook_target_file(), 3);
        assert_eq!(CastleSide::QueenSide.between_files().len(), 3);
        assert_eq!(CastleSide::from_king_step(sq("e1"), sq("g1")), Some(CastleSide::KingSide));
        assert_eq!(CastleSide::from_king_step(sq("e8"), sq("c8")), Some(CastleSide::QueenSide));
        assert_eq!(CastleSide::from_king_step(sq("e1"), sq("f1")), None);
    }

    #[test]
    fn test_castling_needs_unmoved_rook() {
        let mut board = Board::empty(Team::White);
        let king = board.add_piece(PieceKind::King, Team::White, sq("e1")).unwrap();
        board
            .add_piece_with_state(PieceKind::Rook, Team::White, sq("h1"), true)
            .unwrap();
        board.add_piece(PieceKind::Rook, Team::White, sq("a1")).unwrap();

        let king = board.piece(king).unwrap().clone();
        let moves = castling_moves(&board, &king, |_| false);
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].castle_side(), Some(CastleSide::QueenSide));
        assert_eq!(moves[0].to(), sq("c1"));
    }

    #[test]
    fn test_castling_blocked_and_threatened() {
        let mut board = Board::empty(Team::White);
        let king = board.add_piece(PieceKind::King, Team::White, sq("e1")).unwrap();
        board.add_piece(PieceKind::Rook, Team::White, sq("h1")).unwrap();
        board.add_piece(PieceKind::Rook, Team::White, sq("a1")).unwrap();
        board.add_piece(PieceKind::Knight, Team::White, sq("b1")).unwrap();

        let king = board.piece(king).unwrap().clone();
        let moves = castling_moves(&board, &king, |square| square == sq("f1"));
        assert!(moves.is_empty(), "queen side blocked on b1, king side threatened on f1");
    }

    #[test]
    fn test_rook_castle_relocates_rook() {
        let mut board = Board::empty(Team::White);
        board.add_piece(PieceKind::King, Team::White, sq("e1")).unwrap();
        let rook = board.add_piece(PieceKind::Rook, Team::White, sq("h1")).unwrap();

        assert_eq!(rook_castle(&mut board, Team::White, CastleSide::KingSide).unwrap(), rook);
        assert_eq!(board.piece_id_at(sq("f1")), Some(rook));
        assert!(board.is_empty(sq("h1")));
        assert!(board.piece(rook).unwrap().has_moved);
    }

    #[test]
    fn test_rook_castle_missing_rook_is_fatal() {
        let mut board = Board::empty(Team::Black);
        board.add_piece(PieceKind::King, Team::Black, sq("e8")).unwrap();
        let before = *board.squares();

        let err = rook_castle(&mut board, Team::Black, CastleSide::QueenSide).unwrap_err();
        assert_eq!(err, GameError::CastlingRookMissing { square: sq("a8") });
        assert_eq!(*board.squares(), before);
    }
}
