//! Path tracing and absolute-pin detection
//!
//! [`path_between`] walks one square at a time from `a` toward `b` along a
//! shared rank, file or diagonal. Pins and check-blocking squares are both
//! built from it.

use tracing::trace;

use crate::game::rules::board_state::Board;
use crate::game::rules::piece::{MoveDir, Piece, PieceId, PieceKind, SpecialRule};
use crate::game::types::Square;

/// Squares walked from `a` to `b` and the pieces found on them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    /// Traversal order, exclusive of `a`, inclusive of `b`
    pub squares: Vec<Square>,
    /// Occupants in traversal order
    pub occupants: Vec<PieceId>,
}

impl Path {
    pub fn is_empty(&self) -> bool {
        self.squares.is_empty()
    }
}

/// The path from `a` to `b`, or an empty path when they are not aligned
pub fn path_between(board: &Board, a: Square, b: Square) -> Path {
    let mut path = Path::default();
    if !a.is_aligned_with(b) {
        return path;
    }

    let (df, dr) = a.delta(b);
    let step = (df.signum(), dr.signum());
    let mut current = a;
    while current != b {
        let Some(next) = current.offset(step.0, step.1) else {
            break;
        };
        current = next;
        path.squares.push(current);
        if let Some(id) = board.piece_id_at(current) {
            path.occupants.push(id);
        }
    }
    path
}

/// Whether `piece` standing on `from` could reach `target` on an empty board
///
/// Pawns only count their capturing diagonal.
pub fn in_reach(piece: &Piece, from: Square, target: Square) -> bool {
    let (df, dr) = from.delta(target);
    if (df, dr) == (0, 0) {
        return false;
    }
    let capability = piece.capability();
    if capability.rule == SpecialRule::Pawn {
        return dr == piece.team.forward() && df.abs() == 1;
    }

    capability.directions.iter().any(|dir| {
        dir.offsets(piece.team).into_iter().any(|(ox, oy)| {
            if *dir == MoveDir::LShaped {
                return (df, dr) == (ox, oy);
            }
            let k = if ox != 0 { df / ox } else { dr / oy };
            k >= 1 && k <= capability.max_distance as i8 && df == k * ox && dr == k * oy
        })
    })
}

/// The pin line of `piece`, if it is absolutely pinned to its king
///
/// `attackers` are the enemy pieces whose rays currently reach `piece`. A
/// candidate pins when the path from the king to the candidate holds exactly
/// two occupants (the piece and the candidate) and the candidate's reach
/// covers the king along that line. The returned squares run from next to
/// the king up to and including the pinner.
pub fn pin_line(board: &Board, piece: &Piece, attackers: &[PieceId]) -> Option<Vec<Square>> {
    if piece.kind == PieceKind::King {
        return None;
    }
    let square = piece.square?;
    let king_square = board.king_square(piece.team)?;

    for &pinner_id in attackers {
        let Ok(pinner) = board.piece(pinner_id) else {
            continue;
        };
        let Some(pinner_square) = pinner.square else {
            continue;
        };
        let path = path_between(board, king_square, pinner_square);
        if path.occupants.len() != 2
            || !path.squares.contains(&square)
            || path.occupants[0] != piece.id
        {
            continue;
        }
        if !in_reach(pinner, pinner_square, king_square) {
            continue;
        }
        trace!(
            "[RULES] {:?} on {} pinned by {:?} on {}",
            piece.kind,
            square,
            pinner.kind,
            pinner_square
        );
        return Some(path.squares);
    }
    None
}
