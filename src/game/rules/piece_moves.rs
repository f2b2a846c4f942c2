//! Move generation
//!
//! Generation runs in two stages. [`scan_piece`] walks each direction of a
//! piece's [`Capability`](super::Capability) over the current board and
//! records pseudo-legal moves, threatened squares and attacked pieces. The
//! [`MoveGenerator`] then holds the scans of every active piece and filters
//! them into legal moves: pins, check blocking and king safety.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::game::error::GameResult;
use crate::game::resources::{PieceState, PlayerCheckState, TeamAggregate};
use crate::game::rules::board_state::Board;
use crate::game::rules::path::{in_reach, path_between, pin_line};
use crate::game::rules::piece::{
    Capability, Move, MoveDir, MoveSpecial, Piece, PieceId, SpecialRule, Team,
};
use crate::game::rules::special::{castling_moves, en_passant_move};
use crate::game::types::Square;

/// Raw result of walking a piece's rays
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PieceScan {
    /// Pseudo-legal moves, ignoring pins and check
    pub moves: Vec<Move>,
    /// Squares attacked or defended
    pub threats: Vec<Square>,
    /// Enemy pieces a ray ends on
    pub attacks: Vec<PieceId>,
}

/// Walk every ray of `piece` over `board`
///
/// Empty squares are quiet moves and threats; the first enemy is a capture and
/// an attack; the first friendly piece is a defended square. Under the pawn
/// rule, pushes never threaten or capture and diagonals only capture, one
/// step forward.
pub fn scan_piece(board: &Board, piece: &Piece) -> PieceScan {
    scan_with(board, piece, piece.capability())
}

/// [`scan_piece`] with an explicit capability record
pub(crate) fn scan_with(board: &Board, piece: &Piece, capability: Capability) -> PieceScan {
    let mut scan = PieceScan::default();
    let Some(from) = piece.square else {
        return scan;
    };
    let max_distance = capability.distance(piece.has_moved) as i8;
    let pawn_rule = capability.rule == SpecialRule::Pawn;

    for dir in capability.directions {
        let steps = if *dir == MoveDir::LShaped { 1 } else { max_distance };
        for (df, dr) in dir.offsets(piece.team) {
            if pawn_rule && *dir == MoveDir::Diagonal {
                if dr == piece.team.forward() {
                    scan_pawn_capture(board, piece, from, (df, dr), &mut scan);
                }
                continue;
            }

            let mut current = from;
            for _ in 0..steps {
                let Some(next) = current.offset(df, dr) else {
                    break;
                };
                current = next;
                match board.occupant_at(current) {
                    None => {
                        scan.moves.push(Move::new(piece.id, from, current));
                        if !pawn_rule {
                            scan.threats.push(current);
                        }
                    }
                    Some(other) if pawn_rule => {
                        trace!("[RULES] pawn push from {} stopped by {:?}", from, other.kind);
                        break;
                    }
                    Some(other) if other.team != piece.team => {
                        scan.moves.push(Move::new(piece.id, from, current));
                        scan.threats.push(current);
                        scan.attacks.push(other.id);
                        break;
                    }
                    Some(_) => {
                        scan.threats.push(current);
                        break;
                    }
                }
            }
        }
    }
    scan
}

fn scan_pawn_capture(
    board: &Board,
    pawn: &Piece,
    from: Square,
    (df, dr): (i8, i8),
    scan: &mut PieceScan,
) {
    let Some(target) = from.offset(df, dr) else {
        return;
    };
    scan.threats.push(target);
    if let Some(other) = board.occupant_at(target) {
        if other.team != pawn.team {
            scan.moves.push(Move::new(pawn.id, from, target));
            scan.attacks.push(other.id);
        }
    }
}

/// Board occupancy as it would be after a move, without touching the board
#[derive(Debug, Clone, Copy, Default)]
pub struct Overlay<'s> {
    /// Squares treated as empty
    pub vacated: &'s [Square],
    /// Squares treated as occupied
    pub occupied: &'s [Square],
}

impl Overlay<'_> {
    fn is_occupied(&self, board: &Board, square: Square) -> bool {
        self.occupied.contains(&square)
            || (!self.vacated.contains(&square) && !board.is_empty(square))
    }
}

/// Whether any piece of `by_team` attacks `target` under `overlay`
///
/// A piece standing on `target` or on a vacated square is treated as
/// captured and does not count.
pub fn attacked_by(board: &Board, target: Square, by_team: Team, overlay: Overlay<'_>) -> bool {
    board.pieces_of(by_team).any(|piece| {
        let Some(from) = piece.square else {
            return false;
        };
        if from == target || overlay.vacated.contains(&from) || !in_reach(piece, from, target) {
            return false;
        }
        path_between(board, from, target)
            .squares
            .iter()
            .filter(|square| **square != target)
            .all(|square| !overlay.is_occupied(board, *square))
    })
}

/// Legal move computation over one board snapshot
///
/// Scans every active piece once on construction. Nothing here mutates the
/// board, so generating twice yields identical lists.
pub struct MoveGenerator<'a> {
    board: &'a Board,
    scans: BTreeMap<PieceId, PieceScan>,
}

impl<'a> MoveGenerator<'a> {
    pub fn new(board: &'a Board) -> Self {
        let scans = board
            .active_pieces()
            .map(|piece| (piece.id, scan_piece(board, piece)))
            .collect();
        Self { board, scans }
    }

    pub fn board(&self) -> &'a Board {
        self.board
    }

    pub fn scan(&self, id: PieceId) -> Option<&PieceScan> {
        self.scans.get(&id)
    }

    /// Scans of the active pieces of `team`, in id order
    pub fn team_scans(&self, team: Team) -> impl Iterator<Item = (PieceId, &PieceScan)> + '_ {
        self.scans.iter().filter_map(move |(id, scan)| {
            let piece = self.board.piece(*id).ok()?;
            (piece.team == team).then_some((*id, scan))
        })
    }

    /// Whether any piece of `team` covers `square` in its raw scan
    pub fn threatened_by(&self, team: Team, square: Square) -> bool {
        self.team_scans(team).any(|(_, scan)| scan.threats.contains(&square))
    }

    /// Enemy pieces whose rays end on `target`
    pub fn attackers_of(&self, target: PieceId) -> Vec<PieceId> {
        let Ok(piece) = self.board.piece(target) else {
            return Vec::new();
        };
        self.team_scans(piece.team.other())
            .filter(|(_, scan)| scan.attacks.contains(&target))
            .map(|(id, _)| id)
            .collect()
    }

    /// Squares `id` may still move to if it is absolutely pinned
    pub fn pin_line(&self, id: PieceId) -> Option<Vec<Square>> {
        let piece = self.board.piece(id).ok()?;
        pin_line(self.board, piece, &self.attackers_of(id))
    }

    /// Legal moves of `id` given its team's check status
    ///
    /// Captured pieces have no moves. In double check only the king moves.
    /// The piece's special rule picks the extra steps: king safety and
    /// castling, or en passant.
    pub fn legal_moves(&self, id: PieceId, check: &PlayerCheckState) -> GameResult<Vec<Move>> {
        let piece = self.board.piece(id)?;
        let Some(scan) = self.scans.get(&id) else {
            return Ok(Vec::new());
        };

        let moves = match piece.capability().rule {
            SpecialRule::Castling => self.king_moves(piece, scan),
            _ if check.double_check() => Vec::new(),
            SpecialRule::Pawn => {
                let mut moves = self.piece_moves(piece, scan, check);
                moves.extend(
                    en_passant_move(self.board, piece)
                        .filter(|mv| self.en_passant_is_legal(piece, mv, check)),
                );
                moves
            }
            SpecialRule::None => self.piece_moves(piece, scan, check),
        };
        trace!(
            "[RULES] {:?} {:?} #{} has {} legal moves",
            piece.team,
            piece.kind,
            id.0,
            moves.len()
        );
        Ok(moves)
    }

    fn king_moves(&self, king: &Piece, scan: &PieceScan) -> Vec<Move> {
        let enemy = king.team.other();
        let origin = king.square.into_iter().collect::<Vec<_>>();
        let overlay = Overlay { vacated: &origin, occupied: &[] };
        let mut moves: Vec<Move> = scan
            .moves
            .iter()
            .filter(|mv| !attacked_by(self.board, mv.to(), enemy, overlay))
            .copied()
            .collect();
        moves.extend(castling_moves(self.board, king, |square| self.threatened_by(enemy, square)));
        moves
    }

    /// Scan moves that stay on the pin line and resolve any check
    ///
    /// A pinned knight ends up with nothing: none of its jumps lands on a line.
    fn piece_moves(&self, piece: &Piece, scan: &PieceScan, check: &PlayerCheckState) -> Vec<Move> {
        let pin = self.pin_line(piece.id);
        let on_pin_line = |square: Square| pin.as_ref().is_none_or(|line| line.contains(&square));

        scan.moves
            .iter()
            .filter(|mv| on_pin_line(mv.to()) && check.permits(mv.to()))
            .copied()
            .collect()
    }

    /// En passant resolves check by landing on a blocking square or by taking
    /// the checker, and must not expose the king once both pawns leave
    /// their squares.
    fn en_passant_is_legal(&self, pawn: &Piece, mv: &Move, check: &PlayerCheckState) -> bool {
        let MoveSpecial::EnPassant { captured_square, .. } = mv.special() else {
            return false;
        };
        if !check.permits(mv.to()) && !check.permits(captured_square) {
            return false;
        }
        let Some(king_square) = self.board.king_square(pawn.team) else {
            return true;
        };
        let vacated = [mv.from(), captured_square];
        let occupied = [mv.to()];
        let overlay = Overlay { vacated: &vacated, occupied: &occupied };
        let safe = !attacked_by(self.board, king_square, pawn.team.other(), overlay);
        if !safe {
            debug!("[RULES] en passant {} -> {} would expose the king", mv.from(), mv.to());
        }
        safe
    }

    /// Derived state of one piece: legal moves plus its raw threats and attacks
    pub fn piece_state(&self, id: PieceId, check: &PlayerCheckState) -> GameResult<PieceState> {
        let moves = self.legal_moves(id, check)?;
        let (threats, attacks) = self
            .scans
            .get(&id)
            .map(|scan| (scan.threats.clone(), scan.attacks.clone()))
            .unwrap_or_default();
        Ok(PieceState { moves, threats, attacks })
    }

    /// Rebuild the aggregate of every active piece of `team`
    pub fn aggregate(&self, team: Team, check: &PlayerCheckState) -> GameResult<TeamAggregate> {
        let mut aggregate = TeamAggregate::default();
        for piece in self.board.pieces_of(team) {
            aggregate.insert(piece.id, self.piece_state(piece.id, check)?);
        }
        debug!("[RULES] {:?} aggregate rebuilt: {} legal moves", team, aggregate.total_moves());
        Ok(aggregate)
    }
}
