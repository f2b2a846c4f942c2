//! Board state: the authoritative square → piece mapping
//!
//! The board owns every [`Piece`] for the whole game (captured ones keep
//! their data with no square), the side to move and the [`MoveHistory`].
//! Only the session mutates it; move generation reads it.

use std::fmt;

use tracing::{debug, trace};

use crate::game::error::{GameError, GameResult};
use crate::game::resources::{MoveHistory, MoveRecord};
use crate::game::rules::piece::{Move, MoveSpecial, Piece, PieceId, PieceKind, Team};
use crate::game::types::Square;

/// Back-rank piece order from the a-file to the h-file
const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// Spawn order: pawns, kings and queens, then bishops, rooks and knights
const SPAWN_ORDER: [PieceKind; 6] = [
    PieceKind::Pawn,
    PieceKind::King,
    PieceKind::Queen,
    PieceKind::Bishop,
    PieceKind::Rook,
    PieceKind::Knight,
];

#[derive(Debug, Clone)]
pub struct Board {
    squares: [Option<PieceId>; 64],
    pieces: Vec<Piece>,
    turn: Team,
    history: MoveHistory,
}

impl Default for Board {
    fn default() -> Self {
        Board::standard()
    }
}

impl Board {
    /// An empty board with `turn` to move
    pub fn empty(turn: Team) -> Self {
        Self {
            squares: [None; 64],
            pieces: Vec::with_capacity(32),
            turn,
            history: MoveHistory::default(),
        }
    }

    /// The standard starting position, White to move
    pub fn standard() -> Self {
        let mut board = Board::empty(Team::White);
        for kind in SPAWN_ORDER {
            for file in 0..8u8 {
                for team in Team::BOTH {
                    let rank = match kind {
                        PieceKind::Pawn => team.pawn_rank(),
                        _ if BACK_RANK[file as usize] == kind => team.back_rank(),
                        _ => continue,
                    };
                    if let Some(square) = Square::from_coords(file as i8, rank as i8) {
                        board.spawn(kind, team, square, false);
                    }
                }
            }
        }
        board
    }

    /// Place a new piece for a custom setup
    ///
    /// Pawns standing off their starting rank are marked as moved so they
    /// never get a double step.
    pub fn add_piece(
        &mut self,
        kind: PieceKind,
        team: Team,
        square: Square,
    ) -> GameResult<PieceId> {
        let has_moved = kind == PieceKind::Pawn && square.rank().index() != team.pawn_rank();
        self.add_piece_with_state(kind, team, square, has_moved)
    }

    pub fn add_piece_with_state(
        &mut self,
        kind: PieceKind,
        team: Team,
        square: Square,
        has_moved: bool,
    ) -> GameResult<PieceId> {
        if self.squares[square.index()].is_some() {
            return Err(GameError::SquareOccupied { square });
        }
        if kind == PieceKind::King && self.king(team).is_some() {
            return Err(GameError::DuplicateKing { team });
        }
        Ok(self.spawn(kind, team, square, has_moved))
    }

    fn spawn(&mut self, kind: PieceKind, team: Team, square: Square, has_moved: bool) -> PieceId {
        let id = PieceId(self.pieces.len() as u8);
        self.pieces.push(Piece {
            id,
            kind,
            team,
            has_moved,
            square: Some(square),
        });
        self.squares[square.index()] = Some(id);
        trace!("[BOARD] Spawned {:?} {:?} #{} on {}", team, kind, id.0, square);
        id
    }

    pub fn turn(&self) -> Team {
        self.turn
    }

    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    pub(crate) fn history_mut(&mut self) -> &mut MoveHistory {
        &mut self.history
    }

    /// Raw square mapping, a1 first
    pub fn squares(&self) -> &[Option<PieceId>; 64] {
        &self.squares
    }

    pub fn piece(&self, id: PieceId) -> GameResult<&Piece> {
        self.pieces.get(id.0 as usize).ok_or_else(|| GameError::unknown(id))
    }

    /// Every piece ever placed, captured ones included
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Pieces still on the board
    pub fn active_pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter().filter(|piece| !piece.is_captured())
    }

    pub fn pieces_of(&self, team: Team) -> impl Iterator<Item = &Piece> {
        self.active_pieces().filter(move |piece| piece.team == team)
    }

    pub fn piece_id_at(&self, square: Square) -> Option<PieceId> {
        self.squares[square.index()]
    }

    pub fn occupant_at(&self, square: Square) -> Option<&Piece> {
        self.piece_id_at(square).and_then(|id| self.pieces.get(id.0 as usize))
    }

    pub fn is_empty(&self, square: Square) -> bool {
        self.squares[square.index()].is_none()
    }

    pub fn king(&self, team: Team) -> Option<&Piece> {
        self.pieces_of(team).find(|piece| piece.kind == PieceKind::King)
    }

    pub fn king_square(&self, team: Team) -> Option<Square> {
        self.king(team).and_then(|king| king.square)
    }

    /// Put `id` on `square`, lifting it from wherever it stood
    ///
    /// Works for captured pieces too, which is how a move is manually undone.
    pub fn place(&mut self, id: PieceId, square: Square) -> GameResult<()> {
        let current = self.piece(id)?.square;
        match self.squares[square.index()] {
            Some(other) if other != id => return Err(GameError::SquareOccupied { square }),
            _ => {}
        }
        if let Some(old) = current {
            self.squares[old.index()] = None;
        }
        self.squares[square.index()] = Some(id);
        self.pieces[id.0 as usize].square = Some(square);
        Ok(())
    }

    /// Clear `square`; the removed piece keeps its data but leaves the board
    pub fn vacate(&mut self, square: Square) -> Option<PieceId> {
        let id = self.squares[square.index()].take()?;
        self.pieces[id.0 as usize].square = None;
        Some(id)
    }

    pub(crate) fn mark_moved(&mut self, id: PieceId) {
        if let Some(piece) = self.pieces.get_mut(id.0 as usize) {
            piece.has_moved = true;
        }
    }

    /// Apply `mv`, flip the turn and append the move to history
    ///
    /// Validation happens before any mutation: the mover must stand on the
    /// move's origin and a capture may not hit a friendly piece. Turn order is
    /// not checked here.
    pub fn apply_move(&mut self, mv: &Move) -> GameResult<MoveRecord> {
        let (from, to) = (mv.from(), mv.to());
        let mover = self
            .piece_id_at(from)
            .filter(|id| *id == mv.piece())
            .ok_or(GameError::PieceNotFound { square: from })?;
        let (kind, team) = {
            let piece = self.piece(mover)?;
            (piece.kind, piece.team)
        };

        let victim_square = match mv.special() {
            MoveSpecial::EnPassant { captured_square, .. } => captured_square,
            _ => to,
        };
        let victim = self
            .occupant_at(victim_square)
            .map(|piece| (piece.id, piece.kind, piece.team));
        if let Some((_, _, victim_team)) = victim {
            if victim_team == team {
                return Err(GameError::IllegalMove { from, to });
            }
        }

        let captured = victim.map(|(id, kind, _)| {
            self.vacate(victim_square);
            (id, kind)
        });
        self.vacate(from);
        self.squares[to.index()] = Some(mover);
        self.pieces[mover.0 as usize].square = Some(to);
        self.mark_moved(mover);
        self.turn = self.turn.other();

        let record = MoveRecord {
            piece: mover,
            kind,
            team,
            from,
            to,
            captured,
            special: mv.special(),
            gave_check: false,
        };
        debug!("[BOARD] {:?} {:?} {} -> {} (captured: {:?})", team, kind, from, to, captured);
        self.history.add_move(record.clone());
        Ok(record)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8i8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8i8 {
                let symbol = Square::from_coords(file, rank)
                    .and_then(|square| self.occupant_at(square))
                    .map(|piece| piece.kind.symbol(piece.team))
                    .unwrap_or('.');
                write!(f, "{symbol}")?;
                if file < 7 {
                    write!(f, " ")?;
                }
            }
            writeln!(f)?;
        }
        write!(f, "  a b c d e f g h")
    }
}
