//! Piece data: teams, kinds and data-driven movement capability
//!
//! A piece's movement is not encoded in per-kind code paths. Each
//! [`PieceKind`] resolves, through one closed `match`, to a [`Capability`]
//! record: the directions it may travel, how far it may slide, and which
//! special rule (pawn capture asymmetry, castling) applies on top.

use serde::{Deserialize, Serialize};

use crate::game::rules::special::CastleSide;
use crate::game::types::Square;

/// Side a piece plays for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    White,
    Black,
}

impl Team {
    pub const BOTH: [Team; 2] = [Team::White, Team::Black];

    /// The opposing team
    pub fn other(self) -> Team {
        match self {
            Team::White => Team::Black,
            Team::Black => Team::White,
        }
    }

    /// Rank step of "forward": White toward rank 8, Black toward rank 1
    pub fn forward(self) -> i8 {
        match self {
            Team::White => 1,
            Team::Black => -1,
        }
    }

    /// Rank index of the team's back rank
    pub fn back_rank(self) -> u8 {
        match self {
            Team::White => 0,
            Team::Black => 7,
        }
    }

    /// Rank index pawns start on
    pub fn pawn_rank(self) -> u8 {
        match self {
            Team::White => 1,
            Team::Black => 6,
        }
    }

    /// Rank index a pawn must stand on to capture en passant (5th rank relative)
    pub fn en_passant_rank(self) -> u8 {
        match self {
            Team::White => 4,
            Team::Black => 3,
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

/// Movement direction flag, relative to the moving piece's team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveDir {
    Forward,
    Backward,
    Left,
    Right,
    Diagonal,
    LShaped,
}

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (-1, 2),
    (-2, 1),
    (-2, -1),
    (1, -2),
    (-1, -2),
    (2, 1),
    (2, -1),
];

impl MoveDir {
    /// Concrete (file, rank) unit offsets for a piece of `team`
    ///
    /// Forward/Backward/Left/Right are mirrored by team orientation. Diagonal
    /// yields the four diagonal rays, LShaped the eight knight jumps.
    pub fn offsets(self, team: Team) -> Vec<(i8, i8)> {
        let f = team.forward();
        match self {
            MoveDir::Forward => vec![(0, f)],
            MoveDir::Backward => vec![(0, -f)],
            MoveDir::Left => vec![(-f, 0)],
            MoveDir::Right => vec![(f, 0)],
            MoveDir::Diagonal => vec![(1, f), (-1, f), (-1, -f), (1, -f)],
            MoveDir::LShaped => KNIGHT_OFFSETS.to_vec(),
        }
    }
}

/// Rule layered on top of the plain directional scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialRule {
    None,
    /// Forward moves never capture, diagonals only capture, double step
    /// while unmoved, en passant
    Pawn,
    /// King-side and queen-side castling while unmoved
    Castling,
}

/// Data record describing how a piece kind moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability {
    pub directions: &'static [MoveDir],
    pub max_distance: u8,
    pub rule: SpecialRule,
}

impl Capability {
    /// Slide distance for a piece that has or has not moved yet
    pub fn distance(&self, has_moved: bool) -> u8 {
        match self.rule {
            SpecialRule::Pawn if !has_moved => 2,
            _ => self.max_distance,
        }
    }
}

const ORTHOGONAL: &[MoveDir] = &[
    MoveDir::Forward,
    MoveDir::Backward,
    MoveDir::Left,
    MoveDir::Right,
];
const ROYAL: &[MoveDir] = &[
    MoveDir::Forward,
    MoveDir::Backward,
    MoveDir::Left,
    MoveDir::Right,
    MoveDir::Diagonal,
];

impl PieceKind {
    pub fn capability(self) -> Capability {
        match self {
            PieceKind::King => Capability {
                directions: ROYAL,
                max_distance: 1,
                rule: SpecialRule::Castling,
            },
            PieceKind::Queen => Capability {
                directions: ROYAL,
                max_distance: 8,
                rule: SpecialRule::None,
            },
            PieceKind::Rook => Capability {
                directions: ORTHOGONAL,
                max_distance: 8,
                rule: SpecialRule::None,
            },
            PieceKind::Bishop => Capability {
                directions: &[MoveDir::Diagonal],
                max_distance: 8,
                rule: SpecialRule::None,
            },
            PieceKind::Knight => Capability {
                directions: &[MoveDir::LShaped],
                max_distance: 1,
                rule: SpecialRule::None,
            },
            PieceKind::Pawn => Capability {
                directions: &[MoveDir::Forward, MoveDir::Diagonal],
                max_distance: 1,
                rule: SpecialRule::Pawn,
            },
        }
    }

    /// Single-letter symbol, uppercase for White
    pub fn symbol(self, team: Team) -> char {
        let c = match self {
            PieceKind::King => 'k',
            PieceKind::Queen => 'q',
            PieceKind::Rook => 'r',
            PieceKind::Bishop => 'b',
            PieceKind::Knight => 'n',
            PieceKind::Pawn => 'p',
        };
        match team {
            Team::White => c.to_ascii_uppercase(),
            Team::Black => c,
        }
    }
}

/// Stable handle to a piece for the whole game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(pub u8);

/// A piece and its mutable game state
///
/// Pieces are never recreated; a captured piece keeps its data with
/// `square == None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Piece {
    pub id: PieceId,
    pub kind: PieceKind,
    pub team: Team,
    pub has_moved: bool,
    pub square: Option<Square>,
}

impl Piece {
    pub fn capability(&self) -> Capability {
        self.kind.capability()
    }

    /// Slide distance for this move generation pass
    pub fn max_distance(&self) -> u8 {
        self.capability().distance(self.has_moved)
    }

    pub fn is_captured(&self) -> bool {
        self.square.is_none()
    }
}

/// What kind of move beyond a plain relocation/capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MoveSpecial {
    Normal,
    /// Captured pawn stands on `captured_square`, not on the destination
    EnPassant { captured: PieceId, captured_square: Square },
    Castle { side: CastleSide },
}

/// A generated move; immutable once constructed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    piece: PieceId,
    from: Square,
    to: Square,
    special: MoveSpecial,
}

impl Move {
    pub fn new(piece: PieceId, from: Square, to: Square) -> Self {
        Move { piece, from, to, special: MoveSpecial::Normal }
    }

    pub fn en_passant(
        piece: PieceId,
        from: Square,
        to: Square,
        captured: PieceId,
        captured_square: Square,
    ) -> Self {
        Move {
            piece,
            from,
            to,
            special: MoveSpecial::EnPassant { captured, captured_square },
        }
    }

    pub fn castle(piece: PieceId, from: Square, to: Square, side: CastleSide) -> Self {
        Move { piece, from, to, special: MoveSpecial::Castle { side } }
    }

    pub fn piece(&self) -> PieceId {
        self.piece
    }

    pub fn from(&self) -> Square {
        self.from
    }

    pub fn to(&self) -> Square {
        self.to
    }

    pub fn special(&self) -> MoveSpecial {
        self.special
    }

    pub fn is_en_passant(&self) -> bool {
        matches!(self.special, MoveSpecial::EnPassant { .. })
    }

    pub fn is_castle(&self) -> bool {
        matches!(self.special, MoveSpecial::Castle { .. })
    }

    pub fn castle_side(&self) -> Option<CastleSide> {
        match self.special {
            MoveSpecial::Castle { side } => Some(side),
            _ => None,
        }
    }

    /// The en passant victim; normal captures are read from the board
    pub fn captured_piece(&self) -> Option<PieceId> {
        match self.special {
            MoveSpecial::EnPassant { captured, .. } => Some(captured),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_is_team_relative() {
        assert_eq!(MoveDir::Forward.offsets(Team::White), vec![(0, 1)]);
        assert_eq!(MoveDir::Forward.offsets(Team::Black), vec![(0, -1)]);
        assert_eq!(MoveDir::LShaped.offsets(Team::Black).len(), 8);
    }

    #[test]
    fn test_capabilities() {
        assert_eq!(PieceKind::Queen.capability().max_distance, 8);
        assert_eq!(PieceKind::King.capability().rule, SpecialRule::Castling);
        assert_eq!(PieceKind::Rook.capability().directions.len(), 4);
        assert_eq!(PieceKind::Pawn.capability().distance(false), 2);
        assert_eq!(PieceKind::Knight.capability().distance(false), 1);
    }

    #[test]
    fn test_pawn_distance_depends_on_has_moved() {
        let mut pawn = Piece {
            id: PieceId(0),
            kind: PieceKind::Pawn,
            team: Team::White,
            has_moved: false,
            square: Square::from_algebraic("e2").ok(),
        };
        assert_eq!(pawn.max_distance(), 2);
        pawn.has_moved = true;
        assert_eq!(pawn.max_distance(), 1);
    }

    #[test]
    fn test_symbols() {
        assert_eq!(PieceKind::Knight.symbol(Team::White), 'N');
        assert_eq!(PieceKind::Knight.symbol(Team::Black), 'n');
    }
}
