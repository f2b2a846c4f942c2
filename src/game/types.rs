//! Square geometry for the rules engine
//!
//! Provides newtypes for files, ranks and squares plus the coordinate
//! arithmetic the move generator and path analyzer build on. Every [`Square`]
//! that exists is on the board; anything outside 8x8 is rejected at
//! construction with [`GameError::InvalidSquare`] or
//! [`GameError::InvalidCoordinates`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::game::error::{GameError, GameResult};

/// Board coordinate representing a file (column) on the chessboard
///
/// Values range from 0 (file 'a') to 7 (file 'h').
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct File(u8);

impl File {
    /// Create a file from a character ('a'..='h')
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'a'..='h' => Some(File(c as u8 - b'a')),
            _ => None,
        }
    }

    /// Convert file to character ('a'..='h')
    pub fn to_char(self) -> char {
        (b'a' + self.0) as char
    }

    /// Get the file index (0-7)
    pub fn index(self) -> u8 {
        self.0
    }
}

/// Board coordinate representing a rank (row) on the chessboard
///
/// Values range from 0 (rank 1) to 7 (rank 8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rank(u8);

impl Rank {
    /// Create a rank from a number (1-8)
    pub fn from_number(n: u8) -> Option<Self> {
        if (1..=8).contains(&n) {
            Some(Rank(n - 1))
        } else {
            None
        }
    }

    /// Convert rank to number (1-8)
    pub fn to_number(self) -> u8 {
        self.0 + 1
    }

    /// Get the rank index (0-7)
    pub fn index(self) -> u8 {
        self.0
    }
}

/// Board square position (file, rank)
///
/// Canonical string form is `"<file><rank>"`, e.g. `"e4"`. Serialized as that
/// string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Square {
    file: File,
    rank: Rank,
}

impl Square {
    /// Create a square from file and rank indices (0-7 each)
    pub fn new(file: u8, rank: u8) -> GameResult<Self> {
        if file < 8 && rank < 8 {
            Ok(Square { file: File(file), rank: Rank(rank) })
        } else {
            Err(GameError::InvalidCoordinates { file: file as i16, rank: rank as i16 })
        }
    }

    /// Signed-coordinate constructor used while walking rays; `None` off-board
    pub fn from_coords(file: i8, rank: i8) -> Option<Self> {
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Some(Square { file: File(file as u8), rank: Rank(rank as u8) })
        } else {
            None
        }
    }

    /// Create a square from algebraic notation (e.g., "e4")
    pub fn from_algebraic(s: &str) -> GameResult<Self> {
        let invalid = || GameError::InvalidSquare { notation: s.to_string() };
        let mut chars = s.chars();
        let file = chars.next().and_then(File::from_char).ok_or_else(invalid)?;
        let rank = chars
            .next()
            .and_then(|c| c.to_digit(10))
            .and_then(|n| Rank::from_number(n as u8))
            .ok_or_else(invalid)?;
        if chars.next().is_some() {
            return Err(invalid());
        }
        Ok(Square { file, rank })
    }

    /// Convert square to algebraic notation (e.g., "e4")
    pub fn to_algebraic(self) -> String {
        format!("{}{}", self.file.to_char(), self.rank.to_number())
    }

    pub fn file(self) -> File {
        self.file
    }

    pub fn rank(self) -> Rank {
        self.rank
    }

    /// Dense index 0..64, a1 = 0, h1 = 7, a8 = 56
    pub fn index(self) -> usize {
        self.rank.0 as usize * 8 + self.file.0 as usize
    }

    /// The square `(df, dr)` away, or `None` if that leaves the board
    pub fn offset(self, df: i8, dr: i8) -> Option<Self> {
        Square::from_coords(self.file.0 as i8 + df, self.rank.0 as i8 + dr)
    }

    /// Signed (file, rank) delta from `self` to `other`
    pub fn delta(self, other: Square) -> (i8, i8) {
        (
            other.file.0 as i8 - self.file.0 as i8,
            other.rank.0 as i8 - self.rank.0 as i8,
        )
    }

    /// King-step distance between two squares
    pub fn distance(self, other: Square) -> u8 {
        let (df, dr) = self.delta(other);
        df.unsigned_abs().max(dr.unsigned_abs())
    }

    /// True when both squares share a rank, file or diagonal
    pub fn is_aligned_with(self, other: Square) -> bool {
        let (df, dr) = self.delta(other);
        self != other && (df == 0 || dr == 0 || df.abs() == dr.abs())
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file.to_char(), self.rank.to_number())
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for Square {
    type Err = GameError;

    fn from_str(s: &str) -> GameResult<Self> {
        Square::from_algebraic(s)
    }
}

impl TryFrom<String> for Square {
    type Error = GameError;

    fn try_from(value: String) -> GameResult<Self> {
        Square::from_algebraic(&value)
    }
}

impl From<Square> for String {
    fn from(square: Square) -> Self {
        square.to_algebraic()
    }
}

/// Parse the coordinate notation used at the boundary: `"e2e4"` or `"e2-e4"`
pub fn parse_coordinate_move(s: &str) -> GameResult<(Square, Square)> {
    let trimmed = s.trim();
    let compact: String = trimmed.chars().filter(|c| *c != '-').collect();
    if compact.len() != 4 || !compact.is_ascii() {
        return Err(GameError::InvalidSquare { notation: trimmed.to_string() });
    }
    let from = Square::from_algebraic(&compact[..2])?;
    let to = Square::from_algebraic(&compact[2..])?;
    Ok((from, to))
}
