//! Error types for game module
//!
//! Covers square addressing, move legality at the session boundary, board
//! setup and the castling divergence case that must never be swallowed.

use crate::game::resources::TurnPhase;
use crate::game::rules::{PieceId, Team};
use crate::game::types::Square;

/// Errors that can occur in game logic
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// Malformed square notation (anything other than `a1`..`h8`)
    #[error("Invalid square: {notation:?}")]
    InvalidSquare { notation: String },

    /// Coordinate pair outside the 8x8 board
    #[error("Invalid square coordinates ({file}, {rank})")]
    InvalidCoordinates { file: i16, rank: i16 },

    /// Destination not in the piece's current legal list
    #[error("Illegal move: {from} -> {to}")]
    IllegalMove { from: Square, to: Square },

    /// A move was requested without a selected piece
    #[error("No piece selected")]
    NoPieceSelected,

    /// The piece belongs to the side not on move
    #[error("Not {team:?}'s turn")]
    NotYourTurn { team: Team },

    /// Piece not found at expected position
    #[error("Piece not found at {square}")]
    PieceNotFound { square: Square },

    /// Piece id that does not exist or is no longer on the board
    #[error("Unknown or captured piece #{id}")]
    UnknownPiece { id: u8 },

    /// Setup tried to place two pieces on one square
    #[error("Square {square} is already occupied")]
    SquareOccupied { square: Square },

    /// Setup tried to give a team a second king
    #[error("{team:?} already has a king")]
    DuplicateKing { team: Team },

    /// Castling was validated but the rook is gone or has moved.
    ///
    /// The board and the legality computation have diverged; callers must
    /// treat this as fatal.
    #[error("Castling rook missing or moved at {square}")]
    CastlingRookMissing { square: Square },

    /// Invalid turn flow transition
    #[error("Invalid turn phase transition: {from:?} -> {to:?}")]
    InvalidStateTransition { from: TurnPhase, to: TurnPhase },
}

impl GameError {
    pub(crate) fn unknown(id: PieceId) -> Self {
        GameError::UnknownPiece { id: id.0 }
    }
}

/// Result type alias for game operations
pub type GameResult<T> = Result<T, GameError>;
