//! Chess rules engine
//!
//! Legal move generation, check and pin analysis, castling and en passant,
//! driven by a [`GameSession`] that owns the board and publishes
//! [`GameEvent`]s to its observers.
//!
//! ```
//! use chess_rules::{GameSession, Board, Square};
//!
//! let mut session = GameSession::new(Board::standard()).unwrap();
//! let e2: Square = "e2".parse().unwrap();
//! let e4: Square = "e4".parse().unwrap();
//! session.play(e2, e4).unwrap();
//! assert_eq!(session.legal_moves_from("g8".parse().unwrap()).unwrap().len(), 2);
//! ```

pub mod core;
pub mod game;

pub use game::resources::{
    CapturedPieces, MoveHistory, MoveRecord, PlayerCheckState, TeamAggregate, TurnPhase,
};
pub use game::rules::{Board, CastleSide, Move, MoveSpecial, Piece, PieceId, PieceKind, Team};
pub use game::{
    parse_coordinate_move, ChannelObserver, GameError, GameEvent, GameObserver, GameResult,
    GameSession, SessionBuilder, Square, TracingObserver,
};
