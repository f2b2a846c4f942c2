//! Turn state management for the move pipeline
//!
//! Tracks the phase within the current turn so the session can enforce the
//! ordering select -> execute -> check analysis -> wait. Whose turn it is
//! lives on the board; this only tracks the phase and the move counter.

use serde::Serialize;

use crate::game::error::{GameError, GameResult};

/// Fine-grained turn flow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum TurnPhase {
    /// Waiting for the side to move to select a piece or submit a move
    ///
    /// Valid transitions: → PieceSelected, → ExecutingMove
    #[default]
    WaitingForInput,

    /// A piece of the side to move is selected
    ///
    /// Valid transitions: → ExecutingMove, → WaitingForInput (deselect)
    PieceSelected,

    /// Board mutation in progress
    ///
    /// Valid transitions: → CheckingGameState
    ExecutingMove,

    /// Check detection and move-list regeneration
    ///
    /// Valid transitions: → WaitingForInput
    CheckingGameState,
}

impl TurnPhase {
    /// Check if this state allows input
    pub fn accepts_input(&self) -> bool {
        matches!(self, TurnPhase::WaitingForInput | TurnPhase::PieceSelected)
    }

    /// Check if moves are being executed
    pub fn is_executing(&self) -> bool {
        matches!(self, TurnPhase::ExecutingMove | TurnPhase::CheckingGameState)
    }
}

/// Phase plus full-move counter
#[derive(Debug, Clone, Serialize)]
pub struct TurnFlow {
    /// What phase of the turn are we in?
    pub phase: TurnPhase,

    /// Move number (increments after Black moves)
    pub move_number: u32,
}

impl Default for TurnFlow {
    fn default() -> Self {
        Self {
            phase: TurnPhase::WaitingForInput,
            move_number: 1,
        }
    }
}

impl TurnFlow {
    /// Transition to the next turn phase
    ///
    /// Returns [`GameError::InvalidStateTransition`] and leaves the phase
    /// untouched if the transition is not allowed.
    pub fn transition_to(&mut self, next_phase: TurnPhase) -> GameResult<()> {
        let valid = matches!(
            (self.phase, next_phase),
            (TurnPhase::WaitingForInput, TurnPhase::PieceSelected)
                | (TurnPhase::WaitingForInput, TurnPhase::ExecutingMove)
                | (TurnPhase::PieceSelected, TurnPhase::PieceSelected)
                | (TurnPhase::PieceSelected, TurnPhase::ExecutingMove)
                | (TurnPhase::PieceSelected, TurnPhase::WaitingForInput)
                | (TurnPhase::ExecutingMove, TurnPhase::CheckingGameState)
                | (TurnPhase::CheckingGameState, TurnPhase::WaitingForInput)
        );

        if !valid {
            return Err(GameError::InvalidStateTransition {
                from: self.phase,
                to: next_phase,
            });
        }

        self.phase = next_phase;
        Ok(())
    }

    /// Bump the full-move counter once Black has replied
    pub fn complete_ply(&mut self, black_moved: bool) {
        if black_moved {
            self.move_number += 1;
        }
    }
}
