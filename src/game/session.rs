//! Game session: owns the board and drives the move pipeline
//!
//! Every applied move runs the same ordered steps:
//!
//! 1. Validate phase, turn and that the move is in the current legal list
//! 2. Rook relocation for a castle, [`Board::apply_move`], then capture
//!    bookkeeping
//! 3. Check detection for the side that just moved
//! 4. Clear the mover's own check state
//! 5. Rebuild both teams' [`TeamAggregate`]s from scratch
//!
//! Rejected requests change nothing and publish nothing.

use tracing::{debug, info, warn};

use crate::game::error::{GameError, GameResult};
use crate::game::events::{EventBus, GameEvent, GameObserver};
use crate::game::resources::{
    CapturedPieces, MoveHistory, MoveRecord, PlayerCheckState, PlayerState, TeamAggregate,
    TurnFlow, TurnPhase,
};
use crate::game::rules::{
    find_checks, rook_castle, Board, CastleSide, Move, MoveGenerator, MoveSpecial, PieceId, Team,
};
use crate::game::types::Square;

/// Configures and starts a [`GameSession`]
pub struct SessionBuilder {
    board: Board,
    bus: EventBus,
    emit_derived_events: bool,
}

impl SessionBuilder {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            bus: EventBus::default(),
            emit_derived_events: true,
        }
    }

    /// Register an observer; delivery follows registration order
    pub fn observer(mut self, observer: impl GameObserver + 'static) -> Self {
        self.bus.subscribe(Box::new(observer));
        self
    }

    /// Publish per-piece moves/threats/attacks change events (default on)
    pub fn emit_derived_events(mut self, emit: bool) -> Self {
        self.emit_derived_events = emit;
        self
    }

    /// Announce every piece, detect initial checks and compute the first
    /// legal-move lists
    pub fn start(self) -> GameResult<GameSession> {
        let mut session = GameSession {
            board: self.board,
            flow: TurnFlow::default(),
            players: [PlayerState::new(Team::White), PlayerState::new(Team::Black)],
            captured: CapturedPieces::default(),
            selected: None,
            bus: self.bus,
            emit_derived_events: self.emit_derived_events,
        };

        let spawned: Vec<GameEvent> = session
            .board
            .active_pieces()
            .filter_map(|piece| {
                Some(GameEvent::PieceSpawned {
                    piece: piece.id,
                    kind: piece.kind,
                    team: piece.team,
                    square: piece.square?,
                })
            })
            .collect();
        for event in spawned {
            session.bus.publish(event);
        }
        session.bus.publish(GameEvent::AllPiecesSpawned);

        for team in Team::BOTH {
            session.detect_checks(team);
        }
        session.regenerate()?;

        info!(
            "[SESSION] Game started: {} pieces, {:?} to move",
            session.board.active_pieces().count(),
            session.board.turn()
        );
        Ok(session)
    }
}

/// One game in progress
#[derive(Debug)]
pub struct GameSession {
    board: Board,
    flow: TurnFlow,
    players: [PlayerState; 2],
    captured: CapturedPieces,
    selected: Option<PieceId>,
    bus: EventBus,
    emit_derived_events: bool,
}

impl GameSession {
    /// Start a session with no observers
    pub fn new(board: Board) -> GameResult<Self> {
        SessionBuilder::new(board).start()
    }

    pub fn builder(board: Board) -> SessionBuilder {
        SessionBuilder::new(board)
    }

    pub fn subscribe(&mut self, observer: impl GameObserver + 'static) {
        self.bus.subscribe(Box::new(observer));
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Team {
        self.board.turn()
    }

    pub fn phase(&self) -> TurnPhase {
        self.flow.phase
    }

    pub fn move_number(&self) -> u32 {
        self.flow.move_number
    }

    pub fn history(&self) -> &MoveHistory {
        self.board.history()
    }

    pub fn check_state(&self, team: Team) -> &PlayerCheckState {
        &self.players[team.index()].check
    }

    pub fn aggregate(&self, team: Team) -> &TeamAggregate {
        &self.players[team.index()].aggregate
    }

    pub fn captured(&self) -> &CapturedPieces {
        &self.captured
    }

    pub fn selected(&self) -> Option<PieceId> {
        self.selected
    }

    /// Current legal moves of `piece`, copied out
    pub fn legal_moves(&self, piece: PieceId) -> GameResult<Vec<Move>> {
        let team = self.board.piece(piece)?.team;
        Ok(self.aggregate(team).moves_of(piece).to_vec())
    }

    /// Current legal moves of the piece standing on `square`
    pub fn legal_moves_from(&self, square: Square) -> GameResult<Vec<Move>> {
        let piece = self.board.piece_id_at(square).ok_or(GameError::PieceNotFound { square })?;
        self.legal_moves(piece)
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Select the piece on `square`, or clear the selection with `None`
    ///
    /// Only pieces of the side to move can be selected.
    pub fn select(&mut self, square: Option<Square>) -> GameResult<()> {
        let Some(square) = square else {
            if self.flow.phase == TurnPhase::PieceSelected {
                self.flow.transition_to(TurnPhase::WaitingForInput)?;
            }
            self.selected = None;
            self.bus.publish(GameEvent::PieceSelected { piece: None });
            return Ok(());
        };

        let piece = self.board.occupant_at(square).ok_or(GameError::PieceNotFound { square })?;
        if piece.team != self.board.turn() {
            return Err(GameError::NotYourTurn { team: piece.team });
        }
        let id = piece.id;
        self.flow.transition_to(TurnPhase::PieceSelected)?;
        self.selected = Some(id);
        debug!("[SESSION] Selected {:?} on {}", id, square);
        self.bus.publish(GameEvent::PieceSelected { piece: Some(id) });
        Ok(())
    }

    /// Move the selected piece to `to`
    pub fn move_selected(&mut self, to: Square) -> GameResult<MoveRecord> {
        let piece = self.selected.ok_or(GameError::NoPieceSelected)?;
        let mv = self.find_move(piece, to)?;
        self.execute(&mv)
    }

    /// Play the move of the piece on `from` to `to`
    pub fn play(&mut self, from: Square, to: Square) -> GameResult<MoveRecord> {
        let piece = self.board.occupant_at(from).ok_or(GameError::PieceNotFound { square: from })?;
        if piece.team != self.board.turn() {
            return Err(GameError::NotYourTurn { team: piece.team });
        }
        let mv = self.find_move(piece.id, to)?;
        self.execute(&mv)
    }

    /// Castle `team` on `side`, if that castle is currently legal
    pub fn castle(&mut self, team: Team, side: CastleSide) -> GameResult<MoveRecord> {
        if team != self.board.turn() {
            return Err(GameError::NotYourTurn { team });
        }
        let king = self.board.king(team).ok_or(GameError::PieceNotFound {
            square: Square::new(4, team.back_rank())?,
        })?;
        let from = king.square.ok_or_else(|| GameError::unknown(king.id))?;
        let mv = self
            .aggregate(team)
            .moves_of(king.id)
            .iter()
            .find(|mv| mv.castle_side() == Some(side))
            .copied()
            .ok_or(GameError::IllegalMove {
                from,
                to: Square::new(side.king_target_file(), team.back_rank())?,
            })?;
        self.execute(&mv)
    }

    fn find_move(&self, piece: PieceId, to: Square) -> GameResult<Move> {
        let from = self.board.piece(piece)?.square.ok_or_else(|| GameError::unknown(piece))?;
        self.legal_moves(piece)?
            .into_iter()
            .find(|mv| mv.to() == to)
            .ok_or(GameError::IllegalMove { from, to })
    }

    /// Execute a move drawn from the current legal list
    ///
    /// A castle whose rook is missing returns
    /// [`GameError::CastlingRookMissing`] and leaves the session stuck in
    /// [`TurnPhase::ExecutingMove`]: board and legal lists have diverged.
    pub fn execute(&mut self, mv: &Move) -> GameResult<MoveRecord> {
        if !self.flow.phase.accepts_input() {
            return Err(GameError::InvalidStateTransition {
                from: self.flow.phase,
                to: TurnPhase::ExecutingMove,
            });
        }
        let mover = self.board.piece(mv.piece())?;
        let team = mover.team;
        if team != self.board.turn() {
            return Err(GameError::NotYourTurn { team });
        }
        if !self.aggregate(team).moves_of(mv.piece()).contains(mv) {
            warn!("[SESSION] Rejected {} -> {}: not a legal move", mv.from(), mv.to());
            return Err(GameError::IllegalMove { from: mv.from(), to: mv.to() });
        }

        self.flow.transition_to(TurnPhase::ExecutingMove)?;

        if let MoveSpecial::Castle { side } = mv.special() {
            rook_castle(&mut self.board, team, side)?;
        }
        let mut record = self.board.apply_move(mv)?;

        // Bookkeeping only once the board has accepted the move
        if let Some((captured, kind)) = record.captured {
            self.captured.add_capture(team.other(), kind);
            self.bus.publish(GameEvent::PieceCaptured { capturer: mv.piece(), captured });
        }
        if let MoveSpecial::Castle { side } = mv.special() {
            info!("[SESSION] {:?} castles {:?}", team, side);
            self.bus.publish(GameEvent::Castled { team, side });
        }
        if mv.is_en_passant() {
            info!("[SESSION] {:?} captures en passant on {}", team, mv.to());
        }
        info!("[SESSION] {:?} {:?} {} -> {}", team, record.kind, mv.from(), mv.to());
        self.bus.publish(GameEvent::PieceMoved {
            piece: mv.piece(),
            from: mv.from(),
            mv: *mv,
        });

        self.flow.transition_to(TurnPhase::CheckingGameState)?;
        if self.detect_checks(team) {
            record.gave_check = true;
            if let Some(last) = self.board.history_mut().last_move_mut() {
                last.gave_check = true;
            }
        }
        if self.players[team.index()].check.clear() {
            info!("[SESSION] {:?} is out of check", team);
        }
        self.bus.publish(GameEvent::OutOfCheck { team });
        self.regenerate()?;

        self.selected = None;
        self.bus.publish(GameEvent::PieceSelected { piece: None });
        self.flow.transition_to(TurnPhase::WaitingForInput)?;
        self.flow.complete_ply(team == Team::Black);
        Ok(record)
    }

    // ------------------------------------------------------------------
    // Pipeline steps
    // ------------------------------------------------------------------

    /// Record every check `attacker` gives; returns whether there was one
    fn detect_checks(&mut self, attacker: Team) -> bool {
        let defender = attacker.other();
        let checks = find_checks(&MoveGenerator::new(&self.board), attacker);
        for check in &checks {
            self.players[defender.index()].check.on_check(check.blocking_squares.clone());
            self.bus.publish(GameEvent::InCheck {
                checking_piece: check.checker,
                blocking_squares: check.blocking_squares.clone(),
                team: defender,
            });
        }
        match checks.len() {
            0 => {}
            1 => info!("[SESSION] {:?} is in check", defender),
            _ => info!("[SESSION] {:?} is in double check", defender),
        }
        !checks.is_empty()
    }

    /// Rebuild both aggregates and publish what changed
    fn regenerate(&mut self) -> GameResult<()> {
        let generator = MoveGenerator::new(&self.board);
        let mut events = Vec::new();
        for team in Team::BOTH {
            let player = &mut self.players[team.index()];
            let aggregate = generator.aggregate(team, &player.check)?;
            if self.emit_derived_events {
                diff_aggregates(&player.aggregate, &aggregate, &mut events);
            }
            player.aggregate = aggregate;
        }
        for event in events {
            self.bus.publish(event);
        }
        Ok(())
    }
}

fn diff_aggregates(previous: &TeamAggregate, current: &TeamAggregate, events: &mut Vec<GameEvent>) {
    for (piece, state) in current.iter() {
        let old = previous.get(piece);
        if old.map(|old| &old.moves) != Some(&state.moves) {
            events.push(GameEvent::PossibleMovesChanged { piece, moves: state.moves.clone() });
        }
        if old.map(|old| &old.threats) != Some(&state.threats) {
            events.push(GameEvent::ThreatsChanged { piece, squares: state.threats.clone() });
        }
        if old.map(|old| &old.attacks) != Some(&state.attacks) {
            events.push(GameEvent::AttacksChanged { piece, pieces: state.attacks.clone() });
        }
    }
    // Captured pieces drop out of the aggregate with nothing left to do
    for (piece, _) in previous.iter().filter(|(piece, _)| current.get(*piece).is_none()) {
        events.push(GameEvent::PossibleMovesChanged { piece, moves: Vec::new() });
    }
}
