//! Integration tests for the game session
//!
//! Drives [`GameSession`] through its public API only: replaying moves,
//! reading aggregates and check state, and watching the events it publishes
//! through a crossbeam channel.

use crossbeam_channel::{unbounded, Receiver};

use chess_rules::{
    Board, CastleSide, ChannelObserver, GameError, GameEvent, GameSession, PieceKind, Square, Team,
    TurnPhase,
};

fn sq(s: &str) -> Square {
    s.parse().unwrap()
}

/// Start a session on `board` with a channel observer and derived events off
fn observed_session(board: Board) -> (GameSession, Receiver<GameEvent>) {
    let (tx, rx) = unbounded();
    let session = GameSession::builder(board)
        .observer(ChannelObserver::new(tx))
        .emit_derived_events(false)
        .start()
        .unwrap();
    (session, rx)
}

fn play_all(session: &mut GameSession, moves: &[&str]) {
    for notation in moves {
        let (from, to) = chess_rules::parse_coordinate_move(notation).unwrap();
        session.play(from, to).unwrap();
    }
}

fn custom_board(pieces: &[(PieceKind, Team, &str)]) -> Board {
    let mut board = Board::empty(Team::White);
    for &(kind, team, square) in pieces {
        board.add_piece(kind, team, sq(square)).unwrap();
    }
    board
}

/// One king per team and no move onto a friendly piece
fn assert_invariants(session: &GameSession) {
    let board = session.board();
    for team in Team::BOTH {
        let kings = board.pieces_of(team).filter(|p| p.kind == PieceKind::King).count();
        assert_eq!(kings, 1, "{team:?} must have exactly one king");

        for mv in session.aggregate(team).all_moves() {
            let friendly = board.occupant_at(mv.to()).is_some_and(|p| p.team == team);
            assert!(!friendly, "{team:?} move {} -> {} lands on a friend", mv.from(), mv.to());
        }
    }
}

// ============================================================================
// Setup
// ============================================================================

#[test]
fn test_start_position() {
    //! Twenty legal moves per side, nobody in check, spawn events first
    let (session, rx) = observed_session(Board::standard());

    for team in Team::BOTH {
        assert_eq!(session.aggregate(team).total_moves(), 20);
        assert!(!session.check_state(team).in_check());
    }
    assert_eq!(session.turn(), Team::White);
    assert_eq!(session.phase(), TurnPhase::WaitingForInput);

    let events: Vec<GameEvent> = rx.try_iter().collect();
    assert_eq!(events.len(), 33);
    assert!(events[..32].iter().all(|e| matches!(e, GameEvent::PieceSpawned { .. })));
    assert_eq!(events[32], GameEvent::AllPiecesSpawned);
}

#[test]
fn test_derived_events_published_when_enabled() {
    let (tx, rx) = unbounded();
    let _session = GameSession::builder(Board::standard())
        .observer(ChannelObserver::new(tx))
        .start()
        .unwrap();

    let moves_changed = rx
        .try_iter()
        .filter(|e| matches!(e, GameEvent::PossibleMovesChanged { .. }))
        .count();
    assert_eq!(moves_changed, 32);
}

// ============================================================================
// Check
// ============================================================================

#[test]
fn test_attack_on_f7_is_not_check() {
    //! 1. e4 e5 2. Bc4 Nc6 3. Qh5: f7 is hit twice, the king is not in check
    let mut session = GameSession::new(Board::standard()).unwrap();
    play_all(&mut session, &["e2e4", "e7e5", "f1c4", "b8c6", "d1h5"]);

    assert!(!session.check_state(Team::Black).in_check());
    assert!(session.aggregate(Team::White).threatens(sq("f7")));

    let f7 = session.board().piece_id_at(sq("f7")).unwrap();
    let queen = session.board().piece_id_at(sq("h5")).unwrap();
    let bishop = session.board().piece_id_at(sq("c4")).unwrap();
    assert_eq!(session.aggregate(Team::White).attackers_of(f7), vec![queen, bishop]);
    assert_eq!(session.move_number(), 3);
    assert_invariants(&session);
}

#[test]
fn test_scholars_mate_leaves_no_moves() {
    //! 3... Nf6 4. Qxf7: check from an adjacent queen defended by the bishop
    let mut session = GameSession::new(Board::standard()).unwrap();
    play_all(&mut session, &["e2e4", "e7e5", "f1c4", "b8c6", "d1h5", "g8f6", "h5f7"]);

    let check = session.check_state(Team::Black);
    assert!(check.in_check());
    assert!(!check.double_check());
    assert_eq!(check.blocking_squares(), Some(&[sq("f7")][..]));
    assert_eq!(session.aggregate(Team::Black).total_moves(), 0);

    assert!(session.history().last_move().unwrap().gave_check);
    assert_eq!(session.captured().taken_by(Team::White), &[PieceKind::Pawn]);
    assert_eq!(session.captured().material_advantage(), 1);
}

#[test]
fn test_event_order_for_checking_capture() {
    let (mut session, rx) = observed_session(Board::standard());
    play_all(&mut session, &["e2e4", "e7e5", "f1c4", "b8c6", "d1h5", "g8f6"]);
    rx.try_iter().for_each(drop);

    let queen = session.board().piece_id_at(sq("h5")).unwrap();
    let pawn = session.board().piece_id_at(sq("f7")).unwrap();
    session.play(sq("h5"), sq("f7")).unwrap();

    let events: Vec<GameEvent> = rx.try_iter().collect();
    assert_eq!(events.len(), 5, "{events:?}");
    assert_eq!(events[0], GameEvent::PieceCaptured { capturer: queen, captured: pawn });
    assert!(matches!(events[1], GameEvent::PieceMoved { piece, .. } if piece == queen));
    assert_eq!(
        events[2],
        GameEvent::InCheck {
            checking_piece: queen,
            blocking_squares: vec![sq("f7")],
            team: Team::Black,
        }
    );
    assert_eq!(events[3], GameEvent::OutOfCheck { team: Team::White });
    assert_eq!(events[4], GameEvent::PieceSelected { piece: None });
}

#[test]
fn test_check_cleared_by_reply() {
    //! The only non-king answer to a back-rank check is the block on d8
    let board = custom_board(&[
        (PieceKind::King, Team::White, "g3"),
        (PieceKind::Rook, Team::White, "a2"),
        (PieceKind::King, Team::Black, "h8"),
        (PieceKind::Rook, Team::Black, "d1"),
    ]);
    let mut session = GameSession::new(board).unwrap();
    session.play(sq("a2"), sq("a8")).unwrap();
    assert!(session.check_state(Team::Black).in_check());
    assert!(session.history().last_move().unwrap().gave_check);

    let rook_moves = session.legal_moves_from(sq("d1")).unwrap();
    assert_eq!(rook_moves.len(), 1);
    assert_eq!(rook_moves[0].to(), sq("d8"));

    session.play(sq("d1"), sq("d8")).unwrap();
    assert!(!session.check_state(Team::Black).in_check());
    assert!(!session.check_state(Team::White).in_check());
}

// ============================================================================
// Pins
// ============================================================================

#[test]
fn test_pinned_bishop_has_no_moves() {
    let board = custom_board(&[
        (PieceKind::King, Team::White, "e1"),
        (PieceKind::Bishop, Team::White, "e2"),
        (PieceKind::Rook, Team::Black, "e8"),
        (PieceKind::King, Team::Black, "a8"),
    ]);
    let session = GameSession::new(board).unwrap();

    assert!(session.legal_moves_from(sq("e2")).unwrap().is_empty());
    assert!(!session.check_state(Team::White).in_check());
}

// ============================================================================
// Special Moves
// ============================================================================

#[test]
fn test_en_passant_removes_pawn_behind_destination() {
    let board = custom_board(&[
        (PieceKind::King, Team::White, "e1"),
        (PieceKind::King, Team::Black, "e8"),
        (PieceKind::Pawn, Team::White, "e2"),
        (PieceKind::Pawn, Team::Black, "d4"),
    ]);
    let (mut session, rx) = observed_session(board);
    let white_pawn = session.board().piece_id_at(sq("e2")).unwrap();
    let black_pawn = session.board().piece_id_at(sq("d4")).unwrap();

    session.play(sq("e2"), sq("e4")).unwrap();
    rx.try_iter().for_each(drop);
    let record = session.play(sq("d4"), sq("e3")).unwrap();

    assert!(record.special != chess_rules::MoveSpecial::Normal);
    assert!(session.board().is_empty(sq("e4")));
    assert_eq!(session.board().piece_id_at(sq("e3")), Some(black_pawn));
    assert!(session.board().piece(white_pawn).unwrap().is_captured());
    assert_eq!(
        rx.try_iter().next(),
        Some(GameEvent::PieceCaptured { capturer: black_pawn, captured: white_pawn })
    );
    assert_invariants(&session);
}

#[test]
fn test_king_side_castle_moves_rook() {
    let board = custom_board(&[
        (PieceKind::King, Team::White, "e1"),
        (PieceKind::Rook, Team::White, "a1"),
        (PieceKind::Rook, Team::White, "h1"),
        (PieceKind::King, Team::Black, "e8"),
    ]);
    let (mut session, rx) = observed_session(board);
    rx.try_iter().for_each(drop);

    session.castle(Team::White, CastleSide::KingSide).unwrap();

    let board = session.board();
    assert_eq!(board.occupant_at(sq("g1")).map(|p| p.kind), Some(PieceKind::King));
    assert_eq!(board.occupant_at(sq("f1")).map(|p| p.kind), Some(PieceKind::Rook));
    assert!(board.is_empty(sq("h1")));
    assert!(board.is_empty(sq("e1")));
    assert_eq!(
        rx.try_iter().next(),
        Some(GameEvent::Castled { team: Team::White, side: CastleSide::KingSide })
    );
}

#[test]
fn test_queen_side_castle_by_king_step() {
    let board = custom_board(&[
        (PieceKind::King, Team::White, "e1"),
        (PieceKind::Rook, Team::White, "a1"),
        (PieceKind::King, Team::Black, "e8"),
    ]);
    let mut session = GameSession::new(board).unwrap();
    session.play(sq("e1"), sq("c1")).unwrap();

    let board = session.board();
    assert_eq!(board.occupant_at(sq("c1")).map(|p| p.kind), Some(PieceKind::King));
    assert_eq!(board.occupant_at(sq("d1")).map(|p| p.kind), Some(PieceKind::Rook));
    assert!(board.is_empty(sq("a1")));
}

#[test]
fn test_castle_revoked_by_attacked_square() {
    let board = custom_board(&[
        (PieceKind::King, Team::White, "e1"),
        (PieceKind::Rook, Team::White, "h1"),
        (PieceKind::King, Team::Black, "e8"),
        (PieceKind::Rook, Team::Black, "f8"),
    ]);
    let mut session = GameSession::new(board).unwrap();

    assert_eq!(
        session.castle(Team::White, CastleSide::KingSide),
        Err(GameError::IllegalMove { from: sq("e1"), to: sq("g1") })
    );
    assert!(session.history().is_empty());
}

// ============================================================================
// Boundary
// ============================================================================

#[test]
fn test_rejected_requests_change_nothing() {
    let (mut session, rx) = observed_session(Board::standard());
    rx.try_iter().for_each(drop);
    let before = *session.board().squares();

    assert_eq!(
        session.play(sq("e7"), sq("e5")),
        Err(GameError::NotYourTurn { team: Team::Black })
    );
    assert_eq!(
        session.play(sq("e2"), sq("e5")),
        Err(GameError::IllegalMove { from: sq("e2"), to: sq("e5") })
    );
    assert_eq!(
        session.play(sq("e4"), sq("e5")),
        Err(GameError::PieceNotFound { square: sq("e4") })
    );
    assert_eq!(session.move_selected(sq("e4")), Err(GameError::NoPieceSelected));
    assert_eq!(
        session.select(Some(sq("d7"))),
        Err(GameError::NotYourTurn { team: Team::Black })
    );

    assert_eq!(*session.board().squares(), before);
    assert!(session.history().is_empty());
    assert_eq!(rx.try_iter().count(), 0);
}

#[test]
fn test_select_then_move() {
    let (mut session, rx) = observed_session(Board::standard());
    rx.try_iter().for_each(drop);
    let knight = session.board().piece_id_at(sq("g1")).unwrap();

    session.select(Some(sq("g1"))).unwrap();
    assert_eq!(session.phase(), TurnPhase::PieceSelected);
    assert_eq!(session.selected(), Some(knight));

    session.move_selected(sq("f3")).unwrap();
    assert_eq!(session.phase(), TurnPhase::WaitingForInput);
    assert_eq!(session.selected(), None);
    assert_eq!(session.turn(), Team::Black);

    let events: Vec<GameEvent> = rx.try_iter().collect();
    assert_eq!(events.first(), Some(&GameEvent::PieceSelected { piece: Some(knight) }));
    assert_eq!(events.last(), Some(&GameEvent::PieceSelected { piece: None }));
}

#[test]
fn test_legal_moves_are_copies() {
    let mut session = GameSession::new(Board::standard()).unwrap();
    let mut moves = session.legal_moves_from(sq("b1")).unwrap();
    moves.clear();
    assert_eq!(session.legal_moves_from(sq("b1")).unwrap().len(), 2);

    session.play(sq("b1"), sq("c3")).unwrap();
    assert_eq!(session.legal_moves_from(sq("c3")).unwrap().len(), 5);
}

// ============================================================================
// Board Round-Trip And Invariants
// ============================================================================

#[test]
fn test_move_and_inverse_restore_board() {
    let mut board = custom_board(&[
        (PieceKind::King, Team::White, "e1"),
        (PieceKind::Rook, Team::White, "a1"),
        (PieceKind::King, Team::Black, "e8"),
        (PieceKind::Knight, Team::Black, "a8"),
    ]);
    let before = *board.squares();
    let rook = board.piece_id_at(sq("a1")).unwrap();
    let knight = board.piece_id_at(sq("a8")).unwrap();

    board
        .apply_move(&chess_rules::Move::new(rook, sq("a1"), sq("a8")))
        .unwrap();
    assert!(board.piece(knight).unwrap().is_captured());

    board.place(rook, sq("a1")).unwrap();
    board.place(knight, sq("a8")).unwrap();
    assert_eq!(*board.squares(), before);
}

#[test]
fn test_invariants_hold_through_a_game() {
    let mut session = GameSession::new(Board::standard()).unwrap();
    let moves = [
        "e2e4", "e7e5", "g1f3", "b8c6", "f1b5", "a7a6", "b5c6", "d7c6", "e1g1", "f7f6", "d2d4",
        "e5d4", "f3d4", "c6c5", "d4e2", "d8d1", "f1d1",
    ];
    for notation in moves {
        let (from, to) = chess_rules::parse_coordinate_move(notation).unwrap();
        session.play(from, to).unwrap();
        assert_invariants(&session);
    }
    assert_eq!(session.board().occupant_at(sq("g1")).map(|p| p.kind), Some(PieceKind::King));
    assert_eq!(session.captured().material_advantage(), 0);
}
