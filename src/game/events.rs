//! Game events and the observer bus
//!
//! The session publishes a [`GameEvent`] for every observable step of the
//! move pipeline. Observers are called synchronously, in registration order,
//! and every payload is an owned snapshot: nothing handed to an observer
//! aliases session state.

use crossbeam_channel::Sender;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::game::rules::{CastleSide, Move, PieceId, PieceKind, Team};
use crate::game::types::Square;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    /// Emitted once per piece at setup
    PieceSpawned {
        piece: PieceId,
        kind: PieceKind,
        team: Team,
        square: Square,
    },
    /// Setup is complete; initial move lists follow
    AllPiecesSpawned,
    PieceSelected {
        piece: Option<PieceId>,
    },
    PieceMoved {
        piece: PieceId,
        from: Square,
        #[serde(rename = "move")]
        mv: Move,
    },
    PieceCaptured {
        capturer: PieceId,
        captured: PieceId,
    },
    Castled {
        team: Team,
        side: CastleSide,
    },
    InCheck {
        checking_piece: PieceId,
        blocking_squares: Vec<Square>,
        team: Team,
    },
    OutOfCheck {
        team: Team,
    },
    PossibleMovesChanged {
        piece: PieceId,
        moves: Vec<Move>,
    },
    ThreatsChanged {
        piece: PieceId,
        squares: Vec<Square>,
    },
    AttacksChanged {
        piece: PieceId,
        pieces: Vec<PieceId>,
    },
}

impl GameEvent {
    /// Per-piece derived-state notifications
    pub fn is_derived(&self) -> bool {
        matches!(
            self,
            GameEvent::PossibleMovesChanged { .. }
                | GameEvent::ThreatsChanged { .. }
                | GameEvent::AttacksChanged { .. }
        )
    }
}

/// Receives every published event
pub trait GameObserver {
    fn on_event(&mut self, event: &GameEvent);
}

impl<F> GameObserver for F
where
    F: FnMut(&GameEvent),
{
    fn on_event(&mut self, event: &GameEvent) {
        self(event)
    }
}

/// Forwards events into a crossbeam channel
///
/// A disconnected receiver is logged once and otherwise ignored; the game
/// does not depend on anyone listening.
pub struct ChannelObserver {
    tx: Sender<GameEvent>,
    disconnected: bool,
}

impl ChannelObserver {
    pub fn new(tx: Sender<GameEvent>) -> Self {
        Self { tx, disconnected: false }
    }
}

impl GameObserver for ChannelObserver {
    fn on_event(&mut self, event: &GameEvent) {
        if self.disconnected {
            return;
        }
        if self.tx.send(event.clone()).is_err() {
            warn!("[EVENTS] Channel receiver dropped, further events are discarded");
            self.disconnected = true;
        }
    }
}

/// Logs every event: derived per-piece updates at trace, the rest at debug
#[derive(Debug, Default)]
pub struct TracingObserver;

impl GameObserver for TracingObserver {
    fn on_event(&mut self, event: &GameEvent) {
        if event.is_derived() {
            trace!("[EVENTS] {:?}", event);
        } else {
            debug!("[EVENTS] {:?}", event);
        }
    }
}

/// Ordered list of observers
#[derive(Default)]
pub struct EventBus {
    observers: Vec<Box<dyn GameObserver>>,
}

impl EventBus {
    pub fn subscribe(&mut self, observer: Box<dyn GameObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn publish(&mut self, event: GameEvent) {
        for observer in &mut self.observers {
            observer.on_event(&event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus").field("observers", &self.observers.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_delivery_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::default();
        for name in ["first", "second"] {
            let log = Rc::clone(&log);
            bus.subscribe(Box::new(move |_: &GameEvent| log.borrow_mut().push(name)));
        }

        bus.publish(GameEvent::AllPiecesSpawned);
        assert_eq!(*log.borrow(), ["first", "second"]);
    }

    #[test]
    fn test_channel_observer_survives_dropped_receiver() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut observer = ChannelObserver::new(tx);
        observer.on_event(&GameEvent::OutOfCheck { team: Team::White });
        assert_eq!(rx.try_recv().unwrap(), GameEvent::OutOfCheck { team: Team::White });

        drop(rx);
        observer.on_event(&GameEvent::AllPiecesSpawned);
        observer.on_event(&GameEvent::AllPiecesSpawned);
    }

    #[test]
    fn test_events_serialize_with_tag() {
        let event = GameEvent::PieceSelected { piece: Some(PieceId(4)) };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"event":"piece_selected","piece":4}"#);
        assert!(GameEvent::ThreatsChanged { piece: PieceId(0), squares: vec![] }.is_derived());
    }
}
