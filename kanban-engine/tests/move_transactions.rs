//! Integration tests for drag/drop move transactions

use kanban_engine::{
    Board, BoardObserver, BoardSession, Card, CardId, Column, ColumnId, EngineConfig,
    EngineError, MoveOutcome, Position, WipLimitType,
};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct WipSpy {
    rejected: Rc<RefCell<Vec<(String, String)>>>,
    committed: Rc<RefCell<usize>>,
}

impl BoardObserver for WipSpy {
    fn on_committed(&mut self, _card: &CardId, _column: &ColumnId, _position: Position) {
        *self.committed.borrow_mut() += 1;
    }

    fn on_wip_limit_exceeded(&mut self, column: &ColumnId, card: &CardId) {
        self.rejected
            .borrow_mut()
            .push((column.to_string(), card.to_string()));
    }
}

/// Build a board from `(column, [(card, position)])` pairs
fn board(layout: &[(&str, &[(&str, i64)])], limits: &[(&str, usize, WipLimitType)]) -> Board {
    let mut columns = Vec::new();
    let mut cards = Vec::new();
    for (i, (column_id, members)) in layout.iter().enumerate() {
        let mut column = Column::new(*column_id, column_id.to_uppercase(), i);
        if let Some((_, limit, kind)) = limits.iter().find(|(id, _, _)| id == column_id) {
            column = column.with_wip_limit(*limit, *kind);
        }
        for (card_id, position) in members.iter() {
            column.card_ids.push(CardId::from(*card_id));
            cards.push(Card::new(*card_id, *column_id).with_position(*position));
        }
        columns.push(column);
    }
    Board::from_parts("Test", columns, cards).unwrap()
}

fn wip_board(kind: WipLimitType) -> Board {
    board(
        &[
            ("todo", &[("new", 1000)]),
            ("doing", &[("d1", 1000), ("d2", 2000), ("d3", 3000)]),
        ],
        &[("doing", 3, kind)],
    )
}

fn positions(session: &BoardSession, column: &str) -> Vec<i64> {
    session
        .board()
        .cards_in(&column.into())
        .iter()
        .map(|c| c.position.value())
        .collect()
}

#[test]
fn test_hard_wip_limit_rejects_fourth_card() {
    let mut session =
        BoardSession::new(wip_board(WipLimitType::Hard), EngineConfig::default()).unwrap();
    let spy = WipSpy::default();
    let rejected = spy.rejected.clone();
    let committed = spy.committed.clone();
    session.subscribe(Box::new(spy));
    let before = serde_json::to_string(session.board()).unwrap();

    session.begin_move(&"new".into()).unwrap();
    session.retarget_move(&"doing".into()).unwrap();
    let err = session.commit_move(&"doing".into(), 1).unwrap_err();

    assert!(matches!(
        err,
        EngineError::WipLimitExceeded { ref column, ref card, limit: 3 }
            if column == "doing" && card == "new"
    ));
    assert_eq!(serde_json::to_string(session.board()).unwrap(), before);
    assert_eq!(
        rejected.borrow().as_slice(),
        [("doing".to_string(), "new".to_string())]
    );
    assert_eq!(*committed.borrow(), 0);
    assert!(!session.transaction().is_active());
    assert_eq!(session.events().len(), 1);
}

#[test]
fn test_soft_wip_limit_admits_fourth_card() {
    let mut session =
        BoardSession::new(wip_board(WipLimitType::Soft), EngineConfig::default()).unwrap();
    let spy = WipSpy::default();
    let rejected = spy.rejected.clone();
    let committed = spy.committed.clone();
    session.subscribe(Box::new(spy));

    let outcome = session.move_card(&"new".into(), &"doing".into(), 1).unwrap();

    assert_eq!(
        outcome,
        MoveOutcome::Committed {
            card: "new".into(),
            column: "doing".into(),
            position: Position::new(1500),
            index: 1,
            renumbered: false,
        }
    );
    assert_eq!(positions(&session, "doing"), vec![1000, 1500, 2000, 3000]);
    assert!(session.board().cards_in(&"todo".into()).is_empty());
    assert!(rejected.borrow().is_empty());
    assert_eq!(*committed.borrow(), 1);
    session.board().verify_integrity().unwrap();
}

#[test]
fn test_adjacent_keys_renumber_column() {
    let mut session = BoardSession::new(
        board(
            &[("todo", &[("x", 1000)]), ("doing", &[("a", 1000), ("b", 1001)])],
            &[],
        ),
        EngineConfig::default(),
    )
    .unwrap();

    let outcome = session.move_card(&"x".into(), &"doing".into(), 1).unwrap();

    assert!(matches!(outcome, MoveOutcome::Committed { renumbered: true, index: 1, .. }));
    let order: Vec<&str> = session
        .board()
        .cards_in(&"doing".into())
        .iter()
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(order, vec!["a", "x", "b"]);
    assert_eq!(positions(&session, "doing"), vec![1000, 1500, 2000]);
    session.board().verify_integrity().unwrap();
}

#[test]
fn test_reorder_within_column_renumbers_around_moving_card() {
    let mut session = BoardSession::new(
        board(&[("doing", &[("a", 1000), ("b", 1001), ("c", 5000)])], &[]),
        EngineConfig::default(),
    )
    .unwrap();

    let outcome = session.move_card(&"c".into(), &"doing".into(), 1).unwrap();

    assert_eq!(
        outcome,
        MoveOutcome::Committed {
            card: "c".into(),
            column: "doing".into(),
            position: Position::new(1500),
            index: 1,
            renumbered: true,
        }
    );
    let order: Vec<&str> = session
        .board()
        .cards_in(&"doing".into())
        .iter()
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(order, vec!["a", "c", "b"]);
    assert_eq!(positions(&session, "doing"), vec![1000, 1500, 2000]);
    session.board().verify_integrity().unwrap();
}

#[test]
fn test_cancel_after_retargets_leaves_board_unchanged() {
    let mut session =
        BoardSession::new(wip_board(WipLimitType::Hard), EngineConfig::default()).unwrap();
    let before = session.board().clone();

    session.begin_move(&"d2".into()).unwrap();
    for target in ["todo", "doing", "todo", "doing"] {
        session.retarget_move(&target.into()).unwrap();
    }
    assert!(session.cancel_move());

    assert_eq!(session.board(), &before);
    assert!(session.events().is_empty());
    assert_eq!(session.commit_move(&"todo".into(), 0).unwrap(), MoveOutcome::Idle);
    assert_eq!(session.board(), &before);
}

#[test]
fn test_move_within_full_hard_column_is_allowed() {
    let mut session =
        BoardSession::new(wip_board(WipLimitType::Hard), EngineConfig::default()).unwrap();

    session.move_card(&"d3".into(), &"doing".into(), 0).unwrap();

    let order: Vec<&str> = session
        .board()
        .cards_in(&"doing".into())
        .iter()
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(order, vec!["d3", "d1", "d2"]);
    assert_eq!(positions(&session, "doing"), vec![0, 1000, 2000]);
}

#[test]
fn test_card_returns_to_source_after_rejection() {
    let mut session =
        BoardSession::new(wip_board(WipLimitType::Hard), EngineConfig::default()).unwrap();
    assert!(session.move_card(&"new".into(), &"doing".into(), 0).is_err());

    // The gesture ended; a fresh one can start and succeed elsewhere
    session.move_card(&"d1".into(), &"todo".into(), 0).unwrap();
    session.move_card(&"new".into(), &"doing".into(), 3).unwrap();
    assert_eq!(session.board().cards_in(&"doing".into()).len(), 3);
    session.board().verify_integrity().unwrap();
}

#[test]
fn test_board_with_unordered_positions_is_rejected() {
    let mut column = Column::new("todo", "To Do", 0);
    column.card_ids = vec!["a".into(), "b".into()];
    let cards = vec![
        Card::new("a", "todo").with_position(2000),
        Card::new("b", "todo").with_position(1000),
    ];
    let err = Board::from_parts("Broken", vec![column], cards).unwrap_err();
    assert!(matches!(err, EngineError::IntegrityViolation { .. }));
}
