use battleship_server::{
    AttackOutcome, BattleEngine, Fleet, GameError, MatchPhase, Orientation, Position, Ship,
    ShipClass,
};

fn fleet(ships: &[(ShipClass, Orientation, usize, usize)]) -> Fleet {
    Fleet::new(
        ships
            .iter()
            .map(|(class, orientation, x, y)| {
                Ship::new(*class, *orientation, Position::new(*x, *y), class.length()).unwrap()
            })
            .collect(),
    )
    .unwrap()
}

/// Player 7 defends a medium ship at (0,0)-(1,0) and a small one at (5,5);
/// player 3 defends a small ship at (9,9).
fn started_match() -> BattleEngine {
    let mut engine = BattleEngine::new(1);
    let f7 = fleet(&[
        (ShipClass::Medium, Orientation::Horizontal, 0, 0),
        (ShipClass::Small, Orientation::Horizontal, 5, 5),
    ]);
    let f3 = fleet(&[(ShipClass::Small, Orientation::Horizontal, 9, 9)]);
    assert_eq!(engine.submit_fleet(7, f7), Ok(false));
    assert_eq!(engine.submit_fleet(3, f3), Ok(true));
    engine.begin().unwrap();
    engine
}

#[test]
fn test_first_submitter_moves_first() {
    let mut engine = BattleEngine::new(4);
    assert_eq!(engine.phase(), MatchPhase::AwaitingPlayers);
    let a = fleet(&[(ShipClass::Small, Orientation::Horizontal, 0, 0)]);
    let b = fleet(&[(ShipClass::Small, Orientation::Horizontal, 0, 0)]);

    assert_eq!(engine.submit_fleet(11, a), Ok(false));
    assert_eq!(engine.phase(), MatchPhase::AwaitingPlayers);
    assert_eq!(engine.submit_fleet(2, b), Ok(true));
    assert_eq!(engine.phase(), MatchPhase::Ready);

    let start = engine.begin().unwrap();
    assert_eq!(engine.phase(), MatchPhase::InProgress);
    assert_eq!(start.first_turn, 11);
    assert_eq!(engine.current_turn(), Some(11));
    assert_eq!(
        start.seats.iter().map(|(p, _)| *p).collect::<Vec<_>>(),
        vec![11, 2]
    );
}

#[test]
fn test_submission_errors() {
    let mut engine = BattleEngine::new(1);
    let f = fleet(&[(ShipClass::Small, Orientation::Horizontal, 0, 0)]);
    engine.submit_fleet(1, f.clone()).unwrap();
    assert_eq!(
        engine.submit_fleet(1, f.clone()),
        Err(GameError::DuplicateSubmission { player: 1 })
    );
    assert_eq!(engine.begin().map(|_| ()), Err(GameError::NotReady));
    engine.submit_fleet(2, f.clone()).unwrap();
    assert_eq!(engine.submit_fleet(3, f), Err(GameError::MatchFull));
}

#[test]
fn test_reserved_seats_reject_strangers() {
    let mut engine = BattleEngine::with_reserved_seats(9, [4, 5]);
    let f = fleet(&[(ShipClass::Small, Orientation::Horizontal, 0, 0)]);
    assert_eq!(
        engine.submit_fleet(6, f.clone()),
        Err(GameError::NoSuchPlayer { player: 6 })
    );
    assert_eq!(engine.submit_fleet(5, f), Ok(false));
}

#[test]
fn test_attack_before_start() {
    let mut engine = BattleEngine::new(1);
    assert_eq!(
        engine.attack(0, Position::new(0, 0)).map(|_| ()),
        Err(GameError::NotReady)
    );
}

#[test]
fn test_turn_alternation() {
    let mut engine = started_match();

    assert_eq!(
        engine.attack(3, Position::new(0, 0)).map(|_| ()),
        Err(GameError::NotYourTurn { current: 7 })
    );

    let report = engine.attack(7, Position::new(4, 4)).unwrap();
    assert_eq!(report.outcome, AttackOutcome::Miss { next_turn: 3 });
    assert_eq!(engine.current_turn(), Some(3));

    let report = engine.attack(3, Position::new(0, 0)).unwrap();
    assert_eq!(report.outcome, AttackOutcome::Hit);
    assert_eq!(engine.current_turn(), Some(3));

    let report = engine.attack(3, Position::new(1, 0)).unwrap();
    match report.outcome {
        AttackOutcome::Killed { ship, missed_cells } => {
            assert_eq!(ship.origin(), Position::new(0, 0));
            assert_eq!(
                missed_cells,
                vec![
                    Position::new(2, 0),
                    Position::new(0, 1),
                    Position::new(1, 1),
                    Position::new(2, 1)
                ]
            );
        }
        other => panic!("expected a kill, got {:?}", other),
    }
    assert_eq!(engine.current_turn(), Some(3));
    assert_eq!(engine.check_winner(), None);
}

#[test]
fn test_repeat_attack_rejected_without_state_change() {
    let mut engine = started_match();
    engine.attack(7, Position::new(4, 4)).unwrap();
    engine.attack(3, Position::new(6, 6)).unwrap();
    assert_eq!(
        engine.attack(7, Position::new(4, 4)).map(|_| ()),
        Err(GameError::CellAlreadyTargeted { x: 4, y: 4 })
    );
    assert_eq!(engine.current_turn(), Some(7));
}

#[test]
fn test_negative_and_oversized_targets() {
    let mut engine = started_match();
    assert_eq!(Position::from_signed(-1, 0), Err(GameError::OutOfBounds { x: -1, y: 0 }));
    assert_eq!(
        engine.attack(7, Position::new(3, 10)).map(|_| ()),
        Err(GameError::OutOfBounds { x: 3, y: 10 })
    );
    assert_eq!(engine.current_turn(), Some(7));
}

#[test]
fn test_winner_is_monotonic() {
    let mut engine = started_match();
    let report = engine.attack(7, Position::new(9, 9)).unwrap();
    assert!(matches!(report.outcome, AttackOutcome::Killed { .. }));

    assert_eq!(engine.check_winner(), Some(7));
    assert_eq!(engine.phase(), MatchPhase::Finished);
    assert_eq!(engine.check_winner(), Some(7));
    assert_eq!(engine.winner(), Some(7));

    assert_eq!(
        engine.attack(7, Position::new(0, 9)).map(|_| ()),
        Err(GameError::MatchFinished)
    );
    assert_eq!(engine.check_winner(), Some(7));
}

#[test]
fn test_first_seat_wins_when_both_fleets_are_sunk() {
    let mut engine = BattleEngine::new(2);
    engine
        .submit_fleet(0, fleet(&[(ShipClass::Small, Orientation::Horizontal, 0, 0)]))
        .unwrap();
    engine
        .submit_fleet(1, fleet(&[(ShipClass::Small, Orientation::Horizontal, 9, 9)]))
        .unwrap();
    engine.begin().unwrap();

    // Seat 0 sinks seat 1 but nobody checks for a winner yet.
    engine.attack(0, Position::new(9, 9)).unwrap();
    engine.attack(0, Position::new(5, 5)).unwrap();
    engine.attack(1, Position::new(0, 0)).unwrap();

    assert_eq!(engine.check_winner(), Some(0));
}

#[test]
fn test_switch_turn() {
    let mut engine = started_match();
    assert_eq!(engine.switch_turn(), Ok(3));
    assert_eq!(engine.switch_turn(), Ok(7));
}
