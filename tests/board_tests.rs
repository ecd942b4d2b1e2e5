use battleship_server::{
    Board, CellState, Fleet, GameError, Orientation, Position, Ship, ShipClass,
};

fn two_cell_fleet() -> (Fleet, Ship) {
    let ship = Ship::new(ShipClass::Medium, Orientation::Horizontal, Position::new(0, 0), 2).unwrap();
    (Fleet::new(vec![ship]).unwrap(), ship)
}

#[test]
fn test_fresh_board_is_empty() {
    let (fleet, _) = two_cell_fleet();
    let board = Board::for_fleet(&fleet);
    assert_eq!(board.empty_cells().len(), 100);
    assert_eq!(board.cell_state(Position::new(0, 0)), Ok(CellState::Empty));
}

#[test]
fn test_hit_then_kill_sweeps_perimeter() {
    let (fleet, ship) = two_cell_fleet();
    let mut board = Board::for_fleet(&fleet);

    assert_eq!(board.mark_attack(Position::new(0, 0)), Ok(true));
    assert_eq!(board.cell_state(Position::new(0, 0)), Ok(CellState::Shot));
    assert!(!ship.is_fully_shot(&board));

    assert_eq!(board.mark_attack(Position::new(1, 0)), Ok(true));
    assert!(ship.is_fully_shot(&board));

    board.mark_killed(&ship);
    assert!(ship.is_killed(&board));
    let swept = board.sweep_around(&ship);
    assert_eq!(
        swept,
        vec![
            Position::new(2, 0),
            Position::new(0, 1),
            Position::new(1, 1),
            Position::new(2, 1)
        ]
    );
    for pos in &swept {
        assert_eq!(board.cell_state(*pos), Ok(CellState::Miss));
    }
    assert_eq!(board.cell_state(Position::new(3, 0)), Ok(CellState::Empty));
    assert_eq!(board.empty_cells().len(), 100 - 2 - 4);
}

#[test]
fn test_sweep_skips_already_attacked_cells() {
    let (fleet, ship) = two_cell_fleet();
    let mut board = Board::for_fleet(&fleet);

    assert_eq!(board.mark_attack(Position::new(1, 1)), Ok(false));
    board.mark_attack(Position::new(0, 0)).unwrap();
    board.mark_attack(Position::new(1, 0)).unwrap();
    board.mark_killed(&ship);
    let swept = board.sweep_around(&ship);
    assert_eq!(
        swept,
        vec![Position::new(2, 0), Position::new(0, 1), Position::new(2, 1)]
    );
}

#[test]
fn test_repeat_attack_is_rejected() {
    let (fleet, _) = two_cell_fleet();
    let mut board = Board::for_fleet(&fleet);

    assert_eq!(board.mark_attack(Position::new(5, 5)), Ok(false));
    let before = board.clone();
    assert_eq!(
        board.mark_attack(Position::new(5, 5)),
        Err(GameError::CellAlreadyTargeted { x: 5, y: 5 })
    );
    assert_eq!(board, before);
}

#[test]
fn test_attack_outside_board() {
    let (fleet, _) = two_cell_fleet();
    let mut board = Board::for_fleet(&fleet);
    assert_eq!(
        board.mark_attack(Position::new(10, 3)),
        Err(GameError::OutOfBounds { x: 10, y: 3 })
    );
}
