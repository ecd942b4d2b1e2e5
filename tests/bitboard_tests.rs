use battleship_server::{BitBoard, BitBoardError, Position};

#[test]
fn test_try_new_sizes() {
    let ok = BitBoard::<u128, 10>::try_new();
    assert!(ok.is_ok());

    let err = BitBoard::<u8, 3>::try_new();
    assert!(matches!(err, Err(BitBoardError::SizeTooLarge { n: 3, capacity: 8 })));
}

#[test]
fn test_get_set() {
    let mut bb = BitBoard::<u16, 4>::new();
    assert!(bb.is_empty());

    bb.set(Position::new(1, 2)).unwrap();
    assert!(bb.get(Position::new(1, 2)).unwrap());
    assert!(!bb.get(Position::new(2, 1)).unwrap());
    assert_eq!(bb.count_ones(), 1);
    assert!(!bb.is_empty());
}

#[test]
fn test_out_of_bounds() {
    let mut bb = BitBoard::<u16, 4>::new();
    assert_eq!(
        bb.set(Position::new(4, 0)),
        Err(BitBoardError::IndexOutOfBounds { x: 4, y: 0 })
    );
    assert!(bb.get(Position::new(0, 4)).is_err());
}

#[test]
fn test_iter_set_bits_is_row_major() {
    let bb = BitBoard::<u16, 4>::from_positions([
        Position::new(3, 3),
        Position::new(2, 0),
        Position::new(0, 1),
    ])
    .unwrap();
    let bits: Vec<_> = bb.iter_set_bits().collect();
    assert_eq!(
        bits,
        vec![Position::new(2, 0), Position::new(0, 1), Position::new(3, 3)]
    );
}

#[test]
fn test_halo_in_the_middle() {
    let bb = BitBoard::<u128, 10>::from_positions([Position::new(5, 5)]).unwrap();
    let halo = bb.halo();
    assert_eq!(halo.count_ones(), 8);
    assert!(!halo.get(Position::new(5, 5)).unwrap());
    for y in 4..=6 {
        for x in 4..=6 {
            if (x, y) != (5, 5) {
                assert!(halo.get(Position::new(x, y)).unwrap());
            }
        }
    }
}

#[test]
fn test_halo_clipped_at_corner() {
    let bb = BitBoard::<u128, 10>::from_positions([Position::new(9, 9)]).unwrap();
    let cells: Vec<_> = bb.halo().iter_set_bits().collect();
    assert_eq!(
        cells,
        vec![Position::new(8, 8), Position::new(9, 8), Position::new(8, 9)]
    );
}

#[test]
fn test_not_stays_on_grid() {
    let bb = BitBoard::<u16, 3>::new();
    assert_eq!((!bb).count_ones(), 9);
}

#[test]
fn test_bit_ops() {
    let a = BitBoard::<u16, 4>::from_positions([Position::new(0, 0), Position::new(1, 1)]).unwrap();
    let b = BitBoard::<u16, 4>::from_positions([Position::new(1, 1), Position::new(2, 2)]).unwrap();
    assert_eq!((a & b).iter_set_bits().collect::<Vec<_>>(), vec![Position::new(1, 1)]);
    assert_eq!((a | b).count_ones(), 3);
}
