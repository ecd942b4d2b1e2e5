use battleship_server::{
    GameError, LoginError, PlayerDirectory, PlayerProfile, RoomLobby, WinnerEntry,
};

fn profile(name: &str, index: u32) -> PlayerProfile {
    PlayerProfile {
        name: name.to_string(),
        index,
    }
}

#[test]
fn test_login_registers_then_checks_password() {
    let directory = PlayerDirectory::new();
    let alice = directory.login("alice", "secret").unwrap();
    let bobby = directory.login("bobby", "hunter2").unwrap();
    assert_eq!(alice, profile("alice", 0));
    assert_eq!(bobby, profile("bobby", 1));

    assert_eq!(directory.login("alice", "secret"), Ok(profile("alice", 0)));
    assert_eq!(
        directory.login("alice", "wrong-pass"),
        Err(LoginError::WrongPassword)
    );
}

#[test]
fn test_login_requires_five_characters() {
    let directory = PlayerDirectory::new();
    assert_eq!(
        directory.login("bob", "password"),
        Err(LoginError::InvalidCredentials)
    );
    assert_eq!(
        directory.login("robert", "1234"),
        Err(LoginError::InvalidCredentials)
    );
    assert_eq!(LoginError::InvalidCredentials.to_string(), "invalid user data");
    assert!(directory.list_winners().is_empty());
}

#[test]
fn test_wins_are_counted_in_registration_order() {
    let directory = PlayerDirectory::new();
    directory.login("alice", "secret").unwrap();
    directory.login("bobby", "secret").unwrap();

    assert_eq!(directory.record_win(1), Ok(1));
    assert_eq!(directory.record_win(1), Ok(2));
    assert_eq!(
        directory.record_win(9),
        Err(GameError::NoSuchPlayer { player: 9 })
    );
    assert_eq!(
        directory.list_winners(),
        vec![
            WinnerEntry {
                name: "alice".into(),
                wins: 0
            },
            WinnerEntry {
                name: "bobby".into(),
                wins: 2
            },
        ]
    );
}

#[test]
fn test_room_fills_with_two_players() {
    let lobby = RoomLobby::new();
    let alice = profile("alice", 0);
    let bobby = profile("bobby", 1);

    let room = lobby.create_room(&alice).unwrap();
    assert_eq!(lobby.create_room(&alice), None);
    let open = lobby.open_rooms();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].room_id, room);
    assert_eq!(open[0].room_users, vec![alice.clone()]);

    assert_eq!(lobby.add_user_to_room(&bobby, room), Ok(Some([0, 1])));
    assert!(lobby.open_rooms().is_empty());

    let carol = profile("carol", 2);
    assert_eq!(lobby.add_user_to_room(&carol, room), Err(GameError::RoomFull));
    assert_eq!(
        lobby.add_user_to_room(&carol, 7),
        Err(GameError::NoSuchRoom { id: 7 })
    );
}

#[test]
fn test_seated_player_cannot_join_elsewhere() {
    let lobby = RoomLobby::new();
    let alice = profile("alice", 0);
    let bobby = profile("bobby", 1);
    let first = lobby.create_room(&alice).unwrap();
    let second = lobby.create_room(&bobby).unwrap();

    assert_eq!(lobby.add_user_to_room(&alice, second), Ok(None));
    assert_eq!(lobby.open_rooms().len(), 2);
    assert_ne!(first, second);
}

#[test]
fn test_release_closes_unstarted_room() {
    let lobby = RoomLobby::new();
    let alice = profile("alice", 0);
    let room = lobby.create_room(&alice).unwrap();
    lobby.release(0);
    assert!(lobby.open_rooms().is_empty());
    assert_eq!(
        lobby.add_user_to_room(&profile("bobby", 1), room),
        Err(GameError::NoSuchRoom { id: room })
    );

    // A released player may open a new room.
    assert!(lobby.create_room(&alice).is_some());
}

#[test]
fn test_release_after_game_frees_both_players() {
    let lobby = RoomLobby::new();
    let alice = profile("alice", 0);
    let bobby = profile("bobby", 1);
    let room = lobby.create_room(&alice).unwrap();
    lobby.add_user_to_room(&bobby, room).unwrap();
    lobby.release(0);
    lobby.release(1);
    assert!(lobby.create_room(&alice).is_some());
    assert!(lobby.create_room(&bobby).is_some());
}
