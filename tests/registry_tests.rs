use std::sync::Arc;

use battleship_server::{Fleet, GameError, MatchPhase, MatchRegistry};
use rand::{rngs::SmallRng, SeedableRng};

#[tokio::test(flavor = "multi_thread")]
async fn test_get_or_create_returns_same_match() {
    let registry = MatchRegistry::new();
    assert!(registry.is_empty());

    let a = registry.get_or_create(5);
    let b = registry.get_or_create(5);
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(registry.len(), 1);
    assert_eq!(a.lock().await.match_id(), 5);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_unknown_match() {
    let registry = MatchRegistry::new();
    assert!(matches!(registry.get(42), Err(GameError::NoSuchMatch { id: 42 })));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_reserve_keeps_existing_match() {
    let registry = MatchRegistry::new();
    let reserved = registry.reserve(1, [10, 11]);
    let mut rng = SmallRng::seed_from_u64(3);
    {
        let mut engine = reserved.lock().await;
        assert_eq!(
            engine.submit_fleet(12, Fleet::random(&mut rng).unwrap()),
            Err(GameError::NoSuchPlayer { player: 12 })
        );
        engine.submit_fleet(10, Fleet::random(&mut rng).unwrap()).unwrap();
    }

    let again = registry.reserve(1, [20, 21]);
    assert!(Arc::ptr_eq(&reserved, &again));
    assert_eq!(again.lock().await.seat_indices(), vec![10]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_finished_matches_stay_registered() {
    let registry = MatchRegistry::new();
    let shared = registry.get_or_create(0);
    let mut rng = SmallRng::seed_from_u64(8);
    {
        let mut engine = shared.lock().await;
        engine.submit_fleet(0, Fleet::random(&mut rng).unwrap()).unwrap();
        engine.submit_fleet(1, Fleet::random(&mut rng).unwrap()).unwrap();
        engine.begin().unwrap();
        while engine.check_winner().is_none() {
            let attacker = engine.current_turn().unwrap();
            let target = engine.random_target(attacker, &mut rng).unwrap();
            engine.attack(attacker, target).unwrap();
        }
        assert_eq!(engine.phase(), MatchPhase::Finished);
    }
    let again = registry.get(0).unwrap();
    assert_eq!(again.lock().await.phase(), MatchPhase::Finished);
    assert_eq!(registry.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_matches_lock_independently() {
    let registry = Arc::new(MatchRegistry::new());
    let first = registry.get_or_create(1);
    let _held = first.lock().await;

    // A different match is reachable while match 1 is locked.
    let other = registry.get_or_create(2);
    let guard = tokio::time::timeout(std::time::Duration::from_secs(1), other.lock()).await;
    assert!(guard.is_ok());
}
