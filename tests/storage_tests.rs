mod common;

use std::sync::Arc;

use btc_prophet::db::{self, PgBackend, Storage, StorageBackend, StorageMode};
use btc_prophet::game::{GameEngine, Resolution, RESOLUTION_WINDOW_MS};
use btc_prophet::models::{Direction, Guess, GuessResult, Player};

use common::{Fault, ScriptedPrimary, T0};

fn storage_with(primary: &Arc<ScriptedPrimary>) -> Storage {
    Storage::new(Some(primary.clone() as Arc<dyn StorageBackend>))
}

#[tokio::test]
async fn test_healthy_primary_serves_all_calls() {
    let primary = ScriptedPrimary::new(Fault::Healthy);
    let storage = storage_with(&primary);

    storage.save_player(&Player::new("p1", T0)).await;
    storage.save_guess(&Guess::new("p1", Direction::Up, 100.0, T0)).await;

    assert!(primary.data.get_player("p1").is_some());
    assert_eq!(primary.data.get_guesses("p1").len(), 1);
    assert!(storage.fallback().get_player("p1").is_none());
    assert_eq!(storage.mode(), StorageMode::Primary);
}

#[tokio::test]
async fn test_missing_resource_is_permanent() {
    let primary = ScriptedPrimary::new(Fault::MissingResource);
    let storage = storage_with(&primary);

    storage.save_player(&Player::new("p1", T0)).await;
    assert_eq!(primary.calls(), 1);
    assert_eq!(storage.mode(), StorageMode::Degraded);

    // Even a recovered primary is never consulted again
    primary.set_fault(Fault::Healthy);
    for _ in 0..10 {
        storage.get_player("p1").await;
        storage.get_active_guess("p1").await;
        storage.save_guess(&Guess::new("p1", Direction::Down, 1.0, T0)).await;
        storage.delete_guess("p1", T0).await;
    }
    assert_eq!(primary.calls(), 1);
    assert!(primary.data.get_player("p1").is_none());
    assert!(storage.get_player("p1").await.is_some());
}

#[tokio::test]
async fn test_transient_error_falls_back_for_one_call() {
    let primary = ScriptedPrimary::new(Fault::Healthy);
    primary.data.save_player(&Player::new("p1", T0));
    let storage = storage_with(&primary);

    primary.set_fault(Fault::Transient);
    assert!(storage.get_player("p1").await.is_none(), "served from empty fallback");
    assert_eq!(storage.mode(), StorageMode::Primary);

    primary.set_fault(Fault::Healthy);
    assert!(storage.get_player("p1").await.is_some(), "primary used again");
    assert_eq!(primary.calls(), 2);
}

#[tokio::test]
async fn test_no_primary_never_connects() {
    let storage = Storage::in_memory();
    storage.save_player(&Player::new("p1", T0)).await;

    assert_eq!(storage.mode(), StorageMode::Memory);
    assert!(storage.fallback().get_player("p1").is_some());
}

#[tokio::test]
async fn test_game_survives_primary_outage_mid_round() {
    let primary = ScriptedPrimary::new(Fault::Healthy);
    let engine = GameEngine::new(Arc::new(storage_with(&primary)));

    engine.get_or_create_player("p1", T0).await.unwrap();
    engine.place_guess("p1", Direction::Up, 100.0, T0).await.unwrap();

    // Table dropped underneath us: state in the primary is no longer visible
    primary.set_fault(Fault::MissingResource);
    let r = engine
        .resolve_guess("p1", 120.0, T0 + RESOLUTION_WINDOW_MS)
        .await
        .unwrap();
    assert_eq!(r, Resolution::Pending);
    assert_eq!(engine.storage().mode(), StorageMode::Degraded);

    // A fresh round works entirely in memory
    let player = engine.get_or_create_player("p1", T0 + 1).await.unwrap();
    assert_eq!(player.score, 0);
    engine.place_guess("p1", Direction::Up, 100.0, T0 + 1).await.unwrap();
    let r = engine
        .resolve_guess("p1", 120.0, T0 + 1 + RESOLUTION_WINDOW_MS)
        .await
        .unwrap();
    assert!(matches!(r, Resolution::Resolved { score_change: 1, .. }));
}

#[tokio::test]
async fn test_reset_isolates_state() {
    let primary = ScriptedPrimary::new(Fault::Healthy);
    let storage = storage_with(&primary);
    storage.fallback().save_player(&Player::new("p1", T0));

    storage.reset();

    assert_eq!(storage.mode(), StorageMode::Degraded);
    assert!(storage.get_player("p1").await.is_none());
    assert_eq!(primary.calls(), 0);
}

/// Round trip through a real Postgres. Runs only when TEST_DATABASE_URL is set.
#[tokio::test]
async fn test_postgres_backend_round_trip() {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping Postgres round trip");
        return;
    };

    let pool = db::init_pool(&url, 5, std::time::Duration::from_secs(5))
        .expect("Failed to build pool");
    db::run_migrations(&pool).await.expect("Failed to run migrations");

    sqlx::query("DELETE FROM guesses WHERE player_id = 'pg-round-trip'")
        .execute(&pool)
        .await
        .ok();
    sqlx::query("DELETE FROM players WHERE id = 'pg-round-trip'")
        .execute(&pool)
        .await
        .ok();

    let backend = PgBackend::new(pool.clone());

    let mut player = Player::new("pg-round-trip", T0);
    backend.save_player(&player).await.unwrap();
    player.score = -2;
    backend.save_player(&player).await.unwrap();
    assert_eq!(backend.get_player("pg-round-trip").await.unwrap(), Some(player));

    let guess = Guess::new("pg-round-trip", Direction::Down, 64_000.5, T0);
    backend.save_guess(&guess).await.unwrap();
    assert_eq!(
        backend.get_active_guess("pg-round-trip").await.unwrap(),
        Some(guess.clone())
    );

    let resolved = Guess {
        resolved: true,
        result: Some(GuessResult::Win),
        resolved_price: Some(63_000.0),
        resolved_at: Some(T0 + RESOLUTION_WINDOW_MS),
        ..guess
    };
    backend.save_guess(&resolved).await.unwrap();
    assert_eq!(backend.get_active_guess("pg-round-trip").await.unwrap(), None);

    assert_eq!(count_guesses(&pool, "pg-round-trip").await, 1);

    backend
        .delete_guess("pg-round-trip", resolved.timestamp)
        .await
        .unwrap();
    assert_eq!(count_guesses(&pool, "pg-round-trip").await, 0);
}

async fn count_guesses(pool: &sqlx::PgPool, player_id: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM guesses WHERE player_id = $1")
        .bind(player_id)
        .fetch_one(pool)
        .await
        .unwrap()
}
