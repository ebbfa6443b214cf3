//! End-to-end player scenarios over scripted backend and resolver
//!
//! The clock is paused, so timers (engine tick, load timeout) advance
//! instantly whenever every task is idle.

mod common;

use aria_core::{PreferenceStore, StreamResolver, Track};
use aria_playback::types::RepeatMode;
use aria_playback::{MediaBackend, Player, PlayerError};
use common::{
    song, test_config, wait_until, LoadBehavior, MemoryPrefs, MockResolver, ScriptedBackend,
};
use std::sync::Arc;
use std::time::Duration;

fn player_without_radio(backend: &Arc<ScriptedBackend>, resolver: &Arc<MockResolver>) -> Player {
    let mut config = test_config();
    config.radio_enabled = false;
    Player::new(
        Arc::clone(backend) as Arc<dyn MediaBackend>,
        Arc::clone(resolver) as Arc<dyn StreamResolver>,
        config,
    )
}

#[tokio::test(start_paused = true)]
async fn queue_advances_to_the_end_then_stops() {
    let backend = ScriptedBackend::new();
    let resolver = MockResolver::new();
    let player = player_without_radio(&backend, &resolver);

    player
        .play_all(vec![song("a", "A"), song("b", "B"), song("c", "C")], 0)
        .await
        .unwrap();
    assert_eq!(backend.loaded(), Some("a".to_string()));
    assert_eq!(player.queue().await.len(), 2);

    backend.finish_current();
    wait_until("b loads", || backend.loaded() == Some("b".to_string())).await;

    backend.finish_current();
    wait_until("c loads", || backend.loaded() == Some("c".to_string())).await;
    assert!(player.queue().await.is_empty());

    backend.finish_current();
    wait_until("playback settles", || !player.state().is_playing).await;

    // Current track stays shown after the natural stop
    let state = player.state();
    assert_eq!(state.current_track.map(|t| t.id), Some("c".to_string()));

    // History holds the played-out tracks, oldest first
    let history: Vec<_> = player.history().await.into_iter().map(|t| t.id).collect();
    assert_eq!(history, vec!["a", "b"]);

    player.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn failed_load_skips_to_next_queued_track() {
    let backend = ScriptedBackend::new();
    backend.set_behavior("bad", LoadBehavior::Fail);
    let resolver = MockResolver::new();
    let player = player_without_radio(&backend, &resolver);

    player
        .play_all(vec![song("bad", "Bad"), song("ok", "Ok")], 0)
        .await
        .unwrap();

    assert_eq!(backend.loaded(), Some("ok".to_string()));
    assert!(player.state().is_playing);
    // Failed track never played, so it never reached history
    assert!(player.history().await.is_empty());

    player.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn exhausting_the_queue_with_failures_settles_stopped() {
    let backend = ScriptedBackend::new();
    backend.set_behavior("bad1", LoadBehavior::Fail);
    backend.set_behavior("bad2", LoadBehavior::Fail);
    let resolver = MockResolver::new();
    let player = player_without_radio(&backend, &resolver);

    let result = player
        .play_all(vec![song("bad1", "Bad 1"), song("bad2", "Bad 2")], 0)
        .await;

    assert!(matches!(result, Err(PlayerError::NothingPlayable)));
    assert!(!player.state().is_playing);

    player.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn hanging_load_times_out_and_skips() {
    let backend = ScriptedBackend::new();
    backend.set_behavior("stuck", LoadBehavior::Hang);
    let resolver = MockResolver::new();
    let player = player_without_radio(&backend, &resolver);

    player
        .play_all(vec![song("stuck", "Stuck"), song("ok", "Ok")], 0)
        .await
        .unwrap();

    assert_eq!(backend.loaded(), Some("ok".to_string()));

    player.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn previous_deep_into_a_track_restarts_it() {
    let backend = ScriptedBackend::new();
    let resolver = MockResolver::new();
    let player = player_without_radio(&backend, &resolver);

    player.play_track(song("a", "A")).await.unwrap();
    player.play_track(song("b", "B")).await.unwrap();
    backend.set_position(Duration::from_secs(10));
    wait_until("position observed", || {
        player.state().position >= Duration::from_secs(10)
    })
    .await;

    player.previous().await.unwrap();

    // Same track, scrubbed to zero; history untouched
    assert_eq!(backend.loaded(), Some("b".to_string()));
    assert_eq!(backend.last_seek(), Duration::ZERO);
    assert_eq!(player.history().await.len(), 1);

    player.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn previous_early_in_a_track_goes_back() {
    let backend = ScriptedBackend::new();
    let resolver = MockResolver::new();
    let player = player_without_radio(&backend, &resolver);

    player.play_track(song("a", "A")).await.unwrap();
    player.play_track(song("b", "B")).await.unwrap();
    // Fresh load: position is still zero, below the restart threshold

    player.previous().await.unwrap();

    assert_eq!(backend.loaded(), Some("a".to_string()));
    // The displaced track is next in line
    let queue: Vec<_> = player.queue().await.into_iter().map(|t| t.id).collect();
    assert_eq!(queue, vec!["b"]);

    player.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn repeat_one_reloads_the_same_track() {
    let backend = ScriptedBackend::new();
    let resolver = MockResolver::new();
    let player = player_without_radio(&backend, &resolver);

    player
        .play_all(vec![song("a", "A"), song("b", "B")], 0)
        .await
        .unwrap();
    assert_eq!(player.cycle_repeat().await, RepeatMode::One);

    backend.finish_current();
    wait_until("a reloads", || backend.load_count("a") >= 2).await;

    assert_eq!(backend.loaded(), Some("a".to_string()));
    // The queue was not consumed
    assert_eq!(player.queue().await.len(), 1);

    player.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn repeat_all_replays_history_from_the_oldest() {
    let backend = ScriptedBackend::new();
    let resolver = MockResolver::new();
    let player = player_without_radio(&backend, &resolver);

    player.cycle_repeat().await;
    assert_eq!(player.cycle_repeat().await, RepeatMode::All);
    player
        .play_all(vec![song("a", "A"), song("b", "B")], 0)
        .await
        .unwrap();

    backend.finish_current();
    wait_until("b loads", || backend.loaded() == Some("b".to_string())).await;

    // Queue is now empty; finishing b wraps back to a
    backend.finish_current();
    wait_until("a replays", || backend.load_count("a") >= 2).await;
    assert_eq!(backend.loaded(), Some("a".to_string()));

    player.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn manual_skip_ignores_repeat_one() {
    let backend = ScriptedBackend::new();
    let resolver = MockResolver::new();
    let player = player_without_radio(&backend, &resolver);

    player
        .play_all(vec![song("a", "A"), song("b", "B")], 0)
        .await
        .unwrap();
    player.cycle_repeat().await; // One

    player.next().await.unwrap();
    assert_eq!(backend.loaded(), Some("b".to_string()));

    player.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn mid_play_failure_recovers_with_next_track() {
    let backend = ScriptedBackend::new();
    let resolver = MockResolver::new();
    let player = player_without_radio(&backend, &resolver);

    player
        .play_all(vec![song("a", "A"), song("b", "B")], 0)
        .await
        .unwrap();

    backend.fail_current();
    wait_until("b loads after failure", || {
        backend.loaded() == Some("b".to_string())
    })
    .await;
    assert!(player.state().is_playing);

    player.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn radio_refills_a_low_queue_with_filtering() {
    let backend = ScriptedBackend::new();
    let resolver = MockResolver::new();
    resolver.set_related(
        "seed",
        vec![
            song("seed", "Seed again"), // Duplicate of current
            Track::new("short", "Short", "Artist", Duration::from_secs(20)), // Too short
            Track::new("long", "Long", "Artist", Duration::from_secs(1800)), // Too long
            song("r1", "Related 1"),
            song("r2", "Related 2"),
        ],
    );
    let player = Player::new(
        Arc::clone(&backend) as Arc<dyn MediaBackend>,
        Arc::clone(&resolver) as Arc<dyn StreamResolver>,
        test_config(),
    );

    player.play_track(song("seed", "Seed")).await.unwrap();
    wait_until("refill fetch happens", || resolver.related_calls() >= 1).await;

    let mut queue = Vec::new();
    for _ in 0..500 {
        queue = player.queue().await;
        if queue.len() >= 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let ids: Vec<_> = queue.into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec!["r1", "r2"]);

    player.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn radio_restarts_playback_after_the_queue_runs_dry() {
    let backend = ScriptedBackend::new();
    let resolver = MockResolver::new();
    resolver.set_related("a", vec![song("next", "Next Up")]);
    let mut config = test_config();
    // Disable the low-queue refill so only the ended path can fetch
    config.refill_threshold = 0;
    let player = Player::new(
        Arc::clone(&backend) as Arc<dyn MediaBackend>,
        Arc::clone(&resolver) as Arc<dyn StreamResolver>,
        config,
    );

    player.play_track(song("a", "A")).await.unwrap();
    assert!(player.queue().await.is_empty());

    backend.finish_current();
    wait_until("continuation restarts playback", || {
        backend.loaded() == Some("next".to_string()) && player.state().is_playing
    })
    .await;

    player.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn radio_errors_never_disturb_playback() {
    let backend = ScriptedBackend::new();
    let resolver = MockResolver::new();
    // No related tracks scripted: every fetch errors
    let player = Player::new(
        Arc::clone(&backend) as Arc<dyn MediaBackend>,
        Arc::clone(&resolver) as Arc<dyn StreamResolver>,
        test_config(),
    );

    player.play_track(song("a", "A")).await.unwrap();
    wait_until("fetch attempted", || resolver.related_calls() >= 1).await;

    assert!(player.state().is_playing);
    assert_eq!(backend.loaded(), Some("a".to_string()));

    player.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn track_starts_are_logged_to_preferences() {
    let backend = ScriptedBackend::new();
    let resolver = MockResolver::new();
    let prefs = MemoryPrefs::new();
    let player = player_without_radio(&backend, &resolver);
    player.attach_preferences(Arc::clone(&prefs) as Arc<dyn PreferenceStore>);

    player
        .play_all(vec![song("a", "A"), song("b", "B")], 0)
        .await
        .unwrap();
    wait_until("play logged", || {
        prefs
            .value("playback.history")
            .and_then(|v| v.as_array().map(|a| !a.is_empty()))
            .unwrap_or(false)
    })
    .await;

    let log = prefs.value("playback.history").unwrap();
    let entry = &log.as_array().unwrap()[0];
    assert_eq!(entry["id"], "a");
    assert_eq!(entry["title"], "A");
    assert!(entry["played_at_ms"].as_i64().unwrap() > 0);

    player.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn pause_and_resume_round_trip() {
    let backend = ScriptedBackend::new();
    let resolver = MockResolver::new();
    let player = player_without_radio(&backend, &resolver);

    player.play_track(song("a", "A")).await.unwrap();
    wait_until("playing confirmed", || player.state().is_playing).await;

    player.pause().await.unwrap();
    wait_until("pause confirmed", || !player.state().is_playing).await;

    player.play().await.unwrap();
    wait_until("resume confirmed", || player.state().is_playing).await;

    player.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn mode_flags_are_observable() {
    let backend = ScriptedBackend::new();
    let resolver = MockResolver::new();
    let player = player_without_radio(&backend, &resolver);

    assert!(!player.shuffle().await);
    assert!(player.toggle_shuffle().await);
    assert!(player.shuffle().await);

    assert_eq!(player.repeat().await, RepeatMode::Off);
    player.cycle_repeat().await;
    assert_eq!(player.repeat().await, RepeatMode::One);

    player.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn volume_clamps_and_publishes() {
    let backend = ScriptedBackend::new();
    let resolver = MockResolver::new();
    let player = player_without_radio(&backend, &resolver);

    player.set_volume(1.7).await.unwrap();
    assert_eq!(player.state().volume, 1.0);
    player.set_volume(-0.3).await.unwrap();
    assert_eq!(player.state().volume, 0.0);

    player.shutdown().await;
}
