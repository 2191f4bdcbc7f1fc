use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;

use crate::error::PlayerError;
use crate::haptics::Haptic;
use crate::state::PlayerEvent;
use crate::testing::{DeviceCall, TestRig};
use crate::types::{AudioItem, PlaybackSpeed, PlaybackState};

fn episode(id: &str) -> AudioItem {
    AudioItem::episode(id, format!("https://x/{id}.mp3")).with_title(id.to_uppercase())
}

/// Rig with an episode playing at 30s of a 600s source
async fn playing_rig() -> TestRig {
    let rig = TestRig::new();
    rig.device.set_duration(Some(600.0));
    rig.controller
        .play(episode("e1").with_resume_position_ms(30_000))
        .await
        .unwrap();
    rig
}

async fn yield_until(mut done: impl FnMut() -> bool) {
    for _ in 0..100 {
        if done() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}

// --- play ---

#[tokio::test]
async fn test_episode_resume_scenario() {
    let rig = TestRig::new();
    rig.device.set_duration(Some(600.0));

    let item = AudioItem::episode("e1", "https://x/a.mp3").with_resume_position_ms(30_000);
    rig.controller.play(item.clone()).await.unwrap();

    let state = rig.controller.state().await;
    assert_eq!(state.playback, PlaybackState::Playing);
    assert_eq!(state.position_ms, 30_000);
    assert_eq!(state.duration_ms, 600_000);
    assert_eq!(state.current_item, Some(item));
    assert!(rig.controller.is_playing().await);
    assert!(!rig.controller.is_loading().await);

    assert_eq!(
        rig.device.calls(),
        vec![
            DeviceCall::Load("https://x/a.mp3".to_string()),
            DeviceCall::SetRate(1.0),
            DeviceCall::SeekTo(30.0),
            DeviceCall::Play,
        ]
    );
    assert_eq!(rig.haptics.fired(), vec![Haptic::Success]);
}

#[tokio::test]
async fn test_summary_loads_signed_url() {
    let rig = TestRig::new();
    rig.resolver.set_url("m1", "https://signed/m1");

    let item = AudioItem::summary("s1", "m1").with_source_url("briefs/m1-seed.mp3");
    rig.controller.play(item).await.unwrap();

    assert_eq!(rig.resolver.calls(), vec!["m1"]);
    assert_eq!(rig.device.loads(), vec!["https://signed/m1"]);
    assert_eq!(rig.device.loaded_url().as_deref(), Some("https://signed/m1"));
}

#[tokio::test]
async fn test_summary_resolved_on_every_play() {
    let rig = TestRig::new();
    let item = AudioItem::summary("s1", "m1");

    rig.controller.play(item.clone()).await.unwrap();
    rig.controller.play(item).await.unwrap();

    assert_eq!(rig.resolver.calls(), vec!["m1", "m1"]);
}

#[tokio::test]
async fn test_episode_never_resolved() {
    let rig = TestRig::new();
    rig.controller.play(episode("e1")).await.unwrap();

    assert!(rig.resolver.calls().is_empty());
    assert_eq!(rig.device.loads(), vec!["https://x/e1.mp3"]);
}

#[tokio::test]
async fn test_zero_resume_does_not_seek() {
    let rig = TestRig::new();
    rig.controller.play(episode("e1")).await.unwrap();

    assert_eq!(rig.device.count(|c| matches!(c, DeviceCall::SeekTo(_))), 0);
    assert_eq!(rig.controller.position_ms().await, 0);
}

#[tokio::test]
async fn test_resume_beyond_duration_is_clamped() {
    let rig = TestRig::new();
    rig.device.set_duration(Some(60.0));

    rig.controller
        .play(episode("e1").with_resume_position_ms(90_000))
        .await
        .unwrap();

    assert_eq!(rig.controller.position_ms().await, 60_000);
    assert_eq!(rig.device.count(|c| *c == DeviceCall::SeekTo(60.0)), 1);
}

#[tokio::test]
async fn test_item_duration_used_when_device_has_none() {
    let rig = TestRig::new();
    rig.controller
        .play(episode("e1").with_duration_ms(120_000))
        .await
        .unwrap();

    assert_eq!(rig.controller.duration_ms().await, 120_000);
}

// --- failures ---

#[tokio::test]
async fn test_resolver_failure_from_idle() {
    let rig = TestRig::new();
    rig.resolver.fail("m1");

    let err = rig
        .controller
        .play(AudioItem::summary("s1", "m1"))
        .await
        .unwrap_err();

    assert!(matches!(err, PlayerError::UrlResolutionFailed { ref item_id, .. } if item_id == "s1"));
    assert!(err.is_user_visible());
    assert_eq!(rig.controller.playback_state().await, PlaybackState::Idle);
    assert!(rig.controller.current_item().await.is_none());
    assert!(rig.device.calls().is_empty());
    assert_eq!(rig.haptics.fired(), vec![Haptic::Error]);
}

#[tokio::test]
async fn test_empty_signed_url_fails() {
    let rig = TestRig::new();
    rig.resolver.set_url("m1", "");

    let err = rig
        .controller
        .play(AudioItem::summary("s1", "m1"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PlayerError::UrlResolutionFailed { source: None, .. }
    ));
    assert!(rig.device.loads().is_empty());
}

#[tokio::test]
async fn test_failed_play_keeps_previous_session() {
    let rig = playing_rig().await;
    rig.controller.pause().await.unwrap();
    let before = rig.controller.state().await;
    rig.resolver.fail("m9");

    let result = rig.controller.play(AudioItem::summary("s9", "m9")).await;

    assert!(result.is_err());
    assert_eq!(rig.controller.state().await, before);
}

#[tokio::test]
async fn test_device_load_failure_restores_state() {
    let rig = playing_rig().await;
    rig.device.fail_load("https://x/bad.mp3");

    let err = rig.controller.play(episode("bad")).await.unwrap_err();

    assert!(matches!(
        err,
        PlayerError::DeviceLoadFailed { ref url, .. } if url == "https://x/bad.mp3"
    ));
    let state = rig.controller.state().await;
    assert_eq!(state.playback, PlaybackState::Playing);
    assert_eq!(state.current_item.unwrap().id, "e1");
    assert_eq!(state.position_ms, 30_000);
    assert_eq!(rig.haptics.count(Haptic::Error), 1);
}

#[tokio::test]
async fn test_device_play_failure_is_load_failure() {
    let rig = TestRig::new();
    rig.device.fail_command("play");

    let err = rig.controller.play(episode("e1")).await.unwrap_err();

    assert!(err.is_load_failure());
    assert_eq!(rig.controller.playback_state().await, PlaybackState::Idle);
}

#[tokio::test]
async fn test_failure_emits_event() {
    let rig = TestRig::new();
    let mut events = rig.controller.events();
    rig.resolver.fail("m1");

    let _ = rig.controller.play(AudioItem::summary("s1", "m1")).await;

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert!(seen.contains(&PlayerEvent::StateChanged {
        old: PlaybackState::Idle,
        new: PlaybackState::Loading,
    }));
    assert!(seen.contains(&PlayerEvent::StateChanged {
        old: PlaybackState::Loading,
        new: PlaybackState::Idle,
    }));
    assert!(
        seen.iter()
            .any(|e| matches!(e, PlayerEvent::PlaybackFailed { item_id, .. } if item_id == "s1"))
    );
}

#[tokio::test(start_paused = true)]
async fn test_failed_play_restarts_previous_tracker() {
    let rig = playing_rig().await;
    rig.resolver.fail("m9");
    let _ = rig.controller.play(AudioItem::summary("s9", "m9")).await;

    rig.device.set_position(42.0);
    tokio::time::sleep(Duration::from_millis(600)).await;

    assert_eq!(rig.controller.position_ms().await, 42_000);
}

#[tokio::test(start_paused = true)]
async fn test_failed_commit_reloads_previous_source() {
    let rig = playing_rig().await;
    rig.device.fail_next("play");

    let err = rig.controller.play(episode("e2")).await.unwrap_err();

    assert!(err.is_load_failure());
    assert_eq!(rig.device.loaded_url().as_deref(), Some("https://x/e1.mp3"));
    assert!(rig.device.is_playing());
    assert!((rig.device.position() - 30.0).abs() < f64::EPSILON);

    let state = rig.controller.state().await;
    assert_eq!(state.playback, PlaybackState::Playing);
    assert_eq!(state.current_item.unwrap().id, "e1");

    rig.device.set_position(33.0);
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(rig.controller.position_ms().await, 33_000);
}

#[tokio::test(start_paused = true)]
async fn test_previous_source_that_will_not_play_is_left_paused() {
    let rig = playing_rig().await;
    rig.device.fail_command("play");

    assert!(rig.controller.play(episode("e2")).await.is_err());

    let state = rig.controller.state().await;
    assert_eq!(state.playback, PlaybackState::Paused);
    assert_eq!(state.current_item.unwrap().id, "e1");
    assert_eq!(state.position_ms, 30_000);
    assert_eq!(rig.device.loaded_url().as_deref(), Some("https://x/e1.mp3"));
    assert!(!rig.device.is_playing());

    // No tracker runs while paused
    rig.device.set_position(50.0);
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(rig.controller.position_ms().await, 30_000);
}

#[tokio::test]
async fn test_previous_source_that_will_not_load_goes_idle() {
    let rig = playing_rig().await;
    rig.device.fail_next("seek");
    rig.device.fail_load("https://x/e1.mp3");

    let result = rig
        .controller
        .play(episode("e2").with_resume_position_ms(5_000))
        .await;

    assert!(result.is_err());
    let state = rig.controller.state().await;
    assert!(state.is_idle());
    assert!(state.current_item.is_none());
}

#[tokio::test]
async fn test_failed_paused_commit_restores_without_playing() {
    let rig = playing_rig().await;
    rig.controller.pause().await.unwrap();
    rig.device.fail_next("set_rate");

    assert!(rig.controller.play(episode("e2")).await.is_err());

    assert_eq!(rig.controller.playback_state().await, PlaybackState::Paused);
    assert_eq!(rig.device.loaded_url().as_deref(), Some("https://x/e1.mp3"));
    assert!(!rig.device.is_playing());
    assert!((rig.device.position() - 30.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_superseded_load_is_undone_when_newer_play_fails() {
    let rig = playing_rig().await;
    let load_gate = rig.device.hold_load("https://x/a.mp3");
    let slow_a = tokio::spawn({
        let controller = Arc::clone(&rig.controller);
        async move { controller.play(episode("a")).await }
    });
    yield_until(|| rig.device.loads().len() == 2).await;

    rig.resolver.fail("mB");
    let resolve_gate = rig.resolver.hold("mB");
    let slow_b = tokio::spawn({
        let controller = Arc::clone(&rig.controller);
        async move { controller.play(AudioItem::summary("b", "mB")).await }
    });
    yield_until(|| !rig.resolver.calls().is_empty()).await;

    load_gate.notify_one();
    assert!(matches!(
        slow_a.await.unwrap(),
        Err(PlayerError::StaleRequestDiscarded { .. })
    ));
    resolve_gate.notify_one();
    assert!(slow_b.await.unwrap().is_err());

    assert_eq!(rig.controller.current_item().await.unwrap().id, "e1");
    assert!(rig.controller.is_playing().await);
    assert_eq!(rig.device.loaded_url().as_deref(), Some("https://x/e1.mp3"));
    assert!(rig.device.is_playing());
}

// --- supersession ---

#[tokio::test]
async fn test_slow_resolution_superseded_by_newer_play() {
    let rig = TestRig::new();
    let gate = rig.resolver.hold("mA");

    let slow = tokio::spawn({
        let controller = Arc::clone(&rig.controller);
        async move { controller.play(AudioItem::summary("a", "mA")).await }
    });
    yield_until(|| !rig.resolver.calls().is_empty()).await;
    assert!(rig.controller.is_loading().await);
    assert_eq!(rig.controller.current_item().await.unwrap().id, "a");

    rig.controller.play(episode("b")).await.unwrap();
    gate.notify_one();
    let result = slow.await.unwrap();

    assert!(matches!(
        result,
        Err(PlayerError::StaleRequestDiscarded { ref item_id }) if item_id == "a"
    ));
    assert!(!result.unwrap_err().is_user_visible());
    assert_eq!(rig.controller.current_item().await.unwrap().id, "b");
    assert_eq!(rig.controller.playback_state().await, PlaybackState::Playing);
    assert_eq!(rig.device.loads(), vec!["https://x/b.mp3"]);
    assert_eq!(rig.haptics.fired(), vec![Haptic::Success]);
}

#[tokio::test]
async fn test_slow_device_load_superseded() {
    let rig = TestRig::new();
    let gate = rig.device.hold_load("https://x/a.mp3");

    let slow = tokio::spawn({
        let controller = Arc::clone(&rig.controller);
        async move { controller.play(episode("a")).await }
    });
    yield_until(|| !rig.device.loads().is_empty()).await;

    rig.controller.play(episode("b")).await.unwrap();
    gate.notify_one();

    assert!(matches!(
        slow.await.unwrap(),
        Err(PlayerError::StaleRequestDiscarded { .. })
    ));
    assert_eq!(rig.controller.current_item().await.unwrap().id, "b");
    assert_eq!(rig.device.count(|c| *c == DeviceCall::Play), 1);
}

#[tokio::test]
async fn test_superseded_failure_is_silent() {
    let rig = TestRig::new();
    rig.resolver.fail("mA");
    let gate = rig.resolver.hold("mA");

    let slow = tokio::spawn({
        let controller = Arc::clone(&rig.controller);
        async move { controller.play(AudioItem::summary("a", "mA")).await }
    });
    yield_until(|| !rig.resolver.calls().is_empty()).await;

    rig.controller.play(episode("b")).await.unwrap();
    gate.notify_one();

    assert!(matches!(
        slow.await.unwrap(),
        Err(PlayerError::StaleRequestDiscarded { .. })
    ));
    assert_eq!(rig.controller.current_item().await.unwrap().id, "b");
    assert_eq!(rig.haptics.count(Haptic::Error), 0);
}

#[tokio::test]
async fn test_failure_after_supersession_restores_settled_state() {
    let rig = playing_rig().await;
    let gate = rig.resolver.hold("mA");
    rig.resolver.fail("mB");

    let slow = tokio::spawn({
        let controller = Arc::clone(&rig.controller);
        async move { controller.play(AudioItem::summary("a", "mA")).await }
    });
    yield_until(|| !rig.resolver.calls().is_empty()).await;

    assert!(rig.controller.play(AudioItem::summary("b", "mB")).await.is_err());

    let state = rig.controller.state().await;
    assert_eq!(state.playback, PlaybackState::Playing);
    assert_eq!(state.current_item.unwrap().id, "e1");

    gate.notify_one();
    assert!(slow.await.unwrap().is_err());
    assert_eq!(rig.controller.current_item().await.unwrap().id, "e1");
}

#[tokio::test(start_paused = true)]
async fn test_superseded_session_tracker_is_stopped() {
    let rig = playing_rig().await;
    rig.device.set_duration(Some(100.0));
    rig.controller.play(episode("e2")).await.unwrap();

    rig.device.set_position(7.0);
    tokio::time::sleep(Duration::from_millis(600)).await;

    let state = rig.controller.state().await;
    assert_eq!(state.current_item.unwrap().id, "e2");
    assert_eq!(state.position_ms, 7_000);
    assert_eq!(state.duration_ms, 100_000);
}

// --- pause / resume / stop ---

#[tokio::test]
async fn test_pause_and_resume() {
    let rig = playing_rig().await;
    rig.device.clear_calls();

    rig.controller.pause().await.unwrap();
    assert_eq!(rig.controller.playback_state().await, PlaybackState::Paused);
    assert!(!rig.device.is_playing());

    rig.controller.resume().await.unwrap();
    assert_eq!(rig.controller.playback_state().await, PlaybackState::Playing);
    assert_eq!(rig.device.calls(), vec![DeviceCall::Pause, DeviceCall::Play]);
}

#[tokio::test]
async fn test_pause_is_idempotent() {
    let rig = playing_rig().await;
    rig.controller.pause().await.unwrap();
    let before = rig.controller.state().await;

    rig.controller.pause().await.unwrap();

    assert_eq!(rig.device.count(|c| *c == DeviceCall::Pause), 1);
    assert_eq!(rig.controller.state().await, before);
}

#[tokio::test]
async fn test_resume_while_playing_is_noop() {
    let rig = playing_rig().await;
    rig.device.clear_calls();

    rig.controller.resume().await.unwrap();

    assert!(rig.device.calls().is_empty());
}

#[tokio::test]
async fn test_transport_noops_when_idle() {
    let rig = TestRig::new();

    rig.controller.pause().await.unwrap();
    rig.controller.resume().await.unwrap();
    rig.controller.toggle().await.unwrap();
    rig.controller.seek_to(10_000).await.unwrap();
    rig.controller.skip_forward().await.unwrap();
    rig.controller.skip_backward().await.unwrap();

    assert!(rig.device.calls().is_empty());
    assert!(rig.haptics.fired().is_empty());
    assert_eq!(rig.controller.state().await.position_ms, 0);
}

#[tokio::test]
async fn test_pause_failure_keeps_playing() {
    let rig = playing_rig().await;
    rig.device.fail_command("pause");

    let err = rig.controller.pause().await.unwrap_err();

    assert!(matches!(
        err,
        PlayerError::DeviceCommandFailed {
            operation: "pause",
            ..
        }
    ));
    assert!(rig.controller.is_playing().await);
}

#[tokio::test]
async fn test_pause_records_final_position() {
    let rig = playing_rig().await;
    rig.device.set_position(31.25);

    rig.controller.pause().await.unwrap();

    assert_eq!(rig.controller.position_ms().await, 31_250);
}

#[tokio::test(start_paused = true)]
async fn test_paused_player_stops_tracking() {
    let rig = playing_rig().await;
    rig.controller.pause().await.unwrap();

    rig.device.set_position(50.0);
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(rig.controller.position_ms().await, 30_000);

    rig.controller.resume().await.unwrap();
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(rig.controller.position_ms().await, 50_000);
}

#[tokio::test]
async fn test_toggle() {
    let rig = playing_rig().await;

    rig.controller.toggle().await.unwrap();
    assert_eq!(rig.controller.playback_state().await, PlaybackState::Paused);

    rig.controller.toggle().await.unwrap();
    assert_eq!(rig.controller.playback_state().await, PlaybackState::Playing);
}

#[tokio::test]
async fn test_stop_returns_to_idle() {
    let rig = playing_rig().await;

    rig.controller.stop().await;

    let state = rig.controller.state().await;
    assert!(state.is_idle());
    assert!(state.current_item.is_none());
    assert_eq!((state.position_ms, state.duration_ms), (0, 0));
    assert!(!rig.device.is_playing());
}

#[tokio::test]
async fn test_stop_supersedes_pending_play() {
    let rig = TestRig::new();
    let gate = rig.resolver.hold("mA");

    let slow = tokio::spawn({
        let controller = Arc::clone(&rig.controller);
        async move { controller.play(AudioItem::summary("a", "mA")).await }
    });
    yield_until(|| !rig.resolver.calls().is_empty()).await;

    rig.controller.stop().await;
    gate.notify_one();

    assert!(matches!(
        slow.await.unwrap(),
        Err(PlayerError::StaleRequestDiscarded { .. })
    ));
    assert!(rig.controller.state().await.is_idle());
    assert!(rig.device.loads().is_empty());
}

// --- seek / skip ---

#[tokio::test]
async fn test_seek_clamps_to_duration() {
    let rig = playing_rig().await;

    rig.controller.seek_to(700_000).await.unwrap();
    assert_eq!(rig.controller.position_ms().await, 600_000);
    assert_eq!(rig.device.count(|c| *c == DeviceCall::SeekTo(600.0)), 1);

    rig.controller.seek_to(1_234).await.unwrap();
    assert_eq!(rig.controller.position_ms().await, 1_234);
}

#[tokio::test]
async fn test_seek_while_paused_stays_paused() {
    let rig = playing_rig().await;
    rig.controller.pause().await.unwrap();

    rig.controller.seek_to(90_000).await.unwrap();

    assert_eq!(rig.controller.playback_state().await, PlaybackState::Paused);
    assert_eq!(rig.controller.position_ms().await, 90_000);
}

#[tokio::test]
async fn test_seek_failure_leaves_position() {
    let rig = playing_rig().await;
    rig.device.fail_command("seek");

    assert!(rig.controller.seek_to(90_000).await.is_err());
    assert_eq!(rig.controller.position_ms().await, 30_000);
}

#[tokio::test]
async fn test_skip_forward_and_backward() {
    let rig = playing_rig().await;

    rig.controller.skip_forward().await.unwrap();
    assert_eq!(rig.controller.position_ms().await, 45_000);

    rig.controller.skip_backward().await.unwrap();
    rig.controller.skip_backward().await.unwrap();
    assert_eq!(rig.controller.position_ms().await, 15_000);
    assert_eq!(rig.haptics.count(Haptic::LightImpact), 3);
}

#[tokio::test]
async fn test_skips_stay_in_bounds() {
    let rig = playing_rig().await;

    rig.controller.seek_to(595_000).await.unwrap();
    rig.controller.skip_forward().await.unwrap();
    assert_eq!(rig.controller.position_ms().await, 600_000);

    rig.controller.seek_to(5_000).await.unwrap();
    rig.controller.skip_backward().await.unwrap();
    assert_eq!(rig.controller.position_ms().await, 0);
}

#[tokio::test]
async fn test_rejected_skip_fires_no_haptic() {
    let rig = playing_rig().await;
    rig.device.fail_command("seek");

    assert!(rig.controller.skip_forward().await.is_err());

    assert_eq!(rig.haptics.count(Haptic::LightImpact), 0);
    assert_eq!(rig.controller.position_ms().await, 30_000);
}

// --- speed ---

#[tokio::test]
async fn test_every_allowed_speed_applies() {
    let rig = TestRig::new();

    for speed in PlaybackSpeed::all() {
        rig.controller.set_speed(speed.as_f32()).await.unwrap();
        assert_eq!(rig.controller.speed().await, speed);
        assert!((rig.device.rate() - speed.as_f32()).abs() < f32::EPSILON);
    }
    assert_eq!(
        rig.haptics.count(Haptic::Selection),
        PlaybackSpeed::VALUES.len()
    );
}

#[tokio::test]
async fn test_invalid_speed_rejected() {
    let rig = playing_rig().await;
    rig.device.clear_calls();
    let before = rig.controller.state().await;

    let err = rig.controller.set_speed(1.3).await.unwrap_err();

    assert!(matches!(err, PlayerError::InvalidSpeed { .. }));
    assert_eq!(rig.controller.state().await, before);
    assert!(rig.device.calls().is_empty());
    assert_eq!(rig.haptics.count(Haptic::Selection), 0);
}

#[tokio::test]
async fn test_speed_rejected_by_device() {
    let rig = TestRig::new();
    rig.device.fail_command("set_rate");

    assert!(rig.controller.set_speed(1.5).await.is_err());
    assert_eq!(rig.controller.speed().await, PlaybackSpeed::NORMAL);
}

#[tokio::test]
async fn test_cycle_speed() {
    let rig = TestRig::new();

    rig.controller.cycle_speed().await.unwrap();

    assert_eq!(rig.controller.speed().await, PlaybackSpeed::NORMAL.next());
}

#[tokio::test]
async fn test_speed_reapplied_on_load() {
    let rig = TestRig::new();
    rig.controller.set_speed(1.5).await.unwrap();
    rig.device.clear_calls();

    rig.controller.play(episode("e1")).await.unwrap();

    assert_eq!(rig.device.calls()[1], DeviceCall::SetRate(1.5));
}

// --- queue ---

#[tokio::test]
async fn test_play_next_promotes_head() {
    let rig = TestRig::new();
    let x = episode("x");
    let y = episode("y");

    assert!(rig.controller.add_to_queue(x.clone()).await);
    assert!(rig.controller.add_to_queue(y.clone()).await);
    assert!(rig.controller.play_next().await.unwrap());

    assert_eq!(rig.controller.current_item().await, Some(x));
    assert_eq!(rig.controller.queue().await, vec![y]);
    assert_eq!(rig.device.loads(), vec!["https://x/x.mp3"]);
}

#[tokio::test]
async fn test_play_next_on_empty_queue() {
    let rig = playing_rig().await;
    let before = rig.controller.state().await;
    rig.device.clear_calls();

    assert!(!rig.controller.play_next().await.unwrap());

    assert_eq!(rig.controller.state().await, before);
    assert!(rig.device.calls().is_empty());
}

#[tokio::test]
async fn test_direct_play_leaves_queue_alone() {
    let rig = TestRig::new();
    rig.controller.add_to_queue(episode("x")).await;

    rig.controller.play(episode("y")).await.unwrap();

    assert_eq!(rig.controller.queue().await, vec![episode("x")]);
}

#[tokio::test]
async fn test_queue_rejects_current_and_duplicates() {
    let rig = playing_rig().await;

    assert!(!rig.controller.add_to_queue(episode("e1")).await);
    assert!(rig.controller.add_to_queue(episode("x")).await);
    assert!(!rig.controller.add_to_queue(episode("x")).await);
    assert_eq!(rig.controller.queue().await.len(), 1);
}

#[tokio::test]
async fn test_remove_and_clear_queue() {
    let rig = TestRig::new();
    let mut events = rig.controller.events();
    for id in ["a", "b", "c"] {
        rig.controller.add_to_queue(episode(id)).await;
    }

    assert_eq!(
        rig.controller.remove_from_queue("b").await.map(|i| i.id),
        Some("b".to_string())
    );
    assert!(rig.controller.remove_from_queue("b").await.is_none());
    assert_eq!(rig.controller.queue().await.len(), 2);

    rig.controller.clear_queue().await;
    assert!(rig.controller.queue().await.is_empty());

    let lengths: Vec<usize> = std::iter::from_fn(|| events.try_recv().ok())
        .filter_map(|e| match e {
            PlayerEvent::QueueUpdated { length } => Some(length),
            _ => None,
        })
        .collect();
    assert_eq!(lengths, vec![1, 2, 3, 2, 0]);
}

#[tokio::test]
async fn test_failed_play_next_consumes_head() {
    let rig = TestRig::new();
    rig.device.fail_load("https://x/x.mp3");
    rig.controller.add_to_queue(episode("x")).await;
    rig.controller.add_to_queue(episode("y")).await;

    assert!(rig.controller.play_next().await.is_err());

    assert!(rig.controller.state().await.is_idle());
    assert_eq!(rig.controller.queue().await, vec![episode("y")]);
}

// --- observation ---

#[tokio::test]
async fn test_watch_sees_loading_then_playing() {
    let rig = TestRig::new();
    let gate = rig.resolver.hold("m1");
    let mut rx = rig.controller.subscribe();

    let task = tokio::spawn({
        let controller = Arc::clone(&rig.controller);
        async move { controller.play(AudioItem::summary("s1", "m1")).await }
    });

    rx.changed().await.unwrap();
    assert!(rx.borrow_and_update().is_loading());

    gate.notify_one();
    task.await.unwrap().unwrap();
    assert!(rx.borrow().is_playing());
}

proptest! {
    #[test]
    fn test_seek_always_clamped(target in any::<u64>(), duration_secs in 1u32..10_000) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let rig = TestRig::new();
            rig.device.set_duration(Some(f64::from(duration_secs)));
            rig.controller.play(episode("e1")).await.unwrap();

            rig.controller.seek_to(target).await.unwrap();

            let duration_ms = u64::from(duration_secs) * 1000;
            assert_eq!(rig.controller.position_ms().await, target.min(duration_ms));
        });
    }
}
