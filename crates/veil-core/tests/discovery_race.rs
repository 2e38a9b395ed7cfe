mod common;

use std::sync::Arc;
use std::time::Duration;

use common::mock_mirror::{dead_url, Behavior, MockMirror};
use veil_core::config::Config;
use veil_core::discovery::{BackendChoice, StatusKind};
use veil_core::prefs::PrefStore;
use veil_core::registry::Endpoint;
use veil_core::session::Session;

fn session_for(urls: Vec<String>, probe_timeout_ms: u64) -> Session {
    let mut config = Config::default();
    config.discovery.instances = urls;
    config.discovery.probe_timeout_ms = probe_timeout_ms;
    Session::new(&config, PrefStore::in_memory()).expect("session should build")
}

fn endpoint(url: &str) -> Endpoint {
    Endpoint::parse(url).unwrap()
}

#[tokio::test]
async fn fastest_healthy_mirror_wins() {
    let a = MockMirror::spawn(Behavior::broken()).await;
    let b = MockMirror::spawn(Behavior::delayed(500)).await;
    let c = MockMirror::spawn(Behavior::delayed(2000)).await;
    let session = session_for(vec![a.url.clone(), b.url.clone(), c.url.clone()], 3000);

    let discovery = session.discover().await;

    assert_eq!(discovery.selected, Some(endpoint(&b.url)));
    assert_eq!(discovery.status.kind, StatusKind::Connected);
    assert_eq!(discovery.status.text, "Connected: 127.0.0.1");

    let state = session.snapshot().await;
    assert_eq!(state.active_backend, Some(endpoint(&b.url)));
    assert_eq!(state.status, discovery.status);
    let selected: Vec<_> = state.backends.iter().filter(|o| o.selected).collect();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].endpoint, endpoint(&b.url));
}

#[tokio::test]
async fn winner_is_always_one_of_the_healthy_mirrors() {
    let healthy_1 = MockMirror::spawn(Behavior::delayed(20)).await;
    let healthy_2 = MockMirror::spawn(Behavior::delayed(20)).await;
    let broken = MockMirror::spawn(Behavior::broken()).await;
    let session = session_for(
        vec![broken.url.clone(), dead_url(), healthy_1.url.clone(), healthy_2.url.clone()],
        1000,
    );

    let selected = session.discover().await.selected.expect("a mirror should win");
    assert!(selected == endpoint(&healthy_1.url) || selected == endpoint(&healthy_2.url));
}

#[tokio::test]
async fn all_timeouts_fall_back_to_direct_embeds() {
    let a = MockMirror::spawn(Behavior::delayed(5000)).await;
    let b = MockMirror::spawn(Behavior::delayed(5000)).await;
    let session = session_for(vec![a.url.clone(), b.url.clone()], 200);

    let started = std::time::Instant::now();
    let discovery = session.discover().await;
    assert!(started.elapsed() < Duration::from_secs(3));

    assert_eq!(discovery.selected, None);
    assert_eq!(discovery.status.kind, StatusKind::Fallback);
    assert_eq!(discovery.status.text, "Using Fallback (Youtube-NoCookie)");
    assert_eq!(session.active_backend().await, None);

    session.launch_video("dQw4w9WgXcQ").await.unwrap();
    let player = &session.snapshot().await.players[0];
    assert!(player.embed_url.contains("dQw4w9WgXcQ"));
    assert!(player.embed_url.starts_with("https://www.youtube-nocookie.com/embed/"));
    assert_eq!(a.meta_hits() + b.meta_hits(), 0);
}

#[tokio::test]
async fn errors_and_refusals_also_fall_back() {
    let broken = MockMirror::spawn(Behavior::broken()).await;
    let session = session_for(vec![broken.url.clone(), dead_url()], 1000);

    let discovery = session.discover().await;
    assert_eq!(discovery.selected, None);

    // The selector stays populated so a manual override is still possible.
    let state = session.snapshot().await;
    assert_eq!(state.backends.len(), 2);
    assert!(state.backends.iter().all(|o| !o.selected));
}

#[tokio::test]
async fn empty_registry_is_fallback() {
    let session = session_for(Vec::new(), 1000);
    assert_eq!(session.discover().await.selected, None);
}

#[tokio::test]
async fn rediscovery_replaces_manual_selection() {
    let slow = MockMirror::spawn(Behavior::broken()).await;
    let good = MockMirror::spawn(Behavior::healthy()).await;
    let session = session_for(vec![slow.url.clone(), good.url.clone()], 1000);

    session
        .select_backend(BackendChoice::Manual(endpoint(&slow.url)))
        .await
        .unwrap();
    assert_eq!(session.snapshot().await.status.kind, StatusKind::Manual);

    let discovery = session.select_backend_named("auto").await.unwrap();
    assert_eq!(discovery.selected, Some(endpoint(&good.url)));

    let state = session.snapshot().await;
    assert_eq!(state.active_backend, Some(endpoint(&good.url)));
    assert_eq!(state.status.kind, StatusKind::Connected);
    assert_eq!(state.backends.iter().filter(|o| o.selected).count(), 1);
}

#[tokio::test]
async fn manual_selection_during_discovery_is_not_overwritten() {
    let slow = MockMirror::spawn(Behavior::delayed(400)).await;
    let other = MockMirror::spawn(Behavior::broken()).await;
    let session = Arc::new(session_for(vec![slow.url.clone(), other.url.clone()], 2000));

    let racing = {
        let session = session.clone();
        tokio::spawn(async move { session.discover().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    session
        .select_backend(BackendChoice::Manual(endpoint(&other.url)))
        .await
        .unwrap();

    let discovery = racing.await.unwrap();
    assert_eq!(discovery.selected, Some(endpoint(&slow.url)));

    // The late discovery result was dropped; the manual choice stands.
    let state = session.snapshot().await;
    assert_eq!(state.active_backend, Some(endpoint(&other.url)));
    assert_eq!(state.status.kind, StatusKind::Manual);
}
