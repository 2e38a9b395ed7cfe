mod common;

use std::sync::Arc;
use std::time::Duration;

use common::mock_mirror::{Behavior, MockMirror};
use veil_core::config::Config;
use veil_core::error::{LaunchError, SearchError};
use veil_core::prefs::{PrefStore, XFRAME_KEY};
use veil_core::render::{FrameMode, PlayerState, SearchResults, PLACEHOLDER_TITLE};
use veil_core::session::Session;
use veil_core::view::ViewId;

async fn connected_session(behavior: Behavior) -> (Session, MockMirror) {
    let mirror = MockMirror::spawn(behavior).await;
    let mut config = Config::default();
    config.discovery.instances = vec![mirror.url.clone()];
    config.discovery.probe_timeout_ms = 1000;
    let session = Session::new(&config, PrefStore::in_memory()).unwrap();
    assert!(session.discover().await.selected.is_some());
    (session, mirror)
}

#[tokio::test]
async fn launch_with_backend_uses_mirror_embed_and_title() {
    let (session, mirror) = connected_session(Behavior::healthy()).await;

    let id = session
        .launch_video("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
        .await
        .unwrap();

    let state = session.snapshot().await;
    let player = state.players.iter().find(|p| p.id == id).unwrap();
    assert_eq!(player.title, "Mock Title");
    assert_eq!(player.state, PlayerState::Ready);
    assert_eq!(
        player.embed_url,
        format!("{}/embed/dQw4w9WgXcQ?autoplay=1", mirror.url)
    );
    assert_eq!(mirror.meta_hits(), 1);
}

#[tokio::test]
async fn metadata_failure_keeps_placeholder() {
    let (session, mirror) = connected_session(Behavior::healthy().without_metadata()).await;

    session.launch_video("https://youtu.be/dQw4w9WgXcQ").await.unwrap();

    let state = session.snapshot().await;
    let player = &state.players[0];
    assert_eq!(player.title, PLACEHOLDER_TITLE);
    assert_eq!(player.state, PlayerState::Ready);
    assert!(player.embed_url.starts_with(&mirror.url));
    // Metadata failures are never surfaced to the user.
    assert!(state.notifications.is_empty());
}

#[tokio::test]
async fn search_without_backend_sends_nothing() {
    let mirror = MockMirror::spawn(Behavior::broken()).await;
    let mut config = Config::default();
    config.discovery.instances = vec![mirror.url.clone()];
    let session = Session::new(&config, PrefStore::in_memory()).unwrap();
    assert_eq!(session.discover().await.selected, None);

    let err = session.search("3").await.unwrap_err();
    assert!(matches!(err, SearchError::NoBackend));
    assert_eq!(mirror.search_hits(), 0);

    let state = session.snapshot().await;
    assert_eq!(state.results, SearchResults::Idle);
    assert_eq!(
        state.notifications.iter().last().unwrap().message,
        "No Invidious Instance Connected"
    );
}

#[tokio::test]
async fn each_search_replaces_the_result_set() {
    let (session, _mirror) = connected_session(Behavior::healthy()).await;

    assert_eq!(session.search("5").await.unwrap(), 5);
    assert_eq!(session.snapshot().await.results.items().len(), 5);

    assert_eq!(session.search("2").await.unwrap(), 2);
    let state = session.snapshot().await;
    let items = state.results.items();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].video_id, "vid00000000");
    assert_eq!(items[0].author, "Author 0");
    assert_eq!(items[0].thumbnail, "http://thumbs/0/medium.jpg");
    assert_eq!(items[1].thumbnail, "");
}

#[tokio::test]
async fn failed_search_drops_stale_results() {
    let (session, _mirror) = connected_session(Behavior::healthy()).await;
    session.search("4").await.unwrap();

    let err = session.search("bad").await.unwrap_err();
    assert!(matches!(err, SearchError::Request(_)));
    assert_eq!(session.snapshot().await.results, SearchResults::Failed);
}

#[tokio::test]
async fn superseded_search_response_is_discarded() {
    let (session, _mirror) = connected_session(Behavior::healthy()).await;
    let session = Arc::new(session);

    let slow = {
        let session = session.clone();
        tokio::spawn(async move { session.search("6:500").await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(session.search("1").await.unwrap(), 1);

    let late = slow.await.unwrap();
    assert!(matches!(late, Err(SearchError::Superseded)));
    assert_eq!(session.snapshot().await.results.items().len(), 1);
}

#[tokio::test]
async fn opening_a_result_switches_home_and_launches() {
    let (session, _mirror) = connected_session(Behavior::healthy()).await;
    session.switch_view(ViewId::Search).await;
    session.search("3").await.unwrap();

    session.open_result(1).await.unwrap();

    let state = session.snapshot().await;
    assert_eq!(state.view.current(), ViewId::Home);
    assert_eq!(state.players[0].video_id.as_str(), "vid00000001");
    assert!(matches!(
        session.open_result(9).await,
        Err(LaunchError::NoSuchResult(9))
    ));
}

#[tokio::test]
async fn results_open_by_mirror_identifier_without_link_parsing() {
    let (session, mirror) = connected_session(Behavior::healthy()).await;
    session.switch_view(ViewId::Search).await;
    assert_eq!(session.search("short").await.unwrap(), 1);

    let id = session.open_result(0).await.unwrap();

    let state = session.snapshot().await;
    assert_eq!(state.view.current(), ViewId::Home);
    assert_eq!(state.players.len(), 1);
    assert_eq!(state.players[0].id, id);
    assert_eq!(state.players[0].video_id.as_str(), "abc");
    assert_eq!(
        state.players[0].embed_url,
        format!("{}/embed/abc?autoplay=1", mirror.url)
    );
    assert!(state.notifications.iter().all(|n| n.message != "Invalid URL"));
}

#[tokio::test]
async fn player_is_usable_before_metadata_then_gets_its_title() {
    let (session, _mirror) = connected_session(Behavior::healthy().slow_metadata(400)).await;
    let session = Arc::new(session);

    let launching = {
        let session = session.clone();
        tokio::spawn(async move { session.launch_video("dQw4w9WgXcQ").await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let state = session.snapshot().await;
    assert_eq!(state.players.len(), 1);
    assert_eq!(state.players[0].state, PlayerState::MetadataPending);
    assert_eq!(state.players[0].title, PLACEHOLDER_TITLE);

    let id = launching.await.unwrap().unwrap();
    let state = session.snapshot().await;
    assert_eq!(state.players.len(), 1);
    assert_eq!(state.players[0].id, id);
    assert_eq!(state.players[0].state, PlayerState::Ready);
    assert_eq!(state.players[0].title, "Mock Title");
}

#[tokio::test]
async fn removed_player_stays_removed_when_metadata_arrives() {
    let (session, mirror) = connected_session(Behavior::healthy().slow_metadata(400)).await;
    let session = Arc::new(session);

    let launching = {
        let session = session.clone();
        tokio::spawn(async move { session.launch_video("dQw4w9WgXcQ").await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let id = session.snapshot().await.players[0].id;
    assert!(session.remove_player(id).await);

    assert_eq!(launching.await.unwrap().unwrap(), id);
    assert_eq!(mirror.meta_hits(), 1);
    assert!(session.snapshot().await.players.is_empty());
}

#[tokio::test]
async fn concurrent_toggles_leave_file_and_memory_in_agreement() {
    let dir = tempfile::tempdir().unwrap();
    let prefs_path = dir.path().join("prefs.json");
    let mut config = Config::default();
    config.discovery.instances = Vec::new();
    let session = Arc::new(Session::new(&config, PrefStore::load(&prefs_path)).unwrap());

    let toggles: Vec<_> = (0..7)
        .map(|_| {
            let session = session.clone();
            tokio::spawn(async move { session.toggle_xframe().await })
        })
        .collect();
    for t in toggles {
        t.await.unwrap();
    }

    // Odd number of flips.
    assert!(session.xframe_enabled().await);
    assert!(PrefStore::load(&prefs_path).get_flag(XFRAME_KEY));
}

#[tokio::test]
async fn xframe_toggle_persists_and_reads_back_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let prefs_path = dir.path().join("prefs.json");
    let mut config = Config::default();
    config.discovery.instances = Vec::new();
    let session = Session::new(&config, PrefStore::load(&prefs_path)).unwrap();

    session.launch_video("dQw4w9WgXcQ").await.unwrap();
    assert!(!session.xframe_enabled().await);

    assert!(session.toggle_xframe().await);
    assert!(session.xframe_enabled().await);
    assert!(PrefStore::load(&prefs_path).get_flag(XFRAME_KEY));

    // Nothing else was reset.
    let state = session.snapshot().await;
    assert_eq!(state.players.len(), 1);
    assert_eq!(state.players[0].frame, FrameMode::Plain);
    assert_eq!(
        state.notifications.iter().last().unwrap().message,
        "X-Frame Proxy Enabled"
    );

    session.launch_video("aaaaaaaaaaa").await.unwrap();
    assert_eq!(session.snapshot().await.players[0].frame, FrameMode::XFrameProxy);

    assert!(!session.toggle_xframe().await);
    assert!(!PrefStore::load(&prefs_path).get_flag(XFRAME_KEY));
}

#[tokio::test]
async fn preferences_are_read_at_startup() {
    let dir = tempfile::tempdir().unwrap();
    let prefs_path = dir.path().join("prefs.json");
    std::fs::write(&prefs_path, r#"{"xframe":"true","optimized":"true"}"#).unwrap();

    let session = Session::new(&Config::default(), PrefStore::load(&prefs_path)).unwrap();
    assert!(session.xframe_enabled().await);
    assert!(session.optimized_mode().await);
    assert!(!session.toggle_optimized().await);
    assert!(!session.optimized_mode().await);
}
