//! Persistence tests for settings and video selections across process
//! restarts, using a file-backed store in a temporary directory.

use tempfile::tempdir;

use vidqa::models::{Video, VideoId, WorkspaceId};
use vidqa::settings::{AskSettings, GeneratorType, RetrieverType, VideoSelection};
use vidqa::store::Store;

fn video(id: &str) -> Video {
    Video {
        id: VideoId::new(id),
        workspace_id: WorkspaceId::new("ws-1"),
        filename: format!("{id}.mp4"),
        file_path: format!("data/videos/ws-1/{id}.mp4"),
        file_size: 1,
        duration: 60.0,
        processing_status: "completed".to_string(),
        created_at: time::OffsetDateTime::now_utc(),
        processed_at: None,
    }
}

#[test]
fn settings_survive_a_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.db");

    {
        let store = Store::open(&path).unwrap();
        let mut settings = AskSettings::default();
        settings.generator_type = GeneratorType::Qwen;
        settings.retriever_type = RetrieverType::Hybrid;
        settings.history_count = 8;
        settings.save(&store).unwrap();
    }

    let store = Store::open(&path).unwrap();
    let reloaded = AskSettings::load(&store).unwrap();
    assert_eq!(reloaded.generator_type, GeneratorType::Qwen);
    assert_eq!(reloaded.retriever_type, RetrieverType::Hybrid);
    assert_eq!(reloaded.history_count, 8);
    // Untouched settings keep their defaults
    assert!(reloaded.use_history);
}

#[test]
fn fresh_store_behaves_like_defaults() {
    let dir = tempdir().unwrap();
    let store = Store::open(dir.path().join("state.db")).unwrap();

    assert_eq!(AskSettings::load(&store).unwrap(), AskSettings::default());
    assert_eq!(
        VideoSelection::load(&store, &WorkspaceId::new("ws-1")).unwrap(),
        VideoSelection::All
    );
}

#[test]
fn explicit_empty_selection_survives_a_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.db");
    let ws = WorkspaceId::new("ws-1");

    {
        let store = Store::open(&path).unwrap();
        let mut selection = VideoSelection::All;
        selection.select_none();
        selection.save(&store, &ws).unwrap();
    }

    let store = Store::open(&path).unwrap();
    let reloaded = VideoSelection::load(&store, &ws).unwrap();

    // Deselecting everything is not the same as never customizing
    assert_eq!(reloaded, VideoSelection::Explicit(Vec::new()));
    assert!(reloaded.resolve(&[video("vid-1")]).is_empty());
}

#[test]
fn reverting_to_all_tracks_videos_added_later() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.db");
    let ws = WorkspaceId::new("ws-1");

    {
        let store = Store::open(&path).unwrap();
        let mut selection = VideoSelection::Explicit(vec![VideoId::new("vid-1")]);
        selection.select_all();
        selection.save(&store, &ws).unwrap();
    }

    let store = Store::open(&path).unwrap();
    let reloaded = VideoSelection::load(&store, &ws).unwrap();
    assert_eq!(reloaded, VideoSelection::All);

    // A video that did not exist when the selection was saved is in scope
    let videos = [video("vid-1"), video("vid-new")];
    assert_eq!(
        reloaded.resolve(&videos),
        vec![VideoId::new("vid-1"), VideoId::new("vid-new")]
    );
}

#[test]
fn selections_for_different_workspaces_do_not_collide() {
    let dir = tempdir().unwrap();
    let store = Store::open(dir.path().join("state.db")).unwrap();

    VideoSelection::Explicit(vec![VideoId::new("vid-1")])
        .save(&store, &WorkspaceId::new("ws-1"))
        .unwrap();

    assert_eq!(
        VideoSelection::load(&store, &WorkspaceId::new("ws-2")).unwrap(),
        VideoSelection::All
    );
}
