//! Integration tests for persistence across restarts.
//!
//! Sessions written by one server must be playable by the next one started
//! over the same data directory.

mod common;

use clicker_core::{EngineConfig, GameStore, SessionId};
use clicker_server::{AppState, ServerConfig};
use common::TestServer;
use reqwest::StatusCode;
use serde_json::{json, Value};

// ===========================================================================
// Test 1: Progress survives a server restart
// ===========================================================================

#[tokio::test]
async fn test_session_survives_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let client = reqwest::Client::new();

    // Phase 1: play a little, then stop the server
    let id = {
        let store = GameStore::with_data_dir(dir.path()).expect("store1");
        let server = TestServer::start_with(store, EngineConfig::default()).await;

        let started: Value = client
            .post(server.url("/api/game/start"))
            .send()
            .await
            .expect("start")
            .json()
            .await
            .expect("start body");
        let id = started["game_state"]["id"].as_str().expect("id").to_string();

        client
            .post(server.url(&format!("/api/game/{id}/click")))
            .json(&json!({ "clicks": 15 }))
            .send()
            .await
            .expect("click");
        let response = client
            .post(server.url(&format!("/api/game/{id}/upgrade")))
            .json(&json!({ "upgrade_id": "click1" }))
            .send()
            .await
            .expect("upgrade");
        assert_eq!(response.status(), StatusCode::OK);

        server.shutdown().await;
        id
    };

    // Phase 2: new store over the same directory
    let store = GameStore::with_data_dir(dir.path()).expect("store2");
    let loaded = store.load_all_from_disk().expect("load all");
    assert_eq!(loaded, vec![SessionId::from(id.as_str())]);

    let server = TestServer::start_with(store, EngineConfig::default()).await;
    let body: Value = client
        .get(server.url(&format!("/api/game/{id}")))
        .send()
        .await
        .expect("get")
        .json()
        .await
        .expect("get body");

    assert_eq!(body["game_state"]["total_clicks"], 15);
    assert_eq!(body["game_state"]["points"], 5.0);
    assert_eq!(body["upgrades"][0]["level"], 1);
    assert_eq!(body["achievements"][0]["unlocked"], true);

    // And the session keeps playing
    let body: Value = client
        .post(server.url(&format!("/api/game/{id}/click")))
        .send()
        .await
        .expect("click")
        .json()
        .await
        .expect("click body");
    assert_eq!(body["game_state"]["points"], 7.0);

    server.shutdown().await;
}

// ===========================================================================
// Test 2: Rejected actions are not written
// ===========================================================================

#[test]
fn test_rejected_action_does_not_touch_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = ServerConfig {
        data_dir: Some(dir.path().to_path_buf()),
        ..ServerConfig::default()
    };
    let state = AppState::from_config(&config).expect("state");
    let id = state.engine.start().expect("start").session_id().clone();
    let path = dir.path().join(format!("{id}.json"));
    let before = std::fs::read_to_string(&path).expect("saved file");

    assert!(state.engine.purchase(&id, "click1").is_err());

    let after = std::fs::read_to_string(&path).expect("saved file");
    assert_eq!(before, after);
}

// ===========================================================================
// Test 3: Corrupt files are skipped on startup
// ===========================================================================

#[test]
fn test_corrupt_session_file_is_skipped() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = ServerConfig {
        data_dir: Some(dir.path().to_path_buf()),
        ..ServerConfig::default()
    };

    let id = {
        let state = AppState::from_config(&config).expect("state");
        state.engine.start().expect("start").session_id().clone()
    };
    std::fs::write(dir.path().join("broken.json"), "{ not a game").expect("write");

    let state = AppState::from_config(&config).expect("state");
    assert!(state.engine.load(&id).is_ok());
    assert_eq!(state.engine.store().len(), 1);
}
