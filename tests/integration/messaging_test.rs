//! Integration tests for direct and broadcast relay and renames.

mod helpers;

use std::time::Duration;

use serde_json::json;

use helpers::{TestApp, TestClient};

/// Host plus two members in one session, with all join notifications
/// consumed.
async fn three_member_session(app: &TestApp) -> (TestClient, TestClient, TestClient) {
    let mut host = app.client().await;
    let mut b = app.client().await;
    let mut c = app.client().await;
    let session_id =
        helpers::create_session(&mut host, json!({ "maxNumberOfClients": 3 })).await;

    b.send(json!({ "type": "joinSession", "sessionId": session_id }))
        .await;
    b.expect_event("joinSessionSuccess").await;
    host.expect_event("clientJoinedSession").await;

    c.send(json!({ "type": "joinSession", "sessionId": session_id }))
        .await;
    c.expect_event("joinSessionSuccess").await;
    host.expect_event("clientJoinedSession").await;
    b.expect_event("clientJoinedSession").await;

    (host, b, c)
}

#[tokio::test]
async fn test_direct_message_reaches_destination_only() {
    let app = TestApp::new().await;
    let (mut host, mut b, mut c) = three_member_session(&app).await;

    host.send(json!({
        "type": "messageToClient",
        "destinationId": b.id,
        "move": "e2e4",
        "turn": 7
    }))
    .await;

    let event = b.expect_event("messageToClient").await;
    assert_eq!(event["sourceId"].as_u64(), Some(host.id));
    assert_eq!(event["move"], "e2e4");
    assert_eq!(event["turn"], 7);

    c.expect_silence(Duration::from_millis(200)).await;
    host.expect_silence(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn test_direct_message_to_non_member_is_dropped() {
    let app = TestApp::new().await;
    let mut host = app.client().await;
    let mut outsider = app.client().await;
    helpers::create_session(&mut host, json!({})).await;

    host.send(json!({
        "type": "messageToClient",
        "destinationId": outsider.id,
        "n": 1
    }))
    .await;
    outsider.expect_silence(Duration::from_millis(200)).await;
}

#[tokio::test]
async fn test_broadcast_excludes_sender_by_default() {
    let app = TestApp::new().await;
    let (mut host, mut b, mut c) = three_member_session(&app).await;

    b.send(json!({ "type": "messageToAllClients", "state": "ready" }))
        .await;

    for peer in [&mut host, &mut c] {
        let event = peer.expect_event("messageToAllClients").await;
        assert_eq!(event["sourceId"].as_u64(), Some(b.id));
        assert_eq!(event["state"], "ready");
    }
    b.expect_silence(Duration::from_millis(200)).await;
}

#[tokio::test]
async fn test_broadcast_send_to_self() {
    let app = TestApp::new().await;
    let (mut host, mut b, mut c) = three_member_session(&app).await;

    b.send(json!({
        "type": "messageToAllClients",
        "sendToSelf": true,
        "n": 1
    }))
    .await;

    for peer in [&mut host, &mut b, &mut c] {
        let event = peer.expect_event("messageToAllClients").await;
        assert_eq!(event["n"], 1);
    }
}

#[tokio::test]
async fn test_broadcast_without_session_is_dropped() {
    let app = TestApp::new().await;
    let mut lonely = app.client().await;
    let mut other = app.client().await;

    lonely
        .send(json!({ "type": "messageToAllClients", "n": 1 }))
        .await;
    other.expect_silence(Duration::from_millis(200)).await;
    lonely.expect_silence(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn test_rename_notifies_other_members() {
    let app = TestApp::new().await;
    let (mut host, mut b, mut c) = three_member_session(&app).await;

    host.send(json!({ "type": "name", "name": "Magnus" })).await;

    for peer in [&mut b, &mut c] {
        let event = peer.expect_event("clientChangedName").await;
        assert_eq!(event["id"].as_u64(), Some(host.id));
        assert_eq!(event["name"], "Magnus");
    }
    host.expect_silence(Duration::from_millis(200)).await;
}

#[tokio::test]
async fn test_rename_outside_session_is_silent() {
    let app = TestApp::new().await;
    let mut lonely = app.client().await;
    lonely
        .send(json!({ "type": "name", "name": "Drifter" }))
        .await;
    lonely.expect_silence(Duration::from_millis(200)).await;
}

#[tokio::test]
async fn test_malformed_frames_are_ignored() {
    let app = TestApp::new().await;
    let mut client = app.client().await;

    client.send(json!({ "type": "noSuchEvent" })).await;
    client.send(json!({ "type": "joinSession" })).await;
    client
        .send(json!({ "type": "getMappedObject", "index": "five" }))
        .await;
    client.expect_silence(Duration::from_millis(200)).await;

    // The connection is still healthy afterwards.
    helpers::create_session(&mut client, json!({})).await;
}
