//! Integration tests for the session discovery listing.

mod helpers;

use serde_json::{json, Value};

use helpers::TestApp;

fn listed_names(listing: &Value) -> Vec<String> {
    let mut names: Vec<String> = listing["sessions"]
        .as_array()
        .expect("sessions")
        .iter()
        .map(|s| s["sessionName"].as_str().expect("session name").to_string())
        .collect();
    names.sort_unstable();
    names
}

#[tokio::test]
async fn test_discovery_filters_hidden_closed_and_full() {
    let app = TestApp::new().await;
    let mut open_host = app.client().await;
    let mut hidden_host = app.client().await;
    let mut closed_host = app.client().await;
    let mut full_host = app.client().await;
    let mut other_program_host = app.client().await;
    let mut asker = app.client().await;

    helpers::create_session(&mut open_host, json!({ "sessionName": "open" })).await;
    helpers::create_session(
        &mut hidden_host,
        json!({ "sessionName": "hidden", "isHiddenSession": true }),
    )
    .await;
    helpers::create_session(
        &mut closed_host,
        json!({ "sessionName": "closed", "sessionOpen": false }),
    )
    .await;
    helpers::create_session(
        &mut full_host,
        json!({ "sessionName": "full", "maxNumberOfClients": 1 }),
    )
    .await;
    helpers::create_session(
        &mut other_program_host,
        json!({ "programName": "checkers", "sessionName": "other" }),
    )
    .await;

    asker
        .send(json!({ "type": "sessionList", "programName": "chess" }))
        .await;
    let listing = asker.expect_event("sessionList").await;
    assert_eq!(listed_names(&listing), vec!["open"]);

    // listAllSessions includes closed and full sessions, never hidden ones.
    asker
        .send(json!({
            "type": "sessionList",
            "programName": "chess",
            "listAllSessions": true
        }))
        .await;
    let listing = asker.expect_event("sessionList").await;
    assert_eq!(listed_names(&listing), vec!["closed", "full", "open"]);
}

#[tokio::test]
async fn test_discovery_exposes_host_identity() {
    let app = TestApp::new().await;
    let mut host = app.client().await;
    let mut asker = app.client().await;

    let session_id = helpers::create_session(&mut host, json!({ "sessionName": "lobby" })).await;
    // The sessionList round trip guarantees the rename was processed before
    // the asker queries.
    host.send(json!({ "type": "name", "name": "Judit" })).await;
    host.send(json!({ "type": "sessionList", "programName": "chess" }))
        .await;
    host.expect_event("sessionList").await;

    asker
        .send(json!({ "type": "sessionList", "programName": "chess" }))
        .await;
    let listing = asker.expect_event("sessionList").await;
    let sessions = listing["sessions"].as_array().expect("sessions");
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["sessionId"].as_u64(), Some(session_id));
    assert_eq!(sessions[0]["sessionName"], "lobby");
    assert_eq!(sessions[0]["hostClientId"].as_u64(), Some(host.id));
    assert_eq!(sessions[0]["hostClientName"], "Judit");
}

#[tokio::test]
async fn test_discovery_host_name_empty_when_host_gone() {
    let app = TestApp::new().await;
    let mut host = app.client().await;
    let mut member = app.client().await;
    let mut asker = app.client().await;

    let session_id = helpers::create_session(
        &mut host,
        json!({ "sessionNeedsHostToLive": false }),
    )
    .await;
    member
        .send(json!({ "type": "joinSession", "sessionId": session_id }))
        .await;
    member.expect_event("joinSessionSuccess").await;

    let host_id = host.id;
    host.close().await;
    member.expect_event("clientLeft").await;

    asker
        .send(json!({ "type": "sessionList", "programName": "chess" }))
        .await;
    let listing = asker.expect_event("sessionList").await;
    let sessions = listing["sessions"].as_array().expect("sessions");
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["hostClientId"].as_u64(), Some(host_id));
    assert_eq!(sessions[0]["hostClientName"], "");
}

#[tokio::test]
async fn test_discovery_empty_for_unknown_program() {
    let app = TestApp::new().await;
    let mut host = app.client().await;
    let mut asker = app.client().await;
    helpers::create_session(&mut host, json!({})).await;

    asker
        .send(json!({ "type": "sessionList", "programName": "go" }))
        .await;
    let listing = asker.expect_event("sessionList").await;
    assert!(listing["sessions"].as_array().expect("sessions").is_empty());
}
