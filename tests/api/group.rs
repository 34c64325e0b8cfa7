use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::fake::insert_fake_group;
use crate::{AppStateTest, empty_request, json_request, response_json};

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_create_group_with_members() {
    let mut test_state = AppStateTest::new(true).await;

    let (leader, token) = test_state.generate_jwt_with_user().await;
    let (member, _) = test_state.generate_jwt_with_user().await;

    let response = test_state
        .generate_response(json_request(
            "POST",
            "/api/groups",
            Some(&token),
            &json!({
                "name": "Speed Scans",
                "description": "Fast translations",
                "leader": leader.id,
                "members": [member.id],
                "focusedLanguages": ["en", "es"],
                "verified": true,
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert_eq!(body["name"], "Speed Scans");
    assert_eq!(body["leader"], json!(leader.id));
    assert_eq!(body["members"], json!([member.id]));
    assert_eq!(body["focusedLanguages"], json!(["en", "es"]));
    assert_eq!(body["verified"], true);

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_be_error_when_payload_is_invalid() {
    let mut test_state = AppStateTest::new(true).await;

    let (leader, token) = test_state.generate_jwt_with_user().await;

    let response = test_state
        .generate_response(json_request(
            "POST",
            "/api/groups",
            Some(&token),
            &json!({
                "name": "Speed Scans",
                "leader": leader.id,
                "contactEmail": "not-an-email",
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["errors"]["contactEmail"].is_array());

    let response = test_state
        .generate_response(json_request(
            "POST",
            "/api/groups",
            Some(&token),
            &json!({
                "name": "Speed Scans",
                "leader": leader.id,
                "focusedLanguages": ["english"],
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["errors"]["focusedLanguages"].is_array());

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_be_error_when_leader_does_not_exist() {
    let mut test_state = AppStateTest::new(true).await;

    let (_, token) = test_state.generate_jwt_with_user().await;

    let response = test_state
        .generate_response(json_request(
            "POST",
            "/api/groups",
            Some(&token),
            &json!({
                "name": "Orphan Scans",
                "leader": Uuid::new_v4(),
            }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Referenced record does not exist");

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_filter_groups_by_verified() {
    let mut test_state = AppStateTest::new(true).await;

    let (leader, token) = test_state.generate_jwt_with_user().await;

    let response = test_state
        .generate_response(json_request(
            "POST",
            "/api/groups",
            Some(&token),
            &json!({ "name": "Verified Scans", "leader": leader.id, "verified": true }),
        ))
        .await;
    let verified_id = response_json(response).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = test_state
        .generate_response(json_request(
            "POST",
            "/api/groups",
            Some(&token),
            &json!({ "name": "Unverified Scans", "leader": leader.id }),
        ))
        .await;
    let unverified_id = response_json(response).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = test_state
        .generate_response(empty_request(
            "GET",
            "/api/groups?verified=true",
            Some(&token),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&verified_id.as_str()));
    assert!(!ids.contains(&unverified_id.as_str()));

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_merge_partial_updates() {
    let mut test_state = AppStateTest::new(true).await;

    let (leader, token) = test_state.generate_jwt_with_user().await;

    let group = insert_fake_group(&test_state.app_state.pool, leader.id).await;

    let response = test_state
        .generate_response(json_request(
            "PATCH",
            &format!("/api/groups/{}", group.id),
            Some(&token),
            &json!({ "verified": true }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["verified"], true);
    assert_eq!(body["name"], group.name.as_str());
    assert_eq!(body["leader"], json!(leader.id));

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_allow_only_admin_to_delete() {
    let mut test_state = AppStateTest::new(true).await;

    let (leader, token) = test_state.generate_jwt_with_user().await;
    let (_, admin_token) = test_state.generate_jwt_with_admin().await;

    let group = insert_fake_group(&test_state.app_state.pool, leader.id).await;
    let uri = format!("/api/groups/{}", group.id);

    let response = test_state
        .generate_response(empty_request("DELETE", &uri, Some(&token)))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = test_state
        .generate_response(empty_request("DELETE", &uri, Some(&admin_token)))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = test_state
        .generate_response(empty_request("GET", &uri, Some(&token)))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    test_state.cleanup().await;
}
