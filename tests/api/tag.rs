use axum::http::StatusCode;
use serde_json::json;

use tankobon::model::TagGroup;

use crate::fake::insert_fake_tag;
use crate::{AppStateTest, empty_request, json_request, response_json};

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_create_tag() {
    let mut test_state = AppStateTest::new(true).await;

    let (_, token) = test_state.generate_jwt_with_user().await;

    let response = test_state
        .generate_response(json_request(
            "POST",
            "/api/tags",
            Some(&token),
            &json!({
                "name": { "en": "Isekai" },
                "description": { "en": "Another-world stories" },
                "tagGroup": "theme",
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert_eq!(body["name"]["en"], "Isekai");
    assert_eq!(body["tagGroup"], "theme");

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_be_error_when_tag_group_is_unknown() {
    let mut test_state = AppStateTest::new(true).await;

    let (_, token) = test_state.generate_jwt_with_user().await;

    let response = test_state
        .generate_response(json_request(
            "POST",
            "/api/tags",
            Some(&token),
            &json!({
                "name": { "en": "Isekai" },
                "tagGroup": "vibe",
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_filter_tags_by_group() {
    let mut test_state = AppStateTest::new(true).await;

    let (_, token) = test_state.generate_jwt_with_user().await;
    let pool = &test_state.app_state.pool;

    let genre_tag = insert_fake_tag(pool, TagGroup::Genre).await;
    let format_tag = insert_fake_tag(pool, TagGroup::Format).await;

    let response = test_state
        .generate_response(empty_request("GET", "/api/tags?tagGroup=genre", Some(&token)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&genre_tag.id.to_string().as_str()));
    assert!(!ids.contains(&format_tag.id.to_string().as_str()));

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_merge_partial_updates() {
    let mut test_state = AppStateTest::new(true).await;

    let (_, token) = test_state.generate_jwt_with_user().await;

    let tag = insert_fake_tag(&test_state.app_state.pool, TagGroup::Genre).await;

    let response = test_state
        .generate_response(json_request(
            "PATCH",
            &format!("/api/tags/{}", tag.id),
            Some(&token),
            &json!({ "tagGroup": "theme" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["tagGroup"], "theme");
    assert_eq!(body["name"], json!(tag.name));

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_allow_only_admin_to_delete() {
    let mut test_state = AppStateTest::new(true).await;

    let (_, token) = test_state.generate_jwt_with_user().await;
    let (_, admin_token) = test_state.generate_jwt_with_admin().await;

    let tag = insert_fake_tag(&test_state.app_state.pool, TagGroup::Genre).await;
    let uri = format!("/api/tags/{}", tag.id);

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
