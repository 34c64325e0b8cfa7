use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::fake::insert_fake_author;
use crate::{AppStateTest, empty_request, json_request, response_json};

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_create_author_with_links() {
    let mut test_state = AppStateTest::new(true).await;

    let (_, token) = test_state.generate_jwt_with_user().await;

    let response = test_state
        .generate_response(json_request(
            "POST",
            "/api/authors",
            Some(&token),
            &json!({
                "name": { "en": "Eiji Nakamura" },
                "twitter": { "en": "@eiji_nakamura" },
                "biography": { "en": "Draws adventure stories.", "ja": "冒険物語を描く。" },
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    let author_id = body["id"].as_str().unwrap().to_string();
    assert_eq!(body["name"]["en"], "Eiji Nakamura");
    assert_eq!(body["twitter"]["en"], "@eiji_nakamura");

    let response = test_state
        .generate_response(empty_request(
            "GET",
            &format!("/api/authors/{}", author_id),
            Some(&token),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["twitter"], json!({ "en": "@eiji_nakamura" }));
    assert_eq!(body["biography"]["ja"], "冒険物語を描く。");
    assert!(body["pixiv"].is_null());

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_be_error_when_payload_is_invalid() {
    let mut test_state = AppStateTest::new(true).await;

    let (_, token) = test_state.generate_jwt_with_user().await;

    let response = test_state
        .generate_response(json_request(
            "POST",
            "/api/authors",
            Some(&token),
            &json!({ "name": {} }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["errors"]["name"].is_array());

    let response = test_state
        .generate_response(json_request(
            "POST",
            "/api/authors",
            Some(&token),
            &json!({
                "name": { "en": "Ghost Writer" },
                "twitter": { "twitterese": "@ghost" },
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["errors"]["twitter"].is_array());

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_filter_authors_by_name() {
    let mut test_state = AppStateTest::new(true).await;

    let (_, token) = test_state.generate_jwt_with_user().await;
    let pool = &test_state.app_state.pool;

    let marker = Uuid::new_v4().simple().to_string();
    let response = test_state
        .generate_response(json_request(
            "POST",
            "/api/authors",
            Some(&token),
            &json!({ "name": { "en": format!("Sakura {}", marker) } }),
        ))
        .await;
    let matching_id = response_json(response).await["id"]
        .as_str()
        .unwrap()
        .to_string();
    insert_fake_author(pool).await;

    let response = test_state
        .generate_response(empty_request(
            "GET",
            &format!("/api/authors?name={}", marker),
            Some(&token),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let results = body.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"], matching_id.as_str());

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_merge_partial_updates() {
    let mut test_state = AppStateTest::new(true).await;

    let (_, token) = test_state.generate_jwt_with_user().await;

    let author = insert_fake_author(&test_state.app_state.pool).await;

    let response = test_state
        .generate_response(json_request(
            "PATCH",
            &format!("/api/authors/{}", author.id),
            Some(&token),
            &json!({ "pixiv": { "en": "https://pixiv.net/users/42" } }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["pixiv"]["en"], "https://pixiv.net/users/42");
    assert_eq!(body["name"], json!(author.name));

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_allow_only_admin_to_delete() {
    let mut test_state = AppStateTest::new(true).await;

    let (_, token) = test_state.generate_jwt_with_user().await;
    let (_, admin_token) = test_state.generate_jwt_with_admin().await;

    let author = insert_fake_author(&test_state.app_state.pool).await;
    let uri = format!("/api/authors/{}", author.id);

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
