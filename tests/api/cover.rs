use axum::http::StatusCode;
use serde_json::json;

use tankobon::model::MangaState;

use crate::fake::{insert_fake_cover, insert_fake_manga};
use crate::{AppStateTest, empty_request, json_request, response_json};

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_create_cover_for_caller() {
    let mut test_state = AppStateTest::new(true).await;

    let (user, token) = test_state.generate_jwt_with_user().await;
    let manga = insert_fake_manga(&test_state.app_state.pool, MangaState::Published).await;

    let response = test_state
        .generate_response(json_request(
            "POST",
            "/api/covers",
            Some(&token),
            &json!({
                "manga": manga.id,
                "fileName": format!("covers/{}/cover.jpg", manga.id),
                "volume": "1",
                "locale": "ja",
                "description": "First volume jacket",
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert_eq!(body["uploader"], json!(user.id));
    assert_eq!(body["manga"], json!(manga.id));
    assert_eq!(body["locale"], "ja");

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_be_error_when_payload_is_invalid() {
    let mut test_state = AppStateTest::new(true).await;

    let (_, token) = test_state.generate_jwt_with_user().await;
    let manga = insert_fake_manga(&test_state.app_state.pool, MangaState::Published).await;

    let response = test_state
        .generate_response(json_request(
            "POST",
            "/api/covers",
            Some(&token),
            &json!({
                "manga": manga.id,
                "fileName": "c".repeat(513),
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["errors"]["fileName"].is_array());

    let response = test_state
        .generate_response(json_request(
            "POST",
            "/api/covers",
            Some(&token),
            &json!({
                "manga": manga.id,
                "fileName": "cover.jpg",
                "locale": "japanese",
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["errors"]["locale"].is_array());

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_filter_covers_by_locale() {
    let mut test_state = AppStateTest::new(true).await;

    let (user, token) = test_state.generate_jwt_with_user().await;
    let pool = &test_state.app_state.pool;

    let manga = insert_fake_manga(pool, MangaState::Published).await;
    let english_cover = insert_fake_cover(pool, manga.id, user.id).await;

    let response = test_state
        .generate_response(json_request(
            "POST",
            "/api/covers",
            Some(&token),
            &json!({
                "manga": manga.id,
                "fileName": "alt-cover.jpg",
                "locale": "ja",
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = test_state
        .generate_response(empty_request(
            "GET",
            &format!("/api/covers?manga={}&locale=en", manga.id),
            Some(&token),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let results = body.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"], json!(english_cover.id));

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_allow_only_uploader_or_admin_to_update() {
    let mut test_state = AppStateTest::new(true).await;

    let (uploader, uploader_token) = test_state.generate_jwt_with_user().await;
    let (_, other_token) = test_state.generate_jwt_with_user().await;
    let pool = &test_state.app_state.pool;

    let manga = insert_fake_manga(pool, MangaState::Published).await;
    let cover = insert_fake_cover(pool, manga.id, uploader.id).await;
    let uri = format!("/api/covers/{}", cover.id);

    let response = test_state
        .generate_response(json_request(
            "PATCH",
            &uri,
            Some(&other_token),
            &json!({ "volume": "2" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = test_state
        .generate_response(json_request(
            "PATCH",
            &uri,
            Some(&uploader_token),
            &json!({ "volume": "2" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["volume"], "2");
    assert_eq!(body["fileName"], cover.file_name.as_str());
    // The owning manga is fixed at upload time.
    assert_eq!(body["manga"], json!(manga.id));

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_allow_only_uploader_or_admin_to_delete() {
    let mut test_state = AppStateTest::new(true).await;

    let (uploader, uploader_token) = test_state.generate_jwt_with_user().await;
    let (_, other_token) = test_state.generate_jwt_with_user().await;
    let (_, admin_token) = test_state.generate_jwt_with_admin().await;
    let pool = &test_state.app_state.pool;

    let manga = insert_fake_manga(pool, MangaState::Published).await;
    let first_cover = insert_fake_cover(pool, manga.id, uploader.id).await;
    let second_cover = insert_fake_cover(pool, manga.id, uploader.id).await;

    let response = test_state
        .generate_response(empty_request(
            "DELETE",
            &format!("/api/covers/{}", first_cover.id),
            Some(&other_token),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = test_state
        .generate_response(empty_request(
            "DELETE",
            &format!("/api/covers/{}", first_cover.id),
            Some(&uploader_token),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = test_state
        .generate_response(empty_request(
            "DELETE",
            &format!("/api/covers/{}", second_cover.id),
            Some(&admin_token),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = test_state
        .generate_response(empty_request(
            "GET",
            &format!("/api/covers/{}", second_cover.id),
            Some(&uploader_token),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    test_state.cleanup().await;
}
