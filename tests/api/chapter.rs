use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use tankobon::model::MangaState;

use crate::fake::{insert_fake_chapter, insert_fake_manga};
use crate::{AppStateTest, empty_request, json_request, response_json};

fn chapter_payload(manga_id: Uuid, language: &str, chapter: &str) -> serde_json::Value {
    json!({
        "manga": manga_id,
        "translatedLanguage": language,
        "chapter": chapter,
        "pages": 20,
    })
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_create_chapter_and_update_read_model() {
    let mut test_state = AppStateTest::new(true).await;

    let (user, token) = test_state.generate_jwt_with_user().await;
    let manga = insert_fake_manga(&test_state.app_state.pool, MangaState::Published).await;

    let response = test_state
        .generate_response(json_request(
            "POST",
            "/api/chapters",
            Some(&token),
            &chapter_payload(manga.id, "en", "1"),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert_eq!(body["uploader"], json!(user.id));
    assert_eq!(body["manga"], json!(manga.id));
    let first_chapter_id = body["id"].as_str().unwrap().to_string();

    let manga_uri = format!("/api/manga/{}", manga.id);
    let response = test_state
        .generate_response(empty_request("GET", &manga_uri, Some(&token)))
        .await;
    let body = response_json(response).await;
    assert_eq!(body["availableTranslatedLanguages"], json!(["en"]));
    assert_eq!(body["latestUploadedChapter"], json!(first_chapter_id));

    // A second upload in a known language adds no duplicate entry but
    // still becomes the latest chapter.
    let response = test_state
        .generate_response(json_request(
            "POST",
            "/api/chapters",
            Some(&token),
            &chapter_payload(manga.id, "en", "2"),
        ))
        .await;
    let second_chapter_id = response_json(response).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = test_state
        .generate_response(json_request(
            "POST",
            "/api/chapters",
            Some(&token),
            &chapter_payload(manga.id, "es", "2"),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let third_chapter_id = response_json(response).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = test_state
        .generate_response(empty_request("GET", &manga_uri, Some(&token)))
        .await;
    let body = response_json(response).await;
    assert_eq!(body["availableTranslatedLanguages"], json!(["en", "es"]));
    assert_eq!(body["latestUploadedChapter"], json!(third_chapter_id));
    assert_ne!(second_chapter_id, third_chapter_id);

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_not_retract_read_model_on_chapter_delete() {
    let mut test_state = AppStateTest::new(true).await;

    let (_, token) = test_state.generate_jwt_with_user().await;
    let manga = insert_fake_manga(&test_state.app_state.pool, MangaState::Published).await;

    let response = test_state
        .generate_response(json_request(
            "POST",
            "/api/chapters",
            Some(&token),
            &chapter_payload(manga.id, "en", "1"),
        ))
        .await;
    let chapter_id = response_json(response).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = test_state
        .generate_response(empty_request(
            "DELETE",
            &format!("/api/chapters/{}", chapter_id),
            Some(&token),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The language list and latest-chapter pointer are upload history,
    // deleting the chapter leaves them in place.
    let response = test_state
        .generate_response(empty_request(
            "GET",
            &format!("/api/manga/{}", manga.id),
            Some(&token),
        ))
        .await;
    let body = response_json(response).await;
    assert_eq!(body["availableTranslatedLanguages"], json!(["en"]));
    assert_eq!(body["latestUploadedChapter"], json!(chapter_id));

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_be_error_when_payload_is_invalid() {
    let mut test_state = AppStateTest::new(true).await;

    let (_, token) = test_state.generate_jwt_with_user().await;
    let manga = insert_fake_manga(&test_state.app_state.pool, MangaState::Published).await;

    let mut payload = chapter_payload(manga.id, "en", "1");
    payload["pages"] = json!(-1);
    let response = test_state
        .generate_response(json_request("POST", "/api/chapters", Some(&token), &payload))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["errors"]["pages"].is_array());

    let mut payload = chapter_payload(manga.id, "en", "1");
    payload["externalUrl"] = json!("not a url");
    let response = test_state
        .generate_response(json_request("POST", "/api/chapters", Some(&token), &payload))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["errors"]["externalUrl"].is_array());

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_be_error_when_manga_does_not_exist() {
    let mut test_state = AppStateTest::new(true).await;

    let (_, token) = test_state.generate_jwt_with_user().await;

    let response = test_state
        .generate_response(json_request(
            "POST",
            "/api/chapters",
            Some(&token),
            &chapter_payload(Uuid::new_v4(), "en", "1"),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Referenced record does not exist");

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_filter_chapters_by_manga() {
    let mut test_state = AppStateTest::new(true).await;

    let (user, token) = test_state.generate_jwt_with_user().await;
    let pool = &test_state.app_state.pool;

    let first_manga = insert_fake_manga(pool, MangaState::Published).await;
    let second_manga = insert_fake_manga(pool, MangaState::Published).await;
    let first_chapter = insert_fake_chapter(pool, first_manga.id, user.id).await;
    insert_fake_chapter(pool, second_manga.id, user.id).await;

    let response = test_state
        .generate_response(empty_request(
            "GET",
            &format!("/api/chapters?manga={}", first_manga.id),
            Some(&token),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let results = body.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"], json!(first_chapter.id));

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_allow_only_uploader_or_admin_to_update() {
    let mut test_state = AppStateTest::new(true).await;

    let (uploader, uploader_token) = test_state.generate_jwt_with_user().await;
    let (_, other_token) = test_state.generate_jwt_with_user().await;
    let (_, admin_token) = test_state.generate_jwt_with_admin().await;
    let pool = &test_state.app_state.pool;

    let manga = insert_fake_manga(pool, MangaState::Published).await;
    let chapter = insert_fake_chapter(pool, manga.id, uploader.id).await;
    let uri = format!("/api/chapters/{}", chapter.id);

    let response = test_state
        .generate_response(json_request(
            "PATCH",
            &uri,
            Some(&other_token),
            &json!({ "title": "Hijacked" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = test_state
        .generate_response(json_request(
            "PATCH",
            &uri,
            Some(&uploader_token),
            &json!({ "title": "Renamed Chapter" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["title"], "Renamed Chapter");
    assert_eq!(body["pages"], chapter.pages);

    let response = test_state
        .generate_response(json_request(
            "PATCH",
            &uri,
            Some(&admin_token),
            &json!({ "isUnavailable": true }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["isUnavailable"], true);

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
    let first_chapter = insert_fake_chapter(pool, manga.id, uploader.id).await;
    let second_chapter = insert_fake_chapter(pool, manga.id, uploader.id).await;

    let response = test_state
        .generate_response(empty_request(
            "DELETE",
            &format!("/api/chapters/{}", first_chapter.id),
            Some(&other_token),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = test_state
        .generate_response(empty_request(
            "DELETE",
            &format!("/api/chapters/{}", first_chapter.id),
            Some(&uploader_token),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = test_state
        .generate_response(empty_request(
            "GET",
            &format!("/api/chapters/{}", first_chapter.id),
            Some(&uploader_token),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = test_state
        .generate_response(empty_request(
            "DELETE",
            &format!("/api/chapters/{}", second_chapter.id),
            Some(&admin_token),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    test_state.cleanup().await;
}
