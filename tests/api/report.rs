use axum::http::StatusCode;
use serde_json::json;

use tankobon::model::{MangaState, ReportTargetKind};

use crate::fake::{insert_fake_author, insert_fake_manga, insert_fake_report};
use crate::{AppStateTest, empty_request, json_request, response_json};

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_create_report_as_waiting() {
    let mut test_state = AppStateTest::new(true).await;

    let (user, token) = test_state.generate_jwt_with_user().await;
    let manga = insert_fake_manga(&test_state.app_state.pool, MangaState::Published).await;

    let response = test_state
        .generate_response(json_request(
            "POST",
            "/api/reports",
            Some(&token),
            &json!({
                "details": "Duplicate entry of an existing title",
                "targetKind": "manga",
                "objectId": manga.id,
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert_eq!(body["status"], "waiting");
    assert_eq!(body["creator"], json!(user.id));
    assert_eq!(body["targetKind"], "manga");
    assert_eq!(body["objectId"], json!(manga.id));

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_be_error_when_details_are_blank() {
    let mut test_state = AppStateTest::new(true).await;

    let (_, token) = test_state.generate_jwt_with_user().await;
    let manga = insert_fake_manga(&test_state.app_state.pool, MangaState::Published).await;

    let response = test_state
        .generate_response(json_request(
            "POST",
            "/api/reports",
            Some(&token),
            &json!({
                "details": "   ",
                "targetKind": "manga",
                "objectId": manga.id,
            }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["errors"]["details"].is_array());

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_allow_only_admin_to_update() {
    let mut test_state = AppStateTest::new(true).await;

    let (creator, creator_token) = test_state.generate_jwt_with_user().await;
    let (_, admin_token) = test_state.generate_jwt_with_admin().await;
    let pool = &test_state.app_state.pool;

    let manga = insert_fake_manga(pool, MangaState::Published).await;
    let report = insert_fake_report(pool, creator.id, ReportTargetKind::Manga, manga.id).await;
    let uri = format!("/api/reports/{}", report.id);

    // Even the creator cannot move their own report through the workflow.
    let response = test_state
        .generate_response(json_request(
            "PATCH",
            &uri,
            Some(&creator_token),
            &json!({ "status": "accepted" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = test_state
        .generate_response(json_request(
            "PATCH",
            &uri,
            Some(&admin_token),
            &json!({ "status": "accepted" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["status"], "accepted");
    assert_eq!(body["details"], report.details.as_str());

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_filter_reports_by_status_and_target() {
    let mut test_state = AppStateTest::new(true).await;

    let (creator, token) = test_state.generate_jwt_with_user().await;
    let (_, admin_token) = test_state.generate_jwt_with_admin().await;
    let pool = &test_state.app_state.pool;

    let manga = insert_fake_manga(pool, MangaState::Published).await;
    let author = insert_fake_author(pool).await;
    let manga_report =
        insert_fake_report(pool, creator.id, ReportTargetKind::Manga, manga.id).await;
    let author_report =
        insert_fake_report(pool, creator.id, ReportTargetKind::Author, author.id).await;

    test_state
        .generate_response(json_request(
            "PATCH",
            &format!("/api/reports/{}", author_report.id),
            Some(&admin_token),
            &json!({ "status": "refused" }),
        ))
        .await;

    let response = test_state
        .generate_response(empty_request(
            "GET",
            "/api/reports?targetKind=manga",
            Some(&token),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let results = body.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"], json!(manga_report.id));

    let response = test_state
        .generate_response(empty_request(
            "GET",
            "/api/reports?status=refused",
            Some(&token),
        ))
        .await;
    let body = response_json(response).await;
    let results = body.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"], json!(author_report.id));

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_allow_only_creator_or_admin_to_delete() {
    let mut test_state = AppStateTest::new(true).await;

    let (creator, creator_token) = test_state.generate_jwt_with_user().await;
    let (_, stranger_token) = test_state.generate_jwt_with_user().await;
    let (_, admin_token) = test_state.generate_jwt_with_admin().await;
    let pool = &test_state.app_state.pool;

    let manga = insert_fake_manga(pool, MangaState::Published).await;
    let first_report =
        insert_fake_report(pool, creator.id, ReportTargetKind::Manga, manga.id).await;
    let second_report =
        insert_fake_report(pool, creator.id, ReportTargetKind::Manga, manga.id).await;

    let response = test_state
        .generate_response(empty_request(
            "DELETE",
            &format!("/api/reports/{}", first_report.id),
            Some(&stranger_token),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = test_state
        .generate_response(empty_request(
            "DELETE",
            &format!("/api/reports/{}", first_report.id),
            Some(&creator_token),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = test_state
        .generate_response(empty_request(
            "DELETE",
            &format!("/api/reports/{}", second_report.id),
            Some(&admin_token),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = test_state
        .generate_response(empty_request(
            "GET",
            &format!("/api/reports/{}", second_report.id),
            Some(&creator_token),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    test_state.cleanup().await;
}
