use axum::http::StatusCode;
use serde_json::json;

use tankobon::model::MangaState;

use crate::fake::{insert_fake_manga, insert_fake_relation};
use crate::{AppStateTest, empty_request, json_request, response_json};

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_create_relation() {
    let mut test_state = AppStateTest::new(true).await;

    let (_, token) = test_state.generate_jwt_with_user().await;
    let pool = &test_state.app_state.pool;

    let source = insert_fake_manga(pool, MangaState::Published).await;
    let target = insert_fake_manga(pool, MangaState::Published).await;

    let response = test_state
        .generate_response(json_request(
            "POST",
            "/api/relations",
            Some(&token),
            &json!({
                "relation": "sequel",
                "sourceManga": source.id,
                "targetManga": target.id,
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert_eq!(body["relation"], "sequel");
    assert_eq!(body["sourceManga"], json!(source.id));
    assert_eq!(body["targetManga"], json!(target.id));

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_be_error_when_relation_kind_is_unknown() {
    let mut test_state = AppStateTest::new(true).await;

    let (_, token) = test_state.generate_jwt_with_user().await;
    let pool = &test_state.app_state.pool;

    let source = insert_fake_manga(pool, MangaState::Published).await;
    let target = insert_fake_manga(pool, MangaState::Published).await;

    let response = test_state
        .generate_response(json_request(
            "POST",
            "/api/relations",
            Some(&token),
            &json!({
                "relation": "cameo",
                "sourceManga": source.id,
                "targetManga": target.id,
            }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_filter_relations_by_source_manga() {
    let mut test_state = AppStateTest::new(true).await;

    let (_, token) = test_state.generate_jwt_with_user().await;
    let pool = &test_state.app_state.pool;

    let first = insert_fake_manga(pool, MangaState::Published).await;
    let second = insert_fake_manga(pool, MangaState::Published).await;
    let third = insert_fake_manga(pool, MangaState::Published).await;

    let matching = insert_fake_relation(pool, first.id, second.id).await;
    insert_fake_relation(pool, second.id, third.id).await;

    let response = test_state
        .generate_response(empty_request(
            "GET",
            &format!("/api/relations?sourceManga={}", first.id),
            Some(&token),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let results = body.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"], json!(matching.id));

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_merge_partial_updates() {
    let mut test_state = AppStateTest::new(true).await;

    let (_, token) = test_state.generate_jwt_with_user().await;
    let pool = &test_state.app_state.pool;

    let source = insert_fake_manga(pool, MangaState::Published).await;
    let target = insert_fake_manga(pool, MangaState::Published).await;
    let relation = insert_fake_relation(pool, source.id, target.id).await;

    let response = test_state
        .generate_response(json_request(
            "PATCH",
            &format!("/api/relations/{}", relation.id),
            Some(&token),
            &json!({ "relation": "spin_off" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["relation"], "spin_off");
    assert_eq!(body["sourceManga"], json!(source.id));
    assert_eq!(body["targetManga"], json!(target.id));

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_allow_only_admin_to_delete() {
    let mut test_state = AppStateTest::new(true).await;

    let (_, token) = test_state.generate_jwt_with_user().await;
    let (_, admin_token) = test_state.generate_jwt_with_admin().await;
    let pool = &test_state.app_state.pool;

    let source = insert_fake_manga(pool, MangaState::Published).await;
    let target = insert_fake_manga(pool, MangaState::Published).await;
    let relation = insert_fake_relation(pool, source.id, target.id).await;
    let uri = format!("/api/relations/{}", relation.id);

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
