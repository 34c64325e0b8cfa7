use axum::http::StatusCode;
use serde_json::json;

use tankobon::model::{ListVisibility, MangaState};

use crate::fake::{insert_fake_list, insert_fake_manga};
use crate::{AppStateTest, empty_request, json_request, response_json};

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_create_list_private_by_default() {
    let mut test_state = AppStateTest::new(true).await;

    let (user, token) = test_state.generate_jwt_with_user().await;

    let response = test_state
        .generate_response(json_request(
            "POST",
            "/api/lists",
            Some(&token),
            &json!({ "name": "To Read" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert_eq!(body["name"], "To Read");
    assert_eq!(body["visibility"], "private");
    assert_eq!(body["owner"], json!(user.id));
    assert_eq!(body["manga"], json!([]));

    let response = test_state
        .generate_response(json_request(
            "POST",
            "/api/lists",
            Some(&token),
            &json!({ "name": "My Favorites", "visibility": "public" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert_eq!(body["visibility"], "public");

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_be_error_when_name_is_blank() {
    let mut test_state = AppStateTest::new(true).await;

    let (_, token) = test_state.generate_jwt_with_user().await;

    let response = test_state
        .generate_response(json_request(
            "POST",
            "/api/lists",
            Some(&token),
            &json!({ "name": "" }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["errors"]["name"].is_array());

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_scope_private_lists_to_owner() {
    let mut test_state = AppStateTest::new(true).await;

    let (owner, owner_token) = test_state.generate_jwt_with_user().await;
    let (_, stranger_token) = test_state.generate_jwt_with_user().await;
    let (_, admin_token) = test_state.generate_jwt_with_admin().await;
    let pool = &test_state.app_state.pool;

    let private_list = insert_fake_list(pool, owner.id, ListVisibility::Private).await;
    let public_list = insert_fake_list(pool, owner.id, ListVisibility::Public).await;

    let private_uri = format!("/api/lists/{}", private_list.id);

    let response = test_state
        .generate_response(empty_request("GET", &private_uri, Some(&owner_token)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = test_state
        .generate_response(empty_request("GET", &private_uri, Some(&stranger_token)))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = test_state
        .generate_response(empty_request("GET", &private_uri, Some(&admin_token)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Listings show others' public lists but never their private ones.
    let response = test_state
        .generate_response(empty_request("GET", "/api/lists", Some(&stranger_token)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&public_list.id.to_string().as_str()));
    assert!(!ids.contains(&private_list.id.to_string().as_str()));

    let response = test_state
        .generate_response(empty_request("GET", "/api/lists", Some(&owner_token)))
        .await;
    let body = response_json(response).await;
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&private_list.id.to_string().as_str()));

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_manage_list_manga_as_owner_only() {
    let mut test_state = AppStateTest::new(true).await;

    let (owner, owner_token) = test_state.generate_jwt_with_user().await;
    let (_, stranger_token) = test_state.generate_jwt_with_user().await;
    let pool = &test_state.app_state.pool;

    let list = insert_fake_list(pool, owner.id, ListVisibility::Public).await;
    let manga = insert_fake_manga(pool, MangaState::Published).await;

    let entry_uri = format!("/api/lists/{}/manga/{}", list.id, manga.id);

    let response = test_state
        .generate_response(empty_request("POST", &entry_uri, Some(&stranger_token)))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = test_state
        .generate_response(empty_request("POST", &entry_uri, Some(&owner_token)))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Adding the same manga twice is a no-op.
    let response = test_state
        .generate_response(empty_request("POST", &entry_uri, Some(&owner_token)))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = test_state
        .generate_response(empty_request(
            "GET",
            &format!("/api/lists/{}", list.id),
            Some(&owner_token),
        ))
        .await;
    let body = response_json(response).await;
    assert_eq!(body["manga"], json!([manga.id]));

    let response = test_state
        .generate_response(empty_request("DELETE", &entry_uri, Some(&owner_token)))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = test_state
        .generate_response(empty_request(
            "GET",
            &format!("/api/lists/{}", list.id),
            Some(&owner_token),
        ))
        .await;
    let body = response_json(response).await;
    assert_eq!(body["manga"], json!([]));

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_follow_private_list_of_another_user() {
    let mut test_state = AppStateTest::new(true).await;

    let (owner, _) = test_state.generate_jwt_with_user().await;
    let (_, stranger_token) = test_state.generate_jwt_with_user().await;

    let list = insert_fake_list(
        &test_state.app_state.pool,
        owner.id,
        ListVisibility::Private,
    )
    .await;

    // Follow targets any list by id, visibility does not gate it.
    let follow_uri = format!("/api/lists/{}/follow", list.id);

    let response = test_state
        .generate_response(empty_request("POST", &follow_uri, Some(&stranger_token)))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = test_state
        .generate_response(empty_request("DELETE", &follow_uri, Some(&stranger_token)))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_allow_only_owner_or_admin_to_delete() {
    let mut test_state = AppStateTest::new(true).await;

    let (owner, owner_token) = test_state.generate_jwt_with_user().await;
    let (_, stranger_token) = test_state.generate_jwt_with_user().await;
    let (_, admin_token) = test_state.generate_jwt_with_admin().await;
    let pool = &test_state.app_state.pool;

    let first_list = insert_fake_list(pool, owner.id, ListVisibility::Private).await;
    let second_list = insert_fake_list(pool, owner.id, ListVisibility::Private).await;

    let response = test_state
        .generate_response(empty_request(
            "DELETE",
            &format!("/api/lists/{}", first_list.id),
            Some(&stranger_token),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = test_state
        .generate_response(empty_request(
            "DELETE",
            &format!("/api/lists/{}", first_list.id),
            Some(&owner_token),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = test_state
        .generate_response(empty_request(
            "DELETE",
            &format!("/api/lists/{}", second_list.id),
            Some(&admin_token),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    test_state.cleanup().await;
}
