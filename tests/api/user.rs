use axum::http::StatusCode;
use serde_json::json;
use sqlx::Row;
use uuid::Uuid;

use tankobon::config::Config;

use crate::{AppStateTest, empty_request, json_request, response_json};

async fn stored_password(test_state: &AppStateTest, user_id: Uuid) -> String {
    sqlx::query("SELECT password FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(&test_state.app_state.pool)
        .await
        .unwrap()
        .get("password")
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_register_user() {
    let mut test_state = AppStateTest::new(true).await;

    let request = json_request(
        "POST",
        "/api/users",
        None,
        &json!({
            "username": "reader",
            "email": "reader@example.com",
            "password": "password123",
        }),
    );
    let response = test_state.generate_response(request).await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert_eq!(body["username"], "reader");
    assert!(body["id"].is_string());
    assert!(
        body["roles"]
            .as_array()
            .unwrap()
            .contains(&json!("ROLE_USER"))
    );
    assert!(body.get("email").is_none());

    test_state.cleanup().await;
}

#[tokio::test]
async fn should_be_error_when_registration_is_disabled() {
    let mut config = Config::new().unwrap();
    config.application.allow_registration = false;

    let test_state = AppStateTest::new_with_config(false, config).await;

    let request = json_request(
        "POST",
        "/api/users",
        None,
        &json!({
            "username": "reader",
            "email": "reader@example.com",
            "password": "password123",
        }),
    );
    let response = test_state.generate_response(request).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn should_be_error_when_registration_body_is_invalid() {
    let test_state = AppStateTest::new(false).await;

    let request = json_request(
        "POST",
        "/api/users",
        None,
        &json!({
            "username": "reader",
            "email": "not-an-email",
            "password": "password123",
        }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert!(body["errors"]["email"].is_array());

    let request = json_request(
        "POST",
        "/api/users",
        None,
        &json!({
            "username": "r".repeat(65),
            "email": "reader@example.com",
            "password": "password123",
        }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert!(body["errors"]["username"].is_array());
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_be_error_when_email_is_taken() {
    let mut test_state = AppStateTest::new(true).await;

    let payload = json!({
        "username": "reader",
        "email": "reader@example.com",
        "password": "password123",
    });

    let response = test_state
        .generate_response(json_request("POST", "/api/users", None, &payload))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = test_state
        .generate_response(json_request(
            "POST",
            "/api/users",
            None,
            &json!({
                "username": "another-reader",
                "email": "reader@example.com",
                "password": "password123",
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = response_json(response).await;
    assert_eq!(body["error"], "Username or email already in use");

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_store_password_hashed_and_keep_hash_on_update() {
    let mut test_state = AppStateTest::new(true).await;

    let response = test_state
        .generate_response(json_request(
            "POST",
            "/api/users",
            None,
            &json!({
                "username": "reader",
                "email": "reader@example.com",
                "password": "plain-secret-123",
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    let user_id = Uuid::parse_str(body["id"].as_str().unwrap()).unwrap();

    let stored = stored_password(&test_state, user_id).await;
    assert_ne!(stored, "plain-secret-123");
    assert!(stored.starts_with("$argon2"));

    // Writing the stored hash back must not hash it a second time.
    let response = test_state
        .generate_response(json_request(
            "POST",
            "/api/login",
            None,
            &json!({ "email": "reader@example.com", "password": "plain-secret-123" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let token = response_json(response).await["token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = test_state
        .generate_response(json_request(
            "PATCH",
            &format!("/api/users/{}", user_id),
            Some(&token),
            &json!({ "password": stored }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(stored_password(&test_state, user_id).await, stored);

    let response = test_state
        .generate_response(json_request(
            "POST",
            "/api/login",
            None,
            &json!({ "email": "reader@example.com", "password": "plain-secret-123" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_hide_email_on_user_reads() {
    let mut test_state = AppStateTest::new(true).await;

    let (user, token) = test_state.generate_jwt_with_user().await;

    let response = test_state
        .generate_response(empty_request("GET", "/api/users", Some(&token)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    for entry in body.as_array().unwrap() {
        assert!(entry.get("email").is_none());
    }

    let response = test_state
        .generate_response(empty_request(
            "GET",
            &format!("/api/users/{}", user.id),
            Some(&token),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["username"], user.username);
    assert!(body.get("email").is_none());

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_update_own_username() {
    let mut test_state = AppStateTest::new(true).await;

    let (user, token) = test_state.generate_jwt_with_user().await;

    let response = test_state
        .generate_response(json_request(
            "PATCH",
            &format!("/api/users/{}", user.id),
            Some(&token),
            &json!({ "username": "renamed-reader" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["username"], "renamed-reader");

    // Fields that were not part of the request stay untouched.
    let response = test_state
        .generate_response(empty_request("GET", "/api/me", Some(&token)))
        .await;
    let body = response_json(response).await;
    assert_eq!(body["email"], user.email);
    assert_eq!(body["username"], "renamed-reader");

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_be_error_when_updating_another_user() {
    let mut test_state = AppStateTest::new(true).await;

    let (_, token) = test_state.generate_jwt_with_user().await;
    let (other, _) = test_state.generate_jwt_with_user().await;

    let response = test_state
        .generate_response(json_request(
            "PATCH",
            &format!("/api/users/{}", other.id),
            Some(&token),
            &json!({ "username": "hijacked" }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_be_error_when_non_admin_grants_roles() {
    let mut test_state = AppStateTest::new(true).await;

    let (user, token) = test_state.generate_jwt_with_user().await;

    let response = test_state
        .generate_response(json_request(
            "PATCH",
            &format!("/api/users/{}", user.id),
            Some(&token),
            &json!({ "roles": ["ROLE_ADMIN"] }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_allow_admin_to_grant_roles() {
    let mut test_state = AppStateTest::new(true).await;

    let (user, _) = test_state.generate_jwt_with_user().await;
    let (_, admin_token) = test_state.generate_jwt_with_admin().await;

    let response = test_state
        .generate_response(json_request(
            "PATCH",
            &format!("/api/users/{}", user.id),
            Some(&admin_token),
            &json!({ "roles": ["ROLE_ADMIN"] }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let roles = body["roles"].as_array().unwrap();
    assert!(roles.contains(&json!("ROLE_ADMIN")));
    assert!(roles.contains(&json!("ROLE_USER")));

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_be_error_when_version_is_stale() {
    let mut test_state = AppStateTest::new(true).await;

    let (user, token) = test_state.generate_jwt_with_user().await;

    let response = test_state
        .generate_response(json_request(
            "PATCH",
            &format!("/api/users/{}", user.id),
            Some(&token),
            &json!({ "username": "first-rename", "version": user.version }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = test_state
        .generate_response(json_request(
            "PATCH",
            &format!("/api/users/{}", user.id),
            Some(&token),
            &json!({ "username": "second-rename", "version": user.version }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = test_state
        .generate_response(empty_request(
            "GET",
            &format!("/api/users/{}", user.id),
            Some(&token),
        ))
        .await;
    let body = response_json(response).await;
    assert_eq!(body["username"], "first-rename");

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_delete_own_account() {
    let mut test_state = AppStateTest::new(true).await;

    let (user, token) = test_state.generate_jwt_with_user().await;

    let response = test_state
        .generate_response(empty_request(
            "DELETE",
            &format!("/api/users/{}", user.id),
            Some(&token),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = test_state
        .generate_response(empty_request("GET", "/api/me", Some(&token)))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_be_error_when_deleting_another_user() {
    let mut test_state = AppStateTest::new(true).await;

    let (_, token) = test_state.generate_jwt_with_user().await;
    let (other, _) = test_state.generate_jwt_with_user().await;

    let response = test_state
        .generate_response(empty_request(
            "DELETE",
            &format!("/api/users/{}", other.id),
            Some(&token),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let (_, admin_token) = test_state.generate_jwt_with_admin().await;
    let response = test_state
        .generate_response(empty_request(
            "DELETE",
            &format!("/api/users/{}", other.id),
            Some(&admin_token),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    test_state.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn should_follow_and_unfollow_user() {
    let mut test_state = AppStateTest::new(true).await;

    let (_, token) = test_state.generate_jwt_with_user().await;
    let (other, _) = test_state.generate_jwt_with_user().await;

    let follow_uri = format!("/api/users/{}/follow", other.id);

    let response = test_state
        .generate_response(empty_request("POST", &follow_uri, Some(&token)))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Following twice is a no-op, not an error.
    let response = test_state
        .generate_response(empty_request("POST", &follow_uri, Some(&token)))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = test_state
        .generate_response(empty_request("DELETE", &follow_uri, Some(&token)))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = test_state
        .generate_response(empty_request("DELETE", &follow_uri, Some(&token)))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    test_state.cleanup().await;
}
