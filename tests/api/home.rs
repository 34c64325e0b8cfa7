use axum::http::StatusCode;

use crate::{AppStateTest, empty_request, response_json};

#[tokio::test]
async fn should_be_ok_without_token() {
    let test_state = AppStateTest::new(false).await;

    let response = test_state
        .generate_response(empty_request("GET", "/", None))
        .await;

    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["name"], "tankobon");
    assert!(body["version"].is_string());
}
