use std::borrow::Cow;
use std::sync::Arc;

use anyhow::Context;
use axum::{Extension, Json, extract::State};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidateEmail, ValidateLength, ValidationError, ValidationErrors};

use crate::{
    auth::{encode_jwt, error::AuthError, verify_password_hash},
    db::user::get_user_with_password_by_email,
    error::Error,
    model::User,
    state::SharedAppState,
    telemetry::spawn_blocking_with_tracing,
};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: SecretString,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !self.email.validate_email() {
            errors.add(
                "email",
                ValidationError::new("email_email")
                    .with_message(Cow::from("Incorrect email format")),
            );
        }
        if !self.email.validate_length(Some(1), Some(255), None) {
            errors.add(
                "email",
                ValidationError::new("email_length")
                    .with_message(Cow::from("Email length must be between 1 and 255")),
            );
        }

        let password = self.password.expose_secret();
        if !password.validate_length(Some(1), Some(128), None) {
            errors.add(
                "password",
                ValidationError::new("password_length")
                    .with_message(Cow::from("Password length must be between 1 and 128")),
            );
        }

        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(())
    }
}

#[derive(Serialize)]
pub struct TokenUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub user: TokenUser,
}

impl TokenResponse {
    fn new(token: String, user: &User) -> Self {
        TokenResponse {
            token,
            user: TokenUser {
                id: user.id,
                email: user.email.clone(),
                name: user.username.clone(),
                roles: user.effective_roles(),
            },
        }
    }
}

#[tracing::instrument(name = "[POST] login", skip_all)]
pub async fn login(
    State(app_state): State<SharedAppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, Error> {
    request.validate().map_err(Error::Validation)?;

    let (user, hashed_password) = get_user_with_password_by_email(&app_state.pool, &request.email)
        .await?
        .ok_or(Error::Auth(AuthError::UserNotFound))?;

    spawn_blocking_with_tracing(move || verify_password_hash(hashed_password, request.password))
        .await
        .context("verify password hash")
        .map_err(Error::Other)?
        .map_err(|_| Error::Auth(AuthError::IncorrectCredential))?;

    let user_id = user.id;
    let roles = user.effective_roles();
    let state = app_state.clone();
    let token = spawn_blocking_with_tracing(move || encode_jwt(user_id, roles, &state.config.jwt))
        .await
        .context("encode jwt")
        .map_err(Error::Other)??;

    Ok(Json(TokenResponse::new(token, &user)))
}

#[tracing::instrument(name = "[POST] refresh", skip_all, fields(user_id = %user.id))]
pub async fn refresh(
    State(app_state): State<SharedAppState>,
    Extension(user): Extension<Arc<User>>,
) -> Result<Json<TokenResponse>, Error> {
    let user_id = user.id;
    let roles = user.effective_roles();
    let token =
        spawn_blocking_with_tracing(move || encode_jwt(user_id, roles, &app_state.config.jwt))
            .await
            .context("encode jwt")
            .map_err(Error::Other)??;

    Ok(Json(TokenResponse::new(token, &user)))
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub message: &'static str,
}

/// Token invalidation happens client side; the endpoint exists so clients
/// have a uniform logout call.
#[tracing::instrument(name = "[POST] logout", skip_all)]
pub async fn logout() -> Json<LogoutResponse> {
    Json(LogoutResponse {
        message: "Logged out successfully",
    })
}
