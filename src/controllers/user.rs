use std::borrow::Cow;
use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidateEmail, ValidateLength, ValidationError, ValidationErrors};

use crate::{
    db::user::{
        UserChanges, UserFilter, add_user_follow, delete_user, get_user_by_id,
        get_users_with_pagination, insert_user, remove_user_follow, update_user,
    },
    error::Error,
    model::User,
    state::SharedAppState,
};

use super::Pagination;

/// Public projection of a user. Email stays off the wire here, only
/// `/api/me` and the login response carry it.
#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub roles: Vec<String>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let roles = user.effective_roles();

        UserResponse {
            id: user.id,
            username: user.username,
            roles,
            version: user.version,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct UserListQuery {
    username: Option<String>,
    email: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: SecretString,
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !self.username.validate_length(Some(1), Some(64), None) {
            errors.add(
                "username",
                ValidationError::new("username_length")
                    .with_message(Cow::from("Username length must be between 1 and 64")),
            );
        }
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
        if !self
            .password
            .expose_secret()
            .validate_length(Some(1), Some(128), None)
        {
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

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<SecretString>,
    pub roles: Option<Vec<String>>,
    pub version: Option<i32>,
}

impl Validate for UpdateUserRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(username) = &self.username {
            if !username.validate_length(Some(1), Some(64), None) {
                errors.add(
                    "username",
                    ValidationError::new("username_length")
                        .with_message(Cow::from("Username length must be between 1 and 64")),
                );
            }
        }
        if let Some(email) = &self.email {
            if !email.validate_email() || !email.validate_length(Some(1), Some(255), None) {
                errors.add(
                    "email",
                    ValidationError::new("email_email")
                        .with_message(Cow::from("Incorrect email format")),
                );
            }
        }
        if let Some(password) = &self.password {
            if !password
                .expose_secret()
                .validate_length(Some(1), Some(128), None)
            {
                errors.add(
                    "password",
                    ValidationError::new("password_length")
                        .with_message(Cow::from("Password length must be between 1 and 128")),
                );
            }
        }

        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(())
    }
}

#[derive(Deserialize)]
pub struct UrlPath {
    id: Uuid,
}

#[tracing::instrument(name = "[GET] users", skip_all)]
pub async fn index(
    State(app_state): State<SharedAppState>,
    Query(pagination): Query<Pagination>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Vec<UserResponse>>, Error> {
    pagination.validate().map_err(Error::Validation)?;

    let filter = UserFilter {
        username: query.username,
        email: query.email,
    };

    let users = get_users_with_pagination(
        &app_state.pool,
        &filter,
        pagination.limit(),
        pagination.offset(),
    )
    .await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[tracing::instrument(name = "[GET] users/{id}", skip_all, fields(user_id = %path.id))]
pub async fn show(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
) -> Result<Json<UserResponse>, Error> {
    let user = get_user_by_id(&app_state.pool, path.id).await?;

    Ok(Json(UserResponse::from(user)))
}

/// Open registration. New accounts never carry stored roles, the
/// implicit ROLE_USER is enough until an admin grants more.
#[tracing::instrument(name = "[POST] users", skip_all)]
pub async fn store(
    State(app_state): State<SharedAppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), Error> {
    if !app_state.config.application.allow_registration {
        return Err(Error::Forbidden);
    }

    request.validate().map_err(Error::Validation)?;

    let user = insert_user(
        &app_state.pool,
        request.username,
        request.email,
        request.password,
        vec![],
    )
    .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

#[tracing::instrument(name = "[PUT] users/{id}", skip_all, fields(user_id = %path.id))]
pub async fn update(
    State(app_state): State<SharedAppState>,
    Extension(caller): Extension<Arc<User>>,
    Path(path): Path<UrlPath>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, Error> {
    if caller.id != path.id && !caller.is_admin() {
        return Err(Error::Forbidden);
    }
    if request.roles.is_some() && !caller.is_admin() {
        return Err(Error::Forbidden);
    }

    request.validate().map_err(Error::Validation)?;

    let current = get_user_by_id(&app_state.pool, path.id).await?;
    let changes = UserChanges {
        username: request.username.unwrap_or(current.username),
        email: request.email.unwrap_or(current.email),
        roles: request.roles.unwrap_or(current.roles),
        password: request.password,
    };

    let user = update_user(&app_state.pool, path.id, changes, request.version).await?;

    Ok(Json(UserResponse::from(user)))
}

#[tracing::instrument(name = "[DELETE] users/{id}", skip_all, fields(user_id = %path.id))]
pub async fn destroy(
    State(app_state): State<SharedAppState>,
    Extension(caller): Extension<Arc<User>>,
    Path(path): Path<UrlPath>,
) -> Result<StatusCode, Error> {
    if caller.id != path.id && !caller.is_admin() {
        return Err(Error::Forbidden);
    }

    delete_user(&app_state.pool, path.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(name = "[POST] users/{id}/follow", skip_all, fields(user_id = %path.id))]
pub async fn follow(
    State(app_state): State<SharedAppState>,
    Extension(caller): Extension<Arc<User>>,
    Path(path): Path<UrlPath>,
) -> Result<StatusCode, Error> {
    add_user_follow(&app_state.pool, caller.id, path.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(name = "[DELETE] users/{id}/follow", skip_all, fields(user_id = %path.id))]
pub async fn unfollow(
    State(app_state): State<SharedAppState>,
    Extension(caller): Extension<Arc<User>>,
    Path(path): Path<UrlPath>,
) -> Result<StatusCode, Error> {
    remove_user_follow(&app_state.pool, caller.id, path.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
