use anyhow::Context;
use chrono::Utc;
use secrecy::SecretString;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow, types::Json};
use uuid::Uuid;

use crate::{
    auth::ensure_password_hash, error::Error, model::User, telemetry::spawn_blocking_with_tracing,
};

use super::error::DatabaseError;

const USER_COLUMNS: &str = "id, username, email, roles, version, created_at, updated_at";

pub struct UserFilter {
    pub username: Option<String>,
    pub email: Option<String>,
}

pub struct UserChanges {
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
    pub password: Option<SecretString>,
}

fn map_user_row(row: PgRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        roles: row.get::<Json<Vec<String>>, _>("roles").0,
        version: row.get("version"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn map_unique_violation(error: sqlx::Error) -> Error {
    match &error {
        sqlx::Error::Database(db_error) if db_error.code().as_deref() == Some("23505") => {
            Error::Conflict("Username or email already in use".to_string())
        }
        _ => Error::Database(DatabaseError::DatabaseError(error)),
    }
}

async fn user_exists(pool: &PgPool, user_id: Uuid) -> Result<bool, Error> {
    let row = sqlx::query("SELECT 1 FROM users WHERE id = $1;")
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    Ok(row.is_some())
}

#[tracing::instrument(name = "get user by id", skip_all, fields(user_id = %user_id))]
pub async fn get_user_by_id_optional(pool: &PgPool, user_id: Uuid) -> Result<Option<User>, Error> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM users WHERE id = $1;",
        USER_COLUMNS
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(row.map(map_user_row))
}

pub async fn get_user_by_id(pool: &PgPool, user_id: Uuid) -> Result<User, Error> {
    match get_user_by_id_optional(pool, user_id).await? {
        Some(user) => Ok(user),
        None => Err(Error::Database(DatabaseError::NotFound)),
    }
}

#[tracing::instrument(name = "get user by email", skip_all, fields(email))]
pub async fn get_user_with_password_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<(User, String)>, Error> {
    let row = sqlx::query(&format!(
        "SELECT {}, password FROM users WHERE email = $1;",
        USER_COLUMNS
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(row.map(|row| {
        let password: String = row.get("password");
        (map_user_row(row), password)
    }))
}

#[tracing::instrument(name = "get users with pagination", skip_all)]
pub async fn get_users_with_pagination(
    pool: &PgPool,
    filter: &UserFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<User>, Error> {
    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT {} FROM users WHERE 1 = 1", USER_COLUMNS));

    if let Some(username) = &filter.username {
        builder.push(" AND username LIKE ");
        builder.push_bind(format!("%{}%", username));
    }
    if let Some(email) = &filter.email {
        builder.push(" AND email LIKE ");
        builder.push_bind(format!("%{}%", email));
    }

    builder.push(" ORDER BY username LIMIT ");
    builder.push_bind(limit);
    builder.push(" OFFSET ");
    builder.push_bind(offset);

    let rows = builder
        .build()
        .fetch_all(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    Ok(rows.into_iter().map(map_user_row).collect())
}

#[tracing::instrument(name = "create user", skip_all, fields(username, email))]
pub async fn insert_user(
    pool: &PgPool,
    username: String,
    email: String,
    password: SecretString,
    roles: Vec<String>,
) -> Result<User, Error> {
    let password_hashed = spawn_blocking_with_tracing(move || ensure_password_hash(password))
        .await
        .context("compute password hash")
        .map_err(Error::Other)??;

    let row = sqlx::query(&format!(
        r#"
        INSERT INTO users
            (id, username, email, password, roles, version, created_at, updated_at)
        VALUES
            ($1, $2, $3, $4, $5, 1, $6, $6)
        RETURNING {};
    "#,
        USER_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(email)
    .bind(password_hashed)
    .bind(Json(roles))
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .map_err(map_unique_violation)?;

    Ok(map_user_row(row))
}

#[tracing::instrument(name = "update user", skip_all, fields(user_id = %user_id))]
pub async fn update_user(
    pool: &PgPool,
    user_id: Uuid,
    changes: UserChanges,
    expected_version: Option<i32>,
) -> Result<User, Error> {
    let password_hashed = match changes.password {
        Some(password) => Some(
            spawn_blocking_with_tracing(move || ensure_password_hash(password))
                .await
                .context("compute password hash")
                .map_err(Error::Other)??,
        ),
        None => None,
    };

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE users SET username = ");
    builder.push_bind(changes.username);
    builder.push(", email = ");
    builder.push_bind(changes.email);
    builder.push(", roles = ");
    builder.push_bind(Json(changes.roles));
    if let Some(password_hashed) = password_hashed {
        builder.push(", password = ");
        builder.push_bind(password_hashed);
    }
    builder.push(", version = version + 1, updated_at = ");
    builder.push_bind(Utc::now());
    builder.push(" WHERE id = ");
    builder.push_bind(user_id);
    if let Some(expected) = expected_version {
        builder.push(" AND version = ");
        builder.push_bind(expected);
    }
    builder.push(format!(" RETURNING {}", USER_COLUMNS));

    let row = builder
        .build()
        .fetch_optional(pool)
        .await
        .map_err(map_unique_violation)?;

    match row {
        Some(row) => Ok(map_user_row(row)),
        None => {
            if user_exists(pool, user_id).await? {
                Err(Error::Database(DatabaseError::StaleVersion))
            } else {
                Err(Error::Database(DatabaseError::NotFound))
            }
        }
    }
}

#[tracing::instrument(name = "delete user", skip_all, fields(user_id = %user_id))]
pub async fn delete_user(pool: &PgPool, user_id: Uuid) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1;")
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(|error| match &error {
            sqlx::Error::Database(db_error) if db_error.code().as_deref() == Some("23503") => {
                Error::Conflict("User still owns content".to_string())
            }
            _ => Error::Database(DatabaseError::DatabaseError(error)),
        })?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound));
    }

    Ok(())
}

#[tracing::instrument(name = "follow user", skip_all, fields(user_source = %follower_id, user_target = %followed_id))]
pub async fn add_user_follow(
    pool: &PgPool,
    follower_id: Uuid,
    followed_id: Uuid,
) -> Result<(), Error> {
    if !user_exists(pool, followed_id).await? {
        return Err(Error::Database(DatabaseError::NotFound));
    }

    sqlx::query(
        r#"
        INSERT INTO user_follows
            (user_source, user_target)
        VALUES
            ($1, $2)
        ON CONFLICT DO NOTHING;
    "#,
    )
    .bind(follower_id)
    .bind(followed_id)
    .execute(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(())
}

#[tracing::instrument(name = "unfollow user", skip_all, fields(user_source = %follower_id, user_target = %followed_id))]
pub async fn remove_user_follow(
    pool: &PgPool,
    follower_id: Uuid,
    followed_id: Uuid,
) -> Result<(), Error> {
    sqlx::query("DELETE FROM user_follows WHERE user_source = $1 AND user_target = $2;")
        .bind(follower_id)
        .bind(followed_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    Ok(())
}
