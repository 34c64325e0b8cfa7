use std::sync::Arc;

use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{error::Error, model::User};

/// The caller's own record. The only read that carries the email.
#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[tracing::instrument(name = "[GET] me", skip_all)]
pub async fn index(Extension(user): Extension<Arc<User>>) -> Result<Json<MeResponse>, Error> {
    Ok(Json(MeResponse {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        roles: user.effective_roles(),
        version: user.version,
        created_at: user.created_at,
        updated_at: user.updated_at,
    }))
}
