use std::borrow::Cow;
use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidateLength, ValidationError, ValidationErrors};

use crate::{
    db::cover::{
        CoverChanges, CoverFilter, NewCover, delete_cover, get_cover_by_id,
        get_covers_with_pagination, insert_cover, update_cover,
    },
    error::Error,
    model::{CoverArt, User, is_language_code},
    state::SharedAppState,
};

use super::Pagination;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCoverRequest {
    pub volume: Option<String>,
    pub file_name: String,
    pub locale: Option<String>,
    pub description: Option<String>,
    pub manga: Uuid,
}

fn check_cover_fields(
    errors: &mut ValidationErrors,
    locale: &Option<String>,
    description: &Option<String>,
) {
    if let Some(locale) = locale {
        if !is_language_code(locale) {
            errors.add(
                "locale",
                ValidationError::new("locale_format")
                    .with_message(Cow::from("Locale must be a language code")),
            );
        }
    }
    if !description.validate_length(None, Some(255), None) {
        errors.add(
            "description",
            ValidationError::new("description_length")
                .with_message(Cow::from("Description length must be at most 255")),
        );
    }
}

impl Validate for CreateCoverRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !self.file_name.validate_length(Some(1), Some(512), None) {
            errors.add(
                "fileName",
                ValidationError::new("file_name_length")
                    .with_message(Cow::from("File name length must be between 1 and 512")),
            );
        }
        check_cover_fields(&mut errors, &self.locale, &self.description);

        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCoverRequest {
    pub volume: Option<String>,
    pub file_name: Option<String>,
    pub locale: Option<String>,
    pub description: Option<String>,
    pub version: Option<i32>,
}

impl Validate for UpdateCoverRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !self.file_name.validate_length(Some(1), Some(512), None) {
            errors.add(
                "fileName",
                ValidationError::new("file_name_length")
                    .with_message(Cow::from("File name length must be between 1 and 512")),
            );
        }
        check_cover_fields(&mut errors, &self.locale, &self.description);

        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(())
    }
}

#[derive(Deserialize, Debug)]
pub struct CoverListQuery {
    manga: Option<Uuid>,
    uploader: Option<Uuid>,
    locale: Option<String>,
}

#[derive(Deserialize)]
pub struct UrlPath {
    id: Uuid,
}

#[tracing::instrument(name = "[GET] covers", skip_all)]
pub async fn index(
    State(app_state): State<SharedAppState>,
    Query(pagination): Query<Pagination>,
    Query(query): Query<CoverListQuery>,
) -> Result<Json<Vec<CoverArt>>, Error> {
    pagination.validate().map_err(Error::Validation)?;

    let filter = CoverFilter {
        manga: query.manga,
        uploader: query.uploader,
        locale: query.locale,
    };

    let result = get_covers_with_pagination(
        &app_state.pool,
        &filter,
        pagination.limit(),
        pagination.offset(),
    )
    .await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[GET] covers/{id}", skip_all, fields(cover_id = %path.id))]
pub async fn show(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
) -> Result<Json<CoverArt>, Error> {
    let result = get_cover_by_id(&app_state.pool, path.id).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[POST] covers", skip_all)]
pub async fn store(
    State(app_state): State<SharedAppState>,
    Extension(user): Extension<Arc<User>>,
    Json(request): Json<CreateCoverRequest>,
) -> Result<(StatusCode, Json<CoverArt>), Error> {
    request.validate().map_err(Error::Validation)?;

    let data = NewCover {
        volume: request.volume,
        file_name: request.file_name,
        locale: request.locale,
        description: request.description,
        manga_id: request.manga,
    };

    let result = insert_cover(&app_state.pool, user.id, data).await?;

    Ok((StatusCode::CREATED, Json(result)))
}

#[tracing::instrument(name = "[PUT] covers/{id}", skip_all, fields(cover_id = %path.id))]
pub async fn update(
    State(app_state): State<SharedAppState>,
    Extension(user): Extension<Arc<User>>,
    Path(path): Path<UrlPath>,
    Json(request): Json<UpdateCoverRequest>,
) -> Result<Json<CoverArt>, Error> {
    request.validate().map_err(Error::Validation)?;

    let current = get_cover_by_id(&app_state.pool, path.id).await?;
    if current.uploader != user.id && !user.is_admin() {
        return Err(Error::Forbidden);
    }

    let changes = CoverChanges {
        volume: request.volume.or(current.volume),
        file_name: request.file_name.unwrap_or(current.file_name),
        locale: request.locale.or(current.locale),
        description: request.description.or(current.description),
    };

    let result = update_cover(&app_state.pool, path.id, changes, request.version).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[DELETE] covers/{id}", skip_all, fields(cover_id = %path.id))]
pub async fn destroy(
    State(app_state): State<SharedAppState>,
    Extension(user): Extension<Arc<User>>,
    Path(path): Path<UrlPath>,
) -> Result<StatusCode, Error> {
    let current = get_cover_by_id(&app_state.pool, path.id).await?;
    if current.uploader != user.id && !user.is_admin() {
        return Err(Error::Forbidden);
    }

    delete_cover(&app_state.pool, path.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
