use std::borrow::Cow;
use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidateLength, ValidateUrl, ValidationError, ValidationErrors};

use crate::{
    db::chapter::{
        ChapterChanges, ChapterFilter, NewChapter, delete_chapter, get_chapter_by_id,
        get_chapters_with_pagination, insert_chapter, update_chapter,
    },
    error::Error,
    model::{Chapter, User, is_language_code},
    state::SharedAppState,
};

use super::Pagination;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChapterRequest {
    pub title: Option<String>,
    pub volume: Option<String>,
    pub chapter: Option<String>,
    #[serde(default)]
    pub pages: i32,
    pub translated_language: String,
    pub external_url: Option<String>,
    pub publish_at: Option<DateTime<Utc>>,
    pub readable_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_unavailable: bool,
    pub manga: Uuid,
    #[serde(default)]
    pub groups: Vec<Uuid>,
}

fn check_chapter_fields(
    errors: &mut ValidationErrors,
    title: &Option<String>,
    chapter: &Option<String>,
    pages: i32,
    translated_language: &str,
    external_url: &Option<String>,
) {
    if !title.validate_length(None, Some(255), None) {
        errors.add(
            "title",
            ValidationError::new("title_length")
                .with_message(Cow::from("Title length must be at most 255")),
        );
    }
    if !chapter.validate_length(None, Some(8), None) {
        errors.add(
            "chapter",
            ValidationError::new("chapter_length")
                .with_message(Cow::from("Chapter length must be at most 8")),
        );
    }
    if pages < 0 {
        errors.add(
            "pages",
            ValidationError::new("pages_range")
                .with_message(Cow::from("Pages must be zero or more")),
        );
    }
    if !is_language_code(translated_language) {
        errors.add(
            "translatedLanguage",
            ValidationError::new("translated_language_format")
                .with_message(Cow::from("Translated language must be a language code")),
        );
    }
    if let Some(external_url) = external_url {
        if !external_url.validate_url() || !external_url.validate_length(None, Some(512), None) {
            errors.add(
                "externalUrl",
                ValidationError::new("external_url_format")
                    .with_message(Cow::from("External url must be a url of at most 512")),
            );
        }
    }
}

impl Validate for CreateChapterRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        check_chapter_fields(
            &mut errors,
            &self.title,
            &self.chapter,
            self.pages,
            &self.translated_language,
            &self.external_url,
        );

        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChapterRequest {
    pub title: Option<String>,
    pub volume: Option<String>,
    pub chapter: Option<String>,
    pub pages: Option<i32>,
    pub translated_language: Option<String>,
    pub external_url: Option<String>,
    pub publish_at: Option<DateTime<Utc>>,
    pub readable_at: Option<DateTime<Utc>>,
    pub is_unavailable: Option<bool>,
    pub groups: Option<Vec<Uuid>>,
    pub version: Option<i32>,
}

impl Validate for UpdateChapterRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        check_chapter_fields(
            &mut errors,
            &self.title,
            &self.chapter,
            self.pages.unwrap_or(0),
            self.translated_language.as_deref().unwrap_or("en"),
            &self.external_url,
        );

        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(())
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ChapterListQuery {
    manga: Option<Uuid>,
    translated_language: Option<String>,
    uploader: Option<Uuid>,
    group: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct UrlPath {
    id: Uuid,
}

#[tracing::instrument(name = "[GET] chapters", skip_all)]
pub async fn index(
    State(app_state): State<SharedAppState>,
    Query(pagination): Query<Pagination>,
    Query(query): Query<ChapterListQuery>,
) -> Result<Json<Vec<Chapter>>, Error> {
    pagination.validate().map_err(Error::Validation)?;

    let filter = ChapterFilter {
        manga: query.manga,
        translated_language: query.translated_language,
        uploader: query.uploader,
        group: query.group,
    };

    let result = get_chapters_with_pagination(
        &app_state.pool,
        &filter,
        pagination.limit(),
        pagination.offset(),
    )
    .await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[GET] chapters/{id}", skip_all, fields(chapter_id = %path.id))]
pub async fn show(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
) -> Result<Json<Chapter>, Error> {
    let result = get_chapter_by_id(&app_state.pool, path.id).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[POST] chapters", skip_all)]
pub async fn store(
    State(app_state): State<SharedAppState>,
    Extension(user): Extension<Arc<User>>,
    Json(request): Json<CreateChapterRequest>,
) -> Result<(StatusCode, Json<Chapter>), Error> {
    request.validate().map_err(Error::Validation)?;

    let data = NewChapter {
        title: request.title,
        volume: request.volume,
        chapter: request.chapter,
        pages: request.pages,
        translated_language: request.translated_language,
        external_url: request.external_url,
        publish_at: request.publish_at,
        readable_at: request.readable_at,
        is_unavailable: request.is_unavailable,
        manga_id: request.manga,
        groups: request.groups,
    };

    let result = insert_chapter(&app_state.pool, user.id, data).await?;

    Ok((StatusCode::CREATED, Json(result)))
}

#[tracing::instrument(name = "[PUT] chapters/{id}", skip_all, fields(chapter_id = %path.id))]
pub async fn update(
    State(app_state): State<SharedAppState>,
    Extension(user): Extension<Arc<User>>,
    Path(path): Path<UrlPath>,
    Json(request): Json<UpdateChapterRequest>,
) -> Result<Json<Chapter>, Error> {
    request.validate().map_err(Error::Validation)?;

    let current = get_chapter_by_id(&app_state.pool, path.id).await?;
    if current.uploader != user.id && !user.is_admin() {
        return Err(Error::Forbidden);
    }

    let changes = ChapterChanges {
        title: request.title.or(current.title),
        volume: request.volume.or(current.volume),
        chapter: request.chapter.or(current.chapter),
        pages: request.pages.unwrap_or(current.pages),
        translated_language: request
            .translated_language
            .unwrap_or(current.translated_language),
        external_url: request.external_url.or(current.external_url),
        publish_at: request.publish_at.or(current.publish_at),
        readable_at: request.readable_at.or(current.readable_at),
        is_unavailable: request.is_unavailable.unwrap_or(current.is_unavailable),
        groups: request.groups.unwrap_or(current.groups),
    };

    let result = update_chapter(&app_state.pool, path.id, changes, request.version).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[DELETE] chapters/{id}", skip_all, fields(chapter_id = %path.id))]
pub async fn destroy(
    State(app_state): State<SharedAppState>,
    Extension(user): Extension<Arc<User>>,
    Path(path): Path<UrlPath>,
) -> Result<StatusCode, Error> {
    let current = get_chapter_by_id(&app_state.pool, path.id).await?;
    if current.uploader != user.id && !user.is_admin() {
        return Err(Error::Forbidden);
    }

    delete_chapter(&app_state.pool, path.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
