use std::borrow::Cow;
use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    db::tag::{
        NewTag, TagFilter, delete_tag, get_tag_by_id, get_tags_with_pagination, insert_tag,
        update_tag,
    },
    error::Error,
    model::{LocalizedMap, Tag, TagGroup, User},
    state::SharedAppState,
};

use super::{Pagination, check_localized_keys, check_localized_keys_optional};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTagRequest {
    pub name: LocalizedMap,
    pub description: Option<LocalizedMap>,
    pub tag_group: TagGroup,
}

impl Validate for CreateTagRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.name.is_empty() {
            errors.add(
                "name",
                ValidationError::new("name_empty")
                    .with_message(Cow::from("Name must carry at least one translation")),
            );
        }
        check_localized_keys(&mut errors, "name", &self.name);
        check_localized_keys_optional(&mut errors, "description", &self.description);

        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTagRequest {
    pub name: Option<LocalizedMap>,
    pub description: Option<LocalizedMap>,
    pub tag_group: Option<TagGroup>,
    pub version: Option<i32>,
}

impl Validate for UpdateTagRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(name) = &self.name {
            if name.is_empty() {
                errors.add(
                    "name",
                    ValidationError::new("name_empty")
                        .with_message(Cow::from("Name must carry at least one translation")),
                );
            }
            check_localized_keys(&mut errors, "name", name);
        }
        check_localized_keys_optional(&mut errors, "description", &self.description);

        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(())
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TagListQuery {
    name: Option<String>,
    tag_group: Option<TagGroup>,
}

#[derive(Deserialize)]
pub struct UrlPath {
    id: Uuid,
}

#[tracing::instrument(name = "[GET] tags", skip_all)]
pub async fn index(
    State(app_state): State<SharedAppState>,
    Query(pagination): Query<Pagination>,
    Query(query): Query<TagListQuery>,
) -> Result<Json<Vec<Tag>>, Error> {
    pagination.validate().map_err(Error::Validation)?;

    let filter = TagFilter {
        name: query.name,
        tag_group: query.tag_group,
    };

    let result = get_tags_with_pagination(
        &app_state.pool,
        &filter,
        pagination.limit(),
        pagination.offset(),
    )
    .await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[GET] tags/{id}", skip_all, fields(tag_id = %path.id))]
pub async fn show(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
) -> Result<Json<Tag>, Error> {
    let result = get_tag_by_id(&app_state.pool, path.id).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[POST] tags", skip_all)]
pub async fn store(
    State(app_state): State<SharedAppState>,
    Json(request): Json<CreateTagRequest>,
) -> Result<(StatusCode, Json<Tag>), Error> {
    request.validate().map_err(Error::Validation)?;

    let data = NewTag {
        name: request.name,
        description: request.description,
        tag_group: request.tag_group,
    };

    let result = insert_tag(&app_state.pool, data).await?;

    Ok((StatusCode::CREATED, Json(result)))
}

#[tracing::instrument(name = "[PUT] tags/{id}", skip_all, fields(tag_id = %path.id))]
pub async fn update(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
    Json(request): Json<UpdateTagRequest>,
) -> Result<Json<Tag>, Error> {
    request.validate().map_err(Error::Validation)?;

    let current = get_tag_by_id(&app_state.pool, path.id).await?;

    let data = NewTag {
        name: request.name.unwrap_or(current.name),
        description: request.description.or(Some(current.description)),
        tag_group: request.tag_group.unwrap_or(current.tag_group),
    };

    let result = update_tag(&app_state.pool, path.id, data, request.version).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[DELETE] tags/{id}", skip_all, fields(tag_id = %path.id))]
pub async fn destroy(
    State(app_state): State<SharedAppState>,
    Extension(user): Extension<Arc<User>>,
    Path(path): Path<UrlPath>,
) -> Result<StatusCode, Error> {
    if !user.is_admin() {
        return Err(Error::Forbidden);
    }

    delete_tag(&app_state.pool, path.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
