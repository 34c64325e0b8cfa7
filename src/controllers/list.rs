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
    db::list::{
        ListFilter, NewList, add_list_follower, add_list_manga, delete_list, get_list_by_id,
        get_lists_with_pagination, insert_list, remove_list_follower, remove_list_manga,
        update_list,
    },
    error::Error,
    model::{CustomList, ListVisibility, User},
    state::SharedAppState,
};

use super::Pagination;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListRequest {
    pub name: String,
    #[serde(default)]
    pub visibility: ListVisibility,
    #[serde(default)]
    pub manga: Vec<Uuid>,
}

impl Validate for CreateListRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !self.name.validate_length(Some(1), Some(255), None) {
            errors.add(
                "name",
                ValidationError::new("name_length")
                    .with_message(Cow::from("Name length must be between 1 and 255")),
            );
        }

        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListRequest {
    pub name: Option<String>,
    pub visibility: Option<ListVisibility>,
    pub manga: Option<Vec<Uuid>>,
    pub version: Option<i32>,
}

impl Validate for UpdateListRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !self.name.validate_length(Some(1), Some(255), None) {
            errors.add(
                "name",
                ValidationError::new("name_length")
                    .with_message(Cow::from("Name length must be between 1 and 255")),
            );
        }

        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(())
    }
}

#[derive(Deserialize, Debug)]
pub struct ListListQuery {
    visibility: Option<ListVisibility>,
}

#[derive(Deserialize)]
pub struct UrlPath {
    id: Uuid,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MangaPath {
    id: Uuid,
    manga_id: Uuid,
}

fn can_touch(list: &CustomList, user: &User) -> bool {
    list.owner == user.id || user.is_admin()
}

#[tracing::instrument(name = "[GET] lists", skip_all)]
pub async fn index(
    State(app_state): State<SharedAppState>,
    Extension(user): Extension<Arc<User>>,
    Query(pagination): Query<Pagination>,
    Query(query): Query<ListListQuery>,
) -> Result<Json<Vec<CustomList>>, Error> {
    pagination.validate().map_err(Error::Validation)?;

    let filter = ListFilter {
        visibility: query.visibility,
    };

    let result = get_lists_with_pagination(
        &app_state.pool,
        &filter,
        user.id,
        user.is_admin(),
        pagination.limit(),
        pagination.offset(),
    )
    .await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[GET] lists/{id}", skip_all, fields(list_id = %path.id))]
pub async fn show(
    State(app_state): State<SharedAppState>,
    Extension(user): Extension<Arc<User>>,
    Path(path): Path<UrlPath>,
) -> Result<Json<CustomList>, Error> {
    let result = get_list_by_id(&app_state.pool, path.id).await?;
    if result.visibility == ListVisibility::Private && !can_touch(&result, &user) {
        return Err(Error::Forbidden);
    }

    Ok(Json(result))
}

#[tracing::instrument(name = "[POST] lists", skip_all)]
pub async fn store(
    State(app_state): State<SharedAppState>,
    Extension(user): Extension<Arc<User>>,
    Json(request): Json<CreateListRequest>,
) -> Result<(StatusCode, Json<CustomList>), Error> {
    request.validate().map_err(Error::Validation)?;

    let data = NewList {
        name: request.name,
        visibility: request.visibility,
        manga: request.manga,
    };

    let result = insert_list(&app_state.pool, user.id, data).await?;

    Ok((StatusCode::CREATED, Json(result)))
}

#[tracing::instrument(name = "[PUT] lists/{id}", skip_all, fields(list_id = %path.id))]
pub async fn update(
    State(app_state): State<SharedAppState>,
    Extension(user): Extension<Arc<User>>,
    Path(path): Path<UrlPath>,
    Json(request): Json<UpdateListRequest>,
) -> Result<Json<CustomList>, Error> {
    request.validate().map_err(Error::Validation)?;

    let current = get_list_by_id(&app_state.pool, path.id).await?;
    if !can_touch(&current, &user) {
        return Err(Error::Forbidden);
    }

    let data = NewList {
        name: request.name.unwrap_or(current.name),
        visibility: request.visibility.unwrap_or(current.visibility),
        manga: request.manga.unwrap_or(current.manga),
    };

    let result = update_list(&app_state.pool, path.id, data, request.version).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[DELETE] lists/{id}", skip_all, fields(list_id = %path.id))]
pub async fn destroy(
    State(app_state): State<SharedAppState>,
    Extension(user): Extension<Arc<User>>,
    Path(path): Path<UrlPath>,
) -> Result<StatusCode, Error> {
    let current = get_list_by_id(&app_state.pool, path.id).await?;
    if !can_touch(&current, &user) {
        return Err(Error::Forbidden);
    }

    delete_list(&app_state.pool, path.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(
    name = "[POST] lists/{id}/manga/{manga_id}",
    skip_all,
    fields(list_id = %path.id, manga_id = %path.manga_id)
)]
pub async fn add_manga(
    State(app_state): State<SharedAppState>,
    Extension(user): Extension<Arc<User>>,
    Path(path): Path<MangaPath>,
) -> Result<StatusCode, Error> {
    let current = get_list_by_id(&app_state.pool, path.id).await?;
    if !can_touch(&current, &user) {
        return Err(Error::Forbidden);
    }

    add_list_manga(&app_state.pool, path.id, path.manga_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(
    name = "[DELETE] lists/{id}/manga/{manga_id}",
    skip_all,
    fields(list_id = %path.id, manga_id = %path.manga_id)
)]
pub async fn remove_manga(
    State(app_state): State<SharedAppState>,
    Extension(user): Extension<Arc<User>>,
    Path(path): Path<MangaPath>,
) -> Result<StatusCode, Error> {
    let current = get_list_by_id(&app_state.pool, path.id).await?;
    if !can_touch(&current, &user) {
        return Err(Error::Forbidden);
    }

    remove_list_manga(&app_state.pool, path.id, path.manga_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(name = "[POST] lists/{id}/follow", skip_all, fields(list_id = %path.id))]
pub async fn follow(
    State(app_state): State<SharedAppState>,
    Extension(user): Extension<Arc<User>>,
    Path(path): Path<UrlPath>,
) -> Result<StatusCode, Error> {
    add_list_follower(&app_state.pool, path.id, user.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(name = "[DELETE] lists/{id}/follow", skip_all, fields(list_id = %path.id))]
pub async fn unfollow(
    State(app_state): State<SharedAppState>,
    Extension(user): Extension<Arc<User>>,
    Path(path): Path<UrlPath>,
) -> Result<StatusCode, Error> {
    remove_list_follower(&app_state.pool, path.id, user.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
