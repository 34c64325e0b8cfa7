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
    db::author::{
        AuthorFilter, NewAuthor, delete_author, get_author_by_id, get_authors_with_pagination,
        insert_author, update_author,
    },
    error::Error,
    model::{Author, LocalizedMap, User},
    state::SharedAppState,
};

use super::{Pagination, check_localized_keys, check_localized_keys_optional};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuthorRequest {
    pub name: LocalizedMap,
    pub image_url: Option<LocalizedMap>,
    pub biography: Option<LocalizedMap>,
    pub twitter: Option<LocalizedMap>,
    pub pixiv: Option<LocalizedMap>,
    pub melon_book: Option<LocalizedMap>,
    pub fan_box: Option<LocalizedMap>,
    pub booth: Option<LocalizedMap>,
    pub nico_video: Option<LocalizedMap>,
    pub skeb: Option<LocalizedMap>,
    pub fantia: Option<LocalizedMap>,
    pub tumblr: Option<LocalizedMap>,
    pub youtube: Option<LocalizedMap>,
    pub weibo: Option<LocalizedMap>,
    pub naver: Option<LocalizedMap>,
    pub website: Option<LocalizedMap>,
}

fn check_author_links(
    errors: &mut ValidationErrors,
    links: [(&'static str, &Option<LocalizedMap>); 15],
) {
    for (field, map) in links {
        check_localized_keys_optional(errors, field, map);
    }
}

impl CreateAuthorRequest {
    fn links(&self) -> [(&'static str, &Option<LocalizedMap>); 15] {
        [
            ("imageUrl", &self.image_url),
            ("biography", &self.biography),
            ("twitter", &self.twitter),
            ("pixiv", &self.pixiv),
            ("melonBook", &self.melon_book),
            ("fanBox", &self.fan_box),
            ("booth", &self.booth),
            ("nicoVideo", &self.nico_video),
            ("skeb", &self.skeb),
            ("fantia", &self.fantia),
            ("tumblr", &self.tumblr),
            ("youtube", &self.youtube),
            ("weibo", &self.weibo),
            ("naver", &self.naver),
            ("website", &self.website),
        ]
    }
}

impl Validate for CreateAuthorRequest {
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
        check_author_links(&mut errors, self.links());

        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAuthorRequest {
    pub name: Option<LocalizedMap>,
    pub image_url: Option<LocalizedMap>,
    pub biography: Option<LocalizedMap>,
    pub twitter: Option<LocalizedMap>,
    pub pixiv: Option<LocalizedMap>,
    pub melon_book: Option<LocalizedMap>,
    pub fan_box: Option<LocalizedMap>,
    pub booth: Option<LocalizedMap>,
    pub nico_video: Option<LocalizedMap>,
    pub skeb: Option<LocalizedMap>,
    pub fantia: Option<LocalizedMap>,
    pub tumblr: Option<LocalizedMap>,
    pub youtube: Option<LocalizedMap>,
    pub weibo: Option<LocalizedMap>,
    pub naver: Option<LocalizedMap>,
    pub website: Option<LocalizedMap>,
    pub version: Option<i32>,
}

impl UpdateAuthorRequest {
    fn links(&self) -> [(&'static str, &Option<LocalizedMap>); 15] {
        [
            ("imageUrl", &self.image_url),
            ("biography", &self.biography),
            ("twitter", &self.twitter),
            ("pixiv", &self.pixiv),
            ("melonBook", &self.melon_book),
            ("fanBox", &self.fan_box),
            ("booth", &self.booth),
            ("nicoVideo", &self.nico_video),
            ("skeb", &self.skeb),
            ("fantia", &self.fantia),
            ("tumblr", &self.tumblr),
            ("youtube", &self.youtube),
            ("weibo", &self.weibo),
            ("naver", &self.naver),
            ("website", &self.website),
        ]
    }
}

impl Validate for UpdateAuthorRequest {
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
        check_author_links(&mut errors, self.links());

        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(())
    }
}

#[derive(Deserialize, Debug)]
pub struct AuthorListQuery {
    name: Option<String>,
}

#[derive(Deserialize)]
pub struct UrlPath {
    id: Uuid,
}

#[tracing::instrument(name = "[GET] authors", skip_all)]
pub async fn index(
    State(app_state): State<SharedAppState>,
    Query(pagination): Query<Pagination>,
    Query(query): Query<AuthorListQuery>,
) -> Result<Json<Vec<Author>>, Error> {
    pagination.validate().map_err(Error::Validation)?;

    let filter = AuthorFilter { name: query.name };

    let result = get_authors_with_pagination(
        &app_state.pool,
        &filter,
        pagination.limit(),
        pagination.offset(),
    )
    .await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[GET] authors/{id}", skip_all, fields(author_id = %path.id))]
pub async fn show(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
) -> Result<Json<Author>, Error> {
    let result = get_author_by_id(&app_state.pool, path.id).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[POST] authors", skip_all)]
pub async fn store(
    State(app_state): State<SharedAppState>,
    Json(request): Json<CreateAuthorRequest>,
) -> Result<(StatusCode, Json<Author>), Error> {
    request.validate().map_err(Error::Validation)?;

    let data = NewAuthor {
        name: request.name,
        image_url: request.image_url,
        biography: request.biography,
        twitter: request.twitter,
        pixiv: request.pixiv,
        melon_book: request.melon_book,
        fan_box: request.fan_box,
        booth: request.booth,
        nico_video: request.nico_video,
        skeb: request.skeb,
        fantia: request.fantia,
        tumblr: request.tumblr,
        youtube: request.youtube,
        weibo: request.weibo,
        naver: request.naver,
        website: request.website,
    };

    let result = insert_author(&app_state.pool, data).await?;

    Ok((StatusCode::CREATED, Json(result)))
}

#[tracing::instrument(name = "[PUT] authors/{id}", skip_all, fields(author_id = %path.id))]
pub async fn update(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
    Json(request): Json<UpdateAuthorRequest>,
) -> Result<Json<Author>, Error> {
    request.validate().map_err(Error::Validation)?;

    let current = get_author_by_id(&app_state.pool, path.id).await?;

    let data = NewAuthor {
        name: request.name.unwrap_or(current.name),
        image_url: request.image_url.or(current.image_url),
        biography: request.biography.or(current.biography),
        twitter: request.twitter.or(current.twitter),
        pixiv: request.pixiv.or(current.pixiv),
        melon_book: request.melon_book.or(current.melon_book),
        fan_box: request.fan_box.or(current.fan_box),
        booth: request.booth.or(current.booth),
        nico_video: request.nico_video.or(current.nico_video),
        skeb: request.skeb.or(current.skeb),
        fantia: request.fantia.or(current.fantia),
        tumblr: request.tumblr.or(current.tumblr),
        youtube: request.youtube.or(current.youtube),
        weibo: request.weibo.or(current.weibo),
        naver: request.naver.or(current.naver),
        website: request.website.or(current.website),
    };

    let result = update_author(&app_state.pool, path.id, data, request.version).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[DELETE] authors/{id}", skip_all, fields(author_id = %path.id))]
pub async fn destroy(
    State(app_state): State<SharedAppState>,
    Extension(user): Extension<Arc<User>>,
    Path(path): Path<UrlPath>,
) -> Result<StatusCode, Error> {
    if !user.is_admin() {
        return Err(Error::Forbidden);
    }

    delete_author(&app_state.pool, path.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
