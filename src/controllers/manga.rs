use std::borrow::Cow;
use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_option_number_from_string;
use uuid::Uuid;
use validator::{Validate, ValidateLength, ValidationError, ValidationErrors};

use crate::{
    db::manga::{
        MangaFilter, MangaSort, NewManga, SortOrder, add_manga_follower, delete_manga, draft_manga,
        get_featured_manga, get_manga_by_author, get_manga_by_id, get_manga_by_rating,
        get_manga_by_status, get_manga_by_tag, get_manga_statistics, get_manga_with_pagination,
        get_popular_manga, get_recent_manga, insert_manga, publish_manga, remove_manga_follower,
        search_manga, update_manga,
    },
    error::Error,
    model::{
        ContentRating, LocalizedMap, Manga, MangaState, MangaStatistics, MangaStatus,
        PublicationDemographic, User, is_language_code,
    },
    state::SharedAppState,
};

use super::{ListLimit, Pagination, check_localized_keys, check_localized_keys_optional};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMangaRequest {
    pub title: LocalizedMap,
    #[serde(default)]
    pub alt_titles: LocalizedMap,
    #[serde(default)]
    pub description: LocalizedMap,
    #[serde(default)]
    pub is_locked: bool,
    pub links: Option<LocalizedMap>,
    pub official_links: Option<LocalizedMap>,
    pub original_language: String,
    pub last_volume: Option<String>,
    pub last_chapter: Option<String>,
    pub publication_demographic: Option<PublicationDemographic>,
    pub status: MangaStatus,
    pub year: Option<i32>,
    pub content_rating: ContentRating,
    #[serde(default)]
    pub chapter_numbers_reset_on_new_volume: bool,
    pub state: Option<MangaState>,
    #[serde(default)]
    pub authors: Vec<Uuid>,
    #[serde(default)]
    pub artists: Vec<Uuid>,
    #[serde(default)]
    pub tags: Vec<Uuid>,
}

impl Validate for CreateMangaRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.title.is_empty() {
            errors.add(
                "title",
                ValidationError::new("title_empty")
                    .with_message(Cow::from("Title needs at least one translation")),
            );
        }
        check_localized_keys(&mut errors, "title", &self.title);
        check_localized_keys(&mut errors, "altTitles", &self.alt_titles);
        check_localized_keys(&mut errors, "description", &self.description);
        check_localized_keys_optional(&mut errors, "links", &self.links);
        check_localized_keys_optional(&mut errors, "officialLinks", &self.official_links);

        if !is_language_code(&self.original_language) {
            errors.add(
                "originalLanguage",
                ValidationError::new("original_language_format")
                    .with_message(Cow::from("Original language must be a language code")),
            );
        }
        if let Some(year) = self.year {
            if !(1..=9999).contains(&year) {
                errors.add(
                    "year",
                    ValidationError::new("year_range")
                        .with_message(Cow::from("Year must be between 1 and 9999")),
                );
            }
        }
        if !self.last_volume.validate_length(None, Some(255), None) {
            errors.add(
                "lastVolume",
                ValidationError::new("last_volume_length")
                    .with_message(Cow::from("Last volume length must be at most 255")),
            );
        }
        if !self.last_chapter.validate_length(None, Some(255), None) {
            errors.add(
                "lastChapter",
                ValidationError::new("last_chapter_length")
                    .with_message(Cow::from("Last chapter length must be at most 255")),
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
pub struct UpdateMangaRequest {
    pub title: Option<LocalizedMap>,
    pub alt_titles: Option<LocalizedMap>,
    pub description: Option<LocalizedMap>,
    pub is_locked: Option<bool>,
    pub links: Option<LocalizedMap>,
    pub official_links: Option<LocalizedMap>,
    pub original_language: Option<String>,
    pub last_volume: Option<String>,
    pub last_chapter: Option<String>,
    pub publication_demographic: Option<PublicationDemographic>,
    pub status: Option<MangaStatus>,
    pub year: Option<i32>,
    pub content_rating: Option<ContentRating>,
    pub chapter_numbers_reset_on_new_volume: Option<bool>,
    pub state: Option<MangaState>,
    pub authors: Option<Vec<Uuid>>,
    pub artists: Option<Vec<Uuid>>,
    pub tags: Option<Vec<Uuid>>,
    pub version: Option<i32>,
}

impl Validate for UpdateMangaRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(title) = &self.title {
            if title.is_empty() {
                errors.add(
                    "title",
                    ValidationError::new("title_empty")
                        .with_message(Cow::from("Title needs at least one translation")),
                );
            }
            check_localized_keys(&mut errors, "title", title);
        }
        check_localized_keys_optional(&mut errors, "altTitles", &self.alt_titles);
        check_localized_keys_optional(&mut errors, "description", &self.description);
        check_localized_keys_optional(&mut errors, "links", &self.links);
        check_localized_keys_optional(&mut errors, "officialLinks", &self.official_links);

        if let Some(original_language) = &self.original_language {
            if !is_language_code(original_language) {
                errors.add(
                    "originalLanguage",
                    ValidationError::new("original_language_format")
                        .with_message(Cow::from("Original language must be a language code")),
                );
            }
        }
        if let Some(year) = self.year {
            if !(1..=9999).contains(&year) {
                errors.add(
                    "year",
                    ValidationError::new("year_range")
                        .with_message(Cow::from("Year must be between 1 and 9999")),
                );
            }
        }

        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(())
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MangaListQuery {
    status: Option<MangaStatus>,
    content_rating: Option<ContentRating>,
    publication_demographic: Option<PublicationDemographic>,
    original_language: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    year: Option<i32>,
    state: Option<MangaState>,
    author: Option<Uuid>,
    artist: Option<Uuid>,
    tag: Option<Uuid>,
    sort: Option<String>,
    order: Option<String>,
}

fn parameter_error(field: &'static str, code: &'static str, message: String) -> Error {
    let mut errors = ValidationErrors::new();
    errors.add(field, ValidationError::new(code).with_message(Cow::from(message)));

    Error::Validation(errors)
}

impl MangaListQuery {
    fn into_filter(self) -> Result<MangaFilter, Error> {
        let sort = match self.sort {
            Some(value) => MangaSort::try_from(value)
                .map_err(|message| parameter_error("sort", "sort_field", message))?,
            None => MangaSort::CreatedAt,
        };
        let order = match self.order {
            Some(value) => SortOrder::try_from(value)
                .map_err(|message| parameter_error("order", "sort_order", message))?,
            None => SortOrder::Desc,
        };

        Ok(MangaFilter {
            status: self.status,
            content_rating: self.content_rating,
            publication_demographic: self.publication_demographic,
            original_language: self.original_language,
            year: self.year,
            state: self.state,
            author: self.author,
            artist: self.artist,
            tag: self.tag,
            sort,
            order,
        })
    }
}

#[derive(Deserialize)]
pub struct UrlPath {
    id: Uuid,
}

#[tracing::instrument(name = "[GET] manga", skip_all)]
pub async fn index(
    State(app_state): State<SharedAppState>,
    Query(pagination): Query<Pagination>,
    Query(query): Query<MangaListQuery>,
) -> Result<Json<Vec<Manga>>, Error> {
    pagination.validate().map_err(Error::Validation)?;
    let filter = query.into_filter()?;

    let result = get_manga_with_pagination(
        &app_state.pool,
        &filter,
        pagination.limit(),
        pagination.offset(),
    )
    .await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[GET] manga/{id}", skip_all, fields(manga_id = %path.id))]
pub async fn show(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
) -> Result<Json<Manga>, Error> {
    let result = get_manga_by_id(&app_state.pool, path.id).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[POST] manga", skip_all)]
pub async fn store(
    State(app_state): State<SharedAppState>,
    Json(request): Json<CreateMangaRequest>,
) -> Result<(StatusCode, Json<Manga>), Error> {
    request.validate().map_err(Error::Validation)?;

    let data = NewManga {
        title: request.title,
        alt_titles: request.alt_titles,
        description: request.description,
        is_locked: request.is_locked,
        links: request.links,
        official_links: request.official_links,
        original_language: request.original_language,
        last_volume: request.last_volume,
        last_chapter: request.last_chapter,
        publication_demographic: request.publication_demographic,
        status: request.status,
        year: request.year,
        content_rating: request.content_rating,
        chapter_numbers_reset_on_new_volume: request.chapter_numbers_reset_on_new_volume,
        state: request.state.unwrap_or(MangaState::Draft),
        authors: request.authors,
        artists: request.artists,
        tags: request.tags,
    };

    let result = insert_manga(&app_state.pool, data).await?;

    Ok((StatusCode::CREATED, Json(result)))
}

#[tracing::instrument(name = "[PUT] manga/{id}", skip_all, fields(manga_id = %path.id))]
pub async fn update(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
    Json(request): Json<UpdateMangaRequest>,
) -> Result<Json<Manga>, Error> {
    request.validate().map_err(Error::Validation)?;

    let current = get_manga_by_id(&app_state.pool, path.id).await?;
    let data = NewManga {
        title: request.title.unwrap_or(current.title),
        alt_titles: request.alt_titles.unwrap_or(current.alt_titles),
        description: request.description.unwrap_or(current.description),
        is_locked: request.is_locked.unwrap_or(current.is_locked),
        links: request.links.or(current.links),
        official_links: request.official_links.or(current.official_links),
        original_language: request.original_language.unwrap_or(current.original_language),
        last_volume: request.last_volume.or(current.last_volume),
        last_chapter: request.last_chapter.or(current.last_chapter),
        publication_demographic: request
            .publication_demographic
            .or(current.publication_demographic),
        status: request.status.unwrap_or(current.status),
        year: request.year.or(current.year),
        content_rating: request.content_rating.unwrap_or(current.content_rating),
        chapter_numbers_reset_on_new_volume: request
            .chapter_numbers_reset_on_new_volume
            .unwrap_or(current.chapter_numbers_reset_on_new_volume),
        state: request.state.unwrap_or(current.state),
        authors: request.authors.unwrap_or(current.authors),
        artists: request.artists.unwrap_or(current.artists),
        tags: request.tags.unwrap_or(current.tags),
    };

    let result = update_manga(&app_state.pool, path.id, data, request.version).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[DELETE] manga/{id}", skip_all, fields(manga_id = %path.id))]
pub async fn destroy(
    State(app_state): State<SharedAppState>,
    Extension(user): Extension<Arc<User>>,
    Path(path): Path<UrlPath>,
) -> Result<StatusCode, Error> {
    if !user.is_admin() {
        return Err(Error::Forbidden);
    }

    delete_manga(&app_state.pool, path.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(name = "[GET] manga/featured", skip_all)]
pub async fn featured(
    State(app_state): State<SharedAppState>,
) -> Result<Json<Vec<Manga>>, Error> {
    let result = get_featured_manga(&app_state.pool).await?;

    Ok(Json(result))
}

#[derive(Deserialize, Debug, Validate)]
pub struct SearchQuery {
    q: Option<String>,

    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    #[validate(range(min = 1, max = 100))]
    limit: Option<i64>,
}

#[tracing::instrument(name = "[GET] manga/search", skip_all)]
pub async fn search(
    State(app_state): State<SharedAppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Manga>>, Error> {
    query.validate().map_err(Error::Validation)?;

    let term = match query.q.as_deref() {
        Some(term) if !term.is_empty() => term,
        _ => return Ok(Json(vec![])),
    };

    let result = search_manga(&app_state.pool, term, query.limit.unwrap_or(20)).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[GET] manga/statistics", skip_all)]
pub async fn statistics(
    State(app_state): State<SharedAppState>,
) -> Result<Json<MangaStatistics>, Error> {
    let result = get_manga_statistics(&app_state.pool).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[GET] manga/recent", skip_all)]
pub async fn recent(
    State(app_state): State<SharedAppState>,
    Query(query): Query<ListLimit>,
) -> Result<Json<Vec<Manga>>, Error> {
    query.validate().map_err(Error::Validation)?;

    let result = get_recent_manga(&app_state.pool, query.limit()).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[GET] manga/popular", skip_all)]
pub async fn popular(
    State(app_state): State<SharedAppState>,
    Query(query): Query<ListLimit>,
) -> Result<Json<Vec<Manga>>, Error> {
    query.validate().map_err(Error::Validation)?;

    let result = get_popular_manga(&app_state.pool, query.limit()).await?;

    Ok(Json(result))
}

#[derive(Deserialize)]
pub struct StatusPath {
    status: MangaStatus,
}

#[tracing::instrument(name = "[GET] manga/by-status/{status}", skip_all)]
pub async fn by_status(
    State(app_state): State<SharedAppState>,
    Path(path): Path<StatusPath>,
    Query(query): Query<ListLimit>,
) -> Result<Json<Vec<Manga>>, Error> {
    query.validate().map_err(Error::Validation)?;

    let result = get_manga_by_status(&app_state.pool, path.status, query.limit()).await?;

    Ok(Json(result))
}

#[derive(Deserialize)]
pub struct RatingPath {
    rating: ContentRating,
}

#[tracing::instrument(name = "[GET] manga/by-rating/{rating}", skip_all)]
pub async fn by_rating(
    State(app_state): State<SharedAppState>,
    Path(path): Path<RatingPath>,
    Query(query): Query<ListLimit>,
) -> Result<Json<Vec<Manga>>, Error> {
    query.validate().map_err(Error::Validation)?;

    let result = get_manga_by_rating(&app_state.pool, path.rating, query.limit()).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[GET] manga/by-author/{id}", skip_all, fields(author_id = %path.id))]
pub async fn by_author(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
    Query(query): Query<ListLimit>,
) -> Result<Json<Vec<Manga>>, Error> {
    query.validate().map_err(Error::Validation)?;

    let result = get_manga_by_author(&app_state.pool, path.id, query.limit()).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[GET] manga/by-tag/{id}", skip_all, fields(tag_id = %path.id))]
pub async fn by_tag(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
    Query(query): Query<ListLimit>,
) -> Result<Json<Vec<Manga>>, Error> {
    query.validate().map_err(Error::Validation)?;

    let result = get_manga_by_tag(&app_state.pool, path.id, query.limit()).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[POST] manga/{id}/publish", skip_all, fields(manga_id = %path.id))]
pub async fn publish(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
) -> Result<Json<Manga>, Error> {
    let result = publish_manga(&app_state.pool, path.id).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[POST] manga/{id}/draft", skip_all, fields(manga_id = %path.id))]
pub async fn draft(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
) -> Result<Json<Manga>, Error> {
    let result = draft_manga(&app_state.pool, path.id).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[POST] manga/{id}/follow", skip_all, fields(manga_id = %path.id))]
pub async fn follow(
    State(app_state): State<SharedAppState>,
    Extension(user): Extension<Arc<User>>,
    Path(path): Path<UrlPath>,
) -> Result<StatusCode, Error> {
    add_manga_follower(&app_state.pool, path.id, user.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(name = "[DELETE] manga/{id}/follow", skip_all, fields(manga_id = %path.id))]
pub async fn unfollow(
    State(app_state): State<SharedAppState>,
    Extension(user): Extension<Arc<User>>,
    Path(path): Path<UrlPath>,
) -> Result<StatusCode, Error> {
    remove_manga_follower(&app_state.pool, path.id, user.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
