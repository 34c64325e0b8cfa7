use std::borrow::Cow;
use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidateRange, ValidationError, ValidationErrors};

use crate::{
    db::recommendation::{
        NewRecommendation, RecommendationFilter, delete_recommendation, get_recommendation_by_id,
        get_recommendations_with_pagination, insert_recommendation, update_recommendation,
    },
    error::Error,
    model::{MangaRecommendation, User},
    state::SharedAppState,
};

use super::Pagination;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecommendationRequest {
    pub score: f64,
    pub manga: Uuid,
    pub recommended_manga: Uuid,
}

fn check_score(errors: &mut ValidationErrors, score: f64) {
    if !score.validate_range(Some(0.0), Some(1.0), None, None) {
        errors.add(
            "score",
            ValidationError::new("score_range")
                .with_message(Cow::from("Score must be between 0 and 1")),
        );
    }
}

impl Validate for CreateRecommendationRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        check_score(&mut errors, self.score);

        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecommendationRequest {
    pub score: Option<f64>,
    pub manga: Option<Uuid>,
    pub recommended_manga: Option<Uuid>,
    pub version: Option<i32>,
}

impl Validate for UpdateRecommendationRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(score) = self.score {
            check_score(&mut errors, score);
        }

        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(())
    }
}

#[derive(Deserialize, Debug)]
pub struct RecommendationListQuery {
    manga: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct UrlPath {
    id: Uuid,
}

#[tracing::instrument(name = "[GET] recommendations", skip_all)]
pub async fn index(
    State(app_state): State<SharedAppState>,
    Query(pagination): Query<Pagination>,
    Query(query): Query<RecommendationListQuery>,
) -> Result<Json<Vec<MangaRecommendation>>, Error> {
    pagination.validate().map_err(Error::Validation)?;

    let filter = RecommendationFilter { manga: query.manga };

    let result = get_recommendations_with_pagination(
        &app_state.pool,
        &filter,
        pagination.limit(),
        pagination.offset(),
    )
    .await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[GET] recommendations/{id}", skip_all, fields(recommendation_id = %path.id))]
pub async fn show(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
) -> Result<Json<MangaRecommendation>, Error> {
    let result = get_recommendation_by_id(&app_state.pool, path.id).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[POST] recommendations", skip_all)]
pub async fn store(
    State(app_state): State<SharedAppState>,
    Json(request): Json<CreateRecommendationRequest>,
) -> Result<(StatusCode, Json<MangaRecommendation>), Error> {
    request.validate().map_err(Error::Validation)?;

    let data = NewRecommendation {
        score: request.score,
        manga_id: request.manga,
        recommended_manga_id: request.recommended_manga,
    };

    let result = insert_recommendation(&app_state.pool, data).await?;

    Ok((StatusCode::CREATED, Json(result)))
}

#[tracing::instrument(name = "[PUT] recommendations/{id}", skip_all, fields(recommendation_id = %path.id))]
pub async fn update(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
    Json(request): Json<UpdateRecommendationRequest>,
) -> Result<Json<MangaRecommendation>, Error> {
    request.validate().map_err(Error::Validation)?;

    let current = get_recommendation_by_id(&app_state.pool, path.id).await?;

    let data = NewRecommendation {
        score: request.score.unwrap_or(current.score),
        manga_id: request.manga.unwrap_or(current.manga),
        recommended_manga_id: request.recommended_manga.unwrap_or(current.recommended_manga),
    };

    let result = update_recommendation(&app_state.pool, path.id, data, request.version).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[DELETE] recommendations/{id}", skip_all, fields(recommendation_id = %path.id))]
pub async fn destroy(
    State(app_state): State<SharedAppState>,
    Extension(user): Extension<Arc<User>>,
    Path(path): Path<UrlPath>,
) -> Result<StatusCode, Error> {
    if !user.is_admin() {
        return Err(Error::Forbidden);
    }

    delete_recommendation(&app_state.pool, path.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
