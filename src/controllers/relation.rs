use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::relation::{
        NewRelation, RelationFilter, delete_relation, get_relation_by_id,
        get_relations_with_pagination, insert_relation, update_relation,
    },
    error::Error,
    model::{MangaRelation, RelationKind, User},
    state::SharedAppState,
};

use super::Pagination;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRelationRequest {
    pub relation: RelationKind,
    pub source_manga: Uuid,
    pub target_manga: Uuid,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRelationRequest {
    pub relation: Option<RelationKind>,
    pub source_manga: Option<Uuid>,
    pub target_manga: Option<Uuid>,
    pub version: Option<i32>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RelationListQuery {
    source_manga: Option<Uuid>,
    target_manga: Option<Uuid>,
    relation: Option<RelationKind>,
}

#[derive(Deserialize)]
pub struct UrlPath {
    id: Uuid,
}

#[tracing::instrument(name = "[GET] relations", skip_all)]
pub async fn index(
    State(app_state): State<SharedAppState>,
    Query(pagination): Query<Pagination>,
    Query(query): Query<RelationListQuery>,
) -> Result<Json<Vec<MangaRelation>>, Error> {
    pagination.validate().map_err(Error::Validation)?;

    let filter = RelationFilter {
        source_manga: query.source_manga,
        target_manga: query.target_manga,
        relation: query.relation,
    };

    let result = get_relations_with_pagination(
        &app_state.pool,
        &filter,
        pagination.limit(),
        pagination.offset(),
    )
    .await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[GET] relations/{id}", skip_all, fields(relation_id = %path.id))]
pub async fn show(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
) -> Result<Json<MangaRelation>, Error> {
    let result = get_relation_by_id(&app_state.pool, path.id).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[POST] relations", skip_all)]
pub async fn store(
    State(app_state): State<SharedAppState>,
    Json(request): Json<CreateRelationRequest>,
) -> Result<(StatusCode, Json<MangaRelation>), Error> {
    let data = NewRelation {
        relation: request.relation,
        source_manga_id: request.source_manga,
        target_manga_id: request.target_manga,
    };

    let result = insert_relation(&app_state.pool, data).await?;

    Ok((StatusCode::CREATED, Json(result)))
}

#[tracing::instrument(name = "[PUT] relations/{id}", skip_all, fields(relation_id = %path.id))]
pub async fn update(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
    Json(request): Json<UpdateRelationRequest>,
) -> Result<Json<MangaRelation>, Error> {
    let current = get_relation_by_id(&app_state.pool, path.id).await?;

    let data = NewRelation {
        relation: request.relation.unwrap_or(current.relation),
        source_manga_id: request.source_manga.unwrap_or(current.source_manga),
        target_manga_id: request.target_manga.unwrap_or(current.target_manga),
    };

    let result = update_relation(&app_state.pool, path.id, data, request.version).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[DELETE] relations/{id}", skip_all, fields(relation_id = %path.id))]
pub async fn destroy(
    State(app_state): State<SharedAppState>,
    Extension(user): Extension<Arc<User>>,
    Path(path): Path<UrlPath>,
) -> Result<StatusCode, Error> {
    if !user.is_admin() {
        return Err(Error::Forbidden);
    }

    delete_relation(&app_state.pool, path.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
