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
    db::report::{
        NewReport, ReportChanges, ReportFilter, delete_report, get_report_by_id,
        get_reports_with_pagination, insert_report, update_report,
    },
    error::Error,
    model::{Report, ReportStatus, ReportTargetKind, User},
    state::SharedAppState,
};

use super::Pagination;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    pub details: String,
    pub target_kind: ReportTargetKind,
    pub object_id: Uuid,
}

impl Validate for CreateReportRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.details.trim().is_empty() {
            errors.add(
                "details",
                ValidationError::new("details_blank")
                    .with_message(Cow::from("Details must not be blank")),
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
pub struct UpdateReportRequest {
    pub details: Option<String>,
    pub status: Option<ReportStatus>,
    pub version: Option<i32>,
}

impl Validate for UpdateReportRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(details) = &self.details {
            if details.trim().is_empty() {
                errors.add(
                    "details",
                    ValidationError::new("details_blank")
                        .with_message(Cow::from("Details must not be blank")),
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
pub struct ReportListQuery {
    status: Option<ReportStatus>,
    target_kind: Option<ReportTargetKind>,
    object_id: Option<Uuid>,
    creator: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct UrlPath {
    id: Uuid,
}

#[tracing::instrument(name = "[GET] reports", skip_all)]
pub async fn index(
    State(app_state): State<SharedAppState>,
    Query(pagination): Query<Pagination>,
    Query(query): Query<ReportListQuery>,
) -> Result<Json<Vec<Report>>, Error> {
    pagination.validate().map_err(Error::Validation)?;

    let filter = ReportFilter {
        status: query.status,
        target_kind: query.target_kind,
        object_id: query.object_id,
        creator: query.creator,
    };

    let result = get_reports_with_pagination(
        &app_state.pool,
        &filter,
        pagination.limit(),
        pagination.offset(),
    )
    .await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[GET] reports/{id}", skip_all, fields(report_id = %path.id))]
pub async fn show(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
) -> Result<Json<Report>, Error> {
    let result = get_report_by_id(&app_state.pool, path.id).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[POST] reports", skip_all)]
pub async fn store(
    State(app_state): State<SharedAppState>,
    Extension(user): Extension<Arc<User>>,
    Json(request): Json<CreateReportRequest>,
) -> Result<(StatusCode, Json<Report>), Error> {
    request.validate().map_err(Error::Validation)?;

    let data = NewReport {
        details: request.details,
        target_kind: request.target_kind,
        object_id: request.object_id,
    };

    let result = insert_report(&app_state.pool, user.id, data).await?;

    Ok((StatusCode::CREATED, Json(result)))
}

/// Reports move through their workflow under moderation, so changing one is
/// reserved for administrators.
#[tracing::instrument(name = "[PUT] reports/{id}", skip_all, fields(report_id = %path.id))]
pub async fn update(
    State(app_state): State<SharedAppState>,
    Extension(user): Extension<Arc<User>>,
    Path(path): Path<UrlPath>,
    Json(request): Json<UpdateReportRequest>,
) -> Result<Json<Report>, Error> {
    request.validate().map_err(Error::Validation)?;

    if !user.is_admin() {
        return Err(Error::Forbidden);
    }

    let current = get_report_by_id(&app_state.pool, path.id).await?;

    let changes = ReportChanges {
        details: request.details.unwrap_or(current.details),
        status: request.status.unwrap_or(current.status),
    };

    let result = update_report(&app_state.pool, path.id, changes, request.version).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[DELETE] reports/{id}", skip_all, fields(report_id = %path.id))]
pub async fn destroy(
    State(app_state): State<SharedAppState>,
    Extension(user): Extension<Arc<User>>,
    Path(path): Path<UrlPath>,
) -> Result<StatusCode, Error> {
    let current = get_report_by_id(&app_state.pool, path.id).await?;
    if current.creator != user.id && !user.is_admin() {
        return Err(Error::Forbidden);
    }

    delete_report(&app_state.pool, path.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
