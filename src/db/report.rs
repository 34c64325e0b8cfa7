use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    error::Error,
    model::{Report, ReportStatus, ReportTargetKind},
};

use super::{error::DatabaseError, parse_stored};

const REPORT_COLUMNS: &str =
    "id, details, target_kind, object_id, status, creator_id, version, created_at, updated_at";

pub struct NewReport {
    pub details: String,
    pub target_kind: ReportTargetKind,
    pub object_id: Uuid,
}

pub struct ReportChanges {
    pub details: String,
    pub status: ReportStatus,
}

pub struct ReportFilter {
    pub status: Option<ReportStatus>,
    pub target_kind: Option<ReportTargetKind>,
    pub object_id: Option<Uuid>,
    pub creator: Option<Uuid>,
}

fn map_report_row(row: PgRow) -> Result<Report, Error> {
    Ok(Report {
        id: row.get("id"),
        details: row.get("details"),
        target_kind: parse_stored(row.get("target_kind"))?,
        object_id: row.get("object_id"),
        status: parse_stored(row.get("status"))?,
        creator: row.get("creator_id"),
        version: row.get("version"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[tracing::instrument(name = "get reports with pagination", skip_all)]
pub async fn get_reports_with_pagination(
    pool: &PgPool,
    filter: &ReportFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Report>, Error> {
    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT {} FROM report WHERE 1 = 1", REPORT_COLUMNS));

    if let Some(status) = &filter.status {
        builder.push(" AND status = ");
        builder.push_bind(status.as_str());
    }
    if let Some(target_kind) = &filter.target_kind {
        builder.push(" AND target_kind = ");
        builder.push_bind(target_kind.as_str());
    }
    if let Some(object_id) = filter.object_id {
        builder.push(" AND object_id = ");
        builder.push_bind(object_id);
    }
    if let Some(creator_id) = filter.creator {
        builder.push(" AND creator_id = ");
        builder.push_bind(creator_id);
    }

    builder.push(" ORDER BY created_at DESC LIMIT ");
    builder.push_bind(limit);
    builder.push(" OFFSET ");
    builder.push_bind(offset);

    let rows = builder
        .build()
        .fetch_all(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    rows.into_iter().map(map_report_row).collect()
}

#[tracing::instrument(name = "get report by id", skip_all, fields(report_id = %report_id))]
pub async fn get_report_by_id(pool: &PgPool, report_id: Uuid) -> Result<Report, Error> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM report WHERE id = $1;",
        REPORT_COLUMNS
    ))
    .bind(report_id)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    match row {
        Some(row) => map_report_row(row),
        None => Err(Error::Database(DatabaseError::NotFound)),
    }
}

#[tracing::instrument(name = "create report", skip_all, fields(object_id = %data.object_id))]
pub async fn insert_report(
    pool: &PgPool,
    creator_id: Uuid,
    data: NewReport,
) -> Result<Report, Error> {
    let row = sqlx::query(&format!(
        r#"
        INSERT INTO report
            (id, details, target_kind, object_id, status, creator_id, version, created_at,
             updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, 1, $7, $7)
        RETURNING {};
    "#,
        REPORT_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&data.details)
    .bind(data.target_kind.as_str())
    .bind(data.object_id)
    .bind(ReportStatus::Waiting.as_str())
    .bind(creator_id)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    map_report_row(row)
}

#[tracing::instrument(name = "update report", skip_all, fields(report_id = %report_id))]
pub async fn update_report(
    pool: &PgPool,
    report_id: Uuid,
    data: ReportChanges,
    expected_version: Option<i32>,
) -> Result<Report, Error> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE report SET details = ");
    builder.push_bind(data.details);
    builder.push(", status = ");
    builder.push_bind(data.status.as_str());
    builder.push(", version = version + 1, updated_at = ");
    builder.push_bind(Utc::now());
    builder.push(" WHERE id = ");
    builder.push_bind(report_id);
    if let Some(expected) = expected_version {
        builder.push(" AND version = ");
        builder.push_bind(expected);
    }
    builder.push(format!(" RETURNING {}", REPORT_COLUMNS));

    let row = builder
        .build()
        .fetch_optional(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    match row {
        Some(row) => map_report_row(row),
        None => {
            let exists = sqlx::query("SELECT 1 FROM report WHERE id = $1;")
                .bind(report_id)
                .fetch_optional(pool)
                .await
                .map_err(DatabaseError::DatabaseError)?;

            if exists.is_some() {
                Err(Error::Database(DatabaseError::StaleVersion))
            } else {
                Err(Error::Database(DatabaseError::NotFound))
            }
        }
    }
}

#[tracing::instrument(name = "delete report", skip_all, fields(report_id = %report_id))]
pub async fn delete_report(pool: &PgPool, report_id: Uuid) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM report WHERE id = $1;")
        .bind(report_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound));
    }

    Ok(())
}
