use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{error::Error, model::CoverArt};

use super::{error::DatabaseError, map_fk_violation};

const COVER_COLUMNS: &str =
    "id, volume, file_name, locale, description, manga_id, uploader_id, version, created_at, \
    updated_at";

pub struct NewCover {
    pub volume: Option<String>,
    pub file_name: String,
    pub locale: Option<String>,
    pub description: Option<String>,
    pub manga_id: Uuid,
}

pub struct CoverChanges {
    pub volume: Option<String>,
    pub file_name: String,
    pub locale: Option<String>,
    pub description: Option<String>,
}

pub struct CoverFilter {
    pub manga: Option<Uuid>,
    pub uploader: Option<Uuid>,
    pub locale: Option<String>,
}

fn map_cover_row(row: PgRow) -> CoverArt {
    CoverArt {
        id: row.get("id"),
        volume: row.get("volume"),
        file_name: row.get("file_name"),
        locale: row.get("locale"),
        description: row.get("description"),
        manga: row.get("manga_id"),
        uploader: row.get("uploader_id"),
        version: row.get("version"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[tracing::instrument(name = "get covers with pagination", skip_all)]
pub async fn get_covers_with_pagination(
    pool: &PgPool,
    filter: &CoverFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<CoverArt>, Error> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
        "SELECT {} FROM cover_art WHERE 1 = 1",
        COVER_COLUMNS
    ));

    if let Some(manga_id) = filter.manga {
        builder.push(" AND manga_id = ");
        builder.push_bind(manga_id);
    }
    if let Some(uploader_id) = filter.uploader {
        builder.push(" AND uploader_id = ");
        builder.push_bind(uploader_id);
    }
    if let Some(locale) = &filter.locale {
        builder.push(" AND locale = ");
        builder.push_bind(locale);
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

    Ok(rows.into_iter().map(map_cover_row).collect())
}

#[tracing::instrument(name = "get cover by id", skip_all, fields(cover_id = %cover_id))]
pub async fn get_cover_by_id(pool: &PgPool, cover_id: Uuid) -> Result<CoverArt, Error> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM cover_art WHERE id = $1;",
        COVER_COLUMNS
    ))
    .bind(cover_id)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    match row {
        Some(row) => Ok(map_cover_row(row)),
        None => Err(Error::Database(DatabaseError::NotFound)),
    }
}

#[tracing::instrument(name = "create cover", skip_all, fields(manga_id = %data.manga_id))]
pub async fn insert_cover(
    pool: &PgPool,
    uploader_id: Uuid,
    data: NewCover,
) -> Result<CoverArt, Error> {
    let row = sqlx::query(&format!(
        r#"
        INSERT INTO cover_art
            (id, volume, file_name, locale, description, manga_id, uploader_id, version,
             created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, 1, $8, $8)
        RETURNING {};
    "#,
        COVER_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&data.volume)
    .bind(&data.file_name)
    .bind(&data.locale)
    .bind(&data.description)
    .bind(data.manga_id)
    .bind(uploader_id)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .map_err(map_fk_violation)?;

    Ok(map_cover_row(row))
}

#[tracing::instrument(name = "update cover", skip_all, fields(cover_id = %cover_id))]
pub async fn update_cover(
    pool: &PgPool,
    cover_id: Uuid,
    data: CoverChanges,
    expected_version: Option<i32>,
) -> Result<CoverArt, Error> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE cover_art SET volume = ");
    builder.push_bind(data.volume);
    builder.push(", file_name = ");
    builder.push_bind(data.file_name);
    builder.push(", locale = ");
    builder.push_bind(data.locale);
    builder.push(", description = ");
    builder.push_bind(data.description);
    builder.push(", version = version + 1, updated_at = ");
    builder.push_bind(Utc::now());
    builder.push(" WHERE id = ");
    builder.push_bind(cover_id);
    if let Some(expected) = expected_version {
        builder.push(" AND version = ");
        builder.push_bind(expected);
    }
    builder.push(format!(" RETURNING {}", COVER_COLUMNS));

    let row = builder
        .build()
        .fetch_optional(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    match row {
        Some(row) => Ok(map_cover_row(row)),
        None => {
            let exists = sqlx::query("SELECT 1 FROM cover_art WHERE id = $1;")
                .bind(cover_id)
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

#[tracing::instrument(name = "delete cover", skip_all, fields(cover_id = %cover_id))]
pub async fn delete_cover(pool: &PgPool, cover_id: Uuid) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM cover_art WHERE id = $1;")
        .bind(cover_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound));
    }

    Ok(())
}
