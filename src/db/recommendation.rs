use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{error::Error, model::MangaRecommendation};

use super::{error::DatabaseError, map_fk_violation};

const RECOMMENDATION_COLUMNS: &str =
    "id, score, manga_id, recommended_manga_id, version, created_at, updated_at";

pub struct NewRecommendation {
    pub score: f64,
    pub manga_id: Uuid,
    pub recommended_manga_id: Uuid,
}

pub struct RecommendationFilter {
    pub manga: Option<Uuid>,
}

fn map_recommendation_row(row: PgRow) -> MangaRecommendation {
    MangaRecommendation {
        id: row.get("id"),
        score: row.get("score"),
        manga: row.get("manga_id"),
        recommended_manga: row.get("recommended_manga_id"),
        version: row.get("version"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[tracing::instrument(name = "get recommendations with pagination", skip_all)]
pub async fn get_recommendations_with_pagination(
    pool: &PgPool,
    filter: &RecommendationFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<MangaRecommendation>, Error> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
        "SELECT {} FROM manga_recommendation WHERE 1 = 1",
        RECOMMENDATION_COLUMNS
    ));

    if let Some(manga_id) = filter.manga {
        builder.push(" AND manga_id = ");
        builder.push_bind(manga_id);
    }

    builder.push(" ORDER BY score DESC, created_at DESC LIMIT ");
    builder.push_bind(limit);
    builder.push(" OFFSET ");
    builder.push_bind(offset);

    let rows = builder
        .build()
        .fetch_all(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    Ok(rows.into_iter().map(map_recommendation_row).collect())
}

#[tracing::instrument(name = "get recommendation by id", skip_all, fields(recommendation_id = %recommendation_id))]
pub async fn get_recommendation_by_id(
    pool: &PgPool,
    recommendation_id: Uuid,
) -> Result<MangaRecommendation, Error> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM manga_recommendation WHERE id = $1;",
        RECOMMENDATION_COLUMNS
    ))
    .bind(recommendation_id)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    match row {
        Some(row) => Ok(map_recommendation_row(row)),
        None => Err(Error::Database(DatabaseError::NotFound)),
    }
}

#[tracing::instrument(name = "create recommendation", skip_all, fields(manga_id = %data.manga_id))]
pub async fn insert_recommendation(
    pool: &PgPool,
    data: NewRecommendation,
) -> Result<MangaRecommendation, Error> {
    let row = sqlx::query(&format!(
        r#"
        INSERT INTO manga_recommendation
            (id, score, manga_id, recommended_manga_id, version, created_at, updated_at)
        VALUES ($1, $2, $3, $4, 1, $5, $5)
        RETURNING {};
    "#,
        RECOMMENDATION_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(data.score)
    .bind(data.manga_id)
    .bind(data.recommended_manga_id)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .map_err(map_fk_violation)?;

    Ok(map_recommendation_row(row))
}

#[tracing::instrument(name = "update recommendation", skip_all, fields(recommendation_id = %recommendation_id))]
pub async fn update_recommendation(
    pool: &PgPool,
    recommendation_id: Uuid,
    data: NewRecommendation,
    expected_version: Option<i32>,
) -> Result<MangaRecommendation, Error> {
    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new("UPDATE manga_recommendation SET score = ");
    builder.push_bind(data.score);
    builder.push(", manga_id = ");
    builder.push_bind(data.manga_id);
    builder.push(", recommended_manga_id = ");
    builder.push_bind(data.recommended_manga_id);
    builder.push(", version = version + 1, updated_at = ");
    builder.push_bind(Utc::now());
    builder.push(" WHERE id = ");
    builder.push_bind(recommendation_id);
    if let Some(expected) = expected_version {
        builder.push(" AND version = ");
        builder.push_bind(expected);
    }
    builder.push(format!(" RETURNING {}", RECOMMENDATION_COLUMNS));

    let row = builder
        .build()
        .fetch_optional(pool)
        .await
        .map_err(map_fk_violation)?;

    match row {
        Some(row) => Ok(map_recommendation_row(row)),
        None => {
            let exists = sqlx::query("SELECT 1 FROM manga_recommendation WHERE id = $1;")
                .bind(recommendation_id)
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

#[tracing::instrument(name = "delete recommendation", skip_all, fields(recommendation_id = %recommendation_id))]
pub async fn delete_recommendation(pool: &PgPool, recommendation_id: Uuid) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM manga_recommendation WHERE id = $1;")
        .bind(recommendation_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound));
    }

    Ok(())
}
