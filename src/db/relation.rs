use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    error::Error,
    model::{MangaRelation, RelationKind},
};

use super::{error::DatabaseError, map_fk_violation, parse_stored};

const RELATION_COLUMNS: &str =
    "id, relation, source_manga_id, target_manga_id, version, created_at, updated_at";

pub struct NewRelation {
    pub relation: RelationKind,
    pub source_manga_id: Uuid,
    pub target_manga_id: Uuid,
}

pub struct RelationFilter {
    pub source_manga: Option<Uuid>,
    pub target_manga: Option<Uuid>,
    pub relation: Option<RelationKind>,
}

fn map_relation_row(row: PgRow) -> Result<MangaRelation, Error> {
    Ok(MangaRelation {
        id: row.get("id"),
        relation: parse_stored(row.get("relation"))?,
        source_manga: row.get("source_manga_id"),
        target_manga: row.get("target_manga_id"),
        version: row.get("version"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[tracing::instrument(name = "get relations with pagination", skip_all)]
pub async fn get_relations_with_pagination(
    pool: &PgPool,
    filter: &RelationFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<MangaRelation>, Error> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
        "SELECT {} FROM manga_relation WHERE 1 = 1",
        RELATION_COLUMNS
    ));

    if let Some(source_manga_id) = filter.source_manga {
        builder.push(" AND source_manga_id = ");
        builder.push_bind(source_manga_id);
    }
    if let Some(target_manga_id) = filter.target_manga {
        builder.push(" AND target_manga_id = ");
        builder.push_bind(target_manga_id);
    }
    if let Some(relation) = &filter.relation {
        builder.push(" AND relation = ");
        builder.push_bind(relation.as_str());
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

    rows.into_iter().map(map_relation_row).collect()
}

#[tracing::instrument(name = "get relation by id", skip_all, fields(relation_id = %relation_id))]
pub async fn get_relation_by_id(pool: &PgPool, relation_id: Uuid) -> Result<MangaRelation, Error> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM manga_relation WHERE id = $1;",
        RELATION_COLUMNS
    ))
    .bind(relation_id)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    match row {
        Some(row) => map_relation_row(row),
        None => Err(Error::Database(DatabaseError::NotFound)),
    }
}

#[tracing::instrument(name = "create relation", skip_all, fields(source_manga_id = %data.source_manga_id))]
pub async fn insert_relation(pool: &PgPool, data: NewRelation) -> Result<MangaRelation, Error> {
    let row = sqlx::query(&format!(
        r#"
        INSERT INTO manga_relation
            (id, relation, source_manga_id, target_manga_id, version, created_at, updated_at)
        VALUES ($1, $2, $3, $4, 1, $5, $5)
        RETURNING {};
    "#,
        RELATION_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(data.relation.as_str())
    .bind(data.source_manga_id)
    .bind(data.target_manga_id)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .map_err(map_fk_violation)?;

    map_relation_row(row)
}

#[tracing::instrument(name = "update relation", skip_all, fields(relation_id = %relation_id))]
pub async fn update_relation(
    pool: &PgPool,
    relation_id: Uuid,
    data: NewRelation,
    expected_version: Option<i32>,
) -> Result<MangaRelation, Error> {
    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new("UPDATE manga_relation SET relation = ");
    builder.push_bind(data.relation.as_str());
    builder.push(", source_manga_id = ");
    builder.push_bind(data.source_manga_id);
    builder.push(", target_manga_id = ");
    builder.push_bind(data.target_manga_id);
    builder.push(", version = version + 1, updated_at = ");
    builder.push_bind(Utc::now());
    builder.push(" WHERE id = ");
    builder.push_bind(relation_id);
    if let Some(expected) = expected_version {
        builder.push(" AND version = ");
        builder.push_bind(expected);
    }
    builder.push(format!(" RETURNING {}", RELATION_COLUMNS));

    let row = builder
        .build()
        .fetch_optional(pool)
        .await
        .map_err(map_fk_violation)?;

    match row {
        Some(row) => map_relation_row(row),
        None => {
            let exists = sqlx::query("SELECT 1 FROM manga_relation WHERE id = $1;")
                .bind(relation_id)
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

#[tracing::instrument(name = "delete relation", skip_all, fields(relation_id = %relation_id))]
pub async fn delete_relation(pool: &PgPool, relation_id: Uuid) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM manga_relation WHERE id = $1;")
        .bind(relation_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound));
    }

    Ok(())
}
