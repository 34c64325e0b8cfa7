use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow, types::Json};
use uuid::Uuid;

use crate::{
    error::Error,
    model::{LocalizedMap, Tag, TagGroup},
};

use super::{error::DatabaseError, parse_stored};

const TAG_COLUMNS: &str = "id, name, description, tag_group, version, created_at, updated_at";

pub struct NewTag {
    pub name: LocalizedMap,
    pub description: Option<LocalizedMap>,
    pub tag_group: TagGroup,
}

pub struct TagFilter {
    pub name: Option<String>,
    pub tag_group: Option<TagGroup>,
}

fn map_tag_row(row: PgRow) -> Result<Tag, Error> {
    Ok(Tag {
        id: row.get("id"),
        name: row.get::<Json<LocalizedMap>, _>("name").0,
        description: row.get::<Json<LocalizedMap>, _>("description").0,
        tag_group: parse_stored(row.get("tag_group"))?,
        version: row.get("version"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[tracing::instrument(name = "get tags with pagination", skip_all)]
pub async fn get_tags_with_pagination(
    pool: &PgPool,
    filter: &TagFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Tag>, Error> {
    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT {} FROM tag WHERE 1 = 1", TAG_COLUMNS));

    if let Some(name) = &filter.name {
        builder.push(" AND name::text LIKE ");
        builder.push_bind(format!("%{}%", name));
    }
    if let Some(tag_group) = &filter.tag_group {
        builder.push(" AND tag_group = ");
        builder.push_bind(tag_group.as_str());
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

    rows.into_iter().map(map_tag_row).collect()
}

#[tracing::instrument(name = "get tag by id", skip_all, fields(tag_id = %tag_id))]
pub async fn get_tag_by_id(pool: &PgPool, tag_id: Uuid) -> Result<Tag, Error> {
    let row = sqlx::query(&format!("SELECT {} FROM tag WHERE id = $1;", TAG_COLUMNS))
        .bind(tag_id)
        .fetch_optional(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    match row {
        Some(row) => map_tag_row(row),
        None => Err(Error::Database(DatabaseError::NotFound)),
    }
}

#[tracing::instrument(name = "create tag", skip_all)]
pub async fn insert_tag(pool: &PgPool, data: NewTag) -> Result<Tag, Error> {
    let row = sqlx::query(&format!(
        r#"
        INSERT INTO tag (id, name, description, tag_group, version, created_at, updated_at)
        VALUES ($1, $2, $3, $4, 1, $5, $5)
        RETURNING {};
    "#,
        TAG_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(Json(&data.name))
    .bind(data.description.as_ref().map(Json))
    .bind(data.tag_group.as_str())
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    map_tag_row(row)
}

#[tracing::instrument(name = "update tag", skip_all, fields(tag_id = %tag_id))]
pub async fn update_tag(
    pool: &PgPool,
    tag_id: Uuid,
    data: NewTag,
    expected_version: Option<i32>,
) -> Result<Tag, Error> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE tag SET name = ");
    builder.push_bind(Json(data.name));
    builder.push(", description = ");
    builder.push_bind(data.description.map(Json));
    builder.push(", tag_group = ");
    builder.push_bind(data.tag_group.as_str());
    builder.push(", version = version + 1, updated_at = ");
    builder.push_bind(Utc::now());
    builder.push(" WHERE id = ");
    builder.push_bind(tag_id);
    if let Some(expected) = expected_version {
        builder.push(" AND version = ");
        builder.push_bind(expected);
    }
    builder.push(format!(" RETURNING {}", TAG_COLUMNS));

    let row = builder
        .build()
        .fetch_optional(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    match row {
        Some(row) => map_tag_row(row),
        None => {
            let exists = sqlx::query("SELECT 1 FROM tag WHERE id = $1;")
                .bind(tag_id)
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

#[tracing::instrument(name = "delete tag", skip_all, fields(tag_id = %tag_id))]
pub async fn delete_tag(pool: &PgPool, tag_id: Uuid) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM tag WHERE id = $1;")
        .bind(tag_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound));
    }

    Ok(())
}
