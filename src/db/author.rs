use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow, types::Json};
use uuid::Uuid;

use crate::{
    error::Error,
    model::{Author, LocalizedMap},
};

use super::error::DatabaseError;

const AUTHOR_COLUMNS: &str = "id, name, image_url, biography, twitter, pixiv, melon_book, \
    fan_box, booth, nico_video, skeb, fantia, tumblr, youtube, weibo, naver, website, version, \
    created_at, updated_at";

pub struct NewAuthor {
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

pub struct AuthorFilter {
    pub name: Option<String>,
}

fn optional_map(row: &PgRow, column: &str) -> Option<LocalizedMap> {
    row.get::<Option<Json<LocalizedMap>>, _>(column)
        .map(|json| json.0)
}

fn map_author_row(row: PgRow) -> Author {
    Author {
        id: row.get("id"),
        name: row.get::<Json<LocalizedMap>, _>("name").0,
        image_url: optional_map(&row, "image_url"),
        biography: optional_map(&row, "biography"),
        twitter: optional_map(&row, "twitter"),
        pixiv: optional_map(&row, "pixiv"),
        melon_book: optional_map(&row, "melon_book"),
        fan_box: optional_map(&row, "fan_box"),
        booth: optional_map(&row, "booth"),
        nico_video: optional_map(&row, "nico_video"),
        skeb: optional_map(&row, "skeb"),
        fantia: optional_map(&row, "fantia"),
        tumblr: optional_map(&row, "tumblr"),
        youtube: optional_map(&row, "youtube"),
        weibo: optional_map(&row, "weibo"),
        naver: optional_map(&row, "naver"),
        website: optional_map(&row, "website"),
        version: row.get("version"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[tracing::instrument(name = "get authors with pagination", skip_all)]
pub async fn get_authors_with_pagination(
    pool: &PgPool,
    filter: &AuthorFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Author>, Error> {
    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT {} FROM author WHERE 1 = 1", AUTHOR_COLUMNS));

    if let Some(name) = &filter.name {
        builder.push(" AND name::text LIKE ");
        builder.push_bind(format!("%{}%", name));
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

    Ok(rows.into_iter().map(map_author_row).collect())
}

#[tracing::instrument(name = "get author by id", skip_all, fields(author_id = %author_id))]
pub async fn get_author_by_id(pool: &PgPool, author_id: Uuid) -> Result<Author, Error> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM author WHERE id = $1;",
        AUTHOR_COLUMNS
    ))
    .bind(author_id)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    match row {
        Some(row) => Ok(map_author_row(row)),
        None => Err(Error::Database(DatabaseError::NotFound)),
    }
}

#[tracing::instrument(name = "create author", skip_all)]
pub async fn insert_author(pool: &PgPool, data: NewAuthor) -> Result<Author, Error> {
    let row = sqlx::query(&format!(
        r#"
        INSERT INTO author
            (id, name, image_url, biography, twitter, pixiv, melon_book, fan_box, booth,
             nico_video, skeb, fantia, tumblr, youtube, weibo, naver, website, version,
             created_at, updated_at)
        VALUES
            ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, 1,
             $18, $18)
        RETURNING {};
    "#,
        AUTHOR_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(Json(&data.name))
    .bind(data.image_url.as_ref().map(Json))
    .bind(data.biography.as_ref().map(Json))
    .bind(data.twitter.as_ref().map(Json))
    .bind(data.pixiv.as_ref().map(Json))
    .bind(data.melon_book.as_ref().map(Json))
    .bind(data.fan_box.as_ref().map(Json))
    .bind(data.booth.as_ref().map(Json))
    .bind(data.nico_video.as_ref().map(Json))
    .bind(data.skeb.as_ref().map(Json))
    .bind(data.fantia.as_ref().map(Json))
    .bind(data.tumblr.as_ref().map(Json))
    .bind(data.youtube.as_ref().map(Json))
    .bind(data.weibo.as_ref().map(Json))
    .bind(data.naver.as_ref().map(Json))
    .bind(data.website.as_ref().map(Json))
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(map_author_row(row))
}

#[tracing::instrument(name = "update author", skip_all, fields(author_id = %author_id))]
pub async fn update_author(
    pool: &PgPool,
    author_id: Uuid,
    data: NewAuthor,
    expected_version: Option<i32>,
) -> Result<Author, Error> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE author SET name = ");
    builder.push_bind(Json(data.name));
    builder.push(", image_url = ");
    builder.push_bind(data.image_url.map(Json));
    builder.push(", biography = ");
    builder.push_bind(data.biography.map(Json));
    builder.push(", twitter = ");
    builder.push_bind(data.twitter.map(Json));
    builder.push(", pixiv = ");
    builder.push_bind(data.pixiv.map(Json));
    builder.push(", melon_book = ");
    builder.push_bind(data.melon_book.map(Json));
    builder.push(", fan_box = ");
    builder.push_bind(data.fan_box.map(Json));
    builder.push(", booth = ");
    builder.push_bind(data.booth.map(Json));
    builder.push(", nico_video = ");
    builder.push_bind(data.nico_video.map(Json));
    builder.push(", skeb = ");
    builder.push_bind(data.skeb.map(Json));
    builder.push(", fantia = ");
    builder.push_bind(data.fantia.map(Json));
    builder.push(", tumblr = ");
    builder.push_bind(data.tumblr.map(Json));
    builder.push(", youtube = ");
    builder.push_bind(data.youtube.map(Json));
    builder.push(", weibo = ");
    builder.push_bind(data.weibo.map(Json));
    builder.push(", naver = ");
    builder.push_bind(data.naver.map(Json));
    builder.push(", website = ");
    builder.push_bind(data.website.map(Json));
    builder.push(", version = version + 1, updated_at = ");
    builder.push_bind(Utc::now());
    builder.push(" WHERE id = ");
    builder.push_bind(author_id);
    if let Some(expected) = expected_version {
        builder.push(" AND version = ");
        builder.push_bind(expected);
    }
    builder.push(format!(" RETURNING {}", AUTHOR_COLUMNS));

    let row = builder
        .build()
        .fetch_optional(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    match row {
        Some(row) => Ok(map_author_row(row)),
        None => {
            let exists = sqlx::query("SELECT 1 FROM author WHERE id = $1;")
                .bind(author_id)
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

#[tracing::instrument(name = "delete author", skip_all, fields(author_id = %author_id))]
pub async fn delete_author(pool: &PgPool, author_id: Uuid) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM author WHERE id = $1;")
        .bind(author_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound));
    }

    Ok(())
}
