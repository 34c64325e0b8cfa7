use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    error::Error,
    model::{Chapter, ChapterEntity, ChapterGroupEntity, transform_chapter_entities},
};

use super::{
    PostgresTransaction, error::DatabaseError, manga::register_uploaded_chapter, map_fk_violation,
};

const CHAPTER_COLUMNS: &str = "id, title, volume, chapter, pages, translated_language, \
    external_url, publish_at, readable_at, is_unavailable, manga_id, uploader_id, version, \
    created_at, updated_at";

pub struct NewChapter {
    pub title: Option<String>,
    pub volume: Option<String>,
    pub chapter: Option<String>,
    pub pages: i32,
    pub translated_language: String,
    pub external_url: Option<String>,
    pub publish_at: Option<DateTime<Utc>>,
    pub readable_at: Option<DateTime<Utc>>,
    pub is_unavailable: bool,
    pub manga_id: Uuid,
    pub groups: Vec<Uuid>,
}

pub struct ChapterChanges {
    pub title: Option<String>,
    pub volume: Option<String>,
    pub chapter: Option<String>,
    pub pages: i32,
    pub translated_language: String,
    pub external_url: Option<String>,
    pub publish_at: Option<DateTime<Utc>>,
    pub readable_at: Option<DateTime<Utc>>,
    pub is_unavailable: bool,
    pub groups: Vec<Uuid>,
}

pub struct ChapterFilter {
    pub manga: Option<Uuid>,
    pub translated_language: Option<String>,
    pub uploader: Option<Uuid>,
    pub group: Option<Uuid>,
}

fn map_chapter_row(row: PgRow) -> ChapterEntity {
    ChapterEntity {
        id: row.get("id"),
        title: row.get("title"),
        volume: row.get("volume"),
        chapter: row.get("chapter"),
        pages: row.get("pages"),
        translated_language: row.get("translated_language"),
        external_url: row.get("external_url"),
        publish_at: row.get("publish_at"),
        readable_at: row.get("readable_at"),
        is_unavailable: row.get("is_unavailable"),
        manga_id: row.get("manga_id"),
        uploader_id: row.get("uploader_id"),
        version: row.get("version"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn dedup_ids(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }

    seen
}

async fn get_chapter_group_links(
    pool: &PgPool,
    chapter_ids: &[Uuid],
) -> Result<Vec<ChapterGroupEntity>, Error> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT chapter_id, scanlation_group_id FROM chapter_scanlation_groups WHERE chapter_id in (",
    );
    let mut separated = builder.separated(", ");
    for chapter_id in chapter_ids {
        separated.push_bind(*chapter_id);
    }
    separated.push_unseparated(");");

    let mut stream = builder.build().fetch(pool);

    let mut links = Vec::new();
    while let Some(row) = stream
        .try_next()
        .await
        .map_err(DatabaseError::DatabaseError)?
    {
        links.push(ChapterGroupEntity {
            chapter_id: row.get("chapter_id"),
            scanlation_group_id: row.get("scanlation_group_id"),
        });
    }

    Ok(links)
}

async fn insert_chapter_group_links(
    tx: &mut PostgresTransaction,
    chapter_id: Uuid,
    group_ids: &[Uuid],
) -> Result<(), Error> {
    if group_ids.is_empty() {
        return Ok(());
    }

    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO chapter_scanlation_groups (chapter_id, scanlation_group_id) ");
    builder.push_values(group_ids, |mut b, group_id| {
        b.push_bind(chapter_id).push_bind(*group_id);
    });
    builder.push(" ON CONFLICT DO NOTHING;");

    builder
        .build()
        .execute(&mut **tx)
        .await
        .map_err(map_fk_violation)?;

    Ok(())
}

#[tracing::instrument(name = "get chapters with pagination", skip_all)]
pub async fn get_chapters_with_pagination(
    pool: &PgPool,
    filter: &ChapterFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Chapter>, Error> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
        "SELECT {} FROM chapter WHERE 1 = 1",
        CHAPTER_COLUMNS
    ));

    if let Some(manga) = filter.manga {
        builder.push(" AND manga_id = ");
        builder.push_bind(manga);
    }
    if let Some(translated_language) = &filter.translated_language {
        builder.push(" AND translated_language = ");
        builder.push_bind(translated_language);
    }
    if let Some(uploader) = filter.uploader {
        builder.push(" AND uploader_id = ");
        builder.push_bind(uploader);
    }
    if let Some(group) = filter.group {
        builder.push(
            " AND EXISTS (SELECT 1 FROM chapter_scanlation_groups \
             WHERE chapter_scanlation_groups.chapter_id = chapter.id \
             AND chapter_scanlation_groups.scanlation_group_id = ",
        );
        builder.push_bind(group);
        builder.push(")");
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

    let entities: Vec<ChapterEntity> = rows.into_iter().map(map_chapter_row).collect();
    if entities.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = entities.iter().map(|entity| entity.id).collect();
    let groups = get_chapter_group_links(pool, &ids).await?;

    Ok(transform_chapter_entities(entities, &groups))
}

#[tracing::instrument(name = "get chapter by id", skip_all, fields(chapter_id = %chapter_id))]
pub async fn get_chapter_by_id(pool: &PgPool, chapter_id: Uuid) -> Result<Chapter, Error> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM chapter WHERE id = $1;",
        CHAPTER_COLUMNS
    ))
    .bind(chapter_id)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    let entity = match row {
        Some(row) => map_chapter_row(row),
        None => {
            return Err(Error::Database(DatabaseError::NotFound));
        }
    };

    let groups = get_chapter_group_links(pool, &[chapter_id]).await?;

    Ok(Chapter::from_entity(entity, &groups))
}

/// Stores the chapter and folds it into the manga read model in one
/// transaction. Either both land or neither does.
#[tracing::instrument(name = "create chapter", skip_all, fields(manga_id = %data.manga_id))]
pub async fn insert_chapter(
    pool: &PgPool,
    uploader_id: Uuid,
    data: NewChapter,
) -> Result<Chapter, Error> {
    let chapter_id = Uuid::new_v4();
    let now = Utc::now();
    let groups = dedup_ids(data.groups);

    let mut tx = pool.begin().await.map_err(DatabaseError::DatabaseError)?;

    sqlx::query(
        r#"
        INSERT INTO chapter
            (id, title, volume, chapter, pages, translated_language, external_url,
             publish_at, readable_at, is_unavailable, manga_id, uploader_id, version,
             created_at, updated_at)
        VALUES
            ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 1, $13, $13);
    "#,
    )
    .bind(chapter_id)
    .bind(&data.title)
    .bind(&data.volume)
    .bind(&data.chapter)
    .bind(data.pages)
    .bind(&data.translated_language)
    .bind(&data.external_url)
    .bind(data.publish_at)
    .bind(data.readable_at)
    .bind(data.is_unavailable)
    .bind(data.manga_id)
    .bind(uploader_id)
    .bind(now)
    .execute(&mut *tx)
    .await
    .map_err(map_fk_violation)?;

    insert_chapter_group_links(&mut tx, chapter_id, &groups).await?;
    register_uploaded_chapter(&mut tx, data.manga_id, chapter_id, &data.translated_language)
        .await?;

    tx.commit().await.map_err(DatabaseError::DatabaseError)?;

    Ok(Chapter {
        id: chapter_id,
        title: data.title,
        volume: data.volume,
        chapter: data.chapter,
        pages: data.pages,
        translated_language: data.translated_language,
        external_url: data.external_url,
        publish_at: data.publish_at,
        readable_at: data.readable_at,
        is_unavailable: data.is_unavailable,
        manga: data.manga_id,
        uploader: uploader_id,
        groups,
        version: 1,
        created_at: now,
        updated_at: now,
    })
}

#[tracing::instrument(name = "update chapter", skip_all, fields(chapter_id = %chapter_id))]
pub async fn update_chapter(
    pool: &PgPool,
    chapter_id: Uuid,
    changes: ChapterChanges,
    expected_version: Option<i32>,
) -> Result<Chapter, Error> {
    let groups = dedup_ids(changes.groups);

    let mut tx = pool.begin().await.map_err(DatabaseError::DatabaseError)?;

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE chapter SET title = ");
    builder.push_bind(changes.title);
    builder.push(", volume = ");
    builder.push_bind(changes.volume);
    builder.push(", chapter = ");
    builder.push_bind(changes.chapter);
    builder.push(", pages = ");
    builder.push_bind(changes.pages);
    builder.push(", translated_language = ");
    builder.push_bind(changes.translated_language);
    builder.push(", external_url = ");
    builder.push_bind(changes.external_url);
    builder.push(", publish_at = ");
    builder.push_bind(changes.publish_at);
    builder.push(", readable_at = ");
    builder.push_bind(changes.readable_at);
    builder.push(", is_unavailable = ");
    builder.push_bind(changes.is_unavailable);
    builder.push(", version = version + 1, updated_at = ");
    builder.push_bind(Utc::now());
    builder.push(" WHERE id = ");
    builder.push_bind(chapter_id);
    if let Some(expected) = expected_version {
        builder.push(" AND version = ");
        builder.push_bind(expected);
    }
    builder.push(format!(" RETURNING {}", CHAPTER_COLUMNS));

    let row = builder
        .build()
        .fetch_optional(&mut *tx)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    let entity = match row {
        Some(row) => map_chapter_row(row),
        None => {
            let exists = sqlx::query("SELECT 1 FROM chapter WHERE id = $1;")
                .bind(chapter_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(DatabaseError::DatabaseError)?;

            if exists.is_some() {
                return Err(Error::Database(DatabaseError::StaleVersion));
            }
            return Err(Error::Database(DatabaseError::NotFound));
        }
    };

    sqlx::query("DELETE FROM chapter_scanlation_groups WHERE chapter_id = $1;")
        .bind(chapter_id)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::DatabaseError)?;
    insert_chapter_group_links(&mut tx, chapter_id, &groups).await?;

    tx.commit().await.map_err(DatabaseError::DatabaseError)?;

    let group_links: Vec<ChapterGroupEntity> = groups
        .iter()
        .map(|group_id| ChapterGroupEntity {
            chapter_id,
            scanlation_group_id: *group_id,
        })
        .collect();

    Ok(Chapter::from_entity(entity, &group_links))
}

#[tracing::instrument(name = "delete chapter", skip_all, fields(chapter_id = %chapter_id))]
pub async fn delete_chapter(pool: &PgPool, chapter_id: Uuid) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM chapter WHERE id = $1;")
        .bind(chapter_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound));
    }

    Ok(())
}
