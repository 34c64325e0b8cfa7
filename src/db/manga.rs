use chrono::Utc;
use futures::TryStreamExt;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow, types::Json};
use uuid::Uuid;

use crate::{
    error::Error,
    model::{
        ContentRating, LocalizedMap, Manga, MangaAuthorEntity, MangaEntity, MangaState,
        MangaStatistics, MangaStatus, MangaTagEntity, PublicationDemographic,
        transform_manga_entities,
    },
};

use super::{PostgresTransaction, error::DatabaseError, map_fk_violation, parse_stored};

const MANGA_COLUMNS: &str = "id, title, alt_titles, description, is_locked, links, \
    official_links, original_language, last_volume, last_chapter, publication_demographic, \
    status, year, content_rating, chapter_numbers_reset_on_new_volume, \
    available_translated_languages, latest_uploaded_chapter, state, version, created_at, \
    updated_at";

pub struct NewManga {
    pub title: LocalizedMap,
    pub alt_titles: LocalizedMap,
    pub description: LocalizedMap,
    pub is_locked: bool,
    pub links: Option<LocalizedMap>,
    pub official_links: Option<LocalizedMap>,
    pub original_language: String,
    pub last_volume: Option<String>,
    pub last_chapter: Option<String>,
    pub publication_demographic: Option<PublicationDemographic>,
    pub status: MangaStatus,
    pub year: Option<i32>,
    pub content_rating: ContentRating,
    pub chapter_numbers_reset_on_new_volume: bool,
    pub state: MangaState,
    pub authors: Vec<Uuid>,
    pub artists: Vec<Uuid>,
    pub tags: Vec<Uuid>,
}

pub struct MangaFilter {
    pub status: Option<MangaStatus>,
    pub content_rating: Option<ContentRating>,
    pub publication_demographic: Option<PublicationDemographic>,
    pub original_language: Option<String>,
    pub year: Option<i32>,
    pub state: Option<MangaState>,
    pub author: Option<Uuid>,
    pub artist: Option<Uuid>,
    pub tag: Option<Uuid>,
    pub sort: MangaSort,
    pub order: SortOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MangaSort {
    CreatedAt,
    UpdatedAt,
    Year,
    Title,
}

impl MangaSort {
    fn as_column(&self) -> &'static str {
        match self {
            MangaSort::CreatedAt => "created_at",
            MangaSort::UpdatedAt => "updated_at",
            MangaSort::Year => "year",
            MangaSort::Title => "title->>'en'",
        }
    }
}

impl TryFrom<String> for MangaSort {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_str() {
            "createdAt" => Ok(Self::CreatedAt),
            "updatedAt" => Ok(Self::UpdatedAt),
            "year" => Ok(Self::Year),
            "title" => Ok(Self::Title),
            other => Err(format!("{} is not a sortable manga field.", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl TryFrom<String> for SortOrder {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("{} is not a sort order.", other)),
        }
    }
}

fn map_manga_row(row: PgRow) -> Result<MangaEntity, Error> {
    let status: String = row.get("status");
    let state: String = row.get("state");
    let content_rating: String = row.get("content_rating");
    let demographic: Option<String> = row.get("publication_demographic");

    Ok(MangaEntity {
        id: row.get("id"),
        title: row.get::<Json<LocalizedMap>, _>("title").0,
        alt_titles: row.get::<Json<LocalizedMap>, _>("alt_titles").0,
        description: row.get::<Json<LocalizedMap>, _>("description").0,
        is_locked: row.get("is_locked"),
        links: row
            .get::<Option<Json<LocalizedMap>>, _>("links")
            .map(|json| json.0),
        official_links: row
            .get::<Option<Json<LocalizedMap>>, _>("official_links")
            .map(|json| json.0),
        original_language: row.get("original_language"),
        last_volume: row.get("last_volume"),
        last_chapter: row.get("last_chapter"),
        publication_demographic: demographic.map(parse_stored).transpose()?,
        status: parse_stored(status)?,
        year: row.get("year"),
        content_rating: parse_stored(content_rating)?,
        chapter_numbers_reset_on_new_volume: row.get("chapter_numbers_reset_on_new_volume"),
        available_translated_languages: row
            .get::<Json<Vec<String>>, _>("available_translated_languages")
            .0,
        latest_uploaded_chapter: row.get("latest_uploaded_chapter"),
        state: parse_stored(state)?,
        version: row.get("version"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn map_manga_rows(rows: Vec<PgRow>) -> Result<Vec<MangaEntity>, Error> {
    let mut entities = Vec::with_capacity(rows.len());
    for row in rows {
        entities.push(map_manga_row(row)?);
    }

    Ok(entities)
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

async fn manga_exists(pool: &PgPool, manga_id: Uuid) -> Result<bool, Error> {
    let row = sqlx::query("SELECT 1 FROM manga WHERE id = $1;")
        .bind(manga_id)
        .fetch_optional(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    Ok(row.is_some())
}

async fn get_manga_author_links(
    pool: &PgPool,
    table: &'static str,
    manga_ids: &[Uuid],
) -> Result<Vec<MangaAuthorEntity>, Error> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
        "SELECT manga_id, author_id FROM {} WHERE manga_id in (",
        table
    ));
    let mut separated = builder.separated(", ");
    for manga_id in manga_ids {
        separated.push_bind(*manga_id);
    }
    separated.push_unseparated(");");

    let mut stream = builder.build().fetch(pool);

    let mut links = Vec::new();
    while let Some(row) = stream
        .try_next()
        .await
        .map_err(DatabaseError::DatabaseError)?
    {
        links.push(MangaAuthorEntity {
            manga_id: row.get("manga_id"),
            author_id: row.get("author_id"),
        });
    }

    Ok(links)
}

async fn get_manga_tag_links(
    pool: &PgPool,
    manga_ids: &[Uuid],
) -> Result<Vec<MangaTagEntity>, Error> {
    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT manga_id, tag_id FROM manga_tags WHERE manga_id in (");
    let mut separated = builder.separated(", ");
    for manga_id in manga_ids {
        separated.push_bind(*manga_id);
    }
    separated.push_unseparated(");");

    let mut stream = builder.build().fetch(pool);

    let mut links = Vec::new();
    while let Some(row) = stream
        .try_next()
        .await
        .map_err(DatabaseError::DatabaseError)?
    {
        links.push(MangaTagEntity {
            manga_id: row.get("manga_id"),
            tag_id: row.get("tag_id"),
        });
    }

    Ok(links)
}

async fn stitch_manga(pool: &PgPool, entities: Vec<MangaEntity>) -> Result<Vec<Manga>, Error> {
    if entities.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = entities.iter().map(|entity| entity.id).collect();
    let authors = get_manga_author_links(pool, "manga_authors", &ids).await?;
    let artists = get_manga_author_links(pool, "manga_artists", &ids).await?;
    let tags = get_manga_tag_links(pool, &ids).await?;

    Ok(transform_manga_entities(entities, &authors, &artists, &tags))
}

async fn insert_manga_links(
    tx: &mut PostgresTransaction,
    table: &'static str,
    column: &'static str,
    manga_id: Uuid,
    ids: &[Uuid],
) -> Result<(), Error> {
    if ids.is_empty() {
        return Ok(());
    }

    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("INSERT INTO {} (manga_id, {}) ", table, column));
    builder.push_values(ids, |mut b, id| {
        b.push_bind(manga_id).push_bind(*id);
    });
    builder.push(" ON CONFLICT DO NOTHING;");

    builder
        .build()
        .execute(&mut **tx)
        .await
        .map_err(map_fk_violation)?;

    Ok(())
}

async fn delete_manga_links(
    tx: &mut PostgresTransaction,
    table: &'static str,
    manga_id: Uuid,
) -> Result<(), Error> {
    sqlx::query(&format!("DELETE FROM {} WHERE manga_id = $1;", table))
        .bind(manga_id)
        .execute(&mut **tx)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    Ok(())
}

#[tracing::instrument(name = "get manga with pagination", skip_all)]
pub async fn get_manga_with_pagination(
    pool: &PgPool,
    filter: &MangaFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Manga>, Error> {
    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT {} FROM manga WHERE 1 = 1", MANGA_COLUMNS));

    if let Some(status) = filter.status {
        builder.push(" AND status = ");
        builder.push_bind(status.as_str());
    }
    if let Some(content_rating) = filter.content_rating {
        builder.push(" AND content_rating = ");
        builder.push_bind(content_rating.as_str());
    }
    if let Some(demographic) = filter.publication_demographic {
        builder.push(" AND publication_demographic = ");
        builder.push_bind(demographic.as_str());
    }
    if let Some(original_language) = &filter.original_language {
        builder.push(" AND original_language = ");
        builder.push_bind(original_language);
    }
    if let Some(year) = filter.year {
        builder.push(" AND year = ");
        builder.push_bind(year);
    }
    if let Some(state) = filter.state {
        builder.push(" AND state = ");
        builder.push_bind(state.as_str());
    }
    if let Some(author) = filter.author {
        builder.push(
            " AND EXISTS (SELECT 1 FROM manga_authors \
             WHERE manga_authors.manga_id = manga.id AND manga_authors.author_id = ",
        );
        builder.push_bind(author);
        builder.push(")");
    }
    if let Some(artist) = filter.artist {
        builder.push(
            " AND EXISTS (SELECT 1 FROM manga_artists \
             WHERE manga_artists.manga_id = manga.id AND manga_artists.author_id = ",
        );
        builder.push_bind(artist);
        builder.push(")");
    }
    if let Some(tag) = filter.tag {
        builder.push(
            " AND EXISTS (SELECT 1 FROM manga_tags \
             WHERE manga_tags.manga_id = manga.id AND manga_tags.tag_id = ",
        );
        builder.push_bind(tag);
        builder.push(")");
    }

    builder.push(format!(
        " ORDER BY {} {} LIMIT ",
        filter.sort.as_column(),
        filter.order.as_sql()
    ));
    builder.push_bind(limit);
    builder.push(" OFFSET ");
    builder.push_bind(offset);

    let rows = builder
        .build()
        .fetch_all(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    stitch_manga(pool, map_manga_rows(rows)?).await
}

#[tracing::instrument(name = "get manga by id", skip_all, fields(manga_id = %manga_id))]
pub async fn get_manga_by_id(pool: &PgPool, manga_id: Uuid) -> Result<Manga, Error> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM manga WHERE id = $1;",
        MANGA_COLUMNS
    ))
    .bind(manga_id)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    let entity = match row {
        Some(row) => map_manga_row(row)?,
        None => {
            return Err(Error::Database(DatabaseError::NotFound));
        }
    };

    let ids = [manga_id];
    let authors = get_manga_author_links(pool, "manga_authors", &ids).await?;
    let artists = get_manga_author_links(pool, "manga_artists", &ids).await?;
    let tags = get_manga_tag_links(pool, &ids).await?;

    Ok(Manga::from_entity(entity, &authors, &artists, &tags))
}

#[tracing::instrument(name = "create manga", skip_all)]
pub async fn insert_manga(pool: &PgPool, data: NewManga) -> Result<Manga, Error> {
    let manga_id = Uuid::new_v4();
    let now = Utc::now();

    let authors = dedup_ids(data.authors);
    let artists = dedup_ids(data.artists);
    let tags = dedup_ids(data.tags);

    let mut tx = pool.begin().await.map_err(DatabaseError::DatabaseError)?;

    sqlx::query(
        r#"
        INSERT INTO manga
            (id, title, alt_titles, description, is_locked, links, official_links,
             original_language, last_volume, last_chapter, publication_demographic, status,
             year, content_rating, chapter_numbers_reset_on_new_volume,
             available_translated_languages, latest_uploaded_chapter, state, version,
             created_at, updated_at)
        VALUES
            ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, NULL,
             $17, 1, $18, $18);
    "#,
    )
    .bind(manga_id)
    .bind(Json(&data.title))
    .bind(Json(&data.alt_titles))
    .bind(Json(&data.description))
    .bind(data.is_locked)
    .bind(data.links.as_ref().map(Json))
    .bind(data.official_links.as_ref().map(Json))
    .bind(&data.original_language)
    .bind(&data.last_volume)
    .bind(&data.last_chapter)
    .bind(data.publication_demographic.map(|d| d.as_str()))
    .bind(data.status.as_str())
    .bind(data.year)
    .bind(data.content_rating.as_str())
    .bind(data.chapter_numbers_reset_on_new_volume)
    .bind(Json(Vec::<String>::new()))
    .bind(data.state.as_str())
    .bind(now)
    .execute(&mut *tx)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    insert_manga_links(&mut tx, "manga_authors", "author_id", manga_id, &authors).await?;
    insert_manga_links(&mut tx, "manga_artists", "author_id", manga_id, &artists).await?;
    insert_manga_links(&mut tx, "manga_tags", "tag_id", manga_id, &tags).await?;

    tx.commit().await.map_err(DatabaseError::DatabaseError)?;

    Ok(Manga {
        id: manga_id,
        title: data.title,
        alt_titles: data.alt_titles,
        description: data.description,
        is_locked: data.is_locked,
        links: data.links,
        official_links: data.official_links,
        original_language: data.original_language,
        last_volume: data.last_volume,
        last_chapter: data.last_chapter,
        publication_demographic: data.publication_demographic,
        status: data.status,
        year: data.year,
        content_rating: data.content_rating,
        chapter_numbers_reset_on_new_volume: data.chapter_numbers_reset_on_new_volume,
        available_translated_languages: Vec::new(),
        latest_uploaded_chapter: None,
        state: data.state,
        authors,
        artists,
        tags,
        version: 1,
        created_at: now,
        updated_at: now,
    })
}

#[tracing::instrument(name = "update manga", skip_all, fields(manga_id = %manga_id))]
pub async fn update_manga(
    pool: &PgPool,
    manga_id: Uuid,
    data: NewManga,
    expected_version: Option<i32>,
) -> Result<Manga, Error> {
    let authors = dedup_ids(data.authors);
    let artists = dedup_ids(data.artists);
    let tags = dedup_ids(data.tags);

    let mut tx = pool.begin().await.map_err(DatabaseError::DatabaseError)?;

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE manga SET title = ");
    builder.push_bind(Json(data.title));
    builder.push(", alt_titles = ");
    builder.push_bind(Json(data.alt_titles));
    builder.push(", description = ");
    builder.push_bind(Json(data.description));
    builder.push(", is_locked = ");
    builder.push_bind(data.is_locked);
    builder.push(", links = ");
    builder.push_bind(data.links.map(Json));
    builder.push(", official_links = ");
    builder.push_bind(data.official_links.map(Json));
    builder.push(", original_language = ");
    builder.push_bind(data.original_language);
    builder.push(", last_volume = ");
    builder.push_bind(data.last_volume);
    builder.push(", last_chapter = ");
    builder.push_bind(data.last_chapter);
    builder.push(", publication_demographic = ");
    builder.push_bind(data.publication_demographic.map(|d| d.as_str()));
    builder.push(", status = ");
    builder.push_bind(data.status.as_str());
    builder.push(", year = ");
    builder.push_bind(data.year);
    builder.push(", content_rating = ");
    builder.push_bind(data.content_rating.as_str());
    builder.push(", chapter_numbers_reset_on_new_volume = ");
    builder.push_bind(data.chapter_numbers_reset_on_new_volume);
    builder.push(", state = ");
    builder.push_bind(data.state.as_str());
    builder.push(", version = version + 1, updated_at = ");
    builder.push_bind(Utc::now());
    builder.push(" WHERE id = ");
    builder.push_bind(manga_id);
    if let Some(expected) = expected_version {
        builder.push(" AND version = ");
        builder.push_bind(expected);
    }
    builder.push(format!(" RETURNING {}", MANGA_COLUMNS));

    let row = builder
        .build()
        .fetch_optional(&mut *tx)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    let entity = match row {
        Some(row) => map_manga_row(row)?,
        None => {
            let exists = sqlx::query("SELECT 1 FROM manga WHERE id = $1;")
                .bind(manga_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(DatabaseError::DatabaseError)?;

            if exists.is_some() {
                return Err(Error::Database(DatabaseError::StaleVersion));
            }
            return Err(Error::Database(DatabaseError::NotFound));
        }
    };

    delete_manga_links(&mut tx, "manga_authors", manga_id).await?;
    delete_manga_links(&mut tx, "manga_artists", manga_id).await?;
    delete_manga_links(&mut tx, "manga_tags", manga_id).await?;

    insert_manga_links(&mut tx, "manga_authors", "author_id", manga_id, &authors).await?;
    insert_manga_links(&mut tx, "manga_artists", "author_id", manga_id, &artists).await?;
    insert_manga_links(&mut tx, "manga_tags", "tag_id", manga_id, &tags).await?;

    tx.commit().await.map_err(DatabaseError::DatabaseError)?;

    let author_links: Vec<MangaAuthorEntity> = authors
        .iter()
        .map(|author_id| MangaAuthorEntity {
            manga_id,
            author_id: *author_id,
        })
        .collect();
    let artist_links: Vec<MangaAuthorEntity> = artists
        .iter()
        .map(|author_id| MangaAuthorEntity {
            manga_id,
            author_id: *author_id,
        })
        .collect();
    let tag_links: Vec<MangaTagEntity> = tags
        .iter()
        .map(|tag_id| MangaTagEntity {
            manga_id,
            tag_id: *tag_id,
        })
        .collect();

    Ok(Manga::from_entity(
        entity,
        &author_links,
        &artist_links,
        &tag_links,
    ))
}

#[tracing::instrument(name = "delete manga", skip_all, fields(manga_id = %manga_id))]
pub async fn delete_manga(pool: &PgPool, manga_id: Uuid) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM manga WHERE id = $1;")
        .bind(manga_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound));
    }

    Ok(())
}

#[tracing::instrument(name = "publish manga", skip_all, fields(manga_id = %manga_id))]
pub async fn publish_manga(pool: &PgPool, manga_id: Uuid) -> Result<Manga, Error> {
    let result = sqlx::query(
        r#"
        UPDATE manga
        SET state = 'published', version = version + 1, updated_at = $2
        WHERE id = $1 AND state <> 'published';
    "#,
    )
    .bind(manga_id)
    .bind(Utc::now())
    .execute(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    if result.rows_affected() == 0 {
        if manga_exists(pool, manga_id).await? {
            return Err(Error::Conflict("Manga is already published".to_string()));
        }
        return Err(Error::Database(DatabaseError::NotFound));
    }

    get_manga_by_id(pool, manga_id).await
}

#[tracing::instrument(name = "draft manga", skip_all, fields(manga_id = %manga_id))]
pub async fn draft_manga(pool: &PgPool, manga_id: Uuid) -> Result<Manga, Error> {
    let result = sqlx::query(
        r#"
        UPDATE manga
        SET state = 'draft', version = version + 1, updated_at = $2
        WHERE id = $1;
    "#,
    )
    .bind(manga_id)
    .bind(Utc::now())
    .execute(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound));
    }

    get_manga_by_id(pool, manga_id).await
}

/// Read-model maintenance for a freshly uploaded chapter: record the
/// language if new and point at the chapter. Deletion never retracts these.
#[tracing::instrument(name = "register uploaded chapter", skip_all, fields(manga_id = %manga_id, chapter_id = %chapter_id))]
pub async fn register_uploaded_chapter(
    tx: &mut PostgresTransaction,
    manga_id: Uuid,
    chapter_id: Uuid,
    translated_language: &str,
) -> Result<(), Error> {
    let result = sqlx::query(
        r#"
        UPDATE manga
        SET
            available_translated_languages = CASE
                WHEN available_translated_languages @> $2 THEN available_translated_languages
                ELSE available_translated_languages || $2
            END,
            latest_uploaded_chapter = $3,
            updated_at = $4
        WHERE id = $1;
    "#,
    )
    .bind(manga_id)
    .bind(Json(vec![translated_language]))
    .bind(chapter_id)
    .bind(Utc::now())
    .execute(&mut **tx)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound));
    }

    Ok(())
}

#[tracing::instrument(name = "follow manga", skip_all, fields(manga_id = %manga_id, user_id = %user_id))]
pub async fn add_manga_follower(pool: &PgPool, manga_id: Uuid, user_id: Uuid) -> Result<(), Error> {
    if !manga_exists(pool, manga_id).await? {
        return Err(Error::Database(DatabaseError::NotFound));
    }

    sqlx::query(
        r#"
        INSERT INTO manga_followers
            (manga_id, user_id)
        VALUES
            ($1, $2)
        ON CONFLICT DO NOTHING;
    "#,
    )
    .bind(manga_id)
    .bind(user_id)
    .execute(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(())
}

#[tracing::instrument(name = "unfollow manga", skip_all, fields(manga_id = %manga_id, user_id = %user_id))]
pub async fn remove_manga_follower(
    pool: &PgPool,
    manga_id: Uuid,
    user_id: Uuid,
) -> Result<(), Error> {
    sqlx::query("DELETE FROM manga_followers WHERE manga_id = $1 AND user_id = $2;")
        .bind(manga_id)
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    Ok(())
}

#[tracing::instrument(name = "get featured manga", skip_all)]
pub async fn get_featured_manga(pool: &PgPool) -> Result<Vec<Manga>, Error> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {}
        FROM manga
        WHERE state = 'published'
        ORDER BY created_at DESC
        LIMIT 10;
    "#,
        MANGA_COLUMNS
    ))
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    stitch_manga(pool, map_manga_rows(rows)?).await
}

#[tracing::instrument(name = "search manga", skip_all, fields(query))]
pub async fn search_manga(pool: &PgPool, query: &str, limit: i64) -> Result<Vec<Manga>, Error> {
    let pattern = format!("%{}%", query);

    let rows = sqlx::query(&format!(
        r#"
        SELECT {}
        FROM manga
        WHERE state = 'published'
            AND (title->>'en' LIKE $1 OR title->>'ja' LIKE $1)
        ORDER BY created_at DESC
        LIMIT $2;
    "#,
        MANGA_COLUMNS
    ))
    .bind(pattern)
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    stitch_manga(pool, map_manga_rows(rows)?).await
}

#[tracing::instrument(name = "get manga statistics", skip_all)]
pub async fn get_manga_statistics(pool: &PgPool) -> Result<MangaStatistics, Error> {
    let row = sqlx::query(
        r#"
        SELECT
            COUNT(*) AS total,
            COUNT(*) FILTER (WHERE state = 'published') AS published,
            COUNT(*) FILTER (WHERE state = 'draft') AS draft,
            COUNT(*) FILTER (WHERE status = 'ongoing') AS ongoing,
            COUNT(*) FILTER (WHERE status = 'completed') AS completed
        FROM manga;
    "#,
    )
    .fetch_one(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(MangaStatistics {
        total: row.get("total"),
        published: row.get("published"),
        draft: row.get("draft"),
        ongoing: row.get("ongoing"),
        completed: row.get("completed"),
    })
}

#[tracing::instrument(name = "get recent manga", skip_all)]
pub async fn get_recent_manga(pool: &PgPool, limit: i64) -> Result<Vec<Manga>, Error> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {}
        FROM manga
        WHERE state = 'published'
        ORDER BY updated_at DESC
        LIMIT $1;
    "#,
        MANGA_COLUMNS
    ))
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    stitch_manga(pool, map_manga_rows(rows)?).await
}

#[tracing::instrument(name = "get popular manga", skip_all)]
pub async fn get_popular_manga(pool: &PgPool, limit: i64) -> Result<Vec<Manga>, Error> {
    let rows = sqlx::query(
        r#"
        SELECT manga.*
        FROM manga
        LEFT JOIN manga_followers ON manga_followers.manga_id = manga.id
        WHERE manga.state = 'published'
        GROUP BY manga.id
        ORDER BY COUNT(manga_followers.user_id) DESC, manga.created_at DESC
        LIMIT $1;
    "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    stitch_manga(pool, map_manga_rows(rows)?).await
}

#[tracing::instrument(name = "get manga by status", skip_all, fields(status = status.as_str()))]
pub async fn get_manga_by_status(
    pool: &PgPool,
    status: MangaStatus,
    limit: i64,
) -> Result<Vec<Manga>, Error> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {}
        FROM manga
        WHERE state = 'published' AND status = $1
        ORDER BY updated_at DESC
        LIMIT $2;
    "#,
        MANGA_COLUMNS
    ))
    .bind(status.as_str())
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    stitch_manga(pool, map_manga_rows(rows)?).await
}

#[tracing::instrument(name = "get manga by rating", skip_all, fields(rating = rating.as_str()))]
pub async fn get_manga_by_rating(
    pool: &PgPool,
    rating: ContentRating,
    limit: i64,
) -> Result<Vec<Manga>, Error> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {}
        FROM manga
        WHERE state = 'published' AND content_rating = $1
        ORDER BY created_at DESC
        LIMIT $2;
    "#,
        MANGA_COLUMNS
    ))
    .bind(rating.as_str())
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    stitch_manga(pool, map_manga_rows(rows)?).await
}

#[tracing::instrument(name = "get manga by author", skip_all, fields(author_id = %author_id))]
pub async fn get_manga_by_author(
    pool: &PgPool,
    author_id: Uuid,
    limit: i64,
) -> Result<Vec<Manga>, Error> {
    let rows = sqlx::query(
        r#"
        SELECT manga.*
        FROM manga
        INNER JOIN manga_authors ON manga_authors.manga_id = manga.id
        WHERE manga.state = 'published' AND manga_authors.author_id = $1
        ORDER BY manga.updated_at DESC
        LIMIT $2;
    "#,
    )
    .bind(author_id)
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    stitch_manga(pool, map_manga_rows(rows)?).await
}

#[tracing::instrument(name = "get manga by tag", skip_all, fields(tag_id = %tag_id))]
pub async fn get_manga_by_tag(pool: &PgPool, tag_id: Uuid, limit: i64) -> Result<Vec<Manga>, Error> {
    let rows = sqlx::query(
        r#"
        SELECT manga.*
        FROM manga
        INNER JOIN manga_tags ON manga_tags.manga_id = manga.id
        WHERE manga.state = 'published' AND manga_tags.tag_id = $1
        ORDER BY manga.updated_at DESC
        LIMIT $2;
    "#,
    )
    .bind(tag_id)
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    stitch_manga(pool, map_manga_rows(rows)?).await
}
