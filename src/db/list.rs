use chrono::Utc;
use futures::TryStreamExt;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    error::Error,
    model::{
        CustomList, CustomListEntity, CustomListMangaEntity, ListVisibility,
        transform_list_entities,
    },
};

use super::{PostgresTransaction, error::DatabaseError, map_fk_violation, parse_stored};

const LIST_COLUMNS: &str = "id, name, visibility, owner_id, version, created_at, updated_at";

pub struct NewList {
    pub name: String,
    pub visibility: ListVisibility,
    pub manga: Vec<Uuid>,
}

pub struct ListFilter {
    pub visibility: Option<ListVisibility>,
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

fn map_list_row(row: PgRow) -> Result<CustomListEntity, Error> {
    Ok(CustomListEntity {
        id: row.get("id"),
        name: row.get("name"),
        visibility: parse_stored(row.get("visibility"))?,
        owner_id: row.get("owner_id"),
        version: row.get("version"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[tracing::instrument(name = "get list manga links", skip_all)]
async fn get_list_manga_links(
    pool: &PgPool,
    list_ids: &[Uuid],
) -> Result<Vec<CustomListMangaEntity>, Error> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT custom_list_id, manga_id FROM custom_list_manga WHERE custom_list_id in (",
    );
    let mut separated = builder.separated(", ");
    for list_id in list_ids {
        separated.push_bind(list_id);
    }
    separated.push_unseparated(");");

    let mut links: Vec<CustomListMangaEntity> = vec![];
    let mut rows = builder.build().fetch(pool);
    while let Some(row) = rows.try_next().await.map_err(DatabaseError::DatabaseError)? {
        links.push(CustomListMangaEntity {
            custom_list_id: row.get("custom_list_id"),
            manga_id: row.get("manga_id"),
        });
    }

    Ok(links)
}

async fn insert_list_manga_links(
    transaction: &mut PostgresTransaction,
    list_id: Uuid,
    manga_ids: &[Uuid],
) -> Result<(), Error> {
    if manga_ids.is_empty() {
        return Ok(());
    }

    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO custom_list_manga (custom_list_id, manga_id) ");
    builder.push_values(manga_ids, |mut row, manga_id| {
        row.push_bind(list_id);
        row.push_bind(manga_id);
    });
    builder.push(" ON CONFLICT DO NOTHING");

    builder
        .build()
        .execute(&mut **transaction)
        .await
        .map_err(map_fk_violation)?;

    Ok(())
}

#[tracing::instrument(name = "get lists with pagination", skip_all)]
pub async fn get_lists_with_pagination(
    pool: &PgPool,
    filter: &ListFilter,
    viewer_id: Uuid,
    viewer_is_admin: bool,
    limit: i64,
    offset: i64,
) -> Result<Vec<CustomList>, Error> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
        "SELECT {} FROM custom_list WHERE 1 = 1",
        LIST_COLUMNS
    ));

    if !viewer_is_admin {
        builder.push(" AND (visibility = 'public' OR owner_id = ");
        builder.push_bind(viewer_id);
        builder.push(")");
    }
    if let Some(visibility) = &filter.visibility {
        builder.push(" AND visibility = ");
        builder.push_bind(visibility.as_str());
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

    let entities: Vec<CustomListEntity> = rows
        .into_iter()
        .map(map_list_row)
        .collect::<Result<_, _>>()?;
    if entities.is_empty() {
        return Ok(vec![]);
    }

    let ids: Vec<Uuid> = entities.iter().map(|entity| entity.id).collect();
    let links = get_list_manga_links(pool, &ids).await?;

    Ok(transform_list_entities(entities, &links))
}

#[tracing::instrument(name = "get list by id", skip_all, fields(list_id = %list_id))]
pub async fn get_list_by_id(pool: &PgPool, list_id: Uuid) -> Result<CustomList, Error> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM custom_list WHERE id = $1;",
        LIST_COLUMNS
    ))
    .bind(list_id)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    let entity = match row {
        Some(row) => map_list_row(row)?,
        None => return Err(Error::Database(DatabaseError::NotFound)),
    };

    let links = get_list_manga_links(pool, &[entity.id]).await?;

    Ok(CustomList::from_entity(entity, &links))
}

#[tracing::instrument(name = "create list", skip_all)]
pub async fn insert_list(
    pool: &PgPool,
    owner_id: Uuid,
    data: NewList,
) -> Result<CustomList, Error> {
    let list_id = Uuid::new_v4();

    let mut tx = pool.begin().await.map_err(DatabaseError::DatabaseError)?;

    let row = sqlx::query(&format!(
        r#"
        INSERT INTO custom_list (id, name, visibility, owner_id, version, created_at, updated_at)
        VALUES ($1, $2, $3, $4, 1, $5, $5)
        RETURNING {};
    "#,
        LIST_COLUMNS
    ))
    .bind(list_id)
    .bind(&data.name)
    .bind(data.visibility.as_str())
    .bind(owner_id)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    let entity = map_list_row(row)?;
    let manga = dedup_ids(data.manga);
    insert_list_manga_links(&mut tx, list_id, &manga).await?;

    tx.commit().await.map_err(DatabaseError::DatabaseError)?;

    let links: Vec<CustomListMangaEntity> = manga
        .into_iter()
        .map(|manga_id| CustomListMangaEntity {
            custom_list_id: list_id,
            manga_id,
        })
        .collect();

    Ok(CustomList::from_entity(entity, &links))
}

#[tracing::instrument(name = "update list", skip_all, fields(list_id = %list_id))]
pub async fn update_list(
    pool: &PgPool,
    list_id: Uuid,
    data: NewList,
    expected_version: Option<i32>,
) -> Result<CustomList, Error> {
    let mut tx = pool.begin().await.map_err(DatabaseError::DatabaseError)?;

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE custom_list SET name = ");
    builder.push_bind(&data.name);
    builder.push(", visibility = ");
    builder.push_bind(data.visibility.as_str());
    builder.push(", version = version + 1, updated_at = ");
    builder.push_bind(Utc::now());
    builder.push(" WHERE id = ");
    builder.push_bind(list_id);
    if let Some(expected) = expected_version {
        builder.push(" AND version = ");
        builder.push_bind(expected);
    }
    builder.push(format!(" RETURNING {}", LIST_COLUMNS));

    let row = builder
        .build()
        .fetch_optional(&mut *tx)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    let entity = match row {
        Some(row) => map_list_row(row)?,
        None => {
            let exists = sqlx::query("SELECT 1 FROM custom_list WHERE id = $1;")
                .bind(list_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(DatabaseError::DatabaseError)?;

            if exists.is_some() {
                return Err(Error::Database(DatabaseError::StaleVersion));
            }
            return Err(Error::Database(DatabaseError::NotFound));
        }
    };

    sqlx::query("DELETE FROM custom_list_manga WHERE custom_list_id = $1;")
        .bind(list_id)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    let manga = dedup_ids(data.manga);
    insert_list_manga_links(&mut tx, list_id, &manga).await?;

    tx.commit().await.map_err(DatabaseError::DatabaseError)?;

    let links: Vec<CustomListMangaEntity> = manga
        .into_iter()
        .map(|manga_id| CustomListMangaEntity {
            custom_list_id: list_id,
            manga_id,
        })
        .collect();

    Ok(CustomList::from_entity(entity, &links))
}

#[tracing::instrument(name = "delete list", skip_all, fields(list_id = %list_id))]
pub async fn delete_list(pool: &PgPool, list_id: Uuid) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM custom_list WHERE id = $1;")
        .bind(list_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound));
    }

    Ok(())
}

#[tracing::instrument(name = "add manga to list", skip_all, fields(list_id = %list_id, manga_id = %manga_id))]
pub async fn add_list_manga(pool: &PgPool, list_id: Uuid, manga_id: Uuid) -> Result<(), Error> {
    let exists = sqlx::query("SELECT 1 FROM manga WHERE id = $1;")
        .bind(manga_id)
        .fetch_optional(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;
    if exists.is_none() {
        return Err(Error::Database(DatabaseError::NotFound));
    }

    sqlx::query(
        r#"
        INSERT INTO custom_list_manga (custom_list_id, manga_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING;
    "#,
    )
    .bind(list_id)
    .bind(manga_id)
    .execute(pool)
    .await
    .map_err(map_fk_violation)?;

    Ok(())
}

#[tracing::instrument(name = "remove manga from list", skip_all, fields(list_id = %list_id, manga_id = %manga_id))]
pub async fn remove_list_manga(pool: &PgPool, list_id: Uuid, manga_id: Uuid) -> Result<(), Error> {
    sqlx::query("DELETE FROM custom_list_manga WHERE custom_list_id = $1 AND manga_id = $2;")
        .bind(list_id)
        .bind(manga_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    Ok(())
}

#[tracing::instrument(name = "add list follower", skip_all, fields(list_id = %list_id, user_id = %user_id))]
pub async fn add_list_follower(pool: &PgPool, list_id: Uuid, user_id: Uuid) -> Result<(), Error> {
    let exists = sqlx::query("SELECT 1 FROM custom_list WHERE id = $1;")
        .bind(list_id)
        .fetch_optional(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;
    if exists.is_none() {
        return Err(Error::Database(DatabaseError::NotFound));
    }

    sqlx::query(
        r#"
        INSERT INTO custom_list_followers (custom_list_id, user_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING;
    "#,
    )
    .bind(list_id)
    .bind(user_id)
    .execute(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    Ok(())
}

#[tracing::instrument(name = "remove list follower", skip_all, fields(list_id = %list_id, user_id = %user_id))]
pub async fn remove_list_follower(
    pool: &PgPool,
    list_id: Uuid,
    user_id: Uuid,
) -> Result<(), Error> {
    sqlx::query("DELETE FROM custom_list_followers WHERE custom_list_id = $1 AND user_id = $2;")
        .bind(list_id)
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    Ok(())
}
