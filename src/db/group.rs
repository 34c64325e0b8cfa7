use chrono::Utc;
use futures::TryStreamExt;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow, types::Json};
use uuid::Uuid;

use crate::{
    error::Error,
    model::{GroupMemberEntity, ScanlationGroup, ScanlationGroupEntity, transform_group_entities},
};

use super::{PostgresTransaction, error::DatabaseError, map_fk_violation};

const GROUP_COLUMNS: &str = "id, name, alt_names, website, irc_server, irc_channel, discord, \
    contact_email, description, twitter, manga_updates, focused_languages, inactive, locked, \
    official, verified, ex_licensed, publish_delay, leader_id, version, created_at, updated_at";

pub struct NewGroup {
    pub name: String,
    pub alt_names: Vec<String>,
    pub website: Option<String>,
    pub irc_server: Option<String>,
    pub irc_channel: Option<String>,
    pub discord: Option<String>,
    pub contact_email: Option<String>,
    pub description: Option<String>,
    pub twitter: Option<String>,
    pub manga_updates: Option<String>,
    pub focused_languages: Option<Vec<String>>,
    pub inactive: bool,
    pub locked: bool,
    pub official: bool,
    pub verified: bool,
    pub ex_licensed: bool,
    pub publish_delay: Option<String>,
    pub leader_id: Uuid,
    pub members: Vec<Uuid>,
}

pub struct GroupFilter {
    pub name: Option<String>,
    pub verified: Option<bool>,
    pub official: Option<bool>,
    pub inactive: Option<bool>,
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

fn map_group_row(row: PgRow) -> ScanlationGroupEntity {
    ScanlationGroupEntity {
        id: row.get("id"),
        name: row.get("name"),
        alt_names: row.get::<Json<Vec<String>>, _>("alt_names").0,
        website: row.get("website"),
        irc_server: row.get("irc_server"),
        irc_channel: row.get("irc_channel"),
        discord: row.get("discord"),
        contact_email: row.get("contact_email"),
        description: row.get("description"),
        twitter: row.get("twitter"),
        manga_updates: row.get("manga_updates"),
        focused_languages: row
            .get::<Option<Json<Vec<String>>>, _>("focused_languages")
            .map(|json| json.0),
        inactive: row.get("inactive"),
        locked: row.get("locked"),
        official: row.get("official"),
        verified: row.get("verified"),
        ex_licensed: row.get("ex_licensed"),
        publish_delay: row.get("publish_delay"),
        leader_id: row.get("leader_id"),
        version: row.get("version"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[tracing::instrument(name = "get group member links", skip_all)]
async fn get_group_member_links(
    pool: &PgPool,
    group_ids: &[Uuid],
) -> Result<Vec<GroupMemberEntity>, Error> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT scanlation_group_id, user_id FROM user_scanlation_groups WHERE scanlation_group_id in (",
    );
    let mut separated = builder.separated(", ");
    for group_id in group_ids {
        separated.push_bind(group_id);
    }
    separated.push_unseparated(");");

    let mut links: Vec<GroupMemberEntity> = vec![];
    let mut rows = builder.build().fetch(pool);
    while let Some(row) = rows.try_next().await.map_err(DatabaseError::DatabaseError)? {
        links.push(GroupMemberEntity {
            scanlation_group_id: row.get("scanlation_group_id"),
            user_id: row.get("user_id"),
        });
    }

    Ok(links)
}

async fn insert_group_member_links(
    transaction: &mut PostgresTransaction,
    group_id: Uuid,
    user_ids: &[Uuid],
) -> Result<(), Error> {
    if user_ids.is_empty() {
        return Ok(());
    }

    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO user_scanlation_groups (user_id, scanlation_group_id) ");
    builder.push_values(user_ids, |mut row, user_id| {
        row.push_bind(user_id);
        row.push_bind(group_id);
    });
    builder.push(" ON CONFLICT DO NOTHING");

    builder
        .build()
        .execute(&mut **transaction)
        .await
        .map_err(map_fk_violation)?;

    Ok(())
}

async fn stitch_groups(
    pool: &PgPool,
    entities: Vec<ScanlationGroupEntity>,
) -> Result<Vec<ScanlationGroup>, Error> {
    if entities.is_empty() {
        return Ok(vec![]);
    }

    let ids: Vec<Uuid> = entities.iter().map(|entity| entity.id).collect();
    let members = get_group_member_links(pool, &ids).await?;

    Ok(transform_group_entities(entities, &members))
}

#[tracing::instrument(name = "get groups with pagination", skip_all)]
pub async fn get_groups_with_pagination(
    pool: &PgPool,
    filter: &GroupFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<ScanlationGroup>, Error> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
        "SELECT {} FROM scanlation_group WHERE 1 = 1",
        GROUP_COLUMNS
    ));

    if let Some(name) = &filter.name {
        builder.push(" AND name LIKE ");
        builder.push_bind(format!("%{}%", name));
    }
    if let Some(verified) = filter.verified {
        builder.push(" AND verified = ");
        builder.push_bind(verified);
    }
    if let Some(official) = filter.official {
        builder.push(" AND official = ");
        builder.push_bind(official);
    }
    if let Some(inactive) = filter.inactive {
        builder.push(" AND inactive = ");
        builder.push_bind(inactive);
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

    let entities: Vec<ScanlationGroupEntity> = rows.into_iter().map(map_group_row).collect();

    stitch_groups(pool, entities).await
}

#[tracing::instrument(name = "get group by id", skip_all, fields(group_id = %group_id))]
pub async fn get_group_by_id(pool: &PgPool, group_id: Uuid) -> Result<ScanlationGroup, Error> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM scanlation_group WHERE id = $1;",
        GROUP_COLUMNS
    ))
    .bind(group_id)
    .fetch_optional(pool)
    .await
    .map_err(DatabaseError::DatabaseError)?;

    let entity = match row {
        Some(row) => map_group_row(row),
        None => return Err(Error::Database(DatabaseError::NotFound)),
    };

    let members = get_group_member_links(pool, &[entity.id]).await?;

    Ok(ScanlationGroup::from_entity(entity, &members))
}

#[tracing::instrument(name = "create group", skip_all)]
pub async fn insert_group(pool: &PgPool, data: NewGroup) -> Result<ScanlationGroup, Error> {
    let group_id = Uuid::new_v4();
    let now = Utc::now();

    let mut tx = pool.begin().await.map_err(DatabaseError::DatabaseError)?;

    let row = sqlx::query(&format!(
        r#"
        INSERT INTO scanlation_group
            (id, name, alt_names, website, irc_server, irc_channel, discord, contact_email,
             description, twitter, manga_updates, focused_languages, inactive, locked, official,
             verified, ex_licensed, publish_delay, leader_id, version, created_at, updated_at)
        VALUES
            ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18,
             $19, 1, $20, $20)
        RETURNING {};
    "#,
        GROUP_COLUMNS
    ))
    .bind(group_id)
    .bind(&data.name)
    .bind(Json(&data.alt_names))
    .bind(&data.website)
    .bind(&data.irc_server)
    .bind(&data.irc_channel)
    .bind(&data.discord)
    .bind(&data.contact_email)
    .bind(&data.description)
    .bind(&data.twitter)
    .bind(&data.manga_updates)
    .bind(data.focused_languages.as_ref().map(Json))
    .bind(data.inactive)
    .bind(data.locked)
    .bind(data.official)
    .bind(data.verified)
    .bind(data.ex_licensed)
    .bind(&data.publish_delay)
    .bind(data.leader_id)
    .bind(now)
    .fetch_one(&mut *tx)
    .await
    .map_err(map_fk_violation)?;

    let entity = map_group_row(row);
    let members = dedup_ids(data.members);
    insert_group_member_links(&mut tx, group_id, &members).await?;

    tx.commit().await.map_err(DatabaseError::DatabaseError)?;

    let links: Vec<GroupMemberEntity> = members
        .into_iter()
        .map(|user_id| GroupMemberEntity {
            scanlation_group_id: group_id,
            user_id,
        })
        .collect();

    Ok(ScanlationGroup::from_entity(entity, &links))
}

#[tracing::instrument(name = "update group", skip_all, fields(group_id = %group_id))]
pub async fn update_group(
    pool: &PgPool,
    group_id: Uuid,
    data: NewGroup,
    expected_version: Option<i32>,
) -> Result<ScanlationGroup, Error> {
    let mut tx = pool.begin().await.map_err(DatabaseError::DatabaseError)?;

    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new("UPDATE scanlation_group SET name = ");
    builder.push_bind(&data.name);
    builder.push(", alt_names = ");
    builder.push_bind(Json(&data.alt_names));
    builder.push(", website = ");
    builder.push_bind(&data.website);
    builder.push(", irc_server = ");
    builder.push_bind(&data.irc_server);
    builder.push(", irc_channel = ");
    builder.push_bind(&data.irc_channel);
    builder.push(", discord = ");
    builder.push_bind(&data.discord);
    builder.push(", contact_email = ");
    builder.push_bind(&data.contact_email);
    builder.push(", description = ");
    builder.push_bind(&data.description);
    builder.push(", twitter = ");
    builder.push_bind(&data.twitter);
    builder.push(", manga_updates = ");
    builder.push_bind(&data.manga_updates);
    builder.push(", focused_languages = ");
    builder.push_bind(data.focused_languages.as_ref().map(Json));
    builder.push(", inactive = ");
    builder.push_bind(data.inactive);
    builder.push(", locked = ");
    builder.push_bind(data.locked);
    builder.push(", official = ");
    builder.push_bind(data.official);
    builder.push(", verified = ");
    builder.push_bind(data.verified);
    builder.push(", ex_licensed = ");
    builder.push_bind(data.ex_licensed);
    builder.push(", publish_delay = ");
    builder.push_bind(&data.publish_delay);
    builder.push(", leader_id = ");
    builder.push_bind(data.leader_id);
    builder.push(", version = version + 1, updated_at = ");
    builder.push_bind(Utc::now());
    builder.push(" WHERE id = ");
    builder.push_bind(group_id);
    if let Some(expected) = expected_version {
        builder.push(" AND version = ");
        builder.push_bind(expected);
    }
    builder.push(format!(" RETURNING {}", GROUP_COLUMNS));

    let row = builder
        .build()
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_fk_violation)?;

    let entity = match row {
        Some(row) => map_group_row(row),
        None => {
            let exists = sqlx::query("SELECT 1 FROM scanlation_group WHERE id = $1;")
                .bind(group_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(DatabaseError::DatabaseError)?;

            if exists.is_some() {
                return Err(Error::Database(DatabaseError::StaleVersion));
            }
            return Err(Error::Database(DatabaseError::NotFound));
        }
    };

    sqlx::query("DELETE FROM user_scanlation_groups WHERE scanlation_group_id = $1;")
        .bind(group_id)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    let members = dedup_ids(data.members);
    insert_group_member_links(&mut tx, group_id, &members).await?;

    tx.commit().await.map_err(DatabaseError::DatabaseError)?;

    let links: Vec<GroupMemberEntity> = members
        .into_iter()
        .map(|user_id| GroupMemberEntity {
            scanlation_group_id: group_id,
            user_id,
        })
        .collect();

    Ok(ScanlationGroup::from_entity(entity, &links))
}

#[tracing::instrument(name = "delete group", skip_all, fields(group_id = %group_id))]
pub async fn delete_group(pool: &PgPool, group_id: Uuid) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM scanlation_group WHERE id = $1;")
        .bind(group_id)
        .execute(pool)
        .await
        .map_err(DatabaseError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(Error::Database(DatabaseError::NotFound));
    }

    Ok(())
}
