use std::collections::BTreeMap;

use fake::{Fake, faker::name::en::Name};
use rand::Rng;
use sqlx::PgPool;
use uuid::Uuid;

use tankobon::{
    db::{
        author::{NewAuthor, insert_author},
        chapter::{NewChapter, insert_chapter},
        cover::{NewCover, insert_cover},
        group::{NewGroup, insert_group},
        list::{NewList, insert_list},
        manga::{NewManga, insert_manga},
        recommendation::{NewRecommendation, insert_recommendation},
        relation::{NewRelation, insert_relation},
        report::{NewReport, insert_report},
        tag::{NewTag, insert_tag},
    },
    model::{
        Author, Chapter, ContentRating, CoverArt, CustomList, ListVisibility, LocalizedMap, Manga,
        MangaRecommendation, MangaRelation, MangaState, MangaStatus, RelationKind, Report,
        ReportTargetKind, ScanlationGroup, Tag, TagGroup,
    },
};

pub fn en(text: &str) -> LocalizedMap {
    BTreeMap::from([("en".to_string(), text.to_string())])
}

pub async fn insert_fake_manga(pool: &PgPool, state: MangaState) -> Manga {
    let title: String = Name().fake();
    insert_fake_manga_with_title(pool, state, &title).await
}

pub async fn insert_fake_manga_with_title(pool: &PgPool, state: MangaState, title: &str) -> Manga {
    insert_manga(
        pool,
        NewManga {
            title: en(title),
            alt_titles: LocalizedMap::new(),
            description: en("A story"),
            is_locked: false,
            links: None,
            official_links: None,
            original_language: "ja".to_string(),
            last_volume: None,
            last_chapter: None,
            publication_demographic: None,
            status: MangaStatus::Ongoing,
            year: Some(2020),
            content_rating: ContentRating::Safe,
            chapter_numbers_reset_on_new_volume: false,
            state,
            authors: Vec::new(),
            artists: Vec::new(),
            tags: Vec::new(),
        },
    )
    .await
    .unwrap()
}

pub async fn insert_fake_chapter(pool: &PgPool, manga_id: Uuid, uploader_id: Uuid) -> Chapter {
    let mut rng = rand::rng();
    let number = rng.random_range(1..100);

    insert_chapter(
        pool,
        uploader_id,
        NewChapter {
            title: Some(Name().fake()),
            volume: Some("1".to_string()),
            chapter: Some(number.to_string()),
            pages: rng.random_range(10..40),
            translated_language: "en".to_string(),
            external_url: None,
            publish_at: None,
            readable_at: None,
            is_unavailable: false,
            manga_id,
            groups: Vec::new(),
        },
    )
    .await
    .unwrap()
}

pub async fn insert_fake_cover(pool: &PgPool, manga_id: Uuid, uploader_id: Uuid) -> CoverArt {
    insert_cover(
        pool,
        uploader_id,
        NewCover {
            volume: Some("1".to_string()),
            file_name: format!("covers/{}/{}.jpg", manga_id, Uuid::new_v4()),
            locale: Some("en".to_string()),
            description: None,
            manga_id,
        },
    )
    .await
    .unwrap()
}

pub async fn insert_fake_author(pool: &PgPool) -> Author {
    insert_author(
        pool,
        NewAuthor {
            name: en(&Name().fake::<String>()),
            image_url: None,
            biography: None,
            twitter: None,
            pixiv: None,
            melon_book: None,
            fan_box: None,
            booth: None,
            nico_video: None,
            skeb: None,
            fantia: None,
            tumblr: None,
            youtube: None,
            weibo: None,
            naver: None,
            website: None,
        },
    )
    .await
    .unwrap()
}

pub async fn insert_fake_tag(pool: &PgPool, tag_group: TagGroup) -> Tag {
    insert_tag(
        pool,
        NewTag {
            name: en(&Name().fake::<String>()),
            description: None,
            tag_group,
        },
    )
    .await
    .unwrap()
}

pub async fn insert_fake_group(pool: &PgPool, leader_id: Uuid) -> ScanlationGroup {
    insert_group(
        pool,
        NewGroup {
            name: Name().fake(),
            alt_names: Vec::new(),
            website: None,
            irc_server: None,
            irc_channel: None,
            discord: None,
            contact_email: None,
            description: None,
            twitter: None,
            manga_updates: None,
            focused_languages: None,
            inactive: false,
            locked: false,
            official: false,
            verified: false,
            ex_licensed: false,
            publish_delay: None,
            leader_id,
            members: Vec::new(),
        },
    )
    .await
    .unwrap()
}

pub async fn insert_fake_list(
    pool: &PgPool,
    owner_id: Uuid,
    visibility: ListVisibility,
) -> CustomList {
    insert_list(
        pool,
        owner_id,
        NewList {
            name: Name().fake(),
            visibility,
            manga: Vec::new(),
        },
    )
    .await
    .unwrap()
}

pub async fn insert_fake_report(
    pool: &PgPool,
    creator_id: Uuid,
    target_kind: ReportTargetKind,
    object_id: Uuid,
) -> Report {
    insert_report(
        pool,
        creator_id,
        NewReport {
            details: "Something is off".to_string(),
            target_kind,
            object_id,
        },
    )
    .await
    .unwrap()
}

pub async fn insert_fake_relation(
    pool: &PgPool,
    source_manga_id: Uuid,
    target_manga_id: Uuid,
) -> MangaRelation {
    insert_relation(
        pool,
        NewRelation {
            relation: RelationKind::Sequel,
            source_manga_id,
            target_manga_id,
        },
    )
    .await
    .unwrap()
}

pub async fn insert_fake_recommendation(
    pool: &PgPool,
    manga_id: Uuid,
    recommended_manga_id: Uuid,
) -> MangaRecommendation {
    insert_recommendation(
        pool,
        NewRecommendation {
            score: 0.7,
            manga_id,
            recommended_manga_id,
        },
    )
    .await
    .unwrap()
}
