//! Seed catalogs for local development. The small catalog is a fixed
//! set of accounts and manga for poking at the API by hand; the large
//! one scales with a knob for pagination and load testing.

use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use fake::{
    Fake,
    faker::{
        company::en::CompanyName,
        internet::en::{Password, Username},
        lorem::en::{Paragraph, Sentence, Word},
        name::en::Name,
    },
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use secrecy::SecretString;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::{
        author::{NewAuthor, insert_author},
        chapter::{NewChapter, insert_chapter},
        cover::{NewCover, insert_cover},
        group::{NewGroup, insert_group},
        list::{NewList, insert_list},
        manga::{NewManga, insert_manga},
        recommendation::{NewRecommendation, insert_recommendation},
        relation::{NewRelation, insert_relation},
        report::{NewReport, ReportChanges, insert_report, update_report},
        tag::{NewTag, insert_tag},
        user::insert_user,
    },
    error::Error,
    model::{
        ContentRating, ListVisibility, LocalizedMap, MangaState, MangaStatus,
        PublicationDemographic, ROLE_ADMIN, RelationKind, ReportStatus, ReportTargetKind,
        ScanlationGroup, TagGroup, User,
    },
};

fn en(text: &str) -> LocalizedMap {
    BTreeMap::from([("en".to_string(), text.to_string())])
}

fn author_named(name: &str) -> NewAuthor {
    NewAuthor {
        name: en(name),
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
    }
}

fn author_with_twitter(name: &str, handle: &str) -> NewAuthor {
    let mut author = author_named(name);
    author.twitter = Some(en(handle));
    author
}

fn group_led_by(name: String, leader_id: Uuid) -> NewGroup {
    NewGroup {
        name,
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
    }
}

fn published_manga(
    title: &str,
    description: &str,
    status: MangaStatus,
    content_rating: ContentRating,
    demographic: PublicationDemographic,
    year: i32,
    authors: Vec<Uuid>,
    artists: Vec<Uuid>,
    tags: Vec<Uuid>,
) -> NewManga {
    NewManga {
        title: en(title),
        alt_titles: LocalizedMap::new(),
        description: en(description),
        is_locked: false,
        links: None,
        official_links: None,
        original_language: "ja".to_string(),
        last_volume: None,
        last_chapter: None,
        publication_demographic: Some(demographic),
        status,
        year: Some(year),
        content_rating,
        chapter_numbers_reset_on_new_volume: false,
        state: MangaState::Published,
        authors,
        artists,
        tags,
    }
}

async fn seed_user(pool: &PgPool, username: &str, email: &str) -> Result<User, Error> {
    insert_user(
        pool,
        username.to_string(),
        email.to_string(),
        SecretString::from("password123"),
        vec![],
    )
    .await
}

async fn seed_group(
    pool: &PgPool,
    name: &str,
    description: &str,
    leader_id: Uuid,
    members: Vec<Uuid>,
) -> Result<ScanlationGroup, Error> {
    let mut group = group_led_by(name.to_string(), leader_id);
    group.description = Some(description.to_string());
    group.focused_languages = Some(vec!["en".to_string(), "es".to_string()]);
    group.verified = true;
    group.members = members;
    insert_group(pool, group).await
}

/// Fixed demo catalog: six accounts, three published manga with
/// chapters, covers, lists and reports, one relation and one
/// recommendation. Regular accounts use `password123`, the admin
/// account is `admin` / `admin123`.
pub async fn seed_test_catalog(pool: &PgPool) -> Result<(), Error> {
    let testuser1 = seed_user(pool, "testuser1", "test1@example.com").await?;
    let testuser2 = seed_user(pool, "testuser2", "test2@example.com").await?;
    let manga_fan = seed_user(pool, "manga_fan", "fan@example.com").await?;
    let translator = seed_user(pool, "translator", "translator@example.com").await?;
    let reader = seed_user(pool, "reader", "reader@example.com").await?;
    insert_user(
        pool,
        "admin".to_string(),
        "admin@test.com".to_string(),
        SecretString::from("admin123"),
        vec![ROLE_ADMIN.to_string()],
    )
    .await?;

    let mut tags = Vec::new();
    for (name, description, tag_group) in [
        ("Action", "High energy and conflict", TagGroup::Genre),
        ("Romance", "Love stories", TagGroup::Genre),
        ("Comedy", "Humorous content", TagGroup::Genre),
        ("Fantasy", "Magical elements", TagGroup::Genre),
        ("Isekai", "Transported to another world", TagGroup::Theme),
        ("Slice of Life", "Everyday experiences", TagGroup::Theme),
        ("Shounen", "Young male audience", TagGroup::Theme),
        ("Full Color", "Colored artwork", TagGroup::Format),
    ] {
        let tag = insert_tag(
            pool,
            NewTag {
                name: en(name),
                description: Some(en(description)),
                tag_group,
            },
        )
        .await?;
        tags.push(tag);
    }
    let (action, romance, fantasy) = (tags[0].id, tags[1].id, tags[3].id);
    let (isekai, slice_of_life, shounen) = (tags[4].id, tags[5].id, tags[6].id);

    let eiji = insert_author(pool, author_with_twitter("Eiji Nakamura", "@eiji_nakamura")).await?;
    let yuki = insert_author(pool, author_with_twitter("Yuki Tanaka", "@yuki_art")).await?;
    let hiroshi =
        insert_author(pool, author_with_twitter("Hiroshi Yamamoto", "@hiroshi_yama")).await?;
    let sakura = insert_author(pool, author_with_twitter("Sakura Watanabe", "@sakura_w")).await?;
    let kenji = insert_author(pool, author_with_twitter("Kenji Sato", "@kenji_sato")).await?;

    let speed_scans = seed_group(
        pool,
        "Speed Scans",
        "Fast translations",
        translator.id,
        vec![reader.id],
    )
    .await?;
    let quality_manga = seed_group(
        pool,
        "Quality Manga",
        "High quality releases",
        testuser1.id,
        vec![testuser2.id, manga_fan.id],
    )
    .await?;
    let indie_translators = seed_group(
        pool,
        "Indie Translators",
        "Independent group",
        testuser2.id,
        vec![reader.id],
    )
    .await?;

    let dragon_quest = insert_manga(
        pool,
        published_manga(
            "Dragon Quest Adventure",
            "An epic fantasy adventure in a world of dragons and magic.",
            MangaStatus::Ongoing,
            ContentRating::Safe,
            PublicationDemographic::Shounen,
            2020,
            vec![eiji.id],
            vec![yuki.id],
            vec![action, fantasy, shounen],
        ),
    )
    .await?;
    let love_in_tokyo = insert_manga(
        pool,
        published_manga(
            "Love in Tokyo",
            "A heartwarming romance set in modern Tokyo.",
            MangaStatus::Completed,
            ContentRating::Safe,
            PublicationDemographic::Shoujo,
            2019,
            vec![hiroshi.id],
            vec![sakura.id],
            vec![romance, slice_of_life],
        ),
    )
    .await?;
    let isekai_hero = insert_manga(
        pool,
        published_manga(
            "Isekai Hero",
            "A hero transported to another world to save humanity.",
            MangaStatus::Ongoing,
            ContentRating::Suggestive,
            PublicationDemographic::Seinen,
            2021,
            vec![kenji.id],
            vec![yuki.id],
            vec![isekai, action, fantasy],
        ),
    )
    .await?;

    let groups = [&speed_scans, &quality_manga, &indie_translators];
    let mut chapters = Vec::new();
    for manga in [&dragon_quest, &love_in_tokyo, &isekai_hero] {
        let chapter_count: usize = if manga.status == MangaStatus::Completed {
            5
        } else {
            3
        };
        for number in 1..=chapter_count {
            let group = groups[(number - 1) % groups.len()];
            let chapter = insert_chapter(
                pool,
                translator.id,
                NewChapter {
                    title: Some(format!("Chapter {}: The Adventure Begins", number)),
                    volume: Some("1".to_string()),
                    chapter: Some(number.to_string()),
                    pages: 20 + (number as i32) * 4,
                    translated_language: "en".to_string(),
                    external_url: None,
                    publish_at: None,
                    readable_at: None,
                    is_unavailable: false,
                    manga_id: manga.id,
                    groups: vec![group.id],
                },
            )
            .await?;
            chapters.push(chapter);
        }
    }

    for manga in [&dragon_quest, &love_in_tokyo, &isekai_hero] {
        let title = manga.title.get("en").cloned().unwrap_or_default();
        insert_cover(
            pool,
            testuser1.id,
            NewCover {
                volume: Some("1".to_string()),
                file_name: format!("covers/{}/cover.jpg", manga.id),
                locale: None,
                description: Some(format!("Main cover for {}", title)),
                manga_id: manga.id,
            },
        )
        .await?;
    }

    let first_two = vec![dragon_quest.id, love_in_tokyo.id];
    for (name, owner, visibility) in [
        ("My Favorites", &testuser1, ListVisibility::Public),
        ("To Read", &testuser2, ListVisibility::Private),
        ("Completed Series", &manga_fan, ListVisibility::Public),
    ] {
        insert_list(
            pool,
            owner.id,
            NewList {
                name: name.to_string(),
                visibility,
                manga: first_two.clone(),
            },
        )
        .await?;
    }

    for (details, target_kind, object_id, creator) in [
        (
            "Incorrect chapter numbering",
            ReportTargetKind::Chapter,
            chapters[0].id,
            &testuser1,
        ),
        (
            "Wrong author information",
            ReportTargetKind::Author,
            eiji.id,
            &testuser2,
        ),
        (
            "Inappropriate content",
            ReportTargetKind::Manga,
            dragon_quest.id,
            &manga_fan,
        ),
    ] {
        insert_report(
            pool,
            creator.id,
            NewReport {
                details: details.to_string(),
                target_kind,
                object_id,
            },
        )
        .await?;
    }

    insert_relation(
        pool,
        NewRelation {
            relation: RelationKind::Sequel,
            source_manga_id: dragon_quest.id,
            target_manga_id: love_in_tokyo.id,
        },
    )
    .await?;

    insert_recommendation(
        pool,
        NewRecommendation {
            score: 0.85,
            manga_id: dragon_quest.id,
            recommended_manga_id: love_in_tokyo.id,
        },
    )
    .await?;

    Ok(())
}

fn pick_ids(rng: &mut impl Rng, pool: &[Uuid], min: usize, max: usize) -> Vec<Uuid> {
    if pool.is_empty() {
        return Vec::new();
    }
    let count = rng.random_range(min..=max);
    (0..count)
        .map(|_| pool[rng.random_range(0..pool.len())])
        .collect()
}

/// Random catalog sized by `scale`: roughly `scale` manga with chapters
/// and covers, plus users, tags, authors, groups, lists, reports,
/// relations and recommendations in proportion.
pub async fn seed_large_catalog(pool: &PgPool, scale: usize) -> Result<(), Error> {
    if scale == 0 {
        return Ok(());
    }

    let mut rng = StdRng::from_os_rng();

    let mut user_ids = Vec::new();
    for index in 0..scale.min(50) {
        let username = format!("{}_{}", Username().fake::<String>(), index);
        let email = format!("{}@example.com", username);
        let password: String = Password(8..20).fake();
        let user = insert_user(pool, username, email, SecretString::from(password), vec![]).await?;
        user_ids.push(user.id);
    }
    for index in 0..3 {
        let username = format!("{}_{}_admin", Username().fake::<String>(), index);
        let email = format!("{}@example.com", username);
        let password: String = Password(8..20).fake();
        let user = insert_user(
            pool,
            username,
            email,
            SecretString::from(password),
            vec![ROLE_ADMIN.to_string()],
        )
        .await?;
        user_ids.push(user.id);
    }

    let tag_names = [
        "Action",
        "Adventure",
        "Comedy",
        "Drama",
        "Fantasy",
        "Horror",
        "Mystery",
        "Romance",
        "Sci-Fi",
        "Slice of Life",
        "Sports",
        "Supernatural",
        "Thriller",
        "Isekai",
        "Mecha",
        "Magic",
        "Demons",
        "Game",
        "Harem",
        "Martial Arts",
        "Military",
        "Psychological",
        "School Life",
        "Shoujo Ai",
        "Shounen Ai",
        "Vampire",
        "Yaoi",
        "Yuri",
        "Historical",
        "Medical",
    ];
    let tag_groups = [
        TagGroup::Content,
        TagGroup::Format,
        TagGroup::Genre,
        TagGroup::Theme,
    ];
    let mut tag_ids = Vec::new();
    for _ in 0..(scale / 2).min(30) {
        let tag = insert_tag(
            pool,
            NewTag {
                name: en(tag_names[rng.random_range(0..tag_names.len())]),
                description: Some(en(&Sentence(6..12).fake::<String>())),
                tag_group: tag_groups[rng.random_range(0..tag_groups.len())],
            },
        )
        .await?;
        tag_ids.push(tag.id);
    }

    let mut author_ids = Vec::new();
    for _ in 0..(scale / 2).min(40) {
        let mut author = author_named(&Name().fake::<String>());
        if rng.random_bool(0.3) {
            author.twitter = Some(en(&format!("@{}", Username().fake::<String>())));
        }
        if rng.random_bool(0.2) {
            author.pixiv = Some(en(&Username().fake::<String>()));
        }
        if rng.random_bool(0.15) {
            author.website = Some(en(&format!(
                "https://{}.example.com",
                Username().fake::<String>()
            )));
        }
        let author = insert_author(pool, author).await?;
        author_ids.push(author.id);
    }

    let languages = ["en", "es", "fr", "de", "pt", "ru"];
    let mut group_ids = Vec::new();
    for _ in 0..(scale / 3).min(20) {
        let leader = user_ids[rng.random_range(0..user_ids.len())];
        let mut group = group_led_by(format!("{} Scans", CompanyName().fake::<String>()), leader);
        group.description = Some(Sentence(10..18).fake());
        if rng.random_bool(0.5) {
            group.website = Some(format!(
                "https://{}.example.com",
                Username().fake::<String>()
            ));
        }
        if rng.random_bool(0.4) {
            group.discord = Some(Word().fake());
        }
        if rng.random_bool(0.3) {
            group.twitter = Some(Username().fake());
        }
        let first = rng.random_range(0..languages.len());
        let second = (first + rng.random_range(1..languages.len())) % languages.len();
        group.focused_languages = Some(vec![
            languages[first].to_string(),
            languages[second].to_string(),
        ]);
        group.verified = rng.random_bool(0.2);
        group.official = rng.random_bool(0.1);
        group.inactive = rng.random_bool(0.15);
        let group = insert_group(pool, group).await?;
        group_ids.push(group.id);
    }

    let titles = [
        "The Legendary Hero",
        "Dragon Chronicles",
        "School Romance",
        "Space Adventure",
        "Magic Academy",
        "Ninja Tales",
        "Robot Wars",
        "Vampire Love",
        "Time Travel",
        "Demon Slayer",
        "Angel Story",
        "Pirate Legend",
        "Samurai Journey",
        "Cyber Punk",
    ];
    let manga_statuses = [
        MangaStatus::Ongoing,
        MangaStatus::Completed,
        MangaStatus::Hiatus,
        MangaStatus::Cancelled,
    ];
    let ratings = [
        ContentRating::Safe,
        ContentRating::Suggestive,
        ContentRating::Erotica,
    ];
    let original_languages = ["ja", "ko", "zh", "en"];
    let demographics = [
        PublicationDemographic::Shounen,
        PublicationDemographic::Shoujo,
        PublicationDemographic::Seinen,
        PublicationDemographic::Josei,
    ];
    let mut manga_ids = Vec::new();
    for _ in 0..scale {
        let title = format!(
            "{} {}",
            titles[rng.random_range(0..titles.len())],
            rng.random_range(10..100)
        );
        let manga = insert_manga(
            pool,
            NewManga {
                title: en(&title),
                alt_titles: LocalizedMap::new(),
                description: en(&Paragraph(2..5).fake::<String>()),
                is_locked: false,
                links: None,
                official_links: None,
                original_language: original_languages
                    [rng.random_range(0..original_languages.len())]
                .to_string(),
                last_volume: None,
                last_chapter: None,
                publication_demographic: Some(
                    demographics[rng.random_range(0..demographics.len())],
                ),
                status: manga_statuses[rng.random_range(0..manga_statuses.len())],
                year: Some(rng.random_range(1990..=2023)),
                content_rating: ratings[rng.random_range(0..ratings.len())],
                chapter_numbers_reset_on_new_volume: false,
                state: MangaState::Published,
                authors: pick_ids(&mut rng, &author_ids, 1, 2),
                artists: pick_ids(&mut rng, &author_ids, 1, 2),
                tags: pick_ids(&mut rng, &tag_ids, 2, 5),
            },
        )
        .await?;
        manga_ids.push(manga.id);
    }

    let chapter_languages = ["en", "es", "fr", "de"];
    for manga_id in &manga_ids {
        for _ in 0..rng.random_range(1..=20) {
            let uploader = user_ids[rng.random_range(0..user_ids.len())];
            let groups = if group_ids.is_empty() {
                Vec::new()
            } else {
                vec![group_ids[rng.random_range(0..group_ids.len())]]
            };
            insert_chapter(
                pool,
                uploader,
                NewChapter {
                    title: Some(Sentence(4..8).fake()),
                    volume: Some(rng.random_range(1..=10).to_string()),
                    chapter: Some(rng.random_range(1..=50).to_string()),
                    pages: rng.random_range(15..=45),
                    translated_language: chapter_languages
                        [rng.random_range(0..chapter_languages.len())]
                    .to_string(),
                    external_url: None,
                    publish_at: Some(Utc::now() - Duration::days(rng.random_range(0..730))),
                    readable_at: None,
                    is_unavailable: false,
                    manga_id: *manga_id,
                    groups,
                },
            )
            .await?;
        }
    }

    let cover_locales = [Some("en"), Some("ja"), None];
    for manga_id in &manga_ids {
        for _ in 0..rng.random_range(1..=3) {
            let uploader = user_ids[rng.random_range(0..user_ids.len())];
            insert_cover(
                pool,
                uploader,
                NewCover {
                    volume: Some(rng.random_range(1..=10).to_string()),
                    file_name: format!("covers/{}/{}.jpg", manga_id, Uuid::new_v4()),
                    locale: cover_locales[rng.random_range(0..cover_locales.len())]
                        .map(str::to_string),
                    description: Some(Sentence(6..12).fake()),
                    manga_id: *manga_id,
                },
            )
            .await?;
        }
    }

    let list_names = [
        "My Favorites",
        "To Read",
        "Currently Reading",
        "Completed",
        "On Hold",
        "Dropped",
        "Plan to Read",
        "Best of 2023",
        "Romantic Manga",
        "Action Series",
    ];
    for user_id in &user_ids {
        if !rng.random_bool(0.6) {
            continue;
        }
        for _ in 0..rng.random_range(1..=5) {
            let visibility = if rng.random_bool(0.5) {
                ListVisibility::Public
            } else {
                ListVisibility::Private
            };
            insert_list(
                pool,
                *user_id,
                NewList {
                    name: list_names[rng.random_range(0..list_names.len())].to_string(),
                    visibility,
                    manga: pick_ids(&mut rng, &manga_ids, 1, 5),
                },
            )
            .await?;
        }
    }

    let reasons = [
        "Incorrect information",
        "Inappropriate content",
        "Spam",
        "Copyright violation",
        "Poor quality translation",
        "Missing chapters",
        "Wrong categorization",
        "Duplicate entry",
        "Broken links",
        "Offensive language",
    ];
    let report_statuses = [
        ReportStatus::Waiting,
        ReportStatus::Accepted,
        ReportStatus::Refused,
        ReportStatus::Autoresolved,
    ];
    let mut report_targets: Vec<(ReportTargetKind, Uuid)> = Vec::new();
    report_targets.extend(manga_ids.iter().map(|id| (ReportTargetKind::Manga, *id)));
    report_targets.extend(author_ids.iter().map(|id| (ReportTargetKind::Author, *id)));
    report_targets.extend(tag_ids.iter().map(|id| (ReportTargetKind::Tag, *id)));
    for _ in 0..(scale / 2).min(50) {
        let creator = user_ids[rng.random_range(0..user_ids.len())];
        let (target_kind, object_id) = report_targets[rng.random_range(0..report_targets.len())];
        let report = insert_report(
            pool,
            creator,
            NewReport {
                details: format!(
                    "{}: {}",
                    reasons[rng.random_range(0..reasons.len())],
                    Sentence(6..12).fake::<String>()
                ),
                target_kind,
                object_id,
            },
        )
        .await?;
        // Reports enter the workflow as waiting; other statuses go
        // through the moderation update.
        let status = report_statuses[rng.random_range(0..report_statuses.len())];
        if status != ReportStatus::Waiting {
            update_report(
                pool,
                report.id,
                ReportChanges {
                    details: report.details,
                    status,
                },
                None,
            )
            .await?;
        }
    }

    let relation_kinds = [
        RelationKind::Monochrome,
        RelationKind::MainStory,
        RelationKind::AdaptedFrom,
        RelationKind::BasedOn,
        RelationKind::Prequel,
        RelationKind::SideStory,
        RelationKind::Doujinshi,
        RelationKind::SameFranchise,
        RelationKind::SharedUniverse,
        RelationKind::Sequel,
        RelationKind::SpinOff,
        RelationKind::AlternateStory,
        RelationKind::AlternateVersion,
        RelationKind::Preserialization,
        RelationKind::Colored,
        RelationKind::Serialization,
    ];
    for _ in 0..(scale / 3).min(30) {
        let source = manga_ids[rng.random_range(0..manga_ids.len())];
        let target = manga_ids[rng.random_range(0..manga_ids.len())];
        if source == target {
            continue;
        }
        insert_relation(
            pool,
            NewRelation {
                relation: relation_kinds[rng.random_range(0..relation_kinds.len())],
                source_manga_id: source,
                target_manga_id: target,
            },
        )
        .await?;
    }

    for _ in 0..scale.min(100) {
        let manga_id = manga_ids[rng.random_range(0..manga_ids.len())];
        let recommended = manga_ids[rng.random_range(0..manga_ids.len())];
        if manga_id == recommended {
            continue;
        }
        let score = (rng.random_range(0.5..1.0) * 100.0_f64).round() / 100.0;
        insert_recommendation(
            pool,
            NewRecommendation {
                score,
                manga_id,
                recommended_manga_id: recommended,
            },
        )
        .await?;
    }

    Ok(())
}
