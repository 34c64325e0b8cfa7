use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Locale code (`en`, `ja`, `pt-br`, ...) to text.
pub type LocalizedMap = BTreeMap<String, String>;

pub const ROLE_USER: &str = "ROLE_USER";
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";

/// Two lowercase letters with an optional two-letter region (`en`, `pt-br`).
pub fn is_language_code(value: &str) -> bool {
    let bytes = value.as_bytes();
    match bytes.len() {
        2 => bytes.iter().all(u8::is_ascii_lowercase),
        5 => {
            bytes[2] == b'-'
                && bytes[..2].iter().all(u8::is_ascii_lowercase)
                && bytes[3..].iter().all(u8::is_ascii_lowercase)
        }
        _ => false,
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MangaStatus {
    Ongoing,
    Completed,
    Hiatus,
    Cancelled,
}

impl MangaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MangaStatus::Ongoing => "ongoing",
            MangaStatus::Completed => "completed",
            MangaStatus::Hiatus => "hiatus",
            MangaStatus::Cancelled => "cancelled",
        }
    }
}

impl TryFrom<String> for MangaStatus {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_str() {
            "ongoing" => Ok(Self::Ongoing),
            "completed" => Ok(Self::Completed),
            "hiatus" => Ok(Self::Hiatus),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("{} is not a valid manga status.", other)),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MangaState {
    Draft,
    Submitted,
    Published,
    Rejected,
}

impl MangaState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MangaState::Draft => "draft",
            MangaState::Submitted => "submitted",
            MangaState::Published => "published",
            MangaState::Rejected => "rejected",
        }
    }
}

impl TryFrom<String> for MangaState {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_str() {
            "draft" => Ok(Self::Draft),
            "submitted" => Ok(Self::Submitted),
            "published" => Ok(Self::Published),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("{} is not a valid manga state.", other)),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PublicationDemographic {
    Shounen,
    Shoujo,
    Josei,
    Seinen,
}

impl PublicationDemographic {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublicationDemographic::Shounen => "shounen",
            PublicationDemographic::Shoujo => "shoujo",
            PublicationDemographic::Josei => "josei",
            PublicationDemographic::Seinen => "seinen",
        }
    }
}

impl TryFrom<String> for PublicationDemographic {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_str() {
            "shounen" => Ok(Self::Shounen),
            "shoujo" => Ok(Self::Shoujo),
            "josei" => Ok(Self::Josei),
            "seinen" => Ok(Self::Seinen),
            other => Err(format!("{} is not a valid publication demographic.", other)),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContentRating {
    Safe,
    Suggestive,
    Erotica,
    Pornographic,
}

impl ContentRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentRating::Safe => "safe",
            ContentRating::Suggestive => "suggestive",
            ContentRating::Erotica => "erotica",
            ContentRating::Pornographic => "pornographic",
        }
    }
}

impl TryFrom<String> for ContentRating {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_str() {
            "safe" => Ok(Self::Safe),
            "suggestive" => Ok(Self::Suggestive),
            "erotica" => Ok(Self::Erotica),
            "pornographic" => Ok(Self::Pornographic),
            other => Err(format!("{} is not a valid content rating.", other)),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TagGroup {
    Content,
    Format,
    Genre,
    Theme,
}

impl TagGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagGroup::Content => "content",
            TagGroup::Format => "format",
            TagGroup::Genre => "genre",
            TagGroup::Theme => "theme",
        }
    }
}

impl TryFrom<String> for TagGroup {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_str() {
            "content" => Ok(Self::Content),
            "format" => Ok(Self::Format),
            "genre" => Ok(Self::Genre),
            "theme" => Ok(Self::Theme),
            other => Err(format!("{} is not a valid tag group.", other)),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ListVisibility {
    Public,
    Private,
}

impl ListVisibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListVisibility::Public => "public",
            ListVisibility::Private => "private",
        }
    }
}

impl Default for ListVisibility {
    fn default() -> Self {
        ListVisibility::Private
    }
}

impl TryFrom<String> for ListVisibility {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_str() {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            other => Err(format!("{} is not a valid list visibility.", other)),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Waiting,
    Accepted,
    Refused,
    Autoresolved,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Waiting => "waiting",
            ReportStatus::Accepted => "accepted",
            ReportStatus::Refused => "refused",
            ReportStatus::Autoresolved => "autoresolved",
        }
    }
}

impl TryFrom<String> for ReportStatus {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_str() {
            "waiting" => Ok(Self::Waiting),
            "accepted" => Ok(Self::Accepted),
            "refused" => Ok(Self::Refused),
            "autoresolved" => Ok(Self::Autoresolved),
            other => Err(format!("{} is not a valid report status.", other)),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportTargetKind {
    Chapter,
    Manga,
    Author,
    ScanlationGroup,
    Tag,
    CoverArt,
}

impl ReportTargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportTargetKind::Chapter => "chapter",
            ReportTargetKind::Manga => "manga",
            ReportTargetKind::Author => "author",
            ReportTargetKind::ScanlationGroup => "scanlation_group",
            ReportTargetKind::Tag => "tag",
            ReportTargetKind::CoverArt => "cover_art",
        }
    }
}

impl TryFrom<String> for ReportTargetKind {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_str() {
            "chapter" => Ok(Self::Chapter),
            "manga" => Ok(Self::Manga),
            "author" => Ok(Self::Author),
            "scanlation_group" => Ok(Self::ScanlationGroup),
            "tag" => Ok(Self::Tag),
            "cover_art" => Ok(Self::CoverArt),
            other => Err(format!("{} is not a valid report target kind.", other)),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Monochrome,
    MainStory,
    AdaptedFrom,
    BasedOn,
    Prequel,
    SideStory,
    Doujinshi,
    SameFranchise,
    SharedUniverse,
    Sequel,
    SpinOff,
    AlternateStory,
    AlternateVersion,
    Preserialization,
    Colored,
    Serialization,
}

impl RelationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Monochrome => "monochrome",
            RelationKind::MainStory => "main_story",
            RelationKind::AdaptedFrom => "adapted_from",
            RelationKind::BasedOn => "based_on",
            RelationKind::Prequel => "prequel",
            RelationKind::SideStory => "side_story",
            RelationKind::Doujinshi => "doujinshi",
            RelationKind::SameFranchise => "same_franchise",
            RelationKind::SharedUniverse => "shared_universe",
            RelationKind::Sequel => "sequel",
            RelationKind::SpinOff => "spin_off",
            RelationKind::AlternateStory => "alternate_story",
            RelationKind::AlternateVersion => "alternate_version",
            RelationKind::Preserialization => "preserialization",
            RelationKind::Colored => "colored",
            RelationKind::Serialization => "serialization",
        }
    }
}

impl TryFrom<String> for RelationKind {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_str() {
            "monochrome" => Ok(Self::Monochrome),
            "main_story" => Ok(Self::MainStory),
            "adapted_from" => Ok(Self::AdaptedFrom),
            "based_on" => Ok(Self::BasedOn),
            "prequel" => Ok(Self::Prequel),
            "side_story" => Ok(Self::SideStory),
            "doujinshi" => Ok(Self::Doujinshi),
            "same_franchise" => Ok(Self::SameFranchise),
            "shared_universe" => Ok(Self::SharedUniverse),
            "sequel" => Ok(Self::Sequel),
            "spin_off" => Ok(Self::SpinOff),
            "alternate_story" => Ok(Self::AlternateStory),
            "alternate_version" => Ok(Self::AlternateVersion),
            "preserialization" => Ok(Self::Preserialization),
            "colored" => Ok(Self::Colored),
            "serialization" => Ok(Self::Serialization),
            other => Err(format!("{} is not a valid manga relation.", other)),
        }
    }
}

/// Row shape of `users`. The password hash travels separately so it can
/// never end up in a response body.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Stored roles plus the implicit `ROLE_USER`.
    pub fn effective_roles(&self) -> Vec<String> {
        let mut roles = self.roles.clone();
        if !roles.iter().any(|role| role == ROLE_USER) {
            roles.push(ROLE_USER.to_string());
        }
        roles
    }

    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|role| role == ROLE_ADMIN)
    }
}

#[derive(Debug)]
pub struct MangaEntity {
    pub id: Uuid,
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
    pub available_translated_languages: Vec<String>,
    pub latest_uploaded_chapter: Option<Uuid>,
    pub state: MangaState,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct MangaAuthorEntity {
    pub manga_id: Uuid,
    pub author_id: Uuid,
}

#[derive(Debug)]
pub struct MangaTagEntity {
    pub manga_id: Uuid,
    pub tag_id: Uuid,
}

#[derive(serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Manga {
    pub id: Uuid,
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
    pub available_translated_languages: Vec<String>,
    pub latest_uploaded_chapter: Option<Uuid>,
    pub state: MangaState,
    pub authors: Vec<Uuid>,
    pub artists: Vec<Uuid>,
    pub tags: Vec<Uuid>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Manga {
    #[tracing::instrument(name = "transform manga", skip_all, fields(manga_id = %entity.id))]
    pub fn from_entity(
        entity: MangaEntity,
        authors: &[MangaAuthorEntity],
        artists: &[MangaAuthorEntity],
        tags: &[MangaTagEntity],
    ) -> Self {
        let manga_authors: Vec<Uuid> = authors
            .iter()
            .filter(|link| link.manga_id == entity.id)
            .map(|link| link.author_id)
            .collect();
        let manga_artists: Vec<Uuid> = artists
            .iter()
            .filter(|link| link.manga_id == entity.id)
            .map(|link| link.author_id)
            .collect();
        let manga_tags: Vec<Uuid> = tags
            .iter()
            .filter(|link| link.manga_id == entity.id)
            .map(|link| link.tag_id)
            .collect();

        Manga {
            id: entity.id,
            title: entity.title,
            alt_titles: entity.alt_titles,
            description: entity.description,
            is_locked: entity.is_locked,
            links: entity.links,
            official_links: entity.official_links,
            original_language: entity.original_language,
            last_volume: entity.last_volume,
            last_chapter: entity.last_chapter,
            publication_demographic: entity.publication_demographic,
            status: entity.status,
            year: entity.year,
            content_rating: entity.content_rating,
            chapter_numbers_reset_on_new_volume: entity.chapter_numbers_reset_on_new_volume,
            available_translated_languages: entity.available_translated_languages,
            latest_uploaded_chapter: entity.latest_uploaded_chapter,
            state: entity.state,
            authors: manga_authors,
            artists: manga_artists,
            tags: manga_tags,
            version: entity.version,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

pub fn transform_manga_entities(
    manga: Vec<MangaEntity>,
    authors: &[MangaAuthorEntity],
    artists: &[MangaAuthorEntity],
    tags: &[MangaTagEntity],
) -> Vec<Manga> {
    manga
        .into_iter()
        .map(|entity| Manga::from_entity(entity, authors, artists, tags))
        .collect()
}

#[derive(serde::Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MangaStatistics {
    pub total: i64,
    pub published: i64,
    pub draft: i64,
    pub ongoing: i64,
    pub completed: i64,
}

#[derive(Debug)]
pub struct ChapterEntity {
    pub id: Uuid,
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
    pub uploader_id: Uuid,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ChapterGroupEntity {
    pub chapter_id: Uuid,
    pub scanlation_group_id: Uuid,
}

#[derive(serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: Uuid,
    pub title: Option<String>,
    pub volume: Option<String>,
    pub chapter: Option<String>,
    pub pages: i32,
    pub translated_language: String,
    pub external_url: Option<String>,
    pub publish_at: Option<DateTime<Utc>>,
    pub readable_at: Option<DateTime<Utc>>,
    pub is_unavailable: bool,
    pub manga: Uuid,
    pub uploader: Uuid,
    pub groups: Vec<Uuid>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chapter {
    pub fn from_entity(entity: ChapterEntity, groups: &[ChapterGroupEntity]) -> Self {
        let chapter_groups: Vec<Uuid> = groups
            .iter()
            .filter(|link| link.chapter_id == entity.id)
            .map(|link| link.scanlation_group_id)
            .collect();

        Chapter {
            id: entity.id,
            title: entity.title,
            volume: entity.volume,
            chapter: entity.chapter,
            pages: entity.pages,
            translated_language: entity.translated_language,
            external_url: entity.external_url,
            publish_at: entity.publish_at,
            readable_at: entity.readable_at,
            is_unavailable: entity.is_unavailable,
            manga: entity.manga_id,
            uploader: entity.uploader_id,
            groups: chapter_groups,
            version: entity.version,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

pub fn transform_chapter_entities(
    chapters: Vec<ChapterEntity>,
    groups: &[ChapterGroupEntity],
) -> Vec<Chapter> {
    chapters
        .into_iter()
        .map(|entity| Chapter::from_entity(entity, groups))
        .collect()
}

#[derive(serde::Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: Uuid,
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
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(serde::Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: Uuid,
    pub name: LocalizedMap,
    pub description: LocalizedMap,
    pub tag_group: TagGroup,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ScanlationGroupEntity {
    pub id: Uuid,
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
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct GroupMemberEntity {
    pub scanlation_group_id: Uuid,
    pub user_id: Uuid,
}

#[derive(serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ScanlationGroup {
    pub id: Uuid,
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
    pub leader: Uuid,
    pub members: Vec<Uuid>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScanlationGroup {
    pub fn from_entity(entity: ScanlationGroupEntity, members: &[GroupMemberEntity]) -> Self {
        let group_members: Vec<Uuid> = members
            .iter()
            .filter(|link| link.scanlation_group_id == entity.id)
            .map(|link| link.user_id)
            .collect();

        ScanlationGroup {
            id: entity.id,
            name: entity.name,
            alt_names: entity.alt_names,
            website: entity.website,
            irc_server: entity.irc_server,
            irc_channel: entity.irc_channel,
            discord: entity.discord,
            contact_email: entity.contact_email,
            description: entity.description,
            twitter: entity.twitter,
            manga_updates: entity.manga_updates,
            focused_languages: entity.focused_languages,
            inactive: entity.inactive,
            locked: entity.locked,
            official: entity.official,
            verified: entity.verified,
            ex_licensed: entity.ex_licensed,
            publish_delay: entity.publish_delay,
            leader: entity.leader_id,
            members: group_members,
            version: entity.version,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

pub fn transform_group_entities(
    groups: Vec<ScanlationGroupEntity>,
    members: &[GroupMemberEntity],
) -> Vec<ScanlationGroup> {
    groups
        .into_iter()
        .map(|entity| ScanlationGroup::from_entity(entity, members))
        .collect()
}

#[derive(serde::Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CoverArt {
    pub id: Uuid,
    pub volume: Option<String>,
    pub file_name: String,
    pub locale: Option<String>,
    pub description: Option<String>,
    pub manga: Uuid,
    pub uploader: Uuid,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct CustomListEntity {
    pub id: Uuid,
    pub name: String,
    pub visibility: ListVisibility,
    pub owner_id: Uuid,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct CustomListMangaEntity {
    pub custom_list_id: Uuid,
    pub manga_id: Uuid,
}

#[derive(serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CustomList {
    pub id: Uuid,
    pub name: String,
    pub visibility: ListVisibility,
    pub owner: Uuid,
    pub manga: Vec<Uuid>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CustomList {
    pub fn from_entity(entity: CustomListEntity, manga: &[CustomListMangaEntity]) -> Self {
        let list_manga: Vec<Uuid> = manga
            .iter()
            .filter(|link| link.custom_list_id == entity.id)
            .map(|link| link.manga_id)
            .collect();

        CustomList {
            id: entity.id,
            name: entity.name,
            visibility: entity.visibility,
            owner: entity.owner_id,
            manga: list_manga,
            version: entity.version,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

pub fn transform_list_entities(
    lists: Vec<CustomListEntity>,
    manga: &[CustomListMangaEntity],
) -> Vec<CustomList> {
    lists
        .into_iter()
        .map(|entity| CustomList::from_entity(entity, manga))
        .collect()
}

#[derive(serde::Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub details: String,
    pub target_kind: ReportTargetKind,
    pub object_id: Uuid,
    pub status: ReportStatus,
    pub creator: Uuid,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(serde::Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MangaRelation {
    pub id: Uuid,
    pub relation: RelationKind,
    pub source_manga: Uuid,
    pub target_manga: Uuid,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(serde::Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MangaRecommendation {
    pub id: Uuid,
    pub score: f64,
    pub manga: Uuid,
    pub recommended_manga: Uuid,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
