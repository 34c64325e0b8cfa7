use std::borrow::Cow;
use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidateEmail, ValidateLength, ValidationError, ValidationErrors};

use crate::{
    db::group::{
        GroupFilter, NewGroup, delete_group, get_group_by_id, get_groups_with_pagination,
        insert_group, update_group,
    },
    error::Error,
    model::{ScanlationGroup, User, is_language_code},
    state::SharedAppState,
};

use super::Pagination;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
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
    #[serde(default)]
    pub inactive: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub official: bool,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub ex_licensed: bool,
    pub publish_delay: Option<String>,
    pub leader: Uuid,
    #[serde(default)]
    pub members: Vec<Uuid>,
}

fn check_group_fields(
    errors: &mut ValidationErrors,
    contact_email: &Option<String>,
    focused_languages: &Option<Vec<String>>,
) {
    if let Some(contact_email) = contact_email {
        if !contact_email.validate_email() {
            errors.add(
                "contactEmail",
                ValidationError::new("contact_email_email")
                    .with_message(Cow::from("Contact email must be an email")),
            );
        }
    }
    if let Some(focused_languages) = focused_languages {
        for language in focused_languages {
            if !is_language_code(language) {
                errors.add(
                    "focusedLanguages",
                    ValidationError::new("focused_languages_format").with_message(Cow::from(
                        format!("{} is not a valid language code", language),
                    )),
                );
            }
        }
    }
}

impl Validate for CreateGroupRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !self.name.validate_length(Some(1), Some(255), None) {
            errors.add(
                "name",
                ValidationError::new("name_length")
                    .with_message(Cow::from("Name length must be between 1 and 255")),
            );
        }
        check_group_fields(&mut errors, &self.contact_email, &self.focused_languages);

        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroupRequest {
    pub name: Option<String>,
    pub alt_names: Option<Vec<String>>,
    pub website: Option<String>,
    pub irc_server: Option<String>,
    pub irc_channel: Option<String>,
    pub discord: Option<String>,
    pub contact_email: Option<String>,
    pub description: Option<String>,
    pub twitter: Option<String>,
    pub manga_updates: Option<String>,
    pub focused_languages: Option<Vec<String>>,
    pub inactive: Option<bool>,
    pub locked: Option<bool>,
    pub official: Option<bool>,
    pub verified: Option<bool>,
    pub ex_licensed: Option<bool>,
    pub publish_delay: Option<String>,
    pub leader: Option<Uuid>,
    pub members: Option<Vec<Uuid>>,
    pub version: Option<i32>,
}

impl Validate for UpdateGroupRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !self.name.validate_length(Some(1), Some(255), None) {
            errors.add(
                "name",
                ValidationError::new("name_length")
                    .with_message(Cow::from("Name length must be between 1 and 255")),
            );
        }
        check_group_fields(&mut errors, &self.contact_email, &self.focused_languages);

        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(())
    }
}

#[derive(Deserialize, Debug)]
pub struct GroupListQuery {
    name: Option<String>,
    verified: Option<bool>,
    official: Option<bool>,
    inactive: Option<bool>,
}

#[derive(Deserialize)]
pub struct UrlPath {
    id: Uuid,
}

#[tracing::instrument(name = "[GET] groups", skip_all)]
pub async fn index(
    State(app_state): State<SharedAppState>,
    Query(pagination): Query<Pagination>,
    Query(query): Query<GroupListQuery>,
) -> Result<Json<Vec<ScanlationGroup>>, Error> {
    pagination.validate().map_err(Error::Validation)?;

    let filter = GroupFilter {
        name: query.name,
        verified: query.verified,
        official: query.official,
        inactive: query.inactive,
    };

    let result = get_groups_with_pagination(
        &app_state.pool,
        &filter,
        pagination.limit(),
        pagination.offset(),
    )
    .await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[GET] groups/{id}", skip_all, fields(group_id = %path.id))]
pub async fn show(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
) -> Result<Json<ScanlationGroup>, Error> {
    let result = get_group_by_id(&app_state.pool, path.id).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[POST] groups", skip_all)]
pub async fn store(
    State(app_state): State<SharedAppState>,
    Json(request): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<ScanlationGroup>), Error> {
    request.validate().map_err(Error::Validation)?;

    let data = NewGroup {
        name: request.name,
        alt_names: request.alt_names,
        website: request.website,
        irc_server: request.irc_server,
        irc_channel: request.irc_channel,
        discord: request.discord,
        contact_email: request.contact_email,
        description: request.description,
        twitter: request.twitter,
        manga_updates: request.manga_updates,
        focused_languages: request.focused_languages,
        inactive: request.inactive,
        locked: request.locked,
        official: request.official,
        verified: request.verified,
        ex_licensed: request.ex_licensed,
        publish_delay: request.publish_delay,
        leader_id: request.leader,
        members: request.members,
    };

    let result = insert_group(&app_state.pool, data).await?;

    Ok((StatusCode::CREATED, Json(result)))
}

#[tracing::instrument(name = "[PUT] groups/{id}", skip_all, fields(group_id = %path.id))]
pub async fn update(
    State(app_state): State<SharedAppState>,
    Path(path): Path<UrlPath>,
    Json(request): Json<UpdateGroupRequest>,
) -> Result<Json<ScanlationGroup>, Error> {
    request.validate().map_err(Error::Validation)?;

    let current = get_group_by_id(&app_state.pool, path.id).await?;

    let data = NewGroup {
        name: request.name.unwrap_or(current.name),
        alt_names: request.alt_names.unwrap_or(current.alt_names),
        website: request.website.or(current.website),
        irc_server: request.irc_server.or(current.irc_server),
        irc_channel: request.irc_channel.or(current.irc_channel),
        discord: request.discord.or(current.discord),
        contact_email: request.contact_email.or(current.contact_email),
        description: request.description.or(current.description),
        twitter: request.twitter.or(current.twitter),
        manga_updates: request.manga_updates.or(current.manga_updates),
        focused_languages: request.focused_languages.or(current.focused_languages),
        inactive: request.inactive.unwrap_or(current.inactive),
        locked: request.locked.unwrap_or(current.locked),
        official: request.official.unwrap_or(current.official),
        verified: request.verified.unwrap_or(current.verified),
        ex_licensed: request.ex_licensed.unwrap_or(current.ex_licensed),
        publish_delay: request.publish_delay.or(current.publish_delay),
        leader_id: request.leader.unwrap_or(current.leader),
        members: request.members.unwrap_or(current.members),
    };

    let result = update_group(&app_state.pool, path.id, data, request.version).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[DELETE] groups/{id}", skip_all, fields(group_id = %path.id))]
pub async fn destroy(
    State(app_state): State<SharedAppState>,
    Extension(user): Extension<Arc<User>>,
    Path(path): Path<UrlPath>,
) -> Result<StatusCode, Error> {
    if !user.is_admin() {
        return Err(Error::Forbidden);
    }

    delete_group(&app_state.pool, path.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
