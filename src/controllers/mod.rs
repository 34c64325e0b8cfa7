use std::borrow::Cow;

use serde_aux::field_attributes::deserialize_option_number_from_string;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::model::{LocalizedMap, is_language_code};

pub mod auth;
pub mod author;
pub mod chapter;
pub mod cover;
pub mod group;
pub mod home;
pub mod list;
pub mod manga;
pub mod me;
pub mod recommendation;
pub mod relation;
pub mod report;
pub mod tag;
pub mod user;

#[derive(serde::Deserialize, Debug, Validate)]
pub struct Pagination {
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    #[validate(range(min = 0))]
    offset: Option<i64>,

    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    #[validate(range(min = 1, max = 100))]
    limit: Option<i64>,
}

impl Pagination {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0)
    }
}

/// Caps the limit of the curated manga reads, which take no offset.
#[derive(serde::Deserialize, Debug, Validate)]
pub struct ListLimit {
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    #[validate(range(min = 1, max = 100))]
    limit: Option<i64>,
}

impl ListLimit {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20)
    }
}

pub(crate) fn check_localized_keys(
    errors: &mut ValidationErrors,
    field: &'static str,
    map: &LocalizedMap,
) {
    for key in map.keys() {
        if !is_language_code(key) {
            errors.add(
                field,
                ValidationError::new("locale_key").with_message(Cow::from(format!(
                    "{} is not a valid language code",
                    key
                ))),
            );
        }
    }
}

pub(crate) fn check_localized_keys_optional(
    errors: &mut ValidationErrors,
    field: &'static str,
    map: &Option<LocalizedMap>,
) {
    if let Some(map) = map {
        check_localized_keys(errors, field, map);
    }
}
