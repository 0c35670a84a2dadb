//! User profiles.
//!
//! A profile is owned by exactly one identity record and is created only by
//! the identity lifecycle hook (see [`crate::hooks`]). It carries the
//! personnel data: names, contact numbers, employment dates and references to
//! the status and department lookup tables.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    FieldErrors, PhoneRegion,
    phone::INVALID_PHONE_MESSAGE,
    util::{normalize_optional_text, optional_text},
};

pub const NAME_MAX_LENGTH: usize = 50;
pub const POST_MAX_LENGTH: usize = 150;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Generated once on creation, never changed afterwards.
    pub id: Uuid,
    pub user_id: i64,
    pub status_id: Option<i64>,
    pub department_id: Option<i64>,
    pub avatar: String,
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    /// E.164.
    pub mobile_phone: Option<String>,
    /// E.164.
    pub phone: Option<String>,
    pub description: Option<String>,
    pub experience_start: Option<NaiveDate>,
    pub experience_now: Option<NaiveDate>,
    pub experience_description: Option<String>,
    pub post: Option<String>,
    pub created_time: DateTime<Utc>,
    pub updated_time: DateTime<Utc>,
}

impl UserProfile {
    fn last(&self) -> &str {
        self.last_name.as_deref().unwrap_or_default()
    }

    fn first(&self) -> &str {
        self.first_name.as_deref().unwrap_or_default()
    }

    fn middle(&self) -> &str {
        self.middle_name.as_deref().unwrap_or_default()
    }

    /// `"{last} {first}"`.
    pub fn short_name(&self) -> String {
        format!("{} {}", self.last(), self.first())
    }

    /// `"{last} {first} {middle}"`; missing parts are empty strings.
    pub fn full_name(&self) -> String {
        format!("{} {} {}", self.last(), self.first(), self.middle())
    }

    /// Last name followed by initials, e.g. `"Ivanov I.P."`.
    pub fn abbreviation(&self) -> String {
        let name = initial(self.first_name.as_deref());
        let patronymic = initial(self.middle_name.as_deref());
        format!("{} {name}.{patronymic}.", self.last())
    }

    pub fn show_mobile_phone(&self, region: PhoneRegion) -> Option<String> {
        self.mobile_phone
            .as_deref()
            .and_then(|number| region.normalize(number))
    }

    pub fn show_phone(&self, region: PhoneRegion) -> Option<String> {
        self.phone
            .as_deref()
            .and_then(|number| region.normalize(number))
    }
}

fn initial(value: Option<&str>) -> String {
    value
        .and_then(|v| v.chars().next())
        .map(String::from)
        .unwrap_or_default()
}

impl fmt::Display for UserProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// Every editable field of a profile, as submitted by the admin form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileInput {
    pub status_id: Option<i64>,
    pub department_id: Option<i64>,
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub mobile_phone: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub experience_start: Option<NaiveDate>,
    pub experience_now: Option<NaiveDate>,
    pub experience_description: Option<String>,
    pub post: Option<String>,
}

impl ProfileInput {
    /// Check lengths and phone numbers. Phones come back in E.164.
    ///
    /// Foreign keys are checked by the engine against the database.
    pub(crate) fn clean(&self, region: PhoneRegion) -> Result<ProfileInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let cleaned = ProfileInput {
            status_id: self.status_id,
            department_id: self.department_id,
            last_name: optional_text(
                &mut errors,
                "last_name",
                self.last_name.as_deref(),
                NAME_MAX_LENGTH,
            ),
            first_name: optional_text(
                &mut errors,
                "first_name",
                self.first_name.as_deref(),
                NAME_MAX_LENGTH,
            ),
            middle_name: optional_text(
                &mut errors,
                "middle_name",
                self.middle_name.as_deref(),
                NAME_MAX_LENGTH,
            ),
            mobile_phone: clean_phone(
                &mut errors,
                "mobile_phone",
                self.mobile_phone.as_deref(),
                region,
            ),
            phone: clean_phone(&mut errors, "phone", self.phone.as_deref(), region),
            description: normalize_optional_text(self.description.as_deref()),
            experience_start: self.experience_start,
            experience_now: self.experience_now,
            experience_description: normalize_optional_text(
                self.experience_description.as_deref(),
            ),
            post: optional_text(&mut errors, "post", self.post.as_deref(), POST_MAX_LENGTH),
        };
        if errors.is_empty() {
            Ok(cleaned)
        } else {
            Err(errors)
        }
    }
}

fn clean_phone(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    region: PhoneRegion,
) -> Option<String> {
    let raw = normalize_optional_text(value)?;
    match region.normalize(&raw) {
        Some(e164) => Some(e164),
        None => {
            errors.add(field, INVALID_PHONE_MESSAGE);
            None
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "user_profile")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub user_id: i64,
    pub status_id: Option<i64>,
    pub department_id: Option<i64>,
    pub avatar: String,
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub mobile_phone: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub experience_start: Option<Date>,
    pub experience_now: Option<Date>,
    pub experience_description: Option<String>,
    pub post: Option<String>,
    pub created_time: DateTime<Utc>,
    pub updated_time: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::statuses::Entity",
        from = "Column::StatusId",
        to = "super::statuses::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Status,
    #[sea_orm(
        belongs_to = "super::departments::Entity",
        from = "Column::DepartmentId",
        to = "super::departments::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Department,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::statuses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Status.def()
    }
}

impl Related<super::departments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for UserProfile {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            status_id: model.status_id,
            department_id: model.department_id,
            avatar: model.avatar,
            last_name: model.last_name,
            first_name: model.first_name,
            middle_name: model.middle_name,
            mobile_phone: model.mobile_phone,
            phone: model.phone,
            description: model.description,
            experience_start: model.experience_start,
            experience_now: model.experience_now,
            experience_description: model.experience_description,
            post: model.post,
            created_time: model.created_time,
            updated_time: model.updated_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(last: Option<&str>, first: Option<&str>, middle: Option<&str>) -> UserProfile {
        let now = Utc::now();
        UserProfile {
            id: Uuid::new_v4(),
            user_id: 1,
            status_id: None,
            department_id: None,
            avatar: crate::DEFAULT_AVATAR.to_string(),
            last_name: last.map(ToString::to_string),
            first_name: first.map(ToString::to_string),
            middle_name: middle.map(ToString::to_string),
            mobile_phone: None,
            phone: None,
            description: None,
            experience_start: None,
            experience_now: None,
            experience_description: None,
            post: None,
            created_time: now,
            updated_time: now,
        }
    }

    #[test]
    fn full_name_joins_with_single_spaces() {
        let p = profile(Some("Ivanov"), Some("Ivan"), Some("Petrovich"));
        assert_eq!(p.full_name(), "Ivanov Ivan Petrovich");
        assert_eq!(p.to_string(), "Ivanov Ivan Petrovich");
        assert_eq!(p.short_name(), "Ivanov Ivan");
    }

    #[test]
    fn full_name_tolerates_missing_parts() {
        assert_eq!(profile(Some("Ivanov"), None, None).full_name(), "Ivanov  ");
        assert_eq!(profile(None, Some("Ivan"), None).full_name(), " Ivan ");
        assert_eq!(profile(None, None, None).full_name(), "  ");
    }

    #[test]
    fn abbreviation_uses_initials() {
        let p = profile(Some("Иванов"), Some("Иван"), Some("Петрович"));
        assert_eq!(p.abbreviation(), "Иванов И.П.");
        assert_eq!(profile(Some("Doe"), Some("John"), None).abbreviation(), "Doe J..");
    }

    #[test]
    fn phones_are_shown_in_e164() {
        let region: PhoneRegion = "RU".parse().unwrap();
        let mut p = profile(None, None, None);
        p.mobile_phone = Some("+79161234567".to_string());
        assert_eq!(p.show_mobile_phone(region), Some("+79161234567".to_string()));
        assert_eq!(p.show_phone(region), None);
    }

    #[test]
    fn clean_normalizes_phones_and_reports_invalid_ones() {
        let region: PhoneRegion = "RU".parse().unwrap();
        let input = ProfileInput {
            mobile_phone: Some("8 916 123 45 67".to_string()),
            ..Default::default()
        };
        let cleaned = input.clean(region).unwrap();
        assert_eq!(cleaned.mobile_phone.as_deref(), Some("+79161234567"));

        let input = ProfileInput {
            phone: Some("12".to_string()),
            last_name: Some("L".repeat(51)),
            ..Default::default()
        };
        let errors = input.clean(region).unwrap_err();
        assert!(errors.contains("phone"));
        assert!(errors.contains("last_name"));
    }
}
