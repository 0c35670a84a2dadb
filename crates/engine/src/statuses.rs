//! User status lookup table.
//!
//! A status is a short unique code (`ACTIVE`, `ON_LEAVE`, ...) with a human
//! readable title. Profiles reference it; deleting a status clears the
//! reference on every profile.

use std::fmt;

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    FieldErrors,
    util::{optional_text, required_text},
};

pub const STATUS_MAX_LENGTH: usize = 50;
pub const TITLE_MAX_LENGTH: usize = 50;
pub const DESCRIPTION_MAX_LENGTH: usize = 250;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStatus {
    pub id: i64,
    /// Unique status code.
    pub status: String,
    pub title: String,
    pub description: Option<String>,
}

impl UserStatus {
    /// Label used wherever the status is displayed.
    pub fn label(&self) -> &str {
        &self.title
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fields accepted when creating or editing a status.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInput {
    pub status: String,
    pub title: String,
    pub description: Option<String>,
}

impl StatusInput {
    pub fn new(status: &str, title: &str, description: Option<&str>) -> Self {
        Self {
            status: status.to_string(),
            title: title.to_string(),
            description: description.map(ToString::to_string),
        }
    }

    /// Check lengths and required fields, returning the cleaned values.
    pub(crate) fn clean(&self) -> Result<StatusInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let cleaned = StatusInput {
            status: required_text(&mut errors, "status", &self.status, STATUS_MAX_LENGTH),
            title: required_text(&mut errors, "title", &self.title, TITLE_MAX_LENGTH),
            description: optional_text(
                &mut errors,
                "description",
                self.description.as_deref(),
                DESCRIPTION_MAX_LENGTH,
            ),
        };
        if errors.is_empty() {
            Ok(cleaned)
        } else {
            Err(errors)
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "user_status")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub status: String,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::profiles::Entity")]
    Profiles,
}

impl Related<super::profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profiles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for UserStatus {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            status: model.status,
            title: model.title,
            description: model.description,
        }
    }
}

impl From<StatusInput> for ActiveModel {
    fn from(input: StatusInput) -> Self {
        Self {
            id: ActiveValue::NotSet,
            status: ActiveValue::Set(input.status),
            title: ActiveValue::Set(input.title),
            description: ActiveValue::Set(input.description),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_label_is_title() {
        let status = UserStatus {
            id: 1,
            status: "ACTIVE".to_string(),
            title: "Active".to_string(),
            description: None,
        };
        assert_eq!(status.to_string(), "Active");
    }

    #[test]
    fn clean_rejects_long_status_code() {
        let input = StatusInput::new(&"Q".repeat(100), &"Z".repeat(100), Some("desc"));
        let errors = input.clean().unwrap_err();
        assert!(errors.contains("status"));
        assert!(errors.contains("title"));
        assert!(!errors.contains("description"));
    }

    #[test]
    fn clean_trims_and_drops_blank_description() {
        let input = StatusInput::new(" ACTIVE ", "Active", Some("  "));
        let cleaned = input.clean().unwrap();
        assert_eq!(cleaned.status, "ACTIVE");
        assert_eq!(cleaned.description, None);
    }
}
