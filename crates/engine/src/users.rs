//! Identity records.
//!
//! The account entity profiles attach to. Authentication lives elsewhere, so
//! only the fields the profile system needs are stored here.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    FieldErrors,
    util::{optional_text, required_text},
};

pub const USERNAME_MAX_LENGTH: usize = 150;
pub const EMAIL_MAX_LENGTH: usize = 254;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityInput {
    pub username: String,
    pub email: Option<String>,
    pub is_active: bool,
}

impl IdentityInput {
    pub fn new(username: &str) -> Self {
        Self {
            username: username.to_string(),
            email: None,
            is_active: true,
        }
    }

    pub(crate) fn clean(&self) -> Result<IdentityInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let username = required_text(&mut errors, "username", &self.username, USERNAME_MAX_LENGTH);
        if !username
            .chars()
            .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
        {
            errors.add(
                "username",
                "Enter a valid username. It may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        } else if !username.is_empty() && username.chars().all(|c| c == '.') {
            // The username is a path segment of the avatar directory.
            errors.add("username", "Enter a valid username. It may not consist of dots only.");
        }
        let email = optional_text(&mut errors, "email", self.email.as_deref(), EMAIL_MAX_LENGTH);
        if let Some(email) = email.as_deref()
            && !is_plausible_email(email)
        {
            errors.add("email", "Enter a valid email address.");
        }
        let cleaned = IdentityInput {
            username,
            email,
            is_active: self.is_active,
        };
        if errors.is_empty() {
            Ok(cleaned)
        } else {
            Err(errors)
        }
    }
}

fn is_plausible_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub username: String,
    pub email: Option<String>,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::profiles::Entity")]
    Profile,
}

impl Related<super::profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Identity {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            is_active: model.is_active,
            date_joined: model.date_joined,
        }
    }
}
