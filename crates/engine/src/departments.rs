//! Organizational units (block / department / group / branch).

use std::fmt;

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    FieldErrors,
    util::{optional_text, required_text},
};

pub const TITLE_MAX_LENGTH: usize = 150;
pub const UNIT_MAX_LENGTH: usize = 250;
pub const DESCRIPTION_MAX_LENGTH: usize = 150;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDepartment {
    pub id: i64,
    /// Brief title of the unit.
    pub title: String,
    pub block: Option<String>,
    pub department: Option<String>,
    pub group: Option<String>,
    pub branch: Option<String>,
    pub description: Option<String>,
}

impl UserDepartment {
    pub fn label(&self) -> &str {
        &self.title
    }
}

impl fmt::Display for UserDepartment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentInput {
    pub title: String,
    pub block: Option<String>,
    pub department: Option<String>,
    pub group: Option<String>,
    pub branch: Option<String>,
    pub description: Option<String>,
}

impl DepartmentInput {
    pub fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub(crate) fn clean(&self) -> Result<DepartmentInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let cleaned = DepartmentInput {
            title: required_text(&mut errors, "title", &self.title, TITLE_MAX_LENGTH),
            block: optional_text(&mut errors, "block", self.block.as_deref(), UNIT_MAX_LENGTH),
            department: optional_text(
                &mut errors,
                "department",
                self.department.as_deref(),
                UNIT_MAX_LENGTH,
            ),
            group: optional_text(&mut errors, "group", self.group.as_deref(), UNIT_MAX_LENGTH),
            branch: optional_text(&mut errors, "branch", self.branch.as_deref(), UNIT_MAX_LENGTH),
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
#[sea_orm(table_name = "user_department")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub block: Option<String>,
    pub department: Option<String>,
    #[sea_orm(column_name = "group")]
    pub group: Option<String>,
    pub branch: Option<String>,
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

impl From<Model> for UserDepartment {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            block: model.block,
            department: model.department,
            group: model.group,
            branch: model.branch,
            description: model.description,
        }
    }
}

impl From<DepartmentInput> for ActiveModel {
    fn from(input: DepartmentInput) -> Self {
        Self {
            id: ActiveValue::NotSet,
            title: ActiveValue::Set(input.title),
            block: ActiveValue::Set(input.block),
            department: ActiveValue::Set(input.department),
            group: ActiveValue::Set(input.group),
            branch: ActiveValue::Set(input.branch),
            description: ActiveValue::Set(input.description),
        }
    }
}
