//! Administrative list configuration.
//!
//! Each entity registered in the admin declares which columns its list view
//! shows, which of them link to the edit view, which fields are searched and
//! filtered, and which can be edited inline. [`AdminListing`] turns a record
//! into the text cells of one list row.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{UserDepartment, UserProfile, UserStatus, users::Identity};

/// Placeholder shown for empty cells.
pub const EMPTY_VALUE_DISPLAY: &str = "-not filled-";

/// List view configuration of one admin entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AdminConfig {
    pub name: &'static str,
    pub verbose_name: &'static str,
    pub verbose_name_plural: &'static str,
    pub list_display: &'static [&'static str],
    pub list_display_links: &'static [&'static str],
    pub list_editable: &'static [&'static str],
    pub search_fields: &'static [&'static str],
    pub list_filter: &'static [&'static str],
    pub ordering: &'static [&'static str],
    pub readonly_fields: &'static [&'static str],
    pub empty_value_display: &'static str,
}

pub const STATUS_ADMIN: AdminConfig = AdminConfig {
    name: "statuses",
    verbose_name: "User status",
    verbose_name_plural: "User statuses",
    list_display: &["id", "status", "title", "description"],
    list_display_links: &["id", "status"],
    list_editable: &[],
    search_fields: &["status", "title", "description"],
    list_filter: &[],
    ordering: &["id"],
    readonly_fields: &[],
    empty_value_display: EMPTY_VALUE_DISPLAY,
};

pub const DEPARTMENT_ADMIN: AdminConfig = AdminConfig {
    name: "departments",
    verbose_name: "User division",
    verbose_name_plural: "User divisions",
    list_display: &["id", "title", "block", "department", "group", "branch"],
    list_display_links: &["id", "department"],
    list_editable: &[],
    search_fields: &["title", "block", "department", "group", "branch"],
    list_filter: &[],
    ordering: &["id"],
    readonly_fields: &[],
    empty_value_display: EMPTY_VALUE_DISPLAY,
};

pub const PROFILE_ADMIN: AdminConfig = AdminConfig {
    name: "profiles",
    verbose_name: "User profile",
    verbose_name_plural: "Users profiles",
    list_display: &[
        "user",
        "last_name",
        "first_name",
        "middle_name",
        "status",
        "mobile_phone",
        "department",
        "post",
    ],
    list_display_links: &["user", "last_name"],
    list_editable: &["status", "department"],
    search_fields: &[
        "user",
        "last_name",
        "first_name",
        "middle_name",
        "status",
        "department",
    ],
    list_filter: &["status", "post", "department"],
    ordering: &["last_name", "first_name"],
    readonly_fields: &["user_link"],
    empty_value_display: EMPTY_VALUE_DISPLAY,
};

pub const IDENTITY_ADMIN: AdminConfig = AdminConfig {
    name: "users",
    verbose_name: "User",
    verbose_name_plural: "Users",
    list_display: &["id", "username", "email", "is_active", "date_joined"],
    list_display_links: &["id", "username"],
    list_editable: &[],
    search_fields: &["username", "email"],
    list_filter: &["is_active"],
    ordering: &["username"],
    readonly_fields: &["date_joined"],
    empty_value_display: EMPTY_VALUE_DISPLAY,
};

/// Every entity registered in the admin, in menu order.
pub const REGISTRY: [AdminConfig; 4] = [
    STATUS_ADMIN,
    DEPARTMENT_ADMIN,
    PROFILE_ADMIN,
    IDENTITY_ADMIN,
];

/// One rendered cell of a list row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub column: &'static str,
    pub value: Option<String>,
}

impl Cell {
    /// Cell text with the empty placeholder applied.
    pub fn display(&self) -> &str {
        self.value
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(EMPTY_VALUE_DISPLAY)
    }
}

/// A record that can be shown as a row of an admin list view.
pub trait AdminListing {
    const CONFIG: AdminConfig;

    /// Primary key rendered as text.
    fn row_id(&self) -> String;

    /// Raw value of a `list_display` column, `None` when unset.
    fn cell(&self, column: &str) -> Option<String>;

    /// Value of a timestamp column. These are left to the caller to render
    /// in its time zone, `cell` returns `None` for them.
    fn timestamp(&self, _column: &str) -> Option<DateTime<Utc>> {
        None
    }

    fn cells(&self) -> Vec<Cell> {
        Self::CONFIG
            .list_display
            .iter()
            .map(|&column| Cell {
                column,
                value: self.cell(column),
            })
            .collect()
    }
}

impl AdminListing for UserStatus {
    const CONFIG: AdminConfig = STATUS_ADMIN;

    fn row_id(&self) -> String {
        self.id.to_string()
    }

    fn cell(&self, column: &str) -> Option<String> {
        match column {
            "id" => Some(self.id.to_string()),
            "status" => Some(self.status.clone()),
            "title" => Some(self.title.clone()),
            "description" => self.description.clone(),
            _ => None,
        }
    }
}

impl AdminListing for UserDepartment {
    const CONFIG: AdminConfig = DEPARTMENT_ADMIN;

    fn row_id(&self) -> String {
        self.id.to_string()
    }

    fn cell(&self, column: &str) -> Option<String> {
        match column {
            "id" => Some(self.id.to_string()),
            "title" => Some(self.title.clone()),
            "block" => self.block.clone(),
            "department" => self.department.clone(),
            "group" => self.group.clone(),
            "branch" => self.branch.clone(),
            _ => None,
        }
    }
}

impl AdminListing for Identity {
    const CONFIG: AdminConfig = IDENTITY_ADMIN;

    fn row_id(&self) -> String {
        self.id.to_string()
    }

    fn cell(&self, column: &str) -> Option<String> {
        match column {
            "id" => Some(self.id.to_string()),
            "username" => Some(self.username.clone()),
            "email" => self.email.clone(),
            "is_active" => Some(self.is_active.to_string()),
            _ => None,
        }
    }

    fn timestamp(&self, column: &str) -> Option<DateTime<Utc>> {
        match column {
            "date_joined" => Some(self.date_joined),
            _ => None,
        }
    }
}

/// A profile joined with the records its list row shows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProfileListItem {
    pub profile: UserProfile,
    pub username: String,
    pub status: Option<UserStatus>,
    pub department: Option<UserDepartment>,
}

impl ProfileListItem {
    /// Path of the owning identity's edit view.
    pub fn user_link(&self) -> String {
        format!("/admin/users/{}", self.profile.user_id)
    }
}

impl AdminListing for ProfileListItem {
    const CONFIG: AdminConfig = PROFILE_ADMIN;

    fn row_id(&self) -> String {
        self.profile.id.to_string()
    }

    fn cell(&self, column: &str) -> Option<String> {
        let profile = &self.profile;
        match column {
            "user" => Some(self.username.clone()),
            "last_name" => profile.last_name.clone(),
            "first_name" => profile.first_name.clone(),
            "middle_name" => profile.middle_name.clone(),
            "status" => self.status.as_ref().map(ToString::to_string),
            "mobile_phone" => profile.mobile_phone.clone(),
            "department" => self.department.as_ref().map(ToString::to_string),
            "post" => profile.post.clone(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cells_show_placeholder() {
        let status = UserStatus {
            id: 3,
            status: "ACTIVE".to_string(),
            title: "Active".to_string(),
            description: None,
        };
        let cells = status.cells();
        let columns: Vec<_> = cells.iter().map(|c| c.column).collect();
        assert_eq!(columns, STATUS_ADMIN.list_display);
        assert_eq!(cells[0].display(), "3");
        assert_eq!(cells[3].display(), EMPTY_VALUE_DISPLAY);
    }

    #[test]
    fn links_and_editable_columns_are_displayed() {
        for config in REGISTRY {
            for link in config.list_display_links {
                assert!(config.list_display.contains(link), "{} {link}", config.name);
            }
            for editable in config.list_editable {
                assert!(config.list_display.contains(editable), "{} {editable}", config.name);
                assert!(!config.list_display_links.contains(editable));
            }
        }
    }

    #[test]
    fn identity_timestamps_are_not_rendered_as_text() {
        let user = Identity {
            id: 1,
            username: "jdoe".to_string(),
            email: None,
            is_active: true,
            date_joined: Utc::now(),
        };
        assert_eq!(user.cell("date_joined"), None);
        assert_eq!(user.timestamp("date_joined"), Some(user.date_joined));
        assert_eq!(user.timestamp("username"), None);
    }
}
