use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

pub mod admin {
    use super::*;

    /// Search query shared by every list endpoint.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SearchParams {
        pub q: Option<String>,
    }

    /// List view configuration of one registered entity.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntityInfo {
        pub name: String,
        pub verbose_name: String,
        pub verbose_name_plural: String,
        pub list_display: Vec<String>,
        pub list_display_links: Vec<String>,
        pub list_editable: Vec<String>,
        pub search_fields: Vec<String>,
        pub list_filter: Vec<String>,
        pub ordering: Vec<String>,
        pub readonly_fields: Vec<String>,
        pub empty_value_display: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SiteInfo {
        pub app_name: String,
        pub language_code: String,
        pub time_zone: String,
        pub entities: Vec<EntityInfo>,
    }

    /// One row of a list view.
    ///
    /// `columns` holds the rendered text of every `list_display` column and
    /// `links` the edit URL of every linked column.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ListRow {
        pub id: String,
        pub columns: BTreeMap<String, String>,
        pub links: BTreeMap<String, String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ListResponse {
        pub entity: String,
        pub list_display: Vec<String>,
        pub rows: Vec<ListRow>,
        pub total: u64,
        pub page: u64,
        pub pages: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ErrorResponse {
        pub error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub fields: Option<BTreeMap<String, Vec<String>>>,
    }
}

pub mod status {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatusForm {
        pub status: String,
        pub title: String,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatusView {
        pub id: i64,
        pub status: String,
        pub title: String,
        pub description: Option<String>,
        /// Text shown wherever the status is referenced.
        pub label: String,
    }
}

pub mod department {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DepartmentForm {
        pub title: String,
        pub block: Option<String>,
        pub department: Option<String>,
        pub group: Option<String>,
        pub branch: Option<String>,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DepartmentView {
        pub id: i64,
        pub title: String,
        pub block: Option<String>,
        pub department: Option<String>,
        pub group: Option<String>,
        pub branch: Option<String>,
        pub description: Option<String>,
        pub label: String,
    }
}

pub mod profile {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ProfileListParams {
        pub q: Option<String>,
        pub status_id: Option<i64>,
        pub department_id: Option<i64>,
        pub post: Option<String>,
        pub page: Option<u64>,
    }

    /// Full edit form. Omitted fields are cleared.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ProfileForm {
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

    /// Columns editable straight from the list view.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ProfileInlineEdit {
        pub status_id: Option<i64>,
        pub department_id: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AvatarParams {
        pub filename: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProfileView {
        /// Profile id (UUID), serialized as a string in JSON.
        pub id: Uuid,
        pub user_id: i64,
        pub username: String,
        pub user_link: String,
        pub status_id: Option<i64>,
        pub status: Option<String>,
        pub department_id: Option<i64>,
        pub department: Option<String>,
        pub avatar: String,
        pub avatar_url: String,
        pub last_name: Option<String>,
        pub first_name: Option<String>,
        pub middle_name: Option<String>,
        pub full_name: String,
        pub short_name: String,
        pub abbreviation: String,
        pub mobile_phone: Option<String>,
        pub phone: Option<String>,
        pub description: Option<String>,
        pub experience_start: Option<NaiveDate>,
        pub experience_now: Option<NaiveDate>,
        pub experience_description: Option<String>,
        pub post: Option<String>,
        /// Rendered in the configured time zone.
        pub created_time: String,
        pub updated_time: String,
    }
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserForm {
        pub username: String,
        pub email: Option<String>,
        pub is_active: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: i64,
        pub username: String,
        pub email: Option<String>,
        pub is_active: bool,
        pub date_joined: String,
        /// Edit view of the profile created for this user, if any.
        pub profile_link: Option<String>,
    }
}
