use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    DEFAULT_AVATAR, EngineError, FieldErrors, MediaStore, ProfileInput, ProfileListItem,
    ResultEngine, UserDepartment, UserProfile, UserStatus, avatar_path, departments, profiles,
    statuses, users,
    util::{matches_terms, search_terms},
};

use super::{Engine, with_tx};

const INVALID_CHOICE_MESSAGE: &str =
    "Select a valid choice. That choice is not one of the available choices.";
const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "webp", "bmp"];
const DEFAULT_PER_PAGE: u64 = 100;

/// Search, filters and paging of the profile list view.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileQuery {
    pub search: Option<String>,
    pub status_id: Option<i64>,
    pub department_id: Option<i64>,
    pub post: Option<String>,
    /// 1-based; `0` is treated as the first page.
    pub page: u64,
    /// `0` means the default page size.
    pub per_page: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProfilePage {
    pub items: Vec<ProfileListItem>,
    /// Matching profiles across all pages.
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

impl ProfilePage {
    pub fn pages(&self) -> u64 {
        self.total.div_ceil(self.per_page).max(1)
    }
}

impl Engine {
    pub async fn profile(&self, id: Uuid) -> ResultEngine<UserProfile> {
        profiles::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| EngineError::KeyNotFound(format!("user profile {id}")))
    }

    /// Profile owned by an identity.
    pub async fn profile_by_user(&self, user_id: i64) -> ResultEngine<UserProfile> {
        profiles::Entity::find()
            .filter(profiles::Column::UserId.eq(user_id))
            .one(&self.database)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| EngineError::KeyNotFound(format!("profile of user {user_id}")))
    }

    /// Profile with its identity, status and department resolved.
    pub async fn profile_item(&self, id: Uuid) -> ResultEngine<ProfileListItem> {
        let profile = self.profile(id).await?;
        let username = users::Entity::find_by_id(profile.user_id)
            .one(&self.database)
            .await?
            .map(|u| u.username)
            .ok_or_else(|| EngineError::KeyNotFound(format!("user {}", profile.user_id)))?;
        let status = match profile.status_id {
            Some(status_id) => statuses::Entity::find_by_id(status_id)
                .one(&self.database)
                .await?
                .map(UserStatus::from),
            None => None,
        };
        let department = match profile.department_id {
            Some(department_id) => departments::Entity::find_by_id(department_id)
                .one(&self.database)
                .await?
                .map(UserDepartment::from),
            None => None,
        };
        Ok(ProfileListItem {
            profile,
            username,
            status,
            department,
        })
    }

    /// Full admin edit of a profile.
    ///
    /// The identifier and the owning identity never change.
    pub async fn update_profile(&self, id: Uuid, input: &ProfileInput) -> ResultEngine<UserProfile> {
        let input = input
            .clean(self.phone_region)
            .map_err(EngineError::Validation)?;
        with_tx!(self, |db_tx| {
            self.require_profile(&db_tx, id).await?;
            self.check_references(&db_tx, input.status_id, input.department_id)
                .await?;
            let active = profiles::ActiveModel {
                id: ActiveValue::Unchanged(id),
                status_id: ActiveValue::Set(input.status_id),
                department_id: ActiveValue::Set(input.department_id),
                last_name: ActiveValue::Set(input.last_name),
                first_name: ActiveValue::Set(input.first_name),
                middle_name: ActiveValue::Set(input.middle_name),
                mobile_phone: ActiveValue::Set(input.mobile_phone),
                phone: ActiveValue::Set(input.phone),
                description: ActiveValue::Set(input.description),
                experience_start: ActiveValue::Set(input.experience_start),
                experience_now: ActiveValue::Set(input.experience_now),
                experience_description: ActiveValue::Set(input.experience_description),
                post: ActiveValue::Set(input.post),
                updated_time: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            let model = active.update(&db_tx).await?;
            Ok(UserProfile::from(model))
        })
    }

    /// Edit the list-editable columns (status and department) of a profile.
    pub async fn inline_update_profile(
        &self,
        id: Uuid,
        status_id: Option<i64>,
        department_id: Option<i64>,
    ) -> ResultEngine<UserProfile> {
        with_tx!(self, |db_tx| {
            self.require_profile(&db_tx, id).await?;
            self.check_references(&db_tx, status_id, department_id)
                .await?;
            let active = profiles::ActiveModel {
                id: ActiveValue::Unchanged(id),
                status_id: ActiveValue::Set(status_id),
                department_id: ActiveValue::Set(department_id),
                updated_time: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            let model = active.update(&db_tx).await?;
            Ok(UserProfile::from(model))
        })
    }

    /// Store an uploaded avatar and point the profile at it.
    ///
    /// The previous avatar file is removed unless it is the shared default.
    /// The new file is removed again when the profile cannot be updated.
    pub async fn set_profile_avatar(
        &self,
        id: Uuid,
        filename: &str,
        bytes: &[u8],
        media: &MediaStore,
    ) -> ResultEngine<UserProfile> {
        validate_avatar_upload(filename, bytes).map_err(EngineError::Validation)?;
        let profile = self.profile(id).await?;
        let owner = self.identity(profile.user_id).await?;
        let path = avatar_path(&owner.username, filename.trim());
        media.save(&path, bytes).await?;

        let (model, previous) = match self.point_avatar(id, &path).await {
            Ok(stored) => stored,
            Err(err) => {
                if let Err(cleanup) = media.remove(&path).await {
                    tracing::warn!("failed to remove unused avatar {path}: {cleanup}");
                }
                return Err(err);
            }
        };

        if previous != DEFAULT_AVATAR
            && let Err(err) = media.remove(&previous).await
        {
            tracing::warn!("failed to remove previous avatar {previous}: {err}");
        }
        tracing::info!("profile {id} avatar set to {}", model.avatar);
        Ok(UserProfile::from(model))
    }

    /// Swap the stored avatar path, returning the updated row and the old path.
    async fn point_avatar(&self, id: Uuid, path: &str) -> ResultEngine<(profiles::Model, String)> {
        with_tx!(self, |db_tx| {
            let profile = self.require_profile(&db_tx, id).await?;
            let active = profiles::ActiveModel {
                id: ActiveValue::Unchanged(id),
                avatar: ActiveValue::Set(path.to_string()),
                updated_time: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            let model = active.update(&db_tx).await?;
            Ok((model, profile.avatar))
        })
    }

    /// Profile list view: filters, search, ordering by last then first name,
    /// and paging.
    pub async fn list_profiles(&self, query: &ProfileQuery) -> ResultEngine<ProfilePage> {
        let mut select = profiles::Entity::find()
            .order_by_asc(profiles::Column::LastName)
            .order_by_asc(profiles::Column::FirstName);
        if let Some(status_id) = query.status_id {
            select = select.filter(profiles::Column::StatusId.eq(status_id));
        }
        if let Some(department_id) = query.department_id {
            select = select.filter(profiles::Column::DepartmentId.eq(department_id));
        }
        if let Some(post) = query.post.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            select = select.filter(profiles::Column::Post.eq(post));
        }
        let models = select.all(&self.database).await?;

        let user_ids: Vec<i64> = models.iter().map(|m| m.user_id).collect();
        let usernames: HashMap<i64, String> = users::Entity::find()
            .filter(users::Column::Id.is_in(user_ids))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();
        let status_by_id: HashMap<i64, UserStatus> = statuses::Entity::find()
            .all(&self.database)
            .await?
            .into_iter()
            .map(|s| (s.id, UserStatus::from(s)))
            .collect();
        let department_by_id: HashMap<i64, UserDepartment> = departments::Entity::find()
            .all(&self.database)
            .await?
            .into_iter()
            .map(|d| (d.id, UserDepartment::from(d)))
            .collect();

        let terms = search_terms(query.search.as_deref());
        let matching: Vec<ProfileListItem> = models
            .into_iter()
            .map(|model| {
                let profile = UserProfile::from(model);
                ProfileListItem {
                    username: usernames.get(&profile.user_id).cloned().unwrap_or_default(),
                    status: profile.status_id.and_then(|id| status_by_id.get(&id).cloned()),
                    department: profile
                        .department_id
                        .and_then(|id| department_by_id.get(&id).cloned()),
                    profile,
                }
            })
            .filter(|item| {
                matches_terms(
                    &terms,
                    [
                        Some(item.username.as_str()),
                        item.profile.last_name.as_deref(),
                        item.profile.first_name.as_deref(),
                        item.profile.middle_name.as_deref(),
                        item.status.as_ref().map(|s| s.status.as_str()),
                        item.status.as_ref().map(|s| s.title.as_str()),
                        item.department.as_ref().map(|d| d.title.as_str()),
                    ],
                )
            })
            .collect();

        let per_page = if query.per_page == 0 {
            DEFAULT_PER_PAGE
        } else {
            query.per_page
        };
        let page = query.page.max(1);
        let total = matching.len() as u64;
        let skip = usize::try_from((page - 1).saturating_mul(per_page)).unwrap_or(usize::MAX);
        let take = usize::try_from(per_page).unwrap_or(usize::MAX);
        let items = matching.into_iter().skip(skip).take(take).collect();

        Ok(ProfilePage {
            items,
            total,
            page,
            per_page,
        })
    }

    async fn require_profile(
        &self,
        db: &DatabaseTransaction,
        id: Uuid,
    ) -> ResultEngine<profiles::Model> {
        profiles::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("user profile {id}")))
    }

    async fn check_references(
        &self,
        db: &DatabaseTransaction,
        status_id: Option<i64>,
        department_id: Option<i64>,
    ) -> ResultEngine<()> {
        let mut errors = FieldErrors::new();
        if let Some(status_id) = status_id
            && statuses::Entity::find_by_id(status_id).one(db).await?.is_none()
        {
            errors.add("status", INVALID_CHOICE_MESSAGE);
        }
        if let Some(department_id) = department_id
            && departments::Entity::find_by_id(department_id)
                .one(db)
                .await?
                .is_none()
        {
            errors.add("department", INVALID_CHOICE_MESSAGE);
        }
        errors.into_result()
    }
}

fn validate_avatar_upload(filename: &str, bytes: &[u8]) -> Result<(), FieldErrors> {
    let filename = filename.trim();
    if filename.is_empty() {
        return Err(FieldErrors::single("avatar", "No file was submitted."));
    }
    if bytes.is_empty() {
        return Err(FieldErrors::single("avatar", "The submitted file is empty."));
    }
    let ext = filename.rsplit('.').next().unwrap_or(filename).to_lowercase();
    if !filename.contains('.') || !IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return Err(FieldErrors::single(
            "avatar",
            "Upload a valid image. The file you uploaded was either not an image or a corrupted image.",
        ));
    }
    if filename.contains('/') || filename.contains('\\') {
        return Err(FieldErrors::single("avatar", "Invalid file name."));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn avatar_upload_requires_image_extension() {
        assert!(validate_avatar_upload("me.PNG", b"x").is_ok());
        assert!(validate_avatar_upload("me.exe", b"x").unwrap_err().contains("avatar"));
        assert!(validate_avatar_upload("png", b"x").is_err());
        assert!(validate_avatar_upload("me.png", b"").is_err());
        assert!(validate_avatar_upload("  ", b"x").is_err());
    }

    #[test]
    fn page_count_is_at_least_one() {
        let page = ProfilePage {
            items: Vec::new(),
            total: 0,
            page: 1,
            per_page: 100,
        };
        assert_eq!(page.pages(), 1);
        let page = ProfilePage {
            total: 201,
            ..page
        };
        assert_eq!(page.pages(), 3);
    }
}
