use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    DEFAULT_AVATAR, EngineError, FieldErrors, IdentityEvent, IdentityHook, ResultEngine,
    profiles, statuses,
    users::{self, Identity, IdentityInput},
    util::{matches_terms, search_terms},
};

use super::{Engine, with_tx};

impl Engine {
    /// Create an identity record.
    ///
    /// The registered hooks run in the same transaction, so with the default
    /// hooks the identity is committed together with its empty profile or not
    /// at all.
    pub async fn create_identity(&self, input: &IdentityInput) -> ResultEngine<Identity> {
        let input = input.clean().map_err(EngineError::Validation)?;
        with_tx!(self, |db_tx| {
            self.ensure_username_free(&db_tx, &input.username, None)
                .await?;
            let active = users::ActiveModel {
                id: ActiveValue::NotSet,
                username: ActiveValue::Set(input.username),
                email: ActiveValue::Set(input.email),
                is_active: ActiveValue::Set(input.is_active),
                date_joined: ActiveValue::Set(Utc::now()),
            };
            let model = active.insert(&db_tx).await?;
            self.dispatch_identity_event(
                &db_tx,
                IdentityEvent::Saved {
                    user_id: model.id,
                    created: true,
                },
            )
            .await?;
            tracing::info!("created identity {} ({})", model.username, model.id);
            Ok(Identity::from(model))
        })
    }

    /// Save changes to an identity record and re-synchronize its profile.
    pub async fn update_identity(&self, id: i64, input: &IdentityInput) -> ResultEngine<Identity> {
        let input = input.clean().map_err(EngineError::Validation)?;
        with_tx!(self, |db_tx| {
            self.require_identity(&db_tx, id).await?;
            self.ensure_username_free(&db_tx, &input.username, Some(id))
                .await?;
            let active = users::ActiveModel {
                id: ActiveValue::Unchanged(id),
                username: ActiveValue::Set(input.username),
                email: ActiveValue::Set(input.email),
                is_active: ActiveValue::Set(input.is_active),
                date_joined: ActiveValue::NotSet,
            };
            let model = active.update(&db_tx).await?;
            self.dispatch_identity_event(
                &db_tx,
                IdentityEvent::Saved {
                    user_id: id,
                    created: false,
                },
            )
            .await?;
            Ok(Identity::from(model))
        })
    }

    /// Delete an identity record together with the profile it owns.
    pub async fn delete_identity(&self, id: i64) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_identity(&db_tx, id).await?;
            self.dispatch_identity_event(&db_tx, IdentityEvent::Deleting { user_id: id })
                .await?;
            users::Entity::delete_by_id(id).exec(&db_tx).await?;
            tracing::info!("deleted identity {id}");
            Ok(())
        })
    }

    pub async fn identity(&self, id: i64) -> ResultEngine<Identity> {
        users::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .map(Identity::from)
            .ok_or_else(|| EngineError::KeyNotFound(format!("user {id}")))
    }

    pub async fn identity_by_username(&self, username: &str) -> ResultEngine<Identity> {
        users::Entity::find()
            .filter(users::Column::Username.eq(username.trim()))
            .one(&self.database)
            .await?
            .map(Identity::from)
            .ok_or_else(|| EngineError::KeyNotFound(format!("user {username}")))
    }

    /// Identities ordered by username, narrowed by an optional search over
    /// username and email.
    pub async fn list_identities(&self, search: Option<&str>) -> ResultEngine<Vec<Identity>> {
        let terms = search_terms(search);
        let models = users::Entity::find()
            .order_by_asc(users::Column::Username)
            .all(&self.database)
            .await?;
        Ok(models
            .into_iter()
            .map(Identity::from)
            .filter(|u| matches_terms(&terms, [Some(u.username.as_str()), u.email.as_deref()]))
            .collect())
    }

    async fn dispatch_identity_event(
        &self,
        db: &DatabaseTransaction,
        event: IdentityEvent,
    ) -> ResultEngine<()> {
        for hook in self.hooks.iter().copied().filter(|h| h.handles(event)) {
            tracing::debug!("running {hook:?} for {event:?}");
            match (hook, event) {
                (IdentityHook::CreateProfile, IdentityEvent::Saved { user_id, .. }) => {
                    self.insert_empty_profile(db, user_id).await?;
                }
                (IdentityHook::ResaveProfile, IdentityEvent::Saved { user_id, .. }) => {
                    self.resave_profile(db, user_id).await?;
                }
                (IdentityHook::DeleteProfile, IdentityEvent::Deleting { user_id }) => {
                    profiles::Entity::delete_many()
                        .filter(profiles::Column::UserId.eq(user_id))
                        .exec(db)
                        .await?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    async fn insert_empty_profile(
        &self,
        db: &DatabaseTransaction,
        user_id: i64,
    ) -> ResultEngine<profiles::Model> {
        let status_id = match self.default_status.as_deref() {
            Some(code) => statuses::Entity::find()
                .filter(statuses::Column::Status.eq(code))
                .one(db)
                .await?
                .map(|status| status.id),
            None => None,
        };
        let now = Utc::now();
        let active = profiles::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            user_id: ActiveValue::Set(user_id),
            status_id: ActiveValue::Set(status_id),
            department_id: ActiveValue::Set(None),
            avatar: ActiveValue::Set(DEFAULT_AVATAR.to_string()),
            last_name: ActiveValue::Set(None),
            first_name: ActiveValue::Set(None),
            middle_name: ActiveValue::Set(None),
            mobile_phone: ActiveValue::Set(None),
            phone: ActiveValue::Set(None),
            description: ActiveValue::Set(None),
            experience_start: ActiveValue::Set(None),
            experience_now: ActiveValue::Set(None),
            experience_description: ActiveValue::Set(None),
            post: ActiveValue::Set(None),
            created_time: ActiveValue::Set(now),
            updated_time: ActiveValue::Set(now),
        };
        let model = active.insert(db).await?;
        tracing::debug!("created profile {} for identity {user_id}", model.id);
        Ok(model)
    }

    async fn resave_profile(&self, db: &DatabaseTransaction, user_id: i64) -> ResultEngine<()> {
        let Some(model) = profiles::Entity::find()
            .filter(profiles::Column::UserId.eq(user_id))
            .one(db)
            .await?
        else {
            tracing::warn!("identity {user_id} has no profile to re-save");
            return Ok(());
        };
        let active = profiles::ActiveModel {
            id: ActiveValue::Unchanged(model.id),
            updated_time: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        active.update(db).await?;
        Ok(())
    }

    async fn require_identity(
        &self,
        db: &DatabaseTransaction,
        id: i64,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("user {id}")))
    }

    async fn ensure_username_free(
        &self,
        db: &DatabaseTransaction,
        username: &str,
        except: Option<i64>,
    ) -> ResultEngine<()> {
        let mut query = users::Entity::find().filter(users::Column::Username.eq(username));
        if let Some(id) = except {
            query = query.filter(users::Column::Id.ne(id));
        }
        if query.one(db).await?.is_some() {
            return Err(EngineError::Validation(FieldErrors::single(
                "username",
                "A user with that username already exists.",
            )));
        }
        Ok(())
    }
}
