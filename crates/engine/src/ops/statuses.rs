use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};

use crate::{
    EngineError, FieldErrors, ResultEngine, StatusInput, UserStatus, profiles, statuses,
    util::{matches_terms, search_terms},
};

use super::{Engine, with_tx};

impl Engine {
    /// Create a status. The code must be unique.
    pub async fn create_status(&self, input: &StatusInput) -> ResultEngine<UserStatus> {
        let input = input.clean().map_err(EngineError::Validation)?;
        with_tx!(self, |db_tx| {
            self.ensure_status_code_free(&db_tx, &input.status, None)
                .await?;
            let model = statuses::ActiveModel::from(input).insert(&db_tx).await?;
            tracing::info!("created user status {} ({})", model.status, model.id);
            Ok(UserStatus::from(model))
        })
    }

    pub async fn status(&self, id: i64) -> ResultEngine<UserStatus> {
        statuses::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .map(UserStatus::from)
            .ok_or_else(|| EngineError::KeyNotFound(format!("user status {id}")))
    }

    pub async fn status_by_code(&self, code: &str) -> ResultEngine<UserStatus> {
        statuses::Entity::find()
            .filter(statuses::Column::Status.eq(code.trim()))
            .one(&self.database)
            .await?
            .map(UserStatus::from)
            .ok_or_else(|| EngineError::KeyNotFound(format!("user status {code}")))
    }

    /// Replace every field of an existing status.
    pub async fn update_status(&self, id: i64, input: &StatusInput) -> ResultEngine<UserStatus> {
        let input = input.clean().map_err(EngineError::Validation)?;
        with_tx!(self, |db_tx| {
            self.require_status(&db_tx, id).await?;
            self.ensure_status_code_free(&db_tx, &input.status, Some(id))
                .await?;
            let mut active = statuses::ActiveModel::from(input);
            active.id = ActiveValue::Unchanged(id);
            let model = active.update(&db_tx).await?;
            Ok(UserStatus::from(model))
        })
    }

    /// Delete a status. Profiles pointing at it keep existing with no status.
    pub async fn delete_status(&self, id: i64) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_status(&db_tx, id).await?;
            let cleared = profiles::Entity::update_many()
                .col_expr(profiles::Column::StatusId, Expr::value(Option::<i64>::None))
                .filter(profiles::Column::StatusId.eq(id))
                .exec(&db_tx)
                .await?;
            statuses::Entity::delete_by_id(id).exec(&db_tx).await?;
            tracing::info!(
                "deleted user status {id}, cleared {} profile references",
                cleared.rows_affected
            );
            Ok(())
        })
    }

    /// All statuses ordered by id, narrowed by an optional search query over
    /// code, title and description.
    pub async fn list_statuses(&self, search: Option<&str>) -> ResultEngine<Vec<UserStatus>> {
        let terms = search_terms(search);
        let models = statuses::Entity::find()
            .order_by_asc(statuses::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models
            .into_iter()
            .map(UserStatus::from)
            .filter(|s| {
                matches_terms(
                    &terms,
                    [
                        Some(s.status.as_str()),
                        Some(s.title.as_str()),
                        s.description.as_deref(),
                    ],
                )
            })
            .collect())
    }

    pub(super) async fn require_status(
        &self,
        db: &DatabaseTransaction,
        id: i64,
    ) -> ResultEngine<statuses::Model> {
        statuses::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("user status {id}")))
    }

    async fn ensure_status_code_free(
        &self,
        db: &DatabaseTransaction,
        code: &str,
        except: Option<i64>,
    ) -> ResultEngine<()> {
        let mut query = statuses::Entity::find().filter(statuses::Column::Status.eq(code));
        if let Some(id) = except {
            query = query.filter(statuses::Column::Id.ne(id));
        }
        if query.one(db).await?.is_some() {
            return Err(EngineError::Validation(FieldErrors::single(
                "status",
                "User status with this Status already exists.",
            )));
        }
        Ok(())
    }
}
