use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};

use crate::{
    DepartmentInput, EngineError, ResultEngine, UserDepartment, departments, profiles,
    util::{matches_terms, search_terms},
};

use super::{Engine, with_tx};

impl Engine {
    pub async fn create_department(&self, input: &DepartmentInput) -> ResultEngine<UserDepartment> {
        let input = input.clean().map_err(EngineError::Validation)?;
        let model = departments::ActiveModel::from(input)
            .insert(&self.database)
            .await?;
        tracing::info!("created department {} ({})", model.title, model.id);
        Ok(UserDepartment::from(model))
    }

    pub async fn department(&self, id: i64) -> ResultEngine<UserDepartment> {
        departments::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .map(UserDepartment::from)
            .ok_or_else(|| EngineError::KeyNotFound(format!("user department {id}")))
    }

    pub async fn update_department(
        &self,
        id: i64,
        input: &DepartmentInput,
    ) -> ResultEngine<UserDepartment> {
        let input = input.clean().map_err(EngineError::Validation)?;
        with_tx!(self, |db_tx| {
            self.require_department(&db_tx, id).await?;
            let mut active = departments::ActiveModel::from(input);
            active.id = ActiveValue::Unchanged(id);
            let model = active.update(&db_tx).await?;
            Ok(UserDepartment::from(model))
        })
    }

    /// Delete a department. Profiles in it keep existing with no department.
    pub async fn delete_department(&self, id: i64) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_department(&db_tx, id).await?;
            let cleared = profiles::Entity::update_many()
                .col_expr(
                    profiles::Column::DepartmentId,
                    Expr::value(Option::<i64>::None),
                )
                .filter(profiles::Column::DepartmentId.eq(id))
                .exec(&db_tx)
                .await?;
            departments::Entity::delete_by_id(id).exec(&db_tx).await?;
            tracing::info!(
                "deleted department {id}, cleared {} profile references",
                cleared.rows_affected
            );
            Ok(())
        })
    }

    /// All departments ordered by id, narrowed by an optional search query
    /// over title, block, department, group and branch.
    pub async fn list_departments(
        &self,
        search: Option<&str>,
    ) -> ResultEngine<Vec<UserDepartment>> {
        let terms = search_terms(search);
        let models = departments::Entity::find()
            .order_by_asc(departments::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models
            .into_iter()
            .map(UserDepartment::from)
            .filter(|d| {
                matches_terms(
                    &terms,
                    [
                        Some(d.title.as_str()),
                        d.block.as_deref(),
                        d.department.as_deref(),
                        d.group.as_deref(),
                        d.branch.as_deref(),
                    ],
                )
            })
            .collect())
    }

    pub(super) async fn require_department(
        &self,
        db: &DatabaseTransaction,
        id: i64,
    ) -> ResultEngine<departments::Model> {
        departments::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("user department {id}")))
    }
}
