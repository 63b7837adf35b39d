//! The two capability sets a resource brings to the generic endpoints.
//!
//! [`RecordRepository`] covers storage access: the Sea-ORM entity behind the
//! resource, its identifier column, and default implementations for every
//! query the endpoints run. All lookups happen within a `Select` scope passed
//! per call, so a handler can narrow the visible rows (for example to the
//! inactive subset) without any shared state.
//!
//! [`SoftActivation`] extends the repository for entities carrying a boolean
//! status column and adds the `active_rows` / `inactive_rows` / `current`
//! accessors plus the scope used by the activate/deactivate endpoints.
//!
//! Create and update payloads implement [`ValidateIntoActiveModel`] and
//! [`MergeIntoActiveModel`]: both validate in partial-field mode and report
//! problems as a [`FieldErrors`] map rather than a bare `DbErr`, so the wire
//! layer can answer 400 with per-field messages.

use async_trait::async_trait;
use sea_orm::{
    DatabaseConnection, EntityTrait, IntoActiveModel, Order, PaginatorTrait, QueryOrder,
    QuerySelect, Select, entity::prelude::*,
};

use crate::errors::ApiError;
use crate::validation::FieldErrors;

/// Turn a validated create payload into an insertable active model.
///
/// Implementations decide which fields are required; a missing or invalid
/// field fails the whole payload with its messages, and nothing is persisted.
pub trait ValidateIntoActiveModel<ActiveModelType> {
    fn validate_into_activemodel(self) -> Result<ActiveModelType, FieldErrors>;
}

/// Merge a partial update payload into an existing active model.
///
/// Fields absent from the payload keep their stored values. A field set to
/// `null` clears optional columns and fails validation on required ones.
pub trait MergeIntoActiveModel<ActiveModelType> {
    fn merge_into_activemodel(
        self,
        existing: ActiveModelType,
    ) -> Result<ActiveModelType, FieldErrors>;
}

#[async_trait]
pub trait RecordRepository: Sized + Send + Sync
where
    Self::EntityType: EntityTrait + Sync,
    Self::ActiveModelType: ActiveModelTrait + ActiveModelBehavior + Send + Sync,
    <Self::EntityType as EntityTrait>::Model: Sync + IntoActiveModel<Self::ActiveModelType>,
    Self: From<<Self::EntityType as EntityTrait>::Model>,
{
    type EntityType: EntityTrait + Sync;
    type ColumnType: ColumnTrait + std::fmt::Debug;
    type ActiveModelType: ActiveModelTrait<Entity = Self::EntityType>;
    type CreateModel: ValidateIntoActiveModel<Self::ActiveModelType> + Send;
    type UpdateModel: Send + Sync + MergeIntoActiveModel<Self::ActiveModelType>;

    const ID_COLUMN: Self::ColumnType;
    /// Query-parameter name of the identifier, used by search
    const ID_COLUMN_NAME: &'static str = "id";
    const RESOURCE_NAME_SINGULAR: &str;
    const RESOURCE_NAME_PLURAL: &str;

    /// The default scope: every record, newest identifier first
    #[must_use]
    fn select_newest_first() -> Select<Self::EntityType> {
        Self::EntityType::find().order_by(Self::ID_COLUMN, Order::Desc)
    }

    /// Columns the search endpoint may match against, as
    /// (query-parameter name, column) pairs
    #[must_use]
    fn searchable_columns() -> Vec<(&'static str, Self::ColumnType)> {
        vec![(Self::ID_COLUMN_NAME, Self::ID_COLUMN)]
    }

    /// One page of the scope, already sliced by offset and limit
    async fn find_page(
        db: &DatabaseConnection,
        scope: Select<Self::EntityType>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Self>, ApiError> {
        let models = scope.offset(offset).limit(limit).all(db).await?;
        Ok(models.into_iter().map(Self::from).collect())
    }

    /// Every record of the scope, unpaginated
    async fn find_all(
        db: &DatabaseConnection,
        scope: Select<Self::EntityType>,
    ) -> Result<Vec<Self>, ApiError> {
        let models = scope.all(db).await?;
        Ok(models.into_iter().map(Self::from).collect())
    }

    async fn count(
        db: &DatabaseConnection,
        scope: Select<Self::EntityType>,
    ) -> Result<u64, ApiError> {
        let total = PaginatorTrait::count(scope, db).await?;
        Ok(total)
    }

    /// Look up one record by identifier within the scope
    ///
    /// A record outside the scope answers not-found, exactly like an absent
    /// one.
    async fn find_by_id(
        db: &DatabaseConnection,
        scope: Select<Self::EntityType>,
        id: i32,
    ) -> Result<Self, ApiError> {
        let model = scope
            .filter(Self::ID_COLUMN.eq(id))
            .one(db)
            .await?
            .ok_or_else(|| ApiError::not_found(Self::RESOURCE_NAME_SINGULAR))?;
        Ok(Self::from(model))
    }

    /// Validate and insert a create payload
    async fn create(
        db: &DatabaseConnection,
        create_model: Self::CreateModel,
    ) -> Result<Self, ApiError> {
        let active_model = create_model.validate_into_activemodel()?;
        let model = active_model.insert(db).await?;
        Ok(Self::from(model))
    }

    /// Merge a partial update into the record at `id` within the scope
    async fn update(
        db: &DatabaseConnection,
        scope: Select<Self::EntityType>,
        id: i32,
        update_model: Self::UpdateModel,
    ) -> Result<Self, ApiError> {
        let model = scope
            .filter(Self::ID_COLUMN.eq(id))
            .one(db)
            .await?
            .ok_or_else(|| ApiError::not_found(Self::RESOURCE_NAME_SINGULAR))?;
        let existing: Self::ActiveModelType = model.clone().into_active_model();
        let updated_model = update_model.merge_into_activemodel(existing)?;
        if !updated_model.is_changed() {
            // Sea-ORM rejects updates with no dirty columns
            return Ok(Self::from(model));
        }
        let updated = updated_model.update(db).await?;
        Ok(Self::from(updated))
    }

    async fn delete(db: &DatabaseConnection, id: i32) -> Result<i32, ApiError> {
        let res = Self::EntityType::delete_many()
            .filter(Self::ID_COLUMN.eq(id))
            .exec(db)
            .await?;
        match res.rows_affected {
            0 => Err(ApiError::not_found(Self::RESOURCE_NAME_SINGULAR)),
            _ => Ok(id),
        }
    }
}

/// Repository extension for entities with a boolean activation column.
///
/// The column partitions the table: every record is in exactly one of
/// `active_rows` and `inactive_rows`.
#[async_trait]
pub trait SoftActivation: RecordRepository
where
    Self::EntityType: EntityTrait + Sync,
    Self::ActiveModelType: ActiveModelTrait + ActiveModelBehavior + Send + Sync,
    <Self::EntityType as EntityTrait>::Model: Sync + IntoActiveModel<Self::ActiveModelType>,
    Self: From<<Self::EntityType as EntityTrait>::Model>,
{
    const ACTIVE_COLUMN: Self::ColumnType;

    /// The newest-first scope narrowed to one side of the status partition
    #[must_use]
    fn select_rows(active: bool) -> Select<Self::EntityType> {
        Self::select_newest_first().filter(Self::ACTIVE_COLUMN.eq(active))
    }

    async fn active_rows(db: &DatabaseConnection) -> Result<Vec<Self>, ApiError> {
        Self::find_all(db, Self::select_rows(true)).await
    }

    async fn inactive_rows(db: &DatabaseConnection) -> Result<Vec<Self>, ApiError> {
        Self::find_all(db, Self::select_rows(false)).await
    }

    /// The first record in the default ordering, so the most recently
    /// created one
    ///
    /// Read-only; repeated calls on an unchanged table return the same
    /// record. An empty table answers not-found.
    async fn current(db: &DatabaseConnection) -> Result<Self, ApiError> {
        let model = Self::select_newest_first()
            .one(db)
            .await?
            .ok_or_else(|| ApiError::not_found(Self::RESOURCE_NAME_SINGULAR))?;
        Ok(Self::from(model))
    }
}
