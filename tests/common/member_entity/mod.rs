use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scrud::traits::{
    MergeIntoActiveModel, RecordRepository, SoftActivation, ValidateIntoActiveModel,
};
use scrud::validation::{FieldErrors, validators};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "members")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "Text")]
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Member {
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Model> for Member {
    fn from(model: Model) -> Self {
        Member {
            id: model.id,
            name: model.name,
            email: model.email,
            is_active: model.is_active,
            created_at: model.created_at,
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, Default)]
pub struct MemberCreate {
    pub name: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "scrud::serde_with::rust::double_option"
    )]
    pub email: Option<Option<String>>,
    pub is_active: Option<bool>,
}

impl ValidateIntoActiveModel<ActiveModel> for MemberCreate {
    fn validate_into_activemodel(self) -> Result<ActiveModel, FieldErrors> {
        let mut errors = FieldErrors::new();

        match self.name.as_deref() {
            None => errors.add("name", "This field is required."),
            Some(name) => {
                if let Err(e) = validators::not_blank("name", name) {
                    errors.push(e);
                }
            }
        }

        if let Some(Some(email)) = self.email.as_ref() {
            if let Err(e) = validators::email("email", email) {
                errors.push(e);
            }
        }

        errors.into_result()?;

        Ok(ActiveModel {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(self.name.unwrap_or_default()),
            email: ActiveValue::Set(self.email.flatten()),
            is_active: ActiveValue::Set(self.is_active.unwrap_or(true)),
            created_at: ActiveValue::Set(Utc::now()),
        })
    }
}

#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, Default)]
pub struct MemberUpdate {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "scrud::serde_with::rust::double_option"
    )]
    pub name: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "scrud::serde_with::rust::double_option"
    )]
    pub email: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "scrud::serde_with::rust::double_option"
    )]
    pub is_active: Option<Option<bool>>,
}

impl MergeIntoActiveModel<ActiveModel> for MemberUpdate {
    fn merge_into_activemodel(self, mut existing: ActiveModel) -> Result<ActiveModel, FieldErrors> {
        let mut errors = FieldErrors::new();

        match self.name {
            Some(Some(name)) => {
                if let Err(e) = validators::not_blank("name", &name) {
                    errors.push(e);
                } else {
                    existing.name = ActiveValue::Set(name);
                }
            }
            Some(None) => errors.add("name", "This field may not be null."),
            None => {}
        }

        match self.email {
            Some(Some(email)) => {
                if let Err(e) = validators::email("email", &email) {
                    errors.push(e);
                } else {
                    existing.email = ActiveValue::Set(Some(email));
                }
            }
            Some(None) => existing.email = ActiveValue::Set(None),
            None => {}
        }

        match self.is_active {
            Some(Some(flag)) => existing.is_active = ActiveValue::Set(flag),
            Some(None) => errors.add("is_active", "This field may not be null."),
            None => {}
        }

        errors.into_result()?;
        Ok(existing)
    }
}

#[async_trait]
impl RecordRepository for Member {
    type EntityType = Entity;
    type ColumnType = Column;
    type ActiveModelType = ActiveModel;
    type CreateModel = MemberCreate;
    type UpdateModel = MemberUpdate;

    const ID_COLUMN: Self::ColumnType = Column::Id;
    const RESOURCE_NAME_SINGULAR: &'static str = "member";
    const RESOURCE_NAME_PLURAL: &'static str = "members";

    fn searchable_columns() -> Vec<(&'static str, Self::ColumnType)> {
        vec![
            ("id", Column::Id),
            ("name", Column::Name),
            ("email", Column::Email),
            ("is_active", Column::IsActive),
        ]
    }
}

#[async_trait]
impl SoftActivation for Member {
    const ACTIVE_COLUMN: Self::ColumnType = Column::IsActive;
}
