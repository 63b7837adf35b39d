//! Minimal soft-activation API with Axum
//!
//! ```bash
//! cargo run --example minimal
//! ```
//!
//! Then try:
//! - `curl http://localhost:3000/volunteers`
//! - `curl http://localhost:3000/volunteers/search?name=al`
//! - `curl -X POST http://localhost:3000/volunteers/1/deactivate -H 'Authorization: Bearer volunteer-token'`
//! - `curl http://localhost:3000/volunteers/inactive -H 'Authorization: Bearer admin-token'`

use async_trait::async_trait;
use axum::{
    Router,
    extract::Request,
    http::header,
    middleware::{self, Next},
    response::Response,
};
use chrono::{DateTime, Utc};
use scrud::traits::{
    MergeIntoActiveModel, RecordRepository, SoftActivation, ValidateIntoActiveModel,
};
use scrud::validation::{FieldErrors, validators};
use scrud::{AccessRule, Caller, PolicyTable, ResourceAction, ResourceBinding, resource_router};
use sea_orm::{ActiveModelTrait, ActiveValue, Database, DatabaseConnection, entity::prelude::*};
use serde::{Deserialize, Serialize};
use std::env;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "volunteers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "Text")]
    pub name: String,
    pub is_active: bool,
    pub joined_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}
impl ActiveModelBehavior for ActiveModel {}

#[derive(ToSchema, Serialize, Deserialize, Clone, Debug)]
pub struct Volunteer {
    pub id: i32,
    pub name: String,
    pub is_active: bool,
    pub joined_at: DateTime<Utc>,
}

impl From<Model> for Volunteer {
    fn from(model: Model) -> Self {
        Volunteer {
            id: model.id,
            name: model.name,
            is_active: model.is_active,
            joined_at: model.joined_at,
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, Default)]
pub struct VolunteerCreate {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

impl ValidateIntoActiveModel<ActiveModel> for VolunteerCreate {
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

        errors.into_result()?;

        Ok(ActiveModel {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(self.name.unwrap_or_default()),
            is_active: ActiveValue::Set(self.is_active.unwrap_or(true)),
            joined_at: ActiveValue::Set(Utc::now()),
        })
    }
}

#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, Default)]
pub struct VolunteerUpdate {
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
    pub is_active: Option<Option<bool>>,
}

impl MergeIntoActiveModel<ActiveModel> for VolunteerUpdate {
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
impl RecordRepository for Volunteer {
    type EntityType = Entity;
    type ColumnType = Column;
    type ActiveModelType = ActiveModel;
    type CreateModel = VolunteerCreate;
    type UpdateModel = VolunteerUpdate;

    const ID_COLUMN: Self::ColumnType = Column::Id;
    const RESOURCE_NAME_SINGULAR: &'static str = "volunteer";
    const RESOURCE_NAME_PLURAL: &'static str = "volunteers";

    fn searchable_columns() -> Vec<(&'static str, Self::ColumnType)> {
        vec![("id", Column::Id), ("name", Column::Name)]
    }
}

#[async_trait]
impl SoftActivation for Volunteer {
    const ACTIVE_COLUMN: Self::ColumnType = Column::IsActive;
}

/// Resolves demo bearer tokens to a caller identity. Requests without a
/// recognized token stay anonymous and the policy table decides what they
/// may do.
async fn bearer_auth(mut request: Request, next: Next) -> Response {
    let caller = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .and_then(|token| match token {
            "admin-token" => Some(Caller::admin(Uuid::new_v4())),
            "volunteer-token" => Some(Caller::user(Uuid::new_v4())),
            _ => None,
        });
    if let Some(caller) = caller {
        request.extensions_mut().insert(caller);
    }
    next.run(request).await
}

async fn seed(db: &DatabaseConnection) -> Result<(), sea_orm::DbErr> {
    for (name, is_active) in [("Alice", true), ("Albert", true), ("Bob", false)] {
        ActiveModel {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(name.to_string()),
            is_active: ActiveValue::Set(is_active),
            joined_at: ActiveValue::Set(Utc::now()),
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_target(false).compact().init();

    let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());
    let db: DatabaseConnection = Database::connect(&database_url).await?;

    db.execute(sea_orm::Statement::from_string(
        db.get_database_backend(),
        r"CREATE TABLE IF NOT EXISTS volunteers (
            id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
            name TEXT NOT NULL,
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            joined_at TEXT NOT NULL
        );"
        .to_owned(),
    ))
    .await?;
    seed(&db).await?;

    // Reads stay public; writes need a token and the inactive roster is
    // reserved for admins
    let policies = PolicyTable::default()
        .require(ResourceAction::Create, [AccessRule::Authenticated])
        .require(ResourceAction::Edit, [AccessRule::Authenticated])
        .require(ResourceAction::Activate, [AccessRule::Authenticated])
        .require(ResourceAction::Deactivate, [AccessRule::Authenticated])
        .require(ResourceAction::Delete, [AccessRule::AdminOnly])
        .require(ResourceAction::Inactives, [AccessRule::AdminOnly]);

    let binding = ResourceBinding::new(db).with_policies(policies);
    let app = Router::new()
        .nest("/volunteers", resource_router::<Volunteer>(binding))
        .layer(middleware::from_fn(bearer_auth));

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    println!("🚀 API: http://0.0.0.0:3000/volunteers");
    axum::serve(listener, app).await?;
    Ok(())
}
