use axum::{Router, extract::Request, middleware::Next, response::Response};
use chrono::Utc;
use scrud::{AccessRule, Caller, PolicyTable, ResourceAction, ResourceBinding, resource_router};
use sea_orm::{ActiveModelTrait, ActiveValue, Database, DatabaseConnection, DbErr};
use sea_orm_migration::prelude::*;
use uuid::Uuid;

pub mod member_entity;

use member_entity::Member;

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;

    // Run migrations
    Migrator::up(&db, None).await?;

    Ok(db)
}

/// App with every action open, the default policy table
pub fn setup_test_app(db: DatabaseConnection) -> Router {
    let binding = ResourceBinding::new(db);
    Router::new().nest("/api/members", resource_router::<Member>(binding))
}

/// App with a small page size for pagination assertions
pub fn setup_paged_app(db: DatabaseConnection, page_size: u64) -> Router {
    let binding = ResourceBinding::new(db).with_page_size(page_size);
    Router::new().nest("/api/members", resource_router::<Member>(binding))
}

/// App with gated actions plus header-based auth: `x-test-role: user|admin`
/// becomes the caller, anything else stays anonymous
pub fn setup_guarded_app(db: DatabaseConnection) -> Router {
    let policies = PolicyTable::new()
        .require(ResourceAction::Create, [AccessRule::Authenticated])
        .require(ResourceAction::Edit, [AccessRule::Authenticated])
        .require(ResourceAction::Delete, [AccessRule::AdminOnly])
        .require(ResourceAction::Inactives, [AccessRule::AdminOnly]);
    let binding = ResourceBinding::new(db).with_policies(policies);

    Router::new()
        .nest("/api/members", resource_router::<Member>(binding))
        .layer(axum::middleware::from_fn(fake_auth))
}

async fn fake_auth(mut request: Request, next: Next) -> Response {
    let role = request
        .headers()
        .get("x-test-role")
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    match role.as_deref() {
        Some("admin") => {
            request.extensions_mut().insert(Caller::admin(Uuid::new_v4()));
        }
        Some("user") => {
            request.extensions_mut().insert(Caller::user(Uuid::new_v4()));
        }
        _ => {}
    }

    next.run(request).await
}

/// Insert a row directly, bypassing the API, and return its api model
pub async fn seed_member(
    db: &DatabaseConnection,
    name: &str,
    email: Option<&str>,
    is_active: bool,
) -> Member {
    let model = member_entity::ActiveModel {
        id: ActiveValue::NotSet,
        name: ActiveValue::Set(name.to_owned()),
        email: ActiveValue::Set(email.map(str::to_owned)),
        is_active: ActiveValue::Set(is_active),
        created_at: ActiveValue::Set(Utc::now()),
    };
    let inserted = model.insert(db).await.expect("Failed to seed member");
    Member::from(inserted)
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateMemberTable)]
    }
}

pub struct CreateMemberTable;

#[async_trait::async_trait]
impl MigrationName for CreateMemberTable {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_member_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateMemberTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(MemberTable)
            .if_not_exists()
            .col(
                ColumnDef::new(MemberColumn::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(MemberColumn::Name).text().not_null())
            .col(ColumnDef::new(MemberColumn::Email).text().null())
            .col(
                ColumnDef::new(MemberColumn::IsActive)
                    .boolean()
                    .not_null()
                    .default(true),
            )
            .col(
                ColumnDef::new(MemberColumn::CreatedAt)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .to_owned();

        manager.create_table(table).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MemberTable).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(Debug)]
pub enum MemberColumn {
    Id,
    Name,
    Email,
    IsActive,
    CreatedAt,
}

impl Iden for MemberColumn {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        write!(
            s,
            "{}",
            match self {
                Self::Id => "id",
                Self::Name => "name",
                Self::Email => "email",
                Self::IsActive => "is_active",
                Self::CreatedAt => "created_at",
            }
        )
        .unwrap();
    }
}

#[derive(Debug)]
pub struct MemberTable;

impl Iden for MemberTable {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        write!(s, "members").unwrap();
    }
}
