//! Generic Axum handlers for the fixed action set, plus the router that
//! mounts them for one resource.
//!
//! Handlers are free functions generic over the resource so hosts can wire
//! custom routers from the same building blocks; [`resource_router`] is the
//! standard wiring. Every handler authorizes the caller against the binding's
//! policy table before touching the database.
//!
//! Request bodies arrive as raw bytes: an absent body reads as an empty JSON
//! object and malformed JSON answers 400 in the field-error map shape, so the
//! schema owns every validation response.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use sea_orm::{ConnectionTrait, QueryFilter};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::collections::HashMap;

use crate::binding::ResourceBinding;
use crate::errors::ApiError;
use crate::models::{DeleteConfirmation, PageQuery, Paginated};
use crate::pagination::{page_links, page_offset, parse_page};
use crate::policy::{CallerIdentity, ResourceAction};
use crate::search::{PAGE_PARAM, search_condition};
use crate::toggle::toggle_status;
use crate::traits::{RecordRepository, SoftActivation};
use crate::validation::FieldErrors;

fn parse_body(body: &Bytes) -> Result<Value, FieldErrors> {
    if body.is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_slice(body).map_err(FieldErrors::from)
}

/// One page of the full scope, newest first, in the count/next/previous
/// envelope
pub async fn list<T>(
    State(binding): State<ResourceBinding>,
    CallerIdentity(caller): CallerIdentity,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<PageQuery>,
) -> Result<Json<Paginated<T>>, ApiError>
where
    T: RecordRepository + Serialize,
{
    binding.authorize(ResourceAction::List, caller.as_ref())?;

    let page = parse_page(params.page.as_deref())?;
    let scope = T::select_newest_first();
    let count = T::count(binding.db(), scope.clone()).await?;
    let offset = page_offset(page, binding.page_size(), count)?;
    let results = T::find_page(binding.db(), scope, offset, binding.page_size()).await?;
    let (next, previous) = page_links(&uri, page, binding.page_size(), count);

    Ok(Json(Paginated {
        count,
        next,
        previous,
        results,
    }))
}

pub async fn get_one<T>(
    State(binding): State<ResourceBinding>,
    CallerIdentity(caller): CallerIdentity,
    Path(id): Path<i32>,
) -> Result<Json<T>, ApiError>
where
    T: RecordRepository + Serialize,
{
    binding.authorize(ResourceAction::Get, caller.as_ref())?;

    let item = T::find_by_id(binding.db(), T::select_newest_first(), id).await?;
    Ok(Json(item))
}

pub async fn create<T>(
    State(binding): State<ResourceBinding>,
    CallerIdentity(caller): CallerIdentity,
    body: Bytes,
) -> Result<(StatusCode, Json<T>), ApiError>
where
    T: RecordRepository + Serialize,
    T::CreateModel: DeserializeOwned,
{
    binding.authorize(ResourceAction::Create, caller.as_ref())?;

    let create_model: T::CreateModel =
        serde_json::from_value(parse_body(&body)?).map_err(FieldErrors::from)?;
    let created = T::create(binding.db(), create_model).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn edit<T>(
    State(binding): State<ResourceBinding>,
    CallerIdentity(caller): CallerIdentity,
    Path(id): Path<i32>,
    body: Bytes,
) -> Result<Json<T>, ApiError>
where
    T: RecordRepository + Serialize,
    T::UpdateModel: DeserializeOwned,
{
    binding.authorize(ResourceAction::Edit, caller.as_ref())?;

    let update_model: T::UpdateModel =
        serde_json::from_value(parse_body(&body)?).map_err(FieldErrors::from)?;
    let updated = T::update(binding.db(), T::select_newest_first(), id, update_model).await?;
    Ok(Json(updated))
}

pub async fn delete_one<T>(
    State(binding): State<ResourceBinding>,
    CallerIdentity(caller): CallerIdentity,
    Path(id): Path<i32>,
) -> Result<(StatusCode, Json<DeleteConfirmation>), ApiError>
where
    T: RecordRepository + Serialize,
{
    binding.authorize(ResourceAction::Delete, caller.as_ref())?;

    T::delete(binding.db(), id).await?;
    let confirmation = DeleteConfirmation {
        message: format!("{} deleted successfully", T::RESOURCE_NAME_SINGULAR),
    };
    Ok((StatusCode::NO_CONTENT, Json(confirmation)))
}

/// Flip the record at `id` to active; only inactive records qualify
pub async fn activate<T>(
    State(binding): State<ResourceBinding>,
    CallerIdentity(caller): CallerIdentity,
    Path(id): Path<i32>,
    body: Bytes,
) -> Result<Json<T>, ApiError>
where
    T: SoftActivation + Serialize,
    T::UpdateModel: DeserializeOwned,
{
    binding.authorize(ResourceAction::Activate, caller.as_ref())?;

    let item = toggle_status::<T>(&binding, id, parse_body(&body)?, true).await?;
    Ok(Json(item))
}

/// Flip the record at `id` to inactive; only active records qualify
pub async fn deactivate<T>(
    State(binding): State<ResourceBinding>,
    CallerIdentity(caller): CallerIdentity,
    Path(id): Path<i32>,
    body: Bytes,
) -> Result<Json<T>, ApiError>
where
    T: SoftActivation + Serialize,
    T::UpdateModel: DeserializeOwned,
{
    binding.authorize(ResourceAction::Deactivate, caller.as_ref())?;

    let item = toggle_status::<T>(&binding, id, parse_body(&body)?, false).await?;
    Ok(Json(item))
}

/// Every inactive record as a bare array, without the page envelope
pub async fn inactives<T>(
    State(binding): State<ResourceBinding>,
    CallerIdentity(caller): CallerIdentity,
) -> Result<Json<Vec<T>>, ApiError>
where
    T: SoftActivation + Serialize,
{
    binding.authorize(ResourceAction::Inactives, caller.as_ref())?;

    let items = T::inactive_rows(binding.db()).await?;
    Ok(Json(items))
}

/// Conjunctive substring search over the searchable columns, paginated like
/// `list`
///
/// Parameters that name no searchable column and the `page` parameter are
/// excluded from matching; with no usable parameters the endpoint degrades
/// to a plain `list`.
pub async fn search<T>(
    State(binding): State<ResourceBinding>,
    CallerIdentity(caller): CallerIdentity,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Paginated<T>>, ApiError>
where
    T: RecordRepository + Serialize,
{
    binding.authorize(ResourceAction::Search, caller.as_ref())?;

    let page = parse_page(params.get(PAGE_PARAM).map(String::as_str))?;
    let condition = search_condition::<T>(&params, binding.db().get_database_backend());
    let scope = T::select_newest_first().filter(condition);
    let count = T::count(binding.db(), scope.clone()).await?;
    let offset = page_offset(page, binding.page_size(), count)?;
    let results = T::find_page(binding.db(), scope, offset, binding.page_size()).await?;
    let (next, previous) = page_links(&uri, page, binding.page_size(), count);

    Ok(Json(Paginated {
        count,
        next,
        previous,
        results,
    }))
}

/// The standard router for one soft-activation resource.
///
/// | Verb      | Path               | Action     |
/// |-----------|--------------------|------------|
/// | GET       | `/`                | list       |
/// | POST      | `/`                | create     |
/// | GET       | `/search`          | search     |
/// | GET       | `/inactive`        | inactives  |
/// | GET       | `/{id}`            | get        |
/// | PUT/PATCH | `/{id}`            | edit       |
/// | DELETE    | `/{id}`            | delete     |
/// | POST      | `/{id}/activate`   | activate   |
/// | POST      | `/{id}/deactivate` | deactivate |
///
/// Mount it under the resource's path segment with `Router::nest`.
pub fn resource_router<T>(binding: ResourceBinding) -> Router
where
    T: SoftActivation + Serialize + 'static,
    T::CreateModel: DeserializeOwned,
    T::UpdateModel: DeserializeOwned,
{
    Router::new()
        .route("/", get(list::<T>).post(create::<T>))
        .route("/search", get(search::<T>))
        .route("/inactive", get(inactives::<T>))
        .route(
            "/{id}",
            get(get_one::<T>)
                .put(edit::<T>)
                .patch(edit::<T>)
                .delete(delete_one::<T>),
        )
        .route("/{id}/activate", post(activate::<T>))
        .route("/{id}/deactivate", post(deactivate::<T>))
        .with_state(binding)
}
