//! Shared routine behind the activate and deactivate endpoints.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::binding::ResourceBinding;
use crate::errors::ApiError;
use crate::traits::SoftActivation;
use crate::validation::FieldErrors;

/// Move the record at `id` to the `target` status.
///
/// The lookup runs against the opposite-status subset: a toggle is only valid
/// as a genuine transition, so re-affirming the current status answers
/// not-found just like an absent record. The binding's status key is injected
/// into the payload and the whole object merges into the record in
/// partial-field mode, which lets extra payload fields ride along with the
/// status change.
pub async fn toggle_status<T>(
    binding: &ResourceBinding,
    id: i32,
    payload: Value,
    target: bool,
) -> Result<T, ApiError>
where
    T: SoftActivation,
    T::UpdateModel: DeserializeOwned,
{
    let scope = T::select_rows(!target);

    let mut payload = payload;
    let Some(fields) = payload.as_object_mut() else {
        return Err(FieldErrors::non_field("Invalid data. Expected a JSON object.").into());
    };
    fields.insert(binding.status_key().to_owned(), Value::Bool(target));

    let update_model: T::UpdateModel =
        serde_json::from_value(payload).map_err(FieldErrors::from)?;

    T::update(binding.db(), scope, id, update_model).await
}
