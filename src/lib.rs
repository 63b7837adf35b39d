pub mod binding;
pub mod errors;
pub mod models;
pub mod pagination;
pub mod policy;
pub mod routes;
pub mod search;
pub mod toggle;
pub mod traits;
pub mod validation;

pub use binding::ResourceBinding;
pub use errors::ApiError;
pub use models::{DeleteConfirmation, PageQuery, Paginated};
pub use policy::{AccessRule, Caller, CallerIdentity, PolicyTable, ResourceAction};
pub use routes::resource_router;
pub use serde_with; // Schema impls reference serde_with::rust::double_option
pub use traits::{MergeIntoActiveModel, RecordRepository, SoftActivation, ValidateIntoActiveModel};
pub use validation::{FieldError, FieldErrors};
