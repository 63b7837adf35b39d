use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query parameters accepted by the paginated list endpoints.
///
/// `page` is 1-based and arrives as a raw string so the endpoint, not the
/// extractor, decides what a bad value means: non-numeric input and page 0
/// answer 404 "Invalid page.", the same as a page past the end.
#[derive(Deserialize, IntoParams, ToSchema, Default)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number within the paginated scope.
    ///
    /// Example: `2`
    #[param(example = "1")]
    pub page: Option<String>,
}

/// Page envelope returned by `list` and `search`.
///
/// `next` and `previous` are root-relative URLs for the adjacent pages with
/// every other query parameter preserved, or `null` at either edge.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Paginated<T> {
    /// Total number of records in the scope, across all pages
    pub count: u64,
    /// URL of the following page, if any
    pub next: Option<String>,
    /// URL of the preceding page, if any
    pub previous: Option<String>,
    /// The records on this page
    pub results: Vec<T>,
}

/// Body of a successful delete
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteConfirmation {
    /// Human-readable confirmation, e.g. "member deleted successfully"
    pub message: String,
}
