//! Query-parameter search over the searchable columns.
//!
//! Every non-empty query parameter except `page` must match, so multiple
//! parameters narrow the result. Matching is a case-insensitive substring
//! comparison against the column cast to text; the identifier parameter
//! additionally pins exact equality alongside its substring clause.
//! Parameters that do not name a searchable column are ignored.

use sea_orm::{
    ColumnTrait, Condition, DatabaseBackend,
    sea_query::{Alias, Expr, Func, LikeExpr, SimpleExpr},
};
use std::collections::HashMap;

use crate::traits::RecordRepository;

/// Reserved parameter consumed by pagination, never matched against columns
pub const PAGE_PARAM: &str = "page";

/// Build the conjunctive search condition for a resource.
///
/// An empty or fully-ignored parameter set yields an empty condition, which
/// leaves the scope untouched; the endpoint then behaves exactly like `list`.
#[must_use]
pub fn search_condition<T: RecordRepository>(
    params: &HashMap<String, String>,
    backend: DatabaseBackend,
) -> Condition {
    let mut condition = Condition::all();

    for (name, column) in T::searchable_columns() {
        if name == PAGE_PARAM {
            continue;
        }
        let Some(value) = params.get(name) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }

        // The identifier keeps its exact-equality clause next to the
        // substring clause; both must hold.
        if name == T::ID_COLUMN_NAME
            && let Ok(id) = value.parse::<i32>()
        {
            condition = condition.add(column.eq(id));
        }

        condition = condition.add(contains_insensitive(column, value, backend));
    }

    condition
}

/// Escape LIKE wildcards so the search value matches itself literally
fn escape_like_wildcards(value: &str) -> String {
    // Backslash first, so the escapes added below survive
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Case-insensitive substring match with the column cast to text, so numeric
/// and boolean columns compare the way their serialized form reads. Wildcards
/// in the value are escaped and match only their literal selves.
fn contains_insensitive(
    column: impl ColumnTrait,
    value: &str,
    backend: DatabaseBackend,
) -> SimpleExpr {
    // MySQL spells the text cast CHAR, everyone else TEXT
    let text_type = match backend {
        DatabaseBackend::MySql => "CHAR",
        _ => "TEXT",
    };

    let pattern = format!("%{}%", escape_like_wildcards(value).to_uppercase());

    SimpleExpr::FunctionCall(Func::upper(
        Expr::col(column).cast_as(Alias::new(text_type)),
    ))
    // SQLite has no default escape character, so the clause is explicit
    .like(LikeExpr::new(pattern).escape('\\'))
}
