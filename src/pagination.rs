//! Page-number pagination for the list and search endpoints.
//!
//! Pages are 1-based and sized by the resource binding. A missing `page`
//! parameter means page 1; page 0, a non-numeric page, or a page past the
//! end of the scope answer 404 "Invalid page.". Page 1 of an empty scope is
//! a valid empty envelope.

use axum::http::Uri;

use crate::errors::ApiError;

/// Records per page unless the binding overrides it
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Parse the raw `page` query value into a 1-based page number
pub fn parse_page(raw: Option<&str>) -> Result<u64, ApiError> {
    match raw {
        None => Ok(1),
        Some(value) => match value.parse::<u64>() {
            Ok(page) if page >= 1 => Ok(page),
            _ => Err(ApiError::invalid_page()),
        },
    }
}

/// Offset of the requested page, or `InvalidPage` when the page is past the
/// end of the scope
pub fn page_offset(page: u64, page_size: u64, count: u64) -> Result<u64, ApiError> {
    let page_size = page_size.max(1);
    let last_page = count.div_ceil(page_size).max(1);
    if page > last_page {
        return Err(ApiError::invalid_page());
    }
    Ok((page - 1) * page_size)
}

/// Relative `next` and `previous` URLs for the envelope
///
/// Both links keep every query parameter of the request except `page`, which
/// is swapped for the adjacent page number. The first page is addressed
/// without an explicit `page` parameter.
#[must_use]
pub fn page_links(
    uri: &Uri,
    page: u64,
    page_size: u64,
    count: u64,
) -> (Option<String>, Option<String>) {
    let page_size = page_size.max(1);
    let next = (page * page_size < count).then(|| replace_page_param(uri, page + 1));
    let previous = (page > 1).then(|| replace_page_param(uri, page - 1));
    (next, previous)
}

fn replace_page_param(uri: &Uri, page: u64) -> String {
    let mut pairs: Vec<String> = uri
        .query()
        .unwrap_or("")
        .split('&')
        .filter(|pair| !pair.is_empty() && *pair != "page" && !pair.starts_with("page="))
        .map(String::from)
        .collect();

    if page > 1 {
        pairs.push(format!("page={page}"));
    }

    if pairs.is_empty() {
        uri.path().to_string()
    } else {
        format!("{}?{}", uri.path(), pairs.join("&"))
    }
}
