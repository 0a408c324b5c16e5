//! Sequential cursor-following pagination

use std::future::Future;
use log::debug;

use super::{Cursor, FetchResult, Page};

/// Fetch every page of a listing and return the accumulated items
///
/// Each request is issued only after the previous page's cursor is known.
/// If any page fails the whole listing fails and the pages gathered so far
/// are dropped.
pub async fn collect_all_pages<T, F, Fut>(operation: &str, mut fetch_page: F) -> FetchResult<Vec<T>>
where
    F: FnMut(Option<Cursor>) -> Fut,
    Fut: Future<Output = FetchResult<Page<T>>>,
{
    let mut items = Vec::new();
    let mut cursor: Option<Cursor> = None;
    let mut pages = 0usize;

    loop {
        let page = fetch_page(cursor.take()).await?;
        pages += 1;
        items.extend(page.items);
        match page.next {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    debug!("{}: collected {} items over {} page(s)", operation, items.len(), pages);
    Ok(items)
}
