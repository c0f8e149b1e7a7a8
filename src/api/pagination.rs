// src/api/pagination.rs
//! Cursor-following pagination over the Notion list endpoints.

use crate::constants::NOTION_API_PAGE_SIZE;
use crate::error::AppError;

/// One page of a paginated listing, as the API reports it.
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub results: Vec<T>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// The concatenation of every page of a listing.
#[derive(Debug, Clone)]
pub struct PaginationOutcome<T> {
    pub items: Vec<T>,
    pub pages_fetched: u32,
}

/// Fetches all pages of a listing, concatenating results in source order.
///
/// `fetch_fn` receives the page size and the continuation cursor; callers
/// close over whatever request parameters (sorts, filters) must be
/// re-sent identically on every page.
pub async fn fetch_all_pages<T, F, Fut>(
    mut fetch_fn: F,
    max_pages: Option<u32>,
) -> Result<PaginationOutcome<T>, AppError>
where
    F: FnMut(u32, Option<String>) -> Fut,
    Fut: std::future::Future<Output = Result<Paginated<T>, AppError>>,
{
    let mut all_items = Vec::new();
    let mut cursor = None;
    let mut pages_fetched = 0u32;

    loop {
        if let Some(max) = max_pages {
            if pages_fetched >= max {
                log::debug!("Reached maximum page limit: {}", max);
                break;
            }
        }

        let page = fetch_fn(NOTION_API_PAGE_SIZE, cursor).await?;

        let has_more = page.has_more;
        cursor = page.next_cursor.clone();
        all_items.extend(page.results);
        pages_fetched += 1;

        if !has_more || cursor.is_none() {
            break;
        }
    }

    Ok(PaginationOutcome {
        items: all_items,
        pages_fetched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Simulated backend that splits `total` numbered items into pages
    /// of `page_len`.
    fn page_of(total: usize, page_len: usize, cursor: Option<String>) -> Paginated<usize> {
        let start: usize = cursor.map(|c| c.parse().unwrap()).unwrap_or(0);
        let end = (start + page_len).min(total);
        Paginated {
            results: (start..end).collect(),
            next_cursor: (end < total).then(|| end.to_string()),
            has_more: end < total,
        }
    }

    #[tokio::test]
    async fn concatenates_every_page_in_order() {
        for (total, page_len) in [(0, 7), (1, 1), (10, 3), (100, 100), (250, 100)] {
            let outcome = fetch_all_pages(
                |_, cursor| async move { Ok(page_of(total, page_len, cursor)) },
                None,
            )
            .await
            .unwrap();

            assert_eq!(outcome.items, (0..total).collect::<Vec<_>>());
        }
    }

    #[tokio::test]
    async fn stops_at_the_page_limit() {
        let outcome = fetch_all_pages(
            |_, cursor| async move { Ok(page_of(1000, 10, cursor)) },
            Some(3),
        )
        .await
        .unwrap();

        assert_eq!(outcome.pages_fetched, 3);
        assert_eq!(outcome.items.len(), 30);
    }

    #[tokio::test]
    async fn propagates_fetch_errors() {
        let result: Result<PaginationOutcome<usize>, _> = fetch_all_pages(
            |_, _| async move { Err(AppError::MalformedResponse("boom".to_string())) },
            None,
        )
        .await;
        assert!(result.is_err());
    }
}
