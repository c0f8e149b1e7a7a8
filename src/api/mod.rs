// src/api/mod.rs
//! Notion API interaction — the ability to retrieve content from a
//! workspace, with clear separation between I/O, parsing, and the tree
//! assembly logic.

pub mod client;
pub mod fetcher;
pub mod media;
mod pagination;
pub mod parser;
mod responses;
pub mod retry;
pub mod search;

use crate::error::AppError;
use crate::model::{Block, DatabaseSchema, PageBlock, PageRecord};
use crate::types::NotionId;
use serde::Serialize;

pub use client::{ApiResponse, NotionHttpClient};
pub use fetcher::{BaseUrlResolver, MemoizedResolver, PageUriResolver, TreeFetcher};
pub use media::{LinkPreviewService, MediaProbe, OpenGraphClient, PlaceholderClient};
pub use pagination::{fetch_all_pages, Paginated, PaginationOutcome};
pub use retry::RetryPolicy;
pub use search::{SearchClient, SearchHit, SearchQuery, SearchResults};

/// Sort direction for database queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One sort criterion, passed through to the query endpoint unchanged.
#[derive(Debug, Clone, Serialize)]
pub struct Sort {
    pub property: String,
    pub direction: SortDirection,
}

/// Query parameters for a database, forwarded verbatim on every
/// pagination step.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DatabaseQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sorts: Vec<Sort>,
}

/// The ability to retrieve content from a Notion workspace.
///
/// This is the fundamental seam for API interaction: the tree fetcher
/// depends on this trait, never on HTTP details, which is also how the
/// test suite injects simulated backends.
#[async_trait::async_trait]
pub trait NotionGateway: Send + Sync {
    /// Retrieves a page object, synthesized into a root page block with
    /// no children attached yet.
    async fn retrieve_page(&self, id: &NotionId) -> Result<PageBlock, AppError>;

    /// Retrieves one page of a block's children.
    async fn fetch_children(
        &self,
        parent: &NotionId,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<Paginated<Block>, AppError>;

    /// Retrieves a database's schema.
    async fn retrieve_database(&self, id: &NotionId) -> Result<DatabaseSchema, AppError>;

    /// Queries one page of a database's rows.
    async fn query_database(
        &self,
        id: &NotionId,
        query: &DatabaseQuery,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<Paginated<PageRecord>, AppError>;
}

/// Queries every row of a database, following cursors until exhaustion.
///
/// Filter and sort parameters are re-sent unchanged on every page;
/// row order is whatever the API returned, concatenated across pages.
pub async fn fetch_all_rows(
    gateway: &dyn NotionGateway,
    retry: &RetryPolicy,
    id: &NotionId,
    query: &DatabaseQuery,
) -> Result<Vec<PageRecord>, AppError> {
    let outcome = fetch_all_pages(
        |page_size, cursor| async move {
            retry
                .run(|| gateway.query_database(id, query, page_size, cursor.clone()))
                .await
        },
        None,
    )
    .await?;
    Ok(outcome.items)
}
