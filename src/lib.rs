// src/lib.rs
//! notion2html library — renders Notion pages into HTML document trees.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling** — `AppError`, `NotionErrorCode`, `ValidationError`
//! - **Configuration** — `PipelineConfig`, `RenderOptions`
//! - **Domain model** — `Block`, `RecordMap`, block variant structs
//! - **Domain types** — `NotionId`, `BlockId`, `RichTextItem`, `Color`
//! - **API client** — `NotionGateway`, `NotionHttpClient`, `TreeFetcher`,
//!   `RetryPolicy`, `SearchClient`
//! - **Rendering** — `render_page`, `render_block`, `RenderCache`,
//!   `BlockOverrides`

mod api;
mod config;
mod constants;
mod error;
mod model;
mod render;
mod types;

// --- Error Handling ---
pub use crate::error::{AppError, NotionErrorCode};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{CommandLineInput, PipelineConfig, RenderOptions};

// --- Domain Model ---
pub use crate::model::{Block, BlockCommon, DatabaseSchema, PageRecord, RecordMap};

// --- Block Types ---
pub use crate::model::blocks::{
    BookmarkBlock, BookmarkPreview, BulletStyle, BulletedListItemBlock, CalloutBlock,
    ChildDatabaseBlock, ChildPageBlock, CodeBlock, ColumnBlock, ColumnFormat, ColumnListBlock,
    DividerBlock, EmbedBlock, EquationBlock, ExternalFile, FileBlock, FileObject, Heading1Block,
    Heading2Block, Heading3Block, Icon, ImageBlock, ImagePlaceholder, LinkPreviewBlock,
    LinkToPageBlock, ListMarker, NotionFile, NumberedListItemBlock, PageBlock, PageFormat,
    ParagraphBlock, PdfBlock, QuoteBlock, SyncedBlock, TableBlock, TableOfContentsBlock,
    TableRowBlock, TextBlockContent, ToDoBlock, ToggleBlock, UnsupportedBlock, VideoBlock,
};

// --- Domain Types ---
pub use crate::types::{
    Annotations, ApiKey, BlockId, Color, DatabaseId, Link, Mention, MentionKind, NotionId, PageId,
    RichTextItem, RichTextKind, SearchCredentials, ValidatedUrl,
};
pub use crate::types::join_plain_text;

// --- API Client ---
pub use crate::api::{
    fetch_all_pages, fetch_all_rows, BaseUrlResolver, DatabaseQuery, LinkPreviewService,
    MediaProbe, MemoizedResolver, NotionGateway, NotionHttpClient, OpenGraphClient, Paginated,
    PageUriResolver, PaginationOutcome, PlaceholderClient, RetryPolicy, SearchClient, SearchHit,
    SearchQuery, SearchResults, Sort, SortDirection, TreeFetcher,
};

// --- Rendering ---
pub use crate::render::{
    heading_anchor, page_table_of_contents, render_block, render_page,
    render_page_with_overrides, render_rich_text, render_subtree, render_tree, BlockOverrides,
    NoOverrides, RenderCache, RenderContext, TocEntry,
};
