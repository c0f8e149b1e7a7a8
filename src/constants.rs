// src/constants.rs
//! Domain constants that define the operational boundaries of the system.
//!
//! Each constant is named for the domain concept it constrains, not its
//! technical role.

// ---------------------------------------------------------------------------
// Notion API boundaries
// ---------------------------------------------------------------------------

/// How many objects the Notion API returns per page of results.
///
/// The API maximum is 100; using it minimizes round-trips during
/// recursive fetching.
pub const NOTION_API_PAGE_SIZE: u32 = 100;

/// Maximum nesting depth when recursively fetching block trees.
///
/// Notion pages nest arbitrarily deep. This cap prevents runaway fetches
/// on pathological trees; 50 levels is far deeper than any real workspace.
pub const NOTION_MAX_FETCH_DEPTH: u8 = 50;

// ---------------------------------------------------------------------------
// Retry boundaries
// ---------------------------------------------------------------------------

/// Extra wait added on top of a server-supplied `Retry-After` delay.
pub const RETRY_SAFETY_MARGIN_MS: u64 = 500;

/// Maximum attempts for one logical API call before the terminal
/// `RetriesExhausted` failure. The remote's backoff is not trusted to
/// converge on its own.
pub const MAX_RETRY_ATTEMPTS: u32 = 5;

/// First exponential-backoff delay when the server gives no hint.
pub const RETRY_BASE_DELAY_MS: u64 = 500;

/// Upper bound on any single backoff delay.
pub const RETRY_MAX_DELAY_MS: u64 = 30_000;

// ---------------------------------------------------------------------------
// Rendering boundaries
// ---------------------------------------------------------------------------

/// Pixels of indentation per table-of-contents level.
pub const TOC_INDENT_STEP_PX: usize = 24;

/// Minimum heading count before a full page shows its aside TOC.
pub const MIN_TOC_ITEMS: usize = 3;

/// Cover position used when a page cover has no explicit position.
pub const DEFAULT_COVER_POSITION: f64 = 0.5;

/// Trailing characters of a block ID appended to heading anchors to keep
/// same-text headings distinct.
pub const ANCHOR_ID_SUFFIX_LEN: usize = 5;

/// Estimated characters per rendered block, used to pre-allocate output.
/// A hint, not a constraint.
pub const CHARS_PER_BLOCK_ESTIMATE: usize = 256;

// ---------------------------------------------------------------------------
// Resolver boundaries
// ---------------------------------------------------------------------------

/// Entries kept by the memoizing page-URI resolver.
pub const MENTION_CACHE_CAPACITY: usize = 512;
