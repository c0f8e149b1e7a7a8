//! Rendering: the typed, post-order block-tree → HTML transform.
//!
//! `block_renderer` owns the per-variant dispatch; the other modules
//! supply the pieces it composes — escaping and tags (`markup`), inline
//! rich text (`rich_text`), the derived table of contents (`toc`), the
//! session memoization (`cache`) and the host override seam
//! (`overrides`).

pub mod block_renderer;
pub mod cache;
pub mod markup;
pub mod overrides;
pub mod rich_text;
pub mod toc;

pub use block_renderer::{
    render_block, render_page, render_page_with_overrides, render_subtree, render_tree,
    RenderContext,
};
pub use cache::RenderCache;
pub use overrides::{BlockOverrides, NoOverrides};
pub use rich_text::render_rich_text;
pub use toc::{heading_anchor, page_table_of_contents, slugify, TocEntry};
