// src/api/fetcher.rs
//! Recursive block-tree assembly.
//!
//! `TreeFetcher` turns a page identifier into a fully materialized
//! `RecordMap`: it paginates each block's children to exhaustion,
//! descends depth-first into anything flagged `has_children`, and
//! annotates blocks along the way (list markers, resolved mention URIs,
//! image placeholders, bookmark previews). Fetches are sequential —
//! each recursive call completes before its parent continues, so sibling
//! order is exactly API order.
//!
//! Failure policy: the root page must resolve or the whole fetch fails;
//! any child-level failure degrades to "no children" with a log line, so
//! a flaky subtree becomes a gap in the page instead of an error screen.

use super::{fetch_all_pages, NotionGateway, Paginated, RetryPolicy};
use super::media::{LinkPreviewService, MediaProbe};
use crate::constants::{MENTION_CACHE_CAPACITY, NOTION_MAX_FETCH_DEPTH};
use crate::error::AppError;
use crate::model::{Block, BulletStyle, ListMarker, RecordMap};
use crate::types::{BlockId, DatabaseId, Mention, MentionKind, NotionId, RichTextKind};
use futures::future::{BoxFuture, FutureExt};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// The ability to resolve a page identifier to a display URI.
///
/// Page mentions carry only an identifier; turning that into something a
/// reader can click (a slug, a local route) is the host's knowledge.
/// Resolution usually costs a network call, so hosts should wrap their
/// resolver in [`MemoizedResolver`].
#[async_trait::async_trait]
pub trait PageUriResolver: Send + Sync {
    async fn page_uri(&self, id: &NotionId) -> Result<Option<String>, AppError>;
}

/// Resolver that maps every page to `<base><id>` without I/O.
pub struct BaseUrlResolver {
    base: String,
}

impl BaseUrlResolver {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }
}

#[async_trait::async_trait]
impl PageUriResolver for BaseUrlResolver {
    async fn page_uri(&self, id: &NotionId) -> Result<Option<String>, AppError> {
        Ok(Some(format!("{}{}", self.base, id.as_str())))
    }
}

/// LRU-memoizing wrapper around a resolver.
///
/// Negative results are cached too: a page that resolved to nothing will
/// keep resolving to nothing for the lifetime of this wrapper.
pub struct MemoizedResolver<R> {
    inner: R,
    cache: Mutex<LruCache<NotionId, Option<String>>>,
}

impl<R: PageUriResolver> MemoizedResolver<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(MENTION_CACHE_CAPACITY).expect("capacity is non-zero"),
            )),
        }
    }
}

#[async_trait::async_trait]
impl<R: PageUriResolver> PageUriResolver for MemoizedResolver<R> {
    async fn page_uri(&self, id: &NotionId) -> Result<Option<String>, AppError> {
        if let Some(hit) = self.cache.lock().get(id).cloned() {
            return Ok(hit);
        }
        let resolved = self.inner.page_uri(id).await?;
        self.cache.lock().put(id.clone(), resolved.clone());
        Ok(resolved)
    }
}

/// Immutable context threaded through the recursive descent: a
/// persistent visited-set for cycle protection plus the remaining depth.
#[derive(Debug, Clone)]
struct FetchContext {
    visited: im::HashSet<BlockId>,
    depth_remaining: u8,
}

impl FetchContext {
    fn new(max_depth: u8) -> Self {
        Self {
            visited: im::HashSet::new(),
            depth_remaining: max_depth.min(NOTION_MAX_FETCH_DEPTH),
        }
    }

    fn should_descend(&self, id: &BlockId) -> bool {
        self.depth_remaining > 0 && !self.visited.contains(id)
    }

    /// Marks `id` visited without consuming depth; used for the root.
    fn visit(&self, id: BlockId) -> Self {
        let mut visited = self.visited.clone();
        visited.insert(id);
        Self {
            visited,
            depth_remaining: self.depth_remaining,
        }
    }

    fn descend(&self, id: BlockId) -> Self {
        let mut visited = self.visited.clone();
        visited.insert(id);
        Self {
            visited,
            depth_remaining: self.depth_remaining.saturating_sub(1),
        }
    }
}

/// Assembles full block trees from a [`NotionGateway`].
pub struct TreeFetcher {
    gateway: Arc<dyn NotionGateway>,
    retry: RetryPolicy,
    max_depth: u8,
    resolver: Option<Arc<dyn PageUriResolver>>,
    media: Option<Arc<dyn MediaProbe>>,
    previews: Option<Arc<dyn LinkPreviewService>>,
    capture_schemas: bool,
}

impl TreeFetcher {
    pub fn new(gateway: Arc<dyn NotionGateway>) -> Self {
        Self {
            gateway,
            retry: RetryPolicy::default(),
            max_depth: NOTION_MAX_FETCH_DEPTH,
            resolver: None,
            media: None,
            previews: None,
            capture_schemas: true,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_max_depth(mut self, depth: u8) -> Self {
        self.max_depth = depth;
        self
    }

    /// Injects the async collaborator that resolves page mentions.
    pub fn with_resolver(mut self, resolver: Arc<dyn PageUriResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Injects the image placeholder probe.
    pub fn with_media_probe(mut self, media: Arc<dyn MediaProbe>) -> Self {
        self.media = Some(media);
        self
    }

    /// Injects the Open Graph scraper for bookmark previews.
    pub fn with_link_previews(mut self, previews: Arc<dyn LinkPreviewService>) -> Self {
        self.previews = Some(previews);
        self
    }

    pub fn with_schema_capture(mut self, capture: bool) -> Self {
        self.capture_schemas = capture;
        self
    }

    /// One page of children, retried under the policy. The contract
    /// mirrors the API: results plus continuation state.
    pub async fn fetch_children(
        &self,
        id: &NotionId,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<Paginated<Block>, AppError> {
        self.retry
            .run(|| self.gateway.fetch_children(id, page_size, cursor.clone()))
            .await
    }

    /// Fetches a page and materializes its whole reachable subtree.
    pub async fn fetch_page(&self, id: &NotionId) -> Result<RecordMap, AppError> {
        let mut page = self.retry.run(|| self.gateway.retrieve_page(id)).await?;
        let root_id = page.common.id.clone();
        log::info!("Fetching block tree for page {}", root_id);

        let mut map = RecordMap::with_root(root_id.clone());

        if let Some(cover) = page.format.cover.as_ref() {
            if cover.is_signed() {
                map.add_signed_url(root_id.clone(), cover.url().to_string());
            }
        }

        let ctx = FetchContext::new(self.max_depth).visit(root_id.clone());
        let children = self
            .fetch_subtree(root_id.clone(), None, ctx, &mut map)
            .await;

        page.common.has_children = !children.is_empty();
        page.common.children = children;

        let mut root = Block::Page(page);
        self.resolve_mentions(&mut root).await;
        map.insert(root);

        let violations = map.parent_violations();
        if !violations.is_empty() {
            log::warn!(
                "Record map has {} block(s) with missing parents",
                violations.len()
            );
        }

        log::info!("Fetched {} blocks for page {}", map.len(), root_id);
        Ok(map)
    }

    /// Every child of `id`, all pages concatenated. Failure degrades to
    /// an empty list — callers treat "no data" as "no children".
    async fn children_or_empty(&self, id: &NotionId) -> Vec<Block> {
        let outcome = fetch_all_pages(
            |page_size, cursor| self.fetch_children(id, page_size, cursor),
            None,
        )
        .await;

        match outcome {
            Ok(outcome) => outcome.items,
            Err(e) => {
                log::warn!("Failed to fetch children of {}: {}", id, e);
                Vec::new()
            }
        }
    }

    /// Depth-first assembly of one block's subtree. Returns the ordered
    /// child ids; the blocks themselves land in `map`.
    fn fetch_subtree<'a>(
        &'a self,
        parent: BlockId,
        parent_marker: Option<ListMarker>,
        ctx: FetchContext,
        map: &'a mut RecordMap,
    ) -> BoxFuture<'a, Vec<BlockId>> {
        async move {
            let blocks = self.children_or_empty(parent.as_notion_id()).await;
            let mut ids = Vec::with_capacity(blocks.len());

            // Sibling run counter for numbered lists; resets on any
            // non-numbered sibling so a paragraph interruption does not
            // restart numbering at the render stage (the annotation is
            // what makes the two Notion notations render identically).
            let mut number: usize = 1;

            for mut block in blocks {
                annotate_list_marker(&mut block, parent_marker.as_ref(), &mut number);

                self.resolve_mentions(&mut block).await;
                record_signed_asset(&block, map);
                self.annotate_image(&mut block).await;
                self.annotate_bookmark(&mut block).await;
                self.capture_schema(&block, map).await;

                let id = block.common().id.clone();
                block.common_mut().parent = Some(parent.clone());

                if block.has_children() {
                    if ctx.should_descend(&id) {
                        let marker = block.list_marker().cloned();
                        let children = self
                            .fetch_subtree(id.clone(), marker, ctx.descend(id.clone()), map)
                            .await;
                        block.common_mut().children = children;
                    } else {
                        log::warn!("Not descending into {} (depth limit or cycle)", id);
                    }
                }

                map.insert(block);
                ids.push(id);
            }

            ids
        }
        .boxed()
    }

    /// Attaches display URIs to page mentions through the injected
    /// resolver. Resolution failures leave the mention unresolved.
    async fn resolve_mentions(&self, block: &mut Block) {
        let Some(resolver) = self.resolver.as_ref() else {
            return;
        };
        let Some(runs) = block.rich_text_mut() else {
            return;
        };

        for run in runs.iter_mut() {
            if let RichTextKind::Mention(Mention {
                kind: MentionKind::Page { id, uri },
            }) = &mut run.kind
            {
                if uri.is_some() {
                    continue;
                }
                match resolver.page_uri(id).await {
                    Ok(resolved) => *uri = resolved,
                    Err(e) => log::debug!("Could not resolve mention {}: {}", id, e),
                }
            }
        }
    }

    /// Best-effort placeholder probe for image blocks.
    async fn annotate_image(&self, block: &mut Block) {
        let Some(media) = self.media.as_ref() else {
            return;
        };
        let Block::Image(image) = block else {
            return;
        };

        let url = image.source.url().to_string();
        if url.is_empty() {
            return;
        }
        match media.probe(&url).await {
            Ok(placeholder) => image.placeholder = Some(placeholder),
            Err(e) => log::warn!("Image placeholder probe failed for {}: {}", url, e),
        }
    }

    /// Best-effort Open Graph scrape for bookmark blocks.
    async fn annotate_bookmark(&self, block: &mut Block) {
        let Some(previews) = self.previews.as_ref() else {
            return;
        };
        let Block::Bookmark(bookmark) = block else {
            return;
        };

        if bookmark.url.is_empty() {
            return;
        }
        match previews.preview(&bookmark.url).await {
            Ok(preview) => bookmark.preview = Some(preview),
            Err(e) => log::warn!("Bookmark preview failed for {}: {}", bookmark.url, e),
        }
    }

    /// Best-effort schema capture for child databases (single attempt —
    /// a missing schema only costs the rendered title).
    async fn capture_schema(&self, block: &Block, map: &mut RecordMap) {
        if !self.capture_schemas {
            return;
        }
        let Block::ChildDatabase(child) = block else {
            return;
        };

        let id: DatabaseId = NotionId::from(&child.common.id).into();
        match self.gateway.retrieve_database(child.common.id.as_notion_id()).await {
            Ok(schema) => map.add_schema(id, schema),
            Err(e) => log::debug!("Could not fetch schema for database {}: {}", id, e),
        }
    }
}

/// Records signed (expiring) asset URLs in the record map's side table,
/// so a refresh pass can swap them without touching the blocks.
fn record_signed_asset(block: &Block, map: &mut RecordMap) {
    let source = match block {
        Block::Image(b) => Some(&b.source),
        Block::Video(b) => Some(&b.source),
        Block::File(b) => Some(&b.source),
        Block::Pdf(b) => Some(&b.source),
        _ => None,
    };
    if let Some(source) = source {
        if source.is_signed() {
            map.add_signed_url(block.common().id.clone(), source.url().to_string());
        }
    }
}

/// Writes the list-marker annotation for one sibling, maintaining the
/// running counter.
///
/// Numbered items continue the counter across non-list interruptions but
/// inherit a numbered parent's label as a prefix; bulleted items cycle
/// disc → circle → square by nesting. A bulleted hint never prefixes a
/// numbered child.
fn annotate_list_marker(block: &mut Block, parent_marker: Option<&ListMarker>, number: &mut usize) {
    match block {
        Block::NumberedListItem(item) => {
            let prefix = match parent_marker {
                Some(ListMarker::Numbered { label }) => label.clone(),
                _ => String::new(),
            };
            item.marker = Some(ListMarker::Numbered {
                label: format!("{}{}.", prefix, number),
            });
            *number += 1;
        }
        Block::BulletedListItem(item) => {
            let style = match parent_marker {
                None => BulletStyle::Disc,
                Some(ListMarker::Bulleted { style }) => style.next(),
                Some(ListMarker::Numbered { .. }) => BulletStyle::Circle,
            };
            item.marker = Some(ListMarker::Bulleted { style });
            *number = 1;
        }
        _ => {
            *number = 1;
        }
    }
}
