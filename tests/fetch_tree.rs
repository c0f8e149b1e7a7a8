//! Tree fetcher integration tests against a simulated backend.

use async_trait::async_trait;
use notion2html::{
    AppError, BaseUrlResolver, Block, BlockCommon, BlockId, BookmarkBlock, BookmarkPreview,
    DatabaseQuery, DatabaseSchema, ImageBlock, ImagePlaceholder, LinkPreviewService, MediaProbe,
    MemoizedResolver, Mention, MentionKind, NotionErrorCode, NotionGateway, NotionId, PageBlock,
    PageFormat, PageRecord, Paginated, ParagraphBlock, RichTextItem, RichTextKind, TextBlockContent,
    TreeFetcher,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

fn paragraph(text: &str) -> Block {
    Block::Paragraph(ParagraphBlock {
        common: BlockCommon::default(),
        content: TextBlockContent::plain(text),
    })
}

fn paragraph_with_children(text: &str) -> Block {
    let mut block = paragraph(text);
    block.common_mut().has_children = true;
    block
}

fn numbered(text: &str) -> Block {
    Block::NumberedListItem(notion2html::NumberedListItemBlock {
        common: BlockCommon::default(),
        content: TextBlockContent::plain(text),
        marker: None,
    })
}

fn bulleted(text: &str) -> Block {
    Block::BulletedListItem(notion2html::BulletedListItemBlock {
        common: BlockCommon::default(),
        content: TextBlockContent::plain(text),
        marker: None,
    })
}

fn root_page(id: &BlockId) -> PageBlock {
    PageBlock {
        common: BlockCommon {
            id: id.clone(),
            parent: None,
            has_children: true,
            children: Vec::new(),
            archived: false,
        },
        title: vec![RichTextItem::plain_text("Fixture page")],
        format: PageFormat::default(),
        url: None,
    }
}

/// Simulated backend: a page, per-parent child lists served in slices,
/// optional injected rate-limit failures, and a call log.
struct FakeGateway {
    page: PageBlock,
    children: HashMap<String, Vec<Block>>,
    page_len: usize,
    rows: Vec<PageRecord>,
    rate_limit_failures: Mutex<HashMap<String, u32>>,
    hard_failures: Mutex<HashMap<String, u32>>,
    calls: Mutex<Vec<(String, Option<String>)>>,
    query_log: Mutex<Vec<String>>,
}

impl FakeGateway {
    fn new(page: PageBlock) -> Self {
        Self {
            page,
            children: HashMap::new(),
            page_len: 100,
            rows: Vec::new(),
            rate_limit_failures: Mutex::new(HashMap::new()),
            hard_failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            query_log: Mutex::new(Vec::new()),
        }
    }

    fn with_rows(mut self, rows: Vec<PageRecord>) -> Self {
        self.rows = rows;
        self
    }

    fn with_children(mut self, parent: &BlockId, blocks: Vec<Block>) -> Self {
        self.children.insert(parent.as_str().to_string(), blocks);
        self
    }

    fn with_page_len(mut self, page_len: usize) -> Self {
        self.page_len = page_len;
        self
    }

    fn failing_with_rate_limit(self, parent: &BlockId, times: u32) -> Self {
        self.rate_limit_failures
            .lock()
            .insert(parent.as_str().to_string(), times);
        self
    }

    fn failing_hard(self, parent: &BlockId, times: u32) -> Self {
        self.hard_failures
            .lock()
            .insert(parent.as_str().to_string(), times);
        self
    }
}

#[async_trait]
impl NotionGateway for FakeGateway {
    async fn retrieve_page(&self, _id: &NotionId) -> Result<PageBlock, AppError> {
        Ok(self.page.clone())
    }

    async fn fetch_children(
        &self,
        parent: &NotionId,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<Paginated<Block>, AppError> {
        let key = parent.as_str().to_string();
        self.calls.lock().push((key.clone(), cursor.clone()));

        if let Some(remaining) = self.rate_limit_failures.lock().get_mut(&key) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(AppError::NotionService {
                    code: NotionErrorCode::RateLimited,
                    message: "rate limited".to_string(),
                    status: reqwest::StatusCode::TOO_MANY_REQUESTS,
                    retry_after: Some(Duration::from_secs(2)),
                });
            }
        }
        if let Some(remaining) = self.hard_failures.lock().get_mut(&key) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(AppError::NotionService {
                    code: NotionErrorCode::ObjectNotFound,
                    message: "gone".to_string(),
                    status: reqwest::StatusCode::NOT_FOUND,
                    retry_after: None,
                });
            }
        }

        let all = self.children.get(&key).cloned().unwrap_or_default();
        let start: usize = cursor.map(|c| c.parse().unwrap()).unwrap_or(0);
        let len = self.page_len.min(page_size as usize);
        let end = (start + len).min(all.len());
        Ok(Paginated {
            results: all[start..end].to_vec(),
            next_cursor: (end < all.len()).then(|| end.to_string()),
            has_more: end < all.len(),
        })
    }

    async fn retrieve_database(&self, _id: &NotionId) -> Result<DatabaseSchema, AppError> {
        Err(AppError::NotionService {
            code: NotionErrorCode::ObjectNotFound,
            message: "no database".to_string(),
            status: reqwest::StatusCode::NOT_FOUND,
            retry_after: None,
        })
    }

    async fn query_database(
        &self,
        _id: &NotionId,
        query: &DatabaseQuery,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<Paginated<PageRecord>, AppError> {
        self.query_log
            .lock()
            .push(serde_json::to_string(query).unwrap());

        let start: usize = cursor.map(|c| c.parse().unwrap()).unwrap_or(0);
        let len = self.page_len.min(page_size as usize);
        let end = (start + len).min(self.rows.len());
        Ok(Paginated {
            results: self.rows[start..end].to_vec(),
            next_cursor: (end < self.rows.len()).then(|| end.to_string()),
            has_more: end < self.rows.len(),
        })
    }
}

fn fetcher(gateway: FakeGateway) -> TreeFetcher {
    TreeFetcher::new(Arc::new(gateway))
}

fn plain_text_of(block: &Block) -> String {
    block
        .rich_text()
        .map(notion2html::join_plain_text)
        .unwrap_or_default()
}

#[tokio::test]
async fn pagination_yields_every_child_in_order() {
    let root = BlockId::new_v4();
    let children: Vec<Block> = (0..250).map(|i| paragraph(&format!("p{}", i))).collect();
    let gateway = FakeGateway::new(root_page(&root)).with_children(&root, children);

    let map = fetcher(gateway).fetch_page(root.as_notion_id()).await.unwrap();

    let texts: Vec<String> = map.children_of(&root).map(plain_text_of).collect();
    let expected: Vec<String> = (0..250).map(|i| format!("p{}", i)).collect();
    assert_eq!(texts, expected);
}

#[tokio::test]
async fn small_pages_still_complete() {
    let root = BlockId::new_v4();
    let children: Vec<Block> = (0..7).map(|i| paragraph(&format!("p{}", i))).collect();
    let gateway = FakeGateway::new(root_page(&root))
        .with_children(&root, children)
        .with_page_len(3);

    let gateway = Arc::new(gateway);
    let map = TreeFetcher::new(gateway.clone())
        .fetch_page(root.as_notion_id())
        .await
        .unwrap();

    assert_eq!(map.children_of(&root).count(), 7);

    // three pages were requested, each continuing from the last cursor
    let cursors: Vec<Option<String>> = gateway.calls.lock().iter().map(|(_, c)| c.clone()).collect();
    assert_eq!(
        cursors,
        vec![None, Some("3".to_string()), Some("6".to_string())]
    );
}

#[tokio::test]
async fn nested_blocks_keep_their_depth_and_parent_links() {
    let root = BlockId::new_v4();
    let level1 = paragraph_with_children("level1");
    let level1_id = level1.id().clone();
    let level2 = paragraph_with_children("level2");
    let level2_id = level2.id().clone();
    let level3 = paragraph("level3");
    let level3_id = level3.id().clone();

    let gateway = FakeGateway::new(root_page(&root))
        .with_children(&root, vec![level1])
        .with_children(&level1_id, vec![level2])
        .with_children(&level2_id, vec![level3]);

    let map = fetcher(gateway).fetch_page(root.as_notion_id()).await.unwrap();

    assert_eq!(map.depth_of(&level3_id), 3);
    assert_eq!(map.parent_of(&level3_id).unwrap().id(), &level2_id);
    assert_eq!(map.parent_of(&level2_id).unwrap().id(), &level1_id);
    assert!(map.parent_violations().is_empty());
}

#[tokio::test]
async fn numbering_continues_across_paragraph_interruptions() {
    let root = BlockId::new_v4();
    let blocks = vec![
        numbered("one"),
        numbered("two"),
        paragraph("interruption"),
        numbered("three"),
    ];
    let ids: Vec<BlockId> = blocks.iter().map(|b| b.id().clone()).collect();
    let gateway = FakeGateway::new(root_page(&root)).with_children(&root, blocks);

    let map = fetcher(gateway).fetch_page(root.as_notion_id()).await.unwrap();

    let label = |id: &BlockId| match map.block(id).unwrap().list_marker() {
        Some(notion2html::ListMarker::Numbered { label }) => Some(label.clone()),
        _ => None,
    };
    assert_eq!(label(&ids[0]).unwrap(), "1.");
    assert_eq!(label(&ids[1]).unwrap(), "2.");
    assert_eq!(label(&ids[2]), None);
    assert_eq!(label(&ids[3]).unwrap(), "3.");
}

#[tokio::test]
async fn bullet_markers_cycle_by_nesting_depth() {
    let root = BlockId::new_v4();
    let mut top = bulleted("top");
    top.common_mut().has_children = true;
    let top_id = top.id().clone();
    let mut mid = bulleted("mid");
    mid.common_mut().has_children = true;
    let mid_id = mid.id().clone();
    let leaf = bulleted("leaf");
    let leaf_id = leaf.id().clone();

    let gateway = FakeGateway::new(root_page(&root))
        .with_children(&root, vec![top])
        .with_children(&top_id, vec![mid])
        .with_children(&mid_id, vec![leaf]);

    let map = fetcher(gateway).fetch_page(root.as_notion_id()).await.unwrap();

    let style = |id: &BlockId| match map.block(id).unwrap().list_marker() {
        Some(notion2html::ListMarker::Bulleted { style }) => *style,
        other => panic!("expected bullet marker, got {:?}", other),
    };
    assert_eq!(style(&top_id), notion2html::BulletStyle::Disc);
    assert_eq!(style(&mid_id), notion2html::BulletStyle::Circle);
    assert_eq!(style(&leaf_id), notion2html::BulletStyle::Square);
}

#[tokio::test(start_paused = true)]
async fn rate_limit_waits_the_server_delay_plus_margin() {
    let root = BlockId::new_v4();
    let gateway = FakeGateway::new(root_page(&root))
        .with_children(&root, vec![paragraph("after retry")])
        .failing_with_rate_limit(&root, 1);

    let started = tokio::time::Instant::now();
    let map = fetcher(gateway).fetch_page(root.as_notion_id()).await.unwrap();

    // children arrived on the retried call
    assert_eq!(map.children_of(&root).count(), 1);
    // and not before retry-after (2s) + safety margin (500ms)
    assert!(started.elapsed() >= Duration::from_millis(2500));
}

#[tokio::test]
async fn child_fetch_failure_degrades_to_no_children() {
    let root = BlockId::new_v4();
    let mut branch = paragraph_with_children("branch");
    let branch_id = branch.id().clone();
    branch.common_mut().has_children = true;

    let gateway = FakeGateway::new(root_page(&root))
        .with_children(&root, vec![branch, paragraph("sibling")])
        .failing_hard(&branch_id, 1);

    let map = fetcher(gateway).fetch_page(root.as_notion_id()).await.unwrap();

    // the failed subtree is a gap, not an error
    assert_eq!(map.children_of(&root).count(), 2);
    assert_eq!(map.children_of(&branch_id).count(), 0);
}

#[tokio::test]
async fn page_mentions_get_resolved_uris() {
    let root = BlockId::new_v4();
    let target = NotionId::parse("550e8400e29b41d4a716446655440000").unwrap();

    let mention_block = Block::Paragraph(ParagraphBlock {
        common: BlockCommon::default(),
        content: TextBlockContent {
            rich_text: vec![
                RichTextItem::plain_text("see "),
                RichTextItem::page_mention(target.clone(), "the other page"),
            ],
            color: Default::default(),
        },
    });
    let mention_id = mention_block.id().clone();

    let gateway = FakeGateway::new(root_page(&root)).with_children(&root, vec![mention_block]);
    let fetcher = fetcher(gateway)
        .with_resolver(Arc::new(MemoizedResolver::new(BaseUrlResolver::new("/note/"))));

    let map = fetcher.fetch_page(root.as_notion_id()).await.unwrap();

    let runs = map.block(&mention_id).unwrap().rich_text().unwrap();
    match &runs[1].kind {
        RichTextKind::Mention(Mention {
            kind: MentionKind::Page { uri, .. },
        }) => {
            assert_eq!(uri.as_deref(), Some("/note/550e8400e29b41d4a716446655440000"));
        }
        other => panic!("unexpected kind: {:?}", other),
    }
}

struct FixedProbe;

#[async_trait]
impl MediaProbe for FixedProbe {
    async fn probe(&self, _url: &str) -> Result<ImagePlaceholder, AppError> {
        Ok(ImagePlaceholder {
            base64: "data".to_string(),
            width: 640,
            height: 480,
        })
    }
}

struct FailingProbe;

#[async_trait]
impl MediaProbe for FailingProbe {
    async fn probe(&self, _url: &str) -> Result<ImagePlaceholder, AppError> {
        Err(AppError::MalformedResponse("no placeholder".to_string()))
    }
}

struct FixedPreview;

#[async_trait]
impl LinkPreviewService for FixedPreview {
    async fn preview(&self, url: &str) -> Result<BookmarkPreview, AppError> {
        Ok(BookmarkPreview {
            url: url.to_string(),
            title: Some("Example".to_string()),
            description: None,
            favicon: None,
            image: None,
        })
    }
}

fn image_block() -> Block {
    Block::Image(ImageBlock {
        common: BlockCommon::default(),
        source: notion2html::FileObject::External {
            external: notion2html::ExternalFile {
                url: "https://example.com/pic.png".to_string(),
            },
        },
        caption: Vec::new(),
        placeholder: None,
    })
}

fn bookmark_block(url: &str) -> Block {
    Block::Bookmark(BookmarkBlock {
        common: BlockCommon::default(),
        url: url.to_string(),
        caption: Vec::new(),
        preview: None,
    })
}

#[tokio::test]
async fn side_fetches_annotate_images_and_bookmarks() {
    let root = BlockId::new_v4();
    let image = image_block();
    let image_id = image.id().clone();
    let bookmark = bookmark_block("https://example.com");
    let bookmark_id = bookmark.id().clone();

    let gateway = FakeGateway::new(root_page(&root)).with_children(&root, vec![image, bookmark]);
    let fetcher = fetcher(gateway)
        .with_media_probe(Arc::new(FixedProbe))
        .with_link_previews(Arc::new(FixedPreview));

    let map = fetcher.fetch_page(root.as_notion_id()).await.unwrap();

    let Block::Image(image) = map.block(&image_id).unwrap() else {
        panic!("expected image");
    };
    let placeholder = image.placeholder.as_ref().unwrap();
    assert_eq!((placeholder.width, placeholder.height), (640, 480));

    let Block::Bookmark(bookmark) = map.block(&bookmark_id).unwrap() else {
        panic!("expected bookmark");
    };
    assert_eq!(
        bookmark.preview.as_ref().unwrap().title.as_deref(),
        Some("Example")
    );
}

#[tokio::test]
async fn database_queries_concatenate_rows_and_resend_parameters() {
    use notion2html::{fetch_all_rows, PageId, RetryPolicy, Sort, SortDirection};

    let root = BlockId::new_v4();
    let rows: Vec<PageRecord> = (0..130)
        .map(|i| PageRecord {
            id: PageId::new_v4(),
            created_time: None,
            last_edited_time: None,
            archived: false,
            url: Some(format!("https://www.notion.so/row-{}", i)),
            properties: indexmap::IndexMap::new(),
        })
        .collect();

    let gateway = FakeGateway::new(root_page(&root)).with_rows(rows);
    let query = DatabaseQuery {
        filter: Some(serde_json::json!({ "property": "Status", "select": { "equals": "Done" } })),
        sorts: vec![Sort {
            property: "Date".to_string(),
            direction: SortDirection::Descending,
        }],
    };

    let db = NotionId::parse("550e8400e29b41d4a716446655440123").unwrap();
    let rows = fetch_all_rows(&gateway, &RetryPolicy::default(), &db, &query)
        .await
        .unwrap();

    assert_eq!(rows.len(), 130);
    assert_eq!(
        rows[17].url.as_deref(),
        Some("https://www.notion.so/row-17"),
        "row order is source order"
    );

    // both pagination steps re-sent the identical query
    let log = gateway.query_log.lock();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0], log[1]);
    assert!(log[0].contains("\"direction\":\"descending\""));
    assert!(log[0].contains("Status"));
}

#[tokio::test]
async fn failed_side_fetch_leaves_the_annotation_absent() {
    let root = BlockId::new_v4();
    let image = image_block();
    let image_id = image.id().clone();

    let gateway = FakeGateway::new(root_page(&root)).with_children(&root, vec![image]);
    let fetcher = fetcher(gateway).with_media_probe(Arc::new(FailingProbe));

    let map = fetcher.fetch_page(root.as_notion_id()).await.unwrap();

    let Block::Image(image) = map.block(&image_id).unwrap() else {
        panic!("expected image");
    };
    assert!(image.placeholder.is_none());
}
