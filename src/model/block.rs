use super::blocks::*;
use super::common::BlockCommon;
use crate::types::{BlockId, RichTextItem};
use serde::{Deserialize, Serialize};

/// Macro to reduce boilerplate in Block enum methods.
macro_rules! match_all_blocks {
    ($self:expr, $pattern:pat => $result:expr) => {
        match $self {
            Block::Page($pattern) => $result,
            Block::Paragraph($pattern) => $result,
            Block::Heading1($pattern) => $result,
            Block::Heading2($pattern) => $result,
            Block::Heading3($pattern) => $result,
            Block::BulletedListItem($pattern) => $result,
            Block::NumberedListItem($pattern) => $result,
            Block::ToDo($pattern) => $result,
            Block::Toggle($pattern) => $result,
            Block::Quote($pattern) => $result,
            Block::Callout($pattern) => $result,
            Block::Code($pattern) => $result,
            Block::Equation($pattern) => $result,
            Block::Divider($pattern) => $result,
            Block::TableOfContents($pattern) => $result,
            Block::Image($pattern) => $result,
            Block::Video($pattern) => $result,
            Block::File($pattern) => $result,
            Block::Pdf($pattern) => $result,
            Block::Bookmark($pattern) => $result,
            Block::Embed($pattern) => $result,
            Block::ChildPage($pattern) => $result,
            Block::ChildDatabase($pattern) => $result,
            Block::LinkToPage($pattern) => $result,
            Block::Table($pattern) => $result,
            Block::TableRow($pattern) => $result,
            Block::ColumnList($pattern) => $result,
            Block::Column($pattern) => $result,
            Block::Synced($pattern) => $result,
            Block::LinkPreview($pattern) => $result,
            Block::Unsupported($pattern) => $result,
        }
    };
}

/// Block represents every block type the renderer understands, plus the
/// `Unsupported` fallback arm that keeps new API types from crashing a
/// render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Block {
    Page(PageBlock),
    Paragraph(ParagraphBlock),
    Heading1(Heading1Block),
    Heading2(Heading2Block),
    Heading3(Heading3Block),
    BulletedListItem(BulletedListItemBlock),
    NumberedListItem(NumberedListItemBlock),
    ToDo(ToDoBlock),
    Toggle(ToggleBlock),
    Quote(QuoteBlock),
    Callout(CalloutBlock),
    Code(CodeBlock),
    Equation(EquationBlock),
    Divider(DividerBlock),
    TableOfContents(TableOfContentsBlock),
    Image(ImageBlock),
    Video(VideoBlock),
    File(FileBlock),
    Pdf(PdfBlock),
    Bookmark(BookmarkBlock),
    Embed(EmbedBlock),
    ChildPage(ChildPageBlock),
    ChildDatabase(ChildDatabaseBlock),
    LinkToPage(LinkToPageBlock),
    Table(TableBlock),
    TableRow(TableRowBlock),
    ColumnList(ColumnListBlock),
    Column(ColumnBlock),
    Synced(SyncedBlock),
    LinkPreview(LinkPreviewBlock),
    Unsupported(UnsupportedBlock),
}

impl Block {
    /// Get the block's ID.
    pub fn id(&self) -> &BlockId {
        match_all_blocks!(self, b => &b.common.id)
    }

    /// Get common block data.
    pub fn common(&self) -> &BlockCommon {
        match_all_blocks!(self, b => &b.common)
    }

    /// Get mutable common block data.
    pub fn common_mut(&mut self) -> &mut BlockCommon {
        match_all_blocks!(self, b => &mut b.common)
    }

    /// Whether the source flagged this block as having children.
    pub fn has_children(&self) -> bool {
        self.common().has_children
    }

    /// Ordered child identifiers, materialized by the fetch pass.
    pub fn children(&self) -> &[BlockId] {
        &self.common().children
    }

    /// Get block type name as it appears on the wire.
    pub fn block_type(&self) -> &str {
        match self {
            Block::Page(_) => "page",
            Block::Paragraph(_) => "paragraph",
            Block::Heading1(_) => "heading_1",
            Block::Heading2(_) => "heading_2",
            Block::Heading3(_) => "heading_3",
            Block::BulletedListItem(_) => "bulleted_list_item",
            Block::NumberedListItem(_) => "numbered_list_item",
            Block::ToDo(_) => "to_do",
            Block::Toggle(_) => "toggle",
            Block::Quote(_) => "quote",
            Block::Callout(_) => "callout",
            Block::Code(_) => "code",
            Block::Equation(_) => "equation",
            Block::Divider(_) => "divider",
            Block::TableOfContents(_) => "table_of_contents",
            Block::Image(_) => "image",
            Block::Video(_) => "video",
            Block::File(_) => "file",
            Block::Pdf(_) => "pdf",
            Block::Bookmark(_) => "bookmark",
            Block::Embed(_) => "embed",
            Block::ChildPage(_) => "child_page",
            Block::ChildDatabase(_) => "child_database",
            Block::LinkToPage(_) => "link_to_page",
            Block::Table(_) => "table",
            Block::TableRow(_) => "table_row",
            Block::ColumnList(_) => "column_list",
            Block::Column(_) => "column",
            Block::Synced(_) => "synced_block",
            Block::LinkPreview(_) => "link_preview",
            Block::Unsupported(b) => &b.block_type,
        }
    }

    /// Whether this block is a list item (either notation).
    pub fn is_list_item(&self) -> bool {
        matches!(self, Block::BulletedListItem(_) | Block::NumberedListItem(_))
    }

    /// The fetch-assigned list marker, if any.
    pub fn list_marker(&self) -> Option<&ListMarker> {
        match self {
            Block::BulletedListItem(b) => b.marker.as_ref(),
            Block::NumberedListItem(b) => b.marker.as_ref(),
            _ => None,
        }
    }

    /// The primary rich text of this block, if the variant carries any.
    pub fn rich_text(&self) -> Option<&[RichTextItem]> {
        match self {
            Block::Page(b) => Some(&b.title),
            Block::Paragraph(b) => Some(&b.content.rich_text),
            Block::Heading1(b) => Some(&b.content.rich_text),
            Block::Heading2(b) => Some(&b.content.rich_text),
            Block::Heading3(b) => Some(&b.content.rich_text),
            Block::BulletedListItem(b) => Some(&b.content.rich_text),
            Block::NumberedListItem(b) => Some(&b.content.rich_text),
            Block::ToDo(b) => Some(&b.content.rich_text),
            Block::Toggle(b) => Some(&b.content.rich_text),
            Block::Quote(b) => Some(&b.content.rich_text),
            Block::Callout(b) => Some(&b.content.rich_text),
            Block::Code(b) => Some(&b.content.rich_text),
            _ => None,
        }
    }

    /// Mutable access to the primary rich text — the seam the fetcher
    /// uses to attach resolved mention URIs.
    pub fn rich_text_mut(&mut self) -> Option<&mut Vec<RichTextItem>> {
        match self {
            Block::Page(b) => Some(&mut b.title),
            Block::Paragraph(b) => Some(&mut b.content.rich_text),
            Block::Heading1(b) => Some(&mut b.content.rich_text),
            Block::Heading2(b) => Some(&mut b.content.rich_text),
            Block::Heading3(b) => Some(&mut b.content.rich_text),
            Block::BulletedListItem(b) => Some(&mut b.content.rich_text),
            Block::NumberedListItem(b) => Some(&mut b.content.rich_text),
            Block::ToDo(b) => Some(&mut b.content.rich_text),
            Block::Toggle(b) => Some(&mut b.content.rich_text),
            Block::Quote(b) => Some(&mut b.content.rich_text),
            Block::Callout(b) => Some(&mut b.content.rich_text),
            Block::Code(b) => Some(&mut b.content.rich_text),
            _ => None,
        }
    }

    /// Heading rank 1–3, `None` for non-headings.
    pub fn heading_rank(&self) -> Option<u8> {
        match self {
            Block::Heading1(_) => Some(1),
            Block::Heading2(_) => Some(2),
            Block::Heading3(_) => Some(3),
            _ => None,
        }
    }
}
