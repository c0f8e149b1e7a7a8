use super::common::BlockCommon;
use crate::types::{BlockId, Color, NotionId, RichTextItem};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Text content shared by the text-bearing block variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlockContent {
    pub rich_text: Vec<RichTextItem>,
    pub color: Color,
}

impl Default for TextBlockContent {
    fn default() -> Self {
        Self {
            rich_text: Vec::new(),
            color: Color::Default,
        }
    }
}

impl TextBlockContent {
    pub fn plain(text: &str) -> Self {
        Self {
            rich_text: vec![RichTextItem::plain_text(text)],
            color: Color::Default,
        }
    }
}

/// Marker annotation attached to list items by the fetch pass.
///
/// The API gives no signal about whether consecutive numbered items share
/// one list, so the fetcher threads a running counter through sibling runs
/// and records the result here; the renderer only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ListMarker {
    /// e.g. `"3."`, or `"2.1."` under a numbered parent.
    Numbered { label: String },
    /// Marker glyph cycled by nesting depth.
    Bulleted { style: BulletStyle },
}

impl ListMarker {
    /// The leading ordinal of a numbered label, used for `start`/`value`
    /// attributes. `"12."` → 12.
    pub fn ordinal(&self) -> Option<usize> {
        match self {
            ListMarker::Numbered { label } => {
                let digits: String = label
                    .rsplit('.')
                    .filter(|s| !s.is_empty())
                    .next()?
                    .chars()
                    .take_while(|c| c.is_ascii_digit())
                    .collect();
                digits.parse().ok()
            }
            ListMarker::Bulleted { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletStyle {
    Disc,
    Circle,
    Square,
}

impl BulletStyle {
    pub fn css_class(&self) -> &'static str {
        match self {
            BulletStyle::Disc => "notion-list-disc",
            BulletStyle::Circle => "notion-list-circle",
            BulletStyle::Square => "notion-list-square",
        }
    }

    /// Next style in the disc → circle → square cycle.
    pub fn next(&self) -> Self {
        match self {
            BulletStyle::Disc => BulletStyle::Circle,
            BulletStyle::Circle | BulletStyle::Square => BulletStyle::Square,
        }
    }
}

/// Low-resolution preview of an image, fetched best-effort alongside the
/// block so the host can paint a blurred placeholder at the right aspect
/// ratio before the real asset loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePlaceholder {
    pub base64: String,
    pub width: u32,
    pub height: u32,
}

/// Open Graph metadata scraped for a bookmark block, best-effort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkPreview {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub favicon: Option<String>,
    pub image: Option<String>,
}

/// File object types — externally hosted vs. Notion-hosted (signed URL).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FileObject {
    #[serde(rename = "external")]
    External { external: ExternalFile },
    #[serde(rename = "file")]
    File { file: NotionFile },
}

impl FileObject {
    pub fn url(&self) -> &str {
        match self {
            FileObject::External { external } => &external.url,
            FileObject::File { file } => &file.url,
        }
    }

    /// Signed Notion-hosted URLs expire; the record map keeps them in a
    /// side table so a refresh can swap them without touching blocks.
    pub fn is_signed(&self) -> bool {
        matches!(self, FileObject::File { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalFile {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotionFile {
    pub url: String,
    pub expiry_time: Option<chrono::DateTime<chrono::Utc>>,
}

/// Icon types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Icon {
    #[serde(rename = "emoji")]
    Emoji { emoji: String },
    #[serde(rename = "external")]
    External { external: ExternalFile },
    #[serde(rename = "file")]
    File { file: NotionFile },
}

/// Presentation hints for a page block.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PageFormat {
    pub icon: Option<Icon>,
    pub cover: Option<FileObject>,
    /// Vertical cover position as a 0..=1 fraction; `None` means centered.
    pub cover_position: Option<f64>,
    pub full_width: bool,
    pub small_text: bool,
}

/// Page block — the root of a rendered document, or a sub-page link when
/// it appears below the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageBlock {
    pub common: BlockCommon,
    pub title: Vec<RichTextItem>,
    pub format: PageFormat,
    pub url: Option<String>,
}

/// Paragraph block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ParagraphBlock {
    pub common: BlockCommon,
    pub content: TextBlockContent,
}

/// Heading block; rank 1–3. Toggleable headings fold their children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading1Block {
    pub common: BlockCommon,
    pub content: TextBlockContent,
    pub toggleable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading2Block {
    pub common: BlockCommon,
    pub content: TextBlockContent,
    pub toggleable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading3Block {
    pub common: BlockCommon,
    pub content: TextBlockContent,
    pub toggleable: bool,
}

/// Bulleted list item block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletedListItemBlock {
    pub common: BlockCommon,
    pub content: TextBlockContent,
    pub marker: Option<ListMarker>,
}

/// Numbered list item block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberedListItemBlock {
    pub common: BlockCommon,
    pub content: TextBlockContent,
    pub marker: Option<ListMarker>,
}

/// To-do block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ToDoBlock {
    pub common: BlockCommon,
    pub content: TextBlockContent,
    pub checked: bool,
}

/// Toggle block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToggleBlock {
    pub common: BlockCommon,
    pub content: TextBlockContent,
}

/// Quote block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteBlock {
    pub common: BlockCommon,
    pub content: TextBlockContent,
}

/// Callout block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalloutBlock {
    pub common: BlockCommon,
    pub icon: Option<Icon>,
    pub content: TextBlockContent,
}

/// Code block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeBlock {
    pub common: BlockCommon,
    pub language: String,
    pub caption: Vec<RichTextItem>,
    pub content: TextBlockContent,
}

/// Equation block (block-level KaTeX source).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquationBlock {
    pub common: BlockCommon,
    pub expression: String,
}

/// Divider block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividerBlock {
    pub common: BlockCommon,
}

/// Table of contents block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableOfContentsBlock {
    pub common: BlockCommon,
    pub color: Color,
}

/// Image block, with the best-effort placeholder annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageBlock {
    pub common: BlockCommon,
    pub source: FileObject,
    pub caption: Vec<RichTextItem>,
    pub placeholder: Option<ImagePlaceholder>,
}

/// Video block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoBlock {
    pub common: BlockCommon,
    pub source: FileObject,
    pub caption: Vec<RichTextItem>,
}

/// File attachment block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileBlock {
    pub common: BlockCommon,
    pub source: FileObject,
    pub caption: Vec<RichTextItem>,
    pub name: Option<String>,
}

/// PDF block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfBlock {
    pub common: BlockCommon,
    pub source: FileObject,
    pub caption: Vec<RichTextItem>,
}

/// Bookmark block, with the best-effort Open Graph annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkBlock {
    pub common: BlockCommon,
    pub url: String,
    pub caption: Vec<RichTextItem>,
    pub preview: Option<BookmarkPreview>,
}

/// Embed block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedBlock {
    pub common: BlockCommon,
    pub url: String,
    pub caption: Vec<RichTextItem>,
}

/// Child page block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildPageBlock {
    pub common: BlockCommon,
    pub title: String,
}

/// Child database block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildDatabaseBlock {
    pub common: BlockCommon,
    pub title: String,
}

/// Alias block — a reference to another block/page dereferenced through
/// the record map at render time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkToPageBlock {
    pub common: BlockCommon,
    pub target: NotionId,
}

/// Per-column presentation hints carried by a table block.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ColumnFormat {
    pub color: Option<Color>,
    pub width: Option<u32>,
}

/// Table block. `column_order` is the projection order for every row;
/// rows without a surviving parent table cannot be projected at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableBlock {
    pub common: BlockCommon,
    pub table_width: usize,
    pub has_column_header: bool,
    pub has_row_header: bool,
    pub column_order: Vec<String>,
    pub column_format: HashMap<String, ColumnFormat>,
}

/// Table row block. Cells are keyed by column name; the parent table's
/// `column_order` decides projection order, never this map's key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRowBlock {
    pub common: BlockCommon,
    pub properties: IndexMap<String, Vec<RichTextItem>>,
}

/// Column list block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnListBlock {
    pub common: BlockCommon,
}

/// Column block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnBlock {
    pub common: BlockCommon,
    /// Width fraction of the row, `None` for an even split.
    pub ratio: Option<f64>,
}

/// Synced block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncedBlock {
    pub common: BlockCommon,
    pub synced_from: Option<BlockId>,
}

/// Link preview block (external object instance).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkPreviewBlock {
    pub common: BlockCommon,
    pub url: String,
}

/// Unsupported block — the forward-compatibility arm for types this
/// renderer doesn't know yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsupportedBlock {
    pub common: BlockCommon,
    pub block_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_marker_ordinal() {
        let m = ListMarker::Numbered {
            label: "12.".to_string(),
        };
        assert_eq!(m.ordinal(), Some(12));

        let nested = ListMarker::Numbered {
            label: "2.3.".to_string(),
        };
        assert_eq!(nested.ordinal(), Some(3));

        let bullet = ListMarker::Bulleted {
            style: BulletStyle::Disc,
        };
        assert_eq!(bullet.ordinal(), None);
    }

    #[test]
    fn bullet_style_cycle_saturates_at_square() {
        assert_eq!(BulletStyle::Disc.next(), BulletStyle::Circle);
        assert_eq!(BulletStyle::Circle.next(), BulletStyle::Square);
        assert_eq!(BulletStyle::Square.next(), BulletStyle::Square);
    }
}
