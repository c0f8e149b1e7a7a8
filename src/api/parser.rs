// src/api/parser.rs
//! Conversion from API wire shapes into the domain model.
//!
//! Parsing follows the forward-compatibility policy of the renderer:
//! a block whose type is unknown becomes `Unsupported`, a rich text run
//! that cannot be understood degrades to its plain-text projection, and
//! only structurally broken envelopes (no id, no type) are dropped.

use super::client::ApiResponse;
use super::responses::{
    WireBlockEnvelope, WireDatabase, WireError, WirePage, WirePaginated, WireRichText,
};
use super::Paginated;
use crate::error::{AppError, NotionErrorCode};
use crate::model::{
    Block, BlockCommon, BookmarkBlock, BulletedListItemBlock, CalloutBlock, ChildDatabaseBlock,
    ChildPageBlock, CodeBlock, ColumnBlock, ColumnListBlock, DatabaseSchema, DividerBlock,
    EmbedBlock, EquationBlock, FileBlock, FileObject, Heading1Block, Heading2Block, Heading3Block,
    Icon, ImageBlock, LinkPreviewBlock, LinkToPageBlock, NumberedListItemBlock, PageBlock,
    PageFormat, PageRecord, ParagraphBlock, PdfBlock, QuoteBlock, SyncedBlock, TableBlock,
    TableOfContentsBlock, TableRowBlock, TextBlockContent, ToDoBlock, ToggleBlock,
    UnsupportedBlock, VideoBlock,
};
use crate::types::{
    Annotations, BlockId, Color, Link, Mention, MentionKind, NotionId, RichTextItem, RichTextKind,
};
use indexmap::IndexMap;
use serde_json::Value;

/// Parses a successful response body, or maps an error status into the
/// typed error vocabulary (carrying the retry-after hint through).
fn parse_api_response<T>(result: ApiResponse<String>) -> Result<T, AppError>
where
    T: serde::de::DeserializeOwned,
{
    if result.status.is_success() {
        serde_json::from_str(&result.data).map_err(|e| {
            log::error!("Failed to parse response from {}: {}", result.url, e);
            AppError::MalformedResponse(format!("{} (from {})", e, result.url))
        })
    } else {
        Err(parse_error_response(&result))
    }
}

/// Builds the typed service error for a non-2xx response.
fn parse_error_response(result: &ApiResponse<String>) -> AppError {
    match serde_json::from_str::<WireError>(&result.data) {
        Ok(body) => AppError::NotionService {
            code: NotionErrorCode::from_api_response(&body.code),
            message: body.message,
            status: result.status,
            retry_after: result.retry_after,
        },
        Err(_) => AppError::NotionService {
            code: NotionErrorCode::from_http_status(result.status.as_u16()),
            message: format!("HTTP {} from {}", result.status, result.url),
            status: result.status,
            retry_after: result.retry_after,
        },
    }
}

/// Parses one page of block children.
pub fn parse_children_response(result: ApiResponse<String>) -> Result<Paginated<Block>, AppError> {
    let wire: WirePaginated = parse_api_response(result)?;
    let mut blocks = Vec::with_capacity(wire.results.len());
    for value in &wire.results {
        match parse_block(value) {
            Ok(block) => blocks.push(block),
            Err(e) => log::warn!("Skipping unparseable block: {}", e),
        }
    }
    Ok(Paginated {
        results: blocks,
        next_cursor: wire.next_cursor,
        has_more: wire.has_more,
    })
}

/// Parses a single block object into the domain enum.
pub fn parse_block(value: &Value) -> Result<Block, AppError> {
    let envelope: WireBlockEnvelope = serde_json::from_value(value.clone())?;
    let id = BlockId::parse(&envelope.id)?;

    let common = BlockCommon {
        id,
        parent: None,
        has_children: envelope.has_children,
        children: Vec::new(),
        archived: envelope.archived,
    };

    let empty = Value::Object(Default::default());
    let payload = value.get(&envelope.block_type).unwrap_or(&empty);

    let block = match envelope.block_type.as_str() {
        "paragraph" => Block::Paragraph(ParagraphBlock {
            common,
            content: text_content(payload),
        }),
        "heading_1" => Block::Heading1(Heading1Block {
            common,
            content: text_content(payload),
            toggleable: bool_field(payload, "is_toggleable"),
        }),
        "heading_2" => Block::Heading2(Heading2Block {
            common,
            content: text_content(payload),
            toggleable: bool_field(payload, "is_toggleable"),
        }),
        "heading_3" => Block::Heading3(Heading3Block {
            common,
            content: text_content(payload),
            toggleable: bool_field(payload, "is_toggleable"),
        }),
        "bulleted_list_item" => Block::BulletedListItem(BulletedListItemBlock {
            common,
            content: text_content(payload),
            marker: None,
        }),
        "numbered_list_item" => Block::NumberedListItem(NumberedListItemBlock {
            common,
            content: text_content(payload),
            marker: None,
        }),
        "to_do" => Block::ToDo(ToDoBlock {
            common,
            content: text_content(payload),
            checked: bool_field(payload, "checked"),
        }),
        "toggle" => Block::Toggle(ToggleBlock {
            common,
            content: text_content(payload),
        }),
        "quote" => Block::Quote(QuoteBlock {
            common,
            content: text_content(payload),
        }),
        "callout" => Block::Callout(CalloutBlock {
            common,
            icon: parse_icon(payload.get("icon")),
            content: text_content(payload),
        }),
        "code" => Block::Code(CodeBlock {
            common,
            language: string_field(payload, "language").unwrap_or_else(|| "plain text".into()),
            caption: rich_text_field(payload, "caption"),
            content: text_content(payload),
        }),
        "equation" => Block::Equation(EquationBlock {
            common,
            expression: string_field(payload, "expression").unwrap_or_default(),
        }),
        "divider" => Block::Divider(DividerBlock { common }),
        "table_of_contents" => Block::TableOfContents(TableOfContentsBlock {
            common,
            color: color_field(payload),
        }),
        "image" => match parse_file_object(payload) {
            Some(source) => Block::Image(ImageBlock {
                common,
                source,
                caption: rich_text_field(payload, "caption"),
                placeholder: None,
            }),
            None => unsupported(common, &envelope.block_type),
        },
        "video" => match parse_file_object(payload) {
            Some(source) => Block::Video(VideoBlock {
                common,
                source,
                caption: rich_text_field(payload, "caption"),
            }),
            None => unsupported(common, &envelope.block_type),
        },
        "file" => match parse_file_object(payload) {
            Some(source) => Block::File(FileBlock {
                common,
                source,
                caption: rich_text_field(payload, "caption"),
                name: string_field(payload, "name"),
            }),
            None => unsupported(common, &envelope.block_type),
        },
        "pdf" => match parse_file_object(payload) {
            Some(source) => Block::Pdf(PdfBlock {
                common,
                source,
                caption: rich_text_field(payload, "caption"),
            }),
            None => unsupported(common, &envelope.block_type),
        },
        "bookmark" => Block::Bookmark(BookmarkBlock {
            common,
            url: string_field(payload, "url").unwrap_or_default(),
            caption: rich_text_field(payload, "caption"),
            preview: None,
        }),
        "embed" => Block::Embed(EmbedBlock {
            common,
            url: string_field(payload, "url").unwrap_or_default(),
            caption: rich_text_field(payload, "caption"),
        }),
        "child_page" => Block::ChildPage(ChildPageBlock {
            common,
            title: string_field(payload, "title").unwrap_or_default(),
        }),
        "child_database" => Block::ChildDatabase(ChildDatabaseBlock {
            common,
            title: string_field(payload, "title").unwrap_or_default(),
        }),
        "link_to_page" => match parse_link_target(payload) {
            Some(target) => Block::LinkToPage(LinkToPageBlock { common, target }),
            None => unsupported(common, &envelope.block_type),
        },
        "table" => {
            let table_width = payload
                .get("table_width")
                .and_then(Value::as_u64)
                .unwrap_or(0) as usize;
            Block::Table(TableBlock {
                common,
                table_width,
                has_column_header: bool_field(payload, "has_column_header"),
                has_row_header: bool_field(payload, "has_row_header"),
                // The wire carries cells positionally; stable synthetic
                // keys give rows and tables a shared column vocabulary.
                column_order: (0..table_width).map(|i| format!("c{}", i)).collect(),
                column_format: Default::default(),
            })
        }
        "table_row" => {
            let mut properties = IndexMap::new();
            if let Some(cells) = payload.get("cells").and_then(Value::as_array) {
                for (i, cell) in cells.iter().enumerate() {
                    properties.insert(format!("c{}", i), parse_rich_text_array(Some(cell)));
                }
            }
            Block::TableRow(TableRowBlock { common, properties })
        }
        "column_list" => Block::ColumnList(ColumnListBlock { common }),
        "column" => Block::Column(ColumnBlock {
            common,
            ratio: payload.get("width_ratio").and_then(Value::as_f64),
        }),
        "synced_block" => {
            let synced_from = payload
                .get("synced_from")
                .and_then(|v| v.get("block_id"))
                .and_then(Value::as_str)
                .and_then(|s| BlockId::parse(s).ok());
            Block::Synced(SyncedBlock {
                common,
                synced_from,
            })
        }
        "link_preview" => Block::LinkPreview(LinkPreviewBlock {
            common,
            url: string_field(payload, "url").unwrap_or_default(),
        }),
        other => {
            log::debug!("Unknown block type '{}', keeping as unsupported", other);
            unsupported(common, other)
        }
    };

    Ok(block)
}

fn unsupported(common: BlockCommon, block_type: &str) -> Block {
    Block::Unsupported(UnsupportedBlock {
        common,
        block_type: block_type.to_string(),
    })
}

fn bool_field(payload: &Value, key: &str) -> bool {
    payload.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn string_field(payload: &Value, key: &str) -> Option<String> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .map(|s| s.to_string())
}

fn color_field(payload: &Value) -> Color {
    payload
        .get("color")
        .and_then(Value::as_str)
        .map(Color::parse_lenient)
        .unwrap_or_default()
}

fn text_content(payload: &Value) -> TextBlockContent {
    TextBlockContent {
        rich_text: rich_text_field(payload, "rich_text"),
        color: color_field(payload),
    }
}

fn rich_text_field(payload: &Value, key: &str) -> Vec<RichTextItem> {
    parse_rich_text_array(payload.get(key))
}

/// Parses a rich text array; runs that cannot be understood degrade to
/// their plain-text projection instead of being dropped.
pub fn parse_rich_text_array(value: Option<&Value>) -> Vec<RichTextItem> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    items.iter().filter_map(parse_rich_text_item).collect()
}

fn parse_rich_text_item(value: &Value) -> Option<RichTextItem> {
    let wire: WireRichText = match serde_json::from_value(value.clone()) {
        Ok(wire) => wire,
        Err(e) => {
            log::debug!("Unparseable rich text run: {}", e);
            return None;
        }
    };

    let annotations = Annotations {
        bold: wire.annotations.bold,
        italic: wire.annotations.italic,
        strikethrough: wire.annotations.strikethrough,
        underline: wire.annotations.underline,
        code: wire.annotations.code,
        color: wire
            .annotations
            .color
            .as_deref()
            .map(Color::parse_lenient)
            .unwrap_or_default(),
    };

    let kind = match wire.kind.as_str() {
        "text" => {
            let payload = wire.text.as_ref();
            RichTextKind::Text {
                content: payload
                    .map(|t| t.content.clone())
                    .unwrap_or_else(|| wire.plain_text.clone()),
                link: payload
                    .and_then(|t| t.link.as_ref())
                    .map(|l| Link { url: l.url.clone() }),
            }
        }
        "mention" => match wire.mention.as_ref().and_then(parse_mention) {
            Some(mention) => RichTextKind::Mention(mention),
            // A mention shape we don't understand still has readable text.
            None => RichTextKind::Text {
                content: wire.plain_text.clone(),
                link: None,
            },
        },
        "equation" => RichTextKind::Equation {
            expression: wire
                .equation
                .as_ref()
                .map(|e| e.expression.clone())
                .unwrap_or_else(|| wire.plain_text.clone()),
        },
        other => {
            log::debug!("Unknown rich text type '{}', degrading to text", other);
            RichTextKind::Text {
                content: wire.plain_text.clone(),
                link: None,
            }
        }
    };

    Some(RichTextItem {
        kind,
        annotations,
        plain_text: wire.plain_text,
        href: wire.href,
    })
}

fn parse_mention(value: &Value) -> Option<Mention> {
    let kind = match value.get("type").and_then(Value::as_str)? {
        "page" => MentionKind::Page {
            id: NotionId::parse(value.get("page")?.get("id")?.as_str()?).ok()?,
            uri: None,
        },
        "database" => MentionKind::Database {
            id: NotionId::parse(value.get("database")?.get("id")?.as_str()?).ok()?,
        },
        "user" => {
            let user = value.get("user")?;
            MentionKind::User {
                id: user.get("id")?.as_str()?.to_string(),
                name: user
                    .get("name")
                    .and_then(Value::as_str)
                    .map(|s| s.to_string()),
            }
        }
        "date" => {
            let date = value.get("date")?;
            MentionKind::Date {
                start: date.get("start")?.as_str()?.to_string(),
                end: date
                    .get("end")
                    .and_then(Value::as_str)
                    .map(|s| s.to_string()),
            }
        }
        "link_preview" => MentionKind::LinkPreview {
            url: value.get("link_preview")?.get("url")?.as_str()?.to_string(),
        },
        _ => return None,
    };
    Some(Mention { kind })
}

fn parse_file_object(payload: &Value) -> Option<FileObject> {
    serde_json::from_value(payload.clone()).ok()
}

fn parse_icon(value: Option<&Value>) -> Option<Icon> {
    serde_json::from_value(value?.clone()).ok()
}

fn parse_link_target(payload: &Value) -> Option<NotionId> {
    let target = payload
        .get("page_id")
        .or_else(|| payload.get("database_id"))?
        .as_str()?;
    NotionId::parse(target).ok()
}

/// Parses a page object into the root page block (children unattached).
pub fn parse_page_response(result: ApiResponse<String>) -> Result<PageBlock, AppError> {
    let wire: WirePage = parse_api_response(result)?;
    let id = BlockId::parse(&wire.id)?;

    // The title lives in whichever property has type "title".
    let title = wire
        .properties
        .values()
        .find(|p| p.get("type").and_then(Value::as_str) == Some("title"))
        .map(|p| parse_rich_text_array(p.get("title")))
        .unwrap_or_default();

    Ok(PageBlock {
        common: BlockCommon {
            id,
            parent: None,
            has_children: true,
            children: Vec::new(),
            archived: wire.archived,
        },
        title,
        format: PageFormat {
            icon: parse_icon(wire.icon.as_ref()),
            cover: wire
                .cover
                .as_ref()
                .and_then(|c| serde_json::from_value(c.clone()).ok()),
            cover_position: None,
            full_width: false,
            small_text: false,
        },
        url: wire.url,
    })
}

/// Parses a database object into its schema summary.
pub fn parse_schema_response(result: ApiResponse<String>) -> Result<DatabaseSchema, AppError> {
    let wire: WireDatabase = parse_api_response(result)?;

    let title = wire
        .title
        .iter()
        .map(|t| t.plain_text.as_str())
        .collect::<String>();

    let properties = wire
        .properties
        .iter()
        .map(|(name, prop)| {
            let prop_type = prop
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string();
            (name.clone(), prop_type)
        })
        .collect();

    Ok(DatabaseSchema { title, properties })
}

/// Parses one page of database query results.
pub fn parse_rows_response(result: ApiResponse<String>) -> Result<Paginated<PageRecord>, AppError> {
    let wire: WirePaginated = parse_api_response(result)?;
    let mut rows = Vec::with_capacity(wire.results.len());

    for value in &wire.results {
        let page: WirePage = match serde_json::from_value(value.clone()) {
            Ok(page) => page,
            Err(e) => {
                log::warn!("Skipping unparseable row: {}", e);
                continue;
            }
        };
        let Ok(id) = crate::types::PageId::parse(&page.id) else {
            log::warn!("Skipping row with invalid id: {}", page.id);
            continue;
        };
        rows.push(PageRecord {
            id,
            created_time: page.created_time,
            last_edited_time: page.last_edited_time,
            archived: page.archived,
            url: page.url,
            properties: page.properties.into_iter().collect(),
        });
    }

    Ok(Paginated {
        results: rows,
        next_cursor: wire.next_cursor,
        has_more: wire.has_more,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ok_response(body: Value) -> ApiResponse<String> {
        ApiResponse {
            data: body.to_string(),
            status: reqwest::StatusCode::OK,
            url: "http://test/endpoint".to_string(),
            retry_after: None,
        }
    }

    #[test]
    fn parses_a_paragraph_block() {
        let value = json!({
            "object": "block",
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "type": "paragraph",
            "has_children": false,
            "paragraph": {
                "rich_text": [{
                    "type": "text",
                    "text": { "content": "Hello", "link": null },
                    "annotations": { "bold": true, "color": "blue" },
                    "plain_text": "Hello"
                }],
                "color": "default"
            }
        });

        let block = parse_block(&value).unwrap();
        let Block::Paragraph(p) = block else {
            panic!("expected paragraph");
        };
        assert_eq!(p.content.rich_text.len(), 1);
        assert!(p.content.rich_text[0].annotations.bold);
        assert_eq!(p.content.rich_text[0].annotations.color, Color::Blue);
    }

    #[test]
    fn unknown_block_type_becomes_unsupported() {
        let value = json!({
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "type": "ai_block",
            "ai_block": {}
        });
        let block = parse_block(&value).unwrap();
        assert_eq!(block.block_type(), "ai_block");
        assert!(matches!(block, Block::Unsupported(_)));
    }

    #[test]
    fn table_rows_get_stable_column_keys() {
        let table = json!({
            "id": "550e8400-e29b-41d4-a716-446655440001",
            "type": "table",
            "has_children": true,
            "table": { "table_width": 3, "has_column_header": true, "has_row_header": false }
        });
        let Block::Table(t) = parse_block(&table).unwrap() else {
            panic!("expected table");
        };
        assert_eq!(t.column_order, vec!["c0", "c1", "c2"]);

        let row = json!({
            "id": "550e8400-e29b-41d4-a716-446655440002",
            "type": "table_row",
            "table_row": { "cells": [
                [{ "type": "text", "text": {"content": "a"}, "plain_text": "a" }],
                [],
                [{ "type": "text", "text": {"content": "c"}, "plain_text": "c" }]
            ]}
        });
        let Block::TableRow(r) = parse_block(&row).unwrap() else {
            panic!("expected table row");
        };
        assert_eq!(
            r.properties.keys().collect::<Vec<_>>(),
            vec!["c0", "c1", "c2"]
        );
    }

    #[test]
    fn mention_run_keeps_target_id() {
        let items = parse_rich_text_array(Some(&json!([{
            "type": "mention",
            "mention": { "type": "page", "page": { "id": "550e8400-e29b-41d4-a716-446655440000" } },
            "plain_text": "Linked page"
        }])));
        assert_eq!(items.len(), 1);
        match &items[0].kind {
            RichTextKind::Mention(Mention {
                kind: MentionKind::Page { id, uri },
            }) => {
                assert_eq!(id.as_str(), "550e8400e29b41d4a716446655440000");
                assert!(uri.is_none());
            }
            other => panic!("unexpected kind: {:?}", other),
        }
    }

    #[test]
    fn error_response_carries_retry_hint() {
        let result = ApiResponse {
            data: json!({ "code": "rate_limited", "message": "slow down" }).to_string(),
            status: reqwest::StatusCode::TOO_MANY_REQUESTS,
            url: "http://test".to_string(),
            retry_after: Some(std::time::Duration::from_secs(2)),
        };
        let err = parse_children_response(result).unwrap_err();
        assert_eq!(err.retry_after(), Some(std::time::Duration::from_secs(2)));
        assert!(err.is_retryable());
    }

    #[test]
    fn parses_a_page_into_a_root_block() {
        let body = json!({
            "object": "page",
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "url": "https://www.notion.so/Test-550e8400e29b41d4a716446655440000",
            "icon": { "type": "emoji", "emoji": "🚀" },
            "properties": {
                "Name": {
                    "type": "title",
                    "title": [{ "type": "text", "text": {"content": "Test"}, "plain_text": "Test" }]
                }
            }
        });
        let page = parse_page_response(ok_response(body)).unwrap();
        assert_eq!(crate::types::join_plain_text(&page.title), "Test");
        assert!(matches!(page.format.icon, Some(Icon::Emoji { .. })));
    }
}
