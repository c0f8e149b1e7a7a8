// src/render/block_renderer.rs
//! The recursive block renderer.
//!
//! Rendering is a post-order walk: a block's children are rendered
//! first, then `render_block` composes the block's own markup around
//! them. `render_block` itself is a pure function of the block, its
//! level, and the pre-rendered children — every cross-block fact it
//! needs (parent types, table column order, page headings, alias
//! targets) comes from the read-only record map in the context.
//!
//! Failure policy: content-shape problems never escape this module.
//! Unknown block types render as an empty placeholder, dangling
//! references render as nothing, and both leave a diagnostic in the log.

use super::cache::RenderCache;
use super::markup::{block_id_class, cs, escape_attr, escape_text, tag, void_tag};
use super::overrides::{BlockOverrides, NoOverrides};
use super::rich_text::render_rich_text;
use super::toc::{heading_anchor, page_table_of_contents};
use crate::config::RenderOptions;
use crate::constants::{CHARS_PER_BLOCK_ESTIMATE, TOC_INDENT_STEP_PX};
use crate::model::{
    Block, BookmarkBlock, BulletStyle, CalloutBlock, Icon, ListMarker, PageBlock, RecordMap,
    TableRowBlock,
};
use crate::types::join_plain_text;
use std::fmt::Write;

/// Everything the render pass reads: the record map, presentation
/// options, the session cache, and the host's override table.
pub struct RenderContext<'a> {
    pub map: &'a RecordMap,
    pub options: &'a RenderOptions,
    pub cache: &'a RenderCache,
    pub overrides: &'a dyn BlockOverrides,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        map: &'a RecordMap,
        options: &'a RenderOptions,
        cache: &'a RenderCache,
        overrides: &'a dyn BlockOverrides,
    ) -> Self {
        Self {
            map,
            options,
            cache,
            overrides,
        }
    }
}

/// Renders a fetched page graph to HTML with default overrides.
pub fn render_page(map: &RecordMap, options: &RenderOptions) -> String {
    render_page_with_overrides(map, options, &NoOverrides)
}

/// Renders a fetched page graph to HTML.
///
/// The cache is created here and dies here: its lifetime is exactly one
/// render session.
pub fn render_page_with_overrides(
    map: &RecordMap,
    options: &RenderOptions,
    overrides: &dyn BlockOverrides,
) -> String {
    let cache = RenderCache::new();
    let ctx = RenderContext::new(map, options, &cache, overrides);
    render_tree(&ctx)
}

/// Renders from the record map's root.
pub fn render_tree(ctx: &RenderContext) -> String {
    match ctx.map.root_block() {
        Some(root) => render_subtree(ctx, root, 0),
        None => {
            log::warn!("Record map has no root block, rendering nothing");
            String::new()
        }
    }
}

/// Post-order render of one block: children first, then the block.
pub fn render_subtree(ctx: &RenderContext, block: &Block, level: usize) -> String {
    let children = render_children(ctx, block, level + 1);
    render_block(ctx, block, level, &children)
}

/// Renders a block's children in document order. Missing child records
/// are gaps, not failures.
fn render_children(ctx: &RenderContext, block: &Block, level: usize) -> String {
    let ids = block.children();
    if ids.is_empty() {
        return String::new();
    }
    let mut out = String::with_capacity(ids.len() * CHARS_PER_BLOCK_ESTIMATE);
    for id in ids {
        match ctx.map.block(id) {
            Some(child) => out.push_str(&render_subtree(ctx, child, level)),
            None => log::debug!("Child block {} missing from record map", id),
        }
    }
    out
}

/// Renders one block given its already-rendered children.
pub fn render_block(ctx: &RenderContext, block: &Block, level: usize, children: &str) -> String {
    let id_class = block_id_class(block.id());

    match block {
        Block::Page(page) => render_page_block(ctx, page, level, children, &id_class),

        Block::Paragraph(b) => {
            if b.content.rich_text.is_empty() && children.is_empty() {
                return tag("div", &cs(&[Some("notion-blank"), Some(id_class.as_str())]), &[], "&nbsp;");
            }
            let mut inner = render_rich_text(&b.content.rich_text);
            if !children.is_empty() {
                inner.push_str(&tag("div", "notion-text-children", &[], children));
            }
            tag(
                "div",
                &cs(&[
                    Some("notion-text"),
                    b.content.color.css_class().as_deref(),
                    Some(id_class.as_str()),
                ]),
                &[],
                &inner,
            )
        }

        Block::Heading1(b) => render_heading(ctx, block, 1, &b.content, b.toggleable, children),
        Block::Heading2(b) => render_heading(ctx, block, 2, &b.content, b.toggleable, children),
        Block::Heading3(b) => render_heading(ctx, block, 3, &b.content, b.toggleable, children),

        Block::BulletedListItem(b) => render_list_item(
            ctx,
            block,
            &render_rich_text(&b.content.rich_text),
            b.marker.as_ref(),
            children,
            &id_class,
        ),
        Block::NumberedListItem(b) => render_list_item(
            ctx,
            block,
            &render_rich_text(&b.content.rich_text),
            b.marker.as_ref(),
            children,
            &id_class,
        ),

        Block::ToDo(b) => {
            let checkbox = if b.checked {
                "<span class=\"notion-checkbox notion-checkbox-checked\"></span>"
            } else {
                "<span class=\"notion-checkbox\"></span>"
            };
            let mut inner = format!(
                "{}{}",
                checkbox,
                tag(
                    "span",
                    if b.checked { "notion-to-do-checked" } else { "" },
                    &[],
                    &render_rich_text(&b.content.rich_text)
                )
            );
            if !children.is_empty() {
                inner.push_str(&tag("div", "notion-to-do-children", &[], children));
            }
            tag(
                "div",
                &cs(&[Some("notion-to-do"), Some(id_class.as_str())]),
                &[],
                &inner,
            )
        }

        Block::Toggle(b) => {
            let summary = tag("summary", "", &[], &render_rich_text(&b.content.rich_text));
            let body = tag("div", "", &[], children);
            tag(
                "details",
                &cs(&[
                    Some("notion-toggle"),
                    b.content.color.css_class().as_deref(),
                    Some(id_class.as_str()),
                ]),
                &[],
                &format!("{}{}", summary, body),
            )
        }

        Block::Quote(b) => {
            let mut inner = tag("div", "", &[], &render_rich_text(&b.content.rich_text));
            inner.push_str(children);
            tag(
                "blockquote",
                &cs(&[
                    Some("notion-quote"),
                    b.content.color.css_class().as_deref(),
                    Some(id_class.as_str()),
                ]),
                &[],
                &inner,
            )
        }

        Block::Callout(b) => {
            if let Some(html) = ctx.overrides.callout(b, children, ctx) {
                return html;
            }
            render_callout(b, children, &id_class)
        }

        Block::Code(b) => {
            if let Some(html) = ctx.overrides.code(b, ctx) {
                return html;
            }
            let source: String = b
                .content
                .rich_text
                .iter()
                .map(|r| r.plain_text.as_str())
                .collect();
            let language_class = format!("language-{}", b.language.replace(' ', "-"));
            let code = tag("code", &language_class, &[], &escape_text(&source));
            let mut out = tag(
                "pre",
                &cs(&[Some("notion-code"), Some(language_class.as_str()), Some(id_class.as_str())]),
                &[],
                &code,
            );
            if !b.caption.is_empty() {
                out.push_str(&tag(
                    "figcaption",
                    "notion-asset-caption",
                    &[],
                    &render_rich_text(&b.caption),
                ));
            }
            out
        }

        Block::Equation(b) => {
            if let Some(html) = ctx.overrides.equation(b, ctx) {
                return html;
            }
            tag(
                "div",
                &cs(&[
                    Some("notion-equation notion-equation-block"),
                    Some(id_class.as_str()),
                ]),
                &[],
                &escape_text(&b.expression),
            )
        }

        Block::Divider(_) => void_tag("hr", &cs(&[Some("notion-hr"), Some(id_class.as_str())]), &[]),

        Block::TableOfContents(b) => render_toc_block(ctx, block, b.color.css_class(), &id_class),

        Block::Image(b) => {
            let url = ctx
                .map
                .signed_url(block.id())
                .unwrap_or_else(|| b.source.url());
            if url.is_empty() {
                log::debug!("Image block {} has no source URL", block.id());
                return String::new();
            }
            let alt = join_plain_text(&b.caption);
            let mut attrs: Vec<(&str, String)> = vec![
                ("src", url.to_string()),
                ("alt", alt.clone()),
                ("loading", "lazy".to_string()),
            ];
            if let Some(placeholder) = &b.placeholder {
                attrs.push(("width", placeholder.width.to_string()));
                attrs.push(("height", placeholder.height.to_string()));
                attrs.push(("data-placeholder", placeholder.base64.clone()));
            }
            let attr_refs: Vec<(&str, &str)> =
                attrs.iter().map(|(k, v)| (*k, v.as_str())).collect();
            let img = void_tag("img", "notion-image", &attr_refs);
            let mut inner = img;
            if !b.caption.is_empty() {
                inner.push_str(&tag(
                    "figcaption",
                    "notion-asset-caption",
                    &[],
                    &render_rich_text(&b.caption),
                ));
            }
            tag(
                "figure",
                &cs(&[
                    Some("notion-asset-wrapper notion-asset-wrapper-image"),
                    Some(id_class.as_str()),
                ]),
                &[],
                &inner,
            )
        }

        Block::Video(b) => {
            let url = ctx
                .map
                .signed_url(block.id())
                .unwrap_or_else(|| b.source.url());
            let video = format!(
                "<video class=\"notion-video\" controls src=\"{}\"></video>",
                escape_attr(url)
            );
            let mut inner = video;
            if !b.caption.is_empty() {
                inner.push_str(&tag(
                    "figcaption",
                    "notion-asset-caption",
                    &[],
                    &render_rich_text(&b.caption),
                ));
            }
            tag(
                "figure",
                &cs(&[
                    Some("notion-asset-wrapper notion-asset-wrapper-video"),
                    Some(id_class.as_str()),
                ]),
                &[],
                &inner,
            )
        }

        Block::File(b) => {
            let url = ctx
                .map
                .signed_url(block.id())
                .unwrap_or_else(|| b.source.url());
            let label = b
                .name
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| join_plain_text(&b.caption))
                .trim()
                .to_string();
            let label = if label.is_empty() { url.to_string() } else { label };
            tag(
                "div",
                &cs(&[Some("notion-file"), Some(id_class.as_str())]),
                &[],
                &format!(
                    "<a class=\"notion-file-link\" href=\"{}\">{}</a>",
                    escape_attr(url),
                    escape_text(&label)
                ),
            )
        }

        Block::Pdf(b) => {
            let url = ctx
                .map
                .signed_url(block.id())
                .unwrap_or_else(|| b.source.url());
            tag(
                "figure",
                &cs(&[
                    Some("notion-asset-wrapper notion-asset-wrapper-pdf"),
                    Some(id_class.as_str()),
                ]),
                &[],
                &format!(
                    "<object class=\"notion-pdf\" data=\"{}\" type=\"application/pdf\"></object>",
                    escape_attr(url)
                ),
            )
        }

        Block::Bookmark(b) => render_bookmark(b, &id_class),

        Block::Embed(b) => {
            if let Some(html) = ctx.overrides.embed(b, ctx) {
                return html;
            }
            if b.url.is_empty() {
                log::debug!("Embed block {} has no URL", block.id());
                return String::new();
            }
            let iframe = format!(
                "<iframe class=\"notion-embed\" src=\"{}\" loading=\"lazy\" allowfullscreen></iframe>",
                escape_attr(&b.url)
            );
            let mut inner = iframe;
            if !b.caption.is_empty() {
                inner.push_str(&tag(
                    "figcaption",
                    "notion-asset-caption",
                    &[],
                    &render_rich_text(&b.caption),
                ));
            }
            tag(
                "figure",
                &cs(&[Some("notion-asset-wrapper"), Some(id_class.as_str())]),
                &[],
                &inner,
            )
        }

        Block::ChildPage(b) => {
            let title = tag("span", "notion-page-title", &[], &escape_text(&b.title));
            format!(
                "<a class=\"{}\" href=\"{}\">{}</a>",
                cs(&[Some("notion-page-link"), Some(id_class.as_str())]),
                escape_attr(&ctx.options.page_url(block.id().as_str())),
                title
            )
        }

        Block::ChildDatabase(b) => {
            let db_id: crate::types::DatabaseId = crate::types::NotionId::from(block.id()).into();
            let title = ctx
                .map
                .schema(&db_id)
                .map(|s| s.title.clone())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| b.title.clone());
            tag(
                "div",
                &cs(&[Some("notion-child-database"), Some(id_class.as_str())]),
                &[],
                &tag("span", "notion-page-title", &[], &escape_text(&title)),
            )
        }

        Block::LinkToPage(b) => {
            // alias: dereference through the record map, degrade to
            // nothing when the target never made it into the map
            let target_id: crate::types::BlockId = b.target.clone().into();
            let Some(target) = ctx.map.block(&target_id) else {
                log::debug!("Alias {} points at missing block {}", block.id(), b.target);
                return String::new();
            };
            let title = target
                .rich_text()
                .map(join_plain_text)
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Untitled".to_string());
            format!(
                "<a class=\"{}\" href=\"{}\">{}</a>",
                cs(&[Some("notion-page-link"), Some(id_class.as_str())]),
                escape_attr(&ctx.options.page_url(b.target.as_str())),
                tag("span", "notion-page-title", &[], &escape_text(&title))
            )
        }

        Block::Table(b) => {
            let tbody_class = cs(&[
                b.has_column_header.then_some("notion-table-has-column-header"),
                b.has_row_header.then_some("notion-table-has-row-header"),
            ]);
            let tbody = tag("tbody", &tbody_class, &[], children);
            let table = tag(
                "table",
                &cs(&[Some("notion-simple-table"), Some(id_class.as_str())]),
                &[],
                &tbody,
            );
            tag("div", "notion-table-wrapper", &[], &table)
        }

        Block::TableRow(b) => render_table_row(ctx, block, b, &id_class),

        Block::ColumnList(_) => tag(
            "div",
            &cs(&[Some("notion-row"), Some(id_class.as_str())]),
            &[],
            children,
        ),

        Block::Column(b) => render_column(ctx, block, b.ratio, children, &id_class),

        Block::Synced(_) => tag(
            "div",
            &cs(&[Some("notion-sync-block"), Some(id_class.as_str())]),
            &[],
            children,
        ),

        Block::LinkPreview(b) => {
            if b.url.is_empty() {
                return String::new();
            }
            format!(
                "<a class=\"{}\" href=\"{}\">{}</a>",
                cs(&[Some("notion-link-preview"), Some(id_class.as_str())]),
                escape_attr(&b.url),
                escape_text(&b.url)
            )
        }

        Block::Unsupported(b) => {
            log::debug!(
                "Unsupported block type '{}' ({}), rendering placeholder",
                b.block_type,
                block.id()
            );
            "<div></div>".to_string()
        }
    }
}

// --- Variant helpers ---

fn render_heading(
    ctx: &RenderContext,
    block: &Block,
    rank: u8,
    content: &crate::model::TextBlockContent,
    toggleable: bool,
    children: &str,
) -> String {
    let id_class = block_id_class(block.id());
    let text = join_plain_text(&content.rich_text);
    let anchor = heading_anchor(block.id(), &text);

    // The indent lookup walks the containing page's headings, so it is
    // memoized per block for the session.
    let indent = ctx.cache.toc_indent_or_compute(block.id(), || {
        let page = ctx.map.containing_page(block.id())?;
        page_table_of_contents(ctx.map, page.id())
            .into_iter()
            .find(|e| &e.id == block.id())
            .map(|e| e.indent_level)
    });
    let indent_class = indent.map(|level| format!("notion-h-indent-{}", level));

    let heading_class = cs(&[
        Some("notion-h"),
        Some(match rank {
            1 => "notion-h1",
            2 => "notion-h2",
            _ => "notion-h3",
        }),
        content.color.css_class().as_deref(),
        indent_class.as_deref(),
        Some(id_class.as_str()),
    ]);

    let mut inner = tag(
        "span",
        "notion-h-title",
        &[],
        &render_rich_text(&content.rich_text),
    );
    if !toggleable {
        let _ = write!(
            inner,
            "<a class=\"notion-hash-link\" href=\"#{}\" title=\"{}\">#</a>",
            escape_attr(&anchor),
            escape_attr(&text)
        );
    }

    let element = format!("h{}", rank.min(3));
    let heading = tag(
        &element,
        &heading_class,
        &[("id", anchor.as_str()), ("data-id", block.id().as_str())],
        &inner,
    );

    if toggleable {
        let summary = tag("summary", "", &[], &heading);
        tag(
            "details",
            "notion-toggle notion-toggle-heading",
            &[],
            &format!("{}{}", summary, tag("div", "", &[], children)),
        )
    } else if children.is_empty() {
        heading
    } else {
        format!("{}{}", heading, children)
    }
}

/// List items wrap themselves in a list container when they start a run
/// — that is, when their parent in the record map is not the same list
/// type. Nested continuation items stay bare; the wrapper comes from
/// their parent item.
fn render_list_item(
    ctx: &RenderContext,
    block: &Block,
    text: &str,
    marker: Option<&ListMarker>,
    children: &str,
    id_class: &str,
) -> String {
    let ordinal = marker.and_then(|m| m.ordinal());
    let value_attr = ordinal.map(|n| n.to_string());
    let mut li_attrs: Vec<(&str, &str)> = Vec::new();
    if let Some(value) = value_attr.as_deref() {
        li_attrs.push(("value", value));
    }
    let li = tag("li", "", &li_attrs, text);

    // Children (nested items) get their own container of this type.
    let output = if children.is_empty() {
        li
    } else {
        format!("{}{}", li, wrap_list(block, marker, None, children, ""))
    };

    let is_top_of_run = ctx
        .map
        .parent_of(block.id())
        .map(|parent| parent.block_type() != block.block_type())
        .unwrap_or(true);

    if is_top_of_run {
        wrap_list(block, marker, ordinal, &output, id_class)
    } else {
        output
    }
}

fn wrap_list(
    block: &Block,
    marker: Option<&ListMarker>,
    start: Option<usize>,
    inner: &str,
    id_class: &str,
) -> String {
    match block {
        Block::NumberedListItem(_) => {
            let start_attr = start.map(|n| n.to_string());
            let mut attrs: Vec<(&str, &str)> = Vec::new();
            if let Some(start) = start_attr.as_deref() {
                attrs.push(("start", start));
            }
            tag(
                "ol",
                &cs(&[
                    Some("notion-list notion-list-numbered"),
                    (!id_class.is_empty()).then_some(id_class),
                ]),
                &attrs,
                inner,
            )
        }
        _ => {
            let style_class = match marker {
                Some(ListMarker::Bulleted { style }) => style.css_class(),
                _ => BulletStyle::Disc.css_class(),
            };
            tag(
                "ul",
                &cs(&[
                    Some("notion-list"),
                    Some(style_class),
                    (!id_class.is_empty()).then_some(id_class),
                ]),
                &[],
                inner,
            )
        }
    }
}

fn render_callout(b: &CalloutBlock, children: &str, id_class: &str) -> String {
    let color_class = b
        .content
        .color
        .css_class()
        .map(|c| format!("{}-co", c));
    let mut inner = render_icon(b.icon.as_ref());
    let mut text = render_rich_text(&b.content.rich_text);
    text.push_str(children);
    inner.push_str(&tag("div", "notion-callout-text", &[], &text));
    tag(
        "div",
        &cs(&[
            Some("notion-callout"),
            color_class.as_deref(),
            Some(id_class),
        ]),
        &[],
        &inner,
    )
}

fn render_icon(icon: Option<&Icon>) -> String {
    match icon {
        Some(Icon::Emoji { emoji }) => {
            tag("span", "notion-page-icon", &[], &escape_text(emoji))
        }
        Some(Icon::External { external }) => void_tag(
            "img",
            "notion-page-icon",
            &[("src", external.url.as_str()), ("alt", "icon")],
        ),
        Some(Icon::File { file }) => void_tag(
            "img",
            "notion-page-icon",
            &[("src", file.url.as_str()), ("alt", "icon")],
        ),
        None => String::new(),
    }
}

fn render_bookmark(b: &BookmarkBlock, id_class: &str) -> String {
    if b.url.is_empty() {
        log::debug!("Bookmark without a URL, rendering nothing");
        return String::new();
    }

    let title = b
        .preview
        .as_ref()
        .and_then(|p| p.title.clone())
        .or_else(|| {
            let caption = join_plain_text(&b.caption);
            (!caption.is_empty()).then_some(caption)
        })
        .unwrap_or_else(|| host_of(&b.url));

    let mut body = tag("div", "notion-bookmark-title", &[], &escape_text(&title));

    if let Some(description) = b.preview.as_ref().and_then(|p| p.description.as_deref()) {
        body.push_str(&tag(
            "div",
            "notion-bookmark-description",
            &[],
            &escape_text(description),
        ));
    }

    let mut link_line = String::new();
    if let Some(favicon) = b.preview.as_ref().and_then(|p| p.favicon.as_deref()) {
        link_line.push_str(&void_tag(
            "img",
            "notion-bookmark-link-icon",
            &[("src", favicon), ("alt", "")],
        ));
    }
    link_line.push_str(&tag(
        "div",
        "notion-bookmark-link-text",
        &[],
        &escape_text(&b.url),
    ));
    body.push_str(&tag("div", "notion-bookmark-link", &[], &link_line));

    let mut card = tag("div", "", &[], &body);
    if let Some(image) = b.preview.as_ref().and_then(|p| p.image.as_deref()) {
        card.push_str(&tag(
            "div",
            "notion-bookmark-image",
            &[],
            &void_tag("img", "", &[("src", image), ("alt", "")]),
        ));
    }

    let anchor = format!(
        "<a class=\"{}\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
        cs(&[Some("notion-bookmark"), Some(id_class)]),
        escape_attr(&b.url),
        card
    );
    tag("div", "notion-row", &[], &anchor)
}

fn host_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .unwrap_or_else(|| url.to_string())
}

/// Table rows project their cells in the parent table's column order.
/// A row whose parent is missing (or is not a table) cannot be
/// projected and renders as nothing.
fn render_table_row(
    ctx: &RenderContext,
    block: &Block,
    row: &TableRowBlock,
    id_class: &str,
) -> String {
    let Some(parent) = ctx.map.parent_of(block.id()) else {
        log::debug!("Table row {} has no parent in the record map", block.id());
        return String::new();
    };
    let Block::Table(table) = parent else {
        log::debug!("Table row {} parent is not a table", block.id());
        return String::new();
    };
    if table.column_order.is_empty() {
        log::debug!("Table {} has no column order", parent.id());
        return String::new();
    }

    let mut cells = String::new();
    for column in &table.column_order {
        let color_class = table
            .column_format
            .get(column)
            .and_then(|f| f.color)
            .and_then(|c| c.css_class());
        let content = row
            .properties
            .get(column)
            .filter(|runs| !runs.is_empty())
            .map(|runs| render_rich_text(runs))
            .unwrap_or_else(|| "&nbsp;".to_string());
        cells.push_str(&tag(
            "td",
            &cs(&[color_class.as_deref()]),
            &[],
            &tag("div", "notion-simple-table-cell", &[], &content),
        ));
    }

    tag(
        "tr",
        &cs(&[Some("notion-simple-table-row"), Some(id_class)]),
        &[],
        &cells,
    )
}

fn render_toc_block(
    ctx: &RenderContext,
    block: &Block,
    color_class: Option<String>,
    id_class: &str,
) -> String {
    let Some(page) = ctx.map.containing_page(block.id()) else {
        log::debug!("TOC block {} is outside any known page", block.id());
        return String::new();
    };

    let entries = page_table_of_contents(ctx.map, page.id());
    let mut items = String::new();
    for entry in &entries {
        let anchor = heading_anchor(&entry.id, &entry.text);
        let margin = format!("margin-left:{}px", entry.indent_level * TOC_INDENT_STEP_PX);
        let body = format!(
            "<span class=\"notion-table-of-contents-item-body\" style=\"{}\">{}</span>",
            margin,
            escape_text(&entry.text)
        );
        let _ = write!(
            items,
            "<a class=\"notion-table-of-contents-item\" href=\"#{}\">{}</a>",
            escape_attr(&anchor),
            body
        );
    }

    tag(
        "div",
        &cs(&[
            Some("notion-table-of-contents"),
            color_class.as_deref(),
            Some(id_class),
        ]),
        &[],
        &items,
    )
}

fn render_column(
    ctx: &RenderContext,
    block: &Block,
    ratio: Option<f64>,
    children: &str,
    id_class: &str,
) -> String {
    let ratio = ratio.unwrap_or(0.5);
    let columns = ctx
        .map
        .parent_of(block.id())
        .map(|p| p.common().children.len())
        .filter(|n| *n > 0)
        .unwrap_or_else(|| (1.0 / ratio).ceil().max(2.0) as usize);

    let spacer_width = "min(32px, 4vw)";
    let width = format!(
        "calc((100% - ({} * {})) * {})",
        columns.saturating_sub(1),
        spacer_width,
        ratio
    );

    let column = format!(
        "<div class=\"{}\" style=\"width:{}\">{}</div>",
        cs(&[Some("notion-column"), Some(id_class)]),
        width,
        children
    );
    format!("{}<div class=\"notion-spacer\"></div>", column)
}

fn render_page_block(
    ctx: &RenderContext,
    page: &PageBlock,
    level: usize,
    children: &str,
    id_class: &str,
) -> String {
    if level > 0 {
        // sub-page reference: a link, never an inlined document
        let title = join_plain_text(&page.title);
        let title = if title.is_empty() {
            "Untitled"
        } else {
            title.as_str()
        };
        let inner = format!(
            "{}{}",
            render_icon(page.format.icon.as_ref()),
            tag("span", "notion-page-title", &[], &escape_text(title))
        );
        return format!(
            "<a class=\"{}\" href=\"{}\">{}</a>",
            cs(&[Some("notion-page-link"), Some(id_class)]),
            escape_attr(&ctx.options.page_url(page.common.id.as_str())),
            inner
        );
    }

    let options = ctx.options;
    if !options.full_page {
        return tag(
            "main",
            &cs(&[
                Some("notion"),
                Some(if options.dark_mode {
                    "dark-mode"
                } else {
                    "light-mode"
                }),
                Some("notion-page"),
                page.format.full_width.then_some("notion-full-width"),
                page.format.small_text.then_some("notion-small-text"),
                Some(id_class),
            ]),
            &[],
            children,
        );
    }

    let toc = page_table_of_contents(ctx.map, &page.common.id);
    let has_toc = options.show_table_of_contents
        && toc.len() >= options.min_table_of_contents_items;
    let has_aside = has_toc && !page.format.full_width;

    // cover
    let mut scroller = String::new();
    if let Some(cover) = page.format.cover.as_ref() {
        let url = ctx
            .map
            .signed_url(&page.common.id)
            .unwrap_or_else(|| cover.url());
        let position = page
            .format
            .cover_position
            .unwrap_or(options.default_cover_position);
        let object_position = ctx.cache.cover_object_position(position);
        let style = format!("object-position:{}", object_position);
        scroller.push_str(&tag(
            "div",
            "notion-page-cover-wrapper",
            &[],
            &format!(
                "<img class=\"notion-page-cover\" src=\"{}\" alt=\"{}\" style=\"{}\"/>",
                escape_attr(url),
                escape_attr(&join_plain_text(&page.title)),
                style
            ),
        ));
    }

    let has_icon = page.format.icon.is_some();
    let is_image_icon = matches!(
        page.format.icon,
        Some(Icon::External { .. }) | Some(Icon::File { .. })
    );

    let mut main_inner = String::new();
    if has_icon {
        main_inner.push_str(&render_icon(page.format.icon.as_ref()));
    }
    main_inner.push_str(&tag(
        "h1",
        "notion-title",
        &[],
        &render_rich_text(&page.title),
    ));

    let article = tag("article", "notion-page-content-inner", &[], children);
    let mut content_inner = article;
    if has_aside {
        let mut toc_items = String::new();
        for entry in &toc {
            let anchor = heading_anchor(&entry.id, &entry.text);
            let _ = write!(
                toc_items,
                "<a class=\"notion-table-of-contents-item\" href=\"#{}\"><span class=\"notion-table-of-contents-item-body\" style=\"margin-left:{}px\">{}</span></a>",
                escape_attr(&anchor),
                entry.indent_level * TOC_INDENT_STEP_PX,
                escape_text(&entry.text)
            );
        }
        content_inner.push_str(&tag(
            "aside",
            "notion-aside",
            &[],
            &tag("div", "notion-aside-table-of-contents", &[], &toc_items),
        ));
    }
    main_inner.push_str(&tag(
        "div",
        &cs(&[
            Some("notion-page-content"),
            has_aside.then_some("notion-page-content-has-aside"),
            has_toc.then_some("notion-page-content-has-toc"),
        ]),
        &[],
        &content_inner,
    ));

    let main = tag(
        "main",
        &cs(&[
            Some("notion-page"),
            Some(if page.format.cover.is_some() {
                "notion-page-has-cover"
            } else {
                "notion-page-no-cover"
            }),
            Some(if has_icon {
                "notion-page-has-icon"
            } else {
                "notion-page-no-icon"
            }),
            Some(if is_image_icon {
                "notion-page-has-image-icon"
            } else {
                "notion-page-has-text-icon"
            }),
            Some("notion-full-page"),
            page.format.full_width.then_some("notion-full-width"),
            page.format.small_text.then_some("notion-small-text"),
        ]),
        &[],
        &main_inner,
    );
    scroller.push_str(&main);

    let frame = tag(
        "div",
        "notion-frame",
        &[],
        &tag("div", "notion-page-scroller", &[], &scroller),
    );

    tag(
        "div",
        &cs(&[
            Some("notion notion-app"),
            Some(if options.dark_mode {
                "dark-mode"
            } else {
                "light-mode"
            }),
            Some(id_class),
        ]),
        &[],
        &format!("<div class=\"notion-viewport\"></div>{}", frame),
    )
}
