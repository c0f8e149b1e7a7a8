// src/render/rich_text.rs
//! Rich text runs → inline HTML.
//!
//! Annotations become nested wrapper elements (innermost first: the
//! content itself, then code/bold/italic/strikethrough/underline, with
//! the color span outermost). Mentions render as links when the fetch
//! pass resolved a URI and degrade to plain text when it didn't.

use super::markup::{escape_attr, escape_text, tag};
use crate::types::{Mention, MentionKind, RichTextItem, RichTextKind};
use std::fmt::Write;

/// Renders a run sequence.
pub fn render_rich_text(items: &[RichTextItem]) -> String {
    let mut out = String::new();
    for item in items {
        out.push_str(&render_item(item));
    }
    out
}

fn render_item(item: &RichTextItem) -> String {
    let base = match &item.kind {
        RichTextKind::Text { content, link } => {
            let text = escape_text(content);
            let href = link
                .as_ref()
                .map(|l| l.url.as_str())
                .or(item.href.as_deref());
            match href {
                Some(url) => anchor("notion-link", url, &text),
                None => text,
            }
        }
        RichTextKind::Equation { expression } => tag(
            "span",
            "notion-equation notion-equation-inline",
            &[],
            &escape_text(expression),
        ),
        RichTextKind::Mention(mention) => render_mention(mention, &item.plain_text),
    };

    apply_annotations(base, item)
}

fn render_mention(mention: &Mention, plain_text: &str) -> String {
    match &mention.kind {
        MentionKind::Page { uri, .. } => match uri {
            Some(uri) => anchor("notion-link notion-page-mention", uri, &escape_text(plain_text)),
            // unresolved target: readable text, no dead link
            None => escape_text(plain_text),
        },
        MentionKind::Database { .. } => tag(
            "span",
            "notion-database-mention",
            &[],
            &escape_text(plain_text),
        ),
        MentionKind::User { name, .. } => {
            let display = name.as_deref().unwrap_or(plain_text);
            tag(
                "span",
                "notion-user-mention",
                &[],
                &escape_text(&format!("@{}", display.trim_start_matches('@'))),
            )
        }
        MentionKind::Date { start, end } => {
            let mut text = start.clone();
            if let Some(end) = end {
                let _ = write!(text, " → {}", end);
            }
            tag("span", "notion-date-mention", &[], &escape_text(&text))
        }
        MentionKind::LinkPreview { url } => anchor("notion-link", url, &escape_text(plain_text)),
    }
}

fn anchor(class: &str, href: &str, inner: &str) -> String {
    format!(
        "<a class=\"{}\" href=\"{}\">{}</a>",
        class,
        escape_attr(href),
        inner
    )
}

fn apply_annotations(base: String, item: &RichTextItem) -> String {
    let a = &item.annotations;
    if a.is_plain() {
        return base;
    }

    let mut out = base;
    if a.code {
        out = tag("code", "notion-inline-code", &[], &out);
    }
    if a.bold {
        out = tag("b", "", &[], &out);
    }
    if a.italic {
        out = tag("em", "", &[], &out);
    }
    if a.strikethrough {
        out = tag("s", "", &[], &out);
    }
    if a.underline {
        out = tag("span", "notion-underline", &[], &out);
    }
    if let Some(color_class) = a.color.css_class() {
        out = tag("span", &color_class, &[], &out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Annotations, Color, Link, NotionId};

    #[test]
    fn plain_text_is_escaped_only() {
        let items = vec![RichTextItem::plain_text("a < b")];
        assert_eq!(render_rich_text(&items), "a &lt; b");
    }

    #[test]
    fn annotations_nest_with_color_outermost() {
        let item = RichTextItem {
            annotations: Annotations {
                bold: true,
                code: true,
                color: Color::Blue,
                ..Default::default()
            },
            ..RichTextItem::plain_text("x")
        };
        assert_eq!(
            render_rich_text(&[item]),
            "<span class=\"notion-blue\"><b><code class=\"notion-inline-code\">x</code></b></span>"
        );
    }

    #[test]
    fn text_links_become_anchors() {
        let item = RichTextItem {
            kind: RichTextKind::Text {
                content: "site".to_string(),
                link: Some(Link {
                    url: "https://example.com".to_string(),
                }),
            },
            ..RichTextItem::plain_text("site")
        };
        assert_eq!(
            render_rich_text(&[item]),
            "<a class=\"notion-link\" href=\"https://example.com\">site</a>"
        );
    }

    #[test]
    fn resolved_mentions_link_and_unresolved_degrade() {
        let id = NotionId::parse("550e8400e29b41d4a716446655440000").unwrap();

        let unresolved = RichTextItem::page_mention(id.clone(), "Target");
        assert_eq!(render_rich_text(&[unresolved]), "Target");

        let mut resolved = RichTextItem::page_mention(id, "Target");
        if let RichTextKind::Mention(Mention {
            kind: MentionKind::Page { uri, .. },
        }) = &mut resolved.kind
        {
            *uri = Some("/note/target".to_string());
        }
        assert_eq!(
            render_rich_text(&[resolved]),
            "<a class=\"notion-link notion-page-mention\" href=\"/note/target\">Target</a>"
        );
    }

    #[test]
    fn inline_equations_keep_their_source() {
        let item = RichTextItem {
            kind: RichTextKind::Equation {
                expression: "E = mc^2".to_string(),
            },
            ..RichTextItem::plain_text("E = mc^2")
        };
        assert_eq!(
            render_rich_text(&[item]),
            "<span class=\"notion-equation notion-equation-inline\">E = mc^2</span>"
        );
    }
}
