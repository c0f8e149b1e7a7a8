use super::{Color, NotionId};
use serde::{Deserialize, Serialize};

/// The kind of rich text content — a typed vocabulary replacing
/// stringly-typed dispatch. Each variant carries its specific data, so a
/// "mention" without mention data is unrepresentable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RichTextKind {
    Text {
        content: String,
        link: Option<Link>,
    },
    Mention(Mention),
    Equation {
        expression: String,
    },
}

/// One run of rich text with its formatting annotations.
///
/// `plain_text` is the fallback rendering for every variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextItem {
    pub kind: RichTextKind,
    pub annotations: Annotations,
    pub plain_text: String,
    pub href: Option<String>,
}

impl RichTextItem {
    /// Create a plain text run — the most common variant, used heavily by
    /// builders and tests.
    pub fn plain_text(text: &str) -> Self {
        Self {
            kind: RichTextKind::Text {
                content: text.to_string(),
                link: None,
            },
            annotations: Annotations::default(),
            plain_text: text.to_string(),
            href: None,
        }
    }

    /// Create a page-mention run with an unresolved target.
    pub fn page_mention(id: NotionId, plain_text: &str) -> Self {
        Self {
            kind: RichTextKind::Mention(Mention {
                kind: MentionKind::Page { id, uri: None },
            }),
            annotations: Annotations::default(),
            plain_text: plain_text.to_string(),
            href: None,
        }
    }
}

/// Joins the plain-text projections of a run sequence.
pub fn join_plain_text(items: &[RichTextItem]) -> String {
    items.iter().map(|i| i.plain_text.as_str()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
    pub color: Color,
}

impl Annotations {
    pub fn is_plain(&self) -> bool {
        !self.bold
            && !self.italic
            && !self.strikethrough
            && !self.underline
            && !self.code
            && self.color == Color::Default
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    pub kind: MentionKind,
}

/// The mention variants the renderer understands.
///
/// A page mention's `uri` is filled in by the fetch pass when a resolver
/// is injected; rendering falls back to plain text when it is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MentionKind {
    Page {
        id: NotionId,
        uri: Option<String>,
    },
    Database {
        id: NotionId,
    },
    User {
        id: String,
        name: Option<String>,
    },
    Date {
        start: String,
        end: Option<String>,
    },
    LinkPreview {
        url: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_plain_text_concatenates_runs() {
        let items = vec![
            RichTextItem::plain_text("Hello, "),
            RichTextItem::plain_text("world"),
        ];
        assert_eq!(join_plain_text(&items), "Hello, world");
        assert_eq!(join_plain_text(&[]), "");
    }

    #[test]
    fn page_mentions_start_unresolved() {
        let id = NotionId::parse("550e8400e29b41d4a716446655440000").unwrap();
        let item = RichTextItem::page_mention(id, "Some page");
        match item.kind {
            RichTextKind::Mention(Mention {
                kind: MentionKind::Page { uri, .. },
            }) => assert!(uri.is_none()),
            other => panic!("unexpected kind: {:?}", other),
        }
    }
}
