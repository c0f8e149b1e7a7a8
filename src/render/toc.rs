// src/render/toc.rs
//! Table-of-contents derivation.
//!
//! The TOC is never stored: it is computed from a page's top-level
//! heading blocks in document order. Indent levels follow heading rank
//! but demote gracefully when ranks are skipped — an h3 directly under
//! an h1 indents one level, not two.

use crate::constants::ANCHOR_ID_SUFFIX_LEN;
use crate::model::{Block, RecordMap};
use crate::types::{join_plain_text, BlockId};

#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry {
    pub id: BlockId,
    pub text: String,
    /// 0, 1 or 2.
    pub indent_level: usize,
}

/// Collects the table of contents for a page: its top-level heading
/// blocks, with effective indent levels.
pub fn page_table_of_contents(map: &RecordMap, page_id: &BlockId) -> Vec<TocEntry> {
    let headings: Vec<(&Block, usize)> = map
        .children_of(page_id)
        .filter_map(|b| b.heading_rank().map(|rank| (b, rank as usize - 1)))
        .collect();

    // Stack of (actual, effective) indent pairs. A heading deeper than
    // the top of the stack indents one past the top's effective level,
    // regardless of how many ranks were skipped.
    let mut stack: Vec<(isize, isize)> = vec![(-1, -1)];
    let mut entries = Vec::with_capacity(headings.len());

    for (block, actual) in headings {
        let actual = actual as isize;
        let effective = loop {
            let &(top_actual, top_effective) = stack.last().expect("stack never empties");
            if actual > top_actual {
                let effective = top_effective + 1;
                stack.push((actual, effective));
                break effective;
            } else if actual == top_actual {
                break top_effective;
            } else {
                stack.pop();
            }
        };

        entries.push(TocEntry {
            id: block.id().clone(),
            text: block
                .rich_text()
                .map(join_plain_text)
                .unwrap_or_default(),
            indent_level: effective.max(0) as usize,
        });
    }

    entries
}

/// Anchor for a heading: a slug of its text plus the trailing characters
/// of its id, keeping same-text headings distinct.
pub fn heading_anchor(id: &BlockId, text: &str) -> String {
    let id_str = id.as_str();
    let suffix = &id_str[id_str.len().saturating_sub(ANCHOR_ID_SUFFIX_LEN)..];
    match slugify(text) {
        Some(slug) => format!("{}-{}", slug, suffix),
        None => suffix.to_string(),
    }
}

/// Lowercased, punctuation stripped, whitespace collapsed to dashes.
pub fn slugify(text: &str) -> Option<String> {
    let mut slug = String::with_capacity(text.len());
    let mut last_dash = true;
    for c in text.to_lowercase().chars() {
        if c.is_whitespace() || c == '-' {
            if !last_dash {
                slug.push('-');
                last_dash = true;
            }
        } else if matches!(c, ':' | '?' | '&' | '"' | '.' | ',' | '/' | '\\' | '\'') {
            // dropped outright, matching the anchor style of the site
        } else {
            slug.push(c);
            last_dash = false;
        }
    }
    let slug = slug.trim_matches('-').to_string();
    if slug.is_empty() {
        None
    } else {
        Some(slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        BlockCommon, Heading1Block, Heading2Block, Heading3Block, PageBlock, PageFormat,
        ParagraphBlock, TextBlockContent,
    };
    use crate::types::RichTextItem;

    struct PageBuilder {
        map: RecordMap,
        root: BlockId,
        children: Vec<BlockId>,
    }

    impl PageBuilder {
        fn new() -> Self {
            let root = BlockId::new_v4();
            Self {
                map: RecordMap::with_root(root.clone()),
                root,
                children: Vec::new(),
            }
        }

        fn push(&mut self, mut block: Block) -> BlockId {
            let id = block.id().clone();
            block.common_mut().parent = Some(self.root.clone());
            self.children.push(id.clone());
            self.map.insert(block);
            id
        }

        fn heading(&mut self, rank: u8, text: &str) -> BlockId {
            let common = BlockCommon::default();
            let content = TextBlockContent {
                rich_text: vec![RichTextItem::plain_text(text)],
                color: Default::default(),
            };
            let block = match rank {
                1 => Block::Heading1(Heading1Block {
                    common,
                    content,
                    toggleable: false,
                }),
                2 => Block::Heading2(Heading2Block {
                    common,
                    content,
                    toggleable: false,
                }),
                _ => Block::Heading3(Heading3Block {
                    common,
                    content,
                    toggleable: false,
                }),
            };
            self.push(block)
        }

        fn finish(mut self) -> (RecordMap, BlockId) {
            let page = Block::Page(PageBlock {
                common: BlockCommon {
                    id: self.root.clone(),
                    parent: None,
                    has_children: !self.children.is_empty(),
                    children: self.children.clone(),
                    archived: false,
                },
                title: vec![RichTextItem::plain_text("Page")],
                format: PageFormat::default(),
                url: None,
            });
            self.map.insert(page);
            let root = self.root.clone();
            (self.map, root)
        }
    }

    #[test]
    fn ranks_map_to_indent_levels() {
        let mut b = PageBuilder::new();
        b.heading(1, "One");
        b.heading(2, "Two");
        b.heading(3, "Three");
        let (map, page) = b.finish();

        let toc = page_table_of_contents(&map, &page);
        let levels: Vec<_> = toc.iter().map(|e| e.indent_level).collect();
        assert_eq!(levels, vec![0, 1, 2]);
    }

    #[test]
    fn skipped_ranks_are_demoted() {
        let mut b = PageBuilder::new();
        b.heading(1, "Top");
        b.heading(3, "Jumped"); // h3 right under h1 indents one, not two
        b.heading(2, "Back");
        let (map, page) = b.finish();

        let toc = page_table_of_contents(&map, &page);
        let levels: Vec<_> = toc.iter().map(|e| e.indent_level).collect();
        assert_eq!(levels, vec![0, 1, 1]);
    }

    #[test]
    fn leading_h3_starts_at_zero() {
        let mut b = PageBuilder::new();
        b.heading(3, "Small first");
        b.heading(1, "Then big");
        let (map, page) = b.finish();

        let toc = page_table_of_contents(&map, &page);
        let levels: Vec<_> = toc.iter().map(|e| e.indent_level).collect();
        assert_eq!(levels, vec![0, 0]);
    }

    #[test]
    fn non_headings_are_ignored() {
        let mut b = PageBuilder::new();
        b.heading(1, "One");
        b.push(Block::Paragraph(ParagraphBlock {
            common: BlockCommon::default(),
            content: TextBlockContent::plain("body"),
        }));
        b.heading(2, "Two");
        let (map, page) = b.finish();

        assert_eq!(page_table_of_contents(&map, &page).len(), 2);
    }

    #[test]
    fn anchors_are_slugged_and_id_suffixed() {
        let id = BlockId::parse("550e8400e29b41d4a716446655440abc").unwrap();
        assert_eq!(
            heading_anchor(&id, "Hello, World: a Test"),
            "hello-world-a-test-40abc"
        );
        assert_eq!(heading_anchor(&id, "???"), "40abc");
    }

    #[test]
    fn slugify_collapses_and_trims() {
        assert_eq!(slugify("  A  B  ").as_deref(), Some("a-b"));
        assert_eq!(slugify("a/b.c"), Some("abc".to_string()));
        assert_eq!(slugify(""), None);
    }
}
