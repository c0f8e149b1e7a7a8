use super::Block;
use crate::types::{BlockId, DatabaseId, PageId};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;

/// Schema summary of a database, kept as an auxiliary mapping on the
/// record map (property name → property type name).
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseSchema {
    pub title: String,
    pub properties: IndexMap<String, String>,
}

/// One row of a database query: identity, timestamps and the raw
/// property map in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRecord {
    pub id: PageId,
    pub created_time: Option<chrono::DateTime<chrono::Utc>>,
    pub last_edited_time: Option<chrono::DateTime<chrono::Utc>>,
    pub archived: bool,
    pub url: Option<String>,
    pub properties: IndexMap<String, Value>,
}

/// The fully fetched graph for one page view.
///
/// Blocks are stored flat, keyed by identifier, in insertion order;
/// nesting is expressed through each block's ordered `children` ids and
/// its `parent` back-reference. The map is written once by the fetch
/// pass and read-only during rendering.
///
/// Invariant: every block reachable from the root has its parent present
/// in the map. Cross references (aliases, mention targets) are exempt —
/// they resolve lazily and may dangle.
#[derive(Debug, Clone, Default)]
pub struct RecordMap {
    root: Option<BlockId>,
    blocks: IndexMap<BlockId, Block>,
    signed_urls: HashMap<BlockId, String>,
    schemas: HashMap<DatabaseId, DatabaseSchema>,
}

impl RecordMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: BlockId) -> Self {
        Self {
            root: Some(root),
            ..Self::default()
        }
    }

    pub fn root(&self) -> Option<&BlockId> {
        self.root.as_ref()
    }

    pub fn set_root(&mut self, root: BlockId) {
        self.root = Some(root);
    }

    pub fn root_block(&self) -> Option<&Block> {
        self.root.as_ref().and_then(|id| self.blocks.get(id))
    }

    pub fn block(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.get(id)
    }

    /// The parent block of `id`, when both the link and the target exist.
    pub fn parent_of(&self, id: &BlockId) -> Option<&Block> {
        self.blocks
            .get(id)
            .and_then(|b| b.common().parent.as_ref())
            .and_then(|p| self.blocks.get(p))
    }

    /// Walks parent links to the nearest enclosing page block.
    pub fn containing_page(&self, id: &BlockId) -> Option<&Block> {
        let mut current = self.parent_of(id);
        while let Some(block) = current {
            if matches!(block, Block::Page(_)) {
                return Some(block);
            }
            current = self.parent_of(block.id());
        }
        None
    }

    /// Children of `id` in document order. Identifiers without a record
    /// are skipped; the renderer treats them as gaps, not failures.
    pub fn children_of<'a>(&'a self, id: &BlockId) -> impl Iterator<Item = &'a Block> + 'a {
        let ids: Vec<BlockId> = self
            .blocks
            .get(id)
            .map(|b| b.common().children.to_vec())
            .unwrap_or_default();
        ids.into_iter().filter_map(move |cid| self.blocks.get(&cid))
    }

    pub fn insert(&mut self, block: Block) {
        self.blocks.insert(block.id().clone(), block);
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    pub fn add_signed_url(&mut self, id: BlockId, url: String) {
        self.signed_urls.insert(id, url);
    }

    pub fn signed_url(&self, id: &BlockId) -> Option<&str> {
        self.signed_urls.get(id).map(|s| s.as_str())
    }

    pub fn add_schema(&mut self, id: DatabaseId, schema: DatabaseSchema) {
        self.schemas.insert(id, schema);
    }

    pub fn schema(&self, id: &DatabaseId) -> Option<&DatabaseSchema> {
        self.schemas.get(id)
    }

    /// Checks the reachability invariant: every block reachable from the
    /// root must have its parent present in the map. Returns the ids that
    /// violate it (empty on a healthy map).
    pub fn parent_violations(&self) -> Vec<BlockId> {
        let mut violations = Vec::new();
        let Some(root) = self.root.as_ref() else {
            return violations;
        };

        let mut stack = vec![root.clone()];
        while let Some(id) = stack.pop() {
            let Some(block) = self.blocks.get(&id) else {
                continue;
            };
            if &id != root {
                let parent_present = block
                    .common()
                    .parent
                    .as_ref()
                    .map(|p| self.blocks.contains_key(p))
                    .unwrap_or(false);
                if !parent_present {
                    violations.push(id.clone());
                }
            }
            stack.extend(block.common().children.iter().cloned());
        }
        violations
    }

    /// Nesting depth of `id` below the root, following parent links.
    pub fn depth_of(&self, id: &BlockId) -> usize {
        let mut depth = 0;
        let mut current = self.blocks.get(id).and_then(|b| b.common().parent.clone());
        while let Some(pid) = current {
            depth += 1;
            current = self.blocks.get(&pid).and_then(|b| b.common().parent.clone());
        }
        depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockCommon, ParagraphBlock, TextBlockContent};

    fn paragraph(id: &BlockId, parent: Option<&BlockId>, children: &[BlockId]) -> Block {
        Block::Paragraph(ParagraphBlock {
            common: BlockCommon {
                id: id.clone(),
                parent: parent.cloned(),
                has_children: !children.is_empty(),
                children: children.to_vec(),
                archived: false,
            },
            content: TextBlockContent::plain("x"),
        })
    }

    #[test]
    fn parent_links_and_depth() {
        let root = BlockId::new_v4();
        let child = BlockId::new_v4();
        let grandchild = BlockId::new_v4();

        let mut map = RecordMap::with_root(root.clone());
        map.insert(paragraph(&root, None, &[child.clone()]));
        map.insert(paragraph(&child, Some(&root), &[grandchild.clone()]));
        map.insert(paragraph(&grandchild, Some(&child), &[]));

        assert_eq!(map.depth_of(&grandchild), 2);
        assert_eq!(map.parent_of(&grandchild).unwrap().id(), &child);
        assert!(map.parent_violations().is_empty());
    }

    #[test]
    fn detects_parent_violations() {
        let root = BlockId::new_v4();
        let child = BlockId::new_v4();

        let mut map = RecordMap::with_root(root.clone());
        map.insert(paragraph(&root, None, &[child.clone()]));
        // child claims a parent that was never inserted
        let orphan_parent = BlockId::new_v4();
        map.insert(paragraph(&child, Some(&orphan_parent), &[]));

        assert_eq!(map.parent_violations(), vec![child]);
    }

    #[test]
    fn children_preserve_order_and_skip_gaps() {
        let root = BlockId::new_v4();
        let a = BlockId::new_v4();
        let missing = BlockId::new_v4();
        let b = BlockId::new_v4();

        let mut map = RecordMap::with_root(root.clone());
        map.insert(paragraph(&root, None, &[a.clone(), missing, b.clone()]));
        map.insert(paragraph(&a, Some(&root), &[]));
        map.insert(paragraph(&b, Some(&root), &[]));

        let ids: Vec<_> = map.children_of(&root).map(|c| c.id().clone()).collect();
        assert_eq!(ids, vec![a, b]);
    }
}
