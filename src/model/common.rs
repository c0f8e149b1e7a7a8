use crate::types::BlockId;
use serde::{Deserialize, Serialize};

/// Data shared by every block variant.
///
/// `children` holds the ordered identifiers of child blocks; the blocks
/// themselves live in the `RecordMap`. `parent` is filled by the fetcher
/// while descending — the record map's reachability invariant depends on
/// it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockCommon {
    pub id: BlockId,
    pub parent: Option<BlockId>,
    pub has_children: bool,
    pub children: Vec<BlockId>,
    pub archived: bool,
}

impl BlockCommon {
    pub fn new(id: BlockId) -> Self {
        Self {
            id,
            parent: None,
            has_children: false,
            children: Vec::new(),
            archived: false,
        }
    }
}

impl Default for BlockCommon {
    fn default() -> Self {
        Self::new(BlockId::new_v4())
    }
}
