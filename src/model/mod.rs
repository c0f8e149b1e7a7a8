//! Domain model: the block taxonomy and the record map that holds a
//! fetched page graph.

mod block;
pub mod blocks;
mod common;
mod record_map;

pub use block::Block;
pub use blocks::*;
pub use common::BlockCommon;
pub use record_map::{DatabaseSchema, PageRecord, RecordMap};
