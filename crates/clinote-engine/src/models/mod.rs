pub mod block;
pub mod ids;

pub use block::{Block, BlockContent, BlockType, ListItem, NodeRef, UnknownBlockType};
pub use ids::{BlockId, IdProvider, ItemId, RandomIds, SequentialIds};
