use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a block
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct BlockId(pub u128);

/// Unique identifier for a list item
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct ItemId(pub u128);

/// Source of fresh identifiers for blocks and list items.
///
/// The engine owns exactly one provider for the whole session, so every id it
/// hands out is drawn from the same sequence and is never reused.
pub trait IdProvider {
    /// Produce the next raw identifier
    fn next_raw(&mut self) -> u128;

    fn next_block_id(&mut self) -> BlockId {
        BlockId(self.next_raw())
    }

    fn next_item_id(&mut self) -> ItemId {
        ItemId(self.next_raw())
    }
}

/// Monotonic counter starting at 1. Deterministic, which is what tests want.
#[derive(Debug, Default, Clone)]
pub struct SequentialIds {
    last: u128,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdProvider for SequentialIds {
    fn next_raw(&mut self) -> u128 {
        self.last += 1;
        self.last
    }
}

/// Random v4 UUIDs, for sessions whose ids may leave the process
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdProvider for RandomIds {
    fn next_raw(&mut self) -> u128 {
        Uuid::new_v4().as_u128()
    }
}
