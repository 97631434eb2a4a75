use crate::models::{BlockId, BlockType, ItemId};

/// Every structural edit the engine understands.
///
/// Commands are applied one at a time, in the order user events arrive, via
/// [`BlockEditor::apply`](crate::editing::BlockEditor::apply). A command that
/// names a block or item that does not exist is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    /// Replace the text of a scalar block
    UpdateBlock { id: BlockId, content: String },
    /// Insert a new block after `after`, or at the end when `after` is unknown
    AddBlock { after: BlockId, block_type: BlockType },
    /// Insert a new block at an absolute position (clamped to the length)
    InsertBlockAt { index: usize, block_type: BlockType },
    /// Delete a block; the last remaining block becomes a fresh empty paragraph
    RemoveBlock { id: BlockId },
    /// Retype a block, converting between scalar text and list items
    ChangeBlockType { id: BlockId, block_type: BlockType },
    /// Replace the block order with a permutation of the current ids
    ReorderBlocks { order: Vec<BlockId> },
    /// Move one block to a new index, shifting the others
    MoveBlock { id: BlockId, to: usize },
    /// Insert an empty item after `after`, or at the end when `after` is unknown
    AddListItem { block: BlockId, after: ItemId },
    /// Remove an item; removing the only item turns the block into an empty paragraph
    RemoveListItem { block: BlockId, item: ItemId },
    /// Update an item's text and, in check lists, its checked flag
    UpdateListItem {
        block: BlockId,
        item: ItemId,
        content: String,
        checked: Option<bool>,
    },
}
