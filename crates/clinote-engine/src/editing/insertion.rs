use crate::editing::{BlockEditor, Caret, FocusController};
use crate::models::{BlockId, BlockType, NodeRef};

/// Which half of the target block a dragged token was released over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropEdge {
    Top,
    Bottom,
}

impl DropEdge {
    /// Compare the pointer against the target's vertical midpoint.
    /// Exactly on the midpoint counts as the bottom half.
    pub fn from_pointer(pointer_y: f64, target_top: f64, target_height: f64) -> Self {
        if pointer_y < target_top + target_height / 2.0 {
            DropEdge::Top
        } else {
            DropEdge::Bottom
        }
    }

    /// Absolute insertion index for a drop on the block at `target_index`
    pub fn insertion_index(self, target_index: usize) -> usize {
        match self {
            DropEdge::Top => target_index,
            DropEdge::Bottom => target_index + 1,
        }
    }
}

/// A block-type token released over an existing block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockDrop<'a> {
    /// Token from the block palette, e.g. `"checkList"`
    pub token: &'a str,
    pub target_index: usize,
    pub edge: DropEdge,
}

/// Insert the dropped block and queue focus on it.
///
/// Tokens outside the known block types insert a paragraph.
pub fn handle_drop(
    editor: &mut BlockEditor,
    focus: &mut FocusController,
    dropped: BlockDrop<'_>,
) -> BlockId {
    let block_type = BlockType::from_token(dropped.token);
    if block_type.token() != dropped.token {
        log::warn!(
            "Unknown block type token {:?}; inserting a paragraph instead",
            dropped.token
        );
    }
    let index = dropped.edge.insertion_index(dropped.target_index);
    let id = editor.insert_block_at(index, block_type);

    if let Some(block) = editor.block(id) {
        focus.request_focus(NodeRef::entering(block, true), Caret::Start);
    }
    id
}
