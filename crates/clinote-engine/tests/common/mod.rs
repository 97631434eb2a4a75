// Strategies shared by the property tests. Each test binary uses a subset,
// so unused ones would otherwise warn.
#![allow(dead_code)]

use clinote_engine::{Block, BlockEditor, BlockType, IdProvider, ListItem, SequentialIds, serialize};
use proptest::prelude::*;

pub fn block_type() -> impl Strategy<Value = BlockType> {
    prop::sample::select(BlockType::ALL.to_vec())
}

/// Text that starts with a letter, so it never reads as a line marker
pub fn content() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9 ]{0,12}"
}

/// One block as generated: its type and item contents with check flags.
/// Scalar blocks use the first entry only.
#[derive(Debug, Clone)]
pub struct BlockShape {
    pub block_type: BlockType,
    pub items: Vec<(String, bool)>,
}

pub fn block_shape() -> impl Strategy<Value = BlockShape> {
    (
        block_type(),
        prop::collection::vec((content(), any::<bool>()), 1..4),
    )
        .prop_map(|(block_type, items)| BlockShape { block_type, items })
}

pub fn build_blocks(shapes: &[BlockShape]) -> Vec<Block> {
    let mut ids = SequentialIds::new();
    shapes
        .iter()
        .map(|shape| {
            let id = ids.next_block_id();
            if !shape.block_type.is_list() {
                return Block::text(id, shape.block_type, shape.items[0].0.clone());
            }
            let is_check = shape.block_type == BlockType::CheckList;
            let items = shape
                .items
                .iter()
                .map(|(text, checked)| {
                    ListItem::new(ids.next_item_id(), text.clone(), is_check.then_some(*checked))
                })
                .collect();
            Block::list(id, shape.block_type, items)
        })
        .collect()
}

/// Text exactly as the serializer writes it
pub fn canonical_text() -> impl Strategy<Value = String> {
    prop::collection::vec(block_shape(), 1..7).prop_map(|shapes| serialize(&build_blocks(&shapes)))
}

/// One line of hand-written note text, canonical or not
pub fn note_line() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec![
            "", "# ", "## ", "- ", "* ", "- [ ] ", "- [x] ", "- [X] ", "3. ", "12. ", "> ", "#",
            "  ",
        ]),
        "[a-z #>*.0-9-]{0,8}",
    )
        .prop_map(|(marker, rest)| format!("{marker}{rest}"))
}

pub fn note_text() -> impl Strategy<Value = String> {
    prop::collection::vec(note_line(), 0..12).prop_map(|lines| lines.join("\n"))
}

/// The block sequence is never empty, list blocks hold items, and every
/// block's content matches its type
pub fn check_invariants(editor: &BlockEditor) -> Result<(), TestCaseError> {
    prop_assert!(!editor.blocks().is_empty());
    for block in editor.blocks() {
        prop_assert_eq!(block.is_list(), block.block_type.is_list());
        if let Some(items) = block.items() {
            prop_assert!(!items.is_empty());
        }
    }
    Ok(())
}
