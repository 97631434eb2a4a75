pub mod classify;
pub mod serialize;

use crate::models::{Block, IdProvider, ListItem};

pub use classify::{LineClass, LineKind, classify_line};
pub use serialize::serialize;

/// Parses note text into an ordered block sequence.
///
/// Blank lines only separate blocks and are never kept. A list line swallows
/// every immediately following non-blank line of the same list type into one
/// list block; any other line becomes a scalar block of its own. The result
/// always holds at least one block: empty input yields one empty paragraph.
pub fn parse_markdown(text: &str, ids: &mut dyn IdProvider) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut lines = text.lines().peekable();

    while let Some(line) = lines.next() {
        if is_blank(line) {
            continue;
        }

        let class = classify_line(line);
        let block_type = class.kind.block_type();
        let block_id = ids.next_block_id();

        if !block_type.is_list() {
            blocks.push(Block::text(block_id, block_type, class.content));
            continue;
        }

        let mut items = vec![ListItem::new(
            ids.next_item_id(),
            class.content,
            class.kind.checked(),
        )];

        while let Some(&next) = lines.peek() {
            if is_blank(next) {
                break;
            }
            let next_class = classify_line(next);
            if next_class.kind.block_type() != block_type {
                break;
            }
            items.push(ListItem::new(
                ids.next_item_id(),
                next_class.content,
                next_class.kind.checked(),
            ));
            lines.next();
        }

        blocks.push(Block::list(block_id, block_type, items));
    }

    if blocks.is_empty() {
        blocks.push(Block::empty_paragraph(ids.next_block_id()));
    }

    blocks
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}
