use crate::models::{Block, BlockContent, BlockType, ListItem};

/// Separator between two serialized blocks
pub const BLOCK_SEPARATOR: &str = "\n\n";

/// Renders a block sequence back to note text.
///
/// List markers are recomputed on every call: numbered lists always count
/// from `1.` in stored item order and check glyphs follow each item's flag.
pub fn serialize(blocks: &[Block]) -> String {
    let mut out = String::new();
    for (index, block) in blocks.iter().enumerate() {
        if index > 0 {
            out.push_str(BLOCK_SEPARATOR);
        }
        write_block(&mut out, block);
    }
    out
}

fn write_block(out: &mut String, block: &Block) {
    match &block.content {
        BlockContent::Text(text) => {
            out.push_str(scalar_prefix(block.block_type));
            out.push_str(text);
        }
        BlockContent::Items(items) => {
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push('\n');
                }
                out.push_str(&item_prefix(block.block_type, index, item));
                out.push_str(&item.content);
            }
        }
    }
}

/// Marker in front of a scalar block's text
pub fn scalar_prefix(block_type: BlockType) -> &'static str {
    match block_type {
        BlockType::Heading1 => "# ",
        BlockType::Heading2 => "## ",
        BlockType::Quote => "> ",
        _ => "",
    }
}

/// Marker for the item at `index` of a list of `block_type`
pub fn item_prefix(block_type: BlockType, index: usize, item: &ListItem) -> String {
    match block_type {
        BlockType::NumberList => format!("{}. ", index + 1),
        BlockType::CheckList if item.is_checked() => "- [x] ".to_string(),
        BlockType::CheckList => "- [ ] ".to_string(),
        _ => "- ".to_string(),
    }
}
