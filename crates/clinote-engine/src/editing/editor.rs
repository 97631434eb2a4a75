use std::collections::{HashMap, HashSet};

use crate::editing::{Cmd, Patch};
use crate::models::{
    Block, BlockContent, BlockId, BlockType, IdProvider, ItemId, ListItem, NodeRef,
    SequentialIds, block::checked_default,
};
use crate::parsing::{parse_markdown, serialize};

/// Callback receiving the fully serialized note after every change
pub type ChangeCallback = Box<dyn FnMut(&str)>;

enum Outcome {
    Unchanged,
    Changed,
    Created(NodeRef),
}

/// The authoritative block sequence of one editing session.
///
/// ## Lifecycle
///
/// 1. **Load**: the initial text is parsed exactly once, in the constructor
/// 2. **Edit**: every mutation goes through a [`Cmd`], either via
///    [`apply`](Self::apply) or one of the named wrapper methods
/// 3. **Emit**: after each command that changed something the whole sequence
///    is re-serialized and handed to the change callback
///
/// ## Invariants
///
/// - the sequence never becomes empty; removing the last block leaves a fresh
///   empty paragraph behind
/// - a list block never holds zero items; removing the only item turns the
///   block into an empty paragraph in place
/// - operations are total: unknown ids leave the state untouched and emit
///   nothing
///
/// ## Usage Pattern
///
/// ```rust
/// # use clinote_engine::editing::BlockEditor;
/// # use clinote_engine::models::BlockType;
/// let mut editor = BlockEditor::new("# Session\n\n- mood stable");
/// editor.on_change(|text| println!("save: {text}"));
///
/// let heading = editor.blocks()[0].id;
/// let para = editor.add_block(heading, BlockType::Paragraph);
/// editor.update_block(para, "Follow up in two weeks.");
///
/// assert_eq!(
///     editor.text(),
///     "# Session\n\nFollow up in two weeks.\n\n- mood stable"
/// );
/// ```
pub struct BlockEditor {
    blocks: Vec<Block>,
    ids: Box<dyn IdProvider>,
    on_change: Option<ChangeCallback>,
    version: u64,
}

impl std::fmt::Debug for BlockEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockEditor")
            .field("blocks", &self.blocks)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl BlockEditor {
    /// Start a session with sequential ids
    pub fn new(text: &str) -> Self {
        Self::with_ids(text, SequentialIds::new())
    }

    /// Start a session drawing ids from `ids`
    pub fn with_ids(text: &str, ids: impl IdProvider + 'static) -> Self {
        let mut ids: Box<dyn IdProvider> = Box::new(ids);
        let blocks = parse_markdown(text, ids.as_mut());
        log::debug!("Loaded note with {} blocks", blocks.len());
        Self {
            blocks,
            ids,
            on_change: None,
            version: 0,
        }
    }

    /// Register the change callback, replacing any previous one
    pub fn on_change(&mut self, callback: impl FnMut(&str) + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn index_of(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Incremented once per command that changed the sequence
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The current note text
    pub fn text(&self) -> String {
        serialize(&self.blocks)
    }

    /// Whether `node` still exists in the sequence
    pub fn contains(&self, node: NodeRef) -> bool {
        match node {
            NodeRef::Block(id) => self.block(id).is_some_and(|b| !b.is_list()),
            NodeRef::Item(block, item) => {
                self.block(block).and_then(|b| b.item(item)).is_some()
            }
        }
    }

    /// Editable text of a node, if it exists
    pub fn node_text(&self, node: NodeRef) -> Option<&str> {
        let block = self.block(node.block_id())?;
        match node {
            NodeRef::Block(_) => block.text_content(),
            NodeRef::Item(_, item) => block.item(item).map(|i| i.content.as_str()),
        }
    }

    /// Apply a command and emit the new text if it changed anything
    pub fn apply(&mut self, cmd: Cmd) -> Patch {
        let outcome = match cmd {
            Cmd::UpdateBlock { id, content } => self.set_block_text(id, content),
            Cmd::AddBlock { after, block_type } => {
                let index = self.index_of(after).map_or(self.blocks.len(), |i| i + 1);
                Outcome::Created(NodeRef::Block(self.insert_new_block(index, block_type)))
            }
            Cmd::InsertBlockAt { index, block_type } => {
                Outcome::Created(NodeRef::Block(self.insert_new_block(index, block_type)))
            }
            Cmd::RemoveBlock { id } => self.delete_block(id),
            Cmd::ChangeBlockType { id, block_type } => self.retype_block(id, block_type),
            Cmd::ReorderBlocks { order } => self.permute_blocks(order),
            Cmd::MoveBlock { id, to } => match self.moved_order(id, to) {
                Some(order) => self.permute_blocks(order),
                None => Outcome::Unchanged,
            },
            Cmd::AddListItem { block, after } => self.insert_item(block, after),
            Cmd::RemoveListItem { block, item } => self.delete_item(block, item),
            Cmd::UpdateListItem {
                block,
                item,
                content,
                checked,
            } => self.set_item(block, item, content, checked),
        };
        self.commit(outcome)
    }

    pub fn update_block(&mut self, id: BlockId, content: impl Into<String>) -> Patch {
        self.apply(Cmd::UpdateBlock {
            id,
            content: content.into(),
        })
    }

    /// Insert a block after `after` and return its id
    pub fn add_block(&mut self, after: BlockId, block_type: BlockType) -> BlockId {
        let index = self.index_of(after).map_or(self.blocks.len(), |i| i + 1);
        self.insert_block_at(index, block_type)
    }

    /// Insert a block at `index` and return its id
    pub fn insert_block_at(&mut self, index: usize, block_type: BlockType) -> BlockId {
        let id = self.insert_new_block(index, block_type);
        self.commit(Outcome::Created(NodeRef::Block(id)));
        id
    }

    pub fn remove_block(&mut self, id: BlockId) -> Patch {
        self.apply(Cmd::RemoveBlock { id })
    }

    pub fn change_block_type(&mut self, id: BlockId, block_type: BlockType) -> Patch {
        self.apply(Cmd::ChangeBlockType { id, block_type })
    }

    pub fn reorder_blocks(&mut self, order: Vec<BlockId>) -> Patch {
        self.apply(Cmd::ReorderBlocks { order })
    }

    pub fn move_block(&mut self, id: BlockId, to: usize) -> Patch {
        self.apply(Cmd::MoveBlock { id, to })
    }

    /// Insert an empty item after `after` and return its id.
    /// Returns `None` when `block` is not a list block.
    pub fn add_list_item(&mut self, block: BlockId, after: ItemId) -> Option<ItemId> {
        self.apply(Cmd::AddListItem { block, after })
            .created
            .and_then(NodeRef::item_id)
    }

    pub fn remove_list_item(&mut self, block: BlockId, item: ItemId) -> Patch {
        self.apply(Cmd::RemoveListItem { block, item })
    }

    pub fn update_list_item(
        &mut self,
        block: BlockId,
        item: ItemId,
        content: impl Into<String>,
        checked: Option<bool>,
    ) -> Patch {
        self.apply(Cmd::UpdateListItem {
            block,
            item,
            content: content.into(),
            checked,
        })
    }

    fn commit(&mut self, outcome: Outcome) -> Patch {
        let created = match outcome {
            Outcome::Unchanged => {
                return Patch {
                    changed: false,
                    created: None,
                    version: self.version,
                };
            }
            Outcome::Changed => None,
            Outcome::Created(node) => Some(node),
        };

        self.version += 1;
        let text = self.text();
        log::debug!(
            "Note changed: version {} ({} blocks, {} bytes)",
            self.version,
            self.blocks.len(),
            text.len()
        );
        if let Some(callback) = self.on_change.as_mut() {
            callback(&text);
        }

        Patch {
            changed: true,
            created,
            version: self.version,
        }
    }

    fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| b.id == id)
    }

    fn insert_new_block(&mut self, index: usize, block_type: BlockType) -> BlockId {
        let id = self.ids.next_block_id();
        let block = Block::empty(id, block_type, self.ids.as_mut());
        let index = index.min(self.blocks.len());
        self.blocks.insert(index, block);
        id
    }

    fn set_block_text(&mut self, id: BlockId, content: String) -> Outcome {
        let Some(block) = self.block_mut(id) else {
            return Outcome::Unchanged;
        };
        match &mut block.content {
            BlockContent::Text(text) if *text != content => {
                *text = content;
                Outcome::Changed
            }
            _ => Outcome::Unchanged,
        }
    }

    fn delete_block(&mut self, id: BlockId) -> Outcome {
        let Some(index) = self.index_of(id) else {
            return Outcome::Unchanged;
        };
        if self.blocks.len() == 1 {
            let fresh = self.ids.next_block_id();
            self.blocks[0] = Block::empty_paragraph(fresh);
            return Outcome::Created(NodeRef::Block(fresh));
        }
        self.blocks.remove(index);
        Outcome::Changed
    }

    fn retype_block(&mut self, id: BlockId, new_type: BlockType) -> Outcome {
        let Some(block) = self.blocks.iter_mut().find(|b| b.id == id) else {
            return Outcome::Unchanged;
        };
        if block.block_type == new_type {
            return Outcome::Unchanged;
        }

        let content = std::mem::replace(&mut block.content, BlockContent::Text(String::new()));
        block.content = match (content, new_type.is_list()) {
            (BlockContent::Text(text), false) => BlockContent::Text(text),
            (BlockContent::Text(text), true) => BlockContent::Items(vec![ListItem::new(
                self.ids.next_item_id(),
                text,
                checked_default(new_type),
            )]),
            (BlockContent::Items(items), false) => BlockContent::Text(
                items
                    .into_iter()
                    .map(|item| item.content)
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            (BlockContent::Items(mut items), true) => {
                for item in &mut items {
                    item.checked = checked_default(new_type);
                }
                BlockContent::Items(items)
            }
        };
        block.block_type = new_type;
        Outcome::Changed
    }

    fn permute_blocks(&mut self, order: Vec<BlockId>) -> Outcome {
        let current: Vec<BlockId> = self.blocks.iter().map(|b| b.id).collect();
        if order == current {
            return Outcome::Unchanged;
        }
        let wanted: HashSet<BlockId> = order.iter().copied().collect();
        if order.len() != current.len()
            || wanted.len() != order.len()
            || !current.iter().all(|id| wanted.contains(id))
        {
            log::warn!(
                "Rejected block reorder: {} ids given for {} blocks, not a permutation",
                order.len(),
                current.len()
            );
            return Outcome::Unchanged;
        }

        let mut by_id: HashMap<BlockId, Block> = std::mem::take(&mut self.blocks)
            .into_iter()
            .map(|b| (b.id, b))
            .collect();
        self.blocks = order.iter().filter_map(|id| by_id.remove(id)).collect();
        Outcome::Changed
    }

    fn moved_order(&self, id: BlockId, to: usize) -> Option<Vec<BlockId>> {
        let from = self.index_of(id)?;
        let mut order: Vec<BlockId> = self.blocks.iter().map(|b| b.id).collect();
        let moved = order.remove(from);
        order.insert(to.min(order.len()), moved);
        Some(order)
    }

    fn insert_item(&mut self, block_id: BlockId, after: ItemId) -> Outcome {
        let Some(block) = self.blocks.iter_mut().find(|b| b.id == block_id) else {
            return Outcome::Unchanged;
        };
        let block_type = block.block_type;
        let Some(items) = block.items_mut() else {
            return Outcome::Unchanged;
        };
        let index = items
            .iter()
            .position(|item| item.id == after)
            .map_or(items.len(), |i| i + 1);
        let item_id = self.ids.next_item_id();
        items.insert(index, ListItem::empty(item_id, block_type));
        Outcome::Created(NodeRef::Item(block_id, item_id))
    }

    fn delete_item(&mut self, block_id: BlockId, item_id: ItemId) -> Outcome {
        let Some(block) = self.block_mut(block_id) else {
            return Outcome::Unchanged;
        };
        let Some(items) = block.items_mut() else {
            return Outcome::Unchanged;
        };
        let Some(index) = items.iter().position(|item| item.id == item_id) else {
            return Outcome::Unchanged;
        };
        if items.len() > 1 {
            items.remove(index);
        } else {
            block.block_type = BlockType::Paragraph;
            block.content = BlockContent::Text(String::new());
        }
        Outcome::Changed
    }

    fn set_item(
        &mut self,
        block_id: BlockId,
        item_id: ItemId,
        content: String,
        checked: Option<bool>,
    ) -> Outcome {
        let Some(block) = self.block_mut(block_id) else {
            return Outcome::Unchanged;
        };
        let is_check_list = block.block_type == BlockType::CheckList;
        let Some(item) = block
            .items_mut()
            .and_then(|items| items.iter_mut().find(|item| item.id == item_id))
        else {
            return Outcome::Unchanged;
        };

        let checked = if is_check_list {
            checked.or(item.checked)
        } else {
            item.checked
        };
        if item.content == content && item.checked == checked {
            return Outcome::Unchanged;
        }
        item.content = content;
        item.checked = checked;
        Outcome::Changed
    }
}
