use crate::editing::BlockEditor;
use crate::models::{Block, BlockId, BlockType, ItemId, NodeRef};

/// Keys the controller has an opinion about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Backspace,
    ArrowUp,
    ArrowDown,
}

/// A keystroke as seen by the input element that received it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    /// Caret position in chars within the focused text
    pub caret: usize,
    /// Shift, Ctrl, Alt or Meta held down
    pub modifier: bool,
}

impl KeyInput {
    pub fn new(key: Key, caret: usize) -> Self {
        Self {
            key,
            caret,
            modifier: false,
        }
    }

    pub fn with_modifier(self) -> Self {
        Self {
            modifier: true,
            ..self
        }
    }
}

/// Whether the controller consumed a keystroke.
///
/// `Handled` means the render layer must suppress the key's default
/// behaviour; `Ignored` means it should let the input element handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    Ignored,
}

/// Where the caret goes when a node receives focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caret {
    Start,
    End,
}

/// A focus assignment waiting for the render layer.
///
/// A node created by a command has no input element until the next render,
/// so the controller records the request and the render layer consumes it
/// with [`FocusController::take_pending_focus`] on its next paint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusRequest {
    pub target: NodeRef,
    pub caret: Caret,
}

/// Tracks which node owns input focus and turns keystrokes into engine
/// operations.
///
/// The controller holds no note content. Every decision reads the current
/// state from the [`BlockEditor`] and every change goes through it; the
/// controller only decides which operation to call and where focus lands
/// afterwards.
///
/// ## Keyboard contract
///
/// - **Enter** in a scalar block adds a paragraph after it. In a list item it
///   adds a sibling item, unless the item is the last one and empty, which
///   exits the list.
/// - **Backspace** on an empty scalar block removes it and focuses the block
///   before it. On an empty list item it removes the item, or exits the list
///   when it is the only one.
/// - **ArrowUp** at caret 0 and **ArrowDown** at the end of the text move to
///   the neighbouring item, then across the block boundary.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FocusController {
    focused: Option<NodeRef>,
    pending: Option<FocusRequest>,
}

impl FocusController {
    pub fn new() -> Self {
        Self::default()
    }

    /// The node currently holding focus
    pub fn focused(&self) -> Option<NodeRef> {
        self.focused
    }

    /// Record that the user focused `target` (click, tab, ...)
    pub fn focus(&mut self, target: NodeRef) {
        self.focused = Some(target);
    }

    pub fn blur(&mut self) {
        self.focused = None;
    }

    /// Ask the render layer to focus `target` on its next paint
    pub fn request_focus(&mut self, target: NodeRef, caret: Caret) {
        log::trace!("Focus requested: {target:?} at {caret:?}");
        self.pending = Some(FocusRequest { target, caret });
    }

    pub fn pending_focus(&self) -> Option<FocusRequest> {
        self.pending
    }

    /// Consume the pending request; the target becomes the focused node
    pub fn take_pending_focus(&mut self) -> Option<FocusRequest> {
        let request = self.pending.take()?;
        self.focused = Some(request.target);
        Some(request)
    }

    /// Forget focus state that points at nodes which no longer exist
    pub fn sync(&mut self, editor: &BlockEditor) {
        if self.focused.is_some_and(|node| !editor.contains(node)) {
            self.focused = None;
        }
        if self
            .pending
            .is_some_and(|request| !editor.contains(request.target))
        {
            self.pending = None;
        }
    }

    /// Handle a keystroke delivered to the focused node
    pub fn handle_key(&mut self, editor: &mut BlockEditor, input: KeyInput) -> KeyOutcome {
        let Some(node) = self.focused else {
            return KeyOutcome::Ignored;
        };
        let Some(text) = editor.node_text(node) else {
            return KeyOutcome::Ignored;
        };
        let is_empty = text.is_empty();
        let at_end = input.caret >= text.chars().count();

        match (input.key, node) {
            (Key::Enter, _) if input.modifier => KeyOutcome::Ignored,
            (Key::Enter, NodeRef::Block(block)) => {
                let created = editor.add_block(block, BlockType::Paragraph);
                self.request_focus(NodeRef::Block(created), Caret::Start);
                KeyOutcome::Handled
            }
            (Key::Enter, NodeRef::Item(block, item)) => {
                self.enter_in_item(editor, block, item, is_empty)
            }
            (Key::Backspace, _) if !is_empty => KeyOutcome::Ignored,
            (Key::Backspace, NodeRef::Block(block)) => self.remove_empty_block(editor, block),
            (Key::Backspace, NodeRef::Item(block, item)) => {
                self.remove_empty_item(editor, block, item)
            }
            (Key::ArrowUp, _) if input.caret == 0 => self.move_vertically(editor, node, true),
            (Key::ArrowDown, _) if at_end => self.move_vertically(editor, node, false),
            _ => KeyOutcome::Ignored,
        }
    }

    fn enter_in_item(
        &mut self,
        editor: &mut BlockEditor,
        block_id: BlockId,
        item_id: ItemId,
        is_empty: bool,
    ) -> KeyOutcome {
        let Some(block) = editor.block(block_id) else {
            return KeyOutcome::Ignored;
        };
        let is_last = block.last_item().is_some_and(|last| last.id == item_id);

        if is_empty && is_last {
            self.exit_list(editor, block_id, item_id);
        } else if let Some(created) = editor.add_list_item(block_id, item_id) {
            self.request_focus(NodeRef::Item(block_id, created), Caret::Start);
        }
        KeyOutcome::Handled
    }

    /// Leave a list from its empty trailing item.
    ///
    /// A multi-item list loses the empty item and gains a paragraph after it;
    /// a single-item list becomes that paragraph in place.
    fn exit_list(&mut self, editor: &mut BlockEditor, block_id: BlockId, item_id: ItemId) {
        let item_count = editor
            .block(block_id)
            .and_then(Block::items)
            .map_or(0, <[_]>::len);

        if item_count > 1 {
            editor.remove_list_item(block_id, item_id);
            let paragraph = editor.add_block(block_id, BlockType::Paragraph);
            self.request_focus(NodeRef::Block(paragraph), Caret::Start);
        } else {
            editor.change_block_type(block_id, BlockType::Paragraph);
            self.request_focus(NodeRef::Block(block_id), Caret::Start);
        }
    }

    fn remove_empty_block(&mut self, editor: &mut BlockEditor, block_id: BlockId) -> KeyOutcome {
        let Some(index) = editor.index_of(block_id) else {
            return KeyOutcome::Ignored;
        };
        let previous = index.checked_sub(1).map(|i| editor.blocks()[i].id);

        let patch = editor.remove_block(block_id);

        let request = match (patch.created, previous) {
            (Some(replacement), _) => Some(FocusRequest {
                target: replacement,
                caret: Caret::Start,
            }),
            (None, Some(previous)) => editor.block(previous).map(|block| FocusRequest {
                target: NodeRef::entering(block, false),
                caret: Caret::End,
            }),
            (None, None) => editor.blocks().first().map(|block| FocusRequest {
                target: NodeRef::entering(block, true),
                caret: Caret::Start,
            }),
        };
        if let Some(request) = request {
            self.request_focus(request.target, request.caret);
        }
        KeyOutcome::Handled
    }

    fn remove_empty_item(
        &mut self,
        editor: &mut BlockEditor,
        block_id: BlockId,
        item_id: ItemId,
    ) -> KeyOutcome {
        let Some(block) = editor.block(block_id) else {
            return KeyOutcome::Ignored;
        };
        let items = block.items().unwrap_or_default();
        let Some(index) = block.item_index(item_id) else {
            return KeyOutcome::Ignored;
        };

        if items.len() == 1 {
            self.exit_list(editor, block_id, item_id);
            return KeyOutcome::Handled;
        }

        let (neighbour, caret) = match index.checked_sub(1) {
            Some(previous) => (items[previous].id, Caret::End),
            None => (items[1].id, Caret::Start),
        };
        editor.remove_list_item(block_id, item_id);
        self.request_focus(NodeRef::Item(block_id, neighbour), caret);
        KeyOutcome::Handled
    }

    fn move_vertically(&mut self, editor: &BlockEditor, node: NodeRef, up: bool) -> KeyOutcome {
        let Some(index) = editor.index_of(node.block_id()) else {
            return KeyOutcome::Ignored;
        };
        let block = &editor.blocks()[index];
        let caret = if up { Caret::End } else { Caret::Start };

        if let NodeRef::Item(block_id, item_id) = node
            && let Some(position) = block.item_index(item_id)
        {
            let items = block.items().unwrap_or_default();
            let sibling = if up {
                position.checked_sub(1)
            } else {
                Some(position + 1).filter(|next| *next < items.len())
            };
            if let Some(sibling) = sibling {
                self.request_focus(NodeRef::Item(block_id, items[sibling].id), caret);
                return KeyOutcome::Handled;
            }
        }

        let neighbour = if up {
            index.checked_sub(1)
        } else {
            Some(index + 1)
        };
        let Some(neighbour) = neighbour.and_then(|i| editor.blocks().get(i)) else {
            return KeyOutcome::Ignored;
        };
        self.request_focus(NodeRef::entering(neighbour, !up), caret);
        KeyOutcome::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn block_at(editor: &BlockEditor, index: usize) -> BlockId {
        editor.blocks()[index].id
    }

    fn item_at(editor: &BlockEditor, block: usize, item: usize) -> ItemId {
        editor.blocks()[block].items().unwrap()[item].id
    }

    fn focused_on(node: NodeRef) -> FocusController {
        let mut focus = FocusController::new();
        focus.focus(node);
        focus
    }

    fn press(
        focus: &mut FocusController,
        editor: &mut BlockEditor,
        key: Key,
        caret: usize,
    ) -> KeyOutcome {
        let outcome = focus.handle_key(editor, KeyInput::new(key, caret));
        focus.take_pending_focus();
        outcome
    }

    #[test]
    fn test_nothing_focused_ignores_keys() {
        let mut editor = BlockEditor::new("a");
        let mut focus = FocusController::new();
        assert_eq!(
            focus.handle_key(&mut editor, KeyInput::new(Key::Enter, 0)),
            KeyOutcome::Ignored
        );
        assert_eq!(editor.len(), 1);
    }

    #[test]
    fn test_enter_in_scalar_block_adds_paragraph_and_defers_focus() {
        let mut editor = BlockEditor::new("# Title");
        let title = block_at(&editor, 0);
        let mut focus = focused_on(NodeRef::Block(title));

        let outcome = focus.handle_key(&mut editor, KeyInput::new(Key::Enter, 5));

        assert_eq!(outcome, KeyOutcome::Handled);
        let created = block_at(&editor, 1);
        assert_eq!(editor.blocks()[1].block_type, BlockType::Paragraph);
        // focus moves only once the render layer consumes the request
        assert_eq!(focus.focused(), Some(NodeRef::Block(title)));
        assert_eq!(
            focus.take_pending_focus(),
            Some(FocusRequest {
                target: NodeRef::Block(created),
                caret: Caret::Start
            })
        );
        assert_eq!(focus.focused(), Some(NodeRef::Block(created)));
        assert_eq!(focus.take_pending_focus(), None);
    }

    #[test]
    fn test_enter_with_modifier_is_left_to_the_input() {
        let mut editor = BlockEditor::new("a");
        let mut focus = focused_on(NodeRef::Block(block_at(&editor, 0)));
        let outcome = focus.handle_key(&mut editor, KeyInput::new(Key::Enter, 1).with_modifier());
        assert_eq!(outcome, KeyOutcome::Ignored);
        assert_eq!(editor.len(), 1);
    }

    #[test]
    fn test_enter_in_non_empty_item_adds_sibling() {
        let mut editor = BlockEditor::new("- a");
        let list = block_at(&editor, 0);
        let a = item_at(&editor, 0, 0);
        let mut focus = focused_on(NodeRef::Item(list, a));

        press(&mut focus, &mut editor, Key::Enter, 1);

        let created = item_at(&editor, 0, 1);
        assert_eq!(focus.focused(), Some(NodeRef::Item(list, created)));
        assert_eq!(editor.text(), "- a\n- ");
    }

    #[test]
    fn test_enter_in_empty_middle_item_still_adds_sibling() {
        let mut editor = BlockEditor::new("- a\n- b");
        let list = block_at(&editor, 0);
        let a = item_at(&editor, 0, 0);
        editor.update_list_item(list, a, "", None);
        let mut focus = focused_on(NodeRef::Item(list, a));

        press(&mut focus, &mut editor, Key::Enter, 0);

        assert_eq!(editor.blocks()[0].items().unwrap().len(), 3);
        assert_eq!(editor.len(), 1);
    }

    #[test]
    fn test_enter_on_empty_last_item_exits_list() {
        let mut editor = BlockEditor::new("- a");
        let list = block_at(&editor, 0);
        let a = item_at(&editor, 0, 0);
        let empty = editor.add_list_item(list, a).unwrap();
        let mut focus = focused_on(NodeRef::Item(list, empty));

        press(&mut focus, &mut editor, Key::Enter, 0);

        assert_eq!(editor.len(), 2);
        assert_eq!(editor.blocks()[0].items().unwrap().len(), 1);
        let paragraph = block_at(&editor, 1);
        assert_eq!(editor.blocks()[1].block_type, BlockType::Paragraph);
        assert_eq!(focus.focused(), Some(NodeRef::Block(paragraph)));
        assert_eq!(editor.text(), "- a\n\n");
    }

    #[test]
    fn test_enter_on_sole_empty_item_converts_block_in_place() {
        let mut editor = BlockEditor::new("intro\n\n- ");
        let list = block_at(&editor, 1);
        let only = item_at(&editor, 1, 0);
        let mut focus = focused_on(NodeRef::Item(list, only));

        press(&mut focus, &mut editor, Key::Enter, 0);

        assert_eq!(editor.len(), 2);
        assert_eq!(editor.blocks()[1].block_type, BlockType::Paragraph);
        assert_eq!(editor.blocks()[1].id, list);
        assert_eq!(focus.focused(), Some(NodeRef::Block(list)));
    }

    #[test]
    fn test_backspace_on_non_empty_text_is_ignored() {
        let mut editor = BlockEditor::new("a\n\nb");
        let mut focus = focused_on(NodeRef::Block(block_at(&editor, 1)));
        assert_eq!(press(&mut focus, &mut editor, Key::Backspace, 0), KeyOutcome::Ignored);
        assert_eq!(editor.len(), 2);
    }

    #[test]
    fn test_backspace_on_empty_block_focuses_previous_list_end() {
        let mut editor = BlockEditor::new("- a\n- b");
        let list = block_at(&editor, 0);
        let empty = editor.add_block(list, BlockType::Paragraph);
        let mut focus = focused_on(NodeRef::Block(empty));

        let outcome = focus.handle_key(&mut editor, KeyInput::new(Key::Backspace, 0));

        assert_eq!(outcome, KeyOutcome::Handled);
        assert_eq!(editor.len(), 1);
        let b = item_at(&editor, 0, 1);
        assert_eq!(
            focus.take_pending_focus(),
            Some(FocusRequest {
                target: NodeRef::Item(list, b),
                caret: Caret::End
            })
        );
    }

    #[test]
    fn test_backspace_on_empty_first_block_focuses_new_first() {
        let mut editor = BlockEditor::new("a");
        let a = block_at(&editor, 0);
        let empty = editor.insert_block_at(0, BlockType::Heading1);
        let mut focus = focused_on(NodeRef::Block(empty));

        press(&mut focus, &mut editor, Key::Backspace, 0);

        assert_eq!(focus.focused(), Some(NodeRef::Block(a)));
    }

    #[test]
    fn test_backspace_on_sole_empty_block_keeps_one_paragraph() {
        let mut editor = BlockEditor::new("");
        let mut focus = focused_on(NodeRef::Block(block_at(&editor, 0)));

        press(&mut focus, &mut editor, Key::Backspace, 0);

        assert_eq!(editor.len(), 1);
        assert_eq!(focus.focused(), Some(NodeRef::Block(block_at(&editor, 0))));
    }

    #[test]
    fn test_backspace_on_empty_item_focuses_previous_item() {
        let mut editor = BlockEditor::new("- a\n- b");
        let list = block_at(&editor, 0);
        let a = item_at(&editor, 0, 0);
        let b = item_at(&editor, 0, 1);
        editor.update_list_item(list, b, "", None);
        let mut focus = focused_on(NodeRef::Item(list, b));

        press(&mut focus, &mut editor, Key::Backspace, 0);

        assert_eq!(editor.text(), "- a");
        assert_eq!(focus.focused(), Some(NodeRef::Item(list, a)));
    }

    #[test]
    fn test_backspace_on_empty_first_item_focuses_next_item() {
        let mut editor = BlockEditor::new("- a\n- b");
        let list = block_at(&editor, 0);
        let a = item_at(&editor, 0, 0);
        let b = item_at(&editor, 0, 1);
        editor.update_list_item(list, a, "", None);
        let mut focus = focused_on(NodeRef::Item(list, a));

        press(&mut focus, &mut editor, Key::Backspace, 0);

        assert_eq!(editor.text(), "- b");
        assert_eq!(focus.focused(), Some(NodeRef::Item(list, b)));
    }

    #[test]
    fn test_backspace_on_sole_empty_item_exits_list() {
        let mut editor = BlockEditor::new("- [ ] ");
        let list = block_at(&editor, 0);
        let only = item_at(&editor, 0, 0);
        let mut focus = focused_on(NodeRef::Item(list, only));

        press(&mut focus, &mut editor, Key::Backspace, 0);

        assert_eq!(editor.blocks()[0].block_type, BlockType::Paragraph);
        assert_eq!(focus.focused(), Some(NodeRef::Block(list)));
    }

    #[test]
    fn test_arrow_keys_walk_items_then_blocks() {
        let mut editor = BlockEditor::new("top\n\n- a\n- b\n\nbottom");
        let top = block_at(&editor, 0);
        let list = block_at(&editor, 1);
        let bottom = block_at(&editor, 2);
        let a = item_at(&editor, 1, 0);
        let b = item_at(&editor, 1, 1);
        let mut focus = focused_on(NodeRef::Block(top));

        let mut walk = |focus: &mut FocusController, key, caret| {
            press(focus, &mut editor, key, caret);
            focus.focused()
        };

        assert_eq!(walk(&mut focus, Key::ArrowDown, 3), Some(NodeRef::Item(list, a)));
        assert_eq!(walk(&mut focus, Key::ArrowDown, 1), Some(NodeRef::Item(list, b)));
        assert_eq!(walk(&mut focus, Key::ArrowDown, 1), Some(NodeRef::Block(bottom)));
        assert_eq!(walk(&mut focus, Key::ArrowUp, 0), Some(NodeRef::Item(list, b)));
        assert_eq!(walk(&mut focus, Key::ArrowUp, 0), Some(NodeRef::Item(list, a)));
        assert_eq!(walk(&mut focus, Key::ArrowUp, 0), Some(NodeRef::Block(top)));
    }

    #[test]
    fn test_arrow_up_into_list_lands_on_last_item_at_end() {
        let mut editor = BlockEditor::new("- a\n- b\n\nafter");
        let list = block_at(&editor, 0);
        let b = item_at(&editor, 0, 1);
        let mut focus = focused_on(NodeRef::Block(block_at(&editor, 1)));

        focus.handle_key(&mut editor, KeyInput::new(Key::ArrowUp, 0));

        assert_eq!(
            focus.pending_focus(),
            Some(FocusRequest {
                target: NodeRef::Item(list, b),
                caret: Caret::End
            })
        );
    }

    #[test]
    fn test_arrows_away_from_edges_are_ignored() {
        let mut editor = BlockEditor::new("first\n\nsecond");
        let mut focus = focused_on(NodeRef::Block(block_at(&editor, 0)));

        assert_eq!(press(&mut focus, &mut editor, Key::ArrowDown, 2), KeyOutcome::Ignored);
        assert_eq!(press(&mut focus, &mut editor, Key::ArrowUp, 0), KeyOutcome::Ignored);
        assert_eq!(focus.focused(), Some(NodeRef::Block(block_at(&editor, 0))));
    }

    #[test]
    fn test_arrow_down_at_end_counts_chars_not_bytes() {
        let mut editor = BlockEditor::new("café\n\nnext");
        let next = block_at(&editor, 1);
        let mut focus = focused_on(NodeRef::Block(block_at(&editor, 0)));

        press(&mut focus, &mut editor, Key::ArrowDown, 4);

        assert_eq!(focus.focused(), Some(NodeRef::Block(next)));
    }

    #[test]
    fn test_sync_drops_stale_focus() {
        let mut editor = BlockEditor::new("a\n\nb");
        let b = block_at(&editor, 1);
        let mut focus = focused_on(NodeRef::Block(b));
        focus.request_focus(NodeRef::Block(b), Caret::End);

        editor.remove_block(b);
        focus.sync(&editor);

        assert_eq!(focus.focused(), None);
        assert_eq!(focus.pending_focus(), None);
    }
}
