use crate::saver::DebouncedSaver;
use clinote_engine::parsing::serialize::{item_prefix, scalar_prefix};
use clinote_engine::{
    BlockContent, BlockDrop, BlockEditor, BlockType, Caret, DropEdge, FocusController,
    FocusRegistry, IdProvider, Key, KeyInput, KeyOutcome, NodeRef, handle_drop,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

/// One screen row of the laid-out note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// The block or item shown on this row; `None` for the gap between blocks
    pub node: Option<NodeRef>,
    pub block_type: BlockType,
    pub marker: String,
    pub text: String,
}

impl Row {
    fn spacer() -> Self {
        Self {
            node: None,
            block_type: BlockType::Paragraph,
            marker: String::new(),
            text: String::new(),
        }
    }
}

/// Terminal editing session for one note.
///
/// The app is a thin adapter: the engine owns the blocks, the focus
/// controller owns the keyboard contract, and the app only tracks the caret
/// and which screen row each node landed on.
pub struct App {
    editor: BlockEditor,
    focus: FocusController,
    /// Screen row of every mounted node, rebuilt on each layout
    mounted: FocusRegistry<usize>,
    /// Caret position in chars within the focused text
    caret: usize,
    scroll: usize,
    saver: Rc<RefCell<DebouncedSaver>>,
    status: String,
    should_quit: bool,
}

impl App {
    pub fn new(
        text: &str,
        ids: impl IdProvider + 'static,
        saver: Rc<RefCell<DebouncedSaver>>,
    ) -> Self {
        let mut editor = BlockEditor::with_ids(text, ids);
        let sink = Rc::clone(&saver);
        editor.on_change(move |text| sink.borrow_mut().schedule(text));

        let mut focus = FocusController::new();
        if let Some(first) = editor.blocks().first() {
            focus.request_focus(NodeRef::entering(first, true), Caret::Start);
        }

        Self {
            editor,
            focus,
            mounted: FocusRegistry::new(),
            caret: 0,
            scroll: 0,
            saver,
            status: String::new(),
            should_quit: false,
        }
    }

    pub fn editor(&self) -> &BlockEditor {
        &self.editor
    }

    pub fn focused(&self) -> Option<NodeRef> {
        self.focus.focused()
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Row the focused node sits on, as of the last layout
    pub fn focused_row(&self) -> Option<usize> {
        self.focus
            .focused()
            .and_then(|node| self.mounted.get(node).copied())
    }

    /// Lay the note out for a viewport `height` rows tall.
    ///
    /// Registers every node's row, then settles any pending focus request
    /// now that its target has somewhere to land.
    pub fn layout(&mut self, height: usize) -> Vec<Row> {
        let rows = self.build_rows();
        self.settle_focus();

        if let Some(row) = self.focused_row() {
            let height = height.max(1);
            if row < self.scroll {
                self.scroll = row;
            } else if row >= self.scroll + height {
                self.scroll = row + 1 - height;
            }
        }
        self.scroll = self.scroll.min(rows.len().saturating_sub(1));
        rows
    }

    fn build_rows(&mut self) -> Vec<Row> {
        self.mounted.clear();
        let mut rows = Vec::new();

        for (index, block) in self.editor.blocks().iter().enumerate() {
            if index > 0 {
                rows.push(Row::spacer());
            }
            match &block.content {
                BlockContent::Text(text) => {
                    let node = NodeRef::Block(block.id);
                    self.mounted.register(node, rows.len());
                    rows.push(Row {
                        node: Some(node),
                        block_type: block.block_type,
                        marker: scalar_prefix(block.block_type).to_string(),
                        text: text.clone(),
                    });
                }
                BlockContent::Items(items) => {
                    for (position, item) in items.iter().enumerate() {
                        let node = NodeRef::Item(block.id, item.id);
                        self.mounted.register(node, rows.len());
                        rows.push(Row {
                            node: Some(node),
                            block_type: block.block_type,
                            marker: item_prefix(block.block_type, position, item),
                            text: item.content.clone(),
                        });
                    }
                }
            }
        }
        rows
    }

    fn settle_focus(&mut self) {
        self.focus.sync(&self.editor);

        if let Some(request) = self.focus.pending_focus()
            && self.mounted.resolve(&request).is_some()
        {
            self.focus.take_pending_focus();
            self.caret = match request.caret {
                Caret::Start => 0,
                Caret::End => self.focused_len(),
            };
        }

        if self.focus.focused().is_none()
            && let Some(first) = self.editor.blocks().first()
        {
            self.focus.focus(NodeRef::entering(first, true));
            self.caret = 0;
        }
        self.caret = self.caret.min(self.focused_len());
    }

    fn focused_text(&self) -> Option<&str> {
        self.focus
            .focused()
            .and_then(|node| self.editor.node_text(node))
    }

    fn focused_len(&self) -> usize {
        self.focused_text().map_or(0, |text| text.chars().count())
    }

    pub fn handle_key_event(&mut self, event: KeyEvent) {
        let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
        let alt = event.modifiers.contains(KeyModifiers::ALT);

        match event.code {
            KeyCode::Esc => self.quit(),
            KeyCode::Char('q') if ctrl => self.quit(),
            KeyCode::Char('s') if ctrl => self.save_now(),
            KeyCode::Char('t') if ctrl => self.cycle_block_type(),
            KeyCode::Char('x') if ctrl => self.toggle_checked(),
            KeyCode::Char('d') if ctrl => self.remove_focused_block(),
            KeyCode::Char(digit @ '1'..='7') if alt => self.insert_from_palette(digit),
            KeyCode::Up if alt => self.move_focused_block(true),
            KeyCode::Down if alt => self.move_focused_block(false),
            KeyCode::Char(c) if !ctrl && !alt => self.insert_char(c),
            KeyCode::Enter => {
                let shifted = event.modifiers.contains(KeyModifiers::SHIFT);
                self.controller_key(Key::Enter, shifted || ctrl || alt);
            }
            KeyCode::Backspace => {
                if self.controller_key(Key::Backspace, false) == KeyOutcome::Ignored {
                    self.delete_before_caret();
                }
            }
            KeyCode::Delete => self.delete_at_caret(),
            KeyCode::Up => {
                if self.controller_key(Key::ArrowUp, false) == KeyOutcome::Ignored {
                    self.caret = 0;
                }
            }
            KeyCode::Down => {
                if self.controller_key(Key::ArrowDown, false) == KeyOutcome::Ignored {
                    self.caret = self.focused_len();
                }
            }
            KeyCode::Left => self.caret = self.caret.saturating_sub(1),
            KeyCode::Right => self.caret = (self.caret + 1).min(self.focused_len()),
            KeyCode::Home => self.caret = 0,
            KeyCode::End => self.caret = self.focused_len(),
            _ => {}
        }
    }

    fn controller_key(&mut self, key: Key, modifier: bool) -> KeyOutcome {
        let input = KeyInput::new(key, self.caret);
        let input = if modifier { input.with_modifier() } else { input };
        let outcome = self.focus.handle_key(&mut self.editor, input);
        self.settle_focus();
        outcome
    }

    fn insert_char(&mut self, c: char) {
        let Some(text) = self.focused_text() else {
            return;
        };
        let mut text = text.to_string();
        text.insert(byte_offset(&text, self.caret), c);
        self.set_focused_text(text);
        self.caret += 1;
    }

    fn delete_before_caret(&mut self) {
        if self.caret == 0 {
            return;
        }
        self.caret -= 1;
        self.delete_at_caret();
    }

    fn delete_at_caret(&mut self) {
        let Some(text) = self.focused_text() else {
            return;
        };
        if self.caret >= text.chars().count() {
            return;
        }
        let mut text = text.to_string();
        text.remove(byte_offset(&text, self.caret));
        self.set_focused_text(text);
    }

    fn set_focused_text(&mut self, text: String) {
        match self.focus.focused() {
            Some(NodeRef::Block(block)) => {
                self.editor.update_block(block, text);
            }
            Some(NodeRef::Item(block, item)) => {
                self.editor.update_list_item(block, item, text, None);
            }
            None => {}
        }
    }

    fn cycle_block_type(&mut self) {
        let Some(node) = self.focus.focused() else {
            return;
        };
        let id = node.block_id();
        let Some(next) = self.editor.block(id).map(|block| block.block_type.next()) else {
            return;
        };
        self.editor.change_block_type(id, next);

        if !self.editor.contains(node)
            && let Some(block) = self.editor.block(id)
        {
            self.focus
                .request_focus(NodeRef::entering(block, true), Caret::End);
        }
        self.settle_focus();
        self.status = format!("Block type: {}", next.label());
    }

    fn toggle_checked(&mut self) {
        let Some(NodeRef::Item(block, item)) = self.focus.focused() else {
            return;
        };
        let Some(current) = self
            .editor
            .block(block)
            .filter(|b| b.block_type == BlockType::CheckList)
            .and_then(|b| b.item(item))
            .cloned()
        else {
            return;
        };
        let checked = !current.is_checked();
        self.editor
            .update_list_item(block, item, current.content, Some(checked));
    }

    fn remove_focused_block(&mut self) {
        let Some(node) = self.focus.focused() else {
            return;
        };
        let id = node.block_id();
        let Some(index) = self.editor.index_of(id) else {
            return;
        };
        let patch = self.editor.remove_block(id);

        let target = match patch.created {
            Some(created) => Some(created),
            None => {
                let index = index.min(self.editor.len().saturating_sub(1));
                self.editor
                    .blocks()
                    .get(index)
                    .map(|block| NodeRef::entering(block, true))
            }
        };
        if let Some(target) = target {
            self.focus.request_focus(target, Caret::Start);
        }
        self.settle_focus();
    }

    fn move_focused_block(&mut self, up: bool) {
        let Some(id) = self.focus.focused().map(NodeRef::block_id) else {
            return;
        };
        let Some(index) = self.editor.index_of(id) else {
            return;
        };
        let to = if up {
            let Some(to) = index.checked_sub(1) else {
                return;
            };
            to
        } else {
            index + 1
        };
        if to < self.editor.len() {
            self.editor.move_block(id, to);
        }
    }

    /// Insert a palette block below the focused one, as if its token were
    /// dropped on the bottom half of the focused block
    fn insert_from_palette(&mut self, digit: char) {
        let Some(block_type) = digit
            .to_digit(10)
            .and_then(|n| BlockType::ALL.get(n as usize - 1))
            .copied()
        else {
            return;
        };
        let target_index = self
            .focus
            .focused()
            .and_then(|node| self.editor.index_of(node.block_id()))
            .unwrap_or(self.editor.len().saturating_sub(1));

        handle_drop(
            &mut self.editor,
            &mut self.focus,
            BlockDrop {
                token: block_type.token(),
                target_index,
                edge: DropEdge::Bottom,
            },
        );
        self.settle_focus();
        self.status = format!("Inserted {}", block_type.label());
    }

    fn save_now(&mut self) {
        let result = self.saver.borrow_mut().flush();
        self.status = match result {
            Ok(true) => "Saved".to_string(),
            Ok(false) => "No changes to save".to_string(),
            Err(e) => format!("Save failed: {e}"),
        };
    }

    /// Run the debounced write if it is due
    pub fn tick(&mut self, now: Instant) {
        let result = self.saver.borrow_mut().save_if_due(now);
        match result {
            Ok(true) => self.status = "Saved".to_string(),
            Ok(false) => {}
            Err(e) => self.status = format!("Save failed: {e}"),
        }
    }

    fn quit(&mut self) {
        self.should_quit = true;
    }
}

/// Byte offset of the char at `caret`, or the end of `text`
fn byte_offset(text: &str, caret: usize) -> usize {
    text.char_indices()
        .nth(caret)
        .map_or(text.len(), |(offset, _)| offset)
}
