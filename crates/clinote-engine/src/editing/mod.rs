/*!
 * # Editing Core Module
 *
 * Everything that changes a note while it is open.
 *
 * ## Architecture Overview
 *
 * ### 1. Single Source of Truth: the block sequence
 * - A [`BlockEditor`] owns the note as an ordered `Vec<Block>`
 * - The initial text is parsed once; after that the blocks are authoritative
 * - Text is regenerated from the blocks after every change, never patched
 *
 * ### 2. Command-Based Editing
 * - All edits are [`Cmd`] values applied through `BlockEditor::apply`
 * - Each application returns a [`Patch`] saying whether anything changed and
 *   which node was created
 * - Unknown ids are no-ops; nothing in this module returns an error
 *
 * ### 3. Change Emission
 * - Every command that changed the blocks re-serializes the whole note and
 *   passes the text to the registered change callback
 * - Saving, debouncing and retries belong to whoever registered the callback
 *
 * ### 4. Focus and Navigation
 * - [`FocusController`] maps Enter / Backspace / arrow keys to commands and
 *   decides which node receives focus next
 * - Focus on a freshly created node is a one-shot [`FocusRequest`] consumed by
 *   the render layer on its next paint
 * - [`FocusRegistry`] maps nodes to whatever handle the render layer focuses
 *
 * ### 5. External Insertion
 * - [`handle_drop`] turns a palette token dropped above or below a block into
 *   an absolute insertion
 *
 * ## Module Structure
 *
 * - **`editor`**: `BlockEditor`, the session state and every edit operation
 * - **`commands`**: the `Cmd` enum
 * - **`patch`**: result metadata for an applied command
 * - **`focus`**: keyboard contract and pending focus requests
 * - **`registry`**: node to focus-handle arena
 * - **`insertion`**: drag-and-drop block insertion
 *
 * ## Usage Pattern
 *
 * ```rust
 * use clinote_engine::editing::*;
 * use clinote_engine::models::NodeRef;
 *
 * let mut editor = BlockEditor::new("- take vitals");
 * let mut focus = FocusController::new();
 *
 * let list = editor.blocks()[0].id;
 * let item = editor.blocks()[0].items().unwrap()[0].id;
 * focus.focus(NodeRef::Item(list, item));
 *
 * // Enter at the end of a non-empty item adds a sibling
 * focus.handle_key(&mut editor, KeyInput::new(Key::Enter, 11));
 *
 * // the render layer applies the deferred focus on its next paint
 * let request = focus.take_pending_focus().unwrap();
 * assert!(matches!(request.target, NodeRef::Item(_, _)));
 * assert_eq!(editor.text(), "- take vitals\n- ");
 * ```
 */

pub mod commands;
pub mod editor;
pub mod focus;
pub mod insertion;
pub mod patch;
pub mod registry;

// Public API re-exports
pub use commands::Cmd;
pub use editor::{BlockEditor, ChangeCallback};
pub use focus::{Caret, FocusController, FocusRequest, Key, KeyInput, KeyOutcome};
pub use insertion::{BlockDrop, DropEdge, handle_drop};
pub use patch::Patch;
pub use registry::FocusRegistry;
