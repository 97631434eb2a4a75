use std::collections::HashMap;

use crate::editing::{BlockEditor, FocusRequest};
use crate::models::NodeRef;

/// Arena of focusable handles keyed by the node they belong to.
///
/// The render layer registers a handle (a widget reference, a screen
/// position, ...) when it mounts a node's input and unregisters it on
/// unmount. Keys are node ids rather than positions, so reordering or
/// removing blocks never makes a handle point at the wrong node.
#[derive(Debug, Clone)]
pub struct FocusRegistry<H> {
    handles: HashMap<NodeRef, H>,
}

impl<H> Default for FocusRegistry<H> {
    fn default() -> Self {
        Self {
            handles: HashMap::new(),
        }
    }
}

impl<H> FocusRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handle` for `node`, returning the handle it replaces
    pub fn register(&mut self, node: NodeRef, handle: H) -> Option<H> {
        self.handles.insert(node, handle)
    }

    pub fn unregister(&mut self, node: NodeRef) -> Option<H> {
        self.handles.remove(&node)
    }

    pub fn get(&self, node: NodeRef) -> Option<&H> {
        self.handles.get(&node)
    }

    /// The handle that should receive a pending focus request
    pub fn resolve(&self, request: &FocusRequest) -> Option<&H> {
        self.get(request.target)
    }

    /// Drop handles whose nodes are gone from the editor
    pub fn retain_live(&mut self, editor: &BlockEditor) {
        self.handles.retain(|node, _| editor.contains(*node));
    }

    pub fn clear(&mut self) {
        self.handles.clear();
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::Caret;

    #[test]
    fn test_register_and_resolve() {
        let editor = BlockEditor::new("- a\n- b");
        let list = editor.blocks()[0].id;
        let items = editor.blocks()[0].items().unwrap();
        let (a, b) = (items[0].id, items[1].id);

        let mut registry = FocusRegistry::new();
        registry.register(NodeRef::Item(list, a), "input-a");
        registry.register(NodeRef::Item(list, b), "input-b");

        let request = FocusRequest {
            target: NodeRef::Item(list, b),
            caret: Caret::Start,
        };
        assert_eq!(registry.resolve(&request), Some(&"input-b"));
        assert_eq!(registry.unregister(NodeRef::Item(list, a)), Some("input-a"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_handles_follow_nodes_across_reorder() {
        let mut editor = BlockEditor::new("one\n\ntwo");
        let one = editor.blocks()[0].id;
        let two = editor.blocks()[1].id;
        let mut registry = FocusRegistry::new();
        registry.register(NodeRef::Block(one), 1);
        registry.register(NodeRef::Block(two), 2);

        editor.reorder_blocks(vec![two, one]);

        assert_eq!(registry.get(NodeRef::Block(one)), Some(&1));
        assert_eq!(registry.get(NodeRef::Block(two)), Some(&2));
    }

    #[test]
    fn test_retain_live_drops_removed_nodes() {
        let mut editor = BlockEditor::new("one\n\ntwo");
        let one = editor.blocks()[0].id;
        let two = editor.blocks()[1].id;
        let mut registry = FocusRegistry::new();
        registry.register(NodeRef::Block(one), ());
        registry.register(NodeRef::Block(two), ());

        editor.remove_block(one);
        registry.retain_live(&editor);

        assert!(registry.get(NodeRef::Block(one)).is_none());
        assert_eq!(registry.len(), 1);
    }
}
