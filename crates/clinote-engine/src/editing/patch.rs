use crate::models::NodeRef;

/// Result of applying a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Whether the block sequence changed (and a change was emitted)
    pub changed: bool,
    /// The block or item the command created, for focus placement
    pub created: Option<NodeRef>,
    pub version: u64,
}
