use crate::tree::NodeId;

/// How an attribute changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeMutationKind {
    Added,
    Changed,
    Removed,
}

/// One recorded tree mutation.
///
/// Attribute events carry the attribute name so per-collection cache-effect
/// policies can decide relevance without touching the tree. Child-list events
/// only name the parent; consumers that care about structure re-walk the
/// subtree on their next read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mutation {
    Attribute {
        node: NodeId,
        name: String,
        kind: AttributeMutationKind,
    },
    ChildList {
        parent: NodeId,
    },
}
