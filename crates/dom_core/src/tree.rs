use crate::mutation::{AttributeMutationKind, Mutation};
use std::fmt;

pub type NodeIndex = u32;

/// Stable handle into a [`Document`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub NodeIndex);

#[derive(Debug)]
pub enum NodeKind {
    Document,
    Element { name: String },
    Text { text: String },
}

#[derive(Debug)]
struct NodeData {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
    attributes: Vec<(String, Option<String>)>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum TreeError {
    UnknownNode(NodeId),
    NotAnElement(NodeId),
    NotAChild { parent: NodeId, child: NodeId },
    CycleDetected { parent: NodeId, child: NodeId },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownNode(id) => write!(f, "unknown node {:?}", id),
            Self::NotAnElement(id) => write!(f, "node {:?} is not an element", id),
            Self::NotAChild { parent, child } => {
                write!(f, "node {:?} is not a child of {:?}", child, parent)
            }
            Self::CycleDetected { parent, child } => {
                write!(f, "inserting {:?} under {:?} would create a cycle", child, parent)
            }
        }
    }
}

impl std::error::Error for TreeError {}

/// Arena document. Structural and attribute mutations are recorded as
/// [`Mutation`] events in insertion order; the engine drains them with
/// [`Document::take_mutations`] and routes them to interested consumers.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: NodeId,
    pending: Vec<Mutation>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            pending: Vec::new(),
        };
        doc.root = doc.push(NodeKind::Document);
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as NodeIndex);
        self.nodes.push(NodeData {
            parent: None,
            children: Vec::new(),
            kind,
            attributes: Vec::new(),
        });
        id
    }

    fn data(&self, id: NodeId) -> Result<&NodeData, TreeError> {
        self.nodes
            .get(id.0 as usize)
            .ok_or(TreeError::UnknownNode(id))
    }

    fn data_mut(&mut self, id: NodeId) -> Result<&mut NodeData, TreeError> {
        self.nodes
            .get_mut(id.0 as usize)
            .ok_or(TreeError::UnknownNode(id))
    }

    fn record(&mut self, mutation: Mutation) {
        log::trace!(target: "dom.mutation", "record {:?}", mutation);
        self.pending.push(mutation);
    }

    /// Drain the pending mutation log, FIFO.
    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.pending)
    }

    // --- Construction ---

    /// Create a detached element.
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.push(NodeKind::Element {
            name: name.to_string(),
        })
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text {
            text: text.to_string(),
        })
    }

    // --- Inspection ---

    pub fn contains(&self, id: NodeId) -> bool {
        (id.0 as usize) < self.nodes.len()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).ok().and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.data(id) {
            Ok(n) => &n.children,
            Err(_) => &[],
        }
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match &self.data(id).ok()?.kind {
            NodeKind::Element { name } => Some(name),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.tag_name(id).is_some()
    }

    pub fn has_tag(&self, id: NodeId, name: &str) -> bool {
        self.tag_name(id).is_some_and(|t| t.eq_ignore_ascii_case(name))
    }

    /// Attribute value, with boolean attributes (present, no value) reported
    /// as the empty string.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        let node = self.data(id).ok()?;
        node.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    /// Concatenated text of the node and its descendants, document order.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Ok(node) = self.data(id) else {
            return;
        };
        if let NodeKind::Text { text } = &node.kind {
            out.push_str(text);
        }
        for &child in &node.children {
            self.collect_text(child, out);
        }
    }

    /// Pre-order descendants of `root`, excluding `root` itself.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk(root, &mut out);
        out
    }

    fn walk(&self, id: NodeId, out: &mut Vec<NodeId>) {
        let Ok(node) = self.data(id) else {
            return;
        };
        for &child in &node.children {
            out.push(child);
            self.walk(child, out);
        }
    }

    /// True when `node` is `root` or one of its descendants.
    pub fn is_in_subtree(&self, node: NodeId, root: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == root {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    // --- Attribute mutation ---

    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: &str,
        value: Option<&str>,
    ) -> Result<(), TreeError> {
        let node = self.data_mut(id)?;
        if !matches!(node.kind, NodeKind::Element { .. }) {
            return Err(TreeError::NotAnElement(id));
        }
        let new_value = value.map(str::to_string);
        let existing = node
            .attributes
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name));
        let kind = match existing {
            Some(index) => {
                if node.attributes[index].1 == new_value {
                    return Ok(());
                }
                node.attributes[index].1 = new_value;
                AttributeMutationKind::Changed
            }
            None => {
                node.attributes.push((name.to_string(), new_value));
                AttributeMutationKind::Added
            }
        };
        self.record(Mutation::Attribute {
            node: id,
            name: name.to_string(),
            kind,
        });
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<(), TreeError> {
        let node = self.data_mut(id)?;
        let before = node.attributes.len();
        node.attributes.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        if node.attributes.len() != before {
            self.record(Mutation::Attribute {
                node: id,
                name: name.to_string(),
                kind: AttributeMutationKind::Removed,
            });
        }
        Ok(())
    }

    // --- Structural mutation ---

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.attach(parent, child, None)
    }

    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: NodeId,
    ) -> Result<(), TreeError> {
        self.attach(parent, child, Some(before))
    }

    fn attach(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: Option<NodeId>,
    ) -> Result<(), TreeError> {
        self.data(parent)?;
        self.data(child)?;
        if self.is_in_subtree(parent, child) {
            return Err(TreeError::CycleDetected { parent, child });
        }
        self.detach(child)?;
        let position = match before {
            Some(anchor) => {
                let siblings = &self.data(parent)?.children;
                siblings
                    .iter()
                    .position(|&c| c == anchor)
                    .ok_or(TreeError::NotAChild {
                        parent,
                        child: anchor,
                    })?
            }
            None => self.data(parent)?.children.len(),
        };
        self.data_mut(parent)?.children.insert(position, child);
        self.data_mut(child)?.parent = Some(parent);
        self.record(Mutation::ChildList { parent });
        Ok(())
    }

    pub fn replace_child(
        &mut self,
        parent: NodeId,
        old: NodeId,
        new: NodeId,
    ) -> Result<(), TreeError> {
        if self.parent(old) != Some(parent) {
            return Err(TreeError::NotAChild { parent, child: old });
        }
        // replacing a node with itself must not go through attach: the
        // detach step would remove the anchor before it is looked up
        if old == new {
            return Ok(());
        }
        self.insert_before(parent, new, old)?;
        self.remove_child(parent, old)
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if self.parent(child) != Some(parent) {
            return Err(TreeError::NotAChild { parent, child });
        }
        self.data_mut(parent)?.children.retain(|&c| c != child);
        self.data_mut(child)?.parent = None;
        self.record(Mutation::ChildList { parent });
        Ok(())
    }

    /// Remove `child` from its current parent, if any. Detaching an already
    /// detached node is a no-op and records nothing.
    pub fn detach(&mut self, child: NodeId) -> Result<(), TreeError> {
        match self.parent(child) {
            Some(parent) => self.remove_child(parent, child),
            None => Ok(()),
        }
    }
}
