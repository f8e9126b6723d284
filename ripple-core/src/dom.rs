//! In-memory retained element tree.
//!
//! [`Document`] is a small stand-in for a browser DOM: elements with tags,
//! class lists, ordered inline styles and parent/child links. It implements
//! [`Surface`], counts every mutation, and serializes to JSON, which makes it
//! the surface of choice for tests and headless simulation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Rect, RippleError, RippleResult, Surface, TouchSupport};

/// Unique identifier for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Create a new unique node ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One element of the tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier.
    pub id: NodeId,
    /// Element tag name.
    pub tag: String,
    /// Class list, in insertion order.
    pub classes: Vec<String>,
    /// Inline style declarations, in first-set order.
    pub style: Vec<(String, String)>,
    /// Parent node, if attached.
    pub parent: Option<NodeId>,
    /// Child nodes, in document order.
    pub children: Vec<NodeId>,
    /// Layout box in client coordinates, if the node has been laid out.
    pub bounds: Option<Rect>,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            id: NodeId::new(),
            tag: tag.to_string(),
            classes: Vec::new(),
            style: Vec::new(),
            parent: None,
            children: Vec::new(),
            bounds: None,
        }
    }

    /// Get an inline style value.
    #[must_use]
    pub fn style_value(&self, property: &str) -> Option<&str> {
        self.style
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    /// Check whether the node carries a class.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// An in-memory element tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// All nodes, attached or not, indexed by ID.
    nodes: HashMap<NodeId, Node>,
    /// Top-level nodes (hosts).
    roots: Vec<NodeId>,
    /// Touch capabilities this document reports.
    pub touch: TouchSupport,
    /// Number of mutations applied so far.
    mutations: u64,
}

impl Document {
    /// Create an empty document without touch input.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty document reporting the given touch support.
    #[must_use]
    pub fn with_touch_support(touch: TouchSupport) -> Self {
        Self {
            touch,
            ..Self::default()
        }
    }

    /// Add a top-level element, such as a button acting as ripple host.
    ///
    /// Setup, not a mutation: the mutation counter is left alone.
    pub fn add_root(&mut self, tag: &str, bounds: Option<Rect>) -> NodeId {
        let mut node = Node::new(tag);
        node.bounds = bounds;
        let id = node.id;
        self.roots.push(id);
        self.nodes.insert(id, node);
        id
    }

    /// Get a node by ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Get an inline style value of a node.
    #[must_use]
    pub fn inline_style(&self, id: NodeId, property: &str) -> Option<&str> {
        self.nodes.get(&id)?.style_value(property)
    }

    /// Children of a node, in document order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Direct children of a node carrying a class.
    #[must_use]
    pub fn children_with_class(&self, id: NodeId, class: &str) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|child| self.nodes.get(child).is_some_and(|n| n.has_class(class)))
            .collect()
    }

    /// Check if a node exists.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Set a node's layout box.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is not found.
    pub fn set_bounds(&mut self, id: NodeId, bounds: Rect) -> RippleResult<()> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or_else(|| RippleError::NodeNotFound(id.to_string()))?;
        node.bounds = Some(bounds);
        Ok(())
    }

    /// Number of nodes, attached or not.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of mutations applied through [`Surface`].
    #[must_use]
    pub fn mutation_count(&self) -> u64 {
        self.mutations
    }

    /// Serialize the document to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> RippleResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize a document from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> RippleResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn node_mut(&mut self, id: NodeId) -> RippleResult<&mut Node> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| RippleError::NodeNotFound(id.to_string()))
    }

    fn drop_subtree(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.remove(&id) {
            for child in node.children {
                self.drop_subtree(child);
            }
        }
    }
}

impl Surface for Document {
    type Node = NodeId;

    fn create_element(&mut self, tag: &str) -> RippleResult<NodeId> {
        let node = Node::new(tag);
        let id = node.id;
        self.nodes.insert(id, node);
        self.mutations += 1;
        Ok(id)
    }

    fn add_class(&mut self, node: &NodeId, class: &str) {
        if let Some(node) = self.nodes.get_mut(node) {
            if !node.has_class(class) {
                node.classes.push(class.to_string());
            }
            self.mutations += 1;
        }
    }

    fn set_style(&mut self, node: &NodeId, property: &str, value: &str) {
        let Some(node) = self.nodes.get_mut(node) else {
            return;
        };
        match node.style.iter().position(|(p, _)| p == property) {
            Some(index) => node.style[index].1 = value.to_string(),
            None => node.style.push((property.to_string(), value.to_string())),
        }
        self.mutations += 1;
    }

    fn computed_style(&self, node: &NodeId, property: &str) -> Option<String> {
        let node = self.nodes.get(node)?;
        match node.style_value(property) {
            Some(value) => Some(value.to_string()),
            None if property == "position" => Some("static".to_string()),
            None => None,
        }
    }

    fn bounding_rect(&self, node: &NodeId) -> Option<Rect> {
        self.nodes.get(node)?.bounds
    }

    fn find_child_with_class(&self, parent: &NodeId, class: &str) -> Option<NodeId> {
        self.children(*parent)
            .iter()
            .copied()
            .find(|child| self.nodes.get(child).is_some_and(|n| n.has_class(class)))
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> RippleResult<()> {
        if !self.nodes.contains_key(child) {
            return Err(RippleError::NodeNotFound(child.to_string()));
        }
        if !self.nodes.contains_key(parent) {
            return Err(RippleError::NodeNotFound(parent.to_string()));
        }
        if let Some(previous) = self.nodes.get(child).and_then(|n| n.parent) {
            if let Some(previous) = self.nodes.get_mut(&previous) {
                previous.children.retain(|c| c != child);
            }
        }
        self.node_mut(*parent)?.children.push(*child);
        self.node_mut(*child)?.parent = Some(*parent);
        self.mutations += 1;
        Ok(())
    }

    fn remove(&mut self, node: &NodeId) -> RippleResult<()> {
        let parent = self.node_mut(*node)?.parent;
        match parent {
            Some(parent) => {
                if let Some(parent) = self.nodes.get_mut(&parent) {
                    parent.children.retain(|c| c != node);
                }
            }
            None if self.roots.contains(node) => self.roots.retain(|r| r != node),
            None => return Err(RippleError::Detached(node.to_string())),
        }
        self.drop_subtree(*node);
        self.mutations += 1;
        Ok(())
    }

    fn is_connected(&self, node: &NodeId) -> bool {
        let mut current = *node;
        for _ in 0..=self.nodes.len() {
            match self.nodes.get(&current).map(|n| n.parent) {
                Some(Some(parent)) => current = parent,
                Some(None) => return self.roots.contains(&current),
                None => return false,
            }
        }
        false
    }

    fn discard(&mut self, node: &NodeId) {
        let loose = self
            .nodes
            .get(node)
            .is_some_and(|n| n.parent.is_none() && !self.roots.contains(node));
        if loose {
            self.drop_subtree(*node);
            self.mutations += 1;
        }
    }

    fn touch_support(&self) -> TouchSupport {
        self.touch
    }
}
