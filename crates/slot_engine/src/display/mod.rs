//! Display tree - container composition shared with the rendering surface
//!
//! Every scene, entity and overlay owns one or more containers in a single
//! arena. The surface walks the same tree when it draws. Handles are
//! [`ContainerId`] keys; a destroyed container's key simply stops resolving.

use crate::foundation::math::{Transform2D, Vec2};
use parking_lot::RwLock;
use slotmap::{new_key_type, SlotMap};
use std::sync::Arc;

new_key_type! {
    /// Handle to a container node in the [`DisplayTree`]
    pub struct ContainerId;
}

/// A single container node
#[derive(Debug, Clone)]
pub struct DisplayNode {
    /// Debug label
    pub label: String,
    /// Parent container, if attached
    pub parent: Option<ContainerId>,
    /// Children in draw order
    pub children: Vec<ContainerId>,
    /// Local transform
    pub transform: Transform2D,
    /// Whether this node (and its subtree) is drawn
    pub visible: bool,
    /// Name of the texture asset drawn by this node
    pub texture: Option<String>,
    /// Text drawn by this node
    pub text: Option<String>,
    /// Explicit size (hit area / layout box)
    pub size: Option<(f32, f32)>,
}

impl DisplayNode {
    fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            parent: None,
            children: Vec::new(),
            transform: Transform2D::identity(),
            visible: true,
            texture: None,
            text: None,
            size: None,
        }
    }
}

/// Shared handle to the container arena
///
/// Cloning is cheap; all clones refer to the same tree. Locks are held only
/// for the duration of a single call.
#[derive(Clone, Default)]
pub struct DisplayTree {
    nodes: Arc<RwLock<SlotMap<ContainerId, DisplayNode>>>,
}

impl DisplayTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached container
    pub fn create(&self, label: &str) -> ContainerId {
        self.nodes.write().insert(DisplayNode::new(label))
    }

    /// Whether the container still exists
    pub fn contains(&self, id: ContainerId) -> bool {
        self.nodes.read().contains_key(id)
    }

    /// Number of live containers
    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    /// Whether the tree holds no containers
    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }

    /// Append `child` to `parent`, detaching it from any previous parent.
    ///
    /// Returns false if either container is gone or the link would create a cycle.
    pub fn add_child(&self, parent: ContainerId, child: ContainerId) -> bool {
        let mut nodes = self.nodes.write();
        if parent == child || !nodes.contains_key(parent) || !nodes.contains_key(child) {
            return false;
        }

        // Refuse to parent a node under its own descendant
        let mut cursor = Some(parent);
        while let Some(current) = cursor {
            if current == child {
                return false;
            }
            cursor = nodes.get(current).and_then(|n| n.parent);
        }

        if let Some(old_parent) = nodes[child].parent.take() {
            if let Some(node) = nodes.get_mut(old_parent) {
                node.children.retain(|c| *c != child);
            }
        }
        nodes[parent].children.push(child);
        nodes[child].parent = Some(parent);
        true
    }

    /// Remove `child` from `parent`. Returns whether it was attached there.
    pub fn remove_child(&self, parent: ContainerId, child: ContainerId) -> bool {
        let mut nodes = self.nodes.write();
        let attached = nodes.get(child).and_then(|n| n.parent) == Some(parent);
        if !attached {
            return false;
        }
        if let Some(node) = nodes.get_mut(parent) {
            node.children.retain(|c| *c != child);
        }
        nodes[child].parent = None;
        true
    }

    /// Detach a container from whatever parent it has
    pub fn detach(&self, child: ContainerId) {
        let parent = self.parent(child);
        if let Some(parent) = parent {
            self.remove_child(parent, child);
        }
    }

    /// Destroy a container and its whole subtree
    pub fn destroy(&self, id: ContainerId) {
        let mut nodes = self.nodes.write();
        let Some(parent) = nodes.get(id).map(|n| n.parent) else {
            return;
        };
        if let Some(parent) = parent {
            if let Some(node) = nodes.get_mut(parent) {
                node.children.retain(|c| *c != id);
            }
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = nodes.remove(current) {
                stack.extend(node.children);
            }
        }
    }

    /// Parent of a container
    pub fn parent(&self, id: ContainerId) -> Option<ContainerId> {
        self.nodes.read().get(id).and_then(|n| n.parent)
    }

    /// Children of a container in draw order
    pub fn children(&self, id: ContainerId) -> Vec<ContainerId> {
        self.nodes
            .read()
            .get(id)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// Copy of a node's current state
    pub fn node(&self, id: ContainerId) -> Option<DisplayNode> {
        self.nodes.read().get(id).cloned()
    }

    /// Run a closure against a node, if it exists
    pub fn with_node_mut<R>(&self, id: ContainerId, f: impl FnOnce(&mut DisplayNode) -> R) -> Option<R> {
        self.nodes.write().get_mut(id).map(f)
    }

    /// Set the local position
    pub fn set_position(&self, id: ContainerId, x: f32, y: f32) {
        self.with_node_mut(id, |n| n.transform.position = Vec2::new(x, y));
    }

    /// Set the local rotation in radians
    pub fn set_rotation(&self, id: ContainerId, radians: f32) {
        self.with_node_mut(id, |n| n.transform.rotation = radians);
    }

    /// Set the local scale
    pub fn set_scale(&self, id: ContainerId, x: f32, y: f32) {
        self.with_node_mut(id, |n| n.transform.scale = Vec2::new(x, y));
    }

    /// Local transform (identity for unknown containers)
    pub fn transform(&self, id: ContainerId) -> Transform2D {
        self.nodes
            .read()
            .get(id)
            .map(|n| n.transform)
            .unwrap_or_default()
    }

    /// Show or hide a container
    pub fn set_visible(&self, id: ContainerId, visible: bool) {
        self.with_node_mut(id, |n| n.visible = visible);
    }

    /// Whether a container is visible (false for unknown containers)
    pub fn is_visible(&self, id: ContainerId) -> bool {
        self.nodes.read().get(id).is_some_and(|n| n.visible)
    }

    /// Set or clear the texture drawn by a container
    pub fn set_texture(&self, id: ContainerId, texture: Option<String>) {
        self.with_node_mut(id, |n| n.texture = texture);
    }

    /// Texture drawn by a container
    pub fn texture(&self, id: ContainerId) -> Option<String> {
        self.nodes.read().get(id).and_then(|n| n.texture.clone())
    }

    /// Set or clear the text drawn by a container
    pub fn set_text(&self, id: ContainerId, text: Option<String>) {
        self.with_node_mut(id, |n| n.text = text);
    }

    /// Text drawn by a container
    pub fn text(&self, id: ContainerId) -> Option<String> {
        self.nodes.read().get(id).and_then(|n| n.text.clone())
    }

    /// Set the layout size of a container
    pub fn set_size(&self, id: ContainerId, width: f32, height: f32) {
        self.with_node_mut(id, |n| n.size = Some((width, height)));
    }

    /// Layout size of a container
    pub fn size(&self, id: ContainerId) -> Option<(f32, f32)> {
        self.nodes.read().get(id).and_then(|n| n.size)
    }

    /// Number of visible containers reachable from `root` (including it)
    pub fn visible_count(&self, root: ContainerId) -> usize {
        let nodes = self.nodes.read();
        let mut count = 0;
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            if let Some(node) = nodes.get(current) {
                if node.visible {
                    count += 1;
                    stack.extend(node.children.iter().copied());
                }
            }
        }
        count
    }
}

impl std::fmt::Debug for DisplayTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplayTree")
            .field("nodes", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_child_reparents() {
        let tree = DisplayTree::new();
        let a = tree.create("a");
        let b = tree.create("b");
        let c = tree.create("c");

        assert!(tree.add_child(a, c));
        assert!(tree.add_child(b, c));
        assert_eq!(tree.parent(c), Some(b));
        assert!(tree.children(a).is_empty());
        assert_eq!(tree.children(b), vec![c]);
    }

    #[test]
    fn test_rejects_cycles() {
        let tree = DisplayTree::new();
        let a = tree.create("a");
        let b = tree.create("b");
        assert!(tree.add_child(a, b));
        assert!(!tree.add_child(b, a));
        assert!(!tree.add_child(a, a));
    }

    #[test]
    fn test_destroy_removes_subtree() {
        let tree = DisplayTree::new();
        let root = tree.create("root");
        let mid = tree.create("mid");
        let leaf = tree.create("leaf");
        tree.add_child(root, mid);
        tree.add_child(mid, leaf);

        tree.destroy(mid);
        assert!(!tree.contains(mid));
        assert!(!tree.contains(leaf));
        assert!(tree.children(root).is_empty());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_visible_count_skips_hidden_subtrees() {
        let tree = DisplayTree::new();
        let root = tree.create("root");
        let shown = tree.create("shown");
        let hidden = tree.create("hidden");
        let under_hidden = tree.create("under_hidden");
        tree.add_child(root, shown);
        tree.add_child(root, hidden);
        tree.add_child(hidden, under_hidden);
        tree.set_visible(hidden, false);

        assert_eq!(tree.visible_count(root), 2);
    }

    #[test]
    fn test_remove_child_requires_link() {
        let tree = DisplayTree::new();
        let a = tree.create("a");
        let b = tree.create("b");
        assert!(!tree.remove_child(a, b));
        tree.add_child(a, b);
        assert!(tree.remove_child(a, b));
        assert_eq!(tree.parent(b), None);
    }
}
