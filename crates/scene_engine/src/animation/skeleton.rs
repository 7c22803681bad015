//! Bone hierarchy data
//!
//! A [`Skeleton`] is a tree of [`BoneNode`]s mirroring the imported model's
//! node hierarchy. It is built once at mesh-load time and treated as
//! read-only afterwards, which is what lets multiple mesh components share
//! one skeleton by reference.

use crate::foundation::collections::Handle;
use crate::foundation::math::Mat4;

/// One node of the bone hierarchy
///
/// Carries the node's name, its local bind-pose transform (the rest state
/// relative to its parent), and its children in import order.
#[derive(Debug, Clone)]
pub struct BoneNode {
    /// Node name; animation channels and bone tables are matched by it
    pub name: String,
    /// Local bind-pose transform relative to the parent node
    pub local_transform: Mat4,
    /// Child nodes in import order
    pub children: Vec<BoneNode>,
}

impl BoneNode {
    /// Create a leaf node
    pub fn new(name: impl Into<String>, local_transform: Mat4) -> Self {
        Self {
            name: name.into(),
            local_transform,
            children: Vec::new(),
        }
    }

    /// Total number of nodes in this subtree, including self
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(BoneNode::node_count).sum::<usize>()
    }
}

/// An immutable bone hierarchy shared across the primitives of one mesh
#[derive(Debug, Clone)]
pub struct Skeleton {
    /// Root of the bone hierarchy
    pub root: BoneNode,
    /// Optional handle into the backend's debug-draw registry
    pub debug_draw: Option<Handle>,
}

impl Skeleton {
    /// Create a skeleton from its root node
    pub fn new(root: BoneNode) -> Self {
        Self {
            root,
            debug_draw: None,
        }
    }

    /// Total number of nodes in the hierarchy
    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_count() {
        let mut root = BoneNode::new("root", Mat4::identity());
        let mut spine = BoneNode::new("spine", Mat4::identity());
        spine.children.push(BoneNode::new("head", Mat4::identity()));
        root.children.push(spine);
        root.children.push(BoneNode::new("tail", Mat4::identity()));

        let skeleton = Skeleton::new(root);
        assert_eq!(skeleton.node_count(), 4);
    }
}
