//! Scene graph
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. Each node
//! owns its child list; the parent link is a plain back-reference used for
//! global transform lookups. Nodes are never freed, a detached node simply
//! stops being reachable from the root.

use std::cell::RefCell;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::trs_matrix;

/// Index of a node in its [`SceneGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Opaque renderer-side model reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelHandle(pub u32);

/// Opaque renderer-side texture reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureHandle(pub u32);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("node {0:?} does not exist")]
    UnknownNode(NodeId),
    #[error("node {0:?} cannot be its own child")]
    SelfParent(NodeId),
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    WouldCycle { parent: NodeId, child: NodeId },
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Local transform relative to the parent
    pub transform: Mat4,
    pub translation: Vec3,
    /// Euler angles applied X, then Y, then Z
    pub rotation: Vec3,
    pub scale: Vec3,
    pub model: Option<ModelHandle>,
    pub texture: Option<TextureHandle>,
    /// Debug label
    pub name: String,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl SceneNode {
    fn new(name: impl Into<String>) -> Self {
        Self {
            transform: Mat4::IDENTITY,
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            model: None,
            texture: None,
            name: name.into(),
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Rebuild `transform` from translation, rotation and scale
    pub fn recalculate_transform(&mut self) {
        self.transform = trs_matrix(self.translation, self.rotation, self.scale);
    }
}

/// A node with something to draw, as produced by [`SceneGraph::collect_draws`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub node: NodeId,
    pub world: Mat4,
    pub model: ModelHandle,
    pub texture: Option<TextureHandle>,
}

#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    root: NodeId,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            nodes: vec![SceneNode::new("root")],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Create a detached node
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(SceneNode::new(name));
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.index())
    }

    /// Overwrite a node's local transform; unknown ids are ignored
    pub fn set_transform(&mut self, id: NodeId, transform: Mat4) {
        if let Some(node) = self.get_mut(id) {
            node.transform = transform;
        }
    }

    /// Whether `ancestor` is `node` or lies on its parent chain
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).and_then(|n| n.parent);
        }
        false
    }

    /// Append `child` to `parent`'s children.
    ///
    /// A child that already has a parent is detached from it first, so a node
    /// is listed by at most one parent.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        for id in [parent, child] {
            if !self.contains(id) {
                return Err(SceneError::UnknownNode(id));
            }
        }
        if parent == child {
            return Err(SceneError::SelfParent(child));
        }
        if self.is_ancestor(child, parent) {
            return Err(SceneError::WouldCycle { parent, child });
        }

        if let Some(old_parent) = self.nodes[child.index()].parent {
            self.remove_child(old_parent, child);
        }
        self.nodes[parent.index()].children.push(child);
        self.nodes[child.index()].parent = Some(parent);
        Ok(())
    }

    /// Detach `child` from `parent`. Returns false if it was not a child.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let Some(node) = self.nodes.get_mut(parent.index()) else {
            return false;
        };
        let Some(pos) = node.children.iter().position(|&c| c == child) else {
            return false;
        };
        node.children.remove(pos);
        self.nodes[child.index()].parent = None;
        true
    }

    /// Depth-first walk from `start`: `before` on entry, children in insertion
    /// order, then `after` on exit.
    pub fn traverse<B, A>(&self, start: NodeId, before: &mut B, after: &mut A)
    where
        B: FnMut(NodeId, &SceneNode),
        A: FnMut(NodeId, &SceneNode),
    {
        let Some(node) = self.get(start) else {
            return;
        };
        before(start, node);
        for &child in &node.children {
            self.traverse(child, before, after);
        }
        after(start, node);
    }

    /// Parent's global transform times the local one, recomputed on every call
    pub fn global_transform(&self, id: NodeId) -> Mat4 {
        let Some(node) = self.get(id) else {
            return Mat4::IDENTITY;
        };
        match node.parent {
            Some(parent) => self.global_transform(parent) * node.transform,
            None => node.transform,
        }
    }

    /// World matrices of every drawable node under `start`, in traversal order.
    ///
    /// Keeps a matrix stack: push on entry, pop on exit.
    pub fn collect_draws(&self, start: NodeId) -> Vec<DrawItem> {
        let base = self
            .get(start)
            .and_then(|n| n.parent)
            .map_or(Mat4::IDENTITY, |p| self.global_transform(p));
        let stack = RefCell::new(vec![base]);
        let mut draws = Vec::new();
        self.traverse(
            start,
            &mut |id, node| {
                let mut stack = stack.borrow_mut();
                let world = stack.last().copied().unwrap_or(Mat4::IDENTITY) * node.transform;
                stack.push(world);
                if let Some(model) = node.model {
                    draws.push(DrawItem {
                        node: id,
                        world,
                        model,
                        texture: node.texture,
                    });
                }
            },
            &mut |_, _| {
                stack.borrow_mut().pop();
            },
        );
        draws
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translated(graph: &mut SceneGraph, name: &str, t: Vec3) -> NodeId {
        let id = graph.create_node(name);
        graph.set_transform(id, Mat4::from_translation(t));
        id
    }

    #[test]
    fn test_global_transform_composes_root_to_node() {
        let mut graph = SceneGraph::new();
        let a = translated(&mut graph, "a", Vec3::new(1.0, 0.0, 0.0));
        let b = graph.create_node("b");
        graph.set_transform(b, Mat4::from_rotation_y(std::f32::consts::FRAC_PI_2));
        let c = translated(&mut graph, "c", Vec3::new(0.0, 0.0, 2.0));
        let root = graph.root();
        graph.add_child(root, a).unwrap();
        graph.add_child(a, b).unwrap();
        graph.add_child(b, c).unwrap();

        let expected = graph.get(root).unwrap().transform
            * graph.get(a).unwrap().transform
            * graph.get(b).unwrap().transform
            * graph.get(c).unwrap().transform;
        assert!(graph.global_transform(c).abs_diff_eq(expected, 1e-6));

        // The +Z offset of c is turned onto +X by b's rotation
        let origin = graph.global_transform(c).transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_global_transform_tracks_ancestor_changes() {
        let mut graph = SceneGraph::new();
        let a = translated(&mut graph, "a", Vec3::X);
        let b = translated(&mut graph, "b", Vec3::Y);
        graph.add_child(graph.root(), a).unwrap();
        graph.add_child(a, b).unwrap();

        let before = graph.global_transform(b).transform_point3(Vec3::ZERO);
        graph.set_transform(a, Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0)));
        let after = graph.global_transform(b).transform_point3(Vec3::ZERO);
        assert_eq!(before, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(after, Vec3::new(5.0, 1.0, 0.0));
    }

    #[test]
    fn test_traverse_pre_post_order() {
        let mut graph = SceneGraph::new();
        let a = graph.create_node("a");
        let b = graph.create_node("b");
        let c = graph.create_node("c");
        let root = graph.root();
        graph.add_child(root, a).unwrap();
        graph.add_child(a, b).unwrap();
        graph.add_child(root, c).unwrap();

        let log = RefCell::new(Vec::new());
        graph.traverse(
            root,
            &mut |_, n| log.borrow_mut().push(format!("+{}", n.name)),
            &mut |_, n| log.borrow_mut().push(format!("-{}", n.name)),
        );
        assert_eq!(
            log.into_inner(),
            ["+root", "+a", "+b", "-b", "-a", "+c", "-c", "-root"]
        );
    }

    #[test]
    fn test_remove_child_clears_parent_and_hides_from_traversal() {
        let mut graph = SceneGraph::new();
        let a = graph.create_node("a");
        let root = graph.root();
        graph.add_child(root, a).unwrap();
        assert_eq!(graph.get(a).unwrap().parent(), Some(root));

        assert!(graph.remove_child(root, a));
        assert_eq!(graph.get(a).unwrap().parent(), None);
        assert!(!graph.remove_child(root, a));

        let mut seen = Vec::new();
        graph.traverse(root, &mut |id, _| seen.push(id), &mut |_, _| {});
        assert_eq!(seen, vec![root]);
    }

    #[test]
    fn test_reparenting_keeps_single_parent() {
        let mut graph = SceneGraph::new();
        let a = graph.create_node("a");
        let b = graph.create_node("b");
        let x = graph.create_node("x");
        graph.add_child(a, x).unwrap();
        graph.add_child(b, x).unwrap();

        assert!(graph.get(a).unwrap().children().is_empty());
        assert_eq!(graph.get(b).unwrap().children(), &[x]);
        assert_eq!(graph.get(x).unwrap().parent(), Some(b));
    }

    #[test]
    fn test_cycles_rejected() {
        let mut graph = SceneGraph::new();
        let a = graph.create_node("a");
        let b = graph.create_node("b");
        graph.add_child(a, b).unwrap();

        assert_eq!(graph.add_child(b, a), Err(SceneError::WouldCycle { parent: b, child: a }));
        assert_eq!(graph.add_child(a, a), Err(SceneError::SelfParent(a)));
        let ghost = NodeId(999);
        assert_eq!(graph.add_child(a, ghost), Err(SceneError::UnknownNode(ghost)));
    }

    #[test]
    fn test_collect_draws_uses_transform_stack() {
        let mut graph = SceneGraph::new();
        let ship = translated(&mut graph, "ship", Vec3::new(10.0, 0.0, 0.0));
        let laser = translated(&mut graph, "laser", Vec3::new(0.0, 1.0, 0.0));
        let marker = translated(&mut graph, "marker", Vec3::new(0.0, 0.0, 7.0));
        graph.get_mut(ship).unwrap().model = Some(ModelHandle(1));
        graph.get_mut(laser).unwrap().model = Some(ModelHandle(2));
        graph.get_mut(marker).unwrap().model = Some(ModelHandle(3));
        let root = graph.root();
        graph.add_child(root, ship).unwrap();
        graph.add_child(ship, laser).unwrap();
        graph.add_child(root, marker).unwrap();

        let draws = graph.collect_draws(root);
        assert_eq!(draws.len(), 3);
        for draw in &draws {
            assert!(draw.world.abs_diff_eq(graph.global_transform(draw.node), 1e-6));
        }
        // Sibling after a subtree must not inherit the subtree's transform
        let marker_pos = draws[2].world.transform_point3(Vec3::ZERO);
        assert_eq!(marker_pos, Vec3::new(0.0, 0.0, 7.0));
    }
}
