use glam::{Mat4, Vec3};
use lightbox_common::{NodeId, Transform};
use std::collections::BTreeMap;

use crate::light::{Light, LightKind};
use crate::object::{GeometryKind, ObjectKind, SceneObject, ShadowFlags};

/// Errors from scene graph operations.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("node {0} not found")]
    NodeNotFound(NodeId),
    #[error("node {0} is not a light")]
    NotALight(NodeId),
    #[error("field `{field}` does not exist on a {kind} light")]
    FieldNotApplicable { field: &'static str, kind: LightKind },
    #[error("invalid grid: {0}")]
    InvalidGrid(String),
}

/// A node owned by the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub kind: ObjectKind,
    pub transform: Transform,
    pub shadow: ShadowFlags,
    pub visible: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn light(&self) -> Option<&Light> {
        match &self.kind {
            ObjectKind::Light(light) => Some(light),
            _ => None,
        }
    }

    pub fn geometry_kind(&self) -> Option<GeometryKind> {
        match &self.kind {
            ObjectKind::Mesh(mesh) => Some(mesh.geometry.kind()),
            _ => None,
        }
    }
}

/// Hierarchical scene: nodes with transforms, traversed for rendering.
///
/// Nodes without a parent hang off the implicit scene root. Uses a BTreeMap
/// keyed by sequential ids, so iteration follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: BTreeMap<NodeId, SceneNode>,
    roots: Vec<NodeId>,
    next_id: u64,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Direct children of the scene root.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Attach an object (and its subtree) to the scene root. Returns its id.
    pub fn add(&mut self, object: SceneObject) -> NodeId {
        let id = self.insert(None, object);
        self.roots.push(id);
        id
    }

    /// Attach an object (and its subtree) under `parent`.
    pub fn add_child(&mut self, parent: NodeId, object: SceneObject) -> Result<NodeId, SceneError> {
        if !self.nodes.contains_key(&parent) {
            return Err(SceneError::NodeNotFound(parent));
        }
        let id = self.insert(Some(parent), object);
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(id);
        }
        Ok(id)
    }

    fn insert(&mut self, parent: Option<NodeId>, object: SceneObject) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;

        let SceneObject {
            name,
            kind,
            transform,
            shadow,
            visible,
            children,
        } = object;

        self.nodes.insert(
            id,
            SceneNode {
                name,
                kind,
                transform,
                shadow,
                visible,
                parent,
                children: Vec::with_capacity(children.len()),
            },
        );

        for child in children {
            let child_id = self.insert(Some(id), child);
            if let Some(node) = self.nodes.get_mut(&id) {
                node.children.push(child_id);
            }
        }
        id
    }

    /// Remove a node and its whole subtree. Returns how many nodes were removed.
    pub fn remove(&mut self, id: NodeId) -> Result<usize, SceneError> {
        let parent = self.nodes.get(&id).ok_or(SceneError::NodeNotFound(id))?.parent;
        match parent {
            Some(parent) => {
                if let Some(p) = self.nodes.get_mut(&parent) {
                    p.children.retain(|c| *c != id);
                }
            }
            None => self.roots.retain(|r| *r != id),
        }

        let doomed = self.subtree(id);
        for n in &doomed {
            self.nodes.remove(n);
        }
        Ok(doomed.len())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(&id)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    /// All nodes in id (insertion) order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    /// Depth-first pre-order walk from the scene root.
    pub fn traverse(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(&id) {
                out.push(id);
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    /// Ids of `id` and all of its descendants, pre-order.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            if let Some(node) = self.nodes.get(&n) {
                out.push(n);
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    /// First node with this name in traversal order.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.traverse()
            .into_iter()
            .find(|id| self.nodes.get(id).is_some_and(|n| n.name == name))
    }

    /// Local-to-world matrix of a node, composed through its ancestors.
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let mut node = self.nodes.get(&id)?;
        let mut matrix = node.transform.matrix();
        while let Some(parent) = node.parent {
            node = self.nodes.get(&parent)?;
            matrix = node.transform.matrix() * matrix;
        }
        Some(matrix)
    }

    pub fn world_position(&self, id: NodeId) -> Option<Vec3> {
        self.world_matrix(id).map(|m| m.transform_point3(Vec3::ZERO))
    }

    pub fn light(&self, id: NodeId) -> Result<&Light, SceneError> {
        let node = self.nodes.get(&id).ok_or(SceneError::NodeNotFound(id))?;
        node.light().ok_or(SceneError::NotALight(id))
    }

    pub fn light_mut(&mut self, id: NodeId) -> Result<&mut Light, SceneError> {
        let node = self.nodes.get_mut(&id).ok_or(SceneError::NodeNotFound(id))?;
        match &mut node.kind {
            ObjectKind::Light(light) => Ok(light),
            _ => Err(SceneError::NotALight(id)),
        }
    }

    /// All light nodes in id order.
    pub fn lights(&self) -> impl Iterator<Item = (NodeId, &Light)> {
        self.iter()
            .filter_map(|(id, node)| node.light().map(|light| (id, light)))
    }

    /// Number of mesh nodes with the given geometry kind.
    pub fn count_geometry(&self, kind: GeometryKind) -> usize {
        self.nodes
            .values()
            .filter(|n| n.geometry_kind() == Some(kind))
            .count()
    }
}
