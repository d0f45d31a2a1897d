use glam::{Mat4, Vec3};
use log::warn;
use std::collections::HashMap;
use std::fmt;

use crate::geometry::{Material, Surface};
use crate::math::Ray;
use crate::models::Model;

/// Opaque handle to a node in the scene graph
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Group,
    Surface(Surface),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    /// Relative to the parent
    pub transform: Mat4,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    flower_type: Option<String>,
}

impl Node {
    fn new(name: impl Into<String>, kind: NodeKind, transform: Mat4, parent: Option<NodeId>) -> Self {
        Self {
            name: name.into(),
            kind,
            transform,
            parent,
            children: Vec::new(),
            flower_type: None,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn flower_type(&self) -> Option<&str> {
        self.flower_type.as_deref()
    }

    pub fn surface(&self) -> Option<&Surface> {
        match &self.kind {
            NodeKind::Surface(surface) => Some(surface),
            NodeKind::Group => None,
        }
    }
}

/// Ray hit against a surface node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub node: NodeId,
    pub distance: f32,
    pub point: Vec3,
}

/// Minimal scene graph: transforms, surfaces, and flower ownership.
///
/// Every surface below a flower root is recorded in an ownership map when
/// the root is tagged, so a picked surface resolves to its flower with a
/// single lookup.
#[derive(Debug)]
pub struct SceneGraph {
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
    next_id: u32,
    owners: HashMap<NodeId, NodeId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        let root = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(root, Node::new("Scene", NodeKind::Group, Mat4::IDENTITY, None));
        Self {
            nodes,
            root,
            next_id: 1,
            owners: HashMap::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    fn insert(&mut self, parent: NodeId, name: impl Into<String>, kind: NodeKind, transform: Mat4) -> NodeId {
        let parent = if self.nodes.contains_key(&parent) {
            parent
        } else {
            warn!("Parent node {} missing, attaching to scene root", parent);
            self.root
        };

        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, Node::new(name, kind, transform, Some(parent)));
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(id);
        }

        // A surface added under an existing flower belongs to it as well
        if let Some(&owner) = self.owners.get(&parent) {
            self.owners.insert(id, owner);
        } else if self.flower_type(parent).is_some() {
            self.owners.insert(id, parent);
        }
        id
    }

    pub fn add_group(&mut self, parent: NodeId, name: impl Into<String>, transform: Mat4) -> NodeId {
        self.insert(parent, name, NodeKind::Group, transform)
    }

    pub fn add_surface(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        transform: Mat4,
        surface: Surface,
    ) -> NodeId {
        self.insert(parent, name, NodeKind::Surface(surface), transform)
    }

    /// Instantiates `model` under the scene root as a flower of `type_id`
    pub fn spawn_model(&mut self, model: Model, transform: Mat4, type_id: &str) -> NodeId {
        let flower = self.add_group(self.root, type_id, transform);
        for part in model.parts {
            self.add_surface(flower, part.name, part.transform, part.surface);
        }
        self.tag_flower(flower, type_id);
        flower
    }

    /// Marks `id` as a flower root and claims every node beneath it
    pub fn tag_flower(&mut self, id: NodeId, type_id: &str) {
        let Some(node) = self.nodes.get_mut(&id) else {
            warn!("Cannot tag missing node {} as flower", id);
            return;
        };
        node.flower_type = Some(type_id.to_string());
        for descendant in self.descendants(id).into_iter().skip(1) {
            self.owners.insert(descendant, id);
        }
    }

    pub fn flower_type(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(&id).and_then(Node::flower_type)
    }

    /// Flower root owning a picked node, if any
    pub fn owning_flower(&self, id: NodeId) -> Option<NodeId> {
        if self.flower_type(id).is_some() {
            return Some(id);
        }
        self.owners.get(&id).copied()
    }

    /// Detaches and drops `id` with its whole subtree. The root stays.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if id == self.root || !self.nodes.contains_key(&id) {
            return false;
        }
        if let Some(parent) = self.nodes.get(&id).and_then(Node::parent) {
            if let Some(p) = self.nodes.get_mut(&parent) {
                p.children.retain(|&c| c != id);
            }
        }
        for node in self.descendants(id) {
            self.nodes.remove(&node);
            self.owners.remove(&node);
        }
        true
    }

    /// `id` followed by everything below it, depth first
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(&current) {
                out.push(current);
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    /// Surface nodes in the subtree of `id`
    pub fn surfaces(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|n| matches!(self.nodes[n].kind, NodeKind::Surface(_)))
            .collect()
    }

    pub fn materials(&self, id: NodeId) -> Option<&[Material]> {
        self.nodes
            .get(&id)
            .and_then(Node::surface)
            .map(|s| s.materials.as_slice())
    }

    pub fn materials_mut(&mut self, id: NodeId) -> Option<&mut Vec<Material>> {
        match self.nodes.get_mut(&id).map(|n| &mut n.kind) {
            Some(NodeKind::Surface(surface)) => Some(&mut surface.materials),
            _ => None,
        }
    }

    pub fn world_transform(&self, id: NodeId) -> Mat4 {
        let mut transform = Mat4::IDENTITY;
        let mut current = Some(id);
        while let Some(node) = current.and_then(|c| self.nodes.get(&c)) {
            transform = node.transform * transform;
            current = node.parent;
        }
        transform
    }

    /// All surfaces hit by `ray`, nearest first. Distances are in world units
    /// along the ray.
    pub fn intersect(&self, ray: &Ray) -> Vec<Hit> {
        let direction_len = ray.direction.length();
        if direction_len == 0.0 {
            return Vec::new();
        }

        let mut hits: Vec<Hit> = self
            .nodes
            .iter()
            .filter_map(|(&id, node)| {
                let surface = node.surface()?;
                let world = self.world_transform(id);
                if world.determinant().abs() < f32::EPSILON {
                    return None;
                }
                let local = ray.transformed(&world.inverse());
                let t = surface.geometry.intersect(&local)?;
                Some(Hit {
                    node: id,
                    distance: t * direction_len,
                    point: ray.at(t),
                })
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.node.cmp(&b.node)));
        hits
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}
