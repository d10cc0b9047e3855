pub mod serialization;

use crate::assets::{EnvironmentMap, Texture};
use glam::{EulerRot, Mat4, Quat, Vec3};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(usize);

/// Local transform of a node relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_euler_deg(position: [f32; 3], rotation_deg: [f32; 3], scale: [f32; 3]) -> Self {
        // Rotation order: Z (roll) * Y (yaw) * X (pitch)
        let rotation = Quat::from_euler(
            EulerRot::ZYX,
            rotation_deg[2].to_radians(),
            rotation_deg[1].to_radians(),
            rotation_deg[0].to_radians(),
        );
        Self {
            position: Vec3::from_array(position),
            rotation,
            scale: Vec3::from_array(scale),
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    pub fn lerp(&self, to: &Transform, t: f32) -> Transform {
        Transform {
            position: self.position.lerp(to.position, t),
            rotation: self.rotation.slerp(to.rotation, t),
            scale: self.scale.lerp(to.scale, t),
        }
    }

    #[cfg(test)]
    pub fn abs_diff_eq(&self, other: &Transform, max_abs_diff: f32) -> bool {
        self.position.abs_diff_eq(other.position, max_abs_diff)
            && self.rotation.abs_diff_eq(other.rotation, max_abs_diff)
            && self.scale.abs_diff_eq(other.scale, max_abs_diff)
    }
}

/// Axis-aligned box used for picking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// `extent` is the half size along each axis.
    pub fn from_center_extent(center: Vec3, extent: Vec3) -> Self {
        let extent = extent.abs();
        Self {
            min: center - extent,
            max: center + extent,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn extent(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn transformed(&self, matrix: &Mat4) -> Aabb {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            let p = matrix.transform_point3(corner);
            min = min.min(p);
            max = max.max(p);
        }
        Aabb { min, max }
    }

    /// Slab test. Returns the distance along `dir` to the entry point, or 0
    /// when the origin is inside the box.
    pub fn ray_distance(&self, origin: Vec3, dir: Vec3) -> Option<f32> {
        let inv = dir.recip();
        let t1 = (self.min - origin) * inv;
        let t2 = (self.max - origin) * inv;
        let t_near = t1.min(t2).max_element();
        let t_far = t1.max(t2).min_element();
        if t_far.is_nan() || t_near.is_nan() {
            return None;
        }
        if t_far >= t_near.max(0.0) {
            Some(t_near.max(0.0))
        } else {
            None
        }
    }
}

/// Named camera preset.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CameraView {
    pub position: Vec3,
    pub target: Vec3,
    #[serde(default = "default_fov_deg")]
    pub fov_deg: f32,
}

fn default_fov_deg() -> f32 {
    45.0
}

#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub color: Vec3,
    pub emissive: Vec3,
    pub roughness: f32,
    pub metalness: f32,
    pub map: Option<Arc<Texture>>,
    pub emissive_map: Option<Arc<Texture>>,
    version: u64,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: Vec3::ONE,
            emissive: Vec3::ZERO,
            roughness: 1.0,
            metalness: 0.0,
            map: None,
            emissive_map: None,
            version: 0,
        }
    }

    /// Request a re-upload of the material parameters.
    pub fn set_dirty(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    #[cfg(test)]
    pub fn version(&self) -> u64 {
        self.version
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    pub transform: Transform,
    pub poses: HashMap<String, Transform>,
    pub material: Option<MaterialId>,
    pub bounds: Option<Aabb>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn pose(&self, name: &str) -> Option<&Transform> {
        self.poses.get(name)
    }
}

#[derive(Debug, Default)]
pub struct Scene {
    nodes: Vec<Node>,
    materials: Vec<Material>,
    views: HashMap<String, CameraView>,
    environment: Option<Arc<EnvironmentMap>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        parent: Option<NodeId>,
        transform: Transform,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.into(),
            parent,
            children: Vec::new(),
            transform,
            poses: HashMap::new(),
            material: None,
            bounds: None,
        });
        if let Some(parent) = parent.and_then(|parent| self.nodes.get_mut(parent.0)) {
            parent.children.push(id);
        }
        id
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index), node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::parent)
    }

    /// The node itself followed by each of its ancestors up to the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            scene: self,
            next: self.node(id).map(|_| id),
        }
    }

    #[cfg(test)]
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|id| id == ancestor)
    }

    /// First node with this name in document order.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.name == name)
            .map(NodeId)
    }

    /// Depth-first search restricted to the subtree rooted at `root`.
    pub fn find_by_name_under(&self, root: NodeId, name: &str) -> Option<NodeId> {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = self.node(id)?;
            if node.name == name {
                return Some(id);
            }
            stack.extend(node.children().iter().rev().copied());
        }
        None
    }

    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        self.ancestors(id)
            .filter_map(|ancestor| self.node(ancestor))
            .fold(Mat4::IDENTITY, |acc, node| node.transform.matrix() * acc)
    }

    pub fn world_bounds(&self, id: NodeId) -> Option<Aabb> {
        let bounds = self.node(id)?.bounds?;
        Some(bounds.transformed(&self.world_matrix(id)))
    }

    /// Union of every node's world bounds.
    pub fn bounds(&self) -> Option<Aabb> {
        self.nodes()
            .filter_map(|(id, _)| self.world_bounds(id))
            .reduce(|acc, bounds| acc.union(&bounds))
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    pub fn material_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(id.0)
    }

    pub fn material_of(&self, node: NodeId) -> Option<MaterialId> {
        self.node(node)?.material
    }

    pub fn find_material(&self, name: &str) -> Option<MaterialId> {
        self.materials
            .iter()
            .position(|material| material.name == name)
            .map(MaterialId)
    }

    pub fn set_view(&mut self, name: impl Into<String>, view: CameraView) {
        self.views.insert(name.into(), view);
    }

    pub fn view(&self, name: &str) -> Option<&CameraView> {
        self.views.get(name)
    }

    pub fn view_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.views.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn environment(&self) -> Option<&Arc<EnvironmentMap>> {
        self.environment.as_ref()
    }

    pub fn set_environment(&mut self, environment: Arc<EnvironmentMap>) {
        self.environment = Some(environment);
    }
}

pub struct Ancestors<'a> {
    scene: &'a Scene,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.scene.parent(current);
        Some(current)
    }
}
