use glam::{Mat4, Quat, Vec2, Vec3};

use crate::error::SceneError;
use crate::math::{intersect_aabb, intersect_quad, intersect_sphere, Ray, Rgba};

/// Generational handle into the node arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

/// Generational handle into the texture store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        Self {
            translation: Vec3::new(x, y, z),
            ..Self::IDENTITY
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_uniform_scale(self, scale: f32) -> Self {
        self.with_scale(Vec3::splat(scale))
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Geometry primitives, all centered on the node origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Cuboid { half_extents: Vec3 },
    Sphere { radius: f32 },
    /// Flat rectangle in the local XY plane, facing +Z
    Quad { width: f32, height: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Rgba,
    pub emissive: Rgba,
    pub emissive_intensity: f32,
    pub opacity: f32,
    pub texture: Option<TextureId>,
    /// Skip lighting (labels, sprites, screens)
    pub unlit: bool,
}

impl Material {
    pub fn solid(hex: u32) -> Self {
        Self {
            color: Rgba::from_hex(hex),
            emissive: Rgba::BLACK,
            emissive_intensity: 0.0,
            opacity: 1.0,
            texture: None,
            unlit: false,
        }
    }

    pub fn glowing(hex: u32, intensity: f32) -> Self {
        Self {
            emissive: Rgba::from_hex(hex),
            emissive_intensity: intensity,
            ..Self::solid(hex)
        }
    }

    pub fn textured(texture: TextureId) -> Self {
        Self {
            texture: Some(texture),
            unlit: true,
            ..Self::solid(0xffffff)
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn unlit(mut self) -> Self {
        self.unlit = true;
        self
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::solid(0xffffff)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: Rgba,
    pub intensity: f32,
    pub range: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: &'static str,
    pub transform: Transform,
    pub shape: Option<Shape>,
    pub material: Material,
    pub light: Option<PointLight>,
    pub visible: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    /// Empty transform group
    pub fn group(name: &'static str, transform: Transform) -> Self {
        Self {
            name,
            transform,
            shape: None,
            material: Material::default(),
            light: None,
            visible: true,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn mesh(name: &'static str, transform: Transform, shape: Shape, material: Material) -> Self {
        Self {
            shape: Some(shape),
            material,
            ..Self::group(name, transform)
        }
    }

    pub fn light(name: &'static str, transform: Transform, light: PointLight) -> Self {
        Self {
            light: Some(light),
            ..Self::group(name, transform)
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Pixel buffer sampled by textured materials
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Rgba>,
}

impl Texture {
    pub fn new(width: u32, height: u32, pixels: Vec<Rgba>) -> Self {
        Self { width, height, pixels }
    }

    /// Nearest-neighbour lookup, `uv` clamped to the unit square
    pub fn sample(&self, uv: Vec2) -> Rgba {
        if self.width == 0 || self.height == 0 {
            return Rgba::TRANSPARENT;
        }
        let x = ((uv.x.clamp(0.0, 1.0) * self.width as f32) as u32).min(self.width - 1);
        let y = ((uv.y.clamp(0.0, 1.0) * self.height as f32) as u32).min(self.height - 1);
        self.pixels
            .get((y * self.width + x) as usize)
            .copied()
            .unwrap_or(Rgba::TRANSPARENT)
    }
}

/// Result of a ray/shape test, in world terms
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub t: f32,
    pub normal: Vec3,
    pub uv: Vec2,
}

/// A visible shaped node with its resolved world transform
#[derive(Debug, Clone, Copy)]
pub struct Drawable {
    pub node: NodeId,
    pub world: Mat4,
    pub inverse: Mat4,
    pub shape: Shape,
    pub material: Material,
}

impl Drawable {
    pub fn intersect(&self, ray: &Ray) -> Option<SurfaceHit> {
        intersect_shape(&self.shape, &self.inverse, ray)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WorldLight {
    pub position: Vec3,
    pub light: PointLight,
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Arena-backed transform hierarchy.
///
/// Handles are generational: once a node or texture is released its old
/// handle stops resolving, which is how double releases are detected.
#[derive(Debug)]
pub struct SceneGraph {
    nodes: Vec<Slot<Node>>,
    free_nodes: Vec<u32>,
    textures: Vec<Slot<Texture>>,
    free_textures: Vec<u32>,
    root: NodeId,
}

impl SceneGraph {
    pub fn new() -> Self {
        let root = NodeId { index: 0, generation: 0 };
        Self {
            nodes: vec![Slot {
                generation: 0,
                value: Some(Node::group("root", Transform::IDENTITY)),
            }],
            free_nodes: Vec::new(),
            textures: Vec::new(),
            free_textures: Vec::new(),
            root,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn is_live(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, SceneError> {
        self.nodes
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.value.as_ref())
            .ok_or(SceneError::StaleNode(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneError> {
        self.nodes
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.value.as_mut())
            .ok_or(SceneError::StaleNode(id))
    }

    /// Attach `node` under `parent`
    pub fn spawn(&mut self, parent: NodeId, mut node: Node) -> Result<NodeId, SceneError> {
        self.node(parent)?;
        node.parent = Some(parent);
        node.children.clear();

        let id = match self.free_nodes.pop() {
            Some(index) => {
                let slot = &mut self.nodes[index as usize];
                slot.value = Some(node);
                NodeId { index, generation: slot.generation }
            }
            None => {
                self.nodes.push(Slot { generation: 0, value: Some(node) });
                NodeId {
                    index: (self.nodes.len() - 1) as u32,
                    generation: 0,
                }
            }
        };

        self.node_mut(parent)?.children.push(id);
        Ok(id)
    }

    pub fn add_texture(&mut self, texture: Texture) -> TextureId {
        match self.free_textures.pop() {
            Some(index) => {
                let slot = &mut self.textures[index as usize];
                slot.value = Some(texture);
                TextureId { index, generation: slot.generation }
            }
            None => {
                self.textures.push(Slot { generation: 0, value: Some(texture) });
                TextureId {
                    index: (self.textures.len() - 1) as u32,
                    generation: 0,
                }
            }
        }
    }

    pub fn texture(&self, id: TextureId) -> Result<&Texture, SceneError> {
        self.textures
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.value.as_ref())
            .ok_or(SceneError::StaleTexture(id))
    }

    /// Swap a texture's pixels in place; materials keep their handle
    pub fn replace_texture(&mut self, id: TextureId, texture: Texture) -> Result<(), SceneError> {
        let slot = self
            .textures
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation && slot.value.is_some())
            .ok_or(SceneError::StaleTexture(id))?;
        slot.value = Some(texture);
        Ok(())
    }

    pub fn release_texture(&mut self, id: TextureId) -> Result<(), SceneError> {
        let slot = self
            .textures
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation && slot.value.is_some())
            .ok_or(SceneError::StaleTexture(id))?;
        slot.value = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_textures.push(id.index);
        Ok(())
    }

    /// Detach and free `id` with all descendants and the textures they use.
    ///
    /// Returns the number of nodes released.
    pub fn release_subtree(&mut self, id: NodeId) -> Result<usize, SceneError> {
        if id == self.root {
            return Err(SceneError::RootNode);
        }
        let parent = self.node(id)?.parent;
        if let Some(parent) = parent {
            if let Ok(p) = self.node_mut(parent) {
                p.children.retain(|&c| c != id);
            }
        }

        let mut released = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let slot = &mut self.nodes[current.index as usize];
            let Some(node) = slot.value.take() else { continue };
            slot.generation = slot.generation.wrapping_add(1);
            self.free_nodes.push(current.index);
            released += 1;

            if let Some(texture) = node.material.texture {
                // Shared textures may already be gone
                let _ = self.release_texture(texture);
            }
            stack.extend(node.children);
        }
        Ok(released)
    }

    pub fn live_nodes(&self) -> usize {
        self.nodes.iter().filter(|s| s.value.is_some()).count()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.iter().filter(|s| s.value.is_some()).count()
    }

    pub fn world_matrix(&self, id: NodeId) -> Result<Mat4, SceneError> {
        let mut matrix = Mat4::IDENTITY;
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id)?;
            matrix = node.transform.matrix() * matrix;
            current = node.parent;
        }
        Ok(matrix)
    }

    /// Visible only if the node and every ancestor are visible
    pub fn is_visible(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            match self.node(node_id) {
                Ok(node) if node.visible => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// Test one node's own shape against a world-space ray
    pub fn intersect_node(&self, id: NodeId, ray: &Ray) -> Option<SurfaceHit> {
        let shape = self.node(id).ok()?.shape?;
        if !self.is_visible(id) {
            return None;
        }
        let world = self.world_matrix(id).ok()?;
        intersect_shape(&shape, &world.inverse(), ray)
    }

    /// Collect visible shaped nodes in one depth-first pass
    pub fn drawables(&self) -> Vec<Drawable> {
        let mut out = Vec::new();
        self.walk(|id, node, world| {
            if let Some(shape) = node.shape {
                out.push(Drawable {
                    node: id,
                    world,
                    inverse: world.inverse(),
                    shape,
                    material: node.material,
                });
            }
        });
        out
    }

    pub fn lights(&self) -> Vec<WorldLight> {
        let mut out = Vec::new();
        self.walk(|_, node, world| {
            if let Some(light) = node.light {
                out.push(WorldLight {
                    position: world.transform_point3(Vec3::ZERO),
                    light,
                });
            }
        });
        out
    }

    fn walk(&self, mut visit: impl FnMut(NodeId, &Node, Mat4)) {
        let mut stack = vec![(self.root, Mat4::IDENTITY)];
        while let Some((id, parent_world)) = stack.pop() {
            let Ok(node) = self.node(id) else { continue };
            if !node.visible {
                continue;
            }
            let world = parent_world * node.transform.matrix();
            visit(id, node, world);
            stack.extend(node.children.iter().map(|&c| (c, world)));
        }
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

fn intersect_shape(shape: &Shape, inverse: &Mat4, ray: &Ray) -> Option<SurfaceHit> {
    let local = ray.transformed(inverse);
    let (t, local_normal, uv) = match *shape {
        Shape::Cuboid { half_extents } => {
            let t = intersect_aabb(local.origin, local.dir, -half_extents, half_extents)?;
            let p = local.at(t) / half_extents.max(Vec3::splat(1e-6));
            let a = p.abs();
            let n = if a.x >= a.y && a.x >= a.z {
                Vec3::new(p.x.signum(), 0.0, 0.0)
            } else if a.y >= a.z {
                Vec3::new(0.0, p.y.signum(), 0.0)
            } else {
                Vec3::new(0.0, 0.0, p.z.signum())
            };
            (t, n, Vec2::ZERO)
        }
        Shape::Sphere { radius } => {
            let t = intersect_sphere(local.origin, local.dir, Vec3::ZERO, radius)?;
            let n = local.at(t).normalize_or_zero();
            let uv = Vec2::new(
                0.5 + n.z.atan2(n.x) / std::f32::consts::TAU,
                0.5 - n.y.asin() / std::f32::consts::PI,
            );
            (t, n, uv)
        }
        Shape::Quad { width, height } => {
            let (t, uv) = intersect_quad(local.origin, local.dir, width, height)?;
            let n = if local.dir.z > 0.0 { -Vec3::Z } else { Vec3::Z };
            (t, n, uv)
        }
    };

    let normal = inverse
        .transpose()
        .transform_vector3(local_normal)
        .normalize_or_zero();
    Some(SurfaceHit { t, normal, uv })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube(x: f32) -> Node {
        Node::mesh(
            "cube",
            Transform::from_xyz(x, 0.0, 0.0),
            Shape::Cuboid { half_extents: Vec3::splat(0.5) },
            Material::solid(0xff0000),
        )
    }

    #[test]
    fn test_world_matrix_composes_parent_chain() {
        let mut graph = SceneGraph::new();
        let group = graph
            .spawn(graph.root(), Node::group("g", Transform::from_xyz(-7.0, 0.0, 0.0).with_uniform_scale(1.2)))
            .unwrap();
        let child = graph.spawn(group, Node::group("c", Transform::from_xyz(0.0, 1.0, 0.0))).unwrap();
        let p = graph.world_matrix(child).unwrap().transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(-7.0, 1.2, 0.0)).length() < 1e-5, "got {p}");
    }

    #[test]
    fn test_release_subtree_frees_descendants_and_textures() {
        let mut graph = SceneGraph::new();
        let group = graph.spawn(graph.root(), Node::group("g", Transform::IDENTITY)).unwrap();
        let tex = graph.add_texture(Texture::new(1, 1, vec![Rgba::WHITE]));
        graph
            .spawn(group, Node::mesh("panel", Transform::IDENTITY, Shape::Quad { width: 1.0, height: 1.0 }, Material::textured(tex)))
            .unwrap();
        graph.spawn(group, cube(0.0)).unwrap();

        assert_eq!(graph.release_subtree(group).unwrap(), 3);
        assert_eq!(graph.live_nodes(), 1);
        assert_eq!(graph.live_textures(), 0);
        assert!(graph.node(graph.root()).unwrap().children().is_empty());
    }

    #[test]
    fn test_double_release_reports_stale() {
        let mut graph = SceneGraph::new();
        let id = graph.spawn(graph.root(), cube(0.0)).unwrap();
        graph.release_subtree(id).unwrap();
        assert_eq!(graph.release_subtree(id), Err(SceneError::StaleNode(id)));
    }

    #[test]
    fn test_reused_slot_does_not_resurrect_old_handle() {
        let mut graph = SceneGraph::new();
        let old = graph.spawn(graph.root(), cube(0.0)).unwrap();
        graph.release_subtree(old).unwrap();
        let new = graph.spawn(graph.root(), cube(1.0)).unwrap();
        assert_ne!(old, new);
        assert!(!graph.is_live(old));
        assert!(graph.is_live(new));
    }

    #[test]
    fn test_intersect_node_respects_scale_and_visibility() {
        let mut graph = SceneGraph::new();
        let id = graph
            .spawn(graph.root(), Node::mesh("s", Transform::from_xyz(0.0, 0.0, 0.0).with_uniform_scale(2.0), Shape::Sphere { radius: 1.0 }, Material::default()))
            .unwrap();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), -Vec3::Z);
        let hit = graph.intersect_node(id, &ray).unwrap();
        assert!((hit.t - 8.0).abs() < 1e-4);
        assert!((hit.normal - Vec3::Z).length() < 1e-4);

        graph.node_mut(id).unwrap().visible = false;
        assert!(graph.intersect_node(id, &ray).is_none());
    }

    #[test]
    fn test_drawables_skip_hidden_subtrees() {
        let mut graph = SceneGraph::new();
        let group = graph.spawn(graph.root(), Node::group("g", Transform::IDENTITY)).unwrap();
        graph.spawn(group, cube(0.0)).unwrap();
        graph.spawn(graph.root(), cube(3.0)).unwrap();
        assert_eq!(graph.drawables().len(), 2);
        graph.node_mut(group).unwrap().visible = false;
        assert_eq!(graph.drawables().len(), 1);
    }

    #[test]
    fn test_replace_texture_keeps_handle() {
        let mut graph = SceneGraph::new();
        let tex = graph.add_texture(Texture::new(1, 1, vec![Rgba::BLACK]));
        graph.replace_texture(tex, Texture::new(1, 1, vec![Rgba::WHITE])).unwrap();
        assert_eq!(graph.texture(tex).unwrap().pixels[0], Rgba::WHITE);
    }
}
