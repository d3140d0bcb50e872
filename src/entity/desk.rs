use std::f32::consts::PI;

use glam::{Quat, Vec3};

use super::{spawn_panel, Entity, EntityCore, PanelSpec};
use crate::content::{PanelContent, TaskRecord};
use crate::error::EntityError;
use crate::math::Rgba;
use crate::scene::{Material, Node, NodeId, SceneGraph, Shape, Transform};

/// Floating display spin, radians per second
pub const DISPLAY_SPIN: f32 = 0.3;

/// Desk, laptop with its task screen, two holo panels and a spinning display
pub struct DeskWorkspace {
    core: EntityCore,
    floating_display: Option<NodeId>,
}

fn laptop_tasks() -> Vec<TaskRecord> {
    [
        ("MUJI Hong Kong - General Liability", "PENDING"),
        ("Knight-Swift Transportation - Sanctions", "IN PROGRESS"),
        ("Disney Company - Renewal Quote", "URGENT"),
        ("Amazon Hong Kong - D&O Review", "PENDING"),
        ("Staples - Workers Compensation", "REVIEW"),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (name, status))| TaskRecord {
        id: Some(format!("UW-{}", 101 + i)),
        account_name: Some(name.to_string()),
        status: Some(status.to_string()),
        premium: Some(12_500.0),
        propensity_to_bind: None,
    })
    .collect()
}

impl DeskWorkspace {
    pub fn new() -> Self {
        Self {
            core: EntityCore::default(),
            floating_display: None,
        }
    }

    fn build_laptop(graph: &mut SceneGraph, root: NodeId) -> Result<(), EntityError> {
        let laptop = graph.spawn(root, Node::group("laptop", Transform::from_xyz(0.0, 1.56, 0.0)))?;
        graph.spawn(
            laptop,
            Node::mesh(
                "laptop_base",
                Transform::IDENTITY,
                Shape::Cuboid { half_extents: Vec3::new(0.75, 0.025, 0.5) },
                Material::solid(0x1a1a1a),
            ),
        )?;
        let tilt = Quat::from_rotation_x(-PI / 12.0);
        graph.spawn(
            laptop,
            Node::mesh(
                "laptop_lid",
                Transform::from_xyz(0.0, 0.5, -0.48).with_rotation(tilt),
                Shape::Cuboid { half_extents: Vec3::new(0.75, 0.5, 0.01) },
                Material::solid(0x1a1a1a),
            ),
        )?;
        spawn_panel(
            graph,
            laptop,
            PanelSpec {
                name: "laptop_screen",
                transform: Transform::from_xyz(0.0, 0.5, -0.465).with_rotation(tilt),
                texture_size: (512, 384),
                quad_size: (1.4, 0.9),
                opacity: 1.0,
            },
            &PanelContent::Tasks(laptop_tasks()),
        )?;
        Ok(())
    }

    fn build_holo_panel(graph: &mut SceneGraph, root: NodeId, x: f32) -> Result<(), EntityError> {
        let group = graph.spawn(root, Node::group("holo_panel", Transform::from_xyz(x, 2.5, 0.0)))?;
        graph.spawn(
            group,
            Node::mesh(
                "holo_projector",
                Transform::from_xyz(0.0, -1.0, 0.0),
                Shape::Cuboid { half_extents: Vec3::new(0.25, 0.05, 0.25) },
                Material::glowing(0x0072ff, 0.5),
            ),
        )?;
        let content = PanelContent::label(
            "PORTFOLIO ANALYTICS",
            &["58% Bound Rate", "$2.4M YTD"],
            Rgba::new(0, 198, 255, 60),
            Rgba::from_hex(0x00c6ff),
        );
        spawn_panel(
            graph,
            group,
            PanelSpec {
                name: "holo_content",
                transform: Transform::IDENTITY,
                texture_size: (256, 384),
                quad_size: (1.5, 2.0),
                opacity: 0.8,
            },
            &content,
        )?;
        Ok(())
    }

    fn build_floating_display(graph: &mut SceneGraph, root: NodeId) -> Result<NodeId, EntityError> {
        let display = graph.spawn(root, Node::group("floating_display", Transform::from_xyz(0.0, 3.0, -0.5)))?;
        graph.spawn(
            display,
            Node::mesh(
                "display_core",
                Transform::IDENTITY,
                Shape::Sphere { radius: 0.2 },
                Material::solid(0x0072ff).with_opacity(0.8).unlit(),
            ),
        )?;
        for i in 0..3 {
            let tilt = Quat::from_rotation_x(0.6 * i as f32) * Quat::from_rotation_z(0.9 * i as f32);
            graph.spawn(
                display,
                Node::mesh(
                    "display_ring",
                    Transform::from_xyz(0.0, i as f32 * 0.3, 0.0)
                        .with_rotation(tilt)
                        .with_scale(Vec3::new(1.0, 0.04, 1.0)),
                    Shape::Sphere { radius: 0.5 },
                    Material::solid(0x00c6ff).with_opacity(0.6).unlit(),
                ),
            )?;
        }
        Ok(display)
    }
}

impl Default for DeskWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for DeskWorkspace {
    fn kind(&self) -> &'static str {
        "desk"
    }

    fn build(&mut self, graph: &mut SceneGraph) -> Result<(), EntityError> {
        let root = self.core.begin_build(graph, "desk", Transform::IDENTITY)?;
        graph.spawn(
            root,
            Node::mesh(
                "desk_top",
                Transform::from_xyz(0.0, 1.5, 0.0),
                Shape::Cuboid { half_extents: Vec3::new(3.0, 0.05, 1.5) },
                Material::solid(0x8b6f47),
            ),
        )?;
        for (x, z) in [(-2.8, -1.3), (2.8, -1.3), (-2.8, 1.3), (2.8, 1.3)] {
            graph.spawn(
                root,
                Node::mesh(
                    "desk_leg",
                    Transform::from_xyz(x, 0.75, z),
                    Shape::Cuboid { half_extents: Vec3::new(0.05, 0.75, 0.05) },
                    Material::solid(0x34495e),
                ),
            )?;
        }
        Self::build_laptop(graph, root)?;
        Self::build_holo_panel(graph, root, -2.0)?;
        Self::build_holo_panel(graph, root, 2.0)?;
        self.floating_display = Some(Self::build_floating_display(graph, root)?);
        Ok(())
    }

    fn tick(&mut self, graph: &mut SceneGraph, dt: f32) -> Result<(), EntityError> {
        let display = self.floating_display.ok_or(EntityError::NotBuilt)?;
        let t = self.core.advance(dt) as f32;
        graph.node_mut(display)?.transform.rotation = Quat::from_rotation_y(t * DISPLAY_SPIN);
        Ok(())
    }

    fn animation_time(&self) -> f64 {
        self.core.time()
    }

    fn release(&mut self, graph: &mut SceneGraph) -> Result<usize, EntityError> {
        self.floating_display = None;
        self.core.release(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_rotates_with_time() {
        let mut graph = SceneGraph::new();
        let mut desk = DeskWorkspace::new();
        desk.build(&mut graph).unwrap();
        desk.tick(&mut graph, 1.0).unwrap();
        let node = desk.floating_display.unwrap();
        let (axis, angle) = graph.node(node).unwrap().transform.rotation.to_axis_angle();
        assert!((angle - DISPLAY_SPIN).abs() < 1e-3, "angle {angle}");
        assert!((axis - Vec3::Y).length() < 1e-3);
    }

    #[test]
    fn test_build_creates_three_textures() {
        let mut graph = SceneGraph::new();
        let mut desk = DeskWorkspace::new();
        desk.build(&mut graph).unwrap();
        assert_eq!(graph.live_textures(), 3, "laptop plus two holo panels");
        assert!(desk.release(&mut graph).unwrap() > 0);
        assert_eq!(graph.live_textures(), 0);
    }
}
