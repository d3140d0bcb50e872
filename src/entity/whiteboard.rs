use std::f32::consts::{FRAC_PI_2, FRAC_PI_6};

use glam::{Quat, Vec3};

use super::{spawn_panel, Entity, EntityCore, PanelSpec};
use crate::content::PanelContent;
use crate::error::EntityError;
use crate::math::Rgba;
use crate::scene::{Material, Node, SceneGraph, Shape, Transform};

const BOARD_LINES: [&str; 8] = [
    "Risk Assessment > Underwriting > Approval",
    "",
    "Key Metrics:",
    "• Bind Rate: 58%",
    "• Avg Premium: $12,500",
    "• Processing Time: 48hrs",
    "",
    "TODO: - Review MUJI - Call Disney - Update KPIs",
];

const MARKER_COLORS: [u32; 4] = [0xff4757, 0x0072ff, 0x05c46b, 0x1a1a1a];

/// Static planning board angled toward the room center
pub struct Whiteboard {
    core: EntityCore,
}

impl Whiteboard {
    pub fn new() -> Self {
        Self {
            core: EntityCore::default(),
        }
    }

    pub fn content() -> PanelContent {
        PanelContent::label(
            "Q3 2025 Strategy",
            &BOARD_LINES,
            Rgba::WHITE,
            Rgba::from_hex(0x2c3e50),
        )
    }
}

impl Default for Whiteboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for Whiteboard {
    fn kind(&self) -> &'static str {
        "whiteboard"
    }

    fn build(&mut self, graph: &mut SceneGraph) -> Result<(), EntityError> {
        let root = self.core.begin_build(
            graph,
            "whiteboard",
            Transform::from_xyz(7.0, 2.5, 0.0)
                .with_rotation(Quat::from_rotation_y(-FRAC_PI_6))
                .with_uniform_scale(1.3),
        )?;
        graph.spawn(
            root,
            Node::mesh(
                "board_frame",
                Transform::IDENTITY,
                Shape::Cuboid { half_extents: Vec3::new(2.0, 1.25, 0.05) },
                Material::solid(0x2c3e50),
            ),
        )?;
        spawn_panel(
            graph,
            root,
            PanelSpec {
                name: "board_surface",
                transform: Transform::from_xyz(0.0, 0.0, 0.06),
                texture_size: (768, 464),
                quad_size: (3.8, 2.3),
                opacity: 1.0,
            },
            &Self::content(),
        )?;
        graph.spawn(
            root,
            Node::mesh(
                "marker_tray",
                Transform::from_xyz(0.0, -1.3, 0.1),
                Shape::Cuboid { half_extents: Vec3::new(1.5, 0.05, 0.1) },
                Material::solid(0x34495e),
            ),
        )?;
        for (i, hex) in MARKER_COLORS.into_iter().enumerate() {
            graph.spawn(
                root,
                Node::mesh(
                    "marker",
                    Transform::from_xyz(-1.0 + i as f32 * 0.5, -1.3, 0.2)
                        .with_rotation(Quat::from_rotation_z(FRAC_PI_2)),
                    Shape::Cuboid { half_extents: Vec3::new(0.02, 0.1, 0.02) },
                    Material::solid(hex),
                ),
            )?;
        }
        Ok(())
    }

    fn tick(&mut self, _graph: &mut SceneGraph, dt: f32) -> Result<(), EntityError> {
        self.core.root()?;
        self.core.advance(dt);
        Ok(())
    }

    fn animation_time(&self) -> f64 {
        self.core.time()
    }

    fn release(&mut self, graph: &mut SceneGraph) -> Result<usize, EntityError> {
        self.core.release(graph)
    }
}
