use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};

use super::{Entity, EntityCore};
use crate::error::EntityError;
use crate::math::{hsv_to_rgb, Rgba};
use crate::scene::{Material, Node, NodeId, PointLight, SceneGraph, Shape, Transform};

const PARTICLE_COUNT: usize = 100;
const PARTICLE_DRIFT: f32 = 0.15;

/// Floor, walls, ceiling, light rig and drifting dust
pub struct Room {
    core: EntityCore,
    particles: Vec<Particle>,
}

struct Particle {
    node: NodeId,
    base: Vec3,
    phase: f32,
}

/// Tiny LCG so particle layout is stable between runs
struct Scatter(u32);

impl Scatter {
    fn next(&mut self) -> f32 {
        self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (self.0 >> 8) as f32 / (1u32 << 24) as f32
    }
}

fn point_light(hex: u32, intensity: f32, range: f32) -> PointLight {
    PointLight {
        color: Rgba::from_hex(hex),
        intensity,
        range,
    }
}

impl Room {
    pub fn new() -> Self {
        Self {
            core: EntityCore::default(),
            particles: Vec::new(),
        }
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    fn build_shell(graph: &mut SceneGraph, root: NodeId) -> Result<(), EntityError> {
        let wall = Material::solid(0x16213e);
        let plane = |w: f32, h: f32| Shape::Quad { width: w, height: h };

        graph.spawn(
            root,
            Node::mesh(
                "floor",
                Transform::IDENTITY.with_rotation(Quat::from_rotation_x(-FRAC_PI_2)),
                plane(20.0, 20.0),
                Material::solid(0x1a1a2e),
            ),
        )?;
        graph.spawn(
            root,
            Node::mesh(
                "ceiling",
                Transform::from_xyz(0.0, 8.0, 0.0).with_rotation(Quat::from_rotation_x(FRAC_PI_2)),
                plane(20.0, 20.0),
                Material::solid(0x0f0f23),
            ),
        )?;
        graph.spawn(root, Node::mesh("back_wall", Transform::from_xyz(0.0, 4.0, -10.0), plane(20.0, 8.0), wall))?;
        graph.spawn(
            root,
            Node::mesh(
                "left_wall",
                Transform::from_xyz(-10.0, 4.0, 0.0).with_rotation(Quat::from_rotation_y(FRAC_PI_2)),
                plane(20.0, 8.0),
                wall,
            ),
        )?;
        graph.spawn(
            root,
            Node::mesh(
                "right_wall",
                Transform::from_xyz(10.0, 4.0, 0.0).with_rotation(Quat::from_rotation_y(-FRAC_PI_2)),
                plane(20.0, 8.0),
                wall,
            ),
        )?;

        for x in [-5.0, 5.0] {
            graph.spawn(
                root,
                Node::mesh(
                    "light_strip",
                    Transform::from_xyz(x, 7.9, 0.0),
                    Shape::Cuboid { half_extents: Vec3::new(0.05, 0.025, 5.0) },
                    Material::glowing(0x00c6ff, 2.0),
                ),
            )?;
        }
        for x in [-9.5, 9.5] {
            graph.spawn(
                root,
                Node::mesh(
                    "pillar",
                    Transform::from_xyz(x, 4.0, -9.5),
                    Shape::Cuboid { half_extents: Vec3::new(0.3, 4.0, 0.3) },
                    Material::solid(0x2c3e50),
                ),
            )?;
        }
        Ok(())
    }

    fn build_lights(graph: &mut SceneGraph, root: NodeId) -> Result<(), EntityError> {
        let rig = [
            ("blue_light", Vec3::new(-5.0, 3.0, -5.0), point_light(0x00c6ff, 1.0, 15.0)),
            ("purple_light", Vec3::new(5.0, 3.0, -5.0), point_light(0x0072ff, 1.0, 15.0)),
            ("desk_light", Vec3::new(0.0, 5.0, 2.0), point_light(0xffffff, 1.0, 12.0)),
            ("cabinet_light", Vec3::new(-7.0, 3.0, 0.0), point_light(0xffffff, 0.8, 10.0)),
            ("whiteboard_light", Vec3::new(7.0, 3.0, 0.0), point_light(0xffffff, 0.8, 10.0)),
        ];
        for (name, at, light) in rig {
            graph.spawn(root, Node::light(name, Transform::from_xyz(at.x, at.y, at.z), light))?;
        }
        Ok(())
    }
}

impl Default for Room {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for Room {
    fn kind(&self) -> &'static str {
        "room"
    }

    fn build(&mut self, graph: &mut SceneGraph) -> Result<(), EntityError> {
        let root = self.core.begin_build(graph, "room", Transform::IDENTITY)?;
        Self::build_shell(graph, root)?;
        Self::build_lights(graph, root)?;

        let mut scatter = Scatter(0x5eed);
        for _ in 0..PARTICLE_COUNT {
            let base = Vec3::new(
                (scatter.next() - 0.5) * 20.0,
                scatter.next() * 8.0,
                (scatter.next() - 0.5) * 20.0,
            );
            let [r, g, b] = hsv_to_rgb(0.52 + scatter.next() * 0.06, 1.0, 1.0);
            let color = Rgba::from_vec3(Vec3::new(r, g, b));
            let material = Material {
                color,
                emissive: color,
                emissive_intensity: 1.0,
                ..Material::default()
            }
            .with_opacity(0.6)
            .unlit();
            let node = graph.spawn(
                root,
                Node::mesh(
                    "particle",
                    Transform::from_xyz(base.x, base.y, base.z),
                    Shape::Sphere { radius: 0.05 },
                    material,
                ),
            )?;
            self.particles.push(Particle {
                node,
                base,
                phase: scatter.next() * std::f32::consts::TAU,
            });
        }
        log::debug!("room built with {} particles", self.particles.len());
        Ok(())
    }

    fn tick(&mut self, graph: &mut SceneGraph, dt: f32) -> Result<(), EntityError> {
        self.core.root()?;
        let t = self.core.advance(dt) as f32;
        for p in &self.particles {
            let node = graph.node_mut(p.node)?;
            node.transform.translation = p.base + Vec3::new(0.0, (t * 0.5 + p.phase).sin() * PARTICLE_DRIFT, 0.0);
        }
        Ok(())
    }

    fn animation_time(&self) -> f64 {
        self.core.time()
    }

    fn release(&mut self, graph: &mut SceneGraph) -> Result<usize, EntityError> {
        self.particles.clear();
        self.core.release(graph)
    }
}
