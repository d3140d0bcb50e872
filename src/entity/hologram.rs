use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{Quat, Vec3};

use super::{spawn_panel, Entity, EntityCore, EntityEvent, InteractiveSurface, PanelSpec, Pick};
use crate::content::PanelContent;
use crate::core::Countdown;
use crate::error::EntityError;
use crate::math::Rgba;
use crate::scene::{Material, Node, NodeId, PointLight, SceneGraph, Shape, Transform};

pub const GLOW_IDLE: u32 = 0x00c6ff;
pub const GLOW_LISTENING: u32 = 0x00ff00;

/// Speech animation length per character of text
const SECONDS_PER_CHAR: f32 = 0.05;
const HEAD_Y: f32 = 3.2;
const RING_SEGMENTS: usize = 12;

struct Parts {
    head: NodeId,
    glow: NodeId,
    rings: Vec<NodeId>,
    pickable: Vec<NodeId>,
}

/// The "ARIA" assistant avatar
pub struct Hologram {
    core: EntityCore,
    parts: Option<Parts>,
    listening: bool,
    speech: Countdown,
}

impl Hologram {
    pub fn new() -> Self {
        Self {
            core: EntityCore::default(),
            parts: None,
            listening: false,
            speech: Countdown::new(0.0),
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn is_speaking(&self) -> bool {
        self.speech.is_active()
    }

    pub fn set_listening(&mut self, listening: bool) {
        self.listening = listening;
    }

    /// Run the speaking animation for as long as `text` takes to say
    pub fn speak(&mut self, text: &str) {
        let seconds = text.chars().count() as f32 * SECONDS_PER_CHAR;
        if seconds > 0.0 {
            self.speech.start_with(seconds);
        }
    }

    pub fn stop_speaking(&mut self) {
        self.speech.cancel();
    }

    pub fn glow(&self, graph: &SceneGraph) -> Option<PointLight> {
        let parts = self.parts.as_ref()?;
        graph.node(parts.glow).ok()?.light
    }

    fn body_part(
        graph: &mut SceneGraph,
        root: NodeId,
        name: &'static str,
        y: f32,
        scale: Vec3,
        material: Material,
    ) -> Result<NodeId, EntityError> {
        Ok(graph.spawn(
            root,
            Node::mesh(
                name,
                Transform::from_xyz(0.0, y, 0.0).with_scale(scale),
                Shape::Sphere { radius: 1.0 },
                material,
            ),
        )?)
    }

    fn build_ring(graph: &mut SceneGraph, root: NodeId, i: usize) -> Result<NodeId, EntityError> {
        let ring = graph.spawn(
            root,
            Node::group(
                "energy_ring",
                Transform::from_xyz(0.0, 2.0 + i as f32 * 0.5, 0.0).with_rotation(Quat::from_rotation_x(FRAC_PI_2)),
            ),
        )?;
        let radius = 1.2 + i as f32 * 0.2;
        let material = Material::solid(0x00c6ff).with_opacity(0.5 - i as f32 * 0.1).unlit();
        for s in 0..RING_SEGMENTS {
            let angle = s as f32 / RING_SEGMENTS as f32 * TAU;
            graph.spawn(
                ring,
                Node::mesh(
                    "ring_segment",
                    Transform::from_xyz(angle.cos() * radius, angle.sin() * radius, 0.0)
                        .with_rotation(Quat::from_rotation_z(angle)),
                    Shape::Cuboid { half_extents: Vec3::new(0.02, 0.3, 0.02) },
                    material,
                ),
            )?;
        }
        Ok(ring)
    }
}

impl Default for Hologram {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for Hologram {
    fn kind(&self) -> &'static str {
        "hologram"
    }

    fn build(&mut self, graph: &mut SceneGraph) -> Result<(), EntityError> {
        let root = self
            .core
            .begin_build(graph, "hologram", Transform::from_xyz(3.0, 0.5, 2.0).with_uniform_scale(0.7))?;

        let platform = Self::body_part(graph, root, "platform", 0.0, Vec3::new(1.0, 0.05, 1.0), Material::glowing(0x0072ff, 0.5))?;
        let lower = Self::body_part(
            graph,
            root,
            "lower_body",
            1.5,
            Vec3::new(0.35, 0.5, 0.35),
            Material::solid(0x00c6ff).with_opacity(0.6).unlit(),
        )?;
        let body = Self::body_part(
            graph,
            root,
            "body",
            2.4,
            Vec3::new(0.3, 0.5, 0.3),
            Material::glowing(0x00c6ff, 0.5).with_opacity(0.7),
        )?;
        let head = Self::body_part(graph, root, "head", HEAD_Y, Vec3::splat(0.25), Material::glowing(0x00c6ff, 0.8).with_opacity(0.8))?;
        let glow = graph.spawn(
            root,
            Node::light(
                "hologram_glow",
                Transform::from_xyz(0.0, 2.0, 0.0),
                PointLight {
                    color: Rgba::from_hex(GLOW_IDLE),
                    intensity: 2.0,
                    range: 6.0,
                },
            ),
        )?;
        let rings = (0..3).map(|i| Self::build_ring(graph, root, i)).collect::<Result<Vec<_>, _>>()?;

        spawn_panel(
            graph,
            root,
            PanelSpec {
                name: "hologram_label",
                transform: Transform::from_xyz(0.0, 5.5, 0.0),
                texture_size: (512, 256),
                quad_size: (2.0, 1.0),
                opacity: 0.9,
            },
            &PanelContent::label(
                "ARIA",
                &[
                    "AI Assistant & Secretary",
                    "Insurance Expert • Note Taker • Meeting Scheduler",
                    "\"How may I assist you today?\"",
                ],
                Rgba::new(0, 20, 40, 160),
                Rgba::from_hex(0x00c6ff),
            ),
        )?;

        self.parts = Some(Parts {
            head,
            glow,
            rings,
            pickable: vec![head, body, lower, platform],
        });
        Ok(())
    }

    fn tick(&mut self, graph: &mut SceneGraph, dt: f32) -> Result<(), EntityError> {
        let parts = self.parts.as_ref().ok_or(EntityError::NotBuilt)?;
        let t = self.core.advance(dt) as f32;
        self.speech.tick(dt.max(0.0));

        let head = graph.node_mut(parts.head)?;
        head.transform.translation.y = HEAD_Y + t.sin() * 0.05;
        let pulse = if self.speech.is_active() { 1.0 + (t * 10.0).sin() * 0.02 } else { 1.0 };
        head.transform.scale = Vec3::splat(0.25 * pulse);

        if let Some(light) = graph.node_mut(parts.glow)?.light.as_mut() {
            let (base, hex) = if self.listening { (3.0, GLOW_LISTENING) } else { (2.0, GLOW_IDLE) };
            light.intensity = base + (t * 2.0).sin() * 0.5;
            light.color = Rgba::from_hex(hex);
        }

        for (i, &ring) in parts.rings.iter().enumerate() {
            let spin = 0.6 * (i + 1) as f32 * t;
            graph.node_mut(ring)?.transform.rotation = Quat::from_rotation_x(FRAC_PI_2) * Quat::from_rotation_z(spin);
        }
        Ok(())
    }

    fn animation_time(&self) -> f64 {
        self.core.time()
    }

    fn interactive_surfaces(&self) -> Vec<InteractiveSurface> {
        self.parts
            .iter()
            .flat_map(|p| p.pickable.iter())
            .map(|&node| InteractiveSurface { node, pick: Pick::Avatar })
            .collect()
    }

    fn on_click(&mut self, _graph: &mut SceneGraph, pick: Pick) -> Result<Option<EntityEvent>, EntityError> {
        Ok(matches!(pick, Pick::Avatar).then_some(EntityEvent::AssistantToggled))
    }

    fn release(&mut self, graph: &mut SceneGraph) -> Result<usize, EntityError> {
        self.parts = None;
        self.speech.cancel();
        self.core.release(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn built() -> (SceneGraph, Hologram) {
        let mut graph = SceneGraph::new();
        let mut holo = Hologram::new();
        holo.build(&mut graph).unwrap();
        (graph, holo)
    }

    #[test]
    fn test_speech_lasts_fifty_ms_per_char() {
        let (mut graph, mut holo) = built();
        holo.speak("0123456789");
        for _ in 0..29 {
            holo.tick(&mut graph, 1.0 / 60.0).unwrap();
        }
        assert!(holo.is_speaking(), "still speaking before 0.5 s");
        for _ in 0..3 {
            holo.tick(&mut graph, 1.0 / 60.0).unwrap();
        }
        assert!(!holo.is_speaking());
    }

    #[test]
    fn test_listening_turns_glow_green() {
        let (mut graph, mut holo) = built();
        holo.set_listening(true);
        holo.tick(&mut graph, 0.016).unwrap();
        let glow = holo.glow(&graph).unwrap();
        assert_eq!(glow.color, Rgba::from_hex(GLOW_LISTENING));
        assert!(glow.intensity >= 2.5 && glow.intensity <= 3.5);

        holo.set_listening(false);
        holo.tick(&mut graph, 0.016).unwrap();
        assert_eq!(holo.glow(&graph).unwrap().color, Rgba::from_hex(GLOW_IDLE));
    }

    #[test]
    fn test_click_requests_assistant() {
        let (mut graph, mut holo) = built();
        assert_eq!(holo.interactive_surfaces().len(), 4);
        assert_eq!(
            holo.on_click(&mut graph, Pick::Avatar).unwrap(),
            Some(EntityEvent::AssistantToggled)
        );
    }

    #[test]
    fn test_head_bob_amplitude() {
        let (mut graph, mut holo) = built();
        let head = holo.parts.as_ref().unwrap().head;
        for _ in 0..400 {
            holo.tick(&mut graph, 1.0 / 60.0).unwrap();
            let y = graph.node(head).unwrap().transform.translation.y;
            assert!((y - HEAD_Y).abs() <= 0.05 + 1e-5);
        }
    }
}
