use glam::Vec3;

use super::{refresh_panel, spawn_panel, Entity, EntityCore, PanelSpec};
use crate::content::{generator, PanelContent};
use crate::error::EntityError;
use crate::math::Rgba;
use crate::scene::{Material, Node, NodeId, PointLight, SceneGraph, Shape, TextureId, Transform};

pub const MONITOR_TITLES: [&str; 4] = ["Task Dashboard", "Portfolio Analytics", "Team Metrics", "Risk Assessment"];
const MONITOR_X: [f32; 4] = [-6.0, -2.0, 2.0, 6.0];
const DEFAULT_GLOW: u32 = 0x0072ff;

struct Screen {
    texture: TextureId,
    glow: NodeId,
}

/// Wall-mounted screen whose texture follows the latest content record
pub struct MonitorPanel {
    core: EntityCore,
    slot: usize,
    texture_size: (u32, u32),
    screen: Option<Screen>,
    /// Latest record that arrived before build
    pending: Option<PanelContent>,
    last_rendered: Option<PanelContent>,
    accent: u32,
    regenerations: usize,
}

impl MonitorPanel {
    pub fn new(slot: usize, texture_size: (u32, u32)) -> Self {
        Self {
            core: EntityCore::default(),
            slot,
            texture_size,
            screen: None,
            pending: None,
            last_rendered: None,
            accent: DEFAULT_GLOW,
            regenerations: 0,
        }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn title(&self) -> &'static str {
        MONITOR_TITLES.get(self.slot).copied().unwrap_or("Monitor")
    }

    pub fn accent(&self) -> u32 {
        self.accent
    }

    /// Texture regenerations caused by content updates
    pub fn regenerations(&self) -> usize {
        self.regenerations
    }

    pub fn last_rendered(&self) -> Option<&PanelContent> {
        self.last_rendered.as_ref()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn texture(&self) -> Option<TextureId> {
        self.screen.as_ref().map(|s| s.texture)
    }

    fn apply(&mut self, graph: &mut SceneGraph, content: &PanelContent) -> Result<bool, EntityError> {
        let screen = self.screen.as_ref().ok_or(EntityError::NotBuilt)?;
        if self.last_rendered.as_ref() == Some(content) {
            return Ok(false);
        }
        let placeholders = refresh_panel(graph, screen.texture, content)?;
        if placeholders > 0 {
            log::warn!(
                "monitor {} rendered {} with {} placeholder field(s)",
                self.slot,
                content.kind(),
                placeholders
            );
        }
        self.accent = generator::accent_color(content);
        if let Some(light) = graph.node_mut(screen.glow)?.light.as_mut() {
            light.color = Rgba::from_hex(self.accent);
        }
        self.last_rendered = Some(content.clone());
        self.regenerations += 1;
        Ok(true)
    }
}

impl Entity for MonitorPanel {
    fn kind(&self) -> &'static str {
        "monitor"
    }

    fn build(&mut self, graph: &mut SceneGraph) -> Result<(), EntityError> {
        let x = MONITOR_X.get(self.slot).copied().unwrap_or(0.0);
        let root = self.core.begin_build(graph, "monitor", Transform::from_xyz(x, 3.0, -7.0))?;
        graph.spawn(
            root,
            Node::mesh(
                "monitor_frame",
                Transform::IDENTITY,
                Shape::Cuboid { half_extents: Vec3::new(1.5, 1.0, 0.05) },
                Material::solid(0x1a1a1a),
            ),
        )?;
        let (_, texture) = spawn_panel(
            graph,
            root,
            PanelSpec {
                name: "monitor_screen",
                transform: Transform::from_xyz(0.0, 0.0, 0.06),
                texture_size: self.texture_size,
                quad_size: (2.8, 1.8),
                opacity: 1.0,
            },
            &PanelContent::Loading {
                title: self.title().to_string(),
            },
        )?;
        let glow = graph.spawn(
            root,
            Node::light(
                "monitor_glow",
                Transform::from_xyz(0.0, 0.0, 0.5),
                PointLight {
                    color: Rgba::from_hex(DEFAULT_GLOW),
                    intensity: 0.5,
                    range: 3.0,
                },
            ),
        )?;
        self.screen = Some(Screen { texture, glow });

        if let Some(content) = self.pending.take() {
            self.apply(graph, &content)?;
        }
        Ok(())
    }

    fn tick(&mut self, graph: &mut SceneGraph, dt: f32) -> Result<(), EntityError> {
        let glow = self.screen.as_ref().ok_or(EntityError::NotBuilt)?.glow;
        let t = self.core.advance(dt) as f32;
        if let Some(light) = graph.node_mut(glow)?.light.as_mut() {
            light.intensity = 0.5 + t.sin() * 0.1;
        }
        Ok(())
    }

    fn animation_time(&self) -> f64 {
        self.core.time()
    }

    /// Before build the record is parked and applied once the screen exists
    fn on_content_update(&mut self, graph: &mut SceneGraph, content: &PanelContent) -> Result<bool, EntityError> {
        if self.screen.is_none() {
            self.pending = Some(content.clone());
            return Ok(false);
        }
        self.apply(graph, content)
    }

    fn release(&mut self, graph: &mut SceneGraph) -> Result<usize, EntityError> {
        self.screen = None;
        self.core.release(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::DashboardCard;

    #[test]
    fn test_accent_follows_content_kind() {
        let mut graph = SceneGraph::new();
        let mut monitor = MonitorPanel::new(2, (128, 80));
        monitor.build(&mut graph).unwrap();
        assert_eq!(monitor.accent(), DEFAULT_GLOW);

        let content = PanelContent::Dashboard(vec![DashboardCard::default()]);
        assert!(monitor.on_content_update(&mut graph, &content).unwrap());
        assert_eq!(monitor.accent(), 0xffa502);
    }

    #[test]
    fn test_latest_pending_record_wins() {
        let mut graph = SceneGraph::new();
        let mut monitor = MonitorPanel::new(0, (128, 80));
        monitor.on_content_update(&mut graph, &PanelContent::Tasks(vec![])).unwrap();
        monitor.on_content_update(&mut graph, &PanelContent::Risk(vec![])).unwrap();
        monitor.build(&mut graph).unwrap();
        assert_eq!(monitor.last_rendered(), Some(&PanelContent::Risk(vec![])));
        assert_eq!(monitor.regenerations(), 1);
        assert!(!monitor.has_pending());
    }

    #[test]
    fn test_title_per_slot() {
        assert_eq!(MonitorPanel::new(3, (8, 8)).title(), "Risk Assessment");
        assert_eq!(MonitorPanel::new(9, (8, 8)).title(), "Monitor");
    }
}
