//! Scene entities: independently owned, ticked every frame, optionally pickable.
//!
//! Every entity owns exactly one subtree of the [`SceneGraph`] and only ever
//! touches nodes inside it. The orchestrator stores entities in a flat
//! registry and talks to them through [`Entity`] alone.

mod cabinet;
mod desk;
mod globe;
mod hologram;
mod monitor;
mod room;
mod whiteboard;

pub use cabinet::{DrawerSpec, FilingCabinet, DRAWERS, DRAWER_CLOSED_Z, DRAWER_OPEN_Z};
pub use desk::DeskWorkspace;
pub use globe::{city_position, Globe, GLOBE_RADIUS};
pub use hologram::{Hologram, GLOW_IDLE, GLOW_LISTENING};
pub use monitor::{MonitorPanel, MONITOR_TITLES};
pub use room::Room;
pub use whiteboard::Whiteboard;

use crate::content::{render, CityStats, PanelContent};
use crate::error::{EntityError, SceneError};
use crate::scene::{Material, Node, NodeId, SceneGraph, Shape, TextureId, Transform};

/// Slot in the orchestrator's registry; lower ids were built earlier
pub type EntityId = usize;

/// What a pickable node stands for, decoded by its owning entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    Drawer { index: usize },
    Document { drawer: usize, slot: usize },
    City { id: usize },
    Avatar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractiveSurface {
    pub node: NodeId,
    pub pick: Pick,
}

/// Outcome of a click that matters outside the entity
#[derive(Debug, Clone, PartialEq)]
pub enum EntityEvent {
    DrawerToggled { index: usize, open: bool },
    DocumentOpened { drawer: usize, slot: usize },
    CitySelected(CityStats),
    AssistantToggled,
}

pub trait Entity {
    fn kind(&self) -> &'static str;

    /// Attach the entity's subtree to the scene. Must run exactly once.
    fn build(&mut self, graph: &mut SceneGraph) -> Result<(), EntityError>;

    /// Per-frame update. Never allocates geometry except where pickable
    /// content appears or disappears in response to a click.
    fn tick(&mut self, graph: &mut SceneGraph, dt: f32) -> Result<(), EntityError>;

    /// Seconds of animation time accumulated by `tick`
    fn animation_time(&self) -> f64;

    fn interactive_surfaces(&self) -> Vec<InteractiveSurface> {
        Vec::new()
    }

    fn on_click(&mut self, _graph: &mut SceneGraph, _pick: Pick) -> Result<Option<EntityEvent>, EntityError> {
        Ok(None)
    }

    /// `None` means the pointer is no longer over any of this entity's surfaces
    fn on_hover(&mut self, _graph: &mut SceneGraph, _pick: Option<Pick>) -> Result<(), EntityError> {
        Ok(())
    }

    /// Panels only. Returns whether the texture was regenerated.
    fn on_content_update(&mut self, _graph: &mut SceneGraph, _content: &PanelContent) -> Result<bool, EntityError> {
        Ok(false)
    }

    /// Free the subtree; a second call is a no-op returning 0
    fn release(&mut self, graph: &mut SceneGraph) -> Result<usize, EntityError>;
}

/// Subtree root plus animation clock, shared by every built-in entity
#[derive(Debug, Default)]
pub(crate) struct EntityCore {
    root: Option<NodeId>,
    released: bool,
    time: f64,
}

impl EntityCore {
    pub fn begin_build(&mut self, graph: &mut SceneGraph, name: &'static str, transform: Transform) -> Result<NodeId, EntityError> {
        if self.root.is_some() || self.released {
            return Err(EntityError::AlreadyBuilt);
        }
        let root = graph.spawn(graph.root(), Node::group(name, transform))?;
        self.root = Some(root);
        Ok(root)
    }

    pub fn root(&self) -> Result<NodeId, EntityError> {
        self.root.ok_or(EntityError::NotBuilt)
    }

    pub fn is_built(&self) -> bool {
        self.root.is_some()
    }

    /// Advance the clock; strictly increasing even for a zero or negative dt
    pub fn advance(&mut self, dt: f32) -> f64 {
        self.time += (dt as f64).max(1e-6);
        self.time
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn release(&mut self, graph: &mut SceneGraph) -> Result<usize, EntityError> {
        match self.root.take() {
            Some(root) => {
                self.released = true;
                Ok(graph.release_subtree(root)?)
            }
            None => Ok(0),
        }
    }
}

/// Textured quad whose pixels come from the content generator
pub(crate) struct PanelSpec {
    pub name: &'static str,
    pub transform: Transform,
    pub texture_size: (u32, u32),
    pub quad_size: (f32, f32),
    pub opacity: f32,
}

pub(crate) fn spawn_panel(
    graph: &mut SceneGraph,
    parent: NodeId,
    spec: PanelSpec,
    content: &PanelContent,
) -> Result<(NodeId, TextureId), SceneError> {
    let (tw, th) = spec.texture_size;
    let texture = graph.add_texture(render(content, tw, th).canvas.into_texture());
    let node = graph.spawn(
        parent,
        Node::mesh(
            spec.name,
            spec.transform,
            Shape::Quad {
                width: spec.quad_size.0,
                height: spec.quad_size.1,
            },
            Material::textured(texture).with_opacity(spec.opacity),
        ),
    )?;
    Ok((node, texture))
}

/// Regenerate an existing panel texture in place; returns the placeholder count
pub(crate) fn refresh_panel(
    graph: &mut SceneGraph,
    texture: TextureId,
    content: &PanelContent,
) -> Result<usize, SceneError> {
    let (width, height) = {
        let current = graph.texture(texture)?;
        (current.width, current.height)
    };
    let rendered = render(content, width, height);
    graph.replace_texture(texture, rendered.canvas.into_texture())?;
    Ok(rendered.placeholders)
}

/// Closed set of office entities plus an escape hatch for caller-defined ones
pub enum SceneEntity {
    Room(Room),
    Desk(DeskWorkspace),
    Cabinet(FilingCabinet),
    Whiteboard(Whiteboard),
    Globe(Globe),
    Hologram(Hologram),
    Monitor(MonitorPanel),
    External(Box<dyn Entity>),
}

impl SceneEntity {
    pub fn inner(&self) -> &dyn Entity {
        match self {
            SceneEntity::Room(e) => e,
            SceneEntity::Desk(e) => e,
            SceneEntity::Cabinet(e) => e,
            SceneEntity::Whiteboard(e) => e,
            SceneEntity::Globe(e) => e,
            SceneEntity::Hologram(e) => e,
            SceneEntity::Monitor(e) => e,
            SceneEntity::External(e) => e.as_ref(),
        }
    }

    pub fn inner_mut(&mut self) -> &mut dyn Entity {
        match self {
            SceneEntity::Room(e) => e,
            SceneEntity::Desk(e) => e,
            SceneEntity::Cabinet(e) => e,
            SceneEntity::Whiteboard(e) => e,
            SceneEntity::Globe(e) => e,
            SceneEntity::Hologram(e) => e,
            SceneEntity::Monitor(e) => e,
            SceneEntity::External(e) => e.as_mut(),
        }
    }

    pub fn as_cabinet(&self) -> Option<&FilingCabinet> {
        match self {
            SceneEntity::Cabinet(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_globe(&self) -> Option<&Globe> {
        match self {
            SceneEntity::Globe(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_hologram(&self) -> Option<&Hologram> {
        match self {
            SceneEntity::Hologram(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_hologram_mut(&mut self) -> Option<&mut Hologram> {
        match self {
            SceneEntity::Hologram(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_monitor(&self) -> Option<&MonitorPanel> {
        match self {
            SceneEntity::Monitor(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_monitor_mut(&mut self) -> Option<&mut MonitorPanel> {
        match self {
            SceneEntity::Monitor(m) => Some(m),
            _ => None,
        }
    }
}

impl From<Box<dyn Entity>> for SceneEntity {
    fn from(entity: Box<dyn Entity>) -> Self {
        SceneEntity::External(entity)
    }
}

/// The furnished office in build order
pub fn office_entities(cities: Vec<CityStats>, panel_texture: (u32, u32)) -> Vec<SceneEntity> {
    let mut entities = vec![
        SceneEntity::Room(Room::new()),
        SceneEntity::Desk(DeskWorkspace::new()),
        SceneEntity::Cabinet(FilingCabinet::new()),
        SceneEntity::Whiteboard(Whiteboard::new()),
        SceneEntity::Globe(Globe::new(cities)),
        SceneEntity::Hologram(Hologram::new()),
    ];
    entities.extend(
        (0..MONITOR_TITLES.len()).map(|slot| SceneEntity::Monitor(MonitorPanel::new(slot, panel_texture))),
    );
    entities
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_rejects_second_build() {
        let mut graph = SceneGraph::new();
        let mut core = EntityCore::default();
        core.begin_build(&mut graph, "a", Transform::IDENTITY).unwrap();
        assert!(matches!(
            core.begin_build(&mut graph, "a", Transform::IDENTITY),
            Err(EntityError::AlreadyBuilt)
        ));
    }

    #[test]
    fn test_core_release_is_idempotent() {
        let mut graph = SceneGraph::new();
        let mut core = EntityCore::default();
        let root = core.begin_build(&mut graph, "a", Transform::IDENTITY).unwrap();
        graph.spawn(root, Node::group("child", Transform::IDENTITY)).unwrap();
        assert_eq!(core.release(&mut graph).unwrap(), 2);
        assert_eq!(core.release(&mut graph).unwrap(), 0);
        assert!(matches!(core.root(), Err(EntityError::NotBuilt)));
    }

    #[test]
    fn test_core_clock_strictly_increases() {
        let mut core = EntityCore::default();
        let a = core.advance(0.0);
        let b = core.advance(-1.0);
        assert!(b > a && a > 0.0);
    }

    #[test]
    fn test_refresh_panel_keeps_texture_size() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let spec = PanelSpec {
            name: "p",
            transform: Transform::IDENTITY,
            texture_size: (64, 32),
            quad_size: (1.0, 0.5),
            opacity: 1.0,
        };
        let (_, tex) = spawn_panel(&mut graph, root, spec, &PanelContent::Loading { title: "x".into() }).unwrap();
        refresh_panel(&mut graph, tex, &PanelContent::Tasks(vec![])).unwrap();
        let texture = graph.texture(tex).unwrap();
        assert_eq!((texture.width, texture.height), (64, 32));
    }
}
