use glam::{Quat, Vec3};

use super::{spawn_panel, Entity, EntityCore, EntityEvent, InteractiveSurface, PanelSpec, Pick};
use crate::content::PanelContent;
use crate::error::EntityError;
use crate::math::Rgba;
use crate::scene::{Material, Node, NodeId, SceneGraph, Shape, Transform};

pub const DRAWER_OPEN_Z: f32 = 0.5;
pub const DRAWER_CLOSED_Z: f32 = 0.02;

/// Fraction of the remaining distance covered per 60 Hz frame
const EASE_PER_FRAME: f32 = 0.1;

pub struct DrawerSpec {
    pub title: &'static str,
    pub items: &'static [&'static str],
    pub color: u32,
    pub label_color: u32,
}

impl DrawerSpec {
    /// Chat text listing the drawer's contents
    pub fn summary(&self) -> String {
        format!("{} Drawer Contents:\n{}", self.title, self.items.join("\n• "))
    }
}

pub const DRAWERS: [DrawerSpec; 4] = [
    DrawerSpec {
        title: "HIGH PRIORITY",
        items: &["MUJI Hong Kong - Urgent Review", "Disney Renewal - Due Today", "Knight-Swift - Sanctions Required"],
        color: 0x5fa3f5,
        label_color: 0xff8080,
    },
    DrawerSpec {
        title: "MEDIUM RISK",
        items: &["Amazon D&O Policy", "Staples Workers Comp", "RPW Group Liability"],
        color: 0x6ee86e,
        label_color: 0xffb84d,
    },
    DrawerSpec {
        title: "LOW RISK",
        items: &["Small Business Policies", "Standard Renewals", "Routine Reviews"],
        color: 0xffb84d,
        label_color: 0x6ee86e,
    },
    DrawerSpec {
        title: "ARCHIVED",
        items: &["2024 Completed Policies", "Historical Claims", "Past Assessments"],
        color: 0xff8080,
        label_color: 0x5fa3f5,
    },
];

struct Drawer {
    node: NodeId,
    open: bool,
    offset: f32,
}

struct Document {
    node: NodeId,
    drawer: usize,
    slot: usize,
}

struct Floater {
    node: NodeId,
    base_y: f32,
}

/// Four-drawer cabinet; at most one drawer is open at a time
pub struct FilingCabinet {
    core: EntityCore,
    drawers: Vec<Drawer>,
    documents: Vec<Document>,
    floaters: Vec<Floater>,
}

impl FilingCabinet {
    pub fn new() -> Self {
        Self {
            core: EntityCore::default(),
            drawers: Vec::new(),
            documents: Vec::new(),
            floaters: Vec::new(),
        }
    }

    pub fn is_open(&self, index: usize) -> bool {
        self.drawers.get(index).is_some_and(|d| d.open)
    }

    pub fn open_drawer(&self) -> Option<usize> {
        self.drawers.iter().position(|d| d.open)
    }

    pub fn drawer_offset(&self, index: usize) -> Option<f32> {
        self.drawers.get(index).map(|d| d.offset)
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Flip drawer `index` and close every other drawer; returns the new state
    pub fn toggle(&mut self, graph: &mut SceneGraph, index: usize) -> Result<bool, EntityError> {
        if self.drawers.is_empty() {
            return Err(EntityError::NotBuilt);
        }
        if index >= self.drawers.len() {
            return Err(EntityError::Fault(format!("no drawer {index}")));
        }

        let opening = !self.drawers[index].open;
        for i in 0..self.drawers.len() {
            let open = i == index && opening;
            if self.drawers[i].open && !open {
                self.despawn_documents(graph, i)?;
            }
            self.drawers[i].open = open;
        }
        if opening {
            self.spawn_documents(graph, index)?;
        }
        log::debug!("drawer {} ({}) open={}", index, DRAWERS[index].title, opening);
        Ok(opening)
    }

    fn spawn_documents(&mut self, graph: &mut SceneGraph, drawer: usize) -> Result<(), EntityError> {
        let parent = self.drawers[drawer].node;
        for slot in 0..DRAWERS[drawer].items.len() {
            let jitter = ((slot * 7 + drawer * 3) % 5) as f32 / 4.0 - 0.5;
            let node = graph.spawn(
                parent,
                Node::mesh(
                    "document",
                    Transform::from_xyz(jitter * 0.5, 0.5 + slot as f32 * 0.12, 0.3)
                        .with_rotation(Quat::from_rotation_y(jitter * 0.6)),
                    Shape::Quad { width: 0.2, height: 0.3 },
                    Material::solid(0xffffff).with_opacity(0.9).unlit(),
                ),
            )?;
            self.documents.push(Document { node, drawer, slot });
        }
        Ok(())
    }

    fn despawn_documents(&mut self, graph: &mut SceneGraph, drawer: usize) -> Result<(), EntityError> {
        let (gone, kept): (Vec<_>, Vec<_>) = self.documents.drain(..).partition(|d| d.drawer == drawer);
        self.documents = kept;
        for doc in gone {
            graph.release_subtree(doc.node)?;
        }
        Ok(())
    }

    fn build_drawers(&mut self, graph: &mut SceneGraph, root: NodeId) -> Result<(), EntityError> {
        for (i, spec) in DRAWERS.iter().enumerate() {
            let y = 0.25 + i as f32 * 0.5;
            let node = graph.spawn(
                root,
                Node::mesh(
                    "drawer",
                    Transform::from_xyz(0.0, y, DRAWER_CLOSED_Z),
                    Shape::Cuboid { half_extents: Vec3::new(0.45, 0.225, 0.375) },
                    Material::glowing(spec.color, 0.1),
                ),
            )?;
            graph.spawn(
                node,
                Node::mesh(
                    "drawer_handle",
                    Transform::from_xyz(0.0, 0.0, 0.39),
                    Shape::Cuboid { half_extents: Vec3::new(0.15, 0.025, 0.025) },
                    Material::solid(0x666666),
                ),
            )?;
            spawn_panel(
                graph,
                node,
                PanelSpec {
                    name: "drawer_label",
                    transform: Transform::from_xyz(0.0, 0.12, 0.38),
                    texture_size: (256, 64),
                    quad_size: (0.5, 0.125),
                    opacity: 1.0,
                },
                &PanelContent::label(spec.title, &[], Rgba::from_hex(spec.label_color), Rgba::WHITE),
            )?;
            self.drawers.push(Drawer {
                node,
                open: false,
                offset: DRAWER_CLOSED_Z,
            });
        }
        Ok(())
    }
}

impl Default for FilingCabinet {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for FilingCabinet {
    fn kind(&self) -> &'static str {
        "cabinet"
    }

    fn build(&mut self, graph: &mut SceneGraph) -> Result<(), EntityError> {
        let root = self
            .core
            .begin_build(graph, "cabinet", Transform::from_xyz(-7.0, 0.0, 0.0).with_uniform_scale(1.2))?;
        graph.spawn(
            root,
            Node::mesh(
                "cabinet_body",
                Transform::from_xyz(0.0, 1.0, 0.0),
                Shape::Cuboid { half_extents: Vec3::new(0.5, 1.0, 0.4) },
                Material::solid(0xc0c0c0),
            ),
        )?;
        self.build_drawers(graph, root)?;

        for i in 0..5 {
            let f = i as f32;
            let base_y = 2.2 + (f * 0.37) % 1.0 * 1.5;
            let node = graph.spawn(
                root,
                Node::mesh(
                    "floating_document",
                    Transform::from_xyz(-0.8 + f * 0.4, base_y, 0.1 * f)
                        .with_rotation(Quat::from_euler(glam::EulerRot::XYZ, f * 0.7, f * 1.1, f * 0.3)),
                    Shape::Quad { width: 0.3, height: 0.4 },
                    Material::solid(0xffffff).with_opacity(0.8).unlit(),
                ),
            )?;
            self.floaters.push(Floater { node, base_y });
        }
        Ok(())
    }

    fn tick(&mut self, graph: &mut SceneGraph, dt: f32) -> Result<(), EntityError> {
        self.core.root()?;
        let t = self.core.advance(dt) as f32;
        let ease = 1.0 - (1.0 - EASE_PER_FRAME).powf(dt.max(0.0) * 60.0);

        for drawer in &mut self.drawers {
            let target = if drawer.open { DRAWER_OPEN_Z } else { DRAWER_CLOSED_Z };
            drawer.offset += (target - drawer.offset) * ease;
            graph.node_mut(drawer.node)?.transform.translation.z = drawer.offset;
        }
        for (i, floater) in self.floaters.iter().enumerate() {
            let node = graph.node_mut(floater.node)?;
            node.transform.translation.y = floater.base_y + (t + i as f32).sin() * 0.06;
            node.transform.rotation = Quat::from_rotation_y(t * 0.6 + i as f32);
        }
        Ok(())
    }

    fn animation_time(&self) -> f64 {
        self.core.time()
    }

    fn interactive_surfaces(&self) -> Vec<InteractiveSurface> {
        let drawers = self.drawers.iter().enumerate().map(|(index, d)| InteractiveSurface {
            node: d.node,
            pick: Pick::Drawer { index },
        });
        let documents = self.documents.iter().map(|d| InteractiveSurface {
            node: d.node,
            pick: Pick::Document {
                drawer: d.drawer,
                slot: d.slot,
            },
        });
        drawers.chain(documents).collect()
    }

    fn on_click(&mut self, graph: &mut SceneGraph, pick: Pick) -> Result<Option<EntityEvent>, EntityError> {
        match pick {
            Pick::Drawer { index } => {
                let open = self.toggle(graph, index)?;
                Ok(Some(EntityEvent::DrawerToggled { index, open }))
            }
            Pick::Document { drawer, slot } => Ok(Some(EntityEvent::DocumentOpened { drawer, slot })),
            _ => Ok(None),
        }
    }

    fn release(&mut self, graph: &mut SceneGraph) -> Result<usize, EntityError> {
        self.drawers.clear();
        self.documents.clear();
        self.floaters.clear();
        self.core.release(graph)
    }
}
