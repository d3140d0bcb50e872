//! Pointer ray picking across every entity's interactive surfaces.

use crate::camera::Camera;
use crate::entity::{EntityId, InteractiveSurface, Pick};
use crate::math::Ray;
use crate::scene::{NodeId, SceneGraph};

/// Distances closer than this count as a tie
pub const DEFAULT_TIE_TOLERANCE: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub entity: EntityId,
    pub pick: Pick,
    pub node: NodeId,
    pub distance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
}

impl Cursor {
    pub fn for_hit(hit: Option<&Hit>) -> Self {
        if hit.is_some() {
            Cursor::Pointer
        } else {
            Cursor::Default
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InteractionResolver {
    tolerance: f32,
}

impl InteractionResolver {
    pub fn new(tolerance: f32) -> Self {
        Self {
            tolerance: tolerance.max(0.0),
        }
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    pub fn ray_for_pointer(camera: &Camera, ndc_x: f32, ndc_y: f32) -> Ray {
        camera.ray_from_ndc(ndc_x, ndc_y)
    }

    /// Nearest surface along `ray`.
    ///
    /// Surfaces within the tie tolerance of the nearest one resolve to the
    /// lowest entity id, then to the order the entity listed them.
    pub fn resolve<I>(&self, ray: &Ray, graph: &SceneGraph, surfaces: I) -> Option<Hit>
    where
        I: IntoIterator<Item = (EntityId, InteractiveSurface)>,
    {
        let hits: Vec<Hit> = surfaces
            .into_iter()
            .filter_map(|(entity, surface)| {
                let hit = graph.intersect_node(surface.node, ray)?;
                Some(Hit {
                    entity,
                    pick: surface.pick,
                    node: surface.node,
                    distance: hit.t,
                })
            })
            .collect();

        let nearest = hits.iter().map(|h| h.distance).fold(f32::INFINITY, f32::min);
        hits.into_iter()
            .filter(|h| h.distance <= nearest + self.tolerance)
            .min_by_key(|h| h.entity)
    }

    pub fn resolve_pointer<I>(&self, camera: &Camera, ndc: (f32, f32), graph: &SceneGraph, surfaces: I) -> Option<Hit>
    where
        I: IntoIterator<Item = (EntityId, InteractiveSurface)>,
    {
        self.resolve(&Self::ray_for_pointer(camera, ndc.0, ndc.1), graph, surfaces)
    }
}

impl Default for InteractionResolver {
    fn default() -> Self {
        Self::new(DEFAULT_TIE_TOLERANCE)
    }
}

/// Remembers what is under the pointer so stale hover state gets cleared
#[derive(Debug, Default)]
pub struct HoverTracker {
    current: Option<(EntityId, Pick)>,
}

impl HoverTracker {
    pub fn current(&self) -> Option<(EntityId, Pick)> {
        self.current
    }

    /// Hover notifications to deliver, in order: the entity being left first
    pub fn update(&mut self, hit: Option<&Hit>) -> Vec<(EntityId, Option<Pick>)> {
        let next = hit.map(|h| (h.entity, h.pick));
        if next == self.current {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(2);
        if let Some((entity, _)) = self.current {
            if next.map(|(e, _)| e) != Some(entity) {
                out.push((entity, None));
            }
        }
        if let Some((entity, pick)) = next {
            out.push((entity, Some(pick)));
        }
        self.current = next;
        out
    }

    pub fn clear(&mut self) -> Option<EntityId> {
        self.current.take().map(|(e, _)| e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(entity: EntityId, pick: Pick) -> Hit {
        let graph = SceneGraph::new();
        Hit {
            entity,
            pick,
            node: graph.root(),
            distance: 1.0,
        }
    }

    #[test]
    fn test_hover_enter_move_leave() {
        let mut tracker = HoverTracker::default();
        let a = hit(4, Pick::City { id: 0 });
        assert_eq!(tracker.update(Some(&a)), vec![(4, Some(Pick::City { id: 0 }))]);
        assert!(tracker.update(Some(&a)).is_empty(), "unchanged hover is silent");

        let b = hit(4, Pick::City { id: 1 });
        assert_eq!(tracker.update(Some(&b)), vec![(4, Some(Pick::City { id: 1 }))]);

        let c = hit(5, Pick::Avatar);
        assert_eq!(tracker.update(Some(&c)), vec![(4, None), (5, Some(Pick::Avatar))]);
        assert_eq!(tracker.update(None), vec![(5, None)]);
        assert_eq!(tracker.current(), None);
    }

    #[test]
    fn test_cursor_for_hit() {
        let a = hit(0, Pick::Avatar);
        assert_eq!(Cursor::for_hit(Some(&a)), Cursor::Pointer);
        assert_eq!(Cursor::for_hit(None), Cursor::Default);
    }
}
