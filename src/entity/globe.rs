use glam::{Quat, Vec3};

use super::{refresh_panel, spawn_panel, Entity, EntityCore, EntityEvent, InteractiveSurface, PanelSpec, Pick};
use crate::content::{CityStats, PanelContent};
use crate::error::EntityError;
use crate::math::Rgba;
use crate::scene::{Material, Node, NodeId, SceneGraph, Shape, TextureId, Transform};

pub const GLOBE_RADIUS: f32 = 1.5;

/// Globe spin, radians per second
const SPIN: f32 = 0.12;

/// Point on a sphere of `radius` for a latitude/longitude in degrees
pub fn city_position(lat: f32, lon: f32, radius: f32) -> Vec3 {
    let phi = (90.0 - lat).to_radians();
    let theta = (lon + 180.0).to_radians();
    Vec3::new(
        -radius * phi.sin() * theta.cos(),
        radius * phi.cos(),
        radius * phi.sin() * theta.sin(),
    )
}

fn marker_color(risk: &str) -> u32 {
    match risk {
        "Medium" => 0xffa502,
        "Low" => 0x05c46b,
        _ => 0xff4757,
    }
}

struct InfoPanel {
    node: NodeId,
    texture: TextureId,
    showing: Option<usize>,
}

/// Rotating globe with one pickable marker per city and a hover card
pub struct Globe {
    core: EntityCore,
    cities: Vec<CityStats>,
    sphere: Option<NodeId>,
    markers: Vec<NodeId>,
    info: Option<InfoPanel>,
}

impl Globe {
    pub fn new(cities: Vec<CityStats>) -> Self {
        Self {
            core: EntityCore::default(),
            cities,
            sphere: None,
            markers: Vec::new(),
            info: None,
        }
    }

    pub fn cities(&self) -> &[CityStats] {
        &self.cities
    }

    pub fn marker(&self, id: usize) -> Option<NodeId> {
        self.markers.get(id).copied()
    }

    /// City whose card is currently visible
    pub fn hovered_city(&self) -> Option<usize> {
        self.info.as_ref().and_then(|i| i.showing)
    }

    pub fn info_panel_opacity(&self, graph: &SceneGraph) -> Option<f32> {
        let info = self.info.as_ref()?;
        graph.node(info.node).ok().map(|n| n.material.opacity)
    }

    fn show_city(&mut self, graph: &mut SceneGraph, id: usize) -> Result<(), EntityError> {
        let Some(city) = self.cities.get(id) else {
            return self.hide_city(graph);
        };
        let info = self.info.as_mut().ok_or(EntityError::NotBuilt)?;
        if info.showing != Some(id) {
            refresh_panel(graph, info.texture, &PanelContent::City(city.clone()))?;
            info.showing = Some(id);
        }
        graph.node_mut(info.node)?.material.opacity = 1.0;
        Ok(())
    }

    fn hide_city(&mut self, graph: &mut SceneGraph) -> Result<(), EntityError> {
        let info = self.info.as_mut().ok_or(EntityError::NotBuilt)?;
        info.showing = None;
        graph.node_mut(info.node)?.material.opacity = 0.0;
        Ok(())
    }
}

impl Entity for Globe {
    fn kind(&self) -> &'static str {
        "globe"
    }

    fn build(&mut self, graph: &mut SceneGraph) -> Result<(), EntityError> {
        let root = self.core.begin_build(graph, "globe", Transform::from_xyz(5.0, 2.0, -5.0))?;
        let sphere = graph.spawn(
            root,
            Node::mesh(
                "globe_sphere",
                Transform::IDENTITY,
                Shape::Sphere { radius: GLOBE_RADIUS },
                Material::solid(0x0072ff).with_opacity(0.3),
            ),
        )?;
        graph.spawn(
            sphere,
            Node::mesh(
                "globe_continents",
                Transform::IDENTITY,
                Shape::Sphere { radius: GLOBE_RADIUS + 0.01 },
                Material::solid(0x00c6ff).with_opacity(0.2).unlit(),
            ),
        )?;
        self.sphere = Some(sphere);

        for city in &self.cities {
            let at = city_position(city.lat, city.lon, GLOBE_RADIUS);
            let marker = graph.spawn(
                root,
                Node::mesh(
                    "city_marker",
                    Transform::from_xyz(at.x, at.y, at.z),
                    Shape::Sphere { radius: city.size },
                    Material::glowing(marker_color(&city.risk), 1.0),
                ),
            )?;
            self.markers.push(marker);
            spawn_panel(
                graph,
                root,
                PanelSpec {
                    name: "city_label",
                    transform: Transform::from_xyz(at.x, at.y + 0.2, at.z),
                    texture_size: (256, 64),
                    quad_size: (0.5, 0.125),
                    opacity: 0.8,
                },
                &PanelContent::label(&city.name, &[], Rgba::new(0, 0, 0, 178), Rgba::WHITE),
            )?;
        }

        let (node, texture) = spawn_panel(
            graph,
            root,
            PanelSpec {
                name: "city_info",
                transform: Transform::from_xyz(0.0, 3.0, 0.0),
                texture_size: (512, 384),
                quad_size: (2.0, 1.5),
                opacity: 0.0,
            },
            &PanelContent::label("", &[], Rgba::TRANSPARENT, Rgba::TRANSPARENT),
        )?;
        self.info = Some(InfoPanel {
            node,
            texture,
            showing: None,
        });
        Ok(())
    }

    fn tick(&mut self, graph: &mut SceneGraph, dt: f32) -> Result<(), EntityError> {
        let sphere = self.sphere.ok_or(EntityError::NotBuilt)?;
        let t = self.core.advance(dt) as f32;
        graph.node_mut(sphere)?.transform.rotation = Quat::from_rotation_y(t * SPIN);
        for (i, &marker) in self.markers.iter().enumerate() {
            let pulse = 1.0 + (t * 2.0 + i as f32).sin() * 0.3;
            graph.node_mut(marker)?.transform.scale = Vec3::splat(pulse);
        }
        Ok(())
    }

    fn animation_time(&self) -> f64 {
        self.core.time()
    }

    fn interactive_surfaces(&self) -> Vec<InteractiveSurface> {
        self.markers
            .iter()
            .enumerate()
            .map(|(id, &node)| InteractiveSurface {
                node,
                pick: Pick::City { id },
            })
            .collect()
    }

    fn on_click(&mut self, _graph: &mut SceneGraph, pick: Pick) -> Result<Option<EntityEvent>, EntityError> {
        match pick {
            Pick::City { id } => Ok(self.cities.get(id).cloned().map(EntityEvent::CitySelected)),
            _ => Ok(None),
        }
    }

    fn on_hover(&mut self, graph: &mut SceneGraph, pick: Option<Pick>) -> Result<(), EntityError> {
        match pick {
            Some(Pick::City { id }) => self.show_city(graph, id),
            _ => self.hide_city(graph),
        }
    }

    fn release(&mut self, graph: &mut SceneGraph) -> Result<usize, EntityError> {
        self.sphere = None;
        self.markers.clear();
        self.info = None;
        self.core.release(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_position_on_sphere() {
        for city in CityStats::defaults() {
            let p = city_position(city.lat, city.lon, GLOBE_RADIUS);
            assert!((p.length() - GLOBE_RADIUS).abs() < 1e-4, "{} off sphere", city.name);
        }
        let north = city_position(90.0, 0.0, 1.0);
        assert!((north - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_hover_shows_then_clears_card() {
        let mut graph = SceneGraph::new();
        let mut globe = Globe::new(CityStats::defaults());
        globe.build(&mut graph).unwrap();
        assert_eq!(globe.info_panel_opacity(&graph), Some(0.0));

        globe.on_hover(&mut graph, Some(Pick::City { id: 2 })).unwrap();
        assert_eq!(globe.hovered_city(), Some(2));
        assert_eq!(globe.info_panel_opacity(&graph), Some(1.0));

        globe.on_hover(&mut graph, None).unwrap();
        assert_eq!(globe.hovered_city(), None);
        assert_eq!(globe.info_panel_opacity(&graph), Some(0.0));
    }

    #[test]
    fn test_click_yields_city_record() {
        let mut graph = SceneGraph::new();
        let mut globe = Globe::new(CityStats::defaults());
        globe.build(&mut graph).unwrap();
        let event = globe.on_click(&mut graph, Pick::City { id: 0 }).unwrap();
        match event {
            Some(EntityEvent::CitySelected(city)) => assert_eq!(city.name, "New York"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(globe.on_click(&mut graph, Pick::City { id: 99 }).unwrap(), None);
    }

    #[test]
    fn test_markers_pulse_within_bounds() {
        let mut graph = SceneGraph::new();
        let mut globe = Globe::new(CityStats::defaults());
        globe.build(&mut graph).unwrap();
        for _ in 0..90 {
            globe.tick(&mut graph, 1.0 / 60.0).unwrap();
            for id in 0..5 {
                let s = graph.node(globe.marker(id).unwrap()).unwrap().transform.scale.x;
                assert!((0.7 - 1e-4..=1.3 + 1e-4).contains(&s), "scale {s}");
            }
        }
    }
}
