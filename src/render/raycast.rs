use glam::{Vec3, Vec4};

use super::RenderBackend;
use crate::camera::Camera;
use crate::core::DisplayContext;
use crate::error::RenderError;
use crate::math::{intersect_aabb, Ray, Rgba, AABB};
use crate::scene::{Drawable, SceneGraph, Shape, SurfaceHit, WorldLight};

pub const FOG_COLOR: u32 = 0x0a0a0f;
pub const FOG_NEAR: f32 = 10.0;
pub const FOG_FAR: f32 = 50.0;

/// Ambient term: 0x404040 at 0.8
pub const AMBIENT: f32 = 0.25 * 0.8;

const SUN_INTENSITY: f32 = 1.2;
const TILE: u32 = 16;
/// Stop compositing once this little light gets through
const MIN_TRANSMITTANCE: f32 = 0.02;

struct Prepared {
    drawable: Drawable,
    bounds: AABB,
}

/// CPU ray caster producing a reduced-resolution preview of the scene
pub struct RayCastPreview {
    scale: f32,
    target: DisplayContext,
    frame: Vec<Rgba>,
    frames: u64,
    sun: Vec3,
}

impl RayCastPreview {
    pub fn new(display: DisplayContext, scale: f32) -> Self {
        let target = display.scaled(scale);
        Self {
            scale,
            target,
            frame: vec![Rgba::from_hex(FOG_COLOR); target.pixel_count()],
            frames: 0,
            sun: Vec3::new(5.0, 10.0, 5.0).normalize(),
        }
    }

    pub fn target(&self) -> DisplayContext {
        self.target
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.frame
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.frame)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.target.width || y >= self.target.height {
            return None;
        }
        self.frame.get((y * self.target.width + x) as usize).copied()
    }

    fn local_bounds(shape: &Shape) -> AABB {
        match *shape {
            Shape::Cuboid { half_extents } => AABB::from_half_extents(half_extents),
            Shape::Sphere { radius } => AABB::from_half_extents(Vec3::splat(radius)),
            Shape::Quad { width, height } => AABB::from_half_extents(Vec3::new(width * 0.5, height * 0.5, 1e-3)),
        }
    }

    /// Screen-space tile rectangle covered by a world box, or every tile if it
    /// crosses the camera plane
    fn tile_span(&self, bounds: &AABB, camera: &Camera, tiles: (u32, u32)) -> Option<(u32, u32, u32, u32)> {
        let vp = camera.view_projection();
        let (mut lo, mut hi) = (glam::Vec2::splat(f32::INFINITY), glam::Vec2::splat(f32::NEG_INFINITY));
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { bounds.min.x } else { bounds.max.x },
                if i & 2 == 0 { bounds.min.y } else { bounds.max.y },
                if i & 4 == 0 { bounds.min.z } else { bounds.max.z },
            );
            let clip = vp * Vec4::new(corner.x, corner.y, corner.z, 1.0);
            if clip.w <= camera.near {
                return Some((0, 0, tiles.0 - 1, tiles.1 - 1));
            }
            let ndc = glam::Vec2::new(clip.x, clip.y) / clip.w;
            lo = lo.min(ndc);
            hi = hi.max(ndc);
        }
        if hi.x < -1.0 || lo.x > 1.0 || hi.y < -1.0 || lo.y > 1.0 {
            return None;
        }
        let to_px = |x: f32, size: u32| ((x + 1.0) * 0.5 * size as f32).clamp(0.0, size as f32 - 1.0) as u32 / TILE;
        let (w, h) = (self.target.width, self.target.height);
        Some((
            to_px(lo.x, w),
            to_px(-hi.y, h),
            to_px(hi.x, w),
            to_px(-lo.y, h),
        ))
    }

    fn shade(&self, prepared: &Prepared, hit: &SurfaceHit, ray: &Ray, lights: &[WorldLight], graph: &SceneGraph) -> (Vec3, f32) {
        let material = &prepared.drawable.material;
        let mut base = material.color.to_vec3();
        let mut alpha = material.opacity;
        if let Some(texture) = material.texture.and_then(|t| graph.texture(t).ok()) {
            let texel = texture.sample(hit.uv);
            base *= texel.to_vec3();
            alpha *= texel.alpha_f32();
        }

        let emissive = material.emissive.to_vec3() * material.emissive_intensity;
        if material.unlit {
            return (base + emissive, alpha);
        }

        let normal = if hit.normal.dot(ray.dir) > 0.0 { -hit.normal } else { hit.normal };
        let position = ray.at(hit.t);
        let mut light = Vec3::splat(AMBIENT) + Vec3::splat(SUN_INTENSITY * normal.dot(self.sun).max(0.0));
        for l in lights {
            let to_light = l.position - position;
            let distance = to_light.length();
            if distance >= l.light.range || distance <= 1e-4 {
                continue;
            }
            let falloff = (1.0 - distance / l.light.range).powi(2);
            let lambert = normal.dot(to_light / distance).max(0.0);
            light += l.light.color.to_vec3() * l.light.intensity * falloff * lambert;
        }
        (base * light + emissive, alpha)
    }
}

impl RenderBackend for RayCastPreview {
    fn resize(&mut self, display: DisplayContext) -> Result<(), RenderError> {
        if display.is_empty() {
            return Err(RenderError::ZeroSize);
        }
        self.target = display.scaled(self.scale);
        self.frame = vec![Rgba::from_hex(FOG_COLOR); self.target.pixel_count()];
        Ok(())
    }

    fn render(&mut self, graph: &SceneGraph, camera: &Camera) -> Result<(), RenderError> {
        let (w, h) = (self.target.width, self.target.height);
        if w == 0 || h == 0 {
            return Err(RenderError::ZeroSize);
        }
        let tiles = (w.div_ceil(TILE), h.div_ceil(TILE));
        let mut bins: Vec<Vec<usize>> = vec![Vec::new(); (tiles.0 * tiles.1) as usize];

        let prepared: Vec<Prepared> = graph
            .drawables()
            .into_iter()
            .map(|d| Prepared {
                bounds: Self::local_bounds(&d.shape).transformed(&d.world),
                drawable: d,
            })
            .collect();
        for (i, p) in prepared.iter().enumerate() {
            if let Some((x0, y0, x1, y1)) = self.tile_span(&p.bounds, camera, tiles) {
                for ty in y0..=y1 {
                    for tx in x0..=x1 {
                        bins[(ty * tiles.0 + tx) as usize].push(i);
                    }
                }
            }
        }

        let lights = graph.lights();
        let fog = Rgba::from_hex(FOG_COLOR).to_vec3();
        let mut frame = std::mem::take(&mut self.frame);
        frame.resize(self.target.pixel_count(), Rgba::BLACK);
        let mut hits: Vec<(f32, usize, SurfaceHit)> = Vec::new();

        for y in 0..h {
            for x in 0..w {
                let ndc_x = (x as f32 + 0.5) / w as f32 * 2.0 - 1.0;
                let ndc_y = 1.0 - (y as f32 + 0.5) / h as f32 * 2.0;
                let ray = camera.ray_from_ndc(ndc_x, ndc_y);

                hits.clear();
                for &i in &bins[((y / TILE) * tiles.0 + x / TILE) as usize] {
                    let p = &prepared[i];
                    if intersect_aabb(ray.origin, ray.dir, p.bounds.min, p.bounds.max).is_none() {
                        continue;
                    }
                    if let Some(hit) = p.drawable.intersect(&ray) {
                        hits.push((hit.t, i, hit));
                    }
                }
                hits.sort_by(|a, b| a.0.total_cmp(&b.0));

                let mut color = Vec3::ZERO;
                let mut transmittance = 1.0;
                for (t, i, hit) in &hits {
                    let (lit, alpha) = self.shade(&prepared[*i], hit, &ray, &lights, graph);
                    let haze = ((t - FOG_NEAR) / (FOG_FAR - FOG_NEAR)).clamp(0.0, 1.0);
                    let c = lit.lerp(fog, haze);
                    color += c * alpha * transmittance;
                    transmittance *= 1.0 - alpha;
                    if transmittance < MIN_TRANSMITTANCE {
                        break;
                    }
                }
                color += fog * transmittance;
                frame[(y * w + x) as usize] = Rgba::from_vec3(color);
            }
        }

        self.frame = frame;
        self.frames += 1;
        Ok(())
    }

    fn release(&mut self) {
        self.frame = Vec::new();
    }

    fn frames_rendered(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Material, Node, Transform};

    fn camera() -> Camera {
        Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 1.0)
    }

    #[test]
    fn test_empty_scene_is_fog() {
        let mut preview = RayCastPreview::new(DisplayContext::new(64, 64), 0.5);
        preview.render(&SceneGraph::new(), &camera()).unwrap();
        assert_eq!(preview.target(), DisplayContext::new(32, 32));
        assert!(preview.pixels().iter().all(|&p| p == Rgba::from_hex(FOG_COLOR)));
    }

    #[test]
    fn test_unlit_quad_fills_center() {
        let mut graph = SceneGraph::new();
        graph
            .spawn(
                graph.root(),
                Node::mesh(
                    "q",
                    Transform::IDENTITY,
                    Shape::Quad { width: 2.0, height: 2.0 },
                    Material::solid(0xff0000).unlit(),
                ),
            )
            .unwrap();
        let mut preview = RayCastPreview::new(DisplayContext::new(32, 32), 1.0);
        preview.render(&graph, &camera()).unwrap();
        assert_eq!(preview.pixel(16, 16), Some(Rgba::from_hex(0xff0000)));
        assert_eq!(preview.pixel(0, 0), Some(Rgba::from_hex(FOG_COLOR)));
    }

    #[test]
    fn test_zero_size_rejected() {
        let mut preview = RayCastPreview::new(DisplayContext::new(32, 32), 1.0);
        assert!(matches!(preview.resize(DisplayContext::new(0, 10)), Err(RenderError::ZeroSize)));
    }
}
