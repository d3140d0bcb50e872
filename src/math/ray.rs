use glam::{Mat4, Vec2, Vec3};

/// Hits closer than this are treated as self-intersections
pub const T_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }

    /// Maps the ray through an affine transform.
    ///
    /// The direction is left unnormalized so a parameter `t` names the same
    /// point before and after the transform.
    pub fn transformed(&self, matrix: &Mat4) -> Ray {
        Ray {
            origin: matrix.transform_point3(self.origin),
            dir: matrix.transform_vector3(self.dir),
        }
    }
}

pub fn intersect_aabb(ray_origin: Vec3, ray_dir: Vec3, box_min: Vec3, box_max: Vec3) -> Option<f32> {
    const EPSILON: f32 = 1e-8;

    // Near-zero components clamp to a huge inverse instead of dividing by zero
    let inv_dir = Vec3::new(
        if ray_dir.x.abs() < EPSILON { 1.0 / EPSILON.copysign(ray_dir.x) } else { 1.0 / ray_dir.x },
        if ray_dir.y.abs() < EPSILON { 1.0 / EPSILON.copysign(ray_dir.y) } else { 1.0 / ray_dir.y },
        if ray_dir.z.abs() < EPSILON { 1.0 / EPSILON.copysign(ray_dir.z) } else { 1.0 / ray_dir.z },
    );

    let t_min = (box_min - ray_origin) * inv_dir;
    let t_max = (box_max - ray_origin) * inv_dir;

    let t1 = t_min.min(t_max);
    let t2 = t_min.max(t_max);

    let t_near = t1.x.max(t1.y).max(t1.z);
    let t_far = t2.x.min(t2.y).min(t2.z);

    if t_near > t_far || t_far < 0.0 {
        return None;
    }

    if t_near < T_EPSILON {
        (t_far > T_EPSILON).then_some(t_far)
    } else {
        Some(t_near)
    }
}

pub fn intersect_sphere(ray_origin: Vec3, ray_dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray_origin - center;
    let a = ray_dir.dot(ray_dir);
    let half_b = oc.dot(ray_dir);
    let c = oc.dot(oc) - radius * radius;

    let discriminant = half_b * half_b - a * c;
    if discriminant < 0.0 || a <= 0.0 {
        return None;
    }

    let sqrt_d = discriminant.sqrt();
    let t = (-half_b - sqrt_d) / a;
    if t > T_EPSILON {
        return Some(t);
    }

    let t = (-half_b + sqrt_d) / a;
    (t > T_EPSILON).then_some(t)
}

/// Double-sided rectangle in the local XY plane, centered on the origin.
///
/// Returns the ray parameter and texture coordinates with `v` growing downward.
pub fn intersect_quad(ray_origin: Vec3, ray_dir: Vec3, width: f32, height: f32) -> Option<(f32, Vec2)> {
    if ray_dir.z.abs() < 1e-8 {
        return None;
    }

    let t = -ray_origin.z / ray_dir.z;
    if t <= T_EPSILON {
        return None;
    }

    let p = ray_origin + ray_dir * t;
    let (hw, hh) = (width * 0.5, height * 0.5);
    if p.x.abs() > hw || p.y.abs() > hh {
        return None;
    }

    Some((t, Vec2::new(p.x / width + 0.5, 0.5 - p.y / height)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersect_aabb_hit() {
        let t = intersect_aabb(Vec3::ZERO, Vec3::X, Vec3::new(5.0, -1.0, -1.0), Vec3::new(10.0, 1.0, 1.0));
        assert!((t.unwrap() - 5.0).abs() < 0.01);
    }

    #[test]
    fn test_intersect_aabb_miss() {
        let t = intersect_aabb(Vec3::ZERO, Vec3::X, Vec3::new(5.0, 2.0, 2.0), Vec3::new(10.0, 3.0, 3.0));
        assert!(t.is_none());
    }

    #[test]
    fn test_intersect_aabb_inside_returns_exit() {
        let t = intersect_aabb(Vec3::new(5.0, 0.0, 0.0), Vec3::X, Vec3::new(0.0, -1.0, -1.0), Vec3::new(10.0, 1.0, 1.0));
        assert!((t.unwrap() - 5.0).abs() < 0.01);
    }

    #[test]
    fn test_intersect_sphere_front_face() {
        let t = intersect_sphere(Vec3::new(0.0, 0.0, 10.0), -Vec3::Z, Vec3::ZERO, 1.5);
        assert!((t.unwrap() - 8.5).abs() < 1e-4);
    }

    #[test]
    fn test_intersect_sphere_behind_origin() {
        assert!(intersect_sphere(Vec3::new(0.0, 0.0, 10.0), Vec3::Z, Vec3::ZERO, 1.0).is_none());
    }

    #[test]
    fn test_intersect_quad_uv_corners() {
        let (t, uv) = intersect_quad(Vec3::new(-0.5, 0.5, 3.0), -Vec3::Z, 2.0, 2.0).unwrap();
        assert!((t - 3.0).abs() < 1e-5);
        assert!((uv - Vec2::new(0.25, 0.25)).length() < 1e-5);
    }

    #[test]
    fn test_intersect_quad_back_side_and_edge_miss() {
        assert!(intersect_quad(Vec3::new(0.0, 0.0, -2.0), Vec3::Z, 1.0, 1.0).is_some());
        assert!(intersect_quad(Vec3::new(0.6, 0.0, 2.0), -Vec3::Z, 1.0, 1.0).is_none());
    }

    #[test]
    fn test_transformed_ray_keeps_parameter() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), -Vec3::Z);
        let to_local = Mat4::from_scale(Vec3::splat(2.0)).inverse();
        let local = ray.transformed(&to_local);
        let t = intersect_sphere(local.origin, local.dir, Vec3::ZERO, 1.0).unwrap();
        assert!((ray.at(t).z - 2.0).abs() < 1e-4);
    }
}
