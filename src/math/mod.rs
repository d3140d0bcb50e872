mod aabb;
mod color;
mod ray;

pub use aabb::AABB;
pub use color::{hsv_to_rgb, Rgba};
pub use ray::{intersect_aabb, intersect_quad, intersect_sphere, Ray, T_EPSILON};
