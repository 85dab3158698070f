//! Geometry foundation: vectors, rays, and primitive intersection tests

pub mod math;
pub mod ray;

pub use math::{ray_triangle_intersect, Vec3};
pub use ray::{ray_plane_intersection, ray_sphere_intersection, Ray};
