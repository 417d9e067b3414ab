//! Mapping pointer positions onto blocks.
//!
//! The engine only needs to know which block is under the pointer and
//! where on the cube it was hit; how that is worked out is up to the
//! presentation layer. [`RayPicker`] is a self-contained implementation
//! that casts a camera ray against every block's box.

use glam::{Vec2, Vec3};

use crate::block::BlockId;
use crate::grid::BlockPose;

/// A pointer hit on a block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub block: BlockId,
    /// Hit point in cube-local coordinates (cube center at the origin).
    pub surface_point: Vec3,
}

/// Resolves a viewport point to the nearest block under it.
///
/// Viewport points are measured from the viewport center in units of half
/// the viewport height, `y` up: `y` spans `[-1, 1]` and `x` spans
/// `[-aspect, aspect]`. Both axes share one scale, so angles around the
/// center match the angles on screen. The cube center projects to the
/// origin.
pub trait HitTest {
    fn query_hit(&self, point: Vec2, poses: &[BlockPose]) -> Option<Hit>;
}

impl<F> HitTest for F
where
    F: Fn(Vec2, &[BlockPose]) -> Option<Hit>,
{
    fn query_hit(&self, point: Vec2, poses: &[BlockPose]) -> Option<Hit> {
        self(point, poses)
    }
}

/// A half-line in cube-local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

/// Perspective camera described in cube-local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewCamera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
}

impl ViewCamera {
    /// Ray from the eye through a viewport point (see [`HitTest`]).
    pub fn ray(&self, point: Vec2) -> Ray {
        let forward = (self.target - self.eye).normalize();
        let right = forward.cross(self.up).normalize();
        let up = right.cross(forward);
        let half_height = (self.fov_y / 2.0).tan();
        let direction = forward + (right * point.x + up * point.y) * half_height;
        Ray {
            origin: self.eye,
            direction: direction.normalize(),
        }
    }
}

/// Picks blocks by intersecting a camera ray with their oriented boxes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayPicker {
    pub camera: ViewCamera,
    pub block_size: f32,
}

impl RayPicker {
    pub fn new(camera: ViewCamera, block_size: f32) -> Self {
        Self { camera, block_size }
    }

    /// Nearest block hit by `ray`, if any.
    pub fn cast(&self, ray: Ray, poses: &[BlockPose]) -> Option<Hit> {
        let half = self.block_size / 2.0;
        poses
            .iter()
            .filter_map(|pose| {
                let inverse = pose.rotation.inverse();
                let origin = inverse * (ray.origin - pose.translation);
                let direction = inverse * ray.direction;
                intersect_box(origin, direction, half).map(|t| (t, pose.id))
            })
            .min_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(t, block)| Hit {
                block,
                surface_point: ray.origin + ray.direction * t,
            })
    }
}

impl HitTest for RayPicker {
    fn query_hit(&self, point: Vec2, poses: &[BlockPose]) -> Option<Hit> {
        self.cast(self.camera.ray(point), poses)
    }
}

/// Converts a cursor position in window pixels, `y` down, to a viewport
/// point.
pub fn viewport_point(x: f64, y: f64, width: u32, height: u32) -> Vec2 {
    let width = f64::from(width.max(1));
    let height = f64::from(height.max(1));
    Vec2::new(
        ((2.0 * x - width) / height) as f32,
        ((height - 2.0 * y) / height) as f32,
    )
}

/// Slab test of a ray against the box `[-half, half]^3`, returning the
/// distance to the first surface crossing in front of the origin.
fn intersect_box(origin: Vec3, direction: Vec3, half: f32) -> Option<f32> {
    let inverse = direction.recip();
    let t1 = (Vec3::splat(-half) - origin) * inverse;
    let t2 = (Vec3::splat(half) - origin) * inverse;
    let t_near = t1.min(t2).max_element();
    let t_far = t1.max(t2).min_element();
    if t_far < t_near.max(0.0) {
        return None;
    }
    Some(if t_near >= 0.0 { t_near } else { t_far })
}
