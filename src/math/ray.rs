use glam::{Mat4, Vec3};

use super::Aabb;

/// Hits closer than this are treated as self-intersections
const MIN_HIT_DISTANCE: f32 = 1e-4;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Maps the ray into another space. The direction is not renormalised,
    /// so a parameter `t` names the same point in both spaces.
    pub fn transformed(&self, transform: &Mat4) -> Ray {
        Ray {
            origin: transform.transform_point3(self.origin),
            direction: transform.transform_vector3(self.direction),
        }
    }

    /// Slab test. Returns the entry distance, or the exit distance when the
    /// origin is already inside the box.
    pub fn intersect_aabb(&self, aabb: &Aabb) -> Option<f32> {
        const EPSILON: f32 = 1e-8;

        // Clamp near-zero components so the inverse stays finite
        let inv = |d: f32| {
            if d.abs() < EPSILON {
                1.0 / EPSILON.copysign(d)
            } else {
                1.0 / d
            }
        };
        let inv_dir = Vec3::new(inv(self.direction.x), inv(self.direction.y), inv(self.direction.z));

        let t_min = (aabb.min - self.origin) * inv_dir;
        let t_max = (aabb.max - self.origin) * inv_dir;

        let t1 = t_min.min(t_max);
        let t2 = t_min.max(t_max);

        let t_near = t1.x.max(t1.y).max(t1.z);
        let t_far = t2.x.min(t2.y).min(t2.z);

        if t_near.is_nan() || t_far.is_nan() || t_near > t_far || t_far < 0.0 {
            return None;
        }

        if t_near < 0.0 {
            (t_far > MIN_HIT_DISTANCE).then_some(t_far)
        } else {
            Some(t_near)
        }
    }

    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let a = self.direction.dot(self.direction);
        let half_b = oc.dot(self.direction);
        let c = oc.dot(oc) - radius * radius;

        let discriminant = half_b * half_b - a * c;
        if discriminant < 0.0 || a == 0.0 {
            return None;
        }

        let sqrt_d = discriminant.sqrt();
        let t = (-half_b - sqrt_d) / a;
        if t > MIN_HIT_DISTANCE {
            return Some(t);
        }
        let t = (-half_b + sqrt_d) / a;
        (t > MIN_HIT_DISTANCE).then_some(t)
    }

    /// Intersects the disc of `radius` lying in the local XY plane (normal +Z)
    pub fn intersect_disc(&self, radius: f32) -> Option<f32> {
        if self.direction.z.abs() < 1e-8 {
            return None;
        }
        let t = -self.origin.z / self.direction.z;
        if t <= MIN_HIT_DISTANCE {
            return None;
        }
        let p = self.at(t);
        (p.x * p.x + p.y * p.y <= radius * radius).then_some(t)
    }
}
