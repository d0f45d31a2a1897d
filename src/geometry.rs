use glam::Vec3;
use std::sync::Arc;

use crate::math::{Aabb, Color, Ray, Triangle};

/// Surface appearance. Only the parts picking and highlighting touch.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    pub color: Color,
    pub emissive: Color,
    pub emissive_intensity: f32,
}

impl Material {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            emissive: Color::BLACK,
            emissive_intensity: 1.0,
        }
    }

    pub fn from_hex(hex: u32) -> Self {
        Self::new(Color::from_hex(hex))
    }
}

/// Triangle soup with precomputed bounds for early rejection
#[derive(Debug, Clone)]
pub struct TriangleMesh {
    triangles: Vec<Triangle>,
    bounds: Aabb,
}

impl TriangleMesh {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        let bounds = triangles
            .iter()
            .fold(Aabb::empty(), |acc, tri| acc.union(&tri.bounds()));
        Self { triangles, bounds }
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        ray.intersect_aabb(&self.bounds)?;
        self.triangles
            .iter()
            .filter_map(|tri| tri.intersect(ray))
            .min_by(f32::total_cmp)
    }
}

/// Local-space shape of a surface. Placement comes from the node transform.
#[derive(Debug, Clone)]
pub enum Geometry {
    Sphere { radius: f32 },
    Cuboid { half_extents: Vec3 },
    /// Flat disc in the local XY plane, facing +Z
    Disc { radius: f32 },
    Mesh(Arc<TriangleMesh>),
}

impl Geometry {
    pub fn mesh(triangles: Vec<Triangle>) -> Self {
        Geometry::Mesh(Arc::new(TriangleMesh::new(triangles)))
    }

    pub fn local_bounds(&self) -> Aabb {
        match self {
            Geometry::Sphere { radius } => Aabb::new(Vec3::splat(-radius), Vec3::splat(*radius)),
            Geometry::Cuboid { half_extents } => Aabb::new(-*half_extents, *half_extents),
            Geometry::Disc { radius } => {
                Aabb::new(Vec3::new(-radius, -radius, 0.0), Vec3::new(*radius, *radius, 0.0))
            }
            Geometry::Mesh(mesh) => mesh.bounds(),
        }
    }

    /// Ray parameter of the nearest hit, with the ray already in local space
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        match self {
            Geometry::Sphere { radius } => ray.intersect_sphere(Vec3::ZERO, *radius),
            Geometry::Cuboid { half_extents } => {
                ray.intersect_aabb(&Aabb::new(-*half_extents, *half_extents))
            }
            Geometry::Disc { radius } => ray.intersect_disc(*radius),
            Geometry::Mesh(mesh) => mesh.intersect(ray),
        }
    }
}

/// Renderable leaf: a shape plus one material per material group
#[derive(Debug, Clone)]
pub struct Surface {
    pub geometry: Geometry,
    pub materials: Vec<Material>,
}

impl Surface {
    pub fn new(geometry: Geometry, material: Material) -> Self {
        Self {
            geometry,
            materials: vec![material],
        }
    }

    pub fn with_materials(geometry: Geometry, materials: Vec<Material>) -> Self {
        Self { geometry, materials }
    }
}
