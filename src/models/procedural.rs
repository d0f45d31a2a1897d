use glam::{Mat4, Quat, Vec3};

use super::{Model, ModelPart};
use crate::geometry::{Geometry, Material, Surface};
use crate::math::Color;

const PETAL_COUNT: usize = 8;
const PETAL_RADIUS: f32 = 0.3;
const PETAL_RING_RADIUS: f32 = 0.4;
const PETAL_SCALE: Vec3 = Vec3::new(0.8, 1.2, 0.5);
const CENTER_RADIUS: f32 = 0.25;
const CENTER_COLOR: u32 = 0xffff00;
const STEM_HALF_EXTENTS: Vec3 = Vec3::new(0.05, 0.75, 0.05);
const STEM_COLOR: u32 = 0x228b22;

/// Placeholder flower used when a model cannot be loaded: a ring of squashed
/// sphere petals in the type colour, a yellow centre and a green stem.
pub fn procedural_flower(color: Color) -> Model {
    let petals = (0..PETAL_COUNT).map(|i| {
        let angle = (i as f32 / PETAL_COUNT as f32) * std::f32::consts::TAU;
        let offset = Vec3::new(angle.cos() * PETAL_RING_RADIUS, 0.0, angle.sin() * PETAL_RING_RADIUS);
        ModelPart {
            name: format!("petal_{}", i),
            transform: Mat4::from_scale_rotation_translation(PETAL_SCALE, Quat::IDENTITY, offset),
            surface: Surface::new(Geometry::Sphere { radius: PETAL_RADIUS }, Material::new(color)),
        }
    });

    let center = ModelPart {
        name: "center".into(),
        transform: Mat4::IDENTITY,
        surface: Surface::new(
            Geometry::Sphere { radius: CENTER_RADIUS },
            Material::from_hex(CENTER_COLOR),
        ),
    };

    let stem = ModelPart {
        name: "stem".into(),
        transform: Mat4::from_translation(Vec3::new(0.0, -STEM_HALF_EXTENTS.y, 0.0)),
        surface: Surface::new(
            Geometry::Cuboid {
                half_extents: STEM_HALF_EXTENTS,
            },
            Material::from_hex(STEM_COLOR),
        ),
    };

    Model::new(petals.chain([center, stem]).collect())
}
