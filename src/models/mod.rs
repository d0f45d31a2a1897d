mod cache;
mod procedural;

pub use cache::ModelCache;
pub use procedural::procedural_flower;

use anyhow::Result;
use futures::future::LocalBoxFuture;
use glam::{Mat4, Vec3};

use crate::config::FlowerType;
use crate::geometry::Surface;
use crate::math::Aabb;

/// One renderable piece of a model, positioned relative to the model origin
#[derive(Debug, Clone)]
pub struct ModelPart {
    pub name: String,
    pub transform: Mat4,
    pub surface: Surface,
}

/// Flower template. Cloning shares mesh data but copies materials, so each
/// placed flower can be highlighted on its own.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub parts: Vec<ModelPart>,
}

impl Model {
    pub fn new(parts: Vec<ModelPart>) -> Self {
        Self { parts }
    }

    pub fn bounds(&self) -> Aabb {
        self.parts.iter().fold(Aabb::empty(), |acc, part| {
            acc.union(&part.surface.geometry.local_bounds().transformed(&part.transform))
        })
    }

    /// Scales the model so its largest dimension is one unit and moves the
    /// centre of its bounds to the origin.
    pub fn normalized(mut self) -> Self {
        let bounds = self.bounds();
        let max_dim = bounds.max_dimension();
        if bounds.is_empty() || max_dim <= f32::EPSILON {
            return self;
        }

        let scale = 1.0 / max_dim;
        let fit = Mat4::from_translation(-bounds.center() * scale) * Mat4::from_scale(Vec3::splat(scale));
        for part in &mut self.parts {
            part.transform = fit * part.transform;
        }
        self
    }
}

/// Where flower models come from. Loading may suspend and may fail.
pub trait ModelSource {
    fn load<'a>(&'a self, flower: &'a FlowerType) -> LocalBoxFuture<'a, Result<Model>>;
}
