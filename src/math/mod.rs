mod aabb;
mod color;
mod ray;
mod triangle;

pub use aabb::Aabb;
pub use color::Color;
pub use ray::Ray;
pub use triangle::Triangle;
