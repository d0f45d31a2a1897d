use anyhow::{bail, Context, Result};
use futures::future::{FutureExt, LocalBoxFuture};
use glam::{Mat4, Vec3};
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::config::FlowerType;
use crate::geometry::{Geometry, Material, Surface};
use crate::math::{Color, Triangle};
use crate::models::{Model, ModelPart, ModelSource};

/// Loads flower models from glTF/GLB files below a models directory
#[derive(Debug, Clone)]
pub struct GltfModelSource {
    models_dir: PathBuf,
}

impl GltfModelSource {
    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
        }
    }

    pub fn path_for(&self, flower: &FlowerType) -> PathBuf {
        self.models_dir.join(&flower.model_path)
    }
}

impl ModelSource for GltfModelSource {
    fn load<'a>(&'a self, flower: &'a FlowerType) -> LocalBoxFuture<'a, Result<Model>> {
        async move { load_flower_model(self.path_for(flower)) }.boxed_local()
    }
}

/// Loads a glTF file as a flower model, normalised to unit size
pub fn load_flower_model(path: impl AsRef<Path>) -> Result<Model> {
    let path = path.as_ref();
    info!("Loading glTF file: {:?}", path);

    let (document, buffers, _images) =
        gltf::import(path).context(format!("Failed to load glTF file: {:?}", path))?;
    model_from_document(&document, &buffers).context(format!("Failed to read glTF file: {:?}", path))
}

/// Same as [`load_flower_model`] for an in-memory glTF or GLB
pub fn load_flower_model_slice(bytes: &[u8]) -> Result<Model> {
    let (document, buffers, _images) = gltf::import_slice(bytes).context("Failed to parse glTF data")?;
    model_from_document(&document, &buffers)
}

fn model_from_document(document: &gltf::Document, buffers: &[gltf::buffer::Data]) -> Result<Model> {
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .context("glTF file has no scene")?;

    let mut parts = Vec::new();
    for node in scene.nodes() {
        process_node(&node, buffers, &Mat4::IDENTITY, &mut parts)?;
    }

    if parts.is_empty() {
        bail!("no geometry found in glTF scene");
    }

    debug!("Extracted {} mesh parts from glTF", parts.len());
    Ok(Model::new(parts).normalized())
}

/// Recursively processes glTF nodes
fn process_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent_transform: &Mat4,
    parts: &mut Vec<ModelPart>,
) -> Result<()> {
    let local_transform = Mat4::from_cols_array_2d(&node.transform().matrix());
    let global_transform = *parent_transform * local_transform;

    if let Some(mesh) = node.mesh() {
        process_mesh(&mesh, buffers, &global_transform, parts)?;
    }

    for child in node.children() {
        process_node(&child, buffers, &global_transform, parts)?;
    }

    Ok(())
}

/// One part per primitive, with node transforms baked into the vertices
fn process_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    transform: &Mat4,
    parts: &mut Vec<ModelPart>,
) -> Result<()> {
    let mesh_name = mesh.name().unwrap_or("mesh");

    for (index, primitive) in mesh.primitives().enumerate() {
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data[..]));

        let vertices: Vec<Vec3> = reader
            .read_positions()
            .context("Mesh primitive has no positions")?
            .map(|pos| transform.transform_point3(Vec3::from_array(pos)))
            .collect();

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..vertices.len() as u32).collect(),
        };

        let mut triangles = Vec::with_capacity(indices.len() / 3);
        for tri in indices.chunks_exact(3) {
            let corner = |i: u32| {
                vertices
                    .get(i as usize)
                    .copied()
                    .with_context(|| format!("index {} out of range in mesh '{}'", i, mesh_name))
            };
            triangles.push(Triangle::new(corner(tri[0])?, corner(tri[1])?, corner(tri[2])?));
        }

        if triangles.is_empty() {
            continue;
        }

        parts.push(ModelPart {
            name: format!("{}_{}", mesh_name, index),
            transform: Mat4::IDENTITY,
            surface: Surface::new(Geometry::mesh(triangles), material_from(&primitive.material())),
        });
    }

    Ok(())
}

fn material_from(material: &gltf::Material) -> Material {
    let [r, g, b, _a] = material.pbr_metallic_roughness().base_color_factor();
    let [er, eg, eb] = material.emissive_factor();
    Material {
        color: Color::new(r, g, b),
        emissive: Color::new(er, eg, eb),
        emissive_intensity: 1.0,
    }
}
