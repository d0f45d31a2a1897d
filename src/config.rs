use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::layout::RingSpec;
use crate::math::Color;

/// Environment variable naming a JSON config file
pub const CONFIG_ENV_VAR: &str = "BOUQUET_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowerType {
    pub id: String,
    pub name: String,
    /// Relative to the models directory
    #[serde(rename = "model")]
    pub model_path: PathBuf,
    pub color: Color,
}

impl FlowerType {
    pub fn new(id: &str, name: &str, model_path: impl Into<PathBuf>, color: Color) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            model_path: model_path.into(),
            color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub background_color: Color,
    /// Vertical field of view in degrees
    pub camera_fov: f32,
    pub camera_near: f32,
    pub camera_far: f32,
    pub floor_radius: f32,
    pub floor_y: f32,
    pub floor_color: Color,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            background_color: Color::from_hex(0xf0f0f0),
            camera_fov: 50.0,
            camera_near: 0.1,
            camera_far: 1000.0,
            floor_radius: 5.0,
            floor_y: -2.0,
            floor_color: Color::from_hex(0xcccccc),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraControlsConfig {
    pub min_distance: f32,
    pub max_distance: f32,
    pub default_distance: f32,
    /// Radians per pixel dragged
    pub rotation_speed: f32,
    /// Distance per wheel unit
    pub zoom_speed: f32,
}

impl Default for CameraControlsConfig {
    fn default() -> Self {
        Self {
            min_distance: 3.0,
            max_distance: 10.0,
            default_distance: 6.0,
            rotation_speed: 0.01,
            zoom_speed: 0.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BouquetConfig {
    pub flower_types: Vec<FlowerType>,
    pub rings: Vec<RingSpec>,
    pub include_center: bool,
    pub scene: SceneConfig,
    pub camera_controls: CameraControlsConfig,
}

impl Default for BouquetConfig {
    fn default() -> Self {
        Self {
            flower_types: vec![
                FlowerType::new("rose", "Róża", "rose.glb", Color::from_hex(0xff0000)),
                FlowerType::new("gozdzik", "Goździk", "gozdzik.glb", Color::from_hex(0xffc0cb)),
                FlowerType::new("lily", "Lilia", "lilia.glb", Color::from_hex(0xffffff)),
                FlowerType::new("eustoma", "Eustoma", "eustoma.glb", Color::from_hex(0x800080)),
            ],
            rings: vec![
                RingSpec::new(4, 0.1, -0.05, 15.0),
                RingSpec::new(8, 0.2, -0.1, 30.0),
                RingSpec::new(12, 0.3, -0.15, 45.0),
                RingSpec::new(16, 0.35, -0.2, 60.0),
            ],
            include_center: true,
            scene: SceneConfig::default(),
            camera_controls: CameraControlsConfig::default(),
        }
    }
}

impl BouquetConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: BouquetConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Explicit path first, then `BOUQUET_CONFIG`, then built-in defaults
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => match std::env::var_os(CONFIG_ENV_VAR) {
                Some(p) => Self::load(PathBuf::from(p)),
                None => Ok(Self::default()),
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.flower_types.is_empty() {
            bail!("config declares no flower types");
        }
        let mut seen = HashSet::new();
        for flower in &self.flower_types {
            if !seen.insert(flower.id.as_str()) {
                bail!("duplicate flower type id '{}'", flower.id);
            }
        }
        if let Some(i) = self.rings.iter().position(|r| r.count == 0) {
            bail!("ring {} has no slots", i);
        }
        let c = &self.camera_controls;
        if c.min_distance > c.max_distance {
            bail!(
                "camera min distance {} exceeds max distance {}",
                c.min_distance,
                c.max_distance
            );
        }
        Ok(())
    }

    pub fn flower_type(&self, id: &str) -> Option<&FlowerType> {
        self.flower_types.iter().find(|f| f.id == id)
    }

    pub fn slot_count(&self) -> usize {
        usize::from(self.include_center) + self.rings.iter().map(|r| r.count).sum::<usize>()
    }
}
