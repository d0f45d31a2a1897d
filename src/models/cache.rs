use anyhow::Result;
use log::info;
use std::collections::HashMap;
use std::sync::Arc;

use super::{Model, ModelSource};
use crate::config::FlowerType;

/// Per-type model templates. A template is loaded once and every placement
/// gets its own clone.
pub struct ModelCache<S> {
    source: S,
    templates: HashMap<String, Arc<Model>>,
}

impl<S: ModelSource> ModelCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            templates: HashMap::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn get_or_load(&mut self, flower: &FlowerType) -> Result<Model> {
        if let Some(template) = self.templates.get(&flower.id) {
            return Ok(Model::clone(template));
        }

        info!("Loading model for '{}' from {}", flower.id, flower.model_path.display());
        let template = Arc::new(self.source.load(flower).await?);
        let model = Model::clone(&template);
        self.templates.insert(flower.id.clone(), template);
        Ok(model)
    }

    pub fn is_cached(&self, type_id: &str) -> bool {
        self.templates.contains_key(type_id)
    }

    pub fn clear(&mut self) {
        self.templates.clear();
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
