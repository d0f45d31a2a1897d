use crate::error::{BouquetError, Result};
use crate::scene::NodeId;

/// A placed flower: which slot it stands in, what it is, and the scene node
/// that renders it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowerInstance {
    pub slot_index: usize,
    pub type_id: String,
    pub handle: NodeId,
}

/// Live flowers in creation order.
///
/// The registry only bookkeeps. Releasing slots and detaching scene nodes is
/// up to the caller.
#[derive(Debug, Default, Clone)]
pub struct FlowerRegistry {
    instances: Vec<FlowerInstance>,
}

impl FlowerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, instance: FlowerInstance) {
        self.instances.push(instance);
    }

    pub fn find_by_handle(&self, handle: NodeId) -> Option<&FlowerInstance> {
        self.instances.iter().find(|f| f.handle == handle)
    }

    pub fn find_by_slot(&self, slot_index: usize) -> Option<&FlowerInstance> {
        self.instances.iter().find(|f| f.slot_index == slot_index)
    }

    /// Swaps type and scene node in place; the slot stays the same.
    pub fn replace(
        &mut self,
        handle: NodeId,
        new_type_id: impl Into<String>,
        new_handle: NodeId,
    ) -> Result<&FlowerInstance> {
        let instance = self
            .instances
            .iter_mut()
            .find(|f| f.handle == handle)
            .ok_or(BouquetError::NotFound(handle))?;
        instance.type_id = new_type_id.into();
        instance.handle = new_handle;
        Ok(&*instance)
    }

    /// Removes the instance and hands back its slot for release
    pub fn remove_by_handle(&mut self, handle: NodeId) -> Result<usize> {
        let pos = self
            .instances
            .iter()
            .position(|f| f.handle == handle)
            .ok_or(BouquetError::NotFound(handle))?;
        Ok(self.instances.remove(pos).slot_index)
    }

    /// Pops the most recently added flower, whatever slot it occupies
    pub fn remove_last(&mut self) -> Option<FlowerInstance> {
        self.instances.pop()
    }

    pub fn clear(&mut self) -> Vec<FlowerInstance> {
        std::mem::take(&mut self.instances)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlowerInstance> {
        self.instances.iter()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
