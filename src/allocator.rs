use crate::error::{BouquetError, Result};

/// Tracks which of the fixed bouquet slots are free.
///
/// Free slots are kept in ascending order, so allocation always hands out the
/// lowest free index no matter in which order slots were released.
#[derive(Debug, Clone)]
pub struct SlotAllocator {
    free: Vec<usize>,
    capacity: usize,
}

impl SlotAllocator {
    pub fn new(capacity: usize) -> Self {
        Self {
            free: (0..capacity).collect(),
            capacity,
        }
    }

    pub fn allocate(&mut self) -> Result<usize> {
        if self.free.is_empty() {
            return Err(BouquetError::NoCapacity);
        }
        Ok(self.free.remove(0))
    }

    pub fn release(&mut self, index: usize) -> Result<()> {
        if index >= self.capacity {
            return Err(BouquetError::InvalidRelease(index));
        }
        match self.free.binary_search(&index) {
            Ok(_) => Err(BouquetError::InvalidRelease(index)),
            Err(pos) => {
                self.free.insert(pos, index);
                Ok(())
            }
        }
    }

    pub fn reset(&mut self) {
        self.free = (0..self.capacity).collect();
    }

    pub fn is_free(&self, index: usize) -> bool {
        self.free.binary_search(&index).is_ok()
    }

    pub fn free_slots(&self) -> &[usize] {
        &self.free
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn occupied_count(&self) -> usize {
        self.capacity - self.free.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
