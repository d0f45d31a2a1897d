pub mod allocator;
pub mod camera;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod frontend;
pub mod geometry;
pub mod layout;
pub mod loaders;
pub mod math;
pub mod models;
pub mod picking;
pub mod registry;
pub mod scene;
pub mod session;

pub use allocator::SlotAllocator;
pub use config::{BouquetConfig, FlowerType};
pub use error::BouquetError;
pub use layout::{generate_slots, RingSpec, Slot};
pub use picking::{PickOutcome, Selection, SelectionEngine};
pub use registry::{FlowerInstance, FlowerRegistry};
pub use scene::{NodeId, SceneGraph};
pub use session::{BouquetCounts, BouquetSession};
