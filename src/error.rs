use thiserror::Error;

use crate::scene::NodeId;

/// Faults raised by the placement and selection engine.
///
/// None of these end a session: `NoCapacity` is normally prevented by the
/// UI disabling "add", `InvalidRelease` points at a caller bug, and
/// `NotFound` means the selection went stale and should be cleared.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BouquetError {
    #[error("no free slot left in the bouquet")]
    NoCapacity,

    #[error("slot {0} is already free or out of range")]
    InvalidRelease(usize),

    #[error("no flower instance owns scene node {0}")]
    NotFound(NodeId),

    #[error("unknown flower type: {0}")]
    UnknownFlowerType(String),
}

pub type Result<T> = std::result::Result<T, BouquetError>;
