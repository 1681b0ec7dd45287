//! Reusable grid cell binding.
//!
//! A cell may be rebound to another record while a thumbnail fetch for the
//! previous record is still running. Deliveries carry the binding they were
//! started for and are dropped if the cell has moved on.

use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CellImage {
    #[default]
    Placeholder,
    Image(Vec<u8>),
}

/// Proof that a cell was bound to `record` at some point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellBinding {
    record: Uuid,
    generation: u64,
}

impl CellBinding {
    pub fn record(&self) -> Uuid {
        self.record
    }
}

#[derive(Debug, Default)]
struct CellState {
    bound: Option<Uuid>,
    generation: u64,
    image: CellImage,
}

#[derive(Debug, Default)]
pub struct CellSlot {
    state: Mutex<CellState>,
}

impl CellSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points the cell at `record` and resets it to the placeholder.
    pub fn bind(&self, record: Uuid) -> CellBinding {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.generation += 1;
        state.bound = Some(record);
        state.image = CellImage::Placeholder;
        CellBinding {
            record,
            generation: state.generation,
        }
    }

    /// Shows `image` if the cell is still bound as `binding` says.
    /// Returns false when the delivery was stale and got dropped.
    pub fn show(&self, binding: CellBinding, image: CellImage) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.generation != binding.generation || state.bound != Some(binding.record) {
            return false;
        }
        state.image = image;
        true
    }

    pub fn image(&self) -> CellImage {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .image
            .clone()
    }

    pub fn bound_record(&self) -> Option<Uuid> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).bound
    }
}
