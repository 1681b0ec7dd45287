//! photo-search/crates/ps-core/src/lib.rs
//!
//! The central domain logic and interface definitions for photo-search:
//! the photo record, the staging/persistent split, and the two controllers
//! that move records between them.

pub mod cell;
pub mod detail;
pub mod error;
pub mod gallery;
pub mod loading;
pub mod models;
pub mod notice;
pub mod staging;
pub mod traits;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-exporting for easier access in other crates
pub use cell::{CellImage, CellSlot};
pub use detail::{DeleteIntent, DetailController, DetailView, NavigateBack, SaveReceipt};
pub use error::*;
pub use gallery::{DisplaySource, GalleryController, SearchOutcome};
pub use loading::LoadingIndicator;
pub use models::*;
pub use notice::Notice;
pub use staging::StagingStore;
pub use traits::*;
