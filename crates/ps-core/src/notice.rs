//! User-facing notices (modal title + message) per outcome category.

use crate::error::{AppError, FetchError};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: &'static str,
    pub message: &'static str,
}

impl Notice {
    const fn new(title: &'static str, message: &'static str) -> Self {
        Self { title, message }
    }

    pub const SAVED: Notice = Notice::new("Saved", "Photo saved");
    pub const CONFIRM_DELETE: Notice =
        Notice::new("Delete?", "Are you sure you want to delete this image?");
    pub const NO_RESULTS: Notice = Notice::new("Nothing found", "No photos match this search");

    /// Notice for an error, or `None` for outcomes that must stay silent.
    pub fn for_error(err: &AppError) -> Option<Notice> {
        let notice = match err {
            AppError::Fetch(FetchError::Cancelled) => return None,
            AppError::Fetch(FetchError::NoConnectivity) => {
                Notice::new("No internet", "Check your internet connection")
            }
            AppError::Fetch(FetchError::Timeout) => Notice::new(
                "Poor connection",
                "Check your internet connection or try again later",
            ),
            AppError::NotFound(..) => Notice::new("Not found", "This photo is no longer available"),
            AppError::Conflict(_) => Notice::new("Already saved", "This photo is already saved"),
            AppError::ValidationError(_) => {
                Notice::new("Not ready", "The photo has not finished loading")
            }
            AppError::Persistence(_) => Notice::new("Storage error", "The photo could not be stored"),
            AppError::Fetch(_) | AppError::Internal(_) => {
                Notice::new("Unknown error", "Try again later")
            }
        };
        Some(notice)
    }
}
