// Main uploader module - orchestrates batch image uploads
//
// This module turns a user's file selection into durably stored images and
// reconciles the resulting public URLs into the owning form's ordered list.

pub mod batch;
pub mod keys;
pub mod widget;

pub use batch::{admit_selection, merge_outcomes, remove_at, upload_all, UploadOutcome};
pub use keys::{storage_key, validate_selection, PendingImage};
pub use widget::MultiImageUpload;
