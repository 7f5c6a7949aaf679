//! Batch image upload core for the hotel admin panel's media widgets.
//!
//! Every entity form in the panel (rooms, gallery, attractions) embeds the
//! same multi-image widget: pick files, upload them to object storage, show
//! the resulting public URLs as an ordered list. This crate implements that
//! widget's engine: capacity admission, concurrent upload dispatch with
//! partial-failure tolerance, and order-preserving list reconciliation.
//!
//! The object store and the notification sink are trait collaborators; a
//! reqwest-backed [`storage::HttpObjectStore`] and a log-backed
//! [`notify::LogNotifier`] are provided.

pub mod config;
pub mod errors;
pub mod notify;
pub mod storage;
pub mod uploader;

pub use config::{Config, StorageConfig, UploaderConfig};
pub use errors::{UploadError, UploadResult};
pub use notify::{LogNotifier, Notifier, Severity};
pub use storage::{HttpObjectStore, ObjectStore};
pub use uploader::{MultiImageUpload, PendingImage, UploadOutcome};
