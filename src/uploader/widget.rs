//! Widget-level state machine around the batch core: one owned image list,
//! one in-flight batch at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::UploaderConfig;
use crate::errors::{UploadError, UploadResult};
use crate::notify::{Notifier, Severity};
use crate::storage::ObjectStore;

use super::batch::{admit_selection, merge_outcomes, remove_at, upload_all};
use super::keys::{validate_selection, PendingImage};

/// Multi-image upload widget backing one form field (gallery photos, room
/// photos, and so on). Owns the ordered list of already-uploaded image URLs
/// and mediates every mutation to it.
///
/// State machine: Idle -> Uploading -> Idle. While a batch is in flight new
/// selections are rejected with `UploadInProgress`; removing committed
/// entries stays allowed.
pub struct MultiImageUpload {
    store: Arc<dyn ObjectStore>,
    notifier: Arc<dyn Notifier>,
    config: UploaderConfig,
    images: Mutex<Vec<String>>,
    uploading: AtomicBool,
}

impl MultiImageUpload {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        notifier: Arc<dyn Notifier>,
        config: UploaderConfig,
    ) -> Self {
        Self::with_images(store, notifier, config, Vec::new())
    }

    /// Construct pre-populated from a persisted entity's image list.
    pub fn with_images(
        store: Arc<dyn ObjectStore>,
        notifier: Arc<dyn Notifier>,
        config: UploaderConfig,
        images: Vec<String>,
    ) -> Self {
        Self {
            store,
            notifier,
            config,
            images: Mutex::new(images),
            uploading: AtomicBool::new(false),
        }
    }

    pub fn images(&self) -> Vec<String> {
        self.lock_images().clone()
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading.load(Ordering::SeqCst)
    }

    pub fn remaining_capacity(&self) -> usize {
        self.config.max_images.saturating_sub(self.lock_images().len())
    }

    pub fn label(&self) -> &str {
        &self.config.label
    }

    /// Handle a user file selection end to end: validate, admit against
    /// capacity, upload concurrently, merge successes into the list, and
    /// surface the aggregate outcome through the notifier.
    ///
    /// Returns the updated image list. Pre-flight failures (validation,
    /// capacity, overlapping batch) leave the list untouched and perform no
    /// network activity.
    pub async fn handle_selection(&self, files: Vec<PendingImage>) -> UploadResult<Vec<String>> {
        if files.is_empty() {
            return Ok(self.images());
        }

        validate_selection(&files)?;

        let current = self.images();
        if let Err(e) = admit_selection(&current, &files, self.config.max_images) {
            self.notifier.notify(
                &format!("Maximum {} images allowed", self.config.max_images),
                Severity::Warning,
            );
            return Err(e);
        }

        // Single in-flight batch per widget instance
        if self
            .uploading
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::warn!(
                "Rejected selection of {} files for {}: batch already in progress",
                files.len(),
                self.config.label
            );
            return Err(UploadError::UploadInProgress);
        }

        let total = files.len();
        let outcomes = upload_all(
            Arc::clone(&self.store),
            &self.config.container,
            files,
        )
        .await;

        let successes = outcomes.iter().filter(|o| o.is_success()).count();

        // Merge against the list as it is now, not the pre-upload snapshot:
        // removals are allowed while a batch is in flight.
        let merged = {
            let mut images = self.lock_images();
            let merged = merge_outcomes(&images, &outcomes);
            *images = merged.clone();
            merged
        };

        self.uploading.store(false, Ordering::SeqCst);

        if successes == 0 {
            self.notifier
                .notify("Failed to upload images", Severity::Error);
        } else if successes < total {
            self.notifier.notify(
                &format!("{} of {} images failed to upload", total - successes, total),
                Severity::Warning,
            );
        } else {
            self.notifier.notify(
                &format!("Uploaded {} images", successes),
                Severity::Success,
            );
        }

        Ok(merged)
    }

    /// Remove the committed entry at `index`. Allowed even while a batch is
    /// uploading.
    pub fn remove_image(&self, index: usize) -> UploadResult<Vec<String>> {
        let mut images = self.lock_images();
        let updated = remove_at(&images, index)?;
        *images = updated.clone();
        Ok(updated)
    }

    fn lock_images(&self) -> MutexGuard<'_, Vec<String>> {
        match self.images.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Image list lock poisoned (non-critical), recovering");
                poisoned.into_inner()
            }
        }
    }
}
