//! Batch upload core: admission check, concurrent dispatch, and ordered
//! reconciliation of outcomes into the caller's image list.

use std::sync::Arc;

use crate::errors::{UploadError, UploadResult};
use crate::storage::ObjectStore;

use super::keys::{storage_key, PendingImage};

/// Result of one dispatched upload. A failed upload produces no reference
/// and carries no retry state; the user reselects the file if they want it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded(String),
    Failed,
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Uploaded(_))
    }
}

/// All-or-nothing capacity check, performed before any network activity so
/// an oversized selection never wastes uploads that would be discarded.
pub fn admit_selection(
    current: &[String],
    selected: &[PendingImage],
    max_images: usize,
) -> UploadResult<()> {
    if current.len() + selected.len() > max_images {
        return Err(UploadError::capacity_exceeded(
            selected.len(),
            current.len(),
            max_images,
        ));
    }
    Ok(())
}

/// Upload every file in the batch concurrently against the object store.
///
/// All uploads are dispatched before any is awaited, and the outcomes come
/// back in input order, not completion order: the returned vector is built
/// by awaiting the join handles in the order the files were submitted. One
/// file's failure never cancels or affects its siblings.
pub async fn upload_all(
    store: Arc<dyn ObjectStore>,
    container: &str,
    files: Vec<PendingImage>,
) -> Vec<UploadOutcome> {
    let total = files.len();
    log::info!("Dispatching {} uploads to container {}", total, container);

    let handles: Vec<_> = files
        .into_iter()
        .map(|file| {
            let store = Arc::clone(&store);
            let container = container.to_string();
            tokio::spawn(async move { upload_one(store, &container, file).await })
        })
        .collect();

    let mut outcomes = Vec::with_capacity(total);
    for handle in handles {
        match handle.await {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => {
                log::error!("Upload task panicked: {}", e);
                outcomes.push(UploadOutcome::Failed);
            }
        }
    }

    let successes = outcomes.iter().filter(|o| o.is_success()).count();
    log::info!(
        "Batch finished: {}/{} uploads succeeded in container {}",
        successes,
        total,
        container
    );

    outcomes
}

async fn upload_one(
    store: Arc<dyn ObjectStore>,
    container: &str,
    file: PendingImage,
) -> UploadOutcome {
    let key = storage_key(&file);
    let content_type = file.content_type();

    match store
        .put_object(container, &key, file.bytes.clone(), content_type)
        .await
    {
        Ok(()) => {
            let url = store.public_url(container, &key);
            log::debug!("Uploaded {} as {}", file.file_name, url);
            UploadOutcome::Uploaded(url)
        }
        Err(e) => {
            log::error!("Failed to upload {}: {}", file.file_name, e);
            UploadOutcome::Failed
        }
    }
}

/// Append every successful outcome's reference, in outcome order, to a copy
/// of the current list. The caller's list is left untouched so its state
/// layer can detect the change by replacement.
pub fn merge_outcomes(current: &[String], outcomes: &[UploadOutcome]) -> Vec<String> {
    let mut merged = current.to_vec();
    for outcome in outcomes {
        if let UploadOutcome::Uploaded(url) = outcome {
            merged.push(url.clone());
        }
    }
    merged
}

/// Remove the entry at `index`, shifting the remainder down one position.
/// Indexes are positional, not identity-based: removing twice at the same
/// index addresses the already-shifted list.
pub fn remove_at(current: &[String], index: usize) -> UploadResult<Vec<String>> {
    if index >= current.len() {
        return Err(UploadError::index_out_of_range(index, current.len()));
    }

    let mut updated = current.to_vec();
    updated.remove(index);
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::UploadError;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::Mutex;
    use tokio::time::{sleep, Duration};

    fn img(name: &str) -> PendingImage {
        PendingImage::new(name, vec![1, 2, 3])
    }

    fn refs(urls: &[&str]) -> Vec<String> {
        urls.iter().map(|u| u.to_string()).collect()
    }

    /// Store that records upload order, fails configured file names, and
    /// delays others to shuffle completion order.
    struct FakeStore {
        fail_names: Vec<&'static str>,
        delays_ms: Vec<(&'static str, u64)>,
        uploads: Mutex<Vec<String>>,
    }

    impl FakeStore {
        fn new() -> Self {
            Self {
                fail_names: Vec::new(),
                delays_ms: Vec::new(),
                uploads: Mutex::new(Vec::new()),
            }
        }

        fn upload_count(&self) -> usize {
            self.uploads.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ObjectStore for FakeStore {
        async fn put_object(
            &self,
            _container: &str,
            key: &str,
            _bytes: Bytes,
            _content_type: &str,
        ) -> UploadResult<()> {
            // Keys are uuid-based, so fixtures key failure and latency off
            // the extension that survives key generation.
            if let Some((_, delay)) = self
                .delays_ms
                .iter()
                .find(|(ext, _)| key.ends_with(ext))
            {
                sleep(Duration::from_millis(*delay)).await;
            }

            if self.fail_names.iter().any(|ext| key.ends_with(ext)) {
                return Err(UploadError::storage(500, "simulated outage"));
            }

            self.uploads.lock().unwrap().push(key.to_string());
            Ok(())
        }

        fn public_url(&self, container: &str, key: &str) -> String {
            format!("https://cdn.test/{}/{}", container, key)
        }
    }

    #[test]
    fn test_admission_within_capacity() {
        let current = refs(&["a.png"]);
        let selected = vec![img("b.png"), img("c.png")];
        assert!(admit_selection(&current, &selected, 5).is_ok());
    }

    #[test]
    fn test_admission_rejects_overflow_entirely() {
        let selected: Vec<_> = (0..11).map(|i| img(&format!("f{}.png", i))).collect();
        let result = admit_selection(&[], &selected, 10);
        assert!(matches!(
            result,
            Err(UploadError::CapacityExceeded {
                selected: 11,
                current: 0,
                max: 10
            })
        ));
    }

    #[test]
    fn test_admission_exact_fit_allowed() {
        let current = refs(&["a.png", "b.png"]);
        let selected = vec![img("c.png"), img("d.png"), img("e.png")];
        assert!(admit_selection(&current, &selected, 5).is_ok());
    }

    #[test]
    fn test_empty_selection_is_admitted() {
        let current = refs(&["a.png"]);
        assert!(admit_selection(&current, &[], 1).is_ok());
    }

    #[tokio::test]
    async fn test_upload_all_preserves_submission_order() {
        // First file is slow, second is fast; outcome order must still be
        // submission order.
        let store = Arc::new(FakeStore {
            delays_ms: vec![(".png", 50)],
            ..FakeStore::new()
        });
        let files = vec![img("slow.png"), img("fast.jpg")];

        let outcomes = upload_all(store, "gallery", files).await;

        assert_eq!(outcomes.len(), 2);
        match (&outcomes[0], &outcomes[1]) {
            (UploadOutcome::Uploaded(first), UploadOutcome::Uploaded(second)) => {
                assert!(first.ends_with(".png"));
                assert!(second.ends_with(".jpg"));
            }
            other => panic!("expected two successes, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_siblings() {
        let store = Arc::new(FakeStore {
            fail_names: vec![".gif"],
            ..FakeStore::new()
        });
        let files = vec![img("a.png"), img("bad.gif"), img("c.jpg")];

        let outcomes = upload_all(Arc::clone(&store) as Arc<dyn ObjectStore>, "gallery", files)
            .await;

        assert!(outcomes[0].is_success());
        assert_eq!(outcomes[1], UploadOutcome::Failed);
        assert!(outcomes[2].is_success());
        assert_eq!(store.upload_count(), 2);
    }

    #[test]
    fn test_merge_appends_successes_only() {
        let current = refs(&["a.png"]);
        let outcomes = vec![
            UploadOutcome::Uploaded("b.png".to_string()),
            UploadOutcome::Failed,
            UploadOutcome::Uploaded("c.png".to_string()),
        ];

        let merged = merge_outcomes(&current, &outcomes);

        assert_eq!(merged, refs(&["a.png", "b.png", "c.png"]));
        // Caller's list untouched
        assert_eq!(current, refs(&["a.png"]));
    }

    #[test]
    fn test_merge_with_no_outcomes_copies_list() {
        let current = refs(&["a.png", "b.png"]);
        assert_eq!(merge_outcomes(&current, &[]), current);
    }

    #[test]
    fn test_remove_at_shifts_remainder() {
        let current = refs(&["a.png", "b.png", "c.png"]);
        let updated = remove_at(&current, 1).unwrap();
        assert_eq!(updated, refs(&["a.png", "c.png"]));
    }

    #[test]
    fn test_remove_at_rejects_invalid_index() {
        let current = refs(&["a.png"]);
        assert!(matches!(
            remove_at(&current, 1),
            Err(UploadError::IndexOutOfRange { index: 1, len: 1 })
        ));
        assert!(matches!(
            remove_at(&[], 0),
            Err(UploadError::IndexOutOfRange { index: 0, len: 0 })
        ));
    }

    #[test]
    fn test_remove_at_is_positional_not_identity_based() {
        let current = refs(&["a.png", "b.png", "c.png"]);

        // Removing index 1 twice without re-fetching addresses the shifted
        // list: the second call removes what was originally "c.png".
        let once = remove_at(&current, 1).unwrap();
        let twice = remove_at(&once, 1).unwrap();

        assert_eq!(once, refs(&["a.png", "c.png"]));
        assert_eq!(twice, refs(&["a.png"]));
    }
}
