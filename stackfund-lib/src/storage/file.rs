//! File-backed payment link store.
//!
//! ```text
//! <base>/links/<id>.json                     one pretty-printed document per link
//! <base>/by_creator/<sha256(address)>/<id>   empty marker per link, per creator
//! ```
//!
//! Insert-if-absent relies on `create_new`, which the filesystem performs
//! atomically, so of two concurrent inserts of the same id exactly one
//! creates the document. The winner holds an exclusive `fs2` lock while
//! writing; readers take a shared lock. A document that is still empty
//! belongs to an insert that has not returned yet and is treated as not
//! readable.
//!
//! The creator marker is written after the document and before `insert`
//! returns, so a listing only reads that creator's documents. A marker whose
//! document is missing, empty or unparseable is skipped with a warning.
//!
//! Filesystem work runs on the blocking thread pool. If the caller stops
//! waiting (a service timeout drops the future), the insert removes what it
//! wrote instead of leaving a record the caller was told failed. Abandonment
//! that lands after the final check leaves the record in place.

use super::{new_record_id, sort_newest_first, PaymentLinkStore, StoreResult};
use crate::errors::StoreError;
use crate::id::is_valid_link_id;
use crate::PaymentLink;
use async_trait::async_trait;
use fs2::FileExt;
use sha2::{Digest, Sha256};
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

const LINKS_DIR: &str = "links";
const CREATOR_INDEX_DIR: &str = "by_creator";

/// File-based implementation of [`PaymentLinkStore`].
#[derive(Debug, Clone)]
pub struct FileLinkStore {
    links_dir: PathBuf,
    index_dir: PathBuf,
}

impl FileLinkStore {
    /// Open (or create) a store rooted at `base_path`.
    pub fn new(base_path: impl Into<PathBuf>) -> StoreResult<Self> {
        let base = base_path.into();
        let links_dir = base.join(LINKS_DIR);
        let index_dir = base.join(CREATOR_INDEX_DIR);
        std::fs::create_dir_all(&links_dir)?;
        std::fs::create_dir_all(&index_dir)?;
        Ok(Self {
            links_dir,
            index_dir,
        })
    }

    /// Directory holding the link documents.
    pub fn links_dir(&self) -> &Path {
        &self.links_dir
    }

    fn link_path(links_dir: &Path, id: &str) -> PathBuf {
        links_dir.join(format!("{}.json", id))
    }

    /// Marker directory for one creator. Addresses are hashed so any string
    /// maps to a fixed-length, path-safe name.
    fn creator_dir(&self, address: &str) -> PathBuf {
        self.index_dir
            .join(hex::encode(Sha256::digest(address.as_bytes())))
    }
}

async fn run_blocking<T, F>(f: F) -> StoreResult<T>
where
    F: FnOnce() -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StoreError::Unavailable(format!("storage task failed: {}", e)))?
}

/// Sets the shared flag when dropped while armed, i.e. when the future
/// awaiting a blocking insert is cancelled.
struct AbandonOnDrop {
    flag: Arc<AtomicBool>,
    armed: bool,
}

impl AbandonOnDrop {
    fn new(flag: Arc<AtomicBool>) -> Self {
        Self { flag, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for AbandonOnDrop {
    fn drop(&mut self) {
        if self.armed {
            self.flag.store(true, Ordering::SeqCst);
        }
    }
}

/// Read one document under a shared lock. `Ok(None)` for missing or
/// still-empty files.
fn read_link(path: &Path) -> StoreResult<Option<PaymentLink>> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    file.lock_shared()?;
    let mut json = String::new();
    let read = file.read_to_string(&mut json);
    file.unlock()?;
    read?;

    if json.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(&json)?))
}

fn write_document(path: &Path, link: &PaymentLink) -> StoreResult<()> {
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return Err(StoreError::DuplicateKey(link.id.clone()))
        }
        Err(e) => return Err(e.into()),
    };

    file.lock_exclusive()?;
    let written = serde_json::to_vec_pretty(link)
        .map_err(StoreError::from)
        .and_then(|json| {
            file.write_all(&json)?;
            file.sync_all()?;
            Ok(())
        });
    file.unlock()?;

    if let Err(e) = written {
        // Leave no half-written document behind to block the id forever.
        let _ = std::fs::remove_file(path);
        return Err(e);
    }
    Ok(())
}

/// Write the document, then the creator marker. Undoes both if the caller
/// abandoned the insert meanwhile.
fn write_new_link(
    doc_path: &Path,
    creator_dir: &Path,
    link: &PaymentLink,
    abandoned: &AtomicBool,
) -> StoreResult<()> {
    write_document(doc_path, link)?;

    let marker = creator_dir.join(&link.id);
    let indexed = std::fs::create_dir_all(creator_dir).and_then(|()| File::create(&marker));
    if let Err(e) = indexed {
        let _ = std::fs::remove_file(doc_path);
        return Err(e.into());
    }

    if abandoned.load(Ordering::SeqCst) {
        let _ = std::fs::remove_file(&marker);
        let _ = std::fs::remove_file(doc_path);
        return Err(StoreError::Unavailable(format!(
            "insert of {} abandoned by caller",
            link.id
        )));
    }
    Ok(())
}

#[async_trait]
impl PaymentLinkStore for FileLinkStore {
    async fn exists(&self, id: &str) -> StoreResult<bool> {
        if !is_valid_link_id(id) {
            return Ok(false);
        }
        let path = Self::link_path(&self.links_dir, id);
        run_blocking(move || Ok(path.try_exists()?)).await
    }

    async fn insert(&self, mut link: PaymentLink) -> StoreResult<String> {
        if !is_valid_link_id(&link.id) {
            return Err(StoreError::Unavailable(format!(
                "refusing to store malformed link id {:?}",
                link.id
            )));
        }

        let record_id = new_record_id();
        link.record_id = record_id.clone();
        let doc_path = Self::link_path(&self.links_dir, &link.id);
        let creator_dir = self.creator_dir(&link.creator_address);

        let abandoned = Arc::new(AtomicBool::new(false));
        let guard = AbandonOnDrop::new(Arc::clone(&abandoned));
        let written =
            run_blocking(move || write_new_link(&doc_path, &creator_dir, &link, &abandoned)).await;
        guard.disarm();

        written?;
        Ok(record_id)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<PaymentLink>> {
        if !is_valid_link_id(id) {
            return Ok(None);
        }
        let path = Self::link_path(&self.links_dir, id);
        run_blocking(move || read_link(&path)).await
    }

    async fn find_by_creator_address(&self, address: &str) -> StoreResult<Vec<PaymentLink>> {
        let links_dir = self.links_dir.clone();
        let creator_dir = self.creator_dir(address);
        let address = address.to_string();

        run_blocking(move || {
            let entries = match std::fs::read_dir(&creator_dir) {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
                Err(e) => return Err(e.into()),
            };

            let mut result = Vec::new();
            for entry in entries {
                let name = entry?.file_name();
                let Some(id) = name.to_str().filter(|id| is_valid_link_id(id)) else {
                    continue;
                };

                match read_link(&Self::link_path(&links_dir, id)) {
                    Ok(Some(link)) if link.creator_address == address => result.push(link),
                    Ok(_) => {}
                    Err(e) => warn!(id, error = %e, "skipping unreadable payment link"),
                }
            }

            sort_newest_first(&mut result);
            Ok(result)
        })
        .await
    }

    async fn health_check(&self) -> StoreResult<()> {
        let dirs = [self.links_dir.clone(), self.index_dir.clone()];
        run_blocking(move || {
            for dir in &dirs {
                if !std::fs::metadata(dir)?.is_dir() {
                    return Err(StoreError::Unavailable(format!(
                        "{} is not a directory",
                        dir.display()
                    )));
                }
            }
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::link_fixture;
    use crate::{Amount, LinkStatus, PaymentRecord};
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_insert_and_find() {
        let dir = TempDir::new().unwrap();
        let store = FileLinkStore::new(dir.path()).unwrap();

        let link = link_fixture("aB3dE5gH", "ST1ABC", Utc::now());
        let record_id = store.insert(link.clone()).await.unwrap();

        let stored = store.find_by_id("aB3dE5gH").await.unwrap().unwrap();
        assert_eq!(stored.record_id, record_id);
        assert_eq!(stored.title, link.title);
        assert!(store.exists("aB3dE5gH").await.unwrap());
        assert!(store.links_dir().join("aB3dE5gH.json").is_file());
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let dir = TempDir::new().unwrap();
        let store = FileLinkStore::new(dir.path()).unwrap();

        store
            .insert(link_fixture("aB3dE5gH", "ST1ABC", Utc::now()))
            .await
            .unwrap();
        let err = store
            .insert(link_fixture("aB3dE5gH", "ST1XYZ", Utc::now()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(_)));

        let stored = store.find_by_id("aB3dE5gH").await.unwrap().unwrap();
        assert_eq!(stored.creator_address, "ST1ABC");
    }

    #[tokio::test]
    async fn test_malformed_ids_never_touch_disk() {
        let dir = TempDir::new().unwrap();
        let store = FileLinkStore::new(dir.path()).unwrap();

        assert!(!store.exists("../../etc/passwd").await.unwrap());
        assert!(store.find_by_id("../secret").await.unwrap().is_none());
        assert!(store
            .insert(link_fixture("../escape", "ST1ABC", Utc::now()))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_empty_document_is_invisible() {
        let dir = TempDir::new().unwrap();
        let store = FileLinkStore::new(dir.path()).unwrap();
        std::fs::write(store.links_dir().join("pending0.json"), b"").unwrap();

        assert!(store.exists("pending0").await.unwrap());
        assert!(store.find_by_id("pending0").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_listing_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let now = Utc::now();
        {
            let store = FileLinkStore::new(dir.path()).unwrap();
            for (i, id) in ["first000", "second00", "third000"].iter().enumerate() {
                store
                    .insert(link_fixture(id, "ST1ABC", now + Duration::seconds(i as i64)))
                    .await
                    .unwrap();
            }
        }

        let reopened = FileLinkStore::new(dir.path()).unwrap();
        let ids: Vec<String> = reopened
            .find_by_creator_address("ST1ABC")
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec!["third000", "second00", "first000"]);
        reopened.health_check().await.unwrap();
    }

    #[tokio::test]
    async fn test_round_trip_keeps_every_field() {
        let dir = TempDir::new().unwrap();
        let store = FileLinkStore::new(dir.path()).unwrap();

        let mut link = link_fixture("aB3dE5gH", "ST1ABC", Utc::now());
        link.amount = Amount::from_str_checked("0.123456789012345678901").unwrap();
        link.status = LinkStatus::Completed;
        link.total_paid = link.amount;
        link.payment_count = 1;
        link.payments = vec![PaymentRecord {
            amount: link.amount,
            payer_address: "ST2PAYER".to_string(),
            tx_id: "0xabc".to_string(),
            paid_at: Utc::now(),
        }];

        link.record_id = store.insert(link.clone()).await.unwrap();
        let stored = store.find_by_id("aB3dE5gH").await.unwrap().unwrap();
        assert_eq!(stored, link);
    }

    #[tokio::test]
    async fn test_listing_skips_corrupt_documents() {
        let dir = TempDir::new().unwrap();
        let store = FileLinkStore::new(dir.path()).unwrap();
        let now = Utc::now();
        store
            .insert(link_fixture("mine0000", "ST1ABC", now))
            .await
            .unwrap();
        store
            .insert(link_fixture("other000", "ST2OTHER", now))
            .await
            .unwrap();
        store
            .insert(link_fixture("mine0001", "ST1ABC", now + Duration::seconds(1)))
            .await
            .unwrap();

        // An unrelated creator's document and one of our own go bad.
        std::fs::write(store.links_dir().join("other000.json"), b"{not json").unwrap();
        std::fs::write(store.links_dir().join("mine0000.json"), b"{not json").unwrap();

        let mine = store.find_by_creator_address("ST1ABC").await.unwrap();
        let ids: Vec<&str> = mine.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["mine0001"]);
        assert!(store
            .find_by_creator_address("ST2OTHER")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_listing_reads_only_indexed_documents() {
        let dir = TempDir::new().unwrap();
        let store = FileLinkStore::new(dir.path()).unwrap();
        store
            .insert(link_fixture("indexed0", "ST1ABC", Utc::now()))
            .await
            .unwrap();

        // A document with no creator marker is not part of any listing.
        let stray = link_fixture("stray000", "ST1ABC", Utc::now());
        std::fs::write(
            store.links_dir().join("stray000.json"),
            serde_json::to_vec(&stray).unwrap(),
        )
        .unwrap();

        let listed = store.find_by_creator_address("ST1ABC").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "indexed0");
        assert!(store
            .find_by_creator_address("ST9NOBODY")
            .await
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_abandoned_insert_leaves_nothing_behind() {
        let dir = TempDir::new().unwrap();
        let store = FileLinkStore::new(dir.path()).unwrap();
        let link = link_fixture("gone0000", "ST1ABC", Utc::now());
        let doc_path = FileLinkStore::link_path(store.links_dir(), &link.id);
        let creator_dir = store.creator_dir(&link.creator_address);

        let err = write_new_link(&doc_path, &creator_dir, &link, &AtomicBool::new(true))
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(!doc_path.exists());
        assert!(!creator_dir.join("gone0000").exists());

        write_new_link(&doc_path, &creator_dir, &link, &AtomicBool::new(false)).unwrap();
        assert!(doc_path.is_file());
        assert!(creator_dir.join("gone0000").is_file());
    }

    #[test]
    fn test_dropped_guard_marks_insert_abandoned() {
        let flag = Arc::new(AtomicBool::new(false));
        AbandonOnDrop::new(Arc::clone(&flag)).disarm();
        assert!(!flag.load(Ordering::SeqCst));

        drop(AbandonOnDrop::new(Arc::clone(&flag)));
        assert!(flag.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_corrupt_document_reports_unavailable() {
        let dir = TempDir::new().unwrap();
        let store = FileLinkStore::new(dir.path()).unwrap();
        std::fs::write(store.links_dir().join("broken00.json"), b"{not json").unwrap();

        let err = store.find_by_id("broken00").await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
