use crate::models::UploadFile;
use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;

/// Byte budget of a default cache.
pub const DEFAULT_MAX_BYTES: usize = 64 * 1024 * 1024;

/// Files uploaded during this process lifetime, by document id.
///
/// Lets "open" serve a just-uploaded file without a round trip to blob
/// storage. Never persisted. The total size of cached files stays within
/// `max_bytes`: the oldest entries are evicted first and a file larger than
/// the whole budget is not cached. Evicted documents open from their stored
/// URL instead.
#[derive(Debug)]
pub struct PreviewCache {
    max_bytes: usize,
    inner: RwLock<Entries>,
}

#[derive(Debug, Default)]
struct Entries {
    files: HashMap<u64, UploadFile>,
    /// Insertion order, oldest first.
    order: VecDeque<u64>,
    total_bytes: usize,
}

impl Entries {
    fn remove(&mut self, id: u64) {
        if let Some(file) = self.files.remove(&id) {
            self.total_bytes -= file.bytes.len();
            self.order.retain(|&cached| cached != id);
        }
    }
}

impl Default for PreviewCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BYTES)
    }
}

impl PreviewCache {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            inner: RwLock::new(Entries::default()),
        }
    }

    pub async fn insert(&self, id: u64, file: UploadFile) {
        let size = file.bytes.len();
        let mut inner = self.inner.write().await;
        inner.remove(id);

        if size > self.max_bytes {
            tracing::debug!(id, size, "File too large for preview cache");
            return;
        }

        while inner.total_bytes + size > self.max_bytes {
            let Some(oldest) = inner.order.front().copied() else {
                break;
            };
            tracing::debug!(id = oldest, "Evicting cached preview");
            inner.remove(oldest);
        }

        inner.total_bytes += size;
        inner.order.push_back(id);
        inner.files.insert(id, file);
    }

    pub async fn get(&self, id: u64) -> Option<UploadFile> {
        self.inner.read().await.files.get(&id).cloned()
    }

    pub async fn remove(&self, id: u64) {
        self.inner.write().await.remove(id);
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.files.len()
    }

    pub async fn total_bytes(&self) -> usize {
        self.inner.read().await.total_bytes
    }
}
