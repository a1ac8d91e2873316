//! Content store gateway.
//!
//! Content-addressed storage: `put(bytes) -> ContentId`, `get(id) -> bytes`.
//! Identifiers are a deterministic function of the stored bytes.

use async_trait::async_trait;
use bytes::Bytes;
use docseal_core::ContentId;

use crate::error::Result;

/// Content-addressed blob storage.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store `data` and return its identifier. Storing the same bytes twice
    /// yields the same identifier.
    async fn put(&self, data: Bytes) -> Result<ContentId>;

    /// Fetch the bytes stored under `id`.
    ///
    /// Fails with [`GatewayError::NotFound`](crate::GatewayError::NotFound)
    /// if nothing is stored under `id`.
    async fn get(&self, id: &ContentId) -> Result<Bytes>;
}

/// In-memory content store for tests and dry runs.
///
/// Payloads are split into fixed-size chunks, each addressed by its Blake3
/// hash. A manifest listing the chunk hashes is addressed the same way and
/// its hash is the payload's [`ContentId`].
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::RwLock;

    use docseal_core::Blake3Hash;

    use crate::error::GatewayError;

    /// Same as the IPFS default chunker.
    pub const DEFAULT_CHUNK_SIZE: usize = 256 * 1024;

    const CHUNK_DOMAIN: &str = "docseal 2024 content chunk";
    const MANIFEST_DOMAIN: &str = "docseal 2024 content manifest";

    #[derive(Default)]
    struct Inner {
        chunks: HashMap<Blake3Hash, Bytes>,
        manifests: HashMap<ContentId, Vec<Blake3Hash>>,
    }

    pub struct MemoryContentStore {
        chunk_size: usize,
        inner: RwLock<Inner>,
        available: AtomicBool,
        gets: AtomicUsize,
    }

    impl MemoryContentStore {
        pub fn new() -> Self {
            Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
        }

        /// `chunk_size` of zero is treated as one byte.
        pub fn with_chunk_size(chunk_size: usize) -> Self {
            Self {
                chunk_size: chunk_size.max(1),
                inner: RwLock::new(Inner::default()),
                available: AtomicBool::new(true),
                gets: AtomicUsize::new(0),
            }
        }

        /// Simulate an outage: while unavailable every call fails with
        /// [`GatewayError::Unavailable`].
        pub fn set_available(&self, available: bool) {
            self.available.store(available, Ordering::SeqCst);
        }

        /// Number of `get` calls made so far, including failed ones.
        pub fn get_count(&self) -> usize {
            self.gets.load(Ordering::SeqCst)
        }

        /// Number of distinct payloads stored.
        pub fn len(&self) -> usize {
            self.inner.read().map(|i| i.manifests.len()).unwrap_or(0)
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        fn check_available(&self) -> Result<()> {
            if self.available.load(Ordering::SeqCst) {
                Ok(())
            } else {
                Err(GatewayError::Unavailable("content store offline".into()))
            }
        }
    }

    impl Default for MemoryContentStore {
        fn default() -> Self {
            Self::new()
        }
    }

    fn poisoned<T>(e: std::sync::PoisonError<T>) -> GatewayError {
        GatewayError::Unavailable(format!("lock poisoned: {}", e))
    }

    #[async_trait]
    impl ContentStore for MemoryContentStore {
        async fn put(&self, data: Bytes) -> Result<ContentId> {
            self.check_available()?;

            let mut hashes = Vec::new();
            let mut chunks = Vec::new();
            let mut offset = 0;
            while offset < data.len() {
                let end = (offset + self.chunk_size).min(data.len());
                let chunk = data.slice(offset..end);
                hashes.push(Blake3Hash::hash_domain(CHUNK_DOMAIN, &[chunk.as_ref()]));
                chunks.push(chunk);
                offset = end;
            }

            let total = (data.len() as u64).to_be_bytes();
            let mut parts: Vec<&[u8]> = vec![total.as_slice()];
            parts.extend(hashes.iter().map(|h| h.as_bytes().as_slice()));
            let id = ContentId::new(Blake3Hash::hash_domain(MANIFEST_DOMAIN, &parts).to_hex());

            let mut inner = self.inner.write().map_err(poisoned)?;
            for (hash, chunk) in hashes.iter().zip(chunks) {
                inner.chunks.entry(*hash).or_insert(chunk);
            }
            inner.manifests.entry(id.clone()).or_insert(hashes);

            tracing::debug!(content_id = %id, bytes = data.len(), "stored content");
            Ok(id)
        }

        async fn get(&self, id: &ContentId) -> Result<Bytes> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            self.check_available()?;

            let inner = self.inner.read().map_err(poisoned)?;
            let manifest = inner
                .manifests
                .get(id)
                .ok_or_else(|| GatewayError::NotFound(format!("content {}", id)))?;

            let mut out = Vec::new();
            for hash in manifest {
                let chunk = inner.chunks.get(hash).ok_or_else(|| {
                    GatewayError::InvalidResponse(format!(
                        "missing chunk {} of {}",
                        hash.to_hex(),
                        id
                    ))
                })?;
                out.extend_from_slice(chunk);
            }
            Ok(Bytes::from(out))
        }
    }
}
