//! `PartTransfer` wrappers that observe or sabotage the byte store

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use conduit_core::ports::PartTransfer;
use conduit_domain::Result;

use super::FakeFileStore;

/// Tracks how many PUTs are running at once.
pub struct InFlightTransfer {
    inner: Arc<FakeFileStore>,
    hold: Duration,
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlightTransfer {
    /// Each PUT stays open for `hold` before reaching the store.
    pub fn new(inner: Arc<FakeFileStore>, hold: Duration) -> Self {
        Self { inner, hold, current: AtomicUsize::new(0), peak: AtomicUsize::new(0) }
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PartTransfer for InFlightTransfer {
    async fn put_part(&self, url: &str, content_type: &str, bytes: &[u8]) -> Result<()> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.hold).await;
        let result = self.inner.put_part(url, content_type, bytes).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Panics while sending one chosen part.
pub struct PanickingTransfer {
    inner: Arc<FakeFileStore>,
    part_number: u32,
}

impl PanickingTransfer {
    pub fn new(inner: Arc<FakeFileStore>, part_number: u32) -> Self {
        Self { inner, part_number }
    }
}

#[async_trait]
impl PartTransfer for PanickingTransfer {
    async fn put_part(&self, url: &str, content_type: &str, bytes: &[u8]) -> Result<()> {
        if FakeFileStore::part_of_url(url) == Some(self.part_number) {
            panic!("transfer crashed on part {}", self.part_number);
        }
        self.inner.put_part(url, content_type, bytes).await
    }
}
