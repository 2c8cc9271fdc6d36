//! In-memory upload sources

use async_trait::async_trait;
use conduit_core::ports::UploadSource;
use conduit_domain::{ConduitError, Result};
use parking_lot::Mutex;

/// Byte buffer exposed as an [`UploadSource`].
pub struct MemorySource {
    name: String,
    size: u64,
    data: Mutex<Vec<u8>>,
}

impl MemorySource {
    pub fn new(name: &str, data: Vec<u8>) -> Self {
        Self { name: name.to_string(), size: data.len() as u64, data: Mutex::new(data) }
    }

    /// Simulate the file being edited in place mid-upload.
    pub fn flip_byte(&self, offset: usize) {
        self.data.lock()[offset] ^= 0xFF;
    }
}

#[async_trait]
impl UploadSource for MemorySource {
    fn file_name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    async fn read_range(&self, offset: u64, len: u64) -> Result<Vec<u8>> {
        let start = offset as usize;
        let end = start + len as usize;
        self.data
            .lock()
            .get(start..end)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| ConduitError::Io(format!("read {start}..{end} past end of source")))
    }
}
