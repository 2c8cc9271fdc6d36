//! File-backed upload source

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use conduit_core::ports::UploadSource;
use conduit_domain::{ConduitError, Result};
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::errors::InfraError;

/// Reads parts straight from disk; nothing is buffered beyond one range.
///
/// Each read opens its own handle so concurrent workers never share a
/// cursor.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    file_name: String,
    size: u64,
}

impl FileSource {
    /// Stat `path` and capture its name and size.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = tokio::fs::metadata(&path).await.map_err(io_error)?;
        if !metadata.is_file() {
            return Err(ConduitError::InvalidArgument(format!(
                "{} is not a regular file",
                path.display()
            )));
        }

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                ConduitError::InvalidArgument(format!("{} has no file name", path.display()))
            })?;

        Ok(Self { path, file_name, size: metadata.len() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn io_error(err: std::io::Error) -> ConduitError {
    InfraError::from(err).into()
}

#[async_trait]
impl UploadSource for FileSource {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn size(&self) -> u64 {
        self.size
    }

    async fn read_range(&self, offset: u64, len: u64) -> Result<Vec<u8>> {
        let end = offset.checked_add(len).filter(|end| *end <= self.size).ok_or_else(|| {
            ConduitError::InvalidArgument(format!(
                "range {offset}+{len} is outside {} ({} bytes)",
                self.file_name, self.size
            ))
        })?;
        let len = usize::try_from(end - offset)
            .map_err(|_| ConduitError::InvalidArgument(format!("range of {len} bytes is too large")))?;

        let mut file = tokio::fs::File::open(&self.path).await.map_err(io_error)?;
        file.seek(SeekFrom::Start(offset)).await.map_err(io_error)?;

        let mut buffer = vec![0u8; len];
        file.read_exact(&mut buffer).await.map_err(|err| {
            if err.kind() == std::io::ErrorKind::UnexpectedEof {
                ConduitError::Io(format!("{} shrank while reading at offset {offset}", self.file_name))
            } else {
                io_error(err)
            }
        })?;
        Ok(buffer)
    }
}
