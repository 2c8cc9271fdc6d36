//! Streaming MD5 digests over an upload source

use conduit_domain::constants::DIGEST_READ_BUFFER;
use conduit_domain::Result;

use crate::ports::UploadSource;

/// Lowercase hex MD5 of `bytes`.
pub fn md5_hex(bytes: &[u8]) -> String {
    format!("{:x}", md5::compute(bytes))
}

/// MD5 of `len` bytes starting at `offset`, read in bounded slices.
pub async fn digest_range(source: &dyn UploadSource, offset: u64, len: u64) -> Result<String> {
    let mut context = md5::Context::new();
    let end = offset + len;
    let mut position = offset;

    while position < end {
        let chunk = (end - position).min(DIGEST_READ_BUFFER as u64);
        let bytes = source.read_range(position, chunk).await?;
        context.consume(&bytes);
        position += chunk;
    }

    Ok(format!("{:x}", context.compute()))
}

/// MD5 of the whole source.
pub async fn digest_source(source: &dyn UploadSource) -> Result<String> {
    digest_range(source, 0, source.size()).await
}
