//! Request signing with a shared API key

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use conduit_domain::ConduitError;
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Compute the `signature` header value.
///
/// The MAC covers `user_id`, the URL path (no query string) and the
/// timestamp, concatenated in that order. `api_key` is the base64 secret as
/// issued; it is decoded before use.
pub fn sign(
    user_id: &str,
    api_key: &str,
    path: &str,
    timestamp: &str,
) -> Result<String, ConduitError> {
    let key = STANDARD
        .decode(api_key.trim())
        .map_err(|err| ConduitError::Auth(format!("API key is not valid base64: {err}")))?;

    let mut mac = HmacSha1::new_from_slice(&key)
        .map_err(|err| ConduitError::Auth(format!("unusable API key: {err}")))?;
    mac.update(user_id.as_bytes());
    mac.update(path.as_bytes());
    mac.update(timestamp.as_bytes());

    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Timestamp in the form the signature check expects.
pub fn signature_timestamp(now: chrono::DateTime<chrono::Utc>) -> String {
    now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
