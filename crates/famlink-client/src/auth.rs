//! SAPISIDHASH request signing
//!
//! Google's first-party web APIs authorize cookie-bearing requests with
//! an `Authorization: SAPISIDHASH <ts>_<hash>` header, where the hash
//! is SHA-1 over `"{ts} {SAPISID} {origin}"` and `ts` is the current
//! unix time in milliseconds.

use sha1::{Digest, Sha1};

pub fn sapisidhash(timestamp_ms: i64, sapisid: &str, origin: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(format!("{timestamp_ms} {sapisid} {origin}").as_bytes());
    format!("{}_{}", timestamp_ms, hex::encode(hasher.finalize()))
}

/// Full `Authorization` header value for the current moment
pub fn authorization_header(sapisid: &str, origin: &str) -> String {
    let timestamp_ms = famlink_util::now().timestamp_millis();
    format!("SAPISIDHASH {}", sapisidhash(timestamp_ms, sapisid, origin))
}
