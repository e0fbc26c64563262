//! Fingerprint, access-key, and display-name generation.
//!
//! Fingerprints are assigned once at creation time and never recomputed.
//! The format is `site_<millis>_<8 hex chars>`: a namespace tag, the wall
//! clock at millisecond resolution, and a random suffix from the OS-seeded
//! RNG. The suffix carries 32 bits of entropy, so collisions within one
//! millisecond are a 2^-32 event rather than a clock-resolution problem.
//!
//! Because the fingerprint is time+random rather than a content hash, dedup
//! by fingerprint can only catch exact identifier collisions, never
//! semantic content duplication. See `dedup`.

use chrono::Utc;
use rand::Rng;

/// Namespace tag prefixing every fingerprint.
const FINGERPRINT_TAG: &str = "site";

/// Generate a fresh fingerprint for a record being created.
///
/// Reads the wall clock and the RNG; not reproducible.
pub fn generate_fingerprint() -> String {
    let mut rng = rand::rng();
    let suffix: u32 = rng.random();
    format!("{}_{}_{:08x}", FINGERPRINT_TAG, Utc::now().timestamp_millis(), suffix)
}

/// Generate an opaque per-record access key: 16 random bytes, hex-encoded.
///
/// Independent of record content by construction.
pub fn generate_access_key() -> String {
    let mut rng = rand::rng();
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);
    hex::encode(bytes)
}

/// Generate a display name for a new record.
pub fn generate_name() -> String {
    format!("Site_{}", Utc::now().timestamp_millis())
}
