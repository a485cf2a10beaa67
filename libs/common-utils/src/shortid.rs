//! Short, URL-safe identifiers and timestamp helpers
//!
//! An ID is the Base58 encoding of a 48-bit big-endian millisecond timestamp
//! followed by random bytes. Because the Base58 alphabet is in ASCII order,
//! IDs of equal length sort by creation time.

use chrono::{DateTime, TimeZone, Utc};
use rand::RngCore;
use thiserror::Error;

use crate::base58::{self, Base58Error};

const TIMESTAMP_BYTES: usize = 6;
const DEFAULT_RANDOM_BYTES: usize = 4;

/// Format used by [`timestamp_string`]
pub const COMPACT_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

#[derive(Debug, Error)]
pub enum ShortIdError {
    #[error("Invalid short id: {0}")]
    Decode(#[from] Base58Error),

    #[error("Short id too short: {len} bytes")]
    TooShort { len: usize },

    #[error("Short id timestamp out of range: {millis}")]
    TimestampOutOfRange { millis: i64 },
}

/// Generator for timestamp-prefixed Base58 IDs
#[derive(Debug, Clone, Copy)]
pub struct ShortIdGenerator {
    random_bytes: usize,
}

impl Default for ShortIdGenerator {
    fn default() -> Self {
        Self {
            random_bytes: DEFAULT_RANDOM_BYTES,
        }
    }
}

impl ShortIdGenerator {
    /// Generator appending `random_bytes` of entropy to each timestamp
    pub fn new(random_bytes: usize) -> Self {
        Self { random_bytes }
    }

    /// New ID stamped with the current time
    pub fn generate(&self) -> String {
        self.generate_at(now_millis())
    }

    /// New ID stamped with `millis` since the Unix epoch. Only the low 48 bits
    /// of the timestamp are kept.
    pub fn generate_at(&self, millis: i64) -> String {
        let mut raw = vec![0u8; TIMESTAMP_BYTES + self.random_bytes];
        raw[..TIMESTAMP_BYTES].copy_from_slice(&millis.to_be_bytes()[8 - TIMESTAMP_BYTES..]);
        rand::thread_rng().fill_bytes(&mut raw[TIMESTAMP_BYTES..]);
        base58::encode(&raw)
    }
}

/// Shorthand for `ShortIdGenerator::default().generate()`
pub fn short_id() -> String {
    ShortIdGenerator::default().generate()
}

/// Recover the creation time embedded in an ID
pub fn timestamp_of(id: &str) -> Result<DateTime<Utc>, ShortIdError> {
    let raw = base58::decode(id)?;
    if raw.len() < TIMESTAMP_BYTES {
        return Err(ShortIdError::TooShort { len: raw.len() });
    }

    let mut buf = [0u8; 8];
    buf[8 - TIMESTAMP_BYTES..].copy_from_slice(&raw[..TIMESTAMP_BYTES]);
    let millis = i64::from_be_bytes(buf);

    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or(ShortIdError::TimestampOutOfRange { millis })
}

/// Milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// `YYYYMMDDhhmmss` rendering of `at`, e.g. for object keys and file names
pub fn timestamp_string(at: DateTime<Utc>) -> String {
    at.format(COMPACT_TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let generator = ShortIdGenerator::default();
        let a = generator.generate();
        let b = generator.generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_timestamp_round_trip() {
        let millis = 1_700_000_000_123;
        let id = ShortIdGenerator::default().generate_at(millis);
        let at = timestamp_of(&id).unwrap();
        assert_eq!(at.timestamp_millis(), millis);
    }

    #[test]
    fn test_ids_sort_by_time() {
        let generator = ShortIdGenerator::new(0);
        let earlier = generator.generate_at(1_700_000_000_000);
        let later = generator.generate_at(1_700_000_000_001);
        assert_eq!(earlier.len(), later.len());
        assert!(earlier < later);
    }

    #[test]
    fn test_timestamp_of_rejects_garbage() {
        assert!(matches!(timestamp_of("0OIl"), Err(ShortIdError::Decode(_))));
        assert!(matches!(timestamp_of("2"), Err(ShortIdError::TooShort { len: 1 })));
    }

    #[test]
    fn test_timestamp_string() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(timestamp_string(at), "20240309070501");
    }
}
