//! Common Utility Library
//!
//! Small leaf helpers shared by every service:
//!
//! - [`base58`]: Bitcoin-alphabet Base58 codec
//! - [`shortid`]: timestamp-prefixed Base58 IDs and timestamp formatting
//! - [`strings`]: blank checks, truncation, case conversion
//! - [`slice`]: `find` / `find_by` lookups
//!
//! ```
//! use common_utils::{short_id, shortid::timestamp_of};
//!
//! let id = short_id();
//! assert!(timestamp_of(&id).is_ok());
//! ```

pub mod base58;
pub mod shortid;
pub mod slice;
pub mod strings;

pub use base58::Base58Error;
pub use shortid::{now_millis, short_id, timestamp_string, ShortIdError, ShortIdGenerator};
pub use slice::{find, find_by};
