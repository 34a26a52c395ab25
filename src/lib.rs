//! Lexikey - jittered fractional order keys for collaborative lists.
//!
//! Order keys are short strings that sort correctly under plain string
//! comparison and always leave room for another key between any two of
//! them, so reordering a list never renumbers it. Jitter adds a bounded
//! random suffix so independent writers inserting into the same slot
//! almost never collide - the concurrency story for offline-first and
//! CRDT-backed apps, with no coordination required.
//!
//! # Quick Start
//!
//! ```
//! use lexikey::base62;
//! use lexikey::generate_key_between;
//!
//! let charset = base62();
//!
//! // An empty list starts at the canonical first key.
//! let first = generate_key_between(None, None, charset).unwrap();
//! assert_eq!(first, "a0");
//!
//! // Append after it, then squeeze a key in between.
//! let second = generate_key_between(Some(first.as_str()), None, charset).unwrap();
//! let middle =
//!     generate_key_between(Some(first.as_str()), Some(second.as_str()), charset).unwrap();
//! assert!(first < middle && middle < second);
//! ```
//!
//! For tracking a whole list (and independent per-group orderings inside
//! one list), see [`OrderList`].

pub mod between;
pub mod charset;
pub mod digits;
pub mod error;
pub mod head;
pub mod jitter;
pub mod list;

pub use between::generate_key_between;
pub use between::generate_n_keys_between;
pub use charset::CharSetConfig;
pub use charset::CharacterSet;
pub use charset::base62;
pub use error::Error;
pub use error::Result;
pub use jitter::FixedOffset;
pub use jitter::OffsetSource;
pub use jitter::ThreadRandom;
pub use jitter::generate_jittered_key_between;
pub use jitter::generate_jittered_key_between_with;
pub use jitter::generate_n_jittered_keys_between;
pub use jitter::generate_n_jittered_keys_between_with;
pub use list::OrderList;
pub use list::OrderListConfig;
