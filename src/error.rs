//! Error types for key generation.
//!
//! Every failure in this crate is a synchronous input-validation error:
//! operations are pure functions of their inputs, so there is nothing to
//! retry and no partial state to clean up.

use thiserror::Error;

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// All the ways key generation can fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The alphabet has fewer than the 7 characters the boundary-marker
    /// layout needs.
    #[error("alphabet must contain at least 7 characters, got {0}")]
    AlphabetTooShort(usize),

    /// The alphabet is not strictly ascending (this also catches
    /// duplicate characters).
    #[error("alphabet must be sorted and free of duplicates")]
    AlphabetUnsorted,

    /// A character does not belong to the alphabet. Raised both for bad
    /// boundary-marker overrides and for foreign digits inside a key.
    #[error("character {0:?} is not in the alphabet")]
    UnknownChar(char),

    /// A boundary marker violates the minimum 3-character gap that the
    /// escaping scheme reserves around the neutral point.
    #[error("{0} must be at least 3 characters away from neutral")]
    BoundaryTooClose(&'static str),

    /// The key's head implies an integer part longer than the key itself,
    /// or the head starts on a character no head can start on.
    #[error("malformed order key: {0:?}")]
    MalformedKey(String),

    /// The between-generator requires `lower < upper` in plain string order.
    #[error("lower bound {lower:?} is not strictly below upper bound {upper:?}")]
    BoundsOutOfOrder { lower: String, upper: String },

    /// Digit subtraction where the minuend is smaller than the subtrahend.
    /// Reaching this from the public API means a malformed key slipped in.
    #[error("subtraction result is negative")]
    NegativeSubtraction,

    /// The digit string encodes a magnitude beyond the u128 decode ceiling.
    #[error("digit string {0:?} exceeds the safely decodable range")]
    DecodeOverflow(String),

    /// A neighbor query named a key the tracked snapshot doesn't contain.
    #[error("order key {0:?} is not in the tracked list")]
    KeyNotInList(String),

    /// Grouping is enabled but no group id was supplied.
    #[error("a group id is required when grouping is enabled")]
    GroupIdRequired,

    /// The supplied group id doesn't match the configured prefix length.
    #[error("group id {got:?} must be exactly {expected} characters long")]
    GroupIdLength { expected: usize, got: String },
}
