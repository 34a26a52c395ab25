//! Generating keys strictly between two optional bounds.
//!
//! The single-key cases:
//!
//! - no bounds: the canonical start key.
//! - only an upper bound: the predecessor of its magnitude. The bound's
//!   fractional tail is irrelevant, since any smaller magnitude already sorts
//!   before every key sharing that tail.
//! - only a lower bound: the successor of its magnitude, symmetrically.
//! - both bounds: the string midpoint.
//!
//! N-key generation against a closed interval splits recursively around a
//! midpoint instead of chaining single-key calls, which keeps keys near
//! the middle of a bulk insertion short.

use crate::charset::CharacterSet;
use crate::digits;
use crate::error::Error;
use crate::error::Result;
use crate::head;
use crate::jitter;
use crate::jitter::OffsetSource;
use crate::jitter::ThreadRandom;

/// How the fan-out recursion produces each single key. A closed set: plain
/// midpoint arithmetic, or the same plus a bounded random suffix.
pub(crate) enum Strategy<'a, S: OffsetSource> {
    Plain,
    Jittered(&'a mut S),
}

/// Generate a key between two other keys.
/// With one bound `None` the key lands before the start or after the end
/// of the list; with both `None` it is the canonical start key.
pub fn generate_key_between(
    lower: Option<&str>,
    upper: Option<&str>,
    charset: &CharacterSet,
) -> Result<String> {
    if let Some(lower) = lower {
        head::validate_order_key(lower, charset)?;
    }
    if let Some(upper) = upper {
        head::validate_order_key(upper, charset)?;
    }
    return match (lower, upper) {
        (None, None) => Ok(head::start_key(charset)),
        (None, Some(upper)) => {
            let integer = head::get_integer_part(upper, charset)?;
            head::decrement_integer(&integer, charset)
        }
        (Some(lower), None) => {
            let integer = head::get_integer_part(lower, charset)?;
            head::increment_integer(&integer, charset)
        }
        (Some(lower), Some(upper)) => {
            if lower >= upper {
                return Err(Error::BoundsOutOfOrder {
                    lower: lower.to_string(),
                    upper: upper.to_string(),
                });
            }
            digits::midpoint(lower, upper, charset)
        }
    };
}

/// Generate any number of keys between two other keys, strictly
/// increasing, all inside the open interval.
pub fn generate_n_keys_between(
    lower: Option<&str>,
    upper: Option<&str>,
    n: usize,
    charset: &CharacterSet,
) -> Result<Vec<String>> {
    let mut strategy: Strategy<'_, ThreadRandom> = Strategy::Plain;
    return spread(lower, upper, n, charset, &mut strategy);
}

fn generate_one<S: OffsetSource>(
    lower: Option<&str>,
    upper: Option<&str>,
    charset: &CharacterSet,
    strategy: &mut Strategy<'_, S>,
) -> Result<String> {
    return match strategy {
        Strategy::Plain => generate_key_between(lower, upper, charset),
        Strategy::Jittered(source) => {
            jitter::generate_jittered_key_between_with(lower, upper, charset, &mut **source)
        }
    };
}

/// Shared fan-out recursion for plain and jittered generation.
///
/// Open-ended bounds chain single-key calls; a closed interval emits one
/// midpoint key and recurses with `floor(n/2)` keys on the left and the
/// rest on the right, balancing key-length growth.
pub(crate) fn spread<S: OffsetSource>(
    lower: Option<&str>,
    upper: Option<&str>,
    n: usize,
    charset: &CharacterSet,
    strategy: &mut Strategy<'_, S>,
) -> Result<Vec<String>> {
    if n == 0 {
        return Ok(Vec::new());
    }
    if n == 1 {
        return Ok(vec![generate_one(lower, upper, charset, strategy)?]);
    }
    if upper.is_none() {
        let mut keys = Vec::with_capacity(n);
        let mut prev = generate_one(lower, None, charset, strategy)?;
        keys.push(prev.clone());
        for _ in 1..n {
            prev = generate_one(Some(prev.as_str()), None, charset, strategy)?;
            keys.push(prev.clone());
        }
        return Ok(keys);
    }
    if lower.is_none() {
        let mut keys = Vec::with_capacity(n);
        let mut prev = generate_one(None, upper, charset, strategy)?;
        keys.push(prev.clone());
        for _ in 1..n {
            prev = generate_one(None, Some(prev.as_str()), charset, strategy)?;
            keys.push(prev.clone());
        }
        keys.reverse();
        return Ok(keys);
    }

    let left_count = n / 2;
    let mid = generate_one(lower, upper, charset, strategy)?;
    let mut keys = spread(lower, Some(mid.as_str()), left_count, charset, strategy)?;
    let right = spread(Some(mid.as_str()), upper, n - left_count - 1, charset, strategy)?;
    keys.push(mid);
    keys.extend(right);
    return Ok(keys);
}
