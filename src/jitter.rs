//! Jitter: a bounded random suffix that keeps ordering intact.
//!
//! Two writers independently inserting into the same slot would both
//! compute the same midpoint. Adding a random offset drawn from
//! `[0, jitterRange)` to the key's tail drops the collision probability to
//! roughly `1 / jitterRange` while never moving the key past its bounds:
//! before the offset is added, the key is padded with enough zero digits
//! that the whole offset space fits below the upper bound and below the
//! key's own next magnitude.

use rand::Rng;

use crate::between;
use crate::between::Strategy;
use crate::charset::CharacterSet;
use crate::digits;
use crate::error::Result;
use crate::head;

/// Where jitter offsets come from. A small closed set instead of
/// passed-around closures: thread-local randomness in production, a fixed
/// value when reproducibility matters.
pub trait OffsetSource {
    /// Draw an offset in `[0, range)`. Must return 0 when `range` is 0.
    fn draw(&mut self, range: u64) -> u64;
}

/// Uniform offsets from the thread-local RNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRandom;

impl OffsetSource for ThreadRandom {
    fn draw(&mut self, range: u64) -> u64 {
        if range == 0 {
            return 0;
        }
        return rand::thread_rng().gen_range(0..range);
    }
}

/// Always the same offset, clamped into range. Pinning this to
/// `jitter_range / 2` reproduces the reference fixtures exactly.
#[derive(Clone, Copy, Debug)]
pub struct FixedOffset(pub u64);

impl OffsetSource for FixedOffset {
    fn draw(&mut self, range: u64) -> u64 {
        if range == 0 {
            return 0;
        }
        return self.0.min(range - 1);
    }
}

/// Add an encoded offset to a key's tail, digit-wise with carry.
pub fn jitter_key(order_key: &str, charset: &CharacterSet, offset: u64) -> Result<String> {
    let shift = digits::encode(offset as u128, charset);
    return digits::add_keys(order_key, &shift, charset);
}

/// Right-pad a key with zero digits, then jitter it.
pub fn pad_and_jitter_key(
    order_key: &str,
    extra: usize,
    charset: &CharacterSet,
    offset: u64,
) -> Result<String> {
    let padding: String = std::iter::repeat(charset.first()).take(extra).collect();
    return jitter_key(&format!("{order_key}{padding}"), charset, offset);
}

/// How many zero digits a key needs before a full jitter offset can be
/// added without escaping the open interval: the string distances to the
/// upper bound (if any) and to the key's own next magnitude must both
/// exceed the jitter range.
pub fn padding_needed_for_jitter(
    order_key: &str,
    upper: Option<&str>,
    charset: &CharacterSet,
) -> Result<usize> {
    let integer = head::get_integer_part(order_key, charset)?;
    let next_integer = head::increment_integer(&integer, charset)?;
    let range = charset.jitter_range() as u128;

    let mut needed = 0;
    if let Some(upper) = upper {
        let distance = digits::lexical_distance(order_key, upper, charset)?;
        if distance < range + 1 {
            needed = needed.max(padding_needed_for_distance(distance, charset));
        }
    }
    let distance = digits::lexical_distance(order_key, &next_integer, charset)?;
    if distance < range + 1 {
        needed = needed.max(padding_needed_for_distance(distance, charset));
    }
    return Ok(needed);
}

/// Extra digits required so that a gap of `jitter_range - distance` fits:
/// the index of the first cached radix power exceeding the gap.
pub fn padding_needed_for_distance(distance: u128, charset: &CharacterSet) -> usize {
    let range = charset.jitter_range() as u128;
    if distance >= range {
        return 0;
    }
    let gap = range - distance;
    for (i, &power) in charset.padding_powers().iter().enumerate() {
        if power > gap {
            return i;
        }
    }
    return 0;
}

/// Generate a key between two other keys and jitter it, drawing the offset
/// from an explicit source.
pub fn generate_jittered_key_between_with<S: OffsetSource>(
    lower: Option<&str>,
    upper: Option<&str>,
    charset: &CharacterSet,
    source: &mut S,
) -> Result<String> {
    let key = between::generate_key_between(lower, upper, charset)?;
    let padding = padding_needed_for_jitter(&key, upper, charset)?;
    let offset = source.draw(charset.jitter_range());
    if padding > 0 {
        return pad_and_jitter_key(&key, padding, charset, offset);
    }
    return jitter_key(&key, charset, offset);
}

/// Generate a key between two other keys with jitter.
pub fn generate_jittered_key_between(
    lower: Option<&str>,
    upper: Option<&str>,
    charset: &CharacterSet,
) -> Result<String> {
    return generate_jittered_key_between_with(lower, upper, charset, &mut ThreadRandom);
}

/// Generate any number of jittered keys between two other keys, drawing
/// offsets from an explicit source.
pub fn generate_n_jittered_keys_between_with<S: OffsetSource>(
    lower: Option<&str>,
    upper: Option<&str>,
    n: usize,
    charset: &CharacterSet,
    source: &mut S,
) -> Result<Vec<String>> {
    return between::spread(lower, upper, n, charset, &mut Strategy::Jittered(source));
}

/// Generate any number of jittered keys between two other keys.
pub fn generate_n_jittered_keys_between(
    lower: Option<&str>,
    upper: Option<&str>,
    n: usize,
    charset: &CharacterSet,
) -> Result<Vec<String>> {
    return generate_n_jittered_keys_between_with(lower, upper, n, charset, &mut ThreadRandom);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::base62;

    /// The fixture offset: half the default base62 jitter range.
    fn mid_offset() -> u64 {
        return base62().jitter_range() / 2;
    }

    #[test]
    fn jitter_adds_encoded_offset() {
        let cs = base62();
        assert_eq!(jitter_key("a0000", cs, mid_offset()).unwrap(), "a06CO");
    }

    #[test]
    fn pad_then_jitter() {
        let cs = base62();
        assert_eq!(pad_and_jitter_key("a0", 3, cs, mid_offset()).unwrap(), "a06CO");
    }

    #[test]
    fn padding_close_to_next_integer() {
        let cs = base62();
        assert_eq!(padding_needed_for_jitter("a0", None, cs).unwrap(), 3);
    }

    #[test]
    fn padding_close_to_upper_bound() {
        let cs = base62();
        assert_eq!(
            padding_needed_for_jitter("a000001", Some("a000002"), cs).unwrap(),
            3
        );
    }

    #[test]
    fn no_padding_with_room_to_spare() {
        let cs = base62();
        assert_eq!(padding_needed_for_jitter("a000001", None, cs).unwrap(), 0);
    }

    #[test]
    fn padding_just_short_of_room() {
        let cs = base62();
        assert_eq!(
            padding_needed_for_jitter("a01001", Some("a01C00"), cs).unwrap(),
            2
        );
    }

    #[test]
    fn padding_for_distance_table() {
        let cs = base62();
        for (distance, needed) in [(1, 3), (100, 3), (45000, 2), (100000, 0)] {
            assert_eq!(padding_needed_for_distance(distance, cs), needed);
        }
    }

    #[test]
    fn fixed_offset_clamps_into_range() {
        let mut source = FixedOffset(u64::MAX);
        assert_eq!(source.draw(10), 9);
        assert_eq!(source.draw(0), 0);
        let mut mid = FixedOffset(5);
        assert_eq!(mid.draw(10), 5);
    }

    #[test]
    fn thread_random_stays_in_range() {
        let mut source = ThreadRandom;
        for _ in 0..100 {
            assert!(source.draw(7) < 7);
        }
        assert_eq!(source.draw(0), 0);
        assert_eq!(source.draw(1), 0);
    }
}
