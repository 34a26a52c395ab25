//! Integer-head encoding: self-describing magnitude lengths.
//!
//! Keys have no fixed field widths, so the length of a key's integer
//! (magnitude) part must be readable off its own leading characters, the
//! "head". The rules:
//!
//! - A head starting on a normal character is that single character; the
//!   magnitude length is its distance from the neutral boundary plus 2.
//! - A head starting on an escape marker (`mostPositive` going up,
//!   `mostNegative` going down) is the whole run of that marker plus the
//!   character that breaks the run. Each escape level contributes the full
//!   width of the digit range plus one, so magnitudes can grow without
//!   bound while staying prefix-decodable.
//!
//! A head is never left sitting exactly on an escape marker: that would
//! make its own length undecodable. Crossing into or out of an escape
//! level therefore appends or strips a marker character.

use crate::charset::CharacterSet;
use crate::digits;
use crate::error::Error;
use crate::error::Result;

/// Which digit a fresh magnitude's digit run is filled with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Fill {
    /// All-zero: the smallest magnitude of the new length class.
    Lower,
    /// All-max: the largest magnitude of the new length class.
    Upper,
}

/// Which side of neutral an escape recursion is walking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Zone {
    Positive,
    Negative,
}

/// The canonical first key: neutral head plus one zero digit
/// (`"a0"` for base62).
pub fn start_key(charset: &CharacterSet) -> String {
    return format!("{}{}", charset.first_positive(), charset.first());
}

/// Absolute distance between two characters, in digit positions.
pub fn distance_between(a: char, b: char, charset: &CharacterSet) -> Result<u32> {
    let da = charset.char_digit(a)?;
    let db = charset.char_digit(b)?;
    return Ok(da.abs_diff(db));
}

/// The head of a magnitude: the run of leading escape markers plus the
/// character that breaks the run, or the single first character when it is
/// no escape marker. Clamps to the whole string if the run never breaks;
/// `integer_length` rejects such a head as malformed.
pub fn integer_head(integer: &str, charset: &CharacterSet) -> String {
    let chars: Vec<char> = integer.chars().collect();
    let mut i = 0;
    if chars.first() == Some(&charset.most_positive()) {
        while i < chars.len() && chars[i] == charset.most_positive() {
            i += 1;
        }
    }
    if chars.first() == Some(&charset.most_negative()) {
        while i < chars.len() && chars[i] == charset.most_negative() {
            i += 1;
        }
    }
    let end = (i + 1).min(chars.len());
    return chars[..end].iter().collect();
}

/// Split a magnitude into its head and its digit run.
pub fn split_integer(integer: &str, charset: &CharacterSet) -> (String, String) {
    let head = integer_head(integer, charset);
    let tail = integer.chars().skip(head.chars().count()).collect();
    return (head, tail);
}

/// Total magnitude length implied by a head. Accepts the head itself or
/// any longer prefix of the key: only the head characters are inspected.
pub fn integer_length(head: &str, charset: &CharacterSet) -> Result<usize> {
    let mut chars = head.chars();
    let first = chars
        .next()
        .ok_or_else(|| Error::MalformedKey(head.to_string()))?;
    let digit = charset.char_digit(first)?;
    if digit > charset.most_positive_digit() || digit < charset.most_negative_digit() {
        return Err(Error::MalformedKey(head.to_string()));
    }
    if digit == charset.most_positive_digit() {
        let first_level = (digit - charset.first_positive_digit()) as usize + 1;
        let rest = length_from_second_level(chars.as_str(), Zone::Positive, head, charset)?;
        return Ok(first_level + rest);
    }
    if digit == charset.most_negative_digit() {
        let first_level = (charset.first_negative_digit() - digit) as usize + 1;
        let rest = length_from_second_level(chars.as_str(), Zone::Negative, head, charset)?;
        return Ok(first_level + rest);
    }
    if digit >= charset.first_positive_digit() {
        return Ok((digit - charset.first_positive_digit()) as usize + 2);
    }
    return Ok((charset.first_negative_digit() - digit) as usize + 2);
}

/// Escape levels past the first: every continued escape character adds the
/// full width of the digit range plus one; a normal character terminates
/// with its distance to the opposite extreme plus 2.
fn length_from_second_level(
    key: &str,
    zone: Zone,
    original: &str,
    charset: &CharacterSet,
) -> Result<usize> {
    let mut chars = key.chars();
    let first = chars
        .next()
        .ok_or_else(|| Error::MalformedKey(original.to_string()))?;
    let digit = charset.char_digit(first)?;
    let most_positive = charset.most_positive_digit();
    let most_negative = charset.most_negative_digit();
    if digit > most_positive || digit < most_negative {
        return Err(Error::MalformedKey(original.to_string()));
    }
    let level_width = (most_positive - most_negative) as usize + 1;
    match zone {
        Zone::Positive => {
            if digit == most_positive {
                let rest = length_from_second_level(chars.as_str(), zone, original, charset)?;
                return Ok(level_width + rest);
            }
            return Ok((digit - most_negative) as usize + 2);
        }
        Zone::Negative => {
            if digit == most_negative {
                let rest = length_from_second_level(chars.as_str(), zone, original, charset)?;
                return Ok(level_width + rest);
            }
            return Ok((most_positive - digit) as usize + 2);
        }
    }
}

/// Slice an order key down to exactly its integer part. Fails if the key
/// is shorter than the length its own head implies.
pub fn get_integer_part(order_key: &str, charset: &CharacterSet) -> Result<String> {
    let head = integer_head(order_key, charset);
    let length = integer_length(&head, charset)?;
    let chars: Vec<char> = order_key.chars().collect();
    if length > chars.len() {
        return Err(Error::MalformedKey(order_key.to_string()));
    }
    return Ok(chars[..length].iter().collect());
}

/// Whether a string is exactly one well-formed magnitude.
pub fn valid_integer(integer: &str, charset: &CharacterSet) -> bool {
    return match integer_length(integer, charset) {
        Ok(length) => length == integer.chars().count(),
        Err(_) => false,
    };
}

/// Check that a key at least starts with a well-formed integer part.
pub fn validate_order_key(order_key: &str, charset: &CharacterSet) -> Result<()> {
    get_integer_part(order_key, charset)?;
    return Ok(());
}

fn validate_integer(integer: &str, charset: &CharacterSet) -> Result<()> {
    if !valid_integer(integer, charset) {
        return Err(Error::MalformedKey(integer.to_string()));
    }
    return Ok(());
}

fn is_positive(head: &str, charset: &CharacterSet) -> Result<bool> {
    let first = head
        .chars()
        .next()
        .ok_or_else(|| Error::MalformedKey(head.to_string()))?;
    return Ok(charset.char_digit(first)? >= charset.first_positive_digit());
}

fn last_char(s: &str) -> Option<char> {
    return s.chars().next_back();
}

/// Decrement that keeps the string width. The numeric subtraction strips
/// leading zero digits, but heads and digit runs are fixed-width fields:
/// stepping `"10"` down must yield `"0z"`, not `"z"`.
fn decrement_fixed_width(s: &str, charset: &CharacterSet) -> Result<String> {
    let next = digits::decrement_key(s, charset)?;
    let missing = s.chars().count() - next.chars().count();
    let padding: String = std::iter::repeat(charset.first()).take(missing).collect();
    return Ok(format!("{padding}{next}"));
}

/// Move a head to the next magnitude-length class up.
///
/// A head may never be left sitting on a bare escape marker: its own
/// length would be undecodable. Stepping the positive side into an escape
/// run appends a terminator; stepping the negative side out of one pops
/// the run's terminator and takes one extra step up.
pub fn increment_integer_head(head: &str, charset: &CharacterSet) -> Result<String> {
    let in_positive = is_positive(head, charset)?;
    let head_maxed = last_char(head) == Some(charset.most_positive());

    if !in_positive && head_maxed {
        let count = head.chars().count();
        let popped: String = head.chars().take(count - 1).collect();
        return digits::increment_key(&popped, charset);
    }
    let next_head = digits::increment_key(head, charset)?;
    if in_positive && last_char(&next_head) == Some(charset.most_positive()) {
        return Ok(format!("{}{}", next_head, charset.most_negative()));
    }
    return Ok(next_head);
}

/// Move a head to the next magnitude-length class down. Mirror image of
/// `increment_integer_head`.
pub fn decrement_integer_head(head: &str, charset: &CharacterSet) -> Result<String> {
    let in_positive = is_positive(head, charset)?;
    let head_min = last_char(head) == Some(charset.most_negative());

    if in_positive && head_min {
        let count = head.chars().count();
        let popped: String = head.chars().take(count - 1).collect();
        return decrement_fixed_width(&popped, charset);
    }
    let next_head = decrement_fixed_width(head, charset)?;
    if !in_positive && last_char(&next_head) == Some(charset.most_negative()) {
        // The terminator decremented into the escape run itself; descend
        // a level and re-terminate at the top of it.
        return Ok(format!("{}{}", next_head, charset.most_positive()));
    }
    return Ok(next_head);
}

fn start_on_new_head(head: &str, fill: Fill, charset: &CharacterSet) -> Result<String> {
    let new_length = integer_length(head, charset)?;
    let fill_char = match fill {
        Fill::Lower => charset.first(),
        Fill::Upper => charset.last(),
    };
    let head_length = head.chars().count();
    let run: String = std::iter::repeat(fill_char)
        .take(new_length - head_length)
        .collect();
    return Ok(format!("{head}{run}"));
}

/// The next magnitude up: an ordinary digit step while the digit run has
/// room, otherwise the smallest magnitude of the next length class.
pub fn increment_integer(integer: &str, charset: &CharacterSet) -> Result<String> {
    validate_integer(integer, charset)?;
    let (head, digs) = split_integer(integer, charset);
    let any_room = digs.chars().any(|c| c != charset.last());

    if any_room {
        let next_digits = digits::increment_key(&digs, charset)?;
        return Ok(format!("{head}{next_digits}"));
    }
    let next_head = increment_integer_head(&head, charset)?;
    return start_on_new_head(&next_head, Fill::Lower, charset);
}

/// The next magnitude down: an ordinary digit step while the digit run has
/// room, otherwise the largest magnitude of the next length class.
pub fn decrement_integer(integer: &str, charset: &CharacterSet) -> Result<String> {
    validate_integer(integer, charset)?;
    let (head, digs) = split_integer(integer, charset);
    let any_room = digs.chars().any(|c| c != charset.first());

    if any_room {
        let next_digits = decrement_fixed_width(&digs, charset)?;
        return Ok(format!("{head}{next_digits}"));
    }
    let next_head = decrement_integer_head(&head, charset)?;
    return start_on_new_head(&next_head, Fill::Upper, charset);
}
