//! Digit arithmetic over alphabet-indexed strings.
//!
//! Keys are treated as unsigned integers written in the character set's
//! radix, left-padded with the zero digit to equal length. Two things keep
//! this layer honest:
//!
//! 1. **No machine-integer shortcuts where precision matters.** The
//!    midpoint is computed by digit-wise short division of the difference
//!    string, so arbitrarily long keys never round-trip through a float or
//!    a fixed-width integer.
//!
//! 2. **An explicit decode ceiling.** `decode` uses checked u128 arithmetic
//!    and errors past the ceiling instead of silently losing precision.
//!    Comparisons that only need to know "is this distance huge" use a
//!    saturating variant internally.

use smallvec::SmallVec;

use crate::charset::CharacterSet;
use crate::error::Error;
use crate::error::Result;

/// Digit values of a key. Keys are short in practice, so the buffer lives
/// on the stack for anything up to 16 digits.
type Digits = SmallVec<[u32; 16]>;

/// Which side of a string to pad.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pad {
    /// Left-pad: numeric alignment for arithmetic.
    Start,
    /// Right-pad: lexicographic alignment for distance and midpoints.
    End,
}

/// Pad both strings to the longer of the two lengths with `fill`.
pub fn make_same_length(a: &str, b: &str, pad: Pad, fill: char) -> (String, String) {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    let max = len_a.max(len_b);
    return (pad_to(a, len_a, max, pad, fill), pad_to(b, len_b, max, pad, fill));
}

fn pad_to(s: &str, len: usize, target: usize, pad: Pad, fill: char) -> String {
    let filler: String = std::iter::repeat(fill).take(target - len).collect();
    return match pad {
        Pad::Start => filler + s,
        Pad::End => s.to_string() + &filler,
    };
}

fn digits_of(key: &str, charset: &CharacterSet) -> Result<Digits> {
    let mut digits = Digits::new();
    for c in key.chars() {
        digits.push(charset.char_digit(c)?);
    }
    return Ok(digits);
}

fn digits_to_string(digits: &[u32], charset: &CharacterSet) -> String {
    return digits.iter().map(|&d| charset.digit_char(d)).collect();
}

/// Add two keys digit-wise with carry propagation. The result may be one
/// digit longer than the longer operand.
pub fn add_keys(a: &str, b: &str, charset: &CharacterSet) -> Result<String> {
    let radix = charset.radix();
    let (pa, pb) = make_same_length(a, b, Pad::Start, charset.first());
    let da = digits_of(&pa, charset)?;
    let db = digits_of(&pb, charset)?;

    let mut result = Digits::new();
    let mut carry = 0;
    for i in (0..da.len()).rev() {
        let sum = da[i] + db[i] + carry;
        carry = sum / radix;
        result.push(sum % radix);
    }
    if carry > 0 {
        result.push(carry);
    }
    result.reverse();
    return Ok(digits_to_string(&result, charset));
}

/// Subtract `b` from `a` digit-wise with borrow propagation. Fails if the
/// result would be negative; leading zero digits are stripped.
pub fn subtract_keys(a: &str, b: &str, charset: &CharacterSet) -> Result<String> {
    let radix = charset.radix();
    let (pa, pb) = make_same_length(a, b, Pad::Start, charset.first());
    let da = digits_of(&pa, charset)?;
    let db = digits_of(&pb, charset)?;

    let mut result = Digits::new();
    let mut borrow = 0;
    for i in (0..da.len()).rev() {
        let mut digit_a = da[i];
        let digit_b = db[i] + borrow;
        if digit_a < digit_b {
            borrow = 1;
            digit_a += radix;
        } else {
            borrow = 0;
        }
        result.push(digit_a - digit_b);
    }
    if borrow > 0 {
        return Err(Error::NegativeSubtraction);
    }
    if result.is_empty() {
        return Ok(charset.first().to_string());
    }
    result.reverse();

    let zeros = result.iter().take_while(|&&d| d == 0).count();
    let stripped = &result[zeros.min(result.len() - 1)..];
    return Ok(digits_to_string(stripped, charset));
}

/// Add the smallest unit to a key.
pub fn increment_key(key: &str, charset: &CharacterSet) -> Result<String> {
    return add_keys(key, &charset.digit_char(1).to_string(), charset);
}

/// Subtract the smallest unit from a key.
pub fn decrement_key(key: &str, charset: &CharacterSet) -> Result<String> {
    return subtract_keys(key, &charset.digit_char(1).to_string(), charset);
}

/// Encode a non-negative machine integer as digits in the character set.
pub fn encode(value: u128, charset: &CharacterSet) -> String {
    if value == 0 {
        return charset.first().to_string();
    }
    let radix = charset.radix() as u128;
    let mut digits = Digits::new();
    let mut rest = value;
    while rest > 0 {
        digits.push((rest % radix) as u32);
        rest /= radix;
    }
    digits.reverse();
    return digits_to_string(&digits, charset);
}

/// Decode a digit string back into a machine integer with checked
/// arithmetic. Magnitudes past u128 fail instead of wrapping; don't rely
/// on decoded values anywhere near that ceiling.
pub fn decode(key: &str, charset: &CharacterSet) -> Result<u128> {
    let radix = charset.radix() as u128;
    let mut acc: u128 = 0;
    for c in key.chars() {
        let digit = charset.char_digit(c)? as u128;
        acc = acc
            .checked_mul(radix)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| Error::DecodeOverflow(key.to_string()))?;
    }
    return Ok(acc);
}

/// Decode, saturating at `u128::MAX` past the ceiling. Only suitable for
/// order comparisons where "unrepresentably big" is answer enough.
fn decode_saturating(key: &str, charset: &CharacterSet) -> Result<u128> {
    let radix = charset.radix() as u128;
    let mut acc: u128 = 0;
    for c in key.chars() {
        let digit = charset.char_digit(c)? as u128;
        acc = acc.saturating_mul(radix).saturating_add(digit);
    }
    return Ok(acc);
}

/// The distance between two keys when sorting them as strings. This is not
/// the distance between the numbers their suffixes might encode: both keys
/// are right-padded with the zero digit before subtracting. Saturates at
/// `u128::MAX` for astronomically distant keys.
pub fn lexical_distance(a: &str, b: &str, charset: &CharacterSet) -> Result<u128> {
    let (pa, pb) = make_same_length(a, b, Pad::End, charset.first());
    let (lower, upper) = if pa <= pb { (pa, pb) } else { (pb, pa) };
    let difference = subtract_keys(&upper, &lower, charset)?;
    return decode_saturating(&difference, charset);
}

/// Divide a digit string by two, flooring. Short division, most
/// significant digit first, so the length never matters.
fn halve(digits: &str, charset: &CharacterSet) -> Result<String> {
    let radix = charset.radix() as u64;
    let input = digits_of(digits, charset)?;
    if input.is_empty() {
        return Ok(charset.first().to_string());
    }
    let mut result = Digits::new();
    let mut remainder: u64 = 0;
    for &d in &input {
        let value = remainder * radix + d as u64;
        result.push((value / 2) as u32);
        remainder = value % 2;
    }
    let zeros = result.iter().take_while(|&&d| d == 0).count();
    let stripped = &result[zeros.min(result.len() - 1)..];
    return Ok(digits_to_string(stripped, charset));
}

/// The key halfway between two bounds, compared as strings.
///
/// If the padded bounds are string-adjacent there is no room at this
/// length, so `lower` gains one more zero digit; the distance at the new
/// length is exactly the radix. Bounds that are equal after end-padding
/// (the upper is the lower plus trailing zero digits) enclose no key at
/// all and are rejected.
pub fn midpoint(lower: &str, upper: &str, charset: &CharacterSet) -> Result<String> {
    let (mut padded_lower, padded_upper) =
        make_same_length(lower, upper, Pad::End, charset.first());
    let mut difference = subtract_keys(&padded_upper, &padded_lower, charset)?;

    if difference == charset.first().to_string() {
        return Err(Error::BoundsOutOfOrder {
            lower: lower.to_string(),
            upper: upper.to_string(),
        });
    }
    if difference == charset.digit_char(1).to_string() {
        padded_lower.push(charset.first());
        difference = format!("{}{}", charset.digit_char(1), charset.first());
    }
    let mid = halve(&difference, charset)?;
    return add_keys(&padded_lower, &mid, charset);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::CharSetConfig;
    use crate::charset::base62;

    fn base10() -> CharacterSet {
        return CharacterSet::new(CharSetConfig::new("0123456789")).unwrap();
    }

    #[test]
    fn add_base62() {
        let cs = base62();
        for (a, b, sum) in [
            ("a0", "1", "a1"),
            ("1", "a0", "a1"),
            ("Zz", "1", "a0"),
            ("0a0", "1", "0a1"),
        ] {
            assert_eq!(add_keys(a, b, cs).unwrap(), sum);
        }
    }

    #[test]
    fn add_base10() {
        let cs = base10();
        assert_eq!(add_keys("1", "5", &cs).unwrap(), "6");
        assert_eq!(add_keys("5", "7", &cs).unwrap(), "12");
    }

    #[test]
    fn subtract_base62() {
        let cs = base62();
        for (a, b, sum) in [
            ("a0", "1", "a1"),
            ("1", "a0", "a1"),
            ("Zz", "1", "a0"),
            ("0a0", "1", "0a1"),
        ] {
            assert_eq!(subtract_keys(sum, a, cs).unwrap(), b);
        }
    }

    #[test]
    fn subtract_base10() {
        let cs = base10();
        assert_eq!(subtract_keys("6", "1", &cs).unwrap(), "5");
        assert_eq!(subtract_keys("12", "5", &cs).unwrap(), "7");
    }

    #[test]
    fn subtract_underflow_fails() {
        let cs = base10();
        assert_eq!(
            subtract_keys("1", "10", &cs).unwrap_err(),
            Error::NegativeSubtraction
        );
    }

    #[test]
    fn decrement_cases() {
        let cs = base62();
        for (key, expected) in [("a0", "Zz"), ("Zz", "Zy"), ("a1", "a0"), ("b0T", "b0S")] {
            assert_eq!(decrement_key(key, cs).unwrap(), expected);
        }
    }

    #[test]
    fn increment_reverses_decrement() {
        let cs = base62();
        for key in ["a0", "Zz", "a1", "b0T"] {
            let down = decrement_key(key, cs).unwrap();
            assert_eq!(increment_key(&down, cs).unwrap(), key);
        }
    }

    #[test]
    fn encode_decode_round_trip() {
        let cs = base62();
        for value in [0u128, 1, 61, 62, 23832, 47665, u64::MAX as u128] {
            let encoded = encode(value, cs);
            assert_eq!(decode(&encoded, cs).unwrap(), value);
        }
    }

    #[test]
    fn encode_pinned_jitter_offset() {
        // floor(jitter_range / 2) for base62, used by the jitter fixtures.
        assert_eq!(encode(23832, base62()), "6CO");
    }

    #[test]
    fn decode_rejects_foreign_characters() {
        let cs = base10();
        assert_eq!(decode("12a", &cs).unwrap_err(), Error::UnknownChar('a'));
    }

    #[test]
    fn decode_overflows_past_ceiling() {
        let cs = base62();
        let huge: String = std::iter::repeat('z').take(40).collect();
        assert!(matches!(
            decode(&huge, cs).unwrap_err(),
            Error::DecodeOverflow(_)
        ));
    }

    #[test]
    fn lexical_distances() {
        let cs = base62();
        for (a, b, distance) in [
            ("a0", "a4", 4),
            ("a", "a4", 4),
            ("a1", "b1", 62),
            ("b1", "a1", 62),
            ("a1", "a2", 1),
            ("a10", "a20", 62),
            ("0a10", "0a20", 62),
        ] {
            assert_eq!(lexical_distance(a, b, cs).unwrap(), distance);
        }
    }

    #[test]
    fn lexical_distance_saturates() {
        let cs = base62();
        let far: String = std::iter::repeat('z').take(40).collect();
        assert_eq!(lexical_distance("0", &far, cs).unwrap(), u128::MAX);
    }

    #[test]
    fn midpoint_base62() {
        let cs = base62();
        for (lower, mid, upper) in [
            ("a0", "a4", "a8"),
            ("a0", "a3", "a7"),
            ("a0", "b0", "c0"),
            ("a00001", "b00001", "c00001"),
            ("a0", "a0V", "a1"),
        ] {
            assert_eq!(midpoint(lower, upper, cs).unwrap(), mid);
        }
    }

    #[test]
    fn midpoint_rejects_zero_width_interval() {
        let cs = base62();
        // Trailing zero digits make the bounds equal after end-padding:
        // nothing sorts strictly between them.
        for (lower, upper) in [("a002", "a0020"), ("a0", "a00"), ("a1", "a1000")] {
            assert!(matches!(
                midpoint(lower, upper, cs).unwrap_err(),
                Error::BoundsOutOfOrder { .. }
            ));
        }
    }

    #[test]
    fn midpoint_base10() {
        let cs = base10();
        for (lower, mid, upper) in [("0", "1", "2"), ("10", "15", "20"), ("0", "05", "10")] {
            assert_eq!(midpoint(lower, upper, &cs).unwrap(), mid);
        }
    }
}
