//! Character sets: the ordered alphabet a numeral system is built on.
//!
//! A `CharacterSet` is constructed once and never mutated. Besides the
//! digit maps it carries four boundary markers that partition the alphabet
//! into an escape-negative zone, a negative-magnitude zone, a
//! positive-magnitude zone, and an escape-positive zone:
//!
//! ```text
//! mostNegative < firstNegative < firstPositive < mostPositive
//! ```
//!
//! The head encoding (see `head`) needs each adjacent pair of markers to be
//! at least 3 characters apart; construction fails otherwise.

use std::sync::OnceLock;

use rustc_hash::FxHashMap;

use crate::error::Error;
use crate::error::Result;

/// The 62 alphanumeric characters, database and user friendly.
/// For shorter keys and more room you could opt for more characters.
const BASE62_CHARS: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Configuration for building a `CharacterSet`.
///
/// Every optional field has a derived default, resolved once inside
/// `CharacterSet::new`:
/// - `first_positive`: the middle character (`radix / 2`), which keeps the
///   3-character marker gaps satisfiable down to the 7-character minimum.
/// - `most_positive`: the last character.
/// - `most_negative`: the first character.
/// - `jitter_range`: `floor(radix^3 / 5)`, roughly a fifth of the room
///   gained by appending three characters. An acknowledged ad hoc constant;
///   override it rather than trusting a derivation that doesn't exist.
#[derive(Clone, Debug)]
pub struct CharSetConfig {
    chars: String,
    jitter_range: Option<u64>,
    first_positive: Option<char>,
    most_positive: Option<char>,
    most_negative: Option<char>,
}

impl CharSetConfig {
    /// Start a configuration from a sorted string of unique characters,
    /// like `"0123456789ABC"`.
    pub fn new(chars: impl Into<String>) -> CharSetConfig {
        return CharSetConfig {
            chars: chars.into(),
            jitter_range: None,
            first_positive: None,
            most_positive: None,
            most_negative: None,
        };
    }

    /// Override the size of the random offset space used by jittering.
    pub fn jitter_range(mut self, range: u64) -> CharSetConfig {
        self.jitter_range = Some(range);
        return self;
    }

    /// Override the first character of the positive magnitude zone.
    pub fn first_positive(mut self, c: char) -> CharSetConfig {
        self.first_positive = Some(c);
        return self;
    }

    /// Override the highest character (the positive escape marker).
    pub fn most_positive(mut self, c: char) -> CharSetConfig {
        self.most_positive = Some(c);
        return self;
    }

    /// Override the lowest character (the negative escape marker).
    pub fn most_negative(mut self, c: char) -> CharSetConfig {
        self.most_negative = Some(c);
        return self;
    }
}

/// An indexed alphabet: digit maps plus the numeral-system boundary markers.
///
/// Boundary markers are stored as digit indices into `chars` so zone checks
/// are integer comparisons. Because the alphabet is validated to be sorted
/// by scalar value, alphabet order and plain string order always agree.
#[derive(Clone, Debug)]
pub struct CharacterSet {
    chars: Vec<char>,
    by_char: FxHashMap<char, u32>,
    first_positive: u32,
    first_negative: u32,
    most_positive: u32,
    most_negative: u32,
    jitter_range: u64,
    padding_powers: Vec<u128>,
}

impl CharacterSet {
    /// Validate the alphabet and resolve the configuration into an
    /// immutable character set.
    pub fn new(config: CharSetConfig) -> Result<CharacterSet> {
        let chars: Vec<char> = config.chars.chars().collect();
        if chars.len() < 7 {
            return Err(Error::AlphabetTooShort(chars.len()));
        }
        if !chars.windows(2).all(|w| w[0] < w[1]) {
            return Err(Error::AlphabetUnsorted);
        }

        let mut by_char = FxHashMap::default();
        for (i, &c) in chars.iter().enumerate() {
            by_char.insert(c, i as u32);
        }
        let radix = chars.len() as u32;

        let lookup = |c: Option<char>, fallback: u32| -> Result<u32> {
            return match c {
                Some(c) => by_char.get(&c).copied().ok_or(Error::UnknownChar(c)),
                None => Ok(fallback),
            };
        };
        let first_positive = lookup(config.first_positive, radix / 2)?;
        let most_positive = lookup(config.most_positive, radix - 1)?;
        let most_negative = lookup(config.most_negative, 0)?;

        if most_positive < first_positive + 3 {
            return Err(Error::BoundaryTooClose("mostPositive"));
        }
        if first_positive < most_negative + 3 {
            return Err(Error::BoundaryTooClose("mostNegative"));
        }

        let jitter_range = config
            .jitter_range
            .unwrap_or((radix as u64).pow(3) / 5);

        // radix^0, radix^1, ... until one power clears the jitter range.
        // Answers "how many extra digits buy this much randomness" in O(1).
        let mut padding_powers = Vec::new();
        let mut power: u128 = 1;
        loop {
            padding_powers.push(power);
            if power > jitter_range as u128 {
                break;
            }
            power = power.saturating_mul(radix as u128);
        }

        return Ok(CharacterSet {
            chars,
            by_char,
            first_positive,
            first_negative: first_positive - 1,
            most_positive,
            most_negative,
            jitter_range,
            padding_powers,
        });
    }

    /// Number of characters in the alphabet: the radix of the numeral system.
    pub fn radix(&self) -> u32 {
        return self.chars.len() as u32;
    }

    /// The lowest character, used as the zero digit.
    pub fn first(&self) -> char {
        return self.chars[0];
    }

    /// The highest character.
    pub fn last(&self) -> char {
        return self.chars[self.chars.len() - 1];
    }

    /// The character for a digit value. Panics if the digit is out of
    /// range, which can only happen through an internal arithmetic bug.
    pub fn digit_char(&self, digit: u32) -> char {
        return self.chars[digit as usize];
    }

    /// The digit value of a character, or an error for characters outside
    /// the alphabet.
    pub fn char_digit(&self, c: char) -> Result<u32> {
        return self.by_char.get(&c).copied().ok_or(Error::UnknownChar(c));
    }

    /// First character of the positive magnitude zone (the neutral point).
    pub fn first_positive(&self) -> char {
        return self.chars[self.first_positive as usize];
    }

    /// Highest character of the negative magnitude zone.
    pub fn first_negative(&self) -> char {
        return self.chars[self.first_negative as usize];
    }

    /// The positive escape marker.
    pub fn most_positive(&self) -> char {
        return self.chars[self.most_positive as usize];
    }

    /// The negative escape marker.
    pub fn most_negative(&self) -> char {
        return self.chars[self.most_negative as usize];
    }

    pub(crate) fn first_positive_digit(&self) -> u32 {
        return self.first_positive;
    }

    pub(crate) fn first_negative_digit(&self) -> u32 {
        return self.first_negative;
    }

    pub(crate) fn most_positive_digit(&self) -> u32 {
        return self.most_positive;
    }

    pub(crate) fn most_negative_digit(&self) -> u32 {
        return self.most_negative;
    }

    /// Size of the random offset space used by the jitter layer.
    pub fn jitter_range(&self) -> u64 {
        return self.jitter_range;
    }

    pub(crate) fn padding_powers(&self) -> &[u128] {
        return &self.padding_powers;
    }
}

/// The cached base62 character set, built once per process.
///
/// `firstPositive = 'a'` gives human readable keys starting at `a0`, `a1`,
/// and so on; `'z'` and `'A'` are the escape markers.
pub fn base62() -> &'static CharacterSet {
    static BASE62: OnceLock<CharacterSet> = OnceLock::new();
    return BASE62.get_or_init(|| {
        CharacterSet::new(
            CharSetConfig::new(BASE62_CHARS)
                .first_positive('a')
                .most_positive('z')
                .most_negative('A'),
        )
        .expect("base62 alphabet is valid")
    });
}
