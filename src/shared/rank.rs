//! Rank Keys
//!
//! A rank key is an opaque string over the alphabet `a..=z` that positions an
//! item inside its container. Keys compare byte-wise, so the display order of
//! a list is simply the ascending sort of its keys. New keys are derived from
//! neighbors (fractional indexing): inserting between two items never
//! requires renumbering any sibling.
//!
//! # Encoding
//!
//! A key denotes the base-26 fraction `sum(digit_i / 26^(i+1))` where `a` is
//! digit 0 and `z` is digit 25. Valid keys are non-empty and never end in `a`
//! (a trailing zero digit), which guarantees that byte-wise order and numeric
//! order coincide and that a key strictly between any two distinct keys
//! always exists - `between` grows the key length instead of failing when the
//! neighbors differ only in their last digit.
//!
//! # Usage
//!
//! ```rust
//! use flowdeck::shared::rank::RankKey;
//!
//! let first = RankKey::min();          // "b"
//! let second = first.next();           // "c"
//! let wedged = RankKey::between(&first, &second).unwrap();
//! assert!(first < wedged && wedged < second);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of digits in the key alphabet (`a..=z`).
const BASE: u8 = 26;

/// Canonical key assigned to the first item of an empty container.
const MIN_KEY: &str = "b";

/// Canonical ceiling key. Not a true maximum: `next` keeps producing larger
/// keys past it by growing the key length.
const MAX_KEY: &str = "z";

/// Errors raised while validating or deriving rank keys
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RankError {
    /// Key string was empty
    #[error("rank key must not be empty")]
    Empty,

    /// Key contained a byte outside `a..=z`
    #[error("rank key contains invalid byte {byte:#04x}")]
    InvalidByte {
        /// The offending byte
        byte: u8,
    },

    /// Key ended in the zero digit `a`
    #[error("rank key must not end in 'a'")]
    TrailingZero,

    /// `between` was called with misordered bounds
    #[error("rank key bounds are not ascending: {lower} >= {upper}")]
    NotAscending {
        /// Lower bound as given
        lower: String,
        /// Upper bound as given
        upper: String,
    },
}

/// Opaque, totally-ordered position key
///
/// Ordering is the derived lexicographic comparison of the inner string, so
/// keys can be compared (and sorted in SQL) without decoding.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RankKey(String);

impl RankKey {
    /// Validate and wrap a key string
    pub fn new(raw: impl Into<String>) -> Result<Self, RankError> {
        let raw = raw.into();
        let bytes = raw.as_bytes();
        if bytes.is_empty() {
            return Err(RankError::Empty);
        }
        if let Some(&byte) = bytes.iter().find(|b| !b.is_ascii_lowercase()) {
            return Err(RankError::InvalidByte { byte });
        }
        if bytes[bytes.len() - 1] == b'a' {
            return Err(RankError::TrailingZero);
        }
        Ok(Self(raw))
    }

    /// Canonical smallest key, used for the first item of an empty container
    ///
    /// Not an infimum: `prev` still produces keys below it.
    pub fn min() -> Self {
        Self(MIN_KEY.to_string())
    }

    /// Canonical largest key
    ///
    /// Not a supremum: `next` still produces keys above it.
    pub fn max() -> Self {
        Self(MAX_KEY.to_string())
    }

    /// The key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A key strictly greater than `self`
    ///
    /// Bumps the first non-`z` digit and truncates the rest, so repeated
    /// appends stay short (`"b"` -> `"c"`, `"zn"` -> `"zo"`); an all-`z` key
    /// grows by one digit (`"z"` -> `"zn"`).
    pub fn next(&self) -> Self {
        let bytes = self.0.as_bytes();
        match bytes.iter().position(|&c| c != b'z') {
            Some(i) => {
                let mut out: Vec<u8> = bytes[..=i].to_vec();
                out[i] += 1;
                Self(out.into_iter().map(char::from).collect())
            }
            None => {
                let mut out = self.0.clone();
                out.push('n');
                Self(out)
            }
        }
    }

    /// A key strictly less than `self`
    pub fn prev(&self) -> Self {
        let digits = to_digits(&self.0);
        if digits[0] >= 2 {
            let digit = digits[0] - 1;
            Self(char::from(b'a' + digit).to_string())
        } else {
            Self(from_digits(&midpoint(&[], Some(&digits))))
        }
    }

    /// A key strictly between `lower` and `upper`
    ///
    /// Total for any valid `lower < upper`: when the neighbors are adjacent
    /// at the current precision the result grows in length rather than
    /// failing. Misordered bounds are an invariant violation reported as
    /// [`RankError::NotAscending`].
    pub fn between(lower: &Self, upper: &Self) -> Result<Self, RankError> {
        if lower >= upper {
            return Err(RankError::NotAscending {
                lower: lower.0.clone(),
                upper: upper.0.clone(),
            });
        }
        let a = to_digits(&lower.0);
        let b = to_digits(&upper.0);
        Ok(Self(from_digits(&midpoint(&a, Some(&b)))))
    }
}

impl std::fmt::Display for RankKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for RankKey {
    type Err = RankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for RankKey {
    type Error = RankError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RankKey> for String {
    fn from(key: RankKey) -> Self {
        key.0
    }
}

/// Decode a key string into digit values (0..26)
fn to_digits(key: &str) -> Vec<u8> {
    key.bytes().map(|b| b - b'a').collect()
}

/// Encode digit values back into a key string
fn from_digits(digits: &[u8]) -> String {
    digits.iter().map(|&d| char::from(b'a' + d)).collect()
}

/// Midpoint of two fractions in digit form
///
/// `a` is the lower bound (the empty slice denotes zero); `b` is the upper
/// bound, or `None` for one. Preconditions (guaranteed by the validated-key
/// invariants upheld by callers): `frac(a) < frac(b)`.
///
/// The result never carries a trailing zero digit and is strictly between the
/// bounds. When the bounds are adjacent at the current precision the result
/// descends a digit and recurses, growing the key instead of failing.
fn midpoint(a: &[u8], b: Option<&[u8]>) -> Vec<u8> {
    if let Some(bd) = b {
        // Consume the shared prefix (a is zero-padded past its end).
        let mut n = 0usize;
        while n < bd.len() && a.get(n).copied().unwrap_or(0) == bd[n] {
            n += 1;
        }
        debug_assert!(n < bd.len(), "upper bound must exceed lower bound");
        if n > 0 {
            let mut out = bd[..n].to_vec();
            let a_tail = if n < a.len() { &a[n..] } else { &[][..] };
            out.extend(midpoint(a_tail, Some(&bd[n..])));
            return out;
        }
    }

    let da = a.first().copied().unwrap_or(0) as u16;
    let db = match b {
        Some(bd) => bd[0] as u16,
        None => BASE as u16,
    };

    if db - da > 1 {
        // Room at this precision: emit the rounded midpoint digit.
        return vec![((da + db + 1) / 2) as u8];
    }

    // Adjacent digits.
    match b {
        Some(bd) if bd.len() > 1 => bd[..1].to_vec(),
        _ => {
            let mut out = vec![da as u8];
            let a_tail = if a.is_empty() { &[][..] } else { &a[1..] };
            out.extend(midpoint(a_tail, None));
            out
        }
    }
}
