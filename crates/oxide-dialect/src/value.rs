//! Values passed between the host and a dialect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A value about to be bound to a statement parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BindValue {
    /// SQL NULL.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    Uint(u64),
    /// Floating point.
    Float(f64),
    /// Text.
    Text(String),
    /// Binary data.
    Bytes(Vec<u8>),
    /// Timestamp.
    Time(DateTime<Utc>),
}

impl From<bool> for BindValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for BindValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for BindValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u64> for BindValue {
    fn from(value: u64) -> Self {
        Self::Uint(value)
    }
}

impl From<f64> for BindValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for BindValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for BindValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for BindValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<DateTime<Utc>> for BindValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Time(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for BindValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// A loosely typed pagination argument.
///
/// Hosts pass whatever the caller supplied; only values that parse as a
/// non-negative integer produce a clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageBound {
    /// Integer argument.
    Int(i64),
    /// Textual argument, e.g. straight from a query string.
    Text(String),
}

impl PageBound {
    /// Returns the bound if it is a non-negative integer.
    ///
    /// Text accepts surrounding whitespace, an optional `+` sign and the
    /// `0x`/`0o`/`0b` radix prefixes. A bare leading zero means octal, so
    /// `"010"` is 8.
    #[must_use]
    pub fn parse(&self) -> Option<u64> {
        match self {
            Self::Int(n) => u64::try_from(*n).ok(),
            Self::Text(s) => parse_non_negative(s),
        }
    }
}

const RADIX_PREFIXES: [(&str, u32); 3] = [("0x", 16), ("0o", 8), ("0b", 2)];

fn parse_non_negative(text: &str) -> Option<u64> {
    let text = text.trim();
    let text = text.strip_prefix('+').unwrap_or(text);
    let (digits, radix) = RADIX_PREFIXES
        .iter()
        .find_map(|(prefix, radix)| {
            text.get(..2)
                .filter(|head| head.eq_ignore_ascii_case(prefix))
                .map(|_| (&text[2..], *radix))
        })
        .unwrap_or_else(|| match text.strip_prefix('0') {
            Some(rest) if !rest.is_empty() => (rest, 8),
            _ => (text, 10),
        });
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    u64::from_str_radix(digits, radix).ok()
}

impl From<i64> for PageBound {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for PageBound {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for PageBound {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<usize> for PageBound {
    fn from(value: usize) -> Self {
        i64::try_from(value).map_or_else(|_| Self::Text(value.to_string()), Self::Int)
    }
}

impl From<&str> for PageBound {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PageBound {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Where a dialect wants its identity-retrieval fragment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LastInsertId {
    /// Nothing to add; the driver reports generated keys itself.
    #[default]
    None,
    /// Goes between the column list and `VALUES`, e.g. `OUTPUT Inserted.[id]`.
    Interstitial(String),
    /// Goes after the statement, e.g. ` RETURNING "id"`.
    Suffix(String),
}

impl LastInsertId {
    /// Returns the interstitial fragment, or `""`.
    #[must_use]
    pub fn interstitial(&self) -> &str {
        match self {
            Self::Interstitial(sql) => sql,
            _ => "",
        }
    }

    /// Returns the trailing fragment, or `""`.
    #[must_use]
    pub fn suffix(&self) -> &str {
        match self {
            Self::Suffix(sql) => sql,
            _ => "",
        }
    }

    /// Returns whether there is no fragment at all.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}
