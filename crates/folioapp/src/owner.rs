//! # Owners
//!
//! Every folder and item belongs to an owner namespace. This module answers two
//! questions for each request:
//!
//! 1. **Who is asking?** [`resolve_owner`] takes the caller-supplied owner id, or
//!    falls back to an anonymous fingerprint of the request metadata.
//! 2. **Which stored records are theirs?** Legacy documents stored the owner as a
//!    JSON number, newer ones as a string. [`OwnerFilter`] matches both forms.
//!
//! ## Fingerprint
//!
//! Anonymous callers get `anon:<fp>` where `fp` is a 32-bit rolling hash
//! (`h = h * 31 + c` over UTF-16 code units, wrapped to `i32`), taken as an
//! absolute value and printed in base 36. Identical metadata always yields the
//! identical owner id.
//!
//! ## Canonical Form
//!
//! New writes always store [`OwnerValue::Text`]. Numeric values only survive in
//! legacy data until the `doctor` pass rewrites them.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const ANON_PREFIX: &str = "anon:";

/// Inbound request metadata used to fingerprint anonymous callers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    pub user_agent: String,
    pub accept_language: String,
}

impl RequestMeta {
    pub fn new(user_agent: impl Into<String>, accept_language: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            accept_language: accept_language.into(),
        }
    }
}

/// Returns the explicit owner when it is non-blank, otherwise `anon:<fingerprint>`.
pub fn resolve_owner(explicit: Option<&str>, meta: &RequestMeta) -> String {
    if let Some(provided) = explicit.map(str::trim).filter(|s| !s.is_empty()) {
        return provided.to_string();
    }
    let source = format!("{}{}", meta.user_agent, meta.accept_language);
    format!("{}{}", ANON_PREFIX, fingerprint(&source))
}

pub fn fingerprint(input: &str) -> String {
    let mut hash: i32 = 0;
    for unit in input.encode_utf16() {
        hash = hash.wrapping_mul(31).wrapping_add(i32::from(unit));
    }
    to_base36(u64::from(hash.unsigned_abs()))
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// An owner id as found in storage: legacy records may hold a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OwnerValue {
    Number(f64),
    Text(String),
}

impl OwnerValue {
    pub fn is_canonical(&self) -> bool {
        matches!(self, OwnerValue::Text(_))
    }

    /// The canonical text form of this value.
    pub fn canonical(&self) -> OwnerValue {
        OwnerValue::Text(self.to_string())
    }
}

impl From<&str> for OwnerValue {
    fn from(value: &str) -> Self {
        OwnerValue::Text(value.to_string())
    }
}

impl fmt::Display for OwnerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerValue::Text(s) => write!(f, "{}", s),
            OwnerValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            OwnerValue::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Lookup predicate for "records owned by X".
///
/// Equivalent to `ownerId == "X" OR ownerId == X` where the numeric clause is
/// only present when `X` parses as a finite number.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnerFilter {
    text: String,
    number: Option<f64>,
}

impl OwnerFilter {
    pub fn new(owner: &str) -> Self {
        let text = owner.trim().to_string();
        let number = text.parse::<f64>().ok().filter(|n| n.is_finite());
        Self { text, number }
    }

    pub fn owner(&self) -> &str {
        &self.text
    }

    /// The value stored on new writes.
    pub fn canonical(&self) -> OwnerValue {
        OwnerValue::Text(self.text.clone())
    }

    /// The disjunction clauses, string form first.
    pub fn clauses(&self) -> Vec<OwnerValue> {
        let mut clauses = vec![OwnerValue::Text(self.text.clone())];
        if let Some(n) = self.number {
            clauses.push(OwnerValue::Number(n));
        }
        clauses
    }

    pub fn matches(&self, stored: &OwnerValue) -> bool {
        match stored {
            OwnerValue::Text(s) => *s == self.text,
            OwnerValue::Number(n) => self.number == Some(*n),
        }
    }
}
