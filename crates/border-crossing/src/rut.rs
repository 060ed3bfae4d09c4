//! Chilean RUT (Rol Único Tributario) check-digit validation and formatting.
//!
//! A RUT is a 7–8 digit body followed by a mod-11 check character in
//! `[0-9K]`. The lenient helpers [`validate_rut`] and [`format_rut`] accept
//! user-typed input with dots, dashes, and spaces; [`Rut`] is the strict parse
//! used when a RUT enters the crossing workflow.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

const MIN_BODY_DIGITS: usize = 7;
const MAX_BODY_DIGITS: usize = 8;

/// Compute the mod-11 check character for a RUT body.
///
/// Digits are weighted 2,3,4,5,6,7 cyclically starting from the least
/// significant one. A remainder that maps to 11 yields `'0'` and 10 yields `'K'`.
pub fn check_digit(body: u32) -> char {
    let mut remaining = body;
    let mut weight = 2;
    let mut sum = 0;

    loop {
        sum += (remaining % 10) * weight;
        remaining /= 10;
        weight = if weight == 7 { 2 } else { weight + 1 };
        if remaining == 0 {
            break;
        }
    }

    match 11 - (sum % 11) {
        11 => '0',
        10 => 'K',
        digit => char::from_digit(digit, 10).unwrap_or('0'),
    }
}

/// Returns `true` when `input` is a well-formed RUT with a matching check digit.
///
/// Separators (`.`, `-`, space) are ignored and a lowercase `k` is accepted.
/// Malformed input yields `false`.
pub fn validate_rut(input: &str) -> bool {
    split_clean(input)
        .map(|(body, check)| check_digit(body) == check)
        .unwrap_or(false)
}

/// Re-render a RUT as `NN.NNN.NNN-D`.
///
/// Everything but digits and `k`/`K` is discarded first. Input that leaves at
/// most one character is returned unchanged. The check digit is not verified.
pub fn format_rut(input: &str) -> String {
    let kept: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == 'k' || *c == 'K')
        .collect();

    if kept.chars().count() <= 1 {
        return input.to_string();
    }

    let split_at = kept.len() - 1;
    let (body, check) = kept.split_at(split_at);
    format!("{}-{}", group_thousands(body), check.to_ascii_uppercase())
}

fn group_thousands(body: &str) -> String {
    let chars: Vec<char> = body.chars().collect();
    let mut grouped = String::with_capacity(chars.len() + chars.len() / 3);
    for (index, c) in chars.iter().enumerate() {
        let remaining = chars.len() - index;
        if index > 0 && remaining % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*c);
    }
    grouped
}

/// Strip separators and split into numeric body and uppercase check character.
fn split_clean(input: &str) -> Option<(u32, char)> {
    let cleaned: String = input
        .chars()
        .filter(|c| !matches!(c, '.' | '-' | ' '))
        .map(|c| c.to_ascii_uppercase())
        .collect();

    let check = cleaned.chars().last()?;
    let body = &cleaned[..cleaned.len() - check.len_utf8()];

    let body_len_ok = (MIN_BODY_DIGITS..=MAX_BODY_DIGITS).contains(&body.len());
    if !body_len_ok || !body.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !(check.is_ascii_digit() || check == 'K') {
        return None;
    }

    body.parse::<u32>().ok().map(|body| (body, check))
}

/// Reasons a strict [`Rut`] parse fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RutError {
    #[error("RUT '{0}' is not 7-8 digits followed by a check character")]
    Malformed(String),
    #[error("RUT check digit mismatch (expected {expected}, found {found})")]
    CheckDigitMismatch { expected: char, found: char },
}

/// A validated RUT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rut {
    body: u32,
    check: char,
}

impl Rut {
    /// Build a RUT from its body, deriving the check digit.
    pub fn from_body(body: u32) -> Self {
        Self {
            body,
            check: check_digit(body),
        }
    }

    pub fn body(&self) -> u32 {
        self.body
    }

    pub fn check(&self) -> char {
        self.check
    }

    /// `NNNNNNNN-D` without thousands separators.
    pub fn canonical(&self) -> String {
        format!("{}-{}", self.body, self.check)
    }
}

impl FromStr for Rut {
    type Err = RutError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (body, found) =
            split_clean(raw).ok_or_else(|| RutError::Malformed(raw.trim().to_string()))?;
        let expected = check_digit(body);
        if expected != found {
            return Err(RutError::CheckDigitMismatch { expected, found });
        }
        Ok(Self {
            body,
            check: expected,
        })
    }
}

impl fmt::Display for Rut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            group_thousands(&self.body.to_string()),
            self.check
        )
    }
}

impl Serialize for Rut {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rut {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
