//! Typed parser for `--languages` values.
//!
//! Accepted forms: `en`, `en,de`, `[en, de]`, `['en', 'de']`, `["en","de"]`.

use crate::error::{BenchError, Result};
use std::fmt;
use std::str::FromStr;

/// Non-empty, de-duplicated list of two-letter lowercase language codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageList(Vec<String>);

impl LanguageList {
    /// Parse a language list, returning a single validation error for any malformed input.
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || BenchError::InvalidInput(format!("'{}' is not a valid language list", input));

        let trimmed = input.trim();
        let body = match (trimmed.strip_prefix('['), trimmed.ends_with(']')) {
            (Some(rest), true) => &rest[..rest.len() - 1],
            (None, false) => trimmed,
            _ => return Err(invalid()),
        };

        let mut codes: Vec<String> = Vec::new();
        for item in body.split(',') {
            let code = unquote(item.trim()).ok_or_else(invalid)?;
            if !is_language_code(code) {
                return Err(invalid());
            }
            if !codes.iter().any(|c| c == code) {
                codes.push(code.to_string());
            }
        }

        Ok(Self(codes))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for LanguageList {
    fn default() -> Self {
        Self(vec!["en".to_string()])
    }
}

impl FromStr for LanguageList {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for LanguageList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(","))
    }
}

/// Strip one pair of matching single or double quotes. Unbalanced quotes are rejected.
fn unquote(item: &str) -> Option<&str> {
    for quote in ['\'', '"'] {
        match (item.starts_with(quote), item.ends_with(quote)) {
            (true, true) if item.len() >= 2 => return Some(item[1..item.len() - 1].trim()),
            (false, false) => {}
            _ => return None,
        }
    }
    Some(item)
}

fn is_language_code(code: &str) -> bool {
    code.len() == 2 && code.bytes().all(|b| b.is_ascii_lowercase())
}
