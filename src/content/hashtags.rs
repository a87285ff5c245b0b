//! Hashtag normalization.
//!
//! Raw hashtag input (free text or a list of tokens) is split on commas and
//! whitespace, trimmed, stripped of leading `#`, and de-duplicated in
//! first-seen order. Duplicates are detected case-insensitively over full
//! Unicode lowercase mapping; the first spelling wins. Normalizing already-normalized input is a no-op.

use serde::{Deserialize, Serialize};
use std::fmt;

fn is_separator(c: char) -> bool {
    c == ',' || c.is_whitespace()
}

fn same_tag(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Normalize a single token. Returns `None` for tokens that are empty once
/// the `#` prefix is removed.
fn normalize_token(token: &str) -> Option<&str> {
    let tag = token.trim().trim_start_matches('#').trim();
    if tag.is_empty() { None } else { Some(tag) }
}

/// Ordered, de-duplicated set of hashtags stored without the `#` prefix.
///
/// The only way to build one is through normalization, so a stored draft can
/// never hold raw hashtag input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct HashtagSet(Vec<String>);

impl HashtagSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Normalize free-text input such as `"#summer, sale  #deals"`.
    pub fn parse(raw: &str) -> Self {
        Self::from_tokens(std::iter::once(raw))
    }

    /// Normalize a list of tokens. Each token may itself contain separators.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for token in tokens {
            for piece in token.as_ref().split(is_separator) {
                set.insert(piece);
            }
        }
        set
    }

    /// Insert one token. Returns `false` when the token normalizes to nothing
    /// or is already present.
    pub fn insert(&mut self, token: &str) -> bool {
        let Some(tag) = normalize_token(token) else {
            return false;
        };
        if self.contains(tag) {
            return false;
        }
        self.0.push(tag.to_string());
        true
    }

    /// Insert a suggested tag only while the set is below `limit`.
    /// A `limit` of zero means the platform sets no cap.
    pub fn insert_capped(&mut self, token: &str, limit: usize) -> bool {
        if limit > 0 && self.0.len() >= limit {
            return false;
        }
        self.insert(token)
    }

    pub fn remove(&mut self, token: &str) -> bool {
        let Some(tag) = normalize_token(token) else {
            return false;
        };
        let before = self.0.len();
        self.0.retain(|existing| !same_tag(existing, tag));
        self.0.len() != before
    }

    pub fn contains(&self, token: &str) -> bool {
        normalize_token(token)
            .is_some_and(|tag| self.0.iter().any(|existing| same_tag(existing, tag)))
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

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for HashtagSet {
    fn from(tokens: Vec<String>) -> Self {
        Self::from_tokens(tokens)
    }
}

impl From<HashtagSet> for Vec<String> {
    fn from(set: HashtagSet) -> Self {
        set.0
    }
}

impl fmt::Display for HashtagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tag) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "#{tag}")?;
        }
        Ok(())
    }
}
