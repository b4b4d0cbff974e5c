//! Resolution strategies for single-item lookups.
//!
//! An item identifier may be a primary key, a stored slug, or free text that
//! only resembles a product name. [`RESOLUTION_ORDER`] lists the strategies
//! tried in turn; each turns an [`ItemKey`] into at most one store
//! [`Lookup`]. The first lookup that finds a document wins.
//!
//! A syntactically valid primary key is only ever looked up by key: the
//! slug and name strategies yield nothing for it.

use uuid::Uuid;

/// Characters escaped inside a name-match token.
const PATTERN_SPECIALS: &[char] = &[
    '.', '*', '+', '?', '^', '$', '{', '}', '(', ')', '|', '[', ']', '\\',
];

/// A parsed item identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKey {
    PrimaryKey(Uuid),
    Text {
        /// The identifier exactly as received.
        raw: String,
        /// Lowercased, hyphen-split and pattern-escaped fragments.
        tokens: Vec<String>,
    },
}

impl ItemKey {
    #[must_use]
    pub fn parse(identifier: &str) -> Self {
        match parse_primary_key(identifier) {
            Some(id) => ItemKey::PrimaryKey(id),
            None => ItemKey::Text {
                raw: identifier.to_string(),
                tokens: tokenize(identifier),
            },
        }
    }
}

/// A single store query produced by a strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    PrimaryKey(Uuid),
    /// Exact match on the stored `slug` field.
    Slug(String),
    /// Case-insensitive regular expression matched against `name`.
    NamePattern(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    PrimaryKey,
    ExactSlug,
    AnchoredName,
    LooseName,
}

pub const RESOLUTION_ORDER: [Strategy; 4] = [
    Strategy::PrimaryKey,
    Strategy::ExactSlug,
    Strategy::AnchoredName,
    Strategy::LooseName,
];

impl Strategy {
    /// The store query this strategy issues for `key`, if it applies.
    #[must_use]
    pub fn lookup(self, key: &ItemKey) -> Option<Lookup> {
        match (self, key) {
            (Strategy::PrimaryKey, ItemKey::PrimaryKey(id)) => Some(Lookup::PrimaryKey(*id)),
            (Strategy::ExactSlug, ItemKey::Text { raw, .. }) => Some(Lookup::Slug(raw.clone())),
            (Strategy::AnchoredName, ItemKey::Text { tokens, .. }) => {
                anchored_pattern(tokens).map(Lookup::NamePattern)
            }
            (Strategy::LooseName, ItemKey::Text { tokens, .. }) => {
                loose_pattern(tokens).map(Lookup::NamePattern)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::PrimaryKey => "primary_key",
            Strategy::ExactSlug => "exact_slug",
            Strategy::AnchoredName => "anchored_name",
            Strategy::LooseName => "loose_name",
        }
    }
}

/// Parse `identifier` as a primary key.
#[must_use]
pub fn parse_primary_key(identifier: &str) -> Option<Uuid> {
    Uuid::parse_str(identifier).ok()
}

/// Split an identifier into escaped name-match tokens.
///
/// The identifier is lowercased and trimmed, then split on runs of hyphens;
/// empty fragments are dropped.
#[must_use]
pub fn tokenize(identifier: &str) -> Vec<String> {
    identifier
        .to_lowercase()
        .trim()
        .split('-')
        .filter(|t| !t.is_empty())
        .map(escape_token)
        .collect()
}

/// Backslash-escape regular expression metacharacters in `token`.
#[must_use]
pub fn escape_token(token: &str) -> String {
    let mut escaped = String::with_capacity(token.len());
    for c in token.chars() {
        if PATTERN_SPECIALS.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Whole-name pattern: tokens in order, separated by non-alphanumerics,
/// anchored at both ends with optional surrounding whitespace.
#[must_use]
pub fn anchored_pattern(tokens: &[String]) -> Option<String> {
    if tokens.is_empty() {
        return None;
    }
    Some(format!(r"^\s*{}\s*$", tokens.join("[^a-z0-9]+")))
}

/// Unanchored pattern: tokens in order with anything in between.
#[must_use]
pub fn loose_pattern(tokens: &[String]) -> Option<String> {
    if tokens.is_empty() {
        return None;
    }
    Some(tokens.join(".*"))
}

#[cfg(test)]
#[path = "lookup_test.rs"]
mod tests;
