//! Product identifier extraction.
//!
//! Scanned codes arrive in many shapes: a bare identifier, a URL pointing at
//! the lookup API, or arbitrary text with an identifier somewhere inside.
//! [`extract_identifier`] reduces all of them to a canonical [`ProductId`].

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ExtractError;

/// Path marker preceding the identifier in lookup URLs.
pub const API_SEGMENT_MARKER: &str = "/api/";

/// Number of characters shown by [`ProductId::preview`].
const PREVIEW_LEN: usize = 8;

static CANONICAL_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("Invalid canonical identifier regex")
});

static EMBEDDED_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}")
        .expect("Invalid embedded identifier regex")
});

/// Canonical product identifier (8-4-4-4-12 hexadecimal groups).
///
/// Always rendered lowercase and hyphenated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(Uuid);

impl ProductId {
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Truncated form for display while a scan is in progress.
    pub fn preview(&self) -> String {
        let mut s = self.to_string();
        s.truncate(PREVIEW_LEN);
        s.push_str("...");
        s
    }

    /// Parse text that must be exactly one canonical identifier.
    fn from_canonical(text: &str) -> Option<Self> {
        if !CANONICAL_ID.is_match(text) {
            return None;
        }
        Uuid::parse_str(text).ok().map(Self)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.as_hyphenated().fmt(f)
    }
}

impl FromStr for ProductId {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        extract_identifier(s)
    }
}

impl From<Uuid> for ProductId {
    fn from(uuid: Uuid) -> Self {
        Self::from_uuid(uuid)
    }
}

/// Extract a canonical identifier from arbitrary scanned or typed text.
///
/// Precedence: whole-input match, then the first embedded match, then the
/// path segment following [`API_SEGMENT_MARKER`].
pub fn extract_identifier(text: &str) -> Result<ProductId, ExtractError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ExtractError::Empty);
    }

    if let Some(id) = ProductId::from_canonical(text) {
        return Ok(id);
    }

    if let Some(id) = EMBEDDED_ID
        .find(text)
        .and_then(|m| ProductId::from_canonical(m.as_str()))
    {
        return Ok(id);
    }

    // `.../api/{id}/...`
    if let Some((_, rest)) = text.split_once(API_SEGMENT_MARKER) {
        let segment = rest.split('/').next().unwrap_or_default();
        if let Some(id) = ProductId::from_canonical(segment) {
            return Ok(id);
        }
    }

    Err(ExtractError::NoIdentifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "4a43bbb0-68b1-413a-bcf8-b50fd0174d05";

    #[test]
    fn test_exact_identifier_is_returned() {
        let id = extract_identifier(SAMPLE).unwrap();
        assert_eq!(id.to_string(), SAMPLE);
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let id = extract_identifier(&format!("  {SAMPLE}\n")).unwrap();
        assert_eq!(id.to_string(), SAMPLE);
    }

    #[test]
    fn test_uppercase_is_canonicalized() {
        let id = extract_identifier(&SAMPLE.to_uppercase()).unwrap();
        assert_eq!(id.to_string(), SAMPLE);
    }

    #[test]
    fn test_embedded_identifier() {
        let text = format!("batch 42 / code {SAMPLE} / end");
        assert_eq!(extract_identifier(&text).unwrap().to_string(), SAMPLE);
    }

    #[test]
    fn test_first_embedded_identifier_wins() {
        let text = format!("{SAMPLE} 12345678-1234-1234-1234-123456789012");
        assert_eq!(extract_identifier(&text).unwrap().to_string(), SAMPLE);
    }

    #[test]
    fn test_lookup_url() {
        let text = format!("http://127.0.0.1:8000/api/{SAMPLE}/");
        assert_eq!(extract_identifier(&text).unwrap().to_string(), SAMPLE);
    }

    #[test]
    fn test_not_an_identifier() {
        assert_eq!(
            extract_identifier("not a uuid"),
            Err(ExtractError::NoIdentifier)
        );
        assert_eq!(
            extract_identifier("http://host/api/123/"),
            Err(ExtractError::NoIdentifier)
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(extract_identifier(""), Err(ExtractError::Empty));
        assert_eq!(extract_identifier("   "), Err(ExtractError::Empty));
    }

    #[test]
    fn test_wrong_group_lengths_rejected() {
        // First group is one character short.
        assert!(extract_identifier("e0d892c-e530-4077-b79e-61b99c837984").is_err());
    }

    #[test]
    fn test_idempotent() {
        for input in [
            SAMPLE.to_string(),
            SAMPLE.to_uppercase(),
            format!("prefix-{SAMPLE}-suffix"),
            format!("https://x/api/{SAMPLE}/?format=json"),
        ] {
            let once = extract_identifier(&input).unwrap();
            let twice = extract_identifier(&once.to_string()).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_preview() {
        let id = extract_identifier(SAMPLE).unwrap();
        assert_eq!(id.preview(), "4a43bbb0...");
    }

    #[test]
    fn test_from_str() {
        let id: ProductId = SAMPLE.parse().unwrap();
        assert_eq!(id.to_string(), SAMPLE);
    }
}
