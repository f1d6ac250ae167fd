//! Glossary term model: normalization and case-insensitive deduplication.
//!
//! Format adapters hand over loosely-typed [`RawTerm`] candidates. They are
//! turned into [`GlossaryTerm`] values by [`normalize`], and collapsed into a
//! [`TermSet`] keyed by the case-folded phrase by [`dedupe`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A phrase/definition candidate as read from an input file.
///
/// Either side may be missing; the normalizer decides what is acceptable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTerm {
    pub phrase: Option<String>,
    pub definition: Option<String>,
}

impl RawTerm {
    pub fn new(phrase: Option<String>, definition: Option<String>) -> Self {
        Self { phrase, definition }
    }

    /// Shorthand for a candidate where both fields are present.
    pub fn pair(phrase: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            phrase: Some(phrase.into()),
            definition: Some(definition.into()),
        }
    }
}

/// A validated glossary term.
///
/// The phrase is trimmed and non-empty; its case is preserved for output,
/// while identity for merging is the case-folded phrase (see [`GlossaryTerm::key`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryTerm {
    phrase: String,
    definition: String,
}

impl GlossaryTerm {
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn definition(&self) -> &str {
        &self.definition
    }

    /// Case-folded phrase used as the uniqueness key.
    pub fn key(&self) -> String {
        fold_key(&self.phrase)
    }
}

impl fmt::Display for GlossaryTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const PREVIEW: usize = 50;
        if self.definition.chars().count() > PREVIEW {
            let head: String = self.definition.chars().take(PREVIEW).collect();
            write!(f, "{}: {}...", self.phrase, head)
        } else {
            write!(f, "{}: {}", self.phrase, self.definition)
        }
    }
}

/// Case-fold a phrase into its merge key.
pub fn fold_key(phrase: &str) -> String {
    phrase.to_lowercase()
}

/// Reason a candidate was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rejection {
    /// Phrase missing, null, or whitespace only.
    EmptyPhrase,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::EmptyPhrase => write!(f, "phrase is empty"),
        }
    }
}

/// Normalize one candidate into a [`GlossaryTerm`].
///
/// Both fields are trimmed. A missing definition becomes the empty string.
/// No other content rules apply: any Unicode text is kept as-is.
pub fn normalize(
    raw_phrase: Option<&str>,
    raw_definition: Option<&str>,
) -> Result<GlossaryTerm, Rejection> {
    let phrase = raw_phrase.map(str::trim).unwrap_or_default();
    if phrase.is_empty() {
        return Err(Rejection::EmptyPhrase);
    }

    let definition = raw_definition.map(str::trim).unwrap_or_default();

    Ok(GlossaryTerm {
        phrase: phrase.to_string(),
        definition: definition.to_string(),
    })
}

/// Outcome of normalizing a batch of candidates.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    /// Accepted terms, in input order.
    pub terms: Vec<GlossaryTerm>,
    /// Number of candidates rejected (counted, never fatal).
    pub rejected: usize,
}

/// Normalize a batch, keeping accepted terms in order and counting rejections.
pub fn normalize_all(raw: impl IntoIterator<Item = RawTerm>) -> Normalized {
    let mut out = Normalized::default();
    for candidate in raw {
        match normalize(candidate.phrase.as_deref(), candidate.definition.as_deref()) {
            Ok(term) => out.terms.push(term),
            Err(reason) => {
                tracing::debug!(%reason, "Rejected glossary entry");
                out.rejected += 1;
            }
        }
    }
    out
}

/// Ordered mapping from case-folded phrase to [`GlossaryTerm`].
///
/// No two entries share a key. Replacing an entry keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermSet {
    terms: Vec<GlossaryTerm>,
    index: HashMap<String, usize>,
}

impl TermSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Whether an entry exists for this phrase (any casing).
    pub fn contains(&self, phrase: &str) -> bool {
        self.index.contains_key(&fold_key(phrase))
    }

    /// Look up an entry by phrase (any casing).
    pub fn get(&self, phrase: &str) -> Option<&GlossaryTerm> {
        self.index.get(&fold_key(phrase)).map(|&i| &self.terms[i])
    }

    /// Insert or replace the entry for the term's key.
    ///
    /// Returns the replaced term, if any.
    pub fn upsert(&mut self, term: GlossaryTerm) -> Option<GlossaryTerm> {
        let key = term.key();
        match self.index.get(&key) {
            Some(&i) => Some(std::mem::replace(&mut self.terms[i], term)),
            None => {
                self.index.insert(key, self.terms.len());
                self.terms.push(term);
                None
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &GlossaryTerm> {
        self.terms.iter()
    }

    /// Case-folded keys in entry order.
    pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
        self.terms.iter().map(GlossaryTerm::key)
    }

    pub fn into_terms(self) -> Vec<GlossaryTerm> {
        self.terms
    }
}

impl FromIterator<GlossaryTerm> for TermSet {
    /// Collect with last-occurrence-wins semantics.
    fn from_iter<I: IntoIterator<Item = GlossaryTerm>>(iter: I) -> Self {
        let mut set = TermSet::new();
        for term in iter {
            set.upsert(term);
        }
        set
    }
}

impl<'a> IntoIterator for &'a TermSet {
    type Item = &'a GlossaryTerm;
    type IntoIter = std::slice::Iter<'a, GlossaryTerm>;

    fn into_iter(self) -> Self::IntoIter {
        self.terms.iter()
    }
}

/// Result of a deduplication pass.
#[derive(Debug, Clone, Default)]
pub struct Deduplicated {
    pub terms: TermSet,
    /// Number of entries that overwrote an earlier entry with the same key.
    pub duplicates_found: usize,
}

/// Collapse terms by case-folded phrase; the last occurrence wins.
pub fn dedupe(terms: impl IntoIterator<Item = GlossaryTerm>) -> Deduplicated {
    let mut out = Deduplicated::default();
    for term in terms {
        let phrase = term.phrase.clone();
        if out.terms.upsert(term).is_some() {
            tracing::debug!(phrase = %phrase, "Duplicate phrase replaced earlier entry");
            out.duplicates_found += 1;
        }
    }
    out
}

#[cfg(test)]
pub(crate) fn term(phrase: &str, definition: &str) -> GlossaryTerm {
    GlossaryTerm {
        phrase: phrase.to_string(),
        definition: definition.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_both_fields() {
        let t = normalize(Some("  API \t"), Some("\n Application Programming Interface  ")).unwrap();
        assert_eq!(t.phrase(), "API");
        assert_eq!(t.definition(), "Application Programming Interface");
    }

    #[test]
    fn normalize_rejects_missing_or_blank_phrase() {
        assert_eq!(normalize(None, Some("x")), Err(Rejection::EmptyPhrase));
        assert_eq!(normalize(Some(""), Some("x")), Err(Rejection::EmptyPhrase));
        assert_eq!(normalize(Some("   "), None), Err(Rejection::EmptyPhrase));
    }

    #[test]
    fn normalize_defaults_missing_definition() {
        let t = normalize(Some("REST"), None).unwrap();
        assert_eq!(t.definition(), "");
    }

    #[test]
    fn normalize_keeps_unicode_and_punctuation() {
        let t = normalize(Some("Größe <b>"), Some("Maß; \"quoted\"")).unwrap();
        assert_eq!(t.phrase(), "Größe <b>");
        assert_eq!(t.definition(), "Maß; \"quoted\"");
    }

    #[test]
    fn normalize_all_counts_rejections() {
        let out = normalize_all(vec![
            RawTerm::pair("API", "Interface"),
            RawTerm::new(None, Some("orphan".into())),
            RawTerm::pair(" ", "blank"),
            RawTerm::new(Some("JSON".into()), None),
        ]);
        assert_eq!(out.terms.len(), 2);
        assert_eq!(out.rejected, 2);
    }

    #[test]
    fn dedupe_last_occurrence_wins_case_insensitively() {
        let out = dedupe(vec![
            term("api", "Application Programming Interface"),
            term("REST", "Representational State Transfer"),
            term("API", "Application Programming Interface (v2)"),
        ]);
        assert_eq!(out.terms.len(), 2);
        assert_eq!(out.duplicates_found, 1);
        let api = out.terms.get("Api").unwrap();
        assert_eq!(api.definition(), "Application Programming Interface (v2)");
        assert_eq!(api.phrase(), "API");
    }

    #[test]
    fn dedupe_keys_are_unique() {
        let input = vec![
            term("a", "1"),
            term("A", "2"),
            term("b", "3"),
            term("a", "4"),
            term("B", "5"),
        ];
        let out = dedupe(input);
        let mut keys: Vec<String> = out.terms.keys().collect();
        let total = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), total);
        assert_eq!(out.terms.get("a").unwrap().definition(), "4");
        assert_eq!(out.terms.get("b").unwrap().definition(), "5");
        assert_eq!(out.duplicates_found, 3);
    }

    #[test]
    fn upsert_replaces_in_place() {
        let mut set: TermSet = vec![term("one", "1"), term("two", "2")].into_iter().collect();
        let replaced = set.upsert(term("ONE", "uno"));
        assert_eq!(replaced.unwrap().definition(), "1");
        let phrases: Vec<&str> = set.iter().map(GlossaryTerm::phrase).collect();
        assert_eq!(phrases, vec!["ONE", "two"]);
    }

    #[test]
    fn display_truncates_long_definitions() {
        let long = "x".repeat(80);
        let rendered = term("Long", &long).to_string();
        assert!(rendered.ends_with("..."));
        assert!(rendered.len() < 80);
    }
}
