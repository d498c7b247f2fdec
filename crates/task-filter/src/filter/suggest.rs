//! Completion suggestions for a partially typed filter.
//!
//! Suggestions replace the fragment under the cursor: completing `due:e`
//! yields `due:eod`, `due:eow`, ... rather than the bare abbreviation, so the
//! host can splice a suggestion in without re-parsing the fragment.

use super::catalog::{self, ATTRIBUTES, DATE_ABBREVIATIONS, MODIFIERS, OPERATORS, VIRTUAL_TAGS};
use super::classifier::classify_token;
use super::lexer::{tokenize, RawToken};
use crate::config::FilterConfig;

/// Proposes completions for the token under the cursor.
#[derive(Debug, Clone, Copy)]
pub struct SuggestionEngine {
    limit: usize,
}

impl Default for SuggestionEngine {
    fn default() -> Self {
        Self::new(FilterConfig::default().suggestion_limit)
    }
}

impl SuggestionEngine {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(config.suggestion_limit)
    }

    /// Suggestions for `partial` with the cursor at character offset `cursor`.
    ///
    /// Text after the cursor is ignored. Never fails: input that cannot be
    /// tokenized (an open quote, say) produces no suggestions.
    pub fn suggest(&self, partial: &str, cursor: usize) -> Vec<String> {
        let clipped: String = partial.chars().take(cursor).collect();
        let cursor = clipped.chars().count();

        let tokens = match tokenize(&clipped) {
            Ok(tokens) => tokens,
            Err(err) => {
                tracing::trace!(error = %err, "no suggestions for untokenizable input");
                return Vec::new();
            }
        };

        let candidates = match split_fragment(&tokens, cursor) {
            (Some(fragment), _) if fragment.quoted => Vec::new(),
            (Some(fragment), _) => fragment_candidates(&fragment.text),
            (None, previous) => boundary_candidates(previous),
        };

        let mut suggestions: Vec<String> = Vec::with_capacity(self.limit);
        for candidate in candidates {
            if suggestions.len() == self.limit {
                break;
            }
            if !suggestions.contains(&candidate) {
                suggestions.push(candidate);
            }
        }
        suggestions
    }
}

/// Suggests completions using the default limit.
pub fn suggest(partial: &str, cursor: usize) -> Vec<String> {
    SuggestionEngine::default().suggest(partial, cursor)
}

/// Splits off the token being typed, if the cursor touches one, and returns
/// it together with the token before it.
fn split_fragment(tokens: &[RawToken], cursor: usize) -> (Option<&RawToken>, Option<&RawToken>) {
    match tokens.split_last() {
        Some((last, rest)) if last.end == cursor && !is_paren(last) => (Some(last), rest.last()),
        Some((last, _)) => (None, Some(last)),
        None => (None, None),
    }
}

fn is_paren(token: &RawToken) -> bool {
    !token.quoted && (token.text == "(" || token.text == ")")
}

/// Candidates when the cursor sits between tokens.
fn boundary_candidates(previous: Option<&RawToken>) -> Vec<String> {
    let after_term = previous.is_some_and(|token| classify_token(token).kind.ends_term());

    let operators = OPERATORS.iter().map(|op| op.to_string());
    let attributes = ATTRIBUTES.iter().map(|attr| attr.to_string());

    if after_term {
        operators.chain(attributes).collect()
    } else {
        attributes
            .chain(std::iter::once("not".to_string()))
            .collect()
    }
}

/// Candidates that complete a partially typed token.
fn fragment_candidates(fragment: &str) -> Vec<String> {
    if let Some(rest) = fragment.strip_prefix('+') {
        return virtual_tag_candidates('+', rest);
    }
    if let Some(rest) = fragment.strip_prefix('-') {
        return virtual_tag_candidates('-', rest);
    }
    if fragment.contains('~') {
        return Vec::new();
    }
    if let Some((head, value)) = fragment.split_once(':') {
        return value_candidates(head, value);
    }
    if let Some((attribute, modifier)) = fragment.split_once('.') {
        return modifier_candidates(attribute, modifier);
    }
    word_candidates(fragment)
}

fn starts_with_ignore_case(candidate: &str, prefix: &str) -> bool {
    candidate
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn virtual_tag_candidates(sign: char, prefix: &str) -> Vec<String> {
    VIRTUAL_TAGS
        .iter()
        .filter(|name| starts_with_ignore_case(name, prefix))
        .map(|name| format!("{sign}{name}"))
        .collect()
}

/// `attr:` or `attr.mod:` followed by a partial value.
fn value_candidates(head: &str, value: &str) -> Vec<String> {
    let attribute = head.split_once('.').map_or(head, |(attr, _)| attr);
    if !catalog::is_date_attribute(&attribute.to_lowercase()) {
        return Vec::new();
    }
    DATE_ABBREVIATIONS
        .iter()
        .filter(|abbr| starts_with_ignore_case(abbr, value))
        .map(|abbr| format!("{head}:{abbr}"))
        .collect()
}

/// `attr.` followed by a partial modifier.
fn modifier_candidates(attribute: &str, modifier: &str) -> Vec<String> {
    if !catalog::is_attribute_name(attribute) {
        return Vec::new();
    }
    MODIFIERS
        .iter()
        .filter(|name| starts_with_ignore_case(name, modifier))
        .map(|name| format!("{attribute}.{name}:"))
        .collect()
}

/// A bare word: attributes, operators, virtual tags and date abbreviations.
fn word_candidates(prefix: &str) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::new();

    for attr in ATTRIBUTES.iter().filter(|a| starts_with_ignore_case(a, prefix)) {
        candidates.push(attr.to_string());
    }
    for op in OPERATORS.iter().filter(|o| starts_with_ignore_case(o, prefix)) {
        candidates.push(op.to_string());
    }
    for name in VIRTUAL_TAGS.iter().filter(|n| starts_with_ignore_case(n, prefix)) {
        candidates.push(format!("+{name}"));
    }
    for abbr in DATE_ABBREVIATIONS
        .iter()
        .filter(|a| starts_with_ignore_case(a, prefix))
    {
        candidates.push(abbr.to_string());
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_end(partial: &str) -> Vec<String> {
        suggest(partial, partial.chars().count())
    }

    #[test]
    fn test_attribute_prefix() {
        assert_eq!(at_end("pr"), vec!["project", "priority"]);
    }

    #[test]
    fn test_word_mixes_categories_in_catalog_order() {
        // "s" hits attributes, then the sod/sow/... date abbreviations.
        let found = at_end("s");
        assert_eq!(found[0], "status");
        assert_eq!(found[1], "scheduled");
        assert!(found.contains(&"sod".to_string()));
        let status = found.iter().position(|s| s == "status").unwrap();
        let sod = found.iter().position(|s| s == "sod").unwrap();
        assert!(status < sod);
    }

    #[test]
    fn test_operator_prefix() {
        assert_eq!(at_end("+home o"), vec!["or", "+OVERDUE"]);
    }

    #[test]
    fn test_virtual_tags_after_plus() {
        assert_eq!(at_end("+OV"), vec!["+OVERDUE"]);
        assert_eq!(at_end("project:x +ble"), vec!["+BLOCKED"]);
        assert_eq!(at_end("-we"), vec!["-WEEK"]);
    }

    #[test]
    fn test_bare_plus_caps_at_limit() {
        let found = at_end("+");
        assert_eq!(found.len(), 10);
        assert_eq!(found[0], "+OVERDUE");
    }

    #[test]
    fn test_date_values() {
        assert_eq!(
            at_end("due:eo"),
            vec!["due:eod", "due:eow", "due:eoww", "due:eom", "due:eoq", "due:eoy"]
        );
        assert_eq!(at_end("due.before:tom"), vec!["due.before:tomorrow"]);
    }

    #[test]
    fn test_non_date_values_have_no_suggestions() {
        assert!(at_end("project:wo").is_empty());
    }

    #[test]
    fn test_modifiers() {
        assert_eq!(at_end("due.be"), vec!["due.before:", "due.below:"]);
        assert_eq!(at_end("description.st"), vec!["description.startswith:"]);
    }

    #[test]
    fn test_boundary_after_term_offers_operators_first() {
        let found = at_end("+home ");
        assert_eq!(&found[..3], &["and", "or", "not"]);
        assert_eq!(found[3], "description");
    }

    #[test]
    fn test_boundary_at_start_offers_attributes() {
        let found = at_end("");
        assert_eq!(found[0], "description");
        assert_eq!(found.len(), 10);

        let found = at_end("+home and ");
        assert_eq!(found[0], "description");
    }

    #[test]
    fn test_open_paren_is_a_boundary() {
        assert_eq!(at_end("(")[0], "description");
    }

    #[test]
    fn test_cursor_clips_input() {
        // Cursor after "pr"; the rest of the line is ignored.
        assert_eq!(suggest("pr and +home", 2), vec!["project", "priority"]);
        // Cursor past the end is clamped.
        assert_eq!(suggest("pr", 50), vec!["project", "priority"]);
    }

    #[test]
    fn test_errors_give_empty_list() {
        assert!(at_end("description:\"unterminated").is_empty());
        assert!(at_end("description~/abc").is_empty());
    }

    #[test]
    fn test_quoted_fragment_has_no_suggestions() {
        assert!(at_end("\"pro\"").is_empty());
    }

    #[test]
    fn test_custom_limit() {
        let engine = SuggestionEngine::new(2);
        assert_eq!(engine.suggest("+", 1), vec!["+OVERDUE", "+TODAY"]);
    }

    #[test]
    fn test_no_match() {
        assert!(at_end("zzz").is_empty());
    }
}
