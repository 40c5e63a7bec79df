//! Match session: configuration flags plus the per-text literal cache.

use crate::expr::ExpressionTable;
use crate::pattern::compile::{Pattern, PatternError, compile};
use crate::pattern::index::LiteralIndex;
use crate::pattern::matcher;
use crate::pattern::text::SubjectText;
use crate::pattern::token::{TokenKind, TokenMatch};
use crate::result::{Capture, MatchResult};

/// A reusable matching session.
///
/// The session owns the case-folded subject text and the literal position
/// cache built over it. Both survive across calls, so repeated searches
/// against the same text reuse previously scanned buckets; both are rebuilt
/// whenever the subject text or the case mode differs from the previous call.
///
/// A session is single-threaded: searching mutates the literal cache in
/// place, so shared use requires external serialization per session.
/// Independent sessions share no state.
pub struct MatchSession {
    case_sensitive: bool,
    collapse_whitespace: bool,
    cache: TextCache,
}

struct TextCache {
    subject: SubjectText,
    index: LiteralIndex,
}

impl TextCache {
    fn new(text: &str, case_sensitive: bool) -> Self {
        Self {
            subject: SubjectText::new(text, case_sensitive),
            index: LiteralIndex::new(),
        }
    }
}

impl Default for MatchSession {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchSession {
    /// A session with case-sensitive matching and no whitespace collapsing.
    pub fn new() -> Self {
        Self {
            case_sensitive: true,
            collapse_whitespace: false,
            cache: TextCache::new("", true),
        }
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Changing the mode invalidates the cached text on the next search.
    pub fn set_case_sensitive(&mut self, case_sensitive: bool) {
        self.case_sensitive = case_sensitive;
    }

    pub fn collapse_whitespace(&self) -> bool {
        self.collapse_whitespace
    }

    /// When set, a literal with internal spaces matches its words separated
    /// by any run of whitespace.
    pub fn set_collapse_whitespace(&mut self, collapse_whitespace: bool) {
        self.collapse_whitespace = collapse_whitespace;
    }

    /// Find the first occurrence of `pattern` in `text`.
    ///
    /// Syntax errors surface before any text is searched. A pattern with no
    /// occurrence is `Ok(None)`: absence of a match is a normal outcome, not
    /// an error.
    pub fn find_match(
        &mut self,
        text: &str,
        pattern: &str,
        expressions: &ExpressionTable,
        default_greedy: bool,
    ) -> Result<Option<MatchResult>, PatternError> {
        self.find_match_from(text, pattern, expressions, default_greedy, 0)
    }

    /// Like [`find_match`](Self::find_match), with the search origin moved to
    /// `origin`. Searching from just past a previous result's end walks
    /// successive occurrences.
    pub fn find_match_from(
        &mut self,
        text: &str,
        pattern: &str,
        expressions: &ExpressionTable,
        default_greedy: bool,
        origin: usize,
    ) -> Result<Option<MatchResult>, PatternError> {
        let compiled = compile(pattern, expressions, default_greedy)?;
        Ok(self.find_compiled(text, &compiled, origin))
    }

    /// Search with an already-compiled pattern.
    pub fn find_compiled(
        &mut self,
        text: &str,
        pattern: &Pattern,
        origin: usize,
    ) -> Option<MatchResult> {
        self.prepare(text);
        let cache = &mut self.cache;
        let matches = matcher::search(
            &pattern.tokens,
            &cache.subject,
            &mut cache.index,
            self.collapse_whitespace,
            origin,
        )?;
        Some(build_result(pattern, &matches, &cache.subject))
    }

    /// Number of index buckets scanned for the currently cached text.
    ///
    /// Diagnostic counter: it stays flat across repeated searches that hit
    /// the cache and resets when the text or case mode changes.
    pub fn bucket_scans(&self) -> usize {
        self.cache.index.bucket_scans()
    }

    /// Rebuild the subject text and literal cache if either the text or the
    /// case mode changed since the last search.
    fn prepare(&mut self, text: &str) {
        let stale = self.cache.subject.raw() != text
            || self.cache.subject.case_sensitive() != self.case_sensitive;
        if stale {
            self.cache = TextCache::new(text, self.case_sensitive);
        }
    }
}

fn build_result(pattern: &Pattern, matches: &[TokenMatch], subject: &SubjectText) -> MatchResult {
    let mut result = MatchResult::new(matches[0].start, matches[matches.len() - 1].end);
    for (token, m) in pattern.tokens.iter().zip(matches) {
        if let TokenKind::Variable { name, .. } = &token.kind {
            result.insert(
                name.clone(),
                Capture {
                    start: m.start,
                    end: m.end,
                    text: subject.slice(m.start, m.end),
                },
            );
        }
    }
    result
}
