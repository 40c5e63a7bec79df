//! Match results: the overall pattern span plus one capture per variable.

use std::collections::HashMap;

/// The captured extent of one match variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    /// Inclusive character offset of the first captured character.
    pub start: usize,
    /// Inclusive character offset of the last captured character.
    pub end: usize,
    /// The captured text, in the subject's original case.
    pub text: String,
}

/// A successful whole-pattern match.
///
/// Created fresh per search and never mutated afterwards; it carries no
/// reference back into the session. Every match variable the pattern declares
/// has an entry here: a variable that could only capture an empty span fails
/// the search instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// Inclusive character offset where the whole pattern starts.
    pub start: usize,
    /// Inclusive character offset where the whole pattern ends.
    pub end: usize,
    captures: HashMap<String, Capture>,
}

impl MatchResult {
    pub(crate) fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            captures: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, name: String, capture: Capture) {
        self.captures.insert(name, capture);
    }

    /// Look up a capture by variable name.
    pub fn capture(&self, name: &str) -> Option<&Capture> {
        self.captures.get(name)
    }

    /// Iterate over all captures in arbitrary order.
    pub fn captures(&self) -> impl Iterator<Item = (&str, &Capture)> {
        self.captures.iter().map(|(name, c)| (name.as_str(), c))
    }

    /// Return all variable names in alphabetical order.
    pub fn sorted_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.captures.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }
}
