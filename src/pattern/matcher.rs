//! Backtracking search over compiled tokens, and the greedy adjustment pass.
//!
//! Tokens are placed left to right; a token that cannot satisfy the tokens
//! after it retries at its own next occurrence. Recursion depth is bounded by
//! the token count and total work by `MAX_STEPS`. A match variable takes no
//! part in the search itself: its extent is fixed when its right neighbour
//! lands (or at end of text when it is the final token), captured maximally
//! on the left and minimally on the right, then adjusted by the greedy pass.

use super::index::LiteralIndex;
use super::text::SubjectText;
use super::token::{Alternative, Token, TokenKind, TokenMatch};

/// Maximum number of search steps before a match attempt is abandoned.
const MAX_STEPS: usize = 100_000;

/// Outcome of placing one token during the backtracking walk.
enum Outcome {
    /// Every token from here on found a home.
    Matched,
    /// This arrangement failed; an earlier token may retry further along.
    Failed,
    /// Some token cannot be found at all; no retry anywhere can help.
    Aborted,
}

/// Search for the whole token sequence at or after `origin`.
///
/// On success returns one span per token, index-aligned with `tokens`; a
/// match variable's span is its captured extent.
pub(crate) fn search(
    tokens: &[Token],
    subject: &SubjectText,
    index: &mut LiteralIndex,
    collapse_ws: bool,
    origin: usize,
) -> Option<Vec<TokenMatch>> {
    if tokens.is_empty() {
        return None;
    }
    let mut run = Search {
        tokens,
        subject,
        index,
        collapse_ws,
        matches: vec![None; tokens.len()],
        steps: 0,
    };
    match run.place(0, origin) {
        Outcome::Matched => {
            run.adjust_greedy();
            run.matches.into_iter().collect()
        }
        Outcome::Failed | Outcome::Aborted => None,
    }
}

struct Search<'a> {
    tokens: &'a [Token],
    subject: &'a SubjectText,
    index: &'a mut LiteralIndex,
    collapse_ws: bool,
    matches: Vec<Option<TokenMatch>>,
    steps: usize,
}

impl Search<'_> {
    /// Place token `i`, whose search may begin at `from`, then recurse.
    fn place(&mut self, i: usize, from: usize) -> Outcome {
        self.steps += 1;
        if self.steps > MAX_STEPS {
            return Outcome::Aborted;
        }
        let tokens = self.tokens;

        if tokens[i].is_variable() {
            if i + 1 == tokens.len() {
                // Trailing variable: capture through end of text.
                if from >= self.subject.len() {
                    return Outcome::Failed; // null capture
                }
                self.matches[i] = Some(TokenMatch {
                    start: from,
                    end: self.subject.len() - 1,
                });
                return Outcome::Matched;
            }
            // The extent is fixed when the next token lands.
            return self.place(i + 1, from);
        }

        let mut search_from = from;
        loop {
            let Some(found) = self.find_token(i, search_from) else {
                return Outcome::Aborted;
            };
            if i > 0 && found.start - from > tokens[i].max_ignore {
                // The gap only grows on retry; let an earlier token move up.
                return Outcome::Failed;
            }
            if i > 0 && tokens[i - 1].is_variable() {
                if found.start == from {
                    // Null capture; skip to this token's next occurrence.
                    search_from = found.end + 1;
                    continue;
                }
                self.matches[i - 1] = Some(TokenMatch {
                    start: from,
                    end: found.start - 1,
                });
            }
            self.matches[i] = Some(found);
            if i + 1 == tokens.len() {
                return Outcome::Matched;
            }
            match self.place(i + 1, found.end + 1) {
                Outcome::Matched => return Outcome::Matched,
                Outcome::Aborted => return Outcome::Aborted,
                Outcome::Failed => search_from = found.end + 1,
            }
        }
    }

    /// Next occurrence of token `i` at or after `from`. Match variables are
    /// never searched for.
    fn find_token(&mut self, i: usize, from: usize) -> Option<TokenMatch> {
        let tokens = self.tokens;
        match &tokens[i].kind {
            TokenKind::Literal { list } | TokenKind::Expression { list, name: _ } => {
                self.find_list(list, from)
            }
            TokenKind::CharIn { set, .. } => self.find_char(set, true, from),
            TokenKind::CharNotIn { set, .. } => self.find_char(set, false, from),
            TokenKind::Variable { .. } => None,
        }
    }

    /// Earliest match across every alternative of a literal list.
    fn find_list(&mut self, list: &[Alternative], from: usize) -> Option<TokenMatch> {
        list.iter()
            .filter_map(|alt| self.find_alternative(alt, from))
            .min_by_key(|m| (m.start, m.end))
    }

    /// Earliest occurrence of one alternative at or after `from` that
    /// satisfies its word-boundary requirements.
    fn find_alternative(&mut self, alt: &Alternative, from: usize) -> Option<TokenMatch> {
        let mut cursor = from;
        loop {
            let found = self.find_occurrence(alt, cursor)?;
            let start_ok = !alt.bound_start || self.subject.boundary_before(found.start);
            let end_ok = !alt.bound_end || self.subject.boundary_after(found.end);
            if start_ok && end_ok {
                return Some(found);
            }
            cursor = found.start + 1;
        }
    }

    /// One raw occurrence of an alternative, collapsed or plain.
    fn find_occurrence(&mut self, alt: &Alternative, from: usize) -> Option<TokenMatch> {
        if self.collapse_ws {
            let words: Vec<&str> = alt.text.split(' ').filter(|w| !w.is_empty()).collect();
            if words.len() > 1 {
                return self.find_collapsed(&words, from);
            }
        }
        let subject = self.subject;
        let needle = subject.fold(&alt.text);
        let start = self.index.find(&alt.text, &needle, subject, from)?;
        Some(TokenMatch {
            start,
            end: start + needle.len() - 1,
        })
    }

    /// Match `words` in order, separated by runs of whitespace and nothing
    /// else. A later word that fails does not fail the search outright: the
    /// whole alternative restarts just past the first word's occurrence,
    /// since an early partial match must not mask a later full one.
    fn find_collapsed(&mut self, words: &[&str], from: usize) -> Option<TokenMatch> {
        let subject = self.subject;
        let needles: Vec<Vec<char>> = words.iter().map(|w| subject.fold(w)).collect();
        let mut cursor = from;
        'candidates: loop {
            let start = self.index.find(words[0], &needles[0], subject, cursor)?;
            let mut pos = start + needles[0].len();
            for needle in &needles[1..] {
                let word_gap = pos;
                while subject.is_whitespace_at(pos) {
                    pos += 1;
                }
                if pos == word_gap || !subject.starts_with_at(pos, needle) {
                    cursor = start + 1;
                    continue 'candidates;
                }
                pos += needle.len();
            }
            return Some(TokenMatch {
                start,
                end: pos - 1,
            });
        }
    }

    /// First character at or after `from` whose set membership equals
    /// `include`. The match spans exactly one character.
    fn find_char(&mut self, set: &[char], include: bool, from: usize) -> Option<TokenMatch> {
        let subject = self.subject;
        let folded: Vec<char> = set.iter().map(|&c| subject.fold_char(c)).collect();
        (from..subject.len())
            .find(|&pos| {
                subject
                    .cmp_at(pos)
                    .is_some_and(|c| folded.contains(&c) == include)
            })
            .map(|pos| TokenMatch {
                start: pos,
                end: pos,
            })
    }

    // ─── Greedy adjustment ──────────────────────────────────────────────────

    /// Rebalance every match variable against its greedy settings. The
    /// backtracking walk leaves captures maximal on the left and minimal on
    /// the right; this pass shrinks non-greedy left edges and extends greedy
    /// right edges, moving only the variable and its immediate neighbours.
    fn adjust_greedy(&mut self) {
        for i in 0..self.tokens.len() {
            let (greedy_left, greedy_right) = match &self.tokens[i].kind {
                TokenKind::Variable {
                    greedy_left,
                    greedy_right,
                    ..
                } => (*greedy_left, *greedy_right),
                _ => continue,
            };
            if !greedy_left && i > 0 {
                self.shrink_left(i);
            }
            if greedy_right && i + 1 < self.tokens.len() {
                self.extend_right(i);
            }
        }
    }

    /// Move the variable's start right by re-finding its left neighbour
    /// inside the captured range, keeping the capture non-empty.
    fn shrink_left(&mut self, i: usize) {
        loop {
            let Some(var) = self.matches[i] else { return };
            let Some(later) = self.find_token(i - 1, var.start) else {
                return;
            };
            if later.end >= var.end {
                return; // would leave a null capture
            }
            self.matches[i - 1] = Some(later);
            self.matches[i] = Some(TokenMatch {
                start: later.end + 1,
                end: var.end,
            });
        }
    }

    /// Move the variable's end right by re-finding its right neighbour later
    /// in the text, bounded by the token after it.
    fn extend_right(&mut self, i: usize) {
        loop {
            let Some(next) = self.matches[i + 1] else { return };
            let Some(later) = self.find_token(i + 1, next.start + 1) else {
                return;
            };
            if let Some(Some(limit)) = self.matches.get(i + 2).copied()
                && later.end >= limit.start
            {
                return;
            }
            self.matches[i + 1] = Some(later);
            if let Some(var) = self.matches[i] {
                self.matches[i] = Some(TokenMatch {
                    start: var.start,
                    end: later.start - 1,
                });
            }
        }
    }
}
