//! Tokenizer and validator for caret pattern strings.
//!
//! A pattern splits on `^` into tokens; each token strips an optional `N~`
//! gap-budget prefix and is classified by its leading character. Expression
//! references are resolved against the caller's table here, so a compiled
//! [`Pattern`] is self-contained and reusable. All validation is eager: a
//! caller never pays search cost for a pattern that cannot compile.

use std::collections::HashSet;
use std::fmt;

use itertools::Itertools;
use phf::{Set, phf_set};

use crate::expr::ExpressionTable;

use super::token::{Alternative, IGNORE_UNBOUNDED, Token, TokenKind};

/// Characters with structural meaning; they may not appear inside names,
/// literals or expression values.
const RESERVED_CHARS: Set<char> = phf_set! { '@', '?', '^', '~' };

/// A compiled pattern, ready to search with.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub tokens: Vec<Token>,
}

/// Why a pattern failed to compile, pinned to the offending token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternError {
    /// Zero-based index of the offending `^`-delimited token.
    pub token: usize,
    /// The offending token's source text.
    pub text: String,
    pub kind: PatternErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternErrorKind {
    EmptyToken,
    BadIgnoreCount,
    IgnoreCountOnVariable,
    MisplacedMarker(char),
    EmptyVariableName,
    DuplicateVariable,
    AdjacentVariables,
    EmptyExpressionName,
    UnknownExpression,
    EmptyExpressionValue,
    ReservedChar(char),
    EmptyLiteral,
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token {} ({:?}): ", self.token, self.text)?;
        match &self.kind {
            PatternErrorKind::EmptyToken => write!(f, "empty token"),
            PatternErrorKind::BadIgnoreCount => write!(f, "malformed ignore-count prefix"),
            PatternErrorKind::IgnoreCountOnVariable => {
                write!(f, "an ignore-count prefix is not allowed on a match variable")
            }
            PatternErrorKind::MisplacedMarker(c) => {
                write!(f, "{c:?} is only allowed as the first character of a token")
            }
            PatternErrorKind::EmptyVariableName => write!(f, "match variable has no name"),
            PatternErrorKind::DuplicateVariable => write!(f, "duplicate match variable name"),
            PatternErrorKind::AdjacentVariables => {
                write!(f, "two match variables may not be adjacent")
            }
            PatternErrorKind::EmptyExpressionName => write!(f, "expression reference has no name"),
            PatternErrorKind::UnknownExpression => write!(f, "unknown expression name"),
            PatternErrorKind::EmptyExpressionValue => write!(f, "expression value is empty"),
            PatternErrorKind::ReservedChar(c) => write!(f, "reserved character {c:?}"),
            PatternErrorKind::EmptyLiteral => write!(f, "empty literal"),
        }
    }
}

impl std::error::Error for PatternError {}

/// Compile a caret pattern string into a [`Pattern`].
///
/// `default_greedy` supplies the greediness for match variables that carry no
/// explicit `<`/`>` markers.
pub fn compile(
    pattern: &str,
    expressions: &ExpressionTable,
    default_greedy: bool,
) -> Result<Pattern, PatternError> {
    let mut tokens = Vec::new();
    let mut seen_vars = HashSet::new();
    for (idx, segment) in pattern.split('^').enumerate() {
        let token = compile_token(idx, segment, expressions, default_greedy, &mut seen_vars)?;
        if token.is_variable() && tokens.last().is_some_and(Token::is_variable) {
            // The extent of back-to-back captures would be ambiguous.
            return Err(PatternError {
                token: idx,
                text: segment.to_string(),
                kind: PatternErrorKind::AdjacentVariables,
            });
        }
        tokens.push(token);
    }
    Ok(Pattern { tokens })
}

fn compile_token(
    idx: usize,
    segment: &str,
    expressions: &ExpressionTable,
    default_greedy: bool,
    seen_vars: &mut HashSet<String>,
) -> Result<Token, PatternError> {
    let fail = |kind| PatternError {
        token: idx,
        text: segment.to_string(),
        kind,
    };
    if segment.is_empty() {
        return Err(fail(PatternErrorKind::EmptyToken));
    }

    // `N~` gap-budget prefix. Everything before the first `~` must be a
    // non-negative integer; a second `~` anywhere is an error.
    let (max_ignore, explicit_ignore, rest) = match segment.find('~') {
        Some(pos) => {
            let count = segment[..pos]
                .parse::<usize>()
                .map_err(|_| fail(PatternErrorKind::BadIgnoreCount))?;
            (count, true, &segment[pos + 1..])
        }
        None => (IGNORE_UNBOUNDED, false, segment),
    };
    if rest.contains('~') {
        return Err(fail(PatternErrorKind::ReservedChar('~')));
    }
    if rest.is_empty() {
        return Err(fail(PatternErrorKind::EmptyToken));
    }

    let kind = classify(rest, explicit_ignore, default_greedy, expressions, seen_vars)
        .map_err(fail)?;
    Ok(Token {
        kind,
        raw: rest.to_string(),
        max_ignore,
    })
}

fn classify(
    rest: &str,
    explicit_ignore: bool,
    default_greedy: bool,
    expressions: &ExpressionTable,
    seen_vars: &mut HashSet<String>,
) -> Result<TokenKind, PatternErrorKind> {
    if let Some(name) = rest.strip_prefix('?') {
        if explicit_ignore {
            return Err(PatternErrorKind::IgnoreCountOnVariable);
        }
        return variable_kind(name, default_greedy, seen_vars);
    }
    if let Some(name) = rest.strip_prefix("@+") {
        let (name, set) = char_set_kind(name, expressions)?;
        return Ok(TokenKind::CharIn { name, set });
    }
    if let Some(name) = rest.strip_prefix("@-") {
        let (name, set) = char_set_kind(name, expressions)?;
        return Ok(TokenKind::CharNotIn { name, set });
    }
    if let Some(name) = rest.strip_prefix('@') {
        let value = expression_value(name, expressions)?;
        let list = parse_list(value)?;
        return Ok(TokenKind::Expression {
            name: name.to_string(),
            list,
        });
    }
    literal_kind(rest)
}

fn variable_kind(
    name: &str,
    default_greedy: bool,
    seen_vars: &mut HashSet<String>,
) -> Result<TokenKind, PatternErrorKind> {
    if let Some(c) = name.chars().find(|c| matches!(c, '?' | '@')) {
        return Err(PatternErrorKind::MisplacedMarker(c));
    }
    let mut greedy_left = default_greedy;
    let mut greedy_right = default_greedy;
    let mut name = name;
    if let Some(stripped) = name.strip_prefix('<') {
        greedy_left = true;
        name = stripped;
    } else if let Some(stripped) = name.strip_prefix('>') {
        greedy_left = false;
        name = stripped;
    }
    if let Some(stripped) = name.strip_suffix('>') {
        greedy_right = true;
        name = stripped;
    } else if let Some(stripped) = name.strip_suffix('<') {
        greedy_right = false;
        name = stripped;
    }
    if name.is_empty() {
        return Err(PatternErrorKind::EmptyVariableName);
    }
    if !seen_vars.insert(name.to_string()) {
        return Err(PatternErrorKind::DuplicateVariable);
    }
    Ok(TokenKind::Variable {
        name: name.to_string(),
        greedy_left,
        greedy_right,
    })
}

fn char_set_kind(
    name: &str,
    expressions: &ExpressionTable,
) -> Result<(String, Vec<char>), PatternErrorKind> {
    let value = expression_value(name, expressions)?;
    // A character set, not a list of alternatives.
    if value.contains('|') {
        return Err(PatternErrorKind::ReservedChar('|'));
    }
    Ok((name.to_string(), value.chars().collect()))
}

/// Validate an expression name, look it up, and validate its value.
fn expression_value<'a>(
    name: &str,
    expressions: &'a ExpressionTable,
) -> Result<&'a str, PatternErrorKind> {
    if name.is_empty() {
        return Err(PatternErrorKind::EmptyExpressionName);
    }
    if let Some(c) = name.chars().find(|c| RESERVED_CHARS.contains(c)) {
        return Err(PatternErrorKind::ReservedChar(c));
    }
    let value = expressions
        .get(name)
        .ok_or(PatternErrorKind::UnknownExpression)?;
    if value.is_empty() {
        return Err(PatternErrorKind::EmptyExpressionValue);
    }
    if let Some(c) = value.chars().find(|c| RESERVED_CHARS.contains(c)) {
        return Err(PatternErrorKind::ReservedChar(c));
    }
    Ok(value)
}

fn literal_kind(text: &str) -> Result<TokenKind, PatternErrorKind> {
    if let Some(c) = text.chars().find(|c| matches!(c, '?' | '@')) {
        return Err(PatternErrorKind::MisplacedMarker(c));
    }
    Ok(TokenKind::Literal {
        list: parse_list(text)?,
    })
}

fn parse_list(text: &str) -> Result<Vec<Alternative>, PatternErrorKind> {
    text.split('|').map(parse_alternative).try_collect()
}

/// Strip word-boundary markers (`[` leading, `]` trailing) into flags.
fn parse_alternative(text: &str) -> Result<Alternative, PatternErrorKind> {
    let mut text = text;
    let mut bound_start = false;
    let mut bound_end = false;
    if let Some(stripped) = text.strip_prefix('[') {
        bound_start = true;
        text = stripped;
    }
    if let Some(stripped) = text.strip_suffix(']') {
        bound_end = true;
        text = stripped;
    }
    if text.is_empty() {
        return Err(PatternErrorKind::EmptyLiteral);
    }
    Ok(Alternative {
        text: text.to_string(),
        bound_start,
        bound_end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(pairs: &[(&str, &str)]) -> ExpressionTable {
        let mut exprs = ExpressionTable::new();
        for (name, value) in pairs {
            exprs.insert(name, value);
        }
        exprs
    }

    fn compile_ok(pattern: &str) -> Pattern {
        compile(pattern, &ExpressionTable::new(), false).expect("pattern should compile")
    }

    fn compile_err(pattern: &str) -> PatternError {
        compile(pattern, &ExpressionTable::new(), false).expect_err("pattern should fail")
    }

    // --- Literals ---

    #[test]
    fn single_literal() {
        let p = compile_ok("hello");
        assert_eq!(p.tokens.len(), 1);
        match &p.tokens[0].kind {
            TokenKind::Literal { list } => {
                assert_eq!(list.len(), 1);
                assert_eq!(list[0].text, "hello");
                assert!(!list[0].bound_start && !list[0].bound_end);
            }
            _ => panic!("expected Literal"),
        }
        assert_eq!(p.tokens[0].max_ignore, IGNORE_UNBOUNDED);
    }

    #[test]
    fn literal_list_splits_on_pipe() {
        let p = compile_ok("this|that|other");
        match &p.tokens[0].kind {
            TokenKind::Literal { list } => {
                let texts: Vec<&str> = list.iter().map(|a| a.text.as_str()).collect();
                assert_eq!(texts, ["this", "that", "other"]);
            }
            _ => panic!("expected Literal"),
        }
    }

    #[test]
    fn word_boundary_markers_become_flags() {
        let p = compile_ok("[cat]|dog]");
        match &p.tokens[0].kind {
            TokenKind::Literal { list } => {
                assert_eq!(list[0].text, "cat");
                assert!(list[0].bound_start && list[0].bound_end);
                assert_eq!(list[1].text, "dog");
                assert!(!list[1].bound_start && list[1].bound_end);
            }
            _ => panic!("expected Literal"),
        }
    }

    #[test]
    fn empty_alternative_rejected() {
        assert_eq!(compile_err("a||b").kind, PatternErrorKind::EmptyLiteral);
        assert_eq!(compile_err("[]").kind, PatternErrorKind::EmptyLiteral);
    }

    #[test]
    fn reserved_char_inside_literal() {
        assert_eq!(
            compile_err("foo@bar").kind,
            PatternErrorKind::MisplacedMarker('@')
        );
        assert_eq!(
            compile_err("foo?bar").kind,
            PatternErrorKind::MisplacedMarker('?')
        );
    }

    // --- Ignore counts ---

    #[test]
    fn ignore_count_prefix() {
        let p = compile_ok("first^12~second");
        assert_eq!(p.tokens[0].max_ignore, IGNORE_UNBOUNDED);
        assert_eq!(p.tokens[1].max_ignore, 12);
        assert_eq!(p.tokens[1].raw, "second");
    }

    #[test]
    fn zero_ignore_count() {
        let p = compile_ok("a^0~b");
        assert_eq!(p.tokens[1].max_ignore, 0);
    }

    #[test]
    fn malformed_ignore_count() {
        assert_eq!(compile_err("~foo").kind, PatternErrorKind::BadIgnoreCount);
        assert_eq!(compile_err("x~foo").kind, PatternErrorKind::BadIgnoreCount);
        assert_eq!(compile_err("-2~foo").kind, PatternErrorKind::BadIgnoreCount);
    }

    #[test]
    fn second_tilde_rejected() {
        assert_eq!(
            compile_err("2~fo~o").kind,
            PatternErrorKind::ReservedChar('~')
        );
    }

    #[test]
    fn bare_prefix_is_an_empty_token() {
        assert_eq!(compile_err("3~").kind, PatternErrorKind::EmptyToken);
    }

    // --- Match variables ---

    #[test]
    fn variable_defaults_follow_flag() {
        let p = compile(
            "lead^?var",
            &ExpressionTable::new(),
            true,
        )
        .unwrap();
        match &p.tokens[1].kind {
            TokenKind::Variable {
                name,
                greedy_left,
                greedy_right,
            } => {
                assert_eq!(name, "var");
                assert!(*greedy_left && *greedy_right);
            }
            _ => panic!("expected Variable"),
        }
    }

    #[test]
    fn greedy_markers_override_defaults() {
        let p = compile_ok("lead^?<var>");
        match &p.tokens[1].kind {
            TokenKind::Variable {
                name,
                greedy_left,
                greedy_right,
            } => {
                assert_eq!(name, "var");
                assert!(*greedy_left, "leading < is greedy-left");
                assert!(*greedy_right, "trailing > is greedy-right");
            }
            _ => panic!("expected Variable"),
        }

        let p = compile_ok("lead^?>var<");
        match &p.tokens[1].kind {
            TokenKind::Variable {
                greedy_left,
                greedy_right,
                ..
            } => {
                assert!(!*greedy_left && !*greedy_right);
            }
            _ => panic!("expected Variable"),
        }
    }

    #[test]
    fn empty_variable_name() {
        assert_eq!(
            compile_err("a^?").kind,
            PatternErrorKind::EmptyVariableName
        );
        assert_eq!(
            compile_err("a^?<>").kind,
            PatternErrorKind::EmptyVariableName
        );
    }

    #[test]
    fn duplicate_variable_name() {
        assert_eq!(
            compile_err("?x^mid^?x").kind,
            PatternErrorKind::DuplicateVariable
        );
    }

    #[test]
    fn adjacent_variables_rejected() {
        assert_eq!(
            compile_err("?a^?b").kind,
            PatternErrorKind::AdjacentVariables
        );
    }

    #[test]
    fn ignore_count_on_variable_rejected() {
        assert_eq!(
            compile_err("a^2~?var").kind,
            PatternErrorKind::IgnoreCountOnVariable
        );
    }

    // --- Expressions ---

    #[test]
    fn expression_reference_resolves() {
        let exprs = table(&[("greeting", "hi|hello")]);
        let p = compile("@greeting", &exprs, false).unwrap();
        match &p.tokens[0].kind {
            TokenKind::Expression { name, list } => {
                assert_eq!(name, "greeting");
                assert_eq!(list.len(), 2);
                assert_eq!(list[1].text, "hello");
            }
            _ => panic!("expected Expression"),
        }
    }

    #[test]
    fn char_set_references() {
        let exprs = table(&[("digits", "0123456789")]);
        let p = compile("@+digits^@-digits", &exprs, false).unwrap();
        match &p.tokens[0].kind {
            TokenKind::CharIn { name, set } => {
                assert_eq!(name, "digits");
                assert_eq!(set.len(), 10);
            }
            _ => panic!("expected CharIn"),
        }
        assert!(matches!(p.tokens[1].kind, TokenKind::CharNotIn { .. }));
    }

    #[test]
    fn unknown_expression() {
        assert_eq!(
            compile_err("@missing").kind,
            PatternErrorKind::UnknownExpression
        );
    }

    #[test]
    fn empty_expression_name() {
        assert_eq!(
            compile_err("a^@").kind,
            PatternErrorKind::EmptyExpressionName
        );
    }

    #[test]
    fn reserved_char_in_expression_value() {
        let exprs = table(&[("bad", "x~y")]);
        assert_eq!(
            compile("@bad", &exprs, false).unwrap_err().kind,
            PatternErrorKind::ReservedChar('~')
        );
    }

    #[test]
    fn empty_expression_value() {
        let exprs = table(&[("blank", "")]);
        assert_eq!(
            compile("@blank", &exprs, false).unwrap_err().kind,
            PatternErrorKind::EmptyExpressionValue
        );
    }

    #[test]
    fn pipe_rejected_in_char_set_value() {
        let exprs = table(&[("vowels", "a|e|i")]);
        assert_eq!(
            compile("@+vowels", &exprs, false).unwrap_err().kind,
            PatternErrorKind::ReservedChar('|')
        );
        // The same value is fine as a plain expression reference.
        assert!(compile("@vowels", &exprs, false).is_ok());
    }

    // --- Whole-pattern shapes ---

    #[test]
    fn empty_pattern_rejected() {
        assert_eq!(compile_err("").kind, PatternErrorKind::EmptyToken);
        assert_eq!(compile_err("a^^b").kind, PatternErrorKind::EmptyToken);
    }

    #[test]
    fn error_reports_token_index_and_text() {
        let err = compile_err("good^?^also");
        assert_eq!(err.token, 1);
        assert_eq!(err.text, "?");
    }
}
