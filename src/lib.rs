//! A caret-delimited text pattern matching engine with named captures.
//!
//! A pattern is a `^`-separated sequence of tokens. Literal tokens are
//! located in the subject text left to right, backtracking where a later
//! token cannot be satisfied; match variables capture whatever lies between
//! their neighbours. Literal occurrence positions are cached per session in
//! fixed-size buckets, so repeated searches against the same text stay cheap.
//!
//! # Pattern syntax
//!
//! | Token       | Meaning                                                  |
//! |-------------|----------------------------------------------------------|
//! | `text`      | Literal text                                             |
//! | `a\|b\|c`   | Any one of several literal alternatives                  |
//! | `[word]`    | `[` / `]` pin the literal's start / end to a word boundary |
//! | `?name`     | Match variable: captures the text between its neighbours |
//! | `?<name>`   | Leading/trailing `<` and `>` override the default greediness |
//! | `@name`     | Caller-supplied expression (literal or list)             |
//! | `@+name`    | One character from the expression's character set        |
//! | `@-name`    | One character not in the expression's character set      |
//! | `N~token`   | At most `N` characters between this token and the previous one |
//!
//! Greedy markers on a variable: a leading `<` makes the left edge greedy and
//! a leading `>` makes it non-greedy; a trailing `>` makes the right edge
//! greedy and a trailing `<` non-greedy. Unmarked edges follow the
//! `default_greedy` argument. All reported offsets are inclusive character
//! indices.
//!
//! # Example
//!
//! ```rust
//! use caretmatch::{ExpressionTable, MatchSession};
//!
//! let mut session = MatchSession::new();
//! let table = ExpressionTable::new();
//! let found = session
//!     .find_match(
//!         "which says that this is a test of Madison",
//!         "this|that^?var",
//!         &table,
//!         true,
//!     )
//!     .unwrap()
//!     .expect("pattern occurs");
//!
//! assert_eq!(found.start, 11);
//! assert_eq!(found.capture("var").unwrap().text, " this is a test of Madison");
//! ```

mod expr;
pub mod pattern;
mod result;
mod session;

pub use expr::ExpressionTable;
pub use pattern::{Pattern, PatternError, PatternErrorKind, compile};
pub use result::{Capture, MatchResult};
pub use session::MatchSession;
