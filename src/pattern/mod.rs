//! The caret pattern engine: token model, compiler, matcher and the bucketed
//! literal cache.
//!
//! Compilation and searching are separate steps. [`compile`] validates a
//! pattern string against the caller's expression table and produces a
//! self-contained [`Pattern`]; the matcher places its tokens in the subject
//! text, backed by a bucketed literal index that caches occurrence positions
//! per session. The full pattern syntax is described in the crate-level
//! documentation.

pub mod compile;
pub(crate) mod index;
pub(crate) mod matcher;
pub(crate) mod text;
pub mod token;

pub use compile::{Pattern, PatternError, PatternErrorKind, compile};
pub use token::{Alternative, IGNORE_UNBOUNDED, Token, TokenKind, TokenMatch};
