//! Placeholder grammars.
//!
//! Two dialects are recognized inside a line of text:
//!
//! - `${ secret:<path>@<key> | <modifiers> }` resolved against the secret store
//! - `${ ref:<key> | <modifiers> }` resolved against the local key-value file
//!
//! Each dialect is a [`PlaceholderGrammar`]; the line processor only talks to
//! the trait so a new syntax can be added without touching resolution or the
//! modifier pipeline.

mod reference;
mod secret;

pub use reference::ReferenceGrammar;
pub use secret::SecretGrammar;

use lazy_static::lazy_static;
use regex::Regex;
use std::ops::Range;

lazy_static! {
    static ref COMMENT_LINE: Regex = Regex::new(r"^\s*#").expect("Invalid comment line regex");
}

/// Which resolver a placeholder is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind {
    Secret,
    LocalKv,
}

/// One placeholder occurrence extracted from a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderMatch {
    pub kind: PlaceholderKind,
    /// Secret path, or local key
    pub primary_id: String,
    /// Secret field; always `None` for local keys
    pub field_key: Option<String>,
    /// Modifier suffix including its leading `|`, empty when absent
    pub raw_modifiers: String,
    /// Exact text of the placeholder in the line
    pub matched_text: String,
    /// Byte range of `matched_text` in the scanned line
    pub span: Range<usize>,
}

/// A placeholder dialect
pub trait PlaceholderGrammar: Send + Sync {
    /// Resolver this dialect dispatches to
    fn kind(&self) -> PlaceholderKind;

    /// Whether the line contains at least one placeholder of this dialect
    fn is_match(&self, line: &str) -> bool;

    /// All placeholders of this dialect, in order of appearance; spans never overlap
    fn find_all(&self, line: &str) -> Vec<PlaceholderMatch>;
}

/// Whether the line is a `#` comment, which is never scanned for placeholders
pub fn is_comment(line: &str) -> bool {
    COMMENT_LINE.is_match(line)
}
