//! Modifier pipeline.
//!
//! A placeholder may carry a chain of modifiers after its identifiers:
//!
//! ```text
//! ${ secret:kv/app@hosts | select(^db-.*$) | base64 }
//! ```
//!
//! Data modifiers (`base64`, `select`, `dict`, `default`) transform the
//! resolved value before it is substituted. Line modifiers (`indentN`) are
//! applied afterwards to the whole substituted line. Both run in textual
//! order. Tokens that cannot be parsed are kept as [`ParsedModifier::Ignored`]
//! and have no effect on the value.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SELECT_TOKEN: Regex = Regex::new(r#"^select\s*\(\s*["']?(.+?)["']?\s*\)$"#)
        .expect("Invalid select modifier regex");
    static ref DICT_TOKEN: Regex = Regex::new(r#"^dict\s*\(\s*["']?(.+?)["']?\s*\)$"#)
        .expect("Invalid dict modifier regex");
    static ref DEFAULT_TOKEN: Regex = Regex::new(r#"^default\s*\(\s*["']?(.+?)["']?\s*\)$"#)
        .expect("Invalid default modifier regex");
    static ref INDENT_TOKEN: Regex =
        Regex::new(r"^indent(\d+)$").expect("Invalid indent modifier regex");
}

/// A recognized modifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modifier {
    Base64,
    Select(String),
    DictLookup(String),
    Default(String),
    Indent(usize),
}

impl Modifier {
    /// Line modifiers act on the substituted line rather than on the value
    pub fn is_line_modifier(&self) -> bool {
        matches!(self, Modifier::Indent(_))
    }
}

/// Outcome of parsing one modifier token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedModifier {
    Recognized(Modifier),
    Ignored { token: String, reason: String },
}

/// Ordered modifiers parsed from a placeholder's modifier suffix
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModifierChain {
    parsed: Vec<ParsedModifier>,
}

impl ModifierChain {
    /// Parse a raw suffix such as `| base64 | indent4`
    pub fn parse(raw: &str) -> Self {
        let parsed = raw
            .split('|')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(parse_token)
            .inspect(|parsed| {
                if let ParsedModifier::Ignored { token, reason } = parsed {
                    tracing::debug!(token = %token, reason = %reason, "ignoring modifier");
                }
            })
            .collect();

        Self { parsed }
    }

    /// Every token in textual order, recognized or not
    #[allow(dead_code)]
    pub fn parsed(&self) -> &[ParsedModifier] {
        &self.parsed
    }

    /// Recognized modifiers in textual order
    pub fn modifiers(&self) -> impl Iterator<Item = &Modifier> {
        self.parsed.iter().filter_map(|parsed| match parsed {
            ParsedModifier::Recognized(modifier) => Some(modifier),
            ParsedModifier::Ignored { .. } => None,
        })
    }

    /// Run the data modifiers over a resolved value
    pub fn apply_data(&self, value: &str) -> String {
        self.modifiers()
            .filter(|m| !m.is_line_modifier())
            .fold(value.to_string(), |acc, modifier| match modifier {
                Modifier::Base64 => encode_base64(&acc),
                Modifier::Select(pattern) => select(&acc, pattern),
                Modifier::DictLookup(key) => dict_lookup(&acc, key),
                Modifier::Default(fallback) => fallback.clone(),
                Modifier::Indent(_) => acc,
            })
    }

    /// Run the line modifiers over a line that already holds the substituted value
    pub fn apply_line(&self, line: &str) -> String {
        self.modifiers()
            .fold(line.to_string(), |acc, modifier| match modifier {
                Modifier::Indent(width) => indent(&acc, *width),
                _ => acc,
            })
    }
}

fn parse_token(token: &str) -> ParsedModifier {
    let ignored = |reason: &str| ParsedModifier::Ignored {
        token: token.to_string(),
        reason: reason.to_string(),
    };

    if token == "base64" {
        return ParsedModifier::Recognized(Modifier::Base64);
    }

    if let Some(caps) = SELECT_TOKEN.captures(token) {
        let pattern = caps[1].to_string();
        return match Regex::new(&anchored(&pattern)) {
            Ok(_) => ParsedModifier::Recognized(Modifier::Select(pattern)),
            Err(e) => ignored(&format!("invalid select pattern: {}", e)),
        };
    }

    if let Some(caps) = DICT_TOKEN.captures(token) {
        return ParsedModifier::Recognized(Modifier::DictLookup(caps[1].to_string()));
    }

    if let Some(caps) = DEFAULT_TOKEN.captures(token) {
        return ParsedModifier::Recognized(Modifier::Default(caps[1].to_string()));
    }

    if let Some(caps) = INDENT_TOKEN.captures(token) {
        return match caps[1].parse::<usize>() {
            Ok(width) => ParsedModifier::Recognized(Modifier::Indent(width)),
            Err(_) => ignored("indent width out of range"),
        };
    }

    if ["select", "dict", "default", "indent"]
        .iter()
        .any(|name| token.starts_with(name))
    {
        ignored("malformed modifier")
    } else {
        ignored("unknown modifier")
    }
}

fn anchored(pattern: &str) -> String {
    format!("^(?:{})$", pattern)
}

/// Standard Base64 with padding
pub fn encode_base64(value: &str) -> String {
    STANDARD.encode(value.as_bytes())
}

/// First comma-separated element fully matching `pattern`, or the value unchanged
pub fn select(value: &str, pattern: &str) -> String {
    let Ok(re) = Regex::new(&anchored(pattern)) else {
        return value.to_string();
    };

    value
        .split(',')
        .map(str::trim)
        .find(|element| re.is_match(element))
        .map(str::to_string)
        .unwrap_or_else(|| value.to_string())
}

/// Value for `key` in a `k=v,k=v` list, or the value unchanged
pub fn dict_lookup(value: &str, key: &str) -> String {
    value
        .split(',')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| k.trim() == key)
        .map(|(_, v)| v.trim().to_string())
        .unwrap_or_else(|| value.to_string())
}

/// Re-indent every line of `text` with exactly `width` spaces
pub fn indent(text: &str, width: usize) -> String {
    let padding = " ".repeat(width);

    text.lines()
        .map(|line| format!("{}{}", padding, line.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
}
