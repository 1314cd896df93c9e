use regex::Regex;

use super::{PlaceholderGrammar, PlaceholderKind, PlaceholderMatch};

/// `${ secret:<path>@<key> | <modifiers> }`
pub struct SecretGrammar {
    pattern: Regex,
}

impl Default for SecretGrammar {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretGrammar {
    pub fn new() -> Self {
        Self {
            // Path stops at '@', key and modifiers stop at the closing brace
            pattern: Regex::new(
                r"\$\{\s*secret:\s*([^@}|\s][^@}|]*?)\s*@\s*([^}|\s][^}|]*?)\s*(\|[^}]*)?\}",
            )
            .expect("Invalid secret placeholder regex"),
        }
    }
}

impl PlaceholderGrammar for SecretGrammar {
    fn kind(&self) -> PlaceholderKind {
        PlaceholderKind::Secret
    }

    fn is_match(&self, line: &str) -> bool {
        self.pattern.is_match(line)
    }

    fn find_all(&self, line: &str) -> Vec<PlaceholderMatch> {
        self.pattern
            .captures_iter(line)
            .map(|caps| PlaceholderMatch {
                kind: PlaceholderKind::Secret,
                primary_id: caps[1].to_string(),
                field_key: Some(caps[2].to_string()),
                raw_modifiers: caps.get(3).map(|m| m.as_str()).unwrap_or("").to_string(),
                matched_text: caps[0].to_string(),
                span: caps.get(0).map(|m| m.range()).unwrap_or_default(),
            })
            .collect()
    }
}
