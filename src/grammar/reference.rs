use regex::Regex;

use super::{PlaceholderGrammar, PlaceholderKind, PlaceholderMatch};

/// `${ ref:<key> | <modifiers> }`
pub struct ReferenceGrammar {
    pattern: Regex,
}

impl Default for ReferenceGrammar {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceGrammar {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(r"\$\{\s*ref:\s*([^}|\s][^}|]*?)\s*(\|[^}]*)?\}")
                .expect("Invalid reference placeholder regex"),
        }
    }
}

impl PlaceholderGrammar for ReferenceGrammar {
    fn kind(&self) -> PlaceholderKind {
        PlaceholderKind::LocalKv
    }

    fn is_match(&self, line: &str) -> bool {
        self.pattern.is_match(line)
    }

    fn find_all(&self, line: &str) -> Vec<PlaceholderMatch> {
        self.pattern
            .captures_iter(line)
            .map(|caps| PlaceholderMatch {
                kind: PlaceholderKind::LocalKv,
                primary_id: caps[1].to_string(),
                field_key: None,
                raw_modifiers: caps.get(2).map(|m| m.as_str()).unwrap_or("").to_string(),
                matched_text: caps[0].to_string(),
                span: caps.get(0).map(|m| m.range()).unwrap_or_default(),
            })
            .collect()
    }
}
