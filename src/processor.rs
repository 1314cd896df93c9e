//! Line-by-line placeholder substitution.

use crate::error::{ReplaceError, ReplaceResult};
use crate::grammar::{
    PlaceholderGrammar, PlaceholderKind, PlaceholderMatch, ReferenceGrammar, SecretGrammar,
    is_comment,
};
use crate::modifiers::ModifierChain;
use crate::resolver::ResolverContext;
use std::io::BufRead;

/// Placeholder dialects in the order a line is tested against them
struct Dialects {
    secret: SecretGrammar,
    reference: ReferenceGrammar,
}

/// Classifies and rewrites lines.
///
/// A line is handled by the first dialect that matches it (secrets before
/// references); comment lines are never rewritten.
pub struct LineProcessor<'a> {
    dialects: Dialects,
    resolvers: ResolverContext<'a>,
}

impl<'a> LineProcessor<'a> {
    pub fn new(resolvers: ResolverContext<'a>) -> Self {
        Self {
            dialects: Dialects {
                secret: SecretGrammar::new(),
                reference: ReferenceGrammar::new(),
            },
            resolvers,
        }
    }

    /// Rewrite a whole stream; nothing is returned unless every line succeeds.
    ///
    /// Lines are split on `\n` with a trailing `\r` dropped. A line that is not
    /// valid UTF-8 is copied byte-for-byte when it holds nothing to resolve.
    pub fn process_all<R: BufRead>(&mut self, reader: R) -> ReplaceResult<Vec<u8>> {
        let mut output = Vec::new();

        for (index, line) in reader.split(b'\n').enumerate() {
            let mut line = line?;
            if line.last() == Some(&b'\r') {
                line.pop();
            }

            match String::from_utf8(line) {
                Ok(text) => output.extend_from_slice(self.process_line(&text)?.as_bytes()),
                Err(err) => {
                    let raw = err.into_bytes();
                    self.check_raw_line(index + 1, &raw)?;
                    output.extend_from_slice(&raw);
                }
            }
            output.push(b'\n');
        }

        Ok(output)
    }

    /// Rewrite a single line (without its newline)
    pub fn process_line(&mut self, line: &str) -> ReplaceResult<String> {
        let dialects = &self.dialects;
        let resolvers = &mut self.resolvers;

        if is_comment(line) {
            return Ok(line.to_string());
        }

        if dialects.secret.is_match(line) {
            if dialects.reference.is_match(line) {
                tracing::warn!(line = %line, "line mixes secret and ref placeholders, ref placeholders are left as-is");
            }
            return substitute(dialects, resolvers, &dialects.secret, line);
        }

        if dialects.reference.is_match(line) {
            return substitute(dialects, resolvers, &dialects.reference, line);
        }

        Ok(line.to_string())
    }

    fn check_raw_line(&self, number: usize, raw: &[u8]) -> ReplaceResult<()> {
        let text = String::from_utf8_lossy(raw);
        let needs_resolving = !is_comment(&text)
            && (self.dialects.secret.is_match(&text) || self.dialects.reference.is_match(&text));

        if needs_resolving {
            return Err(ReplaceError::InvalidInput(format!(
                "line {} is not valid UTF-8 and contains a placeholder",
                number
            )));
        }

        tracing::debug!(line = number, "copying line that is not valid UTF-8");
        Ok(())
    }

    #[allow(dead_code)]
    pub fn resolvers(&self) -> &ResolverContext<'a> {
        &self.resolvers
    }
}

/// Replace every placeholder of one dialect found in `line`.
///
/// Values are spliced in at the matched spans, then the line modifiers of each
/// placeholder run over the whole line in order of appearance.
fn substitute(
    dialects: &Dialects,
    resolvers: &mut ResolverContext<'_>,
    grammar: &dyn PlaceholderGrammar,
    line: &str,
) -> ReplaceResult<String> {
    let placeholders = grammar.find_all(line);
    tracing::trace!(dialect = ?grammar.kind(), count = placeholders.len(), "substituting placeholders");

    let mut output = String::with_capacity(line.len());
    let mut chains = Vec::with_capacity(placeholders.len());
    let mut copied = 0;

    for placeholder in placeholders {
        let raw = resolve(dialects, resolvers, &placeholder)?;
        let chain = ModifierChain::parse(&placeholder.raw_modifiers);
        tracing::trace!(placeholder = %placeholder.matched_text, "resolved");

        output.push_str(&line[copied..placeholder.span.start]);
        output.push_str(&chain.apply_data(&raw));
        copied = placeholder.span.end;
        chains.push(chain);
    }
    output.push_str(&line[copied..]);

    Ok(chains
        .iter()
        .fold(output, |acc, chain| chain.apply_line(&acc)))
}

/// Raw value of one placeholder, before its own modifiers run
fn resolve(
    dialects: &Dialects,
    resolvers: &mut ResolverContext<'_>,
    placeholder: &PlaceholderMatch,
) -> ReplaceResult<String> {
    match placeholder.kind {
        PlaceholderKind::Secret => {
            let key = placeholder.field_key.as_deref().unwrap_or_default();
            resolvers.resolve_secret(&placeholder.primary_id, key)
        }
        PlaceholderKind::LocalKv => {
            let value = resolvers.resolve_reference(&placeholder.primary_id)?;

            // A stored value may itself point into the secret store
            if dialects.secret.is_match(&value) {
                substitute(dialects, resolvers, &dialects.secret, &value)
            } else {
                Ok(value)
            }
        }
    }
}
