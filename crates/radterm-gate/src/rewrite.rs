use crate::{GateError, TokenReport, VocabularyGate};

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Split a token into leading punctuation, core and trailing punctuation.
pub(crate) fn split_token(part: &str) -> (&str, &str, &str) {
    let start = part.find(is_word_char).unwrap_or(part.len());
    let (prefix, rest) = part.split_at(start);
    let end = rest
        .rfind(is_word_char)
        .map(|i| i + rest[i..].chars().next().map_or(0, char::len_utf8))
        .unwrap_or(0);
    let (core, suffix) = rest.split_at(end);
    (prefix, core, suffix)
}

impl VocabularyGate {
    /// Rewrite space-delimited text token by token.
    ///
    /// Punctuation around each token is preserved and only the core is
    /// looked up; the whole text is the audit context.
    pub fn rewrite_text(&self, text: &str) -> Result<(String, Vec<TokenReport>), GateError> {
        let mut report = Vec::new();
        let mut parts = Vec::new();
        for part in text.split(' ') {
            let (prefix, core, suffix) = split_token(part);
            if core.is_empty() {
                parts.push(part.to_string());
                continue;
            }
            let res = self.lookup_in_context(core, text)?;
            parts.push(format!("{prefix}{}{suffix}", res.term_out));
            report.push(TokenReport::from(&res));
        }
        Ok((parts.join(" "), report))
    }

    /// Rewrite a token list; the space-joined list is the audit context.
    pub fn rewrite_tokens<S: AsRef<str>>(
        &self,
        tokens: &[S],
    ) -> Result<(Vec<String>, Vec<TokenReport>), GateError> {
        let context = tokens
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" ");
        let mut out = Vec::with_capacity(tokens.len());
        let mut report = Vec::with_capacity(tokens.len());
        for token in tokens {
            let res = self.lookup_in_context(token.as_ref(), &context)?;
            out.push(res.term_out.clone());
            report.push(TokenReport::from(&res));
        }
        Ok((out, report))
    }
}
