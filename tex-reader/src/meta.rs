//! Author, affiliation, and the other metadata commands. Authors
//! accumulate in the `author` list; affiliations number themselves in
//! declaration order and superscript the matching authors.

use doc_tree::{trim_inlines, Attr, Blocks, Inline, Inlines, MetaValue};

use crate::stream::{PResult, Parser};
use crate::token::Tok;

impl Parser {
    /// `\author{A \and B\inst{1}}`.
    pub(crate) fn author_command(&mut self) -> PResult<Blocks> {
        self.next_tok()?;
        self.skip_whitespace_raw();
        self.bracketed()?;
        if !self.at_bgroup() {
            return Ok(Vec::new());
        }
        let toks = self.braced()?;
        for part in split_on_ctrl(&toks, "and") {
            let (base, abbrevs) = extract_inst(part);
            let inlines = trim_inlines(self.sub_inlines(base)?);
            if inlines.is_empty() {
                continue;
            }
            self.add_author(inlines, &abbrevs);
        }
        self.expand_head()?;
        Ok(Vec::new())
    }

    /// `\icmlauthor{name}{abbrev1,abbrev2}`.
    pub(crate) fn icml_author_command(&mut self) -> PResult<Blocks> {
        self.next_tok()?;
        self.skip_whitespace_raw();
        if !self.at_bgroup() {
            return Ok(Vec::new());
        }
        let name_toks = self.braced()?;
        let inlines = trim_inlines(self.sub_inlines(name_toks)?);
        let abbrevs: Vec<String> = self
            .braced_text()?
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if !inlines.is_empty() {
            self.add_author(inlines, &abbrevs);
        }
        Ok(Vec::new())
    }

    fn add_author(&mut self, inlines: Inlines, abbrevs: &[String]) {
        let value = if abbrevs.is_empty() {
            inlines
        } else {
            let attr = Attr {
                attributes: abbrevs
                    .iter()
                    .map(|a| ("affiliation-abbrev".to_string(), a.clone()))
                    .collect(),
                ..Attr::default()
            };
            vec![Inline::Span(attr, inlines)]
        };
        self.state.meta.append("author", MetaValue::Inlines(value));
    }

    /// `\institute{Univ A \and Univ B}`: affiliations in declaration
    /// order, the first carrying superscript 1.
    pub(crate) fn institute_command(&mut self) -> PResult<Blocks> {
        self.next_tok()?;
        self.skip_whitespace_raw();
        if !self.at_bgroup() {
            return Ok(Vec::new());
        }
        let toks = self.braced()?;
        for part in split_on_ctrl(&toks, "and") {
            let inlines = trim_inlines(self.sub_inlines(part)?);
            if inlines.is_empty() {
                continue;
            }
            self.add_affiliation(None, inlines);
        }
        self.expand_head()?;
        Ok(Vec::new())
    }

    /// `\icmlaffiliation{abbrev}{text}`.
    pub(crate) fn icml_affiliation_command(&mut self) -> PResult<Blocks> {
        self.next_tok()?;
        let abbrev = self.braced_text()?;
        self.skip_whitespace_raw();
        if !self.at_bgroup() {
            return Ok(Vec::new());
        }
        let toks = self.braced()?;
        let inlines = trim_inlines(self.sub_inlines(toks)?);
        if !inlines.is_empty() {
            self.add_affiliation(Some(abbrev), inlines);
        }
        Ok(Vec::new())
    }

    /// Register an affiliation: it takes the next ordinal, superscripts
    /// every author whose abbreviation list matches, and lands in the
    /// `institute` meta list as a span classed `affiliation`.
    fn add_affiliation(&mut self, abbrev: Option<String>, inlines: Inlines) {
        let number = match self.state.meta.get("institute") {
            Some(MetaValue::List(items)) => items.len() + 1,
            Some(_) => 2,
            None => 1,
        };
        let number_text = number.to_string();
        let matches_entry = |value: &str| {
            value
                .split(',')
                .map(str::trim)
                .any(|v| v == number_text || abbrev.as_deref() == Some(v))
        };
        if let Some(MetaValue::List(items)) = self.state.meta.0.get_mut("author") {
            for item in items.iter_mut() {
                let MetaValue::Inlines(inlines) = item else {
                    continue;
                };
                for inline in inlines.iter_mut() {
                    let Inline::Span(attr, content) = inline else {
                        continue;
                    };
                    let hit = attr
                        .attributes
                        .iter()
                        .any(|(k, v)| k == "affiliation-abbrev" && matches_entry(v));
                    if hit {
                        content.push(Inline::Superscript(vec![Inline::Str(
                            number_text.clone(),
                        )]));
                    }
                }
            }
        }
        self.state.meta.append(
            "institute",
            MetaValue::Inlines(vec![Inline::Span(
                Attr::from_classes(["affiliation"]),
                inlines,
            )]),
        );
    }
}

/// Split tokens on a top-level control sequence, respecting brace nesting.
fn split_on_ctrl(toks: &[Tok], name: &str) -> Vec<Vec<Tok>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    let mut depth = 0usize;
    for tok in toks {
        if tok.is_symbol('{') {
            depth += 1;
        } else if tok.is_symbol('}') {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && tok.is_ctrl(name) {
            out.push(std::mem::take(&mut current));
            continue;
        }
        current.push(tok.clone());
    }
    out.push(current);
    out
}

/// Split an author part at `\inst{...}`, returning the base tokens and the
/// comma-separated abbreviation list.
fn extract_inst(toks: Vec<Tok>) -> (Vec<Tok>, Vec<String>) {
    let Some(at) = toks.iter().position(|t| t.is_ctrl("inst")) else {
        return (toks, Vec::new());
    };
    let mut base: Vec<Tok> = toks[..at].to_vec();
    let rest = &toks[at + 1..];
    let mut abbrevs = Vec::new();
    let mut i = 0;
    while i < rest.len() && rest[i].is_whitespace() {
        i += 1;
    }
    if rest.get(i).is_some_and(|t| t.is_symbol('{')) {
        let mut depth = 1usize;
        let mut text = String::new();
        i += 1;
        while i < rest.len() {
            let tok = &rest[i];
            if tok.is_symbol('{') {
                depth += 1;
            } else if tok.is_symbol('}') {
                depth -= 1;
                if depth == 0 {
                    i += 1;
                    break;
                }
            }
            text.push_str(&tok.raw);
            i += 1;
        }
        abbrevs = text
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
    base.extend_from_slice(&rest[i..]);
    (base, abbrevs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    #[test]
    fn inst_extraction() {
        let toks = tokenize("Ada Lovelace\\inst{1,2} x");
        let (base, abbrevs) = extract_inst(toks);
        let text: String = base.iter().map(|t| t.raw.as_str()).collect();
        assert_eq!(text, "Ada Lovelace x");
        assert_eq!(abbrevs, vec!["1", "2"]);
    }

    #[test]
    fn and_splitting_respects_braces() {
        let toks = tokenize("A {x \\and y} \\and B");
        let parts = split_on_ctrl(&toks, "and");
        assert_eq!(parts.len(), 2);
    }
}
