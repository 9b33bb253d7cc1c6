//! The citation command family. Each command parses one or more
//! `[prefix][suffix]{keys}` argument groups and yields a `Cite` inline
//! wrapping a raw mirror of the original command, so writers that emit
//! LaTeX can round-trip it.

use doc_tree::{Citation, CitationMode, Inline, Inlines};
use phf::phf_map;

use crate::stream::{split_on_symbol, PResult, Parser};

pub(crate) struct CiteSpec {
    pub mode: CitationMode,
    /// The citation belongs in a footnote.
    pub note: bool,
    /// The command accepts repeated `[pre][post]{keys}` groups.
    pub multi: bool,
}

const fn cite(mode: CitationMode) -> CiteSpec {
    CiteSpec {
        mode,
        note: false,
        multi: false,
    }
}

const fn footcite() -> CiteSpec {
    CiteSpec {
        mode: CitationMode::Normal,
        note: true,
        multi: false,
    }
}

const fn cites(mode: CitationMode, note: bool) -> CiteSpec {
    CiteSpec {
        mode,
        note,
        multi: true,
    }
}

pub(crate) static CITE_COMMANDS: phf::Map<&'static str, CiteSpec> = phf_map! {
    "cite" => cite(CitationMode::Normal),
    "Cite" => cite(CitationMode::Normal),
    "citep" => cite(CitationMode::Normal),
    "Citep" => cite(CitationMode::Normal),
    "citealp" => cite(CitationMode::Normal),
    "Citealp" => cite(CitationMode::Normal),
    "parencite" => cite(CitationMode::Normal),
    "Parencite" => cite(CitationMode::Normal),
    "autocite" => cite(CitationMode::Normal),
    "Autocite" => cite(CitationMode::Normal),
    "citet" => cite(CitationMode::AuthorInText),
    "Citet" => cite(CitationMode::AuthorInText),
    "citealt" => cite(CitationMode::AuthorInText),
    "Citealt" => cite(CitationMode::AuthorInText),
    "textcite" => cite(CitationMode::AuthorInText),
    "Textcite" => cite(CitationMode::AuthorInText),
    "citeyear" => cite(CitationMode::SuppressAuthor),
    "citeyearpar" => cite(CitationMode::SuppressAuthor),
    "footcite" => footcite(),
    "Footcite" => footcite(),
    "cites" => cites(CitationMode::Normal, false),
    "parencites" => cites(CitationMode::Normal, false),
    "autocites" => cites(CitationMode::Normal, false),
    "textcites" => cites(CitationMode::AuthorInText, false),
    "footcites" => cites(CitationMode::Normal, true),
};

pub(crate) fn is_cite_command(name: &str) -> bool {
    CITE_COMMANDS.contains_key(name)
        || name == "citeauthor"
        || name == "Citeauthor"
        || name == "citetext"
}

impl Parser {
    /// Parse the citation command at the head of the stream.
    pub(crate) fn citation(&mut self, name: &str) -> PResult<Inlines> {
        let (parsed, raw) = self.with_raw(|p| {
            p.next_tok()?;
            match name {
                "citeauthor" | "Citeauthor" => p.cite_author(),
                "citetext" => p.cite_text(),
                _ => {
                    let Some(spec) = CITE_COMMANDS.get(name) else {
                        return Ok((Vec::new(), false));
                    };
                    let mut citations = p.cite_group(spec.mode)?;
                    if spec.multi {
                        loop {
                            let more = p.cite_group(spec.mode)?;
                            if more.is_empty() {
                                break;
                            }
                            citations.extend(more);
                        }
                    }
                    Ok((citations, spec.note))
                }
            }
        })?;
        let (citations, note) = parsed;
        if citations.is_empty() {
            return Ok(Vec::new());
        }
        let mirror = Inline::RawInline("latex".into(), raw.trim_end().to_string());
        let cite = Inline::Cite(citations, vec![mirror]);
        if note {
            Ok(vec![Inline::Note(vec![doc_tree::Block::Para(vec![cite])])])
        } else {
            Ok(vec![cite])
        }
    }

    /// One `[prefix][suffix]{keys}` group. With a single bracket, it is the
    /// suffix. The prefix attaches to the first citation, the suffix to the
    /// last.
    fn cite_group(&mut self, mode: CitationMode) -> PResult<Vec<Citation>> {
        self.skip_whitespace_raw();
        let first_opt = self.bracketed()?;
        let second_opt = if first_opt.is_some() {
            self.skip_whitespace_raw();
            self.bracketed()?
        } else {
            None
        };
        let (prefix_toks, suffix_toks) = match (first_opt, second_opt) {
            (Some(first), Some(second)) => (Some(first), Some(second)),
            (Some(first), None) => (None, Some(first)),
            _ => (None, None),
        };
        self.skip_whitespace_raw();
        if !self.at_bgroup() {
            return Ok(Vec::new());
        }
        let keys = self.braced()?;
        let keys: String = keys.iter().map(|t| t.raw.as_str()).collect();
        let mut citations: Vec<Citation> = keys
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(|k| Citation::new(k, mode))
            .collect();
        if let Some(first) = citations.first_mut() {
            if let Some(toks) = prefix_toks {
                first.prefix = doc_tree::trim_inlines(self.sub_inlines(toks)?);
            }
        }
        if let Some(last) = citations.last_mut() {
            if let Some(toks) = suffix_toks {
                last.suffix = doc_tree::trim_inlines(self.sub_inlines(toks)?);
            }
        }
        Ok(citations)
    }

    /// `\citeauthor{keys}`, optionally followed by `\citetext{...}`.
    fn cite_author(&mut self) -> PResult<(Vec<Citation>, bool)> {
        let mut citations = self.cite_group(CitationMode::AuthorInText)?;
        self.skip_whitespace()?;
        if self.eat_ctrl("citetext")? {
            let (more, _) = self.cite_text()?;
            citations.extend(more);
        }
        Ok((citations, false))
    }

    /// `\citetext{a; b; c}`: each semicolon-separated segment becomes one
    /// citation carrying its inlines as the prefix.
    fn cite_text(&mut self) -> PResult<(Vec<Citation>, bool)> {
        self.skip_whitespace_raw();
        if !self.at_bgroup() {
            return Ok((Vec::new(), false));
        }
        let inner = self.braced()?;
        let mut citations = Vec::new();
        for segment in split_on_symbol(&inner, ';') {
            let inlines = doc_tree::trim_inlines(self.sub_inlines(segment)?);
            if inlines.is_empty() {
                continue;
            }
            let mut citation = Citation::new("", CitationMode::Normal);
            citation.prefix = inlines;
            citations.push(citation);
        }
        Ok((citations, false))
    }
}
