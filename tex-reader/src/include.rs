//! Include directives: `TEXINPUTS` resolution, file splicing with a cycle
//! guard, `\lstinputlisting`, and `\bibliography`'s sibling-`.bbl` lookup.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use doc_tree::{Attr, Block, Blocks, MetaValue};

use crate::error::{ErrorKind, LogKind, ParseError};
use crate::inline::parse_keyvals;
use crate::lexer::tokenize;
use crate::stream::{PResult, Parser};
use crate::token::{SourcePos, Tok, TokKind};

/// Synthesized control-sequence name marking the end of a spliced file.
pub(crate) const END_OF_INCLUDE: &str = "@endinclude";

pub(crate) fn is_include_command(name: &str) -> bool {
    matches!(name, "include" | "input" | "subfile" | "usepackage")
}

impl Parser {
    /// `\include`/`\input`/`\subfile`/`\usepackage{a,b}`: each file is
    /// resolved against `TEXINPUTS`, tokenized, and spliced in place.
    pub(crate) fn include_directive(&mut self, name: &str) -> PResult<()> {
        self.next_tok()?;
        self.skip_whitespace_raw();
        self.bracketed()?;
        let files = self.braced_text()?;
        let default_ext = if name == "usepackage" { "sty" } else { "tex" };
        for file in files.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            match resolve_include(file, default_ext) {
                Some(path) => self.splice_file(&path)?,
                None => {
                    // Non-local packages are simply not read.
                    if name != "usepackage" {
                        self.log_here(LogKind::CouldNotLoadIncludeFile(file.to_string()));
                    }
                }
            }
        }
        Ok(())
    }

    /// Tokenize a file and queue its tokens ahead of the current stream,
    /// guarded against include cycles.
    pub(crate) fn splice_file(&mut self, path: &Path) -> PResult<()> {
        if self.state.include_stack.iter().any(|p| p == path) {
            return Err(ParseError(
                self.here(),
                ErrorKind::IncludeCycle(path.to_path_buf()),
            ));
        }
        let text = match fs::read_to_string(path) {
            Ok(text) => text.replace("\r\n", "\n"),
            Err(_) => {
                self.log_here(LogKind::CouldNotLoadIncludeFile(
                    path.display().to_string(),
                ));
                return Ok(());
            }
        };
        self.state.include_stack.push(path.to_path_buf());
        let mut toks = tokenize(&text);
        toks.push(Tok::new(
            SourcePos::START,
            TokKind::CtrlSeq(END_OF_INCLUDE.into()),
            "",
        ));
        self.splice_front(toks);
        self.expand_head()
    }

    /// `\lstinputlisting[opts]{file}`: the file becomes a code block.
    pub(crate) fn lst_input_listing(&mut self) -> PResult<Blocks> {
        self.next_tok()?;
        self.skip_whitespace_raw();
        let opts = self
            .bracketed()?
            .map(|t| parse_keyvals(&t))
            .unwrap_or_default();
        let file = self.braced_text()?;
        let Some(path) = resolve_include(&file, "") else {
            self.log_here(LogKind::CouldNotLoadIncludeFile(file));
            return Ok(Vec::new());
        };
        let Ok(text) = fs::read_to_string(&path) else {
            self.log_here(LogKind::CouldNotLoadIncludeFile(file));
            return Ok(Vec::new());
        };
        let text = text.replace("\r\n", "\n");
        let mut attr = Attr::empty();
        let mut first_line = 1usize;
        let mut last_line = usize::MAX;
        for (key, value) in opts {
            match key.as_str() {
                "language" => attr.classes.push(value),
                "label" => attr.identifier = value,
                "firstline" => first_line = value.parse().unwrap_or(1),
                "lastline" => last_line = value.parse().unwrap_or(usize::MAX),
                _ => attr.attributes.push((key, value)),
            }
        }
        let sliced: Vec<&str> = text
            .lines()
            .skip(first_line.saturating_sub(1))
            .take(last_line.saturating_sub(first_line.saturating_sub(1)))
            .collect();
        Ok(vec![Block::CodeBlock(attr, sliced.join("\n"))])
    }

    /// `\bibliography{a,b}`: the files land in the meta mapping, and the
    /// first input source's sibling `.bbl` is spliced when present.
    pub(crate) fn bibliography_command(&mut self) -> PResult<()> {
        self.next_tok()?;
        let files = self.braced_text()?;
        for file in files.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            let name = if Path::new(file).extension().is_some() {
                file.to_string()
            } else {
                format!("{file}.bib")
            };
            self.state
                .meta
                .append("bibliography", MetaValue::Str(name));
        }
        if let Some(first) = self.state.options.input_sources.first() {
            let bbl = first.with_extension("bbl");
            if bbl.exists() {
                self.splice_file(&bbl)?;
            }
        }
        Ok(())
    }
}

/// Search the colon-separated `TEXINPUTS` path (default `.`) for a file,
/// appending `default_ext` when the name has no extension. Absolute paths
/// are used directly.
fn resolve_include(file: &str, default_ext: &str) -> Option<PathBuf> {
    let mut name = file.to_string();
    if Path::new(&name).extension().is_none() && !default_ext.is_empty() {
        name.push('.');
        name.push_str(default_ext);
    }
    let direct = PathBuf::from(&name);
    if direct.is_absolute() {
        return direct.exists().then_some(direct);
    }
    let search = env::var("TEXINPUTS").unwrap_or_default();
    let dirs = if search.is_empty() { "." } else { &search };
    for dir in dirs.split(':').filter(|d| !d.is_empty()) {
        let candidate = Path::new(dir).join(&name);
        if candidate.exists() {
            return Some(candidate);
        }
    }
    None
}
