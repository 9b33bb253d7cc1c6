use std::path::PathBuf;

use doc_tree::{Inlines, Meta};
use rustc_hash::FxHashSet;

use crate::error::{LogKind, LogMessage};
use crate::macros::MacroTable;
use crate::options::ReaderOptions;
use crate::token::SourcePos;

/// Quote nesting context for smart-quote parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteContext {
    #[default]
    None,
    InSingle,
    InDouble,
}

/// The threaded parser state.
///
/// Sub-parses (macro bodies, raw escape hatches, included files, table
/// cells) receive a clone; the caller decides what to merge back. Macros
/// learned in raw sub-parses are merged explicitly, everything else is
/// owned by the current parse.
#[derive(Debug, Clone)]
pub struct ParserState {
    pub options: ReaderOptions,
    pub macros: MacroTable,
    /// Registered heading anchors, used to uniquify generated identifiers.
    pub identifiers: FxHashSet<String>,
    /// Files currently being included, outermost first.
    pub include_stack: Vec<PathBuf>,
    pub logs: Vec<LogMessage>,
    pub meta: Meta,
    pub quote_context: QuoteContext,
    /// Suppresses macro expansion entirely while set.
    pub verbatim: bool,
    /// Set by `\caption{…}` and consumed by the figure/table rewriter.
    pub caption: Option<Inlines>,
    pub in_list_item: bool,
    pub in_table_cell: bool,
    /// Directories searched for image and include files, extended by
    /// `\graphicspath`.
    pub resource_path: Vec<PathBuf>,
}

impl ParserState {
    pub fn new(options: ReaderOptions) -> Self {
        ParserState {
            options,
            macros: MacroTable::default(),
            identifiers: FxHashSet::default(),
            include_stack: Vec::new(),
            logs: Vec::new(),
            meta: Meta::new(),
            quote_context: QuoteContext::None,
            verbatim: false,
            caption: None,
            in_list_item: false,
            in_table_cell: false,
            resource_path: vec![PathBuf::from(".")],
        }
    }

    pub fn log(&mut self, pos: SourcePos, kind: LogKind) {
        self.logs.push(LogMessage(pos, kind));
    }

    /// Register a heading anchor, appending `-1`, `-2`, … until it is
    /// unique within the document.
    pub fn register_identifier(&mut self, id: &str) -> String {
        if self.identifiers.insert(id.to_string()) {
            return id.to_string();
        }
        let mut n = 1u32;
        loop {
            let candidate = format!("{id}-{n}");
            if self.identifiers.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_uniquified() {
        let mut state = ParserState::new(ReaderOptions::default());
        assert_eq!(state.register_identifier("intro"), "intro");
        assert_eq!(state.register_identifier("intro"), "intro-1");
        assert_eq!(state.register_identifier("intro"), "intro-2");
        assert_eq!(state.register_identifier("other"), "other");
    }
}
