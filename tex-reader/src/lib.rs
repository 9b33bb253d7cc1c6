//! A LaTeX reader producing the universal document tree.
//!
//! The reader tokenizes LaTeX source, expands user-defined macros inline
//! during parsing, dispatches control sequences and environments to inline
//! and block builders, and finishes with post-parse rewrites (caption
//! attachment, header-level normalization). Recoverable problems are
//! collected as log messages; only macro loops, include cycles, and broken
//! table cells abort a parse.
//!
//! # Usage
//!
//! ```rust
//! use tex_reader::{LatexReader, ReaderOptions};
//!
//! let reader = LatexReader::new(ReaderOptions::default());
//! let outcome = reader.read("hello \\emph{world}").unwrap();
//! assert_eq!(outcome.document.blocks.len(), 1);
//! ```
//!
//! Hosts embedding raw LaTeX in another format use the re-entrant entry
//! points in [`raw_latex_block`], [`raw_latex_inline`], and
//! [`apply_macros`].
//!
//! # Features
//!
//! - `serde`: `ReaderOptions` and the document tree implement serde's
//!   traits.

mod accents;
mod block;
mod citations;
mod commands;
mod error;
mod figures;
mod include;
mod inline;
mod lexer;
mod macros;
mod meta;
mod options;
mod raw;
mod rewrite;
mod state;
mod stream;
mod table;
mod token;

use doc_tree::Document;

pub use error::{ErrorKind, LogKind, LogMessage, ParseError};
pub use lexer::tokenize;
pub use macros::{ArgSpec, Macro, MacroTable};
pub use options::{Extensions, ReaderOptions};
pub use raw::{apply_macros, inline_command, raw_latex_block, raw_latex_inline, MacroHost,
    RawContext};
pub use token::{SourcePos, Tok, TokKind};

use state::ParserState;
use stream::Parser;

/// The result of a successful parse: the document plus the recoverable
/// warnings collected along the way, in source order.
#[derive(Debug)]
pub struct ReadOutcome {
    pub document: Document,
    pub logs: Vec<LogMessage>,
}

/// The LaTeX reader. Construct once with options, call [`read`] per
/// document.
///
/// [`read`]: LatexReader::read
#[derive(Debug, Clone, Default)]
pub struct LatexReader {
    options: ReaderOptions,
}

impl LatexReader {
    pub fn new(options: ReaderOptions) -> Self {
        LatexReader { options }
    }

    /// Convert LaTeX source into a document tree. `\r\n` line endings are
    /// normalized before tokenization.
    pub fn read(&self, input: &str) -> Result<ReadOutcome, ParseError> {
        let text = input.replace("\r\n", "\n");
        let toks = lexer::tokenize(&text);
        let mut parser = Parser::new(toks, ParserState::new(self.options.clone()))?;
        let mut blocks = parser.document_blocks()?;
        rewrite::normalize_headers(&mut blocks);
        Ok(ReadOutcome {
            document: Document {
                meta: parser.state.meta,
                blocks,
            },
            logs: parser.state.logs,
        })
    }
}
