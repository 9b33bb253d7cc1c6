//! Re-entrant entry points for hosts that encounter raw LaTeX inside
//! another format. The host provides its reader options and macro table
//! through [`MacroHost`]; macros learned during the sub-parse are merged
//! back, and the host advances its input by the number of source
//! characters consumed.

use doc_tree::{Block, Inlines};

use crate::error::ParseError;
use crate::lexer::tokenize;
use crate::macros::MacroTable;
use crate::options::ReaderOptions;
use crate::state::ParserState;
use crate::stream::{PResult, Parser};

/// The capability set a host exposes to the raw-LaTeX entry points.
pub trait MacroHost {
    fn reader_options(&self) -> &ReaderOptions;
    fn macro_table(&self) -> &MacroTable;
    fn macro_table_mut(&mut self) -> &mut MacroTable;
}

/// A self-contained [`MacroHost`] for callers without their own state.
#[derive(Debug, Default)]
pub struct RawContext {
    pub options: ReaderOptions,
    pub macros: MacroTable,
}

impl RawContext {
    pub fn new(options: ReaderOptions) -> Self {
        RawContext {
            options,
            macros: MacroTable::default(),
        }
    }
}

impl MacroHost for RawContext {
    fn reader_options(&self) -> &ReaderOptions {
        &self.options
    }

    fn macro_table(&self) -> &MacroTable {
        &self.macros
    }

    fn macro_table_mut(&mut self) -> &mut MacroTable {
        &mut self.macros
    }
}

fn host_parser<H: MacroHost + ?Sized>(host: &H, input: &str) -> PResult<Parser> {
    let text = input.replace("\r\n", "\n");
    let mut state = ParserState::new(host.reader_options().clone());
    state.macros = host.macro_table().clone();
    Parser::new(tokenize(&text), state)
}

fn starts_with_command(input: &str) -> bool {
    let mut chars = input.chars();
    chars.next() == Some('\\') && chars.next().is_some_and(|c| c.is_alphabetic())
}

/// Parse one block of raw LaTeX (an environment, macro definition, or
/// block command) from the start of `input`. Returns the block and the
/// number of characters consumed, or `None` when the input does not start
/// one.
pub fn raw_latex_block<H: MacroHost + ?Sized>(
    host: &mut H,
    input: &str,
) -> Option<(Block, usize)> {
    if !starts_with_command(input) {
        return None;
    }
    let mut parser = host_parser(host, input).ok()?;
    let (blocks, raw) = parser
        .with_raw(|p| p.raw_block_candidate())
        .ok()?;
    if raw.is_empty() {
        return None;
    }
    *host.macro_table_mut() = parser.state.macros;
    let consumed = raw.chars().count();
    let block = blocks
        .into_iter()
        .next()
        .unwrap_or_else(|| Block::RawBlock("latex".into(), raw));
    Some((block, consumed))
}

/// Parse one inline of raw LaTeX from the start of `input`. Returns the
/// inlines and the number of characters consumed.
pub fn raw_latex_inline<H: MacroHost + ?Sized>(
    host: &mut H,
    input: &str,
) -> Option<(Inlines, usize)> {
    if !starts_with_command(input) && !input.starts_with('$') {
        return None;
    }
    let mut parser = host_parser(host, input).ok()?;
    let (inlines, raw) = parser
        .with_raw(|p| p.inline())
        .ok()?;
    let inlines = inlines?;
    if raw.is_empty() {
        return None;
    }
    *host.macro_table_mut() = parser.state.macros;
    let consumed = raw.chars().count();
    Some((inlines, consumed))
}

/// Parse a single inline command from the start of `input`, returning the
/// produced inlines.
pub fn inline_command<H: MacroHost + ?Sized>(
    host: &mut H,
    input: &str,
) -> Option<(Inlines, usize)> {
    if !starts_with_command(input) {
        return None;
    }
    raw_latex_inline(host, input)
}

/// Expand the host's macros in a string to fixpoint and re-emit it. With
/// the `latex_macros` extension off, the string is returned unchanged.
pub fn apply_macros<H: MacroHost + ?Sized>(
    host: &H,
    input: &str,
) -> Result<String, ParseError> {
    if !host.reader_options().extensions.latex_macros {
        return Ok(input.to_string());
    }
    let mut parser = host_parser(host, input)?;
    let mut out = String::new();
    while let Some(tok) = parser.next_tok()? {
        out.push_str(&tok.raw);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::Macro;

    fn context_with(name: &str, body: &str) -> RawContext {
        let mut context = RawContext::new(ReaderOptions::default());
        let body_toks = tokenize(body);
        context.macros.insert(
            name.to_string(),
            Macro::FixedArity {
                arity: 0,
                opt_default: None,
                body: body_toks,
            },
        );
        context
    }

    #[test]
    fn apply_macros_reaches_fixpoint() {
        let context = context_with("x", "a b");
        assert_eq!(apply_macros(&context, "(\\x) and (\\x)").unwrap(), "(a b) and (a b)");
        assert_eq!(apply_macros(&context, "plain").unwrap(), "plain");
    }

    #[test]
    fn apply_macros_disabled_is_identity() {
        let mut context = context_with("x", "a");
        context.options.extensions.latex_macros = false;
        assert_eq!(apply_macros(&context, "\\x").unwrap(), "\\x");
    }

    #[test]
    fn raw_block_learns_macros() {
        let mut context = RawContext::new(ReaderOptions::default());
        let input = "\\newcommand{\\q}{42} rest";
        let (block, consumed) = raw_latex_block(&mut context, input).unwrap();
        assert!(matches!(block, Block::RawBlock(_, _)));
        assert_eq!(&input[..consumed], "\\newcommand{\\q}{42}");
        assert!(context.macros.contains_key("q"));
    }

    #[test]
    fn raw_inline_consumes_exactly_the_command() {
        let mut context = RawContext::new(ReaderOptions::default());
        let input = "\\emph{hi} tail";
        let (inlines, consumed) = raw_latex_inline(&mut context, input).unwrap();
        assert_eq!(inlines.len(), 1);
        assert_eq!(&input[..consumed], "\\emph{hi}");
    }

    #[test]
    fn non_latex_input_is_rejected() {
        let mut context = RawContext::new(ReaderOptions::default());
        assert!(raw_latex_block(&mut context, "plain text").is_none());
        assert!(raw_latex_inline(&mut context, "plain").is_none());
    }
}
