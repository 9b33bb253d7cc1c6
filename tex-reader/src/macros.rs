//! User-defined macros: the table entries, the expansion engine that
//! rewrites the head of the token stream, and the parsers for
//! `\newcommand`, `\newenvironment`, and `\def`.

use crate::error::{ErrorKind, LogKind};
use crate::stream::{PResult, Parser};
use crate::token::{SourcePos, Tok, TokKind};

/// Expansions nested deeper than this abort the parse with
/// [`ErrorKind::MacroLoop`].
const EXPANSION_LIMIT: u32 = 20;

/// The macro table threaded through the parser state.
pub type MacroTable = rustc_hash::FxHashMap<String, Macro>;

/// A macro definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Macro {
    /// `\newcommand`-style: a fixed number of arguments, the first
    /// optionally bracketed with a default.
    FixedArity {
        arity: u8,
        opt_default: Option<Vec<Tok>>,
        body: Vec<Tok>,
    },
    /// `\def`-style: an ordered sequence of argument specs.
    Pattern { spec: Vec<ArgSpec>, body: Vec<Tok> },
}

/// How one pattern argument consumes input.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgSpec {
    /// A braced group or a single token.
    Naked,
    /// A braced group.
    Braced,
    /// An optional `[...]` group; empty when absent.
    Bracketed,
    /// Tokens up to (and excluding) the given symbol.
    SymbolSuffixed(char),
    /// Tokens up to (and excluding) the given control sequence.
    CtrlSeqSuffixed(String),
}

/// A macro invocation found at the head of the stream: the table key, the
/// number of head tokens forming the invocation, and its source position.
struct Invocation {
    key: String,
    consume: usize,
    pos: SourcePos,
}

impl Parser {
    /// Expand macros at the head of the stream until the head is not a
    /// macro invocation. Does nothing in verbatim mode.
    pub(crate) fn expand_head(&mut self) -> PResult<()> {
        // Included files end with a synthesized boundary token that pops
        // the include stack.
        while self.peek().is_some_and(|t| t.is_ctrl(crate::include::END_OF_INCLUDE)) {
            self.pop_uncaptured();
            self.state.include_stack.pop();
        }
        if self.state.verbatim {
            return Ok(());
        }
        let mut depth = 0u32;
        while let Some(invocation) = self.invocation_at_head() {
            if depth >= EXPANSION_LIMIT {
                return Err(crate::error::ParseError(
                    invocation.pos,
                    ErrorKind::MacroLoop(invocation.key),
                ));
            }
            self.expand_invocation(invocation)?;
            depth += 1;
        }
        Ok(())
    }

    fn invocation_at_head(&self) -> Option<Invocation> {
        let head = self.peek()?;
        let name = head.ctrl_name()?;
        let pos = head.pos;
        if name == "begin" || name == "end" {
            let (env, consume) = self.env_name_at(1)?;
            let key = if name == "end" {
                format!("end{env}")
            } else {
                env
            };
            if self.state.macros.contains_key(&key) {
                return Some(Invocation { key, consume, pos });
            }
            return None;
        }
        if self.state.macros.contains_key(name) {
            return Some(Invocation {
                key: name.to_string(),
                consume: 1,
                pos,
            });
        }
        None
    }

    /// Read an environment name `{name}` starting at stream index `start`,
    /// skipping leading whitespace. Returns the name and the index just
    /// past the closing brace.
    pub(crate) fn env_name_at(&self, start: usize) -> Option<(String, usize)> {
        let mut i = start;
        while self.peek_at(i).is_some_and(Tok::is_whitespace) {
            i += 1;
        }
        if !self.peek_at(i)?.is_symbol('{') {
            return None;
        }
        i += 1;
        let mut name = String::new();
        loop {
            let tok = self.peek_at(i)?;
            if tok.is_symbol('}') {
                return Some((name, i + 1));
            }
            match tok.kind {
                TokKind::Word | TokKind::Symbol => name.push_str(&tok.raw),
                _ => return None,
            }
            i += 1;
        }
    }

    fn expand_invocation(&mut self, invocation: Invocation) -> PResult<()> {
        for _ in 0..invocation.consume {
            self.pop_raw();
        }
        let Some(mac) = self.state.macros.get(&invocation.key).cloned() else {
            return Ok(());
        };
        let (args, body) = match mac {
            Macro::FixedArity {
                arity,
                opt_default,
                body,
            } => {
                let mut args: Vec<Vec<Tok>> = Vec::with_capacity(arity as usize);
                let mut remaining = arity;
                if let Some(default) = opt_default {
                    if remaining > 0 {
                        self.skip_whitespace_raw();
                        args.push(self.bracketed()?.unwrap_or(default));
                        remaining -= 1;
                    }
                }
                for _ in 0..remaining {
                    args.push(self.group_or_token()?);
                }
                (args, body)
            }
            Macro::Pattern { spec, body } => {
                let mut args = Vec::with_capacity(spec.len());
                for arg_spec in &spec {
                    args.push(self.consume_pattern_arg(arg_spec)?);
                }
                (args, body)
            }
        };
        let expansion = substitute(&body, &args, invocation.pos);
        self.splice_synthetic(expansion);
        Ok(())
    }

    fn consume_pattern_arg(&mut self, spec: &ArgSpec) -> PResult<Vec<Tok>> {
        match spec {
            ArgSpec::Naked | ArgSpec::Braced => self.group_or_token(),
            ArgSpec::Bracketed => {
                self.skip_whitespace_raw();
                Ok(self.bracketed()?.unwrap_or_default())
            }
            ArgSpec::SymbolSuffixed(c) => {
                let mut toks = Vec::new();
                loop {
                    match self.peek() {
                        Some(tok) if tok.is_symbol(*c) => {
                            self.pop_raw();
                            break;
                        }
                        Some(_) => {
                            if let Some(tok) = self.pop_raw() {
                                toks.push(tok);
                            }
                        }
                        None => break,
                    }
                }
                Ok(toks)
            }
            ArgSpec::CtrlSeqSuffixed(name) => {
                let mut toks = Vec::new();
                loop {
                    match self.peek() {
                        Some(tok) if tok.is_ctrl(name) => {
                            self.pop_raw();
                            break;
                        }
                        Some(_) => {
                            if let Some(tok) = self.pop_raw() {
                                toks.push(tok);
                            }
                        }
                        None => break,
                    }
                }
                Ok(toks)
            }
        }
    }
}

/// Replace `Arg(i)` placeholders in `body` with the collected arguments.
/// Every emitted token carries the invocation-site position, so errors
/// point at the call, not the macro body.
fn substitute(body: &[Tok], args: &[Vec<Tok>], pos: SourcePos) -> Vec<Tok> {
    let mut out = Vec::with_capacity(body.len());
    for tok in body {
        match tok.kind {
            TokKind::Arg(n) => {
                if let Some(arg) = args.get(n.wrapping_sub(1) as usize) {
                    out.extend(arg.iter().map(|t| Tok { pos, ..t.clone() }));
                }
            }
            _ => out.push(Tok {
                pos,
                ..tok.clone()
            }),
        }
    }
    out
}

/// Names that start a macro or environment definition.
pub(crate) fn is_macro_def_command(name: &str) -> bool {
    matches!(
        name,
        "newcommand"
            | "renewcommand"
            | "providecommand"
            | "newenvironment"
            | "renewenvironment"
            | "provideenvironment"
            | "def"
    )
}

impl Parser {
    /// Parse a macro or environment definition if the head is one.
    /// Definitions are parsed even when the `latex_macros` extension is
    /// off; they are only installed when it is on.
    pub(crate) fn macro_def(&mut self) -> PResult<bool> {
        let Some(name) = self.peek().and_then(|t| t.ctrl_name()).map(String::from) else {
            return Ok(false);
        };
        match name.as_str() {
            "newcommand" | "renewcommand" | "providecommand" => {
                self.pop_raw();
                self.command_def(&name)?;
            }
            "newenvironment" | "renewenvironment" | "provideenvironment" => {
                self.pop_raw();
                self.environment_def(&name)?;
            }
            "def" => {
                self.pop_raw();
                self.pattern_def()?;
            }
            _ => return Ok(false),
        }
        self.expand_head()?;
        Ok(true)
    }

    fn command_def(&mut self, variant: &str) -> PResult<()> {
        self.skip_whitespace_raw();
        if self.peek().is_some_and(|t| t.is_symbol('*')) {
            self.pop_raw();
        }
        self.skip_whitespace_raw();
        let Some(name) = self.defined_name() else {
            return Ok(());
        };
        let arity = self.optional_arity()?;
        self.skip_whitespace_raw();
        let opt_default = if arity > 0 { self.bracketed()? } else { None };
        let body = self.group_or_token()?;
        self.install(
            name,
            Macro::FixedArity {
                arity,
                opt_default,
                body,
            },
            variant,
        );
        Ok(())
    }

    fn environment_def(&mut self, variant: &str) -> PResult<()> {
        self.skip_whitespace_raw();
        if self.peek().is_some_and(|t| t.is_symbol('*')) {
            self.pop_raw();
        }
        self.skip_whitespace_raw();
        if !self.at_bgroup() {
            return Ok(());
        }
        let name_toks = self.braced()?;
        let name: String = name_toks.iter().map(|t| t.raw.as_str()).collect();
        let name = name.trim().to_string();
        let arity = self.optional_arity()?;
        self.skip_whitespace_raw();
        let opt_default = if arity > 0 { self.bracketed()? } else { None };
        let begin_body = self.group_or_token()?;
        self.skip_whitespace_raw();
        let end_body = if self.at_bgroup() {
            self.braced()?
        } else {
            Vec::new()
        };
        self.install(
            name.clone(),
            Macro::FixedArity {
                arity,
                opt_default,
                body: begin_body,
            },
            variant,
        );
        self.install(
            format!("end{name}"),
            Macro::FixedArity {
                arity: 0,
                opt_default: None,
                body: end_body,
            },
            variant,
        );
        Ok(())
    }

    fn pattern_def(&mut self) -> PResult<()> {
        self.skip_whitespace_raw();
        let Some(name) = self.defined_name() else {
            return Ok(());
        };
        // Everything up to the body group is the argument pattern.
        let mut spec: Vec<ArgSpec> = Vec::new();
        let mut last_was_arg = false;
        while let Some(head) = self.peek() {
            if head.is_symbol('{') {
                break;
            }
            let Some(tok) = self.pop_raw() else {
                break;
            };
            match tok.kind {
                TokKind::Arg(_) => {
                    spec.push(ArgSpec::Naked);
                    last_was_arg = true;
                }
                TokKind::Symbol if last_was_arg => {
                    if let Some(c) = tok.symbol_char() {
                        if let Some(last) = spec.last_mut() {
                            *last = ArgSpec::SymbolSuffixed(c);
                        }
                    }
                    last_was_arg = false;
                }
                TokKind::CtrlSeq(ref delim) if last_was_arg => {
                    if let Some(last) = spec.last_mut() {
                        *last = ArgSpec::CtrlSeqSuffixed(delim.clone());
                    }
                    last_was_arg = false;
                }
                _ => last_was_arg = false,
            }
        }
        let body = if self.at_bgroup() {
            self.braced()?
        } else {
            Vec::new()
        };
        // `\def` always (re)defines.
        if self.state.options.extensions.latex_macros {
            self.state.macros.insert(name, Macro::Pattern { spec, body });
        }
        Ok(())
    }

    /// The name being defined: either a control-sequence token or a braced
    /// group containing one.
    fn defined_name(&mut self) -> Option<String> {
        if self.at_bgroup() {
            let inner = self.braced().ok()?;
            return inner.iter().find_map(|t| t.ctrl_name().map(String::from));
        }
        let head = self.peek()?;
        let name = head.ctrl_name()?.to_string();
        self.pop_raw();
        Some(name)
    }

    fn optional_arity(&mut self) -> PResult<u8> {
        self.skip_whitespace_raw();
        let Some(inner) = self.bracketed()? else {
            return Ok(0);
        };
        let text: String = inner.iter().map(|t| t.raw.as_str()).collect();
        Ok(text.trim().parse().unwrap_or(0))
    }

    fn install(&mut self, name: String, mac: Macro, variant: &str) {
        if !self.state.options.extensions.latex_macros {
            return;
        }
        let exists = self.state.macros.contains_key(&name);
        match variant {
            "newcommand" | "newenvironment" if exists => {
                let pos = self.pos;
                self.state.log(pos, LogKind::MacroAlreadyDefined(name));
            }
            "providecommand" | "provideenvironment" if exists => {}
            _ => {
                self.state.macros.insert(name, mac);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::options::ReaderOptions;
    use crate::state::ParserState;

    fn parser(input: &str) -> Parser {
        Parser::new(tokenize(input), ParserState::new(ReaderOptions::default())).unwrap()
    }

    /// Drain the stream through the expanding path and collect raw text.
    fn drain(p: &mut Parser) -> String {
        let mut out = String::new();
        loop {
            match p.next_tok() {
                Ok(Some(tok)) => out.push_str(&tok.raw),
                Ok(None) => break,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        out
    }

    #[test]
    fn fixed_arity_expansion() {
        let mut p = parser("\\newcommand{\\x}[1]{**#1**}\\x{hi}");
        assert!(p.macro_def().unwrap());
        assert_eq!(drain(&mut p), "**hi**");
    }

    #[test]
    fn optional_default_argument() {
        let mut p = parser("\\newcommand{\\x}[2][def]{#1-#2}\\x{a} \\x[b]{c}");
        assert!(p.macro_def().unwrap());
        assert_eq!(drain(&mut p), "def-a b-c");
    }

    #[test]
    fn pattern_def_with_delimiter() {
        let mut p = parser("\\def\\greet#1{Hi #1!}\\greet{world}");
        assert!(p.macro_def().unwrap());
        assert_eq!(drain(&mut p), "Hi world!");
    }

    #[test]
    fn environment_macro_expands_at_begin_end() {
        let mut p = parser("\\newenvironment{shout}{<<}{>>}\\begin{shout}x\\end{shout}");
        assert!(p.macro_def().unwrap());
        assert_eq!(drain(&mut p), "<<x>>");
    }

    #[test]
    fn recursive_macro_reports_loop() {
        // The definition's trailing expansion already hits the loop.
        let mut p = parser("\\newcommand{\\a}{\\a}\\a");
        let err = p.macro_def().unwrap_err();
        assert_eq!(err.1, ErrorKind::MacroLoop("a".into()));
    }

    #[test]
    fn newcommand_over_existing_logs_and_keeps_old() {
        let mut p = parser("\\newcommand{\\x}{1}\\newcommand{\\x}{2}\\x");
        assert!(p.macro_def().unwrap());
        assert!(p.macro_def().unwrap());
        assert_eq!(p.state.logs.len(), 1);
        assert_eq!(drain(&mut p), "1");
    }

    #[test]
    fn definitions_not_installed_when_extension_off() {
        let mut options = ReaderOptions::default();
        options.extensions.latex_macros = false;
        let mut p = Parser::new(
            tokenize("\\newcommand{\\x}{1}\\x"),
            ParserState::new(options),
        )
        .unwrap();
        assert!(p.macro_def().unwrap());
        assert!(p.state.macros.is_empty());
        assert_eq!(drain(&mut p), "\\x");
    }

    #[test]
    fn expansion_with_empty_table_is_identity() {
        let input = "a \\emph{b} c";
        let mut p = parser(input);
        assert_eq!(drain(&mut p), input);
    }
}
