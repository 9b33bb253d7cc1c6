//! The token stream the parser consumes, with the primitives built on it:
//! pushback splicing, look-ahead, balanced-group readers, raw capture.
//!
//! Consumption has two levels. [`Parser::pop_raw`] takes the head token as
//! is; [`Parser::next_tok`] additionally runs macro expansion on the new
//! head, which is the normal path. Group and argument collection stays on
//! the raw level so that tokens inside a `{...}` argument are expanded only
//! when they later reach the head of the stream.

use std::collections::VecDeque;

use crate::error::{ErrorKind, LogKind, ParseError};
use crate::state::ParserState;
use crate::token::{SourcePos, Tok};

pub(crate) type PResult<T> = Result<T, ParseError>;

pub(crate) struct Parser {
    toks: VecDeque<Tok>,
    pub(crate) state: ParserState,
    captures: Vec<String>,
    /// How many tokens at the head of the queue were synthesized by macro
    /// expansion. Synthesized tokens are not recorded in raw captures, so
    /// a capture reproduces the source text that was consumed.
    synthetic: usize,
    /// Position of the most recently consumed token.
    pub(crate) pos: SourcePos,
}

impl Parser {
    pub(crate) fn new(toks: Vec<Tok>, state: ParserState) -> PResult<Self> {
        let mut parser = Parser {
            toks: toks.into(),
            state,
            captures: Vec::new(),
            synthetic: 0,
            pos: SourcePos::START,
        };
        parser.expand_head()?;
        Ok(parser)
    }

    pub(crate) fn peek(&self) -> Option<&Tok> {
        self.toks.front()
    }

    pub(crate) fn peek_at(&self, n: usize) -> Option<&Tok> {
        self.toks.get(n)
    }

    pub(crate) fn at_end(&self) -> bool {
        self.toks.is_empty()
    }

    /// Number of tokens left; used to check that a parse made progress.
    pub(crate) fn len(&self) -> usize {
        self.toks.len()
    }

    /// The position of the head token, or of the last consumed token once
    /// the stream is exhausted.
    pub(crate) fn here(&self) -> SourcePos {
        self.peek().map(|t| t.pos).unwrap_or(self.pos)
    }

    pub(crate) fn error(&self, kind: ErrorKind) -> ParseError {
        ParseError(self.here(), kind)
    }

    pub(crate) fn log_here(&mut self, kind: LogKind) {
        let pos = self.here();
        self.state.log(pos, kind);
    }

    /// Take the head token without expanding the next one.
    pub(crate) fn pop_raw(&mut self) -> Option<Tok> {
        let tok = self.toks.pop_front()?;
        self.pos = tok.pos;
        if self.synthetic > 0 {
            self.synthetic -= 1;
        } else {
            for buf in self.captures.iter_mut() {
                buf.push_str(&tok.raw);
            }
        }
        Some(tok)
    }

    /// Take the head token without recording it anywhere.
    pub(crate) fn pop_uncaptured(&mut self) -> Option<Tok> {
        let tok = self.toks.pop_front()?;
        self.pos = tok.pos;
        self.synthetic = self.synthetic.saturating_sub(1);
        Some(tok)
    }

    /// Take the head token, then expand macros at the new head.
    pub(crate) fn next_tok(&mut self) -> PResult<Option<Tok>> {
        match self.pop_raw() {
            Some(tok) => {
                self.expand_head()?;
                Ok(Some(tok))
            }
            None => Ok(None),
        }
    }

    /// Consume the head token if it satisfies `pred`.
    pub(crate) fn eat_if(&mut self, pred: impl FnOnce(&Tok) -> bool) -> PResult<Option<Tok>> {
        if self.peek().is_some_and(|t| pred(t)) {
            self.next_tok()
        } else {
            Ok(None)
        }
    }

    pub(crate) fn eat_symbol(&mut self, c: char) -> PResult<bool> {
        Ok(self.eat_if(|t| t.is_symbol(c))?.is_some())
    }

    pub(crate) fn eat_ctrl(&mut self, name: &str) -> PResult<bool> {
        Ok(self.eat_if(|t| t.is_ctrl(name))?.is_some())
    }

    /// Skip spaces, newlines, and comments.
    pub(crate) fn skip_whitespace(&mut self) -> PResult<()> {
        while self.eat_if(Tok::is_whitespace)?.is_some() {}
        Ok(())
    }

    /// Skip whitespace without triggering expansion; used while collecting
    /// macro arguments.
    pub(crate) fn skip_whitespace_raw(&mut self) {
        while self.peek().is_some_and(Tok::is_whitespace) {
            self.pop_raw();
        }
    }

    /// Prepend tokens to the stream, ahead of everything queued.
    pub(crate) fn splice_front(&mut self, toks: Vec<Tok>) {
        for tok in toks.into_iter().rev() {
            self.toks.push_front(tok);
        }
    }

    /// Prepend tokens that did not come from the source, marking them so
    /// raw captures skip them.
    pub(crate) fn splice_synthetic(&mut self, toks: Vec<Tok>) {
        self.synthetic += toks.len();
        self.splice_front(toks);
    }

    pub(crate) fn at_bgroup(&self) -> bool {
        self.peek().is_some_and(|t| {
            t.is_symbol('{') || t.is_ctrl("bgroup") || t.is_ctrl("begingroup")
        })
    }

    pub(crate) fn at_egroup(&self) -> bool {
        self.peek().is_some_and(|t| {
            t.is_symbol('}') || t.is_ctrl("egroup") || t.is_ctrl("endgroup")
        })
    }

    /// Read a balanced `{...}` group, returning the inner tokens without
    /// expanding them. The head must be a group opener. A missing closing
    /// brace is logged and tolerated.
    pub(crate) fn braced(&mut self) -> PResult<Vec<Tok>> {
        debug_assert!(self.at_bgroup());
        self.pop_raw();
        let mut inner = Vec::new();
        let mut depth = 1usize;
        loop {
            let Some(head) = self.peek() else {
                self.log_here(LogKind::UnexpectedEndOfDocument("group".into()));
                break;
            };
            if head.is_symbol('{') || head.is_ctrl("bgroup") || head.is_ctrl("begingroup") {
                depth += 1;
            } else if head.is_symbol('}') || head.is_ctrl("egroup") || head.is_ctrl("endgroup") {
                depth -= 1;
                if depth == 0 {
                    self.pop_raw();
                    break;
                }
            }
            if let Some(tok) = self.pop_raw() {
                inner.push(tok);
            }
        }
        self.expand_head()?;
        Ok(inner)
    }

    /// Read a balanced `[...]` group if the head opens one. Brace groups
    /// inside are kept intact, so a `]` inside braces does not close the
    /// bracket.
    pub(crate) fn bracketed(&mut self) -> PResult<Option<Vec<Tok>>> {
        if !self.peek().is_some_and(|t| t.is_symbol('[')) {
            return Ok(None);
        }
        self.pop_raw();
        let mut inner = Vec::new();
        let mut brackets = 1usize;
        let mut braces = 0usize;
        loop {
            let Some(head) = self.peek() else {
                self.log_here(LogKind::UnexpectedEndOfDocument("bracket".into()));
                break;
            };
            if head.is_symbol('{') {
                braces += 1;
            } else if head.is_symbol('}') {
                braces = braces.saturating_sub(1);
            } else if braces == 0 && head.is_symbol('[') {
                brackets += 1;
            } else if braces == 0 && head.is_symbol(']') {
                brackets -= 1;
                if brackets == 0 {
                    self.pop_raw();
                    break;
                }
            }
            if let Some(tok) = self.pop_raw() {
                inner.push(tok);
            }
        }
        self.expand_head()?;
        Ok(Some(inner))
    }

    /// A braced group or, failing that, a single token. Skips leading
    /// whitespace. This is how undelimited command and macro arguments are
    /// consumed.
    pub(crate) fn group_or_token(&mut self) -> PResult<Vec<Tok>> {
        self.skip_whitespace_raw();
        if self.at_bgroup() {
            self.braced()
        } else {
            Ok(self.pop_raw().into_iter().collect())
        }
    }

    /// Run `f`, also returning the literal text of every token it consumed.
    pub(crate) fn with_raw<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> PResult<T>,
    ) -> PResult<(T, String)> {
        self.captures.push(String::new());
        let result = f(self);
        let raw = self.captures.pop().unwrap_or_default();
        Ok((result?, raw))
    }

    /// Capture the stream and state so a speculative parse can be undone.
    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot {
            toks: self.toks.clone(),
            state: self.state.clone(),
            synthetic: self.synthetic,
            pos: self.pos,
        }
    }

    pub(crate) fn restore(&mut self, snapshot: Snapshot) {
        self.toks = snapshot.toks;
        self.state = snapshot.state;
        self.synthetic = snapshot.synthetic;
        self.pos = snapshot.pos;
    }
}

pub(crate) struct Snapshot {
    toks: VecDeque<Tok>,
    state: ParserState,
    synthetic: usize,
    pos: SourcePos,
}

/// Split a token slice on a top-level symbol, respecting brace nesting.
pub(crate) fn split_on_symbol(toks: &[Tok], sep: char) -> Vec<Vec<Tok>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    let mut depth = 0usize;
    for tok in toks {
        if tok.is_symbol('{') {
            depth += 1;
        } else if tok.is_symbol('}') {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && tok.is_symbol(sep) {
            out.push(std::mem::take(&mut current));
            continue;
        }
        current.push(tok.clone());
    }
    out.push(current);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::options::ReaderOptions;

    fn parser(input: &str) -> Parser {
        Parser::new(tokenize(input), ParserState::new(ReaderOptions::default())).unwrap()
    }

    #[test]
    fn braced_returns_inner_tokens() {
        let mut p = parser("{a {b} c}d");
        let inner = p.braced().unwrap();
        let text: String = inner.iter().map(|t| t.raw.as_str()).collect();
        assert_eq!(text, "a {b} c");
        assert!(p.peek().unwrap().is_word("d"));
    }

    #[test]
    fn braced_tolerates_missing_close() {
        let mut p = parser("{a b");
        let inner = p.braced().unwrap();
        assert_eq!(inner.len(), 3);
        assert_eq!(p.state.logs.len(), 1);
    }

    #[test]
    fn bgroup_ctrl_matches() {
        let mut p = parser("\\bgroup x\\egroup y");
        assert!(p.at_bgroup());
        let inner = p.braced().unwrap();
        assert!(inner.iter().any(|t| t.is_word("x")));
        p.skip_whitespace().unwrap();
        assert!(p.peek().unwrap().is_word("y"));
    }

    #[test]
    fn bracketed_keeps_brace_content() {
        let mut p = parser("[a{]}b]c");
        let inner = p.bracketed().unwrap().unwrap();
        let text: String = inner.iter().map(|t| t.raw.as_str()).collect();
        assert_eq!(text, "a{]}b");
        assert!(p.peek().unwrap().is_word("c"));
    }

    #[test]
    fn with_raw_captures_consumed_text() {
        let mut p = parser("one two three");
        let (_, raw) = p
            .with_raw(|p| {
                p.next_tok()?;
                p.next_tok()?;
                p.next_tok()
            })
            .unwrap();
        assert_eq!(raw, "one two");
    }
}
