//! The inline engine: dispatches words, symbols, and control sequences to
//! inline builders. Quotes, dashes, math delimiters, accents, and verbatim
//! spans live here; citations have their own module.

use doc_tree::{Attr, Inline, Inlines, MathKind, QuoteKind, Target};

use crate::accents::{accented, is_accent_command};
use crate::citations::is_cite_command;
use crate::commands::{
    is_math_env, lookup_block_command, lookup_inline_command, InlineCmd, Style,
};
use crate::error::LogKind;
use crate::include::is_include_command;
use crate::macros::is_macro_def_command;
use crate::state::QuoteContext;
use crate::stream::{split_on_symbol, PResult, Parser};
use crate::token::{Tok, TokKind};

impl Parser {
    /// Parse inlines until a block-level boundary. Adjacent strings merge,
    /// so dashes, escapes, and accented fragments join their word.
    pub(crate) fn inlines(&mut self) -> PResult<Inlines> {
        let mut out = Vec::new();
        while let Some(mut inlines) = self.inline()? {
            out.append(&mut inlines);
        }
        Ok(merge_strs(out))
    }

    /// Parse one inline item. `Ok(None)` marks a block boundary: end of
    /// input, a blank line, a closing group, or a block-level command.
    pub(crate) fn inline(&mut self) -> PResult<Option<Inlines>> {
        let Some(head) = self.peek() else {
            return Ok(None);
        };
        let head = head.clone();
        match &head.kind {
            TokKind::Word => {
                self.next_tok()?;
                if head.raw == "$$" {
                    return self.display_math_dollars().map(Some);
                }
                Ok(Some(vec![Inline::Str(head.raw)]))
            }
            TokKind::Spaces => {
                self.next_tok()?;
                Ok(Some(vec![Inline::Space]))
            }
            TokKind::Newline => {
                if self.blank_line_ahead() {
                    return Ok(None);
                }
                self.next_tok()?;
                Ok(Some(vec![Inline::SoftBreak]))
            }
            TokKind::Comment => {
                self.next_tok()?;
                Ok(Some(Vec::new()))
            }
            TokKind::Esc1 | TokKind::Esc2 => {
                self.next_tok()?;
                let c = head.decode_escape();
                Ok(Some(vec![Inline::Str(
                    c.map(String::from).unwrap_or(head.raw),
                )]))
            }
            TokKind::Arg(_) => {
                self.next_tok()?;
                self.state.log(head.pos, LogKind::ParsingUnescaped('#'));
                Ok(Some(vec![Inline::Str(head.raw)]))
            }
            TokKind::Symbol => self.symbol_inline(&head),
            TokKind::CtrlSeq(name) => self.inline_command(&name.clone()),
        }
    }

    fn symbol_inline(&mut self, head: &Tok) -> PResult<Option<Inlines>> {
        let Some(c) = head.symbol_char() else {
            self.next_tok()?;
            return Ok(Some(Vec::new()));
        };
        match c {
            '{' => self.group_inlines().map(Some),
            '}' => Ok(None),
            '&' => {
                if self.state.in_table_cell {
                    return Ok(None);
                }
                self.next_tok()?;
                self.state.log(head.pos, LogKind::ParsingUnescaped('&'));
                Ok(Some(Vec::new()))
            }
            '$' => self.inline_math_dollar().map(Some),
            '-' => self.dashes().map(Some),
            '~' => {
                self.next_tok()?;
                Ok(Some(vec![Inline::Str("\u{a0}".into())]))
            }
            '`' | '\'' | '"' | '\u{2018}' | '\u{2019}' | '\u{201c}' | '\u{201d}' => {
                self.quote_inline(c).map(Some)
            }
            '|' if self.state.options.extensions.literate_haskell => {
                self.next_tok()?;
                let text = self.raw_until_symbol('|');
                self.expand_head()?;
                Ok(Some(vec![Inline::Code(Attr::empty(), text)]))
            }
            '^' | '_' => {
                self.next_tok()?;
                self.state.log(head.pos, LogKind::ParsingUnescaped(c));
                Ok(Some(vec![Inline::Str(head.raw.clone())]))
            }
            _ => {
                self.next_tok()?;
                Ok(Some(vec![Inline::Str(head.raw.clone())]))
            }
        }
    }

    /// Is the head newline followed by a blank line?
    fn blank_line_ahead(&self) -> bool {
        let mut i = 1;
        loop {
            match self.peek_at(i) {
                Some(t) if matches!(t.kind, TokKind::Spaces | TokKind::Comment) => i += 1,
                Some(t) if t.kind == TokKind::Newline => return true,
                _ => return false,
            }
        }
    }

    /// Parse the content of a `{...}` group as inlines, consuming both
    /// braces. Nested groups flatten into the surrounding list, which makes
    /// doubled braces transparent.
    pub(crate) fn group_inlines(&mut self) -> PResult<Inlines> {
        self.next_tok()?;
        let mut out = Vec::new();
        loop {
            if self.at_egroup() {
                self.next_tok()?;
                break;
            }
            match self.inline()? {
                Some(mut inlines) => out.append(&mut inlines),
                None => {
                    if self.at_end() {
                        self.log_here(LogKind::UnexpectedEndOfDocument("group".into()));
                        break;
                    }
                    if self.peek().is_some_and(Tok::is_whitespace) {
                        self.skip_whitespace()?;
                        continue;
                    }
                    if self.macro_def()? {
                        continue;
                    }
                    // A block-level token inside an inline group; drop it
                    // so the group still terminates.
                    if let Some(tok) = self.pop_raw() {
                        self.state.log(tok.pos, LogKind::SkippedContent(tok.raw));
                    }
                    self.expand_head()?;
                }
            }
        }
        Ok(merge_strs(out))
    }

    /// A command argument: a group, or a single character of a word, or a
    /// single inline item.
    pub(crate) fn tok_arg(&mut self) -> PResult<Inlines> {
        self.skip_whitespace()?;
        if self.at_bgroup() {
            return self.group_inlines();
        }
        match self.peek().map(|t| t.kind.clone()) {
            Some(TokKind::Word) => {
                let Some(tok) = self.next_tok()? else {
                    return Ok(Vec::new());
                };
                let mut chars = tok.raw.chars();
                let first = chars.next().unwrap_or_default();
                let rest: String = chars.collect();
                if !rest.is_empty() {
                    // The whole word was already captured when popped.
                    self.splice_synthetic(vec![Tok::new(tok.pos, TokKind::Word, rest)]);
                }
                Ok(vec![Inline::Str(first.to_string())])
            }
            Some(_) => Ok(self.inline()?.unwrap_or_default()),
            None => Ok(Vec::new()),
        }
    }

    /// Parse collected tokens as inlines in a sub-parse; state flows back.
    pub(crate) fn sub_inlines(&mut self, toks: Vec<Tok>) -> PResult<Inlines> {
        let state = self.state.clone();
        let mut sub = Parser::new(toks, state)?;
        let result = sub.inlines()?;
        self.state = sub.state;
        Ok(result)
    }

    pub(crate) fn opt_arg_inlines(&mut self) -> PResult<Option<Inlines>> {
        match self.bracketed()? {
            Some(toks) => Ok(Some(self.sub_inlines(toks)?)),
            None => Ok(None),
        }
    }

    /// Concatenate raw text of tokens up to (and consuming) the given
    /// symbol, without expansion.
    fn raw_until_symbol(&mut self, close: char) -> String {
        let mut text = String::new();
        loop {
            match self.peek() {
                None => {
                    self.log_here(LogKind::UnexpectedEndOfDocument("verbatim".into()));
                    break;
                }
                Some(t) if t.is_symbol(close) => {
                    self.pop_raw();
                    break;
                }
                _ => {
                    if let Some(tok) = self.pop_raw() {
                        text.push_str(&tok.raw);
                    }
                }
            }
        }
        text
    }

    fn dashes(&mut self) -> PResult<Inlines> {
        self.next_tok()?;
        let mut count = 1;
        while count < 3 && self.peek().is_some_and(|t| t.is_symbol('-')) {
            self.next_tok()?;
            count += 1;
        }
        let text = match count {
            3 => "\u{2014}",
            2 => "\u{2013}",
            _ => "-",
        };
        Ok(vec![Inline::Str(text.into())])
    }

    fn inline_math_dollar(&mut self) -> PResult<Inlines> {
        self.next_tok()?;
        let mut text = String::new();
        loop {
            match self.peek() {
                None => {
                    self.log_here(LogKind::UnexpectedEndOfDocument("math".into()));
                    break;
                }
                Some(t) if t.is_symbol('$') => {
                    self.next_tok()?;
                    break;
                }
                _ => {
                    if let Some(tok) = self.next_tok()? {
                        text.push_str(&tok.raw);
                    }
                }
            }
        }
        Ok(vec![Inline::Math(MathKind::Inline, text.trim().into())])
    }

    fn display_math_dollars(&mut self) -> PResult<Inlines> {
        // The opening `$$` word is already consumed.
        let mut text = String::new();
        loop {
            match self.peek() {
                None => {
                    self.log_here(LogKind::UnexpectedEndOfDocument("math".into()));
                    break;
                }
                Some(t) if t.is_word("$$") => {
                    self.next_tok()?;
                    break;
                }
                _ => {
                    if let Some(tok) = self.next_tok()? {
                        text.push_str(&tok.raw);
                    }
                }
            }
        }
        Ok(vec![Inline::Math(MathKind::Display, text.trim().into())])
    }

    /// `\(...\)` or `\[...\]`; `close` is the control-sequence name that
    /// ends the span.
    fn math_until_ctrl(&mut self, close: &str, kind: MathKind) -> PResult<Inlines> {
        self.next_tok()?;
        let mut text = String::new();
        loop {
            match self.peek() {
                None => {
                    self.log_here(LogKind::UnexpectedEndOfDocument("math".into()));
                    break;
                }
                Some(t) if t.is_ctrl(close) => {
                    self.next_tok()?;
                    break;
                }
                _ => {
                    if let Some(tok) = self.next_tok()? {
                        text.push_str(&tok.raw);
                    }
                }
            }
        }
        Ok(vec![Inline::Math(kind, text.trim().into())])
    }

    /// A display-math environment encountered in inline position.
    fn math_environment(&mut self) -> PResult<Inlines> {
        let Some((env, consume)) = self.env_name_at(1) else {
            self.next_tok()?;
            return Ok(Vec::new());
        };
        for _ in 0..consume {
            self.pop_raw();
        }
        let inner = self.capture_env_raw(&env);
        self.expand_head()?;
        let bare = matches!(
            env.as_str(),
            "displaymath" | "equation" | "equation*" | "math"
        );
        let content = if bare {
            inner.trim().to_string()
        } else {
            format!("\\begin{{{env}}}{inner}\\end{{{env}}}")
        };
        Ok(vec![Inline::Math(MathKind::Display, content)])
    }

    fn quote_inline(&mut self, c: char) -> PResult<Inlines> {
        if !self.state.options.extensions.smart {
            self.next_tok()?;
            return Ok(vec![Inline::Str(c.to_string())]);
        }
        match c {
            '`' => {
                if self.peek_at(1).is_some_and(|t| t.is_symbol('`')) {
                    self.quoted(QuoteKind::Double, 2)
                } else {
                    self.quoted(QuoteKind::Single, 1)
                }
            }
            '\u{201c}' => self.quoted(QuoteKind::Double, 1),
            '"' => self.quoted(QuoteKind::Double, 1),
            '\u{2018}' => self.quoted(QuoteKind::Single, 1),
            '\'' | '\u{2019}' => {
                self.next_tok()?;
                Ok(vec![Inline::Str("\u{2019}".into())])
            }
            _ => {
                // A stray closing mark.
                self.next_tok()?;
                Ok(vec![Inline::Str(c.to_string())])
            }
        }
    }

    /// Parse a quotation after its opening marker. If no closing marker is
    /// found before a block boundary, the attempt is undone and the marker
    /// stands as literal text.
    fn quoted(&mut self, kind: QuoteKind, open_len: usize) -> PResult<Inlines> {
        let snapshot = self.snapshot();
        let mut open_raw = String::new();
        for _ in 0..open_len {
            if let Some(tok) = self.next_tok()? {
                open_raw.push_str(tok.raw.trim_end());
            }
        }
        let saved_context = self.state.quote_context;
        self.state.quote_context = match kind {
            QuoteKind::Double => QuoteContext::InDouble,
            QuoteKind::Single => QuoteContext::InSingle,
        };
        let mut inner = Vec::new();
        loop {
            if self.quote_close(kind)? {
                self.state.quote_context = saved_context;
                return Ok(vec![Inline::Quoted(kind, merge_strs(inner))]);
            }
            match self.inline()? {
                Some(mut inlines) => inner.append(&mut inlines),
                None => break,
            }
        }
        self.restore(snapshot);
        for _ in 0..open_len {
            self.next_tok()?;
        }
        Ok(vec![Inline::Str(open_raw)])
    }

    /// Consume a closing quote marker if one is at the head.
    fn quote_close(&mut self, kind: QuoteKind) -> PResult<bool> {
        let Some(head) = self.peek() else {
            return Ok(false);
        };
        match kind {
            QuoteKind::Double => {
                if head.is_symbol('\'') && self.peek_at(1).is_some_and(|t| t.is_symbol('\'')) {
                    self.next_tok()?;
                    self.next_tok()?;
                    return Ok(true);
                }
                if head.is_symbol('"') || head.is_symbol('\u{201d}') {
                    self.next_tok()?;
                    return Ok(true);
                }
                Ok(false)
            }
            QuoteKind::Single => {
                if head.is_symbol('\'') || head.is_symbol('\u{2019}') {
                    // An apostrophe, not a closing quote, when a letter
                    // follows.
                    if self.peek_at(1).is_some_and(|t| t.kind == TokKind::Word) {
                        return Ok(false);
                    }
                    self.next_tok()?;
                    return Ok(true);
                }
                Ok(false)
            }
        }
    }

    fn accent_inline(&mut self, cmd: &str) -> PResult<Inlines> {
        self.next_tok()?;
        let arg_missing = match self.peek() {
            None => true,
            Some(t) => t.is_whitespace() || t.is_symbol('}') || t.is_symbol(']'),
        };
        if arg_missing {
            return Ok(vec![Inline::Str(cmd.to_string())]);
        }
        let mut inner = self.tok_arg()?;
        if let Some(Inline::Str(s)) = inner.first_mut() {
            let mut chars = s.chars();
            if let Some(first) = chars.next() {
                if let Some(replacement) = accented(cmd, first) {
                    let mut replaced = replacement.to_string();
                    replaced.extend(chars);
                    *s = replaced;
                }
            }
        }
        if inner.is_empty() {
            return Ok(vec![Inline::Str(cmd.to_string())]);
        }
        Ok(inner)
    }

    fn verb_inline(&mut self) -> PResult<Inlines> {
        self.pop_raw();
        if self.peek().is_some_and(|t| t.is_symbol('*')) {
            self.pop_raw();
        }
        let Some(delim_tok) = self.pop_raw() else {
            return Ok(Vec::new());
        };
        let Some(delim) = delim_tok.raw.chars().next() else {
            return Ok(Vec::new());
        };
        self.state.verbatim = true;
        let text = self.raw_until_symbol(delim);
        self.state.verbatim = false;
        self.expand_head()?;
        Ok(vec![Inline::Code(Attr::empty(), text)])
    }

    fn lst_inline(&mut self) -> PResult<Inlines> {
        self.pop_raw();
        self.skip_whitespace_raw();
        let opts = self.bracketed()?.map(|t| parse_keyvals(&t)).unwrap_or_default();
        let mut attr = Attr::empty();
        for (key, value) in opts {
            if key == "language" {
                attr.classes.push(value);
            }
        }
        let text = if self.at_bgroup() {
            let toks = self.braced()?;
            toks.iter().map(|t| t.raw.as_str()).collect()
        } else {
            let Some(delim_tok) = self.pop_raw() else {
                return Ok(Vec::new());
            };
            match delim_tok.raw.chars().next() {
                Some(delim) => self.raw_until_symbol(delim),
                None => String::new(),
            }
        };
        self.expand_head()?;
        Ok(vec![Inline::Code(attr, text)])
    }

    /// Dispatch a control sequence in inline position. `Ok(None)` means the
    /// command is block-level and ends the current paragraph.
    pub(crate) fn inline_command(&mut self, name: &str) -> PResult<Option<Inlines>> {
        match name {
            "end" | "item" | "bibitem" => return Ok(None),
            "\\" | "tabularnewline" => {
                if self.state.in_table_cell {
                    return Ok(None);
                }
                self.next_tok()?;
                self.skip_whitespace_raw();
                self.bracketed()?;
                return Ok(Some(vec![Inline::LineBreak]));
            }
            "(" => return self.math_until_ctrl(")", MathKind::Inline).map(Some),
            "[" => return self.math_until_ctrl("]", MathKind::Display).map(Some),
            ")" | "]" => {
                if let Some(tok) = self.next_tok()? {
                    self.state.log(tok.pos, LogKind::SkippedContent(tok.raw));
                }
                return Ok(Some(Vec::new()));
            }
            "begin" => {
                if let Some((env, _)) = self.env_name_at(1) {
                    if is_math_env(&env) {
                        return self.math_environment().map(Some);
                    }
                    return Ok(None);
                }
                if let Some(tok) = self.next_tok()? {
                    self.state.log(tok.pos, LogKind::SkippedContent(tok.raw));
                }
                return Ok(Some(Vec::new()));
            }
            "verb" => return self.verb_inline().map(Some),
            _ => {}
        }
        if is_macro_def_command(name)
            || is_include_command(name)
            || lookup_block_command(name).is_some()
        {
            return Ok(None);
        }
        if is_cite_command(name) {
            let name = name.to_string();
            return self.citation(&name).map(Some);
        }
        if is_accent_command(name) {
            let name = name.to_string();
            return self.accent_inline(&name).map(Some);
        }
        if let Some(cmd) = lookup_inline_command(name) {
            return self.known_inline_command(cmd).map(Some);
        }
        self.unknown_inline_command().map(Some)
    }

    fn known_inline_command(&mut self, cmd: InlineCmd) -> PResult<Inlines> {
        match cmd {
            InlineCmd::Styled(style) => {
                self.next_tok()?;
                let inner = self.tok_arg()?;
                let styled = match style {
                    Style::Emph => Inline::Emph(inner),
                    Style::Strong => Inline::Strong(inner),
                    Style::Smallcaps => Inline::Smallcaps(inner),
                    Style::Strikeout => Inline::Strikeout(inner),
                    Style::Superscript => Inline::Superscript(inner),
                    Style::Subscript => Inline::Subscript(inner),
                };
                Ok(vec![styled])
            }
            InlineCmd::Lit(text) => {
                self.next_tok()?;
                Ok(vec![Inline::Str(text.into())])
            }
            InlineCmd::Code => {
                self.next_tok()?;
                let toks = self.group_or_token()?;
                let text: String = toks.iter().map(|t| t.raw.as_str()).collect();
                self.expand_head()?;
                Ok(vec![Inline::Code(Attr::empty(), text.trim().into())])
            }
            InlineCmd::LineBreak => {
                self.next_tok()?;
                Ok(vec![Inline::LineBreak])
            }
            InlineCmd::Url => {
                self.next_tok()?;
                let url = self.braced_text()?;
                Ok(vec![Inline::Link(
                    Attr::from_classes(["uri"]),
                    vec![Inline::Str(url.clone())],
                    Target::new(url, ""),
                )])
            }
            InlineCmd::Href => {
                self.next_tok()?;
                let url = self.braced_text()?;
                let label = self.tok_arg()?;
                Ok(vec![Inline::Link(Attr::empty(), label, Target::new(url, ""))])
            }
            InlineCmd::IncludeGraphics => self.include_graphics(),
            InlineCmd::Footnote => {
                self.next_tok()?;
                self.skip_whitespace_raw();
                self.bracketed()?;
                self.skip_whitespace_raw();
                if !self.at_bgroup() {
                    return Ok(Vec::new());
                }
                let toks = self.braced()?;
                let blocks = self.sub_blocks(toks)?;
                Ok(vec![Inline::Note(blocks)])
            }
            InlineCmd::Ref => {
                self.next_tok()?;
                let id = self.braced_text()?;
                Ok(vec![Inline::Link(
                    Attr::empty(),
                    vec![Inline::Str(id.clone())],
                    Target::new(format!("#{id}"), ""),
                )])
            }
            InlineCmd::Label => {
                self.next_tok()?;
                let id = self.braced_text()?;
                let attr = Attr {
                    attributes: vec![("data-label".into(), id)],
                    ..Attr::default()
                };
                Ok(vec![Inline::Span(attr, Vec::new())])
            }
            InlineCmd::Enquote => {
                self.next_tok()?;
                let inner = self.tok_arg()?;
                Ok(vec![Inline::Quoted(QuoteKind::Double, inner)])
            }
            InlineCmd::Si => {
                self.next_tok()?;
                self.skip_whitespace_raw();
                self.bracketed()?;
                let number = self.braced_text()?;
                let unit = self.braced_text()?;
                Ok(vec![
                    Inline::Str(number),
                    Inline::Str("\u{a0}".into()),
                    Inline::Str(unit),
                ])
            }
            InlineCmd::ColorSpan => {
                self.next_tok()?;
                let color = self.braced_text()?;
                let attr = Attr {
                    attributes: vec![("style".into(), format!("color: {color}"))],
                    ..Attr::default()
                };
                Ok(vec![Inline::Span(attr, Vec::new())])
            }
            InlineCmd::TextColor => {
                self.next_tok()?;
                let color = self.braced_text()?;
                let inner = self.tok_arg()?;
                let attr = Attr {
                    attributes: vec![("style".into(), format!("color: {color}"))],
                    ..Attr::default()
                };
                Ok(vec![Inline::Span(attr, inner)])
            }
            InlineCmd::ColorBox => {
                self.next_tok()?;
                let color = self.braced_text()?;
                let inner = self.tok_arg()?;
                let attr = Attr {
                    attributes: vec![("style".into(), format!("background-color: {color}"))],
                    ..Attr::default()
                };
                Ok(vec![Inline::Span(attr, inner)])
            }
            InlineCmd::PlainGroup => {
                self.next_tok()?;
                self.tok_arg()
            }
            InlineCmd::EnsureMath => {
                self.next_tok()?;
                let toks = self.group_or_token()?;
                let text: String = toks.iter().map(|t| t.raw.as_str()).collect();
                self.expand_head()?;
                Ok(vec![Inline::Math(MathKind::Inline, text.trim().into())])
            }
            InlineCmd::Xspace => {
                self.next_tok()?;
                if self.peek().is_some_and(|t| t.kind == TokKind::Word) {
                    Ok(vec![Inline::Space])
                } else {
                    Ok(Vec::new())
                }
            }
            InlineCmd::IfStrEqual => {
                self.next_tok()?;
                let left = self.braced_text()?;
                let right = self.braced_text()?;
                self.skip_whitespace_raw();
                let then_toks = if self.at_bgroup() {
                    self.braced()?
                } else {
                    Vec::new()
                };
                self.skip_whitespace_raw();
                let else_toks = if self.at_bgroup() {
                    self.braced()?
                } else {
                    Vec::new()
                };
                let chosen = if left == right { then_toks } else { else_toks };
                self.sub_inlines(chosen)
            }
            InlineCmd::MultiRow => {
                self.next_tok()?;
                self.skip_whitespace_raw();
                self.bracketed()?;
                self.braced_text()?;
                self.skip_whitespace_raw();
                self.bracketed()?;
                self.braced_text()?;
                self.tok_arg()
            }
            InlineCmd::LstInline => self.lst_inline(),
        }
    }

    /// The raw text inside the next braced group (or single token), with
    /// surrounding whitespace trimmed.
    pub(crate) fn braced_text(&mut self) -> PResult<String> {
        let toks = self.group_or_token()?;
        let text: String = toks.iter().map(|t| t.raw.as_str()).collect();
        self.expand_head()?;
        Ok(text.trim().to_string())
    }

    fn include_graphics(&mut self) -> PResult<Inlines> {
        self.next_tok()?;
        self.skip_whitespace_raw();
        let opts = self.bracketed()?.map(|t| parse_keyvals(&t)).unwrap_or_default();
        let mut path = self.braced_text()?;
        let has_extension = path
            .rsplit('/')
            .next()
            .is_some_and(|base| base.contains('.'));
        if !has_extension && !self.state.options.default_image_extension.is_empty() {
            path.push('.');
            path.push_str(&self.state.options.default_image_extension);
        }
        let mut attr = Attr::empty();
        for (key, value) in opts {
            if matches!(key.as_str(), "width" | "height" | "scale" | "page" | "trim") {
                attr.attributes.push((key, value));
            }
        }
        Ok(vec![Inline::Image(attr, Vec::new(), Target::new(path, ""))])
    }

    fn unknown_inline_command(&mut self) -> PResult<Inlines> {
        if self.state.options.extensions.raw_tex {
            let ((), raw) = self.with_raw(|p| {
                p.next_tok()?;
                loop {
                    if p.peek().is_some_and(|t| t.is_symbol('[')) {
                        p.bracketed()?;
                    } else if p.peek().is_some_and(|t| t.is_symbol('{')) {
                        p.braced()?;
                    } else {
                        break;
                    }
                }
                Ok(())
            })?;
            return Ok(vec![Inline::RawInline(
                "latex".into(),
                raw.trim_end().to_string(),
            )]);
        }
        let Some(tok) = self.next_tok()? else {
            return Ok(Vec::new());
        };
        self.state
            .log(tok.pos, LogKind::SkippedContent(tok.raw.trim_end().to_string()));
        Ok(Vec::new())
    }
}

/// Join adjacent `Str` inlines.
fn merge_strs(inlines: Inlines) -> Inlines {
    let mut out: Inlines = Vec::with_capacity(inlines.len());
    for inline in inlines {
        if let Inline::Str(s) = &inline {
            if let Some(Inline::Str(prev)) = out.last_mut() {
                prev.push_str(s);
                continue;
            }
        }
        out.push(inline);
    }
    out
}

/// Parse a bracketed option list into `key=value` pairs. Values may be
/// braced or bare; a key without `=` maps to the empty string.
pub(crate) fn parse_keyvals(toks: &[Tok]) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for item in split_on_symbol(toks, ',') {
        let eq = item.iter().position(|t| t.is_symbol('='));
        match eq {
            Some(i) => {
                let key: String = item[..i].iter().map(|t| t.raw.as_str()).collect();
                let value: String = item[i + 1..].iter().map(|t| t.raw.as_str()).collect();
                let value = value.trim();
                let value = value
                    .strip_prefix('{')
                    .and_then(|v| v.strip_suffix('}'))
                    .unwrap_or(value);
                out.push((key.trim().to_string(), value.to_string()));
            }
            None => {
                let key: String = item.iter().map(|t| t.raw.as_str()).collect();
                let key = key.trim();
                if !key.is_empty() {
                    out.push((key.to_string(), String::new()));
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::lexer::tokenize;
    use crate::options::ReaderOptions;
    use crate::state::ParserState;

    fn inlines_of(input: &str) -> Inlines {
        let mut p =
            Parser::new(tokenize(input), ParserState::new(ReaderOptions::default())).unwrap();
        p.inlines().unwrap()
    }

    #[test]
    fn words_and_emph() {
        assert_eq!(
            inlines_of("hello \\emph{world}"),
            vec![
                Inline::Str("hello".into()),
                Inline::Space,
                Inline::Emph(vec![Inline::Str("world".into())]),
            ]
        );
    }

    #[test]
    fn dashes_collapse() {
        assert_eq!(
            inlines_of("a--b---c"),
            vec![Inline::Str("a\u{2013}b\u{2014}c".into())]
        );
    }

    #[test]
    fn inline_and_display_math() {
        assert_eq!(
            inlines_of("$ x+y $"),
            vec![Inline::Math(MathKind::Inline, "x+y".into())]
        );
        assert_eq!(
            inlines_of("$$e=mc^2$$"),
            vec![Inline::Math(MathKind::Display, "e=mc^2".into())]
        );
        assert_eq!(
            inlines_of("\\(a\\) \\[b\\]"),
            vec![
                Inline::Math(MathKind::Inline, "a".into()),
                Inline::Space,
                Inline::Math(MathKind::Display, "b".into()),
            ]
        );
    }

    #[test]
    fn smart_quotes() {
        assert_eq!(
            inlines_of("``a b''"),
            vec![Inline::Quoted(
                QuoteKind::Double,
                vec![
                    Inline::Str("a".into()),
                    Inline::Space,
                    Inline::Str("b".into())
                ]
            )]
        );
        assert_eq!(
            inlines_of("`x'"),
            vec![Inline::Quoted(
                QuoteKind::Single,
                vec![Inline::Str("x".into())]
            )]
        );
    }

    #[test]
    fn apostrophe_is_not_a_closing_quote() {
        // The quote never closes, so the backtick stands literally.
        assert_eq!(
            inlines_of("`it's"),
            vec![Inline::Str("`it\u{2019}s".into())]
        );
    }

    #[test]
    fn smart_disabled_keeps_markers() {
        let mut options = ReaderOptions::default();
        options.extensions.smart = false;
        let mut p = Parser::new(tokenize("``a''"), ParserState::new(options)).unwrap();
        let inlines = p.inlines().unwrap();
        assert_eq!(inlines, vec![Inline::Str("``a''".into())]);
    }

    #[test]
    fn accents_compose() {
        assert_eq!(inlines_of("\\'elan"), vec![Inline::Str("élan".into())]);
        assert_eq!(inlines_of("\\c{c}a"), vec![Inline::Str("ça".into())]);
        // Missing argument falls back to the literal character.
        assert_eq!(inlines_of("\\c "), vec![Inline::Str("c".into())]);
    }

    #[test]
    fn verb_preserves_content() {
        assert_eq!(
            inlines_of("\\verb|x _ y|"),
            vec![Inline::Code(Attr::empty(), "x _ y".into())]
        );
    }

    #[test]
    fn nonbreaking_space_and_nested_groups() {
        assert_eq!(inlines_of("a~b"), vec![Inline::Str("a\u{a0}b".into())]);
        // Doubled braces are transparent.
        assert_eq!(inlines_of("{{a}}"), inlines_of("{a}"));
    }

    #[test]
    fn unknown_command_is_skipped_or_raw() {
        let inlines = inlines_of("\\nosuchcmd{x}");
        assert_eq!(inlines, vec![Inline::Str("x".into())]);

        let mut options = ReaderOptions::default();
        options.extensions.raw_tex = true;
        let mut p = Parser::new(tokenize("\\nosuchcmd{x}"), ParserState::new(options)).unwrap();
        let inlines = p.inlines().unwrap();
        assert_eq!(
            inlines,
            vec![Inline::RawInline("latex".into(), "\\nosuchcmd{x}".into())]
        );
    }

    #[test]
    fn footnote_becomes_note() {
        let inlines = inlines_of("x\\footnote{note text}");
        assert_eq!(inlines.len(), 2);
        match &inlines[1] {
            Inline::Note(blocks) => {
                assert_eq!(blocks.len(), 1);
            }
            other => panic!("expected note, got {other:?}"),
        }
    }

    #[test]
    fn citation_carries_keys_and_suffix() {
        let inlines = inlines_of("\\cite[p.~5]{Foo2000,Bar1999}");
        match &inlines[0] {
            Inline::Cite(citations, mirror) => {
                assert_eq!(citations.len(), 2);
                assert_eq!(citations[0].id, "Foo2000");
                assert_eq!(citations[1].id, "Bar1999");
                assert_eq!(
                    citations[0].mode,
                    doc_tree::CitationMode::Normal
                );
                // The single bracket is the suffix, attached to the last key.
                assert!(!citations[1].suffix.is_empty());
                assert!(matches!(mirror[0], Inline::RawInline(_, _)));
            }
            other => panic!("expected cite, got {other:?}"),
        }
    }
}
