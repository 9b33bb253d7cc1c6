//! The block engine: sections, paragraphs, environments, lists, verbatim
//! blocks, bibliography items, and the preamble.

use doc_tree::{trim_inlines, Attr, Block, Blocks, Inline, ListAttrs, ListDelim, ListStyle,
    MathKind, MetaValue};

use crate::commands::{lookup_block_command, lookup_env, BlockCmd, Env};
use crate::error::{ErrorKind, LogKind, ParseError};
use crate::include::is_include_command;
use crate::inline::parse_keyvals;
use crate::stream::{PResult, Parser};
use crate::token::Tok;

impl Parser {
    /// Parse a whole document: optional preamble, then blocks until the
    /// stream is exhausted, recovering from stray tokens.
    pub(crate) fn document_blocks(&mut self) -> PResult<Blocks> {
        if self.has_begin_document() {
            self.preamble()?;
        }
        let mut out = Vec::new();
        loop {
            let mut blocks = self.blocks()?;
            out.append(&mut blocks);
            let Some(tok) = self.pop_raw() else {
                break;
            };
            self.state
                .log(tok.pos, LogKind::SkippedContent(tok.raw.trim_end().to_string()));
            if tok.is_ctrl("end") && self.at_bgroup() {
                self.braced()?;
            }
            self.expand_head()?;
        }
        Ok(out)
    }

    fn has_begin_document(&self) -> bool {
        let mut i = 0;
        while let Some(tok) = self.peek_at(i) {
            if tok.is_ctrl("begin") {
                if let Some((name, _)) = self.env_name_at(i + 1) {
                    if name == "document" {
                        return true;
                    }
                }
            }
            i += 1;
        }
        false
    }

    /// Before `\begin{document}`: includes, macro definitions, block
    /// commands, braced groups, or any single token, all without visible
    /// output.
    fn preamble(&mut self) -> PResult<()> {
        loop {
            let Some(head) = self.peek() else {
                return Ok(());
            };
            let is_whitespace = head.is_whitespace();
            let is_begin = head.is_ctrl("begin");
            let name = head.ctrl_name().map(String::from);
            if is_begin {
                if let Some((env, _)) = self.env_name_at(1) {
                    if env == "document" {
                        return Ok(());
                    }
                }
            }
            if is_whitespace {
                self.skip_whitespace()?;
                continue;
            }
            if self.macro_def()? {
                continue;
            }
            if let Some(name) = name {
                if is_include_command(&name) {
                    self.include_directive(&name)?;
                    continue;
                }
                if let Some(cmd) = lookup_block_command(&name) {
                    self.block_command(cmd)?;
                    continue;
                }
            }
            if self.at_bgroup() {
                self.braced()?;
                continue;
            }
            self.next_tok()?;
        }
    }

    /// Blocks up to a boundary: end of input, a closing group, `\end`,
    /// `\item`, `\bibitem`, or a cell/row separator inside a table.
    pub(crate) fn blocks(&mut self) -> PResult<Blocks> {
        let mut out = Vec::new();
        loop {
            let Some(head) = self.peek() else {
                break;
            };
            if self.at_egroup() {
                break;
            }
            if head.is_ctrl("end") || head.is_ctrl("item") || head.is_ctrl("bibitem") {
                break;
            }
            if self.state.in_table_cell
                && (head.is_symbol('&') || head.is_ctrl("\\") || head.is_ctrl("tabularnewline"))
            {
                break;
            }
            let mut blocks = self.block()?;
            out.append(&mut blocks);
        }
        Ok(out)
    }

    /// One block alternative. Always consumes at least one token.
    fn block(&mut self) -> PResult<Blocks> {
        let Some(head) = self.peek() else {
            return Ok(Vec::new());
        };
        let is_whitespace = head.is_whitespace();
        let is_begin = head.is_ctrl("begin");
        let name = head.ctrl_name().map(String::from);
        if is_whitespace {
            self.skip_whitespace()?;
            return Ok(Vec::new());
        }
        if is_begin {
            return self.environment();
        }
        if self.macro_def()? {
            return Ok(Vec::new());
        }
        if let Some(name) = name {
            if is_include_command(&name) {
                self.include_directive(&name)?;
                return Ok(Vec::new());
            }
            if let Some(cmd) = lookup_block_command(&name) {
                return self.block_command(cmd);
            }
        }
        if self.at_bgroup() {
            return self.grouped_blocks();
        }
        self.paragraph()
    }

    /// A brace-wrapped run of blocks, spliced into the surrounding list.
    /// A group whose first item is itself a group splices the same way, so
    /// doubled braces are transparent at the block level too.
    fn grouped_blocks(&mut self) -> PResult<Blocks> {
        self.next_tok()?;
        let blocks = self.blocks()?;
        if self.at_egroup() {
            self.next_tok()?;
        } else {
            self.log_here(LogKind::UnexpectedEndOfDocument("group".into()));
        }
        Ok(blocks)
    }

    fn paragraph(&mut self) -> PResult<Blocks> {
        let before = self.len();
        let inlines = trim_inlines(self.inlines()?);
        if !inlines.is_empty() {
            return Ok(vec![Block::Para(inlines)]);
        }
        if self.len() == before {
            if let Some(tok) = self.pop_raw() {
                self.state
                    .log(tok.pos, LogKind::SkippedContent(tok.raw.trim_end().to_string()));
            }
            self.expand_head()?;
        }
        Ok(Vec::new())
    }

    /// Parse collected tokens as blocks in a sub-parse; state flows back.
    pub(crate) fn sub_blocks(&mut self, toks: Vec<Tok>) -> PResult<Blocks> {
        let state = self.state.clone();
        let mut sub = Parser::new(toks, state)?;
        let result = sub.blocks()?;
        self.state = sub.state;
        Ok(result)
    }

    fn consume_tokens(&mut self, n: usize) -> PResult<()> {
        for _ in 0..n {
            self.pop_raw();
        }
        self.expand_head()
    }

    /// `\begin{...}`: dispatch to the environment table, with the generic
    /// passthrough for unknown names.
    fn environment(&mut self) -> PResult<Blocks> {
        let Some((name, consume)) = self.env_name_at(1) else {
            if let Some(tok) = self.next_tok()? {
                self.state
                    .log(tok.pos, LogKind::SkippedContent(tok.raw.trim_end().to_string()));
            }
            return Ok(Vec::new());
        };
        match lookup_env(&name) {
            Some(env) => {
                self.consume_tokens(consume)?;
                self.known_environment(env, &name)
            }
            None => self.unknown_environment(&name, consume),
        }
    }

    fn known_environment(&mut self, env: Env, name: &str) -> PResult<Blocks> {
        match env {
            Env::Document => {
                let body = self.env_body_blocks(name)?;
                // Nothing after \end{document} is read.
                while self.pop_raw().is_some() {}
                Ok(body)
            }
            Env::Abstract => {
                let body = self.env_body_blocks(name)?;
                self.state.meta.set("abstract", MetaValue::Blocks(body));
                Ok(Vec::new())
            }
            Env::Letter | Env::Center | Env::ObeyLines => self.env_body_blocks(name),
            Env::Quote | Env::Quotation | Env::Verse => {
                let body = self.env_body_blocks(name)?;
                Ok(vec![Block::BlockQuote(body)])
            }
            Env::Minipage => {
                self.skip_whitespace_raw();
                self.bracketed()?;
                if self.at_bgroup() {
                    self.braced()?;
                }
                let body = self.env_body_blocks(name)?;
                Ok(vec![Block::Div(Attr::from_classes(["minipage"]), body)])
            }
            Env::AdjustBox => {
                if self.at_bgroup() {
                    self.braced()?;
                }
                let body = self.env_body_blocks(name)?;
                Ok(vec![Block::Div(Attr::from_classes(["adjustbox"]), body)])
            }
            Env::Proof | Env::Algorithm | Env::Tab => {
                self.skip_whitespace_raw();
                self.bracketed()?;
                let body = self.env_body_blocks(name)?;
                let class = name.trim_end_matches('*').to_string();
                Ok(vec![Block::Div(Attr::from_classes([class]), body)])
            }
            Env::IeeeBiography => {
                self.skip_whitespace_raw();
                self.bracketed()?;
                if self.at_bgroup() {
                    self.braced()?;
                }
                let body = self.env_body_blocks(name)?;
                Ok(vec![Block::Div(Attr::from_classes(["IEEEbiography"]), body)])
            }
            Env::Cjk => {
                for _ in 0..2 {
                    self.skip_whitespace_raw();
                    if self.at_bgroup() {
                        self.braced()?;
                    }
                }
                self.env_body_blocks(name)
            }
            Env::Figure | Env::FigWindow => self.figure_env(name, 0),
            Env::WrapFigure => self.figure_env(name, 2),
            Env::TableFloat => self.table_float_env(name),
            Env::Tabular => self.tabular_env(name, false),
            Env::TabularWithWidth => self.tabular_env(name, true),
            Env::LongTable => self.tabular_env(name, false),
            Env::Itemize => self.bullet_list(name),
            Env::Enumerate => self.ordered_list(name),
            Env::Description => self.definition_list(name),
            Env::Verbatim | Env::Alltt => self.code_env(name, Attr::empty()),
            Env::Lstlisting => {
                self.skip_whitespace_raw();
                let opts = self
                    .bracketed()?
                    .map(|t| parse_keyvals(&t))
                    .unwrap_or_default();
                let mut attr = Attr::empty();
                for (key, value) in opts {
                    match key.as_str() {
                        "language" => attr.classes.push(value),
                        "label" => attr.identifier = value,
                        "caption" => {}
                        _ => attr.attributes.push((key, value)),
                    }
                }
                self.code_env(name, attr)
            }
            Env::Minted => {
                self.skip_whitespace_raw();
                self.bracketed()?;
                let language = self.braced_text()?;
                let mut attr = Attr::empty();
                if !language.is_empty() {
                    attr.classes.push(language);
                }
                self.code_env(name, attr)
            }
            Env::CodeEnv => {
                let attr = if self.state.options.extensions.literate_haskell {
                    Attr::from_classes(["haskell", "literate"])
                } else {
                    Attr::empty()
                };
                self.code_env(name, attr)
            }
            Env::CommentEnv => {
                self.capture_env_raw(name);
                self.expand_head()?;
                Ok(Vec::new())
            }
            Env::Math => {
                let inner = self.capture_env_raw(name);
                self.expand_head()?;
                let bare = matches!(name, "displaymath" | "equation" | "equation*" | "math");
                let content = if bare {
                    inner.trim().to_string()
                } else {
                    format!("\\begin{{{name}}}{inner}\\end{{{name}}}")
                };
                Ok(vec![Block::Para(vec![Inline::Math(
                    MathKind::Display,
                    content,
                )])])
            }
            Env::TikzPicture => {
                let inner = self.capture_env_raw(name);
                self.expand_head()?;
                let raw = format!("\\begin{{{name}}}{inner}\\end{{{name}}}");
                Ok(vec![Block::RawBlock("latex".into(), raw)])
            }
            Env::IcmlAuthorList => {
                self.env_body_blocks(name)?;
                Ok(Vec::new())
            }
            Env::TheBibliography => self.bibliography_env(name),
        }
    }

    fn unknown_environment(&mut self, name: &str, consume: usize) -> PResult<Blocks> {
        let begin_pos = self.here();
        let (blocks, raw) = self.with_raw(|p| {
            for _ in 0..consume {
                p.pop_raw();
            }
            p.expand_head()?;
            p.env_body_blocks(name)
        })?;
        if self.state.options.extensions.raw_tex {
            return Ok(vec![Block::RawBlock("latex".into(), raw)]);
        }
        self.state.log(
            begin_pos,
            LogKind::SkippedContent(format!("\\begin{{{name}}}")),
        );
        let end_pos = self.pos;
        self.state
            .log(end_pos, LogKind::SkippedContent(format!("\\end{{{name}}}")));
        Ok(blocks)
    }

    /// The body of an environment, consuming the matching `\end{name}`.
    /// Mismatched or missing ends are logged, never fatal.
    pub(crate) fn env_body_blocks(&mut self, name: &str) -> PResult<Blocks> {
        let mut out = Vec::new();
        loop {
            let mut blocks = self.blocks()?;
            out.append(&mut blocks);
            let Some(head) = self.peek() else {
                self.log_here(LogKind::UnexpectedEndOfDocument(name.to_string()));
                break;
            };
            if head.is_ctrl("end") {
                match self.env_name_at(1) {
                    Some((envname, consume)) => {
                        if envname == name {
                            self.consume_tokens(consume)?;
                            break;
                        }
                        if envname == "document" {
                            // Leave it for the enclosing document parse.
                            self.log_here(LogKind::UnexpectedEndOfDocument(name.to_string()));
                            break;
                        }
                        let pos = self.here();
                        self.consume_tokens(consume)?;
                        self.state
                            .log(pos, LogKind::SkippedContent(format!("\\end{{{envname}}}")));
                    }
                    None => {
                        if let Some(tok) = self.next_tok()? {
                            self.state
                                .log(tok.pos, LogKind::SkippedContent(tok.raw.trim_end().into()));
                        }
                    }
                }
                continue;
            }
            // Stray \item, \bibitem, cell separator, or closing brace.
            if let Some(tok) = self.pop_raw() {
                self.state
                    .log(tok.pos, LogKind::SkippedContent(tok.raw.trim_end().into()));
            }
            self.expand_head()?;
        }
        Ok(out)
    }

    /// Skip to and consume `\end{name}`, logging anything in between.
    pub(crate) fn expect_env_end(&mut self, name: &str) -> PResult<()> {
        loop {
            self.skip_whitespace()?;
            let Some(head) = self.peek() else {
                self.log_here(LogKind::UnexpectedEndOfDocument(name.to_string()));
                return Ok(());
            };
            if head.is_ctrl("end") {
                if let Some((envname, consume)) = self.env_name_at(1) {
                    if envname == name {
                        return self.consume_tokens(consume);
                    }
                    self.log_here(LogKind::UnexpectedEndOfDocument(name.to_string()));
                    return Ok(());
                }
            }
            if let Some(tok) = self.pop_raw() {
                self.state
                    .log(tok.pos, LogKind::SkippedContent(tok.raw.trim_end().into()));
            }
            self.expand_head()?;
        }
    }

    /// Concatenate raw text until the matching `\end{name}`, with macro
    /// expansion suppressed. The begin marker must already be consumed;
    /// the end marker is consumed but not included.
    pub(crate) fn capture_env_raw(&mut self, name: &str) -> String {
        self.state.verbatim = true;
        let mut out = String::new();
        loop {
            let Some(head) = self.peek() else {
                self.log_here(LogKind::UnexpectedEndOfDocument(name.to_string()));
                break;
            };
            if head.is_ctrl("end") {
                if let Some((envname, consume)) = self.env_name_at(1) {
                    if envname == name {
                        for _ in 0..consume {
                            self.pop_raw();
                        }
                        break;
                    }
                }
            }
            if let Some(tok) = self.pop_raw() {
                out.push_str(&tok.raw);
            }
        }
        self.state.verbatim = false;
        out
    }

    fn code_env(&mut self, name: &str, attr: Attr) -> PResult<Blocks> {
        let inner = self.capture_env_raw(name);
        self.expand_head()?;
        let text = inner.strip_prefix('\n').unwrap_or(&inner).trim_end();
        Ok(vec![Block::CodeBlock(attr, text.to_string())])
    }

    fn bullet_list(&mut self, name: &str) -> PResult<Blocks> {
        self.skip_whitespace_raw();
        self.bracketed()?;
        let items = self.list_items()?;
        self.expect_env_end(name)?;
        Ok(vec![Block::BulletList(items)])
    }

    fn ordered_list(&mut self, name: &str) -> PResult<Blocks> {
        self.skip_whitespace_raw();
        let marker = self.bracketed()?.map(|toks| {
            toks.iter().map(|t| t.raw.as_str()).collect::<String>()
        });
        let (style, delim) = marker
            .as_deref()
            .map(list_marker_attrs)
            .unwrap_or((ListStyle::Default, ListDelim::Default));
        let mut start = 1;
        self.skip_whitespace()?;
        if self.peek().is_some_and(|t| t.is_ctrl("setcounter")) {
            self.next_tok()?;
            let counter = self.braced_text()?;
            let value = self.braced_text()?;
            if counter.starts_with("enum") {
                if let Ok(n) = value.parse::<i32>() {
                    start = n + 1;
                }
            }
        }
        let items = self.list_items()?;
        self.expect_env_end(name)?;
        Ok(vec![Block::OrderedList(
            ListAttrs {
                start,
                style,
                delim,
            },
            items,
        )])
    }

    fn list_items(&mut self) -> PResult<Vec<Blocks>> {
        let saved = self.state.in_list_item;
        self.state.in_list_item = true;
        let mut items = Vec::new();
        loop {
            self.skip_whitespace()?;
            if !self.eat_ctrl("item")? {
                break;
            }
            self.skip_whitespace_raw();
            self.bracketed()?;
            items.push(self.blocks()?);
        }
        self.state.in_list_item = saved;
        Ok(items)
    }

    fn definition_list(&mut self, name: &str) -> PResult<Blocks> {
        self.skip_whitespace_raw();
        self.bracketed()?;
        let saved = self.state.in_list_item;
        self.state.in_list_item = true;
        let mut entries = Vec::new();
        loop {
            self.skip_whitespace()?;
            if !self.eat_ctrl("item")? {
                break;
            }
            self.skip_whitespace_raw();
            let term = match self.bracketed()? {
                Some(toks) => trim_inlines(self.sub_inlines(toks)?),
                None => Vec::new(),
            };
            let body = self.blocks()?;
            entries.push((term, vec![body]));
        }
        self.state.in_list_item = saved;
        self.expect_env_end(name)?;
        Ok(vec![Block::DefinitionList(entries)])
    }

    /// `thebibliography`: each `\bibitem[label]{key}` becomes a div with
    /// the conventional `ref-` identifier.
    fn bibliography_env(&mut self, name: &str) -> PResult<Blocks> {
        self.skip_whitespace_raw();
        if self.at_bgroup() {
            self.braced()?;
        }
        let mut items = Vec::new();
        loop {
            self.skip_whitespace()?;
            if !self.eat_ctrl("bibitem")? {
                break;
            }
            let pos = self.here();
            self.skip_whitespace_raw();
            self.bracketed()?;
            let key = if self.at_bgroup() {
                self.braced_text()?
            } else {
                String::new()
            };
            let body = self
                .blocks()
                .map_err(|_| ParseError(pos, ErrorKind::CellParse))?;
            items.push(Block::Div(Attr::from_id(format!("ref-{key}")), body));
        }
        self.expect_env_end(name)?;
        Ok(vec![Block::Div(Attr::from_classes(["references"]), items)])
    }

    fn block_command(&mut self, cmd: BlockCmd) -> PResult<Blocks> {
        match cmd {
            BlockCmd::Section(level) => self.section(level),
            BlockCmd::Title => self.meta_inlines_command("title"),
            BlockCmd::Subtitle => self.meta_inlines_command("subtitle"),
            BlockCmd::Date => self.meta_inlines_command("date"),
            BlockCmd::Dedication => self.meta_inlines_command("dedication"),
            BlockCmd::Address => self.meta_inlines_command("address"),
            BlockCmd::Author => self.author_command(),
            BlockCmd::Institute => self.institute_command(),
            BlockCmd::IcmlAuthor => self.icml_author_command(),
            BlockCmd::IcmlAffiliation => self.icml_affiliation_command(),
            BlockCmd::Bibliography => {
                self.bibliography_command()?;
                Ok(Vec::new())
            }
            BlockCmd::AddBibResource => {
                self.next_tok()?;
                let file = self.braced_text()?;
                self.state
                    .meta
                    .append("bibliography", MetaValue::Str(file));
                Ok(Vec::new())
            }
            BlockCmd::Nocite => {
                self.next_tok()?;
                let keys = self.braced_text()?;
                let citations: Vec<doc_tree::Citation> = keys
                    .split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(|k| doc_tree::Citation::new(k, doc_tree::CitationMode::Normal))
                    .collect();
                if !citations.is_empty() {
                    self.state.meta.append(
                        "nocite",
                        MetaValue::Inlines(vec![Inline::Cite(citations, Vec::new())]),
                    );
                }
                Ok(Vec::new())
            }
            BlockCmd::Caption => self.caption_command(),
            BlockCmd::HRuleBare => {
                self.next_tok()?;
                Ok(vec![Block::HorizontalRule])
            }
            BlockCmd::HRuleArgs => {
                self.next_tok()?;
                self.skip_whitespace_raw();
                self.bracketed()?;
                self.braced_text()?;
                self.braced_text()?;
                Ok(vec![Block::HorizontalRule])
            }
            BlockCmd::HyperTarget => {
                self.next_tok()?;
                let id = self.braced_text()?;
                let inner = self.tok_arg()?;
                Ok(vec![Block::Plain(vec![Inline::Span(
                    Attr::from_id(id),
                    inner,
                )])])
            }
            BlockCmd::DocumentClass => {
                self.next_tok()?;
                self.skip_whitespace_raw();
                self.bracketed()?;
                self.braced_text()?;
                Ok(Vec::new())
            }
            BlockCmd::SetCounter => {
                self.next_tok()?;
                self.braced_text()?;
                self.braced_text()?;
                Ok(Vec::new())
            }
            BlockCmd::CenterLine | BlockCmd::Opening | BlockCmd::Closing => {
                self.next_tok()?;
                let inner = trim_inlines(self.tok_arg()?);
                if inner.is_empty() {
                    Ok(Vec::new())
                } else {
                    Ok(vec![Block::Para(inner)])
                }
            }
            BlockCmd::LstInputListing => self.lst_input_listing(),
            BlockCmd::GraphicsPath => {
                self.next_tok()?;
                self.skip_whitespace_raw();
                if self.at_bgroup() {
                    let toks = self.braced()?;
                    for dir in braced_items(&toks) {
                        self.state.resource_path.push(dir.into());
                    }
                }
                Ok(Vec::new())
            }
        }
    }

    /// One block-level alternative for the re-entrant host entry points:
    /// an environment, a macro definition, an include, or a block command.
    pub(crate) fn raw_block_candidate(&mut self) -> PResult<Blocks> {
        if self.macro_def()? {
            return Ok(Vec::new());
        }
        let Some(head) = self.peek() else {
            return Err(self.error(ErrorKind::UnexpectedEof));
        };
        if head.is_ctrl("begin") {
            return self.environment();
        }
        if let Some(name) = head.ctrl_name().map(String::from) {
            if is_include_command(&name) {
                self.include_directive(&name)?;
                return Ok(Vec::new());
            }
            if let Some(cmd) = lookup_block_command(&name) {
                return self.block_command(cmd);
            }
        }
        let got = self
            .peek()
            .map(|t| {
                let kind: &'static str = (&t.kind).into();
                format!("{kind} \"{}\"", t.raw.trim_end())
            })
            .unwrap_or_else(|| "end of input".to_string());
        Err(self.error(ErrorKind::UnexpectedToken {
            expected: "an environment or block command",
            got,
        }))
    }

    fn meta_inlines_command(&mut self, key: &str) -> PResult<Blocks> {
        self.next_tok()?;
        self.skip_whitespace_raw();
        self.bracketed()?;
        let inlines = trim_inlines(self.tok_arg()?);
        self.state.meta.set(key, MetaValue::Inlines(inlines));
        Ok(Vec::new())
    }

    fn section(&mut self, level: i32) -> PResult<Blocks> {
        self.next_tok()?;
        let starred = self.eat_symbol('*')?;
        self.skip_whitespace_raw();
        self.bracketed()?;
        let title = trim_inlines(self.tok_arg()?);
        self.skip_whitespace()?;
        let label = if self.peek().is_some_and(|t| t.is_ctrl("label")) {
            self.next_tok()?;
            Some(self.braced_text()?)
        } else {
            None
        };
        let id_source = label.unwrap_or_else(|| slugify(&title));
        let id = self.state.register_identifier(&id_source);
        let mut attr = Attr::from_id(id);
        if starred {
            attr.classes.push("unnumbered".into());
        }
        Ok(vec![Block::Header(level, attr, title)])
    }
}

/// Generated heading anchors: lowercased words joined with dashes.
fn slugify(inlines: &[Inline]) -> String {
    let text = doc_tree::inlines_to_string(inlines);
    let mut out = String::new();
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if out.is_empty() {
        "section".to_string()
    } else {
        out
    }
}

/// `{a}{b}` → `["a", "b"]`, for `\graphicspath`-style arguments.
fn braced_items(toks: &[Tok]) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    for tok in toks {
        if tok.is_symbol('{') {
            depth += 1;
            continue;
        }
        if tok.is_symbol('}') {
            depth = depth.saturating_sub(1);
            if depth == 0 && !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            continue;
        }
        if depth > 0 {
            current.push_str(&tok.raw);
        }
    }
    out
}

/// The `[marker]` of an enumerate environment: numbering style from the
/// counter letter, delimiter from the punctuation around it.
fn list_marker_attrs(marker: &str) -> (ListStyle, ListDelim) {
    let marker = marker.trim();
    let style = marker
        .chars()
        .find_map(|c| match c {
            '1' => Some(ListStyle::Decimal),
            'a' => Some(ListStyle::LowerAlpha),
            'A' => Some(ListStyle::UpperAlpha),
            'i' => Some(ListStyle::LowerRoman),
            'I' => Some(ListStyle::UpperRoman),
            _ => None,
        })
        .unwrap_or(ListStyle::Default);
    let delim = if marker.starts_with('(') && marker.ends_with(')') {
        ListDelim::TwoParens
    } else if marker.ends_with(')') {
        ListDelim::OneParen
    } else if marker.ends_with('.') {
        ListDelim::Period
    } else {
        ListDelim::Default
    };
    (style, delim)
}
