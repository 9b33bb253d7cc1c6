//! Static dispatch tables: command and environment names to handler tags.
//! Dispatch is by exact name first, then by name without a trailing `*`,
//! then the unknown path.

use phf::phf_map;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Style {
    Emph,
    Strong,
    Smallcaps,
    Strikeout,
    Superscript,
    Subscript,
}

/// Inline command handler tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InlineCmd {
    /// Wrap the next argument in an inline style.
    Styled(Style),
    /// A literal replacement string.
    Lit(&'static str),
    /// Monospace content: the argument becomes a `Code` inline.
    Code,
    LineBreak,
    Url,
    Href,
    IncludeGraphics,
    Footnote,
    Ref,
    Label,
    Enquote,
    Si,
    /// `\color{c}`: an empty span carrying a color style.
    ColorSpan,
    /// `\textcolor{c}{...}` / `\colorbox{c}{...}`.
    TextColor,
    ColorBox,
    /// The argument's inlines stand on their own (`\text`, `\mbox`, …).
    PlainGroup,
    EnsureMath,
    Xspace,
    IfStrEqual,
    MultiRow,
    LstInline,
}

pub(crate) static INLINE_COMMANDS: phf::Map<&'static str, InlineCmd> = phf_map! {
    "emph" => InlineCmd::Styled(Style::Emph),
    "textit" => InlineCmd::Styled(Style::Emph),
    "textsl" => InlineCmd::Styled(Style::Emph),
    "textbf" => InlineCmd::Styled(Style::Strong),
    "textsc" => InlineCmd::Styled(Style::Smallcaps),
    "sout" => InlineCmd::Styled(Style::Strikeout),
    "textsuperscript" => InlineCmd::Styled(Style::Superscript),
    "textsubscript" => InlineCmd::Styled(Style::Subscript),
    "texttt" => InlineCmd::Code,
    "lstinline" => InlineCmd::LstInline,
    "textsf" => InlineCmd::PlainGroup,
    "text" => InlineCmd::PlainGroup,
    "textrm" => InlineCmd::PlainGroup,
    "textup" => InlineCmd::PlainGroup,
    "textmd" => InlineCmd::PlainGroup,
    "textnormal" => InlineCmd::PlainGroup,
    "mbox" => InlineCmd::PlainGroup,
    "newline" => InlineCmd::LineBreak,
    "url" => InlineCmd::Url,
    "href" => InlineCmd::Href,
    "includegraphics" => InlineCmd::IncludeGraphics,
    "footnote" => InlineCmd::Footnote,
    "thanks" => InlineCmd::Footnote,
    "ref" => InlineCmd::Ref,
    "cref" => InlineCmd::Ref,
    "Cref" => InlineCmd::Ref,
    "autoref" => InlineCmd::Ref,
    "pageref" => InlineCmd::Ref,
    "label" => InlineCmd::Label,
    "enquote" => InlineCmd::Enquote,
    "SI" => InlineCmd::Si,
    "color" => InlineCmd::ColorSpan,
    "textcolor" => InlineCmd::TextColor,
    "colorbox" => InlineCmd::ColorBox,
    "ensuremath" => InlineCmd::EnsureMath,
    "xspace" => InlineCmd::Xspace,
    "ifstrequal" => InlineCmd::IfStrEqual,
    "multirow" => InlineCmd::MultiRow,
    // Literals and ligatures.
    "ldots" => InlineCmd::Lit("\u{2026}"),
    "dots" => InlineCmd::Lit("\u{2026}"),
    "dotsc" => InlineCmd::Lit("\u{2026}"),
    "%" => InlineCmd::Lit("%"),
    "&" => InlineCmd::Lit("&"),
    "#" => InlineCmd::Lit("#"),
    "$" => InlineCmd::Lit("$"),
    "_" => InlineCmd::Lit("_"),
    "{" => InlineCmd::Lit("{"),
    "}" => InlineCmd::Lit("}"),
    " " => InlineCmd::Lit(" "),
    "," => InlineCmd::Lit("\u{2009}"),
    "quad" => InlineCmd::Lit("\u{2003}"),
    "qquad" => InlineCmd::Lit("\u{2003}\u{2003}"),
    "textbackslash" => InlineCmd::Lit("\\"),
    "textasciitilde" => InlineCmd::Lit("~"),
    "textasciicircum" => InlineCmd::Lit("^"),
    "textemdash" => InlineCmd::Lit("\u{2014}"),
    "textendash" => InlineCmd::Lit("\u{2013}"),
    "textquotedblleft" => InlineCmd::Lit("\u{201c}"),
    "textquotedblright" => InlineCmd::Lit("\u{201d}"),
    "textquoteleft" => InlineCmd::Lit("\u{2018}"),
    "textquoteright" => InlineCmd::Lit("\u{2019}"),
    "P" => InlineCmd::Lit("\u{b6}"),
    "S" => InlineCmd::Lit("\u{a7}"),
    "dag" => InlineCmd::Lit("\u{2020}"),
    "ddag" => InlineCmd::Lit("\u{2021}"),
    "copyright" => InlineCmd::Lit("\u{a9}"),
    "pounds" => InlineCmd::Lit("\u{a3}"),
    "euro" => InlineCmd::Lit("\u{20ac}"),
    "aa" => InlineCmd::Lit("\u{e5}"),
    "AA" => InlineCmd::Lit("\u{c5}"),
    "ae" => InlineCmd::Lit("\u{e6}"),
    "AE" => InlineCmd::Lit("\u{c6}"),
    "o" => InlineCmd::Lit("\u{f8}"),
    "O" => InlineCmd::Lit("\u{d8}"),
    "ss" => InlineCmd::Lit("\u{df}"),
    "l" => InlineCmd::Lit("\u{142}"),
    "L" => InlineCmd::Lit("\u{141}"),
    "oe" => InlineCmd::Lit("\u{153}"),
    "OE" => InlineCmd::Lit("\u{152}"),
    "i" => InlineCmd::Lit("\u{131}"),
    "j" => InlineCmd::Lit("\u{237}"),
};

/// Block command handler tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockCmd {
    /// A section heading at the given level.
    Section(i32),
    Title,
    Subtitle,
    Author,
    Date,
    Dedication,
    Address,
    Institute,
    IcmlAuthor,
    IcmlAffiliation,
    Bibliography,
    AddBibResource,
    Nocite,
    Caption,
    HRuleBare,
    /// `\rule[raise]{width}{height}`.
    HRuleArgs,
    HyperTarget,
    DocumentClass,
    CenterLine,
    LstInputListing,
    GraphicsPath,
    Opening,
    Closing,
    /// `\setcounter{counter}{value}`; only list counters have an effect,
    /// and those are read by the enumerate parser.
    SetCounter,
}

pub(crate) static BLOCK_COMMANDS: phf::Map<&'static str, BlockCmd> = phf_map! {
    "part" => BlockCmd::Section(-1),
    "chapter" => BlockCmd::Section(0),
    "section" => BlockCmd::Section(1),
    "subsection" => BlockCmd::Section(2),
    "subsubsection" => BlockCmd::Section(3),
    "paragraph" => BlockCmd::Section(4),
    "subparagraph" => BlockCmd::Section(5),
    "frametitle" => BlockCmd::Section(3),
    "title" => BlockCmd::Title,
    "icmltitle" => BlockCmd::Title,
    "subtitle" => BlockCmd::Subtitle,
    "author" => BlockCmd::Author,
    "icmlauthor" => BlockCmd::IcmlAuthor,
    "icmlaffiliation" => BlockCmd::IcmlAffiliation,
    "date" => BlockCmd::Date,
    "dedication" => BlockCmd::Dedication,
    "address" => BlockCmd::Address,
    "institute" => BlockCmd::Institute,
    "bibliography" => BlockCmd::Bibliography,
    "addbibresource" => BlockCmd::AddBibResource,
    "nocite" => BlockCmd::Nocite,
    "caption" => BlockCmd::Caption,
    "hrule" => BlockCmd::HRuleBare,
    "rule" => BlockCmd::HRuleArgs,
    "hypertarget" => BlockCmd::HyperTarget,
    "documentclass" => BlockCmd::DocumentClass,
    "centerline" => BlockCmd::CenterLine,
    "lstinputlisting" => BlockCmd::LstInputListing,
    "graphicspath" => BlockCmd::GraphicsPath,
    "opening" => BlockCmd::Opening,
    "closing" => BlockCmd::Closing,
    "setcounter" => BlockCmd::SetCounter,
};

/// Environment handler tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Env {
    Document,
    Abstract,
    Letter,
    Figure,
    WrapFigure,
    /// A float wrapper (`table`) around a `tabular`.
    TableFloat,
    Tabular,
    /// `tabularx` and `tabular*` take a width argument before the spec.
    TabularWithWidth,
    LongTable,
    Minipage,
    Center,
    Quote,
    Quotation,
    Verse,
    Itemize,
    Enumerate,
    Description,
    Verbatim,
    Alltt,
    Lstlisting,
    Minted,
    CommentEnv,
    CodeEnv,
    ObeyLines,
    Cjk,
    /// Display math environments.
    Math,
    Proof,
    Algorithm,
    TikzPicture,
    IcmlAuthorList,
    TheBibliography,
    FigWindow,
    AdjustBox,
    Tab,
    IeeeBiography,
}

pub(crate) static ENVIRONMENTS: phf::Map<&'static str, Env> = phf_map! {
    "document" => Env::Document,
    "abstract" => Env::Abstract,
    "letter" => Env::Letter,
    "figure" => Env::Figure,
    "subfigure" => Env::Figure,
    "wrapfigure" => Env::WrapFigure,
    "figwindow" => Env::FigWindow,
    "table" => Env::TableFloat,
    "tabular" => Env::Tabular,
    "tabularx" => Env::TabularWithWidth,
    "tabular*" => Env::TabularWithWidth,
    "tabu" => Env::Tabular,
    "tabulary" => Env::TabularWithWidth,
    "longtable" => Env::LongTable,
    "TAB" => Env::Tab,
    "minipage" => Env::Minipage,
    "adjustbox" => Env::AdjustBox,
    "center" => Env::Center,
    "quote" => Env::Quote,
    "quotation" => Env::Quotation,
    "verse" => Env::Verse,
    "itemize" => Env::Itemize,
    "enumerate" => Env::Enumerate,
    "description" => Env::Description,
    "verbatim" => Env::Verbatim,
    "Verbatim" => Env::Verbatim,
    "BVerbatim" => Env::Verbatim,
    "alltt" => Env::Alltt,
    "lstlisting" => Env::Lstlisting,
    "minted" => Env::Minted,
    "comment" => Env::CommentEnv,
    "code" => Env::CodeEnv,
    "obeylines" => Env::ObeyLines,
    "CJK" => Env::Cjk,
    "displaymath" => Env::Math,
    "equation" => Env::Math,
    "gather" => Env::Math,
    "multline" => Env::Math,
    "eqnarray" => Env::Math,
    "align" => Env::Math,
    "alignat" => Env::Math,
    "empheq" => Env::Math,
    "flalign" => Env::Math,
    "proof" => Env::Proof,
    "algorithm" => Env::Algorithm,
    "tikzpicture" => Env::TikzPicture,
    "icmlauthorlist" => Env::IcmlAuthorList,
    "thebibliography" => Env::TheBibliography,
    "IEEEbiography" => Env::IeeeBiography,
};

/// Look up an environment: exact name first, then without a trailing `*`.
pub(crate) fn lookup_env(name: &str) -> Option<Env> {
    ENVIRONMENTS
        .get(name)
        .or_else(|| ENVIRONMENTS.get(name.strip_suffix('*')?))
        .copied()
}

pub(crate) fn lookup_block_command(name: &str) -> Option<BlockCmd> {
    BLOCK_COMMANDS
        .get(name)
        .or_else(|| BLOCK_COMMANDS.get(name.strip_suffix('*')?))
        .copied()
}

pub(crate) fn lookup_inline_command(name: &str) -> Option<InlineCmd> {
    INLINE_COMMANDS.get(name).copied()
}

/// `true` when the environment produces display math.
pub(crate) fn is_math_env(name: &str) -> bool {
    matches!(lookup_env(name), Some(Env::Math))
}

/// Row separators recognized inside tables; each may take a trailing
/// `[dim]`.
pub(crate) fn is_hline_command(name: &str) -> bool {
    matches!(
        name,
        "hline" | "toprule" | "midrule" | "bottomrule" | "endhead" | "endfirsthead" | "cline"
    )
}
