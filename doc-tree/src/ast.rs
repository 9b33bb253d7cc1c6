use crate::attr::{Attr, ListAttrs, Target};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub type Inlines = Vec<Inline>;
pub type Blocks = Vec<Block>;

/// Inline-level content.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Inline {
    Str(String),
    Space,
    SoftBreak,
    LineBreak,
    Emph(Inlines),
    Strong(Inlines),
    Smallcaps(Inlines),
    Strikeout(Inlines),
    Superscript(Inlines),
    Subscript(Inlines),
    Quoted(QuoteKind, Inlines),
    Code(Attr, String),
    Math(MathKind, String),
    Link(Attr, Inlines, Target),
    Image(Attr, Inlines, Target),
    Cite(Vec<Citation>, Inlines),
    Note(Blocks),
    RawInline(String, String),
    Span(Attr, Inlines),
}

/// Block-level content.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Block {
    Plain(Inlines),
    Para(Inlines),
    Header(i32, Attr, Inlines),
    BulletList(Vec<Blocks>),
    OrderedList(ListAttrs, Vec<Blocks>),
    DefinitionList(Vec<(Inlines, Vec<Blocks>)>),
    CodeBlock(Attr, String),
    BlockQuote(Blocks),
    HorizontalRule,
    Table(Table),
    Div(Attr, Blocks),
    RawBlock(String, String),
}

impl Block {
    /// The direct inline content of this block, if it has any.
    pub fn inlines(&self) -> Option<&[Inline]> {
        match self {
            Block::Plain(inlines) | Block::Para(inlines) | Block::Header(_, _, inlines) => {
                Some(inlines)
            }
            _ => None,
        }
    }
}

/// A table: caption, per-column alignment and relative width, an optional
/// header row, and body rows. Cells are lists of blocks.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Table {
    pub caption: Inlines,
    pub aligns: Vec<Alignment>,
    pub widths: Vec<f64>,
    pub header: Vec<Blocks>,
    pub rows: Vec<Vec<Blocks>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Alignment {
    Left,
    Right,
    Center,
    #[default]
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum QuoteKind {
    Single,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MathKind {
    Inline,
    Display,
}

/// One citation within a [`Inline::Cite`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Citation {
    pub id: String,
    pub prefix: Inlines,
    pub suffix: Inlines,
    pub mode: CitationMode,
    pub note_num: u32,
    pub hash: u32,
}

impl Citation {
    pub fn new(id: impl Into<String>, mode: CitationMode) -> Self {
        Citation {
            id: id.into(),
            prefix: Vec::new(),
            suffix: Vec::new(),
            mode,
            note_num: 0,
            hash: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CitationMode {
    Normal,
    AuthorInText,
    SuppressAuthor,
}
