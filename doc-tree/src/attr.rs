#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier, classes, and key-value attributes attached to a node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Attr {
    pub identifier: String,
    pub classes: Vec<String>,
    pub attributes: Vec<(String, String)>,
}

impl Attr {
    pub fn empty() -> Self {
        Attr::default()
    }

    pub fn from_id(identifier: impl Into<String>) -> Self {
        Attr {
            identifier: identifier.into(),
            ..Attr::default()
        }
    }

    pub fn from_classes<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Attr {
            classes: classes.into_iter().map(Into::into).collect(),
            ..Attr::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.identifier.is_empty() && self.classes.is_empty() && self.attributes.is_empty()
    }
}

/// Link or image target.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Target {
    pub url: String,
    pub title: String,
}

impl Target {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Target {
            url: url.into(),
            title: title.into(),
        }
    }
}

/// Numbering of an ordered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ListAttrs {
    pub start: i32,
    pub style: ListStyle,
    pub delim: ListDelim,
}

impl Default for ListAttrs {
    fn default() -> Self {
        ListAttrs {
            start: 1,
            style: ListStyle::Default,
            delim: ListDelim::Default,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ListStyle {
    #[default]
    Default,
    Decimal,
    LowerRoman,
    UpperRoman,
    LowerAlpha,
    UpperAlpha,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ListDelim {
    #[default]
    Default,
    Period,
    OneParen,
    TwoParens,
}
