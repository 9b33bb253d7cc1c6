use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for a [`crate::LatexReader`].
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
pub struct ReaderOptions {
    /// Syntax extensions recognized by the reader.
    pub extensions: Extensions,
    /// Appended to image paths that lack a file extension.
    pub default_image_extension: String,
    /// Input files of the surrounding conversion. The first entry's sibling
    /// `.bbl` file is consulted when `\bibliography` is seen.
    pub input_sources: Vec<PathBuf>,
}

/// Extension flags, evaluated as read-only predicates during the parse.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
pub struct Extensions {
    /// Preserve unknown LaTeX verbatim as raw inlines/blocks.
    pub raw_tex: bool,
    /// Install and expand user-defined macros.
    pub latex_macros: bool,
    /// Smart quotes and dash/space ligatures.
    pub smart: bool,
    /// Treat `|...|` as inline code and `code` environments as literate
    /// Haskell source.
    pub literate_haskell: bool,
}

impl Default for Extensions {
    fn default() -> Self {
        Extensions {
            raw_tex: false,
            latex_macros: true,
            smart: true,
            literate_haskell: false,
        }
    }
}
