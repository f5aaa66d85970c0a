//! Annotation modes

use std::fmt::{self, Display, Formatter};

/// How the next text selection is interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AnnotationMode {
    /// One selection, one span
    #[default]
    Normal,
    /// Selections accumulate into one discontiguous tag
    MultiSpan,
    /// Selected extent tags become arguments of a new link
    ArgumentSelection,
}

impl AnnotationMode {
    /// Check if selections accumulate instead of replacing each other
    #[inline]
    #[must_use]
    pub fn accumulates(self) -> bool {
        !matches!(self, Self::Normal)
    }
}

impl Display for AnnotationMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Normal => "normal",
            Self::MultiSpan => "multi-span",
            Self::ArgumentSelection => "argument selection",
        })
    }
}
