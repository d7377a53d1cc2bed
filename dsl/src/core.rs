//! Identifiers and source positions.
//!
//! The language compares identifiers without regard to case, so `Id` keeps
//! both the text as written and an upper-cased form and implements equality
//! and hashing on the folded form.
use core::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;

/// FileId identifies the origin of source code.
///
/// Most identifiers and diagnostics point into a source file. Items that are
/// intrinsic to the compiler (the built-in procedures) have no file and use
/// the `BuiltIn` variant.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum FileId {
    /// Source code from a file. The string is the file path.
    File(Arc<str>),
    /// Built-in to the compiler (the runtime-library procedures).
    BuiltIn,
}

impl FileId {
    /// Creates a file identifier from the path.
    pub fn from_path(path: &Path) -> Self {
        FileId::File(Arc::from(path.to_string_lossy().as_ref()))
    }

    /// Creates a file identifier from the slice, normally the file path.
    pub fn from_string(path: &str) -> Self {
        FileId::File(Arc::from(path))
    }

    /// Creates a file identifier for built-in items.
    pub fn builtin() -> Self {
        FileId::BuiltIn
    }
}

impl Default for FileId {
    fn default() -> Self {
        FileId::File(Arc::from(""))
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileId::File(path) => write!(f, "{}", path),
            FileId::BuiltIn => write!(f, "<builtin>"),
        }
    }
}

/// Location in a file of a language element instance.
///
/// The location is defined by byte indices in the source file.
#[derive(Debug, Clone)]
pub struct SourceSpan {
    /// The position of the starting character (0-indexed).
    pub start: usize,
    /// The position one past the ending character (0-indexed).
    pub end: usize,
    pub file_id: FileId,
}

impl SourceSpan {
    pub fn range(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            file_id: FileId::default(),
        }
    }

    pub fn with_file_id(&self, file_id: &FileId) -> Self {
        Self {
            start: self.start,
            end: self.end,
            file_id: file_id.clone(),
        }
    }

    /// Creates a span for built-in items, which have no meaningful position.
    pub fn builtin() -> Self {
        Self {
            start: 0,
            end: 0,
            file_id: FileId::builtin(),
        }
    }
}

impl Default for SourceSpan {
    fn default() -> Self {
        SourceSpan::range(0, 0)
    }
}

impl PartialEq for SourceSpan {
    fn eq(&self, _other: &Self) -> bool {
        // Two items are rarely compared by where they were declared. Making
        // spans compare equal lets every span-carrying type derive PartialEq
        // on its meaningful fields alone.
        true
    }
}
impl Eq for SourceSpan {}

/// Defines an element that has a location in source code.
pub trait Located {
    /// Get the source code position of the object.
    fn span(&self) -> SourceSpan;
}

/// An identifier with case-insensitive identity.
///
/// The language declares that identifiers are case insensitive. `Id` keeps
/// the original spelling for display and an upper-cased form for comparison
/// and hashing, so containers keyed by `Id` behave correctly.
pub struct Id {
    pub original: String,
    pub upper_case: String,
    pub span: SourceSpan,
}

impl Id {
    /// Converts a `&str` into an `Id`.
    pub fn from(str: &str) -> Self {
        Id {
            original: String::from(str),
            upper_case: str.to_uppercase(),
            span: SourceSpan::default(),
        }
    }

    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = span;
        self
    }

    /// The upper-cased form used for identity.
    pub fn upper_case(&self) -> &str {
        &self.upper_case
    }

    /// The identifier as written in the source.
    pub fn original(&self) -> &str {
        &self.original
    }
}

impl Clone for Id {
    fn clone(&self) -> Self {
        Id::from(self.original.as_str()).with_span(self.span.clone())
    }
}

impl PartialEq for Id {
    fn eq(&self, other: &Self) -> bool {
        self.upper_case == other.upper_case
    }
}
impl Eq for Id {}

impl Hash for Id {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.upper_case.hash(state);
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl Located for Id {
    fn span(&self) -> SourceSpan {
        self.span.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn id_when_different_case_then_equal() {
        assert_eq!(Id::from("counter"), Id::from("COUNTER"));
        assert_eq!(Id::from("MixedCase"), Id::from("mIXEDcASE"));
    }

    #[test]
    fn id_when_different_name_then_not_equal() {
        assert_ne!(Id::from("a"), Id::from("b"));
    }

    #[test]
    fn id_when_map_key_then_lookup_ignores_case() {
        let mut map = HashMap::new();
        map.insert(Id::from("Value"), 1);
        assert_eq!(map.get(&Id::from("VALUE")), Some(&1));
        assert_eq!(map.get(&Id::from("value")), Some(&1));
    }

    #[test]
    fn id_when_display_then_original_spelling() {
        assert_eq!(format!("{}", Id::from("GetBool")), "GetBool");
    }

    #[test]
    fn file_id_when_builtin_then_display_marker() {
        assert_eq!(format!("{}", FileId::builtin()), "<builtin>");
    }
}
