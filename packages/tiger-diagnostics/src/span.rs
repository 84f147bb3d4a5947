//! Source locations.

use std::fmt;
use std::path::{Path, PathBuf};

/// Identifies a source file registered in a [`FileIdMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(u32);

/// A source file known to the compiler. Virtual files hold their source
/// in memory and are used by the test harness.
#[derive(Debug)]
enum SourceFile {
    Disk(PathBuf),
    Virtual { name: String, source: String },
}

/// Interns source files and hands out [`FileId`]s for them.
#[derive(Debug, Default)]
pub struct FileIdMap {
    files: Vec<SourceFile>,
}

impl FileIdMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file on disk and return its id.
    pub fn insert_new_file(&mut self, path: PathBuf) -> FileId {
        self.files.push(SourceFile::Disk(path));
        FileId(self.files.len() as u32 - 1)
    }

    /// Register an in-memory file and return its id.
    pub fn create_virtual_file(&mut self, name: impl Into<String>, source: String) -> FileId {
        self.files.push(SourceFile::Virtual {
            name: name.into(),
            source,
        });
        FileId(self.files.len() as u32 - 1)
    }

    pub fn is_virtual(&self, id: FileId) -> bool {
        matches!(self.files[id.0 as usize], SourceFile::Virtual { .. })
    }

    /// The source of a virtual file. Panics if `id` refers to a disk file.
    pub fn get_virtual_source(&self, id: FileId) -> &str {
        match &self.files[id.0 as usize] {
            SourceFile::Virtual { source, .. } => source,
            SourceFile::Disk(path) => {
                panic!("file `{}` is not a virtual file", path.display())
            }
        }
    }

    /// The path of a disk file. Panics if `id` refers to a virtual file.
    pub fn get_file_path(&self, id: FileId) -> &Path {
        match &self.files[id.0 as usize] {
            SourceFile::Disk(path) => path,
            SourceFile::Virtual { name, .. } => {
                panic!("file `{name}` is not a disk file")
            }
        }
    }

    /// A human-readable name for the file, as shown in diagnostics.
    pub fn get_file_display(&self, id: FileId) -> String {
        match &self.files[id.0 as usize] {
            SourceFile::Disk(path) => path.display().to_string(),
            SourceFile::Virtual { name, .. } => name.clone(),
        }
    }
}

/// A span of text in a source file.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// The index of the first byte in the span.
    pub start: u32,
    /// The index of the first byte after the span.
    pub end: u32,
    pub file_id: FileId,
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// An AST node together with its span.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Spanned<T>(pub T, pub Span);

impl<T: fmt::Debug> fmt::Debug for Spanned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}..{}) ", self.1.start, self.1.end)?;
        self.0.fmt(f)
    }
}

impl<T> std::ops::Deref for Spanned<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl<T> std::ops::DerefMut for Spanned<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

pub fn spanned<T>(span: Span, node: T) -> Spanned<T> {
    Spanned(node, span)
}

impl<T> Spanned<T> {
    /// Get the unspanned node.
    pub fn unspan(self) -> T {
        self.0
    }

    pub fn respan(self, span: Span) -> Self {
        spanned(span, self.0)
    }

    pub fn span(&self) -> Span {
        self.1
    }

    pub fn as_ref(&self) -> &T {
        &self.0
    }
}
