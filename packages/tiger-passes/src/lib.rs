//! Analysis passes for the Tiger front end.

pub mod display;
pub mod escape;
pub mod scope;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tiger_diagnostics::span::FileId;
use tiger_diagnostics::Diagnostics;
use tiger_parser::ast::Program;
use tiger_parser::parser::{ParseError, Parser};

use self::escape::resolve_escapes;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("IO error: {0}.")]
    Io(#[from] std::io::Error),
    #[error("File `{0}` has wrong file extension. Tiger source files should end with the `.tig` extension.")]
    BadFileExtension(PathBuf),
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

/// A file that has been parsed.
#[derive(Debug)]
pub struct ParsedFile {
    pub path: PathBuf,
    /// The name of the file without the extension.
    pub name: String,
    /// The complete source code of the file.
    pub source: String,
    pub ast: Program,
}

/// Parses a file at the specified path and returns a [`ParsedFile`] result.
///
/// # Params
/// * `path` - The path of the file to be parsed.
/// * `file_id` - The [`FileId`] of the file. This information is included in
///   the spans produced by the parser.
pub fn parse_file(
    path: &Path,
    file_id: FileId,
    diagnostics: Diagnostics,
) -> Result<ParsedFile, CompileError> {
    let source = std::fs::read_to_string(path)?;

    let extension = path.extension().map(|s| s.to_string_lossy().to_string());
    if extension.as_deref() != Some("tig") {
        return Err(CompileError::BadFileExtension(path.into()));
    }
    let name = path.file_stem().unwrap().to_string_lossy().to_string();

    let mut parser = Parser::new(file_id, &source, diagnostics);
    let ast = parser.parse_program()?;
    Ok(ParsedFile {
        path: path.to_path_buf(),
        name,
        source,
        ast,
    })
}

/// Run the analysis passes over a parsed program.
///
/// Currently this is escape analysis only. It must run before frame layout,
/// which consumes the escape flags to decide where each binding lives.
pub fn run_front_passes(program: &Program) {
    resolve_escapes(program);
}
