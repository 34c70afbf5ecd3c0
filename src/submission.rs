#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    io,
    path::{Path, PathBuf},
};

use crate::{Error, Result, prompt::concat_sources};

/// Characters that make an argument a glob pattern rather than a path.
const GLOB_META: [char; 3] = ['*', '?', '['];

/// Reads a UTF-8 text file.
pub fn read_text(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|source| Error::FileAccess {
        path: path.to_path_buf(),
        source,
    })
}

/// A student's source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Base name of the file, e.g. `BankAccount.java`.
    name:    String,
    /// File contents, untouched.
    content: String,
}

impl SourceFile {
    /// Creates a source file from a name and its contents.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name:    name.into(),
            content: content.into(),
        }
    }

    /// Reads `path`, keeping only its base name.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, read_text(path)?))
    }

    /// Base name of the file.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File contents.
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Everything a student handed in, in the order it was given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    /// The files.
    files: Vec<SourceFile>,
}

impl Submission {
    /// Wraps already loaded files.
    pub fn from_files(files: impl IntoIterator<Item = SourceFile>) -> Self {
        Self {
            files: files.into_iter().collect(),
        }
    }

    /// Loads files named by `patterns`.
    ///
    /// Plain paths, and existing files whatever their name, are read as given.
    /// Other arguments containing `*`, `?` or `[` are expanded in sorted order
    /// and must match at least one file. A path that was already loaded is
    /// skipped.
    pub fn load<I, P>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let mut seen: Vec<PathBuf> = Vec::new();
        let mut files = Vec::new();

        for pattern in patterns {
            for path in expand(pattern.as_ref())? {
                if seen.contains(&path) {
                    tracing::debug!("Skipping duplicate {}", path.display());
                    continue;
                }
                tracing::info!("Reading {}", path.display());
                files.push(SourceFile::read(&path)?);
                seen.push(path);
            }
        }

        Ok(Self { files })
    }

    /// Loaded files.
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    /// Whether nothing was loaded.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// All files joined with begin/end markers carrying their base names.
    pub fn concatenated(&self) -> String {
        concat_sources(self.files.iter().map(|f| (f.name(), f.content())))
    }
}

/// Resolves one command-line argument into paths. An existing file is taken
/// literally even when its name contains glob metacharacters.
fn expand(pattern: &str) -> Result<Vec<PathBuf>> {
    if !pattern.contains(GLOB_META) || Path::new(pattern).exists() {
        return Ok(vec![PathBuf::from(pattern)]);
    }

    let not_found = |source: io::Error| Error::FileAccess {
        path: PathBuf::from(pattern),
        source,
    };

    let entries = glob::glob(pattern)
        .map_err(|e| not_found(io::Error::new(io::ErrorKind::InvalidInput, e.msg)))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| not_found(e.into_error()))?;
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    if paths.is_empty() {
        return Err(not_found(io::Error::new(
            io::ErrorKind::NotFound,
            "pattern matched no files",
        )));
    }
    Ok(paths)
}
