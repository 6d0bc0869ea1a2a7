use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

use regex::Regex;

/// Levenshtein distance used when `Options::max_edit_distance` is 0.
pub const DEFAULT_MAX_EDIT_DISTANCE: usize = 5;

#[derive(Debug, Clone, Default)]
pub struct Options {
    pub ignore_whitespace: bool,
    pub ignore_blank_lines: bool,
    pub min_line_length: usize,
    pub min_similar_lines: usize,
    pub max_edit_distance: usize,
    pub ignore_line_regex: Option<Regex>,
    pub always_different_line_regex: Option<Regex>,
}

impl Options {
    pub(crate) fn effective_max_edit_distance(&self) -> usize {
        if self.max_edit_distance == 0 {
            DEFAULT_MAX_EDIT_DISTANCE
        } else {
            self.max_edit_distance
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SimilarityLevel {
    Different,
    Similar,
    Equal,
}

/// A named source of text lines. The reader is consumed once, up to EOF,
/// when a run starts.
pub struct File {
    pub(crate) name: String,
    pub(crate) reader: Box<dyn io::Read + Send>,
}

impl File {
    pub fn new(name: impl Into<String>, reader: impl io::Read + Send + 'static) -> Self {
        Self {
            name: name.into(),
            reader: Box::new(reader),
        }
    }

    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = fs::File::open(path)?;
        Ok(Self::new(path.to_string_lossy().into_owned(), file))
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("File").field("name", &self.name).finish()
    }
}

/// A half-open range of lines `[start, end)` within one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub file: Arc<str>,
    pub start: usize,
    pub end: usize,
}

/// A match of text ranges, spanning two or more occurrences across one or
/// more files. The level is `Equal` only if every line pair compared while
/// building the match was exactly equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Similarity {
    pub occurrences: Vec<Occurrence>,
    pub level: SimilarityLevel,
}

/// Reported once per input file, after that file has been fully processed.
#[derive(Debug, Clone)]
pub struct Progress {
    pub file: Arc<str>,
    /// Overall completion percentage, 0 to 100.
    pub done: f64,
    pub eta: SystemTime,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("read {name}: {source}")]
    ReadFile {
        name: String,
        #[source]
        source: io::Error,
    },
}
