use crate::error::Result;
use chrono::{DateTime, Local};
use std::path::Path;

/// The two files being compared, as read from disk.
#[derive(Debug, Default)]
pub struct FilePair {
    pub names: [String; 2],
    pub contents: [String; 2],
    /// Modification times, formatted for patch headers.
    pub dates: [String; 2],
}

impl FilePair {
    /// Both files split into lines that keep their terminators.
    pub fn lines(&self) -> [Vec<&str>; 2] {
        [split_lines_keepends(&self.contents[0]), split_lines_keepends(&self.contents[1])]
    }
}

/// Splits after every `\n`. A final line without terminator is kept as is.
pub fn split_lines_keepends(text: &str) -> Vec<&str> {
    let mut lines = vec![];
    let mut start = 0;
    for end in memchr::memchr_iter(b'\n', text.as_bytes()) {
        lines.push(&text[start..=end]);
        start = end + 1;
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// Reads a file, replacing invalid UTF-8 sequences.
pub fn read_text(path: &Path) -> Result<String> {
    Ok(String::from_utf8_lossy(&std::fs::read(path)?).into_owned())
}

/// The modification time of `path` in local time, ISO 8601 with microseconds.
pub fn file_mtime(path: &Path) -> Result<String> {
    let modified: DateTime<Local> = std::fs::metadata(path)?.modified()?.into();
    Ok(modified.format("%Y-%m-%dT%H:%M:%S%.6f%:z").to_string())
}

pub fn read_file_pair(old_name: &str, new_name: &str) -> Result<FilePair> {
    let mut result = FilePair::default();
    for (side, name) in [old_name, new_name].into_iter().enumerate() {
        let path = Path::new(name);
        result.contents[side] = read_text(path)?;
        result.dates[side] = file_mtime(path)?;
        result.names[side] = name.to_owned();
    }
    tracing::debug!(
        old_bytes = result.contents[0].len(),
        new_bytes = result.contents[1].len(),
        "read input files"
    );
    Ok(result)
}
