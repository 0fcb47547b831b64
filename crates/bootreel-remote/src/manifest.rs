//! Upload manifest: what a deployment actually created on the device.

use std::fmt;

/// Kind of manifest entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One created directory or transferred file, relative to the target root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub path: String,
    pub kind: EntryKind,
}

impl fmt::Display for ManifestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EntryKind::File => f.write_str(&self.path),
            EntryKind::Directory => write!(f, "{}/", self.path),
        }
    }
}

/// Ordered list of entries written during a deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_file(&mut self, path: impl Into<String>) {
        self.entries.push(ManifestEntry {
            path: path.into(),
            kind: EntryKind::File,
        });
    }

    pub fn push_dir(&mut self, path: impl Into<String>) {
        self.entries.push(ManifestEntry {
            path: path.into(),
            kind: EntryKind::Directory,
        });
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of transferred files.
    pub fn file_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.kind == EntryKind::File)
            .count()
    }

    /// Number of created directories.
    pub fn dir_count(&self) -> usize {
        self.len() - self.file_count()
    }

    /// Human-readable one-line result.
    pub fn summary(&self) -> String {
        format!(
            "Uploaded {} entries ({} files, {} directories)",
            self.len(),
            self.file_count(),
            self.dir_count()
        )
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a ManifestEntry;
    type IntoIter = std::slice::Iter<'a, ManifestEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
