use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// An ordered list of input files.
///
/// Order is significant: it is the order in which contents are joined.
/// Entries are never sorted or deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileList {
    paths: Vec<PathBuf>,
}

impl FileList {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Resolve relative entries against `base`, keeping absolute ones as they are.
    pub fn resolve(&self, base: &Path) -> Self {
        self.paths.iter().map(|p| base.join(p)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Entries that do not exist or are not regular files.
    pub fn missing(&self) -> Vec<&Path> {
        self.iter().filter(|p| !p.is_file()).collect()
    }

    /// Entries listed more than once, reported at their second occurrence.
    pub fn duplicates(&self) -> Vec<&Path> {
        let mut seen = HashSet::new();
        self.iter().filter(|p| !seen.insert(*p)).collect()
    }
}

impl FromIterator<PathBuf> for FileList {
    fn from_iter<T: IntoIterator<Item = PathBuf>>(iter: T) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FileList {
    type Item = &'a Path;
    type IntoIter = std::iter::Map<std::slice::Iter<'a, PathBuf>, fn(&PathBuf) -> &Path>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter().map(PathBuf::as_path as fn(&PathBuf) -> &Path)
    }
}
