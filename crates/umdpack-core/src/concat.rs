use std::fs;

use log::debug;

use crate::config::ConcatOptions;
use crate::error::ReadError;
use crate::file_list::FileList;
use crate::Concatenator;

/// Reads every listed file from disk and joins the contents in list order.
///
/// All files are read before anything is returned, so a missing entry fails
/// the stage without producing a partial artifact.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsConcatenator;

impl Concatenator for FsConcatenator {
    fn concatenate(&self, files: &FileList, options: &ConcatOptions) -> Result<Vec<u8>, ReadError> {
        let mut contents = Vec::with_capacity(files.len());
        for path in files {
            let bytes = fs::read(path).map_err(|source| ReadError {
                path: path.to_path_buf(),
                source,
            })?;
            debug!("read {} ({} bytes)", path.display(), bytes.len());
            contents.push(bytes);
        }
        Ok(join(contents.iter().map(Vec::as_slice), options))
    }
}

/// Join file contents with the configured banner, separator and footer.
///
/// With default options this is a plain byte join: nothing is inserted
/// between files, and trailing newlines are kept exactly as they are.
pub fn join<'a>(parts: impl IntoIterator<Item = &'a [u8]>, options: &ConcatOptions) -> Vec<u8> {
    let mut out = Vec::from(options.banner.as_bytes());
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            out.extend_from_slice(options.separator.as_bytes());
        }
        out.extend_from_slice(part);
    }
    out.extend_from_slice(options.footer.as_bytes());
    out
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_joins_without_separator() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.js", "var x=1;");
        let b = write(dir.path(), "b.js", "var y=2;");

        let out = FsConcatenator
            .concatenate(&FileList::new([a, b]), &ConcatOptions::default())
            .unwrap();
        assert_eq!(out, b"var x=1;var y=2;");
    }

    #[test]
    fn test_order_follows_list() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.js", "A\n");
        let b = write(dir.path(), "b.js", "B\n");

        let out = FsConcatenator
            .concatenate(&FileList::new([b, a]), &ConcatOptions::default())
            .unwrap();
        assert_eq!(out, b"B\nA\n");
    }

    #[test]
    fn test_duplicate_entries_are_joined_twice() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.js", "a;");

        let out = FsConcatenator
            .concatenate(&FileList::new([a.clone(), a]), &ConcatOptions::default())
            .unwrap();
        assert_eq!(out, b"a;a;");
    }

    #[test]
    fn test_empty_list_yields_empty_artifact() {
        let out = FsConcatenator
            .concatenate(&FileList::default(), &ConcatOptions::default())
            .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.js", "a;");
        let missing = dir.path().join("missing.js");

        let err = FsConcatenator
            .concatenate(&FileList::new([a, missing.clone()]), &ConcatOptions::default())
            .unwrap_err();
        assert_eq!(err.path, missing);
        assert_eq!(err.source.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn test_join_with_options() {
        let options = ConcatOptions {
            banner: "/*!*/\n".to_string(),
            separator: "\n;".to_string(),
            footer: "\n".to_string(),
        };
        let out = join([b"a".as_slice(), b"b".as_slice(), b"c".as_slice()], &options);
        assert_eq!(out, b"/*!*/\na\n;b\n;c\n");
        assert_eq!(join(std::iter::empty(), &options), b"/*!*/\n\n");
    }

    #[test]
    fn test_non_utf8_bytes_pass_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.js");
        fs::write(&path, [b'/', b'/', 0xe9, b'\n']).unwrap();

        let out = FsConcatenator
            .concatenate(&FileList::new([path]), &ConcatOptions::default())
            .unwrap();
        assert_eq!(out, [b'/', b'/', 0xe9, b'\n']);
    }
}
