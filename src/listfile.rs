//! Extra arguments read from list files (-l)

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::os::unix::ffi::OsStringExt;
use std::path::Path;

use crate::error::{Result, RrError};

/// Read one argument per line from `path`, or from stdin for `-`.
///
/// Lines are taken as raw bytes, verbatim apart from the trailing `\n`.
pub fn read_lines(path: &Path) -> Result<Vec<OsString>> {
    if path == Path::new("-") {
        let stdin = io::stdin();
        return collect(stdin.lock(), path);
    }
    if path.is_dir() {
        return Err(RrError::ListIsDirectory(path.to_path_buf()));
    }
    let file = File::open(path).map_err(|source| RrError::ListFile {
        path: path.to_path_buf(),
        source,
    })?;
    collect(BufReader::new(file), path)
}

/// Append the lines of every list file to `tokens`, in order
pub fn extend_from_lists<P: AsRef<Path>>(
    tokens: &mut Vec<OsString>,
    lists: &[P],
) -> Result<()> {
    for list in lists {
        tokens.extend(read_lines(list.as_ref())?);
    }
    Ok(())
}

fn collect<R: BufRead>(mut reader: R, path: &Path) -> Result<Vec<OsString>> {
    let mut lines = Vec::new();
    loop {
        let mut line = Vec::new();
        let read = reader
            .read_until(b'\n', &mut line)
            .map_err(|source| RrError::ListFile {
                path: path.to_path_buf(),
                source,
            })?;
        if read == 0 {
            return Ok(lines);
        }
        if line.last() == Some(&b'\n') {
            line.pop();
        }
        lines.push(OsString::from_vec(line));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_reads_lines_verbatim() {
        let tmp = TempDir::new().unwrap();
        let list = tmp.path().join("list");
        fs::write(&list, "a b\n  spaced  \n$HOME'\"\n").unwrap();
        assert_eq!(
            read_lines(&list).unwrap(),
            vec!["a b", "  spaced  ", "$HOME'\""]
        );
    }

    #[test]
    fn test_last_line_without_newline() {
        let tmp = TempDir::new().unwrap();
        let list = tmp.path().join("list");
        fs::write(&list, "one\ntwo").unwrap();
        assert_eq!(read_lines(&list).unwrap(), vec!["one", "two"]);
    }

    #[test]
    fn test_carriage_return_is_kept() {
        let tmp = TempDir::new().unwrap();
        let list = tmp.path().join("list");
        fs::write(&list, "a\r\nb\r\n").unwrap();
        assert_eq!(read_lines(&list).unwrap(), vec!["a\r", "b\r"]);
    }

    #[test]
    fn test_non_utf8_line_is_kept() {
        use std::os::unix::ffi::OsStrExt;
        let tmp = TempDir::new().unwrap();
        let list = tmp.path().join("list");
        fs::write(&list, b"ok\ncaf\xe9.mp3\n").unwrap();
        let lines = read_lines(&list).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "ok");
        assert_eq!(lines[1].as_bytes(), b"caf\xe9.mp3");
    }

    #[test]
    fn test_blank_lines_are_arguments() {
        let lines = collect(io::Cursor::new(b"a\n\nb\n"), Path::new("mem")).unwrap();
        assert_eq!(lines, vec!["a", "", "b"]);
    }

    #[test]
    fn test_empty_file_adds_nothing() {
        let tmp = TempDir::new().unwrap();
        let list = tmp.path().join("empty");
        fs::write(&list, "").unwrap();
        let mut tokens = vec![OsString::from("cmd")];
        extend_from_lists(&mut tokens, &[&list]).unwrap();
        assert_eq!(tokens, vec!["cmd"]);
    }

    #[test]
    fn test_directory_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let err = read_lines(tmp.path()).unwrap_err();
        assert!(matches!(err, RrError::ListIsDirectory(_)));
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = read_lines(Path::new("/nonexistent/rr-list")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/rr-list"));
    }
}
