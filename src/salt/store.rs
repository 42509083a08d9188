//! Plain-text salt list, one token per line.

use super::{SaltError, SaltToken};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Line terminator written after every token.
#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
/// Line terminator written after every token.
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";

/// Writes `tokens` to `path` in order, each followed by [`LINE_ENDING`].
///
/// The file only appears once it is complete.
pub fn write_salts(tokens: &[SaltToken], path: impl AsRef<Path>) -> Result<(), SaltError> {
    let path = path.as_ref();
    let io_err = |source| SaltError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        for token in tokens {
            writer.write_all(token.as_str().as_bytes()).map_err(io_err)?;
            writer.write_all(LINE_ENDING.as_bytes()).map_err(io_err)?;
        }
        writer.flush().map_err(io_err)?;
    }
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    tracing::debug!(path = %path.display(), count = tokens.len(), "Salt file written");
    Ok(())
}

/// Reads a salt list written by [`write_salts`]. Blank lines are skipped.
pub fn read_salts(path: impl AsRef<Path>) -> Result<Vec<SaltToken>, SaltError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| SaltError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(index, line)| {
            SaltToken::new(line).ok_or_else(|| SaltError::MalformedLine {
                path: path.to_path_buf(),
                line: index + 1,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(hex: &[&str]) -> Vec<SaltToken> {
        hex.iter().map(|h| SaltToken::new(*h).unwrap()).collect()
    }

    #[test]
    fn test_write_one_line_per_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("salts.txt");

        write_salts(&tokens(&["6", "ab", "f00d"]), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, format!("6{0}ab{0}f00d{0}", LINE_ENDING));
    }

    #[test]
    fn test_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("salts.txt");
        let written = tokens(&["0", "deadbeef", "c"]);

        write_salts(&written, &path).unwrap();
        assert_eq!(read_salts(&path).unwrap(), written);
    }

    #[test]
    fn test_unwritable_path_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("salts.txt");

        let result = write_salts(&tokens(&["1"]), &path);
        assert!(matches!(result, Err(SaltError::Io { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn test_malformed_line_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.txt");
        std::fs::write(&path, "ab\nxyz\n").unwrap();

        assert!(matches!(
            read_salts(&path),
            Err(SaltError::MalformedLine { line: 2, .. })
        ));
    }
}
