use std::path::{Path, PathBuf};

use crate::error::{DatasetError, Result};

/// Recursively lists `*.wav` files under `dir`, sorted by path.
///
/// A missing directory yields an empty list.
pub(crate) fn find_wavs(dir: &Path) -> Result<Vec<PathBuf>> {
    fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
        let entries = std::fs::read_dir(dir).map_err(|e| DatasetError::io(dir, e))?;
        for entry in entries {
            let path = entry.map_err(|e| DatasetError::io(dir, e))?.path();
            if path.is_dir() {
                walk(&path, out)?;
            } else if path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
            {
                out.push(path);
            }
        }
        Ok(())
    }

    let mut paths = Vec::new();
    if dir.is_dir() {
        walk(dir, &mut paths)?;
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_wavs() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("noise/free-sound");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("b.wav"), b"").unwrap();
        std::fs::write(nested.join("a.WAV"), b"").unwrap();
        std::fs::write(nested.join("notes.txt"), b"").unwrap();

        let found = find_wavs(dir.path()).unwrap();
        assert_eq!(found, vec![nested.join("a.WAV"), nested.join("b.wav")]);
        assert!(find_wavs(&dir.path().join("missing")).unwrap().is_empty());
    }
}
