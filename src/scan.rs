//! Lists source files for a build. Pages and templates are gathered
//! recursively; posts live flat in their source directory. Listings are
//! sorted by path so every build visits sources in the same order, and a
//! missing source directory is an empty listing rather than an error.

use std::fs::read_dir;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively lists the files under `dir`, sorted by path. Files without an
/// extension (editor droppings, READMEs saved bare) are skipped.
pub fn recursive(dir: &Path) -> io::Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for result in WalkDir::new(dir) {
        let entry = result.map_err(io::Error::from)?;
        if entry.file_type().is_file() && entry.path().extension().is_some() {
            files.push(entry.path().to_owned());
        }
    }
    files.sort();
    Ok(files)
}

/// Lists the files directly under `dir`, sorted by path. Subdirectories are
/// not descended into; posts are a flat collection.
pub fn flat(dir: &Path) -> io::Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for result in read_dir(dir)? {
        let entry = result?;
        if entry.file_type()?.is_file() && entry.path().extension().is_some() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn test_flat_skips_subdirectories() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("b.md"), "")?;
        fs::write(dir.path().join("a.md"), "")?;
        fs::create_dir(dir.path().join("nested"))?;
        fs::write(dir.path().join("nested").join("c.md"), "")?;

        let files = flat(dir.path())?;
        let names: Vec<_> = files
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect();
        assert_eq!(names, vec!["a.md", "b.md"]);
        Ok(())
    }

    #[test]
    fn test_recursive_descends() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::create_dir(dir.path().join("nested"))?;
        fs::write(dir.path().join("nested").join("c.md"), "")?;
        fs::write(dir.path().join("a.md"), "")?;

        let files = recursive(dir.path())?;
        assert_eq!(files.len(), 2);
        Ok(())
    }

    #[test]
    fn test_missing_directory_is_empty() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        assert!(flat(&dir.path().join("ghost"))?.is_empty());
        assert!(recursive(&dir.path().join("ghost"))?.is_empty());
        Ok(())
    }
}
