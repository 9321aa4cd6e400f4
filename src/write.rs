//! The output side of a build: durably writing rendered files, preparing the
//! output directory, and copying static assets.

use std::fs;
use std::io;
use std::path::Path;

/// Writes `contents` to `path`, creating parent directories as needed.
pub fn write_file(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}

/// Removes `dir` and everything under it, then recreates it empty. A
/// directory that doesn't exist yet is fine; anything else that keeps the
/// removal or creation from succeeding is not.
pub fn clean_dir(dir: &Path) -> io::Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    fs::create_dir_all(dir)
}

/// Recursively copies the contents of `src` into `dst`.
pub fn copy_dir(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &dst.join(entry.file_name()))?;
        } else {
            fs::copy(entry.path(), dst.join(entry.file_name()))?;
        }
    }
    Ok(())
}
