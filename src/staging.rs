use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// An uploaded image written to the staging directory.
///
/// The file is removed when the guard is dropped, so every exit path of the flow
/// that created it cleans up, including early returns through `?`.
#[derive(Debug)]
pub struct StagedImageFile {
    path: PathBuf,
}

impl StagedImageFile {
    /// Writes `bytes` under `dir`, creating the directory if needed. Only the final
    /// component of `upload_name` is used, prefixed with a random tag so concurrent
    /// uploads of the same name never share a file.
    pub fn create(dir: &Path, upload_name: &str, bytes: &[u8]) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let name = Path::new(upload_name)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload");
        let staged = Self {
            path: dir.join(format!("{:08x}-{name}", rand::random::<u32>())),
        };
        fs::write(&staged.path, bytes)?;
        debug!("Staged {} bytes at {}", bytes.len(), staged.path.display());
        Ok(staged)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.path)
    }
}

impl Drop for StagedImageFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed staged file {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Could not remove staged file {}: {}", self.path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_lives_as_long_as_the_guard() {
        let dir = tempfile::tempdir().unwrap();
        let staged = StagedImageFile::create(dir.path(), "cat.png", b"meow").unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(staged.read().unwrap(), b"meow");
        drop(staged);
        assert!(!path.exists());
    }

    #[test]
    fn creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("images");
        let staged = StagedImageFile::create(&nested, "a.jpg", b"x").unwrap();
        assert!(staged.path().starts_with(&nested));
    }

    #[test]
    fn upload_name_cannot_escape_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let staged = StagedImageFile::create(dir.path(), "../../etc/passwd", b"x").unwrap();
        assert_eq!(staged.path().parent(), Some(dir.path()));
        assert!(staged.path().to_string_lossy().ends_with("-passwd"));
    }

    #[test]
    fn drop_tolerates_an_already_removed_file() {
        let dir = tempfile::tempdir().unwrap();
        let staged = StagedImageFile::create(dir.path(), "gone.png", b"x").unwrap();
        fs::remove_file(staged.path()).unwrap();
        drop(staged);
    }
}
