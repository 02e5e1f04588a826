//! In-place file replacement
//!
//! Content is written to a temporary file in the target's directory and then
//! renamed over the target, so the target is never observed missing or
//! half-written.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use log::debug;
use tempfile::NamedTempFile;
use crate::error::{TidyError, TidyResult};

/// Replace the whole content of `path` with `content`.
///
/// Symbolic links are refused rather than replaced by a regular file.
pub fn replace_file(path: &Path, content: &[u8]) -> TidyResult<()> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let metadata = fs::symlink_metadata(path).map_err(|e| TidyError::io(path, e))?;
    if metadata.file_type().is_symlink() {
        return Err(TidyError::io(
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "refusing to replace a symbolic link"),
        ));
    }
    let permissions = metadata.permissions();

    let mut staged = NamedTempFile::new_in(directory)
        .map_err(|e| TidyError::io(directory, e))?;
    staged.write_all(content).map_err(|e| TidyError::io(staged.path(), e))?;
    staged.as_file().sync_all().map_err(|e| TidyError::io(staged.path(), e))?;
    fs::set_permissions(staged.path(), permissions)
        .map_err(|e| TidyError::io(staged.path(), e))?;

    staged
        .persist(path)
        .map_err(|e| TidyError::io(path, e.error))?;

    debug!("Rewrote {} ({} bytes)", path.display(), content.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_replace_same_length_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.c");
        fs::write(&path, b"ab\r\n").unwrap();

        replace_file(&path, b"ab\n\n").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"ab\n\n");
        // Only the target remains in the directory
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_replace_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("run.sh");
        fs::write(&path, b"echo hi  \n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();

        replace_file(&path, b"echo hi\n").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[cfg(unix)]
    #[test]
    fn test_replace_refuses_symlink() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("real.c");
        let link = temp_dir.path().join("link.c");
        fs::write(&target, b"int r;  \n").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let result = replace_file(&link, b"int r;\n");
        assert!(matches!(result, Err(TidyError::Io { .. })));
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read(&target).unwrap(), b"int r;  \n");
    }

    #[test]
    fn test_replace_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = replace_file(&temp_dir.path().join("missing.c"), b"x\n");
        assert!(matches!(result, Err(TidyError::Io { .. })));
    }
}
