//! Atomic I/O operations
//!
//! Every file the installer lays down on the host goes through
//! [`write_atomic`]: readers such as the kubelet or an already-running plugin
//! only ever see the old file or the new one, never a partial write.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Write content atomically to a file.
///
/// Uses write-to-temp-then-rename inside the destination directory so the
/// rename never crosses filesystems. When `mode` is given it is applied to the
/// temporary file as it is created, before any content is written,
/// independent of the process umask.
/// Missing parent directories are created.
pub fn write_atomic(path: &Path, content: &[u8], mode: Option<u32>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let temp_path = temp_path_for(path);
    if let Err(e) = write_temp(&temp_path, content, mode) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        Error::io(path, e)
    })?;

    tracing::debug!(path = %path.display(), bytes = content.len(), "replaced file");
    Ok(())
}

fn write_temp(temp_path: &Path, content: &[u8], mode: Option<u32>) -> Result<()> {
    let mut temp_file = open_temp(temp_path, mode)?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(temp_path, e))?;

    temp_file.sync_all().map_err(|e| Error::io(temp_path, e))
}

/// Create the temporary file with `mode` already in place.
///
/// The file never exists with wider permissions than requested. A leftover
/// temp file from a crashed run is removed first; `create_new` then refuses
/// to reuse anything else.
fn open_temp(temp_path: &Path, mode: Option<u32>) -> Result<File> {
    match fs::remove_file(temp_path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(Error::io(temp_path, e)),
    }

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    if let Some(mode) = mode {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    let temp_file = options.open(temp_path).map_err(|e| Error::io(temp_path, e))?;

    // Creation mode is filtered by the umask; pin the exact bits on the handle.
    #[cfg(unix)]
    if let Some(mode) = mode {
        use std::os::unix::fs::PermissionsExt;
        temp_file
            .set_permissions(fs::Permissions::from_mode(mode))
            .map_err(|e| Error::io(temp_path, e))?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    Ok(temp_file)
}

/// `.{filename}.{pid}.tmp` next to the destination.
fn temp_path_for(path: &Path) -> PathBuf {
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    path.with_file_name(temp_name)
}

/// Read a whole file.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| Error::io(path, e))
}

/// Read a whole file, mapping "does not exist" to `None`.
///
/// Any other failure (permissions, path is a directory, ...) is an error.
pub fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Read text content from a file.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Create a directory and its parents if they do not exist yet.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| Error::io(path, e))
}

/// List the regular files directly under `dir`, sorted by name.
///
/// Symlinks are resolved; entries that are (or point to) directories or other
/// non-regular files are skipped.
pub fn regular_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        let metadata = fs::metadata(&path).map_err(|e| Error::io(&path, e))?;
        if metadata.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Permission bits of an existing file, `None` if it does not exist.
///
/// Always `None` on platforms without unix permissions.
pub fn file_mode(path: &Path) -> Result<Option<u32>> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        match fs::metadata(path) {
            Ok(metadata) => Ok(Some(metadata.permissions().mode() & 0o7777)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io(path, e)),
        }
    }

    #[cfg(not(unix))]
    {
        let _ = path;
        Ok(None)
    }
}

/// Set the permission bits of a file. No-op on platforms without unix
/// permissions.
pub fn set_mode(path: &Path, mode: u32) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        fs::set_permissions(path, fs::Permissions::from_mode(mode))
            .map_err(|e| Error::io(path, e))
    }

    #[cfg(not(unix))]
    {
        let _ = (path, mode);
        Ok(())
    }
}
