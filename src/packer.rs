//! Pack directory handling: naming, creation and moving entries into place.
//!
//! A pack directory is named after an extension group (`.txt` becomes
//! `txt_files`) and lives directly under the target directory. It is created
//! with a single non-recursive `create_dir` call, and entries are moved into it
//! with `fs::rename`, falling back to copy-and-remove across filesystems.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Errors that can occur while packing.
#[derive(Debug)]
pub enum PackError {
    /// The source directory does not exist.
    SourceMissing { path: PathBuf },
    /// The target directory does not exist.
    TargetMissing { path: PathBuf },
    /// The source directory could not be listed.
    ReadSourceFailed { path: PathBuf, source: io::Error },
    /// Failed to create a pack directory.
    DirectoryCreationFailed { path: PathBuf, source: io::Error },
    /// Failed to move an entry into its pack directory.
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
    /// Reading the user's answer failed.
    PromptFailed { source: io::Error },
}

impl std::fmt::Display for PackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SourceMissing { path } => {
                write!(f, "Source dir {} is invalid", path.display())
            }
            Self::TargetMissing { path } => {
                write!(f, "Target dir {} is invalid", path.display())
            }
            Self::ReadSourceFailed { path, source } => {
                write!(f, "Failed to read directory {}: {}", path.display(), source)
            }
            Self::DirectoryCreationFailed { path, source } => {
                write!(f, "{} could not be created: {}", path.display(), source)
            }
            Self::MoveFailed { from, to, source } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    from.display(),
                    to.display(),
                    source
                )
            }
            Self::PromptFailed { source } => {
                write!(f, "Failed to read confirmation: {}", source)
            }
        }
    }
}

impl std::error::Error for PackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadSourceFailed { source, .. }
            | Self::DirectoryCreationFailed { source, .. }
            | Self::MoveFailed { source, .. }
            | Self::PromptFailed { source } => Some(source),
            Self::SourceMissing { .. } | Self::TargetMissing { .. } => None,
        }
    }
}

/// Result type for packing operations.
pub type PackResult<T> = Result<T, PackError>;

/// Whether `ensure_pack_dir` had to create the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackDirStatus {
    Created,
    AlreadyExists,
}

/// Returns the pack directory name for an extension key.
///
/// # Examples
///
/// ```
/// use extpack::packer::pack_dir_name;
///
/// assert_eq!(pack_dir_name(".txt", "_files"), "txt_files");
/// assert_eq!(pack_dir_name(".gz", "_pack"), "gz_pack");
/// ```
pub fn pack_dir_name(extension: &str, suffix: &str) -> String {
    let bare = extension.strip_prefix('.').unwrap_or(extension);
    format!("{}{}", bare, suffix)
}

/// Returns `<target>/<ext><suffix>`.
pub fn pack_dir_path(target_dir: &Path, extension: &str, suffix: &str) -> PathBuf {
    target_dir.join(pack_dir_name(extension, suffix))
}

/// Creates the pack directory unless it already exists.
///
/// Only one directory level is created. Calling this again for the same path
/// succeeds and leaves the directory untouched.
pub fn ensure_pack_dir(pack_dir: &Path) -> PackResult<PackDirStatus> {
    if pack_dir.exists() {
        return Ok(PackDirStatus::AlreadyExists);
    }

    fs::create_dir(pack_dir).map_err(|e| PackError::DirectoryCreationFailed {
        path: pack_dir.to_path_buf(),
        source: e,
    })?;

    Ok(PackDirStatus::Created)
}

/// Moves `<source_dir>/<name>` to `<pack_dir>/<name>` and returns the new path.
///
/// Conflicts follow `fs::rename` semantics. If the rename fails because the
/// two paths are on different filesystems, the entry is copied (recursively
/// for directories, with symlinks recreated as links) and the original is
/// removed afterwards.
pub fn move_entry(
    source_dir: &Path,
    pack_dir: &Path,
    name: impl AsRef<OsStr>,
) -> PackResult<PathBuf> {
    let from = source_dir.join(name.as_ref());
    let to = pack_dir.join(name.as_ref());

    match fs::rename(&from, &to) {
        Ok(()) => Ok(to),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            move_across_devices(&from, &to).map_err(|source| PackError::MoveFailed {
                from: from.clone(),
                to: to.clone(),
                source,
            })?;
            Ok(to)
        }
        Err(e) => Err(PackError::MoveFailed {
            from,
            to,
            source: e,
        }),
    }
}

/// Copies `from` to `to` without following symlinks, then removes `from`.
///
/// The source is only removed once the whole copy has succeeded.
pub(crate) fn move_across_devices(from: &Path, to: &Path) -> io::Result<()> {
    let file_type = fs::symlink_metadata(from)?.file_type();

    if file_type.is_symlink() {
        copy_symlink(from, to)?;
        return fs::remove_file(from);
    }
    if file_type.is_file() {
        fs::copy(from, to)?;
        return fs::remove_file(from);
    }

    for entry in WalkDir::new(from).follow_links(false) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let dest = to.join(relative);
        let entry_type = entry.file_type();

        if entry_type.is_dir() {
            fs::create_dir(&dest)?;
        } else if entry_type.is_symlink() {
            copy_symlink(entry.path(), &dest)?;
        } else {
            fs::copy(entry.path(), &dest)?;
        }
    }

    fs::remove_dir_all(from)
}

#[cfg(unix)]
fn copy_symlink(from: &Path, to: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(fs::read_link(from)?, to)
}

#[cfg(windows)]
fn copy_symlink(from: &Path, to: &Path) -> io::Result<()> {
    let link_target = fs::read_link(from)?;
    if fs::metadata(from).map(|m| m.is_dir()).unwrap_or(false) {
        std::os::windows::fs::symlink_dir(link_target, to)
    } else {
        std::os::windows::fs::symlink_file(link_target, to)
    }
}
