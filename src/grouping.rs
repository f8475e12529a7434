//! Grouping of directory entries by file extension.
//!
//! Only the immediate children of the source directory are considered. The
//! extension of an entry is taken from its name alone: the text from the last
//! `.` onward, provided that text is non-empty and the dot is not the first
//! character of the name. Group keys include the leading dot and are
//! case-sensitive.
//!
//! Member names are kept as `OsString` so that entries whose names are not
//! valid UTF-8 can still be moved. Only log text and group keys are lossy.
//!
//! # Examples
//!
//! ```
//! use extpack::grouping::extension_of;
//!
//! assert_eq!(extension_of("a.txt").as_deref(), Some(".txt"));
//! assert_eq!(extension_of("archive.tar.gz").as_deref(), Some(".gz"));
//! assert_eq!(extension_of("readme"), None);
//! assert_eq!(extension_of(".bashrc"), None);
//! assert_eq!(extension_of("trailing."), None);
//! ```

use crate::config::CompiledFilters;
use crate::output::Logger;
use crate::packer::PackError;
use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Returns the extension of an entry name, including its leading dot.
pub fn extension_of(name: impl AsRef<OsStr>) -> Option<String> {
    let extension = Path::new(name.as_ref()).extension()?;
    if extension.is_empty() {
        return None;
    }
    Some(format!(".{}", extension.to_string_lossy()))
}

/// Entries sharing one extension, in the order they were seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionGroup {
    extension: String,
    names: Vec<OsString>,
}

impl ExtensionGroup {
    /// The group key, e.g. `.txt`.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Member entry names in insertion order, exactly as read from disk.
    pub fn names(&self) -> &[OsString] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Ordered mapping from extension to group.
///
/// Keys are enumerated in the order they were first inserted.
#[derive(Debug, Clone, Default)]
pub struct ExtensionGroups {
    groups: Vec<ExtensionGroup>,
    index: HashMap<String, usize>,
}

impl ExtensionGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `name` to its extension's group.
    ///
    /// Returns the extension key, or `None` if the name has no extension and
    /// was therefore not grouped.
    pub fn insert(&mut self, name: impl AsRef<OsStr>) -> Option<&str> {
        let name = name.as_ref();
        let extension = extension_of(name)?;

        let slot = match self.index.get(&extension) {
            Some(&slot) => slot,
            None => {
                self.groups.push(ExtensionGroup {
                    extension: extension.clone(),
                    names: Vec::new(),
                });
                let slot = self.groups.len() - 1;
                self.index.insert(extension, slot);
                slot
            }
        };

        let group = &mut self.groups[slot];
        group.names.push(name.to_os_string());
        Some(&group.extension)
    }

    pub fn get(&self, extension: &str) -> Option<&ExtensionGroup> {
        self.index.get(extension).map(|&slot| &self.groups[slot])
    }

    /// Number of distinct extensions.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of grouped entries.
    pub fn entry_count(&self) -> usize {
        self.groups.iter().map(ExtensionGroup::len).sum()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExtensionGroup> {
        self.groups.iter()
    }
}

impl<'a> IntoIterator for &'a ExtensionGroups {
    type Item = &'a ExtensionGroup;
    type IntoIter = std::slice::Iter<'a, ExtensionGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Outcome of scanning the source directory.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub groups: ExtensionGroups,
    /// Names skipped because they have no extension.
    pub without_extension: Vec<OsString>,
    /// Names skipped by the configured filters.
    pub filtered: Vec<OsString>,
}

/// Groups the immediate children of `source_dir` by extension.
///
/// Entries are visited once, in the order the filesystem returns them.
/// Directories are classified by name like files.
///
/// # Errors
///
/// Returns `PackError::ReadSourceFailed` if the directory cannot be listed.
pub fn scan_source<W: Write>(
    source_dir: &Path,
    filters: &CompiledFilters,
    logger: &mut Logger<W>,
) -> Result<ScanResult, PackError> {
    let entries = fs::read_dir(source_dir).map_err(|e| PackError::ReadSourceFailed {
        path: source_dir.to_path_buf(),
        source: e,
    })?;

    let mut result = ScanResult::default();

    for entry in entries {
        let entry = entry.map_err(|e| PackError::ReadSourceFailed {
            path: source_dir.to_path_buf(),
            source: e,
        })?;
        let name = entry.file_name();
        let display_name = name.to_string_lossy();

        if extension_of(&name).is_none() {
            result.without_extension.push(name);
            continue;
        }

        if !filters.should_include(&display_name) {
            logger.debug(&format!(
                "Skipping {} (excluded by configuration)",
                display_name
            ));
            result.filtered.push(name);
            continue;
        }

        logger.debug(&display_name);
        if let Some(extension) = result.groups.insert(&name) {
            logger.info(&format!("Adding {} extension.", extension));
        }
    }

    if !result.without_extension.is_empty() {
        logger.warning("Files without an extension will not be packed.");
    }
    logger.debug(&format!("{} extensions found.", result.groups.len()));

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("a.txt").as_deref(), Some(".txt"));
        assert_eq!(extension_of("A.TXT").as_deref(), Some(".TXT"));
        assert_eq!(extension_of("x.tar.gz").as_deref(), Some(".gz"));
        assert_eq!(extension_of(".config.toml").as_deref(), Some(".toml"));
        assert_eq!(extension_of("a..b").as_deref(), Some(".b"));
        assert_eq!(extension_of("readme"), None);
        assert_eq!(extension_of(".hidden"), None);
        assert_eq!(extension_of("name."), None);
        assert_eq!(extension_of("."), None);
        assert_eq!(extension_of(""), None);
    }

    #[test]
    fn test_groups_preserve_insertion_order() {
        let mut groups = ExtensionGroups::new();
        for name in ["b.log", "a.txt", "c.log", "d.md", "e.txt"] {
            groups.insert(name);
        }

        let keys: Vec<&str> = groups.iter().map(ExtensionGroup::extension).collect();
        assert_eq!(keys, vec![".log", ".txt", ".md"]);
        assert_eq!(groups.get(".log").unwrap().names(), ["b.log", "c.log"]);
        assert_eq!(groups.get(".txt").unwrap().names(), ["a.txt", "e.txt"]);
        assert_eq!(groups.entry_count(), 5);
    }

    #[test]
    fn test_names_without_extension_are_not_grouped() {
        let mut groups = ExtensionGroups::new();
        assert_eq!(groups.insert("Makefile"), None);
        assert_eq!(groups.insert("dot."), None);
        assert!(groups.is_empty());
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let mut groups = ExtensionGroups::new();
        groups.insert("a.txt");
        groups.insert("b.TXT");
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_every_extension_name_in_exactly_one_group() {
        let names = [
            "a.txt", "b.txt", "c.log", "readme", ".env", "d.tar.gz", "e.", "f.GZ", "g.gz",
        ];
        let mut groups = ExtensionGroups::new();
        for name in names {
            groups.insert(name);
        }

        for name in names {
            let owners = groups
                .iter()
                .filter(|group| group.names().iter().any(|n| n == name))
                .count();
            match extension_of(name) {
                Some(ext) => {
                    assert_eq!(owners, 1, "{} should be in exactly one group", name);
                    assert!(groups.get(&ext).unwrap().names().iter().any(|n| n == name));
                }
                None => assert_eq!(owners, 0, "{} should not be grouped", name),
            }
        }
    }

    #[test]
    fn test_scan_source() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path();
        for name in ["a.txt", "b.txt", "c.log", "readme"] {
            fs::write(source.join(name), name).expect("Failed to write test file");
        }
        fs::create_dir(source.join("photos.d")).expect("Failed to create subdirectory");

        let mut logger = Logger::new("extpack", Vec::new());
        let result = scan_source(source, &CompiledFilters::allow_all(), &mut logger).unwrap();

        assert_eq!(result.groups.len(), 3);
        let mut txt = result.groups.get(".txt").unwrap().names().to_vec();
        txt.sort();
        assert_eq!(txt, vec!["a.txt", "b.txt"]);
        assert_eq!(result.groups.get(".d").unwrap().names(), ["photos.d"]);
        assert_eq!(result.without_extension, vec!["readme"]);

        let log = String::from_utf8(logger.into_inner()).unwrap();
        assert!(log.contains("WARNING - Files without an extension will not be packed."));
        assert!(log.contains("DEBUG - 3 extensions found."));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_names_keep_their_raw_bytes() {
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path();
        let latin1 = OsStr::from_bytes(b"caf\xe9.txt");
        let other = OsStr::from_bytes(b"caf\xe8.txt");
        fs::write(source.join(latin1), "e acute").expect("Failed to write test file");
        fs::write(source.join(other), "e grave").expect("Failed to write test file");

        let mut logger = Logger::new("extpack", Vec::new());
        let result = scan_source(source, &CompiledFilters::allow_all(), &mut logger).unwrap();

        let names = result.groups.get(".txt").unwrap().names();
        assert_eq!(names.len(), 2);
        assert!(names.iter().any(|n| n == latin1));
        assert!(names.iter().any(|n| n == other));
        for name in names {
            assert!(source.join(name).exists());
        }
    }

    #[test]
    fn test_scan_empty_source() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut logger = Logger::new("extpack", Vec::new());
        let result =
            scan_source(temp_dir.path(), &CompiledFilters::allow_all(), &mut logger).unwrap();

        assert!(result.groups.is_empty());
        assert!(result.without_extension.is_empty());
    }

    #[test]
    fn test_scan_missing_source_is_error() {
        let mut logger = Logger::new("extpack", Vec::new());
        let result = scan_source(
            Path::new("/non/existent/source"),
            &CompiledFilters::allow_all(),
            &mut logger,
        );
        assert!(matches!(result, Err(PackError::ReadSourceFailed { .. })));
    }
}
