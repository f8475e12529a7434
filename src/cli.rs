//! Run orchestration for extpack.
//!
//! A run:
//! 1. Checks that the source and target directories exist
//! 2. Loads and compiles configuration
//! 3. Groups the source directory's immediate children by extension
//! 4. Asks once per group whether to pack it
//! 5. Creates the pack directory and moves the group's entries into it
//!
//! A failed move is reported and the run carries on with the remaining
//! entries and groups. A pack directory that cannot be created is reported at
//! critical level and its group is skipped.

use crate::config::{CompiledConfig, ConfigError, PackConfig};
use crate::grouping::{ExtensionGroup, ExtensionGroups, scan_source};
use crate::output::Logger;
use crate::packer::{PackDirStatus, PackError, ensure_pack_dir, move_entry, pack_dir_path};
use crate::prompt::Confirm;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Directories and mode for one run.
#[derive(Debug, Clone, Copy)]
pub struct PackRequest<'a> {
    pub source_dir: &'a Path,
    pub target_dir: &'a Path,
    /// If true, list what would be packed without prompting or writing.
    pub dry_run: bool,
}

impl<'a> PackRequest<'a> {
    pub fn new(source_dir: &'a Path, target_dir: &'a Path) -> Self {
        Self {
            source_dir,
            target_dir,
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Errors that end a run early.
#[derive(Debug)]
pub enum RunError {
    Pack(PackError),
    Config(ConfigError),
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::Pack(e) => write!(f, "{}", e),
            RunError::Config(e) => write!(f, "Error loading configuration: {}", e),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::Pack(e) => Some(e),
            RunError::Config(e) => Some(e),
        }
    }
}

impl From<PackError> for RunError {
    fn from(e: PackError) -> Self {
        RunError::Pack(e)
    }
}

impl From<ConfigError> for RunError {
    fn from(e: ConfigError) -> Self {
        RunError::Config(e)
    }
}

/// What happened during a run.
#[derive(Debug, Default)]
pub struct PackReport {
    /// Number of distinct extensions found.
    pub groups_found: usize,
    pub groups_confirmed: usize,
    pub groups_declined: usize,
    /// Pack directories created by this run.
    pub dirs_created: usize,
    pub entries_moved: usize,
    /// Pack directories that could not be created, with the reason.
    pub failed_dirs: Vec<(PathBuf, String)>,
    /// Entries that could not be moved, with the reason.
    pub failed_moves: Vec<(PathBuf, String)>,
}

impl PackReport {
    /// Returns true if every confirmed group was packed in full.
    pub fn is_complete_success(&self) -> bool {
        self.failed_dirs.is_empty() && self.failed_moves.is_empty()
    }
}

/// Checks the directory preconditions, loads configuration, then packs.
///
/// # Arguments
///
/// * `request` - Source and target directories and run mode
/// * `config_path` - Optional explicit configuration file
/// * `prompt` - Source of per-group answers
/// * `logger` - Diagnostic output
///
/// # Examples
///
/// ```no_run
/// use extpack::cli::{PackRequest, run_with_config};
/// use extpack::output::Logger;
/// use extpack::prompt::LinePrompt;
/// use std::path::Path;
///
/// let mut logger = Logger::stderr("extpack");
/// let mut prompt = LinePrompt::stdin();
/// let request = PackRequest::new(Path::new("downloads"), Path::new("sorted"));
///
/// match run_with_config(request, None, &mut prompt, &mut logger) {
///     Ok(report) => println!("Moved {} entries", report.entries_moved),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_with_config<C: Confirm, W: Write>(
    request: PackRequest<'_>,
    config_path: Option<&Path>,
    prompt: &mut C,
    logger: &mut Logger<W>,
) -> Result<PackReport, RunError> {
    validate_directories(request, logger)?;

    let config = PackConfig::load(config_path)?.compile()?;

    pack(request, &config, prompt, logger)
}

/// Fails if either directory is missing. The source is checked first.
pub fn validate_directories<W: Write>(
    request: PackRequest<'_>,
    logger: &mut Logger<W>,
) -> Result<(), PackError> {
    if !request.source_dir.exists() {
        return Err(PackError::SourceMissing {
            path: request.source_dir.to_path_buf(),
        });
    }
    logger.info("Source Directory read successfully.");

    if !request.target_dir.exists() {
        return Err(PackError::TargetMissing {
            path: request.target_dir.to_path_buf(),
        });
    }
    logger.info("Target Directory read successfully.");

    Ok(())
}

/// Groups the source directory and runs the confirm-and-move loop.
///
/// Assumes both directories have already been validated.
pub fn pack<C: Confirm, W: Write>(
    request: PackRequest<'_>,
    config: &CompiledConfig,
    prompt: &mut C,
    logger: &mut Logger<W>,
) -> Result<PackReport, RunError> {
    let scan = scan_source(request.source_dir, &config.filters, logger)?;
    let mut report = PackReport {
        groups_found: scan.groups.len(),
        ..Default::default()
    };

    if request.dry_run {
        describe_plan(request, config, &scan.groups, logger);
        return Ok(report);
    }

    logger.blank_line();
    for group in &scan.groups {
        let pack_dir = pack_dir_path(request.target_dir, group.extension(), &config.suffix);
        announce_group(group, logger);

        logger.warning(&format!(
            "Do you want to pack these entries into {}? [Y/N]",
            pack_dir.display()
        ));
        let confirmed = prompt
            .confirm(&pack_dir.display().to_string())
            .map_err(|e| PackError::PromptFailed { source: e })?;

        if confirmed {
            report.groups_confirmed += 1;
            pack_group(request.source_dir, &pack_dir, group, &mut report, logger);
        } else {
            report.groups_declined += 1;
            logger.warning(&format!("Ignoring {}", pack_dir.display()));
        }
        logger.blank_line();
    }

    if report.groups_found == 0 {
        logger.warning("No files to pack were found.");
    }
    summarize(&report, logger);

    Ok(report)
}

fn announce_group<W: Write>(group: &ExtensionGroup, logger: &mut Logger<W>) {
    logger.info(&format!(
        "The following {} entries were found:",
        group.extension()
    ));
    for name in group.names() {
        logger.debug(&name.to_string_lossy());
    }
}

/// Creates the pack directory and moves every member of a confirmed group.
fn pack_group<W: Write>(
    source_dir: &Path,
    pack_dir: &Path,
    group: &ExtensionGroup,
    report: &mut PackReport,
    logger: &mut Logger<W>,
) {
    logger.warning(&format!("Packing into {}", pack_dir.display()));

    match ensure_pack_dir(pack_dir) {
        Ok(PackDirStatus::Created) => {
            report.dirs_created += 1;
            logger.info(&format!("Created directory {}.", pack_dir.display()));
        }
        Ok(PackDirStatus::AlreadyExists) => {
            logger.info("Directory already exists, skipping directory creation.");
        }
        Err(e) => {
            logger.critical(&e.to_string());
            report
                .failed_dirs
                .push((pack_dir.to_path_buf(), e.to_string()));
            return;
        }
    }

    logger.warning("Transferring files");
    let pb = logger.progress_bar(group.len() as u64);
    for name in group.names() {
        pb.suspend(|| logger.info(&format!("Moving {}", pack_dir.join(name).display())));
        match move_entry(source_dir, pack_dir, name) {
            Ok(_) => report.entries_moved += 1,
            Err(e) => {
                pb.suspend(|| logger.error(&e.to_string()));
                report
                    .failed_moves
                    .push((source_dir.join(name), e.to_string()));
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();
}

fn describe_plan<W: Write>(
    request: PackRequest<'_>,
    config: &CompiledConfig,
    groups: &ExtensionGroups,
    logger: &mut Logger<W>,
) {
    logger.info(&format!(
        "DRY RUN: {} would be packed as follows:",
        request.source_dir.display()
    ));
    for group in groups {
        let pack_dir = pack_dir_path(request.target_dir, group.extension(), &config.suffix);
        let entry_word = if group.len() == 1 { "entry" } else { "entries" };
        logger.info(&format!(
            "{}: {} {} -> {}",
            group.extension(),
            group.len(),
            entry_word,
            pack_dir.display()
        ));
        for name in group.names() {
            logger.debug(&name.to_string_lossy());
        }
    }

    if groups.is_empty() {
        logger.warning("No files to pack were found.");
    }
    logger.info("Dry run complete. No files were modified.");
}

fn summarize<W: Write>(report: &PackReport, logger: &mut Logger<W>) {
    logger.info(&format!(
        "Packed {} entries into {} groups, {} groups skipped.",
        report.entries_moved, report.groups_confirmed, report.groups_declined
    ));

    if report.is_complete_success() {
        logger.info("File transfer succeeded.");
    } else {
        logger.warning(&format!(
            "File transfer finished with problems: {} directories not created, {} entries not moved.",
            report.failed_dirs.len(),
            report.failed_moves.len()
        ));
    }
}
