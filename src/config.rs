//! Configuration for pack directory naming and name filtering.
//!
//! Configuration is read from a TOML file. Every key is optional and the
//! defaults group every entry that has an extension.
//!
//! # Configuration File Format
//!
//! ```toml
//! [pack]
//! suffix = "_files"
//!
//! [filters]
//! enable_hidden_files = true
//!
//! [filters.exclude]
//! filenames = ["Thumbs.db"]
//! patterns = ["*.part"]
//! extensions = ["tmp"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//! ```

use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".extpackrc.toml";

/// Default suffix appended to an extension to name its pack directory.
pub const DEFAULT_SUFFIX: &str = "_files";

/// Why a configuration could not be used.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// `--config` named a file that does not exist.
    MissingFile(PathBuf),
    /// A config file exists but could not be read.
    Unreadable { path: PathBuf, reason: String },
    /// TOML that does not parse or does not fit the schema. `path` is `None`
    /// for text that did not come from a file.
    Malformed {
        path: Option<PathBuf>,
        reason: String,
    },
    /// `pack.suffix` is empty or would escape the target directory.
    BadSuffix(String),
    /// A `filters.exclude.patterns` or `filters.include.patterns` glob.
    BadGlob { pattern: String, reason: String },
    /// A `filters.exclude.regex` entry.
    BadRegex { pattern: String, reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingFile(path) => {
                write!(f, "no config file at {}", path.display())
            }
            ConfigError::Unreadable { path, reason } => {
                write!(f, "cannot read {}: {}", path.display(), reason)
            }
            ConfigError::Malformed {
                path: Some(path),
                reason,
            } => write!(f, "{} is not a valid extpack config: {}", path.display(), reason),
            ConfigError::Malformed { path: None, reason } => {
                write!(f, "not a valid extpack config: {}", reason)
            }
            ConfigError::BadSuffix(suffix) => write!(
                f,
                "pack.suffix {:?} must be non-empty and contain no path separator",
                suffix
            ),
            ConfigError::BadGlob { pattern, reason } => {
                write!(f, "filter glob '{}' does not compile: {}", pattern, reason)
            }
            ConfigError::BadRegex { pattern, reason } => {
                write!(f, "filter regex '{}' does not compile: {}", pattern, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level configuration as deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackConfig {
    #[serde(default)]
    pub pack: PackSettings,
    #[serde(default)]
    pub filters: FilterRules,
}

/// Settings for pack directory naming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackSettings {
    /// Appended to the extension (without its dot) to form the directory name.
    #[serde(default = "default_suffix")]
    pub suffix: String,
}

impl Default for PackSettings {
    fn default() -> Self {
        Self {
            suffix: default_suffix(),
        }
    }
}

fn default_suffix() -> String {
    DEFAULT_SUFFIX.to_string()
}

/// Rules deciding which entry names take part in grouping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRules {
    /// Whether names starting with "." may be grouped. Defaults to true.
    #[serde(default = "default_enable_hidden_files")]
    pub enable_hidden_files: bool,

    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Whitelist that overrides every exclusion.
    #[serde(default)]
    pub include: IncludeRules,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            enable_hidden_files: default_enable_hidden_files(),
            exclude: ExcludeRules::default(),
            include: IncludeRules::default(),
        }
    }
}

fn default_enable_hidden_files() -> bool {
    true
}

/// Rules for excluding entries from grouping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact names to exclude (e.g., "Thumbs.db").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns matched against the entry name (e.g., "*.part").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Extensions without the dot, compared case-insensitively.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns matched against the entry name.
    #[serde(default)]
    pub regex: Vec<String>,
}

/// Rules for including entries regardless of exclusions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl PackConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Lookup order:
    /// 1. `config_path`, if provided
    /// 2. `.extpackrc.toml` in the current directory
    /// 3. `~/.config/extpack/config.toml`
    /// 4. Built-in defaults
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly provided file is missing, or if any
    /// file that is found cannot be read or parsed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("extpack")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::MissingFile(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Malformed {
            path: Some(path.to_path_buf()),
            reason: e.to_string(),
        })
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Malformed {
            path: None,
            reason: e.to_string(),
        })
    }

    /// Validate settings and compile filters for matching.
    ///
    /// # Errors
    ///
    /// Returns an error if the suffix is empty or contains a path separator,
    /// or if any glob or regex pattern is invalid.
    pub fn compile(self) -> Result<CompiledConfig, ConfigError> {
        let suffix = self.pack.suffix;
        if suffix.is_empty() || suffix.contains(['/', '\\']) {
            return Err(ConfigError::BadSuffix(suffix));
        }

        Ok(CompiledConfig {
            suffix,
            filters: CompiledFilters::new(self.filters)?,
        })
    }
}

/// Validated configuration ready for a run.
pub struct CompiledConfig {
    pub suffix: String,
    pub filters: CompiledFilters,
}

impl Default for CompiledConfig {
    fn default() -> Self {
        Self {
            suffix: default_suffix(),
            filters: CompiledFilters::allow_all(),
        }
    }
}

/// Filter rules with glob and regex patterns compiled up front.
pub struct CompiledFilters {
    enable_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

impl CompiledFilters {
    fn new(rules: FilterRules) -> Result<Self, ConfigError> {
        let exclude_patterns = compile_globs(&rules.exclude.patterns)?;
        let include_patterns = compile_globs(&rules.include.patterns)?;

        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::BadRegex {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            enable_hidden_files: rules.enable_hidden_files,
            exclude_filenames: rules.exclude.filenames.into_iter().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_patterns,
            exclude_regexes,
            include_patterns,
        })
    }

    /// Filters that let every name through.
    pub fn allow_all() -> Self {
        Self {
            enable_hidden_files: true,
            exclude_filenames: HashSet::new(),
            exclude_extensions: HashSet::new(),
            exclude_patterns: Vec::new(),
            exclude_regexes: Vec::new(),
            include_patterns: Vec::new(),
        }
    }

    /// Check whether an entry name takes part in grouping.
    ///
    /// Include patterns win over everything. After that, a name is dropped if
    /// it is hidden (and hidden files are disabled), listed by name, has an
    /// excluded extension, or matches an exclude glob or regex.
    pub fn should_include(&self, name: &str) -> bool {
        if self
            .include_patterns
            .iter()
            .any(|pattern| pattern.matches(name))
        {
            return true;
        }

        if !self.enable_hidden_files && name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(name) {
            return false;
        }

        if let Some(ext) = Path::new(name).extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            if self.exclude_extensions.contains(&ext_lower) {
                return false;
            }
        }

        if self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches(name))
        {
            return false;
        }

        !self.exclude_regexes.iter().any(|regex| regex.is_match(name))
    }
}

fn compile_globs(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|e| ConfigError::BadGlob {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })
        })
        .collect()
}
