//! Configuration loading and validation
//!
//! Two layers:
//! 1. **TOML bootstrap**: database path, study parameters, run selection, logging
//! 2. **Compiled defaults**: every field has a built-in value, so a missing
//!    file never stops a run
//!
//! # Resolution order
//!
//! Config file:
//! 1. Command-line argument (highest priority)
//! 2. `FFGEO_CONFIG` environment variable
//! 3. `~/.config/ffgeo/config.toml`, then `/etc/ffgeo/config.toml`
//! 4. Compiled defaults (no file)
//!
//! Database path: command line, `FFGEO_DATABASE`, TOML `database_path`.

use crate::model::{Criterion, Variant};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "FFGEO_CONFIG";

/// Environment variable naming the SQLite store
pub const DATABASE_ENV_VAR: &str = "FFGEO_DATABASE";

/// Offices whose code denotes a region or treaty body rather than a country
pub const DEFAULT_SUPRANATIONAL_OFFICES: [&str; 6] = ["EP", "AP", "EA", "GC", "OA", "WO"];

/// Patent offices under study by default
pub const DEFAULT_JURISDICTIONS: [&str; 52] = [
    "AR", "AT", "AU", "BE", "BG", "BR", "CA", "CH", "CL", "CN", "CY", "CZ", "DE", "DK", "EE",
    "EP", "ES", "FI", "FR", "GB", "GR", "HK", "HR", "HU", "IE", "IL", "IN", "IS", "IT", "JP",
    "KR", "LT", "LU", "LV", "MT", "MX", "NL", "NO", "NZ", "PH", "PL", "PT", "RO", "RU", "SE",
    "SG", "SI", "SK", "TR", "TW", "US", "ZA",
];

/// Publication kinds (by prefix) that mark non-standard grants per office
const DEFAULT_EXCLUDED_KINDS: [(&str, &[&str]); 17] = [
    ("AT", &["U"]),
    ("BR", &["U"]),
    ("CN", &["U", "Y"]),
    ("CZ", &["U"]),
    ("DE", &["U"]),
    ("DK", &["U"]),
    ("ES", &["U", "Y"]),
    ("FI", &["U"]),
    ("IT", &["U"]),
    ("JP", &["U", "Y"]),
    ("KR", &["U", "Y"]),
    ("PL", &["U", "Y"]),
    ("PT", &["U"]),
    ("RU", &["U"]),
    ("SK", &["U"]),
    ("TW", &["U"]),
    ("US", &["E", "H", "P", "S"]),
];

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Path to the SQLite store holding input and output tables
    pub database_path: Option<PathBuf>,

    /// Domain parameters for first-filing classification
    pub study: StudyConfig,

    /// Which criteria and variants a run produces
    pub run: RunConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Study parameters: which filings can qualify as PRIORITY first filings
/// and which offices are supranational
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StudyConfig {
    /// Office codes under study
    pub jurisdictions: Vec<String>,

    /// First filing year accepted (inclusive)
    pub first_year: i32,

    /// Last filing year accepted (inclusive)
    pub last_year: i32,

    /// Offices that never yield a country code
    pub supranational_offices: Vec<String>,

    /// Publication kind prefixes excluded per office
    pub excluded_kinds: BTreeMap<String, Vec<String>>,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            jurisdictions: DEFAULT_JURISDICTIONS.iter().map(|s| s.to_string()).collect(),
            first_year: 1980,
            last_year: 2016,
            supranational_offices: DEFAULT_SUPRANATIONAL_OFFICES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            excluded_kinds: DEFAULT_EXCLUDED_KINDS
                .iter()
                .map(|(office, kinds)| {
                    (office.to_string(), kinds.iter().map(|k| k.to_string()).collect())
                })
                .collect(),
        }
    }
}

impl StudyConfig {
    pub fn is_study_jurisdiction(&self, office: &str) -> bool {
        self.jurisdictions.iter().any(|j| j == office)
    }

    pub fn in_year_window(&self, year: i32) -> bool {
        (self.first_year..=self.last_year).contains(&year)
    }

    pub fn is_supranational(&self, office: &str) -> bool {
        self.supranational_offices.iter().any(|o| o == office)
    }

    /// True when `publn_kind` starts with a kind prefix excluded for `office`
    pub fn is_excluded_kind(&self, office: &str, publn_kind: &str) -> bool {
        self.excluded_kinds
            .get(office)
            .map(|kinds| kinds.iter().any(|k| publn_kind.starts_with(k.as_str())))
            .unwrap_or(false)
    }

    /// Reject configurations that would silently misclassify filings
    pub fn validate(&self) -> Result<()> {
        if self.jurisdictions.is_empty() {
            return Err(Error::Config("study.jurisdictions must not be empty".to_string()));
        }
        for code in self.jurisdictions.iter().chain(self.supranational_offices.iter()) {
            if !is_office_code(code) {
                return Err(Error::Config(format!(
                    "'{}' is not a two-letter office code",
                    code
                )));
            }
        }
        if self.first_year > self.last_year {
            return Err(Error::Config(format!(
                "study.first_year ({}) is after study.last_year ({})",
                self.first_year, self.last_year
            )));
        }
        for office in self.excluded_kinds.keys() {
            if !self.is_study_jurisdiction(office) {
                return Err(Error::Config(format!(
                    "study.excluded_kinds names unknown jurisdiction '{}'",
                    office
                )));
            }
        }
        Ok(())
    }
}

/// Run selection
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RunConfig {
    pub criteria: Vec<Criterion>,
    pub variants: Vec<Variant>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            criteria: vec![Criterion::Inventor, Criterion::Applicant],
            variants: vec![Variant::Geo, Variant::Country],
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        if self.criteria.is_empty() {
            return Err(Error::Config("run.criteria must name at least one criterion".to_string()));
        }
        if self.variants.is_empty() {
            return Err(Error::Config("run.variants must name at least one variant".to_string()));
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse a config file; a present but unparsable file is fatal
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TomlConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from the resolved config path, or fall back to compiled defaults
    pub fn load_or_default(cli_arg: Option<&Path>) -> Result<Self> {
        match resolve_config_path(cli_arg) {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                Self::load(&path)
            }
            None => {
                info!("No configuration file found, using compiled defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.study.validate()?;
        self.run.validate()
    }
}

/// Resolve the config file path
///
/// An explicit CLI or environment path is returned even if the file does
/// not exist, so the caller reports the missing file instead of silently
/// using defaults.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    let user_config = dirs::config_dir().map(|d| d.join("ffgeo").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    let system_config = PathBuf::from("/etc/ffgeo/config.toml");
    if system_config.exists() {
        return Some(system_config);
    }

    None
}

/// Resolve the SQLite store path: CLI, environment, TOML
pub fn resolve_database_path(cli_arg: Option<&Path>, config: &TomlConfig) -> Result<PathBuf> {
    if let Some(path) = cli_arg {
        return Ok(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(DATABASE_ENV_VAR) {
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
        warn!("{} is set but empty, ignoring", DATABASE_ENV_VAR);
    }

    config.database_path.clone().ok_or_else(|| {
        Error::Config(format!(
            "No database configured. Use --database, {} or database_path in the config file",
            DATABASE_ENV_VAR
        ))
    })
}

/// Two uppercase ASCII letters
pub fn is_office_code(code: &str) -> bool {
    code.len() == 2 && code.bytes().all(|b| b.is_ascii_uppercase())
}
