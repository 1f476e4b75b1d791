use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::versioning::types::{DEFAULT_PROGRAM, DEFAULT_RESERVED_BRANCH};

/// Whether versioning operations reach the external tool at all.
///
/// Accepted spellings are `enabled` / `git` and `disabled` / `none`, in any case.
/// Anything else is rejected when configuration is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum VersioningMode {
    #[default]
    Enabled,
    Disabled,
}

impl VersioningMode {
    pub fn is_disabled(self) -> bool {
        self == Self::Disabled
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
        }
    }
}

impl fmt::Display for VersioningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VersioningMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "enabled" | "git" => Ok(Self::Enabled),
            "disabled" | "none" => Ok(Self::Disabled),
            other => Err(format!(
                "unrecognized versioning mode '{other}' (expected one of: enabled, git, disabled, none)"
            )),
        }
    }
}

impl TryFrom<String> for VersioningMode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VersioningMode> for String {
    fn from(mode: VersioningMode) -> Self {
        mode.as_str().to_string()
    }
}

/// Main configuration structure for the versioning facade
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VersioningConfig {
    /// Versioning mode selector
    pub mode: VersioningMode,
    /// External executable to invoke
    pub program: String,
    /// Workspace the facade operates on
    pub working_dir: PathBuf,
    /// Working branch reserved for this tool
    pub reserved_branch: String,
    /// Merge the previously checked-out branch into the target of `ensure_branch`
    pub merge_previous_on_ensure: bool,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level used when `RUST_LOG` is not set
    pub log_level: String,
    /// Emit JSON structured logs instead of human readable lines
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            mode: VersioningMode::Enabled,
            program: DEFAULT_PROGRAM.to_string(),
            working_dir: PathBuf::from("."),
            reserved_branch: DEFAULT_RESERVED_BRANCH.to_string(),
            merge_previous_on_ensure: true,
            observability: ObservabilityConfig::default(),
        }
    }
}

impl VersioningConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (workspace-vcs.toml, .workspace-vcs-rc)
    /// 3. Environment variables (prefixed with WORKSPACE_VCS_, nested keys split on `__`)
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if Path::new("workspace-vcs.toml").exists() {
            builder = builder.add_source(File::with_name("workspace-vcs"));
        }

        if Path::new(".workspace-vcs-rc").exists() {
            builder = builder.add_source(File::new(".workspace-vcs-rc", FileFormat::Toml));
        }

        builder = builder.add_source(Self::environment());

        builder
            .build()?
            .try_deserialize()
            .context("Invalid versioning configuration")
    }

    /// Load configuration from an explicit TOML file layered over the defaults.
    /// Environment variables still take precedence over the file.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::from(path).format(FileFormat::Toml))
            .add_source(Self::environment())
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?
            .try_deserialize()
            .with_context(|| format!("Invalid versioning configuration in {}", path.display()))
    }

    fn environment() -> Environment {
        Environment::with_prefix("WORKSPACE_VCS")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}
