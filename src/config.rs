//! Configuration loading via `ortho-config`.

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

/// Default seconds a spawned host may take to finish setup.
pub const DEFAULT_SETUP_TIMEOUT_SECS: u64 = 600;
/// Default seconds before a spawned host is torn down.
pub const DEFAULT_TEARDOWN_TIMEOUT_SECS: u64 = 21_600;
/// Default ceiling on the setup timeout.
pub const MAX_SETUP_TIMEOUT_SECS: u64 = 3_600;
/// Default ceiling on the teardown timeout (one week).
pub const MAX_TEARDOWN_TIMEOUT_SECS: u64 = 604_800;
/// Default ceiling on hosts created by one `host.create` directive.
pub const MAX_HOSTS_PER_COMMAND: u32 = 10;

/// Limits and defaults applied to `host.create` directives, derived from
/// configuration files, environment variables, and CLI flags.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "HOSTSPAWN",
    discovery(
        app_name = "hostspawn",
        env_var = "HOSTSPAWN_CONFIG_PATH",
        config_file_name = "hostspawn.toml",
        dotfile_name = ".hostspawn.toml",
        project_file_name = "hostspawn.toml"
    )
)]
pub struct SpawnConfig {
    /// Setup timeout used when a directive leaves it unset.
    #[ortho_config(default = DEFAULT_SETUP_TIMEOUT_SECS)]
    pub default_setup_timeout_secs: u64,
    /// Teardown timeout used when a directive leaves it unset.
    #[ortho_config(default = DEFAULT_TEARDOWN_TIMEOUT_SECS)]
    pub default_teardown_timeout_secs: u64,
    /// Largest setup timeout a directive may ask for.
    #[ortho_config(default = MAX_SETUP_TIMEOUT_SECS)]
    pub max_setup_timeout_secs: u64,
    /// Largest teardown timeout a directive may ask for.
    #[ortho_config(default = MAX_TEARDOWN_TIMEOUT_SECS)]
    pub max_teardown_timeout_secs: u64,
    /// Most hosts a single directive may create.
    #[ortho_config(default = MAX_HOSTS_PER_COMMAND)]
    pub max_hosts_per_command: u32,
    /// Seed for instance-name suffixes. Leave unset in production; set it to
    /// make generated names reproducible.
    pub name_seed: Option<u64>,
}

impl SpawnConfig {
    /// Returns the built-in defaults without consulting any source.
    #[must_use]
    pub const fn builtin_defaults() -> Self {
        Self {
            default_setup_timeout_secs: DEFAULT_SETUP_TIMEOUT_SECS,
            default_teardown_timeout_secs: DEFAULT_TEARDOWN_TIMEOUT_SECS,
            max_setup_timeout_secs: MAX_SETUP_TIMEOUT_SECS,
            max_teardown_timeout_secs: MAX_TEARDOWN_TIMEOUT_SECS,
            max_hosts_per_command: MAX_HOSTS_PER_COMMAND,
            name_seed: None,
        }
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// still merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("hostspawn")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Checks that every limit is usable and every default fits under its
    /// ceiling.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_positive(self.max_setup_timeout_secs, "max_setup_timeout_secs")?;
        Self::require_positive(self.max_teardown_timeout_secs, "max_teardown_timeout_secs")?;
        Self::require_positive(
            u64::from(self.max_hosts_per_command),
            "max_hosts_per_command",
        )?;
        Self::require_within(
            self.default_setup_timeout_secs,
            self.max_setup_timeout_secs,
            "default_setup_timeout_secs",
        )?;
        Self::require_within(
            self.default_teardown_timeout_secs,
            self.max_teardown_timeout_secs,
            "default_teardown_timeout_secs",
        )?;
        Ok(())
    }

    fn require_positive(value: u64, field: &str) -> Result<(), ConfigError> {
        if value == 0 {
            return Err(ConfigError::Invalid(format!(
                "{field} must be greater than zero: set HOSTSPAWN_{} or add {field} to hostspawn.toml",
                field.to_ascii_uppercase()
            )));
        }
        Ok(())
    }

    fn require_within(value: u64, max: u64, field: &str) -> Result<(), ConfigError> {
        if value == 0 || value > max {
            return Err(ConfigError::Invalid(format!(
                "{field} must be between 1 and {max}, got {value}"
            )));
        }
        Ok(())
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a configured value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
