use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::leb128::MAX_LEB128_BYTES;

/// Environment variable consulted by [`FramingConfig::discover`].
pub const CONFIG_ENV: &str = "SV_FRAMING_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "./sv-framing.toml";

/// Limits applied by a framing session.
///
/// ```toml
/// max_buffer_bytes = 33554432
/// max_units_per_pass = 64
/// max_leb128_bytes = 8
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FramingConfig {
    /// Ceiling on carry-over bytes held between chunks.
    pub max_buffer_bytes: usize,
    /// Units emitted by one splitter pass before it hands control back.
    pub max_units_per_pass: usize,
    /// Longest accepted leb128 size field.
    pub max_leb128_bytes: usize,
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            max_buffer_bytes: 32 * 1024 * 1024,
            max_units_per_pass: 64,
            max_leb128_bytes: MAX_LEB128_BYTES,
        }
    }
}

impl FramingConfig {
    pub fn from_toml(contents: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Resolves the config from, in order: an explicit path, `$SV_FRAMING_CONFIG`,
    /// `./sv-framing.toml`. Falls back to defaults only when neither a path
    /// nor the variable is given and the default file does not exist.
    pub fn discover(path: Option<&Path>) -> Result<Self, Error> {
        let env_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        Self::discover_in(path, env_path.as_deref(), Path::new(DEFAULT_CONFIG_PATH))
    }

    fn discover_in(
        path: Option<&Path>,
        env_path: Option<&Path>,
        default_path: &Path,
    ) -> Result<Self, Error> {
        if let Some(path) = path.or(env_path) {
            tracing::debug!(path = %path.display(), "loading framing config");
            return Self::load(path);
        }
        match std::fs::read_to_string(default_path) {
            Ok(contents) => {
                tracing::debug!(path = %default_path.display(), "loaded framing config");
                Self::from_toml(&contents)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.max_buffer_bytes == 0 {
            return Err(Error::Config("max_buffer_bytes must be non-zero".into()));
        }
        if self.max_units_per_pass == 0 {
            return Err(Error::Config("max_units_per_pass must be non-zero".into()));
        }
        if !(1..=10).contains(&self.max_leb128_bytes) {
            return Err(Error::Config(format!(
                "max_leb128_bytes must be within 1..=10, got {}",
                self.max_leb128_bytes
            )));
        }
        Ok(())
    }
}
