//! Engine configuration.
//!
//! The defaults reproduce the listing grammar exactly: the `file` filter prefix
//! and the ` (Filtered)` marker. With the `config` feature enabled the values can
//! be overridden from `$CONFIG_DIR/resultsift/config.toml`.

/// Literal suffix appended to the first line once filtering has started.
pub const DEFAULT_MARKER_SUFFIX: &str = " (Filtered)";

/// Literal prefix turning a filter line into a filename filter.
pub const DEFAULT_FILENAME_PREFIX: &str = "file";

/// Tunables shared by the filter parser and the sync controller.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct EngineConfig {
    pub marker_suffix: String,
    pub filename_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            marker_suffix: DEFAULT_MARKER_SUFFIX.to_string(),
            filename_prefix: DEFAULT_FILENAME_PREFIX.to_string(),
        }
    }
}

#[cfg(feature = "config")]
impl EngineConfig {
    /// Parse a configuration from TOML text; missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> crate::Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| crate::SiftError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `$CONFIG_DIR/resultsift/config.toml`, falling back to defaults when absent.
    pub fn load() -> crate::Result<Self> {
        let Some(dir) = dirs::config_dir() else {
            return Ok(Self::default());
        };
        let path = dir.join("resultsift").join("config.toml");
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                log::debug!("loading config from {}", path.display());
                Self::from_toml_str(&text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(crate::SiftError::file_error(
                format!("Failed to read {}", path.display()),
                e,
            )),
        }
    }

    fn validate(&self) -> crate::Result<()> {
        if self.marker_suffix.is_empty() {
            return Err(crate::SiftError::config("marker_suffix must not be empty"));
        }
        if self.marker_suffix.contains('\n') {
            return Err(crate::SiftError::config(
                "marker_suffix must fit on a single line",
            ));
        }
        if self.filename_prefix.is_empty() {
            return Err(crate::SiftError::config("filename_prefix must not be empty"));
        }
        Ok(())
    }
}
