//! Configuration for pdfdeck.
//!
//! There are no command-line flags. Settings come from an optional JSON
//! file whose path is taken from the `PDFDECK_CONFIG` environment variable;
//! every field has a default, so an empty object (or no file at all) is a
//! valid configuration.
//!
//! ```json
//! {
//!   "verbose": false,
//!   "compression": "standard",
//!   "overwrite_mode": "prompt",
//!   "reload_sources": true,
//!   "layout": { "tile_width": 220, "tile_height": 330, "spacing": 6, "margin": 9 }
//! }
//! ```

use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

use crate::arrange::StackLayout;
use crate::error::{PdfDeckError, Result};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "PDFDECK_CONFIG";

/// Compression level for the output PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// No compression - preserves exact stream bytes.
    None,
    /// Compress streams.
    #[default]
    Standard,
    /// Compress streams and drop unreferenced objects.
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = PdfDeckError;

    /// Parse compression level from "none", "standard" or "maximum" (any case).
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(PdfDeckError::invalid_config(format!(
                "Invalid compression level: {s}. Must be one of: none, standard, maximum"
            ))),
        }
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverwriteMode {
    /// Ask the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without asking.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// Complete configuration for a pdfdeck session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// Compression level for exports.
    pub compression: CompressionLevel,

    /// File overwrite behavior for exports.
    pub overwrite_mode: OverwriteMode,

    /// Write exports through a temp file and rename.
    pub atomic_writes: bool,

    /// Re-read source files at export time instead of using the copy
    /// parsed at load time. Detects sources deleted or shrunk after load.
    pub reload_sources: bool,

    /// Number of files read in parallel by a multi-file load (None = auto-detect).
    pub load_jobs: Option<usize>,

    /// Page tile geometry used to resolve drop positions.
    pub layout: StackLayout,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbose: false,
            quiet: false,
            compression: CompressionLevel::default(),
            overwrite_mode: OverwriteMode::default(),
            atomic_writes: true,
            reload_sources: true,
            load_jobs: None,
            layout: StackLayout::default(),
        }
    }
}

impl Config {
    /// Read and validate a JSON configuration file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            PdfDeckError::invalid_config(format!("Cannot read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| {
            PdfDeckError::invalid_config(format!("Cannot parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file named by `PDFDECK_CONFIG`, or defaults if it is unset.
    pub fn discover() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) if !path.is_empty() => {
                log::debug!("loading configuration from {}", path.to_string_lossy());
                Self::load_from(Path::new(&path))
            }
            _ => Ok(Self::default()),
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Verbose and quiet modes are both enabled
    /// - `load_jobs` is zero
    /// - The tile layout has a non-positive size or a negative gap
    pub fn validate(&self) -> Result<()> {
        if self.verbose && self.quiet {
            return Err(PdfDeckError::invalid_config(
                "Cannot enable both verbose and quiet output",
            ));
        }

        if self.load_jobs == Some(0) {
            return Err(PdfDeckError::invalid_config(
                "Number of load jobs must be at least 1",
            ));
        }

        let layout = &self.layout;
        if !(layout.tile_width > 0.0 && layout.tile_height > 0.0) {
            return Err(PdfDeckError::invalid_config(
                "Page tiles must have a positive width and height",
            ));
        }
        if !(layout.spacing >= 0.0 && layout.margin >= 0.0) {
            return Err(PdfDeckError::invalid_config(
                "Tile spacing and margin cannot be negative",
            ));
        }

        Ok(())
    }

    /// Get the effective number of parallel loads.
    ///
    /// Returns the configured count, or the number of CPU cores if unset.
    pub fn effective_load_jobs(&self) -> usize {
        self.load_jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}
