use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{PiyologError, Result};

/// Default lower bound of the interval colour intensity.
pub const DEFAULT_MIN_ALPHA: f64 = 0.3;
/// Default upper bound of the interval colour intensity.
pub const DEFAULT_MAX_ALPHA: f64 = 0.9;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Sleep pattern analysis for piyolog text exports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "piyolog-analyzer",
    about = "Sleep pattern analysis for piyolog text exports",
    version
)]
pub struct Settings {
    /// Log files, one per period, in order. Directories expand to their
    /// *.txt files; "-" reads standard input
    pub inputs: Vec<PathBuf>,

    /// Report format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Colour intensity given to the shortest session (0-1)
    #[arg(long, default_value_t = DEFAULT_MIN_ALPHA)]
    pub min_alpha: f64,

    /// Colour intensity given to the longest session (0-1)
    #[arg(long, default_value_t = DEFAULT_MAX_ALPHA)]
    pub max_alpha: f64,

    /// Logging level
    #[arg(long, default_value = "WARNING", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.piyolog-analyzer/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_alpha: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_alpha: Option<f64>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".piyolog-analyzer").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        // Write to a temp file then rename for atomicity.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Drop persisted alpha bounds that would fail [`Settings::validate`].
    fn without_invalid_alpha(mut self) -> Self {
        let in_unit = |v: Option<f64>| v.map_or(true, |v| (0.0..=1.0).contains(&v));
        let ordered = match (self.min_alpha, self.max_alpha) {
            (Some(min), Some(max)) => min <= max,
            _ => true,
        };
        if !in_unit(self.min_alpha) || !in_unit(self.max_alpha) || !ordered {
            self.min_alpha = None;
            self.max_alpha = None;
        }
        self
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result when it validates.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation – accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        // Build raw ArgMatches so we can query ValueSource.
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::apply_debug_flag(settings);
        }

        let last = LastUsedParams::load_from(config_path).without_invalid_alpha();

        // CLI always wins over persisted values.
        if !is_arg_explicitly_set(&matches, "format") {
            if let Some(v) = last.format {
                settings.format = v;
            }
        }
        // NOTE: clap stores the arg id using the *field name* (underscores).
        if !is_arg_explicitly_set(&matches, "min_alpha") {
            if let Some(v) = last.min_alpha {
                settings.min_alpha = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "max_alpha") {
            if let Some(v) = last.max_alpha {
                settings.max_alpha = v;
            }
        }

        settings = Self::apply_debug_flag(settings);

        // Rejected values are reported by the caller and never persisted.
        if settings.validate().is_ok() {
            let params = LastUsedParams::from(&settings);
            let _ = params.save_to(config_path);
        }

        settings
    }

    /// Check value combinations clap cannot express on its own.
    pub fn validate(&self) -> Result<()> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !in_unit(self.min_alpha) || !in_unit(self.max_alpha) {
            return Err(PiyologError::Config(format!(
                "alpha values must lie in 0..=1 (got {} and {})",
                self.min_alpha, self.max_alpha
            )));
        }
        if self.min_alpha > self.max_alpha {
            return Err(PiyologError::Config(format!(
                "min alpha {} exceeds max alpha {}",
                self.min_alpha, self.max_alpha
            )));
        }
        Ok(())
    }

    pub fn wants_json(&self) -> bool {
        self.format == "json"
    }

    /// `--debug` overrides the log level.
    fn apply_debug_flag(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            format: Some(s.format.clone()),
            min_alpha: Some(s.min_alpha),
            max_alpha: Some(s.max_alpha),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
