// Configuration loading and parsing (warbook.toml, valuation.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use warbook_valuation::ValuationParams;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("cannot seed config/ from defaults/: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub data_paths: DataPaths,
    pub report: ReportConfig,
    pub valuation: ValuationParams,
}

// ---------------------------------------------------------------------------
// warbook.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire warbook.toml file.
#[derive(Debug, Clone, Deserialize)]
struct WarbookFile {
    database: DatabaseSection,
    data: DataPaths,
    report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize)]
struct DatabaseSection {
    path: String,
}

/// Stats-feed exports imported on every run.
#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub players: String,
    pub seasons: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Where the JSON report is written.
    pub path: String,
    pub page_size: usize,
    /// Only value players listed at this position (e.g. "SS").
    #[serde(default)]
    pub position: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/warbook.toml` and
/// (optionally) `config/valuation.toml`, relative to `base_dir`.
///
/// This does not copy defaults; `load_config()` does that first.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- warbook.toml (required) ---
    let warbook_path = config_dir.join("warbook.toml");
    let warbook_text = read_file(&warbook_path)?;
    let warbook_file: WarbookFile =
        toml::from_str(&warbook_text).map_err(|e| ConfigError::ParseError {
            path: warbook_path.clone(),
            source: e,
        })?;

    // --- valuation.toml (optional; missing keys keep their defaults) ---
    let valuation_path = config_dir.join("valuation.toml");
    let valuation = if valuation_path.exists() {
        let text = read_file(&valuation_path)?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseError {
            path: valuation_path.clone(),
            source: e,
        })?
    } else {
        ValuationParams::default()
    };

    let config = Config {
        db_path: warbook_file.database.path,
        data_paths: warbook_file.data,
        report: warbook_file.report,
        valuation,
    };

    validate(&config)?;

    Ok(config)
}

/// Files seeded from `defaults/` on first run. Only `warbook.toml` is
/// required; `valuation.toml` is seeded so every tunable is visible.
pub const SEEDED_FILES: [&str; 2] = ["warbook.toml", "valuation.toml"];

/// Copy each of [`SEEDED_FILES`] from `defaults/` into `config/` unless the
/// user already has one. Returns the paths written.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.is_dir() {
        if config_dir.join("warbook.toml").is_file() {
            return Ok(vec![]);
        }
        return Err(seed_error(format!(
            "no defaults/ to seed config/warbook.toml from in {}",
            base_dir.display()
        )));
    }

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| seed_error(format!("cannot create {}: {e}", config_dir.display())))?;

    let mut seeded = Vec::new();
    for name in SEEDED_FILES {
        let source = defaults_dir.join(name);
        let target = config_dir.join(name);
        if !source.is_file() || target.exists() {
            continue;
        }
        std::fs::copy(&source, &target).map_err(|e| {
            seed_error(format!("cannot copy {} to config/: {e}", source.display()))
        })?;
        info!("seeded {} from defaults", target.display());
        seeded.push(target);
    }

    Ok(seeded)
}

/// Load config relative to the current working directory, copying defaults
/// into `config/` first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn seed_error(message: String) -> ConfigError {
    ConfigError::DefaultsCopyError { message }
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.report.page_size == 0 {
        return Err(invalid("report.page_size", "must be greater than 0"));
    }

    validate_valuation(&config.valuation)
}

/// Reject parameter sets that would make valuations meaningless. The engine
/// itself never fails on bad numbers; this catches typos at startup instead.
pub fn validate_valuation(v: &ValuationParams) -> Result<(), ConfigError> {
    let positive: &[(&str, f64)] = &[
        ("valuation.dollars_per_unit", v.dollars_per_unit),
        ("valuation.index_scale", v.index_scale),
        ("valuation.age.late_career", v.age.late_career),
        ("valuation.playing_time.unknown_factor", v.playing_time.unknown_factor),
        ("valuation.premium.two_way_bonus", v.premium.two_way_bonus),
        ("valuation.track_record.no_history", v.track_record.no_history),
        ("valuation.track_record.single_season", v.track_record.single_season),
        ("valuation.track_record.single_elite_season", v.track_record.single_elite_season),
        ("valuation.track_record.two_seasons", v.track_record.two_seasons),
        ("valuation.track_record.spike_floor", v.track_record.spike_floor),
        ("valuation.position.catcher", v.position.catcher),
        ("valuation.position.first_base", v.position.first_base),
        ("valuation.position.second_base", v.position.second_base),
        ("valuation.position.third_base", v.position.third_base),
        ("valuation.position.shortstop", v.position.shortstop),
        ("valuation.position.left_field", v.position.left_field),
        ("valuation.position.center_field", v.position.center_field),
        ("valuation.position.right_field", v.position.right_field),
        ("valuation.position.outfield", v.position.outfield),
        ("valuation.position.designated_hitter", v.position.designated_hitter),
        ("valuation.position.starting_pitcher", v.position.starting_pitcher),
        ("valuation.position.relief_pitcher", v.position.relief_pitcher),
        ("valuation.position.two_way", v.position.two_way),
    ];
    for (name, val) in positive {
        if !val.is_finite() || *val <= 0.0 {
            return Err(invalid(name, format!("must be > 0, got {val}")));
        }
    }

    if !(0.0..1.0).contains(&v.discount_rate) {
        return Err(invalid(
            "valuation.discount_rate",
            format!("must be in [0.0, 1.0), got {}", v.discount_rate),
        ));
    }

    if !v.elite_season_threshold.is_finite() {
        return Err(invalid("valuation.elite_season_threshold", "must be finite"));
    }

    let unit_weights: &[(&str, f64)] = &[
        ("valuation.blend.two_season_current_weight", v.blend.two_season_current_weight),
        ("valuation.blend.stable_weight", v.blend.stable_weight),
        ("valuation.blend.spike_weight", v.blend.spike_weight),
        ("valuation.blend.decline_weight", v.blend.decline_weight),
        ("valuation.age.elite_decline_share", v.age.elite_decline_share),
        ("valuation.playing_time.min_share", v.playing_time.min_share),
        ("valuation.playing_time.unknown_factor", v.playing_time.unknown_factor),
    ];
    for (name, val) in unit_weights {
        if !(0.0..=1.0).contains(val) {
            return Err(invalid(
                name,
                format!("must be between 0.0 and 1.0 inclusive, got {val}"),
            ));
        }
    }

    let non_negative: &[(&str, f64)] = &[
        ("valuation.blend.spike_threshold", v.blend.spike_threshold),
        ("valuation.blend.decline_threshold", v.blend.decline_threshold),
        ("valuation.blend.min_scale", v.blend.min_scale),
        ("valuation.track_record.spike_tolerance", v.track_record.spike_tolerance),
        ("valuation.track_record.spike_slope", v.track_record.spike_slope),
        ("valuation.track_record.legacy_max_bonus", v.track_record.legacy_max_bonus),
        ("valuation.consistency.max_bonus", v.consistency.max_bonus),
    ];
    for (name, val) in non_negative {
        if !val.is_finite() || *val < 0.0 {
            return Err(invalid(name, format!("must be >= 0, got {val}")));
        }
    }

    if v.age.bands.iter().any(|b| !b.factor.is_finite() || b.factor <= 0.0) {
        return Err(invalid("valuation.age.bands", "every band factor must be > 0"));
    }
    if v.age.bands.windows(2).any(|w| w[0].max_age >= w[1].max_age) {
        return Err(invalid(
            "valuation.age.bands",
            "bands must be listed in ascending max_age order",
        ));
    }

    let tiers = v
        .premium
        .power_tiers
        .iter()
        .map(|t| t.multiplier)
        .chain(v.premium.elite_season_tiers.iter().map(|t| t.multiplier));
    for multiplier in tiers {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(invalid(
                "valuation.premium",
                format!("tier multipliers must be > 0, got {multiplier}"),
            ));
        }
    }

    if v.playing_time.full_season_games == 0 {
        return Err(invalid(
            "valuation.playing_time.full_season_games",
            "must be greater than 0",
        ));
    }

    let h = &v.horizon;
    if h.min_years == 0 {
        return Err(invalid("valuation.horizon.min_years", "must be greater than 0"));
    }
    if h.min_years > h.max_years {
        return Err(invalid(
            "valuation.horizon.max_years",
            format!("must be >= min_years ({}), got {}", h.min_years, h.max_years),
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
