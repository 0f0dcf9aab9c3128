//! Configuration loading

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use rust_decimal::Decimal;

use crate::domain::services::formatter::check_date_pattern;
use crate::error::{CasillaError, CasillaResult};

use super::types::Config;

pub use crate::domain::value_objects::ConfigWarning;

/// Project-local configuration file name
pub const PROJECT_CONFIG: &str = "casilla.toml";

/// Largest supported number of fraction digits
const MAX_DIGITS: u32 = 20;

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> CasillaResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| CasillaError::Config {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;
    validate(&config).map_err(|message| CasillaError::Config {
        file: path.to_path_buf(),
        message,
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|key| {
            let leaf = key.split('.').next_back().unwrap_or(key.as_str()).to_string();
            ConfigWarning {
                file: path.to_path_buf(),
                line: find_line_number(&content, &leaf),
                suggestion: suggest_key(&leaf),
                key,
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Reject values no run could work with.
pub fn validate(config: &Config) -> Result<(), String> {
    check_date_pattern(&config.format.date_pattern)?;
    if config.format.fraction_digits > MAX_DIGITS {
        return Err(format!("format.fraction_digits must be at most {MAX_DIGITS}"));
    }
    if config.format.decimal_separator == config.format.thousands_separator {
        return Err("format.decimal_separator and format.thousands_separator must differ".to_string());
    }
    if config.recalculation.tolerance.is_sign_negative() {
        return Err("recalculation.tolerance must not be negative".to_string());
    }
    if config.recalculation.factor_digits > MAX_DIGITS {
        return Err(format!("recalculation.factor_digits must be at most {MAX_DIGITS}"));
    }
    for (key, value) in [
        ("render.checkbox_x_offset", config.render.checkbox_x_offset),
        ("render.checkbox_y_offset", config.render.checkbox_y_offset),
    ] {
        if !value.is_finite() {
            return Err(format!("{key} must be a finite number"));
        }
    }
    Ok(())
}

/// Candidate configuration files, highest priority first
fn candidates(explicit: Option<&Path>) -> Vec<PathBuf> {
    if let Some(path) = explicit {
        return vec![path.to_path_buf()];
    }
    let mut found = vec![PathBuf::from(PROJECT_CONFIG)];
    if let Some(dir) = dirs::config_dir() {
        found.push(dir.join("casilla").join("config.toml"));
    }
    found
}

/// Load the first configuration found, then apply environment overrides.
///
/// An explicit path must exist; implicit locations are skipped when absent.
pub fn discover(explicit: Option<&Path>) -> CasillaResult<(Config, Vec<ConfigWarning>)> {
    for path in candidates(explicit) {
        if explicit.is_none() && !path.is_file() {
            continue;
        }
        debug!("loading configuration from {}", path.display());
        let (config, warnings) = load_with_warnings(&path)?;
        return Ok((with_env_overrides(config), warnings));
    }
    Ok((with_env_overrides(Config::default()), Vec::new()))
}

/// Apply environment variable overrides (CASILLA_* prefix)
pub fn with_env_overrides(config: Config) -> Config {
    apply_overrides(config, |name| std::env::var(name).ok())
}

fn parse_or_keep<T: std::str::FromStr>(name: &str, raw: &str, current: T) -> T {
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!("ignoring invalid {name} value '{raw}'");
            current
        }
    }
}

/// Overrides read through `lookup`, so tests need not touch the process env.
pub fn apply_overrides<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(pattern) = lookup("CASILLA_DATE_PATTERN") {
        match check_date_pattern(&pattern) {
            Ok(()) => config.format.date_pattern = pattern,
            Err(reason) => warn!("ignoring CASILLA_DATE_PATTERN: {reason}"),
        }
    }

    if let Some(digits) = lookup("CASILLA_FRACTION_DIGITS") {
        let parsed = parse_or_keep("CASILLA_FRACTION_DIGITS", &digits, config.format.fraction_digits);
        config.format.fraction_digits = parsed.min(MAX_DIGITS);
    }

    if let Some(tolerance) = lookup("CASILLA_TOTALS_TOLERANCE") {
        let parsed: Decimal = parse_or_keep(
            "CASILLA_TOTALS_TOLERANCE",
            &tolerance,
            config.recalculation.tolerance,
        );
        if parsed.is_sign_negative() {
            warn!("ignoring negative CASILLA_TOTALS_TOLERANCE '{tolerance}'");
        } else {
            config.recalculation.tolerance = parsed;
        }
    }

    if let Some(dir) = lookup("CASILLA_OUTPUT_DIR") {
        if !dir.trim().is_empty() {
            config.output.dir = PathBuf::from(dir);
        }
    }

    if let Some(workers) = lookup("CASILLA_MAX_WORKERS") {
        config.batch.max_workers = parse_or_keep("CASILLA_MAX_WORKERS", &workers, config.batch.max_workers);
    }

    if let Some(val) = lookup("CASILLA_COMPRESS") {
        config.render.compress = val.to_lowercase() != "false" && val != "0";
    }

    config
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    for (i, line) in content.lines().enumerate() {
        if line.contains(needle) {
            return Some(i + 1);
        }
    }
    None
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "format",
        "date_pattern",
        "fraction_digits",
        "decimal_separator",
        "thousands_separator",
        "blank_zero_amounts",
        "recalculation",
        "tolerance",
        "factor_digits",
        "render",
        "checkbox_x_offset",
        "checkbox_y_offset",
        "author",
        "compress",
        "output",
        "dir",
        "batch",
        "max_workers",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] = std::cmp::min(std::cmp::min(prev[j + 1] + 1, curr[j] + 1), prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
