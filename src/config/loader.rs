//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{GeoExportConfig, StorageBackend};
use super::secret::{redact_tokens, BearerToken};
use crate::domain::errors::GeoExportError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into GeoExportConfig
/// 4. Applies environment variable overrides (GEOEXPORT_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use geoexport::config::loader::load_config;
///
/// let config = load_config("geoexport.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<GeoExportConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(GeoExportError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        GeoExportError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses, overrides and validates configuration from TOML text
pub fn parse_config(contents: &str) -> Result<GeoExportConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: GeoExportConfig = toml::from_str(&contents).map_err(|e| {
        GeoExportError::Configuration(format!(
            "Failed to parse TOML: {}",
            redact_tokens(&e.to_string())
        ))
    })?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        GeoExportError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied unchanged.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| GeoExportError::Configuration(format!("invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(GeoExportError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Parses an override, rejecting values that do not parse
fn parsed<T: FromStr>(name: &str) -> Result<Option<T>> {
    match env(name) {
        Some(val) => val.trim().parse().map(Some).map_err(|_| {
            GeoExportError::Configuration(format!("Invalid value '{val}' for {name}"))
        }),
        None => Ok(None),
    }
}

/// Applies environment variable overrides using GEOEXPORT_* prefix
///
/// Environment variables follow the pattern: GEOEXPORT_<SECTION>_<KEY>
/// For example: GEOEXPORT_IMAGERY_TOKEN, GEOEXPORT_EXPORT_STRATEGY
fn apply_env_overrides(config: &mut GeoExportConfig) -> Result<()> {
    // Application overrides
    if let Some(val) = env("GEOEXPORT_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Imagery overrides
    if let Some(val) = env("GEOEXPORT_IMAGERY_BASE_URL") {
        config.imagery.base_url = val;
    }
    if let Some(val) = env("GEOEXPORT_IMAGERY_PROJECT") {
        config.imagery.project = val;
    }
    if let Some(val) = env("GEOEXPORT_IMAGERY_TOKEN") {
        config.imagery.token = Some(BearerToken::new(val));
    }
    if let Some(val) = parsed("GEOEXPORT_IMAGERY_TIMEOUT_SECONDS")? {
        config.imagery.timeout_seconds = val;
    }
    if let Some(val) = parsed("GEOEXPORT_IMAGERY_TLS_VERIFY")? {
        config.imagery.tls_verify = val;
    }

    // Storage overrides
    if let Some(val) = env("GEOEXPORT_STORAGE_BACKEND") {
        config.storage.backend = match val.to_lowercase().as_str() {
            "gcs" => StorageBackend::Gcs,
            "local" => StorageBackend::Local,
            other => {
                return Err(GeoExportError::Configuration(format!(
                    "Invalid value '{other}' for GEOEXPORT_STORAGE_BACKEND"
                )))
            }
        };
    }
    if let Some(val) = env("GEOEXPORT_STORAGE_BUCKET") {
        config.storage.bucket = val;
    }
    if let Some(val) = env("GEOEXPORT_STORAGE_PREFIX") {
        config.storage.prefix = val;
    }
    if let Some(val) = env("GEOEXPORT_STORAGE_TOKEN") {
        config.storage.token = Some(BearerToken::new(val));
    }
    if let Some(val) = env("GEOEXPORT_STORAGE_LOCAL_ROOT") {
        config.storage.local_root = Some(val);
    }

    // Export overrides
    if let Some(val) = parsed("GEOEXPORT_EXPORT_DAYS_PER_TIMESTEP")? {
        config.export.days_per_timestep = val;
    }
    if let Some(val) = parsed("GEOEXPORT_EXPORT_NUM_TIMESTEPS")? {
        config.export.num_timesteps = val;
    }
    if let Some(val) = env("GEOEXPORT_EXPORT_STRATEGY") {
        config.export.strategy = val;
    }
    if let Some(val) = parsed("GEOEXPORT_EXPORT_MONITOR")? {
        config.export.monitor = val;
    }
    if let Some(val) = parsed("GEOEXPORT_EXPORT_POLL_INTERVAL_SECONDS")? {
        config.export.poll_interval_seconds = val;
    }
    if let Some(val) = parsed("GEOEXPORT_EXPORT_MAX_PENDING_JOBS")? {
        config.export.max_pending_jobs = val;
    }
    if let Some(val) = parsed("GEOEXPORT_EXPORT_SURROUNDING_METRES")? {
        config.export.surrounding_metres = val;
    }
    if let Some(val) = parsed("GEOEXPORT_EXPORT_METRES_PER_POLYGON")? {
        config.export.metres_per_polygon = Some(val);
    }
    if let Some(val) = parsed("GEOEXPORT_EXPORT_CHECK_STORAGE")? {
        config.export.check_storage = val;
    }
    if let Some(val) = parsed("GEOEXPORT_EXPORT_CHECK_PENDING")? {
        config.export.check_pending = val;
    }
    if let Some(val) = parsed("GEOEXPORT_EXPORT_DRY_RUN")? {
        config.export.dry_run = val;
    }

    // Tiling overrides
    if let Some(val) = env("GEOEXPORT_TILING_ROUNDING") {
        config.tiling.rounding = val;
    }

    // Logging overrides
    if let Some(val) = parsed("GEOEXPORT_LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = val;
    }
    if let Some(val) = env("GEOEXPORT_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = env("GEOEXPORT_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("GEOEXPORT_LOADER_TEST_VAR", "test_value");
        let input = "token = \"${GEOEXPORT_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "token = \"test_value\"\n");
        std::env::remove_var("GEOEXPORT_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("GEOEXPORT_LOADER_MISSING_VAR");
        let input = "token = \"${GEOEXPORT_LOADER_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("GEOEXPORT_LOADER_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        std::env::remove_var("GEOEXPORT_LOADER_COMMENTED_VAR");
        let input = "# token = \"${GEOEXPORT_LOADER_COMMENTED_VAR}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(matches!(result, Err(GeoExportError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[imagery]
base_url = "https://imagery.example.com"
project = "crop-mask"

[storage]
bucket = "crop-mask-tifs"

[export]
strategy = "thorough"
days_per_timestep = 15
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.imagery.project, "crop-mask");
        assert_eq!(config.export.strategy, "thorough");
        assert_eq!(config.export.days_per_timestep, 15);
        assert_eq!(config.storage.prefix, "tifs");
        assert_eq!(config.tiling.rounding, "truncate");
    }

    #[test]
    fn test_parse_config_rejects_invalid_values() {
        let toml_content = r#"
[imagery]
project = "crop-mask"

[export]
strategy = "medium"
"#;
        let err = parse_config(toml_content).unwrap_err();
        assert!(err.to_string().contains("export.strategy"));
    }
}
