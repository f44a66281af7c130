//! Loading `config.toml` and experiment definitions from disk.

use crate::error::{IoError, Result};
use civitas_core::config::AppConfig;
use civitas_core::telemetry::ExperimentConfig;
use std::path::Path;
use tracing::info;

/// Loads and validates `path`. A missing file yields the defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    if !path.exists() {
        info!(path = %path.display(), "No config file; using defaults");
        return Ok(AppConfig::default());
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| IoError::FileSystem(e).with_context(format!("reading {}", path.display())))?;
    AppConfig::from_toml(&content)
        .map_err(|e| IoError::config(format!("{e:#}")).with_context(format!("loading {}", path.display())))
}

/// Reads an experiment definition from a `.json` or `.toml` file.
pub fn load_experiment<P: AsRef<Path>>(path: P) -> Result<ExperimentConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| IoError::FileSystem(e).with_context(format!("reading {}", path.display())))?;
    if content.trim().is_empty() {
        return Err(IoError::validation(format!("{} is empty", path.display())));
    }
    let config: ExperimentConfig = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|e| IoError::serialization(e.to_string()))?,
        _ => serde_json::from_str(&content)?,
    };
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("civitas-{}-{}", uuid::Uuid::new_v4(), name))
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = load_config(scratch("absent.toml")).unwrap();
        assert_eq!(config.meetings.exchanges, 5);
    }

    #[test]
    fn test_partial_file_overrides() {
        let path = scratch("config.toml");
        std::fs::write(&path, "[simulation]\nseed = 99\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.simulation.seed, Some(99));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_invalid_values_rejected() {
        let path = scratch("bad.toml");
        std::fs::write(&path, "[evolution]\nmutation_rate = 3.0\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("Mutation rate"));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_experiment_from_toml() {
        let path = scratch("experiment.toml");
        std::fs::write(
            &path,
            "name = \"Austerity\"\nduration_days = 30\n\n[parameters]\nbudget_constraints = true\n",
        )
        .unwrap();
        let config = load_experiment(&path).unwrap();
        assert_eq!(config.duration_days, 30);
        assert!(config.parameters.budget_constraints);
        std::fs::remove_file(path).ok();
    }
}
