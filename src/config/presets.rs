use crate::config::SimulationConfig;
use crate::error::SimError;
use serde::Serialize;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIGS_DIR: &str = "configs";
const DEFAULT_PRESET_ORDER: &[&str] = &["markley_7_1.yaml", "intermediate_axis.yaml"];

#[derive(Debug, Serialize)]
pub struct PresetSummary {
    pub name: String,
    pub file: String,
}

fn configs_dir() -> PathBuf {
    std::env::var("CONFIGS_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIGS_DIR))
}

/// Loads the bundled default configuration, preferring the Markley
/// preset, falling back to the intermediate-axis preset, then any
/// `*.yaml` file found in the configs directory.
pub fn load_defaults() -> Result<SimulationConfig, SimError> {
    let dir = configs_dir();

    for name in DEFAULT_PRESET_ORDER {
        let path = dir.join(name);
        if path.exists() {
            return load_preset_file(&path);
        }
    }

    let entries = std::fs::read_dir(&dir).map_err(|e| {
        SimError::ConfigInvalid(format!("cannot read configs directory {:?}: {e}", dir))
    })?;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("yaml") {
            return load_preset_file(&path);
        }
    }

    Err(SimError::ConfigInvalid(format!(
        "no configuration file found in {:?}",
        dir
    )))
}

fn load_preset_file(path: &Path) -> Result<SimulationConfig, SimError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| SimError::ConfigInvalid(format!("cannot read {:?}: {e}", path)))?;
    let cfg: SimulationConfig = serde_yaml::from_str(&contents)?;
    Ok(cfg)
}

/// Lists bundled preset filenames, for `GET /api/presets`.
pub fn list_presets() -> Result<Vec<PresetSummary>, SimError> {
    let dir = configs_dir();
    let entries = std::fs::read_dir(&dir).map_err(|e| {
        SimError::ConfigInvalid(format!("cannot read configs directory {:?}: {e}", dir))
    })?;

    let mut presets: Vec<PresetSummary> = Vec::new();
    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("yaml"))
        .collect();
    paths.sort();

    for path in paths {
        let Ok(contents) = std::fs::read_to_string(&path) else {
            continue;
        };
        let Ok(cfg) = serde_yaml::from_str::<SimulationConfig>(&contents) else {
            continue;
        };
        let file = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let name = cfg.name.unwrap_or_else(|| file.clone());
        presets.push(PresetSummary { name, file });
    }
    Ok(presets)
}

/// Reads a single preset's raw YAML-decoded content, for
/// `GET /api/presets/{filename}`. Rejects names not ending in `.yaml`
/// and path traversal via `Path::file_name`.
pub fn read_preset(filename: &str) -> Result<SimulationConfig, SimError> {
    if !filename.ends_with(".yaml") {
        return Err(SimError::ConfigInvalid(
            "invalid preset filename".to_string(),
        ));
    }
    let base = Path::new(filename)
        .file_name()
        .ok_or_else(|| SimError::ConfigInvalid("invalid preset filename".to_string()))?;
    let path = configs_dir().join(base);
    if !path.exists() {
        return Err(SimError::ConfigInvalid("preset not found".to_string()));
    }
    load_preset_file(&path)
}
