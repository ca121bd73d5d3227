// src/config.rs
//! Explicit run configuration. Nothing here is process-global: the loaded
//! `RunConfig` is passed into each call that needs it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const ENV_CONFIG_PATH: &str = "RANKWATCH_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/rankwatch.toml";

/// One ranking list to track. `id` is the site's category code; empty means
/// the overall best list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub categories: Vec<Category>,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,
    /// Record synthetic DROPPED rows for items that fell out of the top-N.
    #[serde(default)]
    pub synthesize_dropped: bool,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_report_dir() -> PathBuf {
    PathBuf::from("reports")
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            categories: vec![
                Category {
                    name: "전체".into(),
                    id: String::new(),
                },
                Category {
                    name: "스킨케어".into(),
                    id: "10000010001".into(),
                },
                Category {
                    name: "마스크팩".into(),
                    id: "10000010009".into(),
                },
                Category {
                    name: "클렌징".into(),
                    id: "10000010010".into(),
                },
                Category {
                    name: "선케어".into(),
                    id: "10000010011".into(),
                },
                Category {
                    name: "메이크업".into(),
                    id: "10000010002".into(),
                },
            ],
            data_dir: default_data_dir(),
            report_dir: default_report_dir(),
            synthesize_dropped: false,
        }
    }
}

pub fn load_from(path: &Path) -> Result<RunConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
}

/// Load config using env var + fallbacks:
/// 1) $RANKWATCH_CONFIG
/// 2) config/rankwatch.toml
/// 3) built-in defaults
pub fn load_default() -> Result<RunConfig> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        return load_from(&pb)
            .with_context(|| format!("{ENV_CONFIG_PATH} points to {}", pb.display()));
    }
    let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
    if default_p.exists() {
        return load_from(&default_p);
    }
    Ok(RunConfig::default())
}
