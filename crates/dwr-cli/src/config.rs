//! Driver configuration, loaded from .dwr/config.yaml

use std::path::Path;

use anyhow::{Context, Result};
use dwr_pocl::PoclPlannerConfig;
use serde::{Deserialize, Serialize};

pub const PROJECT_CONFIG: &str = ".dwr/config.yaml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DwrConfig {
    /// Search budgets and heuristic tuning
    pub planner: PoclPlannerConfig,

    /// Default output format; `--json` forces JSON
    pub output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl DwrConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        Ok(config)
    }

    /// Load from a directory (looks for .dwr/config.yaml), defaulting when absent
    pub fn load_from_project(root: &Path) -> Result<Self> {
        let config_path = root.join(PROJECT_CONFIG);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// An explicit path wins over the project file.
    pub fn resolve(explicit: Option<&Path>, root: &Path) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => Self::load_from_project(root),
        }
    }

    pub fn apply_overrides(&mut self, max_expansions: Option<usize>, max_steps: Option<usize>) {
        if let Some(n) = max_expansions {
            self.planner.max_expansions = n;
        }
        if let Some(n) = max_steps {
            self.planner.max_steps = n;
        }
    }
}
