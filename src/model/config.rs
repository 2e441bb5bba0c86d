use serde::{Deserialize, Serialize};

/// User configuration from `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub reconcile: ReconcileConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Match task filters without regard to case
    #[serde(default)]
    pub ignore_case: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Ask before applying link corrections
    #[serde(default = "default_true")]
    pub confirm: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        ReconcileConfig { confirm: true }
    }
}

fn default_true() -> bool {
    true
}
