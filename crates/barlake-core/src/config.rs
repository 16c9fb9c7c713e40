use std::path::PathBuf;

use serde::Deserialize;

use crate::provider::ProviderId;

/// Explicit pipeline configuration.
///
/// The pipeline never reads the environment or a config file itself; the
/// caller resolves credentials and paths however it likes and hands the
/// result in here. The struct is `Deserialize` so that callers using a
/// config format can map onto it directly.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub providers: ProvidersConfig,
    pub data_dir: PathBuf,
    /// Required only when `AlphaVantage` appears in the active priority;
    /// checked at adapter construction time.
    pub alpha_vantage_api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub priority: Vec<ProviderId>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            priority: vec![ProviderId::Yahoo, ProviderId::AlphaVantage],
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            providers: ProvidersConfig::default(),
            data_dir: PathBuf::from("data/"),
            alpha_vantage_api_key: None,
        }
    }
}
