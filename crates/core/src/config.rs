use serde::Deserialize;

use crate::error::{CreativeError, CreativeResult};

/// Root application configuration. Loaded from environment variables
/// with the prefix `CREATIVE_EXPRESS__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_campaign_name")]
    pub campaign_name: String,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Knobs for the per-strategy generation loop.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// Upper bound on the external render + vision calls of one strategy.
    #[serde(default = "default_task_timeout_ms")]
    pub task_timeout_ms: u64,
    /// Run the five strategy pipelines concurrently instead of one after another.
    #[serde(default = "default_concurrent")]
    pub concurrent: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_bundle_dir")]
    pub bundle_dir: String,
    #[serde(default = "default_write_delivery_format")]
    pub write_delivery_format: bool,
}

// Default functions
fn default_campaign_name() -> String {
    "creative-campaign".to_string()
}
fn default_task_timeout_ms() -> u64 {
    30_000
}
fn default_concurrent() -> bool {
    true
}
fn default_bundle_dir() -> String {
    "output".to_string()
}
fn default_write_delivery_format() -> bool {
    true
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            task_timeout_ms: default_task_timeout_ms(),
            concurrent: default_concurrent(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            bundle_dir: default_bundle_dir(),
            write_delivery_format: default_write_delivery_format(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            campaign_name: default_campaign_name(),
            generation: GenerationConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> CreativeResult<Self> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("CREATIVE_EXPRESS")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .and_then(|config| config.try_deserialize())
            .map_err(|e| CreativeError::Config(e.to_string()))
    }
}
