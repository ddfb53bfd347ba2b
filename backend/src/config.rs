use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_CONFIG_PATH: &str = "config/dfscan.yaml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub simulation: SimulationConfig,
    pub video: VideoConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub static_dir: PathBuf,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: PathBuf,
    pub channel_order: ChannelOrder,
}

/// Channel layout handed to the classifier. Models trained on OpenCV
/// pipelines expect BGR.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOrder {
    #[default]
    Rgb,
    Bgr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub delay_ms: u64,
    pub min_confidence: u8,
    pub max_confidence: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub ffmpeg: String,
    pub ffprobe: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            upload_dir: PathBuf::from("static/uploads"),
            static_dir: PathBuf::from("static"),
            max_upload_bytes: 200 * 1024 * 1024,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("model.pt"),
            channel_order: ChannelOrder::Rgb,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            delay_ms: 2000,
            min_confidence: 10,
            max_confidence: 99,
        }
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
        }
    }
}

impl SimulationConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl AppConfig {
    /// Reads `$DFSCAN_CONFIG` (or `config/dfscan.yaml`), then applies
    /// environment overrides. A missing file is not an error.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("DFSCAN_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_file(Path::new(&config_path))?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let config_str = std::fs::read_to_string(path)?;
        Self::from_yaml(&config_str)
    }

    pub fn from_yaml(config_str: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_yaml::from_str(config_str)?;
        Ok(config)
    }

    fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("DFSCAN_MODEL_PATH") {
            self.model.path = PathBuf::from(path);
        }
        if let Some(dir) = lookup("DFSCAN_UPLOAD_DIR") {
            self.server.upload_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("DFSCAN_STATIC_DIR") {
            self.server.static_dir = PathBuf::from(dir);
        }
        if let Some(delay) = lookup("DFSCAN_SIMULATION_DELAY_MS") {
            self.simulation.delay_ms = delay.parse().map_err(|_| {
                ConfigError::Invalid(format!("DFSCAN_SIMULATION_DELAY_MS={}", delay))
            })?;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("PORT={}", port)))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        if sim.min_confidence > sim.max_confidence || sim.max_confidence > 100 {
            return Err(ConfigError::Invalid(format!(
                "simulation confidence range {}..={} must lie within 0..=100",
                sim.min_confidence, sim.max_confidence
            )));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
