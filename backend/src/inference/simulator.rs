use rand::Rng;
use std::ops::RangeInclusive;
use std::time::Duration;

use super::RawScore;
use crate::config::SimulationConfig;
use crate::error::ConfigError;
use crate::preprocess::NormalizedTensor;

/// Stand-in used when no classifier is available. Never looks at the input.
#[derive(Debug, Clone)]
pub struct Simulator {
    delay: Duration,
    confidence: RangeInclusive<u8>,
}

impl Simulator {
    /// The confidence range must be non-empty and lie within 0..=100.
    pub fn new(delay: Duration, confidence: RangeInclusive<u8>) -> Result<Self, ConfigError> {
        if confidence.is_empty() || *confidence.end() > 100 {
            return Err(ConfigError::Invalid(format!(
                "simulation confidence range {}..={} must lie within 0..=100",
                confidence.start(),
                confidence.end()
            )));
        }
        Ok(Self { delay, confidence })
    }

    pub fn from_config(config: &SimulationConfig) -> Result<Self, ConfigError> {
        Self::new(
            config.delay(),
            config.min_confidence..=config.max_confidence,
        )
    }

    /// Sleeps for the configured delay, then draws a confidence uniformly
    /// from the range and reports it as a fraction.
    pub fn infer(&self, _tensor: &NormalizedTensor) -> RawScore {
        log::info!("Simulation mode: generating random result");
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        let confidence = rand::rng().random_range(self.confidence.clone());
        RawScore::new(f64::from(confidence) / 100.0)
    }
}
