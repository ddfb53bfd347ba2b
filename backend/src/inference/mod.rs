use shared::BackendMode;
use std::path::Path;

use crate::error::InferenceError;
use crate::preprocess::NormalizedTensor;

mod simulator;
#[cfg(feature = "libtorch")]
mod torch;

pub use simulator::Simulator;
#[cfg(feature = "libtorch")]
pub use torch::TorchClassifier;

/// Probability that the media is synthetic, always within [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct RawScore(f64);

impl RawScore {
    /// Clamps into [0, 1]; NaN maps to 0.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            Self(0.0)
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Percentage rounded to the nearest integer.
    /// Ties go to the even neighbour, so a score of 0.505 is 50 (authentic).
    pub fn to_confidence(self) -> u8 {
        (self.0 * 100.0).round_ties_even() as u8
    }
}

/// A trained binary classifier.
pub trait Classifier: Send + Sync {
    fn infer(&self, tensor: &NormalizedTensor) -> Result<RawScore, InferenceError>;
}

pub enum InferenceBackend {
    Classifier(Box<dyn Classifier>),
    Simulator(Simulator),
}

impl InferenceBackend {
    pub fn infer(&self, tensor: NormalizedTensor) -> Result<RawScore, InferenceError> {
        match self {
            InferenceBackend::Classifier(classifier) => classifier.infer(&tensor),
            InferenceBackend::Simulator(simulator) => Ok(simulator.infer(&tensor)),
        }
    }

    pub fn mode(&self) -> BackendMode {
        match self {
            InferenceBackend::Classifier(_) => BackendMode::Classifier,
            InferenceBackend::Simulator(_) => BackendMode::Simulation,
        }
    }
}

/// Picks the backend once at startup: the classifier if the model file exists
/// and loads, the simulator otherwise. Never fails.
pub fn select_backend<F>(model_path: &Path, simulator: Simulator, load: F) -> InferenceBackend
where
    F: FnOnce(&Path) -> Result<Box<dyn Classifier>, InferenceError>,
{
    if !model_path.exists() {
        log::warn!(
            "Model '{}' not found. Running in SIMULATION mode.",
            model_path.display()
        );
        return InferenceBackend::Simulator(simulator);
    }

    match load(model_path) {
        Ok(classifier) => {
            log::info!("Classifier loaded from '{}'", model_path.display());
            InferenceBackend::Classifier(classifier)
        }
        Err(e) => {
            log::error!(
                "Failed to load model '{}': {}. Running in SIMULATION mode.",
                model_path.display(),
                e
            );
            InferenceBackend::Simulator(simulator)
        }
    }
}

/// Loader for the compiled-in classifier implementation.
pub fn load_classifier(model_path: &Path) -> Result<Box<dyn Classifier>, InferenceError> {
    #[cfg(feature = "libtorch")]
    {
        Ok(Box::new(TorchClassifier::load(model_path)?))
    }
    #[cfg(not(feature = "libtorch"))]
    {
        let _ = model_path;
        Err(InferenceError::Unavailable)
    }
}
