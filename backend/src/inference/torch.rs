use std::path::Path;
use std::sync::Mutex;
use tch::{CModule, Device, Kind, Tensor};

use super::{Classifier, RawScore};
use crate::error::InferenceError;
use crate::preprocess::NormalizedTensor;

/// TorchScript binary classifier. Expects NHWC float input and a single
/// sigmoid output per sample (higher means more likely synthetic).
pub struct TorchClassifier {
    model: Mutex<CModule>,
    device: Device,
}

impl TorchClassifier {
    pub fn load(model_path: &Path) -> Result<Self, InferenceError> {
        let device = Device::cuda_if_available();
        log::info!("Loading classifier on {:?}", device);
        let mut model = CModule::load_on_device(model_path, device)
            .map_err(|e| InferenceError::Load(e.to_string()))?;
        model.set_eval();
        Ok(Self {
            model: Mutex::new(model),
            device,
        })
    }

    fn to_tensor(&self, tensor: &NormalizedTensor) -> Result<Tensor, InferenceError> {
        let shape: Vec<i64> = tensor.shape().iter().map(|&d| d as i64).collect();
        let data: Vec<f32> = tensor.as_array().iter().copied().collect();
        Tensor::f_from_slice(&data)
            .and_then(|t| t.f_reshape(shape.as_slice()))
            .map(|t| t.to_device(self.device))
            .map_err(|e| InferenceError::Model(e.to_string()))
    }
}

impl Classifier for TorchClassifier {
    fn infer(&self, tensor: &NormalizedTensor) -> Result<RawScore, InferenceError> {
        let input = self.to_tensor(tensor)?;
        let model = self
            .model
            .lock()
            .map_err(|_| InferenceError::Model("model lock poisoned".into()))?;
        let output = tch::no_grad(|| model.forward_ts(&[input]))
            .map_err(|e| InferenceError::Model(e.to_string()))?;

        let flat = output
            .f_to_kind(Kind::Double)
            .and_then(|t| t.f_view([-1]))
            .map_err(|e| InferenceError::Model(e.to_string()))?;
        if flat.size().first().copied().unwrap_or(0) < 1 {
            return Err(InferenceError::Shape(output.size()));
        }
        let score = flat
            .f_double_value(&[0])
            .map_err(|e| InferenceError::Model(e.to_string()))?;
        Ok(RawScore::new(score))
    }
}
