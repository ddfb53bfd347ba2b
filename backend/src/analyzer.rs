use shared::{BackendMode, VerdictRecord};
use std::path::Path;

use crate::config::AppConfig;
use crate::error::ConfigError;
use crate::inference::{self, InferenceBackend, Simulator};
use crate::media::{FfmpegDecoder, MediaLoader};
use crate::preprocess::FrameNormalizer;
use crate::verdict::{error_verdict, interpret};

/// Media-to-verdict pipeline. Built once at startup and shared read-only
/// between requests.
pub struct Analyzer {
    loader: MediaLoader,
    normalizer: FrameNormalizer,
    backend: InferenceBackend,
}

impl Analyzer {
    pub fn new(loader: MediaLoader, normalizer: FrameNormalizer, backend: InferenceBackend) -> Self {
        Self {
            loader,
            normalizer,
            backend,
        }
    }

    /// Production wiring: ffmpeg for video, the compiled-in classifier if the
    /// model loads, the simulator otherwise. Fails only on an invalid
    /// simulation range.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let backend = inference::select_backend(
            &config.model.path,
            Simulator::from_config(&config.simulation)?,
            inference::load_classifier,
        );
        Ok(Self::new(
            MediaLoader::new(Box::new(FfmpegDecoder::from_config(&config.video))),
            FrameNormalizer::new(config.model.channel_order),
            backend,
        ))
    }

    pub fn mode(&self) -> BackendMode {
        self.backend.mode()
    }

    /// Never fails: unreadable media and inference errors both come back as
    /// the `Error` verdict.
    pub fn analyze(&self, path: &Path) -> VerdictRecord {
        let frame = match self.loader.load(path) {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("Could not load {}: {}", path.display(), e);
                return error_verdict();
            }
        };
        log::debug!(
            "Loaded {} ({}x{})",
            path.display(),
            frame.width(),
            frame.height()
        );

        let tensor = self.normalizer.normalize(frame);
        let score = match self.backend.infer(tensor) {
            Ok(score) => score,
            Err(e) => {
                log::error!("Inference failed for {}: {}", path.display(), e);
                return error_verdict();
            }
        };

        let verdict = interpret(score.to_confidence());
        log::info!(
            "Analyzed {} [{}]: {} ({}%, raw {:.4})",
            path.display(),
            self.mode(),
            verdict.label,
            verdict.ai_probability,
            score.value()
        );
        verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{InferenceError, MediaError};
    use crate::inference::{Classifier, RawScore};
    use crate::media::VideoDecoder;
    use crate::preprocess::NormalizedTensor;
    use image::{DynamicImage, Rgb, RgbImage};
    use shared::Label;
    use std::path::PathBuf;
    use std::time::Duration;

    struct NoVideo;

    impl VideoDecoder for NoVideo {
        fn frame_count(&self, _path: &Path) -> Result<u64, MediaError> {
            Ok(0)
        }

        fn decode_frame(&self, _path: &Path, _index: u64) -> Result<DynamicImage, MediaError> {
            Err(MediaError::NoFrames)
        }
    }

    struct FixedClassifier(f64);

    impl Classifier for FixedClassifier {
        fn infer(&self, tensor: &NormalizedTensor) -> Result<RawScore, InferenceError> {
            assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
            Ok(RawScore::new(self.0))
        }
    }

    struct FailingClassifier;

    impl Classifier for FailingClassifier {
        fn infer(&self, _tensor: &NormalizedTensor) -> Result<RawScore, InferenceError> {
            Err(InferenceError::Model("CUDA out of memory".into()))
        }
    }

    fn analyzer(backend: InferenceBackend) -> Analyzer {
        Analyzer::new(
            MediaLoader::new(Box::new(NoVideo)),
            FrameNormalizer::default(),
            backend,
        )
    }

    fn simulated(confidence: u8) -> InferenceBackend {
        InferenceBackend::Simulator(
            Simulator::new(Duration::ZERO, confidence..=confidence).unwrap(),
        )
    }

    fn solid_jpeg() -> PathBuf {
        let path =
            std::env::temp_dir().join(format!("dfscan-analyze-{}.jpg", uuid::Uuid::new_v4()));
        RgbImage::from_pixel(224, 224, Rgb([90, 140, 200]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_simulated_authentic_verdict() {
        let path = solid_jpeg();
        let analyzer = analyzer(simulated(30));
        let verdict = analyzer.analyze(&path);
        std::fs::remove_file(&path).ok();

        assert_eq!(
            verdict,
            VerdictRecord {
                label: Label::AuthenticMedia,
                ai_probability: 30,
                organic_probability: Some(70),
                is_fake: false,
            }
        );
        assert_eq!(analyzer.mode(), BackendMode::Simulation);
    }

    #[test]
    fn test_corrupt_jpeg_yields_error_verdict() {
        let path =
            std::env::temp_dir().join(format!("dfscan-corrupt-{}.jpg", uuid::Uuid::new_v4()));
        std::fs::write(&path, [0xFF, 0xD8, 0x00, 0x13, 0x37]).unwrap();
        let analyzer = analyzer(simulated(90));
        let verdict = analyzer.analyze(&path);
        std::fs::remove_file(&path).ok();

        assert_eq!(verdict.label, Label::Error);
        assert_eq!(verdict.ai_probability, 0);
        assert!(!verdict.is_fake);
    }

    #[test]
    fn test_classifier_score_is_rounded_to_percent() {
        let path = solid_jpeg();
        let analyzer = analyzer(InferenceBackend::Classifier(Box::new(FixedClassifier(0.87))));
        let verdict = analyzer.analyze(&path);
        std::fs::remove_file(&path).ok();

        assert_eq!(verdict.ai_probability, 87);
        assert_eq!(verdict.organic_probability, Some(13));
        assert!(verdict.is_fake);
        assert_eq!(verdict.label, Label::DeepfakeDetected);
    }

    #[test]
    fn test_half_percent_tie_stays_authentic() {
        let path = solid_jpeg();
        let analyzer = analyzer(InferenceBackend::Classifier(Box::new(FixedClassifier(0.505))));
        let verdict = analyzer.analyze(&path);
        std::fs::remove_file(&path).ok();

        assert_eq!(verdict.ai_probability, 50);
        assert_eq!(verdict.organic_probability, Some(50));
        assert!(!verdict.is_fake);
        assert_eq!(verdict.label, Label::AuthenticMedia);
    }

    #[test]
    fn test_inference_failure_yields_error_verdict() {
        let path = solid_jpeg();
        let analyzer = analyzer(InferenceBackend::Classifier(Box::new(FailingClassifier)));
        let verdict = analyzer.analyze(&path);
        std::fs::remove_file(&path).ok();

        assert_eq!(verdict.label, Label::Error);
        assert!(!verdict.is_fake);
    }

    #[test]
    fn test_empty_video_yields_error_verdict() {
        let analyzer = analyzer(simulated(99));
        let verdict = analyzer.analyze(Path::new("empty.MOV"));
        assert_eq!(verdict.label, Label::Error);
    }

    #[test]
    fn test_from_config_without_model_uses_simulation() {
        let mut config = AppConfig::default();
        config.model.path = PathBuf::from("/nonexistent/model.pt");
        assert_eq!(
            Analyzer::from_config(&config).unwrap().mode(),
            BackendMode::Simulation
        );
    }

    #[test]
    fn test_from_config_rejects_inverted_simulation_range() {
        let mut config = AppConfig::default();
        config.simulation.min_confidence = 80;
        config.simulation.max_confidence = 20;
        assert!(matches!(
            Analyzer::from_config(&config),
            Err(ConfigError::Invalid(_))
        ));
    }
}
