use shared::{Label, VerdictRecord};

/// Confidences strictly above this are classified as synthetic.
pub const FAKE_THRESHOLD: u8 = 50;

/// Maps a 0-100 confidence to a verdict. Values above 100 are clamped.
pub fn interpret(confidence: u8) -> VerdictRecord {
    let ai_probability = confidence.min(100);
    let is_fake = ai_probability > FAKE_THRESHOLD;
    let label = if is_fake {
        Label::DeepfakeDetected
    } else {
        Label::AuthenticMedia
    };

    VerdictRecord {
        label,
        ai_probability,
        organic_probability: Some(100 - ai_probability),
        is_fake,
    }
}

/// Degraded result for media that could not be analysed.
pub fn error_verdict() -> VerdictRecord {
    VerdictRecord {
        label: Label::Error,
        ai_probability: 0,
        organic_probability: None,
        is_fake: false,
    }
}
