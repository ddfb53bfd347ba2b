use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Verdict label shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum Label {
    #[serde(rename = "Deepfake Detected")]
    #[strum(serialize = "Deepfake Detected")]
    DeepfakeDetected,
    #[serde(rename = "Authentic Media")]
    #[strum(serialize = "Authentic Media")]
    AuthenticMedia,
    #[serde(rename = "Error")]
    #[strum(serialize = "Error")]
    Error,
}

/// Result of one analysis call.
///
/// `organic_probability` is absent on the `Error` result, which carries no
/// meaningful split between the two classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictRecord {
    pub label: Label,
    pub ai_probability: u8,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub organic_probability: Option<u8>,
    pub is_fake: bool,
}

/// `filename` is the sanitised upload name; `stored_filename` is the name the
/// file was saved under in the upload directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectResponse {
    pub status: String,
    pub filename: String,
    pub stored_filename: String,
    pub result: VerdictRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BackendMode {
    Classifier,
    Simulation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendStatus {
    pub mode: BackendMode,
    pub model_path: String,
}
