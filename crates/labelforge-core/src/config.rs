//! Producer configuration shared by the library and the CLI.

/// Data key under which a task references its page image.
pub const DEFAULT_IMAGE_KEY: &str = "ocr";
/// Task-level prediction score written by the producer.
pub const DEFAULT_PREDICTION_SCORE: f64 = 0.97;
/// Per-record transcription score written by the producer.
pub const DEFAULT_TRANSCRIPTION_SCORE: f32 = 0.5;

/// How the producer fills the constant parts of a task.
#[derive(Debug, Clone, PartialEq)]
pub struct ProducerConfig {
    pub image_key: String,
    pub prediction_score: f64,
    pub transcription_score: f32,
    /// Use a detection's own confidence, when it has one, instead of
    /// `transcription_score`.
    pub use_detector_score: bool,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            image_key: DEFAULT_IMAGE_KEY.to_string(),
            prediction_score: DEFAULT_PREDICTION_SCORE,
            transcription_score: DEFAULT_TRANSCRIPTION_SCORE,
            use_detector_score: false,
        }
    }
}

impl ProducerConfig {
    /// Score for a transcription record given the detector's confidence.
    pub fn record_score(&self, detector_score: Option<f32>) -> f32 {
        match detector_score {
            Some(s) if self.use_detector_score => s,
            _ => self.transcription_score,
        }
    }
}
