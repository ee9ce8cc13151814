use crate::{exercise::ExerciseType, pose::KeypointKind};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read config file: {1:?}")]
    ReadConfig(#[source] std::io::Error, PathBuf),

    #[error("failed to parse config file: {1:?}")]
    ParseConfig(#[source] toml::de::Error, PathBuf),

    #[error("failed to serialize config")]
    SerializeConfig(#[source] toml::ser::Error),

    #[error("failed to write config file: {1:?}")]
    WriteConfig(#[source] std::io::Error, PathBuf),

    #[error("rep thresholds for {0} must satisfy bottom < enter < complete, got {1} / {2} / {3}")]
    InvalidRepThresholds(ExerciseType, u16, u16, u16),

    #[error("at most {1} guidance cues may be shown per frame, got {0}")]
    InvalidMaxGuidance(usize, usize),

    #[error("minimum landmark confidence must be within [0, 1], got {0}")]
    InvalidMinConfidence(f32),

    #[error("failed to construct NotNan from f32: {1}")]
    ConstructNotNan(#[source] ordered_float::FloatIsNan, f32),

    #[error("failed to convert usize value to keypoint kind: {0}")]
    ConvertUSizeToKeypointKind(usize),

    #[error("failed to convert keypoint variant to usize: {0:?}")]
    KeypointVariantToUSize(KeypointKind),

    #[error("expected {0} landmark columns, got {1}")]
    GetExpectedNumColumns(usize, usize),

    #[error("got {0} landmark rows, at most {1} are supported")]
    TooManyLandmarks(usize, usize),

    #[error("unknown landmark layout: {0}")]
    ParseLayout(String),

    #[error("failed to open recording: {1:?}")]
    OpenRecording(#[source] std::io::Error, PathBuf),

    #[error("failed to read line {1} of recording")]
    ReadRecordingLine(#[source] std::io::Error, usize),

    #[error("failed to parse frame on line {1} of recording")]
    ParseRecordedFrame(#[source] serde_json::Error, usize),

    #[error("rows on line {0} of recording have unequal lengths")]
    RaggedRows(usize),

    #[error("failed to shape rows on line {1} of recording")]
    ShapeRows(#[source] ndarray::ShapeError, usize),
}
