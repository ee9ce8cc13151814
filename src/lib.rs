//! Real-time exercise form analysis over streams of body landmarks.

pub mod angles;
pub mod config;
pub mod decode;
pub mod engine;
pub mod error;
pub mod exercise;
pub mod geometry;
pub mod guidance;
pub mod phase;
pub mod pose;
pub mod recording;
pub mod score;
pub mod session;

pub use engine::{FrameResult, Session};
pub use error::Error;
pub use exercise::{ExerciseType, Phase};
