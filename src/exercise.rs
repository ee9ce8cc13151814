use serde::{Deserialize, Serialize};
use std::{convert::Infallible, fmt, str::FromStr};

/// The exercise declared for a session.
///
/// Parsing never fails: unrecognized names fall back to [`ExerciseType::Pushup`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseType {
    Pushup,
    Squat,
    Lunge,
    Plank,
}

impl Default for ExerciseType {
    fn default() -> Self {
        Self::Pushup
    }
}

impl ExerciseType {
    pub const ALL: [ExerciseType; 4] = [Self::Pushup, Self::Squat, Self::Lunge, Self::Plank];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pushup => "pushup",
            Self::Squat => "squat",
            Self::Lunge => "lunge",
            Self::Plank => "plank",
        }
    }

    fn recognize(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let key = key.strip_suffix('s').unwrap_or(key.as_str());
        match key {
            "pushup" | "pressup" => Some(Self::Pushup),
            "squat" => Some(Self::Squat),
            "lunge" => Some(Self::Lunge),
            "plank" => Some(Self::Plank),
            _ => None,
        }
    }

    /// Map a free-form exercise name onto a known exercise, defaulting to pushup.
    pub fn normalize(name: &str) -> Self {
        Self::recognize(name).unwrap_or_else(|| {
            tracing::warn!(exercise = name, "unrecognized exercise, using pushup rules");
            Self::default()
        })
    }
}

impl FromStr for ExerciseType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::normalize(s))
    }
}

impl fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where in the repetition cycle the body currently is.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Start,
    Mid,
    Bottom,
    End,
}

impl Default for Phase {
    fn default() -> Self {
        Self::Start
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start => "start",
            Self::Mid => "mid",
            Self::Bottom => "bottom",
            Self::End => "end",
        })
    }
}
