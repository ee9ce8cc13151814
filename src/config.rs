//! Tunable scoring data: target angles, deviation thresholds, rep transition
//! angles and calorie rates. Everything the analysis compares against lives
//! here so it can be versioned as a TOML file.

use crate::{
    angles::JointKind,
    error::Error,
    exercise::{ExerciseType, Phase},
    guidance::MAX_GUIDANCE,
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Ideal angle per joint kind for one exercise phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JointTargets {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elbow: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knee: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shoulder: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hip: Option<u16>,
}

impl JointTargets {
    pub fn get(&self, kind: JointKind) -> Option<u16> {
        match kind {
            JointKind::Elbow => self.elbow,
            JointKind::Knee => self.knee,
            JointKind::Shoulder => self.shoulder,
            JointKind::Hip => self.hip,
        }
    }

    /// Fill joints missing here from `fallback`.
    fn or(self, fallback: Self) -> Self {
        Self {
            elbow: self.elbow.or(fallback.elbow),
            knee: self.knee.or(fallback.knee),
            shoulder: self.shoulder.or(fallback.shoulder),
            hip: self.hip.or(fallback.hip),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseTargets {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<JointTargets>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mid: Option<JointTargets>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<JointTargets>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<JointTargets>,
}

impl PhaseTargets {
    pub fn get(&self, phase: Phase) -> Option<&JointTargets> {
        match phase {
            Phase::Start => self.start.as_ref(),
            Phase::Mid => self.mid.as_ref(),
            Phase::Bottom => self.bottom.as_ref(),
            Phase::End => self.end.as_ref(),
        }
    }

    /// The table for `phase`, or the `mid` table when that phase has none.
    pub fn lookup(&self, phase: Phase) -> Option<&JointTargets> {
        self.get(phase).or_else(|| self.mid.as_ref())
    }

    /// Overlay these phase tables onto `fallback`, joint by joint.
    fn or(self, fallback: Self) -> Self {
        fn merge(
            given: Option<JointTargets>,
            fallback: Option<JointTargets>,
        ) -> Option<JointTargets> {
            match (given, fallback) {
                (Some(given), Some(fallback)) => Some(given.or(fallback)),
                (given, fallback) => given.or(fallback),
            }
        }
        Self {
            start: merge(self.start, fallback.start),
            mid: merge(self.mid, fallback.mid),
            bottom: merge(self.bottom, fallback.bottom),
            end: merge(self.end, fallback.end),
        }
    }
}

/// Per-exercise target tables. A config file only needs to name the joints it
/// changes; everything else keeps its built-in value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TargetOverrides")]
pub struct TargetAngleTable {
    pub pushup: PhaseTargets,
    pub squat: PhaseTargets,
    pub lunge: PhaseTargets,
    pub plank: PhaseTargets,
}

impl TargetAngleTable {
    pub fn exercise(&self, exercise: ExerciseType) -> &PhaseTargets {
        match exercise {
            ExerciseType::Pushup => &self.pushup,
            ExerciseType::Squat => &self.squat,
            ExerciseType::Lunge => &self.lunge,
            ExerciseType::Plank => &self.plank,
        }
    }

    pub fn lookup(&self, exercise: ExerciseType, phase: Phase) -> Option<&JointTargets> {
        self.exercise(exercise).lookup(phase)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TargetOverrides {
    pushup: PhaseTargets,
    squat: PhaseTargets,
    lunge: PhaseTargets,
    plank: PhaseTargets,
}

impl From<TargetOverrides> for TargetAngleTable {
    fn from(overrides: TargetOverrides) -> Self {
        let defaults = Self::default();
        Self {
            pushup: overrides.pushup.or(defaults.pushup),
            squat: overrides.squat.or(defaults.squat),
            lunge: overrides.lunge.or(defaults.lunge),
            plank: overrides.plank.or(defaults.plank),
        }
    }
}

fn targets(
    elbow: Option<u16>,
    knee: Option<u16>,
    shoulder: Option<u16>,
    hip: Option<u16>,
) -> Option<JointTargets> {
    Some(JointTargets {
        elbow,
        knee,
        shoulder,
        hip,
    })
}

impl Default for TargetAngleTable {
    fn default() -> Self {
        Self {
            pushup: PhaseTargets {
                start: targets(Some(170), None, Some(45), None),
                mid: targets(Some(120), None, Some(45), None),
                bottom: targets(Some(90), None, Some(30), None),
                end: targets(Some(170), None, Some(45), None),
            },
            squat: PhaseTargets {
                start: targets(None, Some(170), None, Some(170)),
                mid: targets(None, Some(130), None, Some(130)),
                bottom: targets(None, Some(90), None, Some(90)),
                end: targets(None, Some(170), None, Some(170)),
            },
            lunge: PhaseTargets {
                mid: targets(None, Some(90), None, Some(170)),
                ..Default::default()
            },
            plank: PhaseTargets {
                mid: targets(Some(90), None, Some(90), Some(175)),
                ..Default::default()
            },
        }
    }
}

/// Driving-angle thresholds of a rep state machine, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepThresholds {
    /// Below this the descent has begun.
    pub enter: u16,
    /// Below this the bottom of the rep is reached.
    pub bottom: u16,
    /// Above this a rep in progress is complete.
    pub complete: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepRules {
    pub pushup: RepThresholds,
    pub squat: RepThresholds,
}

impl Default for RepRules {
    fn default() -> Self {
        Self {
            pushup: RepThresholds {
                enter: 120,
                bottom: 90,
                complete: 160,
            },
            squat: RepThresholds {
                enter: 140,
                bottom: 100,
                complete: 160,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Landmarks at or below this confidence are treated as absent.
    pub min_confidence: f32,
    pub elbow_deviation: u16,
    pub knee_deviation: u16,
    pub shoulder_deviation: u16,
    pub hip_deviation: u16,
    pub weak_area_deviation: u16,
    pub penalty_per_degree: f64,
    /// Cues shown per frame; may lower the built-in cap of three but not raise it.
    pub max_guidance: usize,
    /// Pushup hip angles below this mean a sagging or piked back.
    pub pushup_min_hip: u16,
    /// Squat knee and hip angles both above this mean the squat is too shallow.
    pub squat_max_depth: u16,
    /// Number of recent frames in the rolling accuracy window.
    pub recent_window: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_confidence: 0.3,
            elbow_deviation: 15,
            knee_deviation: 15,
            shoulder_deviation: 20,
            hip_deviation: 20,
            weak_area_deviation: 20,
            penalty_per_degree: 2.0,
            max_guidance: 3,
            pushup_min_hip: 160,
            squat_max_depth: 100,
            recent_window: 30,
        }
    }
}

impl Thresholds {
    /// Deviation beyond which a joint earns a corrective cue.
    pub fn guidance_deviation(&self, kind: JointKind) -> u16 {
        match kind {
            JointKind::Elbow => self.elbow_deviation,
            JointKind::Knee => self.knee_deviation,
            JointKind::Shoulder => self.shoulder_deviation,
            JointKind::Hip => self.hip_deviation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaloriesPerMinute {
    pub pushup: f64,
    pub squat: f64,
    pub lunge: f64,
    pub plank: f64,
}

impl Default for CaloriesPerMinute {
    fn default() -> Self {
        Self {
            pushup: 7.0,
            squat: 6.0,
            lunge: 5.5,
            plank: 4.0,
        }
    }
}

impl CaloriesPerMinute {
    pub fn get(&self, exercise: ExerciseType) -> f64 {
        match exercise {
            ExerciseType::Pushup => self.pushup,
            ExerciseType::Squat => self.squat,
            ExerciseType::Lunge => self.lunge,
            ExerciseType::Plank => self.plank,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub thresholds: Thresholds,
    pub rep: RepRules,
    pub targets: TargetAngleTable,
    pub calories_per_minute: CaloriesPerMinute,
}

impl Config {
    pub fn load<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).map_err(|e| Error::ReadConfig(e, path.to_path_buf()))?;
        let config: Self =
            toml::from_str(&content).map_err(|e| Error::ParseConfig(e, path.to_path_buf()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, Error> {
        toml::to_string_pretty(self).map_err(Error::SerializeConfig)
    }

    pub fn save<P>(&self, path: P) -> Result<(), Error>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        fs::write(path, self.to_toml()?).map_err(|e| Error::WriteConfig(e, path.to_path_buf()))
    }

    pub fn validate(&self) -> Result<(), Error> {
        let min_confidence = self.thresholds.min_confidence;
        if !(0.0..=1.0).contains(&min_confidence) {
            return Err(Error::InvalidMinConfidence(min_confidence));
        }
        let max_guidance = self.thresholds.max_guidance;
        if max_guidance > MAX_GUIDANCE {
            return Err(Error::InvalidMaxGuidance(max_guidance, MAX_GUIDANCE));
        }
        for &(exercise, rule) in &[
            (ExerciseType::Pushup, self.rep.pushup),
            (ExerciseType::Squat, self.rep.squat),
        ] {
            let RepThresholds {
                enter,
                bottom,
                complete,
            } = rule;
            if !(bottom < enter && enter < complete) {
                return Err(Error::InvalidRepThresholds(exercise, bottom, enter, complete));
            }
        }
        Ok(())
    }
}
