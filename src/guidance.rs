//! Corrective cues and the session's recurring weak joints.

use crate::{
    angles::{AngleSet, Joint, JointKind, NUM_JOINTS},
    config::{JointTargets, Thresholds},
    exercise::ExerciseType,
    score::deviation,
};
use bitvec::array::BitArray;
use num_traits::FromPrimitive;
use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::fmt;

/// Hard limit on cues per frame, whatever the configured `max_guidance`.
pub const MAX_GUIDANCE: usize = 3;

/// One corrective phrase.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Cue {
    /// The joint angle is above its target.
    Straighten(Joint),
    /// The joint angle is below its target.
    BendMore(Joint),
    KeepBackStraight,
    GoDeeper,
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Straighten(joint) => write!(f, "Straighten your {}", joint.display_name()),
            Self::BendMore(joint) => write!(f, "Bend your {} more", joint.display_name()),
            Self::KeepBackStraight => f.write_str("Keep your back straight"),
            Self::GoDeeper => f.write_str("Go deeper"),
        }
    }
}

impl Serialize for Cue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Cues for one frame: per-joint cues in joint order, then exercise-specific
/// ones, truncated to `max_guidance` entries and never more than
/// [`MAX_GUIDANCE`].
pub fn generate(
    exercise: ExerciseType,
    angles: &AngleSet,
    targets: Option<&JointTargets>,
    thresholds: &Thresholds,
) -> Vec<Cue> {
    let mut cues = Vec::new();

    if let Some(targets) = targets {
        for (joint, current) in angles.iter() {
            let target = match targets.get(joint.kind()) {
                Some(target) => target,
                None => continue,
            };
            let limit = i32::from(thresholds.guidance_deviation(joint.kind()));
            if deviation(angles, targets, joint).map_or(false, |d| d > limit) {
                cues.push(if current > target {
                    Cue::Straighten(joint)
                } else {
                    Cue::BendMore(joint)
                });
            }
        }
    }

    match exercise {
        ExerciseType::Pushup => {
            let min_hip = f64::from(thresholds.pushup_min_hip);
            if angles.mean(JointKind::Hip).map_or(false, |hip| hip < min_hip) {
                cues.push(Cue::KeepBackStraight);
            }
        }
        ExerciseType::Squat => {
            let depth = f64::from(thresholds.squat_max_depth);
            if let (Some(knee), Some(hip)) =
                (angles.mean(JointKind::Knee), angles.mean(JointKind::Hip))
            {
                if knee > depth && hip > depth {
                    cues.push(Cue::GoDeeper);
                }
            }
        }
        ExerciseType::Lunge | ExerciseType::Plank => {}
    }

    cues.truncate(thresholds.max_guidance.min(MAX_GUIDANCE));
    cues
}

/// Joints that strayed too far from target at any point in a session.
///
/// The set only ever grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeakAreas {
    joints: BitArray<[u16; 1]>,
}

impl WeakAreas {
    pub fn insert(&mut self, joint: Joint) {
        self.joints.set(joint.idx(), true);
    }

    pub fn contains(&self, joint: Joint) -> bool {
        self.joints[joint.idx()]
    }

    pub fn len(&self) -> usize {
        self.joints.count_ones()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.not_any()
    }

    pub fn iter(&self) -> impl Iterator<Item = Joint> + '_ {
        self.joints
            .iter_ones()
            .take_while(|&index| index < NUM_JOINTS)
            .filter_map(Joint::from_usize)
    }

    /// Record every joint deviating from its target by more than `threshold`.
    pub fn track(&mut self, angles: &AngleSet, targets: Option<&JointTargets>, threshold: u16) {
        let targets = match targets {
            Some(targets) => targets,
            None => return,
        };
        let threshold = i32::from(threshold);
        for (joint, _) in angles.iter() {
            if deviation(angles, targets, joint).map_or(false, |d| d > threshold) {
                self.insert(joint);
            }
        }
    }

    pub fn merge(&mut self, other: &Self) {
        for index in other.joints.iter_ones() {
            self.joints.set(index, true);
        }
    }
}

impl Serialize for WeakAreas {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for joint in self.iter() {
            seq.serialize_element(joint.key())?;
        }
        seq.end()
    }
}
