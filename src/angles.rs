use crate::{
    geometry,
    pose::{Frame, KeypointKind},
};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::{fmt, iter::FromIterator};

/// A side-specific joint whose angle is tracked.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    num_derive::FromPrimitive,
    num_derive::ToPrimitive,
)]
pub enum Joint {
    LeftElbow,
    RightElbow,
    LeftKnee,
    RightKnee,
    LeftShoulder,
    RightShoulder,
    LeftHip,
    RightHip,
}

pub const NUM_JOINTS: usize = 8;

/// A joint irrespective of side; target angles are keyed by kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum JointKind {
    Elbow,
    Knee,
    Shoulder,
    Hip,
}

impl JointKind {
    pub fn joints(self) -> [Joint; 2] {
        match self {
            Self::Elbow => [Joint::LeftElbow, Joint::RightElbow],
            Self::Knee => [Joint::LeftKnee, Joint::RightKnee],
            Self::Shoulder => [Joint::LeftShoulder, Joint::RightShoulder],
            Self::Hip => [Joint::LeftHip, Joint::RightHip],
        }
    }
}

impl Joint {
    pub const ALL: [Joint; NUM_JOINTS] = [
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftHip,
        Self::RightHip,
    ];

    #[inline]
    pub(crate) fn idx(self) -> usize {
        self as usize
    }

    pub fn kind(self) -> JointKind {
        match self {
            Self::LeftElbow | Self::RightElbow => JointKind::Elbow,
            Self::LeftKnee | Self::RightKnee => JointKind::Knee,
            Self::LeftShoulder | Self::RightShoulder => JointKind::Shoulder,
            Self::LeftHip | Self::RightHip => JointKind::Hip,
        }
    }

    /// Identifier used in serialized output, e.g. `leftElbow`.
    pub fn key(self) -> &'static str {
        match self {
            Self::LeftElbow => "leftElbow",
            Self::RightElbow => "rightElbow",
            Self::LeftKnee => "leftKnee",
            Self::RightKnee => "rightKnee",
            Self::LeftShoulder => "leftShoulder",
            Self::RightShoulder => "rightShoulder",
            Self::LeftHip => "leftHip",
            Self::RightHip => "rightHip",
        }
    }

    /// Human-readable name used in guidance, e.g. `left elbow`.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::LeftElbow => "left elbow",
            Self::RightElbow => "right elbow",
            Self::LeftKnee => "left knee",
            Self::RightKnee => "right knee",
            Self::LeftShoulder => "left shoulder",
            Self::RightShoulder => "right shoulder",
            Self::LeftHip => "left hip",
            Self::RightHip => "right hip",
        }
    }

    /// The (outer, vertex, outer) keypoints the angle is measured from.
    pub fn triple(self) -> [KeypointKind; 3] {
        use KeypointKind::*;
        match self {
            Self::LeftElbow => [LeftShoulder, LeftElbow, LeftWrist],
            Self::RightElbow => [RightShoulder, RightElbow, RightWrist],
            Self::LeftKnee => [LeftHip, LeftKnee, LeftAnkle],
            Self::RightKnee => [RightHip, RightKnee, RightAnkle],
            Self::LeftShoulder => [LeftElbow, LeftShoulder, LeftHip],
            Self::RightShoulder => [RightElbow, RightShoulder, RightHip],
            Self::LeftHip => [LeftShoulder, LeftHip, LeftKnee],
            Self::RightHip => [RightShoulder, RightHip, RightKnee],
        }
    }
}

impl fmt::Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

pub const MAX_DEGREES: u16 = 180;

/// Joint angles for one frame, in whole degrees. A missing joint means the
/// angle is unknown, never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AngleSet {
    angles: [Option<u16>; NUM_JOINTS],
}

impl AngleSet {
    /// Measure every joint whose three keypoints are confidently present.
    pub fn extract(frame: &Frame, min_confidence: f32) -> Self {
        Joint::ALL
            .iter()
            .filter_map(|&joint| {
                let [a, b, c] = joint.triple();
                let a = frame.point(a, min_confidence)?;
                let b = frame.point(b, min_confidence)?;
                let c = frame.point(c, min_confidence)?;
                Some((joint, geometry::angle_at(Some(a), Some(b), Some(c))))
            })
            .collect()
    }

    pub fn get(&self, joint: Joint) -> Option<u16> {
        self.angles[joint.idx()]
    }

    pub fn insert(&mut self, joint: Joint, degrees: u16) {
        self.angles[joint.idx()] = Some(degrees.min(MAX_DEGREES));
    }

    pub fn iter(&self) -> impl Iterator<Item = (Joint, u16)> + '_ {
        Joint::ALL
            .iter()
            .filter_map(move |&joint| self.get(joint).map(|degrees| (joint, degrees)))
    }

    pub fn len(&self) -> usize {
        self.angles.iter().filter(|angle| angle.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mean of the left/right pair for `kind`, or the single side present.
    pub fn mean(&self, kind: JointKind) -> Option<f64> {
        let [left, right] = kind.joints();
        match (self.get(left), self.get(right)) {
            (Some(l), Some(r)) => Some((f64::from(l) + f64::from(r)) / 2.0),
            (Some(one), None) | (None, Some(one)) => Some(f64::from(one)),
            (None, None) => None,
        }
    }
}

impl FromIterator<(Joint, u16)> for AngleSet {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (Joint, u16)>,
    {
        let mut angles = Self::default();
        for (joint, degrees) in iter {
            angles.insert(joint, degrees);
        }
        angles
    }
}

impl Serialize for AngleSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (joint, degrees) in self.iter() {
            map.serialize_entry(joint.key(), &degrees)?;
        }
        map.end()
    }
}
