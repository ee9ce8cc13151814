use crate::{error::Error, geometry::Point};
use num_traits::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

/// The 33-point body landmark ordering produced by BlazePose-style detectors.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, num_derive::FromPrimitive, num_derive::ToPrimitive,
)]
pub enum KeypointKind {
    Nose,
    LeftEyeInner,
    LeftEye,
    LeftEyeOuter,
    RightEyeInner,
    RightEye,
    RightEyeOuter,
    LeftEar,
    RightEar,
    MouthLeft,
    MouthRight,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftPinky,
    RightPinky,
    LeftIndex,
    RightIndex,
    LeftThumb,
    RightThumb,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

pub const NUM_KEYPOINTS: usize = 33;

impl KeypointKind {
    pub fn idx(self) -> Result<usize, Error> {
        self.to_usize().ok_or(Error::KeypointVariantToUSize(self))
    }

    pub fn from_idx(index: usize) -> Result<Self, Error> {
        Self::from_usize(index).ok_or(Error::ConvertUSizeToKeypointKind(index))
    }

    /// Canonical snake_case name, e.g. `left_shoulder`.
    pub fn name(self) -> &'static str {
        use KeypointKind::*;
        match self {
            Nose => "nose",
            LeftEyeInner => "left_eye_inner",
            LeftEye => "left_eye",
            LeftEyeOuter => "left_eye_outer",
            RightEyeInner => "right_eye_inner",
            RightEye => "right_eye",
            RightEyeOuter => "right_eye_outer",
            LeftEar => "left_ear",
            RightEar => "right_ear",
            MouthLeft => "mouth_left",
            MouthRight => "mouth_right",
            LeftShoulder => "left_shoulder",
            RightShoulder => "right_shoulder",
            LeftElbow => "left_elbow",
            RightElbow => "right_elbow",
            LeftWrist => "left_wrist",
            RightWrist => "right_wrist",
            LeftPinky => "left_pinky",
            RightPinky => "right_pinky",
            LeftIndex => "left_index",
            RightIndex => "right_index",
            LeftThumb => "left_thumb",
            RightThumb => "right_thumb",
            LeftHip => "left_hip",
            RightHip => "right_hip",
            LeftKnee => "left_knee",
            RightKnee => "right_knee",
            LeftAnkle => "left_ankle",
            RightAnkle => "right_ankle",
            LeftHeel => "left_heel",
            RightHeel => "right_heel",
            LeftFootIndex => "left_foot_index",
            RightFootIndex => "right_foot_index",
        }
    }

    fn matches(self, name: &str) -> bool {
        let mut wanted = self.name().chars().filter(|&c| c != '_');
        let mut given = name
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .map(|c| c.to_ascii_lowercase());
        loop {
            match (wanted.next(), given.next()) {
                (None, None) => return true,
                (Some(a), Some(b)) if a == b => continue,
                _ => return false,
            }
        }
    }
}

/// One detected body keypoint in normalized image coordinates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    #[serde(default)]
    pub name: String,
    pub x: f32,
    pub y: f32,
    #[serde(alias = "visibility", alias = "score")]
    pub confidence: f32,
}

impl Landmark {
    pub fn new<S>(name: S, x: f32, y: f32, confidence: f32) -> Self
    where
        S: Into<String>,
    {
        Self {
            name: name.into(),
            x,
            y,
            confidence,
        }
    }
}

/// The landmark sequence of a single video sample, possibly shorter than
/// [`NUM_KEYPOINTS`] when the detector dropped occluded points.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Frame {
    pub landmarks: Vec<Landmark>,
}

impl From<Vec<Landmark>> for Frame {
    fn from(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }
}

impl Frame {
    /// Look up a keypoint by name, falling back to its position in the
    /// 33-point ordering when the landmark there carries no name.
    pub fn find(&self, kind: KeypointKind) -> Option<&Landmark> {
        self.landmarks
            .iter()
            .find(|landmark| !landmark.name.is_empty() && kind.matches(&landmark.name))
            .or_else(|| {
                kind.idx()
                    .ok()
                    .and_then(|index| self.landmarks.get(index))
                    .filter(|landmark| landmark.name.is_empty())
            })
    }

    /// Resolve a keypoint to a usable point. Low confidence and non-finite
    /// coordinates both count as absent.
    pub fn point(&self, kind: KeypointKind, min_confidence: f32) -> Option<Point> {
        let landmark = self.find(kind)?;
        if landmark.confidence.is_nan() || landmark.confidence <= min_confidence {
            return None;
        }
        match Point::new(landmark.x, landmark.y) {
            Ok(point) => Some(point),
            Err(error) => {
                tracing::trace!(keypoint = kind.name(), %error, "dropping landmark");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Frame, KeypointKind, Landmark, NUM_KEYPOINTS};

    #[test]
    fn keypoint_count_matches_ordering() {
        assert_eq!(KeypointKind::RightFootIndex.idx().unwrap(), NUM_KEYPOINTS - 1);
        assert_eq!(
            KeypointKind::from_idx(11).unwrap(),
            KeypointKind::LeftShoulder
        );
        assert!(KeypointKind::from_idx(NUM_KEYPOINTS).is_err());
    }

    #[test]
    fn name_lookup_ignores_case_and_separators() {
        let frame = Frame::from(vec![
            Landmark::new("leftShoulder", 0.1, 0.2, 0.9),
            Landmark::new("RIGHT-ELBOW", 0.3, 0.4, 0.9),
        ]);
        assert_eq!(frame.find(KeypointKind::LeftShoulder).unwrap().x, 0.1);
        assert_eq!(frame.find(KeypointKind::RightElbow).unwrap().y, 0.4);
        assert!(frame.find(KeypointKind::LeftElbow).is_none());
    }

    #[test]
    fn index_lookup_only_uses_unnamed_landmarks() {
        let mut landmarks = vec![Landmark::default(); NUM_KEYPOINTS];
        landmarks[11] = Landmark::new("", 0.5, 0.5, 0.9);
        landmarks[13] = Landmark::new("nose", 0.7, 0.7, 0.9);
        let frame = Frame::from(landmarks);
        assert_eq!(frame.find(KeypointKind::LeftShoulder).unwrap().x, 0.5);
        assert!(frame.find(KeypointKind::LeftElbow).is_none());
    }

    #[test]
    fn low_confidence_is_absent() {
        let frame = Frame::from(vec![
            Landmark::new("left_knee", 0.1, 0.1, 0.3),
            Landmark::new("right_knee", 0.1, 0.1, 0.31),
        ]);
        assert!(frame.point(KeypointKind::LeftKnee, 0.3).is_none());
        assert!(frame.point(KeypointKind::RightKnee, 0.3).is_some());
    }

    #[test]
    fn nan_coordinates_are_absent() {
        let frame = Frame::from(vec![Landmark::new("left_hip", f32::NAN, 0.1, 0.9)]);
        assert!(frame.point(KeypointKind::LeftHip, 0.3).is_none());
    }

    #[test]
    fn confidence_aliases_deserialize() {
        let landmark: Landmark =
            serde_json::from_str(r#"{"name": "nose", "x": 0.1, "y": 0.2, "visibility": 0.8}"#)
                .unwrap();
        assert_eq!(landmark.confidence, 0.8);
        let landmark: Landmark = serde_json::from_str(r#"{"x": 0.1, "y": 0.2, "score": 0.4}"#)
            .unwrap();
        assert!(landmark.name.is_empty());
        assert_eq!(landmark.confidence, 0.4);
    }
}
