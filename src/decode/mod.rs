use crate::{
    error::Error,
    pose::{Frame, KeypointKind, Landmark, NUM_KEYPOINTS},
};
use ndarray::ArrayView2;
use std::{fmt, str::FromStr};

pub trait Decoder {
    /// Return the number of columns each landmark row must carry.
    fn expected_columns(&self) -> usize;

    /// Decode one landmark per row, in the 33-point ordering.
    fn decode(&self, rows: ArrayView2<f32>) -> Result<Frame, Error>;

    /// Validate that the rows have the expected number of columns.
    fn validate_column_count(&self, columns: usize) -> Result<(), Error> {
        let expected_columns = self.expected_columns();
        if columns != expected_columns {
            Err(Error::GetExpectedNumColumns(expected_columns, columns))
        } else {
            Ok(())
        }
    }
}

mod xy_score;
mod xyz_visibility;

/// Build a frame from the rows of a landmark tensor, naming each row after
/// its position in the keypoint ordering.
fn landmarks_from_rows<F>(rows: ArrayView2<f32>, mut landmark: F) -> Result<Frame, Error>
where
    F: FnMut(&'static str, ndarray::ArrayView1<f32>) -> Landmark,
{
    let nrows = rows.nrows();
    if nrows > NUM_KEYPOINTS {
        return Err(Error::TooManyLandmarks(nrows, NUM_KEYPOINTS));
    }
    rows.outer_iter()
        .enumerate()
        .map(|(index, row)| Ok(landmark(KeypointKind::from_idx(index)?.name(), row)))
        .collect::<Result<Vec<_>, Error>>()
        .map(Frame::from)
}

/// Column layout of numeric landmark rows.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Layout {
    /// `x, y, score`, as emitted by 2D keypoint models.
    XyScore(xy_score::Decoder),
    /// `x, y, z, visibility`, as emitted by BlazePose. Depth is ignored.
    XyzVisibility(xyz_visibility::Decoder),
}

impl Default for Layout {
    fn default() -> Self {
        Self::XyzVisibility(xyz_visibility::Decoder)
    }
}

impl Decoder for Layout {
    fn expected_columns(&self) -> usize {
        match self {
            Self::XyScore(d) => d.expected_columns(),
            Self::XyzVisibility(d) => d.expected_columns(),
        }
    }

    fn decode(&self, rows: ArrayView2<f32>) -> Result<Frame, Error> {
        match self {
            Self::XyScore(d) => d.decode(rows),
            Self::XyzVisibility(d) => d.decode(rows),
        }
    }
}

impl FromStr for Layout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xy-score" => Ok(Self::XyScore(xy_score::Decoder)),
            "xyz-visibility" => Ok(Self::XyzVisibility(xyz_visibility::Decoder)),
            _ => Err(Error::ParseLayout(s.to_owned())),
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::XyScore(_) => "xy-score",
            Self::XyzVisibility(_) => "xyz-visibility",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Decoder, Layout};
    use crate::{error::Error, pose::KeypointKind};
    use ndarray::{array, Array2};

    #[test]
    fn parse_layout() {
        let layout = "xy-score".parse::<Layout>().unwrap();
        assert_eq!(layout.expected_columns(), 3);
        assert_eq!(layout.to_string(), "xy-score");
        let layout = "XYZ-Visibility".parse::<Layout>().unwrap();
        assert_eq!(layout.expected_columns(), 4);
        assert!(matches!(
            "xyz".parse::<Layout>(),
            Err(Error::ParseLayout(s)) if s == "xyz"
        ));
    }

    #[test]
    fn rows_are_named_by_position() {
        let rows = array![[0.5, 0.1, 0.9], [0.4, 0.2, 0.8], [0.3, 0.3, 0.7]];
        let layout = "xy-score".parse::<Layout>().unwrap();
        let frame = layout.decode(rows.view()).unwrap();
        assert_eq!(frame.landmarks.len(), 3);
        assert_eq!(frame.landmarks[1].name, KeypointKind::LeftEyeInner.name());
        let eye = frame.find(KeypointKind::LeftEyeInner).unwrap();
        assert_eq!((eye.x, eye.y, eye.confidence), (0.4, 0.2, 0.8));
    }

    #[test]
    fn depth_column_is_ignored() {
        let rows = array![[0.5, 0.1, -3.0, 0.9]];
        let frame = Layout::default().decode(rows.view()).unwrap();
        let nose = frame.find(KeypointKind::Nose).unwrap();
        assert_eq!((nose.x, nose.y, nose.confidence), (0.5, 0.1, 0.9));
    }

    #[test]
    fn wrong_column_count() {
        let rows = array![[0.5, 0.1, 0.9]];
        assert!(matches!(
            Layout::default().decode(rows.view()),
            Err(Error::GetExpectedNumColumns(4, 3))
        ));
    }

    #[test]
    fn too_many_rows() {
        let rows = Array2::<f32>::zeros((34, 3));
        let layout = "xy-score".parse::<Layout>().unwrap();
        assert!(matches!(
            layout.decode(rows.view()),
            Err(Error::TooManyLandmarks(34, 33))
        ));
    }

    #[test]
    fn empty_rows_decode_to_empty_frame() {
        let rows = Array2::<f32>::zeros((0, 4));
        assert!(Layout::default()
            .decode(rows.view())
            .unwrap()
            .landmarks
            .is_empty());
    }
}
