use crate::{
    error::Error,
    pose::{Frame, Landmark},
};
use ndarray::ArrayView2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decoder;

impl super::Decoder for Decoder {
    fn expected_columns(&self) -> usize {
        4
    }

    fn decode(&self, rows: ArrayView2<f32>) -> Result<Frame, Error> {
        super::Decoder::validate_column_count(self, rows.ncols())?;
        // z (column 2) is relative depth; angles are measured in the image plane
        super::landmarks_from_rows(rows, |name, row| Landmark::new(name, row[0], row[1], row[3]))
    }
}
