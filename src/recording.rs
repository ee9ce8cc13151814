//! Recorded landmark streams, one JSON frame per line.
//!
//! A line is either an array of landmark objects (`{"name", "x", "y",
//! "visibility"}`) or an array of numeric rows decoded with a [`Layout`].

use crate::{
    decode::{Decoder, Layout},
    error::Error,
    pose::{Frame, Landmark},
};
use ndarray::Array2;
use serde::Deserialize;
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordedFrame {
    Named(Vec<Landmark>),
    Rows(Vec<Vec<f32>>),
}

fn rows_to_array(rows: Vec<Vec<f32>>, line: usize) -> Result<Array2<f32>, Error> {
    let nrows = rows.len();
    let ncols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|row| row.len() != ncols) {
        return Err(Error::RaggedRows(line));
    }
    let flat = rows.into_iter().flatten().collect::<Vec<_>>();
    Array2::from_shape_vec((nrows, ncols), flat).map_err(|e| Error::ShapeRows(e, line))
}

/// Iterator over the frames of a recording. Blank lines are skipped; errors
/// carry the 1-based line number they occurred on.
pub struct Recording<R> {
    lines: std::iter::Enumerate<std::io::Lines<R>>,
    layout: Layout,
}

impl Recording<BufReader<File>> {
    pub fn open<P>(path: P, layout: Layout) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::OpenRecording(e, path.to_path_buf()))?;
        Ok(Self::new(BufReader::new(file), layout))
    }
}

impl<R: BufRead> Recording<R> {
    pub fn new(reader: R, layout: Layout) -> Self {
        Self {
            lines: reader.lines().enumerate(),
            layout,
        }
    }

    fn parse(&self, text: &str, line: usize) -> Result<Frame, Error> {
        match serde_json::from_str(text).map_err(|e| Error::ParseRecordedFrame(e, line))? {
            RecordedFrame::Named(landmarks) => Ok(Frame::from(landmarks)),
            RecordedFrame::Rows(rows) => self.layout.decode(rows_to_array(rows, line)?.view()),
        }
    }
}

impl<R: BufRead> Iterator for Recording<R> {
    type Item = Result<Frame, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (index, text) = self.lines.next()?;
            let line = index + 1;
            let text = match text {
                Ok(text) => text,
                Err(e) => return Some(Err(Error::ReadRecordingLine(e, line))),
            };
            if text.trim().is_empty() {
                continue;
            }
            return Some(self.parse(&text, line));
        }
    }
}
