use crate::{
    angles::AngleSet,
    config::Config,
    exercise::{ExerciseType, Phase},
    guidance::{self, Cue, WeakAreas},
    pose::Frame,
    score,
    session::{SessionAggregator, SessionStats},
};
use serde::Serialize;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::info;

#[derive(Debug, Copy, Clone, Default)]
pub struct Timing {
    pub analysis: Duration,
}

/// The analysis of a single frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameResult {
    pub angles: AngleSet,
    pub correctness: u8,
    pub phase: Phase,
    pub rep_count: u32,
    pub guidance: Vec<Cue>,
    pub weak_areas: WeakAreas,
}

/// One athlete performing one exercise.
///
/// Frames must be fed in arrival order. Sessions share nothing mutable, so
/// independent sessions can be driven from different threads.
pub struct Session {
    exercise: ExerciseType,
    config: Arc<Config>,
    aggregator: SessionAggregator,
    timing: Timing,
}

impl Session {
    pub fn start(exercise: ExerciseType, config: Arc<Config>) -> Self {
        Self::start_at(exercise, config, Instant::now())
    }

    pub fn start_at(exercise: ExerciseType, config: Arc<Config>, started: Instant) -> Self {
        info!(%exercise, "session started");
        let recent_window = config.thresholds.recent_window;
        Self {
            exercise,
            config,
            aggregator: SessionAggregator::new(exercise, started, recent_window),
            timing: Default::default(),
        }
    }

    pub fn exercise(&self) -> ExerciseType {
        self.exercise
    }

    pub fn aggregator(&self) -> &SessionAggregator {
        &self.aggregator
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    pub fn analyze(&mut self, frame: &Frame) -> FrameResult {
        let start_analysis = Instant::now();
        let config = Arc::clone(&self.config);
        let thresholds = &config.thresholds;

        let angles = AngleSet::extract(frame, thresholds.min_confidence);
        let rep_state = self
            .aggregator
            .rep_state()
            .advance(self.exercise, &config.rep, &angles);
        let targets = config.targets.lookup(self.exercise, rep_state.phase);

        let correctness = score::correctness(&angles, targets, thresholds.penalty_per_degree);
        let guidance = guidance::generate(self.exercise, &angles, targets, thresholds);
        let mut weak_areas = WeakAreas::default();
        weak_areas.track(&angles, targets, thresholds.weak_area_deviation);

        self.aggregator.record(correctness, rep_state, &weak_areas);
        self.timing.analysis += start_analysis.elapsed();

        FrameResult {
            angles,
            correctness,
            phase: rep_state.phase,
            rep_count: rep_state.rep_count,
            guidance,
            weak_areas: *self.aggregator.weak_areas(),
        }
    }

    pub fn finish(self) -> SessionStats {
        self.finish_at(Instant::now())
    }

    pub fn finish_at(self, ended: Instant) -> SessionStats {
        let stats = self
            .aggregator
            .compile(ended, self.config.calories_per_minute.get(self.exercise));
        info!(
            exercise = %stats.exercise,
            reps = stats.total_reps,
            accuracy = stats.accuracy,
            duration = stats.duration,
            "session ended"
        );
        stats
    }
}
