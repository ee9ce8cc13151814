use crate::{exercise::ExerciseType, guidance::WeakAreas, phase::RepState, score::MAX_SCORE};
use num_traits::ToPrimitive;
use serde::Serialize;
use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

/// Running totals for one exercise session.
///
/// Scores are folded into a sum and count plus a short ring buffer, so memory
/// stays constant however long the session runs.
#[derive(Debug, Clone)]
pub struct SessionAggregator {
    exercise: ExerciseType,
    started: Instant,
    score_sum: u64,
    frames: u64,
    recent: VecDeque<u8>,
    recent_window: usize,
    rep_state: RepState,
    weak_areas: WeakAreas,
}

/// Summary handed out when a session ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub exercise: ExerciseType,
    pub accuracy: u8,
    pub total_reps: u32,
    pub weak_areas: WeakAreas,
    /// Elapsed wall-clock seconds.
    pub duration: f64,
    pub calories: f64,
    pub frames: u64,
}

fn mean_score<C: ToPrimitive>(sum: u64, count: C) -> u8 {
    match (sum.to_f64(), count.to_f64()) {
        (Some(sum), Some(count)) if count > 0.0 => {
            (sum / count).round().to_u8().unwrap_or(MAX_SCORE)
        }
        _ => 0,
    }
}

impl SessionAggregator {
    pub fn new(exercise: ExerciseType, started: Instant, recent_window: usize) -> Self {
        Self {
            exercise,
            started,
            score_sum: 0,
            frames: 0,
            recent: VecDeque::with_capacity(recent_window),
            recent_window,
            rep_state: RepState::default(),
            weak_areas: WeakAreas::default(),
        }
    }

    /// Fold in one analysed frame.
    pub fn record(&mut self, correctness: u8, rep_state: RepState, weak_areas: &WeakAreas) {
        self.score_sum += u64::from(correctness);
        self.frames += 1;
        if self.recent_window > 0 {
            if self.recent.len() == self.recent_window {
                self.recent.pop_front();
            }
            self.recent.push_back(correctness);
        }
        self.rep_state = rep_state;
        self.weak_areas.merge(weak_areas);
    }

    /// Mean correctness over every frame so far; 0 before the first frame.
    pub fn overall_accuracy(&self) -> u8 {
        mean_score(self.score_sum, self.frames)
    }

    /// Mean correctness over the last few frames.
    pub fn recent_accuracy(&self) -> u8 {
        let sum = self.recent.iter().copied().map(u64::from).sum();
        mean_score(sum, self.recent.len())
    }

    pub fn rep_state(&self) -> RepState {
        self.rep_state
    }

    pub fn weak_areas(&self) -> &WeakAreas {
        &self.weak_areas
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started)
    }

    pub fn compile(&self, ended: Instant, calories_per_minute: f64) -> SessionStats {
        let duration = self.elapsed(ended).as_secs_f64();
        SessionStats {
            exercise: self.exercise,
            accuracy: self.overall_accuracy(),
            total_reps: self.rep_state.rep_count,
            weak_areas: self.weak_areas,
            duration,
            calories: calories_per_minute * duration / 60.0,
            frames: self.frames,
        }
    }
}
