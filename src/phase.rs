//! Per-exercise repetition state machines.
//!
//! Each machine watches one driving angle. Entry into a rep happens below a
//! lower threshold and completion above a higher one, so jitter around a
//! single boundary cannot count a rep twice.

use crate::{
    angles::{AngleSet, JointKind},
    config::{RepRules, RepThresholds},
    exercise::{ExerciseType, Phase},
};
use serde::Serialize;
use tracing::{debug, trace};

/// The only state carried from one frame to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepState {
    pub rep_count: u32,
    pub phase: Phase,
    pub in_rep: bool,
}

impl RepState {
    /// Feed one frame's angles through the machine for `exercise`.
    pub fn advance(self, exercise: ExerciseType, rules: &RepRules, angles: &AngleSet) -> Self {
        let next = match exercise {
            ExerciseType::Pushup => self.step(&rules.pushup, angles.mean(JointKind::Elbow)),
            ExerciseType::Squat => self.step(&rules.squat, angles.mean(JointKind::Knee)),
            // no rep rule exists for these yet; state passes through untouched
            ExerciseType::Lunge | ExerciseType::Plank => self,
        };
        if next.phase != self.phase {
            trace!(%exercise, from = %self.phase, to = %next.phase, "phase transition");
        }
        if next.rep_count != self.rep_count {
            debug!(%exercise, reps = next.rep_count, "rep completed");
        }
        next
    }

    fn step(self, thresholds: &RepThresholds, driver: Option<f64>) -> Self {
        let driver = match driver {
            Some(driver) => driver,
            None => return self,
        };
        let enter = f64::from(thresholds.enter);
        let bottom = f64::from(thresholds.bottom);
        let complete = f64::from(thresholds.complete);

        let Self {
            rep_count,
            phase,
            in_rep,
        } = self;

        if !in_rep {
            if driver < enter {
                Self {
                    phase: Phase::Mid,
                    in_rep: true,
                    ..self
                }
            } else if phase == Phase::End {
                Self {
                    phase: Phase::Start,
                    ..self
                }
            } else {
                self
            }
        } else if driver < bottom {
            Self {
                phase: Phase::Bottom,
                ..self
            }
        } else if driver > complete {
            Self {
                rep_count: rep_count + 1,
                phase: Phase::End,
                in_rep: false,
            }
        } else if phase == Phase::Bottom && driver >= enter {
            Self {
                phase: Phase::Mid,
                ..self
            }
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RepState;
    use crate::{
        angles::{AngleSet, Joint},
        config::RepRules,
        exercise::{ExerciseType, Phase},
    };

    fn pair(left: Joint, right: Joint, degrees: u16) -> AngleSet {
        vec![(left, degrees), (right, degrees)].into_iter().collect()
    }

    fn run(exercise: ExerciseType, frames: &[AngleSet]) -> Vec<RepState> {
        let rules = RepRules::default();
        frames
            .iter()
            .scan(RepState::default(), |state, angles| {
                *state = state.advance(exercise, &rules, angles);
                Some(*state)
            })
            .collect()
    }

    #[test]
    fn pushup_cycle() {
        let frames = [170, 150, 110, 85, 95, 130, 165, 172]
            .iter()
            .map(|&d| pair(Joint::LeftElbow, Joint::RightElbow, d))
            .collect::<Vec<_>>();
        let states = run(ExerciseType::Pushup, &frames);
        let phases = states.iter().map(|s| s.phase).collect::<Vec<_>>();
        use Phase::*;
        assert_eq!(phases, [Start, Start, Mid, Bottom, Bottom, Mid, End, Start]);
        let reps = states.iter().map(|s| s.rep_count).collect::<Vec<_>>();
        assert_eq!(reps, [0, 0, 0, 0, 0, 0, 1, 1]);
        assert!(!states[7].in_rep);
    }

    #[test]
    fn squat_cycle() {
        let frames = [170, 150, 130, 95, 120, 150, 165, 170]
            .iter()
            .map(|&d| pair(Joint::LeftKnee, Joint::RightKnee, d))
            .collect::<Vec<_>>();
        let states = run(ExerciseType::Squat, &frames);
        assert_eq!(states[3].phase, Phase::Bottom);
        assert_eq!(states[6].phase, Phase::End);
        let last = states.last().unwrap();
        assert_eq!(last.rep_count, 1);
        assert_eq!(last.phase, Phase::Start);
    }

    #[test]
    fn shallow_dip_counts_on_completion() {
        // never reaches bottom but still completes the cycle
        let frames = [170, 110, 165]
            .iter()
            .map(|&d| pair(Joint::LeftElbow, Joint::RightElbow, d))
            .collect::<Vec<_>>();
        let states = run(ExerciseType::Pushup, &frames);
        assert_eq!(states[1].phase, Phase::Mid);
        assert_eq!(states[2].rep_count, 1);
    }

    #[test]
    fn jitter_at_completion_counts_once() {
        let frames = [110, 85, 161, 159, 161, 158, 162]
            .iter()
            .map(|&d| pair(Joint::LeftElbow, Joint::RightElbow, d))
            .collect::<Vec<_>>();
        let states = run(ExerciseType::Pushup, &frames);
        assert_eq!(states.last().unwrap().rep_count, 1);
    }

    #[test]
    fn rep_count_never_decreases() {
        let degrees = [
            170, 100, 60, 175, 119, 80, 121, 161, 10, 180, 0, 179, 90, 90, 165, 120,
        ];
        let frames = degrees
            .iter()
            .map(|&d| pair(Joint::LeftElbow, Joint::RightElbow, d))
            .collect::<Vec<_>>();
        let states = run(ExerciseType::Pushup, &frames);
        for window in states.windows(2) {
            assert!(window[0].rep_count <= window[1].rep_count);
        }
        assert_eq!(states.last().unwrap().rep_count, 5);
    }

    #[test]
    fn missing_driver_holds_state() {
        let states = run(
            ExerciseType::Pushup,
            &[
                pair(Joint::LeftElbow, Joint::RightElbow, 100),
                AngleSet::default(),
                pair(Joint::LeftKnee, Joint::RightKnee, 60),
            ],
        );
        assert_eq!(states[1], states[0]);
        assert_eq!(states[2], states[0]);
    }

    #[test]
    fn one_sided_driver_is_used() {
        let frames = [100, 170]
            .iter()
            .map(|&d| vec![(Joint::RightElbow, d)].into_iter().collect::<AngleSet>())
            .collect::<Vec<_>>();
        let states = run(ExerciseType::Pushup, &frames);
        assert_eq!(states[1].rep_count, 1);
    }

    #[test]
    fn exercises_without_rule_pass_through() {
        let frames = [170, 80, 170]
            .iter()
            .map(|&d| pair(Joint::LeftKnee, Joint::RightKnee, d))
            .collect::<Vec<_>>();
        for &exercise in &[ExerciseType::Lunge, ExerciseType::Plank] {
            for state in run(exercise, &frames) {
                assert_eq!(state, RepState::default());
            }
        }
    }
}
