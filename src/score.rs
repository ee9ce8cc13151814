use crate::{
    angles::{AngleSet, Joint},
    config::JointTargets,
};
use num_traits::ToPrimitive;

pub const MAX_SCORE: u8 = 100;

/// Absolute deviation of `joint` from its target, when both are known.
pub fn deviation(angles: &AngleSet, targets: &JointTargets, joint: Joint) -> Option<i32> {
    let current = angles.get(joint)?;
    let target = targets.get(joint.kind())?;
    Some((i32::from(current) - i32::from(target)).abs())
}

/// Linear penalty per degree off target, floored at zero.
pub fn joint_score(deviation: i32, penalty_per_degree: f64) -> f64 {
    (f64::from(MAX_SCORE) - penalty_per_degree * f64::from(deviation)).max(0.0)
}

/// Mean joint score over every joint with both an angle and a target.
///
/// Frames with nothing to evaluate (occlusion, or no target table for the
/// exercise) score a full 100.
pub fn correctness(
    angles: &AngleSet,
    targets: Option<&JointTargets>,
    penalty_per_degree: f64,
) -> u8 {
    let targets = match targets {
        Some(targets) => targets,
        None => return MAX_SCORE,
    };
    let (sum, count) = angles
        .iter()
        .filter_map(|(joint, _)| deviation(angles, targets, joint))
        .fold((0.0, 0_u32), |(sum, count), deviation| {
            (sum + joint_score(deviation, penalty_per_degree), count + 1)
        });
    if count == 0 {
        return MAX_SCORE;
    }
    (sum / f64::from(count))
        .round()
        .min(f64::from(MAX_SCORE))
        .to_u8()
        .unwrap_or(MAX_SCORE)
}

#[cfg(test)]
mod tests {
    use super::{correctness, joint_score};
    use crate::{
        angles::{AngleSet, Joint},
        config::JointTargets,
    };
    use assert_approx_eq::assert_approx_eq;

    fn start_targets() -> JointTargets {
        JointTargets {
            elbow: Some(170),
            shoulder: Some(45),
            ..Default::default()
        }
    }

    #[test]
    fn on_target_is_perfect() {
        let angles: AngleSet = vec![
            (Joint::LeftElbow, 170),
            (Joint::RightElbow, 170),
            (Joint::LeftShoulder, 45),
        ]
        .into_iter()
        .collect();
        assert_eq!(correctness(&angles, Some(&start_targets()), 2.0), 100);
    }

    #[test]
    fn thirty_degrees_off_scores_forty() {
        assert_approx_eq!(joint_score(30, 2.0), 40.0);
        let angles: AngleSet = vec![(Joint::LeftElbow, 140)].into_iter().collect();
        assert_eq!(correctness(&angles, Some(&start_targets()), 2.0), 40);
    }

    #[test]
    fn joint_score_is_floored() {
        assert_approx_eq!(joint_score(90, 2.0), 0.0);
        let angles: AngleSet = vec![(Joint::LeftElbow, 10)].into_iter().collect();
        assert_eq!(correctness(&angles, Some(&start_targets()), 2.0), 0);
    }

    #[test]
    fn mean_is_rounded() {
        // 100, 100 and 100 - 2 * 1 = 98 average to 99.33
        let angles: AngleSet = vec![
            (Joint::LeftElbow, 170),
            (Joint::RightElbow, 170),
            (Joint::LeftShoulder, 46),
        ]
        .into_iter()
        .collect();
        assert_eq!(correctness(&angles, Some(&start_targets()), 2.0), 99);
    }

    #[test]
    fn joints_without_targets_are_ignored() {
        let angles: AngleSet = vec![(Joint::LeftElbow, 170), (Joint::LeftKnee, 20)]
            .into_iter()
            .collect();
        assert_eq!(correctness(&angles, Some(&start_targets()), 2.0), 100);
    }

    #[test]
    fn nothing_to_evaluate_is_perfect() {
        assert_eq!(
            correctness(&AngleSet::default(), Some(&start_targets()), 2.0),
            100
        );
        let angles: AngleSet = vec![(Joint::LeftElbow, 10)].into_iter().collect();
        assert_eq!(correctness(&angles, None, 2.0), 100);
    }

    #[test]
    fn score_is_bounded() {
        let targets = start_targets();
        for degrees in (0..=180).step_by(7) {
            let angles: AngleSet = vec![
                (Joint::LeftElbow, degrees),
                (Joint::RightShoulder, degrees),
            ]
            .into_iter()
            .collect();
            assert!(correctness(&angles, Some(&targets), 2.0) <= 100);
        }
    }
}
