// 📊 Aggregator - Credit-weighted SGPA
// Only subjects with marks count; their credits form the denominator.

use crate::grade::classify;
use crate::subject::Subject;

/// Result of one aggregation pass.
///
/// `sgpa` and `percentage` are rounded to two decimals for reporting.
/// Accumulation happens on unrounded values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Summary {
    pub sgpa: f64,
    pub percentage: f64,
    /// Credits of counted subjects only
    pub total_credits: f64,
}

impl Summary {
    pub fn sgpa_display(&self) -> String {
        format!("{:.2}", self.sgpa)
    }

    pub fn percentage_display(&self) -> String {
        format!("{:.2}%", self.percentage)
    }

    /// SGPA as a fraction of the 10 point maximum, for gauges
    pub fn progress(&self) -> f64 {
        (self.sgpa / 10.0).clamp(0.0, 1.0)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn aggregate(subjects: &[Subject]) -> Summary {
    let mut total_credits = 0.0;
    let mut total_credit_points = 0.0;

    for subject in subjects {
        if let Some(marks) = subject.marks {
            let grade = classify(marks);
            total_credits += subject.credits;
            total_credit_points += subject.credits * grade.points as f64;
        }
    }

    let sgpa = if total_credits > 0.0 {
        total_credit_points / total_credits
    } else {
        0.0
    };

    Summary {
        sgpa: round2(sgpa),
        percentage: round2(sgpa * 10.0),
        total_credits,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(credits: f64, marks: Option<f64>) -> Subject {
        Subject {
            credits,
            marks,
            ..Subject::new()
        }
    }

    #[test]
    fn test_empty_list() {
        let summary = aggregate(&[]);
        assert_eq!(summary, Summary { sgpa: 0.0, percentage: 0.0, total_credits: 0.0 });
        assert_eq!(summary.sgpa_display(), "0.00");
        assert_eq!(summary.percentage_display(), "0.00%");
    }

    #[test]
    fn test_all_unset() {
        let subjects = vec![subject(4.0, None), subject(3.0, None)];
        assert_eq!(aggregate(&subjects), Summary::default());
    }

    #[test]
    fn test_single_outstanding_subject() {
        let summary = aggregate(&[subject(4.0, Some(90.0))]);
        assert_eq!(summary.sgpa, 10.0);
        assert_eq!(summary.percentage, 100.0);
        assert_eq!(summary.total_credits, 4.0);
        assert_eq!(summary.sgpa_display(), "10.00");
        assert_eq!(summary.progress(), 1.0);
    }

    #[test]
    fn test_weighted_average() {
        // 4*10 + 3*8 = 64 over 7 credits
        let summary = aggregate(&[subject(4.0, Some(90.0)), subject(3.0, Some(70.0))]);
        assert_eq!(summary.total_credits, 7.0);
        assert_eq!(summary.sgpa_display(), "9.14");
        assert_eq!(summary.percentage_display(), "91.43%");
        assert!((summary.sgpa - 9.14).abs() < 1e-9);
        assert!((summary.percentage - 91.43).abs() < 1e-9);
    }

    #[test]
    fn test_unset_subject_credits_ignored() {
        let with_unset = aggregate(&[
            subject(4.0, Some(90.0)),
            subject(3.0, Some(70.0)),
            subject(20.0, None),
        ]);
        let without = aggregate(&[subject(4.0, Some(90.0)), subject(3.0, Some(70.0))]);
        assert_eq!(with_unset, without);
    }

    #[test]
    fn test_zero_credit_subject_has_no_effect() {
        let summary = aggregate(&[subject(4.0, Some(65.0)), subject(0.0, Some(10.0))]);
        assert_eq!(summary.sgpa, 7.0);
        assert_eq!(summary.total_credits, 4.0);

        let only_zero = aggregate(&[subject(0.0, Some(95.0))]);
        assert_eq!(only_zero, Summary::default());
    }

    #[test]
    fn test_order_independent() {
        let a = subject(2.0, Some(45.0));
        let b = subject(3.5, Some(81.0));
        let c = subject(1.0, Some(20.0));
        let forward = aggregate(&[a.clone(), b.clone(), c.clone()]);
        let backward = aggregate(&[c, b, a]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_percentage_tracks_sgpa() {
        let cases = vec![
            vec![subject(4.0, Some(90.0)), subject(3.0, Some(70.0))],
            vec![subject(3.0, Some(36.0)), subject(4.0, Some(55.0)), subject(1.0, Some(12.0))],
            vec![subject(1.5, Some(88.0)), subject(2.5, Some(61.0))],
        ];

        for subjects in cases {
            let summary = aggregate(&subjects);
            assert!(
                (summary.percentage - summary.sgpa * 10.0).abs() <= 0.05 + 1e-9,
                "sgpa {} percentage {}",
                summary.sgpa,
                summary.percentage
            );
        }
    }

    #[test]
    fn test_failing_subject_pulls_average_down() {
        let summary = aggregate(&[subject(4.0, Some(95.0)), subject(4.0, Some(20.0))]);
        assert_eq!(summary.sgpa, 5.0);
        assert_eq!(summary.percentage, 50.0);
        assert_eq!(summary.total_credits, 8.0);
    }
}
