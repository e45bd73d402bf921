// 🎓 Grade Classifier - Marks to Letter Grades
// Fixed scale, first matching threshold wins

use std::fmt;

// ============================================================================
// LETTER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Letter {
    /// Outstanding
    O,
    APlus,
    A,
    BPlus,
    B,
    C,
    /// Pass
    P,
    /// Fail
    F,
}

impl Letter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Letter::O => "O",
            Letter::APlus => "A+",
            Letter::A => "A",
            Letter::BPlus => "B+",
            Letter::B => "B",
            Letter::C => "C",
            Letter::P => "P",
            Letter::F => "F",
        }
    }

    /// Grade points awarded for this letter
    pub fn points(&self) -> u8 {
        match self {
            Letter::O => 10,
            Letter::APlus => 9,
            Letter::A => 8,
            Letter::BPlus => 7,
            Letter::B => 6,
            Letter::C => 5,
            Letter::P => 4,
            Letter::F => 0,
        }
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// GRADE
// ============================================================================

/// Grade derived from a mark. Never stored, always recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grade {
    pub letter: Letter,
    pub points: u8,
}

impl From<Letter> for Grade {
    fn from(letter: Letter) -> Self {
        Grade {
            letter,
            points: letter.points(),
        }
    }
}

// ============================================================================
// GRADING SCALE
// ============================================================================

/// One band of the grading scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleBand {
    pub letter: Letter,
    /// Inclusive lower bound on marks
    pub min_marks: f64,
    /// Human readable range, e.g. "80-89"
    pub range_label: &'static str,
}

/// Ordered highest first. `classify` walks it top-down.
pub static GRADING_SCALE: [ScaleBand; 8] = [
    ScaleBand { letter: Letter::O, min_marks: 90.0, range_label: "90-100" },
    ScaleBand { letter: Letter::APlus, min_marks: 80.0, range_label: "80-89" },
    ScaleBand { letter: Letter::A, min_marks: 70.0, range_label: "70-79" },
    ScaleBand { letter: Letter::BPlus, min_marks: 60.0, range_label: "60-69" },
    ScaleBand { letter: Letter::B, min_marks: 50.0, range_label: "50-59" },
    ScaleBand { letter: Letter::C, min_marks: 40.0, range_label: "40-49" },
    ScaleBand { letter: Letter::P, min_marks: 35.0, range_label: "35-39" },
    ScaleBand { letter: Letter::F, min_marks: f64::NEG_INFINITY, range_label: "Below 35" },
];

/// Map a mark in [0, 100] to its grade.
///
/// Callers only pass validated marks (see `subject::parse_marks`), so
/// there is no error path. The last band has no lower bound and always matches.
pub fn classify(marks: f64) -> Grade {
    GRADING_SCALE
        .iter()
        .find(|band| marks >= band.min_marks)
        .map(|band| Grade::from(band.letter))
        .unwrap_or(Grade::from(Letter::F))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries() {
        assert_eq!(classify(100.0), Grade { letter: Letter::O, points: 10 });
        assert_eq!(classify(90.0), Grade { letter: Letter::O, points: 10 });
        assert_eq!(classify(89.0), Grade { letter: Letter::APlus, points: 9 });
        assert_eq!(classify(80.0).letter, Letter::APlus);
        assert_eq!(classify(79.0).letter, Letter::A);
        assert_eq!(classify(70.0).letter, Letter::A);
        assert_eq!(classify(69.0).letter, Letter::BPlus);
        assert_eq!(classify(60.0).letter, Letter::BPlus);
        assert_eq!(classify(59.0).letter, Letter::B);
        assert_eq!(classify(50.0).letter, Letter::B);
        assert_eq!(classify(49.0).letter, Letter::C);
        assert_eq!(classify(40.0), Grade { letter: Letter::C, points: 5 });
        assert_eq!(classify(39.0), Grade { letter: Letter::P, points: 4 });
        assert_eq!(classify(35.0), Grade { letter: Letter::P, points: 4 });
        assert_eq!(classify(34.0), Grade { letter: Letter::F, points: 0 });
        assert_eq!(classify(0.0), Grade { letter: Letter::F, points: 0 });
    }

    #[test]
    fn test_fractional_marks_stay_below_next_band() {
        assert_eq!(classify(89.99).letter, Letter::APlus);
        assert_eq!(classify(34.5).letter, Letter::F);
        assert_eq!(classify(35.0001).letter, Letter::P);
    }

    #[test]
    fn test_points_monotonic_over_range() {
        let mut previous = 0;
        for tenths in 0..=1000 {
            let marks = tenths as f64 / 10.0;
            let grade = classify(marks);
            assert!(
                grade.points >= previous,
                "points dropped at {}: {} < {}",
                marks,
                grade.points,
                previous
            );
            assert!(GRADING_SCALE.iter().any(|b| b.letter == grade.letter));
            previous = grade.points;
        }
    }

    #[test]
    fn test_scale_is_ordered_highest_first() {
        for pair in GRADING_SCALE.windows(2) {
            assert!(pair[0].min_marks > pair[1].min_marks);
            assert!(pair[0].letter.points() > pair[1].letter.points());
        }
    }

    #[test]
    fn test_letter_labels() {
        let labels: Vec<&str> = GRADING_SCALE.iter().map(|b| b.letter.as_str()).collect();
        assert_eq!(labels, vec!["O", "A+", "A", "B+", "B", "C", "P", "F"]);
        assert_eq!(Letter::BPlus.to_string(), "B+");
    }
}
