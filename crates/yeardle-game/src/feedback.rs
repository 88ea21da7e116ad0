//! The feedback evaluator: direction and proximity tier for one guess.
//!
//! A pure function of (guessed year, correct year). Tier thresholds are
//! inclusive and checked in ascending order, so the first match wins:
//!
//! | Distance | Tier |
//! |----------|------|
//! | 0 | correct |
//! | <= 1 | so close |
//! | <= 5 | very close |
//! | <= 10 | close |
//! | <= 25 | getting warmer |
//! | > 25 | off by `d` years |

use serde::{Deserialize, Serialize};

use yeardle_types::Direction;

/// Proximity classification of a guess's distance from the correct year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Exact match.
    Correct,
    /// Within 1 year.
    SoClose,
    /// Within 5 years.
    VeryClose,
    /// Within 10 years.
    Close,
    /// Within 25 years.
    GettingWarmer,
    /// More than 25 years off; carries the distance.
    OffBy(u32),
}

impl Tier {
    /// Classify an absolute year distance.
    pub const fn for_distance(distance: u32) -> Self {
        match distance {
            0 => Self::Correct,
            1 => Self::SoClose,
            2..=5 => Self::VeryClose,
            6..=10 => Self::Close,
            11..=25 => Self::GettingWarmer,
            _ => Self::OffBy(distance),
        }
    }

    /// Human-readable tier label.
    pub fn label(self) -> String {
        match self {
            Self::Correct => "correct".to_owned(),
            Self::SoClose => "so close".to_owned(),
            Self::VeryClose => "very close".to_owned(),
            Self::Close => "close".to_owned(),
            Self::GettingWarmer => "getting warmer".to_owned(),
            Self::OffBy(d) => format!("off by {d} years"),
        }
    }
}

/// The evaluator's verdict on a single guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    /// Whether the guess matched the event's year exactly.
    pub is_correct: bool,
    /// Which way the correct year lies relative to the guess.
    pub direction: Direction,
    /// Absolute distance in years between guess and answer.
    pub years_off: u32,
    /// Proximity tier of the guess.
    pub tier: Tier,
}

impl Feedback {
    /// Display message for this feedback, including the years-off count.
    pub fn message(&self) -> String {
        if self.is_correct {
            return "Correct!".to_owned();
        }
        let unit = if self.years_off == 1 { "year" } else { "years" };
        match self.tier {
            Tier::SoClose => format!("So close! {} {unit} off", self.years_off),
            Tier::VeryClose => format!("Very close! {} {unit} off", self.years_off),
            Tier::Close => format!("Close! {} {unit} off", self.years_off),
            Tier::GettingWarmer => format!("Getting warmer! {} {unit} off", self.years_off),
            Tier::Correct | Tier::OffBy(_) => format!("{} {unit} off", self.years_off),
        }
    }
}

/// Evaluate a guess against the correct year.
///
/// Deterministic and side-effect free.
pub const fn evaluate(guessed_year: i32, correct_year: i32) -> Feedback {
    let direction = if guessed_year == correct_year {
        Direction::Correct
    } else if guessed_year < correct_year {
        Direction::Higher
    } else {
        Direction::Lower
    };
    let years_off = correct_year.abs_diff(guessed_year);
    Feedback {
        is_correct: guessed_year == correct_year,
        direction,
        years_off,
        tier: Tier::for_distance(years_off),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_is_correct() {
        let fb = evaluate(1969, 1969);
        assert!(fb.is_correct);
        assert_eq!(fb.direction, Direction::Correct);
        assert_eq!(fb.years_off, 0);
        assert_eq!(fb.tier, Tier::Correct);
        assert_eq!(fb.message(), "Correct!");
    }

    #[test]
    fn low_guess_points_higher() {
        let fb = evaluate(1960, 1969);
        assert!(!fb.is_correct);
        assert_eq!(fb.direction, Direction::Higher);
        assert_eq!(fb.years_off, 9);
    }

    #[test]
    fn high_guess_points_lower() {
        let fb = evaluate(1980, 1969);
        assert_eq!(fb.direction, Direction::Lower);
        assert_eq!(fb.years_off, 11);
    }

    #[test]
    fn tier_thresholds_are_inclusive_and_exclusive() {
        assert_eq!(Tier::for_distance(0), Tier::Correct);
        assert_eq!(Tier::for_distance(1), Tier::SoClose);
        assert_eq!(Tier::for_distance(2), Tier::VeryClose);
        assert_eq!(Tier::for_distance(5), Tier::VeryClose);
        assert_eq!(Tier::for_distance(6), Tier::Close);
        assert_eq!(Tier::for_distance(10), Tier::Close);
        assert_eq!(Tier::for_distance(11), Tier::GettingWarmer);
        assert_eq!(Tier::for_distance(25), Tier::GettingWarmer);
        assert_eq!(Tier::for_distance(26), Tier::OffBy(26));
    }

    #[test]
    fn generic_tier_label_includes_distance() {
        assert_eq!(Tier::OffBy(40).label(), "off by 40 years");
        assert_eq!(Tier::GettingWarmer.label(), "getting warmer");
    }

    #[test]
    fn message_pluralizes_years() {
        assert_eq!(evaluate(1968, 1969).message(), "So close! 1 year off");
        assert_eq!(evaluate(1965, 1969).message(), "Very close! 4 years off");
        assert_eq!(evaluate(1900, 1969).message(), "69 years off");
    }

    #[test]
    fn evaluation_handles_distant_years() {
        let fb = evaluate(1, 2026);
        assert_eq!(fb.direction, Direction::Higher);
        assert_eq!(fb.years_off, 2025);
        assert_eq!(fb.tier, Tier::OffBy(2025));
    }
}
