// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Exercise definitions and the repetition-counting state machine.
//!
//! Every supported exercise watches two symmetric joint pairs (right and left)
//! and shares the same two-phase shape: the counter moves from [`Phase::Rest`] to
//! [`Phase::Halfway`] when the *enter* rule holds, and back to rest, counting one
//! repetition, when the *complete* rule holds. Exercises differ only in which
//! joints they watch and which vertical relation each rule tests.

use std::fmt;
use std::str::FromStr;

use crate::keypoint::{
    LEFT_ELBOW, LEFT_HIP, LEFT_KNEE, LEFT_SHOULDER, PoseFrame, RIGHT_ELBOW, RIGHT_HIP, RIGHT_KNEE,
    RIGHT_SHOULDER,
};

/// Supported exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Exercise {
    /// No exercise selected; nothing is counted.
    #[default]
    None,
    /// Push-up, tracked by shoulders against elbows.
    PushUp,
    /// Pull-up, tracked by shoulders against elbows.
    PullUp,
    /// Squat, tracked by hips against knees.
    Squat,
}

impl Exercise {
    /// All exercises that count repetitions.
    pub const COUNTED: [Self; 3] = [Self::PushUp, Self::PullUp, Self::Squat];

    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::PushUp => "push-up",
            Self::PullUp => "pull-up",
            Self::Squat => "squat",
        }
    }

    /// Joint pairs and rules for this exercise, or `None` for [`Exercise::None`].
    #[must_use]
    pub const fn definition(&self) -> Option<ExerciseDefinition> {
        match self {
            Self::None => None,
            Self::PushUp => Some(ExerciseDefinition {
                pair_a: [RIGHT_SHOULDER, RIGHT_ELBOW],
                pair_b: [LEFT_SHOULDER, LEFT_ELBOW],
                enter: Rule::new(Relation::Below, Quantifier::Any),
                complete: Rule::new(Relation::Above, Quantifier::All),
            }),
            Self::PullUp => Some(ExerciseDefinition {
                pair_a: [RIGHT_SHOULDER, RIGHT_ELBOW],
                pair_b: [LEFT_SHOULDER, LEFT_ELBOW],
                enter: Rule::new(Relation::Below, Quantifier::All),
                complete: Rule::new(Relation::AtOrAbove, Quantifier::All),
            }),
            Self::Squat => Some(ExerciseDefinition {
                pair_a: [RIGHT_HIP, RIGHT_KNEE],
                pair_b: [LEFT_HIP, LEFT_KNEE],
                enter: Rule::new(Relation::AtOrBelow, Quantifier::Any),
                complete: Rule::new(Relation::Above, Quantifier::All),
            }),
        }
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Exercise {
    type Err = ExerciseParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "none" | "off" => Ok(Self::None),
            "push-up" | "pushup" | "push-ups" | "pushups" => Ok(Self::PushUp),
            "pull-up" | "pullup" | "pull-ups" | "pullups" => Ok(Self::PullUp),
            "squat" | "squats" => Ok(Self::Squat),
            _ => Err(ExerciseParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid exercise string.
#[derive(Debug, Clone)]
pub struct ExerciseParseError(String);

impl fmt::Display for ExerciseParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid exercise '{}', expected one of: none, push-up, pull-up, squat",
            self.0
        )
    }
}

impl std::error::Error for ExerciseParseError {}

/// Vertical relation of a pair's upper joint to its lower joint.
///
/// Image y grows downward, so "below" means a larger y.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Upper joint strictly below the lower joint.
    Below,
    /// Upper joint below or level with the lower joint.
    AtOrBelow,
    /// Upper joint strictly above the lower joint.
    Above,
    /// Upper joint above or level with the lower joint.
    AtOrAbove,
}

impl Relation {
    /// Whether the relation holds for the given y coordinates.
    #[must_use]
    pub fn holds(self, upper_y: f32, lower_y: f32) -> bool {
        match self {
            Self::Below => upper_y > lower_y,
            Self::AtOrBelow => upper_y >= lower_y,
            Self::Above => upper_y < lower_y,
            Self::AtOrAbove => upper_y <= lower_y,
        }
    }
}

/// How a relation combines across the two monitored pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    /// Either pair (logical OR).
    Any,
    /// Both pairs (logical AND).
    All,
}

/// A phase transition condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    /// Relation tested on each pair.
    pub relation: Relation,
    /// Combination across pairs.
    pub quantifier: Quantifier,
}

impl Rule {
    /// Create a new rule.
    #[must_use]
    pub const fn new(relation: Relation, quantifier: Quantifier) -> Self {
        Self {
            relation,
            quantifier,
        }
    }

    /// Evaluate the rule on `(upper_y, lower_y)` of both pairs.
    #[must_use]
    pub fn holds(&self, pairs: [(f32, f32); 2]) -> bool {
        let mut results = pairs
            .iter()
            .map(|&(upper, lower)| self.relation.holds(upper, lower));
        match self.quantifier {
            Quantifier::Any => results.any(|r| r),
            Quantifier::All => results.all(|r| r),
        }
    }
}

/// Which joints an exercise watches and how it moves between phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExerciseDefinition {
    /// Right-side `[upper, lower]` keypoint indices.
    pub pair_a: [usize; 2],
    /// Left-side `[upper, lower]` keypoint indices.
    pub pair_b: [usize; 2],
    /// Condition to enter the halfway phase.
    pub enter: Rule,
    /// Condition to complete a repetition.
    pub complete: Rule,
}

impl ExerciseDefinition {
    /// Read `(upper_y, lower_y)` for both pairs, or `None` if any joint is missing.
    #[must_use]
    pub fn pair_heights(&self, frame: &PoseFrame) -> Option<[(f32, f32); 2]> {
        let heights = |[upper, lower]: [usize; 2]| -> Option<(f32, f32)> {
            Some((frame.point(upper)?.y, frame.point(lower)?.y))
        };
        Some([heights(self.pair_a)?, heights(self.pair_b)?])
    }
}

/// Phase of a repetition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the compression half of a rep.
    Rest,
    /// Compressed; waiting for the return motion.
    Halfway,
}

/// Emitted when a repetition completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepEvent {
    /// Exercise the rep belongs to.
    pub exercise: Exercise,
    /// Count after this rep.
    pub rep_count: u32,
}

/// Repetition counter for the active exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExerciseState {
    /// Exercise being counted.
    pub exercise: Exercise,
    /// Completed repetitions.
    pub rep_count: u32,
    /// Whether the current rep has passed its compression half.
    pub halfway_reached: bool,
}

impl ExerciseState {
    /// Start counting `exercise` from zero.
    #[must_use]
    pub const fn new(exercise: Exercise) -> Self {
        Self {
            exercise,
            rep_count: 0,
            halfway_reached: false,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        if self.halfway_reached {
            Phase::Halfway
        } else {
            Phase::Rest
        }
    }

    /// Back to rest with a zero count, keeping the exercise.
    pub const fn reset(&mut self) {
        self.rep_count = 0;
        self.halfway_reached = false;
    }

    /// Feed one frame; returns an event when a repetition completes.
    ///
    /// A missing frame or any missing monitored joint leaves the state untouched.
    pub fn update(&mut self, frame: Option<&PoseFrame>) -> Option<RepEvent> {
        let definition = self.exercise.definition()?;
        let heights = definition.pair_heights(frame?)?;

        match self.phase() {
            Phase::Rest if definition.enter.holds(heights) => {
                self.halfway_reached = true;
                None
            }
            Phase::Halfway if definition.complete.holds(heights) => {
                self.halfway_reached = false;
                self.rep_count += 1;
                Some(RepEvent {
                    exercise: self.exercise,
                    rep_count: self.rep_count,
                })
            }
            _ => None,
        }
    }
}
