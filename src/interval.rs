//! Interval resolution: spell the pitch a named interval above or below a
//! base pitch.
//!
//! The letter is fixed by the interval's diatonic size and the alteration
//! is whatever is needed to reach the exact semitone distance. Some
//! base/interval combinations need more than a double sharp or flat; those
//! are rejected rather than respelled.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ParseNameError;
use crate::pitch::{diatonic_advance, to_absolute, Direction, Pitch};

/// The twelve interval qualities used by the worksheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntervalName {
    #[serde(rename = "m2")]
    MinorSecond,
    #[serde(rename = "M2")]
    MajorSecond,
    #[serde(rename = "m3")]
    MinorThird,
    #[serde(rename = "M3")]
    MajorThird,
    #[serde(rename = "P4")]
    PerfectFourth,
    #[serde(rename = "TT")]
    Tritone,
    #[serde(rename = "P5")]
    PerfectFifth,
    #[serde(rename = "m6")]
    MinorSixth,
    #[serde(rename = "M6")]
    MajorSixth,
    #[serde(rename = "m7")]
    MinorSeventh,
    #[serde(rename = "M7")]
    MajorSeventh,
    #[serde(rename = "P8")]
    Octave,
}

/// Letter distance and semitone distance of an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalSpec {
    pub diatonic_steps: i32,
    pub semitones: i32,
}

impl IntervalName {
    /// All intervals in table order.
    pub const ALL: [IntervalName; 12] = [
        IntervalName::MinorSecond,
        IntervalName::MajorSecond,
        IntervalName::MinorThird,
        IntervalName::MajorThird,
        IntervalName::PerfectFourth,
        IntervalName::Tritone,
        IntervalName::PerfectFifth,
        IntervalName::MinorSixth,
        IntervalName::MajorSixth,
        IntervalName::MinorSeventh,
        IntervalName::MajorSeventh,
        IntervalName::Octave,
    ];

    pub fn spec(self) -> IntervalSpec {
        let (diatonic_steps, semitones) = match self {
            IntervalName::MinorSecond => (1, 1),
            IntervalName::MajorSecond => (1, 2),
            IntervalName::MinorThird => (2, 3),
            IntervalName::MajorThird => (2, 4),
            IntervalName::PerfectFourth => (3, 5),
            // Spelled as a diminished fifth.
            IntervalName::Tritone => (4, 6),
            IntervalName::PerfectFifth => (4, 7),
            IntervalName::MinorSixth => (5, 8),
            IntervalName::MajorSixth => (5, 9),
            IntervalName::MinorSeventh => (6, 10),
            IntervalName::MajorSeventh => (6, 11),
            IntervalName::Octave => (7, 12),
        };
        IntervalSpec {
            diatonic_steps,
            semitones,
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            IntervalName::MinorSecond => "m2",
            IntervalName::MajorSecond => "M2",
            IntervalName::MinorThird => "m3",
            IntervalName::MajorThird => "M3",
            IntervalName::PerfectFourth => "P4",
            IntervalName::Tritone => "TT",
            IntervalName::PerfectFifth => "P5",
            IntervalName::MinorSixth => "m6",
            IntervalName::MajorSixth => "M6",
            IntervalName::MinorSeventh => "m7",
            IntervalName::MajorSeventh => "M7",
            IntervalName::Octave => "P8",
        }
    }
}

impl fmt::Display for IntervalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Case-sensitive: `m3` and `M3` are different intervals.
impl FromStr for IntervalName {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        IntervalName::ALL
            .into_iter()
            .find(|i| i.short_name() == name)
            .ok_or_else(|| ParseNameError::new("interval", name))
    }
}

/// The interval needs an alteration beyond a double sharp or flat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{interval} {direction} from {base} needs alteration {alteration}")]
pub struct UnspellableInterval {
    pub base: Pitch,
    pub interval: IntervalName,
    pub direction: Direction,
    pub alteration: i32,
}

/// Spell the pitch `interval` away from `base` in `direction`.
pub fn resolve(
    base: &Pitch,
    interval: IntervalName,
    direction: Direction,
) -> Result<Pitch, UnspellableInterval> {
    let spec = interval.spec();
    let semitones = match direction {
        Direction::Up => spec.semitones,
        Direction::Down => -spec.semitones,
    };
    let target_absolute = base.to_absolute() + semitones;

    let (step, octave) = diatonic_advance(base.step(), base.octave(), spec.diatonic_steps, direction);
    let alteration = target_absolute - to_absolute(step, 0, octave);

    Pitch::new(step, alteration, octave).map_err(|_| UnspellableInterval {
        base: *base,
        interval,
        direction,
        alteration,
    })
}
