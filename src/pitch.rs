//! Pitch model: spelled pitches, absolute pitch numbers and diatonic
//! letter arithmetic.
//!
//! Absolute pitch numbers follow the MIDI convention (C4 = 60). Every
//! [`Pitch`] carries an alteration in `-2..=2`; there is no way to build
//! one outside that range.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest alteration a spelled pitch may carry (double flat).
pub const MIN_ALTERATION: i32 = -2;
/// Highest alteration a spelled pitch may carry (double sharp).
pub const MAX_ALTERATION: i32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PitchError {
    #[error("alteration {0} is outside -2..=2")]
    AlterationOutOfRange(i32),
    #[error("invalid step '{0}'")]
    InvalidStep(String),
    #[error("invalid pitch '{0}'")]
    InvalidPitch(String),
}

/// One of the seven diatonic letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Step {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Step {
    pub const ALL: [Step; 7] = [Step::C, Step::D, Step::E, Step::F, Step::G, Step::A, Step::B];

    /// Letter index within the octave (C = 0 … B = 6).
    pub fn index(self) -> i32 {
        self as i32
    }

    /// Letter for any signed index, wrapping modulo 7.
    pub fn from_index(index: i32) -> Step {
        Self::ALL[index.rem_euclid(7) as usize]
    }

    /// Semitone offset of the natural letter above C.
    pub fn semitone(self) -> i32 {
        match self {
            Step::C => 0,
            Step::D => 2,
            Step::E => 4,
            Step::F => 5,
            Step::G => 7,
            Step::A => 9,
            Step::B => 11,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Step::C => "C",
            Step::D => "D",
            Step::E => "E",
            Step::F => "F",
            Step::G => "G",
            Step::A => "A",
            Step::B => "B",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Step {
    type Err = PitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "C" => Ok(Step::C),
            "D" => Ok(Step::D),
            "E" => Ok(Step::E),
            "F" => Ok(Step::F),
            "G" => Ok(Step::G),
            "A" => Ok(Step::A),
            "B" => Ok(Step::B),
            _ => Err(PitchError::InvalidStep(s.to_string())),
        }
    }
}

/// Direction of an interval or of a diatonic walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Up, Direction::Down];

    fn sign(self) -> i32 {
        match self {
            Direction::Up => 1,
            Direction::Down => -1,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => f.write_str("up"),
            Direction::Down => f.write_str("down"),
        }
    }
}

/// A spelled pitch: letter, alteration in semitones, octave (middle C = C4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Pitch {
    step: Step,
    alteration: i32,
    octave: i32,
}

impl Pitch {
    /// Build a pitch, rejecting alterations outside `-2..=2`.
    pub fn new(step: Step, alteration: i32, octave: i32) -> Result<Self, PitchError> {
        if !(MIN_ALTERATION..=MAX_ALTERATION).contains(&alteration) {
            return Err(PitchError::AlterationOutOfRange(alteration));
        }
        Ok(Self {
            step,
            alteration,
            octave,
        })
    }

    pub fn natural(step: Step, octave: i32) -> Self {
        Self {
            step,
            alteration: 0,
            octave,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn alteration(&self) -> i32 {
        self.alteration
    }

    pub fn octave(&self) -> i32 {
        self.octave
    }

    pub fn to_absolute(&self) -> i32 {
        to_absolute(self.step, self.alteration, self.octave)
    }

    /// Canonical spelling of an absolute pitch number (sharps on black keys).
    pub fn from_absolute(value: i32) -> Self {
        from_absolute(value)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let accidental = match self.alteration {
            -2 => "bb",
            -1 => "b",
            1 => "#",
            2 => "##",
            _ => "",
        };
        write!(f, "{}{}{}", self.step, accidental, self.octave)
    }
}

/// Parses `E4`, `F#5`, `Bb3`, `C##-1`. The letter is case-insensitive.
impl FromStr for Pitch {
    type Err = PitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().trim_matches(|c| c == '"' || c == '\'');
        let invalid = || PitchError::InvalidPitch(s.to_string());

        let mut chars = text.chars();
        let letter = chars.next().ok_or_else(invalid)?;
        let step: Step = letter.to_string().parse().map_err(|_| invalid())?;

        let rest = chars.as_str();
        let octave_at = rest
            .find(|c: char| c.is_ascii_digit() || c == '-')
            .ok_or_else(invalid)?;
        let (accidentals, octave_text) = rest.split_at(octave_at);

        let mut alteration = 0;
        for c in accidentals.chars() {
            match c {
                '#' => alteration += 1,
                'b' => alteration -= 1,
                _ => return Err(invalid()),
            }
        }
        let octave = octave_text.parse::<i32>().map_err(|_| invalid())?;
        Pitch::new(step, alteration, octave)
    }
}

/// Absolute pitch number of a spelled pitch.
pub fn to_absolute(step: Step, alteration: i32, octave: i32) -> i32 {
    step.semitone() + 12 * (octave + 1) + alteration
}

/// Canonical spelling for each pitch class, sharps preferred.
const CANONICAL: [(Step, i32); 12] = [
    (Step::C, 0),
    (Step::C, 1),
    (Step::D, 0),
    (Step::D, 1),
    (Step::E, 0),
    (Step::F, 0),
    (Step::F, 1),
    (Step::G, 0),
    (Step::G, 1),
    (Step::A, 0),
    (Step::A, 1),
    (Step::B, 0),
];

/// Canonical spelling of an absolute pitch number. Only the absolute
/// value is guaranteed to survive a round trip, not the original spelling.
pub fn from_absolute(value: i32) -> Pitch {
    let (step, alteration) = CANONICAL[value.rem_euclid(12) as usize];
    Pitch {
        step,
        alteration,
        octave: value.div_euclid(12) - 1,
    }
}

/// Move `steps` letters (not semitones) from `step`/`octave`.
/// Crossing B→C or C→B changes the octave using floor division.
pub fn diatonic_advance(step: Step, octave: i32, steps: i32, direction: Direction) -> (Step, i32) {
    let index = step.index() + steps * direction.sign();
    (Step::from_index(index), octave + index.div_euclid(7))
}
