//! Seeded candidate search over interval/direction combinations.
//!
//! The candidates are shuffled once with the injected generator and tried
//! from the back of the list until one spells with an allowed alteration
//! or the attempt budget runs out. When that fails and an exact match is
//! not required, a fixed-order scan takes the first spellable candidate.

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ParseNameError;
use crate::interval::{resolve, IntervalName};
use crate::pitch::{Direction, Pitch, MAX_ALTERATION, MIN_ALTERATION};

/// Accidental tag accepted on the command line and in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccidentalTag {
    Natural,
    Sharp,
    Flat,
}

impl AccidentalTag {
    pub fn alteration(self) -> i32 {
        match self {
            AccidentalTag::Natural => 0,
            AccidentalTag::Sharp => 1,
            AccidentalTag::Flat => -1,
        }
    }
}

impl fmt::Display for AccidentalTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccidentalTag::Natural => f.write_str("natural"),
            AccidentalTag::Sharp => f.write_str("sharp"),
            AccidentalTag::Flat => f.write_str("flat"),
        }
    }
}

impl FromStr for AccidentalTag {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "natural" => Ok(AccidentalTag::Natural),
            "sharp" => Ok(AccidentalTag::Sharp),
            "flat" => Ok(AccidentalTag::Flat),
            _ => Err(ParseNameError::new("accidental", s.trim())),
        }
    }
}

/// Alterations a target pitch may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlterationSet {
    // indexed by alteration - MIN_ALTERATION
    allowed: [bool; 5],
}

impl AlterationSet {
    pub fn from_alterations<I: IntoIterator<Item = i32>>(alterations: I) -> Self {
        let mut allowed = [false; 5];
        for a in alterations {
            if (MIN_ALTERATION..=MAX_ALTERATION).contains(&a) {
                allowed[(a - MIN_ALTERATION) as usize] = true;
            }
        }
        Self { allowed }
    }

    /// An empty tag list allows natural, sharp and flat.
    pub fn from_tags(tags: &[AccidentalTag]) -> Self {
        if tags.is_empty() {
            return Self::from_alterations([0, 1, -1]);
        }
        Self::from_alterations(tags.iter().map(|t| t.alteration()))
    }

    pub fn contains(&self, alteration: i32) -> bool {
        (MIN_ALTERATION..=MAX_ALTERATION).contains(&alteration)
            && self.allowed[(alteration - MIN_ALTERATION) as usize]
    }
}

impl Default for AlterationSet {
    fn default() -> Self {
        Self::from_tags(&[])
    }
}

#[derive(Debug, Clone)]
pub struct SearchConstraints {
    pub intervals: Vec<IntervalName>,
    pub directions: Vec<Direction>,
    /// Upper bound on candidates popped during the randomized phase.
    pub max_attempts: usize,
    pub allowed: AlterationSet,
    pub require_exact_match: bool,
}

impl Default for SearchConstraints {
    fn default() -> Self {
        Self {
            intervals: IntervalName::ALL.to_vec(),
            directions: Direction::ALL.to_vec(),
            max_attempts: 50,
            allowed: AlterationSet::default(),
            require_exact_match: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub interval: IntervalName,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted(Pitch),
    Unspellable,
    AlterationNotAllowed(Pitch),
    Fallback(Pitch),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceStep {
    pub candidate: Candidate,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A shuffled candidate spelled with an allowed alteration.
    Matched { candidate: Candidate, target: Pitch },
    /// The fixed-order scan found a spelling outside the allowed set.
    Fallback { candidate: Candidate, target: Pitch },
    NoValidCandidate,
}

impl SearchOutcome {
    pub fn target(&self) -> Option<Pitch> {
        match self {
            SearchOutcome::Matched { target, .. } | SearchOutcome::Fallback { target, .. } => {
                Some(*target)
            }
            SearchOutcome::NoValidCandidate => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub outcome: SearchOutcome,
    pub trace: Vec<TraceStep>,
}

/// Choose a target spelling for `base`.
///
/// Consumes exactly one shuffle from `rng`, so the generator state after
/// the call depends only on the number of candidates, never on which one
/// was accepted.
pub fn search<R: Rng + ?Sized>(
    base: &Pitch,
    constraints: &SearchConstraints,
    rng: &mut R,
) -> SearchResult {
    let mut candidates: Vec<Candidate> = constraints
        .intervals
        .iter()
        .flat_map(|&interval| {
            constraints
                .directions
                .iter()
                .map(move |&direction| Candidate {
                    interval,
                    direction,
                })
        })
        .collect();
    candidates.shuffle(rng);

    let mut trace = Vec::new();
    let mut attempts = 0;
    while attempts < constraints.max_attempts {
        let Some(candidate) = candidates.pop() else {
            break;
        };
        attempts += 1;

        match resolve(base, candidate.interval, candidate.direction) {
            Ok(target) if constraints.allowed.contains(target.alteration()) => {
                trace.push(TraceStep {
                    candidate,
                    verdict: Verdict::Accepted(target),
                });
                return SearchResult {
                    outcome: SearchOutcome::Matched { candidate, target },
                    trace,
                };
            }
            Ok(target) => trace.push(TraceStep {
                candidate,
                verdict: Verdict::AlterationNotAllowed(target),
            }),
            Err(_) => trace.push(TraceStep {
                candidate,
                verdict: Verdict::Unspellable,
            }),
        }
    }

    if !constraints.require_exact_match {
        for &interval in &constraints.intervals {
            for &direction in &constraints.directions {
                let candidate = Candidate {
                    interval,
                    direction,
                };
                match resolve(base, interval, direction) {
                    Ok(target) => {
                        trace.push(TraceStep {
                            candidate,
                            verdict: Verdict::Fallback(target),
                        });
                        return SearchResult {
                            outcome: SearchOutcome::Fallback { candidate, target },
                            trace,
                        };
                    }
                    Err(_) => trace.push(TraceStep {
                        candidate,
                        verdict: Verdict::Unspellable,
                    }),
                }
            }
        }
    }

    SearchResult {
        outcome: SearchOutcome::NoValidCandidate,
        trace,
    }
}
