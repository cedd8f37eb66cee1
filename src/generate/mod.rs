//! Worksheet generators: each one rewrites part of a score in place and
//! reports what it did.
//!
//! All generators draw randomness only from the generator passed in, and
//! collect their edits before touching the document.

pub mod chords;
pub mod intervals;
pub mod rhythms;
pub mod scales;

use std::str::FromStr;

use log::warn;

use crate::error::ParseNameError;
use crate::model::{Document, Element};
use crate::pitch::Direction;
use crate::section::{locate_in_document, SectionBoundary};

pub use chords::{generate_chords, ChordOptions, Inversion, TriadKind};
pub use intervals::{generate_intervals, IntervalOptions, RunTally};
pub use rhythms::{generate_rhythms, RhythmOptions};
pub use scales::{generate_scales, ScaleOptions};

/// Which measures a generator may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// No section requested: every measure of every part
    Everything,
    Section {
        part: usize,
        boundary: SectionBoundary,
    },
    /// A section was requested but no words mention it
    NotFound,
}

impl Scope {
    pub fn resolve(doc: &Document, section: Option<&str>) -> Scope {
        let Some(keyword) = section else {
            return Scope::Everything;
        };
        match locate_in_document(doc, keyword) {
            Some((part, boundary)) => Scope::Section { part, boundary },
            None => {
                warn!("section '{keyword}' not found; nothing to change");
                Scope::NotFound
            }
        }
    }

    pub fn includes(&self, part: usize, measure: usize) -> bool {
        match self {
            Scope::Everything => true,
            Scope::Section {
                part: p,
                boundary,
            } => *p == part && boundary.contains(measure),
            Scope::NotFound => false,
        }
    }
}

/// Parse a comma list, skipping empty entries.
pub fn parse_list<T: FromStr>(list: &str) -> Result<Vec<T>, T::Err> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

/// "up", "down" or "both".
pub fn parse_directions(value: &str) -> Result<Vec<Direction>, ParseNameError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "up" => Ok(vec![Direction::Up]),
        "down" => Ok(vec![Direction::Down]),
        "both" => Ok(vec![Direction::Up, Direction::Down]),
        other => Err(ParseNameError::new("direction", other)),
    }
}

/// Append ` (Profile: NAME)` to the first credit text, or add a credit
/// carrying it. Returns false when there was nothing to stamp.
pub fn stamp_profile(doc: &mut Document, profile: &str) -> bool {
    let profile = profile.trim();
    if profile.is_empty() {
        return false;
    }

    for credit in doc.root.children_named_mut("credit") {
        if let Some(words) = credit.child_mut("credit-words") {
            let base = match words.text().map(str::trim) {
                Some(text) if !text.is_empty() => text.to_string(),
                _ => "Intervals".to_string(),
            };
            if !base.contains("(Profile:") {
                words.set_text(&format!("{base} (Profile: {profile})"));
            }
            return true;
        }
    }

    let mut credit = Element::new("credit");
    credit.set_attribute("page", "1");
    credit.push(Element::with_text(
        "credit-words",
        format!("Intervals (Profile: {profile})"),
    ));
    doc.root.insert_before_any(credit, &["part-list", "part"]);
    true
}
