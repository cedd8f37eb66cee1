//! Rebuild per-measure note timing from the element sequence.
//!
//! MusicXML encodes simultaneous voices by writing one voice, then a
//! `<backup>` that rewinds the cursor, then the next voice. `<forward>`
//! skips time without drawing anything. Walking a measure's children in
//! order with a running cursor therefore gives every note its onset.
//!
//! Timing is read leniently: a missing or non-numeric duration counts as
//! zero, and a cursor driven negative by a bad `<backup>` is kept as is.

use crate::model::{measures, Element, NoteLoc, XmlNode};
use crate::notes;
use crate::pitch::Pitch;

/// How a note takes part in an interval exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The given note (e.g., the whole note)
    Base,
    /// The note to be rewritten (e.g., the quarter note)
    Target,
    Other,
}

/// Maps duration-class labels to roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleClassifier {
    pub base_class: String,
    pub target_class: String,
}

impl Default for RoleClassifier {
    fn default() -> Self {
        Self {
            base_class: "whole".to_string(),
            target_class: "quarter".to_string(),
        }
    }
}

impl RoleClassifier {
    /// Rests and unreadable pitches are never base or target.
    pub fn classify(&self, event: &NoteEvent) -> Role {
        if event.pitch.is_none() {
            Role::Other
        } else if event.duration_class == self.base_class {
            Role::Base
        } else if event.duration_class == self.target_class {
            Role::Target
        } else {
            Role::Other
        }
    }
}

/// One note with its reconstructed position in the measure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteEvent {
    pub note: NoteLoc,
    /// Start in divisions from the beginning of the measure
    pub onset: i64,
    /// Duration in divisions (0 for grace notes or malformed durations)
    pub duration: i64,
    /// Lowercased `<type>` label
    pub duration_class: String,
    pub voice: String,
    pub staff: Option<i32>,
    /// None for rests
    pub pitch: Option<Pitch>,
}

/// Events of one measure, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasureTimeline {
    pub measure_index: usize,
    pub events: Vec<NoteEvent>,
}

/// Walk one measure and emit a NoteEvent per `<note>`.
pub fn reconstruct_measure(measure: &Element, part_index: usize, measure_index: usize) -> Vec<NoteEvent> {
    let mut events = Vec::new();
    let mut time: i64 = 0;

    for (child_index, node) in measure.children.iter().enumerate() {
        let XmlNode::Element(el) = node else {
            continue;
        };
        match el.name.as_str() {
            "note" => {
                let duration = notes::duration(el).filter(|d| *d >= 0).unwrap_or(0);
                events.push(NoteEvent {
                    note: NoteLoc {
                        part: part_index,
                        measure: measure_index,
                        child: child_index,
                    },
                    onset: time,
                    duration,
                    duration_class: notes::duration_class(el),
                    voice: notes::voice(el),
                    staff: notes::staff(el),
                    pitch: notes::read_pitch(el),
                });
                time += duration;
            }
            "forward" => time += notes::duration(el).unwrap_or(0),
            "backup" => time -= notes::duration(el).unwrap_or(0),
            _ => {}
        }
    }

    events
}

/// Timelines for every measure of a part.
pub fn reconstruct_part(part: &Element, part_index: usize) -> Vec<MeasureTimeline> {
    measures(part)
        .enumerate()
        .map(|(measure_index, measure)| MeasureTimeline {
            measure_index,
            events: reconstruct_measure(measure, part_index, measure_index),
        })
        .collect()
}
