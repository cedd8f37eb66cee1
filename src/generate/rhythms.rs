//! Rhythm exercises: each note slot of the section is redrawn as either a
//! note or a rest. Durations are never touched.

use log::info;
use rand::Rng;

use crate::generate::Scope;
use crate::model::{measures, Document, NoteLoc};
use crate::notes;
use crate::pitch::{Pitch, Step};

#[derive(Debug, Clone)]
pub struct RhythmOptions {
    /// Chance that a slot sounds, in `[0, 1]`
    pub note_probability: f64,
    /// Pitch given to rests that become notes
    pub default_pitch: Pitch,
    pub section: Option<String>,
}

impl Default for RhythmOptions {
    fn default() -> Self {
        Self {
            note_probability: 0.7,
            default_pitch: Pitch::natural(Step::G, 4),
            section: None,
        }
    }
}

/// Returns the number of slots visited.
pub fn generate_rhythms<R: Rng + ?Sized>(
    doc: &mut Document,
    options: &RhythmOptions,
    rng: &mut R,
) -> usize {
    let scope = Scope::resolve(doc, options.section.as_deref());

    // (slot, sounds)
    let mut slots: Vec<(NoteLoc, bool)> = Vec::new();
    for (part_index, part) in doc.parts().enumerate() {
        for (measure_index, measure) in measures(part).enumerate() {
            if !scope.includes(part_index, measure_index) {
                continue;
            }
            for (child, node) in measure.children.iter().enumerate() {
                if !node.is_element_named("note") {
                    continue;
                }
                let sounds = rng.gen::<f64>() < options.note_probability;
                let loc = NoteLoc {
                    part: part_index,
                    measure: measure_index,
                    child,
                };
                slots.push((loc, sounds));
            }
        }
    }

    let mut visited = 0;
    let mut sounding = 0;
    for (loc, sounds) in slots {
        let Some(note) = doc.note_mut(loc) else {
            continue;
        };
        if sounds {
            notes::make_pitched(note, &options.default_pitch);
            sounding += 1;
        } else {
            notes::make_rest(note);
        }
        visited += 1;
    }

    info!("rhythms: {visited} slots, {sounding} sounding");
    visited
}
