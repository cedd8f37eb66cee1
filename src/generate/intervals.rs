//! Interval exercises: every base note (whole note by default) is paired
//! with a target note in another voice (quarter note by default), and the
//! target is respelled as a randomly chosen interval above or below the
//! base.

use log::{debug, info, warn};
use rand::Rng;
use serde::Serialize;

use crate::generate::{stamp_profile, Scope};
use crate::model::{Document, NoteLoc};
use crate::notes;
use crate::pairing::pair_events;
use crate::pitch::Pitch;
use crate::search::{search, SearchConstraints};
use crate::timeline::{reconstruct_part, RoleClassifier};

#[derive(Debug, Clone, Default)]
pub struct IntervalOptions {
    pub constraints: SearchConstraints,
    pub roles: RoleClassifier,
    /// Restrict to the section labelled with this keyword
    pub section: Option<String>,
    /// Stamp ` (Profile: NAME)` into the credits
    pub profile_name: Option<String>,
}

/// What an interval run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunTally {
    pub pairs_considered: usize,
    /// Pair edits applied; a target shared by several bases is counted once per pair
    pub pairs_changed: usize,
    /// Pairs left untouched because no candidate satisfied the constraints
    pub pairs_skipped: usize,
}

#[derive(Debug, Clone, Copy)]
struct PitchEdit {
    note: NoteLoc,
    pitch: Pitch,
}

pub fn generate_intervals<R: Rng + ?Sized>(
    doc: &mut Document,
    options: &IntervalOptions,
    rng: &mut R,
) -> RunTally {
    if let Some(ref profile) = options.profile_name {
        stamp_profile(doc, profile);
    }

    let scope = Scope::resolve(doc, options.section.as_deref());
    let mut tally = RunTally::default();
    let mut edits = Vec::new();

    for (part_index, part) in doc.parts().enumerate() {
        for timeline in reconstruct_part(part, part_index) {
            if !scope.includes(part_index, timeline.measure_index) {
                continue;
            }

            for pair in pair_events(&timeline.events, &options.roles) {
                tally.pairs_considered += 1;
                let target = &timeline.events[pair.target];
                // Bases are always pitched notes.
                let Some(base) = timeline.events[pair.base].pitch else {
                    continue;
                };

                let result = search(&base, &options.constraints, rng);
                debug!(
                    "part {part_index} measure {}: base {base}, trace {:?}",
                    timeline.measure_index, result.trace
                );
                match result.outcome.target() {
                    Some(pitch) => edits.push(PitchEdit {
                        note: target.note,
                        pitch,
                    }),
                    None => {
                        warn!(
                            "part {part_index} measure {}: no allowed interval from {base}",
                            timeline.measure_index
                        );
                        tally.pairs_skipped += 1;
                    }
                }
            }
        }
    }

    for edit in edits {
        match doc.note_mut(edit.note) {
            Some(note) => {
                notes::write_pitch(note, &edit.pitch);
                notes::clear_accidentals(note);
                tally.pairs_changed += 1;
            }
            None => tally.pairs_skipped += 1,
        }
    }

    info!(
        "intervals: {} pairs, {} changed, {} skipped",
        tally.pairs_considered, tally.pairs_changed, tally.pairs_skipped
    );
    tally
}
