//! Scale exercises: placeholder notes (E4 and E5 by default) get a random
//! accidental so students have to name the resulting scale. The first
//! occurrence of the first placeholder and the last occurrence of the last
//! placeholder frame the scale and are forced natural.

use log::info;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::generate::Scope;
use crate::model::{measures, Document, Element, NoteLoc};
use crate::notes;
use crate::pitch::Step;
use crate::search::AccidentalTag;

#[derive(Debug, Clone)]
pub struct ScaleOptions {
    /// Accidentals to draw from; empty means natural only
    pub accidentals: Vec<AccidentalTag>,
    /// (step, octave) pairs that are randomized, in order
    pub placeholders: Vec<(Step, i32)>,
    pub section: Option<String>,
}

impl Default for ScaleOptions {
    fn default() -> Self {
        Self {
            accidentals: vec![AccidentalTag::Sharp, AccidentalTag::Flat, AccidentalTag::Natural],
            placeholders: vec![(Step::E, 4), (Step::E, 5)],
            section: None,
        }
    }
}

/// Step and octave of a pitched note, ignoring any alteration.
fn placeholder_key(note: &Element) -> Option<(Step, i32)> {
    let pitch = note.child("pitch")?;
    let step = pitch.child_text("step")?.parse().ok()?;
    let octave = pitch.child_text("octave")?.parse().ok()?;
    Some((step, octave))
}

/// Returns the number of placeholder notes that received a random accidental.
pub fn generate_scales<R: Rng + ?Sized>(
    doc: &mut Document,
    options: &ScaleOptions,
    rng: &mut R,
) -> usize {
    let choices: Vec<i32> = if options.accidentals.is_empty() {
        vec![0]
    } else {
        options.accidentals.iter().map(|a| a.alteration()).collect()
    };

    let scope = Scope::resolve(doc, options.section.as_deref());
    let mut pitched: Vec<(NoteLoc, Option<(Step, i32)>)> = Vec::new();
    for (part_index, part) in doc.parts().enumerate() {
        for (measure_index, measure) in measures(part).enumerate() {
            if !scope.includes(part_index, measure_index) {
                continue;
            }
            for (child, node) in measure.children.iter().enumerate() {
                let Some(note) = node.as_element().filter(|e| e.name == "note") else {
                    continue;
                };
                if note.has_child("pitch") {
                    let loc = NoteLoc {
                        part: part_index,
                        measure: measure_index,
                        child,
                    };
                    pitched.push((loc, placeholder_key(note)));
                }
            }
        }
    }

    let (Some(&first_key), Some(&last_key)) =
        (options.placeholders.first(), options.placeholders.last())
    else {
        return 0;
    };
    let first_anchor = pitched.iter().position(|(_, k)| *k == Some(first_key));
    let last_anchor = pitched.iter().rposition(|(_, k)| *k == Some(last_key));

    // (note, alteration, randomized)
    let mut edits: Vec<(NoteLoc, i32, bool)> = Vec::new();
    for (index, (loc, key)) in pitched.iter().enumerate() {
        if Some(index) == first_anchor || Some(index) == last_anchor {
            edits.push((*loc, 0, false));
        } else if key.map_or(false, |k| options.placeholders.contains(&k)) {
            let alteration = choices.choose(rng).copied().unwrap_or(0);
            edits.push((*loc, alteration, true));
        }
    }

    let mut randomized = 0;
    for (loc, alteration, random) in edits {
        let Some(note) = doc.note_mut(loc) else {
            continue;
        };
        notes::write_alter(note, alteration);
        notes::clear_accidentals(note);
        if random {
            randomized += 1;
        }
    }

    info!("scales: {randomized} placeholder notes randomized");
    randomized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_musicxml;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn scale_doc() -> Document {
        let notes: String = ["E4", "F4", "G4", "E4", "E5", "A4", "E5"]
            .iter()
            .map(|p| {
                let (step, octave) = p.split_at(1);
                format!(
                    "<note><pitch><step>{step}</step><alter>1</alter><octave>{octave}</octave></pitch><duration>1</duration><accidental>sharp</accidental></note>"
                )
            })
            .collect();
        parse_musicxml(&format!(
            "<score-partwise><part id=\"P1\"><measure number=\"1\">{notes}</measure></part></score-partwise>"
        ))
        .unwrap()
    }

    fn alters(doc: &Document) -> Vec<Option<String>> {
        doc.notes()
            .map(|n| n.child("pitch").and_then(|p| p.child_text("alter")).map(String::from))
            .collect()
    }

    #[test]
    fn anchors_natural_and_middle_placeholders_randomized() {
        let mut doc = scale_doc();
        let options = ScaleOptions {
            accidentals: vec![AccidentalTag::Flat],
            ..Default::default()
        };
        let changed = generate_scales(&mut doc, &options, &mut ChaCha8Rng::seed_from_u64(4));
        assert_eq!(changed, 2);

        let expected: Vec<Option<String>> = ["0", "1", "1", "-1", "-1", "1", "0"]
            .iter()
            .map(|s| Some(s.to_string()))
            .collect();
        assert_eq!(alters(&doc), expected);

        let with_accidental: Vec<bool> = doc.notes().map(|n| n.has_child("accidental")).collect();
        assert_eq!(with_accidental, vec![false, true, true, false, false, true, false]);
    }

    #[test]
    fn same_seed_same_accidentals() {
        let mut a = scale_doc();
        let mut b = scale_doc();
        let options = ScaleOptions::default();
        generate_scales(&mut a, &options, &mut ChaCha8Rng::seed_from_u64(9));
        generate_scales(&mut b, &options, &mut ChaCha8Rng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn no_placeholders_no_changes() {
        let mut doc = scale_doc();
        let before = doc.clone();
        let options = ScaleOptions {
            placeholders: Vec::new(),
            ..Default::default()
        };
        assert_eq!(generate_scales(&mut doc, &options, &mut ChaCha8Rng::seed_from_u64(1)), 0);
        assert_eq!(doc, before);
    }
}
