//! Chord exercises: the first sounding note of each measure becomes the
//! root of a triad, stacked as three notes joined with `<chord/>`.
//!
//! Pitches are spelled from absolute values, so chord tones come out with
//! sharps (C minor is written C, D#, G).

use std::fmt;
use std::str::FromStr;

use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::ParseNameError;
use crate::generate::Scope;
use crate::model::{measures, Document, Element, XmlNode};
use crate::notes;
use crate::pitch::{from_absolute, Pitch};

// ─── Triads ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriadKind {
    Major,
    Minor,
    Diminished,
    Augmented,
}

impl TriadKind {
    pub const ALL: [TriadKind; 4] = [
        TriadKind::Major,
        TriadKind::Minor,
        TriadKind::Diminished,
        TriadKind::Augmented,
    ];

    /// Semitones above the root, in root position.
    pub fn offsets(self) -> [i32; 3] {
        match self {
            TriadKind::Major => [0, 4, 7],
            TriadKind::Minor => [0, 3, 7],
            TriadKind::Diminished => [0, 3, 6],
            TriadKind::Augmented => [0, 4, 8],
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            TriadKind::Major => "maj",
            TriadKind::Minor => "min",
            TriadKind::Diminished => "dim",
            TriadKind::Augmented => "aug",
        }
    }
}

impl fmt::Display for TriadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for TriadKind {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "maj" => Ok(TriadKind::Major),
            "min" => Ok(TriadKind::Minor),
            "dim" => Ok(TriadKind::Diminished),
            "aug" => Ok(TriadKind::Augmented),
            _ => Err(ParseNameError::new("triad", s.trim())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Inversion {
    #[default]
    Root,
    First,
    Second,
    /// Pick root, first or second per chord
    Random,
}

impl Inversion {
    const FIXED: [Inversion; 3] = [Inversion::Root, Inversion::First, Inversion::Second];

    /// Reorder root-position offsets into this inversion. The lowest
    /// note is always written first.
    pub fn apply(self, offsets: [i32; 3]) -> [i32; 3] {
        let [i0, i1, i2] = offsets;
        match self {
            Inversion::First => [i1 - 12, i2 - 12, i0],
            Inversion::Second => [i2 - 12, i0, i1],
            Inversion::Root | Inversion::Random => offsets,
        }
    }
}

impl fmt::Display for Inversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inversion::Root => f.write_str("root"),
            Inversion::First => f.write_str("first"),
            Inversion::Second => f.write_str("second"),
            Inversion::Random => f.write_str("random"),
        }
    }
}

impl FromStr for Inversion {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "root" => Ok(Inversion::Root),
            "first" => Ok(Inversion::First),
            "second" => Ok(Inversion::Second),
            "random" => Ok(Inversion::Random),
            _ => Err(ParseNameError::new("inversion", s.trim())),
        }
    }
}

// ─── Generator ──────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ChordOptions {
    /// Triad kinds to draw from; empty falls back to major and minor
    pub triads: Vec<TriadKind>,
    pub inversion: Inversion,
    pub section: Option<String>,
}

impl Default for ChordOptions {
    fn default() -> Self {
        Self {
            triads: vec![TriadKind::Major, TriadKind::Minor, TriadKind::Diminished],
            inversion: Inversion::Root,
            section: None,
        }
    }
}

/// Children a chord tone copies from its root note, in schema order.
const CHORD_TONE_FIELDS: &[&str] = &[
    "duration",
    "voice",
    "type",
    "dot",
    "time-modification",
    "stem",
    "staff",
    "notations",
];

#[derive(Debug, Clone, Copy)]
struct ChordPlan {
    part: usize,
    measure: usize,
    /// Index of the root note in the measure's children
    child: usize,
    pitches: [Pitch; 3],
}

/// A `<chord/>` note sounding `pitch` together with `root`.
fn chord_tone(root: &Element, pitch: &Pitch) -> Element {
    let mut tone = Element::new("note");
    tone.push(Element::new("chord"));
    notes::write_pitch(&mut tone, pitch);
    for field in root.elements().filter(|e| CHORD_TONE_FIELDS.contains(&e.name.as_str())) {
        tone.push(field.clone());
    }
    tone
}

/// Returns the number of chords built.
pub fn generate_chords<R: Rng + ?Sized>(
    doc: &mut Document,
    options: &ChordOptions,
    rng: &mut R,
) -> usize {
    let kinds: &[TriadKind] = if options.triads.is_empty() {
        &[TriadKind::Major, TriadKind::Minor]
    } else {
        &options.triads
    };

    let scope = Scope::resolve(doc, options.section.as_deref());
    let mut plans = Vec::new();

    for (part_index, part) in doc.parts().enumerate() {
        for (measure_index, measure) in measures(part).enumerate() {
            if !scope.includes(part_index, measure_index) {
                continue;
            }
            let first = measure.children.iter().enumerate().find_map(|(child, node)| {
                node.as_element()
                    .filter(|e| e.name == "note" && !notes::is_rest(e))
                    .map(|note| (child, note))
            });
            let Some((child, note)) = first else {
                continue;
            };
            let Some(root) = notes::read_pitch(note) else {
                debug!("part {part_index} measure {measure_index}: no readable root, skipped");
                continue;
            };

            let Some(&kind) = kinds.choose(rng) else {
                continue;
            };
            let inversion = match options.inversion {
                Inversion::Random => Inversion::FIXED
                    .choose(rng)
                    .copied()
                    .unwrap_or(Inversion::Root),
                fixed => fixed,
            };
            let base = root.to_absolute();
            let offsets = inversion.apply(kind.offsets());
            debug!(
                "part {part_index} measure {measure_index}: {root} {kind} ({inversion} inversion)"
            );
            plans.push(ChordPlan {
                part: part_index,
                measure: measure_index,
                child,
                pitches: offsets.map(|o| from_absolute(base + o)),
            });
        }
    }

    let mut built = 0;
    for plan in plans {
        let Some(measure) = doc.measure_mut(plan.part, plan.measure) else {
            continue;
        };
        let Some(root) = measure.element_at_mut(plan.child) else {
            continue;
        };
        notes::write_pitch(root, &plan.pitches[0]);
        notes::clear_accidentals(root);
        let tones = [
            chord_tone(root, &plan.pitches[1]),
            chord_tone(root, &plan.pitches[2]),
        ];

        let old = std::mem::take(&mut measure.children);
        let mut children = Vec::with_capacity(old.len() + tones.len());
        for (index, node) in old.into_iter().enumerate() {
            children.push(node);
            if index == plan.child {
                children.extend(tones.iter().cloned().map(XmlNode::Element));
            }
        }
        measure.children = children;
        built += 1;
    }

    info!("chords: {built} triads built");
    built
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_musicxml;
    use crate::pitch::Step;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const ROOTS: &str = r#"<score-partwise>
  <part id="P1">
    <measure number="1">
      <note><rest/><duration>1</duration><voice>1</voice><type>quarter</type></note>
      <note><pitch><step>C</step><octave>4</octave></pitch><duration>3</duration><voice>1</voice><type>half</type><dot/><accidental>natural</accidental><stem>up</stem></note>
    </measure>
    <measure number="2">
      <note><rest/><duration>4</duration><voice>1</voice><type>whole</type></note>
    </measure>
    <measure number="3">
      <note><pitch><step>D</step><octave>4</octave></pitch><duration>4</duration><voice>1</voice><type>whole</type></note>
    </measure>
  </part>
</score-partwise>"#;

    fn only(kind: TriadKind, inversion: Inversion) -> ChordOptions {
        ChordOptions {
            triads: vec![kind],
            inversion,
            section: None,
        }
    }

    fn measure_pitches(doc: &Document, index: usize) -> Vec<Pitch> {
        measures(doc.part(0).unwrap())
            .nth(index)
            .unwrap()
            .children_named("note")
            .filter_map(notes::read_pitch)
            .collect()
    }

    #[test]
    fn major_root_position() {
        let mut doc = parse_musicxml(ROOTS).unwrap();
        let built = generate_chords(
            &mut doc,
            &only(TriadKind::Major, Inversion::Root),
            &mut ChaCha8Rng::seed_from_u64(0),
        );
        assert_eq!(built, 2);
        let c = measure_pitches(&doc, 0);
        assert_eq!(
            c.iter().map(Pitch::to_absolute).collect::<Vec<_>>(),
            vec![60, 64, 67]
        );
        assert_eq!(
            measure_pitches(&doc, 2),
            vec![
                Pitch::natural(Step::D, 4),
                Pitch::new(Step::F, 1, 4).unwrap(),
                Pitch::natural(Step::A, 4),
            ]
        );
    }

    #[test]
    fn chord_tones_follow_the_root_and_copy_its_fields() {
        let mut doc = parse_musicxml(ROOTS).unwrap();
        generate_chords(
            &mut doc,
            &only(TriadKind::Minor, Inversion::Root),
            &mut ChaCha8Rng::seed_from_u64(0),
        );
        let m = measures(doc.part(0).unwrap()).next().unwrap();
        let row: Vec<&Element> = m.children_named("note").collect();
        assert_eq!(row.len(), 4);
        assert!(notes::is_rest(row[0]));
        assert!(!row[1].has_child("accidental"));
        assert!(!notes::is_chord_tone(row[1]));

        let names: Vec<&str> = row[2].elements().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["chord", "pitch", "duration", "voice", "type", "dot", "stem"]
        );
        assert!(notes::is_chord_tone(row[3]));
        assert_eq!(
            notes::read_pitch(row[2]),
            Some(Pitch::new(Step::D, 1, 4).unwrap())
        );
    }

    #[test]
    fn inversions_put_the_lowest_note_first() {
        let mut doc = parse_musicxml(ROOTS).unwrap();
        generate_chords(
            &mut doc,
            &only(TriadKind::Major, Inversion::First),
            &mut ChaCha8Rng::seed_from_u64(0),
        );
        let values: Vec<i32> = measure_pitches(&doc, 0).iter().map(Pitch::to_absolute).collect();
        assert_eq!(values, vec![52, 55, 60]);

        let mut doc = parse_musicxml(ROOTS).unwrap();
        generate_chords(
            &mut doc,
            &only(TriadKind::Diminished, Inversion::Second),
            &mut ChaCha8Rng::seed_from_u64(0),
        );
        let values: Vec<i32> = measure_pitches(&doc, 0).iter().map(Pitch::to_absolute).collect();
        assert_eq!(values, vec![54, 60, 63]);
    }

    #[test]
    fn random_inversion_still_spans_the_triad() {
        for seed in 0..8 {
            let mut doc = parse_musicxml(ROOTS).unwrap();
            generate_chords(
                &mut doc,
                &only(TriadKind::Augmented, Inversion::Random),
                &mut ChaCha8Rng::seed_from_u64(seed),
            );
            let mut classes: Vec<i32> = measure_pitches(&doc, 0)
                .iter()
                .map(|p| p.to_absolute().rem_euclid(12))
                .collect();
            classes.sort();
            assert_eq!(classes, vec![0, 4, 8], "seed {seed}");
        }
    }

    #[test]
    fn names_parse() {
        assert_eq!("Dim".parse::<TriadKind>(), Ok(TriadKind::Diminished));
        assert!("sus4".parse::<TriadKind>().is_err());
        assert_eq!("random".parse::<Inversion>(), Ok(Inversion::Random));
        assert_eq!(Inversion::First.to_string(), "first");
    }
}
