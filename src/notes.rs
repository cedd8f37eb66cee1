//! Reading and writing the MusicXML fields of `<note>`, `<forward>` and
//! `<backup>` elements.
//!
//! Reads are lenient: a missing or malformed value comes back as `None`
//! and the caller decides the default. Writes keep children in the order
//! the MusicXML schema lists them.

use log::warn;

use crate::model::{Element, XmlNode};
use crate::pitch::{Pitch, Step};

/// Children that come after `<pitch>`/`<rest>` inside a `<note>`.
const AFTER_PITCH: &[&str] = &[
    "duration",
    "tie",
    "instrument",
    "footnote",
    "level",
    "voice",
    "type",
    "dot",
    "accidental",
    "time-modification",
    "stem",
    "notehead",
    "notehead-text",
    "staff",
    "beam",
    "notations",
    "lyric",
    "play",
    "listen",
];

/// Children that come after `<accidental>` inside a `<note>`.
const AFTER_ACCIDENTAL: &[&str] = &[
    "time-modification",
    "stem",
    "notehead",
    "notehead-text",
    "staff",
    "beam",
    "notations",
    "lyric",
    "play",
    "listen",
];

/// MusicXML accidental names for alterations -2..=2.
pub fn accidental_name(alteration: i32) -> Option<&'static str> {
    match alteration {
        -2 => Some("flat-flat"),
        -1 => Some("flat"),
        0 => Some("natural"),
        1 => Some("sharp"),
        2 => Some("sharp-sharp"),
        _ => None,
    }
}

/// Spelled pitch of a note, or `None` for rests and unreadable pitches.
pub fn read_pitch(note: &Element) -> Option<Pitch> {
    let pitch = note.child("pitch")?;
    let step: Step = pitch.child_text("step")?.parse().ok()?;
    let octave: i32 = pitch.child_text("octave")?.parse().ok()?;

    let alteration = match pitch.child_text("alter") {
        None | Some("") => 0,
        Some(text) => match text.parse::<f64>() {
            Ok(a) if a.fract() == 0.0 => a as i32,
            _ => {
                warn!("ignoring note with non-integer alter '{text}'");
                return None;
            }
        },
    };

    match Pitch::new(step, alteration, octave) {
        Ok(p) => Some(p),
        Err(e) => {
            warn!("ignoring note pitch: {e}");
            None
        }
    }
}

/// Replace the note's pitch, turning a rest into a note if needed.
/// An alteration of 0 is written by omitting `<alter>`.
pub fn write_pitch(note: &mut Element, pitch: &Pitch) {
    let mut el = Element::new("pitch");
    el.push(Element::with_text("step", pitch.step().as_str()));
    if pitch.alteration() != 0 {
        el.push(Element::with_text("alter", pitch.alteration().to_string()));
    }
    el.push(Element::with_text("octave", pitch.octave().to_string()));

    if let Some(at) = note.position_of("pitch").or_else(|| note.position_of("rest")) {
        note.children[at] = XmlNode::Element(el);
    } else {
        note.insert_before_any(el, AFTER_PITCH);
    }
}

/// Set `<alter>` without touching step or octave. Writes `0` explicitly.
pub fn write_alter(note: &mut Element, alteration: i32) {
    let Some(pitch) = note.child_mut("pitch") else {
        return;
    };
    match pitch.child_mut("alter") {
        Some(alter) => alter.set_text(&alteration.to_string()),
        None => {
            pitch.insert_before_any(Element::with_text("alter", alteration.to_string()), &["octave"]);
        }
    }
}

/// Turn a note into a rest of the same duration.
pub fn make_rest(note: &mut Element) {
    if note.has_child("rest") {
        note.remove_children("pitch");
        return;
    }
    match note.position_of("pitch") {
        Some(at) => note.children[at] = XmlNode::Element(Element::new("rest")),
        None => {
            note.insert_before_any(Element::new("rest"), AFTER_PITCH);
        }
    }
}

/// Turn a rest into a note, using `default` when no pitch is present.
pub fn make_pitched(note: &mut Element, default: &Pitch) {
    if note.has_child("pitch") {
        note.remove_children("rest");
        return;
    }
    write_pitch(note, default);
}

/// Add an `<accidental>` child in schema position.
pub fn add_accidental(note: &mut Element, accidental: Element) {
    note.insert_before_any(accidental, AFTER_ACCIDENTAL);
}

pub fn clear_accidentals(note: &mut Element) -> usize {
    note.remove_children("accidental")
}

/// Declared `<duration>` of a note, forward or backup.
pub fn duration(el: &Element) -> Option<i64> {
    el.child_text("duration")?.parse().ok()
}

/// Lowercased `<type>` label ("whole", "quarter", …), empty if absent.
pub fn duration_class(note: &Element) -> String {
    note.child_text("type")
        .map(str::to_lowercase)
        .unwrap_or_default()
}

/// Voice identifier, "1" when absent.
pub fn voice(note: &Element) -> String {
    match note.child_text("voice") {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "1".to_string(),
    }
}

pub fn staff(note: &Element) -> Option<i32> {
    note.child_text("staff")?.parse().ok()
}

pub fn is_rest(note: &Element) -> bool {
    note.has_child("rest")
}

pub fn is_chord_tone(note: &Element) -> bool {
    note.has_child("chord")
}

pub fn hide(el: &mut Element) {
    el.set_attribute("print-object", "no");
}
