//! Turn a generated exercise into a worksheet by hiding or deleting the
//! answers.
//!
//! | page      | answer                                     |
//! |-----------|--------------------------------------------|
//! | scales    | accidentals                                |
//! | intervals | target notes (quarter notes by default)    |
//! | chords    | staff-1 notes, or `<chord/>` tones         |
//! | rhythms   | the notes themselves                       |

use std::fmt;
use std::str::FromStr;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::ParseNameError;
use crate::model::{Document, Element, XmlNode};
use crate::notes;
use crate::timeline::RoleClassifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    Scales,
    Intervals,
    Chords,
    Rhythms,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Scales, Page::Intervals, Page::Chords, Page::Rhythms];

    pub fn as_str(self) -> &'static str {
        match self {
            Page::Scales => "scales",
            Page::Intervals => "intervals",
            Page::Chords => "chords",
            Page::Rhythms => "rhythms",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Page {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Page::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseNameError::new("page", s.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Keep the answers in the file but mark them invisible
    #[default]
    Hide,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Hide => f.write_str("hide"),
            Action::Delete => f.write_str("delete"),
        }
    }
}

impl FromStr for Action {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hide" => Ok(Action::Hide),
            "delete" => Ok(Action::Delete),
            _ => Err(ParseNameError::new("action", s.trim())),
        }
    }
}

/// Note children that only affect how a note is drawn.
const VISUAL_CHILDREN: &[&str] = &[
    "beam",
    "flag",
    "stem",
    "notehead",
    "accidental",
    "dot",
    "tie",
    "notations",
];

/// Apply a page's worksheet transform with the default target class.
/// Returns the number of elements changed.
pub fn apply_worksheet(doc: &mut Document, page: Page, action: Action) -> usize {
    let target_class = RoleClassifier::default().target_class;
    apply_worksheet_with(doc, page, action, &target_class)
}

/// Like [`apply_worksheet`], with the interval target class spelled out.
pub fn apply_worksheet_with(
    doc: &mut Document,
    page: Page,
    action: Action,
    target_class: &str,
) -> usize {
    let changed = match (page, action) {
        (Page::Scales, _) => hide_accidentals(doc),
        (Page::Intervals, Action::Hide) => {
            hide_notes(doc, |n| notes::duration_class(n) == target_class)
        }
        (Page::Intervals, Action::Delete) => {
            remove_notes(doc, |n| notes::duration_class(n) == target_class)
        }
        (Page::Chords, action) => {
            let staffed = doc.notes().any(|n| notes::staff(n).is_some());
            let answer = |n: &Element| {
                if staffed {
                    notes::staff(n) == Some(1)
                } else {
                    notes::is_chord_tone(n)
                }
            };
            match action {
                Action::Hide => hide_notes(doc, answer),
                Action::Delete => remove_notes(doc, answer),
            }
        }
        (Page::Rhythms, Action::Hide) => notes_to_forwards(doc),
        (Page::Rhythms, Action::Delete) => silence_notes(doc),
    };
    info!("worksheet ({page}, {action}): {changed} elements changed");
    changed
}

// ─── Transforms ─────────────────────────────────────────────────────

/// Every accidental becomes invisible. Altered notes without one get an
/// invisible accidental so playback and layout stay unchanged.
fn hide_accidentals(doc: &mut Document) -> usize {
    let mut changed = 0;
    for note in doc.notes_mut() {
        let mut had = false;
        for accidental in note.children_named_mut("accidental") {
            notes::hide(accidental);
            had = true;
            changed += 1;
        }
        if had {
            continue;
        }
        let name = notes::read_pitch(note)
            .map(|p| p.alteration())
            .filter(|&a| a != 0)
            .and_then(notes::accidental_name);
        if let Some(name) = name {
            let mut accidental = Element::with_text("accidental", name);
            notes::hide(&mut accidental);
            notes::add_accidental(note, accidental);
            changed += 1;
        }
    }
    changed
}

fn hide_notes<F: Fn(&Element) -> bool>(doc: &mut Document, answer: F) -> usize {
    let mut hidden = 0;
    for note in doc.notes_mut() {
        if answer(note) {
            notes::hide(note);
            hidden += 1;
        }
    }
    hidden
}

fn remove_notes<F: Fn(&Element) -> bool>(doc: &mut Document, answer: F) -> usize {
    let mut removed = 0;
    for measure in doc.measures_mut() {
        let before = measure.children.len();
        measure.children.retain(|node| match node {
            XmlNode::Element(e) if e.name == "note" => !answer(e),
            _ => true,
        });
        removed += before - measure.children.len();
    }
    removed
}

/// Drop every `<backup>` and replace each note with a `<forward>` of the
/// same duration, so the measure keeps its length but draws nothing.
fn notes_to_forwards(doc: &mut Document) -> usize {
    let mut replaced = 0;
    for measure in doc.measures_mut() {
        let old = std::mem::take(&mut measure.children);
        let mut children = Vec::with_capacity(old.len());
        for node in old {
            match node {
                XmlNode::Element(e) if e.name == "backup" => {}
                XmlNode::Element(e) if e.name == "note" => {
                    let duration = match e.child_text("duration") {
                        Some(d) if !d.is_empty() => d.to_string(),
                        _ => "1".to_string(),
                    };
                    let mut forward = Element::new("forward");
                    forward.push(Element::with_text("duration", duration));
                    children.push(XmlNode::Element(forward));
                    replaced += 1;
                }
                other => children.push(other),
            }
        }
        measure.children = children;
    }
    replaced
}

/// Pitched notes become bare rests.
fn silence_notes(doc: &mut Document) -> usize {
    let mut changed = 0;
    for note in doc.notes_mut() {
        if !note.has_child("pitch") {
            continue;
        }
        notes::make_rest(note);
        for name in VISUAL_CHILDREN {
            note.remove_children(name);
        }
        changed += 1;
    }
    changed
}
