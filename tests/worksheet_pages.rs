//! Integration tests: hide and delete the answers of each generated page.

use std::path::PathBuf;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use worksheetlib::model::measures;
use worksheetlib::notes::{duration_class, is_chord_tone, is_rest};
use worksheetlib::{
    apply_worksheet, generate_chords, generate_intervals, generate_scales, load_file,
    parse_musicxml, to_xml_string, AccidentalTag, Action, ChordOptions, Document,
    IntervalOptions, Page, ScaleOptions,
};

fn hoeren() -> Document {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/hoeren_1.musicxml");
    load_file(path).expect("Failed to load hoeren_1.musicxml")
}

fn measure_len(doc: &Document, index: usize) -> usize {
    doc.part(0)
        .and_then(|p| measures(p).nth(index))
        .map_or(0, |m| m.children_named("note").count())
}

fn assert_reparses(doc: &Document) {
    let xml = to_xml_string(doc).unwrap();
    assert_eq!(&parse_musicxml(&xml).unwrap(), doc);
}

fn with_scales() -> Document {
    let mut doc = hoeren();
    let options = ScaleOptions {
        accidentals: vec![AccidentalTag::Flat],
        section: Some("Tonleiter".to_string()),
        ..Default::default()
    };
    generate_scales(&mut doc, &options, &mut ChaCha8Rng::seed_from_u64(1));
    doc
}

fn with_intervals() -> Document {
    let mut doc = hoeren();
    let options = IntervalOptions {
        section: Some("Intervalle".to_string()),
        ..Default::default()
    };
    generate_intervals(&mut doc, &options, &mut ChaCha8Rng::seed_from_u64(2));
    doc
}

fn with_chords() -> Document {
    let mut doc = hoeren();
    let options = ChordOptions {
        section: Some("Akkord".to_string()),
        ..Default::default()
    };
    generate_chords(&mut doc, &options, &mut ChaCha8Rng::seed_from_u64(3));
    doc
}

#[test]
fn scales_accidentals_become_invisible() {
    let mut doc = with_scales();
    assert_eq!(apply_worksheet(&mut doc, Page::Scales, Action::Hide), 4);

    let accidentals: Vec<_> = doc
        .notes()
        .filter_map(|n| n.child("accidental"))
        .collect();
    assert_eq!(accidentals.len(), 4);
    assert!(accidentals
        .iter()
        .all(|a| a.attribute("print-object") == Some("no")));
    assert_reparses(&doc);
}

#[test]
fn intervals_hide_keeps_targets_in_the_file() {
    let mut doc = with_intervals();
    let quarters = doc.notes().filter(|n| duration_class(n) == "quarter").count();
    assert_eq!(apply_worksheet(&mut doc, Page::Intervals, Action::Hide), quarters);
    assert_eq!(measure_len(&doc, 2), 3);
    assert!(doc
        .notes()
        .filter(|n| duration_class(n) == "quarter")
        .all(|n| n.attribute("print-object") == Some("no")));
}

#[test]
fn intervals_delete_removes_targets() {
    let mut doc = with_intervals();
    apply_worksheet(&mut doc, Page::Intervals, Action::Delete);
    assert!(doc.notes().all(|n| duration_class(n) != "quarter"));
    assert_eq!(measure_len(&doc, 2), 2);
    assert_eq!(measure_len(&doc, 4), 1);
    assert_reparses(&doc);
}

#[test]
fn chords_hide_or_delete_chord_tones() {
    let mut hidden = with_chords();
    assert_eq!(apply_worksheet(&mut hidden, Page::Chords, Action::Hide), 4);
    assert_eq!(measure_len(&hidden, 4), 3);

    let mut deleted = with_chords();
    assert_eq!(apply_worksheet(&mut deleted, Page::Chords, Action::Delete), 4);
    assert!(deleted.notes().all(|n| !is_chord_tone(n)));
    assert_eq!(measure_len(&deleted, 4), 1);
    assert_eq!(measure_len(&deleted, 5), 1);
}

#[test]
fn rhythms_hide_leaves_only_forwards() {
    let mut doc = hoeren();
    assert_eq!(apply_worksheet(&mut doc, Page::Rhythms, Action::Hide), 22);
    assert_eq!(doc.notes().count(), 0);

    let part = doc.part(0).unwrap();
    assert!(measures(part).all(|m| m.child("backup").is_none()));
    let forwards: usize = measures(part).map(|m| m.children_named("forward").count()).sum();
    assert_eq!(forwards, 22);
    assert_reparses(&doc);
}

#[test]
fn rhythms_delete_turns_notes_into_bare_rests() {
    let mut doc = hoeren();
    assert_eq!(apply_worksheet(&mut doc, Page::Rhythms, Action::Delete), 17);
    assert_eq!(doc.notes().count(), 22);
    assert!(doc.notes().all(is_rest));
    assert!(doc.notes().all(|n| !n.has_child("stem") && !n.has_child("accidental")));
}
