//! Integration tests: load the fixture scores and write them back out.

use std::io::{Cursor, Write};
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use worksheetlib::{load_bytes, load_file, parse_musicxml, to_xml_string, Document, ScoreError};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn hoeren() -> Document {
    load_file(fixture("hoeren_1.musicxml")).expect("Failed to load hoeren_1.musicxml")
}

/// Build an .mxl archive in memory.
fn mxl(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

// ─── Uncompressed MusicXML ──────────────────────────────────────────

#[test]
fn fixture_structure() {
    let doc = hoeren();
    assert_eq!(doc.root.name, "score-partwise");
    assert_eq!(doc.root.attribute("version"), Some("4.0"));
    assert!(doc
        .doctype
        .as_deref()
        .is_some_and(|d| d.starts_with("score-partwise PUBLIC")));
    assert_eq!(doc.parts().count(), 1);
    assert_eq!(doc.measure_count(), 8);
    assert_eq!(doc.notes().count(), 22);
}

#[test]
fn write_then_parse_is_stable() {
    let doc = hoeren();
    let xml = to_xml_string(&doc).unwrap();
    let again = parse_musicxml(&xml).unwrap();
    assert_eq!(again, doc);
    assert_eq!(to_xml_string(&again).unwrap(), xml);
}

#[test]
fn output_keeps_declaration_doctype_and_comments() {
    let xml = to_xml_string(&hoeren()).unwrap();
    let mut lines = xml.lines();
    assert_eq!(lines.next(), Some(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    assert!(lines
        .next()
        .is_some_and(|l| l.starts_with("<!DOCTYPE score-partwise PUBLIC")));
    assert!(xml.contains("Hören 1 &amp; Üben"));
    assert!(xml.contains("<!-- Tonleiter"));
    assert!(xml.contains("<rest/>"));
}

// ─── Compressed MXL ─────────────────────────────────────────────────

const CONTAINER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container>
  <rootfiles>
    <rootfile full-path="score/hoeren.musicxml" media-type="application/vnd.recordare.musicxml+xml"/>
  </rootfiles>
</container>"#;

#[test]
fn mxl_with_container_matches_plain_file() {
    let xml = std::fs::read_to_string(fixture("hoeren_1.musicxml")).unwrap();
    let data = mxl(&[
        ("META-INF/container.xml", CONTAINER),
        ("score/hoeren.musicxml", xml.as_str()),
    ]);
    assert_eq!(load_bytes(&data, Some("mxl")).unwrap(), hoeren());
    // Sniffed without an extension too
    assert_eq!(load_bytes(&data, None).unwrap(), hoeren());
}

#[test]
fn mxl_without_container_uses_first_score_file() {
    let xml = std::fs::read_to_string(fixture("hoeren_1.musicxml")).unwrap();
    let data = mxl(&[("notes.txt", "not a score"), ("hoeren.xml", xml.as_str())]);
    assert_eq!(load_bytes(&data, Some("mxl")).unwrap(), hoeren());
}

#[test]
fn mxl_without_any_score_is_an_archive_error() {
    let data = mxl(&[("readme.txt", "nothing here")]);
    let err = load_bytes(&data, Some("mxl")).unwrap_err();
    assert!(matches!(err, ScoreError::Archive(_)));
}

#[test]
fn missing_file_is_a_read_error() {
    let err = load_file(fixture("missing.musicxml")).unwrap_err();
    assert!(matches!(err, ScoreError::Read { .. }));
}
