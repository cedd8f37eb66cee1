//! Integration tests: full runs from a YAML configuration.

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use worksheetlib::config::WorksheetConfig;
use worksheetlib::pipeline::write_report;
use worksheetlib::{load_file, run_pipeline, Action, Page, ScoreError};

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/hoeren_1.musicxml")
}

fn config_in(dir: &std::path::Path, extra: &str) -> WorksheetConfig {
    let yaml = format!(
        "input: {}\noutdir: {}\nseed: 42\n{extra}",
        fixture().display(),
        dir.join("OUT").display()
    );
    let path = dir.join("run.yaml");
    std::fs::write(&path, yaml).unwrap();
    WorksheetConfig::load(&path).expect("config should load")
}

#[test]
fn full_run_writes_answer_and_worksheet_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), "");
    let report = run_pipeline(&config, &[]).unwrap();

    assert_eq!(report.seed, 42);
    let pages: Vec<Page> = report.pages.iter().map(|p| p.page).collect();
    assert_eq!(pages, Page::ALL.to_vec());
    let seeds: Vec<u64> = report.pages.iter().map(|p| p.seed).collect();
    assert_eq!(seeds, vec![43, 44, 45, 46]);

    let out = dir.path().join("OUT");
    for page in Page::ALL {
        let answer = out.join(format!("hoeren_1_{page}.musicxml"));
        let worksheet = out.join(format!("hoeren_1_{page}_worksheet.musicxml"));
        assert!(answer.is_file(), "missing {}", answer.display());
        assert!(worksheet.is_file(), "missing {}", worksheet.display());
        load_file(&answer).unwrap();
        load_file(&worksheet).unwrap();
    }

    let intervals = &report.pages[1];
    let tally = intervals.intervals.expect("interval tally");
    assert_eq!(tally.pairs_considered, 2);
    assert_eq!(tally.pairs_changed, 2);
    assert_eq!(report.pages[2].changed, 2);
    assert_eq!(report.pages[3].changed, 4);
}

#[test]
fn equal_seeds_give_identical_files() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    run_pipeline(&config_in(first.path(), ""), &[]).unwrap();
    run_pipeline(&config_in(second.path(), ""), &[]).unwrap();

    for page in Page::ALL {
        let name = format!("hoeren_1_{page}.musicxml");
        let a = std::fs::read(first.path().join("OUT").join(&name)).unwrap();
        let b = std::fs::read(second.path().join("OUT").join(&name)).unwrap();
        assert_eq!(a, b, "{name} differs");
    }
}

#[test]
fn selected_pages_match_a_full_run() {
    let full = tempfile::tempdir().unwrap();
    let only = tempfile::tempdir().unwrap();
    run_pipeline(&config_in(full.path(), ""), &[]).unwrap();
    let report = run_pipeline(&config_in(only.path(), ""), &[Page::Chords]).unwrap();
    assert_eq!(report.pages.len(), 1);

    let name = "hoeren_1_chords.musicxml";
    assert_eq!(
        std::fs::read(full.path().join("OUT").join(name)).unwrap(),
        std::fs::read(only.path().join("OUT").join(name)).unwrap()
    );
    assert!(!only.path().join("OUT/hoeren_1_scales.musicxml").exists());
}

#[test]
fn worksheets_can_be_disabled_and_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(
        dir.path(),
        "worksheet:\n  enabled: false\n  action: delete\nrhythms:\n  note_prob: 1.0\n",
    );
    assert_eq!(config.worksheet.action, Action::Delete);
    let report = run_pipeline(&config, &[Page::Rhythms]).unwrap();
    assert_eq!(report.pages[0].worksheet, None);
    assert!(!dir.path().join("OUT/hoeren_1_rhythms_worksheet.musicxml").exists());

    let report_path = dir.path().join("report.json");
    write_report(&report, &report_path).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(json["seed"], 42);
    assert_eq!(json["pages"][0]["page"], "rhythms");
    assert_eq!(json["pages"][0]["changed"], 4);
    assert!(json["pages"][0].get("worksheet").is_none());
}

#[test]
fn invalid_config_is_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    std::fs::write(&path, "rhythms:\n  note_prob: 2.0\n").unwrap();
    assert!(matches!(
        WorksheetConfig::load(&path),
        Err(ScoreError::Config(_))
    ));
}
