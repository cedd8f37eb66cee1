//! worksheetlib: music-theory engine and MusicXML worksheet generator.
//!
//! Reads uncompressed MusicXML (.musicxml/.xml) and compressed MXL (.mxl)
//! files, rewrites interval, scale, chord and rhythm exercises, and writes
//! the score back out together with a worksheet copy that hides the
//! answers.
//!
//! # Example
//! ```no_run
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use worksheetlib::{generate_intervals, load_file, save_file, IntervalOptions};
//!
//! let mut doc = load_file("Hoeren_1.musicxml").unwrap();
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let tally = generate_intervals(&mut doc, &IntervalOptions::default(), &mut rng);
//! println!("{} of {} pairs changed", tally.pairs_changed, tally.pairs_considered);
//! save_file(&doc, "Hoeren_1_intervals.musicxml").unwrap();
//! ```

pub mod config;
pub mod error;
pub mod generate;
pub mod interval;
pub mod model;
pub mod mxl;
pub mod notes;
pub mod pairing;
pub mod parser;
pub mod pipeline;
pub mod pitch;
pub mod search;
pub mod section;
pub mod timeline;
pub mod worksheet;
pub mod writer;

use std::path::Path;

pub use config::WorksheetConfig;
pub use error::{ParseNameError, ScoreError};
pub use generate::{
    generate_chords, generate_intervals, generate_rhythms, generate_scales, ChordOptions,
    IntervalOptions, Inversion, RhythmOptions, RunTally, ScaleOptions, TriadKind,
};
pub use interval::{resolve, IntervalName, IntervalSpec, UnspellableInterval};
pub use model::{Document, Element, NoteLoc, XmlNode};
pub use mxl::parse_mxl;
pub use pairing::{pair_events, EventPair};
pub use parser::parse_musicxml;
pub use pipeline::{run_pipeline, PipelineReport};
pub use pitch::{diatonic_advance, from_absolute, to_absolute, Direction, Pitch, PitchError, Step};
pub use search::{search, AccidentalTag, AlterationSet, SearchConstraints, SearchOutcome};
pub use section::{locate_section, SectionBoundary};
pub use timeline::{reconstruct_measure, NoteEvent, Role, RoleClassifier};
pub use worksheet::{apply_worksheet, Action, Page};
pub use writer::{save_file, to_xml_string};

/// Load a MusicXML file from a file path.
/// Automatically detects format based on file extension:
/// - `.musicxml` or `.xml` → uncompressed MusicXML
/// - `.mxl` → compressed MXL (ZIP archive)
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Document, ScoreError> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|source| ScoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    load_bytes(&data, extension.as_deref())
}

/// Load MusicXML from raw bytes with an optional format hint.
/// If `extension` is None, tries to auto-detect the format.
pub fn load_bytes(data: &[u8], extension: Option<&str>) -> Result<Document, ScoreError> {
    match extension {
        Some("mxl") => parse_mxl(data),
        Some("musicxml") | Some("xml") => parse_musicxml(std::str::from_utf8(data)?),
        _ => {
            // Auto-detect: try as XML first, then as MXL
            if let Ok(xml) = std::str::from_utf8(data) {
                if xml.trim_start().starts_with('<') {
                    return parse_musicxml(xml);
                }
            }
            parse_mxl(data)
        }
    }
}
