//! One worksheet run: load the score once, run each selected generator on
//! its own copy, and write the answer file plus its worksheet variant.
//!
//! Every generator gets its own ChaCha8 stream seeded from the base seed
//! plus a fixed offset, so selecting fewer pages does not change the
//! output of the others.

use std::path::{Path, PathBuf};

use log::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::config::WorksheetConfig;
use crate::error::ScoreError;
use crate::generate::{
    generate_chords, generate_intervals, generate_rhythms, generate_scales, RunTally,
};
use crate::model::Document;
use crate::worksheet::{apply_worksheet_with, Page};
use crate::writer::save_file;

/// What a run produced, serializable as the `--report` JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    pub input: PathBuf,
    /// Base seed actually used
    pub seed: u64,
    pub pages: Vec<PageReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageReport {
    pub page: Page,
    pub seed: u64,
    /// Notes, chords or slots the generator changed
    pub changed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intervals: Option<RunTally>,
    pub answer: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worksheet: Option<PathBuf>,
    pub worksheet_changed: usize,
}

/// Offset added to the base seed for each generator.
pub fn seed_offset(page: Page) -> u64 {
    match page {
        Page::Scales => 1,
        Page::Intervals => 2,
        Page::Chords => 3,
        Page::Rhythms => 4,
    }
}

/// Run one generator over `doc`. Returns the change count and, for
/// intervals, the full tally.
pub fn run_generator<R: Rng + ?Sized>(
    doc: &mut Document,
    config: &WorksheetConfig,
    page: Page,
    rng: &mut R,
) -> Result<(usize, Option<RunTally>), ScoreError> {
    Ok(match page {
        Page::Scales => (generate_scales(doc, &config.scale_options()?, rng), None),
        Page::Intervals => {
            let tally = generate_intervals(doc, &config.interval_options()?, rng);
            (tally.pairs_changed, Some(tally))
        }
        Page::Chords => (generate_chords(doc, &config.chord_options()?, rng), None),
        Page::Rhythms => (generate_rhythms(doc, &config.rhythm_options()?, rng), None),
    })
}

fn output_stem(input: &Path) -> String {
    input
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("score")
        .to_string()
}

/// Run the selected pages (all of them when `pages` is empty).
pub fn run_pipeline(config: &WorksheetConfig, pages: &[Page]) -> Result<PipelineReport, ScoreError> {
    config.validate()?;

    let seed = match config.seed {
        Some(seed) => seed,
        None => {
            let seed = rand::thread_rng().gen();
            info!("no seed configured; using {seed}");
            seed
        }
    };
    let pages: Vec<Page> = if pages.is_empty() {
        Page::ALL.to_vec()
    } else {
        pages.to_vec()
    };

    let source = crate::load_file(&config.input)?;
    std::fs::create_dir_all(&config.outdir).map_err(|source| ScoreError::Write {
        path: config.outdir.clone(),
        source,
    })?;
    let stem = output_stem(&config.input);

    let mut report = PipelineReport {
        input: config.input.clone(),
        seed,
        pages: Vec::new(),
    };

    for page in pages {
        let page_seed = seed.wrapping_add(seed_offset(page));
        let mut rng = ChaCha8Rng::seed_from_u64(page_seed);
        let mut doc = source.clone();

        let (changed, intervals) = run_generator(&mut doc, config, page, &mut rng)?;
        let answer = config.outdir.join(format!("{stem}_{page}.musicxml"));
        save_file(&doc, &answer)?;

        let mut worksheet = None;
        let mut worksheet_changed = 0;
        if config.worksheet.enabled {
            worksheet_changed = apply_worksheet_with(
                &mut doc,
                page,
                config.worksheet.action,
                &config.intervals.target_class.trim().to_lowercase(),
            );
            let path = config.outdir.join(format!("{stem}_{page}_worksheet.musicxml"));
            save_file(&doc, &path)?;
            worksheet = Some(path);
        }

        info!("{page}: {changed} changed, wrote {}", answer.display());
        report.pages.push(PageReport {
            page,
            seed: page_seed,
            changed,
            intervals,
            answer,
            worksheet,
            worksheet_changed,
        });
    }

    info!("done; files saved to {}", config.outdir.display());
    Ok(report)
}

/// Write a report as pretty-printed JSON.
pub fn write_report<P: AsRef<Path>>(report: &PipelineReport, path: P) -> Result<(), ScoreError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).map_err(|source| ScoreError::Write {
        path: path.to_path_buf(),
        source,
    })
}
