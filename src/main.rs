//! `uebungsblatt`: generate practice worksheets from a MusicXML score.
//!
//! Each generator subcommand rewrites one exercise kind; `worksheet` hides
//! or deletes the answers; `run` does everything from a YAML config.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use log::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use worksheetlib::config::WorksheetConfig;
use worksheetlib::pipeline::{run_generator, run_pipeline, write_report};
use worksheetlib::worksheet::apply_worksheet_with;
use worksheetlib::{load_file, save_file, Action, Page, ScoreError};

#[derive(Debug, Parser)]
#[command(name = "uebungsblatt")]
#[command(about = "Interval, scale, chord and rhythm worksheets from MusicXML.")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Args)]
struct Io {
    /// Source score (.musicxml, .xml or .mxl)
    #[arg(long)]
    input: PathBuf,

    #[arg(long)]
    output: PathBuf,

    /// Seed for the random choices; drawn at random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Keyword of the section to rewrite (overrides the default keyword)
    #[arg(long)]
    section: Option<String>,

    /// Rewrite the whole score instead of one section
    #[arg(long, conflicts_with = "section")]
    whole_score: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Respell target notes as random intervals from their base notes.
    Intervals {
        #[command(flatten)]
        io: Io,

        /// Comma list among m2,M2,m3,M3,P4,TT,P5,m6,M6,m7,M7,P8
        #[arg(long, value_delimiter = ',')]
        intervals: Option<Vec<String>>,

        /// up, down or both
        #[arg(long)]
        direction: Option<String>,

        /// Allowed target accidentals: natural,sharp,flat
        #[arg(long, value_delimiter = ',')]
        accidentals: Option<Vec<String>>,

        #[arg(long)]
        resample_attempts: Option<usize>,

        /// Fall back to any spellable interval when no allowed one matches
        #[arg(long, default_value_t = false)]
        allow_fallback: bool,

        #[arg(long)]
        base_class: Option<String>,

        #[arg(long)]
        target_class: Option<String>,

        /// Stamp "(Profile: NAME)" into the score credits
        #[arg(long)]
        profile_name: Option<String>,
    },

    /// Give placeholder notes random accidentals.
    Scales {
        #[command(flatten)]
        io: Io,

        #[arg(long, value_delimiter = ',')]
        accidentals: Option<Vec<String>>,

        /// Comma list of placeholder notes, e.g. `E4,E5`
        #[arg(long, value_delimiter = ',')]
        placeholders: Option<Vec<String>>,
    },

    /// Stack triads on the first note of each measure.
    Chords {
        #[command(flatten)]
        io: Io,

        /// Comma list among maj,min,dim,aug
        #[arg(long, value_delimiter = ',')]
        triads: Option<Vec<String>>,

        /// root, first, second or random
        #[arg(long)]
        inversion: Option<String>,
    },

    /// Redraw every slot as a note or a rest.
    Rhythms {
        #[command(flatten)]
        io: Io,

        #[arg(long)]
        note_prob: Option<f64>,

        #[arg(long)]
        default_pitch: Option<String>,
    },

    /// Hide or delete the answers of a generated page.
    Worksheet {
        #[arg(long)]
        page: Page,

        #[arg(long, default_value = "hide")]
        action: Action,

        #[arg(long, default_value = "quarter")]
        target_class: String,

        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        output: PathBuf,
    },

    /// Run every generator and write answer and worksheet files.
    Run {
        /// YAML run configuration; defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        input: Option<PathBuf>,

        #[arg(long)]
        outdir: Option<PathBuf>,

        #[arg(long)]
        seed: Option<u64>,

        /// Comma list of pages to generate; all when omitted
        #[arg(long, value_delimiter = ',')]
        what: Vec<Page>,

        /// Write a JSON report of the run
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match execute(cli.cmd) {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        let seed = rand::thread_rng().gen();
        info!("no seed given; using {seed}");
        seed
    })
}

fn apply_section(section: &mut Option<String>, io: &Io) {
    if io.whole_score {
        *section = None;
    } else if let Some(ref keyword) = io.section {
        *section = Some(keyword.clone());
    }
}

/// Load, run one generator, save. Returns the change count.
fn run_single(config: &WorksheetConfig, page: Page, io: &Io) -> Result<String, ScoreError> {
    config.validate()?;
    let mut doc = load_file(&io.input)?;
    let mut rng = ChaCha8Rng::seed_from_u64(resolve_seed(io.seed));
    let (changed, tally) = run_generator(&mut doc, config, page, &mut rng)?;
    save_file(&doc, &io.output)?;

    let what = match (page, tally) {
        (Page::Intervals, Some(t)) => format!(
            "Changed {} of {} interval pairs ({} skipped)",
            t.pairs_changed, t.pairs_considered, t.pairs_skipped
        ),
        (Page::Scales, _) => format!("Randomized {changed} placeholder notes"),
        (Page::Chords, _) => format!("Created {changed} chords"),
        _ => format!("Randomized {changed} note/rest slots"),
    };
    Ok(format!("{what}. Wrote {}", io.output.display()))
}

fn execute(cmd: Command) -> Result<String, ScoreError> {
    let mut config = WorksheetConfig::default();
    match cmd {
        Command::Intervals {
            io,
            intervals,
            direction,
            accidentals,
            resample_attempts,
            allow_fallback,
            base_class,
            target_class,
            profile_name,
        } => {
            let c = &mut config.intervals;
            apply_section(&mut c.section, &io);
            if let Some(v) = intervals {
                c.intervals = v;
            }
            if let Some(v) = direction {
                c.direction = v;
            }
            if let Some(v) = accidentals {
                c.accidentals = v;
            }
            if let Some(v) = resample_attempts {
                c.resample_attempts = v;
            }
            if let Some(v) = base_class {
                c.base_class = v;
            }
            if let Some(v) = target_class {
                c.target_class = v;
            }
            c.require_tag_match = !allow_fallback;
            c.profile_name = profile_name;
            run_single(&config, Page::Intervals, &io)
        }
        Command::Scales {
            io,
            accidentals,
            placeholders,
        } => {
            let c = &mut config.scales;
            apply_section(&mut c.section, &io);
            if let Some(v) = accidentals {
                c.accidentals = v;
            }
            if let Some(v) = placeholders {
                c.placeholders = v;
            }
            run_single(&config, Page::Scales, &io)
        }
        Command::Chords {
            io,
            triads,
            inversion,
        } => {
            let c = &mut config.chords;
            apply_section(&mut c.section, &io);
            if let Some(v) = triads {
                c.triads = v;
            }
            // Single runs default to root position; the pipeline defaults to random.
            c.inversion = inversion.unwrap_or_else(|| "root".to_string());
            run_single(&config, Page::Chords, &io)
        }
        Command::Rhythms {
            io,
            note_prob,
            default_pitch,
        } => {
            let c = &mut config.rhythms;
            apply_section(&mut c.section, &io);
            if let Some(v) = note_prob {
                c.note_prob = v;
            }
            if let Some(v) = default_pitch {
                c.default_pitch = v;
            }
            run_single(&config, Page::Rhythms, &io)
        }
        Command::Worksheet {
            page,
            action,
            target_class,
            input,
            output,
        } => {
            let mut doc = load_file(&input)?;
            let changed =
                apply_worksheet_with(&mut doc, page, action, &target_class.trim().to_lowercase());
            save_file(&doc, &output)?;
            Ok(format!(
                "Worksheet ({page}, {action}): changed {changed} elements. Wrote {}",
                output.display()
            ))
        }
        Command::Run {
            config: path,
            input,
            outdir,
            seed,
            what,
            report,
        } => {
            if let Some(path) = path {
                config = WorksheetConfig::load(path)?;
            }
            if let Some(v) = input {
                config.input = v;
            }
            if let Some(v) = outdir {
                config.outdir = v;
            }
            if seed.is_some() {
                config.seed = seed;
            }
            let result = run_pipeline(&config, &what)?;
            if let Some(path) = report {
                write_report(&result, path)?;
            }
            Ok(format!(
                "Done. {} pages with seed {}. Files saved to {}",
                result.pages.len(),
                result.seed,
                config.outdir.display()
            ))
        }
    }
}
