//! Run configuration, loaded from YAML.
//!
//! Every field has a default, so an empty file is a valid configuration:
//!
//! ```yaml
//! input: Hoeren_1.musicxml
//! outdir: OUT
//! seed: 42
//! scales:
//!   section: Tonleiter
//!   accidentals: [sharp, flat, natural]
//!   placeholders: [E4, E5]
//! intervals:
//!   section: Intervalle
//!   intervals: [m2, M2, m3, M3, P4, TT, P5, m6, M6, m7, M7, P8]
//!   direction: both
//!   accidentals: []
//!   resample_attempts: 50
//!   require_tag_match: true
//! chords:
//!   section: Akkord
//!   triads: [maj, min, dim]
//!   inversion: random
//! rhythms:
//!   section: Rhythmus
//!   note_prob: 0.7
//!   default_pitch: G4
//! worksheet:
//!   enabled: true
//!   action: hide
//! ```
//!
//! Names are kept as text here and checked by [`WorksheetConfig::validate`],
//! which also builds the generator options.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ScoreError;
use crate::generate::{
    parse_directions, ChordOptions, IntervalOptions, Inversion, RhythmOptions, ScaleOptions,
    TriadKind,
};
use crate::interval::IntervalName;
use crate::pitch::{Pitch, Step};
use crate::search::{AccidentalTag, AlterationSet, SearchConstraints};
use crate::timeline::RoleClassifier;
use crate::worksheet::Action;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorksheetConfig {
    /// Source score (`.musicxml`, `.xml` or `.mxl`)
    pub input: PathBuf,
    pub outdir: PathBuf,
    /// Base seed; each generator adds its own offset. Drawn at random when absent.
    pub seed: Option<u64>,
    pub scales: ScalesConfig,
    pub intervals: IntervalsConfig,
    pub chords: ChordsConfig,
    pub rhythms: RhythmsConfig,
    pub worksheet: WorksheetSettings,
}

impl Default for WorksheetConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("Hoeren_1.musicxml"),
            outdir: PathBuf::from("OUT"),
            seed: None,
            scales: ScalesConfig::default(),
            intervals: IntervalsConfig::default(),
            chords: ChordsConfig::default(),
            rhythms: RhythmsConfig::default(),
            worksheet: WorksheetSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalesConfig {
    /// Section keyword; `null` means the whole score
    pub section: Option<String>,
    pub accidentals: Vec<String>,
    pub placeholders: Vec<String>,
}

impl Default for ScalesConfig {
    fn default() -> Self {
        Self {
            section: Some("Tonleiter".to_string()),
            accidentals: strings(&["sharp", "flat", "natural"]),
            placeholders: strings(&["E4", "E5"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntervalsConfig {
    pub section: Option<String>,
    pub intervals: Vec<String>,
    /// `up`, `down` or `both`
    pub direction: String,
    /// Allowed accidentals on targets; empty allows natural, sharp and flat
    pub accidentals: Vec<String>,
    pub resample_attempts: usize,
    pub require_tag_match: bool,
    pub base_class: String,
    pub target_class: String,
    pub profile_name: Option<String>,
}

impl Default for IntervalsConfig {
    fn default() -> Self {
        let roles = RoleClassifier::default();
        Self {
            section: Some("Intervalle".to_string()),
            intervals: IntervalName::ALL.iter().map(|i| i.short_name().to_string()).collect(),
            direction: "both".to_string(),
            accidentals: Vec::new(),
            resample_attempts: 50,
            require_tag_match: true,
            base_class: roles.base_class,
            target_class: roles.target_class,
            profile_name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChordsConfig {
    pub section: Option<String>,
    pub triads: Vec<String>,
    /// `root`, `first`, `second` or `random`
    pub inversion: String,
}

impl Default for ChordsConfig {
    fn default() -> Self {
        Self {
            section: Some("Akkord".to_string()),
            triads: strings(&["maj", "min", "dim"]),
            inversion: "random".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RhythmsConfig {
    pub section: Option<String>,
    pub note_prob: f64,
    pub default_pitch: String,
}

impl Default for RhythmsConfig {
    fn default() -> Self {
        Self {
            section: Some("Rhythmus".to_string()),
            note_prob: 0.7,
            default_pitch: "G4".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorksheetSettings {
    /// Also write a `_worksheet` file next to each answer file
    pub enabled: bool,
    pub action: Action,
}

impl Default for WorksheetSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            action: Action::Hide,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn parse_all<T: std::str::FromStr>(items: &[String]) -> Result<Vec<T>, ScoreError>
where
    T::Err: std::fmt::Display,
{
    items
        .iter()
        .map(|s| s.parse::<T>().map_err(|e| ScoreError::Config(e.to_string())))
        .collect()
}

/// `E4` → (E, 4). Placeholders name a letter and octave only.
fn parse_placeholder(text: &str) -> Result<(Step, i32), ScoreError> {
    let pitch: Pitch = text
        .parse()
        .map_err(|e| ScoreError::Config(format!("placeholder: {e}")))?;
    if pitch.alteration() != 0 {
        return Err(ScoreError::Config(format!(
            "placeholder '{text}' must not carry an accidental"
        )));
    }
    Ok((pitch.step(), pitch.octave()))
}

impl WorksheetConfig {
    /// Read and validate a YAML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScoreError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ScoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse without validating.
    pub fn from_yaml(text: &str) -> Result<Self, ScoreError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Check every name and range by building all generator options.
    pub fn validate(&self) -> Result<(), ScoreError> {
        self.scale_options()?;
        self.interval_options()?;
        self.chord_options()?;
        self.rhythm_options()?;
        Ok(())
    }

    pub fn scale_options(&self) -> Result<ScaleOptions, ScoreError> {
        let placeholders = self
            .scales
            .placeholders
            .iter()
            .map(|p| parse_placeholder(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ScaleOptions {
            accidentals: parse_all::<AccidentalTag>(&self.scales.accidentals)?,
            placeholders,
            section: self.scales.section.clone(),
        })
    }

    pub fn interval_options(&self) -> Result<IntervalOptions, ScoreError> {
        let c = &self.intervals;
        if c.resample_attempts == 0 {
            return Err(ScoreError::Config(
                "intervals.resample_attempts must be at least 1".to_string(),
            ));
        }
        let tags = parse_all::<AccidentalTag>(&c.accidentals)?;
        let mut intervals = parse_all::<IntervalName>(&c.intervals)?;
        if intervals.is_empty() {
            intervals = IntervalName::ALL.to_vec();
        }
        Ok(IntervalOptions {
            constraints: SearchConstraints {
                intervals,
                directions: parse_directions(&c.direction)?,
                max_attempts: c.resample_attempts,
                allowed: AlterationSet::from_tags(&tags),
                require_exact_match: c.require_tag_match,
            },
            roles: RoleClassifier {
                base_class: c.base_class.trim().to_lowercase(),
                target_class: c.target_class.trim().to_lowercase(),
            },
            section: c.section.clone(),
            profile_name: c.profile_name.clone(),
        })
    }

    pub fn chord_options(&self) -> Result<ChordOptions, ScoreError> {
        Ok(ChordOptions {
            triads: parse_all::<TriadKind>(&self.chords.triads)?,
            inversion: self.chords.inversion.parse::<Inversion>()?,
            section: self.chords.section.clone(),
        })
    }

    pub fn rhythm_options(&self) -> Result<RhythmOptions, ScoreError> {
        let p = self.rhythms.note_prob;
        if !(0.0..=1.0).contains(&p) {
            return Err(ScoreError::Config(format!(
                "rhythms.note_prob must be within [0, 1], got {p}"
            )));
        }
        let default_pitch = self
            .rhythms
            .default_pitch
            .parse::<Pitch>()
            .map_err(|e| ScoreError::Config(format!("rhythms.default_pitch: {e}")))?;
        Ok(RhythmOptions {
            note_probability: p,
            default_pitch,
            section: self.rhythms.section.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::Direction;

    #[test]
    fn empty_yaml_gives_defaults() {
        let config = WorksheetConfig::from_yaml("{}").unwrap();
        assert_eq!(config, WorksheetConfig::default());
        assert_eq!(WorksheetConfig::from_yaml("\n").unwrap(), config);
        config.validate().unwrap();

        let scales = config.scale_options().unwrap();
        assert_eq!(scales.placeholders, vec![(Step::E, 4), (Step::E, 5)]);
        assert_eq!(scales.section.as_deref(), Some("Tonleiter"));

        let intervals = config.interval_options().unwrap();
        assert_eq!(intervals.constraints.intervals, IntervalName::ALL.to_vec());
        assert_eq!(intervals.constraints.directions, vec![Direction::Up, Direction::Down]);
        assert_eq!(intervals.constraints.max_attempts, 50);

        assert_eq!(config.chord_options().unwrap().inversion, Inversion::Random);
        assert_eq!(
            config.rhythm_options().unwrap().default_pitch,
            Pitch::natural(Step::G, 4)
        );
    }

    #[test]
    fn partial_yaml_overrides_sections() {
        let yaml = r#"
seed: 7
intervals:
  intervals: [M3, P5]
  direction: up
  accidentals: [natural]
  profile_name: Anfänger
chords:
  triads: [aug]
  inversion: first
rhythms:
  section: null
  note_prob: 0.25
worksheet:
  action: delete
"#;
        let config = WorksheetConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.worksheet.action, Action::Delete);
        assert!(config.worksheet.enabled);

        let intervals = config.interval_options().unwrap();
        assert_eq!(
            intervals.constraints.intervals,
            vec![IntervalName::MajorThird, IntervalName::PerfectFifth]
        );
        assert!(!intervals.constraints.allowed.contains(1));
        assert_eq!(intervals.profile_name.as_deref(), Some("Anfänger"));
        assert_eq!(intervals.section.as_deref(), Some("Intervalle"));

        let chords = config.chord_options().unwrap();
        assert_eq!(chords.triads, vec![TriadKind::Augmented]);
        assert_eq!(chords.inversion, Inversion::First);

        let rhythms = config.rhythm_options().unwrap();
        assert_eq!(rhythms.section, None);
        assert_eq!(rhythms.note_probability, 0.25);
    }

    #[test]
    fn empty_interval_list_means_all_intervals() {
        let config =
            WorksheetConfig::from_yaml("intervals:\n  intervals: []\n  section: null\n").unwrap();
        config.validate().unwrap();
        let intervals = config.interval_options().unwrap();
        assert_eq!(intervals.constraints.intervals, IntervalName::ALL.to_vec());
        assert_eq!(intervals.section, None);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let bad = [
            "intervals:\n  resample_attempts: 0\n",
            "intervals:\n  intervals: [M3, x9]\n",
            "intervals:\n  direction: sideways\n",
            "scales:\n  accidentals: [sharp, double]\n",
            "scales:\n  placeholders: [F#4]\n",
            "chords:\n  triads: [sus2]\n",
            "chords:\n  inversion: third\n",
            "rhythms:\n  note_prob: 1.5\n",
            "rhythms:\n  default_pitch: H4\n",
        ];
        for yaml in bad {
            let config = WorksheetConfig::from_yaml(yaml).unwrap();
            assert!(config.validate().is_err(), "accepted: {yaml}");
        }
    }

    #[test]
    fn malformed_yaml_is_rejected() {
        assert!(WorksheetConfig::from_yaml("seed: [1, 2]").is_err());
        assert!(WorksheetConfig::from_yaml("worksheet:\n  action: erase\n").is_err());
    }
}
