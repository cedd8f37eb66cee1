//! Locate a worksheet section ("Tonleiter", "Intervalle", …) from the
//! free-text `<words>` directions that label it.
//!
//! A section starts at the first measure whose words contain the keyword
//! and runs up to, but not including, the next measure carrying any words.

use std::ops::Range;

use log::debug;

use crate::model::{measures, Document, Element};

/// Half-open measure range of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionBoundary {
    pub start: usize,
    /// Exclusive end; `None` when the section runs to the end of the part
    pub end: Option<usize>,
}

impl SectionBoundary {
    pub fn contains(&self, measure_index: usize) -> bool {
        measure_index >= self.start && self.end.map_or(true, |end| measure_index < end)
    }

    /// Concrete range for a part with `measure_count` measures.
    pub fn range(&self, measure_count: usize) -> Range<usize> {
        let end = self.end.unwrap_or(measure_count).min(measure_count);
        self.start.min(end)..end
    }
}

/// Non-empty `<words>` texts of a measure's directions, in order.
fn measure_words(measure: &Element) -> Vec<&str> {
    let mut words = Vec::new();
    for direction in measure.children_named("direction") {
        let mut found = Vec::new();
        direction.descendants_named("words", &mut found);
        words.extend(
            found
                .into_iter()
                .filter_map(|w| w.text())
                .map(str::trim)
                .filter(|t| !t.is_empty()),
        );
    }
    words
}

/// Find the section labelled with `keyword` (case-insensitive substring)
/// in one part.
pub fn locate_section(part: &Element, keyword: &str) -> Option<SectionBoundary> {
    let needle = keyword.to_lowercase();
    let mut start: Option<usize> = None;
    let mut markers: Vec<usize> = Vec::new();

    for (index, measure) in measures(part).enumerate() {
        for text in measure_words(measure) {
            if start.is_none() && text.to_lowercase().contains(&needle) {
                start = Some(index);
            }
            markers.push(index);
        }
    }

    let start = start?;
    let end = markers.into_iter().filter(|&m| m > start).min();
    Some(SectionBoundary { start, end })
}

/// First part (in document order) that contains the section.
pub fn locate_in_document(doc: &Document, keyword: &str) -> Option<(usize, SectionBoundary)> {
    let found = doc
        .parts()
        .enumerate()
        .find_map(|(i, part)| locate_section(part, keyword).map(|b| (i, b)));
    debug!("section '{keyword}': {found:?}");
    found
}
