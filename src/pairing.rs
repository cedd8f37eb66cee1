//! Pair base notes with the target notes they are measured against.
//!
//! A base prefers a target sounding at the same onset in another voice,
//! and otherwise takes the next target in another voice that starts
//! later in the measure. Targets are not consumed: two bases may end up
//! pointing at the same target.

use std::collections::BTreeMap;

use crate::timeline::{NoteEvent, Role, RoleClassifier};

/// Indices into the event slice passed to [`pair_events`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventPair {
    pub base: usize,
    pub target: usize,
}

pub fn pair_events(events: &[NoteEvent], classifier: &RoleClassifier) -> Vec<EventPair> {
    let mut by_onset: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (i, e) in events.iter().enumerate() {
        by_onset.entry(e.onset).or_default().push(i);
    }

    let is_target_for = |candidate: usize, base: usize| {
        classifier.classify(&events[candidate]) == Role::Target
            && events[candidate].voice != events[base].voice
    };

    let mut pairs = Vec::new();
    for (&onset, group) in &by_onset {
        for &base in group {
            if classifier.classify(&events[base]) != Role::Base {
                continue;
            }

            let same_onset = group.iter().copied().find(|&t| is_target_for(t, base));
            let target = same_onset.or_else(|| {
                by_onset
                    .range(onset + 1..)
                    .flat_map(|(_, later)| later.iter().copied())
                    .find(|&t| is_target_for(t, base))
            });

            if let Some(target) = target {
                pairs.push(EventPair { base, target });
            }
        }
    }
    pairs
}
