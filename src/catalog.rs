use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// One extracted episode. The title doubles as the merge key when the
/// extraction paths are combined, and `formatted_code` is always derived
/// from `(season, episode)` via [`format_episode_code`].
#[derive(Debug, PartialEq, Clone)]
pub struct EpisodeEntry {
    pub title: String,
    pub season: u32,
    pub episode: u32,
    pub formatted_code: String,
    /// Only populated by the per-episode heading path.
    pub summary: Option<String>,
}

impl EpisodeEntry {
    pub fn new(title: String, season: u32, episode: u32) -> Self {
        let formatted_code = format_episode_code(season, episode);
        EpisodeEntry {
            title,
            season,
            episode,
            formatted_code,
            summary: None,
        }
    }
}

/// Canonical `SxxExx` episode code, fixed 2-digit zero padding.
/// Lexicographic order over these codes matches numeric order as long as
/// season and episode stay below 100.
pub fn format_episode_code(season: u32, episode: u32) -> String {
    format!("S{:02}E{:02}", season, episode)
}

/// Final extraction result: entries sorted by formatted code.
#[derive(Debug, PartialEq)]
pub struct EpisodeCatalog {
    entries: Vec<EpisodeEntry>,
}

impl EpisodeCatalog {
    /// Build the catalog from the title-keyed merge map. The map already
    /// applied last-write-wins on title collisions; here we only impose the
    /// output order. `sort_by` is stable, so entries sharing a code keep the
    /// map's title order and the result is deterministic.
    pub fn from_merged(merged: BTreeMap<String, EpisodeEntry>) -> Self {
        let mut entries: Vec<EpisodeEntry> = merged.into_values().collect();
        entries.sort_by(|a, b| a.formatted_code.cmp(&b.formatted_code));
        EpisodeCatalog { entries }
    }

    pub fn entries(&self) -> &[EpisodeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Wire format inherited from the downstream pipeline, including the
// historical "detailledSummary" spelling.
#[derive(Serialize)]
struct EntryBody<'a> {
    #[serde(rename = "formattedEpisode")]
    formatted_episode: &'a str,
    #[serde(rename = "detailledSummary", skip_serializing_if = "Option::is_none")]
    detailled_summary: Option<&'a str>,
}

impl Serialize for EpisodeCatalog {
    /// Serializes as a mapping `title -> { formattedEpisode, detailledSummary? }`.
    /// Insertion order is the sorted-by-code order; consumers that care about
    /// ordering rely on it being preserved.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            let body = EntryBody {
                formatted_episode: &entry.formatted_code,
                detailled_summary: entry.summary.as_deref(),
            };
            map.serialize_entry(&entry.title, &body)?;
        }
        map.end()
    }
}
