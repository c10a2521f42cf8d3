use std::collections::BTreeMap;

use crate::catalog::{EpisodeCatalog, EpisodeEntry};
use crate::dom::{Document, NodeId};
use crate::season;

/// Season-block headings carry ids like "Saison_1", "Saison_2", ...
const SEASON_ID_FRAGMENT: &str = "Saison_";
/// Per-episode headings carry ids like "Épisode_1", "Épisode_2", ...
const EPISODE_ID_PREFIX: &str = "Épisode_";
/// The page title node.
const PAGE_TITLE_ID: &str = "title_0";
const TITLE_COLUMN_KEYWORD: &str = "Titre";
const NUMBER_COLUMN_KEYWORD: &str = "No";
const EPISODE_KEYWORD: &str = "Épisode";
const SUMMARY_LABEL: &str = "Résumé détaillé";

/// Shape of one season block's body, probed once per block.
enum SeasonBlockKind {
    Table,
    OrderedList,
    Empty,
}

fn probe_block_kind(doc: &Document, body: NodeId) -> SeasonBlockKind {
    if !doc.descendants_by_tag(body, "table").is_empty() {
        SeasonBlockKind::Table
    } else if !doc.descendants_by_tag(body, "ol").is_empty() {
        SeasonBlockKind::OrderedList
    } else {
        SeasonBlockKind::Empty
    }
}

/// The block body is the collapsible container enclosing the heading,
/// reached as parent-of-parent of the id-carrying node.
fn season_block_body(doc: &Document, heading: NodeId) -> Option<NodeId> {
    doc.parent(doc.parent(heading)?)
}

/// Leading decimal number of a cell or heading fragment, ignoring
/// surrounding text such as "12 (2-3)".
fn leading_number(text: &str) -> Option<u32> {
    let digits: String = text
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Episode rows of a tabular season block, in row order.
///
/// The title column is located by header keyword; an explicit episode-number
/// column is optional. Rows whose title cell has no nested element are
/// section/spacer rows and are skipped without counting. When no explicit
/// number is available (or a cell does not parse), the 1-based position
/// among kept rows is used instead.
fn list_table_episodes(doc: &Document, body: NodeId) -> Vec<(String, u32)> {
    let Some(&table) = doc.descendants_by_tag(body, "table").first() else {
        return Vec::new();
    };

    let header_cells = doc.descendants_by_tag(table, "th");
    let title_column = header_cells
        .iter()
        .position(|&cell| doc.text(cell).trim().starts_with(TITLE_COLUMN_KEYWORD));
    let Some(title_column) = title_column else {
        log::warn!("Season table has no \"{}\" header, skipping block", TITLE_COLUMN_KEYWORD);
        return Vec::new();
    };
    let number_column = header_cells
        .iter()
        .position(|&cell| doc.text(cell).trim().starts_with(NUMBER_COLUMN_KEYWORD));

    let mut episodes: Vec<(String, u32)> = Vec::new();
    for row in doc.descendants_by_tag(table, "tr") {
        let cells = doc.children(row);
        let Some(&title_cell) = cells.get(title_column) else {
            continue;
        };
        let Some(&title_node) = doc.children(title_cell).first() else {
            continue; // header or spacer row
        };
        let title = doc.text(title_node).trim().to_string();
        if title.is_empty() {
            continue;
        }

        let positional = episodes.len() as u32 + 1;
        let episode_number = number_column
            .and_then(|column| cells.get(column).copied())
            .and_then(|cell| leading_number(doc.text(cell)))
            .unwrap_or(positional);
        episodes.push((title, episode_number));
    }
    episodes
}

/// Episode items of an ordered-list season block, numbered positionally.
/// A trailing parenthetical aside (air date etc.) is stripped from the title.
fn list_ordered_episodes(doc: &Document, body: NodeId) -> Vec<(String, u32)> {
    let mut episodes: Vec<(String, u32)> = Vec::new();
    for ol in doc.descendants_by_tag(body, "ol") {
        for &item in doc.children(ol) {
            if doc.tag(item) != "li" {
                continue;
            }
            let text = doc.text(item);
            let title = text.split(" (").next().unwrap_or_default().trim().to_string();
            if title.is_empty() {
                continue;
            }
            let episode_number = episodes.len() as u32 + 1;
            episodes.push((title, episode_number));
        }
    }
    episodes
}

/// Nearest enclosing season heading of a per-episode heading: walk up the
/// ancestor chain and resolve the first season-heading descendant found.
fn enclosing_season(doc: &Document, header: NodeId) -> Option<u32> {
    let mut current = doc.parent(header);
    while let Some(node) = current {
        if let Some(&heading) = doc.descendants_by_id_contains(node, SEASON_ID_FRAGMENT).first() {
            return season::season_from_text(doc.text(heading));
        }
        current = doc.parent(node);
    }
    None
}

/// Optional "Résumé détaillé" field of an episode block. The layout
/// convention is label, separator, value as consecutive element siblings;
/// a missing label or sibling simply omits the summary.
fn detailed_summary(doc: &Document, header: NodeId) -> Option<String> {
    let details = season_block_body(doc, header)?;
    let &block = doc.children(details).get(1)?;
    let label = doc
        .descendants_by_tag(block, "b")
        .into_iter()
        .find(|&bold| doc.text(bold).trim() == SUMMARY_LABEL)?;

    let siblings = doc.children(doc.parent(label)?);
    let label_index = siblings.iter().position(|&node| node == label)?;
    let &value = siblings.get(label_index + 2)?;

    let summary = doc.text(value).trim().to_string();
    if summary.is_empty() {
        None
    } else {
        Some(summary)
    }
}

/// Per-episode heading extraction, used on documents without season blocks
/// (and on hybrid documents, after the season-block pass).
///
/// The page-title season number is resolved once and threaded into every
/// heading; headings falling outside it resolve against their nearest
/// enclosing season heading.
fn list_header_episodes(doc: &Document, headings: &[NodeId]) -> Vec<EpisodeEntry> {
    let title_season = doc
        .find_by_id_prefix(PAGE_TITLE_ID)
        .first()
        .and_then(|&node| season::season_from_text(doc.text(node)));

    let mut entries = Vec::new();
    for &heading in headings {
        let text = doc.text(heading);
        let Some((number_part, title_part)) = text.split_once(':') else {
            log::warn!("Skipping episode heading without a title: {:?}", text.trim());
            continue;
        };
        let title = title_part.trim().to_string();
        if title.is_empty() {
            log::warn!("Skipping episode heading with an empty title: {:?}", text.trim());
            continue;
        }
        let Some(episode_number) = leading_number(&number_part.replace(EPISODE_KEYWORD, "")) else {
            log::warn!("Skipping episode heading without a number: {:?}", text.trim());
            continue;
        };
        let Some(season_number) = title_season.or_else(|| enclosing_season(doc, heading)) else {
            log::warn!("Skipping episode {:?}: season number unresolved", title);
            continue;
        };

        let mut entry = EpisodeEntry::new(title, season_number, episode_number);
        entry.summary = detailed_summary(doc, heading);
        entries.push(entry);
    }
    entries
}

/// Run every applicable extraction path over the document and merge the
/// results into one catalog.
///
/// Season-block entries are accumulated first, per-episode-heading entries
/// second; within one run the title is the deduplication key and the later
/// write wins. The final order is plain string order over the formatted
/// codes.
pub fn extract_catalog(doc: &Document) -> EpisodeCatalog {
    let season_headings = doc.find_by_id_contains(SEASON_ID_FRAGMENT);
    let episode_headings = doc.find_by_id_prefix(EPISODE_ID_PREFIX);
    let page_title = doc
        .find_by_id_prefix(PAGE_TITLE_ID)
        .first()
        .map(|&node| doc.text(node).to_string());

    let mut merged: BTreeMap<String, EpisodeEntry> = BTreeMap::new();

    for (index, &heading) in season_headings.iter().enumerate() {
        let heading_text = doc.text(heading);
        let Some(season_number) =
            season::resolve_season(heading_text, Some(index), page_title.as_deref())
        else {
            log::warn!(
                "Skipping season block {:?}: season number unresolved",
                heading_text.trim()
            );
            continue;
        };
        let Some(body) = season_block_body(doc, heading) else {
            continue;
        };

        let pairs = match probe_block_kind(doc, body) {
            SeasonBlockKind::Table => list_table_episodes(doc, body),
            SeasonBlockKind::OrderedList => list_ordered_episodes(doc, body),
            SeasonBlockKind::Empty => Vec::new(),
        };
        for (title, episode_number) in pairs {
            let entry = EpisodeEntry::new(title, season_number, episode_number);
            merged.insert(entry.title.clone(), entry);
        }
    }

    for entry in list_header_episodes(doc, &episode_headings) {
        merged.insert(entry.title.clone(), entry);
    }

    EpisodeCatalog::from_merged(merged)
}
