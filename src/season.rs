use regex::Regex;

lazy_static! {
    /// Numeric season pattern as written on the pages, e.g. "Saison 3".
    pub static ref SEASON_NUMBER_RE: Regex = Regex::new(r"Saison (\d+)").unwrap();
}

// Spelled-out season headings ("Deuxième saison"). Position = season number.
const ORDINAL_SEASONS: [&str; 7] = [
    "première",
    "deuxième",
    "troisième",
    "quatrième",
    "cinquième",
    "sixième",
    "septième",
];

/// Season number carried by a piece of text: numeric "Saison N" first,
/// then the ordinal-word table.
pub fn season_from_text(text: &str) -> Option<u32> {
    if let Some(captures) = SEASON_NUMBER_RE.captures(text) {
        return captures.get(1).and_then(|m| m.as_str().parse().ok());
    }
    let lowered = text.to_lowercase();
    ORDINAL_SEASONS
        .iter()
        .position(|word| lowered.contains(word))
        .map(|index| index as u32 + 1)
}

/// Resolve the season number of one season block, first success wins:
///
/// 1. numeric pattern in the heading text;
/// 2. ordinal-word lookup in the heading text;
/// 3. positional fallback (index within the block sequence + 1);
/// 4. numeric pattern in the page title (single-season documents).
///
/// `None` means no strategy succeeded; callers skip the block and warn
/// instead of emitting a malformed code.
pub fn resolve_season(
    heading_text: &str,
    position: Option<usize>,
    page_title: Option<&str>,
) -> Option<u32> {
    season_from_text(heading_text)
        .or_else(|| position.map(|index| index as u32 + 1))
        .or_else(|| page_title.and_then(season_from_text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_season() {
        assert_eq!(season_from_text("Saison 3"), Some(3));
        assert_eq!(season_from_text("Saison 12 (2021)"), Some(12));
        assert_eq!(season_from_text("Générique"), None);
    }

    #[test]
    fn test_ordinal_season() {
        assert_eq!(season_from_text("Première saison"), Some(1));
        assert_eq!(season_from_text("Deuxième saison"), Some(2));
        assert_eq!(season_from_text("Septième saison"), Some(7));
        // Numeric wins over an ordinal word in the same heading.
        assert_eq!(season_from_text("Deuxième partie - Saison 4"), Some(4));
    }

    #[test]
    fn test_positional_fallback() {
        assert_eq!(resolve_season("Intrigue", Some(0), None), Some(1));
        assert_eq!(resolve_season("Intrigue", Some(4), None), Some(5));
        // The heading beats the position when it parses.
        assert_eq!(resolve_season("Saison 3", Some(0), None), Some(3));
        assert_eq!(resolve_season("Deuxième saison", Some(4), None), Some(2));
    }

    #[test]
    fn test_title_fallback() {
        assert_eq!(
            resolve_season("Épisodes", None, Some("Les Héros - Saison 2")),
            Some(2)
        );
        assert_eq!(resolve_season("Épisodes", None, Some("Les Héros")), None);
        assert_eq!(resolve_season("Épisodes", None, None), None);
    }
}
