//! Define the Gherkin keyword vocabulary understood by the lexer.
//!
//! A stable identifier ([`KeywordId`]) plus a const metadata table ([`KEYWORDS`]) recording the
//! canonical spelling and accepted aliases of every keyword.
//!
//! ## Notes
//! - Lookup is **case-sensitive**, as in Gherkin.
//! - Block keywords are written with a trailing colon in source (`Feature:`); step keywords are
//!   followed by a space (`Given `). The colon / space is not part of the spelling stored here.
//!
//! ## Examples
//! ```rust
//! use featuredoc_syntax::keywords::{self, KeywordId};
//!
//! assert_eq!(keywords::block_from_str("Scenario Template"), Some(KeywordId::ScenarioOutline));
//! assert_eq!(keywords::as_str(KeywordId::ScenarioOutline), "Scenario Outline");
//! ```

/// Stable identifier for every keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordId {
    // Blocks
    Feature,
    Rule,
    Background,
    Scenario,
    ScenarioOutline,
    Examples,

    // Steps
    Given,
    When,
    Then,
    And,
    But,
    Star,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordCategory {
    Block,
    Step,
}

/// Metadata for a keyword.
#[derive(Debug, Clone, Copy)]
pub struct KeywordInfo {
    pub id: KeywordId,
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    pub category: KeywordCategory,
}

/// Registry of all keywords.
///
/// Longer spellings that share a prefix with shorter ones (`Scenario Outline` vs `Scenario`) are
/// resolved by the lexer, which always matches the longest block keyword first.
pub const KEYWORDS: &[KeywordInfo] = &[
    info(KeywordId::Feature, "Feature", &["Business Need", "Ability"], KeywordCategory::Block),
    info(KeywordId::Rule, "Rule", &[], KeywordCategory::Block),
    info(KeywordId::Background, "Background", &[], KeywordCategory::Block),
    info(KeywordId::Scenario, "Scenario", &["Example"], KeywordCategory::Block),
    info(
        KeywordId::ScenarioOutline,
        "Scenario Outline",
        &["Scenario Template"],
        KeywordCategory::Block,
    ),
    info(KeywordId::Examples, "Examples", &["Scenarios"], KeywordCategory::Block),
    info(KeywordId::Given, "Given", &[], KeywordCategory::Step),
    info(KeywordId::When, "When", &[], KeywordCategory::Step),
    info(KeywordId::Then, "Then", &[], KeywordCategory::Step),
    info(KeywordId::And, "And", &[], KeywordCategory::Step),
    info(KeywordId::But, "But", &[], KeywordCategory::Step),
    info(KeywordId::Star, "*", &[], KeywordCategory::Step),
];

const fn info(
    id: KeywordId,
    canonical: &'static str,
    aliases: &'static [&'static str],
    category: KeywordCategory,
) -> KeywordInfo {
    KeywordInfo {
        id,
        canonical,
        aliases,
        category,
    }
}

/// Canonical spelling of a keyword.
pub fn as_str(id: KeywordId) -> &'static str {
    info_for(id).canonical
}

/// Metadata for a keyword id.
pub fn info_for(id: KeywordId) -> &'static KeywordInfo {
    KEYWORDS
        .iter()
        .find(|k| k.id == id)
        .expect("INVARIANT: every KeywordId has a registry entry")
}

fn lookup(spelling: &str, category: KeywordCategory) -> Option<KeywordId> {
    KEYWORDS
        .iter()
        .filter(|k| k.category == category)
        .find(|k| k.canonical == spelling || k.aliases.contains(&spelling))
        .map(|k| k.id)
}

/// Resolve a block keyword spelling (without the colon).
pub fn block_from_str(spelling: &str) -> Option<KeywordId> {
    lookup(spelling, KeywordCategory::Block)
}

/// Resolve a step keyword spelling.
pub fn step_from_str(spelling: &str) -> Option<KeywordId> {
    lookup(spelling, KeywordCategory::Step)
}

/// Every block spelling (canonical and aliases), longest first.
pub fn block_spellings() -> Vec<(&'static str, KeywordId)> {
    let mut spellings: Vec<(&'static str, KeywordId)> = KEYWORDS
        .iter()
        .filter(|k| k.category == KeywordCategory::Block)
        .flat_map(|k| std::iter::once(k.canonical).chain(k.aliases.iter().copied()).map(move |s| (s, k.id)))
        .collect();
    spellings.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    spellings
}

/// Every step spelling.
pub fn step_spellings() -> impl Iterator<Item = (&'static str, KeywordId)> {
    KEYWORDS
        .iter()
        .filter(|k| k.category == KeywordCategory::Step)
        .map(|k| (k.canonical, k.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_id_has_an_entry() {
        let ids = [
            KeywordId::Feature,
            KeywordId::Rule,
            KeywordId::Background,
            KeywordId::Scenario,
            KeywordId::ScenarioOutline,
            KeywordId::Examples,
            KeywordId::Given,
            KeywordId::When,
            KeywordId::Then,
            KeywordId::And,
            KeywordId::But,
            KeywordId::Star,
        ];
        for id in ids {
            assert_eq!(info_for(id).id, id);
        }
    }

    #[test]
    fn test_aliases_resolve() {
        assert_eq!(block_from_str("Example"), Some(KeywordId::Scenario));
        assert_eq!(block_from_str("Scenarios"), Some(KeywordId::Examples));
        assert_eq!(block_from_str("Given"), None);
        assert_eq!(step_from_str("Given"), Some(KeywordId::Given));
    }

    #[test]
    fn test_block_spellings_longest_first() {
        let spellings = block_spellings();
        let outline = spellings.iter().position(|(s, _)| *s == "Scenario Outline").unwrap();
        let scenario = spellings.iter().position(|(s, _)| *s == "Scenario").unwrap();
        assert!(outline < scenario);
    }
}
