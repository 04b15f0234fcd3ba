//! Deterministic relevance ranking for suggestion lists.
//!
//! Matching is case-insensitive and NFC-normalized across the English
//! name, the Vietnamese name, and the display subtitle. Ranking looks at
//! the English name only: an exact name match outranks a name prefix
//! match, which outranks everything else. Ties within a band resolve
//! alphabetically by folded English name, and the sort is stable, so
//! equal keys keep their input order. The same query against the same
//! records always yields the same list.

use crate::text::{contains_fold, eq_fold, fold, starts_with_fold};
use crate::types::Suggestion;

/// Relevance band for a single suggestion, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTier {
    /// English name equals the query.
    Exact,
    /// English name starts with the query.
    Prefix,
    /// Matched through a name substring, the Vietnamese name, or the
    /// subtitle.
    Contains,
}

impl MatchTier {
    /// Classify a suggestion against a folded query.
    #[must_use]
    pub fn classify(suggestion: &Suggestion, folded_query: &str) -> Self {
        let name_en = &suggestion.name.en;
        if eq_fold(name_en, folded_query) {
            Self::Exact
        } else if starts_with_fold(name_en, folded_query) {
            Self::Prefix
        } else {
            Self::Contains
        }
    }
}

/// Whether a suggestion matches a folded query at all.
///
/// The query must already be folded (see [`crate::text::fold`]); the
/// suggestion's fields are folded here.
#[must_use]
pub fn query_matches(suggestion: &Suggestion, folded_query: &str) -> bool {
    contains_fold(&suggestion.name.en, folded_query)
        || contains_fold(&suggestion.name.vi, folded_query)
        || contains_fold(&suggestion.subtitle, folded_query)
}

/// Filter, order, and truncate suggestions for a query.
///
/// Truncation happens after ordering, so the strongest matches survive
/// even when far more records match than the limit allows.
#[must_use]
pub fn filter_and_rank(
    items: impl IntoIterator<Item = Suggestion>,
    folded_query: &str,
    limit: usize,
) -> Vec<Suggestion> {
    let mut decorated: Vec<(MatchTier, String, Suggestion)> = items
        .into_iter()
        .filter(|item| query_matches(item, folded_query))
        .map(|item| {
            let tier = MatchTier::classify(&item, folded_query);
            let sort_name = fold(&item.name.en);
            (tier, sort_name, item)
        })
        .collect();

    decorated.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    decorated.truncate(limit);

    decorated.into_iter().map(|(_, _, item)| item).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::types::{LocalizedText, SuggestionKind};
    use proptest::prelude::*;

    fn character(en: &str, vi: &str, subtitle: &str) -> Suggestion {
        Suggestion {
            id: format!("character-{}", en.to_lowercase().replace(' ', "-")),
            kind: SuggestionKind::Character,
            name: LocalizedText::new(en, vi),
            slug: en.to_lowercase().replace(' ', "-"),
            image: None,
            subtitle: subtitle.to_string(),
            role: None,
            element: None,
            weapon: None,
            weapon_type: None,
            rarity: None,
            description: None,
        }
    }

    fn names(results: &[Suggestion]) -> Vec<&str> {
        results.iter().map(|s| s.name.en.as_str()).collect()
    }

    #[test]
    fn test_tier_classification() {
        let hilda = character("Hilda", "Hilda", "Support • Sound • Sword");

        assert_eq!(MatchTier::classify(&hilda, "hilda"), MatchTier::Exact);
        assert_eq!(MatchTier::classify(&hilda, "hild"), MatchTier::Prefix);
        assert_eq!(MatchTier::classify(&hilda, "ilda"), MatchTier::Contains);
        // Subtitle matches always land in the weakest band
        assert_eq!(MatchTier::classify(&hilda, "sword"), MatchTier::Contains);
    }

    #[test]
    fn test_tier_ordering() {
        assert!(MatchTier::Exact < MatchTier::Prefix);
        assert!(MatchTier::Prefix < MatchTier::Contains);
    }

    #[test]
    fn test_prefix_matches_rank_before_substring_matches() {
        // Given: Records where the query is a prefix of some names and an
        // inner substring of another
        let items = vec![
            character("Wild Hunter", "Thợ Săn Hoang Dã", "Vanguard • Wind • Bow"),
            character("Hildegard", "Hildegard", "Support • Light • Staff"),
            character("Hilda", "Hilda", "Support • Sound • Sword"),
        ];

        // When: Ranking for the query "hild"
        let results = filter_and_rank(items, "hild", 10);

        // Then: Prefix matches come first, alphabetically, then the rest
        assert_eq!(names(&results), vec!["Hilda", "Hildegard", "Wild Hunter"]);
    }

    #[test]
    fn test_exact_match_outranks_prefix() {
        let items = vec![
            character("Novalight", "Novalight", "Support • Light • Staff"),
            character("Nova", "Nova", "Annihilator • Dark • Sniper"),
        ];

        let results = filter_and_rank(items, "nova", 10);

        assert_eq!(names(&results), vec!["Nova", "Novalight"]);
    }

    #[test]
    fn test_vietnamese_name_match_survives_filter() {
        let items = vec![
            character("Outsider", "Kẻ Ngoại Đạo", "Vanguard • Dark • Sword"),
            character("Nova", "Nova", "Annihilator • Dark • Sniper"),
        ];

        let results = filter_and_rank(items, "ngoại", 10);

        assert_eq!(names(&results), vec!["Outsider"]);
    }

    #[test]
    fn test_subtitle_match_survives_filter() {
        let items = vec![
            character("Zephyr", "Zephyr", "Vanguard • Wind • Spear"),
            character("Hilda", "Hilda", "Support • Sound • Sword"),
        ];

        let results = filter_and_rank(items, "wind", 10);

        assert_eq!(names(&results), vec!["Zephyr"]);
    }

    #[test]
    fn test_truncation_happens_after_ordering() {
        // Given: More matches than the limit, with the exact match listed last
        let items = vec![
            character("Lunaria", "Lunaria", "Support • Moon • Staff"),
            character("Lunatic Edge", "Lunatic Edge", "Vanguard • Dark • Sword"),
            character("Luna", "Luna", "Support • Moon • Staff"),
        ];

        // When: Ranking with a limit of 1
        let results = filter_and_rank(items, "luna", 1);

        // Then: The exact match survives the cut
        assert_eq!(names(&results), vec!["Luna"]);
    }

    #[test]
    fn test_no_matches_yields_empty() {
        let items = vec![character("Hilda", "Hilda", "Support • Sound • Sword")];

        let results = filter_and_rank(items, "qqqq", 10);

        assert!(results.is_empty());
    }

    #[test]
    fn test_zero_limit_yields_empty() {
        let items = vec![character("Hilda", "Hilda", "Support • Sound • Sword")];

        let results = filter_and_rank(items, "hilda", 0);

        assert!(results.is_empty());
    }

    #[test]
    fn test_decomposed_query_matches_composed_name() {
        let items = vec![character(
            "Judgement Edge",
            "Lưỡi Kiếm Phán Xét",
            "Sword • SSR",
        )];

        // "Kiê" typed with a combining circumflex instead of the composed char
        let query = crate::text::normalize_query("kie\u{0302}m");
        let results = filter_and_rank(items, &query, 10);

        assert_eq!(names(&results), vec!["Judgement Edge"]);
    }

    proptest! {
        #[test]
        fn prop_results_never_exceed_limit(
            limit in 0usize..20,
            query in "[a-z]{1,8}",
        ) {
            let items = vec![
                character("Hilda", "Hilda", "Support • Sound • Sword"),
                character("Zephyr", "Zephyr", "Vanguard • Wind • Spear"),
                character("Nova", "Nova", "Annihilator • Dark • Sniper"),
                character("Luna", "Luna", "Support • Moon • Staff"),
            ];

            let results = filter_and_rank(items, &query, limit);

            prop_assert!(results.len() <= limit);
        }

        #[test]
        fn prop_every_result_matches_query(query in "[a-z]{1,6}") {
            let items = vec![
                character("Hilda", "Hilda", "Support • Sound • Sword"),
                character("Zephyr", "Zephyr", "Vanguard • Wind • Spear"),
                character("Outsider", "Kẻ Ngoại Đạo", "Vanguard • Dark • Sword"),
            ];

            let results = filter_and_rank(items, &query, 10);

            for result in &results {
                prop_assert!(query_matches(result, &query));
            }
        }

        #[test]
        fn prop_tiers_never_weaken_down_the_list(query in "[a-z]{1,6}") {
            let items = vec![
                character("Hilda", "Hilda", "Support • Sound • Sword"),
                character("Hildegard", "Hildegard", "Support • Light • Staff"),
                character("Wild Hunter", "Thợ Săn Hoang Dã", "Vanguard • Wind • Bow"),
                character("Nova", "Nova", "Annihilator • Dark • Sniper"),
            ];

            let results = filter_and_rank(items, &query, 10);

            let tiers: Vec<MatchTier> = results
                .iter()
                .map(|s| MatchTier::classify(s, &query))
                .collect();
            for pair in tiers.windows(2) {
                prop_assert!(pair[0] <= pair[1]);
            }
        }
    }
}
