//! Recommendation lookup table.
//!
//! Rules are tested in declaration order against a room's observations. The
//! first rule with a keyword occurring in any observation wins; if none does,
//! the room gets the fallback line. One line per room, never one per
//! observation.

use serde::{Deserialize, Serialize};

use ddr_contracts::error::{DdrError, DdrResult};

/// A keyword-keyed recommendation line.
///
/// Example in TOML:
/// ```toml
/// [[recommendations.rules]]
/// category = "dampness"
/// keywords = ["dampness", "moisture"]
/// text = "Treat the damp surfaces with a waterproof coating."
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecommendationRule {
    /// Stable category name, reported alongside the chosen line.
    pub category: String,

    /// Matched case-insensitively as substrings of the observation text.
    pub keywords: Vec<String>,

    pub text: String,
}

impl RecommendationRule {
    /// Return true if any keyword occurs in `observation`, ignoring case.
    pub fn matches(&self, observation: &str) -> bool {
        let haystack = observation.to_lowercase();
        self.keywords
            .iter()
            .any(|kw| haystack.contains(&kw.to_lowercase()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecommendationTable {
    /// Ordered list of rules. First match wins.
    #[serde(default)]
    pub rules: Vec<RecommendationRule>,

    /// Consolidated line for rooms no rule matches.
    pub fallback: String,
}

impl RecommendationTable {
    /// The first rule matching any of `observations`, or `None` for the fallback.
    pub fn select<S: AsRef<str>>(&self, observations: &[S]) -> Option<&RecommendationRule> {
        self.rules
            .iter()
            .find(|rule| observations.iter().any(|obs| rule.matches(obs.as_ref())))
    }

    pub fn validate(&self) -> DdrResult<()> {
        if self.fallback.trim().is_empty() {
            return Err(DdrError::Config {
                reason: "recommendations.fallback must not be empty".to_string(),
            });
        }
        for rule in &self.rules {
            if rule.keywords.iter().all(|kw| kw.trim().is_empty()) {
                return Err(DdrError::Config {
                    reason: format!(
                        "recommendation rule '{}' needs at least one keyword",
                        rule.category
                    ),
                });
            }
            if rule.text.trim().is_empty() {
                return Err(DdrError::Config {
                    reason: format!("recommendation rule '{}' has empty text", rule.category),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(category: &str, keywords: &[&str]) -> RecommendationRule {
        RecommendationRule {
            category: category.to_string(),
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            text: format!("fix {category}"),
        }
    }

    fn table() -> RecommendationTable {
        RecommendationTable {
            rules: vec![rule("seepage", &["seepage", "leak"]), rule("dampness", &["damp"])],
            fallback: "inspect on site".to_string(),
        }
    }

    #[test]
    fn first_matching_rule_wins() {
        let table = table();
        // Both rules match; declaration order decides.
        let chosen = table.select(&["Skirting DAMPNESS", "Seepage below sink"]).unwrap();
        assert_eq!(chosen.category, "seepage");
    }

    #[test]
    fn keyword_match_ignores_case() {
        let table = table();
        let chosen = table.select(&["Hall Skirting level Dampness"]).unwrap();
        assert_eq!(chosen.category, "dampness");
    }

    #[test]
    fn no_match_selects_fallback() {
        let table = table();
        assert!(table.select(&["Tile hollowness near door"]).is_none());
        assert!(table.select::<&str>(&[]).is_none());
    }

    #[test]
    fn rule_without_keywords_is_rejected() {
        let mut table = table();
        table.rules.push(rule("empty", &[" "]));
        match table.validate() {
            Err(DdrError::Config { reason }) => assert!(reason.contains("'empty'"), "{reason}"),
            other => panic!("expected Config error, got {other:?}"),
        }
    }
}
