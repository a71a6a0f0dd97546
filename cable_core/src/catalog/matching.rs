//! # Catalog Matching
//!
//! Suggests catalog rows for free-form input rows (a target size, a required
//! current and/or a description hint). Each present criterion contributes a
//! sub-score in `[0, 1]`:
//!
//! | Criterion | Weight | Sub-score |
//! |-----------|--------|-----------|
//! | target CSA `t` | 0.5 | `1 / (1 + |csa − t| / t)` |
//! | required current `I` | 0.4 | `I / rating` when `rating ≥ I`, else 0 |
//! | description hint | 0.1 | 1 on case-insensitive substring match, else 0 |
//!
//! The row score is the weighted mean over the criteria present. Suggestions
//! are ordered by descending score, then ascending CSA.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CableCatalog, CatalogEntry};
use crate::equations::round_to;

const CSA_WEIGHT: f64 = 0.5;
const CURRENT_WEIGHT: f64 = 0.4;
const DESCRIPTION_WEIGHT: f64 = 0.1;

/// Input row for matching. Unknown fields are ignored so sizing results or
/// spreadsheet exports can be fed in directly.
///
/// Each criterion reads from one name per row: a row carrying both `csa`
/// and `selected_csa` (or both `current` and `derated_current`) is rejected
/// as a duplicate field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchRow {
    pub cable_number: Option<String>,
    /// Target conductor size (mm²)
    #[serde(alias = "selected_csa", alias = "csa_mm2")]
    pub csa: Option<f64>,
    /// Current the cable must carry (A)
    #[serde(alias = "derated_current", alias = "required_current")]
    pub current: Option<f64>,
    /// Free-text hint matched against catalog descriptions
    #[serde(alias = "hint")]
    pub description: Option<String>,
}

impl MatchRow {
    fn has_criteria(&self) -> bool {
        self.target_csa().is_some() || self.required_current().is_some() || self.hint().is_some()
    }

    fn target_csa(&self) -> Option<f64> {
        self.csa.filter(|v| v.is_finite() && *v > 0.0)
    }

    fn required_current(&self) -> Option<f64> {
        self.current.filter(|v| v.is_finite() && *v > 0.0)
    }

    fn hint(&self) -> Option<String> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// Weighted score of `entry` for this row, rounded to 4 dp.
    pub fn score(&self, entry: &CatalogEntry) -> f64 {
        let mut weighted = 0.0;
        let mut weights = 0.0;

        if let Some(target) = self.target_csa() {
            weighted += CSA_WEIGHT / (1.0 + (entry.csa - target).abs() / target);
            weights += CSA_WEIGHT;
        }

        if let Some(required) = self.required_current() {
            if entry.current_rating >= required {
                weighted += CURRENT_WEIGHT * required / entry.current_rating;
            }
            weights += CURRENT_WEIGHT;
        }

        if let Some(hint) = self.hint() {
            if entry.description.to_lowercase().contains(&hint) {
                weighted += DESCRIPTION_WEIGHT;
            }
            weights += DESCRIPTION_WEIGHT;
        }

        if weights == 0.0 {
            return 0.0;
        }
        round_to(weighted / weights, 4)
    }
}

/// One suggested catalog row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogMatchSuggestion {
    pub score: f64,
    pub entry: CatalogEntry,
}

/// Suggestions for one input row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogMatchPerRow {
    pub row_index: usize,
    pub cable_number: String,
    pub suggestions: Vec<CatalogMatchSuggestion>,
}

/// Best `top_n` catalog rows for each input row, in input order.
///
/// A row without any usable criterion gets no suggestions.
///
/// # Example
///
/// ```rust
/// use cable_core::catalog::{builtin_catalog, match_rows, MatchRow};
///
/// let rows = vec![MatchRow { csa: Some(16.0), ..Default::default() }];
/// let matches = match_rows(&builtin_catalog(), &rows, 2);
/// assert_eq!(matches[0].suggestions[0].entry.csa, 16.0);
/// assert_eq!(matches[0].suggestions.len(), 2);
/// ```
pub fn match_rows(catalog: &CableCatalog, rows: &[MatchRow], top_n: usize) -> Vec<CatalogMatchPerRow> {
    rows.iter()
        .enumerate()
        .map(|(row_index, row)| {
            let suggestions = if row.has_criteria() {
                best_matches(catalog, row, top_n)
            } else {
                debug!(row_index, "match row has no criteria");
                Vec::new()
            };
            CatalogMatchPerRow {
                row_index,
                cable_number: row.cable_number.clone().unwrap_or_default(),
                suggestions,
            }
        })
        .collect()
}

fn best_matches(catalog: &CableCatalog, row: &MatchRow, top_n: usize) -> Vec<CatalogMatchSuggestion> {
    let mut scored: Vec<CatalogMatchSuggestion> = catalog
        .entries()
        .iter()
        .map(|entry| CatalogMatchSuggestion {
            score: row.score(entry),
            entry: entry.clone(),
        })
        .collect();

    scored.sort_by(|a, b| match b.score.total_cmp(&a.score) {
        Ordering::Equal => a.entry.csa.total_cmp(&b.entry.csa),
        other => other,
    });
    scored.truncate(top_n);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin_catalog;

    fn csas(row: &CatalogMatchPerRow) -> Vec<f64> {
        row.suggestions.iter().map(|s| s.entry.csa).collect()
    }

    #[test]
    fn test_target_csa_ranking() {
        let rows = vec![MatchRow {
            cable_number: Some("C-1".into()),
            csa: Some(16.0),
            ..Default::default()
        }];
        let matches = match_rows(&builtin_catalog(), &rows, 3);
        assert_eq!(matches[0].cable_number, "C-1");
        assert_eq!(csas(&matches[0]), vec![16.0, 10.0, 25.0]);
        assert_eq!(matches[0].suggestions[0].score, 1.0);
        assert_eq!(matches[0].suggestions[1].score, 0.7273);
    }

    #[test]
    fn test_current_with_hint() {
        let rows = vec![MatchRow {
            current: Some(43.63),
            description: Some("CU".into()),
            ..Default::default()
        }];
        let matches = match_rows(&builtin_catalog(), &rows, 1);
        // 10 mm² (57 A) is the tightest rating above 43.63 A
        assert_eq!(csas(&matches[0]), vec![10.0]);
        assert_eq!(matches[0].suggestions[0].score, 0.8124);
    }

    #[test]
    fn test_ties_ordered_by_csa() {
        let rows = vec![MatchRow {
            description: Some("mm²".into()),
            ..Default::default()
        }];
        let matches = match_rows(&builtin_catalog(), &rows, 3);
        assert_eq!(csas(&matches[0]), vec![1.5, 2.5, 4.0]);
    }

    #[test]
    fn test_row_without_criteria() {
        let rows = vec![MatchRow::default(), MatchRow { csa: Some(0.0), ..Default::default() }];
        let matches = match_rows(&builtin_catalog(), &rows, 3);
        assert_eq!(matches.len(), 2);
        assert!(matches[0].suggestions.is_empty());
        assert!(matches[1].suggestions.is_empty());
        assert_eq!(matches[1].row_index, 1);
    }

    #[test]
    fn test_aliases_and_unknown_fields() {
        let json = r#"{ "cable_number": "X", "selected_csa": 50, "derated_current": 120.0, "vdrop_ok": true }"#;
        let row: MatchRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.csa, Some(50.0));
        assert_eq!(row.current, Some(120.0));
    }

    #[test]
    fn test_batch_output_feeds_matching() {
        use crate::calculations::{calculate_batch, BulkCableInput, SizingDefaults};

        let mut row = BulkCableInput::new("B-1", 400.0, 20.0);
        row.current = Some(40.0);
        row.csa_options = Some(vec![16.0, 50.0]);
        let results = calculate_batch(&[row], &SizingDefaults::default());

        let json = serde_json::to_string(&results).unwrap();
        let rows: Vec<MatchRow> = serde_json::from_str(&json).unwrap();
        assert_eq!(rows[0].csa, Some(50.0));
        assert_eq!(rows[0].current, Some(40.0));

        let matches = match_rows(&builtin_catalog(), &rows, 1);
        assert_eq!(matches[0].cable_number, "B-1");
        assert_eq!(matches[0].suggestions.len(), 1);
    }

    #[test]
    fn test_duplicate_criterion_names_rejected() {
        let json = r#"{ "csa": 16, "selected_csa": 25 }"#;
        assert!(serde_json::from_str::<MatchRow>(json).is_err());
        let json = r#"{ "current": 10, "derated_current": 12 }"#;
        assert!(serde_json::from_str::<MatchRow>(json).is_err());
    }

    #[test]
    fn test_top_n_zero() {
        let rows = vec![MatchRow { csa: Some(16.0), ..Default::default() }];
        assert!(match_rows(&builtin_catalog(), &rows, 0)[0].suggestions.is_empty());
    }
}
