//! Weighted health score.
//!
//! `score = clamp(100 + bonus - penalty, 0, 100)`, reported as an
//! integer. Penalty weights are keyed off the detector that produced each
//! issue; bonuses reward FK coverage and naming consistency.

use std::fmt;

use serde::{Deserialize, Serialize};
use sleuth_core::catalog::Catalog;
use sleuth_core::config::AnalysisConfig;

use crate::relationships::naming::fk_stem;
use crate::detectors::naming::{id_style, IdStyle};
use crate::types::Issue;

/// Penalty points per issue, by detector. Anti-patterns cost half a point
/// each; the total is rounded once at the end.
const PENALTIES: &[(&str, f64)] = &[
    ("missing_pk", 5.0),
    ("missing_fk_index", 2.0),
    ("dead_routine", 1.0),
    ("circular_dependency", 10.0),
    ("complex_routine", 2.0),
    ("duplicate_index", 1.0),
    ("anti_patterns", 0.5),
    ("dead_table", 2.0),
];

const FK_COVERAGE_BONUS: f64 = 5.0;
const NAMING_CONSISTENCY_BONUS: f64 = 3.0;

/// Score bands for the report header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthBand {
    Critical,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl HealthBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=39 => Self::Critical,
            40..=59 => Self::Poor,
            60..=74 => Self::Fair,
            75..=89 => Self::Good,
            _ => Self::Excellent,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Poor => "poor",
            Self::Fair => "fair",
            Self::Good => "good",
            Self::Excellent => "excellent",
        }
    }
}

impl fmt::Display for HealthBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One line of the score breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreLine {
    pub source: String,
    pub count: usize,
    pub points: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthScore {
    pub score: u8,
    pub band: HealthBand,
    pub penalties: Vec<ScoreLine>,
    pub bonuses: Vec<ScoreLine>,
}

/// Compute the health score from the issue list and catalog shape.
pub fn score(catalog: &Catalog, issues: &[Issue], config: &AnalysisConfig) -> HealthScore {
    let mut penalties = Vec::new();
    let mut penalty_total = 0.0;

    for (detector, points_each) in PENALTIES {
        let count = issues
            .iter()
            .filter(|i| i.id.starts_with(&format!("{detector}:")))
            .count();
        if count == 0 {
            continue;
        }
        let points = points_each * count as f64;
        penalty_total += points;
        penalties.push(ScoreLine {
            source: (*detector).to_string(),
            count,
            points,
        });
    }

    let mut bonuses = Vec::new();
    let mut bonus_total = 0.0;

    if let Some(coverage) = fk_coverage(catalog) {
        if coverage >= config.effective_fk_coverage_threshold() {
            bonus_total += FK_COVERAGE_BONUS;
            bonuses.push(ScoreLine {
                source: "fk_coverage".to_string(),
                count: 1,
                points: FK_COVERAGE_BONUS,
            });
        }
    }

    if let Some(consistency) = naming_consistency(catalog) {
        if consistency >= config.effective_naming_consistency_threshold() {
            bonus_total += NAMING_CONSISTENCY_BONUS;
            bonuses.push(ScoreLine {
                source: "naming_consistency".to_string(),
                count: 1,
                points: NAMING_CONSISTENCY_BONUS,
            });
        }
    }

    let raw = (100.0 + bonus_total - penalty_total).round();
    let score = raw.clamp(0.0, 100.0) as u8;

    HealthScore {
        score,
        band: HealthBand::from_score(score),
        penalties,
        bonuses,
    }
}

/// Defined-FK share of the FK-candidate columns. `None` when the catalog
/// has no candidates to measure.
fn fk_coverage(catalog: &Catalog) -> Option<f64> {
    let mut candidates = 0usize;
    let mut covered = 0usize;

    for table in catalog.tables().values() {
        for column in &table.columns {
            if fk_stem(&column.name).is_none() {
                continue;
            }
            // A table's own key column is not an FK candidate.
            let is_own_pk = table
                .primary_key
                .as_ref()
                .is_some_and(|pk| pk.iter().any(|c| c.eq_ignore_ascii_case(&column.name)));
            if is_own_pk {
                continue;
            }
            candidates += 1;
            let has_fk = table.foreign_keys.iter().any(|fk| {
                fk.columns
                    .iter()
                    .any(|c| c.eq_ignore_ascii_case(&column.name))
            });
            if has_fk {
                covered += 1;
            }
        }
    }

    (candidates > 0).then(|| covered as f64 / candidates as f64)
}

/// Share of FK-candidate columns following the dominant id style.
fn naming_consistency(catalog: &Catalog) -> Option<f64> {
    let mut counts = [(IdStyle::Pascal, 0usize), (IdStyle::Snake, 0), (IdStyle::Upper, 0)];
    let mut total = 0usize;

    for table in catalog.tables().values() {
        for column in &table.columns {
            if let Some(style) = id_style(&column.name) {
                total += 1;
                let slot = counts.iter_mut().find(|(s, _)| *s == style).unwrap();
                slot.1 += 1;
            }
        }
    }

    (total > 0).then(|| {
        let dominant = counts.iter().map(|(_, n)| *n).max().unwrap_or(0);
        dominant as f64 / total as f64
    })
}
