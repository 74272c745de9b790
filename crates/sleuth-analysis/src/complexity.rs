//! Routine complexity scoring.
//!
//! A weighted sum over seven dimensions, each capped so no single
//! dimension dominates. The arithmetic runs in tenths of a point so the
//! score is reproducible bit-exact; boundary scores round down to the
//! lower category (20 and 50 are both Medium).

use std::fmt;

use serde::{Deserialize, Serialize};
use sleuth_core::types::collections::FxHashSet;

use crate::extractor::lexer::{tokenize, Tok};

/// Per-dimension caps and weights, in tenths of a point.
const LINE_WEIGHT: u32 = 1; // 0.1 per non-blank line
const LINE_CAP: u32 = 300;
const JOIN_WEIGHT: u32 = 30; // 3 per JOIN
const JOIN_CAP: u32 = 300;
const SUBQUERY_WEIGHT: u32 = 50; // 5 per nesting level
const SUBQUERY_CAP: u32 = 250;
const CURSOR_WEIGHT: u32 = 80; // 8 per cursor
const CURSOR_CAP: u32 = 160;
const TEMP_WEIGHT: u32 = 20; // 2 per distinct temp table
const TEMP_CAP: u32 = 120;
const DYNAMIC_SQL_SCORE: u32 = 100; // flat 10 when present
const CONTROL_WEIGHT: u32 = 10; // 1 per IF/WHILE/CASE
const CONTROL_CAP: u32 = 150;

/// Complexity category. Boundary tie-breaks go to the lower category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityBand {
    Simple,
    Medium,
    Complex,
}

impl ComplexityBand {
    fn from_tenths(tenths: u32) -> Self {
        if tenths < 200 {
            Self::Simple
        } else if tenths <= 500 {
            Self::Medium
        } else {
            Self::Complex
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Medium => "medium",
            Self::Complex => "complex",
        }
    }
}

impl fmt::Display for ComplexityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Complexity score with its raw dimension counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complexity {
    pub lines: u32,
    pub joins: u32,
    pub subquery_depth: u32,
    pub cursors: u32,
    pub temp_tables: u32,
    pub dynamic_sql: bool,
    pub control_flow: u32,
    /// Total score in tenths of a point; `score()` gives the value.
    score_tenths: u32,
    pub band: ComplexityBand,
}

impl Complexity {
    pub fn score(&self) -> f64 {
        f64::from(self.score_tenths) / 10.0
    }

    /// Whole-point comparison used by the ComplexRoutine detector.
    pub fn exceeds(&self, threshold_points: u32) -> bool {
        self.score_tenths > threshold_points * 10
    }
}

/// Score a routine body. Pure; an empty body scores 0 (Simple).
pub fn analyze(body: &str) -> Complexity {
    let toks = tokenize(body);

    let lines = body.lines().filter(|l| !l.trim().is_empty()).count() as u32;
    let joins = toks.iter().filter(|t| t.is_kw("join")).count() as u32;
    let subquery_depth = max_select_depth(&toks);
    let cursors = count_cursors(&toks);
    let temp_tables = count_distinct_temps(&toks);
    let dynamic_sql = has_dynamic_sql(&toks);
    let control_flow = toks
        .iter()
        .filter(|t| t.is_kw("if") || t.is_kw("while") || t.is_kw("case"))
        .count() as u32;

    let score_tenths = (lines * LINE_WEIGHT).min(LINE_CAP)
        + (joins * JOIN_WEIGHT).min(JOIN_CAP)
        + (subquery_depth * SUBQUERY_WEIGHT).min(SUBQUERY_CAP)
        + (cursors * CURSOR_WEIGHT).min(CURSOR_CAP)
        + (temp_tables * TEMP_WEIGHT).min(TEMP_CAP)
        + if dynamic_sql { DYNAMIC_SQL_SCORE } else { 0 }
        + (control_flow * CONTROL_WEIGHT).min(CONTROL_CAP);

    Complexity {
        lines,
        joins,
        subquery_depth,
        cursors,
        temp_tables,
        dynamic_sql,
        control_flow,
        score_tenths,
        band: ComplexityBand::from_tenths(score_tenths),
    }
}

/// Maximum nesting depth of parens that open a SELECT.
fn max_select_depth(toks: &[Tok]) -> u32 {
    let mut stack: Vec<bool> = Vec::new();
    let mut depth = 0u32;
    let mut max = 0u32;
    for (i, tok) in toks.iter().enumerate() {
        match tok {
            Tok::Sym('(') => {
                let is_select = toks.get(i + 1).is_some_and(|t| t.is_kw("select"));
                stack.push(is_select);
                if is_select {
                    depth += 1;
                    max = max.max(depth);
                }
            }
            Tok::Sym(')') => {
                if let Some(was_select) = stack.pop() {
                    if was_select && depth > 0 {
                        depth -= 1;
                    }
                }
            }
            _ => {}
        }
    }
    max
}

fn count_cursors(toks: &[Tok]) -> u32 {
    let mut count = 0;
    for i in 0..toks.len() {
        if toks[i].is_kw("declare")
            && matches!(
                toks.get(i + 1),
                Some(Tok::Word(_) | Tok::Quoted(_) | Tok::Var(_))
            )
            && toks.get(i + 2).is_some_and(|t| t.is_kw("cursor"))
        {
            count += 1;
        }
    }
    count
}

fn count_distinct_temps(toks: &[Tok]) -> u32 {
    let names: FxHashSet<String> = toks
        .iter()
        .filter_map(|t| match t {
            Tok::Temp(name) => Some(name.to_ascii_lowercase()),
            _ => None,
        })
        .collect();
    names.len() as u32
}

fn has_dynamic_sql(toks: &[Tok]) -> bool {
    for (i, tok) in toks.iter().enumerate() {
        if tok.is_kw("sp_executesql") {
            return true;
        }
        if (tok.is_kw("exec") || tok.is_kw("execute"))
            && matches!(toks.get(i + 1), Some(Tok::Sym('(') | Tok::Var(_)))
        {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_is_simple_zero() {
        let c = analyze("");
        assert_eq!(c.score(), 0.0);
        assert_eq!(c.band, ComplexityBand::Simple);
    }

    #[test]
    fn boundary_scores_round_down() {
        assert_eq!(ComplexityBand::from_tenths(199), ComplexityBand::Simple);
        assert_eq!(ComplexityBand::from_tenths(200), ComplexityBand::Medium);
        assert_eq!(ComplexityBand::from_tenths(500), ComplexityBand::Medium);
        assert_eq!(ComplexityBand::from_tenths(510), ComplexityBand::Complex);
    }

    #[test]
    fn joins_are_capped() {
        let body = "SELECT 1 FROM a ".to_string() + &"JOIN b ON 1=1 ".repeat(20);
        let c = analyze(&body);
        assert_eq!(c.joins, 20);
        // 20 joins would be 60 points; the cap holds the contribution at 30.
        assert!(c.score() <= 30.0 + 3.0 + 15.0);
    }

    #[test]
    fn subquery_depth_counts_only_select_parens() {
        let c = analyze("SELECT * FROM (SELECT x FROM (SELECT y FROM T) a) b WHERE f(1, 2) > 0");
        assert_eq!(c.subquery_depth, 2);
    }

    #[test]
    fn cursor_and_temp_dimensions() {
        let body = "DECLARE c CURSOR FOR SELECT 1; SELECT * INTO #a FROM x; UPDATE #b SET v=1";
        let c = analyze(body);
        assert_eq!(c.cursors, 1);
        assert_eq!(c.temp_tables, 2);
    }
}
