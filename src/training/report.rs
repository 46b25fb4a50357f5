//! Final training report
//!
//! Plain-text output is deterministic for a given run so reports can be
//! diffed across runs; the timing line is optional for that reason.

use serde::{Deserialize, Serialize};

use super::fitness::{CaseOutcome, Evaluation};
use super::trainer::StopReason;

/// How a case compares to its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseStatus {
    /// Within tolerance
    Ok,
    /// Outside tolerance but within 2x tolerance
    Warn,
    /// Way outside tolerance
    Fail,
}

impl CaseStatus {
    pub fn from_error(error: f64, tolerance: f64) -> Self {
        let abs = error.abs();
        if abs <= tolerance {
            CaseStatus::Ok
        } else if abs <= tolerance * 2.0 {
            CaseStatus::Warn
        } else {
            CaseStatus::Fail
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CaseStatus::Ok => "OK",
            CaseStatus::Warn => "WARN",
            CaseStatus::Fail => "FAIL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseReport {
    pub label: String,
    pub target: f64,
    pub actual: f64,
    pub win_rate: f64,
    pub samples: u32,
    pub status: CaseStatus,
}

impl CaseReport {
    pub fn from_outcome(outcome: &CaseOutcome, tolerance: f64) -> Self {
        Self {
            label: outcome.label.clone(),
            target: outcome.target,
            actual: outcome.actual,
            win_rate: outcome.win_rate,
            samples: outcome.samples,
            status: CaseStatus::from_error(outcome.error(), tolerance),
        }
    }
}

/// Fast vs full simulator agreement at one rating (human vs computer)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossCheckEntry {
    pub rating: f32,
    pub matches: u32,
    pub fast_differential: f64,
    pub full_differential: f64,
    pub fast_rally_length: f64,
    pub full_rally_length: f64,
}

impl CrossCheckEntry {
    pub fn gap(&self) -> f64 {
        self.full_differential - self.fast_differential
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub best_fitness: f64,
    pub generations: u32,
    pub stop_reason: StopReason,
    pub elapsed_secs: f64,
    pub avg_rally_length: f64,
    pub rally_length_target: f64,
    pub cases: Vec<CaseReport>,
    pub cross_check: Vec<CrossCheckEntry>,
}

impl TrainingReport {
    pub fn new(
        evaluation: &Evaluation,
        generations: u32,
        stop_reason: StopReason,
        elapsed_secs: f64,
        rally_length_target: f64,
        tolerance: f64,
        cross_check: Vec<CrossCheckEntry>,
    ) -> Self {
        Self {
            best_fitness: evaluation.fitness,
            generations,
            stop_reason,
            elapsed_secs,
            avg_rally_length: evaluation.avg_rally_length,
            rally_length_target,
            cases: evaluation
                .cases
                .iter()
                .map(|c| CaseReport::from_outcome(c, tolerance))
                .collect(),
            cross_check,
        }
    }

    /// (ok, warn, fail) counts
    pub fn status_counts(&self) -> (usize, usize, usize) {
        let count = |s| self.cases.iter().filter(|c| c.status == s).count();
        (count(CaseStatus::Ok), count(CaseStatus::Warn), count(CaseStatus::Fail))
    }

    pub fn to_plain_text(&self, include_timing: bool) -> String {
        let mut out = String::new();
        out.push_str("=== Training Report ===\n");
        out.push_str(&format!("Best fitness:     {:.4}\n", self.best_fitness));
        out.push_str(&format!(
            "Generations:      {} ({})\n",
            self.generations,
            self.stop_reason.label()
        ));
        if include_timing {
            out.push_str(&format!("Elapsed:          {:.1}s\n", self.elapsed_secs));
        }
        out.push_str(&format!(
            "Avg rally length: {:.2} shots (target {:.2})\n",
            self.avg_rally_length, self.rally_length_target
        ));

        out.push_str(&format!(
            "\n{:<26} {:>8} {:>8} {:>7} {:>7}  {}\n",
            "Case", "Target", "Actual", "Win%", "Games", "Status"
        ));
        out.push_str(&format!("{:-<70}\n", ""));
        for case in &self.cases {
            out.push_str(&format!(
                "{:<26} {:>+8.2} {:>+8.2} {:>6.1}% {:>7}  {}\n",
                case.label,
                case.target,
                case.actual,
                case.win_rate * 100.0,
                case.samples,
                case.status.label()
            ));
        }
        let (ok, warn, fail) = self.status_counts();
        out.push_str(&format!("\nSummary: {} OK, {} WARN, {} FAIL\n", ok, warn, fail));

        if !self.cross_check.is_empty() {
            out.push_str("\n--- Fast vs full cross-check (human vs computer) ---\n");
            out.push_str(&format!(
                "{:>6} {:>7} {:>9} {:>9} {:>7} {:>10} {:>10}\n",
                "Rating", "Games", "Fast", "Full", "Gap", "Fast rally", "Full rally"
            ));
            for entry in &self.cross_check {
                out.push_str(&format!(
                    "{:>6.1} {:>7} {:>+9.2} {:>+9.2} {:>+7.2} {:>10.2} {:>10.2}\n",
                    entry.rating,
                    entry.matches,
                    entry.fast_differential,
                    entry.full_differential,
                    entry.gap(),
                    entry.fast_rally_length,
                    entry.full_rally_length
                ));
            }
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
