//! Point and match results, plus batch aggregation for reports

use serde::{Deserialize, Serialize};

use crate::court::Side;
use crate::helpers::ratio;

/// How a point ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointKind {
    /// Serve never touched by the receiver
    Ace,
    Winner,
    /// Loser elected an error under pressure from the shot
    ForcedError,
    /// Net, out, faults, elected errors, timeouts
    UnforcedError,
}

impl PointKind {
    pub fn label(self) -> &'static str {
        match self {
            PointKind::Ace => "ace",
            PointKind::Winner => "winner",
            PointKind::ForcedError => "forced error",
            PointKind::UnforcedError => "unforced error",
        }
    }

    /// Is this kind credited to the point winner (rather than charged to the loser)?
    pub fn credited_to_winner(self) -> bool {
        matches!(self, PointKind::Ace | PointKind::Winner)
    }
}

/// Per-side counts. Aces and winners count for the side that hit them,
/// errors against the side that committed them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideTallies {
    pub aces: u32,
    pub winners: u32,
    pub forced_errors: u32,
    pub unforced_errors: u32,
}

impl SideTallies {
    fn bump(&mut self, kind: PointKind) {
        match kind {
            PointKind::Ace => self.aces += 1,
            PointKind::Winner => self.winners += 1,
            PointKind::ForcedError => self.forced_errors += 1,
            PointKind::UnforcedError => self.unforced_errors += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.aces + self.winners + self.forced_errors + self.unforced_errors
    }

    fn add(&mut self, other: &SideTallies) {
        self.aces += other.aces;
        self.winners += other.winners;
        self.forced_errors += other.forced_errors;
        self.unforced_errors += other.unforced_errors;
    }
}

/// Running tallies for both sides over one match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchStats {
    tallies: [SideTallies; 2],
}

impl MatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, winner: Side, kind: PointKind) {
        let charged = if kind.credited_to_winner() {
            winner
        } else {
            winner.opponent()
        };
        self.tallies[charged.index()].bump(kind);
    }

    pub fn side(&self, side: Side) -> SideTallies {
        self.tallies[side.index()]
    }
}

/// Classification attached by the full simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointDetail {
    pub kind: PointKind,
    /// Tallies including this point
    pub near: SideTallies,
    pub far: SideTallies,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointResult {
    pub winner: Side,
    pub rally_shots: u32,
    pub detail: Option<PointDetail>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchDetail {
    pub avg_rally_length: f64,
    pub near: SideTallies,
    pub far: SideTallies,
}

/// Result of a single match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub score_near: u32,
    pub score_far: u32,
    pub winner: Side,
    pub total_rallies: u32,
    pub total_rally_shots: u32,
    /// RNG seed used
    pub seed: u64,
    pub detail: Option<MatchDetail>,
}

impl MatchResult {
    /// Near score minus far score
    pub fn point_differential(&self) -> i32 {
        self.score_near as i32 - self.score_far as i32
    }

    pub fn avg_rally_length(&self) -> f64 {
        ratio(self.total_rally_shots as f64, self.total_rallies as f64)
    }

    pub fn score_of(&self, side: Side) -> u32 {
        match side {
            Side::Near => self.score_near,
            Side::Far => self.score_far,
        }
    }
}

/// Aggregate over a batch of matches between the same two players
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub matches: usize,
    pub near_wins: usize,
    /// Near win rate (0.0 - 1.0)
    pub win_rate: f64,
    /// Mean of near - far
    pub avg_differential: f64,
    pub avg_score_near: f64,
    pub avg_score_far: f64,
    pub avg_rally_length: f64,
    /// Summed tallies, present when every match carried detail
    pub tallies: Option<[SideTallies; 2]>,
}

impl BatchSummary {
    pub fn from_results(results: &[MatchResult]) -> Self {
        let n = results.len() as f64;
        let near_wins = results.iter().filter(|r| r.winner == Side::Near).count();
        let diff: i64 = results.iter().map(|r| r.point_differential() as i64).sum();
        let near: u64 = results.iter().map(|r| r.score_near as u64).sum();
        let far: u64 = results.iter().map(|r| r.score_far as u64).sum();
        let rallies: u64 = results.iter().map(|r| r.total_rallies as u64).sum();
        let shots: u64 = results.iter().map(|r| r.total_rally_shots as u64).sum();

        let tallies = if !results.is_empty() && results.iter().all(|r| r.detail.is_some()) {
            let mut sum = [SideTallies::default(); 2];
            for detail in results.iter().filter_map(|r| r.detail.as_ref()) {
                sum[0].add(&detail.near);
                sum[1].add(&detail.far);
            }
            Some(sum)
        } else {
            None
        };

        Self {
            matches: results.len(),
            near_wins,
            win_rate: ratio(near_wins as f64, n),
            avg_differential: ratio(diff as f64, n),
            avg_score_near: ratio(near as f64, n),
            avg_score_far: ratio(far as f64, n),
            avg_rally_length: ratio(shots as f64, rallies as f64),
            tallies,
        }
    }

    /// Human-readable block
    pub fn format(&self) -> String {
        let mut output = String::new();
        if self.matches == 0 {
            output.push_str("No matches played\n");
            return output;
        }
        output.push_str(&format!("Matches:          {}\n", self.matches));
        output.push_str(&format!(
            "Near win rate:    {:.1}% ({} wins)\n",
            self.win_rate * 100.0,
            self.near_wins
        ));
        output.push_str(&format!(
            "Average score:    {:.2} - {:.2}\n",
            self.avg_score_near, self.avg_score_far
        ));
        output.push_str(&format!("Avg differential: {:+.2}\n", self.avg_differential));
        output.push_str(&format!("Avg rally length: {:.2} shots\n", self.avg_rally_length));
        if let Some([near, far]) = &self.tallies {
            output.push_str(&format!(
                "\n{:>6} | {:>6} | {:>8} | {:>7} | {:>10}\n",
                "Side", "Aces", "Winners", "Forced", "Unforced"
            ));
            output.push_str(&format!("{:-<7}+{:-<8}+{:-<10}+{:-<9}+{:-<11}\n", "", "", "", "", ""));
            for (label, t) in [("near", near), ("far", far)] {
                output.push_str(&format!(
                    "{:>6} | {:>6} | {:>8} | {:>7} | {:>10}\n",
                    label, t.aces, t.winners, t.forced_errors, t.unforced_errors
                ));
            }
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(near: u32, far: u32, rallies: u32, shots: u32) -> MatchResult {
        MatchResult {
            score_near: near,
            score_far: far,
            winner: if near > far { Side::Near } else { Side::Far },
            total_rallies: rallies,
            total_rally_shots: shots,
            seed: 0,
            detail: None,
        }
    }

    #[test]
    fn test_differential_and_rally_length() {
        let r = result(11, 7, 18, 90);
        assert_eq!(r.point_differential(), 4);
        assert!((r.avg_rally_length() - 5.0).abs() < 1e-9);
        assert_eq!(result(0, 0, 0, 0).avg_rally_length(), 0.0);
    }

    #[test]
    fn test_match_stats_attribution() {
        let mut stats = MatchStats::new();
        stats.record(Side::Near, PointKind::Ace);
        stats.record(Side::Near, PointKind::UnforcedError);
        stats.record(Side::Far, PointKind::ForcedError);
        assert_eq!(stats.side(Side::Near).aces, 1);
        assert_eq!(stats.side(Side::Far).unforced_errors, 1);
        assert_eq!(stats.side(Side::Near).forced_errors, 1);
        assert_eq!(stats.side(Side::Far).total(), 1);
    }

    #[test]
    fn test_batch_summary() {
        let summary = BatchSummary::from_results(&[result(11, 5, 16, 80), result(9, 11, 20, 120)]);
        assert_eq!(summary.matches, 2);
        assert_eq!(summary.near_wins, 1);
        assert!((summary.win_rate - 0.5).abs() < 1e-9);
        assert!((summary.avg_differential - 2.0).abs() < 1e-9);
        assert!((summary.avg_rally_length - 200.0 / 36.0).abs() < 1e-9);
        assert!(summary.tallies.is_none());
        assert!(summary.format().contains("50.0%"));
    }

    #[test]
    fn test_empty_batch_is_zeroed() {
        let summary = BatchSummary::from_results(&[]);
        assert_eq!(summary.win_rate, 0.0);
        assert_eq!(summary.avg_rally_length, 0.0);
        assert_eq!(summary.format(), "No matches played\n");
    }

    #[test]
    fn test_batch_sums_detail_tallies() {
        let mut a = result(11, 3, 14, 40);
        a.detail = Some(MatchDetail {
            avg_rally_length: 40.0 / 14.0,
            near: SideTallies { aces: 2, winners: 5, forced_errors: 1, unforced_errors: 2 },
            far: SideTallies { aces: 0, winners: 1, forced_errors: 3, unforced_errors: 4 },
        });
        let b = a.clone();
        let summary = BatchSummary::from_results(&[a, b]);
        let [near, far] = summary.tallies.unwrap();
        assert_eq!(near.aces, 4);
        assert_eq!(far.unforced_errors, 8);
        assert!(summary.format().contains("Unforced"));
    }
}
