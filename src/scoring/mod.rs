//! Scoring module - match rules and the rally-by-rally score state machine
//!
//! Shared by both simulators: each finished rally is fed to
//! `MatchState::record_rally` until `is_over` reports the game decided.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::court::Side;

/// Which rallies score a point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// Every rally scores for its winner, who then serves
    #[default]
    Rally,
    /// Only the server scores; a receiver win passes the serve
    SideOut,
}

impl ScoringMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "rally" => Some(Self::Rally),
            "side-out" | "side_out" | "sideout" => Some(Self::SideOut),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchRules {
    pub points_to_win: u32,
    pub win_by: u32,
    /// Hard cap: first side here wins outright, margin or not
    pub max_score: u32,
    /// Safety cutoff on rallies played
    pub max_rallies: u32,
    pub first_server: Side,
    pub scoring: ScoringMode,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            points_to_win: POINTS_TO_WIN,
            win_by: WIN_BY_MARGIN,
            max_score: MAX_SCORE,
            max_rallies: MAX_RALLIES,
            first_server: Side::Near,
            scoring: ScoringMode::Rally,
        }
    }
}

/// Running score of one game
#[derive(Debug, Clone)]
pub struct MatchState {
    rules: MatchRules,
    score: [u32; 2],
    server: Side,
    rallies: u32,
    last_rally_winner: Option<Side>,
}

impl MatchState {
    pub fn new(rules: MatchRules) -> Self {
        Self {
            rules,
            score: [0, 0],
            server: rules.first_server,
            rallies: 0,
            last_rally_winner: None,
        }
    }

    pub fn rules(&self) -> &MatchRules {
        &self.rules
    }

    pub fn server(&self) -> Side {
        self.server
    }

    pub fn score(&self, side: Side) -> u32 {
        self.score[side.index()]
    }

    pub fn rallies(&self) -> u32 {
        self.rallies
    }

    /// Apply a finished rally. Returns true if it put a point on the board.
    pub fn record_rally(&mut self, winner: Side) -> bool {
        if self.is_over() {
            return false;
        }
        self.rallies += 1;
        self.last_rally_winner = Some(winner);

        let scored = match self.rules.scoring {
            ScoringMode::Rally => true,
            ScoringMode::SideOut => winner == self.server,
        };
        if scored {
            self.score[winner.index()] += 1;
        }
        self.server = winner;
        scored
    }

    fn decided_by_score(&self) -> bool {
        let hi = self.score[0].max(self.score[1]);
        let lo = self.score[0].min(self.score[1]);
        (hi >= self.rules.points_to_win && hi - lo >= self.rules.win_by)
            || (hi >= self.rules.max_score && hi != lo)
    }

    pub fn is_over(&self) -> bool {
        self.decided_by_score() || self.rallies >= self.rules.max_rallies
    }

    /// Winner once the game is over. At the rally cutoff the higher score
    /// wins, a level score goes to whoever took the last rally.
    pub fn winner(&self) -> Option<Side> {
        if !self.is_over() {
            return None;
        }
        match self.score[0].cmp(&self.score[1]) {
            std::cmp::Ordering::Greater => Some(Side::Near),
            std::cmp::Ordering::Less => Some(Side::Far),
            std::cmp::Ordering::Equal => self.last_rally_winner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(state: &mut MatchState, winners: &[Side]) {
        for &w in winners {
            state.record_rally(w);
        }
    }

    #[test]
    fn test_rally_scoring_to_eleven() {
        let mut state = MatchState::new(MatchRules::default());
        play(&mut state, &[Side::Near; 10]);
        assert!(!state.is_over());
        state.record_rally(Side::Near);
        assert!(state.is_over());
        assert_eq!(state.winner(), Some(Side::Near));
        assert_eq!(state.score(Side::Near), 11);
        assert_eq!(state.score(Side::Far), 0);
    }

    #[test]
    fn test_win_by_two() {
        let mut state = MatchState::new(MatchRules::default());
        for _ in 0..10 {
            play(&mut state, &[Side::Near, Side::Far]);
        }
        state.record_rally(Side::Near);
        assert!(!state.is_over(), "11-10 is not decided");
        state.record_rally(Side::Near);
        assert_eq!(state.winner(), Some(Side::Near));
    }

    #[test]
    fn test_score_cap_ends_game() {
        let mut state = MatchState::new(MatchRules::default());
        for _ in 0..14 {
            play(&mut state, &[Side::Near, Side::Far]);
        }
        assert!(!state.is_over());
        state.record_rally(Side::Far);
        assert_eq!(state.score(Side::Far), 15);
        assert_eq!(state.winner(), Some(Side::Far));
    }

    #[test]
    fn test_side_out_only_server_scores() {
        let rules = MatchRules {
            scoring: ScoringMode::SideOut,
            ..Default::default()
        };
        let mut state = MatchState::new(rules);
        assert_eq!(state.server(), Side::Near);
        assert!(!state.record_rally(Side::Far));
        assert_eq!(state.score(Side::Far), 0);
        assert_eq!(state.server(), Side::Far);
        assert!(state.record_rally(Side::Far));
        assert_eq!(state.score(Side::Far), 1);
    }

    #[test]
    fn test_rally_winner_takes_serve() {
        let mut state = MatchState::new(MatchRules {
            first_server: Side::Far,
            ..Default::default()
        });
        assert_eq!(state.server(), Side::Far);
        state.record_rally(Side::Near);
        assert_eq!(state.server(), Side::Near);
        assert_eq!(state.score(Side::Near), 1);
    }

    #[test]
    fn test_rally_cutoff_tie_goes_to_last_winner() {
        let rules = MatchRules {
            max_rallies: 4,
            ..Default::default()
        };
        let mut state = MatchState::new(rules);
        play(&mut state, &[Side::Near, Side::Far, Side::Near, Side::Far]);
        assert!(state.is_over());
        assert_eq!(state.winner(), Some(Side::Far));
        assert!(!state.record_rally(Side::Near));
        assert_eq!(state.rallies(), 4);
    }

    #[test]
    fn test_scoring_mode_names() {
        assert_eq!(ScoringMode::from_name("Rally"), Some(ScoringMode::Rally));
        assert_eq!(ScoringMode::from_name("side-out"), Some(ScoringMode::SideOut));
        assert_eq!(ScoringMode::from_name("tennis"), None);
    }
}
