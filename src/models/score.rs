use serde::Serialize;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TriviaScoreResult {
    pub twitch_channel: String,
    pub user_id: String,
    pub streak: i64,
    pub total_losses: u64,
    pub total_wins: u64,
}

impl TriviaScoreResult {
    pub fn total(&self) -> u64 {
        self.total_wins + self.total_losses
    }

    pub fn win_percent(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.total_wins as f64 / total as f64 * 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_percent_handles_no_games() {
        let score = TriviaScoreResult {
            twitch_channel: "smCharles".to_string(),
            user_id: "42".to_string(),
            streak: 0,
            total_losses: 0,
            total_wins: 0,
        };
        assert_eq!(score.win_percent(), 0.0);

        let score = TriviaScoreResult {
            total_losses: 1,
            total_wins: 3,
            ..score
        };
        assert_eq!(score.total(), 4);
        assert_eq!(score.win_percent(), 75.0);
    }
}
