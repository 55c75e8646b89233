use crate::session::{MissedItem, SessionStats};

/// End-of-session figures shown on the results screen.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Summary {
    pub score: u32,
    pub perfect_matches: u32,
    /// Whole percent of correct matches over attempts.
    pub accuracy: u32,
    pub total_correct: u32,
    pub total_attempts: u32,
    pub missed_items: Vec<MissedItem>,
}

impl Summary {
    pub fn from_stats(stats: &SessionStats) -> Self {
        Self {
            score: stats.score,
            perfect_matches: stats.perfect_matches,
            accuracy: accuracy(stats.total_correct, stats.total_attempts),
            total_correct: stats.total_correct,
            total_attempts: stats.total_attempts,
            missed_items: stats.missed_items.clone(),
        }
    }

    pub fn has_review(&self) -> bool {
        !self.missed_items.is_empty()
    }
}

/// Percentage rounded to the nearest whole number, halves rounding up.
pub fn accuracy(total_correct: u32, total_attempts: u32) -> u32 {
    if total_attempts == 0 {
        return 0;
    }

    let correct = u64::from(total_correct);
    let attempts = u64::from(total_attempts);
    ((200 * correct + attempts) / (2 * attempts)) as u32
}
