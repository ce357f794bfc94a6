// src/models/leaderboard.rs

use serde::{Deserialize, Serialize};

use crate::models::catalog::normalize_subject;

/// One learner's recorded result for a completed quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    /// Percentage, 0 to 100.
    pub score: u32,
    pub subject: String,
    pub level: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Query string for the leaderboard page.
#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub subject: String,
}

/// Rounded percentage of correct answers; 0 for an empty quiz.
pub fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (100.0 * correct as f64 / total as f64).round() as u32
}

/// Highest scores for one subject, best first, at most `limit` rows.
/// Equal scores keep their recording order.
pub fn top_for_subject(
    entries: &[LeaderboardEntry],
    subject: &str,
    limit: usize,
) -> Vec<LeaderboardEntry> {
    let subject = normalize_subject(subject);
    let mut rows: Vec<LeaderboardEntry> = entries
        .iter()
        .filter(|e| normalize_subject(&e.subject) == subject)
        .cloned()
        .collect();
    rows.sort_by(|a, b| b.score.cmp(&a.score));
    rows.truncate(limit);
    rows
}
