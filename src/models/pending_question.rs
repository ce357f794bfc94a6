use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::question::{AnswerOption, OptionKey};

/// Review state of a teacher submission. Nothing moves a question past review yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewStatus {
    PendingReview,
}

/// A teacher-authored question waiting in the review queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingQuestion {
    /// Creation time in milliseconds, bumped when two submissions share a millisecond.
    pub id: i64,
    pub author_name: String,
    pub author_email: String,
    pub subject: String,
    pub prompt: String,
    pub options: Vec<AnswerOption>,
    pub correct_option: OptionKey,
    pub status: ReviewStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for submission.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitQuestionRequest {
    #[validate(length(min = 1, max = 40))]
    pub subject: String,

    #[validate(length(min = 1, max = 1000))]
    pub prompt: String,

    /// Answer text per slot; all four slots are required.
    #[validate(custom(function = validate_options))]
    pub options: BTreeMap<OptionKey, String>,

    pub correct_option: OptionKey,
}

/// Requires every slot to carry a non-blank answer of reasonable length.
fn validate_options(options: &BTreeMap<OptionKey, String>) -> Result<(), validator::ValidationError> {
    for key in OptionKey::ALL {
        match options.get(&key) {
            None => return Err(validator::ValidationError::new("option_missing")),
            Some(text) if text.trim().is_empty() => {
                return Err(validator::ValidationError::new("option_empty"));
            }
            Some(text) if text.len() > 500 => {
                return Err(validator::ValidationError::new("option_too_long"));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// Next id after `last`, derived from the creation time.
pub fn next_id(now_millis: i64, last: Option<i64>) -> i64 {
    match last {
        Some(last) if now_millis <= last => last + 1,
        _ => now_millis,
    }
}
