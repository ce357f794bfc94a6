//! Quiz session lifecycle: `Idle -> Loading -> InProgress -> Completed`.

use std::{collections::HashMap, sync::Arc};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{
    config::QUIZ_QUESTION_COUNT,
    error::AppError,
    models::{
        catalog::{QuizSelection, normalize_subject},
        leaderboard::{LeaderboardEntry, percentage},
        question::{OptionKey, QuestionView, QuizQuestion, RawQuestion},
        user::{CurrentUser, Role},
    },
    store::{Gateway, collections},
    trivia::{QuestionRequest, SourceError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Loading,
    InProgress,
    Completed,
}

/// Final result of a completed quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOutcome {
    pub subject: String,
    pub level: String,
    pub correct: usize,
    pub total: usize,
    pub percentage: u32,
}

/// What the learner should see next.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QuizStep {
    InProgress { question: QuestionView },
    Completed { result: QuizOutcome },
}

/// One quiz attempt.
#[derive(Debug)]
pub struct QuizSession {
    state: SessionState,
    selection: Option<QuizSelection>,
    expected: usize,
    questions: Vec<QuizQuestion>,
    current_index: usize,
    score: usize,
    selected: Option<OptionKey>,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            selection: None,
            expected: QUIZ_QUESTION_COUNT as usize,
            questions: Vec::new(),
            current_index: 0,
            score: 0,
            selected: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn selected(&self) -> Option<OptionKey> {
        self.selected
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    /// Idle -> Loading. Resolves the setup choice into a question request.
    /// An unknown subject or level leaves the session idle.
    pub fn begin(&mut self, subject: &str, level: &str) -> Result<QuestionRequest, AppError> {
        if self.state != SessionState::Idle {
            return Err(self.wrong_state());
        }
        let selection = QuizSelection::resolve(subject, level)?;

        self.selection = Some(selection);
        self.state = SessionState::Loading;

        Ok(QuestionRequest {
            amount: self.expected as u32,
            category: selection.category_id(),
            difficulty: selection.difficulty(),
        })
    }

    /// Loading -> InProgress on a complete, decodable set; back to Idle otherwise.
    pub fn finish_loading<R: Rng>(
        &mut self,
        fetched: Result<Vec<RawQuestion>, AppError>,
        rng: &mut R,
    ) -> Result<QuestionView, AppError> {
        if self.state != SessionState::Loading {
            return Err(self.wrong_state());
        }

        let decoded = fetched.and_then(|raw| {
            if raw.len() != self.expected {
                return Err(SourceError::Incomplete {
                    expected: self.expected,
                    received: raw.len(),
                }
                .into());
            }
            raw.iter()
                .map(|item| QuizQuestion::decode(item, &mut *rng))
                .collect::<Result<Vec<_>, SourceError>>()
                .map_err(AppError::from)
        });

        match decoded {
            Ok(questions) => {
                self.questions = questions;
                self.current_index = 0;
                self.score = 0;
                self.selected = None;
                self.state = SessionState::InProgress;
                Ok(self.current_view())
            }
            Err(e) => {
                *self = Self::new();
                Err(e)
            }
        }
    }

    /// Setup submission through to the first question.
    pub async fn start(
        &mut self,
        gateway: &Gateway,
        subject: &str,
        level: &str,
    ) -> Result<QuestionView, AppError> {
        let request = self.begin(subject, level)?;
        let guard = LoadingGuard { session: self };
        let fetched = gateway.fetch_questions(request).await;
        guard.session.finish_loading(fetched, &mut rand::rng())
    }

    /// Records the learner's choice for the current question, replacing any earlier one.
    pub fn select(&mut self, key: OptionKey) -> Result<(), AppError> {
        if self.state != SessionState::InProgress {
            return Err(self.wrong_state());
        }
        self.selected = Some(key);
        Ok(())
    }

    /// Scores the current answer and moves on, completing the quiz after the last question.
    pub fn advance(&mut self) -> Result<QuizStep, AppError> {
        if self.state != SessionState::InProgress {
            return Err(self.wrong_state());
        }
        let key = self.selected.ok_or(AppError::NoSelection)?;

        if self.questions[self.current_index].is_correct(key) {
            self.score += 1;
        }
        self.selected = None;
        self.current_index += 1;

        if self.current_index < self.questions.len() {
            return Ok(QuizStep::InProgress {
                question: self.current_view(),
            });
        }

        self.state = SessionState::Completed;
        tracing::info!(
            correct = self.score,
            total = self.questions.len(),
            "Quiz completed"
        );
        Ok(QuizStep::Completed {
            result: self.build_outcome(),
        })
    }

    /// Advances and, when that completes the quiz, records the outcome.
    ///
    /// If recording fails the session is put back exactly as it was before the
    /// advance, so the same "next" can be retried.
    pub async fn advance_and_record(
        &mut self,
        gateway: &Gateway,
        user: &CurrentUser,
    ) -> Result<(QuizStep, bool), AppError> {
        let before = Snapshot {
            state: self.state,
            current_index: self.current_index,
            score: self.score,
            selected: self.selected,
        };

        let step = self.advance()?;
        let Some(outcome) = self.outcome() else {
            return Ok((step, false));
        };

        match record_outcome(gateway, user, &outcome).await {
            Ok(entry) => Ok((step, entry.is_some())),
            Err(e) => {
                tracing::warn!(user = %user.email, "Rolling back final answer: {}", e);
                self.state = before.state;
                self.current_index = before.current_index;
                self.score = before.score;
                self.selected = before.selected;
                Err(e)
            }
        }
    }

    /// Current question or final result, without changing anything.
    pub fn view(&self) -> Result<QuizStep, AppError> {
        match self.state {
            SessionState::InProgress => Ok(QuizStep::InProgress {
                question: self.current_view(),
            }),
            SessionState::Completed => Ok(QuizStep::Completed {
                result: self.build_outcome(),
            }),
            _ => Err(self.wrong_state()),
        }
    }

    pub fn outcome(&self) -> Option<QuizOutcome> {
        (self.state == SessionState::Completed).then(|| self.build_outcome())
    }

    fn current_view(&self) -> QuestionView {
        let question = &self.questions[self.current_index];
        QuestionView {
            index: self.current_index,
            total: self.questions.len(),
            prompt: question.prompt().to_string(),
            options: question.options().to_vec(),
            selected: self.selected,
            is_final: self.current_index + 1 == self.questions.len(),
        }
    }

    fn build_outcome(&self) -> QuizOutcome {
        let (subject, level) = self
            .selection
            .map(|s| (s.subject.label().to_string(), s.level.label().to_string()))
            .unwrap_or_default();
        QuizOutcome {
            subject,
            level,
            correct: self.score,
            total: self.questions.len(),
            percentage: percentage(self.score, self.questions.len()),
        }
    }

    fn wrong_state(&self) -> AppError {
        match self.state {
            SessionState::Idle => AppError::NotFound("No quiz in progress".to_string()),
            SessionState::Loading => AppError::Conflict("Quiz questions are still loading".to_string()),
            SessionState::InProgress => AppError::Conflict("A quiz is already in progress".to_string()),
            SessionState::Completed => AppError::Conflict("This quiz is already completed".to_string()),
        }
    }
}

struct Snapshot {
    state: SessionState,
    current_index: usize,
    score: usize,
    selected: Option<OptionKey>,
}

/// Puts a session left in `Loading` back to `Idle` when the fetch is abandoned,
/// e.g. because the client disconnected and the request future was dropped.
struct LoadingGuard<'a> {
    session: &'a mut QuizSession,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.session.state == SessionState::Loading {
            tracing::debug!("Question fetch abandoned, resetting session");
            *self.session = QuizSession::new();
        }
    }
}

/// Appends a learner's result to the leaderboard. Other roles are not ranked.
pub async fn record_outcome(
    gateway: &Gateway,
    user: &CurrentUser,
    outcome: &QuizOutcome,
) -> Result<Option<LeaderboardEntry>, AppError> {
    if user.role != Role::Learner {
        return Ok(None);
    }

    let entry = LeaderboardEntry {
        name: user.name.clone(),
        score: outcome.percentage,
        subject: normalize_subject(&outcome.subject),
        level: outcome.level.clone(),
        timestamp: chrono::Utc::now(),
    };

    let tx = gateway.transaction().await;
    let mut entries: Vec<LeaderboardEntry> = tx.load(collections::LEADERBOARD).await?;
    entries.push(entry.clone());
    tx.save(collections::LEADERBOARD, &entries).await?;

    tracing::info!(
        learner = %user.email,
        subject = %entry.subject,
        score = entry.score,
        "Leaderboard entry recorded"
    );
    Ok(Some(entry))
}

/// Live sessions, at most one per signed-in user.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<String, Arc<Mutex<QuizSession>>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The user's session slot, created idle on first use.
    pub async fn slot(&self, email: &str) -> Arc<Mutex<QuizSession>> {
        self.sessions
            .lock()
            .await
            .entry(email.to_string())
            .or_default()
            .clone()
    }

    pub async fn existing(&self, email: &str) -> Option<Arc<Mutex<QuizSession>>> {
        self.sessions.lock().await.get(email).cloned()
    }

    /// Discards the user's session, e.g. once its results were shown or on logout.
    pub async fn remove(&self, email: &str) {
        self.sessions.lock().await.remove(email);
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
