// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use crate::{
    config::LEADERBOARD_SIZE,
    error::AppError,
    models::{
        catalog::{CatalogResponse, QuizSelection},
        leaderboard::{LeaderboardEntry, LeaderboardQuery, top_for_subject},
        question::OptionKey,
        user::CurrentUser,
    },
    session::{QuizSession, QuizStep, SessionRegistry},
    store::{Gateway, collections},
};

/// DTO for the quiz setup form.
#[derive(Debug, Deserialize)]
pub struct StartQuizRequest {
    pub subject: String,
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectAnswerRequest {
    pub option: OptionKey,
}

/// Result of pressing "next", with whether the score reached the leaderboard.
#[derive(Debug, Serialize)]
pub struct AdvanceResponse {
    #[serde(flatten)]
    pub step: QuizStep,
    pub recorded: bool,
}

/// Lists subjects and levels for the setup screen.
pub async fn get_catalog() -> impl IntoResponse {
    Json(CatalogResponse::build())
}

/// Starts a new quiz for the caller, discarding any previous attempt.
///
/// The caller's session stays locked while the question fetch is in flight;
/// a start that finds it locked by any other quiz request is rejected instead of queued.
pub async fn start_quiz(
    State(gateway): State<Gateway>,
    State(sessions): State<SessionRegistry>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<StartQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    // Reject bad input before the previous attempt is thrown away.
    QuizSelection::resolve(&req.subject, &req.level)?;

    let slot = sessions.slot(&user.email).await;
    let mut session = slot
        .try_lock()
        .map_err(|_| AppError::Conflict("Another quiz request is still in progress".to_string()))?;

    *session = QuizSession::new();
    let question = session.start(&gateway, &req.subject, &req.level).await?;

    tracing::info!(
        user = %user.email,
        subject = %req.subject,
        level = %req.level,
        "Quiz started"
    );
    Ok(Json(QuizStep::InProgress { question }))
}

/// Shows the current question, or the result once the quiz is completed.
pub async fn current_quiz(
    State(sessions): State<SessionRegistry>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let slot = sessions
        .existing(&user.email)
        .await
        .ok_or_else(|| AppError::NotFound("No quiz in progress".to_string()))?;
    let session = slot.lock().await;
    Ok(Json(session.view()?))
}

/// Records the answer the caller picked for the current question.
pub async fn select_answer(
    State(sessions): State<SessionRegistry>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<SelectAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let slot = sessions
        .existing(&user.email)
        .await
        .ok_or_else(|| AppError::NotFound("No quiz in progress".to_string()))?;
    let mut session = slot.lock().await;
    session.select(req.option)?;
    Ok(Json(session.view()?))
}

/// Scores the selected answer and moves to the next question.
///
/// After the last question the result is returned and, for learners, appended
/// to the leaderboard. The finished session is then discarded.
pub async fn next_question(
    State(gateway): State<Gateway>,
    State(sessions): State<SessionRegistry>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let slot = sessions
        .existing(&user.email)
        .await
        .ok_or_else(|| AppError::NotFound("No quiz in progress".to_string()))?;
    let mut session = slot.lock().await;

    let (step, recorded) = session.advance_and_record(&gateway, &user).await?;
    drop(session);

    // The result is delivered with this response; nothing further is kept.
    if matches!(step, QuizStep::Completed { .. }) {
        sessions.remove(&user.email).await;
    }

    Ok(Json(AdvanceResponse { step, recorded }))
}

/// Top scores for one subject ("Computing" is read as "ICT").
pub async fn get_leaderboard(
    State(gateway): State<Gateway>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<impl IntoResponse, AppError> {
    let entries: Vec<LeaderboardEntry> = gateway.load_collection(collections::LEADERBOARD).await?;
    Ok(Json(top_for_subject(&entries, &query.subject, LEADERBOARD_SIZE)))
}
