use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        catalog::Subject,
        pending_question::{PendingQuestion, ReviewStatus, SubmitQuestionRequest, next_id},
        question::{AnswerOption, OptionKey},
        user::CurrentUser,
    },
    store::{Gateway, collections},
    utils::html::clean_html,
};

/// Submit a question to the review queue.
/// Teacher only; the subject is stored in its canonical form.
pub async fn submit_question(
    State(gateway): State<Gateway>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<SubmitQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(|e| AppError::BadRequest(e.to_string()))?;

    let subject = Subject::parse(&payload.subject).ok_or_else(|| {
        AppError::InvalidSelection(format!("Unknown subject '{}'", payload.subject))
    })?;

    let prompt = clean_html(&payload.prompt);
    if prompt.is_empty() {
        return Err(AppError::BadRequest("Question text is empty".to_string()));
    }

    let options: Vec<AnswerOption> = OptionKey::ALL
        .into_iter()
        .filter_map(|key| {
            payload.options.get(&key).map(|text| AnswerOption {
                key,
                text: clean_html(text),
            })
        })
        .collect();

    let now = chrono::Utc::now();

    let tx = gateway.transaction().await;
    let mut pending: Vec<PendingQuestion> = tx.load(collections::PENDING_QUESTIONS).await?;
    let id = next_id(now.timestamp_millis(), pending.iter().map(|q| q.id).max());

    let question = PendingQuestion {
        id,
        author_name: user.name.clone(),
        author_email: user.email.clone(),
        subject: subject.label().to_string(),
        prompt,
        options,
        correct_option: payload.correct_option,
        status: ReviewStatus::PendingReview,
        created_at: now,
    };
    pending.push(question.clone());
    tx.save(collections::PENDING_QUESTIONS, &pending).await?;

    tracing::info!(id, author = %user.email, subject = %question.subject, "Question submitted for review");
    Ok((StatusCode::CREATED, Json(question)))
}

/// Lists the caller's own submissions, newest first.
pub async fn list_my_questions(
    State(gateway): State<Gateway>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let pending: Vec<PendingQuestion> = gateway
        .load_collection(collections::PENDING_QUESTIONS)
        .await?;

    let mut mine: Vec<PendingQuestion> = pending
        .into_iter()
        .filter(|q| q.author_email == user.email)
        .collect();
    mine.sort_by(|a, b| b.id.cmp(&a.id));

    Ok(Json(mine))
}
