// src/handlers/auth.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{
        Account, CurrentUser, LoginRequest, LoginResponse, RegisterRequest, Role, normalize_email,
    },
    session::SessionRegistry,
    store::{Gateway, collections},
    utils::{
        hash::{hash_password, verify_password},
        jwt::sign_jwt,
    },
};

/// Registers a learner or teacher account.
///
/// The email must not exist in either account collection, whatever the role.
/// Returns 201 Created and the public profile (no password hash).
pub async fn register(
    State(gateway): State<Gateway>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let email = normalize_email(&payload.email);
    let account = Account {
        name: payload.name.trim().to_string(),
        email: email.clone(),
        password_hash: hash_password(&payload.password)?,
        role: payload.role,
        created_at: chrono::Utc::now(),
    };

    let tx = gateway.transaction().await;
    let learners: Vec<Account> = tx.load(collections::LEARNERS).await?;
    let teachers: Vec<Account> = tx.load(collections::TEACHERS).await?;

    if learners
        .iter()
        .chain(teachers.iter())
        .any(|a| normalize_email(&a.email) == email)
    {
        return Err(AppError::DuplicateAccount(format!(
            "An account with email '{}' already exists",
            email
        )));
    }

    let (name, mut records) = match account.role {
        Role::Learner => (collections::LEARNERS, learners),
        Role::Teacher => (collections::TEACHERS, teachers),
    };
    records.push(account.clone());
    tx.save(name, &records).await?;

    tracing::info!(email = %account.email, role = account.role.as_str(), "Account registered");
    Ok((StatusCode::CREATED, Json(account.profile())))
}

/// Authenticates against both account collections and returns a JWT.
///
/// On success the account also becomes the store's current user.
pub async fn login(
    State(gateway): State<Gateway>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let account = find_account(&gateway, &payload.email)
        .await?
        .filter(|account| verify_password(&payload.password, &account.password_hash))
        .ok_or_else(|| AppError::AuthError("Invalid email or password".to_string()))?;

    let user = account.profile();
    let token = sign_jwt(&user, &config.jwt_secret, config.jwt_expiration)?;
    gateway.set_current_user(&user).await?;

    tracing::info!(email = %user.email, "User logged in");
    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        user,
    }))
}

/// Signs the caller out of this store and drops their quiz session.
/// Someone else's current-user record is left alone.
pub async fn logout(
    State(gateway): State<Gateway>,
    State(sessions): State<SessionRegistry>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    sessions.remove(&user.email).await;
    if let Some(current) = gateway.get_current_user().await? {
        if current.email == user.email {
            gateway.clear_current_user().await?;
        }
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Returns who is currently signed in on this store.
pub async fn current_session(State(gateway): State<Gateway>) -> Result<impl IntoResponse, AppError> {
    let user = gateway
        .get_current_user()
        .await?
        .ok_or_else(|| AppError::NotFound("No user is signed in".to_string()))?;
    Ok(Json(user))
}

async fn find_account(gateway: &Gateway, email: &str) -> Result<Option<Account>, AppError> {
    let email = normalize_email(email);
    for name in [collections::LEARNERS, collections::TEACHERS] {
        let accounts: Vec<Account> = gateway.load_collection(name).await?;
        if let Some(account) = accounts
            .into_iter()
            .find(|a| normalize_email(&a.email) == email)
        {
            return Ok(Some(account));
        }
    }
    Ok(None)
}
