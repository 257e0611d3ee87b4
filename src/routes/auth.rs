// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account routes: sign-up, login, password reset, logout.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, SESSION_COOKIE};
use crate::models::forms::{StudentSignUp, TrainerSignUp};
use crate::models::{Credentials, Role, Student, Trainer};
use crate::services::SignedIn;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/signup/student", post(signup_student))
        .route("/auth/signup/trainer", post(signup_trainer))
        .route("/auth/password-reset", post(password_reset))
        .route("/auth/logout", post(logout))
}

/// Login response; exactly one of `trainer`/`student` is set.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/generated/")
)]
pub struct LoginResponse {
    pub token: String,
    pub uid: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "binding-generation", ts(optional))]
    pub trainer: Option<Trainer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "binding-generation", ts(skip))]
    pub student: Option<Student>,
}

/// Authenticate and start a session (cookie + token in the body).
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(credentials): Json<Credentials>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    let signed_in = state.accounts.sign_in(credentials).await?;
    let uid = signed_in.uid().to_string();
    let role = signed_in.role();

    let token = create_jwt(&uid, role, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    let (trainer, student) = match signed_in {
        SignedIn::Trainer { profile, .. } => (Some(profile), None),
        SignedIn::Student { profile, .. } => {
            // Keep a local copy so the workflow still has a context offline.
            if let Err(e) = state.profiles.cache_student(&uid, &profile).await {
                tracing::warn!(uid = %uid, error = %e, "Failed to cache student profile");
            }
            (None, Some(profile))
        }
    };

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/");

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            token,
            uid,
            role,
            trainer,
            student,
        }),
    ))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpResponse {
    pub uid: String,
    #[serde(rename = "studentID", skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(rename = "trainerID", skip_serializing_if = "Option::is_none")]
    pub trainer_id: Option<String>,
}

async fn signup_student(
    State(state): State<Arc<AppState>>,
    Json(form): Json<StudentSignUp>,
) -> Result<(StatusCode, Json<SignUpResponse>)> {
    let (user, student) = state.accounts.sign_up_student(form).await?;
    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            uid: user.uid,
            student_id: Some(student.student_id),
            trainer_id: Some(student.trainer_id),
        }),
    ))
}

async fn signup_trainer(
    State(state): State<Arc<AppState>>,
    Json(form): Json<TrainerSignUp>,
) -> Result<(StatusCode, Json<SignUpResponse>)> {
    let (user, trainer) = state.accounts.sign_up_trainer(form).await?;
    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            uid: user.uid,
            student_id: None,
            trainer_id: Some(trainer.trainer_id),
        }),
    ))
}

#[derive(Deserialize)]
pub struct PasswordResetRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

async fn password_reset(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PasswordResetRequest>,
) -> Result<Json<MessageResponse>> {
    state.accounts.reset_password(&request.email).await?;
    Ok(Json(MessageResponse {
        message: "Password reset email sent".to_string(),
    }))
}

/// Logout - clears the session cookie. Bearer tokens expire on their own.
async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    (
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        StatusCode::NO_CONTENT,
    )
}
