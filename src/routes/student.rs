// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Student routes (role `student`).
//! The auth and role middleware are applied in routes/mod.rs.

use axum::{
    extract::{Query, State},
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::forms::StudentProfileUpdate;
use crate::models::{CalendarDisplay, GeofenceConfig, StreakState, Student, TaskBoard, TaskId};
use crate::services::eligibility::{has_attended_enough_classes, is_eligible_for_certification};
use crate::services::geofence::ReportedLocation;
use crate::services::profiles::ProfileUpdate;
use crate::services::to_calendar_display;
use crate::services::workflow::{AttendanceMarked, StreakUpdate, TasksUpdate};
use crate::time_utils::date_key;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/student/dashboard", get(get_dashboard))
        .route("/api/student/attendance", post(mark_attendance))
        .route("/api/student/attendance/calendar", get(get_calendar))
        .route("/api/student/progress", post(save_progress))
        .route("/api/student/streak/reset", post(reset_streak))
        .route("/api/student/tasks/toggle", post(toggle_task))
        .route("/api/student/profile", put(update_profile))
        .route("/api/student/eligibility", get(get_eligibility))
}

// ─── Dashboard ───────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/generated/")
)]
pub struct DashboardResponse {
    pub uid: String,
    #[serde(rename = "trainerID")]
    pub trainer_id: String,
    pub fence: GeofenceConfig,
    pub tasks: TaskBoard,
    #[serde(flatten)]
    pub streak: StreakState,
    pub calendar: CalendarDisplay,
    pub marked_today: bool,
}

async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DashboardResponse>> {
    let session = state.profiles.session_for(&user.uid).await?;
    let progress = state.workflow.load(&session).await?;

    let today = date_key(Utc::now().date_naive());
    let marked_today = progress.attendance.get(&today).is_some_and(|r| r.marked);

    Ok(Json(DashboardResponse {
        uid: session.student_id,
        trainer_id: session.trainer_id,
        fence: session.fence,
        tasks: progress.tasks,
        streak: progress.streak,
        calendar: to_calendar_display(&progress.attendance),
        marked_today,
    }))
}

// ─── Attendance ──────────────────────────────────────────────

/// Mark today's attendance from the position the device reported.
async fn mark_attendance(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(location): Json<ReportedLocation>,
) -> Result<Json<AttendanceMarked>> {
    let session = state.profiles.session_for(&user.uid).await?;
    let marked = state
        .workflow
        .mark_attendance(&session, &location, Utc::now())
        .await?;
    Ok(Json(marked))
}

async fn get_calendar(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<CalendarDisplay>> {
    let attendance = state
        .workflow
        .progress_store(&user.uid)
        .load_attendance()
        .await?;
    Ok(Json(to_calendar_display(&attendance)))
}

// ─── Streak & Tasks ──────────────────────────────────────────

async fn save_progress(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StreakUpdate>> {
    let session = state.profiles.session_for(&user.uid).await?;
    let update = state
        .workflow
        .save_progress(&session, Utc::now().date_naive())
        .await?;
    Ok(Json(update))
}

async fn reset_streak(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StreakUpdate>> {
    let session = state.profiles.session_for(&user.uid).await?;
    Ok(Json(state.workflow.reset_streak(&session).await?))
}

#[derive(Deserialize)]
pub struct ToggleTaskRequest {
    pub category: String,
    pub id: TaskId,
}

async fn toggle_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<ToggleTaskRequest>,
) -> Result<Json<TasksUpdate>> {
    let session = state.profiles.session_for(&user.uid).await?;
    let update = state
        .workflow
        .toggle_task(&session, &request.category, &request.id)
        .await?;
    Ok(Json(update))
}

// ─── Profile ─────────────────────────────────────────────────

async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(update): Json<StudentProfileUpdate>,
) -> Result<Json<ProfileUpdate<Student>>> {
    Ok(Json(state.profiles.update_student(&user.uid, update).await?))
}

// ─── Eligibility ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct EligibilityParams {
    pub total_classes: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/generated/")
)]
pub struct EligibilityResponse {
    pub total_classes: f64,
    pub attended_classes: f64,
    pub has_attended_enough_classes: bool,
    pub is_eligible_for_certification: bool,
}

/// Check both attendance thresholds against the locally recorded days.
async fn get_eligibility(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<EligibilityParams>,
) -> Result<Json<EligibilityResponse>> {
    if !params.total_classes.is_finite() || params.total_classes < 0.0 {
        return Err(AppError::BadRequest(
            "total_classes must be a non-negative number".to_string(),
        ));
    }

    let attendance = state
        .workflow
        .progress_store(&user.uid)
        .load_attendance()
        .await?;
    let attended = attendance.values().filter(|r| r.marked).count() as f64;

    Ok(Json(EligibilityResponse {
        total_classes: params.total_classes,
        attended_classes: attended,
        has_attended_enough_classes: has_attended_enough_classes(params.total_classes, attended),
        is_eligible_for_certification: is_eligible_for_certification(
            params.total_classes,
            attended,
        ),
    }))
}
