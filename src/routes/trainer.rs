// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trainer routes (role `trainer`).

use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::forms::TrainerProfileUpdate;
use crate::models::{
    CalendarDisplay, GeoLocation, GeofenceConfig, Student, StudentSummary, TaskBoard, Trainer,
};
use crate::services::profiles::ProfileUpdate;
use crate::services::workflow::TasksUpdate;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/trainer/me", get(get_me))
        .route("/api/trainer/profile", put(update_profile))
        .route("/api/trainer/fence", put(set_fence))
        .route("/api/trainer/students", get(list_students))
        .route("/api/trainer/students/{id}", get(get_student))
        .route(
            "/api/trainer/students/{id}/attendance",
            get(get_student_attendance),
        )
        .route("/api/trainer/students/{id}/tasks", put(assign_tasks))
}

async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Trainer>> {
    Ok(Json(state.profiles.trainer(&user.uid).await?))
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(update): Json<TrainerProfileUpdate>,
) -> Result<Json<ProfileUpdate<Trainer>>> {
    Ok(Json(state.profiles.update_trainer(&user.uid, update).await?))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FenceRequest {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub radius_meters: Option<f64>,
}

/// Publish the trainer's current position as the attendance fence.
async fn set_fence(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<FenceRequest>,
) -> Result<Json<GeofenceConfig>> {
    let location = GeoLocation::new(request.latitude, request.longitude);
    let fence = state
        .profiles
        .set_trainer_fence(&user.uid, location, request.radius_meters)
        .await?;
    Ok(Json(fence))
}

#[derive(Deserialize)]
pub struct StudentListParams {
    pub search: Option<String>,
}

#[derive(Serialize)]
pub struct StudentListResponse {
    pub students: Vec<StudentSummary>,
    pub total: usize,
}

async fn list_students(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<StudentListParams>,
) -> Result<Json<StudentListResponse>> {
    let students = state
        .profiles
        .students_for_trainer(&user.uid, params.search.as_deref())
        .await?;
    let total = students.len();
    Ok(Json(StudentListResponse { students, total }))
}

async fn get_student(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(student_uid): Path<String>,
) -> Result<Json<Student>> {
    let student = state
        .profiles
        .student_for_trainer(&user.uid, &student_uid)
        .await?;
    Ok(Json(student))
}

async fn get_student_attendance(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(student_uid): Path<String>,
) -> Result<Json<CalendarDisplay>> {
    let calendar = state
        .profiles
        .attendance_calendar(&user.uid, &student_uid)
        .await?;
    Ok(Json(calendar))
}

/// Replace a student's task board. The student picks it up on next load.
async fn assign_tasks(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(student_uid): Path<String>,
    Json(tasks): Json<TaskBoard>,
) -> Result<Json<TasksUpdate>> {
    state
        .profiles
        .student_for_trainer(&user.uid, &student_uid)
        .await?;
    let update = state.workflow.assign_tasks(&student_uid, tasks).await?;
    Ok(Json(update))
}
