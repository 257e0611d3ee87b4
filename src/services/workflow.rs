// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Attendance and streak workflow for one student.
//!
//! Every mutation follows the same two-tier write:
//! 1. Update and persist the local progress store (must succeed)
//! 2. Mirror the change to the remote backend (best effort)
//!
//! A mirror failure never rolls back the local write; it is reported back as
//! `synced: false` with a notice for the user.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::db::{BackendError, Database, FieldPath};
use crate::error::AppError;
use crate::models::{
    AttendanceRecord, GeofenceConfig, SaveOutcome, StreakState, TaskBoard, TaskId,
};
use crate::services::geofence::{check_fence, LocationProvider};
use crate::services::kv::KeyValueStore;
use crate::services::progress::{Progress, ProgressStore};
use crate::time_utils::{date_key, format_utc_rfc3339};

/// Shown when the local write succeeded but the backend could not be updated.
pub const NOT_SYNCED_NOTICE: &str =
    "Saved on this device only. The server could not be reached, so your trainer will not see this change yet.";

/// Per-student locks serializing workflow runs.
///
/// An entry only lives while some request holds or waits on it.
pub type StudentLocks = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// Exclusive access to one student's progress.
struct StudentGuard {
    locks: StudentLocks,
    student_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for StudentGuard {
    fn drop(&mut self) {
        self.guard.take();
        // Only the map still holds the mutex: nobody is waiting, drop the entry.
        self.locks
            .remove_if(&self.student_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

/// Who is acting, passed explicitly through every operation.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentSession {
    /// Account uid; also the student document id and local namespace.
    pub student_id: String,
    pub trainer_id: String,
    /// Fence attendance is checked against.
    pub fence: GeofenceConfig,
}

/// Remote tier of the two-tier write.
#[async_trait]
pub trait ProgressMirror: Send + Sync {
    async fn mirror_attendance(
        &self,
        student_id: &str,
        date: &str,
        record: &AttendanceRecord,
    ) -> Result<(), BackendError>;

    async fn mirror_streak(&self, student_id: &str, streak: u32) -> Result<(), BackendError>;

    async fn mirror_tasks(&self, student_id: &str, tasks: &TaskBoard) -> Result<(), BackendError>;

    /// Tasks assigned remotely, used to seed a student with no local board.
    async fn fetch_tasks(&self, student_id: &str) -> Result<Option<TaskBoard>, BackendError>;
}

#[async_trait]
impl ProgressMirror for Database {
    async fn mirror_attendance(
        &self,
        student_id: &str,
        date: &str,
        record: &AttendanceRecord,
    ) -> Result<(), BackendError> {
        self.merge_student_paths(
            student_id,
            json!({ "attendance": { date: record } }),
            vec![FieldPath::new(["attendance", date])],
        )
        .await
    }

    async fn mirror_streak(&self, student_id: &str, streak: u32) -> Result<(), BackendError> {
        self.merge_student(student_id, json!({ "streak": streak })).await
    }

    /// The board replaces the remote `tasks` field whole, so removed
    /// categories do not linger.
    async fn mirror_tasks(&self, student_id: &str, tasks: &TaskBoard) -> Result<(), BackendError> {
        self.merge_student(student_id, json!({ "tasks": tasks })).await
    }

    async fn fetch_tasks(&self, student_id: &str) -> Result<Option<TaskBoard>, BackendError> {
        Ok(self.get_student(student_id).await?.and_then(|s| s.tasks))
    }
}

/// Whether the remote mirror took the write.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/generated/")
)]
pub struct SyncStatus {
    pub synced: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl SyncStatus {
    pub(crate) fn from_mirror(student_id: &str, what: &str, result: Result<(), BackendError>) -> Self {
        match result {
            Ok(()) => Self {
                synced: true,
                notice: None,
            },
            Err(e) => {
                tracing::warn!(
                    student_id = %student_id,
                    what = what,
                    error = %e,
                    "Remote mirror failed, kept local copy only"
                );
                Self {
                    synced: false,
                    notice: Some(NOT_SYNCED_NOTICE.to_string()),
                }
            }
        }
    }

    /// Nothing was written, so nothing needs syncing.
    pub(crate) fn unchanged() -> Self {
        Self {
            synced: true,
            notice: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceMarked {
    pub date: String,
    pub record: AttendanceRecord,
    pub distance_meters: f64,
    #[serde(flatten)]
    pub sync: SyncStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakUpdate {
    #[serde(flatten)]
    pub state: StreakState,
    /// False when today was already saved and nothing changed.
    pub changed: bool,
    #[serde(flatten)]
    pub sync: SyncStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TasksUpdate {
    pub tasks: TaskBoard,
    #[serde(flatten)]
    pub sync: SyncStatus,
}

/// Attendance/streak state machine over the local store and a remote mirror.
#[derive(Clone)]
pub struct AttendanceWorkflow {
    kv: Arc<dyn KeyValueStore>,
    mirror: Arc<dyn ProgressMirror>,
    locks: StudentLocks,
}

impl AttendanceWorkflow {
    pub fn new(kv: Arc<dyn KeyValueStore>, mirror: Arc<dyn ProgressMirror>) -> Self {
        Self {
            kv,
            mirror,
            locks: Arc::new(DashMap::new()),
        }
    }

    pub fn progress_store(&self, student_id: &str) -> ProgressStore {
        ProgressStore::new(self.kv.clone(), student_id)
    }

    async fn lock_student(&self, student_id: &str) -> StudentGuard {
        let lock = self
            .locks
            .entry(student_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = lock.lock_owned().await;

        StudentGuard {
            locks: self.locks.clone(),
            student_id: student_id.to_string(),
            guard: Some(guard),
        }
    }

    /// Current progress, seeding the task board from the backend on first use.
    pub async fn load(&self, session: &StudentSession) -> Result<Progress, AppError> {
        let _guard = self.lock_student(&session.student_id).await;

        let store = self.progress_store(&session.student_id);
        let mut progress = store.load().await?;

        if store.load_tasks().await?.is_none() {
            match self.mirror.fetch_tasks(&session.student_id).await {
                Ok(Some(tasks)) => {
                    tracing::info!(student_id = %session.student_id, "Seeded tasks from backend");
                    store.save_tasks(&tasks).await?;
                    progress.tasks = tasks;
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(student_id = %session.student_id, error = %e, "Could not fetch assigned tasks");
                }
            }
        }

        Ok(progress)
    }

    /// Mark today as attended if the device is inside the fence.
    ///
    /// At most one record per calendar day (UTC). Fence failures and an
    /// existing record are rejected without touching any state.
    pub async fn mark_attendance(
        &self,
        session: &StudentSession,
        location: &dyn LocationProvider,
        now: DateTime<Utc>,
    ) -> Result<AttendanceMarked, AppError> {
        let _guard = self.lock_student(&session.student_id).await;

        let status = check_fence(location, &session.fence).await;
        let distance_meters = status.ensure_inside().inspect_err(|e| {
            tracing::info!(student_id = %session.student_id, reason = %e, "Attendance rejected");
        })?;

        let store = self.progress_store(&session.student_id);
        let mut attendance = store.load_attendance().await?;
        let date = date_key(now.date_naive());

        if attendance.get(&date).is_some_and(|r| r.marked) {
            tracing::info!(student_id = %session.student_id, date = %date, "Attendance already marked");
            return Err(AppError::AlreadyMarkedToday(date));
        }

        let record = AttendanceRecord::marked_at(format_utc_rfc3339(now));
        attendance.insert(date.clone(), record.clone());
        store.save_attendance(&attendance).await?;

        tracing::info!(
            student_id = %session.student_id,
            date = %date,
            distance_meters = distance_meters,
            "Attendance marked"
        );

        let sync = SyncStatus::from_mirror(
            &session.student_id,
            "attendance",
            self.mirror
                .mirror_attendance(&session.student_id, &date, &record)
                .await,
        );

        Ok(AttendanceMarked {
            date,
            record,
            distance_meters,
            sync,
        })
    }

    /// Count today toward the streak if every task is completed.
    pub async fn save_progress(
        &self,
        session: &StudentSession,
        today: NaiveDate,
    ) -> Result<StreakUpdate, AppError> {
        let _guard = self.lock_student(&session.student_id).await;

        let store = self.progress_store(&session.student_id);
        let tasks = store.load_tasks().await?.unwrap_or_default();
        let mut state = store.load_streak().await?;

        match state.save(today, &tasks) {
            SaveOutcome::AlreadySaved => {
                tracing::debug!(student_id = %session.student_id, "Progress already saved today");
                Ok(StreakUpdate {
                    state,
                    changed: false,
                    sync: SyncStatus::unchanged(),
                })
            }
            SaveOutcome::IncompleteTasks => {
                tracing::info!(student_id = %session.student_id, "Save rejected, tasks incomplete");
                Err(AppError::IncompleteTasks)
            }
            SaveOutcome::Incremented => {
                store.save_streak(&state).await?;
                tracing::info!(
                    student_id = %session.student_id,
                    streak = state.streak,
                    date = %today,
                    "Streak incremented"
                );

                let sync = SyncStatus::from_mirror(
                    &session.student_id,
                    "streak",
                    self.mirror
                        .mirror_streak(&session.student_id, state.streak)
                        .await,
                );
                Ok(StreakUpdate {
                    state,
                    changed: true,
                    sync,
                })
            }
        }
    }

    /// Zero the streak; the last saved date is kept.
    pub async fn reset_streak(&self, session: &StudentSession) -> Result<StreakUpdate, AppError> {
        let _guard = self.lock_student(&session.student_id).await;

        let store = self.progress_store(&session.student_id);
        let mut state = store.load_streak().await?;
        let previous = state.streak;
        state.reset();
        store.save_streak_count(state.streak).await?;

        tracing::info!(student_id = %session.student_id, previous = previous, "Streak reset");

        let sync = SyncStatus::from_mirror(
            &session.student_id,
            "streak",
            self.mirror.mirror_streak(&session.student_id, 0).await,
        );
        Ok(StreakUpdate {
            state,
            changed: true,
            sync,
        })
    }

    /// Flip one task and persist the whole board.
    pub async fn toggle_task(
        &self,
        session: &StudentSession,
        category: &str,
        id: &TaskId,
    ) -> Result<TasksUpdate, AppError> {
        let _guard = self.lock_student(&session.student_id).await;

        let store = self.progress_store(&session.student_id);
        let mut tasks = store.load_tasks().await?.unwrap_or_default();

        let completed = tasks
            .toggle(category, id)
            .ok_or_else(|| AppError::NotFound(format!("task {} in {}", id, category)))?;
        store.save_tasks(&tasks).await?;

        tracing::debug!(
            student_id = %session.student_id,
            category = category,
            task_id = %id,
            completed = completed,
            "Task toggled"
        );

        let sync = SyncStatus::from_mirror(
            &session.student_id,
            "tasks",
            self.mirror.mirror_tasks(&session.student_id, &tasks).await,
        );
        Ok(TasksUpdate { tasks, sync })
    }

    /// Replace a student's task board (trainer assignment).
    pub async fn assign_tasks(
        &self,
        student_id: &str,
        tasks: TaskBoard,
    ) -> Result<TasksUpdate, AppError> {
        let _guard = self.lock_student(student_id).await;

        self.progress_store(student_id).save_tasks(&tasks).await?;
        tracing::info!(student_id = %student_id, count = tasks.task_count(), "Tasks assigned");

        let sync = SyncStatus::from_mirror(
            student_id,
            "tasks",
            self.mirror.mirror_tasks(student_id, &tasks).await,
        );
        Ok(TasksUpdate { tasks, sync })
    }
}
