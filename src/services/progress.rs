// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-student progress persisted in a [`KeyValueStore`].
//!
//! Layout (one value per key, scoped by student uid):
//! - `tasks`: JSON task board
//! - `attendanceDates`: JSON map of `YYYY-MM-DD` → attendance record
//! - `streak`: decimal integer
//! - `lastSavedDate`: `YYYY-MM-DD`, or empty

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::models::{AttendanceMap, StreakState, TaskBoard};
use crate::services::kv::{KeyValueStore, StoreError};
use crate::time_utils::{date_key, parse_date_key};

pub const TASKS_KEY: &str = "tasks";
pub const ATTENDANCE_KEY: &str = "attendanceDates";
pub const STREAK_KEY: &str = "streak";
pub const LAST_SAVED_DATE_KEY: &str = "lastSavedDate";

/// Everything the dashboard needs, as stored locally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Progress {
    pub tasks: TaskBoard,
    pub attendance: AttendanceMap,
    pub streak: StreakState,
}

/// A key-value store scoped to one student.
#[derive(Clone)]
pub struct ProgressStore {
    kv: Arc<dyn KeyValueStore>,
    namespace: String,
}

impl ProgressStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, namespace: impl Into<String>) -> Self {
        Self {
            kv,
            namespace: namespace.into(),
        }
    }

    fn key(&self, name: &str) -> String {
        format!("{}/{}", self.namespace, name)
    }

    /// Load all progress; absent keys fall back to defaults.
    pub async fn load(&self) -> Result<Progress, StoreError> {
        let tasks = self.load_tasks().await?.unwrap_or_default();
        let attendance = self.load_json(ATTENDANCE_KEY).await?.unwrap_or_default();
        let streak = self.load_streak().await?;

        Ok(Progress {
            tasks,
            attendance,
            streak,
        })
    }

    /// The stored task board, or `None` if tasks were never written.
    pub async fn load_tasks(&self) -> Result<Option<TaskBoard>, StoreError> {
        self.load_json(TASKS_KEY).await
    }

    pub async fn load_attendance(&self) -> Result<AttendanceMap, StoreError> {
        Ok(self.load_json(ATTENDANCE_KEY).await?.unwrap_or_default())
    }

    pub async fn load_streak(&self) -> Result<StreakState, StoreError> {
        let streak = match self.get_raw(STREAK_KEY).await? {
            Some(raw) => raw.trim().parse::<u32>().map_err(|e| StoreError::Corrupt {
                key: self.key(STREAK_KEY),
                message: e.to_string(),
            })?,
            None => 0,
        };

        let last_saved_date = match self.get_raw(LAST_SAVED_DATE_KEY).await? {
            Some(raw) if !raw.trim().is_empty() => {
                Some(parse_date_key(raw.trim()).ok_or_else(|| StoreError::Corrupt {
                    key: self.key(LAST_SAVED_DATE_KEY),
                    message: format!("not a YYYY-MM-DD date: {:?}", raw),
                })?)
            }
            _ => None,
        };

        Ok(StreakState {
            streak,
            last_saved_date,
        })
    }

    pub async fn save_tasks(&self, tasks: &TaskBoard) -> Result<(), StoreError> {
        self.save_json(TASKS_KEY, tasks).await
    }

    pub async fn save_attendance(&self, attendance: &AttendanceMap) -> Result<(), StoreError> {
        self.save_json(ATTENDANCE_KEY, attendance).await
    }

    /// Persist both the last saved date and the counter.
    ///
    /// The date goes first: if the counter write then fails, the day is
    /// consumed without an increment, never incremented twice.
    pub async fn save_streak(&self, state: &StreakState) -> Result<(), StoreError> {
        let last = state.last_saved_date.map(date_key).unwrap_or_default();
        self.set_raw(LAST_SAVED_DATE_KEY, &last).await?;
        self.save_streak_count(state.streak).await
    }

    /// Persist only the counter.
    pub async fn save_streak_count(&self, streak: u32) -> Result<(), StoreError> {
        self.set_raw(STREAK_KEY, &streak.to_string()).await
    }

    pub async fn get_raw(&self, name: &str) -> Result<Option<String>, StoreError> {
        self.kv.get(&self.key(name)).await
    }

    pub async fn set_raw(&self, name: &str, value: &str) -> Result<(), StoreError> {
        self.kv.set(&self.key(name), value).await
    }

    pub async fn load_json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, StoreError> {
        match self.get_raw(name).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| StoreError::Corrupt {
                    key: self.key(name),
                    message: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    pub async fn save_json<T: Serialize>(&self, name: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(|e| StoreError::Corrupt {
            key: self.key(name),
            message: e.to_string(),
        })?;
        self.set_raw(name, &raw).await
    }
}
