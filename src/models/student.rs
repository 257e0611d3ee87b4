// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Student profile document.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{AttendanceMap, TaskBoard};

/// Student profile stored at `students/{uid}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    /// Six-digit code shown to trainers (not the document id).
    #[serde(rename = "studentID", default)]
    pub student_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(rename = "trainerID", default)]
    pub trainer_id: String,
    #[serde(default)]
    pub trainer_name: String,
    #[serde(default)]
    pub sport: String,
    #[serde(default)]
    pub emergency_contact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub attendance: AttendanceMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<TaskBoard>,
}

/// Row in a trainer's student list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/generated/")
)]
pub struct StudentSummary {
    /// Document id.
    pub id: String,
    #[serde(rename = "studentID")]
    pub student_id: String,
    pub name: String,
    pub sport: String,
    pub streak: u32,
}

impl StudentSummary {
    pub fn from_student(id: String, student: &Student) -> Self {
        Self {
            id,
            student_id: student.student_id.clone(),
            name: student.name.clone(),
            sport: student.sport.clone(),
            streak: student.streak,
        }
    }

    /// Case-insensitive substring match on name or student code.
    pub fn matches(&self, search: &str) -> bool {
        let needle = search.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.student_id.to_lowercase().contains(&needle)
    }
}
