// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Attendance records and their calendar rendering.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Highlight color for attended days on the client calendar.
pub const MARKED_COLOR: &str = "#DA0037";

/// One explicitly marked day.
///
/// A date key only exists once attendance was marked; a missing key means
/// "not marked", never "absent".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/generated/")
)]
pub struct AttendanceRecord {
    pub marked: bool,
    /// When the mark was made (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl AttendanceRecord {
    pub fn marked_at(timestamp: String) -> Self {
        Self {
            marked: true,
            timestamp: Some(timestamp),
        }
    }
}

/// Attendance history keyed by `YYYY-MM-DD`. Append-only.
pub type AttendanceMap = BTreeMap<String, AttendanceRecord>;

/// Calendar entry derived from an [`AttendanceRecord`]. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/generated/")
)]
pub struct CalendarDisplayEntry {
    pub marked: bool,
    pub selected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_color: Option<String>,
}

/// Calendar markings keyed by `YYYY-MM-DD`.
pub type CalendarDisplay = BTreeMap<String, CalendarDisplayEntry>;
