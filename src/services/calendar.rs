// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Attendance record → calendar markings.

use crate::models::{AttendanceMap, CalendarDisplay, CalendarDisplayEntry, MARKED_COLOR};

/// Render marked days for the calendar widget.
///
/// Unmarked entries are dropped rather than rendered as `marked: false`.
pub fn to_calendar_display(attendance: &AttendanceMap) -> CalendarDisplay {
    attendance
        .iter()
        .filter(|(_, record)| record.marked)
        .map(|(date, _)| {
            (
                date.clone(),
                CalendarDisplayEntry {
                    marked: true,
                    selected: true,
                    selected_color: Some(MARKED_COLOR.to_string()),
                },
            )
        })
        .collect()
}
