//! Daily task streak.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::TaskBoard;

/// Consecutive-save counter.
///
/// `streak` grows at most once per calendar day, and only when every task is
/// completed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/generated/")
)]
pub struct StreakState {
    pub streak: u32,
    #[cfg_attr(feature = "binding-generation", ts(type = "string | null"))]
    pub last_saved_date: Option<NaiveDate>,
}

/// Result of a save attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Already saved today; nothing changed.
    AlreadySaved,
    /// Streak grew by one and `last_saved_date` moved to today.
    Incremented,
    /// At least one task is still open; nothing changed.
    IncompleteTasks,
}

impl StreakState {
    pub fn save(&mut self, today: NaiveDate, tasks: &TaskBoard) -> SaveOutcome {
        if self.last_saved_date == Some(today) {
            return SaveOutcome::AlreadySaved;
        }
        if !tasks.all_completed() {
            return SaveOutcome::IncompleteTasks;
        }
        self.streak += 1;
        self.last_saved_date = Some(today);
        SaveOutcome::Incremented
    }

    /// Zero the counter. `last_saved_date` is left as is, so a reset does not
    /// re-open today for saving.
    pub fn reset(&mut self) {
        self.streak = 0;
    }
}
