//! Trainer profile document.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::GeofenceConfig;

/// Trainer profile stored at `trainers/{uid}`.
///
/// `trainer_id` equals the document id; students reference it in their own
/// profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/generated/")
)]
pub struct Trainer {
    #[serde(rename = "trainerID", default)]
    pub trainer_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub sport_specialty: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    /// Attendance fence for this trainer's students.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeofenceConfig>,
}
