//! Attendance thresholds.

/// Minimum attended share for "attended enough classes".
pub const ATTENDANCE_THRESHOLD: f64 = 0.75;
/// Minimum attended share for certification.
pub const CERTIFICATION_THRESHOLD: f64 = 0.80;

/// Attended share, or `None` when there were no classes.
fn attendance_ratio(total_classes: f64, attended_classes: f64) -> Option<f64> {
    if total_classes > 0.0 {
        Some(attended_classes / total_classes)
    } else {
        None
    }
}

/// True iff at least 75% of classes were attended. Zero classes is false.
pub fn has_attended_enough_classes(total_classes: f64, attended_classes: f64) -> bool {
    attendance_ratio(total_classes, attended_classes).is_some_and(|r| r >= ATTENDANCE_THRESHOLD)
}

/// True iff at least 80% of classes were attended. Zero classes is false.
pub fn is_eligible_for_certification(total_classes: f64, attended_classes: f64) -> bool {
    attendance_ratio(total_classes, attended_classes)
        .is_some_and(|r| r >= CERTIFICATION_THRESHOLD)
}
