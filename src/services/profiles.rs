// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Student and trainer profiles, fences and trainer student lists.

use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::db::Database;
use crate::error::AppError;
use crate::models::forms::{describe_errors, StudentProfileUpdate, TrainerProfileUpdate};
use crate::models::{
    CalendarDisplay, GeoLocation, GeofenceConfig, Student, StudentSummary, Trainer,
    DEFAULT_FENCE_RADIUS_METERS,
};
use crate::services::calendar::to_calendar_display;
use crate::services::kv::KeyValueStore;
use crate::services::progress::ProgressStore;
use crate::services::workflow::{StudentSession, SyncStatus};

/// Local key for a trainer profile that could not be written remotely.
pub const TRAINER_DATA_KEY: &str = "trainerData";
/// Local key for the student's own profile copy.
pub const STUDENT_DATA_KEY: &str = "studentData";

/// A profile after an update, with its sync state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileUpdate<T> {
    pub profile: T,
    #[serde(flatten)]
    pub sync: SyncStatus,
}

#[derive(Clone)]
pub struct ProfileService {
    db: Database,
    kv: Arc<dyn KeyValueStore>,
    default_fence: GeofenceConfig,
}

impl ProfileService {
    pub fn new(db: Database, kv: Arc<dyn KeyValueStore>, default_fence: GeofenceConfig) -> Self {
        Self {
            db,
            kv,
            default_fence,
        }
    }

    fn local(&self, uid: &str) -> ProgressStore {
        ProgressStore::new(self.kv.clone(), uid)
    }

    pub async fn student(&self, uid: &str) -> Result<Student, AppError> {
        self.db
            .get_student(uid)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("student {}", uid)))
    }

    pub async fn trainer(&self, uid: &str) -> Result<Trainer, AppError> {
        self.db
            .get_trainer(uid)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("trainer {}", uid)))
    }

    /// Build the context for a signed-in student.
    ///
    /// Falls back to the locally saved profile when the backend is down.
    pub async fn session_for(&self, uid: &str) -> Result<StudentSession, AppError> {
        let student = match self.db.get_student(uid).await {
            Ok(Some(student)) => student,
            Ok(None) => return Err(AppError::NotFound(format!("student {}", uid))),
            Err(e) if e.is_transient() => {
                tracing::warn!(uid = %uid, error = %e, "Backend unreachable, using local profile");
                self.local(uid)
                    .load_json::<Student>(STUDENT_DATA_KEY)
                    .await?
                    .ok_or(AppError::from(e))?
            }
            Err(e) => return Err(e.into()),
        };

        let fence = self.fence_for(&student).await;
        Ok(StudentSession {
            student_id: uid.to_string(),
            trainer_id: student.trainer_id,
            fence,
        })
    }

    /// The trainer's published fence, or the configured default.
    pub async fn fence_for(&self, student: &Student) -> GeofenceConfig {
        if student.trainer_id.is_empty() {
            return self.default_fence;
        }

        match self.db.get_trainer(&student.trainer_id).await {
            Ok(Some(Trainer {
                location: Some(fence),
                ..
            })) => fence,
            Ok(_) => self.default_fence,
            Err(e) => {
                tracing::warn!(
                    trainer_id = %student.trainer_id,
                    error = %e,
                    "Could not read trainer fence, using default"
                );
                self.default_fence
            }
        }
    }

    /// Publish the trainer's current position as the fence for their students.
    pub async fn set_trainer_fence(
        &self,
        uid: &str,
        location: GeoLocation,
        radius_meters: Option<f64>,
    ) -> Result<GeofenceConfig, AppError> {
        let radius = radius_meters.unwrap_or(DEFAULT_FENCE_RADIUS_METERS);
        if !radius.is_finite() || radius <= 0.0 {
            return Err(AppError::BadRequest(
                "radius must be a positive number of meters".to_string(),
            ));
        }
        if !(-90.0..=90.0).contains(&location.latitude)
            || !(-180.0..=180.0).contains(&location.longitude)
        {
            return Err(AppError::BadRequest("coordinates out of range".to_string()));
        }

        let fence = GeofenceConfig::new(location, radius);
        self.db
            .merge_trainer(uid, json!({ "location": fence }))
            .await?;

        tracing::info!(
            trainer_id = %uid,
            latitude = fence.latitude,
            longitude = fence.longitude,
            radius_meters = fence.radius_meters,
            "Trainer fence updated"
        );
        Ok(fence)
    }

    /// Update trainer settings; saved locally when the backend is down.
    pub async fn update_trainer(
        &self,
        uid: &str,
        update: TrainerProfileUpdate,
    ) -> Result<ProfileUpdate<Trainer>, AppError> {
        update
            .validate()
            .map_err(|e| AppError::BadRequest(describe_errors(&e)))?;

        let fields = json!({
            "name": update.name,
            "age": update.age,
            "sportSpecialty": update.sport_specialty,
            "email": update.email,
            "address": update.address,
        });

        let remote = match self.db.get_trainer(uid).await {
            Ok(Some(current)) => Ok(current),
            Ok(None) => return Err(AppError::NotFound(format!("trainer {}", uid))),
            Err(e) => Err(e),
        };

        let (mut profile, result) = match remote {
            Ok(current) => (current, self.db.merge_trainer(uid, fields).await),
            Err(e) => {
                let cached = self
                    .local(uid)
                    .load_json::<Trainer>(TRAINER_DATA_KEY)
                    .await?
                    .unwrap_or_else(|| Trainer {
                        trainer_id: uid.to_string(),
                        ..Default::default()
                    });
                (cached, Err(e))
            }
        };
        apply_trainer_update(&mut profile, update);

        if let Err(e) = &result {
            self.local(uid).save_json(TRAINER_DATA_KEY, &profile).await?;
            tracing::info!(trainer_id = %uid, error = %e, "Trainer profile saved locally");
        }

        Ok(ProfileUpdate {
            profile,
            sync: SyncStatus::from_mirror(uid, "trainer profile", result),
        })
    }

    /// Update the student's own settings: local copy first, then the backend.
    pub async fn update_student(
        &self,
        uid: &str,
        update: StudentProfileUpdate,
    ) -> Result<ProfileUpdate<Student>, AppError> {
        update
            .validate()
            .map_err(|e| AppError::BadRequest(describe_errors(&e)))?;

        let local = self.local(uid);
        let mut profile = match local.load_json::<Student>(STUDENT_DATA_KEY).await? {
            Some(profile) => profile,
            None => match self.db.get_student(uid).await {
                Ok(Some(profile)) => profile,
                Ok(None) => return Err(AppError::NotFound(format!("student {}", uid))),
                Err(e) => {
                    tracing::warn!(uid = %uid, error = %e, "No profile copy available, starting empty");
                    Student::default()
                }
            },
        };

        let fields = json!({
            "name": update.name,
            "age": update.age,
            "gender": update.gender,
            "email": update.email,
            "address": update.address,
            "trainerName": update.trainer_name,
            "sport": update.sport,
            "emergencyContact": update.emergency_contact,
        });
        apply_student_update(&mut profile, update);
        local.save_json(STUDENT_DATA_KEY, &profile).await?;

        let result = self.db.merge_student(uid, fields).await;
        Ok(ProfileUpdate {
            profile,
            sync: SyncStatus::from_mirror(uid, "student profile", result),
        })
    }

    /// Students linked to a trainer, optionally filtered by name or code.
    pub async fn students_for_trainer(
        &self,
        trainer_id: &str,
        search: Option<&str>,
    ) -> Result<Vec<StudentSummary>, AppError> {
        let students = self.db.students_for_trainer(trainer_id).await?;
        let search = search.map(str::trim).filter(|s| !s.is_empty());

        let summaries: Vec<StudentSummary> = students
            .iter()
            .map(|(id, student)| StudentSummary::from_student(id.clone(), student))
            .filter(|summary| search.map_or(true, |needle| summary.matches(needle)))
            .collect();

        tracing::debug!(trainer_id = %trainer_id, count = summaries.len(), "Listed students");
        Ok(summaries)
    }

    /// A student's profile as seen by their trainer.
    pub async fn student_for_trainer(
        &self,
        trainer_id: &str,
        student_uid: &str,
    ) -> Result<Student, AppError> {
        let student = self.student(student_uid).await?;
        if student.trainer_id != trainer_id {
            // Same answer as a missing student, so ids of other trainers' students don't leak.
            return Err(AppError::NotFound(format!("student {}", student_uid)));
        }
        Ok(student)
    }

    /// Remote attendance record of one of the trainer's students, rendered
    /// for the calendar.
    pub async fn attendance_calendar(
        &self,
        trainer_id: &str,
        student_uid: &str,
    ) -> Result<CalendarDisplay, AppError> {
        let student = self.student_for_trainer(trainer_id, student_uid).await?;
        Ok(to_calendar_display(&student.attendance))
    }

    /// Keep a local copy of a student's profile (done at sign-in).
    pub async fn cache_student(&self, uid: &str, student: &Student) -> Result<(), AppError> {
        self.local(uid).save_json(STUDENT_DATA_KEY, student).await?;
        Ok(())
    }
}

fn apply_trainer_update(profile: &mut Trainer, update: TrainerProfileUpdate) {
    profile.name = update.name;
    profile.age = Some(update.age);
    profile.sport_specialty = update.sport_specialty;
    profile.email = update.email;
    profile.address = update.address;
}

fn apply_student_update(profile: &mut Student, update: StudentProfileUpdate) {
    profile.name = update.name;
    profile.age = Some(update.age);
    profile.gender = update.gender;
    profile.email = update.email;
    profile.address = update.address;
    profile.trainer_name = update.trainer_name;
    profile.sport = update.sport;
    profile.emergency_contact = update.emergency_contact;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryBackend;
    use crate::services::kv::MemoryStore;

    fn service(backend: &MemoryBackend) -> ProfileService {
        ProfileService::new(
            Database::new(Arc::new(backend.clone())),
            Arc::new(MemoryStore::new()),
            GeofenceConfig::default(),
        )
    }

    async fn seed(backend: &MemoryBackend) -> Database {
        let db = Database::new(Arc::new(backend.clone()));
        db.put_trainer(
            "t1",
            &Trainer {
                trainer_id: "t1".into(),
                name: "Coach".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        for (uid, code, name, trainer) in [
            ("s1", "111111", "Maria Lopez", "t1"),
            ("s2", "222222", "John Smith", "t1"),
            ("s3", "333333", "Other Kid", "t2"),
        ] {
            db.put_student(
                uid,
                &Student {
                    student_id: code.into(),
                    name: name.into(),
                    trainer_id: trainer.into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        }
        db
    }

    fn trainer_update() -> TrainerProfileUpdate {
        TrainerProfileUpdate {
            name: "Coach Kim".into(),
            age: 45,
            sport_specialty: "Swimming".into(),
            email: "kim@example.com".into(),
            address: "Pool Lane 3".into(),
        }
    }

    #[tokio::test]
    async fn test_students_for_trainer_with_search() {
        let backend = MemoryBackend::new();
        seed(&backend).await;
        let profiles = service(&backend);

        let all = profiles.students_for_trainer("t1", None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|s| s.streak == 0));

        let found = profiles
            .students_for_trainer("t1", Some("LOPEZ"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "s1");

        let by_code = profiles
            .students_for_trainer("t1", Some("2222"))
            .await
            .unwrap();
        assert_eq!(by_code[0].name, "John Smith");

        let blank = profiles.students_for_trainer("t1", Some("  ")).await.unwrap();
        assert_eq!(blank.len(), 2);
    }

    #[tokio::test]
    async fn test_student_for_other_trainer_is_hidden() {
        let backend = MemoryBackend::new();
        seed(&backend).await;
        let profiles = service(&backend);

        assert!(profiles.student_for_trainer("t1", "s1").await.is_ok());
        assert!(matches!(
            profiles.student_for_trainer("t1", "s3").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_fence_defaults_and_trainer_override() {
        let backend = MemoryBackend::new();
        seed(&backend).await;
        let profiles = service(&backend);

        let session = profiles.session_for("s1").await.unwrap();
        assert_eq!(session.trainer_id, "t1");
        assert_eq!(session.fence, GeofenceConfig::default());

        let fence = profiles
            .set_trainer_fence("t1", GeoLocation::new(59.33, 18.06), None)
            .await
            .unwrap();
        assert_eq!(fence.radius_meters, 1000.0);

        let session = profiles.session_for("s1").await.unwrap();
        assert_eq!(session.fence, fence);

        assert!(matches!(
            profiles
                .set_trainer_fence("t1", GeoLocation::new(59.33, 18.06), Some(-5.0))
                .await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_session_falls_back_to_local_profile() {
        let backend = MemoryBackend::new();
        let db = seed(&backend).await;
        let profiles = service(&backend);

        let student = db.get_student("s1").await.unwrap().unwrap();
        profiles.cache_student("s1", &student).await.unwrap();

        backend.set_unreachable(true);
        let session = profiles.session_for("s1").await.unwrap();
        assert_eq!(session.trainer_id, "t1");
        assert_eq!(session.fence, GeofenceConfig::default());

        assert!(matches!(
            profiles.session_for("s2").await,
            Err(AppError::BackendUnreachable(_))
        ));
    }

    #[tokio::test]
    async fn test_update_trainer_online() {
        let backend = MemoryBackend::new();
        seed(&backend).await;
        let profiles = service(&backend);

        let updated = profiles.update_trainer("t1", trainer_update()).await.unwrap();
        assert!(updated.sync.synced);
        assert_eq!(updated.profile.name, "Coach Kim");
        assert_eq!(updated.profile.trainer_id, "t1");

        let stored = profiles.trainer("t1").await.unwrap();
        assert_eq!(stored.sport_specialty, "Swimming");
    }

    #[tokio::test]
    async fn test_update_trainer_offline_saves_locally() {
        let backend = MemoryBackend::new();
        seed(&backend).await;
        let kv = MemoryStore::new();
        let profiles = ProfileService::new(
            Database::new(Arc::new(backend.clone())),
            Arc::new(kv.clone()),
            GeofenceConfig::default(),
        );

        backend.set_unreachable(true);
        let updated = profiles.update_trainer("t1", trainer_update()).await.unwrap();
        assert!(!updated.sync.synced);
        assert!(updated.sync.notice.is_some());

        let raw = kv.get("t1/trainerData").await.unwrap().unwrap();
        let saved: Trainer = serde_json::from_str(&raw).unwrap();
        assert_eq!(saved.name, "Coach Kim");

        backend.set_unreachable(false);
        assert_eq!(profiles.trainer("t1").await.unwrap().name, "Coach");
    }

    #[tokio::test]
    async fn test_update_rejects_missing_fields_before_writing() {
        let backend = MemoryBackend::new();
        seed(&backend).await;
        let profiles = service(&backend);

        let mut update = trainer_update();
        update.address.clear();
        assert!(matches!(
            profiles.update_trainer("t1", update).await,
            Err(AppError::BadRequest(_))
        ));
        assert_eq!(profiles.trainer("t1").await.unwrap().address, "");
    }

    #[tokio::test]
    async fn test_update_student_local_then_remote() {
        let backend = MemoryBackend::new();
        seed(&backend).await;
        let profiles = service(&backend);

        let update = StudentProfileUpdate {
            name: "Maria L.".into(),
            age: 16,
            gender: "F".into(),
            email: String::new(),
            address: String::new(),
            trainer_name: "Coach".into(),
            sport: "Football".into(),
            emergency_contact: String::new(),
        };

        let updated = profiles.update_student("s1", update.clone()).await.unwrap();
        assert!(updated.sync.synced);
        assert_eq!(updated.profile.trainer_id, "t1");
        assert_eq!(profiles.student("s1").await.unwrap().name, "Maria L.");

        backend.set_unreachable(true);
        let offline = profiles
            .update_student(
                "s1",
                StudentProfileUpdate {
                    name: "Maria Lopez".into(),
                    ..update
                },
            )
            .await
            .unwrap();
        assert!(!offline.sync.synced);
        assert_eq!(offline.profile.name, "Maria Lopez");
    }

    #[tokio::test]
    async fn test_attendance_calendar_from_remote_record() {
        let backend = MemoryBackend::new();
        let db = seed(&backend).await;
        db.merge_student(
            "s1",
            json!({ "attendance": {
                "2025-01-01": { "marked": true },
                "2025-01-02": { "marked": false }
            }}),
        )
        .await
        .unwrap();
        let profiles = service(&backend);

        let calendar = profiles.attendance_calendar("t1", "s1").await.unwrap();
        assert_eq!(calendar.len(), 1);
        assert!(calendar["2025-01-01"].selected);

        assert!(profiles.attendance_calendar("t2", "s1").await.is_err());
    }
}
