// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running and
//! FIRESTORE_EMULATOR_HOST to point at it. Without it they return early.

use gameplan::db::Database;
use gameplan::models::{AttendanceRecord, GeofenceConfig, Student, TaskBoard, TaskItem, Trainer};
use gameplan::services::ProgressMirror;
use serde_json::json;
use std::sync::Arc;

mod common;
use common::test_db;

/// Unique id per test run for isolation.
fn unique_id(prefix: &str) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}-{}", prefix, nanos)
}

async fn database() -> Database {
    Database::new(Arc::new(test_db().await))
}

fn test_student(trainer_id: &str, code: &str) -> Student {
    Student {
        student_id: code.to_string(),
        name: "Test Student".to_string(),
        age: Some(17),
        trainer_id: trainer_id.to_string(),
        trainer_name: "Coach".to_string(),
        sport: "Football".to_string(),
        ..Default::default()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// PROFILE DOCUMENTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_student_round_trip() {
    require_emulator!();

    let db = database().await;
    let uid = unique_id("student");

    assert!(db.get_student(&uid).await.unwrap().is_none());

    let student = test_student("trainer-1", "123456");
    db.put_student(&uid, &student).await.unwrap();

    let fetched = db.get_student(&uid).await.unwrap().unwrap();
    assert_eq!(fetched, student);
}

#[tokio::test]
async fn test_merge_keeps_other_fields() {
    require_emulator!();

    let db = database().await;
    let uid = unique_id("trainer");
    let trainer = Trainer {
        trainer_id: uid.clone(),
        name: "Coach".to_string(),
        email: "coach@example.com".to_string(),
        ..Default::default()
    };
    db.put_trainer(&uid, &trainer).await.unwrap();

    let fence = GeofenceConfig::default();
    db.merge_trainer(&uid, json!({ "location": fence }))
        .await
        .unwrap();

    let fetched = db.get_trainer(&uid).await.unwrap().unwrap();
    assert_eq!(fetched.name, "Coach");
    assert_eq!(fetched.location, Some(fence));
}

#[tokio::test]
async fn test_students_for_trainer_query() {
    require_emulator!();

    let db = database().await;
    let trainer = unique_id("trainer");
    let a = unique_id("a");
    let b = unique_id("b");
    db.put_student(&a, &test_student(&trainer, "111111"))
        .await
        .unwrap();
    db.put_student(&b, &test_student(&trainer, "222222"))
        .await
        .unwrap();
    db.put_student(&unique_id("c"), &test_student("someone-else", "333333"))
        .await
        .unwrap();

    let students = db.students_for_trainer(&trainer).await.unwrap();
    let mut ids: Vec<&str> = students.iter().map(|(id, _)| id.as_str()).collect();
    ids.sort();
    let mut expected = vec![a.as_str(), b.as_str()];
    expected.sort();
    assert_eq!(ids, expected);

    let (_, found) = db.find_student_by_code("222222").await.unwrap().unwrap();
    assert_eq!(found.student_id, "222222");
}

// ═══════════════════════════════════════════════════════════════════════════
// PROGRESS MIRROR
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_attendance_mirror_accumulates_days() {
    require_emulator!();

    let db = database().await;
    let uid = unique_id("student");
    db.put_student(&uid, &test_student("trainer-1", "123456"))
        .await
        .unwrap();

    let record = AttendanceRecord::marked_at("2025-03-01T09:00:00Z".to_string());
    db.mirror_attendance(&uid, "2025-03-01", &record)
        .await
        .unwrap();
    db.mirror_attendance(&uid, "2025-03-02", &record)
        .await
        .unwrap();
    db.mirror_streak(&uid, 4).await.unwrap();

    let fetched = db.get_student(&uid).await.unwrap().unwrap();
    assert_eq!(fetched.attendance.len(), 2);
    assert!(fetched.attendance["2025-03-01"].marked);
    assert_eq!(fetched.streak, 4);
    assert_eq!(fetched.name, "Test Student");
}

#[tokio::test]
async fn test_tasks_mirror_round_trip() {
    require_emulator!();

    let db = database().await;
    let uid = unique_id("student");
    db.put_student(&uid, &test_student("trainer-1", "123456"))
        .await
        .unwrap();

    assert!(db.fetch_tasks(&uid).await.unwrap().is_none());

    let tasks = TaskBoard::default().with_category(
        "Exercise",
        vec![TaskItem::new(1, "Sprint"), TaskItem::new("warmup", "Warm up")],
    );
    db.mirror_tasks(&uid, &tasks).await.unwrap();

    assert_eq!(db.fetch_tasks(&uid).await.unwrap(), Some(tasks));
}

#[tokio::test]
async fn test_tasks_mirror_drops_removed_categories() {
    require_emulator!();

    let db = database().await;
    let uid = unique_id("student");
    db.put_student(&uid, &test_student("trainer-1", "123456"))
        .await
        .unwrap();

    let full = TaskBoard::default()
        .with_category("Exercise", vec![TaskItem::new(1, "Sprint")])
        .with_category("Stretching", vec![TaskItem::new(2, "Hamstrings")]);
    db.mirror_tasks(&uid, &full).await.unwrap();

    let smaller = TaskBoard::default().with_category("Exercise", vec![TaskItem::new(1, "Sprint")]);
    db.mirror_tasks(&uid, &smaller).await.unwrap();

    assert_eq!(db.fetch_tasks(&uid).await.unwrap(), Some(smaller));
    assert_eq!(db.get_student(&uid).await.unwrap().unwrap().name, "Test Student");
}
