// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Sign-up and profile forms, validated before anything is persisted.

use serde::Deserialize;
use validator::{Validate, ValidationErrors};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StudentSignUp {
    #[validate(length(min = 1, message = "full name is required"))]
    pub full_name: String,
    #[validate(range(min = 1, max = 120, message = "age must be between 1 and 120"))]
    pub age: u32,
    #[validate(length(min = 1, message = "sport is required"))]
    pub sport: String,
    #[validate(length(min = 1, message = "gender is required"))]
    pub gender: String,
    #[validate(email(message = "a valid email is required"))]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "passwords do not match"))]
    pub confirm_password: String,
    #[serde(rename = "trainerID")]
    #[validate(length(min = 1, message = "trainer ID is required"))]
    pub trainer_id: String,
    /// Generated when absent.
    #[serde(rename = "studentID", default)]
    #[validate(length(min = 1, message = "student ID must not be empty"))]
    pub student_id: Option<String>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub emergency_contact: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TrainerSignUp {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "a valid email is required"))]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "passwords do not match"))]
    pub confirm_password: String,
    #[serde(default)]
    #[validate(range(min = 1, max = 120, message = "age must be between 1 and 120"))]
    pub age: Option<u32>,
    #[serde(default)]
    pub sport_specialty: String,
    #[serde(default)]
    pub address: String,
}

/// Trainer settings: every field is required.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TrainerProfileUpdate {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(range(min = 1, max = 120, message = "age must be between 1 and 120"))]
    pub age: u32,
    #[validate(length(min = 1, message = "sport specialty is required"))]
    pub sport_specialty: String,
    #[validate(email(message = "a valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
}

/// Student settings: name, age and gender are required.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfileUpdate {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(range(min = 1, max = 120, message = "age must be between 1 and 120"))]
    pub age: u32,
    #[validate(length(min = 1, message = "gender is required"))]
    pub gender: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub trainer_name: String,
    #[serde(default)]
    pub sport: String,
    #[serde(default)]
    pub emergency_contact: String,
}

/// Flatten validation errors into one user-facing message.
pub fn describe_errors(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| match &err.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect();
    messages.sort();
    messages.join("; ")
}
