// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-up, sign-in and password reset.
//!
//! Forms are validated before any account or document is created.

use ring::rand::{SecureRandom, SystemRandom};
use std::sync::Arc;
use validator::Validate;

use crate::db::Database;
use crate::error::AppError;
use crate::models::forms::{describe_errors, StudentSignUp, TrainerSignUp};
use crate::models::{AuthenticatedUser, Credentials, Role, Student, Trainer};
use crate::services::identity::IdentityProvider;

/// Student codes are six digits.
const STUDENT_CODE_MIN: u32 = 100_000;
const STUDENT_CODE_SPAN: u32 = 900_000;
const CODE_ATTEMPTS: usize = 5;

/// Default profile image for new students.
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/150";

/// Generate a random six-digit student code.
pub fn generate_student_code(rng: &dyn SecureRandom) -> Result<String, AppError> {
    let mut bytes = [0u8; 4];
    rng.fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("random generator failed")))?;
    let n = STUDENT_CODE_MIN + u32::from_le_bytes(bytes) % STUDENT_CODE_SPAN;
    Ok(n.to_string())
}

/// Profile loaded at sign-in.
#[derive(Debug, Clone)]
pub enum SignedIn {
    Trainer { user: AuthenticatedUser, profile: Trainer },
    Student { user: AuthenticatedUser, profile: Student },
}

impl SignedIn {
    pub fn uid(&self) -> &str {
        match self {
            SignedIn::Trainer { user, .. } | SignedIn::Student { user, .. } => &user.uid,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            SignedIn::Trainer { .. } => Role::Trainer,
            SignedIn::Student { .. } => Role::Student,
        }
    }
}

#[derive(Clone)]
pub struct AccountService {
    identity: Arc<dyn IdentityProvider>,
    db: Database,
    rng: Arc<SystemRandom>,
}

impl AccountService {
    pub fn new(identity: Arc<dyn IdentityProvider>, db: Database) -> Self {
        Self {
            identity,
            db,
            rng: Arc::new(SystemRandom::new()),
        }
    }

    /// Create a student account linked to an existing trainer.
    pub async fn sign_up_student(
        &self,
        form: StudentSignUp,
    ) -> Result<(AuthenticatedUser, Student), AppError> {
        form.validate()
            .map_err(|e| AppError::BadRequest(describe_errors(&e)))?;

        let trainer = self
            .db
            .get_trainer(&form.trainer_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("trainer {}", form.trainer_id)))?;

        let student_id = match form.student_id {
            Some(code) => code,
            None => self.unused_student_code().await?,
        };

        let user = self.identity.sign_up(&form.email, &form.password).await?;

        let student = Student {
            student_id,
            name: form.full_name,
            age: Some(form.age),
            gender: form.gender,
            email: form.email,
            address: form.address,
            trainer_id: form.trainer_id,
            trainer_name: trainer.name,
            sport: form.sport,
            emergency_contact: form.emergency_contact,
            image: Some(PLACEHOLDER_IMAGE.to_string()),
            ..Default::default()
        };
        self.db.put_student(&user.uid, &student).await?;

        tracing::info!(
            uid = %user.uid,
            student_id = %student.student_id,
            trainer_id = %student.trainer_id,
            "Student signed up"
        );
        Ok((user, student))
    }

    /// Draw codes until one is not taken by an existing student.
    async fn unused_student_code(&self) -> Result<String, AppError> {
        for _ in 0..CODE_ATTEMPTS {
            let code = generate_student_code(self.rng.as_ref())?;
            if self.db.find_student_by_code(&code).await?.is_none() {
                return Ok(code);
            }
            tracing::debug!(code = %code, "Student code taken, drawing again");
        }
        Err(AppError::Internal(anyhow::anyhow!(
            "no free student code after {} attempts",
            CODE_ATTEMPTS
        )))
    }

    /// Create a trainer account; the trainer id is the account uid.
    pub async fn sign_up_trainer(
        &self,
        form: TrainerSignUp,
    ) -> Result<(AuthenticatedUser, Trainer), AppError> {
        form.validate()
            .map_err(|e| AppError::BadRequest(describe_errors(&e)))?;

        let user = self.identity.sign_up(&form.email, &form.password).await?;

        let trainer = Trainer {
            trainer_id: user.uid.clone(),
            name: form.name,
            age: form.age,
            sport_specialty: form.sport_specialty,
            email: form.email,
            address: form.address,
            location: None,
        };
        self.db.put_trainer(&user.uid, &trainer).await?;

        tracing::info!(uid = %user.uid, "Trainer signed up");
        Ok((user, trainer))
    }

    /// Authenticate and load the profile for the requested role.
    pub async fn sign_in(&self, credentials: Credentials) -> Result<SignedIn, AppError> {
        credentials
            .validate()
            .map_err(|e| AppError::BadRequest(describe_errors(&e)))?;

        let user = self
            .identity
            .sign_in(&credentials.email, &credentials.password)
            .await?;

        let signed_in = match credentials.role {
            Role::Trainer => {
                let profile = self
                    .db
                    .get_trainer(&user.uid)
                    .await?
                    .ok_or_else(|| AppError::NotFound("trainer profile".to_string()))?;
                SignedIn::Trainer { user, profile }
            }
            Role::Student => {
                let profile = self
                    .db
                    .get_student(&user.uid)
                    .await?
                    .ok_or_else(|| AppError::NotFound("student profile".to_string()))?;
                SignedIn::Student { user, profile }
            }
        };

        tracing::info!(uid = %signed_in.uid(), role = %signed_in.role(), "Signed in");
        Ok(signed_in)
    }

    pub async fn reset_password(&self, email: &str) -> Result<(), AppError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AppError::BadRequest("email is required".to_string()));
        }
        self.identity.send_password_reset(email).await?;
        tracing::info!("Password reset requested");
        Ok(())
    }
}
