//! Database layer (remote document store).
//!
//! [`Backend`] is the raw document API; [`Database`] adds typed operations
//! on top of it for the collections the app uses.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryBackend;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use crate::models::{Student, Trainer};

/// Collection names as constants.
pub mod collections {
    pub const STUDENTS: &str = "students";
    pub const TRAINERS: &str = "trainers";
}

/// Errors from the remote backend (documents and identity).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("email already in use")]
    EmailInUse,

    #[error("unreachable: {0}")]
    Unreachable(String),

    #[error("rejected: {0}")]
    Rejected(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl BackendError {
    /// True when retrying later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, BackendError::Unreachable(_))
    }
}

/// Path to a possibly nested field, one segment per map key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Dotted form for update masks; segments that are not plain
    /// identifiers (dates, for one) are backquoted.
    pub fn to_mask(&self) -> String {
        self.0
            .iter()
            .map(|segment| quote_segment(segment))
            .collect::<Vec<_>>()
            .join(".")
    }
}

fn quote_segment(segment: &str) -> String {
    let mut chars = segment.chars();
    let simple = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if simple {
        segment.to_string()
    } else {
        format!("`{}`", segment.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

/// How `set_document` treats fields that are not in the written value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace the whole document.
    Overwrite,
    /// Replace each top-level field present in the value as a whole; other
    /// top-level fields are kept.
    Merge,
    /// Replace only the values at these paths. A path missing from the
    /// written value deletes that field.
    MergePaths(Vec<FieldPath>),
}

impl WriteMode {
    /// Fields a write touches, or `None` for a full overwrite.
    pub fn mask(&self, data: &serde_json::Map<String, Value>) -> Option<Vec<FieldPath>> {
        match self {
            WriteMode::Overwrite => None,
            WriteMode::Merge => Some(data.keys().map(|k| FieldPath::new([k.as_str()])).collect()),
            WriteMode::MergePaths(paths) => Some(paths.clone()),
        }
    }
}

/// A document returned by a query.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

#[async_trait]
pub trait Backend: Send + Sync {
    async fn get_document(&self, collection: &str, id: &str)
        -> Result<Option<Value>, BackendError>;

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        data: Value,
        mode: WriteMode,
    ) -> Result<(), BackendError>;

    /// Documents whose top-level string `field` equals `value`.
    async fn query_documents(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>, BackendError>;
}

/// Typed access to student and trainer documents.
#[derive(Clone)]
pub struct Database {
    backend: Arc<dyn Backend>,
}

impl Database {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    // ─── Student Operations ──────────────────────────────────────

    pub async fn get_student(&self, uid: &str) -> Result<Option<Student>, BackendError> {
        self.get_typed(collections::STUDENTS, uid).await
    }

    /// Create or replace a student profile.
    pub async fn put_student(&self, uid: &str, student: &Student) -> Result<(), BackendError> {
        let data = to_value(student)?;
        self.backend
            .set_document(collections::STUDENTS, uid, data, WriteMode::Overwrite)
            .await
    }

    /// Replace the given top-level fields of a student profile.
    pub async fn merge_student(&self, uid: &str, fields: Value) -> Result<(), BackendError> {
        self.backend
            .set_document(collections::STUDENTS, uid, fields, WriteMode::Merge)
            .await
    }

    /// Replace only the values at `paths`, taken from `fields`.
    pub async fn merge_student_paths(
        &self,
        uid: &str,
        fields: Value,
        paths: Vec<FieldPath>,
    ) -> Result<(), BackendError> {
        self.backend
            .set_document(collections::STUDENTS, uid, fields, WriteMode::MergePaths(paths))
            .await
    }

    /// All students linked to a trainer, de-duplicated by document id.
    pub async fn students_for_trainer(
        &self,
        trainer_id: &str,
    ) -> Result<Vec<(String, Student)>, BackendError> {
        let docs = self
            .backend
            .query_documents(collections::STUDENTS, "trainerID", trainer_id)
            .await?;

        let mut seen = std::collections::HashSet::new();
        let mut students = Vec::with_capacity(docs.len());
        for doc in docs {
            if !seen.insert(doc.id.clone()) {
                continue;
            }
            let student: Student = from_value(&doc.id, doc.data)?;
            students.push((doc.id, student));
        }
        Ok(students)
    }

    /// Look up a student by their six-digit code.
    pub async fn find_student_by_code(
        &self,
        student_id: &str,
    ) -> Result<Option<(String, Student)>, BackendError> {
        let docs = self
            .backend
            .query_documents(collections::STUDENTS, "studentID", student_id)
            .await?;

        match docs.into_iter().next() {
            Some(doc) => {
                let student = from_value(&doc.id, doc.data)?;
                Ok(Some((doc.id, student)))
            }
            None => Ok(None),
        }
    }

    // ─── Trainer Operations ──────────────────────────────────────

    pub async fn get_trainer(&self, uid: &str) -> Result<Option<Trainer>, BackendError> {
        self.get_typed(collections::TRAINERS, uid).await
    }

    pub async fn put_trainer(&self, uid: &str, trainer: &Trainer) -> Result<(), BackendError> {
        let data = to_value(trainer)?;
        self.backend
            .set_document(collections::TRAINERS, uid, data, WriteMode::Overwrite)
            .await
    }

    pub async fn merge_trainer(&self, uid: &str, fields: Value) -> Result<(), BackendError> {
        self.backend
            .set_document(collections::TRAINERS, uid, fields, WriteMode::Merge)
            .await
    }

    async fn get_typed<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<T>, BackendError> {
        match self.backend.get_document(collection, id).await? {
            Some(data) => from_value(id, data).map(Some),
            None => Ok(None),
        }
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, BackendError> {
    serde_json::to_value(value).map_err(|e| BackendError::Malformed(e.to_string()))
}

fn from_value<T: DeserializeOwned>(id: &str, data: Value) -> Result<T, BackendError> {
    serde_json::from_value(data).map_err(|e| BackendError::Malformed(format!("{}: {}", id, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_path_masks() {
        assert_eq!(FieldPath::new(["trainerID"]).to_mask(), "trainerID");
        assert_eq!(FieldPath::new(["_x1"]).to_mask(), "_x1");
        assert_eq!(
            FieldPath::new(["attendance", "2025-01-02"]).to_mask(),
            "attendance.`2025-01-02`"
        );
        assert_eq!(FieldPath::new(["a b"]).to_mask(), "`a b`");
        assert_eq!(FieldPath::new(["a`b"]).to_mask(), "`a\\`b`");
    }

    #[test]
    fn test_merge_mask_is_top_level_only() {
        let data = json!({
            "streak": 2,
            "tasks": { "Exercise": [], "Practice": [] }
        });

        let mut masks: Vec<String> = WriteMode::Merge
            .mask(data.as_object().unwrap())
            .unwrap()
            .iter()
            .map(FieldPath::to_mask)
            .collect();
        masks.sort();
        assert_eq!(masks, vec!["streak", "tasks"]);

        assert_eq!(WriteMode::Overwrite.mask(data.as_object().unwrap()), None);
    }
}
