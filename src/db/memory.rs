//! In-process backend for tests and offline development.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::db::{Backend, BackendError, Document, FieldPath, WriteMode};
use crate::models::AuthenticatedUser;
use crate::services::identity::IdentityProvider;

#[derive(Clone)]
struct Account {
    uid: String,
    password: String,
}

/// Documents and accounts held in memory.
///
/// `set_unreachable(true)` makes every call fail with
/// [`BackendError::Unreachable`], which is how tests exercise the
/// local-only fallback paths.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    documents: Arc<DashMap<(String, String), Value>>,
    accounts: Arc<DashMap<String, Account>>,
    next_uid: Arc<AtomicU64>,
    unreachable: Arc<AtomicBool>,
    reset_requests: Arc<Mutex<Vec<String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Register an account directly; returns its uid.
    pub fn add_account(&self, email: &str, password: &str) -> String {
        let uid = format!("uid-{}", self.next_uid.fetch_add(1, Ordering::SeqCst) + 1);
        self.accounts.insert(
            email.to_lowercase(),
            Account {
                uid: uid.clone(),
                password: password.to_string(),
            },
        );
        uid
    }

    /// Emails that a password reset was requested for.
    pub fn reset_requests(&self) -> Vec<String> {
        self.reset_requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Raw document snapshot, bypassing the unreachable toggle.
    pub fn document(&self, collection: &str, id: &str) -> Option<Value> {
        self.documents
            .get(&(collection.to_string(), id.to_string()))
            .map(|d| d.value().clone())
    }

    fn check(&self) -> Result<(), BackendError> {
        if self.unreachable.load(Ordering::SeqCst) {
            Err(BackendError::Unreachable("memory backend offline".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Copy the value at each path from `data` into `target`, replacing what
/// was there. Paths absent from `data` are removed from `target`.
fn apply_paths(target: &mut Map<String, Value>, data: &Map<String, Value>, paths: &[FieldPath]) {
    'paths: for path in paths {
        let Some((last, parents)) = path.segments().split_last() else {
            continue;
        };

        let mut source = Some(data);
        for segment in parents {
            source = source.and_then(|m| m.get(segment)).and_then(Value::as_object);
        }
        let value = source.and_then(|m| m.get(last)).cloned();

        let mut node = &mut *target;
        for segment in parents {
            let child = node
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            match child {
                Value::Object(map) => node = map,
                _ => continue 'paths,
            }
        }

        match value {
            Some(value) => {
                node.insert(last.clone(), value);
            }
            None => {
                node.remove(last);
            }
        }
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Value>, BackendError> {
        self.check()?;
        Ok(self.document(collection, id))
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        data: Value,
        mode: WriteMode,
    ) -> Result<(), BackendError> {
        self.check()?;
        let Value::Object(fields) = data else {
            return Err(BackendError::Rejected(
                "document must be a JSON object".to_string(),
            ));
        };

        let key = (collection.to_string(), id.to_string());
        match mode.mask(&fields) {
            None => {
                self.documents.insert(key, Value::Object(fields));
            }
            Some(paths) => {
                let mut entry = self
                    .documents
                    .entry(key)
                    .or_insert_with(|| Value::Object(Map::new()));
                if !entry.is_object() {
                    *entry = Value::Object(Map::new());
                }
                if let Value::Object(existing) = entry.value_mut() {
                    apply_paths(existing, &fields, &paths);
                }
            }
        }
        Ok(())
    }

    async fn query_documents(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>, BackendError> {
        self.check()?;
        let mut docs: Vec<Document> = self
            .documents
            .iter()
            .filter(|entry| {
                entry.key().0 == collection
                    && entry.value().get(field).and_then(Value::as_str) == Some(value)
            })
            .map(|entry| Document {
                id: entry.key().1.clone(),
                data: entry.value().clone(),
            })
            .collect();
        docs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(docs)
    }
}

#[async_trait]
impl IdentityProvider for MemoryBackend {
    async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, BackendError> {
        self.check()?;
        match self.accounts.get(&email.to_lowercase()) {
            Some(account) if account.password == password => Ok(AuthenticatedUser {
                uid: account.uid.clone(),
                email: email.to_string(),
            }),
            _ => Err(BackendError::InvalidCredentials),
        }
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, BackendError> {
        self.check()?;
        if self.accounts.contains_key(&email.to_lowercase()) {
            return Err(BackendError::EmailInUse);
        }
        let uid = self.add_account(email, password);
        Ok(AuthenticatedUser {
            uid,
            email: email.to_string(),
        })
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), BackendError> {
        self.check()?;
        if let Ok(mut requests) = self.reset_requests.lock() {
            requests.push(email.to_string());
        }
        Ok(())
    }
}
