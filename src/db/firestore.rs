// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper implementing [`Backend`].
//!
//! Provides the raw document operations:
//! - Get a document by id
//! - Overwrite or merge a document (merges send an update mask)
//! - Equality queries on one top-level field

use async_trait::async_trait;
use firestore::errors::FirestoreError;
use serde_json::Value;

use crate::db::{Backend, BackendError, Document, FieldPath, WriteMode};

/// Unsigned token the emulator accepts.
const EMULATOR_TOKEN: &str = "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0.";

/// Prefix of the metadata fields the firestore crate adds when deserializing.
const METADATA_PREFIX: &str = "_firestore_";

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// `emulator_host` connects unauthenticated to a local emulator.
    /// `static_token` is sent as-is instead of application default credentials.
    pub async fn new(
        project_id: &str,
        emulator_host: Option<&str>,
        static_token: Option<String>,
    ) -> anyhow::Result<Self> {
        let client = match (emulator_host, static_token) {
            (Some(host), _) => {
                tracing::info!(host = host, "Using unauthenticated connection for Firestore Emulator");
                let options = firestore::FirestoreDbOptions::new(project_id.to_string())
                    .with_firebase_api_url(format!("http://{}", host));
                Self::with_fixed_token(options, EMULATOR_TOKEN.to_string()).await?
            }
            (None, Some(token)) => {
                let options = firestore::FirestoreDbOptions::new(project_id.to_string());
                Self::with_fixed_token(options, token).await?
            }
            (None, None) => firestore::FirestoreDb::new(project_id)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to Firestore: {}", e))?,
        };

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Connect with a bearer token that never needs refreshing.
    async fn with_fixed_token(
        options: firestore::FirestoreDbOptions,
        token: String,
    ) -> anyhow::Result<firestore::FirestoreDb> {
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(move || {
            let token = token.clone();
            async move {
                Ok(gcloud_sdk::Token {
                    token_type: "Bearer".to_string(),
                    token: gcloud_sdk::SecretValue::new(token.into()),
                    expiry: chrono::Utc::now() + chrono::Duration::hours(1),
                })
            }
        });

        firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to Firestore: {}", e))
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations return [`BackendError::Unreachable`].
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, BackendError> {
        self.client.as_ref().ok_or_else(|| {
            BackendError::Unreachable("Database not connected (offline mode)".to_string())
        })
    }
}

/// Classify a client error; only transient failures become `Unreachable`.
fn backend_error(e: FirestoreError) -> BackendError {
    let message = e.to_string();
    match e {
        FirestoreError::DataNotFoundError(_) => BackendError::NotFound(message),
        FirestoreError::NetworkError(_) => BackendError::Unreachable(message),
        FirestoreError::SerializeError(_) | FirestoreError::DeserializeError(_) => {
            BackendError::Malformed(message)
        }
        FirestoreError::InvalidParametersError(_) | FirestoreError::DataConflictError(_) => {
            BackendError::Rejected(message)
        }
        FirestoreError::DatabaseError(ref db) if db.retry_possible => {
            BackendError::Unreachable(message)
        }
        FirestoreError::DatabaseError(_) => {
            if message.contains("PermissionDenied") || message.contains("Unauthenticated") {
                BackendError::PermissionDenied(message)
            } else {
                BackendError::Rejected(message)
            }
        }
        _ => BackendError::Unreachable(message),
    }
}

/// Last segment of a document's resource name.
fn document_id(doc: &firestore::FirestoreDocument) -> &str {
    doc.name.rsplit('/').next().unwrap_or(&doc.name)
}

/// Document fields as plain JSON, without the crate's metadata fields.
fn document_to_json(doc: &firestore::FirestoreDocument) -> Result<Value, BackendError> {
    let mut data: Value = firestore::FirestoreDb::deserialize_doc_to(doc)
        .map_err(|e| BackendError::Malformed(format!("{}: {}", document_id(doc), e)))?;
    if let Value::Object(fields) = &mut data {
        fields.retain(|key, _| !key.starts_with(METADATA_PREFIX));
    }
    Ok(data)
}

#[async_trait]
impl Backend for FirestoreDb {
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Value>, BackendError> {
        let doc = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collection)
            .one(id)
            .await
            .map_err(backend_error)?;

        doc.as_ref().map(document_to_json).transpose()
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        data: Value,
        mode: WriteMode,
    ) -> Result<(), BackendError> {
        let client = self.get_client()?;
        let fields = data
            .as_object()
            .ok_or_else(|| BackendError::Rejected("document must be a JSON object".to_string()))?;

        let _: () = match mode.mask(fields) {
            None => client
                .fluent()
                .update()
                .in_col(collection)
                .document_id(id)
                .object(&data)
                .execute()
                .await
                .map_err(backend_error)?,
            Some(paths) => client
                .fluent()
                .update()
                .fields(paths.iter().map(FieldPath::to_mask))
                .in_col(collection)
                .document_id(id)
                .object(&data)
                .execute()
                .await
                .map_err(backend_error)?,
        };

        tracing::debug!(collection = collection, id = id, ?mode, "Wrote document");
        Ok(())
    }

    async fn query_documents(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>, BackendError> {
        let docs = self
            .get_client()?
            .fluent()
            .select()
            .from(collection)
            .filter(|q| q.field(field).eq(value))
            .query()
            .await
            .map_err(backend_error)?;

        docs.iter()
            .map(|doc| {
                Ok(Document {
                    id: document_id(doc).to_string(),
                    data: document_to_json(doc)?,
                })
            })
            .collect()
    }
}
