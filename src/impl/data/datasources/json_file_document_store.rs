use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use fractic_server_error::ServerError;
use serde_json::{json, Map, Value};
use tokio::{fs, sync::RwLock};
use tracing::{info, warn};

use crate::errors::{InvalidJson, ReadError, StoreSerializationError, WriteError};

use super::{
    document_store::{Collection, DocumentStore},
    in_memory_document_store::Collections,
};

/// Document store backed by a single JSON file:
///
/// ```json
/// { "sections": [ {..} ], "payments": { "2026_0_j1": {..} }, "records": [ {..} ] }
/// ```
///
/// The whole file is rewritten (temp file, then rename) on every write.
#[derive(Debug)]
pub struct JsonFileDocumentStore {
    path: PathBuf,
    collections: RwLock<Collections>,
}

impl JsonFileDocumentStore {
    /// Loads `path`, or starts empty if the file does not exist yet.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, ServerError> {
        let path = path.as_ref().to_path_buf();
        let collections = match fs::read_to_string(&path).await {
            Ok(s) => parse_file(&s)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "Data file not found, starting empty.");
                Collections::default()
            }
            Err(e) => return Err(ReadError::with_debug(&e)),
        };
        info!(
            path = %path.display(),
            sections = collections.sections.len(),
            payments = collections.payments.len(),
            records = collections.records.len(),
            "Opened data file."
        );
        Ok(Self {
            path,
            collections: RwLock::new(collections),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn flush(&self, collections: &Collections) -> Result<(), ServerError> {
        let path_str = self.path.display().to_string();
        let contents = serde_json::to_string_pretty(&to_file_value(collections))
            .map_err(|e| StoreSerializationError::with_debug("data file", &e))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents)
            .await
            .map_err(|e| WriteError::with_debug(&path_str, &e))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| WriteError::with_debug(&path_str, &e))
    }
}

fn parse_file(s: &str) -> Result<Collections, ServerError> {
    if s.trim().is_empty() {
        return Ok(Collections::default());
    }
    let root: Value =
        serde_json::from_str(s).map_err(|e| InvalidJson::with_debug("data file", &e))?;
    Ok(Collections {
        sections: keyed_by_id(Collection::Sections, root.get("sections")),
        payments: payments(root.get("payments")),
        records: keyed_by_id(Collection::Records, root.get("records")),
    })
}

fn keyed_by_id(collection: Collection, value: Option<&Value>) -> Vec<(String, Value)> {
    let Some(Value::Array(docs)) = value else {
        return Vec::new();
    };
    docs.iter()
        .filter_map(|doc| match id_of(doc) {
            Some(id) => Some((id, doc.clone())),
            None => {
                warn!(collection = collection.name(), "Skipping document without an id.");
                None
            }
        })
        .collect()
}

/// Payments are normally a key -> document map; exported dumps may instead
/// hold a list of documents carrying their own `key`.
fn payments(value: Option<&Value>) -> Vec<(String, Value)> {
    match value {
        Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        Some(Value::Array(docs)) => docs
            .iter()
            .filter_map(|doc| match doc.get("key").and_then(Value::as_str) {
                Some(key) => Some((key.to_string(), doc.clone())),
                None => {
                    warn!("Skipping payment document without a key.");
                    None
                }
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn id_of(doc: &Value) -> Option<String> {
    match doc.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn to_file_value(collections: &Collections) -> Value {
    fn values(docs: &[(String, Value)]) -> Vec<Value> {
        docs.iter().map(|(_, v)| v.clone()).collect()
    }
    json!({
        "sections": values(&collections.sections),
        "payments": collections
            .payments
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect::<Map<String, Value>>(),
        "records": values(&collections.records),
    })
}

#[async_trait]
impl DocumentStore for JsonFileDocumentStore {
    async fn all(&self, collection: Collection) -> Result<Vec<(String, Value)>, ServerError> {
        Ok(self.collections.read().await.of(collection).clone())
    }

    async fn get(&self, collection: Collection, key: &str) -> Result<Option<Value>, ServerError> {
        Ok(self.collections.read().await.get(collection, key).cloned())
    }

    async fn put(
        &self,
        collection: Collection,
        key: &str,
        document: Value,
    ) -> Result<(), ServerError> {
        let mut collections = self.collections.write().await;
        let mut updated = collections.clone();
        updated.put(collection, key, document);
        self.flush(&updated).await?;
        *collections = updated;
        Ok(())
    }

    async fn remove(&self, collection: Collection, key: &str) -> Result<bool, ServerError> {
        let mut collections = self.collections.write().await;
        let mut updated = collections.clone();
        if !updated.remove(collection, key) {
            return Ok(false);
        }
        self.flush(&updated).await?;
        *collections = updated;
        Ok(true)
    }
}
