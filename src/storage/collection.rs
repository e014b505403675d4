use parking_lot::Mutex;
use rocksdb::DB;
use serde_json::Value;
use std::sync::Arc;

use super::document::Document;
use super::schema::SchemaValidator;
use crate::error::{ApiError, ApiResult};
use crate::query::value::lookup;
use crate::query::FindQuery;

/// Key prefix for documents
const DOC_PREFIX: &str = "doc:";

/// A named collection of JSON documents stored in its own column family
#[derive(Clone)]
pub struct Collection {
    name: String,
    db: Arc<DB>,
    schema: Option<Arc<SchemaValidator>>,
    unique_fields: Arc<Vec<String>>,
    /// Serialises writes so that uniqueness checks and puts are atomic
    write_lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name)
            .field("unique_fields", &self.unique_fields)
            .finish()
    }
}

impl Collection {
    /// Create a new collection handle
    pub fn new(name: String, db: Arc<DB>) -> Self {
        Self {
            name,
            db,
            schema: None,
            unique_fields: Arc::new(Vec::new()),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Validate documents against `schema` on create and update
    pub fn with_schema(mut self, schema: SchemaValidator) -> Self {
        self.schema = Some(Arc::new(schema));
        self
    }

    /// Reject writes that would duplicate the value of any of these fields
    pub fn with_unique_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unique_fields = Arc::new(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build a document key
    fn doc_key(id: &str) -> Vec<u8> {
        format!("{}{}", DOC_PREFIX, id).into_bytes()
    }

    fn cf(&self) -> ApiResult<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(&self.name)
            .ok_or_else(|| ApiError::Storage(format!("Column family '{}' missing", self.name)))
    }

    // ==================== Document Operations ====================

    /// Insert a new document
    pub fn create(&self, data: Value) -> ApiResult<Document> {
        if !data.is_object() {
            return Err(ApiError::BadRequest(
                "Document must be a JSON object".to_string(),
            ));
        }

        let _guard = self.write_lock.lock();
        let doc = Document::new(data);
        self.validate(&doc)?;
        self.check_unique(&doc)?;
        self.put(&doc)?;

        tracing::debug!(collection = %self.name, id = %doc.id, "Document created");
        Ok(doc)
    }

    /// Get a document by id
    pub fn find_by_id(&self, id: &str) -> ApiResult<Option<Document>> {
        let bytes = self.db.get_cf(self.cf()?, Self::doc_key(id))?;
        match bytes {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Merge `data` into an existing document and return the updated document
    pub fn find_by_id_and_update(&self, id: &str, data: Value) -> ApiResult<Option<Document>> {
        if !data.is_object() {
            return Err(ApiError::BadRequest(
                "Update must be a JSON object".to_string(),
            ));
        }

        let _guard = self.write_lock.lock();
        let Some(mut doc) = self.find_by_id(id)? else {
            return Ok(None);
        };

        doc.update(data);
        self.validate(&doc)?;
        self.check_unique(&doc)?;
        self.put(&doc)?;

        tracing::debug!(collection = %self.name, id = %id, "Document updated");
        Ok(Some(doc))
    }

    /// Remove a document, returning it if it existed
    pub fn find_by_id_and_delete(&self, id: &str) -> ApiResult<Option<Document>> {
        let _guard = self.write_lock.lock();
        let Some(doc) = self.find_by_id(id)? else {
            return Ok(None);
        };

        self.db.delete_cf(self.cf()?, Self::doc_key(id))?;

        tracing::debug!(collection = %self.name, id = %id, "Document deleted");
        Ok(Some(doc))
    }

    /// Run a query: filter, then sort, then project
    pub fn find(&self, query: &FindQuery) -> ApiResult<Vec<Value>> {
        let mut matched: Vec<Value> = self
            .scan()?
            .into_iter()
            .map(|doc| doc.to_value())
            .filter(|value| query.filter.matches(value))
            .collect();

        query.sort.apply(&mut matched);

        if let Some(projection) = &query.projection {
            matched = matched.into_iter().map(|v| projection.apply(v)).collect();
        }

        tracing::debug!(
            collection = %self.name,
            filter = %query.filter.to_document(),
            sort = %query.sort.to_document(),
            matched = matched.len(),
            "Find executed"
        );
        Ok(matched)
    }

    /// All documents in key order
    pub fn scan(&self) -> ApiResult<Vec<Document>> {
        let prefix = DOC_PREFIX.as_bytes();
        let mut docs = Vec::new();
        for item in self.db.prefix_iterator_cf(self.cf()?, prefix) {
            let (key, value) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            docs.push(serde_json::from_slice(&value)?);
        }
        Ok(docs)
    }

    /// Get the number of documents
    pub fn count(&self) -> ApiResult<usize> {
        Ok(self.scan()?.len())
    }

    fn put(&self, doc: &Document) -> ApiResult<()> {
        let bytes = serde_json::to_vec(doc)?;
        self.db.put_cf(self.cf()?, Self::doc_key(&doc.id), bytes)?;
        Ok(())
    }

    fn validate(&self, doc: &Document) -> ApiResult<()> {
        match &self.schema {
            Some(schema) => schema.validate(&doc.data),
            None => Ok(()),
        }
    }

    /// Caller must hold the write lock
    fn check_unique(&self, doc: &Document) -> ApiResult<()> {
        if self.unique_fields.is_empty() {
            return Ok(());
        }

        let candidate = doc.to_value();
        let existing = self.scan()?;
        for field in self.unique_fields.iter() {
            let Some(value) = lookup(&candidate, field) else {
                continue;
            };
            let clash = existing
                .iter()
                .filter(|other| other.id != doc.id)
                .any(|other| lookup(&other.to_value(), field) == Some(value));
            if clash {
                return Err(ApiError::DuplicateKey(field.clone()));
            }
        }
        Ok(())
    }
}
