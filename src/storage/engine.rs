use rocksdb::{ColumnFamilyDescriptor, Options, DB};
use std::path::Path;
use std::sync::Arc;

use super::collection::Collection;
use crate::error::{ApiError, ApiResult};

/// The storage engine backed by RocksDB, one column family per collection
#[derive(Clone)]
pub struct StorageEngine {
    db: Arc<DB>,
    path: std::path::PathBuf,
}

impl std::fmt::Debug for StorageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageEngine")
            .field("path", &self.path)
            .finish()
    }
}

impl StorageEngine {
    /// Open (or create) the data directory with the given collections
    pub fn open<P: AsRef<Path>>(data_dir: P, collections: &[&str]) -> ApiResult<Self> {
        let path = data_dir.as_ref().to_path_buf();

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_max_total_wal_size(50 * 1024 * 1024);
        opts.set_keep_log_file_num(5);

        // Existing column families must all be opened
        let mut cf_names = DB::list_cf(&opts, &path).unwrap_or_else(|_| vec!["default".to_string()]);
        for name in collections {
            if !cf_names.iter().any(|n| n == name) {
                cf_names.push(name.to_string());
            }
        }

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = cf_names
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DB::open_cf_descriptors(&opts, &path, cf_descriptors)
            .map_err(|e| ApiError::Storage(format!("Failed to open RocksDB: {}", e)))?;

        tracing::debug!(path = %path.display(), collections = ?collections, "Storage engine opened");

        Ok(Self {
            db: Arc::new(db),
            path,
        })
    }

    /// Get a collection handle
    pub fn collection(&self, name: &str) -> ApiResult<Collection> {
        if self.db.cf_handle(name).is_none() {
            return Err(ApiError::Storage(format!("Collection '{}' not found", name)));
        }
        Ok(Collection::new(name.to_string(), self.db.clone()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_and_reopen() {
        let tmp = TempDir::new().unwrap();
        {
            let engine = StorageEngine::open(tmp.path(), &["bootcamps"]).unwrap();
            assert!(engine.collection("bootcamps").is_ok());
            assert!(engine.collection("courses").is_err());
        }

        // Reopen with no collections listed still opens the existing ones
        let engine = StorageEngine::open(tmp.path(), &[]).unwrap();
        assert!(engine.collection("bootcamps").is_ok());
        assert_eq!(engine.path(), tmp.path());
    }
}
