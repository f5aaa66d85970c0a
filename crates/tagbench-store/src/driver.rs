//! Persistence drivers
//!
//! A [`TagStore`](crate::TagStore) confirms every mutation with its driver
//! before touching its in-memory state. Drivers see flat [`TagRecord`]s only.
//!
//! # Available Drivers
//!
//! - [`MemoryDriver`]: keeps records in a map; the default
//! - [`JsonFileDriver`]: rewrites a JSON record file atomically on every change

use crate::error::PersistenceError;
use crate::record::TagRecord;
use crate::tag::TagId;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Durable backing for one tag store
///
/// Every method either completes or fails without a partial effect.
pub trait PersistenceDriver: Send + Debug {
    /// Record a new tag
    ///
    /// # Errors
    /// [`PersistenceError::DuplicateRecord`] if the id is already held
    fn insert(&mut self, record: &TagRecord) -> Result<(), PersistenceError>;

    /// Replace an existing tag's record
    ///
    /// # Errors
    /// [`PersistenceError::MissingRecord`] if the id is not held
    fn update(&mut self, record: &TagRecord) -> Result<(), PersistenceError>;

    /// Remove several tags as one unit
    ///
    /// # Errors
    /// [`PersistenceError::MissingRecord`] if any id is not held; nothing is
    /// removed in that case
    fn delete(&mut self, ids: &[TagId]) -> Result<(), PersistenceError>;

    /// Every held record
    ///
    /// # Errors
    /// Returns the backend's failure to read its state
    fn export(&self) -> Result<Vec<TagRecord>, PersistenceError>;

    /// Release all resources; later calls fail with [`PersistenceError::Destroyed`]
    ///
    /// # Errors
    /// Returns the backend's failure to release its state
    fn destroy(&mut self) -> Result<(), PersistenceError>;

    /// Human-readable name of the backing medium
    fn source_name(&self) -> String;
}

/// In-memory driver
#[derive(Debug, Default)]
pub struct MemoryDriver {
    records: BTreeMap<TagId, TagRecord>,
    destroyed: bool,
}

impl MemoryDriver {
    /// Create an empty driver
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of held records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if no records are held
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn check_live(&self) -> Result<(), PersistenceError> {
        if self.destroyed {
            Err(PersistenceError::Destroyed)
        } else {
            Ok(())
        }
    }
}

impl PersistenceDriver for MemoryDriver {
    fn insert(&mut self, record: &TagRecord) -> Result<(), PersistenceError> {
        self.check_live()?;
        if self.records.contains_key(&record.id) {
            return Err(PersistenceError::DuplicateRecord(record.id.clone()));
        }
        self.records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn update(&mut self, record: &TagRecord) -> Result<(), PersistenceError> {
        self.check_live()?;
        match self.records.get_mut(&record.id) {
            Some(slot) => {
                *slot = record.clone();
                Ok(())
            }
            None => Err(PersistenceError::MissingRecord(record.id.clone())),
        }
    }

    fn delete(&mut self, ids: &[TagId]) -> Result<(), PersistenceError> {
        self.check_live()?;
        if let Some(missing) = ids.iter().find(|id| !self.records.contains_key(*id)) {
            return Err(PersistenceError::MissingRecord(missing.clone()));
        }
        for id in ids {
            self.records.remove(id);
        }
        Ok(())
    }

    fn export(&self) -> Result<Vec<TagRecord>, PersistenceError> {
        self.check_live()?;
        Ok(self.records.values().cloned().collect())
    }

    fn destroy(&mut self) -> Result<(), PersistenceError> {
        self.records.clear();
        self.destroyed = true;
        Ok(())
    }

    fn source_name(&self) -> String {
        "memory".to_string()
    }
}

/// Driver backed by a JSON array of records on disk
///
/// Each change is applied to a copy, written to a temporary file in the same
/// directory and renamed over the target. The in-memory copy is committed only
/// once the rename succeeds.
#[derive(Debug)]
pub struct JsonFileDriver {
    path: PathBuf,
    records: BTreeMap<TagId, TagRecord>,
    destroyed: bool,
}

impl JsonFileDriver {
    /// Start a new, empty record file at `path` (overwrites)
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let driver = Self {
            path: path.into(),
            records: BTreeMap::new(),
            destroyed: false,
        };
        driver.flush(&driver.records)?;
        Ok(driver)
    }

    /// Open an existing record file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let path = path.into();
        let raw = fs::read_to_string(&path).map_err(|source| PersistenceError::Io {
            path: path.clone(),
            source,
        })?;
        let list: Vec<TagRecord> = serde_json::from_str(&raw)?;
        let records = list.into_iter().map(|r| (r.id.clone(), r)).collect();
        Ok(Self {
            path,
            records,
            destroyed: false,
        })
    }

    /// Backing file path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn check_live(&self) -> Result<(), PersistenceError> {
        if self.destroyed {
            Err(PersistenceError::Destroyed)
        } else {
            Ok(())
        }
    }

    fn flush(&self, records: &BTreeMap<TagId, TagRecord>) -> Result<(), PersistenceError> {
        let io_err = |source| PersistenceError::Io {
            path: self.path.clone(),
            source,
        };
        let list: Vec<&TagRecord> = records.values().collect();
        let json = serde_json::to_vec_pretty(&list)?;

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(&json).map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;

        debug!(path = %self.path.display(), records = records.len(), "Flushed record file");
        Ok(())
    }

    fn commit(&mut self, next: BTreeMap<TagId, TagRecord>) -> Result<(), PersistenceError> {
        self.flush(&next)?;
        self.records = next;
        Ok(())
    }
}

impl PersistenceDriver for JsonFileDriver {
    fn insert(&mut self, record: &TagRecord) -> Result<(), PersistenceError> {
        self.check_live()?;
        if self.records.contains_key(&record.id) {
            return Err(PersistenceError::DuplicateRecord(record.id.clone()));
        }
        let mut next = self.records.clone();
        next.insert(record.id.clone(), record.clone());
        self.commit(next)
    }

    fn update(&mut self, record: &TagRecord) -> Result<(), PersistenceError> {
        self.check_live()?;
        if !self.records.contains_key(&record.id) {
            return Err(PersistenceError::MissingRecord(record.id.clone()));
        }
        let mut next = self.records.clone();
        next.insert(record.id.clone(), record.clone());
        self.commit(next)
    }

    fn delete(&mut self, ids: &[TagId]) -> Result<(), PersistenceError> {
        self.check_live()?;
        if let Some(missing) = ids.iter().find(|id| !self.records.contains_key(*id)) {
            return Err(PersistenceError::MissingRecord(missing.clone()));
        }
        let mut next = self.records.clone();
        for id in ids {
            next.remove(id);
        }
        self.commit(next)
    }

    fn export(&self) -> Result<Vec<TagRecord>, PersistenceError> {
        self.check_live()?;
        Ok(self.records.values().cloned().collect())
    }

    fn destroy(&mut self) -> Result<(), PersistenceError> {
        self.records.clear();
        self.destroyed = true;
        Ok(())
    }

    fn source_name(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagbench_span::parse;

    fn record(id: &str) -> TagRecord {
        TagRecord::extent(id, "PERSON", parse("0~4").unwrap()).with_text("John")
    }

    #[test]
    fn memory_driver_insert_update_delete() {
        let mut driver = MemoryDriver::new();
        driver.insert(&record("P1")).unwrap();
        driver.insert(&record("P2")).unwrap();
        assert!(matches!(
            driver.insert(&record("P1")),
            Err(PersistenceError::DuplicateRecord(_))
        ));

        let updated = record("P1").with_attribute("role", "object");
        driver.update(&updated).unwrap();
        assert_eq!(driver.export().unwrap()[0], updated);

        driver.delete(&[TagId::new("P1"), TagId::new("P2")]).unwrap();
        assert!(driver.is_empty());
    }

    #[test]
    fn memory_driver_batch_delete_is_all_or_nothing() {
        let mut driver = MemoryDriver::new();
        driver.insert(&record("P1")).unwrap();
        let result = driver.delete(&[TagId::new("P1"), TagId::new("P9")]);
        assert!(matches!(result, Err(PersistenceError::MissingRecord(_))));
        assert_eq!(driver.len(), 1);
    }

    #[test]
    fn memory_driver_refuses_after_destroy() {
        let mut driver = MemoryDriver::new();
        driver.insert(&record("P1")).unwrap();
        driver.destroy().unwrap();
        assert!(matches!(driver.export(), Err(PersistenceError::Destroyed)));
    }

    #[test]
    fn json_driver_persists_and_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tags.json");

        let mut driver = JsonFileDriver::create(&path).unwrap();
        driver.insert(&record("P1")).unwrap();
        driver.insert(&record("P2")).unwrap();
        driver.delete(&[TagId::new("P2")]).unwrap();

        let reopened = JsonFileDriver::open(&path).unwrap();
        let ids: Vec<_> = reopened
            .export()
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![TagId::new("P1")]);
        assert_eq!(reopened.source_name(), path.display().to_string());
    }

    #[test]
    fn json_driver_failed_flush_keeps_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tags.json");
        let mut driver = JsonFileDriver::create(&path).unwrap();
        driver.insert(&record("P1")).unwrap();

        // Parent directory vanishes; the next write cannot land
        drop(dir);
        assert!(driver.insert(&record("P2")).is_err());
        assert_eq!(driver.export().unwrap().len(), 1);
    }
}
