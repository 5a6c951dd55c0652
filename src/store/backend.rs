use crate::error::Result;

/// Abstract interface for raw keyed storage I/O.
/// This trait handles the "how" of durability (filesystem vs memory vs a
/// remote table), while [`super::GardenStore`] handles the "what"
/// (envelope format, backup ordering, migration on load).
pub trait StorageBackend {
    /// Read the document stored under `key`.
    /// Returns Ok(None) if the key does not exist.
    /// Returns Err only on actual I/O errors (permissions, disk failure).
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Write a document under `key`.
    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial writes.
    fn write(&self, key: &str, document: &str) -> Result<()>;

    /// Remove the document under `key`. Removing a missing key is not an
    /// error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Byte size of the document under `key`, if present. Used by storage
    /// introspection; never mutates anything.
    fn len(&self, key: &str) -> Result<Option<usize>> {
        Ok(self.read(key)?.map(|doc| doc.len()))
    }
}
