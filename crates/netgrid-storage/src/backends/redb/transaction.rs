//! Redb transaction implementation.
//!
//! Write transactions buffer every change in an in-memory overlay keyed by
//! physical key; the underlying redb write transaction is only touched at
//! commit, when the overlay is applied in one pass. A savepoint is a
//! snapshot of the overlay, so `rollback_savepoint` is a map swap and
//! never involves the backend.

use std::collections::BTreeMap;
use std::ops::Bound;

use redb::{ReadTransaction, ReadableTable, WriteTransaction};

use crate::engine::{KeyValue, StorageError, Transaction};

use super::tables::{encode_key, strip_prefix, table_end_key, table_start_key, DATA_TABLE};

/// Buffered writes: physical key to new value, `None` marking a delete.
type Overlay = BTreeMap<Vec<u8>, Option<Vec<u8>>>;

/// A transaction for the redb storage engine.
///
/// Note: we allow the `large_enum_variant` lint here because transactions
/// are short-lived and never stored in bulk.
#[allow(clippy::large_enum_variant)]
pub enum RedbTransaction {
    /// A read-only transaction.
    Read(ReadTransaction),
    /// A read-write transaction with its write overlay and savepoint stack.
    Write {
        /// The underlying redb transaction.
        tx: WriteTransaction,
        /// Uncommitted writes, applied to redb on commit.
        pending: Overlay,
        /// Named overlay snapshots, innermost last.
        savepoints: Vec<(String, Overlay)>,
    },
}

impl RedbTransaction {
    pub(crate) const fn new_read(tx: ReadTransaction) -> Self {
        Self::Read(tx)
    }

    pub(crate) const fn new_write(tx: WriteTransaction) -> Self {
        Self::Write { tx, pending: BTreeMap::new(), savepoints: Vec::new() }
    }

    /// Read a physical key from the underlying database, ignoring the
    /// overlay.
    fn base_get(&self, physical: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        match self {
            Self::Read(tx) => match tx.open_table(DATA_TABLE) {
                Ok(t) => match t.get(physical) {
                    Ok(Some(value)) => Ok(Some(value.value().to_vec())),
                    Ok(None) => Ok(None),
                    Err(e) => Err(StorageError::Internal(e.to_string())),
                },
                // No data table yet means no data
                Err(redb::TableError::TableDoesNotExist(_)) => Ok(None),
                Err(e) => Err(StorageError::Internal(e.to_string())),
            },
            Self::Write { tx, .. } => {
                let t =
                    tx.open_table(DATA_TABLE).map_err(|e| StorageError::Internal(e.to_string()))?;
                let result = match t.get(physical) {
                    Ok(Some(value)) => Ok(Some(value.value().to_vec())),
                    Ok(None) => Ok(None),
                    Err(e) => Err(StorageError::Internal(e.to_string())),
                };
                result
            }
        }
    }

    /// Collect a physical key range from the underlying database, ignoring
    /// the overlay.
    fn base_range(
        &self,
        lo: Bound<&[u8]>,
        hi: Bound<&[u8]>,
    ) -> Result<Vec<KeyValue>, StorageError> {
        fn collect<T: ReadableTable<&'static [u8], &'static [u8]>>(
            table: &T,
            lo: Bound<&[u8]>,
            hi: Bound<&[u8]>,
        ) -> Result<Vec<KeyValue>, StorageError> {
            let mut out = Vec::new();
            let iter = table
                .range::<&[u8]>((lo, hi))
                .map_err(|e| StorageError::Internal(e.to_string()))?;
            for item in iter {
                let (k, v) = item.map_err(|e| StorageError::Internal(e.to_string()))?;
                out.push((k.value().to_vec(), v.value().to_vec()));
            }
            Ok(out)
        }

        match self {
            Self::Read(tx) => match tx.open_table(DATA_TABLE) {
                Ok(t) => collect(&t, lo, hi),
                Err(redb::TableError::TableDoesNotExist(_)) => Ok(Vec::new()),
                Err(e) => Err(StorageError::Internal(e.to_string())),
            },
            Self::Write { tx, .. } => {
                let t =
                    tx.open_table(DATA_TABLE).map_err(|e| StorageError::Internal(e.to_string()))?;
                collect(&t, lo, hi)
            }
        }
    }
}

/// Merge a sorted base range with a sorted overlay range. Overlay entries
/// win; tombstones drop the key.
fn merge_overlay(
    base: Vec<KeyValue>,
    overlay: Vec<(&Vec<u8>, &Option<Vec<u8>>)>,
) -> Vec<KeyValue> {
    enum Step {
        TakeBase,
        TakeOverlay,
        TakeBoth,
        DrainBase,
    }

    let mut out = Vec::with_capacity(base.len() + overlay.len());
    let mut base_iter = base.into_iter().peekable();
    let mut over_iter = overlay.into_iter().peekable();

    loop {
        let step = match (base_iter.peek(), over_iter.peek()) {
            (Some((bk, _)), Some((ok, _))) => {
                if bk < *ok {
                    Step::TakeBase
                } else if bk == *ok {
                    Step::TakeBoth
                } else {
                    Step::TakeOverlay
                }
            }
            (Some(_), None) => Step::DrainBase,
            (None, Some(_)) => Step::TakeOverlay,
            (None, None) => break,
        };

        match step {
            Step::TakeBase => {
                if let Some(kv) = base_iter.next() {
                    out.push(kv);
                }
            }
            Step::TakeBoth => {
                base_iter.next();
                if let Some((k, v)) = over_iter.next() {
                    if let Some(value) = v {
                        out.push((k.clone(), value.clone()));
                    }
                }
            }
            Step::TakeOverlay => {
                if let Some((k, v)) = over_iter.next() {
                    if let Some(value) = v {
                        out.push((k.clone(), value.clone()));
                    }
                }
            }
            Step::DrainBase => {
                out.extend(base_iter.by_ref());
            }
        }
    }

    out
}

impl Transaction for RedbTransaction {
    fn is_read_only(&self) -> bool {
        matches!(self, Self::Read(_))
    }

    fn get(&self, table: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        let physical = encode_key(table, key);
        if let Self::Write { pending, .. } = self {
            if let Some(entry) = pending.get(&physical) {
                return Ok(entry.clone());
            }
        }
        self.base_get(&physical)
    }

    fn put(&mut self, table: &str, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        let physical = encode_key(table, key);
        match self {
            Self::Read(_) => Err(StorageError::ReadOnly),
            Self::Write { pending, .. } => {
                pending.insert(physical, Some(value.to_vec()));
                Ok(())
            }
        }
    }

    fn delete(&mut self, table: &str, key: &[u8]) -> Result<bool, StorageError> {
        if self.is_read_only() {
            return Err(StorageError::ReadOnly);
        }
        let existed = self.get(table, key)?.is_some();
        if existed {
            let physical = encode_key(table, key);
            if let Self::Write { pending, .. } = self {
                pending.insert(physical, None);
            }
        }
        Ok(existed)
    }

    fn scan_range(
        &self,
        table: &str,
        start: Bound<&[u8]>,
        end: Bound<&[u8]>,
    ) -> Result<Vec<KeyValue>, StorageError> {
        let (lo_key, lo_inclusive) = match start {
            Bound::Included(k) => (encode_key(table, k), true),
            Bound::Excluded(k) => (encode_key(table, k), false),
            Bound::Unbounded => (table_start_key(table), true),
        };
        let (hi_key, hi_inclusive) = match end {
            Bound::Included(k) => (encode_key(table, k), true),
            Bound::Excluded(k) => (encode_key(table, k), false),
            Bound::Unbounded => (table_end_key(table), false),
        };

        let lo = if lo_inclusive {
            Bound::Included(lo_key.as_slice())
        } else {
            Bound::Excluded(lo_key.as_slice())
        };
        let hi = if hi_inclusive {
            Bound::Included(hi_key.as_slice())
        } else {
            Bound::Excluded(hi_key.as_slice())
        };

        let base = self.base_range(lo, hi)?;

        let merged = match self {
            Self::Read(_) => base,
            Self::Write { pending, .. } => {
                let lo_owned = if lo_inclusive {
                    Bound::Included(lo_key.clone())
                } else {
                    Bound::Excluded(lo_key.clone())
                };
                let hi_owned = if hi_inclusive {
                    Bound::Included(hi_key.clone())
                } else {
                    Bound::Excluded(hi_key.clone())
                };
                let overlay: Vec<_> = pending.range((lo_owned, hi_owned)).collect();
                merge_overlay(base, overlay)
            }
        };

        Ok(merged.into_iter().map(|(k, v)| (strip_prefix(table, &k), v)).collect())
    }

    fn clear_table(&mut self, table: &str) -> Result<(), StorageError> {
        if self.is_read_only() {
            return Err(StorageError::ReadOnly);
        }
        let keys: Vec<Vec<u8>> =
            self.scan_table(table)?.into_iter().map(|(k, _)| k).collect();
        if let Self::Write { pending, .. } = self {
            for key in keys {
                pending.insert(encode_key(table, &key), None);
            }
        }
        Ok(())
    }

    fn begin_savepoint(&mut self, name: &str) -> Result<(), StorageError> {
        match self {
            Self::Read(_) => Err(StorageError::ReadOnly),
            Self::Write { pending, savepoints, .. } => {
                savepoints.push((name.to_owned(), pending.clone()));
                Ok(())
            }
        }
    }

    fn release_savepoint(&mut self, name: &str) -> Result<(), StorageError> {
        match self {
            Self::Read(_) => Err(StorageError::ReadOnly),
            Self::Write { savepoints, .. } => {
                match savepoints.iter().rposition(|(n, _)| n == name) {
                    Some(idx) => {
                        // Dropping the mark also releases any marks nested
                        // inside it.
                        savepoints.truncate(idx);
                        Ok(())
                    }
                    None => Err(StorageError::NoSuchSavepoint(name.to_owned())),
                }
            }
        }
    }

    fn rollback_savepoint(&mut self, name: &str) -> Result<(), StorageError> {
        match self {
            Self::Read(_) => Err(StorageError::ReadOnly),
            Self::Write { pending, savepoints, .. } => {
                match savepoints.iter().rposition(|(n, _)| n == name) {
                    Some(idx) => {
                        *pending = savepoints[idx].1.clone();
                        savepoints.truncate(idx);
                        Ok(())
                    }
                    None => Err(StorageError::NoSuchSavepoint(name.to_owned())),
                }
            }
        }
    }

    fn commit(self) -> Result<(), StorageError> {
        match self {
            Self::Read(_) => Ok(()),
            Self::Write { tx, pending, savepoints } => {
                drop(savepoints);
                {
                    let mut t = tx
                        .open_table(DATA_TABLE)
                        .map_err(|e| StorageError::Internal(e.to_string()))?;
                    for (key, value) in &pending {
                        match value {
                            Some(v) => {
                                t.insert(key.as_slice(), v.as_slice())
                                    .map_err(|e| StorageError::Internal(e.to_string()))?;
                            }
                            None => {
                                t.remove(key.as_slice())
                                    .map_err(|e| StorageError::Internal(e.to_string()))?;
                            }
                        }
                    }
                }
                tx.commit().map_err(|e| StorageError::Transaction(e.to_string()))
            }
        }
    }

    fn rollback(self) -> Result<(), StorageError> {
        match self {
            Self::Read(_) => Ok(()),
            Self::Write { tx, .. } => {
                tx.abort().map_err(|e| StorageError::Transaction(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kv(k: &[u8], v: &[u8]) -> KeyValue {
        (k.to_vec(), v.to_vec())
    }

    #[test]
    fn merge_prefers_overlay_and_drops_tombstones() {
        let base = vec![kv(b"a", b"1"), kv(b"b", b"2"), kv(b"d", b"4")];
        let b_key = b"b".to_vec();
        let c_key = b"c".to_vec();
        let d_key = b"d".to_vec();
        let b_val = Some(b"20".to_vec());
        let c_val = Some(b"3".to_vec());
        let d_val: Option<Vec<u8>> = None;
        let overlay = vec![(&b_key, &b_val), (&c_key, &c_val), (&d_key, &d_val)];

        let merged = merge_overlay(base, overlay);
        assert_eq!(merged, vec![kv(b"a", b"1"), kv(b"b", b"20"), kv(b"c", b"3")]);
    }

    #[test]
    fn merge_handles_empty_sides() {
        assert_eq!(merge_overlay(Vec::new(), Vec::new()), Vec::new());

        let base = vec![kv(b"x", b"1")];
        assert_eq!(merge_overlay(base.clone(), Vec::new()), base);

        let k = b"y".to_vec();
        let v = Some(b"2".to_vec());
        assert_eq!(merge_overlay(Vec::new(), vec![(&k, &v)]), vec![kv(b"y", b"2")]);
    }
}
