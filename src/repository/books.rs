//! Durable book record store
//!
//! An ordered map from record id to [`Book`], backed by an append-only log
//! file so the collection survives process restarts. Every mutation is
//! framed as a length- and checksum-prefixed bincode entry, fsynced before
//! the in-memory index changes. The full log is replayed on open.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::Book,
};

/// One durable mutation in the record log
#[derive(Debug, Serialize, Deserialize)]
enum LogRecord {
    Put { key: String, value: Vec<u8> },
    Delete { key: String },
}

/// Durable ordered map of book records.
///
/// Key and value size bounds are fixed at open time; an insert that would
/// exceed either bound fails without mutating the store.
#[derive(Debug)]
pub struct BookStore {
    file: File,
    records: BTreeMap<String, Book>,
    max_key_bytes: usize,
    max_value_bytes: usize,
}

impl BookStore {
    /// Open the store at `path`, creating it if missing, and replay the log.
    pub fn open(path: &Path, max_key_bytes: usize, max_value_bytes: usize) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)?;

        let records = Self::replay(&mut file)?;
        tracing::debug!("Opened book store with {} records", records.len());

        Ok(Self {
            file,
            records,
            max_key_bytes,
            max_value_bytes,
        })
    }

    /// Get a record by id. Read-only; the record is cloned out.
    pub fn get(&self, id: &str) -> Option<Book> {
        self.records.get(id).cloned()
    }

    /// Insert or overwrite a record, returning the previous value if any.
    pub fn insert(&mut self, id: &str, book: &Book) -> AppResult<Option<Book>> {
        if id.len() > self.max_key_bytes {
            return Err(AppError::Storage(format!(
                "key is {} bytes, store limit is {}",
                id.len(),
                self.max_key_bytes
            )));
        }

        let value = bincode::serialize(book)?;
        if value.len() > self.max_value_bytes {
            return Err(AppError::Storage(format!(
                "serialized record is {} bytes, store limit is {}",
                value.len(),
                self.max_value_bytes
            )));
        }

        self.append(&LogRecord::Put {
            key: id.to_string(),
            value,
        })?;

        Ok(self.records.insert(id.to_string(), book.clone()))
    }

    /// Remove a record, returning the prior value, or `None` if absent.
    pub fn remove(&mut self, id: &str) -> AppResult<Option<Book>> {
        if !self.records.contains_key(id) {
            return Ok(None);
        }

        self.append(&LogRecord::Delete {
            key: id.to_string(),
        })?;

        Ok(self.records.remove(id))
    }

    /// Point-in-time copy of all records in ascending key order.
    pub fn values(&self) -> Vec<Book> {
        self.records.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append one framed entry and sync it to disk.
    ///
    /// Frame layout: payload length (u32 LE), CRC32 of payload (u32 LE),
    /// bincode payload.
    fn append(&mut self, record: &LogRecord) -> AppResult<()> {
        let payload = bincode::serialize(record)?;

        let mut frame = Vec::with_capacity(payload.len() + 8);
        frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        frame.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
        frame.extend_from_slice(&payload);

        self.file.write_all(&frame)?;
        self.file.sync_data()?;

        Ok(())
    }

    /// Rebuild the in-memory index from the log.
    fn replay(file: &mut File) -> AppResult<BTreeMap<String, Book>> {
        let mut records = BTreeMap::new();
        let mut reader = BufReader::new(file);

        while let Some(header) = Self::read_frame_header(&mut reader)? {
            let len = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
            let checksum = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

            let mut payload = vec![0u8; len];
            reader.read_exact(&mut payload).map_err(|_| {
                AppError::Storage("truncated entry in record log".to_string())
            })?;

            if crc32fast::hash(&payload) != checksum {
                return Err(AppError::Storage(
                    "checksum mismatch in record log".to_string(),
                ));
            }

            match bincode::deserialize::<LogRecord>(&payload)? {
                LogRecord::Put { key, value } => {
                    let book: Book = bincode::deserialize(&value)?;
                    records.insert(key, book);
                }
                LogRecord::Delete { key } => {
                    records.remove(&key);
                }
            }
        }

        Ok(records)
    }

    /// Read the next 8-byte frame header, or `None` at a clean end of log.
    fn read_frame_header(reader: &mut impl Read) -> AppResult<Option<[u8; 8]>> {
        let mut header = [0u8; 8];
        let mut filled = 0;

        while filled < header.len() {
            let n = reader.read(&mut header[filled..])?;
            if n == 0 {
                if filled == 0 {
                    return Ok(None);
                }
                return Err(AppError::Storage(
                    "truncated entry header in record log".to_string(),
                ));
            }
            filled += n;
        }

        Ok(Some(header))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample_book(id: &str, title: &str) -> Book {
        let t0 = Utc.with_ymd_and_hms(1965, 8, 1, 0, 0, 0).unwrap();
        Book {
            id: id.to_string(),
            title: title.to_string(),
            author: "Herbert".to_string(),
            genre: "SciFi".to_string(),
            publication_date: t0,
            created_at: t0,
            updated_at: Some(t0),
            is_borrowed: false,
            favorite: None,
            comments: Vec::new(),
        }
    }

    fn open_store(dir: &Path) -> BookStore {
        BookStore::open(&dir.join("books.log"), 44, 1024).unwrap()
    }

    #[test]
    fn test_insert_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(dir.path());

        let book = sample_book("a", "Dune");
        assert!(store.insert("a", &book).unwrap().is_none());
        assert_eq!(store.get("a"), Some(book.clone()));
        assert_eq!(store.len(), 1);

        let replaced = sample_book("a", "Dune Messiah");
        assert_eq!(store.insert("a", &replaced).unwrap(), Some(book));

        assert_eq!(store.remove("a").unwrap(), Some(replaced));
        assert_eq!(store.remove("a").unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_values_in_ascending_key_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(dir.path());

        for key in ["c", "a", "b"] {
            store.insert(key, &sample_book(key, key)).unwrap();
        }

        let titles: Vec<String> = store.values().into_iter().map(|b| b.title).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.log");

        {
            let mut store = BookStore::open(&path, 44, 1024).unwrap();
            store.insert("a", &sample_book("a", "Dune")).unwrap();
            store.insert("b", &sample_book("b", "Emma")).unwrap();
            store.remove("b").unwrap();
        }

        let store = BookStore::open(&path, 44, 1024).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a").unwrap().title, "Dune");
        assert!(store.get("b").is_none());
    }

    #[test]
    fn test_rejects_oversized_key_without_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(dir.path());

        let key = "k".repeat(45);
        let err = store.insert(&key, &sample_book(&key, "Dune")).unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_rejects_oversized_value_without_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(dir.path());

        let mut book = sample_book("a", "Dune");
        book.title = "x".repeat(2000);
        let err = store.insert("a", &book).unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        assert!(store.get("a").is_none());

        // The log stays clean for subsequent opens.
        drop(store);
        let store = open_store(dir.path());
        assert!(store.is_empty());
    }

    #[test]
    fn test_corrupted_log_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.log");

        {
            let mut store = BookStore::open(&path, 44, 1024).unwrap();
            store.insert("a", &sample_book("a", "Dune")).unwrap();
        }

        // Flip a byte in the payload region.
        let mut bytes = fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        fs::write(&path, bytes).unwrap();

        let err = BookStore::open(&path, 44, 1024).unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
    }
}
