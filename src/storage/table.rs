//! Generic JSONL-backed table.
//!
//! Each line is a valid JSON object representing one row. The table is
//! read whole and rewritten whole; keyed upsert and delete semantics are
//! layered on top by the entity stores.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::StorageError;

/// A whole-file JSONL table of rows of type `T`.
pub struct JsonlTable<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize + DeserializeOwned> JsonlTable<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Ensure the parent directory exists.
    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Read all rows. A missing file is an empty table; unparseable lines
    /// are skipped with a warning.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut rows = Vec::new();
        let mut line_num = 0;

        for line in reader.lines() {
            line_num += 1;
            let line = line?;

            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(&line) {
                Ok(row) => rows.push(row),
                Err(e) => {
                    warn!("Failed to parse line {} in {:?}: {}", line_num, self.path, e);
                }
            }
        }

        debug!("Read {} rows from {:?}", rows.len(), self.path);
        Ok(rows)
    }

    /// Write rows, replacing the entire file.
    pub fn write_all(&self, rows: &[T]) -> Result<usize, StorageError> {
        self.ensure_dir()?;

        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        let mut count = 0;

        for row in rows {
            let json = serde_json::to_string(row)?;
            writeln!(writer, "{}", json)?;
            count += 1;
        }

        writer.flush()?;
        debug!("Wrote {} rows to {:?}", count, self.path);

        Ok(count)
    }

    /// Replace every row whose key matches one of the incoming rows, then
    /// append the rest; rows are rewritten in `sort_key` order.
    pub fn upsert_by_key<K, F>(&self, incoming: Vec<T>, key_of: F) -> Result<(), StorageError>
    where
        K: Ord,
        F: Fn(&T) -> K,
    {
        let mut rows = self.read_all()?;
        rows.retain(|row| !incoming.iter().any(|new| key_of(new) == key_of(row)));
        rows.extend(incoming);
        rows.sort_by_key(&key_of);
        self.write_all(&rows)?;
        Ok(())
    }

    /// Delete rows matching the predicate. Returns how many were removed.
    pub fn delete_where<F>(&self, predicate: F) -> Result<usize, StorageError>
    where
        F: Fn(&T) -> bool,
    {
        let rows = self.read_all()?;
        let before = rows.len();
        let kept: Vec<T> = rows.into_iter().filter(|row| !predicate(row)).collect();
        let removed = before - kept.len();
        if removed > 0 {
            self.write_all(&kept)?;
        }
        Ok(removed)
    }

    /// Delete every row.
    pub fn delete_all(&self) -> Result<(), StorageError> {
        if self.path.exists() {
            self.write_all(&[])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestRow {
        id: u32,
        name: String,
    }

    fn row(id: u32, name: &str) -> TestRow {
        TestRow {
            id,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let table: JsonlTable<TestRow> = JsonlTable::new(temp_dir.path().join("rows.jsonl"));

        let rows = vec![row(1, "First"), row(2, "Second")];
        assert_eq!(table.write_all(&rows).unwrap(), 2);
        assert_eq!(table.read_all().unwrap(), rows);
    }

    #[test]
    fn test_read_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let table: JsonlTable<TestRow> = JsonlTable::new(temp_dir.path().join("none.jsonl"));
        assert!(table.read_all().unwrap().is_empty());
        assert!(!table.exists());
    }

    #[test]
    fn test_read_skips_bad_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.jsonl");
        std::fs::write(
            &path,
            "{\"id\":1,\"name\":\"Good\"}\nnot-valid-json\n{\"id\":2,\"name\":\"Also Good\"}\n",
        )
        .unwrap();

        let table: JsonlTable<TestRow> = JsonlTable::new(path);
        let rows = table.read_all().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].name, "Also Good");
    }

    #[test]
    fn test_upsert_replaces_by_key() {
        let temp_dir = TempDir::new().unwrap();
        let table: JsonlTable<TestRow> = JsonlTable::new(temp_dir.path().join("upsert.jsonl"));

        table
            .upsert_by_key(vec![row(1, "Old"), row(2, "Kept")], |r| r.id)
            .unwrap();
        table.upsert_by_key(vec![row(1, "New")], |r| r.id).unwrap();

        let rows = table.read_all().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], row(1, "New"));
        assert_eq!(rows[1], row(2, "Kept"));
    }

    #[test]
    fn test_upsert_sorts_by_key() {
        let temp_dir = TempDir::new().unwrap();
        let table: JsonlTable<TestRow> = JsonlTable::new(temp_dir.path().join("sorted.jsonl"));

        table
            .upsert_by_key(vec![row(3, "C"), row(1, "A")], |r| r.id)
            .unwrap();
        table.upsert_by_key(vec![row(2, "B")], |r| r.id).unwrap();

        let ids: Vec<u32> = table.read_all().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_delete_where() {
        let temp_dir = TempDir::new().unwrap();
        let table: JsonlTable<TestRow> = JsonlTable::new(temp_dir.path().join("del.jsonl"));

        table
            .write_all(&[row(1, "A"), row(2, "B"), row(3, "C")])
            .unwrap();

        assert_eq!(table.delete_where(|r| r.id >= 2).unwrap(), 2);
        assert_eq!(table.read_all().unwrap(), vec![row(1, "A")]);

        // Nothing matches: no rows removed.
        assert_eq!(table.delete_where(|r| r.id == 99).unwrap(), 0);
    }

    #[test]
    fn test_delete_all() {
        let temp_dir = TempDir::new().unwrap();
        let table: JsonlTable<TestRow> = JsonlTable::new(temp_dir.path().join("clear.jsonl"));

        table.write_all(&[row(1, "A")]).unwrap();
        table.delete_all().unwrap();
        assert!(table.read_all().unwrap().is_empty());
    }
}
