// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

use crate::Record;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("row {index} is out of range; the list has {len} rows")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// Ordered rows in display order. Positions shift down by one after a removal,
/// so callers resolve indices against the current snapshot only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: Record) -> usize {
        self.records.push(record);
        self.records.len() - 1
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = Record>) {
        self.records.extend(records);
    }

    pub fn remove_at(&mut self, index: usize) -> Result<Record, StoreError> {
        self.check_index(index)?;
        Ok(self.records.remove(index))
    }

    pub fn replace_secondary_at(
        &mut self,
        index: usize,
        secondary: impl Into<String>,
    ) -> Result<(), StoreError> {
        self.check_index(index)?;
        self.records[index].secondary = secondary.into();
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn all(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn check_index(&self, index: usize) -> Result<(), StoreError> {
        if index >= self.records.len() {
            return Err(StoreError::IndexOutOfBounds {
                index,
                len: self.records.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{RecordStore, StoreError};
    use crate::Record;

    fn store_with(rows: &[(&str, &str)]) -> RecordStore {
        let mut store = RecordStore::new();
        for (primary, secondary) in rows {
            store.append(Record::new(*primary, *secondary));
        }
        store
    }

    #[test]
    fn append_returns_new_position() {
        let mut store = RecordStore::new();
        assert_eq!(store.append(Record::new("a", "1")), 0);
        assert_eq!(store.append(Record::new("b", "2")), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn duplicates_are_kept() {
        let store = store_with(&[("a", "1"), ("a", "1")]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.all()[0], store.all()[1]);
    }

    #[test]
    fn remove_shifts_later_rows_down() -> Result<(), StoreError> {
        let mut store = store_with(&[("a", "1"), ("b", "2"), ("c", "3"), ("d", "4")]);
        let before = store.all().to_vec();

        let removed = store.remove_at(1)?;
        assert_eq!(removed, Record::new("b", "2"));
        assert_eq!(store.all()[0], before[0]);
        for (index, record) in before.iter().enumerate().skip(2) {
            assert_eq!(&store.all()[index - 1], record);
        }
        Ok(())
    }

    #[test]
    fn remove_out_of_range_leaves_store_unchanged() {
        let mut store = store_with(&[("a", "1")]);
        let error = store.remove_at(1).expect_err("index past end should fail");
        assert_eq!(error, StoreError::IndexOutOfBounds { index: 1, len: 1 });
        assert_eq!(store.all(), &[Record::new("a", "1")]);
    }

    #[test]
    fn replace_secondary_keeps_primary_and_position() -> Result<(), StoreError> {
        let mut store = store_with(&[("a", "Backlog"), ("b", "Backlog")]);
        store.replace_secondary_at(1, "Done")?;
        assert_eq!(store.all(), &[Record::new("a", "Backlog"), Record::new("b", "Done")]);
        Ok(())
    }

    #[test]
    fn replace_secondary_out_of_range_fails() {
        let mut store = RecordStore::new();
        let error = store
            .replace_secondary_at(0, "Done")
            .expect_err("empty store has no row 0");
        assert!(error.to_string().contains("out of range"));
    }
}
