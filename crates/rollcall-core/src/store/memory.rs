use std::cell::RefCell;
use std::collections::HashMap;

use super::{StoreError, Table, TableStore};
use crate::models::Row;

/// In-process tables. Single-threaded, like the rest of the app.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RefCell<HashMap<Table, Vec<Row>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TableStore for MemoryStore {
    fn append_rows(&self, table: Table, rows: &[Row]) -> Result<(), StoreError> {
        self.tables
            .borrow_mut()
            .entry(table)
            .or_default()
            .extend(rows.iter().cloned());
        Ok(())
    }

    fn read_all_rows(&self, table: Table) -> Result<Vec<Row>, StoreError> {
        Ok(self.tables.borrow().get(&table).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_independent() {
        let store = MemoryStore::new();
        store
            .append_rows(Table::SessionDates, &[vec!["2024-01-02".into()]])
            .unwrap();
        store
            .append_rows(Table::Invoices, &[vec!["2024-02-03".into(), "100".into()]])
            .unwrap();

        assert_eq!(store.read_all_rows(Table::SessionDates).unwrap().len(), 1);
        assert_eq!(store.read_all_rows(Table::Invoices).unwrap().len(), 1);
        assert!(store.read_all_rows(Table::Attendance).unwrap().is_empty());
    }
}
