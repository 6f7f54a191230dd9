use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{StoreError, Table, TableStore};
use crate::models::Row;

/// On-disk layout of one table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableFile {
    #[serde(default)]
    pub rows: Vec<Row>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TableFile {
    pub fn age_minutes(&self) -> Option<i64> {
        self.updated_at.map(|at| (Utc::now() - at).num_minutes())
    }

    /// Human-readable time since the last append: "5m ago", "2h ago", "3d ago"
    pub fn age_display(&self) -> String {
        let Some(minutes) = self.age_minutes() else {
            return "never".to_string();
        };

        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }
}

/// File-backed store: `<dir>/<table>.json` per table.
pub struct JsonStore {
    data_dir: PathBuf,
}

impl JsonStore {
    pub fn new(data_dir: PathBuf) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&data_dir).map_err(|source| StoreError::DataDir {
            path: data_dir.clone(),
            source,
        })?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn table_path(&self, table: Table) -> PathBuf {
        self.data_dir.join(format!("{}.json", table.name()))
    }

    pub fn load_table(&self, table: Table) -> Result<TableFile, StoreError> {
        let path = self.table_path(table);
        if !path.exists() {
            return Ok(TableFile::default());
        }

        let contents =
            std::fs::read_to_string(&path).map_err(|source| StoreError::Io { table, source })?;
        serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt { table, source })
    }

    fn save_table(&self, table: Table, file: &TableFile) -> Result<(), StoreError> {
        let contents = serde_json::to_string_pretty(file)
            .map_err(|source| StoreError::Corrupt { table, source })?;

        // Write next to the target, then rename, so a crash never leaves half a table
        let path = self.table_path(table);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, contents).map_err(|source| StoreError::Io { table, source })?;
        std::fs::rename(&tmp, &path).map_err(|source| StoreError::Io { table, source })?;
        Ok(())
    }

    /// Age of the most recently written table, for the status bar
    pub fn last_updated(&self) -> String {
        let newest = Table::ALL
            .iter()
            .filter_map(|&t| match self.load_table(t) {
                Ok(file) => file.updated_at.map(|at| (at, file)),
                Err(e) => {
                    debug!(table = %t, error = %e, "Failed to load table for age display");
                    None
                }
            })
            .max_by_key(|(at, _)| *at);

        match newest {
            Some((_, file)) => file.age_display(),
            None => "never".to_string(),
        }
    }
}

impl TableStore for JsonStore {
    fn append_rows(&self, table: Table, rows: &[Row]) -> Result<(), StoreError> {
        let mut file = self.load_table(table)?;
        file.rows.extend(rows.iter().cloned());
        file.updated_at = Some(Utc::now());
        self.save_table(table, &file)?;
        debug!(%table, appended = rows.len(), total = file.rows.len(), "Appended rows");
        Ok(())
    }

    fn read_all_rows(&self, table: Table) -> Result<Vec<Row>, StoreError> {
        let file = self.load_table(table)?;
        debug!(%table, rows = file.rows.len(), "Read table");
        Ok(file.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_table_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().to_path_buf()).unwrap();
        assert!(store.read_all_rows(Table::Invoices).unwrap().is_empty());
        assert_eq!(store.last_updated(), "never");
    }

    #[test]
    fn test_append_keeps_order_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().to_path_buf()).unwrap();
        store
            .append_rows(Table::Attendance, &[row(&["Alice", "Yes"])])
            .unwrap();
        store
            .append_rows(Table::Attendance, &[row(&["Bob", "No"]), row(&["Carl", "Yes"])])
            .unwrap();

        let reopened = JsonStore::new(dir.path().to_path_buf()).unwrap();
        let rows = reopened.read_all_rows(Table::Attendance).unwrap();
        assert_eq!(
            rows,
            vec![row(&["Alice", "Yes"]), row(&["Bob", "No"]), row(&["Carl", "Yes"])]
        );
        assert!(reopened.read_all_rows(Table::SessionDates).unwrap().is_empty());
        assert_eq!(reopened.last_updated(), "just now");
    }

    #[test]
    fn test_corrupt_table_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("invoices.json"), "{ not json").unwrap();
        let store = JsonStore::new(dir.path().to_path_buf()).unwrap();
        assert!(matches!(
            store.read_all_rows(Table::Invoices),
            Err(StoreError::Corrupt { table: Table::Invoices, .. })
        ));
    }

    #[test]
    fn test_age_display() {
        let mut file = TableFile::default();
        assert_eq!(file.age_display(), "never");

        file.updated_at = Some(Utc::now() - Duration::minutes(5));
        assert_eq!(file.age_display(), "5m ago");

        file.updated_at = Some(Utc::now() - Duration::minutes(95));
        assert_eq!(file.age_display(), "2h ago");

        file.updated_at = Some(Utc::now() - Duration::days(3));
        assert_eq!(file.age_display(), "3d ago");
    }
}
