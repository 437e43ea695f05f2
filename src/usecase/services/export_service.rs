use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use crate::domain::entities::table::{ColumnDescriptor, SortState, TableRecord};
use crate::domain::table_view::export_rows;
use crate::infra::export::csv::export_csv_file;
use crate::platform::desktop::blocking::run_blocking;

/// Snapshot of a table ready to be written: every record, current sort order,
/// cells rendered as text.
#[derive(Debug, Clone, PartialEq)]
pub struct TableExport {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableExport {
    pub fn capture<T: TableRecord + Clone>(
        records: &[T],
        columns: &[ColumnDescriptor<T>],
        sort: &SortState,
    ) -> Self {
        let exportable: Vec<ColumnDescriptor<T>> = columns
            .iter()
            .filter(|column| column.accessor_key.is_some() || column.render.is_some())
            .cloned()
            .collect();
        let (headers, rows) = export_rows(records, &exportable, sort);
        Self { headers, rows }
    }

    pub async fn write_to(self, path: PathBuf) -> Result<PathBuf> {
        let row_count = self.rows.len();
        let written = run_blocking(move || {
            export_csv_file(&path, &self.headers, &self.rows).map(|_| path)
        })
        .await?;
        info!(path = %written.display(), rows = row_count, "table exported");
        Ok(written)
    }
}

pub fn suggested_file_name(table: &str, today: &str) -> String {
    format!("{table}-{today}.csv")
}
