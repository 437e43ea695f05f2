use std::cmp::Ordering;

use crate::domain::entities::table::{
    CellContent, CellValue, ColumnDescriptor, SortDirection, SortState, TableRecord, TableState,
};
use crate::domain::format::format_value;

#[derive(Debug, Clone, PartialEq)]
pub struct TableView<T> {
    pub rows: Vec<T>,
    pub page: usize,
    pub total_pages: usize,
    pub total_records: usize,
    pub first_index: usize,
}

/// What the table body shows. Loading wins over empty, empty over rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableBody {
    Loading,
    Empty,
    Rows,
}

impl TableBody {
    pub fn choose(loading: bool, row_count: usize) -> Self {
        if loading {
            TableBody::Loading
        } else if row_count == 0 {
            TableBody::Empty
        } else {
            TableBody::Rows
        }
    }
}

pub fn column_value<T: TableRecord>(column: &ColumnDescriptor<T>, record: &T) -> CellValue {
    column
        .accessor_key
        .map(|key| record.field(key))
        .unwrap_or(CellValue::Empty)
}

/// Custom renderer first, then the render kind's formatter, then the raw value.
pub fn cell_content<T: TableRecord>(column: &ColumnDescriptor<T>, record: &T) -> CellContent {
    if let Some(render) = column.render {
        return render(record);
    }
    format_value(&column.render_kind, &column_value(column, record))
}

/// Stable sort of a copy of `records`. Keys that do not belong to a sortable
/// column leave the input order untouched.
pub fn sort_records<T: TableRecord + Clone>(
    records: &[T],
    columns: &[ColumnDescriptor<T>],
    sort: &SortState,
) -> Vec<T> {
    let Some(key) = sort.key else {
        return records.to_vec();
    };
    if !columns
        .iter()
        .any(|column| column.is_sortable() && column.accessor_key == Some(key))
    {
        return records.to_vec();
    }

    let mut keyed: Vec<(CellValue, T)> = records
        .iter()
        .map(|record| (record.field(key), record.clone()))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| match (a.is_empty(), b.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => match sort.direction {
            SortDirection::Asc => a.compare(b),
            SortDirection::Desc => b.compare(a),
        },
    });
    keyed.into_iter().map(|(_, record)| record).collect()
}

pub fn derive_view<T: TableRecord + Clone>(
    records: &[T],
    columns: &[ColumnDescriptor<T>],
    state: &TableState,
) -> TableView<T> {
    let total_records = records.len();
    let page = state.page.effective_page(total_records);
    let page_size = state.page.page_size;
    let first_index = (page - 1) * page_size;

    let rows = sort_records(records, columns, &state.sort)
        .into_iter()
        .skip(first_index)
        .take(page_size)
        .collect();

    TableView {
        rows,
        page,
        total_pages: state.page.total_pages(total_records),
        total_records,
        first_index,
    }
}

/// Every record in the current sort order, rendered as plain text.
pub fn export_rows<T: TableRecord + Clone>(
    records: &[T],
    columns: &[ColumnDescriptor<T>],
    sort: &SortState,
) -> (Vec<String>, Vec<Vec<String>>) {
    let headers = columns
        .iter()
        .map(|column| column.header.to_string())
        .collect();
    let rows = sort_records(records, columns, sort)
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| cell_content(column, record).plain_text())
                .collect()
        })
        .collect();
    (headers, rows)
}
