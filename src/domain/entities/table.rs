use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Raw value pulled out of a record by a column's accessor key.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
    Bool(bool),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    pub fn opt_text(value: Option<&str>) -> Self {
        value.map(CellValue::text).unwrap_or(CellValue::Empty)
    }

    pub fn date_str(raw: &str) -> Self {
        crate::domain::format::parse_datetime(raw)
            .map(CellValue::Date)
            .unwrap_or(CellValue::Empty)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    fn rank(&self) -> u8 {
        match self {
            CellValue::Bool(_) => 0,
            CellValue::Number(_) => 1,
            CellValue::Date(_) => 2,
            CellValue::Text(_) => 3,
            CellValue::Empty => 4,
        }
    }

    /// Total order used by the table sort. Values of different kinds order by
    /// kind, and empty values rank after everything else. The sort keeps them
    /// last in descending order too.
    pub fn compare(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Text(a), CellValue::Text(b)) => locale_compare(a, b),
            (CellValue::Number(a), CellValue::Number(b)) => a.total_cmp(b),
            (CellValue::Date(a), CellValue::Date(b)) => a.cmp(b),
            (CellValue::Bool(a), CellValue::Bool(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

fn fold_char(c: char) -> char {
    let lower = c.to_lowercase().next().unwrap_or(c);
    match lower {
        'á' | 'à' | 'ä' | 'â' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        other => other,
    }
}

fn is_accented(c: char) -> bool {
    let lower = c.to_lowercase().next().unwrap_or(c);
    fold_char(lower) != lower
}

/// Locale-aware comparison in three levels: base letters ignoring accents
/// and case, then unaccented before accented, then lower case before upper
/// case.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    a.chars()
        .map(fold_char)
        .cmp(b.chars().map(fold_char))
        .then_with(|| {
            a.chars()
                .map(is_accented)
                .cmp(b.chars().map(is_accented))
        })
        .then_with(|| {
            a.chars()
                .map(char::is_uppercase)
                .cmp(b.chars().map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tone {
    #[default]
    Neutral,
    Positive,
    Negative,
    Info,
    Warning,
    Accent,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BadgePalette(BTreeMap<String, Tone>);

impl BadgePalette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, value: &str, tone: Tone) -> Self {
        self.0.insert(value.to_lowercase(), tone);
        self
    }

    pub fn tone_for(&self, value: &str) -> Tone {
        self.0
            .get(&value.to_lowercase())
            .copied()
            .unwrap_or(Tone::Neutral)
    }
}

impl<const N: usize> From<[(&str, Tone); N]> for BadgePalette {
    fn from(entries: [(&str, Tone); N]) -> Self {
        entries
            .into_iter()
            .fold(BadgePalette::new(), |palette, (value, tone)| {
                palette.with(value, tone)
            })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RenderKind {
    #[default]
    Text,
    Currency,
    Date,
    Badge(BadgePalette),
    Boolean,
}

/// What a cell shows once formatting has been resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    Text(String),
    Placeholder,
    Badge { label: String, tone: Tone },
    Flag(bool),
}

impl CellContent {
    pub fn plain_text(&self) -> String {
        match self {
            CellContent::Text(text) => text.clone(),
            CellContent::Placeholder => "-".to_string(),
            CellContent::Badge { label, .. } => label.clone(),
            CellContent::Flag(true) => "Sí".to_string(),
            CellContent::Flag(false) => "No".to_string(),
        }
    }
}

pub trait TableRecord {
    fn row_key(&self) -> String;
    fn field(&self, key: &str) -> CellValue;
}

pub struct ColumnDescriptor<T> {
    pub header: &'static str,
    pub accessor_key: Option<&'static str>,
    pub render_kind: RenderKind,
    pub render: Option<fn(&T) -> CellContent>,
    sortable: bool,
}

impl<T> ColumnDescriptor<T> {
    pub fn new(header: &'static str) -> Self {
        Self {
            header,
            accessor_key: None,
            render_kind: RenderKind::Text,
            render: None,
            sortable: true,
        }
    }

    pub fn key(mut self, key: &'static str) -> Self {
        self.accessor_key = Some(key);
        self
    }

    pub fn kind(mut self, kind: RenderKind) -> Self {
        self.render_kind = kind;
        self
    }

    pub fn render(mut self, render: fn(&T) -> CellContent) -> Self {
        self.render = Some(render);
        self
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable && self.accessor_key.is_some()
    }
}

impl<T> Clone for ColumnDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            header: self.header,
            accessor_key: self.accessor_key,
            render_kind: self.render_kind.clone(),
            render: self.render,
            sortable: self.sortable,
        }
    }
}

// Renderers are compared by presence only; fn pointer identity is not stable.
impl<T> PartialEq for ColumnDescriptor<T> {
    fn eq(&self, other: &Self) -> bool {
        self.header == other.header
            && self.accessor_key == other.accessor_key
            && self.render_kind == other.render_kind
            && self.render.is_some() == other.render.is_some()
            && self.sortable == other.sortable
    }
}

impl<T> fmt::Debug for ColumnDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("header", &self.header)
            .field("accessor_key", &self.accessor_key)
            .field("render_kind", &self.render_kind)
            .field("custom_render", &self.render.is_some())
            .field("sortable", &self.sortable)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn indicator(self) -> &'static str {
        match self {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    pub key: Option<&'static str>,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub current_page: usize,
    pub page_size: usize,
}

impl Default for PageState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PageState {
    pub fn new(page_size: usize) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn total_pages(&self, record_count: usize) -> usize {
        record_count.div_ceil(self.page_size)
    }

    /// Page actually shown; stays valid when the record list shrinks.
    pub fn effective_page(&self, record_count: usize) -> usize {
        self.current_page
            .clamp(1, self.total_pages(record_count).max(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableAction {
    Sort(&'static str),
    GoToPage(usize),
    NextPage,
    PreviousPage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableState {
    pub sort: SortState,
    pub page: PageState,
}

impl TableState {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            sort: SortState::default(),
            page: PageState::new(page_size),
        }
    }

    pub fn apply(&mut self, action: TableAction, record_count: usize) {
        match action {
            TableAction::Sort(key) => {
                if self.sort.key == Some(key) {
                    self.sort.direction = self.sort.direction.toggled();
                } else {
                    self.sort.key = Some(key);
                    self.sort.direction = SortDirection::Asc;
                }
                self.page.current_page = 1;
            }
            TableAction::GoToPage(page) => self.set_page(page, record_count),
            TableAction::NextPage => {
                let next = self.page.effective_page(record_count) + 1;
                self.set_page(next, record_count);
            }
            TableAction::PreviousPage => {
                let previous = self.page.effective_page(record_count).saturating_sub(1);
                self.set_page(previous, record_count);
            }
        }
    }

    fn set_page(&mut self, page: usize, record_count: usize) {
        let total = self.page.total_pages(record_count);
        if total <= 1 {
            return;
        }
        self.page.current_page = page.clamp(1, total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accents_decide_before_case() {
        assert_eq!(locale_compare("Resume", "résumé"), Ordering::Less);
        assert_eq!(locale_compare("cafe", "café"), Ordering::Less);
        assert_eq!(locale_compare("resume", "Resume"), Ordering::Less);
        assert_eq!(locale_compare("árbol", "avena"), Ordering::Less);
        assert_eq!(locale_compare("Luz", "Luz"), Ordering::Equal);
    }
}
