use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::entities::option::{AsyncOption, INACTIVE_SUFFIX};
use crate::domain::entities::table::{CellValue, TableRecord};

fn default_true() -> bool {
    true
}

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, alias = "user_id")]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub owner_email: Option<String>,
    #[serde(default)]
    pub expenses_count: i64,
    #[serde(default)]
    pub incomes_count: i64,
    #[serde(default)]
    pub total_items_count: i64,
}

impl Category {
    pub fn is_global(&self) -> bool {
        self.owner_id.is_none()
    }

    pub fn display_name(&self) -> String {
        if self.is_active {
            self.name.clone()
        } else {
            format!("{} {INACTIVE_SUFFIX}", self.name)
        }
    }

    pub fn to_option(&self) -> AsyncOption {
        let raw = serde_json::to_value(self).unwrap_or_default();
        AsyncOption::new(self.id.clone(), self.display_name()).with_raw(raw)
    }
}

/// Name shown for a category id; ids missing from the list read as uncategorized.
pub fn category_label(categories: &[Category], id: &str) -> String {
    categories
        .iter()
        .find(|category| category.id == id)
        .map(Category::display_name)
        .unwrap_or_else(|| "Sin categoría".to_string())
}

impl TableRecord for Category {
    fn row_key(&self) -> String {
        self.id.clone()
    }

    fn field(&self, key: &str) -> CellValue {
        match key {
            "name" => CellValue::text(&self.name),
            "expenses_count" => CellValue::Number(self.expenses_count as f64),
            "incomes_count" => CellValue::Number(self.incomes_count as f64),
            "total_items_count" => CellValue::Number(self.total_items_count as f64),
            "is_active" => CellValue::Bool(self.is_active),
            "owner" => CellValue::opt_text(self.owner_email.as_deref()),
            _ => CellValue::Empty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub category_id: String,
    pub name: String,
    pub amount: f64,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

impl ExpenseItem {
    pub fn subtotal(&self) -> f64 {
        self.amount * self.quantity as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub date: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub items: Vec<ExpenseItem>,
}

impl TableRecord for Expense {
    fn row_key(&self) -> String {
        self.id.clone()
    }

    fn field(&self, key: &str) -> CellValue {
        match key {
            "date" => CellValue::date_str(&self.date),
            "notes" => CellValue::opt_text(self.notes.as_deref()),
            "items" => CellValue::Number(self.items.len() as f64),
            "total" => CellValue::Number(self.total),
            _ => CellValue::Empty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "monto")]
    pub amount: f64,
    #[serde(default)]
    pub category_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Income {
    pub id: String,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
    #[serde(rename = "fecha")]
    pub date: String,
    #[serde(rename = "fuente", default)]
    pub source: Option<String>,
    #[serde(rename = "monto_total", default)]
    pub total: f64,
    #[serde(default)]
    pub items: Vec<IncomeItem>,
}

impl TableRecord for Income {
    fn row_key(&self) -> String {
        self.id.clone()
    }

    fn field(&self, key: &str) -> CellValue {
        match key {
            "date" => CellValue::date_str(&self.date),
            "description" => CellValue::opt_text(self.description.as_deref()),
            "source" => CellValue::opt_text(self.source.as_deref()),
            "items" => CellValue::Number(self.items.len() as f64),
            "total" => CellValue::Number(self.total),
            _ => CellValue::Empty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: String,
    pub action: String,
    pub source: String,
    #[serde(default)]
    pub details: Option<String>,
    pub timestamp: String,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_phone: Option<String>,
}

impl AuditLog {
    pub fn user_label(&self) -> String {
        self.user_name
            .clone()
            .or_else(|| self.user_email.clone())
            .unwrap_or_else(|| "Sistema".to_string())
    }
}

impl TableRecord for AuditLog {
    fn row_key(&self) -> String {
        self.id.clone()
    }

    fn field(&self, key: &str) -> CellValue {
        match key {
            "source" => CellValue::text(&self.source),
            "user" => CellValue::text(self.user_label()),
            "action" => CellValue::text(self.action.to_lowercase()),
            "timestamp" => CellValue::date_str(&self.timestamp),
            "details" => CellValue::opt_text(self.details.as_deref()),
            _ => CellValue::Empty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl User {
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }

    pub fn greeting_name(&self) -> String {
        self.full_name().unwrap_or_else(|| self.email.clone())
    }
}

impl TableRecord for User {
    fn row_key(&self) -> String {
        self.id.clone()
    }

    fn field(&self, key: &str) -> CellValue {
        match key {
            "email" => CellValue::text(&self.email),
            "name" => CellValue::opt_text(self.full_name().as_deref()),
            "phone" => CellValue::opt_text(self.phone.as_deref()),
            "is_active" => CellValue::Bool(self.is_active),
            "is_superuser" => CellValue::Bool(self.is_superuser),
            _ => CellValue::Empty,
        }
    }
}

/// Line of an expense or income listed under a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub descripcion: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub monto: Option<f64>,
    #[serde(default)]
    pub quantity: Option<i64>,
}

impl CategoryEntry {
    pub fn label(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.descripcion.clone())
            .unwrap_or_else(|| "Sin nombre".to_string())
    }

    pub fn amount(&self) -> f64 {
        let unit = self.amount.or(self.monto).unwrap_or_default();
        unit * self.quantity.unwrap_or(1) as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Expenses,
    Incomes,
}

impl EntryKind {
    /// Expenses unless the category only has incomes.
    pub fn preferred_for(category: &Category) -> Self {
        if category.expenses_count == 0 && category.incomes_count > 0 {
            EntryKind::Incomes
        } else {
            EntryKind::Expenses
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EntryKind::Expenses => "Gastos",
            EntryKind::Incomes => "Ingresos",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("agrega al menos un concepto")]
    NoItems,
    #[error("el concepto {line} necesita un nombre")]
    BlankName { line: usize },
    #[error("el concepto {line} necesita una categoría")]
    MissingCategory { line: usize },
    #[error("el monto del concepto {line} debe ser mayor a 0")]
    InvalidAmount { line: usize },
    #[error("la cantidad del concepto {line} debe ser al menos 1")]
    InvalidQuantity { line: usize },
    #[error("la fecha no es válida")]
    InvalidDate,
    #[error("el nombre no puede estar vacío")]
    BlankCategoryName,
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim()
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount > 0.0)
}

fn parse_form_date(raw: &str) -> Result<Option<String>, DraftError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| Some(format!("{date}T00:00:00")))
        .map_err(|_| DraftError::InvalidDate)
}

fn date_input_value(raw: &str) -> String {
    crate::domain::format::parse_datetime(raw)
        .map(|value| value.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn blank_to_none(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn validate_category_name(raw: &str) -> Result<String, DraftError> {
    blank_to_none(raw).ok_or(DraftError::BlankCategoryName)
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExpenseItemDraft {
    pub category_id: Option<String>,
    pub name: String,
    pub amount: String,
    pub quantity: String,
}

impl ExpenseItemDraft {
    pub fn blank() -> Self {
        Self {
            quantity: "1".to_string(),
            ..Self::default()
        }
    }

    fn subtotal(&self) -> f64 {
        let quantity = self.quantity.trim().parse::<i64>().unwrap_or(0).max(0);
        parse_amount(&self.amount).unwrap_or_default() * quantity as f64
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExpenseDraft {
    pub date: String,
    pub notes: String,
    pub items: Vec<ExpenseItemDraft>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewExpense {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<ExpenseItem>,
}

impl ExpenseDraft {
    pub fn new(today: &str) -> Self {
        Self {
            date: today.to_string(),
            notes: String::new(),
            items: vec![ExpenseItemDraft::blank()],
        }
    }

    pub fn from_expense(expense: &Expense) -> Self {
        Self {
            date: date_input_value(&expense.date),
            notes: expense.notes.clone().unwrap_or_default(),
            items: expense
                .items
                .iter()
                .map(|item| ExpenseItemDraft {
                    category_id: Some(item.category_id.clone()),
                    name: item.name.clone(),
                    amount: item.amount.to_string(),
                    quantity: item.quantity.to_string(),
                })
                .collect(),
        }
    }

    /// Running total shown while editing; invalid lines count as zero.
    pub fn total(&self) -> f64 {
        self.items.iter().map(ExpenseItemDraft::subtotal).sum()
    }

    pub fn validate(&self) -> Result<NewExpense, DraftError> {
        if self.items.is_empty() {
            return Err(DraftError::NoItems);
        }
        let date = parse_form_date(&self.date)?;
        let items = self
            .items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                let line = idx + 1;
                let name = blank_to_none(&item.name).ok_or(DraftError::BlankName { line })?;
                let category_id = item
                    .category_id
                    .clone()
                    .filter(|id| !id.is_empty())
                    .ok_or(DraftError::MissingCategory { line })?;
                let amount =
                    parse_amount(&item.amount).ok_or(DraftError::InvalidAmount { line })?;
                let quantity = item
                    .quantity
                    .trim()
                    .parse::<i64>()
                    .ok()
                    .filter(|quantity| *quantity >= 1)
                    .ok_or(DraftError::InvalidQuantity { line })?;
                Ok(ExpenseItem {
                    id: None,
                    category_id,
                    name,
                    amount,
                    quantity,
                })
            })
            .collect::<Result<Vec<_>, DraftError>>()?;

        Ok(NewExpense {
            date,
            notes: blank_to_none(&self.notes),
            items,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IncomeItemDraft {
    pub description: String,
    pub amount: String,
    pub category_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IncomeDraft {
    pub description: String,
    pub date: String,
    pub source: String,
    pub items: Vec<IncomeItemDraft>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewIncome {
    #[serde(rename = "descripcion")]
    pub description: Option<String>,
    #[serde(rename = "fecha")]
    pub date: String,
    #[serde(rename = "fuente")]
    pub source: Option<String>,
    pub items: Vec<IncomeItem>,
}

impl IncomeDraft {
    pub fn new(today: &str) -> Self {
        Self {
            date: today.to_string(),
            items: vec![IncomeItemDraft::default()],
            ..Self::default()
        }
    }

    pub fn from_income(income: &Income) -> Self {
        Self {
            description: income.description.clone().unwrap_or_default(),
            date: date_input_value(&income.date),
            source: income.source.clone().unwrap_or_default(),
            items: income
                .items
                .iter()
                .map(|item| IncomeItemDraft {
                    description: item.description.clone(),
                    amount: item.amount.to_string(),
                    category_id: item.category_id.clone(),
                })
                .collect(),
        }
    }

    pub fn total(&self) -> f64 {
        self.items
            .iter()
            .filter_map(|item| parse_amount(&item.amount))
            .sum()
    }

    pub fn validate(&self) -> Result<NewIncome, DraftError> {
        if self.items.is_empty() {
            return Err(DraftError::NoItems);
        }
        let date = parse_form_date(&self.date)?.ok_or(DraftError::InvalidDate)?;
        let items = self
            .items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                let line = idx + 1;
                let description =
                    blank_to_none(&item.description).ok_or(DraftError::BlankName { line })?;
                let amount =
                    parse_amount(&item.amount).ok_or(DraftError::InvalidAmount { line })?;
                Ok(IncomeItem {
                    id: None,
                    description,
                    amount,
                    category_id: item.category_id.clone().filter(|id| !id.is_empty()),
                })
            })
            .collect::<Result<Vec<_>, DraftError>>()?;

        Ok(NewIncome {
            description: blank_to_none(&self.description),
            date,
            source: blank_to_none(&self.source),
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn category_deserializes_owner_alias_and_defaults() {
        let category: Category = serde_json::from_value(json!({
            "id": "c1",
            "name": "Comida",
            "user_id": "u9",
            "expenses_count": 3
        }))
        .expect("category should deserialize");

        assert!(category.is_active);
        assert_eq!(category.owner_id.as_deref(), Some("u9"));
        assert!(!category.is_global());
        assert_eq!(category.incomes_count, 0);
    }

    #[test]
    fn income_uses_backend_field_names() {
        let income: Income = serde_json::from_value(json!({
            "id": "i1",
            "descripcion": "Sueldo",
            "fecha": "2024-02-01T00:00:00",
            "fuente": "Empresa",
            "monto_total": 1500.0,
            "items": [{"descripcion": "Quincena", "monto": 1500.0}]
        }))
        .expect("income should deserialize");

        assert_eq!(income.description.as_deref(), Some("Sueldo"));
        assert_eq!(income.items[0].amount, 1500.0);
        assert_eq!(income.field("total"), CellValue::Number(1500.0));
    }

    #[test]
    fn inactive_category_option_is_labelled() {
        let category = Category {
            id: "c2".into(),
            name: "Renta".into(),
            is_active: false,
            owner_id: None,
            owner_email: None,
            expenses_count: 0,
            incomes_count: 2,
            total_items_count: 2,
        };
        assert_eq!(category.to_option().label, "Renta (Inactiva)");
        assert_eq!(EntryKind::preferred_for(&category), EntryKind::Incomes);
    }

    #[test]
    fn expense_draft_reports_first_invalid_line() {
        let mut draft = ExpenseDraft::new("2024-01-05");
        draft.items[0] = ExpenseItemDraft {
            category_id: Some("c1".into()),
            name: "Pan".into(),
            amount: "20".into(),
            quantity: "2".into(),
        };
        draft.items.push(ExpenseItemDraft {
            category_id: None,
            name: "Leche".into(),
            amount: "30".into(),
            quantity: "1".into(),
        });

        assert_eq!(draft.validate(), Err(DraftError::MissingCategory { line: 2 }));
        assert_eq!(draft.total(), 70.0);

        draft.items[1].category_id = Some("c1".into());
        draft.items[1].amount = "0".into();
        assert_eq!(draft.validate(), Err(DraftError::InvalidAmount { line: 2 }));
    }

    #[test]
    fn valid_expense_draft_builds_payload() {
        let draft = ExpenseDraft {
            date: "2024-01-05".into(),
            notes: "  ".into(),
            items: vec![ExpenseItemDraft {
                category_id: Some("c1".into()),
                name: " Café ".into(),
                amount: "1,250.5".into(),
                quantity: "1".into(),
            }],
        };

        let payload = draft.validate().expect("draft should be valid");
        assert_eq!(payload.date.as_deref(), Some("2024-01-05T00:00:00"));
        assert_eq!(payload.notes, None);
        assert_eq!(payload.items[0].name, "Café");
        assert_eq!(payload.items[0].amount, 1250.5);
    }

    #[test]
    fn income_draft_requires_date_and_positive_amounts() {
        let mut draft = IncomeDraft::new("");
        draft.items[0].description = "Pago".into();
        draft.items[0].amount = "100".into();
        assert_eq!(draft.validate(), Err(DraftError::InvalidDate));

        draft.date = "2024-03-01".into();
        let payload = draft.validate().expect("draft should be valid");
        assert_eq!(payload.items[0].category_id, None);
        assert_eq!(draft.total(), 100.0);

        let encoded = serde_json::to_value(&payload).expect("payload should encode");
        assert_eq!(encoded["fecha"], "2024-03-01T00:00:00");
        assert_eq!(encoded["items"][0]["monto"], 100.0);
    }

    #[test]
    fn empty_drafts_are_rejected() {
        let draft = ExpenseDraft::default();
        assert_eq!(draft.validate(), Err(DraftError::NoItems));
        assert_eq!(validate_category_name("   "), Err(DraftError::BlankCategoryName));
        assert_eq!(validate_category_name(" Viajes "), Ok("Viajes".to_string()));
    }

    #[test]
    fn draft_round_trips_existing_expense() {
        let expense = Expense {
            id: "e1".into(),
            date: "2024-01-05T10:30:00".into(),
            notes: Some("Súper".into()),
            total: 40.0,
            items: vec![ExpenseItem {
                id: Some("it1".into()),
                category_id: "c1".into(),
                name: "Pan".into(),
                amount: 20.0,
                quantity: 2,
            }],
        };
        let draft = ExpenseDraft::from_expense(&expense);
        assert_eq!(draft.date, "2024-01-05");
        assert_eq!(draft.total(), 40.0);
    }

    #[test]
    fn user_name_falls_back_to_email() {
        let user = User {
            id: "u1".into(),
            email: "ana@example.com".into(),
            is_active: true,
            is_superuser: false,
            first_name: Some("Ana".into()),
            last_name: None,
            phone: None,
        };
        assert_eq!(user.greeting_name(), "Ana");
        let anonymous = User {
            first_name: None,
            ..user
        };
        assert_eq!(anonymous.greeting_name(), "ana@example.com");
    }
}
