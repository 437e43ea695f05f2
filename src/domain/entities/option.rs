use serde_json::Value;

pub const CREATE_ACTION_ID: &str = "create";
pub const INACTIVE_SUFFIX: &str = "(Inactiva)";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AsyncOption {
    pub value: String,
    pub label: String,
    pub raw: Option<Value>,
    pub action_id: Option<String>,
}

impl AsyncOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            raw: None,
            action_id: None,
        }
    }

    pub fn with_raw(mut self, raw: Value) -> Self {
        self.raw = Some(raw);
        self
    }

    pub fn create_affordance(query: &str) -> Self {
        Self {
            value: String::new(),
            label: format!("Crear \"{}\"", query.trim()),
            raw: None,
            action_id: Some(CREATE_ACTION_ID.to_string()),
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.value.is_empty() && self.action_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    pub fn is_create(&self) -> bool {
        self.action_id.as_deref() == Some(CREATE_ACTION_ID)
    }
}

/// Maps `[{id, name, is_active?}]` search results to options.
pub fn default_option_mapper(data: &Value) -> Vec<AsyncOption> {
    let Some(items) = data.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let value = match item.get("id")? {
                Value::String(id) => id.clone(),
                Value::Number(id) => id.to_string(),
                _ => return None,
            };
            let name = item.get("name").and_then(Value::as_str).unwrap_or_default();
            let label = if item.get("is_active").and_then(Value::as_bool) == Some(false) {
                format!("{name} {INACTIVE_SUFFIX}")
            } else {
                name.to_string()
            };
            Some(AsyncOption::new(value, label).with_raw(item.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_mapper_marks_inactive_items() {
        let data = json!([
            {"id": "a1", "name": "Comida"},
            {"id": "b2", "name": "Renta", "is_active": false},
            {"id": 7, "name": "Transporte", "is_active": true},
            {"name": "sin id"}
        ]);

        let options = default_option_mapper(&data);

        let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["Comida", "Renta (Inactiva)", "Transporte"]);
        assert_eq!(options[2].value, "7");
        assert!(options[0].raw.is_some());
    }

    #[test]
    fn non_array_payload_maps_to_nothing() {
        assert!(default_option_mapper(&json!({"detail": "boom"})).is_empty());
    }

    #[test]
    fn create_affordance_is_synthetic() {
        let option = AsyncOption::create_affordance("  Café ");
        assert!(option.is_synthetic());
        assert!(option.is_create());
        assert_eq!(option.label, "Crear \"Café\"");
        assert!(!AsyncOption::new("x", "X").is_synthetic());
    }
}
