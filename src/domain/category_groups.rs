use std::collections::{BTreeMap, BTreeSet};

use crate::domain::entities::finance::Category;
use crate::domain::entities::table::{CellValue, TableRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup {
    pub key: String,
    pub label: String,
    pub global: Option<Category>,
    pub members: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePlan {
    pub target_id: String,
    pub target_name: String,
    pub source_ids: Vec<String>,
}

pub fn normalize_category_name(name: &str) -> String {
    name.trim().to_lowercase()
}

impl CategoryGroup {
    pub fn owner_count(&self) -> usize {
        self.members
            .iter()
            .filter_map(|category| category.owner_id.as_deref())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Private copies from several owners with no global to fold them into.
    pub fn has_collision(&self) -> bool {
        self.global.is_none() && self.owner_count() > 1
    }

    pub fn has_duplicates(&self) -> bool {
        usize::from(self.global.is_some()) + self.members.len() > 1
    }

    pub fn total_items(&self) -> i64 {
        self.global
            .iter()
            .chain(self.members.iter())
            .map(|category| category.total_items_count)
            .sum()
    }

    pub fn status(&self) -> &'static str {
        if self.has_collision() {
            "Colisión"
        } else if self.has_duplicates() {
            "Duplicada"
        } else {
            "Única"
        }
    }
}

impl TableRecord for CategoryGroup {
    fn row_key(&self) -> String {
        self.key.clone()
    }

    fn field(&self, key: &str) -> CellValue {
        match key {
            "label" => CellValue::text(&self.label),
            "global" => CellValue::Bool(self.global.is_some()),
            "members" => CellValue::Number(self.members.len() as f64),
            "owners" => CellValue::Number(self.owner_count() as f64),
            "total_items" => CellValue::Number(self.total_items() as f64),
            "status" => CellValue::text(self.status()),
            _ => CellValue::Empty,
        }
    }
}

pub fn group_categories(list: &[Category]) -> Vec<CategoryGroup> {
    let mut grouped: BTreeMap<String, CategoryGroup> = BTreeMap::new();
    let mut sorted = list.to_vec();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));

    for category in sorted {
        let key = normalize_category_name(&category.name);
        let entry = grouped.entry(key.clone()).or_insert_with(|| CategoryGroup {
            key,
            label: category.name.trim().to_string(),
            global: None,
            members: Vec::new(),
        });
        if category.is_global() && entry.global.is_none() {
            entry.label = category.name.trim().to_string();
            entry.global = Some(category);
        } else {
            entry.members.push(category);
        }
    }

    grouped.into_values().collect()
}

/// Only groups anchored on a global category can be merged.
pub fn merge_plan(group: &CategoryGroup) -> Option<MergePlan> {
    let target = group.global.as_ref()?;
    if group.members.is_empty() {
        return None;
    }
    Some(MergePlan {
        target_id: target.id.clone(),
        target_name: target.name.clone(),
        source_ids: group.members.iter().map(|c| c.id.clone()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: &str, name: &str, owner: Option<&str>) -> Category {
        Category {
            id: id.to_string(),
            name: name.to_string(),
            is_active: true,
            owner_id: owner.map(str::to_string),
            owner_email: None,
            expenses_count: 0,
            incomes_count: 0,
            total_items_count: 1,
        }
    }

    #[test]
    fn groups_by_trimmed_lowercase_name() {
        let list = vec![
            category("3", "comida ", Some("u1")),
            category("1", "Comida", None),
            category("2", "COMIDA", Some("u2")),
            category("4", "Renta", Some("u1")),
        ];

        let groups = group_categories(&list);

        assert_eq!(groups.len(), 2);
        let food = &groups[0];
        assert_eq!(food.key, "comida");
        assert_eq!(food.label, "Comida");
        assert_eq!(food.global.as_ref().map(|c| c.id.as_str()), Some("1"));
        let member_ids: Vec<_> = food.members.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(member_ids, vec!["2", "3"]);
        assert_eq!(food.owner_count(), 2);
        assert!(!food.has_collision());
        assert_eq!(food.total_items(), 3);
    }

    #[test]
    fn private_duplicates_without_global_are_flagged() {
        let list = vec![
            category("1", "Gym", Some("u1")),
            category("2", "gym", Some("u2")),
        ];
        let groups = group_categories(&list);
        assert!(groups[0].has_collision());
        assert_eq!(merge_plan(&groups[0]), None);
    }

    #[test]
    fn merge_plan_targets_the_global_category() {
        let list = vec![
            category("g", "Viajes", None),
            category("p1", "viajes", Some("u1")),
        ];
        let groups = group_categories(&list);
        assert!(groups[0].has_duplicates());
        assert_eq!(
            merge_plan(&groups[0]),
            Some(MergePlan {
                target_id: "g".into(),
                target_name: "Viajes".into(),
                source_ids: vec!["p1".into()],
            })
        );
    }

    #[test]
    fn lone_category_has_nothing_to_merge() {
        let groups = group_categories(&[category("g", "Salud", None)]);
        assert!(!groups[0].has_duplicates());
        assert_eq!(merge_plan(&groups[0]), None);
    }

    #[test]
    fn status_reflects_collisions_before_duplicates() {
        let colliding = group_categories(&[
            category("1", "Gym", Some("u1")),
            category("2", "gym", Some("u2")),
        ]);
        assert_eq!(colliding[0].status(), "Colisión");
        assert_eq!(colliding[0].field("owners"), CellValue::Number(2.0));

        let mergeable = group_categories(&[
            category("g", "Gym", None),
            category("2", "gym", Some("u2")),
        ]);
        assert_eq!(mergeable[0].status(), "Duplicada");
        assert_eq!(mergeable[0].field("global"), CellValue::Bool(true));
    }
}
