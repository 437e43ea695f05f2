use dioxus::prelude::*;
use tracing::info;

use crate::domain::entities::finance::Category;
use crate::domain::entities::modal::ModalKind;
use crate::domain::entities::option::AsyncOption;
use crate::ui::components::search_select::{CreateHandler, SearchSelect, SourceHandle};
use crate::ui::state::app_state::{AppContext, AppState, ToastLevel};
use crate::usecase::services::category_service::upsert_category;

fn resolve_category(categories: &[Category], option: &AsyncOption) -> Option<Category> {
    categories
        .iter()
        .find(|category| category.id == option.value)
        .cloned()
        .or_else(|| {
            option
                .raw
                .clone()
                .and_then(|raw| serde_json::from_value::<Category>(raw).ok())
        })
}

/// Category picker over the shared category list. Picking an inactive
/// category asks to reactivate it; typing an unknown name offers to create a
/// private one.
#[component]
pub fn CategorySelector(
    #[props(!optional)] value: Option<String>,
    categories: Signal<Vec<Category>>,
    on_select: EventHandler<Option<String>>,
    #[props(default = "Selecciona una categoría".to_string())] placeholder: String,
    #[props(default)] clearable: bool,
) -> Element {
    let app = use_context::<AppState>();
    let ctx = use_context::<AppContext>();

    let initial_options: Vec<AsyncOption> =
        categories.read().iter().map(Category::to_option).collect();
    let source = SourceHandle(ctx.category_source.clone());
    let debounce_ms = ctx.config.search_debounce_ms;

    let reactivate_ctx = ctx.clone();
    let on_change = move |option: Option<AsyncOption>| {
        let Some(option) = option else {
            on_select.call(None);
            return;
        };
        let Some(category) = resolve_category(&categories.peek(), &option) else {
            on_select.call(Some(option.value));
            return;
        };
        if category.is_active {
            on_select.call(Some(category.id));
            return;
        }
        let ctx = reactivate_ctx.clone();
        let mut categories = categories;
        spawn(async move {
            let confirmed = app
                .confirm(ModalKind::ReactivateCategory {
                    name: category.name.clone(),
                })
                .await;
            if !confirmed {
                return;
            }
            match ctx.categories.reactivate(&category).await {
                Ok(updated) => {
                    info!(category = %updated.id, "category reactivated");
                    let id = updated.id.clone();
                    let name = updated.name.clone();
                    upsert_category(&mut categories.write(), updated);
                    on_select.call(Some(id));
                    app.toast(ToastLevel::Success, format!("Categoría \"{name}\" reactivada"));
                }
                Err(err) => app.report(&ctx, &err, "No se pudo reactivar la categoría"),
            }
        });
    };

    let create_ctx = ctx.clone();
    let on_create = CreateHandler::new(move |label: String| {
        let ctx = create_ctx.clone();
        let mut categories = categories;
        async move {
            let confirmed = app
                .confirm(ModalKind::CreatePrivateCategory {
                    name: label.clone(),
                })
                .await;
            if !confirmed {
                return Ok(None);
            }
            match ctx.categories.create_private(&label).await {
                Ok(category) => {
                    info!(category = %category.id, "private category created");
                    let option = category.to_option();
                    app.toast(
                        ToastLevel::Success,
                        format!("Categoría \"{}\" creada", category.name),
                    );
                    upsert_category(&mut categories.write(), category);
                    Ok(Some(option))
                }
                Err(err) => {
                    app.report(&ctx, &err, "No se pudo crear la categoría");
                    Ok(None)
                }
            }
        }
    });

    rsx! {
        SearchSelect {
            value,
            source,
            initial_options,
            placeholder,
            creatable: true,
            clearable,
            debounce_ms,
            on_change,
            on_create,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: &str, name: &str, active: bool) -> Category {
        Category {
            id: id.into(),
            name: name.into(),
            is_active: active,
            owner_id: None,
            owner_email: None,
            expenses_count: 0,
            incomes_count: 0,
            total_items_count: 0,
        }
    }

    #[test]
    fn resolves_from_cached_list_first() {
        let cached = vec![category("c1", "Comida", false)];
        let option = AsyncOption::new("c1", "Comida (Inactiva)");

        let found = resolve_category(&cached, &option).expect("should find cached category");
        assert!(!found.is_active);
    }

    #[test]
    fn falls_back_to_raw_search_payload() {
        let remote = category("c9", "Viajes", false);
        let option = remote.to_option();

        let found = resolve_category(&[], &option).expect("should decode raw payload");
        assert_eq!(found, remote);
        assert!(resolve_category(&[], &AsyncOption::new("x", "X")).is_none());
    }
}
