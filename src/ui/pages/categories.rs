use dioxus::prelude::*;

use crate::domain::entities::finance::{Category, CategoryEntry, EntryKind};
use crate::domain::entities::table::{ColumnDescriptor, RenderKind};
use crate::domain::format::format_currency;
use crate::ui::components::data_table::DataTable;
use crate::ui::state::app_state::{AppContext, AppState};
use crate::ui::styles::{button_style, page_style, primary_button_style, table_cell_style};
use crate::usecase::ports::api::CategoryScope;

fn category_columns(show_all: bool) -> Vec<ColumnDescriptor<Category>> {
    let mut columns = vec![
        ColumnDescriptor::new("Nombre").key("name"),
        ColumnDescriptor::new("Gastos").key("expenses_count"),
        ColumnDescriptor::new("Ingresos").key("incomes_count"),
        ColumnDescriptor::new("Total").key("total_items_count"),
    ];
    if show_all {
        columns.push(
            ColumnDescriptor::new("Activa")
                .key("is_active")
                .kind(RenderKind::Boolean),
        );
    }
    columns
}

#[component]
pub fn CategoriesPage() -> Element {
    let app = use_context::<AppState>();
    let ctx = use_context::<AppContext>();
    let mut show_all = use_signal(|| false);
    let mut categories = use_signal(Vec::<Category>::new);
    let mut loading = use_signal(|| true);

    let load_ctx = ctx.clone();
    use_effect(move || {
        let scope = if show_all() {
            CategoryScope::All
        } else {
            CategoryScope::Active
        };
        let ctx = load_ctx.clone();
        loading.set(true);
        spawn(async move {
            match ctx.categories.list(scope).await {
                Ok(list) => categories.set(list),
                Err(err) => app.report(&ctx, &err, "No se pudieron cargar las categorías"),
            }
            loading.set(false);
        });
    });

    let all = show_all();
    let (mine_style, all_style) = if all {
        (button_style(), primary_button_style())
    } else {
        (primary_button_style(), button_style())
    };

    rsx! {
        div { style: "{page_style()}",
            div { style: "display: flex; align-items: center; gap: 8px;",
                h2 { style: "margin: 0; flex: 1;", "Categorías" }
                button { style: "{mine_style}", onclick: move |_| show_all.set(false), "Mis activas" }
                button { style: "{all_style}", onclick: move |_| show_all.set(true), "Ver todas" }
            }
            DataTable {
                key: "{all}",
                records: categories(),
                columns: category_columns(all),
                loading: loading(),
                empty_message: "No hay categorías.",
                page_size: ctx.config.page_size,
                detail: move |category: Category| rsx! { CategoryEntries { category } },
                export_name: "categorias",
            }
        }
    }
}

/// Items of one category; starts on whichever kind actually has entries.
#[component]
fn CategoryEntries(category: Category) -> Element {
    let app = use_context::<AppState>();
    let ctx = use_context::<AppContext>();
    let preferred = EntryKind::preferred_for(&category);
    let mut kind = use_signal(move || preferred);
    let mut entries = use_signal(Vec::<CategoryEntry>::new);
    let mut loading = use_signal(|| true);

    let target = category.clone();
    use_effect(move || {
        let selected = kind();
        let ctx = ctx.clone();
        let target = target.clone();
        loading.set(true);
        spawn(async move {
            match ctx.categories.entries(&target, selected).await {
                Ok(list) => entries.set(list),
                Err(err) => {
                    entries.set(Vec::new());
                    app.report(&ctx, &err, "No se pudieron cargar los movimientos");
                }
            }
            loading.set(false);
        });
    });

    let current = kind();
    let total: f64 = entries.read().iter().map(CategoryEntry::amount).sum();

    rsx! {
        div { style: "font-weight: 600; font-size: 16px; margin-bottom: 8px;", "{category.display_name()}" }
        div { style: "display: flex; gap: 6px; margin-bottom: 8px;",
            for option in [EntryKind::Expenses, EntryKind::Incomes] {
                {
                    let style = if option == current { primary_button_style() } else { button_style() };
                    rsx! {
                        button { style: "{style}", onclick: move |_| kind.set(option), "{option.label()}" }
                    }
                }
            }
        }
        if loading() {
            div { style: "color: var(--muted);", "Cargando..." }
        } else if entries.read().is_empty() {
            div { style: "color: var(--muted);", "Sin movimientos en {current.label().to_lowercase()}." }
        } else {
            table { style: "border-collapse: collapse; width: 100%;",
                tbody {
                    for entry in entries.read().iter() {
                        tr { key: "{entry.id}",
                            td { style: "{table_cell_style()}", "{entry.label()}" }
                            td { style: "{table_cell_style()} text-align: right;", "{format_currency(entry.amount())}" }
                        }
                    }
                }
            }
            div { style: "text-align: right; font-weight: 600; margin-top: 8px;", "Total: {format_currency(total)}" }
        }
    }
}
