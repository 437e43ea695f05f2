use dioxus::prelude::*;

use crate::domain::entities::finance::{
    category_label, Category, Expense, ExpenseDraft, ExpenseItemDraft,
};
use crate::domain::entities::modal::{GuidePage, ModalKind};
use crate::domain::entities::table::{ColumnDescriptor, RenderKind};
use crate::domain::format::{
    format_currency, format_long_date, format_short_date_str, parse_datetime, today_input,
};
use crate::ui::components::category_selector::CategorySelector;
use crate::ui::components::data_table::DataTable;
use crate::ui::state::app_state::{AppContext, AppState, ToastLevel};
use crate::ui::styles::{
    button_style, dialog_style, input_style, overlay_style, page_style, primary_button_style,
    table_cell_style, table_header_cell_style,
};
use crate::usecase::services::error::ServiceError;
use crate::usecase::services::ledger_service::upsert_by_id;

fn expense_columns() -> Vec<ColumnDescriptor<Expense>> {
    vec![
        ColumnDescriptor::new("Fecha").key("date").kind(RenderKind::Date),
        ColumnDescriptor::new("Notas").key("notes"),
        ColumnDescriptor::new("Conceptos").key("items"),
        ColumnDescriptor::new("Total").key("total").kind(RenderKind::Currency),
    ]
}

#[derive(Debug, Clone, PartialEq)]
enum Editor {
    New,
    Edit(Expense),
}

#[component]
pub fn ExpensesPage() -> Element {
    let app = use_context::<AppState>();
    let ctx = use_context::<AppContext>();
    let mut expenses = use_signal(Vec::<Expense>::new);
    let mut categories = use_signal(Vec::<Category>::new);
    let mut loading = use_signal(|| true);
    let mut editor = use_signal(|| None::<Editor>);

    let load_ctx = ctx.clone();
    use_effect(move || {
        let ctx = load_ctx.clone();
        spawn(async move {
            let (listed, available) =
                futures::join!(ctx.ledger.expenses(), ctx.categories.for_selector());
            match listed {
                Ok(list) => expenses.set(list),
                Err(err) => app.report(&ctx, &err, "No se pudieron cargar los gastos"),
            }
            match available {
                Ok(list) => categories.set(list),
                Err(err) if !err.is_unauthorized() => {
                    app.report(&ctx, &err, "No se pudieron cargar las categorías")
                }
                Err(_) => {}
            }
            loading.set(false);
        });
    });

    let delete_ctx = ctx.clone();
    let row_actions = move |expense: Expense| {
        let ctx = delete_ctx.clone();
        let edit_target = expense.clone();
        rsx! {
            button {
                style: "{button_style()}",
                onclick: move |_| editor.set(Some(Editor::Edit(edit_target.clone()))),
                "Editar"
            }
            button {
                style: "{button_style()} margin-left: 6px; color: #b91c1c;",
                onclick: move |_| {
                    let ctx = ctx.clone();
                    let expense = expense.clone();
                    spawn(async move {
                        let item = format!("el gasto del {}", format_short_date_str(&expense.date));
                        if !app.confirm(ModalKind::DeleteConfirmation { item }).await {
                            return;
                        }
                        match ctx.ledger.delete_expense(&expense.id).await {
                            Ok(()) => {
                                expenses.write().retain(|existing| existing.id != expense.id);
                                app.toast(ToastLevel::Success, "Gasto eliminado");
                            }
                            Err(err) => app.report(&ctx, &err, "No se pudo eliminar el gasto"),
                        }
                    });
                },
                "Eliminar"
            }
        }
    };

    let detail = move |expense: Expense| {
        rsx! {
            ExpenseDetail { expense, categories: categories() }
        }
    };

    rsx! {
        div { style: "{page_style()}",
            div { style: "display: flex; align-items: center; gap: 8px;",
                h2 { style: "margin: 0; flex: 1;", "Gastos" }
                button {
                    style: "{button_style()}",
                    onclick: move |_| app.show(ModalKind::Guide(GuidePage::ExpensesPage)),
                    "?"
                }
                button {
                    style: "{primary_button_style()}",
                    onclick: move |_| editor.set(Some(Editor::New)),
                    "Nuevo gasto"
                }
            }
            DataTable {
                records: expenses(),
                columns: expense_columns(),
                loading: loading(),
                empty_message: "Aún no registras gastos.",
                page_size: ctx.config.page_size,
                detail,
                row_actions,
                export_name: "gastos",
            }
            if let Some(current) = editor() {
                ExpenseForm {
                    initial: match current {
                        Editor::New => None,
                        Editor::Edit(expense) => Some(expense),
                    },
                    categories,
                    on_saved: move |saved: Expense| {
                        upsert_by_id(&mut expenses.write(), saved, |expense| expense.id.as_str());
                        editor.set(None);
                        app.toast(ToastLevel::Success, "Gasto guardado");
                    },
                    on_close: move |_| editor.set(None),
                }
            }
        }
    }
}

#[component]
fn ExpenseDetail(expense: Expense, categories: Vec<Category>) -> Element {
    let when = parse_datetime(&expense.date)
        .map(|date| format_long_date(&date))
        .unwrap_or_else(|| "-".to_string());
    let notes = expense.notes.clone().unwrap_or_default();

    rsx! {
        div { style: "font-weight: 600; font-size: 16px; margin-bottom: 4px;", "Gasto del {when}" }
        if !notes.is_empty() {
            p { style: "margin: 4px 0 12px; color: var(--muted);", "{notes}" }
        }
        table { style: "border-collapse: collapse; width: 100%;",
            thead {
                tr {
                    th { style: "{table_header_cell_style()}", "Categoría" }
                    th { style: "{table_header_cell_style()}", "Concepto" }
                    th { style: "{table_header_cell_style()} text-align: right;", "Cantidad" }
                    th { style: "{table_header_cell_style()} text-align: right;", "Precio" }
                    th { style: "{table_header_cell_style()} text-align: right;", "Subtotal" }
                }
            }
            tbody {
                for item in expense.items.iter() {
                    tr {
                        td { style: "{table_cell_style()}", "{category_label(&categories, &item.category_id)}" }
                        td { style: "{table_cell_style()}", "{item.name}" }
                        td { style: "{table_cell_style()} text-align: right;", "{item.quantity}" }
                        td { style: "{table_cell_style()} text-align: right;", "{format_currency(item.amount)}" }
                        td { style: "{table_cell_style()} text-align: right;", "{format_currency(item.subtotal())}" }
                    }
                }
            }
        }
        div { style: "text-align: right; font-weight: 600; margin-top: 8px;",
            "Total: {format_currency(expense.total)}"
        }
    }
}

#[component]
fn ExpenseForm(
    #[props(!optional)] initial: Option<Expense>,
    categories: Signal<Vec<Category>>,
    on_saved: EventHandler<Expense>,
    on_close: EventHandler<()>,
) -> Element {
    let app = use_context::<AppState>();
    let ctx = use_context::<AppContext>();
    let editing_id = initial.as_ref().map(|expense| expense.id.clone());
    let mut draft = use_signal(move || match &initial {
        Some(expense) => ExpenseDraft::from_expense(expense),
        None => ExpenseDraft::new(&today_input()),
    });
    let mut saving = use_signal(|| false);
    let mut error = use_signal(|| None::<String>);

    let title = if editing_id.is_some() { "Editar gasto" } else { "Nuevo gasto" };
    let current = draft();
    let total = format_currency(current.total());

    let save = move |_: MouseEvent| {
        let ctx = ctx.clone();
        let id = editing_id.clone();
        spawn(async move {
            saving.set(true);
            let snapshot = draft.peek().clone();
            let result = ctx.ledger.save_expense(id.as_deref(), &snapshot).await;
            saving.set(false);
            match result {
                Ok(saved) => on_saved.call(saved),
                Err(ServiceError::Invalid(invalid)) => error.set(Some(invalid.to_string())),
                Err(err) => app.report(&ctx, &err, "No se pudo guardar el gasto"),
            }
        });
    };

    rsx! {
        div {
            style: "{overlay_style(1100)}",
            onclick: move |_| on_close.call(()),
            div {
                style: "{dialog_style()} min-width: 640px;",
                onclick: move |event| event.stop_propagation(),
                div { style: "display: flex; align-items: center; gap: 8px; margin-bottom: 12px;",
                    div { style: "font-weight: 600; font-size: 16px; flex: 1;", "{title}" }
                    button {
                        style: "{button_style()}",
                        onclick: move |_| app.show(ModalKind::Guide(GuidePage::ExpenseForm)),
                        "?"
                    }
                }
                div { style: "display: grid; grid-template-columns: 90px 1fr; gap: 6px; align-items: center; margin-bottom: 12px;",
                    label { "Fecha" }
                    input {
                        r#type: "date",
                        style: "{input_style()}",
                        value: "{current.date}",
                        oninput: move |event| draft.write().date = event.value(),
                    }
                    label { "Notas" }
                    input {
                        style: "{input_style()}",
                        value: "{current.notes}",
                        placeholder: "Opcional",
                        oninput: move |event| draft.write().notes = event.value(),
                    }
                }
                div { style: "display: flex; flex-direction: column; gap: 6px;",
                    for (idx, item) in current.items.iter().cloned().enumerate() {
                        div {
                            key: "{idx}",
                            style: "display: grid; grid-template-columns: 2fr 2fr 1fr 70px auto; gap: 6px; align-items: center;",
                            CategorySelector {
                                value: item.category_id.clone(),
                                categories,
                                on_select: move |id: Option<String>| {
                                    if let Some(line) = draft.write().items.get_mut(idx) {
                                        line.category_id = id;
                                    }
                                },
                            }
                            input {
                                style: "{input_style()}",
                                placeholder: "Concepto",
                                value: "{item.name}",
                                oninput: move |event| {
                                    if let Some(line) = draft.write().items.get_mut(idx) {
                                        line.name = event.value();
                                    }
                                },
                            }
                            input {
                                style: "{input_style()} text-align: right;",
                                placeholder: "Precio",
                                inputmode: "decimal",
                                value: "{item.amount}",
                                oninput: move |event| {
                                    if let Some(line) = draft.write().items.get_mut(idx) {
                                        line.amount = event.value();
                                    }
                                },
                            }
                            input {
                                r#type: "number",
                                min: "1",
                                style: "{input_style()} text-align: right;",
                                value: "{item.quantity}",
                                oninput: move |event| {
                                    if let Some(line) = draft.write().items.get_mut(idx) {
                                        line.quantity = event.value();
                                    }
                                },
                            }
                            button {
                                style: "{button_style()}",
                                title: "Quitar concepto",
                                onclick: move |_| {
                                    let mut draft = draft.write();
                                    if idx < draft.items.len() {
                                        draft.items.remove(idx);
                                    }
                                },
                                "×"
                            }
                        }
                    }
                }
                div { style: "display: flex; align-items: center; margin-top: 8px;",
                    button {
                        style: "{button_style()}",
                        onclick: move |_| draft.write().items.push(ExpenseItemDraft::blank()),
                        "Agregar concepto"
                    }
                    div { style: "flex: 1; text-align: right; font-weight: 600;", "Total: {total}" }
                }
                if let Some(message) = error() {
                    div { style: "color: #b91c1c; margin-top: 8px;", "{message}" }
                }
                div { style: "display: flex; gap: 8px; justify-content: flex-end; margin-top: 16px;",
                    button {
                        style: "{button_style()}",
                        onclick: move |_| on_close.call(()),
                        "Cancelar"
                    }
                    button {
                        style: "{primary_button_style()}",
                        disabled: saving(),
                        onclick: save,
                        if saving() { "Guardando..." } else { "Guardar" }
                    }
                }
            }
        }
    }
}
