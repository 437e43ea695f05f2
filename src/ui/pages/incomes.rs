use dioxus::prelude::*;

use crate::domain::entities::finance::{
    category_label, Category, Income, IncomeDraft, IncomeItemDraft,
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

fn income_columns() -> Vec<ColumnDescriptor<Income>> {
    vec![
        ColumnDescriptor::new("Fecha").key("date").kind(RenderKind::Date),
        ColumnDescriptor::new("Descripción").key("description"),
        ColumnDescriptor::new("Fuente").key("source"),
        ColumnDescriptor::new("Conceptos").key("items"),
        ColumnDescriptor::new("Total").key("total").kind(RenderKind::Currency),
    ]
}

#[component]
pub fn IncomesPage() -> Element {
    let app = use_context::<AppState>();
    let ctx = use_context::<AppContext>();
    let mut incomes = use_signal(Vec::<Income>::new);
    let mut categories = use_signal(Vec::<Category>::new);
    let mut loading = use_signal(|| true);
    // Some(None) is a new income.
    let mut editor = use_signal(|| None::<Option<Income>>);

    let load_ctx = ctx.clone();
    use_effect(move || {
        let ctx = load_ctx.clone();
        spawn(async move {
            let (listed, available) =
                futures::join!(ctx.ledger.incomes(), ctx.categories.for_selector());
            match listed {
                Ok(list) => incomes.set(list),
                Err(err) => app.report(&ctx, &err, "No se pudieron cargar los ingresos"),
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
    let row_actions = move |income: Income| {
        let ctx = delete_ctx.clone();
        let edit_target = income.clone();
        rsx! {
            button {
                style: "{button_style()}",
                onclick: move |_| editor.set(Some(Some(edit_target.clone()))),
                "Editar"
            }
            button {
                style: "{button_style()} margin-left: 6px; color: #b91c1c;",
                onclick: move |_| {
                    let ctx = ctx.clone();
                    let income = income.clone();
                    spawn(async move {
                        let item = format!("el ingreso del {}", format_short_date_str(&income.date));
                        if !app.confirm(ModalKind::DeleteConfirmation { item }).await {
                            return;
                        }
                        match ctx.ledger.delete_income(&income.id).await {
                            Ok(()) => {
                                incomes.write().retain(|existing| existing.id != income.id);
                                app.toast(ToastLevel::Success, "Ingreso eliminado");
                            }
                            Err(err) => app.report(&ctx, &err, "No se pudo eliminar el ingreso"),
                        }
                    });
                },
                "Eliminar"
            }
        }
    };

    let detail = move |income: Income| {
        rsx! {
            IncomeDetail { income, categories: categories() }
        }
    };

    rsx! {
        div { style: "{page_style()}",
            div { style: "display: flex; align-items: center; gap: 8px;",
                h2 { style: "margin: 0; flex: 1;", "Ingresos" }
                button {
                    style: "{button_style()}",
                    onclick: move |_| app.show(ModalKind::Guide(GuidePage::DeleteIncome)),
                    "¿Cómo eliminar?"
                }
                button {
                    style: "{button_style()}",
                    onclick: move |_| app.show(ModalKind::Guide(GuidePage::IncomesPage)),
                    "?"
                }
                button {
                    style: "{primary_button_style()}",
                    onclick: move |_| editor.set(Some(None)),
                    "Nuevo ingreso"
                }
            }
            DataTable {
                records: incomes(),
                columns: income_columns(),
                loading: loading(),
                empty_message: "Aún no registras ingresos.",
                page_size: ctx.config.page_size,
                detail,
                row_actions,
                export_name: "ingresos",
            }
            if let Some(initial) = editor() {
                IncomeForm {
                    initial,
                    categories,
                    on_saved: move |saved: Income| {
                        upsert_by_id(&mut incomes.write(), saved, |income| income.id.as_str());
                        editor.set(None);
                        app.toast(ToastLevel::Success, "Ingreso guardado");
                    },
                    on_close: move |_| editor.set(None),
                }
            }
        }
    }
}

#[component]
fn IncomeDetail(income: Income, categories: Vec<Category>) -> Element {
    let when = parse_datetime(&income.date)
        .map(|date| format_long_date(&date))
        .unwrap_or_else(|| "-".to_string());
    let description = income.description.clone().unwrap_or_default();
    let source = income.source.clone().unwrap_or_else(|| "-".to_string());

    rsx! {
        div { style: "font-weight: 600; font-size: 16px; margin-bottom: 4px;", "Ingreso del {when}" }
        p { style: "margin: 4px 0; color: var(--muted);", "Fuente: {source}" }
        if !description.is_empty() {
            p { style: "margin: 4px 0 12px;", "{description}" }
        }
        table { style: "border-collapse: collapse; width: 100%;",
            thead {
                tr {
                    th { style: "{table_header_cell_style()}", "Descripción" }
                    th { style: "{table_header_cell_style()}", "Categoría" }
                    th { style: "{table_header_cell_style()} text-align: right;", "Monto" }
                }
            }
            tbody {
                for item in income.items.iter() {
                    tr {
                        td { style: "{table_cell_style()}", "{item.description}" }
                        td { style: "{table_cell_style()}",
                            {item.category_id.as_deref().map(|id| category_label(&categories, id)).unwrap_or_else(|| "-".to_string())}
                        }
                        td { style: "{table_cell_style()} text-align: right;", "{format_currency(item.amount)}" }
                    }
                }
            }
        }
        div { style: "text-align: right; font-weight: 600; margin-top: 8px;",
            "Total: {format_currency(income.total)}"
        }
    }
}

#[component]
fn IncomeForm(
    #[props(!optional)] initial: Option<Income>,
    categories: Signal<Vec<Category>>,
    on_saved: EventHandler<Income>,
    on_close: EventHandler<()>,
) -> Element {
    let app = use_context::<AppState>();
    let ctx = use_context::<AppContext>();
    let editing_id = initial.as_ref().map(|income| income.id.clone());
    let mut draft = use_signal(move || match &initial {
        Some(income) => IncomeDraft::from_income(income),
        None => IncomeDraft::new(&today_input()),
    });
    let mut saving = use_signal(|| false);
    let mut error = use_signal(|| None::<String>);

    let title = if editing_id.is_some() { "Editar ingreso" } else { "Nuevo ingreso" };
    let current = draft();
    let total = format_currency(current.total());

    let save = move |_: MouseEvent| {
        let ctx = ctx.clone();
        let id = editing_id.clone();
        spawn(async move {
            saving.set(true);
            let snapshot = draft.peek().clone();
            let result = ctx.ledger.save_income(id.as_deref(), &snapshot).await;
            saving.set(false);
            match result {
                Ok(saved) => on_saved.call(saved),
                Err(ServiceError::Invalid(invalid)) => error.set(Some(invalid.to_string())),
                Err(err) => app.report(&ctx, &err, "No se pudo guardar el ingreso"),
            }
        });
    };

    rsx! {
        div {
            style: "{overlay_style(1100)}",
            onclick: move |_| on_close.call(()),
            div {
                style: "{dialog_style()} min-width: 600px;",
                onclick: move |event| event.stop_propagation(),
                div { style: "display: flex; align-items: center; gap: 8px; margin-bottom: 12px;",
                    div { style: "font-weight: 600; font-size: 16px; flex: 1;", "{title}" }
                    button {
                        style: "{button_style()}",
                        onclick: move |_| app.show(ModalKind::Guide(GuidePage::IncomeForm)),
                        "?"
                    }
                }
                div { style: "display: grid; grid-template-columns: 100px 1fr; gap: 6px; align-items: center; margin-bottom: 12px;",
                    label { "Fecha" }
                    input {
                        r#type: "date",
                        style: "{input_style()}",
                        value: "{current.date}",
                        oninput: move |event| draft.write().date = event.value(),
                    }
                    label { "Descripción" }
                    input {
                        style: "{input_style()}",
                        value: "{current.description}",
                        placeholder: "Opcional",
                        oninput: move |event| draft.write().description = event.value(),
                    }
                    label { "Fuente" }
                    input {
                        style: "{input_style()}",
                        value: "{current.source}",
                        placeholder: "Nómina, venta, ...",
                        oninput: move |event| draft.write().source = event.value(),
                    }
                }
                div { style: "display: flex; flex-direction: column; gap: 6px;",
                    for (idx, item) in current.items.iter().cloned().enumerate() {
                        div {
                            key: "{idx}",
                            style: "display: grid; grid-template-columns: 2fr 2fr 1fr auto; gap: 6px; align-items: center;",
                            input {
                                style: "{input_style()}",
                                placeholder: "Descripción",
                                value: "{item.description}",
                                oninput: move |event| {
                                    if let Some(line) = draft.write().items.get_mut(idx) {
                                        line.description = event.value();
                                    }
                                },
                            }
                            CategorySelector {
                                value: item.category_id.clone(),
                                categories,
                                placeholder: "Sin categoría",
                                clearable: true,
                                on_select: move |id: Option<String>| {
                                    if let Some(line) = draft.write().items.get_mut(idx) {
                                        line.category_id = id;
                                    }
                                },
                            }
                            input {
                                style: "{input_style()} text-align: right;",
                                placeholder: "Monto",
                                inputmode: "decimal",
                                value: "{item.amount}",
                                oninput: move |event| {
                                    if let Some(line) = draft.write().items.get_mut(idx) {
                                        line.amount = event.value();
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
                        onclick: move |_| draft.write().items.push(IncomeItemDraft::default()),
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
