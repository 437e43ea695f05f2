use dioxus::prelude::*;
use rfd::FileDialog;

use crate::domain::entities::table::{
    CellContent, ColumnDescriptor, RenderKind, TableAction, TableRecord, TableState, Tone,
    DEFAULT_PAGE_SIZE,
};
use crate::domain::format::today_input;
use crate::domain::table_view::{cell_content, derive_view, TableBody};
use crate::ui::state::app_state::{AppState, ToastLevel};
use crate::ui::styles::{
    badge_style, button_style, dialog_style, overlay_style, sort_indicator, table_cell_style,
    table_container_style, table_header_cell_style,
};
use crate::usecase::services::export_service::{suggested_file_name, TableExport};

#[component]
pub fn DataTable<T: TableRecord + Clone + PartialEq + 'static>(
    records: Vec<T>,
    columns: Vec<ColumnDescriptor<T>>,
    #[props(default)] loading: bool,
    #[props(default = "No hay registros.".to_string())] empty_message: String,
    #[props(default = DEFAULT_PAGE_SIZE)] page_size: usize,
    detail: Option<Callback<T, Element>>,
    row_actions: Option<Callback<T, Element>>,
    export_name: Option<String>,
) -> Element {
    let app = use_context::<AppState>();
    let mut table = use_signal(|| TableState::with_page_size(page_size));
    let mut opened = use_signal(|| None::<T>);

    let total = records.len();
    let view = derive_view(&records, &columns, &table.read());
    let body = TableBody::choose(loading, view.rows.len());
    if body == TableBody::Loading {
        return rsx! {
            div { style: "flex: 1; display: flex; align-items: center; justify-content: center; padding: 24px; color: var(--muted);",
                "Cargando..."
            }
        };
    }

    let span = columns.len() + usize::from(row_actions.is_some());
    let sort = table.read().sort;

    let export_button = export_name.map(|name| {
        let records = records.clone();
        let columns = columns.clone();
        rsx! {
            button {
                style: "{button_style()}",
                disabled: records.is_empty(),
                onclick: move |_| {
                    let export = TableExport::capture(&records, &columns, &table.read().sort);
                    let today = today_input();
                    let Some(path) = FileDialog::new()
                        .set_file_name(suggested_file_name(&name, &today))
                        .add_filter("CSV", &["csv"])
                        .save_file()
                    else {
                        return;
                    };
                    spawn(async move {
                        match export.write_to(path).await {
                            Ok(path) => app.toast(
                                ToastLevel::Success,
                                format!("Exportado a {}", path.display()),
                            ),
                            Err(err) => app.toast(
                                ToastLevel::Error,
                                format!("No se pudo exportar: {err:#}"),
                            ),
                        }
                    });
                },
                "Exportar CSV"
            }
        }
    });

    rsx! {
        div { style: "display: flex; flex-direction: column; gap: 8px; flex: 1; min-height: 0;",
            if let Some(button) = export_button {
                div { style: "display: flex; justify-content: flex-end;", {button} }
            }
            div { style: "{table_container_style()}",
                table { style: "border-collapse: collapse; width: 100%;",
                    thead {
                        tr {
                            for column in columns.iter().cloned() {
                                {
                                    let align = cell_align(&column.render_kind);
                                    let active = column.accessor_key.is_some() && sort.key == column.accessor_key;
                                    let indicator = sort_indicator(active.then_some(sort.direction));
                                    match column.accessor_key.filter(|_| column.is_sortable()) {
                                        Some(key) => rsx! {
                                            th {
                                                style: "{table_header_cell_style()} text-align: {align}; cursor: pointer; user-select: none;",
                                                onclick: move |_| table.write().apply(TableAction::Sort(key), total),
                                                "{column.header} "
                                                span { style: "color: var(--muted); font-size: 11px;", "{indicator}" }
                                            }
                                        },
                                        None => rsx! {
                                            th { style: "{table_header_cell_style()} text-align: {align};", "{column.header}" }
                                        },
                                    }
                                }
                            }
                            if row_actions.is_some() {
                                th { style: "{table_header_cell_style()}", "" }
                            }
                        }
                    }
                    tbody {
                        if body == TableBody::Empty {
                            tr {
                                td { colspan: "{span}", style: "{table_cell_style()} text-align: center; color: var(--muted);",
                                    "{empty_message}"
                                }
                            }
                        } else {
                            for record in view.rows.iter().cloned() {
                                {
                                    let key = record.row_key();
                                    let row_cursor = if detail.is_some() { "pointer" } else { "default" };
                                    let clicked = record.clone();
                                    rsx! {
                                        tr {
                                            key: "{key}",
                                            style: "cursor: {row_cursor};",
                                            onclick: move |_| {
                                                if detail.is_some() {
                                                    opened.set(Some(clicked.clone()));
                                                }
                                            },
                                            for column in columns.iter() {
                                                td { style: "{table_cell_style()} text-align: {cell_align(&column.render_kind)};",
                                                    {render_cell(cell_content(column, &record))}
                                                }
                                            }
                                            if let Some(actions) = row_actions {
                                                td {
                                                    style: "{table_cell_style()} white-space: nowrap; text-align: right;",
                                                    onclick: move |event| event.stop_propagation(),
                                                    {actions.call(record.clone())}
                                                }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
            if view.total_pages > 1 {
                div { style: "display: flex; gap: 8px; align-items: center; justify-content: flex-end;",
                    span { style: "color: var(--muted);",
                        "Página {view.page} de {view.total_pages} · {view.total_records} registros"
                    }
                    button {
                        style: "{button_style()}",
                        disabled: view.page <= 1,
                        onclick: move |_| table.write().apply(TableAction::PreviousPage, total),
                        "Anterior"
                    }
                    button {
                        style: "{button_style()}",
                        disabled: view.page >= view.total_pages,
                        onclick: move |_| table.write().apply(TableAction::NextPage, total),
                        "Siguiente"
                    }
                }
            }
        }
        if let (Some(detail), Some(record)) = (detail, opened()) {
            div {
                style: "{overlay_style(1100)}",
                onclick: move |_| opened.set(None),
                div {
                    style: "{dialog_style()}",
                    onclick: move |event| event.stop_propagation(),
                    {detail.call(record)}
                    div { style: "display: flex; justify-content: flex-end; margin-top: 12px;",
                        button {
                            style: "{button_style()}",
                            onclick: move |_| opened.set(None),
                            "Cerrar"
                        }
                    }
                }
            }
        }
    }
}

fn cell_align(kind: &RenderKind) -> &'static str {
    match kind {
        RenderKind::Currency => "right",
        RenderKind::Boolean | RenderKind::Badge(_) => "center",
        _ => "left",
    }
}

fn render_cell(content: CellContent) -> Element {
    match content {
        CellContent::Text(text) => rsx! { "{text}" },
        CellContent::Placeholder => rsx! { span { style: "color: var(--muted);", "-" } },
        CellContent::Badge { label, tone } => rsx! { span { style: "{badge_style(tone)}", "{label}" } },
        CellContent::Flag(flag) => {
            let tone = if flag { Tone::Positive } else { Tone::Negative };
            let label = CellContent::Flag(flag).plain_text();
            rsx! { span { style: "{badge_style(tone)}", "{label}" } }
        }
    }
}
