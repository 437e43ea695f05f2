use dioxus::prelude::*;

use crate::domain::entities::finance::AuditLog;
use crate::domain::entities::table::{BadgePalette, ColumnDescriptor, RenderKind, Tone};
use crate::domain::format::{format_long_date, parse_datetime};
use crate::ui::components::data_table::DataTable;
use crate::ui::state::app_state::{AppContext, AppState};
use crate::ui::styles::page_style;

fn action_palette() -> BadgePalette {
    BadgePalette::from([
        ("login", Tone::Positive),
        ("login_silent", Tone::Info),
        ("unlink_telegram", Tone::Warning),
        ("create_expense", Tone::Accent),
        ("create_user", Tone::Negative),
    ])
}

fn audit_columns() -> Vec<ColumnDescriptor<AuditLog>> {
    vec![
        ColumnDescriptor::new("Fuente").key("source"),
        ColumnDescriptor::new("Usuario").key("user"),
        ColumnDescriptor::new("Acción")
            .key("action")
            .kind(RenderKind::Badge(action_palette())),
        ColumnDescriptor::new("Fecha")
            .key("timestamp")
            .kind(RenderKind::Date),
        ColumnDescriptor::new("Detalles").key("details").unsortable(),
    ]
}

#[component]
pub fn AuditLogPage() -> Element {
    let app = use_context::<AppState>();
    let ctx = use_context::<AppContext>();
    let mut logs = use_signal(Vec::<AuditLog>::new);
    let mut loading = use_signal(|| true);

    let load_ctx = ctx.clone();
    use_effect(move || {
        let ctx = load_ctx.clone();
        spawn(async move {
            match ctx.ledger.audit_logs().await {
                Ok(list) => logs.set(list),
                Err(err) => app.report(&ctx, &err, "No se pudo cargar la bitácora"),
            }
            loading.set(false);
        });
    });

    rsx! {
        div { style: "{page_style()}",
            h2 { style: "margin: 0;", "Bitácora" }
            DataTable {
                records: logs(),
                columns: audit_columns(),
                loading: loading(),
                empty_message: "Sin eventos registrados.",
                page_size: ctx.config.page_size,
                detail: move |log: AuditLog| rsx! { AuditDetail { log } },
                export_name: "bitacora",
            }
        }
    }
}

#[component]
fn AuditDetail(log: AuditLog) -> Element {
    let when = parse_datetime(&log.timestamp)
        .map(|date| format_long_date(&date))
        .unwrap_or_else(|| log.timestamp.clone());
    let contact = [log.user_email.clone(), log.user_phone.clone()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" · ");
    let details = log
        .details
        .clone()
        .unwrap_or_else(|| "Sin detalles.".to_string());

    rsx! {
        div { style: "font-weight: 600; font-size: 16px; margin-bottom: 4px;", "{log.action}" }
        p { style: "margin: 4px 0; color: var(--muted);", "{when} · {log.source}" }
        p { style: "margin: 4px 0;", "{log.user_label()}" }
        if !contact.is_empty() {
            p { style: "margin: 4px 0; color: var(--muted);", "{contact}" }
        }
        pre { style: "white-space: pre-wrap; margin: 12px 0 0; font-family: inherit;", "{details}" }
    }
}
