use dioxus::prelude::*;

use crate::domain::entities::finance::User;
use crate::domain::entities::table::{ColumnDescriptor, RenderKind};
use crate::ui::components::data_table::DataTable;
use crate::ui::state::app_state::{AppContext, AppState};
use crate::ui::styles::page_style;

fn user_columns() -> Vec<ColumnDescriptor<User>> {
    vec![
        ColumnDescriptor::new("Correo").key("email"),
        ColumnDescriptor::new("Nombre").key("name"),
        ColumnDescriptor::new("Teléfono").key("phone"),
        ColumnDescriptor::new("Activo")
            .key("is_active")
            .kind(RenderKind::Boolean),
        ColumnDescriptor::new("Administrador")
            .key("is_superuser")
            .kind(RenderKind::Boolean),
    ]
}

#[component]
pub fn UsersPage() -> Element {
    let app = use_context::<AppState>();
    let ctx = use_context::<AppContext>();
    let mut users = use_signal(Vec::<User>::new);
    let mut loading = use_signal(|| true);

    let load_ctx = ctx.clone();
    use_effect(move || {
        let ctx = load_ctx.clone();
        spawn(async move {
            match ctx.ledger.users().await {
                Ok(list) => users.set(list),
                Err(err) => app.report(&ctx, &err, "No se pudieron cargar los usuarios"),
            }
            loading.set(false);
        });
    });

    rsx! {
        div { style: "{page_style()}",
            h2 { style: "margin: 0;", "Usuarios" }
            DataTable {
                records: users(),
                columns: user_columns(),
                loading: loading(),
                empty_message: "No hay usuarios.",
                page_size: ctx.config.page_size,
                export_name: "usuarios",
            }
        }
    }
}
