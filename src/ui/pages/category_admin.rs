use dioxus::prelude::*;

use crate::domain::category_groups::{merge_plan, CategoryGroup};
use crate::domain::entities::finance::Category;
use crate::domain::entities::modal::ModalKind;
use crate::domain::entities::table::{BadgePalette, ColumnDescriptor, RenderKind, Tone};
use crate::ui::components::data_table::DataTable;
use crate::ui::state::app_state::{AppContext, AppState, ToastLevel};
use crate::ui::styles::{
    button_style, dialog_style, input_style, overlay_style, page_style, primary_button_style,
    table_cell_style,
};
use crate::usecase::ports::api::CategoryScope;
use crate::usecase::services::category_service::upsert_category;
use crate::usecase::services::error::ServiceError;

fn own_columns() -> Vec<ColumnDescriptor<Category>> {
    vec![
        ColumnDescriptor::new("Nombre").key("name"),
        ColumnDescriptor::new("Gastos").key("expenses_count"),
        ColumnDescriptor::new("Ingresos").key("incomes_count"),
        ColumnDescriptor::new("Activa")
            .key("is_active")
            .kind(RenderKind::Boolean),
    ]
}

fn group_columns() -> Vec<ColumnDescriptor<CategoryGroup>> {
    let palette = BadgePalette::new()
        .with("colisión", Tone::Negative)
        .with("duplicada", Tone::Warning)
        .with("única", Tone::Neutral);
    vec![
        ColumnDescriptor::new("Nombre").key("label"),
        ColumnDescriptor::new("Global")
            .key("global")
            .kind(RenderKind::Boolean),
        ColumnDescriptor::new("Copias privadas").key("members"),
        ColumnDescriptor::new("Dueños").key("owners"),
        ColumnDescriptor::new("Movimientos").key("total_items"),
        ColumnDescriptor::new("Estado")
            .key("status")
            .kind(RenderKind::Badge(palette)),
    ]
}

#[component]
pub fn CategoryAdminPage() -> Element {
    let app = use_context::<AppState>();
    let ctx = use_context::<AppContext>();
    let mut own = use_signal(Vec::<Category>::new);
    let mut loading = use_signal(|| true);
    let mut new_name = use_signal(String::new);
    let mut creating = use_signal(|| false);
    let mut renaming = use_signal(|| None::<Category>);

    let load_ctx = ctx.clone();
    use_effect(move || {
        let ctx = load_ctx.clone();
        spawn(async move {
            match ctx.categories.list(CategoryScope::Mine).await {
                Ok(list) => own.set(list),
                Err(err) => app.report(&ctx, &err, "No se pudieron cargar tus categorías"),
            }
            loading.set(false);
        });
    });

    let create_ctx = ctx.clone();
    let create = move |_: MouseEvent| {
        let ctx = create_ctx.clone();
        spawn(async move {
            creating.set(true);
            let name = new_name.peek().clone();
            match ctx.categories.create_private(&name).await {
                Ok(category) => {
                    app.toast(
                        ToastLevel::Success,
                        format!("Categoría \"{}\" creada", category.name),
                    );
                    upsert_category(&mut own.write(), category);
                    new_name.set(String::new());
                }
                Err(ServiceError::Invalid(invalid)) => {
                    app.toast(ToastLevel::Warning, invalid.to_string())
                }
                Err(err) => app.report(&ctx, &err, "No se pudo crear la categoría"),
            }
            creating.set(false);
        });
    };

    let action_ctx = ctx.clone();
    let row_actions = move |category: Category| {
        let ctx = action_ctx.clone();
        let rename_target = category.clone();
        let toggle_ctx = ctx.clone();
        let toggle_target = category.clone();
        let is_active = category.is_active;
        rsx! {
            button {
                style: "{button_style()}",
                onclick: move |_| renaming.set(Some(rename_target.clone())),
                "Renombrar"
            }
            if !is_active {
                button {
                    style: "{button_style()} margin-left: 6px;",
                    onclick: move |_| {
                        let ctx = toggle_ctx.clone();
                        let category = toggle_target.clone();
                        spawn(async move {
                            match ctx.categories.reactivate(&category).await {
                                Ok(updated) => {
                                    upsert_category(&mut own.write(), updated);
                                    app.toast(ToastLevel::Success, "Categoría reactivada");
                                }
                                Err(err) => app.report(&ctx, &err, "No se pudo reactivar la categoría"),
                            }
                        });
                    },
                    "Reactivar"
                }
            }
            button {
                style: "{button_style()} margin-left: 6px; color: #b91c1c;",
                onclick: move |_| {
                    let ctx = ctx.clone();
                    let category = category.clone();
                    spawn(async move {
                        let item = format!("la categoría \"{}\"", category.name);
                        if !app.confirm(ModalKind::DeleteConfirmation { item }).await {
                            return;
                        }
                        match ctx.categories.delete(&category.id).await {
                            Ok(()) => {
                                own.write().retain(|existing| existing.id != category.id);
                                app.toast(ToastLevel::Success, "Categoría eliminada");
                            }
                            Err(err) => app.report(&ctx, &err, "No se pudo eliminar la categoría"),
                        }
                    });
                },
                "Eliminar"
            }
        }
    };

    rsx! {
        div { style: "{page_style()}",
            h2 { style: "margin: 0;", "Administrar categorías" }
            div { style: "display: flex; gap: 8px; align-items: center;",
                input {
                    style: "{input_style()} flex: 1; max-width: 360px;",
                    placeholder: "Nueva categoría personal",
                    value: "{new_name}",
                    oninput: move |event| new_name.set(event.value()),
                }
                button {
                    style: "{primary_button_style()}",
                    disabled: creating(),
                    onclick: create,
                    "Crear"
                }
            }
            DataTable {
                records: own(),
                columns: own_columns(),
                loading: loading(),
                empty_message: "No tienes categorías personales.",
                page_size: ctx.config.page_size,
                row_actions,
                export_name: "mis-categorias",
            }
            if app.is_superuser() {
                CategoryGroups {}
            }
            if let Some(category) = renaming() {
                RenameDialog {
                    category,
                    on_renamed: move |updated: Category| {
                        upsert_category(&mut own.write(), updated);
                        renaming.set(None);
                        app.toast(ToastLevel::Success, "Categoría renombrada");
                    },
                    on_close: move |_| renaming.set(None),
                }
            }
        }
    }
}

#[component]
fn RenameDialog(
    category: Category,
    on_renamed: EventHandler<Category>,
    on_close: EventHandler<()>,
) -> Element {
    let app = use_context::<AppState>();
    let ctx = use_context::<AppContext>();
    let initial = category.name.clone();
    let mut name = use_signal(move || initial);
    let mut error = use_signal(|| None::<String>);

    let save = move |_: MouseEvent| {
        let ctx = ctx.clone();
        let id = category.id.clone();
        spawn(async move {
            let value = name.peek().clone();
            match ctx.categories.rename(&id, &value).await {
                Ok(updated) => on_renamed.call(updated),
                Err(ServiceError::Invalid(invalid)) => error.set(Some(invalid.to_string())),
                Err(err) => app.report(&ctx, &err, "No se pudo renombrar la categoría"),
            }
        });
    };

    rsx! {
        div {
            style: "{overlay_style(1100)}",
            onclick: move |_| on_close.call(()),
            div {
                style: "{dialog_style()}",
                onclick: move |event| event.stop_propagation(),
                div { style: "font-weight: 600; margin-bottom: 8px;", "Renombrar categoría" }
                input {
                    style: "{input_style()} width: 100%; box-sizing: border-box;",
                    value: "{name}",
                    oninput: move |event| name.set(event.value()),
                }
                if let Some(message) = error() {
                    div { style: "color: #b91c1c; margin-top: 6px;", "{message}" }
                }
                div { style: "display: flex; gap: 8px; justify-content: flex-end; margin-top: 12px;",
                    button { style: "{button_style()}", onclick: move |_| on_close.call(()), "Cancelar" }
                    button { style: "{primary_button_style()}", onclick: save, "Guardar" }
                }
            }
        }
    }
}

/// Global view for superusers: same-name categories grouped together.
#[component]
fn CategoryGroups() -> Element {
    let app = use_context::<AppState>();
    let ctx = use_context::<AppContext>();
    let mut groups = use_signal(Vec::<CategoryGroup>::new);
    let mut loading = use_signal(|| true);
    let mut reload = use_signal(|| 0_u32);

    let load_ctx = ctx.clone();
    use_effect(move || {
        let _ = reload();
        let ctx = load_ctx.clone();
        loading.set(true);
        spawn(async move {
            match ctx.categories.admin_groups().await {
                Ok(list) => groups.set(list),
                Err(err) => app.report(&ctx, &err, "No se pudo cargar la vista global"),
            }
            loading.set(false);
        });
    });

    let collisions = groups.read().iter().filter(|group| group.has_collision()).count();

    let merge_ctx = ctx.clone();
    let row_actions = move |group: CategoryGroup| {
        let Some(plan) = merge_plan(&group) else {
            return rsx! {};
        };
        let ctx = merge_ctx.clone();
        rsx! {
            button {
                style: "{button_style()}",
                onclick: move |_| {
                    let ctx = ctx.clone();
                    let plan = plan.clone();
                    spawn(async move {
                        let kind = ModalKind::MergeCategories {
                            target: plan.target_name.clone(),
                            count: plan.source_ids.len(),
                        };
                        if !app.confirm(kind).await {
                            return;
                        }
                        match ctx.categories.merge(&plan).await {
                            Ok(()) => {
                                app.toast(
                                    ToastLevel::Success,
                                    format!("Categorías fusionadas en \"{}\"", plan.target_name),
                                );
                                *reload.write() += 1;
                            }
                            Err(err) => app.report(&ctx, &err, "No se pudo fusionar"),
                        }
                    });
                },
                "Fusionar"
            }
        }
    };

    rsx! {
        div { style: "display: flex; align-items: center; gap: 8px; margin-top: 12px;",
            h3 { style: "margin: 0; flex: 1;", "Vista global" }
            if collisions > 0 {
                span { style: "color: #92400e;", "{collisions} nombres con copias de varios usuarios sin categoría global" }
            }
        }
        DataTable {
            records: groups(),
            columns: group_columns(),
            loading: loading(),
            empty_message: "No hay categorías registradas.",
            page_size: ctx.config.page_size,
            detail: move |group: CategoryGroup| rsx! { GroupDetail { group } },
            row_actions,
            export_name: "categorias-globales",
        }
    }
}

#[component]
fn GroupDetail(group: CategoryGroup) -> Element {
    let global = group
        .global
        .as_ref()
        .map(Category::display_name)
        .unwrap_or_else(|| "Sin categoría global".to_string());

    rsx! {
        div { style: "font-weight: 600; font-size: 16px; margin-bottom: 8px;", "{group.label}" }
        p { style: "margin: 4px 0 8px;", "Global: {global}" }
        table { style: "border-collapse: collapse; width: 100%;",
            tbody {
                for member in group.members.iter() {
                    tr { key: "{member.id}",
                        td { style: "{table_cell_style()}", "{member.display_name()}" }
                        td { style: "{table_cell_style()}",
                            {member.owner_email.clone().unwrap_or_else(|| "-".to_string())}
                        }
                        td { style: "{table_cell_style()} text-align: right;", "{member.total_items_count}" }
                    }
                }
            }
        }
    }
}
