use dioxus::prelude::*;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::domain::entities::session::Theme;
use crate::ui::components::modal::ModalHost;
use crate::ui::components::toast::ToastHost;
use crate::ui::pages::audit_log::AuditLogPage;
use crate::ui::pages::categories::CategoriesPage;
use crate::ui::pages::category_admin::CategoryAdminPage;
use crate::ui::pages::expenses::ExpensesPage;
use crate::ui::pages::incomes::IncomesPage;
use crate::ui::pages::login::LoginPage;
use crate::ui::pages::users::UsersPage;
use crate::ui::state::app_state::{AppContext, AppState, Route, ToastLevel};
use crate::ui::styles::{button_style, primary_button_style, root_container_style};

/// Routes the current user may open, in navigation order.
pub fn visible_routes(superuser: bool) -> Vec<Route> {
    Route::ALL
        .into_iter()
        .filter(|route| superuser || !route.superuser_only())
        .collect()
}

/// Superuser-only routes fall back to expenses for everyone else.
pub fn guard_route(route: Route, superuser: bool) -> Route {
    if route.superuser_only() && !superuser {
        Route::Expenses
    } else {
        route
    }
}

#[component]
pub fn App() -> Element {
    let boot = use_hook(|| {
        AppConfig::load()
            .and_then(AppContext::build)
            .map_err(|err| {
                error!(error = %err, "failed to start");
                format!("{err:#}")
            })
    });

    match boot {
        Ok(ctx) => rsx! { Shell { ctx } },
        Err(message) => rsx! {
            div { style: "padding: 24px; font-family: sans-serif;",
                h2 { "No se pudo iniciar Gastos" }
                p { "{message}" }
            }
        },
    }
}

#[component]
fn Shell(ctx: AppContext) -> Element {
    let provided = ctx.clone();
    use_context_provider(move || provided);
    let state = AppState::new();
    let mut app = use_context_provider(move || state);

    let boot_ctx = ctx.clone();
    use_hook(move || {
        spawn(async move {
            if let Err(err) = boot_ctx.sessions.init().await {
                error!(error = %err, "failed to open local store");
                app.toast(ToastLevel::Error, format!("Almacenamiento local no disponible: {err}"));
            }
            match boot_ctx.sessions.load_theme().await {
                Ok(theme) => app.theme.set(theme),
                Err(err) => warn!(error = %err, "failed to load theme"),
            }
            match boot_ctx.sessions.restore().await {
                Ok(Some(session)) => {
                    info!(email = %session.user.email, "session restored");
                    app.session.set(Some(session));
                }
                Ok(None) => {}
                Err(err) => warn!(error = %err, "failed to restore session"),
            }
            app.booting.set(false);
        });
    });

    let theme_ctx = ctx.clone();
    let toggle_theme = move |_: MouseEvent| {
        let next = app.theme.peek().toggled();
        app.theme.set(next);
        let ctx = theme_ctx.clone();
        spawn(async move {
            if let Err(err) = ctx.sessions.save_theme(next).await {
                warn!(error = %err, "failed to save theme");
            }
        });
    };

    let logout_ctx = ctx.clone();
    let logout = move |_: MouseEvent| {
        let ctx = logout_ctx.clone();
        spawn(async move {
            if let Err(err) = ctx.sessions.logout().await {
                warn!(error = %err, "failed to clear stored session");
            }
            app.session.set(None);
            app.route.set(Route::Expenses);
            app.toast(ToastLevel::Info, "Sesión cerrada");
        });
    };

    let theme = (app.theme)();
    let superuser = app.is_superuser();
    let user = app.session.read().as_ref().map(|session| session.user.clone());
    let route = guard_route((app.route)(), superuser);
    let theme_label = match theme.toggled() {
        Theme::Dark => "Modo oscuro",
        Theme::Light => "Modo claro",
    };

    let content = if (app.booting)() {
        rsx! {
            div { style: "flex: 1; display: flex; align-items: center; justify-content: center; color: var(--muted);",
                "Cargando..."
            }
        }
    } else if let Some(user) = user {
        rsx! {
            div { style: "display: flex; align-items: center; gap: 6px; padding: 8px 12px; border-bottom: 1px solid var(--border); background: var(--surface);",
                for option in visible_routes(superuser) {
                    {
                        let style = if option == route { primary_button_style() } else { button_style() };
                        rsx! {
                            button {
                                key: "{option.label()}",
                                style: "{style}",
                                onclick: move |_| app.route.set(option),
                                "{option.label()}"
                            }
                        }
                    }
                }
                div { style: "flex: 1;" }
                span { style: "color: var(--muted);", "Hola, {user.greeting_name()}" }
                button { style: "{button_style()}", onclick: toggle_theme, "{theme_label}" }
                button { style: "{button_style()}", onclick: logout, "Cerrar sesión" }
            }
            {match route {
                Route::Expenses => rsx! { ExpensesPage {} },
                Route::Incomes => rsx! { IncomesPage {} },
                Route::Categories => rsx! { CategoriesPage {} },
                Route::CategoryAdmin => rsx! { CategoryAdminPage {} },
                Route::AuditLog => rsx! { AuditLogPage {} },
                Route::Users => rsx! { UsersPage {} },
            }}
        }
    } else {
        rsx! { LoginPage {} }
    };

    rsx! {
        div { style: "{root_container_style(theme)}",
            {content}
            ModalHost {}
            ToastHost {}
        }
    }
}
