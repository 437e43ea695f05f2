use dioxus::prelude::*;

use crate::domain::entities::modal::ModalKind;
use crate::ui::state::app_state::{AppContext, AppState, Route, ToastLevel};
use crate::ui::styles::{dialog_style, input_style, primary_button_style};
use crate::usecase::ports::api::ApiError;
use crate::usecase::services::session_service::SessionError;

fn login_error_message(err: &SessionError) -> String {
    match err {
        SessionError::Api(ApiError::Unauthorized) => "Correo o contraseña incorrectos.".into(),
        SessionError::Api(ApiError::Http { status: 400, message }) => message.clone(),
        SessionError::Api(ApiError::Network(_)) => {
            "No se pudo conectar con el servidor. Revisa tu conexión.".into()
        }
        other => other.to_string(),
    }
}

#[component]
pub fn LoginPage() -> Element {
    let mut app = use_context::<AppState>();
    let ctx = use_context::<AppContext>();
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut submitting = use_signal(|| false);
    let mut error = use_signal(|| None::<String>);

    let mut submit = move || {
        if submitting() {
            return;
        }
        let ctx = ctx.clone();
        spawn(async move {
            let address = email.peek().trim().to_string();
            let secret = password.peek().clone();
            if address.is_empty() || secret.is_empty() {
                error.set(Some("Escribe tu correo y contraseña.".into()));
                return;
            }
            submitting.set(true);
            error.set(None);
            match ctx.sessions.login(&address, &secret).await {
                Ok(session) => {
                    let name = session.user.greeting_name();
                    password.set(String::new());
                    app.route.set(Route::Expenses);
                    app.session.set(Some(session));
                    app.toast(ToastLevel::Success, format!("Bienvenido, {name}"));
                }
                Err(err) => {
                    tracing::warn!(error = %err, "login failed");
                    error.set(Some(login_error_message(&err)));
                }
            }
            submitting.set(false);
        });
    };

    rsx! {
        div { style: "flex: 1; display: flex; align-items: center; justify-content: center;",
            form {
                style: "{dialog_style()} width: 340px; display: flex; flex-direction: column; gap: 10px;",
                onsubmit: move |event| {
                    event.prevent_default();
                    submit();
                },
                h2 { style: "margin: 0 0 6px;", "Iniciar sesión" }
                input {
                    r#type: "email",
                    style: "{input_style()}",
                    placeholder: "Correo",
                    autofocus: true,
                    value: "{email}",
                    oninput: move |event| email.set(event.value()),
                }
                input {
                    r#type: "password",
                    style: "{input_style()}",
                    placeholder: "Contraseña",
                    value: "{password}",
                    oninput: move |event| password.set(event.value()),
                }
                if let Some(message) = error() {
                    div { style: "color: #b91c1c;", "{message}" }
                }
                button {
                    r#type: "submit",
                    style: "{primary_button_style()}",
                    disabled: submitting(),
                    if submitting() { "Entrando..." } else { "Entrar" }
                }
                a {
                    href: "#",
                    style: "color: var(--muted); font-size: 12px; text-align: center;",
                    onclick: move |event| {
                        event.prevent_default();
                        app.show(ModalKind::PrivacyPolicy);
                    },
                    "Política de privacidad"
                }
            }
        }
    }
}
