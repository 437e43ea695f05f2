use dioxus::prelude::*;

use crate::ui::state::app_state::AppState;
use crate::ui::styles::{badge_style, button_style, dialog_style, overlay_style, primary_button_style};

/// Renders whatever `AppState::modal` holds. Clicking the backdrop or
/// pressing Escape answers "no".
#[component]
pub fn ModalHost() -> Element {
    let app = use_context::<AppState>();
    let modal = app.modal.read();
    let Some(request) = modal.as_ref() else {
        return rsx! {};
    };
    let kind = request.kind.clone();
    drop(modal);

    let title = kind.title();
    let tone = kind.tone();
    let paragraphs = kind.paragraphs();
    let confirm_label = kind.confirm_label();
    let is_confirmation = kind.is_confirmation();

    rsx! {
        div {
            style: "{overlay_style(1400)}",
            tabindex: "-1",
            onclick: move |_| app.resolve_modal(false),
            onkeydown: move |event: KeyboardEvent| {
                if event.key() == Key::Escape {
                    app.resolve_modal(false);
                }
            },
            div {
                style: "{dialog_style()}",
                onclick: move |event| event.stop_propagation(),
                div { style: "display: flex; align-items: center; gap: 8px; margin-bottom: 12px;",
                    span { style: "{badge_style(tone)}", "●" }
                    div { style: "font-weight: 600; font-size: 16px;", "{title}" }
                }
                for paragraph in paragraphs {
                    p { style: "margin: 6px 0; line-height: 1.4;", "{paragraph}" }
                }
                div { style: "display: flex; gap: 8px; justify-content: flex-end; margin-top: 16px;",
                    if is_confirmation {
                        button {
                            style: "{button_style()}",
                            onclick: move |_| app.resolve_modal(false),
                            "Cancelar"
                        }
                    }
                    button {
                        style: "{primary_button_style()}",
                        onmounted: move |event| async move {
                            let _ = event.set_focus(true).await;
                        },
                        onclick: move |_| app.resolve_modal(true),
                        "{confirm_label}"
                    }
                }
            }
        }
    }
}
