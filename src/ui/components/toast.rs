use dioxus::prelude::*;

use crate::domain::entities::table::Tone;
use crate::ui::state::app_state::{AppState, ToastLevel};
use crate::ui::styles::tone_colors;

fn level_tone(level: ToastLevel) -> Tone {
    match level {
        ToastLevel::Success => Tone::Positive,
        ToastLevel::Info => Tone::Info,
        ToastLevel::Warning => Tone::Warning,
        ToastLevel::Error => Tone::Negative,
    }
}

#[component]
pub fn ToastHost() -> Element {
    let app = use_context::<AppState>();
    let toasts = app.toasts.read().clone();

    rsx! {
        div { style: "position: fixed; right: 16px; bottom: 16px; display: flex; flex-direction: column; gap: 8px; z-index: 1500; max-width: 360px;",
            for toast in toasts {
                {
                    let (background, color) = tone_colors(level_tone(toast.level));
                    let id = toast.id;
                    rsx! {
                        div {
                            key: "{id}",
                            style: "background: {background}; color: {color}; padding: 10px 14px; border-radius: 8px; box-shadow: 0 6px 16px rgba(0,0,0,0.15); cursor: pointer;",
                            onclick: move |_| app.dismiss_toast(id),
                            "{toast.message}"
                        }
                    }
                }
            }
        }
    }
}
