use std::future::Future;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use dioxus::prelude::*;
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use tracing::debug;

use crate::domain::entities::option::AsyncOption;
use crate::domain::selector::{
    place_menu, Dismissal, MenuPlacement, Rect, SearchPlan, Selection, SelectorMode,
    SelectorState, Viewport, MENU_HEIGHT,
};
use crate::ui::styles::{button_style, dropdown_style, input_style};
use crate::usecase::ports::search::OptionSource;
use crate::usecase::services::search_service::SearchCoordinator;

pub type CreateResult = Result<Option<AsyncOption>, String>;

/// Option source handed to a selector; props compare by identity.
#[derive(Clone)]
pub struct SourceHandle(pub Arc<dyn OptionSource>);

impl PartialEq for SourceHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Async hook run when the user picks the "create" row. `Ok(None)` means
/// the caller declined and the selector stays open for editing.
#[derive(Clone)]
pub struct CreateHandler(Rc<dyn Fn(String) -> LocalBoxFuture<'static, CreateResult>>);

impl CreateHandler {
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(String) -> Fut + 'static,
        Fut: Future<Output = CreateResult> + 'static,
    {
        Self(Rc::new(move |label| handler(label).boxed_local()))
    }

    fn call(&self, label: String) -> LocalBoxFuture<'static, CreateResult> {
        (self.0)(label)
    }
}

impl PartialEq for CreateHandler {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

fn listener_script(root_id: &str, list_id: &str) -> String {
    format!(
        r#"
const inside = (id, target) => {{
    const el = document.getElementById(id);
    return !!el && target instanceof Node && el.contains(target);
}};
const onDown = (e) => {{
    if (!document.getElementById("{root_id}")) {{ cleanup(); return; }}
    if (inside("{root_id}", e.target) || inside("{list_id}", e.target)) return;
    dioxus.send("outside");
}};
const onScroll = (e) => {{
    if (!document.getElementById("{root_id}")) {{ cleanup(); return; }}
    dioxus.send(inside("{list_id}", e.target) ? "list-scroll" : "scroll");
}};
const onResize = () => dioxus.send("resize");
function cleanup() {{
    document.removeEventListener("mousedown", onDown, true);
    document.removeEventListener("scroll", onScroll, true);
    window.removeEventListener("resize", onResize);
}}
document.addEventListener("mousedown", onDown, true);
document.addEventListener("scroll", onScroll, true);
window.addEventListener("resize", onResize);
await dioxus.recv();
cleanup();
"#
    )
}

#[derive(Clone, Copy)]
struct Handles {
    state: Signal<SelectorState>,
    coordinator: Signal<SearchCoordinator>,
    trigger: Signal<Option<Rc<MountedData>>>,
    placement: Signal<Option<MenuPlacement>>,
}

impl Handles {
    fn close(mut self, reason: Dismissal) {
        if !self.state.peek().closes_on(reason) {
            return;
        }
        if self.state.write().dismiss(reason) {
            debug!(?reason, "selector closed");
            self.coordinator.write().cancel();
        }
    }

    fn open(mut self) {
        self.state.write().activate();
        self.coordinator.write().cancel();
        self.reposition();
    }

    fn reposition(mut self) {
        spawn(async move {
            let Some(trigger) = self.trigger.peek().clone() else {
                return;
            };
            let Ok(rect) = trigger.get_client_rect().await else {
                return;
            };
            let Ok((width, height)) = document::eval("return [window.innerWidth, window.innerHeight];")
                .join::<(f64, f64)>()
                .await
            else {
                return;
            };
            let trigger = Rect {
                left: rect.origin.x,
                top: rect.origin.y,
                width: rect.size.width,
                height: rect.size.height,
            };
            self.placement
                .set(Some(place_menu(trigger, Viewport { width, height }, MENU_HEIGHT)));
        });
    }

    fn search(mut self, text: String) {
        let plan = self.state.write().type_query(text);
        match plan {
            SearchPlan::RestoreInitial => self.coordinator.write().cancel(),
            SearchPlan::Fetch(request) => {
                let pending = self.coordinator.write().schedule(request);
                spawn(async move {
                    let outcome = pending.run().await;
                    self.state.write().finish_search(outcome);
                });
            }
        }
        if self.placement.peek().is_none() {
            self.reposition();
        }
    }

    /// The caller's `value` prop stays authoritative: after notifying it the
    /// selector reverts to `previous` until the prop actually changes.
    fn choose(
        mut self,
        option: AsyncOption,
        previous: Option<String>,
        on_change: EventHandler<Option<AsyncOption>>,
        on_create: Option<CreateHandler>,
    ) {
        let selection = self.state.write().select(&option);
        match selection {
            Selection::Commit(option) => {
                self.coordinator.write().cancel();
                on_change.call(Some(option));
                self.state.write().sync_value(previous);
            }
            Selection::Create(label) => {
                self.coordinator.write().cancel();
                let Some(handler) = on_create else {
                    self.state.write().finish_create(Ok(None));
                    return;
                };
                spawn(async move {
                    let result = handler.call(label).await;
                    let created = self.state.write().finish_create(result);
                    if let Some(option) = created {
                        on_change.call(Some(option));
                        self.state.write().sync_value(previous);
                    }
                });
            }
            Selection::Ignored => {}
        }
    }
}

/// Remote-search combobox: shows the committed label until clicked, then
/// searches `source` as the user types.
#[component]
pub fn SearchSelect(
    #[props(!optional)] value: Option<String>,
    source: SourceHandle,
    #[props(default)] initial_options: Vec<AsyncOption>,
    #[props(default = "Buscar...".to_string())] placeholder: String,
    #[props(default)] creatable: bool,
    #[props(default)] always_editing: bool,
    #[props(default)] clearable: bool,
    #[props(default = 300)] debounce_ms: u64,
    on_change: EventHandler<Option<AsyncOption>>,
    on_create: Option<CreateHandler>,
) -> Element {
    let instance = use_hook(|| dioxus::core::current_scope_id().0);
    let root_id = format!("search-select-{instance}");
    let list_id = format!("search-select-{instance}-list");

    let initial_value = value.clone();
    let initial_set = initial_options.clone();
    let state = use_signal(move || {
        SelectorState::new(initial_value, initial_set)
            .always_editing(always_editing)
            .creatable(creatable)
    });
    let initial_source = source.0.clone();
    let coordinator = use_signal(move || {
        SearchCoordinator::new(initial_source, Duration::from_millis(debounce_ms))
    });
    let trigger = use_signal(|| None::<Rc<MountedData>>);
    let placement = use_signal(|| None::<MenuPlacement>);
    let handles = Handles {
        state,
        coordinator,
        trigger,
        placement,
    };

    let mut synced = state;
    use_effect(use_reactive!(|value| synced.write().sync_value(value)));
    let mut configured = coordinator;
    use_effect(use_reactive!(|source, debounce_ms| {
        configured
            .write()
            .reconfigure(source.0.clone(), Duration::from_millis(debounce_ms));
    }));
    let mut seeded = state;
    use_effect(use_reactive!(|initial_options| {
        seeded.write().set_initial_options(initial_options)
    }));

    let script = listener_script(&root_id, &list_id);
    use_hook(move || {
        spawn(async move {
            let mut listener = document::eval(&script);
            while let Ok(event) = listener.recv::<String>().await {
                match event.as_str() {
                    "outside" => handles.close(Dismissal::OutsideClick),
                    "scroll" => handles.close(Dismissal::PageScroll),
                    "list-scroll" => handles.close(Dismissal::ListScroll),
                    "resize" if handles.state.peek().is_open => handles.reposition(),
                    _ => {}
                }
            }
        });
    });

    let mut cleanup = coordinator;
    use_drop(move || {
        if let Ok(mut coordinator) = cleanup.try_write() {
            coordinator.cancel();
        }
    });

    let current = state.read();
    let mode = current.mode();
    let is_open = current.is_open;
    let searching = current.is_search_loading;
    let creating = current.is_create_loading;
    let input_text = current.input_text();
    let label = current.display_label();
    let candidates = current.candidates();
    drop(current);

    let menu_position = placement()
        .map(|placement| placement.css())
        .unwrap_or_else(|| "visibility: hidden;".to_string());
    let has_value = value.is_some();

    rsx! {
        div {
            id: "{root_id}",
            style: "position: relative; display: flex; align-items: center; gap: 4px; min-width: 180px; width: 100%;",
            onmounted: move |event| {
                let mut trigger = trigger;
                trigger.set(Some(event.data()));
            },
            {match mode {
                SelectorMode::Display => rsx! {
                    div {
                        style: "{input_style()} flex: 1; cursor: pointer; white-space: nowrap; overflow: hidden; text-overflow: ellipsis;",
                        title: "Clic para cambiar",
                        onclick: move |_| handles.open(),
                        {match label {
                            Some(label) => rsx! { "{label}" },
                            None => rsx! { span { style: "color: var(--muted);", "{placeholder}" } },
                        }}
                    }
                    if clearable && has_value {
                        button {
                            style: "{button_style()}",
                            title: "Quitar",
                            onclick: move |_| on_change.call(None),
                            "×"
                        }
                    }
                },
                SelectorMode::Editing => rsx! {
                    input {
                        style: "{input_style()} flex: 1;",
                        placeholder: "{placeholder}",
                        value: "{input_text}",
                        onmounted: move |event| async move {
                            if handles.state.peek().is_open {
                                let _ = event.set_focus(true).await;
                            }
                        },
                        onfocus: move |_| {
                            let mut state = handles.state;
                            state.write().focus();
                            handles.reposition();
                        },
                        oninput: move |event| handles.search(event.value()),
                        onkeydown: {
                            let candidates = candidates.clone();
                            let previous = value.clone();
                            let on_create = on_create.clone();
                            move |event: KeyboardEvent| match event.key() {
                                Key::Escape => handles.close(Dismissal::Escape),
                                Key::Enter => {
                                    event.prevent_default();
                                    if let Some(first) = candidates.first() {
                                        handles.choose(first.clone(), previous.clone(), on_change, on_create.clone());
                                    }
                                }
                                _ => {}
                            }
                        },
                    }
                    if searching {
                        span { style: "color: var(--muted); font-size: 12px;", "..." }
                    }
                },
            }}
            if is_open {
                div {
                    id: "{list_id}",
                    style: "{dropdown_style()} {menu_position}",
                    if searching && candidates.is_empty() {
                        div { style: "padding: 8px 10px; color: var(--muted);", "Buscando..." }
                    } else if candidates.is_empty() {
                        div { style: "padding: 8px 10px; color: var(--muted);", "Sin resultados" }
                    }
                    for option in candidates.iter().cloned() {
                        {
                            let selected = !option.is_synthetic() && value.as_deref() == Some(option.value.as_str());
                            let background = if selected { "var(--hover)" } else { "transparent" };
                            let weight = if option.is_create() { "600" } else { "400" };
                            let text = if option.is_create() && creating {
                                "Creando...".to_string()
                            } else {
                                option.label.clone()
                            };
                            let previous = value.clone();
                            let on_create = on_create.clone();
                            rsx! {
                                div {
                                    key: "{option.value}{option.label}",
                                    style: "padding: 8px 10px; cursor: pointer; background: {background}; font-weight: {weight};",
                                    onclick: move |_| handles.choose(option.clone(), previous.clone(), on_change, on_create.clone()),
                                    "{text}"
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
