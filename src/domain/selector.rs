//! State machine behind the remote search selector.
//!
//! The component feeds user events in and gets back plans (what to fetch,
//! what to commit); all async work lives in the search service.

use tracing::warn;

use crate::domain::entities::option::AsyncOption;

pub const MENU_HEIGHT: f64 = 240.0;
pub const MENU_GAP: f64 = 6.0;
pub const VIEWPORT_MARGIN: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorMode {
    Display,
    Editing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub id: u64,
    pub term: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPlan {
    RestoreInitial,
    Fetch(SearchRequest),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Loaded { id: u64, options: Vec<AsyncOption> },
    Failed { id: u64, message: String },
    Cancelled { id: u64 },
}

impl SearchOutcome {
    pub fn id(&self) -> u64 {
        match self {
            SearchOutcome::Loaded { id, .. }
            | SearchOutcome::Failed { id, .. }
            | SearchOutcome::Cancelled { id } => *id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Commit(AsyncOption),
    Create(String),
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dismissal {
    OutsideClick,
    Escape,
    PageScroll,
    ListScroll,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectorState {
    value: Option<String>,
    committed_label: Option<(String, String)>,
    initial_options: Vec<AsyncOption>,
    pub query: String,
    pub is_open: bool,
    pub options: Vec<AsyncOption>,
    pub is_search_loading: bool,
    pub is_create_loading: bool,
    pub is_editing: bool,
    always_editing: bool,
    creatable: bool,
    latest_request: u64,
}

impl SelectorState {
    pub fn new(value: Option<String>, initial_options: Vec<AsyncOption>) -> Self {
        Self {
            is_editing: value.is_none(),
            value,
            committed_label: None,
            options: initial_options.clone(),
            initial_options,
            query: String::new(),
            is_open: false,
            is_search_loading: false,
            is_create_loading: false,
            always_editing: false,
            creatable: false,
            latest_request: 0,
        }
    }

    pub fn always_editing(mut self, always: bool) -> Self {
        self.always_editing = always;
        if always {
            self.is_editing = true;
        }
        self
    }

    pub fn creatable(mut self, creatable: bool) -> Self {
        self.creatable = creatable;
        self
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn latest_request(&self) -> u64 {
        self.latest_request
    }

    pub fn mode(&self) -> SelectorMode {
        if self.is_editing || self.value.is_none() {
            SelectorMode::Editing
        } else {
            SelectorMode::Display
        }
    }

    /// Mirrors the caller-owned value; drops back to display unless the user
    /// is in the middle of editing.
    pub fn sync_value(&mut self, value: Option<String>) {
        self.value = value;
        if self.value.is_none() {
            self.is_editing = true;
        } else if !self.is_open && !self.always_editing {
            self.is_editing = false;
        }
    }

    pub fn set_initial_options(&mut self, options: Vec<AsyncOption>) {
        if self.query.trim().is_empty() && !self.is_search_loading {
            self.options = options.clone();
        }
        self.initial_options = options;
    }

    pub fn display_label(&self) -> Option<String> {
        let value = self.value.as_deref()?;
        self.options
            .iter()
            .chain(self.initial_options.iter())
            .find(|option| option.value == value && !option.is_synthetic())
            .map(|option| option.label.clone())
            .or_else(|| {
                self.committed_label
                    .as_ref()
                    .filter(|(committed, _)| committed == value)
                    .map(|(_, label)| label.clone())
            })
    }

    pub fn input_text(&self) -> String {
        if self.is_open || !self.query.is_empty() {
            return self.query.clone();
        }
        self.display_label().unwrap_or_default()
    }

    /// Click on the read-only display.
    pub fn activate(&mut self) {
        self.is_editing = true;
        self.query.clear();
        self.options = self.initial_options.clone();
        self.is_open = true;
        self.is_search_loading = false;
        self.latest_request += 1;
    }

    pub fn focus(&mut self) {
        self.is_open = true;
        if self.value.is_some() {
            self.query.clear();
        }
    }

    pub fn type_query(&mut self, text: impl Into<String>) -> SearchPlan {
        self.query = text.into();
        self.is_open = true;
        self.begin_search()
    }

    /// Every call supersedes the previous request, including blank ones, so a
    /// late response can never overwrite the restored initial set.
    pub fn begin_search(&mut self) -> SearchPlan {
        self.latest_request += 1;
        if self.query.trim().is_empty() {
            self.options = self.initial_options.clone();
            self.is_search_loading = false;
            return SearchPlan::RestoreInitial;
        }
        self.is_search_loading = true;
        SearchPlan::Fetch(SearchRequest {
            id: self.latest_request,
            term: self.query.clone(),
        })
    }

    /// Applies a search outcome. Returns false when it was stale or cancelled.
    pub fn finish_search(&mut self, outcome: SearchOutcome) -> bool {
        if outcome.id() != self.latest_request {
            return false;
        }
        match outcome {
            SearchOutcome::Loaded { options, .. } => {
                self.options = options;
                self.is_search_loading = false;
                true
            }
            SearchOutcome::Failed { message, .. } => {
                warn!(%message, query = %self.query, "option search failed");
                self.options.clear();
                self.is_search_loading = false;
                true
            }
            SearchOutcome::Cancelled { .. } => false,
        }
    }

    pub fn shows_create(&self) -> bool {
        let trimmed = self.query.trim();
        if !self.creatable || trimmed.is_empty() || self.is_search_loading {
            return false;
        }
        let needle = trimmed.to_lowercase();
        !self
            .options
            .iter()
            .any(|option| option.label.to_lowercase() == needle)
    }

    pub fn candidates(&self) -> Vec<AsyncOption> {
        let mut list = self.options.clone();
        if self.shows_create() {
            list.push(AsyncOption::create_affordance(&self.query));
        }
        list
    }

    pub fn select(&mut self, option: &AsyncOption) -> Selection {
        if option.is_create() {
            let label = self.query.trim().to_string();
            if label.is_empty() || self.is_create_loading {
                return Selection::Ignored;
            }
            self.is_create_loading = true;
            return Selection::Create(label);
        }
        if option.value.is_empty() {
            return Selection::Ignored;
        }
        self.commit(option.clone());
        Selection::Commit(option.clone())
    }

    fn commit(&mut self, option: AsyncOption) {
        self.value = Some(option.value.clone());
        self.committed_label = Some((option.value, option.label));
        self.query.clear();
        self.is_open = false;
        self.is_search_loading = false;
        self.latest_request += 1;
        if !self.always_editing {
            self.is_editing = false;
        }
    }

    /// Resolution of the create handler. `Ok(None)` means the caller declined.
    pub fn finish_create(
        &mut self,
        result: Result<Option<AsyncOption>, String>,
    ) -> Option<AsyncOption> {
        self.is_create_loading = false;
        match result {
            Ok(Some(option)) => {
                self.options.retain(|existing| existing.value != option.value);
                self.options.insert(0, option.clone());
                self.commit(option.clone());
                Some(option)
            }
            Ok(None) => {
                self.is_open = false;
                self.is_editing = true;
                None
            }
            Err(message) => {
                warn!(%message, "option creation failed");
                None
            }
        }
    }

    pub fn closes_on(&self, reason: Dismissal) -> bool {
        if reason == Dismissal::ListScroll {
            return false;
        }
        let editing_committed = self.is_editing && self.value.is_some() && !self.always_editing;
        self.is_open || editing_committed
    }

    /// Returns true when something closed, in which case pending searches
    /// must be cancelled by the caller.
    pub fn dismiss(&mut self, reason: Dismissal) -> bool {
        if !self.closes_on(reason) {
            return false;
        }
        self.is_open = false;
        self.is_search_loading = false;
        self.latest_request += 1;
        if self.value.is_some() {
            if !self.always_editing {
                self.is_editing = false;
                self.query.clear();
            }
        } else {
            self.query.clear();
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuSide {
    Below,
    Above,
}

/// Fixed-position coordinates for the floating list. `offset` is the `top`
/// when below and the `bottom` (from the viewport's bottom edge) when above.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MenuPlacement {
    pub side: MenuSide,
    pub left: f64,
    pub width: f64,
    pub offset: f64,
}

impl MenuPlacement {
    pub fn css(&self) -> String {
        let edge = match self.side {
            MenuSide::Below => "top",
            MenuSide::Above => "bottom",
        };
        format!(
            "left: {}px; width: {}px; {edge}: {}px;",
            self.left, self.width, self.offset
        )
    }
}

pub fn place_menu(trigger: Rect, viewport: Viewport, menu_height: f64) -> MenuPlacement {
    let space_below = viewport.height - trigger.bottom();
    let space_above = trigger.top;
    let side = if space_below < menu_height && space_above > space_below {
        MenuSide::Above
    } else {
        MenuSide::Below
    };

    let width = trigger
        .width
        .min(viewport.width - 2.0 * VIEWPORT_MARGIN)
        .max(0.0);
    let max_left = (viewport.width - VIEWPORT_MARGIN - width).max(VIEWPORT_MARGIN);
    let left = trigger.left.clamp(VIEWPORT_MARGIN, max_left);

    let offset = match side {
        MenuSide::Below => trigger.bottom() + MENU_GAP,
        MenuSide::Above => viewport.height - trigger.top + MENU_GAP,
    };

    MenuPlacement {
        side,
        left,
        width,
        offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha() -> Vec<AsyncOption> {
        vec![AsyncOption::new("a", "Alpha")]
    }

    fn fetch_id(plan: SearchPlan) -> u64 {
        match plan {
            SearchPlan::Fetch(request) => request.id,
            SearchPlan::RestoreInitial => panic!("expected a fetch"),
        }
    }

    #[test]
    fn typing_replaces_initial_options_with_results() {
        let mut state = SelectorState::new(None, alpha());
        let plan = state.type_query("Be");
        let SearchPlan::Fetch(request) = plan else {
            panic!("expected a fetch");
        };
        assert_eq!(request.term, "Be");
        assert!(state.is_search_loading);

        let applied = state.finish_search(SearchOutcome::Loaded {
            id: request.id,
            options: vec![AsyncOption::new("b", "Beta")],
        });

        assert!(applied);
        let labels: Vec<_> = state.options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["Beta"]);
    }

    #[test]
    fn stale_responses_are_discarded() {
        let mut state = SelectorState::new(None, alpha());
        let first = fetch_id(state.type_query("A"));
        let second = fetch_id(state.type_query("AB"));

        assert!(state.finish_search(SearchOutcome::Loaded {
            id: second,
            options: vec![AsyncOption::new("ab", "AB result")],
        }));
        assert!(!state.finish_search(SearchOutcome::Loaded {
            id: first,
            options: vec![AsyncOption::new("a-late", "A result")],
        }));

        assert_eq!(state.options, vec![AsyncOption::new("ab", "AB result")]);
    }

    #[test]
    fn blank_query_restores_initial_set_and_supersedes_in_flight() {
        let mut state = SelectorState::new(None, alpha());
        let pending = fetch_id(state.type_query("Z"));
        assert_eq!(state.type_query("   "), SearchPlan::RestoreInitial);
        assert!(!state.finish_search(SearchOutcome::Loaded {
            id: pending,
            options: vec![],
        }));
        assert_eq!(state.options, alpha());
    }

    #[test]
    fn failed_search_shows_no_results() {
        let mut state = SelectorState::new(None, alpha());
        let id = fetch_id(state.type_query("x"));
        assert!(state.finish_search(SearchOutcome::Failed {
            id,
            message: "timeout".into()
        }));
        assert!(state.options.is_empty());
        assert!(!state.is_search_loading);
    }

    #[test]
    fn selecting_commits_and_returns_to_display() {
        let mut state = SelectorState::new(None, alpha());
        state.focus();
        let choice = AsyncOption::new("a", "Alpha");
        assert_eq!(state.select(&choice), Selection::Commit(choice.clone()));
        assert_eq!(state.value(), Some("a"));
        assert_eq!(state.mode(), SelectorMode::Display);
        assert!(!state.is_open);
        assert_eq!(state.input_text(), "Alpha");
    }

    #[test]
    fn display_label_never_comes_from_unrelated_search() {
        let mut state = SelectorState::new(Some("a".into()), alpha());
        state.activate();
        let id = fetch_id(state.type_query("Be"));
        state.finish_search(SearchOutcome::Loaded {
            id,
            options: vec![AsyncOption::new("b", "Beta")],
        });
        state.dismiss(Dismissal::OutsideClick);
        assert_eq!(state.mode(), SelectorMode::Display);
        assert_eq!(state.display_label().as_deref(), Some("Alpha"));
    }

    #[test]
    fn activate_resets_query_and_options() {
        let mut state = SelectorState::new(Some("a".into()), alpha());
        assert_eq!(state.mode(), SelectorMode::Display);
        state.options = vec![AsyncOption::new("z", "Zeta")];
        state.query = "ze".into();

        state.activate();

        assert_eq!(state.mode(), SelectorMode::Editing);
        assert!(state.is_open);
        assert!(state.query.is_empty());
        assert_eq!(state.options, alpha());
    }

    #[test]
    fn create_affordance_only_for_new_labels() {
        let mut state = SelectorState::new(None, alpha()).creatable(true);
        state.type_query("alpha");
        state.is_search_loading = false;
        assert!(!state.shows_create());

        state.query = "Gamma".into();
        let candidates = state.candidates();
        assert!(candidates.last().is_some_and(AsyncOption::is_create));
    }

    #[test]
    fn declined_creation_keeps_value_and_options() {
        let mut state = SelectorState::new(Some("a".into()), alpha()).creatable(true);
        state.activate();
        state.query = "Nueva".into();
        let before = state.options.clone();

        let selection = state.select(&AsyncOption::create_affordance("Nueva"));
        assert_eq!(selection, Selection::Create("Nueva".into()));
        assert!(state.is_create_loading);

        assert_eq!(state.finish_create(Ok(None)), None);
        assert_eq!(state.value(), Some("a"));
        assert_eq!(state.options, before);
        assert!(!state.is_open);
        assert_eq!(state.mode(), SelectorMode::Editing);
        assert!(!state.is_create_loading);
    }

    #[test]
    fn failed_creation_changes_nothing() {
        let mut state = SelectorState::new(None, alpha()).creatable(true);
        state.focus();
        state.query = "Nueva".into();
        state.select(&AsyncOption::create_affordance("Nueva"));
        let before_value = state.value().map(str::to_string);

        assert_eq!(state.finish_create(Err("500".into())), None);
        assert_eq!(state.value().map(str::to_string), before_value);
        assert_eq!(state.options, alpha());
    }

    #[test]
    fn successful_creation_prepends_and_commits() {
        let mut state = SelectorState::new(None, alpha()).creatable(true);
        state.focus();
        state.query = "Nueva".into();
        state.select(&AsyncOption::create_affordance("Nueva"));

        let created = AsyncOption::new("n", "Nueva");
        assert_eq!(state.finish_create(Ok(Some(created.clone()))), Some(created.clone()));
        assert_eq!(state.options.first(), Some(&created));
        assert_eq!(state.value(), Some("n"));
        assert_eq!(state.mode(), SelectorMode::Display);
    }

    #[test]
    fn synthetic_rows_are_never_selected() {
        let mut state = SelectorState::new(None, alpha());
        let synthetic = AsyncOption {
            action_id: Some("help".into()),
            ..AsyncOption::default()
        };
        assert_eq!(state.select(&synthetic), Selection::Ignored);
        assert_eq!(state.value(), None);
    }

    #[test]
    fn list_scroll_keeps_menu_open_but_page_scroll_closes() {
        let mut state = SelectorState::new(None, alpha());
        state.focus();
        assert!(!state.dismiss(Dismissal::ListScroll));
        assert!(state.is_open);
        assert!(state.dismiss(Dismissal::PageScroll));
        assert!(!state.is_open);
        assert!(!state.dismiss(Dismissal::Escape));
    }

    #[test]
    fn dismiss_invalidates_in_flight_search() {
        let mut state = SelectorState::new(None, alpha());
        let id = fetch_id(state.type_query("Be"));
        state.dismiss(Dismissal::Escape);
        assert!(!state.finish_search(SearchOutcome::Loaded {
            id,
            options: vec![AsyncOption::new("b", "Beta")],
        }));
        assert_eq!(state.options, alpha());
    }

    #[test]
    fn sync_value_returns_to_display_when_idle() {
        let mut state = SelectorState::new(None, alpha());
        state.sync_value(Some("a".into()));
        assert_eq!(state.mode(), SelectorMode::Display);
        state.sync_value(None);
        assert_eq!(state.mode(), SelectorMode::Editing);
    }

    #[test]
    fn menu_flips_above_when_space_below_is_short() {
        let viewport = Viewport {
            width: 800.0,
            height: 600.0,
        };
        let low = Rect {
            left: 100.0,
            top: 500.0,
            width: 200.0,
            height: 36.0,
        };
        let placement = place_menu(low, viewport, MENU_HEIGHT);
        assert_eq!(placement.side, MenuSide::Above);
        assert_eq!(placement.offset, 600.0 - 500.0 + MENU_GAP);

        let high = Rect { top: 50.0, ..low };
        let placement = place_menu(high, viewport, MENU_HEIGHT);
        assert_eq!(placement.side, MenuSide::Below);
        assert_eq!(placement.offset, 86.0 + MENU_GAP);
    }

    #[test]
    fn menu_is_clamped_horizontally() {
        let viewport = Viewport {
            width: 400.0,
            height: 600.0,
        };
        let trigger = Rect {
            left: 350.0,
            top: 10.0,
            width: 200.0,
            height: 30.0,
        };
        let placement = place_menu(trigger, viewport, MENU_HEIGHT);
        assert_eq!(placement.left, 400.0 - VIEWPORT_MARGIN - 200.0);

        let off_left = Rect {
            left: -40.0,
            ..trigger
        };
        assert_eq!(place_menu(off_left, viewport, MENU_HEIGHT).left, VIEWPORT_MARGIN);
    }
}
