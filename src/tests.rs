use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use rusqlite::Connection;
use serde_json::json;

use crate::app::{guard_route, visible_routes};
use crate::domain::category_groups::merge_plan;
use crate::domain::entities::finance::{
    category_label, AuditLog, Category, CategoryEntry, DraftError, EntryKind, Expense,
    ExpenseDraft, Income, NewExpense, NewIncome, User,
};
use crate::domain::entities::option::AsyncOption;
use crate::domain::entities::session::{Session, Theme};
use crate::domain::entities::table::{ColumnDescriptor, RenderKind, SortDirection, SortState};
use crate::ensure_webview_data_dir;
use crate::infra::http::search::category_options;
use crate::infra::sqlite::queries::save_session;
use crate::infra::sqlite::repo::SqliteSessionRepo;
use crate::infra::sqlite::schema::init_db;
use crate::ui::state::app_state::Route;
use crate::ui::styles::{root_container_style, table_container_style};
use crate::usecase::ports::api::{ApiError, CategoryScope, FinanceApi};
use crate::usecase::ports::repo::{RepoError, SessionRepository};
use crate::usecase::ports::search::{FnOptionSource, OptionSource};
use crate::usecase::services::category_service::{upsert_category, CategoryService};
use crate::usecase::services::error::ServiceError;
use crate::usecase::services::export_service::{suggested_file_name, TableExport};
use crate::usecase::services::ledger_service::{upsert_by_id, LedgerService};
use crate::usecase::services::session_service::SessionService;

fn unique_test_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("gastos-{prefix}-{nanos}"))
}

fn user(email: &str) -> User {
    User {
        id: "u1".into(),
        email: email.into(),
        is_active: true,
        is_superuser: false,
        first_name: Some("Ana".into()),
        last_name: None,
        phone: None,
    }
}

fn category(id: &str, name: &str, owner: Option<&str>) -> Category {
    Category {
        id: id.into(),
        name: name.into(),
        is_active: true,
        owner_id: owner.map(str::to_string),
        owner_email: owner.map(|owner| format!("{owner}@example.com")),
        expenses_count: 1,
        incomes_count: 0,
        total_items_count: 1,
    }
}

#[derive(Clone, Copy)]
enum UserReply {
    Ok,
    Unauthorized,
    ServerError,
}

/// Backend double: answers from fixed data and records what was asked.
struct FakeApi {
    token: Mutex<Option<String>>,
    reply: UserReply,
    categories: Vec<Category>,
    audit: Vec<AuditLog>,
    calls: Mutex<Vec<String>>,
}

impl FakeApi {
    fn new(reply: UserReply) -> Self {
        Self {
            token: Mutex::new(None),
            reply,
            categories: Vec::new(),
            audit: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls lock").push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn token(&self) -> Option<String> {
        self.token.lock().expect("token lock").clone()
    }
}

fn unused<T>() -> Result<T, ApiError> {
    Err(ApiError::http(501, "not used in this test"))
}

#[async_trait]
impl FinanceApi for FakeApi {
    fn set_token(&self, token: Option<String>) {
        *self.token.lock().expect("token lock") = token;
    }

    async fn login(&self, email: &str, _password: &str) -> Result<String, ApiError> {
        self.record(format!("login:{email}"));
        Ok("fresh-token".into())
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        match self.reply {
            UserReply::Ok => Ok(user("refreshed@example.com")),
            UserReply::Unauthorized => Err(ApiError::Unauthorized),
            UserReply::ServerError => Err(ApiError::http(503, "mantenimiento")),
        }
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        unused()
    }

    async fn audit_logs(&self) -> Result<Vec<AuditLog>, ApiError> {
        Ok(self.audit.clone())
    }

    async fn list_categories(&self, scope: CategoryScope) -> Result<Vec<Category>, ApiError> {
        self.record(format!("list:{scope:?}"));
        Ok(self.categories.clone())
    }

    async fn search_categories(&self, _term: &str) -> Result<serde_json::Value, ApiError> {
        unused()
    }

    async fn create_category(&self, name: &str) -> Result<Category, ApiError> {
        self.record(format!("create:{name}"));
        Ok(category("new", name, Some("u1")))
    }

    async fn update_category(
        &self,
        id: &str,
        name: &str,
        is_active: Option<bool>,
    ) -> Result<Category, ApiError> {
        self.record(format!("update:{id}:{name}:{is_active:?}"));
        let mut updated = category(id, name, Some("u1"));
        updated.is_active = false;
        Ok(updated)
    }

    async fn delete_category(&self, id: &str) -> Result<(), ApiError> {
        self.record(format!("delete:{id}"));
        Ok(())
    }

    async fn merge_categories(
        &self,
        target_id: &str,
        source_ids: &[String],
    ) -> Result<(), ApiError> {
        self.record(format!("merge:{target_id}<-{}", source_ids.join(",")));
        Ok(())
    }

    async fn category_entries(
        &self,
        _id: &str,
        _kind: EntryKind,
    ) -> Result<Vec<CategoryEntry>, ApiError> {
        unused()
    }

    async fn list_expenses(&self) -> Result<Vec<Expense>, ApiError> {
        unused()
    }

    async fn create_expense(&self, _expense: &NewExpense) -> Result<Expense, ApiError> {
        self.record("create_expense".into());
        unused()
    }

    async fn update_expense(&self, _id: &str, _expense: &NewExpense) -> Result<Expense, ApiError> {
        unused()
    }

    async fn delete_expense(&self, _id: &str) -> Result<(), ApiError> {
        unused()
    }

    async fn list_incomes(&self) -> Result<Vec<Income>, ApiError> {
        unused()
    }

    async fn create_income(&self, _income: &NewIncome) -> Result<Income, ApiError> {
        unused()
    }

    async fn update_income(&self, _id: &str, _income: &NewIncome) -> Result<Income, ApiError> {
        unused()
    }

    async fn delete_income(&self, _id: &str) -> Result<(), ApiError> {
        unused()
    }
}

fn repo_in(prefix: &str) -> (PathBuf, Arc<SqliteSessionRepo>) {
    let temp_dir = unique_test_dir(prefix);
    let repo = SqliteSessionRepo::new(temp_dir.join("gastos.sqlite"));
    repo.init().expect("should init session store");
    (temp_dir, Arc::new(repo))
}

#[test]
fn init_db_creates_required_tables() {
    let temp_dir = unique_test_dir("init-db");
    let db_path = temp_dir.join("nested").join("gastos.sqlite");

    let result = init_db(&db_path);

    assert!(result.is_ok(), "init_db should succeed: {result:?}");

    let conn = Connection::open(&db_path).expect("should open sqlite db");
    let table_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('session', 'preference')",
            [],
            |row| row.get(0),
        )
        .expect("should count tables");
    assert_eq!(table_count, 2);

    init_db(&db_path).expect("init_db should be idempotent");
    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn session_round_trips_through_sqlite() {
    let (temp_dir, repo) = repo_in("session-store");
    assert_eq!(repo.load_session().expect("should load"), None);

    let session = Session {
        token: "abc".into(),
        user: user("ana@example.com"),
    };
    repo.save_session(&session).expect("should save session");
    let replacement = Session {
        token: "def".into(),
        user: user("ana@example.com"),
    };
    repo.save_session(&replacement).expect("should overwrite session");

    assert_eq!(repo.load_session().expect("should load"), Some(replacement));

    repo.clear_session().expect("should clear");
    assert_eq!(repo.load_session().expect("should load"), None);
    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn theme_preference_defaults_to_light_and_persists() {
    let (temp_dir, repo) = repo_in("theme");
    assert_eq!(repo.load_theme().expect("should load theme"), Theme::Light);

    repo.save_theme(Theme::Dark).expect("should save theme");
    assert_eq!(repo.load_theme().expect("should load theme"), Theme::Dark);
    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn unreadable_stored_user_is_reported_as_corrupt() {
    let (temp_dir, repo) = repo_in("corrupt");
    save_session(&repo.db_path, "abc", "{not json").expect("should write raw row");

    let result = repo.load_session();

    assert!(matches!(result, Err(RepoError::Corrupt(_))), "got {result:?}");
    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[tokio::test]
async fn login_persists_session_and_sets_token() {
    let (temp_dir, repo) = repo_in("login");
    let api = Arc::new(FakeApi::new(UserReply::Ok));
    let service = SessionService::new(api.clone(), repo.clone());

    let session = service
        .login("  ana@example.com ", "secreto")
        .await
        .expect("login should succeed");

    assert_eq!(session.token, "fresh-token");
    assert_eq!(api.token().as_deref(), Some("fresh-token"));
    assert_eq!(api.calls(), vec!["login:ana@example.com".to_string()]);
    assert_eq!(repo.load_session().expect("should load"), Some(session));
    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[tokio::test]
async fn login_without_profile_drops_token() {
    let (temp_dir, repo) = repo_in("login-no-profile");
    let api = Arc::new(FakeApi::new(UserReply::ServerError));
    let service = SessionService::new(api.clone(), repo.clone());

    let result = service.login("ana@example.com", "secreto").await;

    assert!(result.is_err());
    assert_eq!(api.token(), None);
    assert_eq!(repo.load_session().expect("should load"), None);
    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[tokio::test]
async fn restore_refreshes_user_from_backend() {
    let (temp_dir, repo) = repo_in("restore-ok");
    repo.save_session(&Session {
        token: "stored".into(),
        user: user("old@example.com"),
    })
    .expect("should seed session");
    let api = Arc::new(FakeApi::new(UserReply::Ok));
    let service = SessionService::new(api.clone(), repo.clone());

    let restored = service
        .restore()
        .await
        .expect("restore should succeed")
        .expect("session should be restored");

    assert_eq!(restored.user.email, "refreshed@example.com");
    assert_eq!(api.token().as_deref(), Some("stored"));
    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[tokio::test]
async fn restore_with_rejected_token_clears_store() {
    let (temp_dir, repo) = repo_in("restore-expired");
    repo.save_session(&Session {
        token: "stale".into(),
        user: user("ana@example.com"),
    })
    .expect("should seed session");
    let api = Arc::new(FakeApi::new(UserReply::Unauthorized));
    let service = SessionService::new(api.clone(), repo.clone());

    let restored = service.restore().await.expect("restore should not fail");

    assert_eq!(restored, None);
    assert_eq!(api.token(), None);
    assert_eq!(repo.load_session().expect("should load"), None);
    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[tokio::test]
async fn restore_keeps_stored_session_when_backend_is_down() {
    let (temp_dir, repo) = repo_in("restore-offline");
    let stored = Session {
        token: "stored".into(),
        user: user("ana@example.com"),
    };
    repo.save_session(&stored).expect("should seed session");
    let service = SessionService::new(Arc::new(FakeApi::new(UserReply::ServerError)), repo.clone());

    let restored = service.restore().await.expect("restore should not fail");

    assert_eq!(restored, Some(stored.clone()));
    assert_eq!(repo.load_session().expect("should load"), Some(stored));
    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[tokio::test]
async fn restore_discards_corrupt_session() {
    let (temp_dir, repo) = repo_in("restore-corrupt");
    save_session(&repo.db_path, "abc", "[]").expect("should write raw row");
    let service = SessionService::new(Arc::new(FakeApi::new(UserReply::Ok)), repo.clone());

    let restored = service.restore().await.expect("restore should not fail");

    assert_eq!(restored, None);
    assert_eq!(repo.load_session().expect("should load"), None);
    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[tokio::test]
async fn category_list_is_sorted_by_name() {
    let api = Arc::new(FakeApi::new(UserReply::Ok).with_categories(vec![
        category("1", "Transporte", None),
        category("2", "comida", None),
        category("3", "Ahorro", Some("u1")),
    ]));
    let service = CategoryService::new(api.clone());

    let listed = service.for_selector().await.expect("should list");

    let names: Vec<&str> = listed.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Ahorro", "comida", "Transporte"]);
    assert_eq!(api.calls(), vec!["list:All".to_string()]);
}

#[tokio::test]
async fn blank_category_names_never_reach_the_backend() {
    let api = Arc::new(FakeApi::new(UserReply::Ok));
    let service = CategoryService::new(api.clone());

    let created = service.create_private("   ").await;
    let renamed = service.rename("c1", "").await;

    assert!(matches!(created, Err(ServiceError::Invalid(DraftError::BlankCategoryName))));
    assert!(matches!(renamed, Err(ServiceError::Invalid(DraftError::BlankCategoryName))));
    assert!(api.calls().is_empty());

    let created = service.create_private("  Mascotas ").await.expect("should create");
    assert_eq!(created.name, "Mascotas");
    assert_eq!(api.calls(), vec!["create:Mascotas".to_string()]);
}

#[tokio::test]
async fn reactivation_marks_category_active() {
    let api = Arc::new(FakeApi::new(UserReply::Ok));
    let service = CategoryService::new(api.clone());
    let mut inactive = category("c7", "Viajes", Some("u1"));
    inactive.is_active = false;

    let updated = service.reactivate(&inactive).await.expect("should reactivate");

    assert!(updated.is_active);
    assert_eq!(api.calls(), vec!["update:c7:Viajes:Some(true)".to_string()]);
}

#[tokio::test]
async fn admin_groups_merge_private_copies_into_global() {
    let api = Arc::new(FakeApi::new(UserReply::Ok).with_categories(vec![
        category("g1", "Comida", None),
        category("p1", "comida ", Some("u1")),
        category("p2", "COMIDA", Some("u2")),
        category("p3", "Renta", Some("u1")),
    ]));
    let service = CategoryService::new(api.clone());

    let groups = service.admin_groups().await.expect("should group");
    let food = groups
        .iter()
        .find(|group| group.key == "comida")
        .expect("comida group should exist");
    let plan = merge_plan(food).expect("group with global should be mergeable");
    service.merge(&plan).await.expect("should merge");

    assert_eq!(groups.len(), 2);
    assert_eq!(
        api.calls(),
        vec!["list:Admin".to_string(), "merge:g1<-p1,p2".to_string()]
    );
}

#[test]
fn upsert_category_replaces_and_keeps_order() {
    let mut list = vec![category("1", "Comida", None), category("2", "Renta", None)];

    upsert_category(&mut list, category("3", "Luz", None));
    let mut renamed = category("1", "Super", None);
    renamed.is_active = false;
    upsert_category(&mut list, renamed);

    let names: Vec<&str> = list.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Luz", "Renta", "Super"]);
    assert!(!list[2].is_active);
}

#[tokio::test]
async fn invalid_expense_draft_is_rejected_locally() {
    let api = Arc::new(FakeApi::new(UserReply::Ok));
    let service = LedgerService::new(api.clone());
    let draft = ExpenseDraft::new("2024-03-01");

    let result = service.save_expense(None, &draft).await;

    assert!(matches!(result, Err(ServiceError::Invalid(_))), "got {result:?}");
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn audit_logs_come_back_newest_first() {
    let log = |id: &str, timestamp: &str| AuditLog {
        id: id.into(),
        action: "LOGIN".into(),
        source: "web".into(),
        details: None,
        timestamp: timestamp.into(),
        user_email: None,
        user_name: None,
        user_phone: None,
    };
    let mut api = FakeApi::new(UserReply::Ok);
    api.audit = vec![
        log("a", "2024-01-01T08:00:00"),
        log("b", "2024-03-01T08:00:00"),
        log("c", "2024-02-01T08:00:00"),
    ];
    let service = LedgerService::new(Arc::new(api));

    let logs = service.audit_logs().await.expect("should list");

    let ids: Vec<&str> = logs.iter().map(|log| log.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "c", "a"]);
    assert_eq!(logs[0].user_label(), "Sistema");
}

#[test]
fn upsert_by_id_replaces_in_place_or_prepends() {
    let mut list = vec![("a", 1), ("b", 2)];

    upsert_by_id(&mut list, ("b", 20), |entry| entry.0);
    upsert_by_id(&mut list, ("c", 3), |entry| entry.0);

    assert_eq!(list, vec![("c", 3), ("a", 1), ("b", 20)]);
}

#[tokio::test]
async fn table_export_writes_every_row_in_sort_order() {
    let temp_dir = unique_test_dir("export");
    let records = vec![
        category("1", "Renta", None),
        category("2", "Comida", None),
        category("3", "Luz", None),
    ];
    let columns = vec![
        ColumnDescriptor::new("Nombre").key("name"),
        ColumnDescriptor::new("Activa")
            .key("is_active")
            .kind(RenderKind::Boolean),
        ColumnDescriptor::new("Acciones"),
    ];
    let sort = SortState {
        key: Some("name"),
        direction: SortDirection::Desc,
    };

    let export = TableExport::capture(&records, &columns, &sort);
    assert_eq!(export.headers, vec!["Nombre".to_string(), "Activa".to_string()]);

    let path = temp_dir.join(suggested_file_name("categorias", "2024-05-01"));
    let written = export.write_to(path.clone()).await.expect("should write csv");

    assert_eq!(written, path);
    let content = fs::read_to_string(&written).expect("should read csv");
    assert_eq!(content, "Nombre,Activa\nRenta,Sí\nLuz,Sí\nComida,Sí\n");
    assert!(written.ends_with("categorias-2024-05-01.csv"));
    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[tokio::test]
async fn closure_option_source_receives_the_term() {
    let source = FnOptionSource(|term: String| async move {
        Ok::<_, ApiError>(vec![AsyncOption::new(term.clone(), term.to_uppercase())])
    });

    let options = source.search("luz").await.expect("should search");

    assert_eq!(options, vec![AsyncOption::new("luz", "LUZ")]);
}

#[test]
fn category_search_results_use_category_labels() {
    let data = json!([
        {"id": "c1", "name": "Comida", "is_active": true, "user_id": "u1"},
        {"id": "c2", "name": "Viajes", "is_active": false}
    ]);

    let options = category_options(&data);

    assert_eq!(options.len(), 2);
    assert_eq!(options[1].label, "Viajes (Inactiva)");
    let raw: Category = serde_json::from_value(options[0].raw.clone().expect("raw payload"))
        .expect("raw should decode as category");
    assert_eq!(raw.owner_id.as_deref(), Some("u1"));

    let fallback = category_options(&json!([{"id": 7, "name": "Otro"}]));
    assert_eq!(fallback, vec![AsyncOption::new("7", "Otro").with_raw(json!({"id": 7, "name": "Otro"}))]);
}

#[test]
fn category_label_falls_back_for_unknown_ids() {
    let mut inactive = category("c2", "Viajes", None);
    inactive.is_active = false;
    let categories = vec![category("c1", "Comida", None), inactive];

    assert_eq!(category_label(&categories, "c1"), "Comida");
    assert_eq!(category_label(&categories, "c2"), "Viajes (Inactiva)");
    assert_eq!(category_label(&categories, "zz"), "Sin categoría");
}

#[test]
fn table_container_style_allows_scroll() {
    let style = table_container_style();
    assert!(style.contains("overflow: auto"));
    assert!(style.contains("flex: 1"));
    assert!(style.contains("min-height: 0"));
}

#[test]
fn root_container_style_uses_viewport_height_and_theme_variables() {
    let light = root_container_style(Theme::Light);
    let dark = root_container_style(Theme::Dark);

    assert!(light.contains("height: 100vh"));
    assert!(light.contains("flex-direction: column"));
    assert!(light.contains("--bg: #f6f7f9"));
    assert!(dark.contains("--bg: #16181d"));
}

#[test]
fn admin_routes_are_hidden_from_regular_users() {
    let regular = visible_routes(false);
    assert!(!regular.contains(&Route::AuditLog));
    assert!(!regular.contains(&Route::Users));
    assert!(regular.contains(&Route::CategoryAdmin));
    assert_eq!(visible_routes(true).len(), Route::ALL.len());

    assert_eq!(guard_route(Route::Users, false), Route::Expenses);
    assert_eq!(guard_route(Route::Users, true), Route::Users);
    assert_eq!(guard_route(Route::Incomes, false), Route::Incomes);
}

#[test]
fn ensure_webview_data_dir_creates_webview2_subdir() {
    let temp_dir = unique_test_dir("webview-data-dir");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");

    let webview_dir =
        ensure_webview_data_dir(&temp_dir).expect("webview data dir should be created");

    assert_eq!(webview_dir, temp_dir.join("webview2"));
    assert!(webview_dir.is_dir(), "webview2 directory should exist");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}
