use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use time::OffsetDateTime;
use tower::ServiceExt;

use horas::{
    app,
    auth::dto::JwtKeys,
    bootstrap,
    config::AppConfig,
    dates::trailing_months,
    entries::services::month_export_rows,
    export::XLSX_MIME,
    state::AppState,
};

const ADMIN_PASSWORD: &str = "admin-pass";

struct TestApp {
    _dir: TempDir,
    state: AppState,
    app: Router,
}

async fn setup() -> TestApp {
    setup_with_admin("admin").await
}

async fn setup_with_admin(username: &str) -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = AppConfig::with_data_dir(dir.path());
    config.admin.username = username.into();
    config.admin.password = ADMIN_PASSWORD.into();

    let state = AppState::init(config).await.expect("state init");
    bootstrap::reconcile_admin(&state.db, &state.config.admin)
        .await
        .expect("admin reconcile");
    let app = app::build_app(state.clone());
    TestApp {
        _dir: dir,
        state,
        app,
    }
}

struct Reply {
    status: StatusCode,
    content_type: Option<String>,
    body: Vec<u8>,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("json body")
    }

    /// Asserts the status and the `{"detail": "..."}` error body.
    fn assert_detail(&self, status: StatusCode) -> String {
        assert_eq!(self.status, status);
        assert_eq!(self.content_type.as_deref(), Some("application/json"));
        let detail = self.json()["detail"].as_str().expect("detail string").to_string();
        assert!(!detail.is_empty());
        detail
    }
}

impl TestApp {
    async fn send(&self, req: Request<Body>) -> Reply {
        let res = self.app.clone().oneshot(req).await.expect("router call");
        let status = res.status();
        let content_type = res
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = to_bytes(res.into_body(), usize::MAX).await.expect("body").to_vec();
        Reply {
            status,
            content_type,
            body,
        }
    }

    async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Reply {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
        }
        let req = match body {
            Some(v) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(v.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");
        self.send(req).await
    }

    async fn try_login(&self, username: &str, password: &str) -> Reply {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/token")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("username={username}&password={password}")))
            .expect("request");
        self.send(req).await
    }

    async fn login(&self, username: &str, password: &str) -> String {
        let reply = self.try_login(username, password).await;
        assert_eq!(reply.status, StatusCode::OK, "login {username}");
        let body = reply.json();
        assert_eq!(body["token_type"], "bearer");
        body["access_token"].as_str().expect("token").to_string()
    }

    async fn admin_token(&self) -> String {
        self.login("admin", ADMIN_PASSWORD).await
    }

    async fn create_user(&self, admin: &str, username: &str, password: &str) -> Value {
        let reply = self
            .call(
                Method::POST,
                "/users/",
                Some(admin),
                Some(json!({ "username": username, "password": password, "full_name": format!("Usuario {username}") })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "create {username}");
        reply.json()
    }

    async fn add_entry(&self, token: &str, date: &str, shift: &str, task: &str, amount: f64) -> Value {
        let reply = self
            .call(
                Method::POST,
                "/entries/",
                Some(token),
                Some(json!({ "date": date, "shift": shift, "task": task, "amount": amount })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "add entry {date}");
        reply.json()
    }

    async fn list(&self, token: &str, uri: &str) -> Vec<Value> {
        let reply = self.call(Method::GET, uri, Some(token), None).await;
        assert_eq!(reply.status, StatusCode::OK);
        reply.json().as_array().expect("array").clone()
    }
}

#[tokio::test]
async fn demo_user_entry_lifecycle() {
    let t = setup().await;
    let admin = t.admin_token().await;
    t.create_user(&admin, "demo1", "demo123").await;

    let token = t.login("demo1", "demo123").await;
    let created = t.add_entry(&token, "2024-03-05", "Mañana", "Sacos", 7.5).await;
    assert!(created["id"].as_i64().is_some());
    assert!(created["created_at"].as_str().is_some());

    let listed = t.list(&token, "/entries/").await;
    assert_eq!(listed.len(), 1);
    let e = &listed[0];
    assert_eq!(e["id"], created["id"]);
    assert_eq!(e["date"], "2024-03-05");
    assert_eq!(e["shift"], "Mañana");
    assert_eq!(e["task"], "Sacos");
    assert_eq!(e["amount"], 7.5);

    let id = created["id"].as_i64().unwrap();
    let del = t
        .call(Method::DELETE, &format!("/entries/{id}"), Some(&token), None)
        .await;
    assert_eq!(del.status, StatusCode::OK);
    assert_eq!(del.json()["ok"], true);
    assert!(t.list(&token, "/entries/").await.is_empty());
}

#[tokio::test]
async fn duplicate_username_conflicts_without_new_row() {
    let t = setup().await;
    let admin = t.admin_token().await;
    t.create_user(&admin, "demo1", "demo123").await;

    let again = t
        .call(
            Method::POST,
            "/users/",
            Some(&admin),
            Some(json!({ "username": " demo1 ", "password": "other-pass" })),
        )
        .await;
    assert_eq!(again.status, StatusCode::CONFLICT);
    assert_eq!(again.json()["detail"], "Username already registered");

    let users = t.list(&admin, "/admin/users").await;
    let demo_rows = users.iter().filter(|u| u["username"] == "demo1").count();
    assert_eq!(demo_rows, 1);
    // original password still works
    t.login("demo1", "demo123").await;
}

#[tokio::test]
async fn tokens_never_cross_users() {
    let t = setup().await;
    let admin = t.admin_token().await;
    t.create_user(&admin, "alice", "alice-pw").await;
    t.create_user(&admin, "bob", "bob-pw").await;
    let alice = t.login("alice", "alice-pw").await;
    let bob = t.login("bob", "bob-pw").await;

    let bobs = t.add_entry(&bob, "2024-05-02", "Noche", "Filtros", 8.0).await;
    let bob_id = bobs["id"].as_i64().unwrap();

    assert!(t.list(&alice, "/entries/").await.is_empty());

    let del = t
        .call(Method::DELETE, &format!("/entries/{bob_id}"), Some(&alice), None)
        .await;
    assert_eq!(del.status, StatusCode::NOT_FOUND);
    assert_eq!(t.list(&bob, "/entries/").await.len(), 1);
}

#[tokio::test]
async fn authentication_failures_are_401() {
    let t = setup().await;

    let bad_login = t.try_login("admin", "wrong").await;
    assert_eq!(bad_login.status, StatusCode::UNAUTHORIZED);
    let unknown = t.try_login("ghost", "whatever").await;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);

    let no_token = t.call(Method::GET, "/users/me", None, None).await;
    assert_eq!(no_token.status, StatusCode::UNAUTHORIZED);

    let garbage = t.call(Method::GET, "/users/me", Some("not.a.jwt"), None).await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);

    let admin = t.admin_token().await;
    let me = t.call(Method::GET, "/users/me", Some(&admin), None).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.json()["role"], "admin");
}

#[tokio::test]
async fn deleted_users_tokens_stop_working_and_entries_cascade() {
    let t = setup().await;
    let admin = t.admin_token().await;
    let user = t.create_user(&admin, "temp", "temp-pw").await;
    let token = t.login("temp", "temp-pw").await;
    t.add_entry(&token, "2024-01-10", "Tarde", "Otros", 4.0).await;

    let summary = t.call(Method::GET, "/admin/summary", Some(&admin), None).await.json();
    assert_eq!(summary["total_entries"], 1);

    let id = user["id"].as_i64().unwrap();
    let del = t
        .call(Method::DELETE, &format!("/admin/users/{id}"), Some(&admin), None)
        .await;
    assert_eq!(del.status, StatusCode::OK);

    let summary = t.call(Method::GET, "/admin/summary", Some(&admin), None).await.json();
    assert_eq!(summary["total_entries"], 0);

    let me = t.call(Method::GET, "/users/me", Some(&token), None).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn primary_admin_is_protected() {
    let t = setup().await;
    let admin = t.admin_token().await;
    let admin_id = t.call(Method::GET, "/users/me", Some(&admin), None).await.json()["id"]
        .as_i64()
        .unwrap();

    let del = t
        .call(Method::DELETE, &format!("/admin/users/{admin_id}"), Some(&admin), None)
        .await;
    assert_eq!(del.status, StatusCode::FORBIDDEN);

    // a second admin cannot remove it either
    t.call(
        Method::POST,
        "/users/",
        Some(&admin),
        Some(json!({ "username": "second", "password": "second-pw", "role": "admin" })),
    )
    .await;
    let second = t.login("second", "second-pw").await;
    let del = t
        .call(Method::DELETE, &format!("/admin/users/{admin_id}"), Some(&second), None)
        .await;
    assert_eq!(del.status, StatusCode::FORBIDDEN);

    let demote = t
        .call(
            Method::PATCH,
            &format!("/admin/users/{admin_id}"),
            Some(&second),
            Some(json!({ "role": "user" })),
        )
        .await;
    assert_eq!(demote.status, StatusCode::FORBIDDEN);

    let missing = t.call(Method::DELETE, "/admin/users/9999", Some(&admin), None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_routes_require_admin_role() {
    let t = setup().await;
    let admin = t.admin_token().await;
    t.create_user(&admin, "worker", "worker-pw").await;
    let worker = t.login("worker", "worker-pw").await;

    for uri in ["/admin/users", "/admin/rates", "/admin/summary", "/admin/export"] {
        let r = t.call(Method::GET, uri, Some(&worker), None).await;
        assert_eq!(r.status, StatusCode::FORBIDDEN, "{uri}");
        let r = t.call(Method::GET, uri, None, None).await;
        assert_eq!(r.status, StatusCode::UNAUTHORIZED, "{uri}");
    }

    let create = t
        .call(
            Method::POST,
            "/users/",
            Some(&worker),
            Some(json!({ "username": "sneaky", "password": "sneaky-pw" })),
        )
        .await;
    assert_eq!(create.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn role_update_promotes_user() {
    let t = setup().await;
    let admin = t.admin_token().await;
    let user = t.create_user(&admin, "lead", "lead-pw").await;
    let id = user["id"].as_i64().unwrap();

    let r = t
        .call(
            Method::PATCH,
            &format!("/admin/users/{id}"),
            Some(&admin),
            Some(json!({ "role": "admin" })),
        )
        .await;
    assert_eq!(r.status, StatusCode::OK);
    assert_eq!(r.json()["role"], "admin");

    let lead = t.login("lead", "lead-pw").await;
    let r = t.call(Method::GET, "/admin/summary", Some(&lead), None).await;
    assert_eq!(r.status, StatusCode::OK);
}

#[tokio::test]
async fn entry_validation_is_enforced() {
    let t = setup().await;
    let admin = t.admin_token().await;

    let negative = t
        .call(
            Method::POST,
            "/entries/",
            Some(&admin),
            Some(json!({ "date": "2024-03-05", "shift": "Mañana", "task": "Sacos", "amount": -1.0 })),
        )
        .await;
    negative.assert_detail(StatusCode::UNPROCESSABLE_ENTITY);

    let bad_shift = t
        .call(
            Method::POST,
            "/entries/",
            Some(&admin),
            Some(json!({ "date": "2024-03-05", "shift": "Siesta", "task": "Sacos", "amount": 1.0 })),
        )
        .await;
    let detail = bad_shift.assert_detail(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(detail.contains("Siesta"));

    let bad_date = t
        .call(
            Method::POST,
            "/entries/",
            Some(&admin),
            Some(json!({ "date": "05/03/2024", "shift": "Tarde", "task": "Sacos", "amount": 1.0 })),
        )
        .await;
    bad_date.assert_detail(StatusCode::UNPROCESSABLE_ENTITY);

    let missing_field = t
        .call(
            Method::POST,
            "/entries/",
            Some(&admin),
            Some(json!({ "date": "2024-03-05", "shift": "Tarde", "task": "Sacos" })),
        )
        .await;
    missing_field.assert_detail(StatusCode::UNPROCESSABLE_ENTITY);

    let blank_task = t
        .call(
            Method::POST,
            "/entries/",
            Some(&admin),
            Some(json!({ "date": "2024-03-05", "shift": "Tarde", "task": "  ", "amount": 1.0 })),
        )
        .await;
    blank_task.assert_detail(StatusCode::UNPROCESSABLE_ENTITY);

    let english_shift = t.add_entry(&admin, "2024-03-05", "night", "Sacos", 0.0).await;
    assert_eq!(english_shift["shift"], "Noche");
}

#[tokio::test]
async fn month_filter_lists_only_that_month_newest_first() {
    let t = setup().await;
    let admin = t.admin_token().await;
    t.create_user(&admin, "demo1", "demo123").await;
    let token = t.login("demo1", "demo123").await;

    t.add_entry(&token, "2024-02-29", "Tarde", "Filtros", 3.0).await;
    t.add_entry(&token, "2024-03-01", "Mañana", "Sacos", 7.5).await;
    t.add_entry(&token, "2024-03-31", "Noche", "Quemadores", 6.0).await;
    t.add_entry(&token, "2024-03-15", "Mañana", "Otros", 2.0).await;
    t.add_entry(&token, "2024-04-01", "Mañana", "Sacos", 1.0).await;

    let march = t.list(&token, "/entries/?year=2024&month=3").await;
    let dates: Vec<&str> = march.iter().map(|e| e["date"].as_str().unwrap()).collect();
    assert_eq!(dates, vec!["2024-03-31", "2024-03-15", "2024-03-01"]);

    let paged = t.list(&token, "/entries/?year=2024&month=3&skip=1&limit=1").await;
    assert_eq!(paged.len(), 1);
    assert_eq!(paged[0]["date"], "2024-03-15");

    let half = t.call(Method::GET, "/entries/?year=2024", Some(&token), None).await;
    half.assert_detail(StatusCode::UNPROCESSABLE_ENTITY);
    let bad_month = t
        .call(Method::GET, "/entries/?year=2024&month=13", Some(&token), None)
        .await;
    bad_month.assert_detail(StatusCode::UNPROCESSABLE_ENTITY);
    let not_a_number = t
        .call(Method::GET, "/entries/?year=2024&month=abc", Some(&token), None)
        .await;
    not_a_number.assert_detail(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn month_export_contains_exactly_that_months_entries() {
    let t = setup().await;
    let admin = t.admin_token().await;
    t.create_user(&admin, "alice", "alice-pw").await;
    t.create_user(&admin, "bob", "bob-pw").await;
    let alice = t.login("alice", "alice-pw").await;
    let bob = t.login("bob", "bob-pw").await;

    let a1 = t.add_entry(&alice, "2024-03-01", "Mañana", "Sacos", 7.5).await;
    let a2 = t.add_entry(&alice, "2024-03-31", "Tarde", "Filtros", 4.25).await;
    t.add_entry(&alice, "2024-04-01", "Noche", "Otros", 8.0).await;
    t.add_entry(&bob, "2024-03-10", "Noche", "Sacos", 5.0).await;

    let reply = t
        .call(Method::GET, "/export/month?year=2024&month=3", Some(&alice), None)
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.content_type.as_deref(), Some(XLSX_MIME));
    assert_eq!(&reply.body[..2], b"PK");

    let me = t.call(Method::GET, "/users/me", Some(&alice), None).await.json();
    let rows = month_export_rows(&t.state.db, me["id"].as_i64().unwrap(), 2024, 3)
        .await
        .unwrap();
    let mut ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![a1["id"].as_i64().unwrap(), a2["id"].as_i64().unwrap()]);
}

#[tokio::test]
async fn monthly_stats_cover_six_months_with_rates() {
    let t = setup().await;
    let admin = t.admin_token().await;
    t.create_user(&admin, "demo1", "demo123").await;
    let token = t.login("demo1", "demo123").await;

    let today = OffsetDateTime::now_utc().date();
    let months = trailing_months(today, 6);
    let (cur_year, cur_month) = months[5];
    let (prev_year, prev_month) = months[4];

    let rate = t
        .call(
            Method::POST,
            "/admin/rates",
            Some(&admin),
            Some(json!({ "year": cur_year, "rate": 2.5 })),
        )
        .await;
    assert_eq!(rate.status, StatusCode::OK);

    let cur = format!("{cur_year:04}-{:02}-01", u8::from(cur_month));
    let prev = format!("{prev_year:04}-{:02}-15", u8::from(prev_month));
    t.add_entry(&token, &cur, "Mañana", "Sacos", 7.5).await;
    t.add_entry(&token, &cur, "Tarde", "Sacos", 0.5).await;
    t.add_entry(&token, &prev, "Noche", "Filtros", 6.0).await;

    let stats = t.list(&token, "/entries/stats/monthly").await;
    assert_eq!(stats.len(), 6);

    let ym: Vec<(i64, i64)> = stats
        .iter()
        .map(|s| (s["year"].as_i64().unwrap(), s["month"].as_i64().unwrap()))
        .collect();
    let expected: Vec<(i64, i64)> = months
        .iter()
        .map(|(y, m)| (*y as i64, u8::from(*m) as i64))
        .collect();
    assert_eq!(ym, expected);

    for s in &stats {
        let hours = s["hours"].as_f64().unwrap();
        let rate = s["rate"].as_f64().unwrap();
        assert_eq!(s["euros"].as_f64().unwrap(), hours * rate);
        if s["year"].as_i64().unwrap() != cur_year as i64 {
            assert_eq!(rate, 0.0);
        }
    }

    let last = &stats[5];
    assert_eq!(last["hours"].as_f64().unwrap(), 8.0);
    assert_eq!(last["rate"].as_f64().unwrap(), 2.5);
    assert_eq!(last["euros"].as_f64().unwrap(), 20.0);
    assert_eq!(stats[4]["hours"].as_f64().unwrap(), 6.0);
    assert_eq!(
        last["label"],
        t.state.locale.month_label(cur_month)
    );
}

#[tokio::test]
async fn rates_upsert_by_year_and_list_descending() {
    let t = setup().await;
    let admin = t.admin_token().await;

    for (year, rate) in [(2023, 1.5), (2025, 3.0), (2024, 2.0), (2024, 2.25)] {
        let r = t
            .call(
                Method::POST,
                "/admin/rates",
                Some(&admin),
                Some(json!({ "year": year, "rate": rate })),
            )
            .await;
        assert_eq!(r.status, StatusCode::OK);
    }

    let rates = t.list(&admin, "/admin/rates").await;
    let pairs: Vec<(i64, f64)> = rates
        .iter()
        .map(|r| (r["year"].as_i64().unwrap(), r["rate"].as_f64().unwrap()))
        .collect();
    assert_eq!(pairs, vec![(2025, 3.0), (2024, 2.25), (2023, 1.5)]);

    let bad = t
        .call(
            Method::POST,
            "/admin/rates",
            Some(&admin),
            Some(json!({ "year": 2024, "rate": -2.0 })),
        )
        .await;
    assert_eq!(bad.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn summary_and_full_export() {
    let t = setup().await;
    let admin = t.admin_token().await;
    t.create_user(&admin, "demo1", "demo123").await;
    let token = t.login("demo1", "demo123").await;

    for day in 1..=7 {
        t.add_entry(&token, &format!("2024-03-{day:02}"), "Mañana", "Sacos", 1.0)
            .await;
    }

    let summary = t.call(Method::GET, "/admin/summary", Some(&admin), None).await;
    assert_eq!(summary.status, StatusCode::OK);
    let summary = summary.json();
    assert_eq!(summary["total_users"], 2);
    assert_eq!(summary["total_entries"], 7);
    let recent = summary["recent_activity"].as_array().unwrap();
    assert_eq!(recent.len(), 5);
    assert_eq!(recent[0]["worker"], "Usuario demo1");
    assert_eq!(recent[0]["date"], "2024-03-07");

    let export = t.call(Method::GET, "/admin/export", Some(&admin), None).await;
    assert_eq!(export.status, StatusCode::OK);
    assert_eq!(export.content_type.as_deref(), Some(XLSX_MIME));
    assert_eq!(&export.body[..2], b"PK");
}

#[tokio::test]
async fn password_change_requires_current_password() {
    let t = setup().await;
    let admin = t.admin_token().await;
    t.create_user(&admin, "demo1", "demo123").await;
    let token = t.login("demo1", "demo123").await;

    let wrong = t
        .call(
            Method::PUT,
            "/users/me/password",
            Some(&token),
            Some(json!({ "old_password": "nope", "new_password": "fresh-pass" })),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::BAD_REQUEST);

    let short = t
        .call(
            Method::PUT,
            "/users/me/password",
            Some(&token),
            Some(json!({ "old_password": "demo123", "new_password": "abc" })),
        )
        .await;
    assert_eq!(short.status, StatusCode::UNPROCESSABLE_ENTITY);

    let ok = t
        .call(
            Method::PUT,
            "/users/me/password",
            Some(&token),
            Some(json!({ "old_password": "demo123", "new_password": "fresh-pass" })),
        )
        .await;
    assert_eq!(ok.status, StatusCode::OK);

    assert_eq!(t.try_login("demo1", "demo123").await.status, StatusCode::UNAUTHORIZED);
    t.login("demo1", "fresh-pass").await;
}

#[tokio::test]
async fn admin_can_delete_any_entry() {
    let t = setup().await;
    let admin = t.admin_token().await;
    t.create_user(&admin, "demo1", "demo123").await;
    let token = t.login("demo1", "demo123").await;
    let e = t.add_entry(&token, "2024-03-05", "Mañana", "Sacos", 7.5).await;
    let id = e["id"].as_i64().unwrap();

    let r = t
        .call(Method::DELETE, &format!("/admin/entries/{id}"), Some(&admin), None)
        .await;
    assert_eq!(r.status, StatusCode::OK);
    assert!(t.list(&token, "/entries/").await.is_empty());

    let again = t
        .call(Method::DELETE, &format!("/admin/entries/{id}"), Some(&admin), None)
        .await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn root_and_health() {
    let t = setup().await;
    let root = t.call(Method::GET, "/", None, None).await;
    assert_eq!(root.status, StatusCode::OK);
    assert_eq!(root.json()["status"], "running");

    let health = t.call(Method::GET, "/health", None, None).await;
    assert_eq!(health.body, b"ok");
}

#[tokio::test]
async fn malformed_input_gets_json_detail() {
    let t = setup().await;
    let admin = t.admin_token().await;

    let month_abc = t
        .call(Method::GET, "/export/month?year=2024&month=abc", Some(&admin), None)
        .await;
    month_abc.assert_detail(StatusCode::UNPROCESSABLE_ENTITY);

    let no_query = t.call(Method::GET, "/export/month", Some(&admin), None).await;
    no_query.assert_detail(StatusCode::UNPROCESSABLE_ENTITY);

    let bad_id = t.call(Method::DELETE, "/entries/abc", Some(&admin), None).await;
    bad_id.assert_detail(StatusCode::UNPROCESSABLE_ENTITY);

    let bad_role = t
        .call(Method::PATCH, "/admin/users/1", Some(&admin), Some(json!({ "role": "boss" })))
        .await;
    bad_role.assert_detail(StatusCode::UNPROCESSABLE_ENTITY);

    let req = Request::builder()
        .method(Method::POST)
        .uri("/token")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("username=admin"))
        .expect("request");
    t.send(req).await.assert_detail(StatusCode::UNPROCESSABLE_ENTITY);

    let req = Request::builder()
        .method(Method::POST)
        .uri("/entries/")
        .header(header::AUTHORIZATION, format!("Bearer {admin}"))
        .body(Body::from(r#"{"date":"2024-03-05","shift":"Tarde","task":"Sacos","amount":1.0}"#))
        .expect("request");
    t.send(req).await.assert_detail(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn export_filename_survives_unusual_admin_names() {
    let t = setup_with_admin("jefa\"ñ").await;
    let token = JwtKeys::from(&t.state.config.jwt)
        .sign("jefa\"ñ")
        .expect("sign");
    t.add_entry(&token, "2024-03-05", "Mañana", "Sacos", 7.5).await;

    let req = Request::builder()
        .uri("/export/month?year=2024&month=3")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request");
    let res = t.app.clone().oneshot(req).await.expect("router call");
    assert_eq!(res.status(), StatusCode::OK);
    let disposition = res
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .expect("ascii content disposition");
    assert_eq!(disposition, "attachment; filename=\"horas_jefa___2024_03.xlsx\"");
}
