//! API integration tests, driving the router in-process against a fake symws

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use symws_bridge::{
    api::create_router,
    config::{
        AppConfig, BehaviorsConfig, LoggingConfig, RedisConfig, ServerConfig, SessionConfig,
        SymwsConfig,
    },
    error::{AppError, AppResult},
    models::{
        patron::{AccountInfoOptions, HoldOptions, LoginUserResponse, MyAccountInfo, PatronInfo, RenewMyCheckoutResponse},
        CallGroup, ItemRecord, PolicyCode, PolicyGroup, TitleRecord,
    },
    services::{session::MemorySessionStore, symws::SymphonyService, Services},
    AppState,
};

/// Fake symws with one known title and call counters on the policy lookups
#[derive(Default)]
struct FakeSymws {
    policy_calls: AtomicUsize,
}

fn table(code: &str, description: &str) -> Vec<PolicyGroup> {
    vec![PolicyGroup {
        entries: vec![PolicyCode {
            code: code.to_string(),
            description: description.to_string(),
        }],
    }]
}

#[async_trait]
impl SymphonyService for FakeSymws {
    async fn lookup_title_info(&self, title_id: &str) -> AppResult<TitleRecord> {
        if title_id != "T1" {
            return Err(AppError::NotFound(format!("Title {} not found", title_id)));
        }
        Ok(TitleRecord {
            id: "T1".to_string(),
            base_call_number: Some("PZ1".to_string()),
            holdable: true,
            call_groups: vec![CallGroup {
                call_number: "PZ1.A1".to_string(),
                library_code: "MAIN".to_string(),
                items: vec![
                    None,
                    Some(ItemRecord {
                        item_id: Some("I1".to_string()),
                        chargeable: true,
                        current_location_code: "STACKS".to_string(),
                        item_type_code: "BOOK".to_string(),
                        ..Default::default()
                    }),
                ],
            }],
            ..Default::default()
        })
    }

    async fn lookup_library_policies(&self) -> AppResult<Vec<PolicyGroup>> {
        self.policy_calls.fetch_add(1, Ordering::SeqCst);
        Ok(table("MAIN", "Main Library"))
    }

    async fn lookup_location_policies(&self) -> AppResult<Vec<PolicyGroup>> {
        self.policy_calls.fetch_add(1, Ordering::SeqCst);
        Ok(table("STACKS", "Stacks"))
    }

    async fn lookup_item_type_policies(&self) -> AppResult<Vec<PolicyGroup>> {
        self.policy_calls.fetch_add(1, Ordering::SeqCst);
        Ok(table("BOOK", "Book"))
    }

    async fn login_user(&self, login: &str, password: &str) -> AppResult<LoginUserResponse> {
        if login == "jdoe" && password == "secret" {
            Ok(LoginUserResponse {
                user_id: Some("jdoe".to_string()),
                session_token: Some("TOKEN".to_string()),
            })
        } else {
            Err(AppError::ExternalService("Unable to log in".to_string()))
        }
    }

    async fn lookup_my_account_info(
        &self,
        _session_token: &str,
        _options: &AccountInfoOptions,
    ) -> AppResult<MyAccountInfo> {
        Ok(MyAccountInfo {
            patron_info: Some(PatronInfo {
                display_name: "Doe, Jane".to_string(),
                user_id: "21000001".to_string(),
                group_id: None,
            }),
            ..Default::default()
        })
    }

    async fn create_my_hold(&self, _session_token: &str, _options: &HoldOptions) -> AppResult<()> {
        Ok(())
    }

    async fn cancel_my_hold(&self, _session_token: &str, _hold_key: &str) -> AppResult<()> {
        Ok(())
    }

    async fn renew_my_checkout(
        &self,
        _session_token: &str,
        item_id: &str,
    ) -> AppResult<RenewMyCheckoutResponse> {
        Ok(RenewMyCheckoutResponse {
            due_date: Some("2012-05-01".to_string()),
            item_id: Some(item_id.to_string()),
            message: None,
        })
    }
}

fn test_config(behaviors: BehaviorsConfig) -> AppConfig {
    AppConfig {
        server: ServerConfig::default(),
        logging: LoggingConfig::default(),
        symws: SymwsConfig::default(),
        behaviors,
        session: SessionConfig::default(),
        redis: RedisConfig::default(),
    }
}

fn app_with(symws: Arc<FakeSymws>, behaviors: BehaviorsConfig) -> Router {
    let config = test_config(behaviors);
    let services = Services::new(
        symws,
        Arc::new(MemorySessionStore::new()),
        config.behaviors.clone(),
    );
    create_router(AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    })
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("request failed");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body read failed");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response is not JSON")
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value, session: Option<&str>) -> Request<Body> {
    let mut builder = Request::post(uri).header("content-type", "application/json");
    if let Some(session) = session {
        builder = builder.header("x-session-id", session);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = app_with(Arc::new(FakeSymws::default()), BehaviorsConfig::default());

    let (status, body) = send(&app, get("/api/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["symws"], "http://localhost:8080/symws/");

    let (status, body) = send(&app, get("/api/v1/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_holdings_contract() {
    let app = app_with(Arc::new(FakeSymws::default()), BehaviorsConfig::default());

    let (status, body) = send(&app, get("/api/v1/holdings/T1")).await;
    assert_eq!(status, StatusCode::OK);

    let holdings = body.as_array().expect("array of holdings");
    assert_eq!(holdings.len(), 1);
    let h = &holdings[0];
    assert_eq!(h["id"], "T1");
    assert_eq!(h["availability"], true);
    assert_eq!(h["status"], "Available");
    assert_eq!(h["location"], "Stacks");
    assert_eq!(h["library"], "Main Library");
    assert_eq!(h["material"], "Book");
    assert_eq!(h["callnumber"], "PZ1.A1");
    assert_eq!(h["barcode"], "I1");
    assert_eq!(h["number"], 2);
    assert_eq!(h["addLink"], false);
    assert_eq!(h["reserve"], "N");
    assert_eq!(h["duedate"], Value::Null);
    assert_eq!(h["requests_placed"], 0);
    assert_eq!(h["is_holdable"], true);
    assert_eq!(h["bound_with_id"], Value::Null);
}

#[tokio::test]
async fn test_structured_rendering_uses_base_call_number() {
    let behaviors = BehaviorsConfig {
        show_base_call_number: true,
        ..Default::default()
    };
    let app = app_with(Arc::new(FakeSymws::default()), behaviors);

    let (_, body) = send(&app, get("/api/v1/status/T1?action=JSON")).await;
    assert_eq!(body[0]["callnumber"], "PZ1");

    let (_, body) = send(&app, get("/api/v1/status/T1?action=Holdings")).await;
    assert_eq!(body[0]["callnumber"], "PZ1.A1");
}

#[tokio::test]
async fn test_unknown_title_is_404() {
    let app = app_with(Arc::new(FakeSymws::default()), BehaviorsConfig::default());

    let (status, body) = send(&app, get("/api/v1/holdings/NOPE")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NoSuchTitle");
}

#[tokio::test]
async fn test_statuses_report_per_id() {
    let symws = Arc::new(FakeSymws::default());
    let app = app_with(symws.clone(), BehaviorsConfig::default());

    let (status, body) = send(
        &app,
        post_json("/api/v1/statuses", json!({ "ids": ["T1", "NOPE"] }), Some("s1")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let entries = body.as_array().expect("array of entries");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["id"], "T1");
    assert_eq!(entries[0]["holdings"][0]["barcode"], "I1");
    assert_eq!(entries[0]["error"], Value::Null);
    assert_eq!(entries[1]["id"], "NOPE");
    assert_eq!(entries[1]["holdings"], Value::Null);
    assert!(entries[1]["error"].as_str().unwrap().contains("NOPE"));

    // Three tables, loaded once for the whole session
    assert_eq!(symws.policy_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_policy_tables_are_session_scoped() {
    let symws = Arc::new(FakeSymws::default());
    let app = app_with(symws.clone(), BehaviorsConfig::default());

    let with_session = |session: &str| {
        Request::get("/api/v1/pickup-locations")
            .header("x-session-id", session)
            .body(Body::empty())
            .unwrap()
    };

    let (status, body) = send(&app, with_session("alpha")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{ "locationID": "MAIN", "locationDisplay": "Main Library" }]));

    send(&app, with_session("alpha")).await;
    assert_eq!(symws.policy_calls.load(Ordering::SeqCst), 1);

    send(&app, with_session("beta")).await;
    assert_eq!(symws.policy_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_invalid_session_header_rejected() {
    let app = app_with(Arc::new(FakeSymws::default()), BehaviorsConfig::default());

    let request = Request::get("/api/v1/holdings/T1")
        .header("x-session-id", "a:b")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_then_patron_calls() {
    let app = app_with(Arc::new(FakeSymws::default()), BehaviorsConfig::default());

    let (status, body) = send(
        &app,
        post_json(
            "/api/v1/patron/login",
            json!({ "username": "jdoe", "password": "secret" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["patron"]["lastname"], "Doe");
    let session = body["session_id"].as_str().expect("session id").to_string();

    let (status, body) = send(
        &app,
        post_json("/api/v1/patron/renewals", json!({ "details": ["B1"] }), Some(&session)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["details"]["B1"]["success"], true);
    assert_eq!(body["details"]["B1"]["new_date"], "1-May-12");

    let (status, _) = send(&app, post_json("/api/v1/patron/logout", json!({}), Some(&session))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let request = Request::get("/api/v1/patron/profile")
        .header("x-session-id", session.as_str())
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_failures() {
    let app = app_with(Arc::new(FakeSymws::default()), BehaviorsConfig::default());

    let (status, _) = send(
        &app,
        post_json("/api/v1/patron/login", json!({ "username": "jdoe", "password": "nope" }), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        post_json("/api/v1/patron/login", json!({ "username": "", "password": "x" }), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
async fn test_login_hidden_flag() {
    let behaviors = BehaviorsConfig {
        show_account_login: Some(false),
        ..Default::default()
    };
    let app = app_with(Arc::new(FakeSymws::default()), behaviors);

    let (_, body) = send(&app, get("/api/v1/patron/login-hidden")).await;
    assert_eq!(body["hidden"], true);
}
