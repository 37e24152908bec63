use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;

use moomaroi_api::{
    config::AppConfig,
    db,
    entities::{addon_option, meat_option, menu_item},
    events::{self, EventSender},
    services::AppServices,
    AppState,
};

/// Helper harness spinning up application state backed by a throwaway
/// SQLite database.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    _db_dir: tempfile::TempDir,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let db_dir = tempfile::tempdir().expect("failed to create temp dir");
        let db_path = db_dir.path().join("moomaroi_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "127.0.0.1".to_string(),
            13_000,
            "test".to_string(),
        );
        cfg.auto_migrate = true;
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(64);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let services = AppServices::new(db_arc.clone(), Arc::new(event_sender.clone()), &cfg);
        services
            .tables
            .sync_registry()
            .await
            .expect("failed to sync table registry");

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            services,
        };

        let router = Router::new()
            .nest("/api", moomaroi_api::api_routes())
            .with_state(state.clone());

        Self {
            router,
            state,
            _db_dir: db_dir,
            _event_task: event_task,
        }
    }

    // ---- seeding helpers ----

    pub async fn seed_menu_item(&self, name_en: &str, price: Decimal) -> i32 {
        let item = menu_item::ActiveModel {
            category: Set("Main".to_string()),
            name_th: Set(format!("{} (th)", name_en)),
            name_en: Set(name_en.to_string()),
            short_description: Set(None),
            full_description: Set(None),
            price: Set(price),
            image_url: Set(None),
            tags: Set(None),
            ..Default::default()
        };
        item.insert(&*self.state.db)
            .await
            .expect("failed to seed menu item")
            .id
    }

    pub async fn seed_meat_option(&self, name: &str, extra_price: Decimal) -> i32 {
        let option = meat_option::ActiveModel {
            name: Set(name.to_string()),
            extra_price: Set(extra_price),
            ..Default::default()
        };
        option
            .insert(&*self.state.db)
            .await
            .expect("failed to seed meat option")
            .id
    }

    pub async fn seed_addon_option(&self, name: &str, extra_price: Decimal) -> i32 {
        let option = addon_option::ActiveModel {
            name: Set(name.to_string()),
            extra_price: Set(extra_price),
            ..Default::default()
        };
        option
            .insert(&*self.state.db)
            .await
            .expect("failed to seed addon option")
            .id
    }

    // ---- HTTP helpers ----

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("failed to build request"))
            .await
            .expect("request failed");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request("GET", uri, None).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, Some(body)).await
    }

    pub async fn put_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request("PUT", uri, Some(body)).await
    }

    pub async fn patch_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request("PATCH", uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request("DELETE", uri, None).await
    }
}
