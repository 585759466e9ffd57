#![allow(dead_code)]

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use billing_desk::config::{
    BackendSettings, BillingSettings, LoggingSettings, RestaurantProfile, ServerSettings,
    Settings,
};
use billing_desk::startup::Application;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use service_core::http::RetryConfig;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub const CONFIRMED_BILL_NUMBER: &str = "RB-2025-000123";

/// What the fake restaurant backend saw and how it should answer.
#[derive(Clone, Default)]
pub struct BackendRecorder {
    pub submissions: Arc<Mutex<Vec<Value>>>,
    pub authorizations: Arc<Mutex<Vec<Option<String>>>>,
    pub submit_status: Arc<AtomicU16>,
}

impl BackendRecorder {
    pub fn respond_with(&self, status: StatusCode) {
        self.submit_status.store(status.as_u16(), Ordering::SeqCst);
    }

    pub fn submissions(&self) -> Vec<Value> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn authorizations(&self) -> Vec<Option<String>> {
        self.authorizations.lock().unwrap().clone()
    }
}

async fn fake_submit(
    State(recorder): State<BackendRecorder>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    recorder.authorizations.lock().unwrap().push(
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    );

    let status = StatusCode::from_u16(recorder.submit_status.load(Ordering::SeqCst))
        .unwrap_or(StatusCode::OK);
    if !status.is_success() {
        return (status, Json(json!({ "error": "database unavailable" })));
    }

    recorder.submissions.lock().unwrap().push(body);
    (
        StatusCode::CREATED,
        Json(json!({ "billNumber": CONFIRMED_BILL_NUMBER })),
    )
}

async fn fake_profile() -> Json<Value> {
    Json(json!({
        "name": "Cafe Madras",
        "phone": "020 2553 0000",
        "address": {"street": "12 Station Rd", "city": "Pune", "state": "MH", "zipCode": "411001"}
    }))
}

async fn spawn_backend() -> (String, BackendRecorder) {
    let recorder = BackendRecorder::default();
    recorder.respond_with(StatusCode::CREATED);

    let router = Router::new()
        .route("/bills", post(fake_submit))
        .route("/restaurant/profile", get(fake_profile))
        .with_state(recorder.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake backend");
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    (format!("http://127.0.0.1:{}", port), recorder)
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub backend: BackendRecorder,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let (backend_url, backend) = spawn_backend().await;

        let settings = Settings {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 0, // Random port
            },
            logging: LoggingSettings::default(),
            backend: BackendSettings {
                url: backend_url,
                service_token: None,
                timeout_secs: 5,
                retry: RetryConfig::no_retry(),
            },
            billing: BillingSettings {
                tax_rate_percent: Decimal::from(18),
                currency_symbol: "₹".to_string(),
                ..Default::default()
            },
            restaurant: RestaurantProfile::default(),
        };

        let app = Application::build(settings)
            .await
            .expect("Failed to build test application");
        let port = app.port();
        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let address = format!("http://127.0.0.1:{}", port);
        let client = reqwest::Client::new();

        // Wait for the server to accept connections
        for _ in 0..50 {
            if client
                .get(format!("{}/health", address))
                .send()
                .await
                .is_ok()
            {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }

        Self {
            address,
            port,
            backend,
            client,
        }
    }

    pub async fn create_bill(&self) -> String {
        let response = self
            .client
            .post(format!("{}/bills", self.address))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 201);
        let body: Value = response.json().await.unwrap();
        body["billId"].as_str().unwrap().to_string()
    }

    pub async fn add_item(&self, bill_id: &str, item: Value) -> reqwest::Response {
        self.client
            .post(format!("{}/bills/{}/items", self.address, bill_id))
            .json(&item)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn set_metadata(&self, bill_id: &str, metadata: Value) -> reqwest::Response {
        self.client
            .put(format!("{}/bills/{}/metadata", self.address, bill_id))
            .json(&metadata)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get_bill(&self, bill_id: &str) -> Value {
        self.client
            .get(format!("{}/bills/{}", self.address, bill_id))
            .send()
            .await
            .expect("Failed to execute request")
            .json()
            .await
            .unwrap()
    }

    pub async fn submit(&self, bill_id: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/bills/{}/submit", self.address, bill_id))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// A bill with Vadapav x2 @ 20 and Tea x1 @ 15 and complete metadata.
    pub async fn ready_bill(&self) -> String {
        let bill_id = self.create_bill().await;
        self.add_item(
            &bill_id,
            json!({"description": "Vadapav", "quantity": "2", "price": "20"}),
        )
        .await;
        self.add_item(
            &bill_id,
            json!({"description": "Tea", "quantity": "1", "price": "15"}),
        )
        .await;
        self.set_metadata(
            &bill_id,
            json!({
                "billNumber": "BILL-7",
                "date": "2025-05-03",
                "time": "14:15",
                "customerName": "Asha",
                "tableNumber": "4"
            }),
        )
        .await;
        bill_id
    }
}
