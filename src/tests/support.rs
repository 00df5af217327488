// @file: up_proxy/src/tests/support.rs
// @description: Mock Up API, manual clock and counting source shared by the service tests.
// @author: LAS.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use crate::connectors::retry::RetryPolicy;
use crate::connectors::up_rest::UpClient;
use crate::core::error::ProxyError;
use crate::core::interfaces::{Clock, TransactionSource};
use crate::core::models::RawTransaction;


//
// FIXTURES
//

pub fn tx_json(id: &str, value: &str, category: Option<&str>) -> Value {
    let category_data: Value = match category {
        Some(c) => json!({ "type": "categories", "id": c }),
        None => Value::Null,
    };

    json!({
        "type": "transactions",
        "id": id,
        "attributes": {
            "status": "SETTLED",
            "rawText": null,
            "description": format!("Merchant {}", id),
            "message": null,
            "amount": { "currencyCode": "AUD", "value": value, "valueInBaseUnits": 0 },
            "settledAt": "2024-04-01T12:00:00+11:00",
            "createdAt": "2024-04-01T11:58:00+11:00"
        },
        "relationships": {
            "account": { "data": { "type": "accounts", "id": "acc-1" } },
            "category": { "data": category_data }
        }
    })
}

pub fn raw_tx(id: &str, value: &str) -> RawTransaction {
    serde_json::from_value(tx_json(id, value, None)).unwrap()
}

/// Three pages of two transactions each, newest first.
pub fn three_pages() -> Vec<Vec<Value>> {
    vec![
        vec![tx_json("t1", "-10.00", Some("groceries")), tx_json("t2", "-5.25", None)],
        vec![tx_json("t3", "100.00", Some("salary")), tx_json("t4", "-1.10", None)],
        vec![tx_json("t5", "12.50", Some("takeaway")), tx_json("t6", "-0.99", None)],
    ]
}

pub fn fast_client(base_url: &str, max_retries: u32) -> UpClient {
    UpClient::new(
        base_url,
        "test-token",
        2,
        Duration::from_millis(1),
        RetryPolicy::fixed(Duration::from_millis(5), max_retries),
    )
}


//
// MOCK UPSTREAM
//

#[derive(Default)]
pub struct MockBehaviour {
    pub pages: Vec<Vec<Value>>,
    /// Page index answering 429 while `rate_limit_remaining` is above zero.
    pub rate_limit_page: Option<usize>,
    pub rate_limit_remaining: AtomicUsize,
    pub fail_status: Option<u16>,
    pub response_delay: Duration,
}

pub struct MockUpstream {
    pub base_url: String,
    pub page_hits: Arc<Mutex<HashMap<usize, usize>>>,
    pub auth_headers: Arc<Mutex<Vec<String>>>,
}

impl MockUpstream {
    pub fn hits_for(&self, page: usize) -> usize {
        *self.page_hits.lock().unwrap().get(&page).unwrap_or(&0)
    }

    pub fn total_hits(&self) -> usize {
        self.page_hits.lock().unwrap().values().sum()
    }
}

#[derive(Clone)]
struct MockState {
    base_url: String,
    behaviour: Arc<MockBehaviour>,
    page_hits: Arc<Mutex<HashMap<usize, usize>>>,
    auth_headers: Arc<Mutex<Vec<String>>>,
}

pub async fn spawn_mock_upstream(behaviour: MockBehaviour) -> MockUpstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let state = MockState {
        base_url: base_url.clone(),
        behaviour: Arc::new(behaviour),
        page_hits: Arc::new(Mutex::new(HashMap::new())),
        auth_headers: Arc::new(Mutex::new(Vec::new())),
    };

    let upstream = MockUpstream {
        base_url: base_url.clone(),
        page_hits: state.page_hits.clone(),
        auth_headers: state.auth_headers.clone(),
    };

    let app = Router::new()
        .route("/transactions", get(mock_transactions))
        .route("/accounts", get(mock_accounts))
        .with_state(state);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    upstream
}

async fn mock_transactions(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    record_auth(&state, &headers);

    let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(0);
    *state.page_hits.lock().unwrap().entry(page).or_insert(0) += 1;

    let behaviour = &state.behaviour;
    if !behaviour.response_delay.is_zero() {
        tokio::time::sleep(behaviour.response_delay).await;
    }

    if let Some(status) = behaviour.fail_status {
        let code = StatusCode::from_u16(status).unwrap();
        return (code, Json(json!({ "errors": [{ "status": status.to_string() }] }))).into_response();
    }

    if behaviour.rate_limit_page == Some(page) {
        let limited = behaviour
            .rate_limit_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if limited {
            return StatusCode::TOO_MANY_REQUESTS.into_response();
        }
    }

    let data: Vec<Value> = behaviour.pages.get(page).cloned().unwrap_or_default();
    let next: Value = if page + 1 < behaviour.pages.len() {
        json!(format!("{}/transactions?page={}", state.base_url, page + 1))
    } else {
        Value::Null
    };

    Json(json!({
        "data": data,
        "links": { "prev": null, "next": next }
    }))
    .into_response()
}

async fn mock_accounts(State(state): State<MockState>, headers: HeaderMap) -> Response {
    record_auth(&state, &headers);

    if let Some(status) = state.behaviour.fail_status {
        return StatusCode::from_u16(status).unwrap().into_response();
    }

    Json(json!({
        "data": [{
            "type": "accounts",
            "id": "acc-1",
            "attributes": {
                "displayName": "Spending",
                "accountType": "TRANSACTIONAL",
                "balance": { "currencyCode": "AUD", "value": "250.00", "valueInBaseUnits": 25000 }
            }
        }],
        "links": { "prev": null, "next": null }
    }))
    .into_response()
}

fn record_auth(state: &MockState, headers: &HeaderMap) {
    if let Some(value) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        state.auth_headers.lock().unwrap().push(value.to_string());
    }
}


//
// CLOCK & SOURCE DOUBLES
//

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn starting_at(start: &str) -> Self {
        Self { now: Mutex::new(start.parse().unwrap()) }
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap();
        *now = *now + by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// In-memory source counting how often the cache asks for data.
pub struct CountingSource {
    pub calls: AtomicUsize,
    pub rows: Vec<RawTransaction>,
    pub delay: Duration,
    pub fail: AtomicBool,
}

impl CountingSource {
    pub fn with_rows(rows: Vec<RawTransaction>) -> Self {
        Self { calls: AtomicUsize::new(0), rows, delay: Duration::ZERO, fail: AtomicBool::new(false) }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransactionSource for CountingSource {
    async fn fetch_all(&self) -> Result<Vec<RawTransaction>, ProxyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(ProxyError::Upstream { status: 500, body: "boom".to_string() });
        }
        Ok(self.rows.clone())
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}
