// @file: up_proxy/src/api/http_server.rs
// @description: Axum routes serving accounts, flattened transactions as JSON and CSV.
// @author: LAS.

use std::sync::Arc;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use log::{error, info};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use crate::connectors::up_rest::UpClient;
use crate::core::cache::TransactionCache;
use crate::core::error::ProxyError;
use crate::core::models::{ErrorBody, TransactionsEnvelope};

const TRANSACTIONS_FAILED: &str = "Failed to fetch transactions";
const ACCOUNTS_FAILED: &str = "Failed to fetch accounts";

//
// SHARED STATE
//

#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<TransactionCache>,
    pub client: Arc<UpClient>,
}


//
// ROUTER
//

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/accounts", get(get_accounts))
        .route("/transactions", get(get_transactions))
        .route("/transactions/tableau", get(get_tableau))
        .route("/transactions/csv", get(get_csv))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

pub async fn start_server(address: &str, state: AppState) -> Result<(), ProxyError> {
    let listener: TcpListener = TcpListener::bind(address).await?;
    info!("HTTP server listening on: {}", address);

    axum::serve(listener, build_router(state)).await?;
    Ok(())
}


//
// HANDLERS
//

/// GET /api/health
async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// GET /api/accounts - upstream document passed through
async fn get_accounts(State(state): State<AppState>) -> Response {
    match state.client.fetch_accounts().await {
        Ok(accounts) => (StatusCode::OK, Json(accounts)).into_response(),
        Err(e) => internal_error(ACCOUNTS_FAILED, e),
    }
}

/// GET /api/transactions - rows with count and refresh time
async fn get_transactions(State(state): State<AppState>) -> Response {
    match state.cache.get_or_refresh().await {
        Ok(entry) => {
            let envelope = TransactionsEnvelope {
                count: entry.rows().len(),
                fetched_at: entry.fetched_at(),
                data: entry.rows(),
            };
            (StatusCode::OK, Json(envelope)).into_response()
        }
        Err(e) => internal_error(TRANSACTIONS_FAILED, e),
    }
}

/// GET /api/transactions/tableau - bare array for analytics connectors
async fn get_tableau(State(state): State<AppState>) -> Response {
    match state.cache.get_or_refresh().await {
        Ok(entry) => (StatusCode::OK, Json(entry.rows())).into_response(),
        Err(e) => internal_error(TRANSACTIONS_FAILED, e),
    }
}

/// GET /api/transactions/csv
async fn get_csv(State(state): State<AppState>) -> Response {
    match state.cache.get_or_refresh().await {
        Ok(entry) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv"),
                (header::CONTENT_DISPOSITION, "attachment; filename=transactions.csv"),
            ],
            entry.csv_text().to_string(),
        )
            .into_response(),
        Err(e) => internal_error(TRANSACTIONS_FAILED, e),
    }
}


//
// ERROR MAPPING
//

fn internal_error(message: &'static str, err: ProxyError) -> Response {
    error!("{}: {}", message, err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody { error: message }),
    )
        .into_response()
}
