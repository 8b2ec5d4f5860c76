use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use chrono::{TimeZone, Utc};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use orderscan_infra::AppConfig;
use orderscan_rules::common::DONE_SHIPPED;

/// Upstream shop with one broken order (`o1`: done, delivery still open) and one
/// consistent order (`o2`).
#[derive(Default)]
struct Shop {
    reject_token: AtomicBool,
}

fn wire_order(id: &str) -> Value {
    let (number, delivery_state, codes, documents) = match id {
        "o1" => ("10001", "Open", json!(null), json!([])),
        _ => ("10002", "Shipped", json!(["DHL-9"]), json!([{"fileType": "pdf"}])),
    };
    json!({
        "id": id,
        "salesChannelId": "sc-main",
        "orderNumber": number,
        "stateMachineState": {"name": "Done"},
        "createdAt": "2024-03-01T09:15:00.000+00:00",
        "deliveries": [{
            "orderId": id,
            "trackingCodes": codes,
            "stateMachineState": {"name": delivery_state}
        }],
        "transactions": [],
        "documents": documents,
        "lineItems": []
    })
}

async fn token(State(shop): State<Arc<Shop>>) -> Response {
    if shop.reject_token.load(Ordering::SeqCst) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({"access_token": "tok", "expires_in": 600})).into_response()
}

async fn search_order(Json(body): Json<Value>) -> Json<Value> {
    let filter = &body["filter"][0];
    let data: Vec<Value> = if filter["type"] == "equalsAny" {
        filter["value"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .filter(|id| matches!(*id, "o1" | "o2"))
            .map(wire_order)
            .collect()
    } else if filter["field"] == "createdAt" {
        vec![wire_order("o1")]
    } else {
        vec![wire_order("o2")]
    };
    Json(json!({"total": data.len(), "data": data}))
}

async fn search_delivery() -> Json<Value> {
    Json(json!({"total": 2, "data": [
        {"orderId": "o1", "stateMachineState": {"name": "Open"}},
        {"orderId": "o2", "stateMachineState": {"name": "Shipped"}}
    ]}))
}

async fn search_transaction() -> Json<Value> {
    Json(json!({"total": 0, "data": []}))
}

async fn spawn_shop(shop: Arc<Shop>) -> (String, tokio::task::JoinHandle<()>) {
    let app = Router::new()
        .route("/api/oauth/token", post(token))
        .route("/api/v3/search/order", post(search_order))
        .route("/api/v3/search/order-delivery", post(search_delivery))
        .route("/api/v3/search/order-transaction", post(search_transaction))
        .with_state(shop);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind ephemeral port");
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (base_url, handle)
}

fn config(base_url: &str) -> AppConfig {
    let vars: HashMap<&str, String> = HashMap::from([
        ("SHOPWARE_BASE_URL", base_url.to_string()),
        ("SHOPWARE_CLIENT_ID", "SWIA-e2e".to_string()),
        ("SHOPWARE_CLIENT_SECRET", "secret".to_string()),
        ("SHOPWARE_REQUEST_TIMEOUT_SECS", "5".to_string()),
    ]);
    AppConfig::from_lookup(|var| vars.get(var).cloned()).unwrap()
}

#[tokio::test]
async fn run_reports_only_the_broken_order() {
    let (base_url, handle) = spawn_shop(Arc::new(Shop::default())).await;

    let now = Utc.with_ymd_and_hms(2024, 3, 2, 6, 0, 0).unwrap();
    let report = orderscan_cli::app::run(&config(&base_url), now, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.scanned, 2);
    assert_eq!(report.results.len(), 1);
    let broken = &report.results[0];
    assert_eq!(broken.order_id.as_str(), "o1");
    assert_eq!(broken.order_number, "10001");
    assert_eq!(broken.tracking_code, "absent");
    assert_eq!(
        broken.errors.keys().map(String::as_str).collect::<Vec<_>>(),
        vec![DONE_SHIPPED]
    );

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["results"][0]["created_date"], "2024-03-01");

    handle.abort();
}

#[tokio::test]
async fn rejected_credentials_abort_before_scanning() {
    let shop = Arc::new(Shop::default());
    shop.reject_token.store(true, Ordering::SeqCst);
    let (base_url, handle) = spawn_shop(shop).await;

    let err = orderscan_cli::app::run(&config(&base_url), Utc::now(), CancellationToken::new())
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("authenticating against Shopware"));

    handle.abort();
}

#[tokio::test]
async fn cancelled_run_returns_error() {
    let (base_url, handle) = spawn_shop(Arc::new(Shop::default())).await;

    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = orderscan_cli::app::run(&config(&base_url), Utc::now(), cancel)
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("scan cancelled"));

    handle.abort();
}
