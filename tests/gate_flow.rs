//! End-to-end gate scenarios against a real actix test service,
//! mirroring a minimal embedding app: one paid route, one free route.

use std::sync::Arc;

use actix_web::{test, web, App, HttpRequest, HttpResponse};
use async_trait::async_trait;

use x402_gate::config::GateConfig;
use x402_gate::gate::{require_payment, PaymentGate};
use x402_gate::ledger::PaymentLedger;
use x402_gate::routes;
use x402_gate::state::AppState;
use x402_gate::verifier::{PaymentVerifier, VerifyError};

struct RejectingVerifier;

#[async_trait]
impl PaymentVerifier for RejectingVerifier {
    async fn verify(&self, _: &str, _: &str, _: &str) -> Result<(), VerifyError> {
        Err(VerifyError::Rejected("invalid signature".to_string()))
    }
}

async fn premium_endpoint(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    if let Err(resp) = require_payment(&req, &state, "1000", "Premium endpoint").await {
        return resp;
    }
    HttpResponse::Ok().json(serde_json::json!({ "ok": true }))
}

async fn free_endpoint(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    if let Err(resp) = require_payment(&req, &state, "0", "Free endpoint").await {
        return resp;
    }
    HttpResponse::Ok().json(serde_json::json!({ "ok": true }))
}

fn test_state(
    verifier: Option<Arc<dyn PaymentVerifier>>,
    ledger: Option<PaymentLedger>,
) -> web::Data<AppState> {
    let config = Arc::new(GateConfig {
        treasury: "0xdeadbeef".to_string(),
        ..GateConfig::default()
    });
    let gate = PaymentGate::new(config.clone(), verifier, ledger);
    web::Data::new(AppState::new(config, gate))
}

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state.clone())
                .route("/premium", web::get().to(premium_endpoint))
                .route("/free", web::get().to(free_endpoint))
                .configure(routes::status::configure)
                .configure(routes::health::configure),
        )
        .await
    };
}

#[actix_web::test]
async fn paid_route_without_header_returns_402() {
    let state = test_state(None, None);
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/premium").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 402);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Payment Required");
    assert_eq!(body["x402"]["maxAmountRequired"], "1000");
    assert_eq!(body["x402"]["payTo"], "0xdeadbeef");
    assert_eq!(body["x402"]["version"], "1");
    assert_eq!(body["x402"]["network"], "eip155:8453");
}

#[actix_web::test]
async fn paid_route_with_fake_header_allows_in_manual_mode() {
    let ledger = PaymentLedger::open(":memory:").unwrap();
    let state = test_state(None, Some(ledger.clone()));
    let app = test_app!(state);

    let req = test::TestRequest::get()
        .uri("/premium")
        .insert_header(("X-PAYMENT", "totally-fake-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body, serde_json::json!({ "ok": true }));

    let records = ledger.recent(10).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].payer_address, "trust-accepted");
    assert_eq!(records[0].endpoint, "/premium");
    assert_eq!(records[0].tx_hash, "totally-fake-token");
}

#[actix_web::test]
async fn free_route_passes_through_with_or_without_header() {
    let ledger = PaymentLedger::open(":memory:").unwrap();
    let state = test_state(None, Some(ledger.clone()));
    let app = test_app!(state);

    for _ in 0..3 {
        let req = test::TestRequest::get().uri("/free").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 200);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body, serde_json::json!({ "ok": true }));
    }

    let req = test::TestRequest::get()
        .uri("/free")
        .insert_header(("X-PAYMENT", "totally-fake-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    // Free requests never reach the ledger.
    assert!(ledger.recent(10).unwrap().is_empty());
}

#[actix_web::test]
async fn failing_verifier_returns_402_not_500() {
    let state = test_state(Some(Arc::new(RejectingVerifier)), None);
    let app = test_app!(state);

    let req = test::TestRequest::get()
        .uri("/premium")
        .insert_header(("X-PAYMENT", "some-proof"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 402);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Payment Required");
}

#[actix_web::test]
async fn repeated_denials_produce_identical_challenges() {
    let state = test_state(None, None);
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/premium").to_request();
    let first = test::call_service(&app, req).await;
    let first_body = test::read_body(first).await;

    let req = test::TestRequest::get().uri("/premium").to_request();
    let second = test::call_service(&app, req).await;
    let second_body = test::read_body(second).await;

    assert_eq!(first_body, second_body);
}

#[actix_web::test]
async fn status_endpoint_reports_configuration() {
    let state = test_state(None, None);
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/api/x402/status").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["x402_enabled"], true);
    assert_eq!(body["x402_lib"], false);
    assert_eq!(body["cdp_configured"], false);
    assert_eq!(body["treasury"], "0xdeadbeef");
    assert!(body["swap_info"].is_object());
}

#[actix_web::test]
async fn metrics_endpoint_requires_bearer_token_when_configured() {
    let config = Arc::new(GateConfig {
        metrics_token: Some("s3cret".to_string()),
        ..GateConfig::default()
    });
    let gate = PaymentGate::new(config.clone(), None, None);
    let state = web::Data::new(AppState::new(config, gate));
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 401);

    let req = test::TestRequest::get()
        .uri("/metrics")
        .insert_header(("authorization", "Bearer s3cret"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
}

#[actix_web::test]
async fn health_endpoint_reports_ok() {
    let state = test_state(None, None);
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "x402-gate");
}
