//! Demo routes for the server binary: one paid endpoint and one free
//! endpoint, both composed behind the payment guard.

use actix_web::{web, HttpRequest, HttpResponse};

use crate::gate::require_payment;
use crate::state::AppState;

const PREMIUM_PRICE: &str = "10000"; // $0.01 in USDC atomic units
const PREMIUM_DESCRIPTION: &str = "Premium data export";

/// GET /api/premium/data - paid endpoint
pub async fn premium_data(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    if let Err(resp) = require_payment(&req, &state, PREMIUM_PRICE, PREMIUM_DESCRIPTION).await {
        return resp;
    }

    HttpResponse::Ok().json(serde_json::json!({
        "data": "premium payload",
        "price": PREMIUM_PRICE,
    }))
}

/// GET /api/free/ping - free endpoint (price "0" passes through the gate)
pub async fn free_ping(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    if let Err(resp) = require_payment(&req, &state, "0", "Free endpoint").await {
        return resp;
    }

    HttpResponse::Ok().json(serde_json::json!({ "ok": true }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/premium/data", web::get().to(premium_data))
        .route("/api/free/ping", web::get().to(free_ping));
}
