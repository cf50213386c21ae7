use actix_web::{web, HttpResponse};

use crate::config::SwapInfo;
use crate::state::AppState;

/// Assemble the read-only configuration snapshot. No logic beyond
/// echoing already-known startup values.
pub fn status_snapshot(state: &AppState) -> serde_json::Value {
    serde_json::json!({
        "x402_enabled": true,
        "x402_lib": state.gate.verifier_available(),
        "cdp_configured": state.config.has_cdp_credentials(),
        "network": state.config.network,
        "facilitator": state.config.facilitator_url,
        "treasury": state.config.treasury,
        "swap_info": SwapInfo::base_mainnet(),
    })
}

/// GET /api/x402/status - current gate configuration
pub async fn status(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(status_snapshot(&state))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/x402/status", web::get().to(status));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GateConfig;
    use crate::gate::PaymentGate;
    use std::sync::Arc;

    #[test]
    fn test_snapshot_reflects_manual_mode() {
        let config = Arc::new(GateConfig {
            treasury: "0xdeadbeef".to_string(),
            ..GateConfig::default()
        });
        let state = AppState::new(config.clone(), PaymentGate::new(config, None, None));

        let snapshot = status_snapshot(&state);
        assert_eq!(snapshot["x402_enabled"], true);
        assert_eq!(snapshot["x402_lib"], false);
        assert_eq!(snapshot["cdp_configured"], false);
        assert_eq!(snapshot["treasury"], "0xdeadbeef");
        assert_eq!(snapshot["network"], "eip155:8453");
        assert!(snapshot["swap_info"]["swap_url"]
            .as_str()
            .unwrap()
            .contains("aerodrome"));
    }
}
