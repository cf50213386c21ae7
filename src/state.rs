use std::sync::Arc;

use crate::config::GateConfig;
use crate::gate::PaymentGate;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GateConfig>,
    pub gate: Arc<PaymentGate>,
}

impl AppState {
    pub fn new(config: Arc<GateConfig>, gate: PaymentGate) -> Self {
        Self {
            config,
            gate: Arc::new(gate),
        }
    }
}
