use prometheus::{IntCounterVec, Opts, Registry};
use std::sync::LazyLock;

pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Requests allowed through the gate, by mode (free, verified, trust).
pub static GATE_ALLOWED: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new("x402_gate_allowed_total", "Requests allowed by the gate"),
        &["mode"],
    )
    .unwrap()
});

/// Requests denied with a 402, by reason (no_proof, verify_failed).
pub static GATE_DENIED: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new("x402_gate_denied_total", "Requests denied by the gate"),
        &["reason"],
    )
    .unwrap()
});

/// Register all metrics with the registry.
pub fn register_metrics() {
    REGISTRY.register(Box::new(GATE_ALLOWED.clone())).unwrap();
    REGISTRY.register(Box::new(GATE_DENIED.clone())).unwrap();
}
