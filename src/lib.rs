//! x402 payment gate — gates HTTP endpoints behind 402 payments.
//!
//! Per request, the gate decides allow vs. deny from three inputs: the
//! route's price string, the presence of an `X-PAYMENT` proof header,
//! and whether an external verifier was wired in at startup. Free
//! routes (price `"0"` or `""`) always pass; denied requests receive a
//! structured 402 challenge; accepted payments are appended to an
//! optional SQLite audit ledger.
//!
//! # Modules
//!
//! - [`gate`] — the decision core ([`PaymentGate::enforce`](gate::PaymentGate::enforce))
//!   and the [`require_payment`](gate::require_payment) handler guard
//! - [`verifier`] — external verification capability ([`PaymentVerifier`](verifier::PaymentVerifier))
//! - [`ledger`] — append-only payment audit log ([`PaymentLedger`](ledger::PaymentLedger))
//! - [`config`] — environment configuration and protocol constants
//! - [`routes`] — status, health/metrics, and demo endpoints

pub mod config;
pub mod cors;
pub mod error;
pub mod gate;
pub mod ledger;
pub mod metrics;
pub mod routes;
pub mod state;
pub mod verifier;

pub use config::GateConfig;
pub use error::GateError;
pub use gate::{require_payment, Challenge, Decision, PaymentGate};
pub use ledger::PaymentLedger;
pub use state::AppState;
pub use verifier::{FacilitatorVerifier, PaymentVerifier};
