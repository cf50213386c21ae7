//! The payment gate: per-request allow/deny decisions.
//!
//! Decision order (free tier, verified payment, manual trust, deny) is
//! load-bearing and matches the documented protocol flow. Manual-trust
//! mode is a deliberate degraded-security mode: with no verifier wired
//! in, any non-empty `X-PAYMENT` value is accepted on trust and audited
//! as `"trust-accepted"`. No structural or cryptographic validation of
//! the proof happens in this crate.

use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse};

use crate::config::{is_free, GateConfig, USDC_BASE};
use crate::ledger::PaymentLedger;
use crate::metrics::{GATE_ALLOWED, GATE_DENIED};
use crate::state::AppState;
use crate::verifier::PaymentVerifier;

/// Request header carrying the opaque payment proof.
pub const PAYMENT_HEADER: &str = "X-PAYMENT";

/// Audit payer kind for facilitator-verified payments.
pub const PAYER_VERIFIED: &str = "verified";
/// Audit payer kind for manual-trust acceptances.
pub const PAYER_TRUST_ACCEPTED: &str = "trust-accepted";

/// Proofs are truncated to this many characters for audit logging
/// (a 0x-prefixed 32-byte hash is exactly 66 characters).
const PROOF_AUDIT_LEN: usize = 66;

/// The structured 402 payload. Built fresh per denial, never persisted.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Challenge {
    pub version: String,
    pub network: String,
    pub asset: String,
    #[serde(rename = "payTo")]
    pub pay_to: String,
    #[serde(rename = "maxAmountRequired")]
    pub max_amount_required: String,
    pub facilitator: String,
    pub resource: String,
    pub description: String,
}

/// Outcome of a gate evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Allow,
    Deny(Box<Challenge>),
}

/// Truncate a proof to its audit form, respecting char boundaries.
fn truncate_proof(proof: &str) -> &str {
    match proof.char_indices().nth(PROOF_AUDIT_LEN) {
        Some((idx, _)) => &proof[..idx],
        None => proof,
    }
}

/// Stateless per-request payment gate. The only fixed state is the
/// verifier capability, selected once at construction.
pub struct PaymentGate {
    config: Arc<GateConfig>,
    verifier: Option<Arc<dyn PaymentVerifier>>,
    ledger: Option<PaymentLedger>,
}

impl PaymentGate {
    pub fn new(
        config: Arc<GateConfig>,
        verifier: Option<Arc<dyn PaymentVerifier>>,
        ledger: Option<PaymentLedger>,
    ) -> Self {
        Self {
            config,
            verifier,
            ledger,
        }
    }

    pub fn verifier_available(&self) -> bool {
        self.verifier.is_some()
    }

    /// Decide whether a request may pass.
    ///
    /// `price` is the route's price string ("0"/"" = free), `proof` the
    /// payment header value if present and non-empty, `path` the request
    /// path for audit rows, `resource` the full request URL echoed into
    /// challenges.
    pub async fn enforce(
        &self,
        price: &str,
        proof: Option<&str>,
        path: &str,
        resource: &str,
        description: &str,
    ) -> Decision {
        // Free tier short-circuits before the proof is ever consulted.
        if is_free(price) {
            GATE_ALLOWED.with_label_values(&["free"]).inc();
            return Decision::Allow;
        }

        match (proof, &self.verifier) {
            (Some(proof), Some(verifier)) => {
                match verifier.verify(proof, price, resource).await {
                    Ok(()) => {
                        self.audit(PAYER_VERIFIED, path, price, proof, description);
                        GATE_ALLOWED.with_label_values(&["verified"]).inc();
                        Decision::Allow
                    }
                    Err(e) => {
                        // Contained here: callers always get a well-formed
                        // 402 on verifier error, never a 5xx.
                        tracing::error!(path = %path, error = %e, "x402 verification failed");
                        GATE_DENIED.with_label_values(&["verify_failed"]).inc();
                        Decision::Deny(Box::new(self.challenge(price, resource, description)))
                    }
                }
            }
            (Some(proof), None) => {
                // Manual trust mode: the proof is accepted on presence alone.
                self.audit(PAYER_TRUST_ACCEPTED, path, price, proof, description);
                GATE_ALLOWED.with_label_values(&["trust"]).inc();
                Decision::Allow
            }
            (None, _) => {
                GATE_DENIED.with_label_values(&["no_proof"]).inc();
                Decision::Deny(Box::new(self.challenge(price, resource, description)))
            }
        }
    }

    /// Build a challenge for the current request. Pure: reads config and
    /// inputs, performs no I/O.
    pub fn challenge(&self, price: &str, resource: &str, description: &str) -> Challenge {
        Challenge {
            version: "1".to_string(),
            network: self.config.network.clone(),
            asset: USDC_BASE.to_string(),
            pay_to: self.config.treasury.clone(),
            max_amount_required: price.to_string(),
            facilitator: self.config.facilitator_url.clone(),
            resource: resource.to_string(),
            description: description.to_string(),
        }
    }

    /// Append an audit row, best-effort. A missing ledger or a failed
    /// write never changes the decision already made.
    fn audit(&self, payer: &str, path: &str, amount: &str, proof: &str, description: &str) {
        let Some(ref ledger) = self.ledger else {
            return;
        };
        if let Err(e) = ledger.append(
            payer,
            path,
            amount,
            truncate_proof(proof),
            &self.config.network,
            description,
        ) {
            tracing::warn!(path = %path, error = %e, "failed to log x402 payment");
        }
    }
}

/// Build the 402 Payment Required HTTP response.
pub fn payment_required_response(challenge: Challenge) -> HttpResponse {
    HttpResponse::PaymentRequired().json(serde_json::json!({
        "error": "Payment Required",
        "x402": challenge,
    }))
}

/// Payment guard composed in front of a handler: returns `Ok(())` when
/// the request may proceed, or `Err(402 response)` to return directly.
pub async fn require_payment(
    req: &HttpRequest,
    state: &web::Data<AppState>,
    price: &str,
    description: &str,
) -> Result<(), HttpResponse> {
    let proof = req
        .headers()
        .get(PAYMENT_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty());

    let resource = {
        let conn = req.connection_info();
        format!("{}://{}{}", conn.scheme(), conn.host(), req.uri())
    };

    match state
        .gate
        .enforce(price, proof, req.path(), &resource, description)
        .await
    {
        Decision::Allow => Ok(()),
        Decision::Deny(challenge) => Err(payment_required_response(*challenge)),
    }
}
