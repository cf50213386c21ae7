//! External payment verification capability.
//!
//! The gate never verifies proofs itself; it delegates to a
//! [`PaymentVerifier`] wired in at startup. Absence of a verifier
//! (`None` in [`crate::state::AppState`]) selects manual-trust mode.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::GateConfig;

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// Could not reach the facilitator or parse its response
    #[error("facilitator request failed: {0}")]
    Transport(String),

    /// Facilitator reached, payment rejected
    #[error("payment rejected: {0}")]
    Rejected(String),
}

/// A payment proof verifier. Implementations are selected once at
/// process start; the gate treats the result as pass/fail and never
/// inspects proof contents itself.
#[async_trait]
pub trait PaymentVerifier: Send + Sync {
    /// Verify `proof` against the required `amount` for `resource`.
    async fn verify(&self, proof: &str, amount: &str, resource: &str) -> Result<(), VerifyError>;
}

#[derive(Debug, Deserialize)]
struct FacilitatorVerifyResponse {
    #[serde(rename = "isValid")]
    is_valid: bool,
    #[serde(rename = "invalidReason")]
    invalid_reason: Option<String>,
}

/// Verifier backed by an x402 facilitator's `/verify` endpoint.
pub struct FacilitatorVerifier {
    client: reqwest::Client,
    verify_url: String,
    network: String,
    asset: String,
    pay_to: String,
}

impl FacilitatorVerifier {
    pub fn new(config: &GateConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("failed to create HTTP client");

        Self {
            client,
            verify_url: format!("{}/verify", config.facilitator_url.trim_end_matches('/')),
            network: config.network.clone(),
            asset: crate::config::USDC_BASE.to_string(),
            pay_to: config.treasury.clone(),
        }
    }
}

#[async_trait]
impl PaymentVerifier for FacilitatorVerifier {
    async fn verify(&self, proof: &str, amount: &str, resource: &str) -> Result<(), VerifyError> {
        let body = serde_json::json!({
            "x402Version": 1,
            "paymentHeader": proof,
            "paymentRequirements": {
                "scheme": "exact",
                "network": self.network,
                "maxAmountRequired": amount,
                "asset": self.asset,
                "payTo": self.pay_to,
                "resource": resource,
            },
        });

        let response = self
            .client
            .post(&self.verify_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| VerifyError::Transport(format!("facilitator request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VerifyError::Transport(format!(
                "facilitator returned {status}"
            )));
        }

        let verify: FacilitatorVerifyResponse = response
            .json()
            .await
            .map_err(|e| VerifyError::Transport(format!("invalid facilitator response: {e}")))?;

        if !verify.is_valid {
            return Err(VerifyError::Rejected(
                verify
                    .invalid_reason
                    .unwrap_or_else(|| "unknown reason".to_string()),
            ));
        }

        Ok(())
    }
}
