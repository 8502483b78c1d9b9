use std::future::Future;
use std::time::Duration;

use alloy::primitives::Address;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Deserialize;
use tracing::{debug, warn};

pub const MAX_POLL_ATTEMPTS: u32 = 120;
pub const POLL_DELAY: Duration = Duration::from_secs(1);

/// Outcome of polling for one message's signed VAA. Exhaustion is an
/// explicit result so the caller can tell "gave up" from "signed".
#[derive(Debug)]
pub enum VaaPollResult {
    Signed(Vec<u8>),
    Exhausted { attempts: u32 },
}

#[derive(Debug, Deserialize)]
struct SignedVaaResponse {
    #[serde(rename = "vaaBytes")]
    vaa_bytes: String,
}

/// Client for the guardian REST API.
pub struct GuardianClient {
    http: reqwest::Client,
    rpc: String,
}

impl GuardianClient {
    pub fn new(rpc: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            rpc: rpc.into(),
        }
    }

    async fn fetch_signed_vaa(
        &self,
        chain_id: u16,
        emitter: &str,
        sequence: u64,
    ) -> eyre::Result<Vec<u8>> {
        let url = format!(
            "{}/v1/signed_vaa/{chain_id}/{emitter}/{sequence}",
            self.rpc.trim_end_matches('/')
        );
        let response = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<SignedVaaResponse>()
            .await?;
        Ok(BASE64.decode(response.vaa_bytes)?)
    }

    /// Polls the guardian API until the VAA for (chain, emitter, sequence)
    /// is served or the attempt budget runs out.
    pub async fn poll_signed_vaa(
        &self,
        chain_id: u16,
        emitter: &str,
        sequence: u64,
    ) -> VaaPollResult {
        poll_until_signed(|_| self.fetch_signed_vaa(chain_id, emitter, sequence)).await
    }
}

/// Fixed-interval poll loop: at most [`MAX_POLL_ATTEMPTS`] fetches, one
/// second apart, stopping on the first success. Per-attempt errors are
/// expected ("not yet available") and swallowed; only the first one is
/// logged with its detail.
pub async fn poll_until_signed<F, Fut>(mut fetch: F) -> VaaPollResult
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = eyre::Result<Vec<u8>>>,
{
    for attempt in 0..MAX_POLL_ATTEMPTS {
        match fetch(attempt).await {
            Ok(vaa) => return VaaPollResult::Signed(vaa),
            Err(err) if attempt == 0 => warn!(%err, "signed vaa not yet available"),
            Err(_) => debug!(attempt, "signed vaa not yet available"),
        }
        tokio::time::sleep(POLL_DELAY).await;
    }
    VaaPollResult::Exhausted {
        attempts: MAX_POLL_ATTEMPTS,
    }
}

/// Wormhole emitter encoding for EVM chains: the 20-byte address
/// left-padded to 32 bytes, as lowercase hex without a prefix.
pub fn emitter_address_hex(address: Address) -> String {
    let mut padded = [0u8; 32];
    padded[12..].copy_from_slice(address.as_slice());
    hex::encode(padded)
}
