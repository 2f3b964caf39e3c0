use async_trait::async_trait;
use serde_json::Value;

use lockdrop_core::claims::{ClaimReceipt, ClaimRecord};
use lockdrop_core::error::LockdropError;
use lockdrop_core::ports::LedgerClient;
use lockdrop_core::types::{ClaimId, LockParameter};

/// JSON-RPC 2.0 client for the destination ledger's lockdrop module.
///
/// Raw HTTP POST with serde_json; one request per call, no retries.
pub struct RpcLedgerClient {
    url: String,
    client: reqwest::Client,
}

impl RpcLedgerClient {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Call a JSON-RPC method and return the `result` field.
    async fn call(&self, method: &str, params: Value) -> Result<Value, LockdropError> {
        let body = request_body(method, params);

        let resp = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                LockdropError::Ledger(format!("connecting to node at {}: {e}", self.url))
            })?;

        let json: Value = resp
            .json()
            .await
            .map_err(|e| LockdropError::Ledger(format!("parsing RPC response: {e}")))?;

        if let Some(err) = json.get("error") {
            return Err(LockdropError::Ledger(format!("RPC error: {err}")));
        }

        Ok(json["result"].clone())
    }
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    async fn submit_claim(
        &self,
        param: &LockParameter,
        nonce: u64,
    ) -> Result<ClaimReceipt, LockdropError> {
        let lock = serde_json::to_value(param)
            .map_err(|e| LockdropError::Serialization(e.to_string()))?;
        let result = self
            .call("plasmLockdrop_request", serde_json::json!([lock, nonce]))
            .await?;

        let transaction_hash = result
            .as_str()
            .ok_or_else(|| {
                LockdropError::Ledger("expected transaction hash from request".into())
            })?
            .to_string();
        Ok(ClaimReceipt { transaction_hash })
    }

    async fn get_claim_record(&self, id: &ClaimId) -> Result<Option<ClaimRecord>, LockdropError> {
        let result = self
            .call("plasmLockdrop_claims", serde_json::json!([format!("0x{id}")]))
            .await?;
        parse_claim_record(result)
    }
}

fn request_body(method: &str, params: Value) -> Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
        "id": 1
    })
}

/// `null` means the ledger has never seen the claim.
fn parse_claim_record(result: Value) -> Result<Option<ClaimRecord>, LockdropError> {
    if result.is_null() {
        return Ok(None);
    }
    serde_json::from_value(result)
        .map(Some)
        .map_err(|e| LockdropError::Ledger(format!("parsing claim record: {e}")))
}
