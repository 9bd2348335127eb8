//! # Bridge Hub JSON-RPC Client
//!
//! Blocking HTTP JSON-RPC implementation of [`ChainRpc`] against a bridge hub
//! node. Three node methods are enough:
//!
//! - `chain_getFinalizedHead` + `chain_getHeader` for the finalized number,
//!   and `chain_getHeader` without a hash for the best number.
//! - `state_getStorage` on `<FinalityPallet>.BestFinalized`. The item is
//!   only written by a successful initialization, so presence means the
//!   bridge is initialized on this side.
//! - `state_getStorage` on `System.Account(who)` for the free balance.
//!
//! Storage is always read at the finalized head hash. Without a block hash
//! the node answers from its best block, which a reorg can still undo.
//!
//! ## Retry
//!
//! None here. Transport failures map to
//! [`CollaboratorError::Unavailable`] and the sequencer's retry policy
//! decides what happens next.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parity_scale_codec::Decode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;
use xcb_core::{ChainEndpoint, SideConfig, SovereignAccount};
use xcb_state::{ChainRpc, CollaboratorError};

use crate::error::ClientError;
use crate::storage_key::{storage_value_key, system_account_key, BEST_FINALIZED};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct Header {
    number: String,
}

/// JSON-RPC client for one bridge hub.
#[derive(Debug)]
pub struct HttpChainRpc {
    name: String,
    endpoint: Url,
    client: reqwest::blocking::Client,
    finality_pallet: String,
    next_id: AtomicU64,
}

impl HttpChainRpc {
    /// Client for the node at `endpoint`, reading bridge state from
    /// `finality_pallet`.
    pub fn new(
        name: impl Into<String>,
        endpoint: &ChainEndpoint,
        finality_pallet: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let raw = endpoint.url();
        let url = Url::parse(&raw).map_err(|e| ClientError::InvalidEndpoint {
            url: raw.clone(),
            reason: e.to_string(),
        })?;
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Http {
                endpoint: raw,
                source: e,
            })?;
        Ok(Self {
            name: name.into(),
            endpoint: url,
            client,
            finality_pallet: finality_pallet.into(),
            next_id: AtomicU64::new(1),
        })
    }

    /// Client for the bridge hub of one side of the bridge.
    pub fn from_side(side: &SideConfig, timeout: Duration) -> Result<Self, ClientError> {
        Self::new(
            format!("bridge-hub-{}", side.name),
            &side.bridge_hub.endpoint(),
            side.finality_pallet.clone(),
            timeout,
        )
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, ClientError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });
        tracing::debug!(node = %self.name, method, id, "json-rpc request");

        let endpoint = self.endpoint.to_string();
        let resp = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .map_err(|e| ClientError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(ClientError::Status {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }

        let decoded: RpcResponse = resp.json().map_err(|e| ClientError::Decode {
            endpoint: endpoint.clone(),
            method: method.to_string(),
            reason: e.to_string(),
        })?;
        if let Some(err) = decoded.error {
            return Err(ClientError::Rpc {
                endpoint,
                method: method.to_string(),
                code: err.code,
                message: err.message,
            });
        }
        serde_json::from_value(decoded.result).map_err(|e| ClientError::Decode {
            endpoint,
            method: method.to_string(),
            reason: e.to_string(),
        })
    }

    fn decode_error(&self, method: &str, reason: impl Into<String>) -> ClientError {
        ClientError::Decode {
            endpoint: self.endpoint.to_string(),
            method: method.to_string(),
            reason: reason.into(),
        }
    }

    /// Hash of the latest finalized block.
    pub fn finalized_head(&self) -> Result<String, ClientError> {
        self.request("chain_getFinalizedHead", json!([]))
    }

    /// Number of the block with the given hash.
    pub fn header_number(&self, hash: &str) -> Result<u32, ClientError> {
        let header: Header = self.request("chain_getHeader", json!([hash]))?;
        parse_block_number(&header.number).map_err(|reason| self.decode_error("chain_getHeader", reason))
    }

    /// Number of the best block.
    pub fn best_header_number(&self) -> Result<u32, ClientError> {
        let header: Header = self.request("chain_getHeader", json!([]))?;
        parse_block_number(&header.number).map_err(|reason| self.decode_error("chain_getHeader", reason))
    }

    /// Raw storage at `key` in block `at`, `None` when the key is unset.
    pub fn storage(&self, key: &[u8], at: &str) -> Result<Option<Vec<u8>>, ClientError> {
        let key = format!("0x{}", hex::encode(key));
        let value: Option<String> = self.request("state_getStorage", json!([key, at]))?;
        value
            .map(|v| decode_hex(&v).map_err(|reason| self.decode_error("state_getStorage", reason)))
            .transpose()
    }

    /// Raw storage at `key` in the finalized state.
    pub fn finalized_storage(&self, key: &[u8]) -> Result<Option<Vec<u8>>, ClientError> {
        let head = self.finalized_head()?;
        self.storage(key, &head)
    }

    fn collab(&self, err: ClientError) -> CollaboratorError {
        err.into_collaborator(&self.name)
    }
}

impl ChainRpc for HttpChainRpc {
    fn name(&self) -> &str {
        &self.name
    }

    fn finalized_number(&self) -> Result<u32, CollaboratorError> {
        let hash = self.finalized_head().map_err(|e| self.collab(e))?;
        self.header_number(&hash).map_err(|e| self.collab(e))
    }

    fn best_number(&self) -> Result<u32, CollaboratorError> {
        self.best_header_number().map_err(|e| self.collab(e))
    }

    fn is_bridge_initialized(&self) -> Result<bool, CollaboratorError> {
        let key = storage_value_key(&self.finality_pallet, BEST_FINALIZED);
        let value = self.finalized_storage(&key).map_err(|e| self.collab(e))?;
        Ok(value.is_some())
    }

    fn free_balance(&self, account: &SovereignAccount) -> Result<u128, CollaboratorError> {
        let Some(raw) = self.finalized_storage(&system_account_key(account)).map_err(|e| self.collab(e))? else {
            return Ok(0);
        };
        decode_free_balance(&raw).map_err(|reason| self.collab(self.decode_error("state_getStorage", reason)))
    }
}

// ─── Response Parsing ───────────────────────────────────────────────

/// Parse a `0x`-prefixed hex block number as returned in headers.
pub(crate) fn parse_block_number(raw: &str) -> Result<u32, String> {
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| format!("block number {raw:?} is not 0x-prefixed"))?;
    u32::from_str_radix(digits, 16).map_err(|e| format!("block number {raw:?}: {e}"))
}

pub(crate) fn decode_hex(raw: &str) -> Result<Vec<u8>, String> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    hex::decode(digits).map_err(|e| format!("storage value {raw:?}: {e}"))
}

/// `AccountInfo` starts with four `u32` counters (nonce, consumers,
/// providers, sufficients) followed by the account data, whose first field
/// is the free balance.
pub(crate) fn decode_free_balance(raw: &[u8]) -> Result<u128, String> {
    let (_nonce, _consumers, _providers, _sufficients, free) =
        <(u32, u32, u32, u32, u128)>::decode(&mut &raw[..]).map_err(|e| format!("AccountInfo: {e}"))?;
    Ok(free)
}
