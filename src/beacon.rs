//! Beacon node client
//!
//! Lists validators through the Prysm JSON gateway
//! (`GET /eth/v1alpha1/validators`). The gateway renders `uint64` fields as
//! strings and `bytes` fields as base64, so both are decoded here.

use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Deserializer};
use std::time::Duration;
use tracing::debug;

/// Length of a compressed BLS12-381 public key
pub const PUBLIC_KEY_LEN: usize = 48;

const LIST_VALIDATORS_PATH: &str = "/eth/v1alpha1/validators";

/// A validator as returned by the listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorRecord {
    pub index: u64,
    pub public_key: [u8; PUBLIC_KEY_LEN],
}

/// One page request against the listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListValidatorsRequest {
    pub page_size: u32,
    /// Restrict the listing to the genesis validator set
    pub genesis: bool,
    pub page_token: Option<String>,
}

/// One page of results plus the continuation token
#[derive(Debug, Clone, Default)]
pub struct ValidatorPage {
    pub records: Vec<ValidatorRecord>,
    /// Empty when this was the last page
    pub next_page_token: String,
}

/// Anything that can serve paged validator listings
#[async_trait]
pub trait ValidatorSource: Send + Sync {
    async fn list_validators(&self, req: &ListValidatorsRequest) -> SyncResult<ValidatorPage>;
}

#[derive(Debug, Deserialize)]
struct ListValidatorsResponse {
    #[serde(default)]
    validator_list: Vec<ValidatorContainer>,
    #[serde(default)]
    next_page_token: String,
}

#[derive(Debug, Deserialize)]
struct ValidatorContainer {
    #[serde(deserialize_with = "u64_from_str_or_num")]
    index: u64,
    validator: ValidatorBody,
}

#[derive(Debug, Deserialize)]
struct ValidatorBody {
    public_key: String,
}

fn u64_from_str_or_num<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StrOrNum {
        Str(String),
        Num(u64),
    }

    match StrOrNum::deserialize(deserializer)? {
        StrOrNum::Num(n) => Ok(n),
        StrOrNum::Str(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

/// Decode a public key rendered as base64 (gateway default) or 0x-hex
pub fn decode_public_key(encoded: &str) -> SyncResult<[u8; PUBLIC_KEY_LEN]> {
    let bytes = if let Some(stripped) = encoded.strip_prefix("0x") {
        hex::decode(stripped)
            .map_err(|e| SyncError::Transport(format!("Invalid hex public key: {}", e)))?
    } else {
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| SyncError::Transport(format!("Invalid base64 public key: {}", e)))?
    };

    bytes.as_slice().try_into().map_err(|_| {
        SyncError::Transport(format!(
            "Public key has {} bytes, expected {}",
            bytes.len(),
            PUBLIC_KEY_LEN
        ))
    })
}

/// HTTP client for a beacon node's JSON gateway
pub struct BeaconClient {
    base_url: String,
    client: reqwest::Client,
}

impl BeaconClient {
    pub fn new(base_url: &str, timeout: Duration) -> SyncResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ValidatorSource for BeaconClient {
    async fn list_validators(&self, req: &ListValidatorsRequest) -> SyncResult<ValidatorPage> {
        let mut query: Vec<(&str, String)> = vec![
            ("genesis", req.genesis.to_string()),
            ("page_size", req.page_size.to_string()),
        ];
        if let Some(token) = &req.page_token {
            query.push(("page_token", token.clone()));
        }

        let resp = self
            .client
            .get(format!("{}{}", self.base_url, LIST_VALIDATORS_PATH))
            .query(&query)
            .send()
            .await
            .map_err(|e| SyncError::Transport(format!("Failed to reach beacon node: {}", e)))?;

        if !resp.status().is_success() {
            return Err(SyncError::Transport(format!(
                "Beacon node returned error: {}",
                resp.status()
            )));
        }

        let body: ListValidatorsResponse = resp
            .json()
            .await
            .map_err(|e| SyncError::Transport(format!("Failed to parse validator list: {}", e)))?;

        let records = body
            .validator_list
            .into_iter()
            .map(|v| {
                Ok(ValidatorRecord {
                    index: v.index,
                    public_key: decode_public_key(&v.validator.public_key)?,
                })
            })
            .collect::<SyncResult<Vec<_>>>()?;

        debug!(
            "Beacon node returned {} validators (next token: {:?})",
            records.len(),
            body.next_page_token
        );

        Ok(ValidatorPage {
            records,
            next_page_token: body.next_page_token,
        })
    }
}
