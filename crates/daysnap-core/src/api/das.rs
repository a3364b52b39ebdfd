//! Digital asset reads over the Solana DAS JSON-RPC API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use solana_pubkey::Pubkey;
use tracing::debug;

use crate::models::{AssetCreator, DigitalAsset};
use crate::snapshot::AssetReader;

use super::http::{parse_json, send_with_retry, REQUEST_TIMEOUT_SECS};
use super::ApiError;

/// Largest page the DAS API hands out
const PAGE_LIMIT: u32 = 1000;

/// Request id; responses are matched by call, not by id
const REQUEST_ID: &str = "daysnap";

#[derive(Debug, Serialize)]
struct RpcRequest<'a, P> {
    jsonrpc: &'static str,
    id: &'static str,
    method: &'a str,
    params: P,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AssetsByCreatorParams<'a> {
    creator_address: &'a str,
    only_verified: bool,
    page: u32,
    limit: u32,
}

#[derive(Debug, Serialize)]
struct AssetParams<'a> {
    id: &'a str,
}

#[derive(Debug, Deserialize)]
struct AssetPage {
    #[serde(default)]
    items: Vec<DasAsset>,
}

#[derive(Debug, Deserialize)]
struct DasAsset {
    id: String,
    #[serde(default)]
    content: Option<DasContent>,
    #[serde(default)]
    creators: Vec<AssetCreator>,
}

#[derive(Debug, Default, Deserialize)]
struct DasContent {
    #[serde(default)]
    json_uri: String,
    #[serde(default)]
    metadata: DasMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct DasMetadata {
    #[serde(default)]
    name: String,
    #[serde(default)]
    symbol: String,
}

impl DasAsset {
    fn into_asset(self) -> DigitalAsset {
        let content = self.content.unwrap_or_default();
        DigitalAsset {
            id: self.id,
            name: content.metadata.name,
            symbol: content.metadata.symbol,
            uri: content.json_uri,
            creators: self.creators,
        }
    }
}

/// DAS API client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct DasClient {
    client: Client,
    rpc_url: String,
}

impl DasClient {
    pub fn new(rpc_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            rpc_url: rpc_url.into(),
        })
    }

    async fn call<P: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<T, ApiError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: REQUEST_ID,
            method,
            params,
        };
        let response = send_with_retry(&self.rpc_url, || {
            Ok(self.client.post(&self.rpc_url).json(&request))
        })
        .await?;

        let reply: RpcResponse<T> = parse_json(response, method).await?;
        unwrap_reply(reply)
    }

    /// Every asset with a verified creator entry for `creator`.
    pub async fn fetch_assets_by_creator(&self, creator: &Pubkey) -> Result<Vec<DigitalAsset>, ApiError> {
        let creator = creator.to_string();
        let mut assets = Vec::new();
        let mut page = 1;

        loop {
            let params = AssetsByCreatorParams {
                creator_address: &creator,
                only_verified: true,
                page,
                limit: PAGE_LIMIT,
            };
            let result: AssetPage = self.call("getAssetsByCreator", params).await?;
            let count = result.items.len();
            debug!(page = page, count = count, "Fetched asset page");
            assets.extend(result.items.into_iter().map(DasAsset::into_asset));

            if count < PAGE_LIMIT as usize {
                break;
            }
            page += 1;
        }

        Ok(assets)
    }

    pub async fn fetch_asset(&self, id: &str) -> Result<DigitalAsset, ApiError> {
        let asset: DasAsset = self.call("getAsset", AssetParams { id }).await?;
        Ok(asset.into_asset())
    }
}

fn unwrap_reply<T>(reply: RpcResponse<T>) -> Result<T, ApiError> {
    if let Some(error) = reply.error {
        return Err(ApiError::Rpc {
            code: error.code,
            message: error.message,
        });
    }
    reply
        .result
        .ok_or_else(|| ApiError::InvalidResponse("RPC reply has neither result nor error".to_string()))
}

#[async_trait]
impl AssetReader for DasClient {
    async fn fetch_assets_by_creator(&self, creator: &Pubkey) -> Result<Vec<DigitalAsset>, ApiError> {
        DasClient::fetch_assets_by_creator(self, creator).await
    }

    async fn fetch_asset(&self, id: &str) -> Result<DigitalAsset, ApiError> {
        DasClient::fetch_asset(self, id).await
    }
}
