//! JSON-RPC client and the `ChainClient` seam.

use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;

use alloy::{
    eips::BlockNumberOrTag,
    network::Ethereum,
    primitives::{Address, Bytes},
    providers::{Provider, RootProvider},
    rpc::{
        client::RpcClient,
        types::{Block, TransactionRequest},
    },
    sol_types::{decode_revert_reason, SolCall},
    transports::{
        http::{reqwest, Http},
        TransportError, TransportResult,
    },
};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::OnceCell;

use crate::error::{AppError, Result};

/// Type alias for the HTTP provider.
pub type HttpProvider = RootProvider<Ethereum>;

/// Idle connections kept per host in the shared pool.
const POOL_MAX_IDLE_PER_HOST: usize = 32;

/// Summary of the latest block header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSummary {
    pub number: u64,
    pub timestamp: u64,
    /// PoA chains (Polygon PoS) carry validator data here, well past 32 bytes.
    pub extra_data_len: usize,
}

impl From<&Block> for BlockSummary {
    // extraData is decoded as opaque bytes of any length, so PoA headers parse as-is.
    fn from(block: &Block) -> Self {
        Self {
            number: block.header.number,
            timestamp: block.header.timestamp,
            extra_data_len: block.header.extra_data.len(),
        }
    }
}

/// Read-only access to an EVM chain.
///
/// Implementations must be safe for concurrent use; the services share one
/// instance across every in-flight request.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Execute `eth_call` against `to` with ABI-encoded `data` at the latest block.
    async fn eth_call(&self, to: Address, data: Bytes) -> Result<Bytes>;

    /// Latest block number.
    async fn block_number(&self) -> Result<u64>;

    /// Chain ID of the endpoint.
    async fn chain_id(&self) -> Result<u64>;

    /// Header summary of the latest block.
    async fn latest_block(&self) -> Result<BlockSummary>;

    /// Whether the endpoint answers at all.
    async fn is_connected(&self) -> bool {
        self.block_number().await.is_ok()
    }
}

/// Call a view function and decode its return value.
pub async fn call_contract<C>(client: &dyn ChainClient, to: Address, call: &C) -> Result<C::Return>
where
    C: SolCall + Sync,
{
    let data = client.eth_call(to, Bytes::from(call.abi_encode())).await?;

    C::abi_decode_returns(&data)
        .map_err(|e| AppError::Decode(format!("{} returned by {}: {}", C::SIGNATURE, to, e)))
}

/// HTTP JSON-RPC client with lazy chain ID lookup.
#[derive(Clone)]
pub struct EthereumClient {
    /// The underlying provider.
    provider: Arc<HttpProvider>,
    /// Full endpoint URL, kept only to scrub it from error messages.
    rpc_url: Arc<SecretString>,
    /// Endpoint host, safe to log.
    endpoint: String,
    /// Per-call deadline.
    rpc_timeout: Duration,
    /// Lazily initialized chain ID.
    chain_id: Arc<OnceCell<u64>>,
}

impl EthereumClient {
    /// Create a new client.
    ///
    /// Note: This does NOT make any network calls. The connection is
    /// established lazily when the first operation is performed.
    pub fn new(rpc_url: &SecretString, rpc_timeout: Duration) -> Result<Self> {
        let url: reqwest::Url = rpc_url
            .expose_secret()
            .parse()
            .map_err(|_| AppError::Config("Invalid RPC URL".into()))?;

        let endpoint = url.host_str().unwrap_or("unknown").to_string();

        // Must be alloy's reqwest re-export; its transport only accepts that client.
        let http = reqwest::Client::builder()
            .timeout(rpc_timeout)
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let client = RpcClient::new(Http::with_client(http, url), false);
        let provider = RootProvider::<Ethereum>::new(client);

        tracing::info!(endpoint = %endpoint, "RPC client created (lazy initialization)");

        Ok(Self {
            provider: Arc::new(provider),
            rpc_url: Arc::new(SecretString::from(rpc_url.expose_secret().to_string())),
            endpoint,
            rpc_timeout,
            chain_id: Arc::new(OnceCell::new()),
        })
    }

    /// Endpoint host, safe for logs.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn with_deadline<T, F>(&self, method: &str, fut: F) -> Result<T>
    where
        F: Future<Output = TransportResult<T>>,
    {
        match tokio::time::timeout(self.rpc_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                Err(classify_error(err, self.rpc_url.expose_secret(), &self.endpoint))
            }
            Err(_) => Err(AppError::Rpc(format!(
                "{} to {} timed out after {:?}",
                method, self.endpoint, self.rpc_timeout
            ))),
        }
    }
}

#[async_trait]
impl ChainClient for EthereumClient {
    async fn eth_call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let tx = TransactionRequest::default().to(to).input(data.into());
        self.with_deadline("eth_call", self.provider.call(tx).into_future()).await
    }

    async fn block_number(&self) -> Result<u64> {
        self.with_deadline("eth_blockNumber", self.provider.get_block_number().into_future())
            .await
    }

    async fn chain_id(&self) -> Result<u64> {
        self.chain_id
            .get_or_try_init(|| async {
                let chain_id = self
                    .with_deadline("eth_chainId", self.provider.get_chain_id().into_future())
                    .await?;
                tracing::info!(chain_id = chain_id, endpoint = %self.endpoint, "Connected to node");
                Ok(chain_id)
            })
            .await
            .copied()
    }

    async fn latest_block(&self) -> Result<BlockSummary> {
        let block = self
            .with_deadline(
                "eth_getBlockByNumber",
                self.provider.get_block_by_number(BlockNumberOrTag::Latest).into_future(),
            )
            .await?
            .ok_or_else(|| AppError::Rpc("Failed to get latest block".into()))?;

        Ok(BlockSummary::from(&block))
    }
}

impl std::fmt::Debug for EthereumClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EthereumClient")
            .field("endpoint", &self.endpoint)
            .field("rpc_timeout", &self.rpc_timeout)
            .finish()
    }
}

/// Map a transport failure to `ContractRevert` or a scrubbed `Rpc` error.
fn classify_error(err: TransportError, rpc_url: &str, endpoint: &str) -> AppError {
    if let Some(payload) = err.as_error_resp() {
        if let Some(data) = payload.as_revert_data() {
            let reason =
                decode_revert_reason(&data).unwrap_or_else(|| alloy::primitives::hex::encode_prefixed(&data));
            return AppError::ContractRevert(reason);
        }
        if payload.message.contains("revert") {
            return AppError::ContractRevert(payload.message.to_string());
        }
    }

    AppError::Rpc(redact(&err.to_string(), rpc_url, endpoint))
}

/// Replace the full endpoint URL (which may embed an API key) with its host.
fn redact(message: &str, rpc_url: &str, endpoint: &str) -> String {
    if rpc_url.is_empty() {
        return message.to_string();
    }
    let scrubbed = message.replace(rpc_url, endpoint);
    // reqwest may render the URL with a trailing slash
    let trimmed = rpc_url.trim_end_matches('/');
    if trimmed.is_empty() {
        scrubbed
    } else {
        scrubbed.replace(trimmed, endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::rpc::json_rpc::ErrorPayload;
    use alloy::sol_types::{Revert, SolError};

    const SECRET_URL: &str = "https://polygon-mainnet.g.alchemy.com/v2/SECRETKEY";

    fn error_resp(json: &str) -> TransportError {
        let payload: ErrorPayload = serde_json::from_str(json).unwrap();
        TransportError::ErrorResp(payload)
    }

    /// Polygon PoS header: 32 bytes of vanity plus a 65-byte validator seal.
    const POLYGON_BLOCK_JSON: &str = r#"{
        "baseFeePerGas": "0x1d",
        "difficulty": "0x16",
        "extraData": "0xd78301000683626f7288676f312e32322e36856c696e75780000000000000000ababababababababababababababababababababababababababababababababababababababababababababababababababababababababababababababababab",
        "gasLimit": "0x1c9c380",
        "gasUsed": "0x10e2c1f",
        "hash": "0x7c2f6e4c2f6a4bf5f1d5c2b9c6a3d0e9a8b7c6d5e4f3a2b1c0d9e8f7a6b5c4d3",
        "logsBloom": "0x00000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000",
        "miner": "0x0000000000000000000000000000000000000000",
        "mixHash": "0x0000000000000000000000000000000000000000000000000000000000000000",
        "nonce": "0x0000000000000000",
        "number": "0x3473bc0",
        "parentHash": "0x1a2b3c4d5e6f708192a3b4c5d6e7f8091a2b3c4d5e6f708192a3b4c5d6e7f809",
        "receiptsRoot": "0x2b3c4d5e6f708192a3b4c5d6e7f8091a2b3c4d5e6f708192a3b4c5d6e7f8091a",
        "sha3Uncles": "0x1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347",
        "size": "0x1a2b",
        "stateRoot": "0x3c4d5e6f708192a3b4c5d6e7f8091a2b3c4d5e6f708192a3b4c5d6e7f8091a2b",
        "timestamp": "0x6553f100",
        "totalDifficulty": "0x2c4b5a1",
        "transactions": [],
        "transactionsRoot": "0x56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421",
        "uncles": []
    }"#;

    #[test]
    fn test_polygon_header_with_long_extra_data_parses() {
        let block: Block = serde_json::from_str(POLYGON_BLOCK_JSON).unwrap();
        assert_eq!(block.header.extra_data.len(), 97);

        let summary = BlockSummary::from(&block);
        assert_eq!(summary.number, 0x3473bc0);
        assert_eq!(summary.timestamp, 0x6553f100);
        assert_eq!(summary.extra_data_len, 97);
    }

    #[test]
    fn test_client_creation_is_lazy() {
        let url = SecretString::from(SECRET_URL.to_string());
        let client = EthereumClient::new(&url, Duration::from_secs(5)).unwrap();

        assert_eq!(client.endpoint(), "polygon-mainnet.g.alchemy.com");
        assert!(client.chain_id.get().is_none());
    }

    #[test]
    fn test_invalid_url_does_not_echo_secret() {
        let url = SecretString::from("not a url SECRETKEY".to_string());
        let err = EthereumClient::new(&url, Duration::from_secs(5)).unwrap_err();

        assert!(matches!(err, AppError::Config(_)));
        assert!(!err.to_string().contains("SECRETKEY"));
    }

    #[test]
    fn test_debug_hides_url() {
        let url = SecretString::from(SECRET_URL.to_string());
        let client = EthereumClient::new(&url, Duration::from_secs(5)).unwrap();
        let debug_str = format!("{:?}", client);

        assert!(debug_str.contains("polygon-mainnet.g.alchemy.com"));
        assert!(!debug_str.contains("SECRETKEY"));
    }

    #[test]
    fn test_redact_replaces_full_url() {
        let msg = format!("error sending request for url ({}/)", SECRET_URL);
        let redacted = redact(&msg, SECRET_URL, "polygon-mainnet.g.alchemy.com");

        assert!(!redacted.contains("SECRETKEY"));
        assert!(redacted.contains("polygon-mainnet.g.alchemy.com"));
    }

    #[test]
    fn test_classify_revert_with_reason() {
        let revert = Revert { reason: "UniswapV2Library: INSUFFICIENT_LIQUIDITY".to_string() };
        let data = alloy::primitives::hex::encode_prefixed(revert.abi_encode());
        let err = error_resp(&format!(
            r#"{{"code":3,"message":"execution reverted","data":"{}"}}"#,
            data
        ));

        match classify_error(err, SECRET_URL, "host") {
            AppError::ContractRevert(reason) => {
                assert!(reason.contains("INSUFFICIENT_LIQUIDITY"), "reason: {reason}")
            }
            other => panic!("Expected ContractRevert, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_revert_without_data() {
        let err = error_resp(r#"{"code":-32000,"message":"execution reverted"}"#);
        assert!(matches!(classify_error(err, SECRET_URL, "host"), AppError::ContractRevert(_)));
    }

    #[test]
    fn test_classify_other_error_resp_is_rpc() {
        let err = error_resp(r#"{"code":-32005,"message":"rate limit exceeded"}"#);
        match classify_error(err, SECRET_URL, "host") {
            AppError::Rpc(msg) => assert!(msg.contains("rate limit exceeded")),
            other => panic!("Expected Rpc, got {other:?}"),
        }
    }
}
