//! Transport layer for RPC communication

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::SdkError;

/// Transport trait for RPC communication (object-safe)
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send an RPC request and get JSON response
    async fn request_json(&self, method: &str, params: Vec<Value>) -> Result<Value, SdkError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn request_json(&self, method: &str, params: Vec<Value>) -> Result<Value, SdkError> {
        (**self).request_json(method, params).await
    }
}

/// Helper to deserialize response
pub fn deserialize_response<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, SdkError> {
    serde_json::from_value(value).map_err(|e| SdkError::MalformedResponse(e.to_string()))
}

/// Mock transport for testing
///
/// Lookup order per request: scripted queue for the method, fixed response,
/// default response. Every request is recorded.
pub struct MockTransport {
    scripted: Mutex<HashMap<String, VecDeque<Result<Value, SdkError>>>>,
    responses: Mutex<HashMap<String, Value>>,
    default_responses: HashMap<String, Value>,
    calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        let mut defaults = HashMap::new();

        defaults.insert(
            "mazze_getStatus".to_string(),
            serde_json::json!({
                "chainId": "0x1",
                "networkId": "0x1",
                "epochNumber": "0x100",
                "blockNumber": "0x200",
                "pendingTxNumber": "0x0",
                "latestCheckpoint": "0xc0",
                "latestConfirmed": "0xf0",
                "latestState": "0xfb",
                "latestFinalized": "0xb0",
            }),
        );
        defaults.insert("mazze_gasPrice".to_string(), Value::String("0x3b9aca00".to_string())); // 1 gdrip
        defaults.insert("mazze_epochNumber".to_string(), Value::String("0x100".to_string()));
        defaults.insert("mazze_getBalance".to_string(), Value::String("0xde0b6b3a7640000".to_string()));
        defaults.insert("mazze_getNextNonce".to_string(), Value::String("0x0".to_string()));
        defaults.insert("mazze_maxPriorityFeePerGas".to_string(), Value::String("0x1".to_string()));
        defaults.insert(
            "mazze_estimateGasAndCollateral".to_string(),
            serde_json::json!({
                "gasUsed": "0x5208",
                "gasLimit": "0x6d60",
                "storageCollateralized": "0x0",
            }),
        );
        defaults.insert("mazze_getBlockByEpochNumber".to_string(), Value::Null);
        defaults.insert(
            "mazze_sendRawTransaction".to_string(),
            Value::String(
                "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b".to_string(),
            ),
        );
        defaults.insert("mazze_call".to_string(), Value::String("0x".to_string()));
        defaults.insert("mazze_getCode".to_string(), Value::String("0x".to_string()));
        defaults.insert("mazze_getLogs".to_string(), Value::Array(Vec::new()));

        Self {
            scripted: Mutex::new(HashMap::new()),
            responses: Mutex::new(HashMap::new()),
            default_responses: defaults,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Set a fixed response for a method
    pub fn set_response(&self, method: &str, response: Value) {
        self.responses.lock().insert(method.to_string(), response);
    }

    /// Queue a one-shot response for a method
    ///
    /// Queued responses are consumed in order before the fixed response applies.
    pub fn push_response(&self, method: &str, response: Value) {
        self.push_result(method, Ok(response));
    }

    /// Queue a one-shot error for a method
    pub fn push_error(&self, method: &str, error: SdkError) {
        self.push_result(method, Err(error));
    }

    fn push_result(&self, method: &str, result: Result<Value, SdkError>) {
        self.scripted
            .lock()
            .entry(method.to_string())
            .or_default()
            .push_back(result);
    }

    /// Clear fixed and queued responses
    pub fn clear_responses(&self) {
        self.responses.lock().clear();
        self.scripted.lock().clear();
    }

    /// Number of requests made for a method
    pub fn call_count(&self, method: &str) -> usize {
        self.calls.lock().iter().filter(|(m, _)| m == method).count()
    }

    /// Parameters of every request made for a method, oldest first
    pub fn requests(&self, method: &str) -> Vec<Vec<Value>> {
        self.calls
            .lock()
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params.clone())
            .collect()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request_json(&self, method: &str, params: Vec<Value>) -> Result<Value, SdkError> {
        self.calls.lock().push((method.to_string(), params));

        let scripted = self
            .scripted
            .lock()
            .get_mut(method)
            .and_then(|queue| queue.pop_front());
        if let Some(result) = scripted {
            return result;
        }

        if let Some(response) = self.responses.lock().get(method).cloned() {
            return Ok(response);
        }

        if let Some(response) = self.default_responses.get(method) {
            return Ok(response.clone());
        }

        Err(SdkError::RemoteRpc {
            code: -32601,
            message: format!("Method not found: {}", method),
        })
    }
}

/// HTTP transport for real RPC communication
#[cfg(feature = "http")]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    request_id: std::sync::atomic::AtomicU64,
}

#[cfg(feature = "http")]
impl HttpTransport {
    /// Create a new HTTP transport
    pub fn new(url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
            request_id: std::sync::atomic::AtomicU64::new(1),
        }
    }

    /// Endpoint URL
    pub fn url(&self) -> &str {
        &self.url
    }

    fn next_id(&self) -> u64 {
        self.request_id
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl Transport for HttpTransport {
    async fn request_json(&self, method: &str, params: Vec<Value>) -> Result<Value, SdkError> {
        let id = self.next_id();
        tracing::debug!(method, id, "rpc request");

        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SdkError::Transport(e.to_string()))?;

        let response: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| SdkError::MalformedResponse(e.to_string()))?;

        if let Some(error) = response.error {
            return Err(SdkError::RemoteRpc {
                code: error.code,
                message: error.message,
            });
        }

        // A JSON `null` result is a valid answer ("not found yet")
        Ok(response.result.unwrap_or(Value::Null))
    }
}

#[cfg(feature = "http")]
#[derive(serde::Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    error: Option<JsonRpcError>,
}

#[cfg(feature = "http")]
#[derive(serde::Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}
