//! Request/response bridge for untrusted callers.
//!
//! A UI process never talks to [`SecureStorageManager`] directly; it sends
//! named requests with JSON params and gets JSON results back. The bridge:
//!
//! - holds the manager by `Arc` (it never constructs its own),
//! - keeps no decrypted value past the response it returns,
//! - logs method names and error categories only, never params or results,
//! - replaces every storage failure with a generic message and numeric code.
//!
//! | Method                   | Params                      | Result              |
//! |--------------------------|-----------------------------|---------------------|
//! | `provider_token.store`   | `providerId`, `token`       | `null`              |
//! | `provider_token.get`     | `providerId`                | string or `null`    |
//! | `provider_token.delete`  | `providerId`                | bool                |
//! | `config.store`           | `key`, `document`           | `null`              |
//! | `config.get`             | `key`                       | document or `null`  |
//! | `crypto.encrypt`         | `plaintext`                 | envelope string     |
//! | `crypto.decrypt`         | `envelope`                  | string              |
//! | `storage.backend`        | none                        | `"vault"`/`"file"`  |

use std::sync::Arc;

use keyhaven_core::SecretString;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::error::SecretError;
use crate::manager::SecureStorageManager;

/// Errors returned across the bridge. Messages never contain secret values,
/// envelopes, paths or vault diagnostics.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("method not found: {0}")]
    MethodNotFound(String),

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("could not access secure storage")]
    StorageUnavailable,

    #[error("stored data could not be decrypted")]
    Decryption,

    #[error("document could not be processed")]
    InvalidDocument,

    #[error("internal error")]
    Internal,
}

impl BridgeError {
    /// JSON-RPC style error code.
    pub fn code(&self) -> i32 {
        match self {
            Self::MethodNotFound(_) => -32601,
            Self::InvalidParams(_) => -32602,
            Self::StorageUnavailable => -32001,
            Self::Decryption => -32002,
            Self::InvalidDocument => -32003,
            Self::Internal => -32603,
        }
    }
}

impl From<SecretError> for BridgeError {
    fn from(err: SecretError) -> Self {
        match err {
            SecretError::Validation(message) => Self::InvalidParams(message),
            SecretError::Storage(_) => Self::StorageUnavailable,
            SecretError::Decryption(_) => Self::Decryption,
            SecretError::InvalidDocument(_) => Self::InvalidDocument,
            SecretError::Config(_) => Self::Internal,
        }
    }
}

/// A single bridge request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeRequest {
    /// Correlation id, echoed back in the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    pub method: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// Error payload of a [`BridgeResponse`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeFault {
    pub code: i32,
    pub message: String,
}

/// Reply to a [`BridgeRequest`]: exactly one of `result` or `error` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<BridgeFault>,
}

impl BridgeResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Option<Value>, err: &BridgeError) -> Self {
        Self {
            id,
            result: None,
            error: Some(BridgeFault {
                code: err.code(),
                message: err.to_string(),
            }),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ProviderTokenParams {
    provider_id: String,
    token: SecretString,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ProviderIdParams {
    provider_id: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigStoreParams {
    key: String,
    document: Value,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigKeyParams {
    key: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct EncryptParams {
    plaintext: SecretString,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DecryptParams {
    envelope: String,
}

/// Dispatches bridge requests to a shared [`SecureStorageManager`].
#[derive(Debug, Clone)]
pub struct StorageBridge {
    manager: Arc<SecureStorageManager>,
}

impl StorageBridge {
    pub fn new(manager: Arc<SecureStorageManager>) -> Self {
        Self { manager }
    }

    /// Handle a full request and always produce a response.
    pub async fn handle(&self, request: BridgeRequest) -> BridgeResponse {
        match self.call(&request.method, request.params).await {
            Ok(result) => BridgeResponse::success(request.id, result),
            Err(err) => BridgeResponse::failure(request.id, &err),
        }
    }

    /// Invoke `method` with `params`.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, BridgeError> {
        debug!(method, "bridge call");
        let result = self.dispatch(method, params).await;
        if let Err(err) = &result {
            debug!(method, code = err.code(), "bridge call failed");
        }
        result
    }

    async fn dispatch(&self, method: &str, params: Option<Value>) -> Result<Value, BridgeError> {
        match method {
            "provider_token.store" => {
                let p: ProviderTokenParams = parse_params(params, "providerId, token")?;
                self.manager
                    .store_provider_token(&p.provider_id, p.token.expose_secret())
                    .await?;
                Ok(Value::Null)
            }
            "provider_token.get" => {
                let p: ProviderIdParams = parse_params(params, "providerId")?;
                let token = self.manager.get_provider_token(&p.provider_id).await?;
                Ok(token.map_or(Value::Null, |t| Value::String(t.into_inner())))
            }
            "provider_token.delete" => {
                let p: ProviderIdParams = parse_params(params, "providerId")?;
                Ok(Value::Bool(
                    self.manager.delete_provider_token(&p.provider_id).await,
                ))
            }
            "config.store" => {
                let p: ConfigStoreParams = parse_params(params, "key, document")?;
                self.manager
                    .store_encrypted_config(&p.key, &p.document)
                    .await?;
                Ok(Value::Null)
            }
            "config.get" => {
                let p: ConfigKeyParams = parse_params(params, "key")?;
                Ok(self
                    .manager
                    .get_encrypted_config(&p.key)
                    .await?
                    .unwrap_or(Value::Null))
            }
            "crypto.encrypt" => {
                let p: EncryptParams = parse_params(params, "plaintext")?;
                let envelope = self.manager.encrypt_data(p.plaintext.expose_secret()).await?;
                Ok(Value::String(envelope))
            }
            "crypto.decrypt" => {
                let p: DecryptParams = parse_params(params, "envelope")?;
                let plaintext = self.manager.decrypt_data(&p.envelope).await?;
                Ok(Value::String(plaintext.into_inner()))
            }
            "storage.backend" => Ok(Value::String(
                self.manager.backend_kind().as_str().to_string(),
            )),
            other => Err(BridgeError::MethodNotFound(other.to_string())),
        }
    }
}

/// Deserialize params without echoing any of their content in errors.
fn parse_params<T: DeserializeOwned>(
    params: Option<Value>,
    expected: &'static str,
) -> Result<T, BridgeError> {
    let invalid = || BridgeError::InvalidParams(format!("expected {{ {expected} }}"));
    let params = params.ok_or_else(invalid)?;
    serde_json::from_value(params).map_err(|_| invalid())
}
