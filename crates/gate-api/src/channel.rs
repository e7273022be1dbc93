//! # HTTP Backend Channel
//!
//! [`RpcChannel`] over HTTP: `POST {base_url}/{service}/{method}` with a JSON
//! body. The reqwest client carries the per-call timeout; dropping the call
//! future aborts the request.

use async_trait::async_trait;
use gate_core::{BackendReply, RpcChannel, TransportError};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

/// One backend service reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpChannel {
    client: Client,
    base_url: String,
    service: String,
}

impl HttpChannel {
    pub fn new(client: Client, base_url: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            service: service.into(),
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.service, method)
    }

    fn transport_error(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout {
                service: self.service.clone(),
            }
        } else {
            TransportError::Unreachable {
                service: self.service.clone(),
                message: err.to_string(),
            }
        }
    }
}

/// Build the shared backend client
pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder().timeout(timeout).build()
}

#[async_trait]
impl RpcChannel for HttpChannel {
    fn service(&self) -> &str {
        &self.service
    }

    #[instrument(skip(self, request), fields(service = %self.service))]
    async fn invoke(&self, method: &str, request: Value) -> Result<BackendReply, TransportError> {
        let response = self
            .client
            .post(self.endpoint(method))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;

        match serde_json::from_slice::<BackendReply>(&body) {
            Ok(reply) if status.is_success() => Ok(reply),
            // Error statuses still count as business replies when they carry an envelope
            Ok(reply) if reply.error.is_some() => {
                debug!("Backend replied {} with {:?}", status, reply.error);
                Ok(reply)
            }
            Ok(_) => Err(TransportError::Status {
                service: self.service.clone(),
                status: status.as_u16(),
            }),
            Err(_) if !status.is_success() => Err(TransportError::Status {
                service: self.service.clone(),
                status: status.as_u16(),
            }),
            Err(e) => Err(TransportError::Decode {
                service: self.service.clone(),
                message: e.to_string(),
            }),
        }
    }
}
