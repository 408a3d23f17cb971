// ABOUTME: HTTP client for the placement driver's REST API.
// ABOUTME: Tries each pd endpoint in declaration order until one answers.

use super::snapshot::StoresResponse;
use super::{HEALTH_PATH, MemberHealth, MembershipView, PdError, STORES_PATH, StoreInfo};
use crate::meta::Topology;
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper_util::rt::TokioIo;
use std::time::Duration;
use tokio::net::TcpStream;

/// Talks to pd over plain HTTP/1.1.
#[derive(Debug, Clone)]
pub struct PdClient {
    endpoints: Vec<String>,
    timeout: Duration,
}

impl PdClient {
    /// Create a client for `host:port` endpoints.
    pub fn new(endpoints: Vec<String>, timeout: Duration) -> Self {
        Self { endpoints, timeout }
    }

    /// Create a client for every pd instance in the topology.
    pub fn from_topology(topology: &Topology, timeout: Duration) -> Self {
        Self::new(topology.pd_endpoints(), timeout)
    }

    async fn get(&self, path: &str) -> Result<Bytes, PdError> {
        let mut last_error = PdError::NoEndpoints;

        for endpoint in &self.endpoints {
            match tokio::time::timeout(self.timeout, get_once(endpoint, path)).await {
                Ok(Ok(body)) => return Ok(body),
                Ok(Err(e)) => {
                    tracing::debug!(endpoint = %endpoint, path, "pd request failed: {}", e);
                    last_error = e;
                }
                Err(_) => {
                    tracing::debug!(endpoint = %endpoint, path, "pd request timed out");
                    last_error = PdError::Timeout {
                        endpoint: endpoint.clone(),
                        timeout: self.timeout,
                    };
                }
            }
        }

        Err(last_error)
    }
}

async fn get_once(endpoint: &str, path: &str) -> Result<Bytes, PdError> {
    let request_error = |reason: String| PdError::Request {
        endpoint: endpoint.to_string(),
        reason,
    };

    let stream = TcpStream::connect(endpoint)
        .await
        .map_err(|e| request_error(format!("connect failed: {}", e)))?;

    let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
        .await
        .map_err(|e| request_error(format!("HTTP handshake failed: {}", e)))?;

    let conn_endpoint = endpoint.to_string();
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::debug!(endpoint = %conn_endpoint, "pd connection error: {}", e);
        }
    });

    let req = hyper::Request::builder()
        .method("GET")
        .uri(path)
        .header("Host", endpoint)
        .body(Empty::<Bytes>::new())
        .map_err(|e| request_error(format!("failed to build request: {}", e)))?;

    let resp = sender
        .send_request(req)
        .await
        .map_err(|e| request_error(e.to_string()))?;

    let status = resp.status();
    let body = resp
        .into_body()
        .collect()
        .await
        .map_err(|e| request_error(format!("failed to read response: {}", e)))?
        .to_bytes();

    if !status.is_success() {
        return Err(PdError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body: String::from_utf8_lossy(&body).trim().to_string(),
        });
    }

    Ok(body)
}

#[async_trait]
impl MembershipView for PdClient {
    async fn stores(&self) -> Result<Vec<StoreInfo>, PdError> {
        let body = self.get(STORES_PATH).await?;
        let response: StoresResponse = serde_json::from_slice(&body)?;
        Ok(response.stores.into_iter().map(|entry| entry.store).collect())
    }

    async fn health(&self) -> Result<Vec<MemberHealth>, PdError> {
        let body = self.get(HEALTH_PATH).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
