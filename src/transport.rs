//! HTTP plumbing shared by the peer and tracker clients.
//!
//! Requests carry JSON bodies and a per-request timeout. Nothing is retried here: a
//! failed call is surfaced to the caller, which decides whether to try again (the
//! stabilizer simply waits for its next round).

use crate::error::{Result, RingError};
use reqwest::Response;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Body of every non-2xx answer from a peer or the tracker.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    http_client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            timeout,
        }
    }

    pub async fn post<B: Serialize>(
        &self,
        addr: SocketAddr,
        path: &str,
        payload: &B,
    ) -> Result<Response> {
        let response = self
            .http_client
            .post(url(addr, path))
            .json(payload)
            .timeout(self.timeout)
            .send()
            .await?;
        Ok(response)
    }

    pub async fn post_empty(&self, addr: SocketAddr, path: &str) -> Result<Response> {
        let response = self
            .http_client
            .post(url(addr, path))
            .timeout(self.timeout)
            .send()
            .await?;
        Ok(response)
    }

    pub async fn get(&self, addr: SocketAddr, path: &str) -> Result<Response> {
        let response = self
            .http_client
            .get(url(addr, path))
            .timeout(self.timeout)
            .send()
            .await?;
        Ok(response)
    }
}

fn url(addr: SocketAddr, path: &str) -> String {
    format!("http://{}{}", addr, path)
}

/// Turns a non-success response into [`RingError::Remote`], keeping the server's message.
pub async fn remote_error(response: Response) -> RingError {
    let status = response.status();
    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    };
    RingError::Remote { status, message }
}
