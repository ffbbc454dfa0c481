use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde_json::Value;

use crate::errors::NetworkError;

/// GETs a JSON document. Sources only ever see this seam, never `reqwest` itself.
#[async_trait]
pub trait NetworkClient: Send + Sync {
    async fn get_json(&self, url: &str, headers: &[(&str, &str)]) -> Result<Value, NetworkError>;
}

pub struct ReqwestNetworkClient {
    client: reqwest::Client,
}

impl ReqwestNetworkClient {
    pub fn new(timeout_seconds: u64) -> Result<ReqwestNetworkClient, NetworkError> {
        if !(2..=16).contains(&timeout_seconds) {
            return Err(NetworkError::InvalidTimeout(timeout_seconds));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|error| NetworkError::Transport {
                url: String::new(),
                cause: error.to_string(),
            })?;

        Ok(ReqwestNetworkClient { client })
    }
}

#[async_trait]
impl NetworkClient for ReqwestNetworkClient {
    async fn get_json(&self, url: &str, headers: &[(&str, &str)]) -> Result<Value, NetworkError> {
        debug!("GET {}", url);

        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await.map_err(|error| NetworkError::Transport {
            url: url.to_string(),
            cause: error.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<Value>().await.map_err(|error| NetworkError::Decode {
            url: url.to_string(),
            cause: error.to_string(),
        })
    }
}
