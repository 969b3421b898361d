//! Token handshake and status fetch over the device HTTP API.

use reqwest::{Client, StatusCode};
use serde_json::{Map, Value};
use tracing::{debug, error, info};

use crate::config::ClientConfig;
use crate::error::DeviceError;
use crate::protocol::response::{parse_status_body, parse_token_response};
use crate::protocol::{CONNECT_PATH, STATUS_PATH};

/// HTTP session against one device.
///
/// Holds no token itself; the caller owns the cached credential.
pub struct AuthSession {
    host: String,
    base_url: String,
    client: Client,
}

impl AuthSession {
    pub fn new(host: &str, config: &ClientConfig) -> Result<Self, DeviceError> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| DeviceError::protocol(host, format!("HTTP client error: {}", e)))?;

        Ok(Self {
            host: host.to_string(),
            base_url: format!("http://{}:{}", host, config.api_port),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Two-phase handshake: request a token, then post it back and check the echo.
    pub async fn acquire_token(&self) -> Result<String, DeviceError> {
        let url = self.url(CONNECT_PATH);

        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(e, "token request"))?;
        let body = self.read_connect_body(response).await?;
        let token = parse_token_response(&body, &self.host).map_err(|e| {
            error!("Failed to connect to {}: {}", self.host, e);
            e
        })?;

        debug!("Received token from {}, validating", self.host);

        let response = self
            .client
            .post(&url)
            .form(&[("token", token.as_str())])
            .send()
            .await
            .map_err(|e| self.transport_error(e, "token validation"))?;
        let body = self.read_connect_body(response).await?;
        let echoed = parse_token_response(&body, &self.host)?;

        if echoed != token {
            error!("Token validation failed for {}", self.host);
            return Err(DeviceError::auth_required(
                &self.host,
                "device did not confirm the token",
            ));
        }

        info!("Successfully connected to {}", self.host);
        Ok(token)
    }

    /// Fetch the raw status object.
    ///
    /// The token is attached as a query parameter by the HTTP client and never
    /// formatted into the URL string.
    pub async fn fetch_status(&self, token: &str) -> Result<Map<String, Value>, DeviceError> {
        let response = self
            .client
            .get(self.url(STATUS_PATH))
            .query(&[("token", token)])
            .send()
            .await
            .map_err(|e| self.transport_error(e, "status request"))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            error!("Status API on {} rejected the token", self.host);
            return Err(DeviceError::auth_required(&self.host, "HTTP 401 from status API"));
        }
        if !status.is_success() {
            error!("Status API on {} returned HTTP {}", self.host, status);
            return Err(DeviceError::protocol(&self.host, format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e, "status body"))?;

        parse_status_body(&body, &self.host).map_err(|e| {
            error!("{}", e);
            e
        })
    }

    async fn read_connect_body(&self, response: reqwest::Response) -> Result<String, DeviceError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(DeviceError::auth_required(
                &self.host,
                format!("connect returned HTTP {}", status),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| self.transport_error(e, "token response"))
    }

    /// Classify a transport failure. The URL is dropped so query tokens stay out of messages.
    fn transport_error(&self, e: reqwest::Error, stage: &str) -> DeviceError {
        let e = e.without_url();
        if e.is_timeout() {
            DeviceError::timeout(&self.host, stage)
        } else if e.is_connect() {
            DeviceError::unreachable(&self.host, format!("{} failed: {}", stage, e))
        } else {
            DeviceError::protocol(&self.host, format!("{} failed: {}", stage, e))
        }
    }
}
