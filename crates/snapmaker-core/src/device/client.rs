//! Polling state machine for a single Snapmaker device.

use std::collections::HashSet;

use serde_json::{Map, Value};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use super::reachability::ReachabilityProbe;
use super::session::AuthSession;
use crate::config::ClientConfig;
use crate::discovery::{DiscoveryClient, DiscoveryFailure, DiscoveryOutcome};
use crate::error::DeviceError;
use crate::protocol::response::{strip_sensitive, suspicious_keys};
use crate::status::reconcile;
use crate::types::{DiscoveryRecord, LinkState, Telemetry, TokenUpdate, OFFLINE_STATUS};

/// One polled device.
///
/// `update()` takes `&mut self`, so at most one poll per instance can be in
/// flight.
pub struct SnapmakerDevice {
    host: String,
    config: ClientConfig,
    state: LinkState,
    available: bool,
    model: Option<String>,
    status: String,
    dual_extruder: bool,
    token: Option<String>,
    token_invalid: bool,
    telemetry: Telemetry,
    raw_api_response: Map<String, Value>,
    token_updates: Option<UnboundedSender<TokenUpdate>>,
    /// Last token the host was told about (or restored from storage).
    announced_token: Option<String>,
    warned_tool_heads: HashSet<String>,
}

impl SnapmakerDevice {
    /// Create a device with default timeouts, optionally restoring a persisted token.
    pub fn new(host: impl Into<String>, token: Option<String>) -> Self {
        Self::with_config(host, token, ClientConfig::default())
    }

    pub fn with_config(host: impl Into<String>, token: Option<String>, config: ClientConfig) -> Self {
        let host = host.into();
        Self {
            telemetry: Telemetry::offline(&host, None),
            host,
            config,
            state: LinkState::Uninitialized,
            available: false,
            model: None,
            status: OFFLINE_STATUS.to_string(),
            dual_extruder: false,
            announced_token: token.clone(),
            token,
            token_invalid: false,
            raw_api_response: Map::new(),
            token_updates: None,
            warned_tool_heads: HashSet::new(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn available(&self) -> bool {
        self.available
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn dual_extruder(&self) -> bool {
        self.dual_extruder
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Set when the device rejected the cached token; the host should re-authorize.
    pub fn token_invalid(&self) -> bool {
        self.token_invalid
    }

    /// Latest telemetry; offline markers when the last poll failed.
    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    /// Last status payload with credential keys removed.
    pub fn raw_api_response(&self) -> &Map<String, Value> {
        &self.raw_api_response
    }

    /// Register the channel that receives newly issued tokens.
    pub fn set_token_update_sender(&mut self, sender: UnboundedSender<TokenUpdate>) {
        self.token_updates = Some(sender);
    }

    /// List every device that answers a broadcast on the default port.
    pub async fn discover() -> Vec<DiscoveryRecord> {
        DiscoveryClient::default().discover_all().await
    }

    /// Run one full poll: discovery, reachability, token, status.
    ///
    /// On `Err` the device has already been moved to the offline state.
    pub async fn update(&mut self) -> Result<Telemetry, DeviceError> {
        match self.poll().await {
            Ok(()) => Ok(self.telemetry.clone()),
            Err(e) => {
                warn!("{} is offline: {}", self.host, e);
                self.set_offline();
                Err(e)
            }
        }
    }

    /// Perform the token handshake and cache the result.
    ///
    /// Used by setup flows; the device must be reachable on the API port.
    pub async fn generate_token(&mut self) -> Result<String, DeviceError> {
        let session = AuthSession::new(&self.host, &self.config)?;
        let token = session.acquire_token().await?;
        self.store_token(token.clone());
        Ok(token)
    }

    async fn poll(&mut self) -> Result<(), DeviceError> {
        let identity = self.check_online().await?;

        let probe = ReachabilityProbe::from_config(&self.config);
        if !probe.is_reachable(&self.host, self.config.api_port).await {
            return Err(DeviceError::unreachable(
                &self.host,
                format!("API port {} refused connections", self.config.api_port),
            ));
        }

        let session = AuthSession::new(&self.host, &self.config)?;

        let token = match self.token.clone() {
            Some(token) => token,
            None => {
                let token = session.acquire_token().await?;
                self.store_token(token.clone());
                token
            }
        };

        let payload = match session.fetch_status(&token).await {
            Ok(payload) => payload,
            Err(e) if e.is_auth() => {
                info!("Token for {} was rejected, clearing it", self.host);
                self.token = None;
                self.token_invalid = true;
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        self.apply_status(&identity, payload);
        Ok(())
    }

    async fn check_online(&mut self) -> Result<DiscoveryRecord, DeviceError> {
        let client = DiscoveryClient::new(self.config.clone());

        match client.check_online(&self.host).await {
            DiscoveryOutcome::Online(record) => {
                debug!("{} answered discovery: {} {}", self.host, record.model, record.status);
                self.available = true;
                self.model = Some(record.model.clone());
                self.status = record.status.clone();
                self.state = LinkState::Online;
                Ok(record)
            }
            DiscoveryOutcome::Offline(DiscoveryFailure::NoReply { .. }) => {
                Err(DeviceError::timeout(&self.host, "discovery"))
            }
            DiscoveryOutcome::Offline(DiscoveryFailure::Socket(reason)) => {
                Err(DeviceError::unreachable(&self.host, reason))
            }
        }
    }

    fn apply_status(&mut self, identity: &DiscoveryRecord, payload: Map<String, Value>) {
        for key in suspicious_keys(&payload) {
            warn!(
                "Status payload from {} contains potentially sensitive key '{}'; it is kept in diagnostics",
                self.host, key
            );
        }

        let reconciled = reconcile(identity, &payload, self.dual_extruder);

        if let Some(raw) = reconciled.unknown_tool_head {
            if self.warned_tool_heads.insert(raw.clone()) {
                warn!("Unknown toolhead '{}' on {}, showing raw identifier", raw, self.host);
            }
        }
        if reconciled.dual_fallback && !self.dual_extruder {
            info!("Detected dual extruder on {} from nozzle fields", self.host);
        }

        self.dual_extruder = reconciled.dual_extruder;
        self.status = reconciled.telemetry.status.clone();
        self.telemetry = reconciled.telemetry;
        self.raw_api_response = strip_sensitive(&payload);
        self.state = LinkState::Authenticated;
    }

    fn store_token(&mut self, token: String) {
        self.token = Some(token.clone());
        self.token_invalid = false;

        if self.announced_token.as_deref() == Some(token.as_str()) {
            return;
        }
        if let Some(sender) = &self.token_updates {
            let update = TokenUpdate {
                host: self.host.clone(),
                token: token.clone(),
            };
            if sender.send(update).is_err() {
                debug!("Token update receiver for {} is gone", self.host);
                return;
            }
            self.announced_token = Some(token);
        }
    }

    fn set_offline(&mut self) {
        self.available = false;
        self.status = OFFLINE_STATUS.to_string();
        self.state = LinkState::Offline;
        self.telemetry = Telemetry::offline(&self.host, self.model.as_deref());
        self.raw_api_response.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::sync::mpsc;

    fn identity() -> DiscoveryRecord {
        DiscoveryRecord {
            host: "192.168.1.100".to_string(),
            model: "Snapmaker A350".to_string(),
            status: "IDLE".to_string(),
        }
    }

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("payload must be an object"),
        }
    }

    #[test]
    fn test_init() {
        let device = SnapmakerDevice::new("192.168.1.100", None);
        assert_eq!(device.host(), "192.168.1.100");
        assert_eq!(device.state(), LinkState::Uninitialized);
        assert!(!device.available());
        assert_eq!(device.model(), None);
        assert_eq!(device.status(), "OFFLINE");
        assert!(!device.dual_extruder());
        assert_eq!(device.token(), None);
        assert!(!device.token_invalid());
        assert!(device.raw_api_response().is_empty());
    }

    #[test]
    fn test_init_with_token() {
        let device = SnapmakerDevice::new("192.168.1.100", Some("saved-token-456".to_string()));
        assert_eq!(device.token(), Some("saved-token-456"));
    }

    #[test]
    fn test_set_offline_clears_measurements() {
        let mut device = SnapmakerDevice::new("192.168.1.100", None);
        device.model = Some("Snapmaker A350".to_string());
        device.raw_api_response = payload(json!({"status": "IDLE"}));
        device.set_offline();

        assert!(!device.available());
        assert_eq!(device.state(), LinkState::Offline);
        assert_eq!(device.status(), "OFFLINE");
        assert!(device.raw_api_response().is_empty());

        let t = device.telemetry();
        assert_eq!(t.status, "OFFLINE");
        assert_eq!(t.ip, "192.168.1.100");
        assert_eq!(t.model.as_deref(), Some("Snapmaker A350"));
        assert_eq!(t.nozzle_temperature, None);
        assert_eq!(t.progress, None);
        assert_eq!(t.current_line, None);
        assert_eq!(t.tool_head, "N/A");
    }

    #[test]
    fn test_apply_status_strips_token_from_raw() {
        let mut device = SnapmakerDevice::new("192.168.1.100", None);
        device.apply_status(
            &identity(),
            payload(json!({
                "status": "IDLE",
                "token": "secret-token-value",
                "nozzleTemperature": 25.0
            })),
        );

        let raw = device.raw_api_response();
        assert!(!raw.contains_key("token"));
        assert_eq!(raw["status"], "IDLE");
        assert_eq!(raw["nozzleTemperature"], 25.0);
        assert_eq!(device.state(), LinkState::Authenticated);
        assert_eq!(device.telemetry().nozzle_temperature, Some(25.0));
    }

    #[test]
    fn test_apply_status_remembers_unknown_tool_heads() {
        let mut device = SnapmakerDevice::new("192.168.1.100", None);
        let raw = payload(json!({"status": "IDLE", "toolHead": "TOOLHEAD_FUTURE_V3"}));
        device.apply_status(&identity(), raw.clone());
        device.apply_status(&identity(), raw);

        assert_eq!(device.warned_tool_heads.len(), 1);
        assert_eq!(device.telemetry().tool_head, "TOOLHEAD_FUTURE_V3");
    }

    #[test]
    fn test_store_token_notifies_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut device = SnapmakerDevice::new("192.168.1.100", None);
        device.set_token_update_sender(tx);

        device.store_token("test-token-123".to_string());
        device.store_token("test-token-123".to_string());

        let update = rx.try_recv().unwrap();
        assert_eq!(update.host, "192.168.1.100");
        assert_eq!(update.token, "test-token-123");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_store_token_skips_persisted_token() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut device = SnapmakerDevice::new("192.168.1.100", Some("saved".to_string()));
        device.set_token_update_sender(tx);

        device.store_token("saved".to_string());
        assert!(rx.try_recv().is_err());

        device.store_token("fresh".to_string());
        assert_eq!(rx.try_recv().unwrap().token, "fresh");
    }

    #[test]
    fn test_store_token_without_sender() {
        let mut device = SnapmakerDevice::new("192.168.1.100", None);
        device.token_invalid = true;
        device.store_token("t".to_string());
        assert_eq!(device.token(), Some("t"));
        assert!(!device.token_invalid());
    }
}
