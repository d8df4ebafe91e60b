use std::sync::Arc;
use std::time::Duration;

use crate::shared::bridge::{BridgeClient, BridgeError};
use crate::shared::config::{BridgeConfig, Config, LogsConfig};
use crate::shared::logger::{ClassificationRules, LogStore};

/// Everything a handler needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LogStore>,
    pub bridge: BridgeClient,
    pub rules: Arc<ClassificationRules>,
    pub logs: LogsConfig,
    pub bridge_config: BridgeConfig,
}

impl AppState {
    pub fn new(config: &Config, store: Arc<dyn LogStore>) -> Result<Self, BridgeError> {
        let bridge = BridgeClient::new(
            config.bridge.active_base_url(),
            Duration::from_secs(config.bridge.timeout_secs),
        )?;
        Ok(Self {
            store,
            bridge,
            rules: Arc::new(ClassificationRules::from_config(&config.classification)),
            logs: config.logs.clone(),
            bridge_config: config.bridge.clone(),
        })
    }
}
