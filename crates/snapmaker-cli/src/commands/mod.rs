//! Command implementations.

pub mod discover;
pub mod forget;
pub mod list;
pub mod pair;
pub mod status;
pub mod watch;

pub use discover::run_discover;
pub use forget::run_forget;
pub use list::run_list;
pub use pair::run_pair;
pub use status::run_status;
pub use watch::run_watch;

use std::path::PathBuf;
use std::time::Duration;

use snapmaker_core::storage::default_data_dir;
use snapmaker_core::{ClientConfig, DeviceStore, TokenUpdate};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, warn};

use crate::error::CliError;
use crate::output::{get_formatter, OutputFormatter};

/// Settings shared by every command.
pub struct CommandContext {
    pub json: bool,
    pub config: ClientConfig,
    data_dir: PathBuf,
}

impl CommandContext {
    pub fn new(json: bool, timeout_ms: u64, data_dir: Option<PathBuf>) -> Result<Self, CliError> {
        if timeout_ms == 0 {
            return Err(CliError::InvalidArgument(
                "timeout must be greater than zero".to_string(),
            ));
        }

        let data_dir = data_dir
            .or_else(default_data_dir)
            .ok_or_else(|| CliError::Other("Could not determine a data directory".to_string()))?;

        let config = ClientConfig {
            http_timeout: Duration::from_millis(timeout_ms),
            ..ClientConfig::default()
        };

        Ok(Self {
            json,
            config,
            data_dir,
        })
    }

    pub fn formatter(&self) -> Box<dyn OutputFormatter> {
        get_formatter(self.json)
    }

    /// Open the paired-device store, creating its directory on first use.
    pub fn store(&self) -> Result<DeviceStore, CliError> {
        Ok(DeviceStore::new(self.data_dir.join("devices"))?)
    }
}

/// Write every token the device announced since the last call.
pub async fn persist_tokens(store: &DeviceStore, updates: &mut UnboundedReceiver<TokenUpdate>) {
    while let Ok(update) = updates.try_recv() {
        match store.update_token(&update.host, &update.token).await {
            Ok(_) => debug!("Saved new token for {}", update.host),
            Err(e) => warn!("Could not save token for {}: {}", update.host, e),
        }
    }
}

/// Printed when the device rejected our token.
pub fn reauth_hint(host: &str) -> String {
    format!(
        "{} rejected the saved token. Run `snapmaker-cli pair {}` and accept the request on the touchscreen.",
        host, host
    )
}
