//! Discover command implementation.

use snapmaker_core::DiscoveryClient;

use super::CommandContext;
use crate::error::CliError;

/// Run the discover command
pub async fn run_discover(ctx: &CommandContext) -> Result<(), CliError> {
    let formatter = ctx.formatter();

    if !ctx.json {
        println!("Discovering devices...");
    }

    let devices = DiscoveryClient::new(ctx.config.clone()).discover_all().await;

    println!("{}", formatter.format_devices(&devices));

    if devices.is_empty() {
        return Err(CliError::NoDevicesFound);
    }

    Ok(())
}
