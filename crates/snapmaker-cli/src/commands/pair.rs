//! Pair command: authorize this machine on a device.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use snapmaker_core::discovery::DiscoveryOutcome;
use snapmaker_core::{DiscoveryClient, SavedDevice, SnapmakerDevice};

use super::CommandContext;
use crate::cli::HostArgs;
use crate::error::CliError;

/// Run the pair command
pub async fn run_pair(ctx: &CommandContext, args: HostArgs) -> Result<(), CliError> {
    let formatter = ctx.formatter();
    let store = ctx.store()?;

    let record = match DiscoveryClient::new(ctx.config.clone())
        .check_online(&args.host)
        .await
    {
        DiscoveryOutcome::Online(record) => record,
        DiscoveryOutcome::Offline(_) => return Err(CliError::DeviceOffline(args.host)),
    };

    let spinner = (!ctx.json).then(|| {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!(
            "Accept the connection request on the {} touchscreen...",
            record.model
        ));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });

    let mut device = SnapmakerDevice::with_config(&args.host, None, ctx.config.clone());
    let result = device.generate_token().await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let token = result?;
    let saved = SavedDevice::new(&args.host, Some(token), Some(record.model));
    store.save(&saved).await?;

    println!("{}", formatter.format_paired(&saved));

    Ok(())
}
