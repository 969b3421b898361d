//! Periodic polling.

use std::time::Duration;

use snapmaker_core::SnapmakerDevice;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::info;

use super::{persist_tokens, reauth_hint, CommandContext};
use crate::cli::WatchArgs;
use crate::error::CliError;

/// Run the watch command
pub async fn run_watch(ctx: &CommandContext, args: WatchArgs) -> Result<(), CliError> {
    if args.interval == 0 {
        return Err(CliError::InvalidArgument(
            "interval must be at least 1 second".to_string(),
        ));
    }

    let formatter = ctx.formatter();
    let store = ctx.store()?;
    let token = store.get(&args.host).await?.and_then(|d| d.token);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut device = SnapmakerDevice::with_config(&args.host, token, ctx.config.clone());
    device.set_token_update_sender(tx);

    let mut ticker = tokio::time::interval(Duration::from_secs(args.interval));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut polls = 0u64;
    let mut prompted = false;

    if !ctx.json {
        println!(
            "Polling {} every {}s (press Ctrl+C to stop)\n",
            args.host, args.interval
        );
    }

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping watch on {}", args.host);
                break;
            }
        }

        let result = device.update().await;
        persist_tokens(&store, &mut rx).await;

        match result {
            Ok(telemetry) => println!("{}", formatter.format_telemetry(&telemetry)),
            Err(e) => println!("{}", formatter.format_error(&e.to_string())),
        }

        if !device.token_invalid() {
            prompted = false;
        } else if !prompted {
            eprintln!("{}", reauth_hint(&args.host));
            prompted = true;
        }

        polls += 1;
        if args.count.is_some_and(|count| polls >= count) {
            break;
        }
    }

    Ok(())
}
