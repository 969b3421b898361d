//! Status command implementation.

use snapmaker_core::SnapmakerDevice;
use tokio::sync::mpsc;

use super::{persist_tokens, reauth_hint, CommandContext};
use crate::cli::HostArgs;
use crate::error::CliError;

/// Run the status command
pub async fn run_status(ctx: &CommandContext, args: HostArgs) -> Result<(), CliError> {
    let formatter = ctx.formatter();
    let store = ctx.store()?;

    let saved = store.get(&args.host).await?;
    let token = saved.and_then(|d| d.token);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut device = SnapmakerDevice::with_config(&args.host, token, ctx.config.clone());
    device.set_token_update_sender(tx);

    let result = device.update().await;
    persist_tokens(&store, &mut rx).await;

    match result {
        Ok(telemetry) => {
            println!("{}", formatter.format_telemetry(&telemetry));
            Ok(())
        }
        Err(e) => {
            println!("{}", formatter.format_telemetry(device.telemetry()));
            if device.token_invalid() {
                eprintln!("{}", reauth_hint(&args.host));
            }
            Err(e.into())
        }
    }
}
