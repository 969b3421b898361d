//! List command implementation.

use super::CommandContext;
use crate::error::CliError;

/// Run the list command
pub async fn run_list(ctx: &CommandContext) -> Result<(), CliError> {
    let devices = ctx.store()?.list().await?;

    println!("{}", ctx.formatter().format_saved_devices(&devices));

    Ok(())
}
