//! Forget command implementation.

use super::CommandContext;
use crate::cli::HostArgs;
use crate::error::CliError;

/// Run the forget command
pub async fn run_forget(ctx: &CommandContext, args: HostArgs) -> Result<(), CliError> {
    let store = ctx.store()?;
    store.delete(&args.host).await?;

    println!(
        "{}",
        ctx.formatter()
            .format_message(&format!("Forgot {}", args.host))
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapmaker_core::error::CoreError;
    use snapmaker_core::{SavedDevice, StorageError};

    #[tokio::test]
    async fn test_forget_removes_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = CommandContext::new(true, 5000, Some(tmp.path().to_path_buf())).unwrap();
        let store = ctx.store().unwrap();
        store
            .save(&SavedDevice::new("10.0.0.5", Some("t".to_string()), None))
            .await
            .unwrap();

        run_forget(&ctx, HostArgs { host: "10.0.0.5".to_string() })
            .await
            .unwrap();
        assert!(store.get("10.0.0.5").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_forget_unknown_host() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = CommandContext::new(true, 5000, Some(tmp.path().to_path_buf())).unwrap();

        let err = run_forget(&ctx, HostArgs { host: "10.0.0.9".to_string() })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CliError::Core(CoreError::Storage(StorageError::NotFound(_)))
        ));
    }
}
