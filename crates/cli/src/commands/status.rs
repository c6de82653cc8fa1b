use crate::formatters::{format_status, OutputFormat};
use std::path::Path;
use todo_daemon_core::{Result, ResultExt};

pub async fn execute(sock: &Path, format: OutputFormat) -> Result<()> {
    let mut client = super::connect(sock).await?;
    let status = client
        .status()
        .await
        .context("cannot get server status")?;

    println!("{}", format_status(&status, format)?);
    Ok(())
}
