//! `health` command handler

use anyhow::{bail, Context, Result};

use super::CommandContext;
use crate::output::OutputEvent;

/// Handle the `health` command
pub async fn run_health(ctx: &CommandContext) -> Result<()> {
    let client = ctx.client()?;
    let out = ctx.output();

    out.write(OutputEvent::Status(format!("Checking {}", ctx.api.url)));
    let health = client
        .health()
        .await
        .with_context(|| format!("workflow server at {} is unreachable", ctx.api.url))?;

    if !health.is_ok() {
        bail!("workflow server reported status '{}'", health.status);
    }

    let service = if health.service.is_empty() {
        "workflow server"
    } else {
        health.service.as_str()
    };
    out.write(OutputEvent::Progress {
        message: format!("{} is healthy", service),
        done: true,
    });
    out.flush();
    Ok(())
}
