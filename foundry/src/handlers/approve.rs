//! `approve` command handler

use std::path::Path;

use anyhow::{bail, Result};

use super::{read_edits_file, records::render_record, CommandContext};
use crate::client::Outcome;
use crate::output::OutputEvent;

/// Handle the `approve` command
///
/// Approves a thread this process did not generate, so there is no local
/// state to merge into; the stored record is fetched afterwards instead.
pub async fn run_approve(
    ctx: &CommandContext,
    thread_id: &str,
    edits_file: Option<&Path>,
) -> Result<()> {
    let edits = match edits_file {
        Some(path) => read_edits_file(path)?,
        None => String::new(),
    };

    let client = ctx.client()?;
    let out = ctx.output();

    match client.approve(thread_id, &edits).await {
        Outcome::Failed(err) => bail!(err),
        Outcome::Discarded => bail!("approval response was superseded"),
        Outcome::Applied => {}
    }

    out.write(OutputEvent::Progress {
        message: format!("Approved {}", thread_id),
        done: true,
    });

    match client.fetch_protocol(thread_id).await {
        Ok(record) => render_record(&record, out),
        Err(e) => {
            tracing::warn!("Approved, but fetching the stored record failed: {}", e);
            out.write(OutputEvent::Warning(format!(
                "Approved, but the stored protocol could not be fetched: {}",
                e
            )));
        }
    }
    out.flush();
    Ok(())
}
