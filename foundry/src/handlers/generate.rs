//! `generate` command handler

use anyhow::{bail, Result};

use super::CommandContext;
use crate::checkpoint::{ApprovalHandler, Decision};
use crate::client::{Outcome, WorkflowClient};
use crate::output::{render_view, OutputEvent};
use crate::view::{project, ApprovalDraft};

/// Handle the `generate` command
///
/// Renders the resulting protocol and, when the workflow halts, hands the
/// draft to `approval` before finalizing.
pub async fn run_generate(
    ctx: &CommandContext,
    intent: &str,
    query: Option<&str>,
    approval: &dyn ApprovalHandler,
) -> Result<()> {
    let client = ctx.client()?;
    let out = ctx.output();

    let outcome = client.generate(intent, query.unwrap_or(intent)).await;
    render_view(&project(&client.snapshot()), out);
    if let Outcome::Failed(err) = outcome {
        bail!(err);
    }

    let Some(draft) = client.state().as_ref().and_then(ApprovalDraft::open) else {
        return Ok(());
    };

    finish_checkpoint(&client, draft, approval, ctx).await
}

/// Run the checkpoint for a halted draft and submit the decision
pub(crate) async fn finish_checkpoint(
    client: &WorkflowClient,
    draft: ApprovalDraft,
    approval: &dyn ApprovalHandler,
    ctx: &CommandContext,
) -> Result<()> {
    let out = ctx.output();
    let thread_id = draft.thread_id().to_string();

    match approval.decide(draft) {
        Decision::Reject => {
            out.write(OutputEvent::Status(format!(
                "Protocol left halted. Resume with: foundry approve {} --edits-file <draft.md>",
                thread_id
            )));
            out.flush();
            Ok(())
        }
        Decision::Approve(draft) => {
            // The scratch copy is always submitted, edited or not
            let edits = draft.into_edits();

            out.write(OutputEvent::Progress {
                message: "Finalizing protocol...".to_string(),
                done: false,
            });
            let outcome = client.approve(&thread_id, &edits).await;
            render_view(&project(&client.snapshot()), out);

            match outcome {
                Outcome::Failed(err) => bail!(err),
                Outcome::Discarded => bail!("approval response was superseded"),
                Outcome::Applied => Ok(()),
            }
        }
    }
}
