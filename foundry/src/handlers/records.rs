//! `show` and `list` command handlers

use anyhow::{Context, Result};
use foundry_common::ProtocolRecord;

use super::CommandContext;
use crate::output::{OutputEvent, OutputWriter};
use crate::view::DisplayScore;

/// Handle the `show` command
pub async fn run_show(ctx: &CommandContext, thread_id: &str) -> Result<()> {
    let client = ctx.client()?;
    let record = client
        .fetch_protocol(thread_id)
        .await
        .with_context(|| format!("failed to fetch protocol {}", thread_id))?;

    render_record(&record, ctx.output());
    ctx.output().flush();
    Ok(())
}

/// Handle the `list` command
pub async fn run_list(ctx: &CommandContext, limit: usize) -> Result<()> {
    let client = ctx.client()?;
    let out = ctx.output();
    let list = client
        .list_protocols(limit)
        .await
        .context("failed to list protocols")?;

    if list.protocols.is_empty() {
        out.write(OutputEvent::System("No protocols stored yet.".to_string()));
        out.flush();
        return Ok(());
    }

    out.write(OutputEvent::Heading(format!("Protocols ({})", list.count)));
    for summary in &list.protocols {
        let created = summary
            .created_at_utc()
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| summary.created_at.clone());
        out.write(OutputEvent::Text(format!(
            "  {}  {:<18} {}  {}",
            summary.thread_id,
            summary.status.label(),
            created,
            summary.user_intent
        )));
    }
    out.flush();
    Ok(())
}

/// Emit the events for a stored protocol
pub(crate) fn render_record(record: &ProtocolRecord, out: &dyn OutputWriter) {
    out.write(OutputEvent::Status(format!(
        "Thread {} · {}",
        record.thread_id,
        record.status.label()
    )));
    if !record.user_intent.is_empty() {
        out.write(OutputEvent::Text(format!("Intent: {}", record.user_intent)));
    }
    if let Some(created) = record.created_at_utc() {
        out.write(OutputEvent::System(format!(
            "Created {}",
            created.format("%Y-%m-%d %H:%M:%S UTC")
        )));
    }
    out.write(OutputEvent::NewLine);

    for (label, raw) in [
        ("Safety", record.safety_score),
        ("Empathy", record.empathy_score),
    ] {
        if let Some(raw) = raw {
            let score = DisplayScore::from_raw(raw);
            out.write(OutputEvent::Score {
                label: label.to_string(),
                value: score.value,
                band: score.band,
            });
        }
    }

    match &record.final_protocol {
        Some(text) => {
            out.write(OutputEvent::NewLine);
            out.write(OutputEvent::Heading("Final Protocol".to_string()));
            out.write(OutputEvent::Markdown(text.clone()));
        }
        None => out.write(OutputEvent::System(
            "No final protocol yet.".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::tests::MockOutput;
    use foundry_common::WorkflowStatus;

    fn record(final_protocol: Option<&str>) -> ProtocolRecord {
        ProtocolRecord {
            thread_id: "t1".into(),
            user_intent: "Sleep hygiene".into(),
            status: WorkflowStatus::Finalized,
            final_protocol: final_protocol.map(str::to_string),
            safety_score: Some(88.0),
            empathy_score: None,
            created_at: "2026-01-02T03:04:05".into(),
        }
    }

    #[test]
    fn test_render_finalized_record() {
        let (mock, events) = MockOutput::new();
        render_record(&record(Some("# Final")), &mock);
        let events = events.lock().unwrap();

        assert!(events.contains(&OutputEvent::Text("Intent: Sleep hygiene".into())));
        assert!(events.contains(&OutputEvent::System("Created 2026-01-02 03:04:05 UTC".into())));
        assert!(events.contains(&OutputEvent::Markdown("# Final".into())));
        let scores = events
            .iter()
            .filter(|e| matches!(e, OutputEvent::Score { .. }))
            .count();
        assert_eq!(scores, 1);
    }

    #[test]
    fn test_render_record_without_final_text() {
        let (mock, events) = MockOutput::new();
        render_record(&record(None), &mock);
        assert!(events
            .lock()
            .unwrap()
            .contains(&OutputEvent::System("No final protocol yet.".into())));
    }
}
