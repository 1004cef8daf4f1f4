//! Output abstraction for the CLI
//!
//! Views are turned into a stream of [`OutputEvent`]s by [`render_view`];
//! an [`OutputWriter`] decides how each event looks. Terminal output uses
//! ANSI colours, plain output is for pipes and CI.

use foundry_common::Severity;

mod plain;
mod terminal;

pub use plain::PlainOutput;
pub use terminal::TerminalOutput;

use crate::view::{Body, ProtocolView, View};

// ============================================================================
// Output Events
// ============================================================================

/// Events that can be displayed to the user
#[derive(Debug, Clone, PartialEq)]
pub enum OutputEvent {
    /// Plain text message
    Text(String),

    /// Section heading
    Heading(String),

    /// Markdown body (draft or final protocol), printed as-is
    Markdown(String),

    /// One agent in the execution timeline
    TimelineStep {
        step: usize,
        agent: String,
        notes: Vec<String>,
    },

    /// A safety reviewer flag
    Flag {
        line: i64,
        severity: Severity,
        issue: String,
        suggestion: String,
    },

    /// A 0-100 score with its quartile band
    Score { label: String, value: u8, band: u8 },

    /// Progress indicator
    Progress { message: String, done: bool },

    /// Status message (informational)
    Status(String),

    /// Error message
    Error(String),

    /// Warning message
    Warning(String),

    /// System message (dimmed, for internal info)
    System(String),

    /// New line / separator
    NewLine,
}

// ============================================================================
// Output Writer Trait
// ============================================================================

/// Trait for writing output events
pub trait OutputWriter: Send + Sync {
    /// Write an output event
    fn write(&self, event: OutputEvent);

    /// Flush any buffered output
    fn flush(&self);

    /// Whether this writer supports colors/formatting
    fn supports_colors(&self) -> bool {
        false
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Emit the events for one frame
pub fn render_view(view: &View<'_>, out: &dyn OutputWriter) {
    if view.busy {
        out.write(OutputEvent::Progress {
            message: "Agents are collaborating... (drafting → safety review → clinical review)"
                .to_string(),
            done: false,
        });
    }

    if let Some(error) = view.error {
        out.write(OutputEvent::Error(error.to_string()));
    }

    match &view.body {
        Body::Intake => {
            out.write(OutputEvent::System(
                "No protocol yet. Describe a therapeutic goal to generate one.".to_string(),
            ));
        }
        Body::Protocol(protocol) => render_protocol(protocol, out),
    }

    out.flush();
}

fn render_protocol(view: &ProtocolView<'_>, out: &dyn OutputWriter) {
    out.write(OutputEvent::Status(format!(
        "Thread {} · {} · iteration {}",
        view.thread_id,
        view.status.label(),
        view.iteration
    )));
    if !view.status.is_known() {
        out.write(OutputEvent::Warning(format!(
            "Server reported an unrecognised status '{}'",
            view.status
        )));
    }
    out.write(OutputEvent::NewLine);

    out.write(OutputEvent::Heading("Agent Execution Timeline".to_string()));
    for entry in &view.timeline {
        out.write(OutputEvent::TimelineStep {
            step: entry.step,
            agent: entry.agent.label().to_string(),
            notes: entry.notes.to_vec(),
        });
    }
    out.write(OutputEvent::NewLine);

    if let Some(final_text) = view.final_protocol {
        out.write(OutputEvent::Heading(
            "Final Protocol (Ready for Client)".to_string(),
        ));
        out.write(OutputEvent::Markdown(final_text.to_string()));
    } else {
        out.write(OutputEvent::Heading("Current Draft".to_string()));
        out.write(OutputEvent::Markdown(view.draft.to_string()));
    }
    out.write(OutputEvent::NewLine);

    out.write(OutputEvent::Heading("Safety Review".to_string()));
    out.write(OutputEvent::Score {
        label: "Safety".to_string(),
        value: view.safety.score.value,
        band: view.safety.score.band,
    });
    if view.safety.is_clear() {
        out.write(OutputEvent::Text("✓ No safety issues detected".to_string()));
    }
    for flag in view.safety.flags {
        out.write(OutputEvent::Flag {
            line: flag.line,
            severity: flag.severity,
            issue: flag.issue.clone(),
            suggestion: flag.suggestion.clone(),
        });
    }
    out.write(OutputEvent::NewLine);

    out.write(OutputEvent::Heading("Clinical Review".to_string()));
    out.write(OutputEvent::Score {
        label: "Empathy".to_string(),
        value: view.clinical.empathy.value,
        band: view.clinical.empathy.band,
    });
    if !view.clinical.feedback.is_empty() {
        out.write(OutputEvent::Markdown(view.clinical.feedback.to_string()));
    }

    if view.approval_available {
        out.write(OutputEvent::NewLine);
        out.write(OutputEvent::Status(
            "This protocol is awaiting human review and approval.".to_string(),
        ));
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Create a default output writer based on environment
pub fn default_output(colors: bool) -> Box<dyn OutputWriter> {
    use std::io::IsTerminal;

    if colors && std::io::stdout().is_terminal() {
        Box::new(TerminalOutput::new())
    } else {
        Box::new(PlainOutput::new())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::client::ClientSnapshot;
    use crate::view::project;
    use foundry_common::{ProtocolState, SafetyFlag, WorkflowStatus};
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    /// Mock output writer for testing
    pub(crate) struct MockOutput {
        events: Arc<Mutex<Vec<OutputEvent>>>,
    }

    impl MockOutput {
        pub(crate) fn new() -> (Self, Arc<Mutex<Vec<OutputEvent>>>) {
            let events = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    events: events.clone(),
                },
                events,
            )
        }
    }

    impl OutputWriter for MockOutput {
        fn write(&self, event: OutputEvent) {
            self.events.lock().unwrap().push(event);
        }

        fn flush(&self) {}
    }

    fn protocol(status: WorkflowStatus, flags: Vec<SafetyFlag>) -> ProtocolState {
        ProtocolState {
            thread_id: "t1".into(),
            status,
            current_draft: "# Draft".into(),
            safety_flags: flags,
            clinical_feedback: String::new(),
            empathy_score: 70.0,
            safety_score: 90.0,
            agent_notes: BTreeMap::new(),
            iteration_count: 1,
        }
    }

    fn render(snapshot: &ClientSnapshot) -> Vec<OutputEvent> {
        let (mock, events) = MockOutput::new();
        render_view(&project(snapshot), &mock);
        let captured = events.lock().unwrap().clone();
        captured
    }

    #[test]
    fn test_intake_frame() {
        let events = render(&ClientSnapshot::default());
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], OutputEvent::System(_)));
    }

    #[test]
    fn test_busy_and_error_shown_first() {
        let snapshot = ClientSnapshot {
            error: Some("rate limited".into()),
            pending: 1,
            ..Default::default()
        };
        let events = render(&snapshot);
        assert!(matches!(events[0], OutputEvent::Progress { done: false, .. }));
        assert_eq!(events[1], OutputEvent::Error("rate limited".into()));
    }

    #[test]
    fn test_halted_frame_lists_all_agents_and_clear_safety() {
        let snapshot = ClientSnapshot {
            state: Some(protocol(WorkflowStatus::Halted, Vec::new())),
            ..Default::default()
        };
        let events = render(&snapshot);

        let steps = events
            .iter()
            .filter(|e| matches!(e, OutputEvent::TimelineStep { .. }))
            .count();
        assert_eq!(steps, 5);
        assert!(events.contains(&OutputEvent::Markdown("# Draft".into())));
        assert!(events.contains(&OutputEvent::Text("✓ No safety issues detected".into())));
        assert!(events.contains(&OutputEvent::Score {
            label: "Safety".into(),
            value: 90,
            band: 4
        }));
        assert!(matches!(events.last(), Some(OutputEvent::Status(_))));
    }

    #[test]
    fn test_flags_rendered_in_server_order() {
        let flags = vec![
            SafetyFlag {
                line: 9,
                severity: Severity::Low,
                issue: "second".into(),
                suggestion: "s2".into(),
            },
            SafetyFlag {
                line: 1,
                severity: Severity::Critical,
                issue: "first".into(),
                suggestion: "s1".into(),
            },
        ];
        let snapshot = ClientSnapshot {
            state: Some(protocol(WorkflowStatus::ClinicalReview, flags)),
            ..Default::default()
        };

        let issues: Vec<String> = render(&snapshot)
            .into_iter()
            .filter_map(|e| match e {
                OutputEvent::Flag { issue, .. } => Some(issue),
                _ => None,
            })
            .collect();
        assert_eq!(issues, vec!["second", "first"]);
    }

    #[test]
    fn test_unknown_status_warns() {
        let snapshot = ClientSnapshot {
            state: Some(protocol(WorkflowStatus::from("archived"), Vec::new())),
            ..Default::default()
        };
        let events = render(&snapshot);
        assert!(events
            .iter()
            .any(|e| matches!(e, OutputEvent::Warning(w) if w.contains("archived"))));
    }

    #[test]
    fn test_finalized_frame_shows_final_protocol() {
        let snapshot = ClientSnapshot {
            state: Some(protocol(WorkflowStatus::Finalized, Vec::new())),
            ..Default::default()
        };
        let events = render(&snapshot);
        assert!(events.contains(&OutputEvent::Heading(
            "Final Protocol (Ready for Client)".into()
        )));
        assert!(!events.contains(&OutputEvent::Heading("Current Draft".into())));
    }
}
