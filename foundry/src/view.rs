//! Stateless projection of the client snapshot into views
//!
//! Nothing here mutates the workflow state. The only editable value is the
//! [`ApprovalDraft`] scratch copy, which is independent of the held state
//! until it is submitted through `approve`.

use foundry_common::{AgentName, ProtocolState, SafetyFlag, WorkflowStatus};

use crate::client::ClientSnapshot;

/// Everything a front end needs to draw one frame
#[derive(Debug, Clone, PartialEq)]
pub struct View<'a> {
    /// Busy indicator, shown regardless of status
    pub busy: bool,
    pub error: Option<&'a str>,
    pub body: Body<'a>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body<'a> {
    /// No thread yet: show the intake form
    Intake,
    Protocol(ProtocolView<'a>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolView<'a> {
    pub thread_id: &'a str,
    pub status: &'a WorkflowStatus,
    pub iteration: u32,
    pub timeline: Vec<TimelineEntry<'a>>,
    pub draft: &'a str,
    pub safety: SafetyPanel<'a>,
    pub clinical: ClinicalPanel<'a>,
    /// Strictly `status == halted`
    pub approval_available: bool,
    /// The confirmed final text once the thread is finalized
    pub final_protocol: Option<&'a str>,
}

/// One agent in the execution timeline
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry<'a> {
    /// 1-based position in the pipeline
    pub step: usize,
    pub agent: AgentName,
    pub notes: &'a [String],
}

impl TimelineEntry<'_> {
    pub fn is_pending(&self) -> bool {
        self.notes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SafetyPanel<'a> {
    pub flags: &'a [SafetyFlag],
    pub score: DisplayScore,
}

impl SafetyPanel<'_> {
    /// An evaluated thread with no flags
    pub fn is_clear(&self) -> bool {
        self.flags.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClinicalPanel<'a> {
    pub feedback: &'a str,
    pub empathy: DisplayScore,
}

/// A 0-100 score prepared for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayScore {
    /// Clamped and rounded value
    pub value: u8,
    /// Quartile band 0..=4, used for colouring
    pub band: u8,
}

impl DisplayScore {
    pub fn from_raw(raw: f64) -> Self {
        let clamped = if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 100.0) };
        Self {
            value: clamped.round() as u8,
            band: (clamped / 25.0).round() as u8,
        }
    }
}

/// Project a snapshot into a view
pub fn project(snapshot: &ClientSnapshot) -> View<'_> {
    let body = match &snapshot.state {
        None => Body::Intake,
        Some(state) => Body::Protocol(project_state(state)),
    };

    View {
        busy: snapshot.loading(),
        error: snapshot.error(),
        body,
    }
}

fn project_state(state: &ProtocolState) -> ProtocolView<'_> {
    let timeline = AgentName::ALL
        .iter()
        .enumerate()
        .map(|(idx, agent)| TimelineEntry {
            step: idx + 1,
            agent: *agent,
            notes: state.notes_for(*agent),
        })
        .collect();

    ProtocolView {
        thread_id: &state.thread_id,
        status: &state.status,
        iteration: state.iteration_count,
        timeline,
        draft: &state.current_draft,
        safety: SafetyPanel {
            flags: &state.safety_flags,
            score: DisplayScore::from_raw(state.safety_score),
        },
        clinical: ClinicalPanel {
            feedback: &state.clinical_feedback,
            empathy: DisplayScore::from_raw(state.empathy_score),
        },
        approval_available: state.status.awaits_approval(),
        final_protocol: state
            .status
            .is_terminal()
            .then_some(state.current_draft.as_str()),
    }
}

// ============================================================================
// Approval scratch copy
// ============================================================================

/// Editable copy of a halted draft, owned by the approval step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalDraft {
    thread_id: String,
    original: String,
    text: String,
}

impl ApprovalDraft {
    /// Open a scratch copy; only a halted state can be approved
    pub fn open(state: &ProtocolState) -> Option<Self> {
        state.awaits_approval().then(|| Self {
            thread_id: state.thread_id.clone(),
            original: state.current_draft.clone(),
            text: state.current_draft.clone(),
        })
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the scratch text
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn is_modified(&self) -> bool {
        self.text != self.original
    }

    /// The text submitted as `human_edits`
    pub fn into_edits(self) -> String {
        self.text
    }
}
