//! Wire types for the protocol workflow server
//!
//! Every response shape is deserialized leniently: optional collections
//! default to empty, and status strings outside the known set are kept as
//! [`WorkflowStatus::Other`] instead of failing the whole response.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Workflow status
// ============================================================================

/// Stage of a remote workflow, as last reported by the server
///
/// The server sends free text; the five known stages map to dedicated
/// variants and anything else is carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WorkflowStatus {
    Drafting,
    SafetyReview,
    ClinicalReview,
    /// Paused for human sign-off
    Halted,
    /// Human-approved, server-confirmed final text
    Finalized,
    /// A status string this client does not recognise
    Other(String),
}

impl WorkflowStatus {
    /// Wire representation
    pub fn as_str(&self) -> &str {
        match self {
            Self::Drafting => "drafting",
            Self::SafetyReview => "safety_review",
            Self::ClinicalReview => "clinical_review",
            Self::Halted => "halted",
            Self::Finalized => "finalized",
            Self::Other(raw) => raw,
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &str {
        match self {
            Self::Drafting => "Drafting",
            Self::SafetyReview => "Safety review",
            Self::ClinicalReview => "Clinical review",
            Self::Halted => "Awaiting approval",
            Self::Finalized => "Finalized",
            Self::Other(raw) => raw,
        }
    }

    /// Whether the status is one of the five known stages
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Only a halted workflow accepts an approval
    pub fn awaits_approval(&self) -> bool {
        matches!(self, Self::Halted)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalized)
    }
}

impl From<String> for WorkflowStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "drafting" => Self::Drafting,
            "safety_review" => Self::SafetyReview,
            "clinical_review" => Self::ClinicalReview,
            "halted" => Self::Halted,
            "finalized" => Self::Finalized,
            _ => Self::Other(raw),
        }
    }
}

impl From<&str> for WorkflowStatus {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<WorkflowStatus> for String {
    fn from(status: WorkflowStatus) -> Self {
        match status {
            WorkflowStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Safety flags
// ============================================================================

/// Severity of a safety flag
///
/// Unrecognised severities are read as [`Severity::Low`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    Critical,
    Moderate,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Moderate => "moderate",
            Self::Low => "low",
        }
    }
}

impl From<String> for Severity {
    fn from(raw: String) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "critical" => Self::Critical,
            "moderate" => Self::Moderate,
            _ => Self::Low,
        }
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        severity.as_str().to_string()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An issue raised by the safety reviewer against a draft line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyFlag {
    pub line: i64,
    pub severity: Severity,
    pub issue: String,
    pub suggestion: String,
}

// ============================================================================
// Agents
// ============================================================================

/// The agents whose notes appear in [`ProtocolState::agent_notes`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgentName {
    Supervisor,
    Drafter,
    SafetyGuardian,
    ClinicalCritic,
    Synthesizer,
}

impl AgentName {
    /// Execution order of the pipeline
    pub const ALL: [AgentName; 5] = [
        AgentName::Supervisor,
        AgentName::Drafter,
        AgentName::SafetyGuardian,
        AgentName::ClinicalCritic,
        AgentName::Synthesizer,
    ];

    /// Key used in the `agent_notes` map
    pub fn key(&self) -> &'static str {
        match self {
            Self::Supervisor => "supervisor",
            Self::Drafter => "drafter",
            Self::SafetyGuardian => "safety_guardian",
            Self::ClinicalCritic => "clinical_critic",
            Self::Synthesizer => "synthesizer",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Supervisor => "Supervisor",
            Self::Drafter => "Drafter",
            Self::SafetyGuardian => "Safety Guardian",
            Self::ClinicalCritic => "Clinical Critic",
            Self::Synthesizer => "Synthesizer",
        }
    }
}

impl FromStr for AgentName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|agent| agent.key() == s)
            .ok_or_else(|| format!("unknown agent: {}", s))
    }
}

// ============================================================================
// Protocol state
// ============================================================================

/// Full projection of a workflow thread, as returned by `POST /generate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolState {
    pub thread_id: String,
    pub status: WorkflowStatus,
    #[serde(default)]
    pub current_draft: String,
    #[serde(default)]
    pub safety_flags: Vec<SafetyFlag>,
    #[serde(default)]
    pub clinical_feedback: String,
    #[serde(default)]
    pub empathy_score: f64,
    #[serde(default)]
    pub safety_score: f64,
    #[serde(default)]
    pub agent_notes: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub iteration_count: u32,
}

impl ProtocolState {
    /// Notes produced by an agent; empty when it has not run yet
    pub fn notes_for(&self, agent: AgentName) -> &[String] {
        self.agent_notes
            .get(agent.key())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Note keys outside the known agent set
    pub fn unknown_note_keys(&self) -> impl Iterator<Item = &str> {
        self.agent_notes
            .keys()
            .map(String::as_str)
            .filter(|key| key.parse::<AgentName>().is_err())
    }

    pub fn awaits_approval(&self) -> bool {
        self.status.awaits_approval()
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Body of `POST /generate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub user_intent: String,
    pub original_query: String,
}

impl GenerateRequest {
    pub fn new(user_intent: impl Into<String>, original_query: impl Into<String>) -> Self {
        Self {
            user_intent: user_intent.into(),
            original_query: original_query.into(),
        }
    }
}

/// Body of `POST /approve`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub thread_id: String,
    pub human_approval: bool,
    pub human_edits: String,
}

impl ApprovalRequest {
    /// An approval of `thread_id`, optionally carrying edited draft text
    pub fn new(thread_id: impl Into<String>, human_edits: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            human_approval: true,
            human_edits: human_edits.into(),
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Narrow response of `POST /approve`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalResponse {
    pub thread_id: String,
    pub status: WorkflowStatus,
    #[serde(default)]
    pub final_protocol: String,
}

/// Response of `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Stored protocol, as returned by `GET /protocol/{thread_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolRecord {
    pub thread_id: String,
    #[serde(default)]
    pub user_intent: String,
    pub status: WorkflowStatus,
    #[serde(default)]
    pub final_protocol: Option<String>,
    #[serde(default)]
    pub safety_score: Option<f64>,
    #[serde(default)]
    pub empathy_score: Option<f64>,
    pub created_at: String,
}

impl ProtocolRecord {
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }
}

/// One entry of `GET /protocols`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolSummary {
    pub thread_id: String,
    #[serde(default)]
    pub user_intent: String,
    pub status: WorkflowStatus,
    #[serde(default)]
    pub safety_score: Option<f64>,
    #[serde(default)]
    pub empathy_score: Option<f64>,
    pub created_at: String,
}

impl ProtocolSummary {
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }
}

/// Response of `GET /protocols`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolList {
    pub count: usize,
    #[serde(default)]
    pub protocols: Vec<ProtocolSummary>,
}

/// Server timestamps are ISO-8601, with or without an offset; naive ones are UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>().ok().map(|ts| ts.and_utc())
}
