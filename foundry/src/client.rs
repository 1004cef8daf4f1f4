//! Workflow client
//!
//! Single authoritative holder of the local [`ProtocolState`] slot. The two
//! workflow operations never return errors: every failure is recorded in the
//! snapshot's error slot and the busy indicator is always released.
//!
//! State policy:
//! - `generate` replaces the whole state with the server's projection
//! - `approve` merges only `status` and `current_draft`; review-derived
//!   fields stay frozen at their last known values
//! - `reset` returns the slot to absent and supersedes in-flight requests

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use foundry_common::{
    ApprovalRequest, ApprovalResponse, GenerateRequest, HealthStatus, ProtocolList,
    ProtocolRecord, ProtocolState,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;

use crate::transport::{TransportError, TransportResult, WorkflowTransport};

// ============================================================================
// Errors and outcomes
// ============================================================================

/// The two state-changing operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Generate,
    Approve,
}

impl Operation {
    /// Message shown when the server gives no detail
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::Generate => "Generation failed",
            Self::Approve => "Approval failed",
        }
    }
}

/// The only error kind observable at the client boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("{}", failure_message(.operation, .detail))]
    RequestFailed {
        operation: Operation,
        /// Server-supplied message, if any
        detail: Option<String>,
    },
}

fn failure_message(operation: &Operation, detail: &Option<String>) -> String {
    detail
        .clone()
        .unwrap_or_else(|| operation.fallback_message().to_string())
}

impl ClientError {
    fn from_transport(operation: Operation, err: &TransportError) -> Self {
        Self::RequestFailed {
            operation,
            detail: err.detail().map(str::to_string),
        }
    }
}

/// How an operation settled
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The response was applied to the slot
    Applied,
    /// The request failed; the message is also in the error slot
    Failed(ClientError),
    /// A later request superseded this one and its response was dropped
    Discarded,
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Policy for responses that resolve after a newer request was issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseOrdering {
    /// Drop responses overtaken by a later `generate`, `reset`, or `approve`
    /// that has already been applied
    #[default]
    DiscardStale,
    /// Apply every response in resolution order, whatever order they started in
    LastResolvedWins,
}

// ============================================================================
// Snapshot
// ============================================================================

/// What presentation sees: state, busy indicator, and last error
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientSnapshot {
    /// `None` until the first successful `generate`
    pub state: Option<ProtocolState>,
    /// Last failure message; cleared when an operation starts
    pub error: Option<String>,
    pub(crate) pending: usize,
}

impl ClientSnapshot {
    /// True while at least one operation is in flight
    pub fn loading(&self) -> bool {
        self.pending > 0
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Approval is legal only for a held state that is halted
    pub fn can_approve(&self) -> bool {
        self.state
            .as_ref()
            .map(ProtocolState::awaits_approval)
            .unwrap_or(false)
    }
}

// ============================================================================
// Client
// ============================================================================

/// Sequence numbers captured when a request starts
#[derive(Debug, Clone, Copy)]
struct Ticket {
    epoch: u64,
    approval: Option<u64>,
}

/// Client for the protocol workflow server
pub struct WorkflowClient {
    transport: Arc<dyn WorkflowTransport>,
    ordering: ResponseOrdering,
    slot: watch::Sender<ClientSnapshot>,
    /// Bumped by every `generate` start and every `reset`
    epoch: AtomicU64,
    /// Epoch of the last applied `generate` or `reset`
    applied_epoch: AtomicU64,
    /// Bumped by every `approve` start
    approvals: AtomicU64,
    /// Sequence number of the last applied `approve`
    applied_approval: AtomicU64,
}

impl WorkflowClient {
    /// Create a client with no local state
    pub fn new(transport: Arc<dyn WorkflowTransport>) -> Self {
        let (slot, _) = watch::channel(ClientSnapshot::default());
        Self {
            transport,
            ordering: ResponseOrdering::default(),
            slot,
            epoch: AtomicU64::new(0),
            applied_epoch: AtomicU64::new(0),
            approvals: AtomicU64::new(0),
            applied_approval: AtomicU64::new(0),
        }
    }

    /// Set the policy for out-of-order responses
    pub fn with_ordering(mut self, ordering: ResponseOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Create a client over HTTP from the resolved API settings
    #[cfg(feature = "http")]
    pub fn connect(api: &crate::config::ApiConfig) -> TransportResult<Self> {
        let transport = crate::transport::HttpTransport::new(&api.url, api.timeout())?;
        Ok(Self::new(Arc::new(transport)).with_ordering(api.ordering))
    }

    pub fn ordering(&self) -> ResponseOrdering {
        self.ordering
    }

    /// Current snapshot (cloned)
    pub fn snapshot(&self) -> ClientSnapshot {
        self.slot.borrow().clone()
    }

    /// Receiver notified on every slot change
    pub fn subscribe(&self) -> watch::Receiver<ClientSnapshot> {
        self.slot.subscribe()
    }

    pub fn state(&self) -> Option<ProtocolState> {
        self.slot.borrow().state.clone()
    }

    pub fn loading(&self) -> bool {
        self.slot.borrow().loading()
    }

    pub fn error(&self) -> Option<String> {
        self.slot.borrow().error.clone()
    }

    /// Start (or restart) a workflow thread
    ///
    /// On success the local state is replaced by the response verbatim. On
    /// failure the previous state, if any, is kept.
    pub async fn generate(&self, user_intent: &str, original_query: &str) -> Outcome {
        let ticket = self.begin(Operation::Generate);
        tracing::info!(
            intent_len = user_intent.len(),
            "Generating protocol: {}",
            truncate(user_intent, 60)
        );

        let request = GenerateRequest::new(user_intent, original_query);
        let result = self.transport.generate(&request).await;

        self.settle(ticket, Operation::Generate, result, |snapshot, next| {
            replace_state(snapshot, next)
        })
    }

    /// Approve a halted thread, optionally with edited draft text
    ///
    /// Only `status` and `current_draft` of a held state with the same
    /// `thread_id` are updated. Without a held state this is a no-op.
    pub async fn approve(&self, thread_id: &str, edits: &str) -> Outcome {
        let ticket = self.begin(Operation::Approve);
        tracing::info!(
            thread_id,
            edits_provided = !edits.is_empty(),
            "Approving protocol"
        );

        let request = ApprovalRequest::new(thread_id, edits);
        let result = self.transport.approve(&request).await;

        self.settle(ticket, Operation::Approve, result, |snapshot, reply| {
            merge_approval(snapshot, reply)
        })
    }

    /// Drop the local state and error, superseding in-flight requests
    pub fn reset(&self) {
        self.slot.send_modify(|snapshot| {
            let epoch = self.epoch.fetch_add(1, AtomicOrdering::SeqCst) + 1;
            self.applied_epoch.store(epoch, AtomicOrdering::SeqCst);
            snapshot.state = None;
            snapshot.error = None;
        });
        tracing::debug!("Workflow state reset");
    }

    /// Server liveness; does not touch the slot
    pub async fn health(&self) -> TransportResult<HealthStatus> {
        self.transport.health().await
    }

    /// Stored record of a thread; does not touch the slot
    pub async fn fetch_protocol(&self, thread_id: &str) -> TransportResult<ProtocolRecord> {
        self.transport.fetch_protocol(thread_id).await
    }

    /// Most recent stored protocols; does not touch the slot
    pub async fn list_protocols(&self, limit: usize) -> TransportResult<ProtocolList> {
        self.transport.list_protocols(limit).await
    }

    /// Mark an operation as pending, clear the error, and take a ticket
    fn begin(&self, operation: Operation) -> Ticket {
        let mut ticket = Ticket {
            epoch: 0,
            approval: None,
        };

        self.slot.send_modify(|snapshot| {
            ticket = match operation {
                Operation::Generate => Ticket {
                    epoch: self.epoch.fetch_add(1, AtomicOrdering::SeqCst) + 1,
                    approval: None,
                },
                Operation::Approve => Ticket {
                    epoch: self.epoch.load(AtomicOrdering::SeqCst),
                    approval: Some(self.approvals.fetch_add(1, AtomicOrdering::SeqCst) + 1),
                },
            };
            snapshot.pending += 1;
            snapshot.error = None;
        });

        ticket
    }

    fn is_stale(&self, ticket: Ticket) -> bool {
        if self.ordering == ResponseOrdering::LastResolvedWins {
            return false;
        }
        // Only a later request that actually landed supersedes this one
        if self.applied_epoch.load(AtomicOrdering::SeqCst) > ticket.epoch {
            return true;
        }
        match ticket.approval {
            Some(seq) => self.applied_approval.load(AtomicOrdering::SeqCst) > seq,
            None => false,
        }
    }

    fn mark_applied(&self, ticket: Ticket) {
        match ticket.approval {
            Some(seq) => self.applied_approval.fetch_max(seq, AtomicOrdering::SeqCst),
            None => self.applied_epoch.fetch_max(ticket.epoch, AtomicOrdering::SeqCst),
        };
    }

    /// Release the pending mark and apply the result unless it is stale
    fn settle<T>(
        &self,
        ticket: Ticket,
        operation: Operation,
        result: TransportResult<T>,
        apply: impl FnOnce(&mut ClientSnapshot, T),
    ) -> Outcome {
        let mut outcome = Outcome::Discarded;

        self.slot.send_modify(|snapshot| {
            snapshot.pending = snapshot.pending.saturating_sub(1);

            if self.is_stale(ticket) {
                tracing::debug!(?operation, "Discarding superseded response");
                return;
            }

            outcome = match result {
                Ok(value) => {
                    apply(snapshot, value);
                    self.mark_applied(ticket);
                    Outcome::Applied
                }
                Err(err) => {
                    tracing::warn!(?operation, "Request failed: {}", err);
                    let error = ClientError::from_transport(operation, &err);
                    snapshot.error = Some(error.to_string());
                    Outcome::Failed(error)
                }
            };
        });

        outcome
    }
}

// ============================================================================
// Reconciliation
// ============================================================================

/// Full replacement: a fresh projection always wins
fn replace_state(snapshot: &mut ClientSnapshot, next: ProtocolState) {
    if let Some(prev) = &snapshot.state {
        if prev.thread_id == next.thread_id && next.iteration_count < prev.iteration_count {
            tracing::warn!(
                thread_id = %next.thread_id,
                "Iteration count went backwards ({} -> {})",
                prev.iteration_count,
                next.iteration_count
            );
        }
    }
    if !next.status.is_known() {
        tracing::warn!(thread_id = %next.thread_id, "Unrecognised workflow status: {}", next.status);
    }
    for key in next.unknown_note_keys() {
        tracing::debug!("Notes from unknown agent '{}'", key);
    }

    tracing::info!(
        thread_id = %next.thread_id,
        status = %next.status,
        iteration = next.iteration_count,
        flags = next.safety_flags.len(),
        "Protocol state replaced"
    );
    snapshot.state = Some(next);
}

/// Partial merge: status and draft only, everything else stays frozen
fn merge_approval(snapshot: &mut ClientSnapshot, reply: ApprovalResponse) {
    let Some(state) = snapshot.state.as_mut() else {
        tracing::debug!(thread_id = %reply.thread_id, "No local state; approval merge skipped");
        return;
    };

    if state.thread_id != reply.thread_id {
        tracing::warn!(
            "Approval for thread {} does not match held thread {}; merge skipped",
            reply.thread_id,
            state.thread_id
        );
        return;
    }

    if !reply.status.is_known() {
        tracing::warn!(thread_id = %reply.thread_id, "Unrecognised workflow status: {}", reply.status);
    }

    tracing::info!(thread_id = %reply.thread_id, status = %reply.status, "Approval merged");
    state.status = reply.status;
    state.current_draft = reply.final_protocol;
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
