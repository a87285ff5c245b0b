//! Approval gate: which terminal action may be dispatched right now.
//!
//! ```text
//!            ┌──────────── failure ────────────┐
//!            ▼                                 │
//!        Reviewing ──► Approving | Rejecting | Regenerating
//!            ▲                                 │
//!            └── initialize ── Closed ◄─ success
//! ```
//!
//! Only one action can be in flight; while it is, the session refuses edits.

use crate::content::PlatformKey;
use crate::error::ReviewError;
use crate::review::store::ContentStore;
use crate::review::validation::ValidationIssue;
use serde::Serialize;
use std::fmt;
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GatePhase {
    Reviewing,
    Approving,
    Rejecting,
    Regenerating,
    /// A terminal action succeeded; new content must be loaded.
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GateAction {
    Approve,
    Reject,
    Regenerate,
}

impl GateAction {
    fn in_flight_phase(self) -> GatePhase {
        match self {
            Self::Approve => GatePhase::Approving,
            Self::Reject => GatePhase::Rejecting,
            Self::Regenerate => GatePhase::Regenerating,
        }
    }
}

/// Why approval is currently not permitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ApprovalBlocker {
    NoPlatformSelected,
    /// No result computed from the current draft yet.
    AwaitingValidation { platform: PlatformKey },
    /// The fresh result for the draft reports `issues`.
    Invalid {
        platform: PlatformKey,
        issues: Vec<ValidationIssue>,
    },
}

impl fmt::Display for ApprovalBlocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPlatformSelected => f.write_str("no platform selected"),
            Self::AwaitingValidation { platform } => write!(f, "{platform} awaiting validation"),
            Self::Invalid { platform, issues } => {
                write!(f, "{platform} has validation issues")?;
                for (i, issue) in issues.iter().enumerate() {
                    let sep = if i == 0 { ": " } else { ", " };
                    write!(f, "{sep}{}", issue.issue)?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Readiness {
    pub phase: GatePhase,
    pub can_approve: bool,
    pub can_reject: bool,
    pub can_regenerate: bool,
    pub blockers: Vec<ApprovalBlocker>,
}

/// Everything standing between the current state and an approval.
pub fn approval_blockers(store: &ContentStore) -> Vec<ApprovalBlocker> {
    let selected = store.selected_platforms();
    if selected.is_empty() {
        return vec![ApprovalBlocker::NoPlatformSelected];
    }
    selected
        .iter()
        .filter_map(|platform| match store.fresh_result(platform) {
            Some(result) if result.valid => None,
            Some(result) => Some(ApprovalBlocker::Invalid {
                platform: platform.clone(),
                issues: result.issues.clone(),
            }),
            None => Some(ApprovalBlocker::AwaitingValidation {
                platform: platform.clone(),
            }),
        })
        .collect()
}

#[derive(Debug)]
pub struct ApprovalGate {
    phase: GatePhase,
}

impl Default for ApprovalGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ApprovalGate {
    pub fn new() -> Self {
        Self {
            phase: GatePhase::Reviewing,
        }
    }

    pub fn phase(&self) -> GatePhase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        matches!(
            self.phase,
            GatePhase::Approving | GatePhase::Rejecting | GatePhase::Regenerating
        )
    }

    /// Refuse state changes unless the gate is in `Reviewing`.
    pub fn ensure_editable(&self) -> Result<(), ReviewError> {
        match self.phase {
            GatePhase::Reviewing => Ok(()),
            GatePhase::Closed => Err(ReviewError::Closed),
            _ => Err(ReviewError::Busy),
        }
    }

    pub fn readiness(&self, store: &ContentStore) -> Readiness {
        let reviewing = self.phase == GatePhase::Reviewing;
        let blockers = approval_blockers(store);
        Readiness {
            phase: self.phase,
            can_approve: reviewing && blockers.is_empty(),
            can_reject: reviewing,
            can_regenerate: reviewing,
            blockers,
        }
    }

    /// Enter the in-flight phase for `action` if its guard holds.
    pub fn begin(&mut self, action: GateAction, store: &ContentStore) -> Result<(), ReviewError> {
        self.ensure_editable()?;
        if action == GateAction::Approve {
            let blockers = approval_blockers(store);
            if !blockers.is_empty() {
                return Err(ReviewError::NotReady(blockers));
            }
        }
        self.phase = action.in_flight_phase();
        tracing::info!(%action, "review action dispatched");
        Ok(())
    }

    /// Leave the in-flight phase: `Closed` on success, back to `Reviewing`
    /// with all edits intact on failure.
    pub fn finish(&mut self, succeeded: bool) {
        if !self.is_busy() {
            return;
        }
        self.phase = if succeeded {
            GatePhase::Closed
        } else {
            GatePhase::Reviewing
        };
    }

    /// Back to `Reviewing` for newly loaded content.
    pub fn reopen(&mut self) {
        self.phase = GatePhase::Reviewing;
    }
}
