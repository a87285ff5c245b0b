//! One review of one generation request.
//!
//! [`ReviewSession`] wires the store, the validation orchestrator and the
//! approval gate together and is the only surface callers mutate state
//! through. Every method runs to completion before the next observes the
//! state; the publisher call is the only suspension point of an action.

use super::catalog::PlatformCatalog;
use super::gate::{ApprovalGate, GateAction, GatePhase, Readiness};
use super::orchestrator::{SharedStore, ValidationOrchestrator, lock_store};
use super::store::{ContentStore, EditVersion, ReviewState, ValidationStatus};
use super::validation::ValidationResult;
use crate::api::traits::{ApprovalPayload, Publisher, ValidationService};
use crate::content::{EditableContent, FieldEdit, GeneratedContent, PlatformKey};
use crate::error::ReviewError;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use uuid::Uuid;

/// Per-platform view for rendering surfaces.
#[derive(Debug, Clone, Serialize)]
pub struct PlatformReport {
    pub platform: PlatformKey,
    pub selected: bool,
    pub version: EditVersion,
    pub status: ValidationStatus,
    pub draft: EditableContent,
    pub result: Option<ValidationResult>,
    pub error: Option<String>,
}

pub struct ReviewSession {
    id: String,
    catalog: Arc<PlatformCatalog>,
    store: SharedStore,
    gate: Mutex<ApprovalGate>,
    orchestrator: ValidationOrchestrator,
    publisher: Arc<dyn Publisher>,
}

impl ReviewSession {
    pub fn new(
        catalog: Arc<PlatformCatalog>,
        validator: Arc<dyn ValidationService>,
        publisher: Arc<dyn Publisher>,
        quiet_period: Duration,
    ) -> Self {
        let store: SharedStore = Arc::new(Mutex::new(ContentStore::new()));
        let orchestrator = ValidationOrchestrator::new(Arc::clone(&store), validator, quiet_period);
        Self {
            id: format!("review_{}", Uuid::new_v4().simple()),
            catalog,
            store,
            gate: Mutex::new(ApprovalGate::new()),
            orchestrator,
            publisher,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn catalog(&self) -> &PlatformCatalog {
        &self.catalog
    }

    fn store(&self) -> MutexGuard<'_, ContentStore> {
        lock_store(&self.store)
    }

    fn gate(&self) -> MutexGuard<'_, ApprovalGate> {
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start reviewing `generated`. Drafts are seeded for platforms known to
    /// the catalog and validated right away in the background. Returns the
    /// number of drafts. Refused while an action is in flight, since its
    /// outcome applies to the content being replaced.
    pub fn initialize(&self, generated: GeneratedContent) -> Result<usize, ReviewError> {
        let drafts = {
            let mut store = self.store();
            let mut gate = self.gate();
            if gate.is_busy() {
                return Err(ReviewError::Busy);
            }
            self.orchestrator.cancel_all();
            for platform in generated.platform_specific.keys() {
                if !self.catalog.contains(platform) {
                    tracing::warn!(%platform, session = %self.id, "skipping content for platform missing from catalog");
                }
            }
            store.initialize_with(generated, |platform| self.catalog.contains(platform));
            gate.reopen();
            store.platforms().count()
        };
        tracing::info!(session = %self.id, drafts, "review started");
        self.orchestrator.validate_all();
        Ok(drafts)
    }

    pub fn set_platform_selected(
        &self,
        platform: &PlatformKey,
        enabled: bool,
    ) -> Result<bool, ReviewError> {
        let mut store = self.store();
        self.gate().ensure_editable()?;
        Ok(store.set_platform_selected(platform, enabled))
    }

    /// Apply an edit and schedule a debounced validation of that platform.
    /// Unknown platforms are ignored and yield `None`.
    pub fn edit_field(
        &self,
        platform: &PlatformKey,
        edit: FieldEdit,
    ) -> Result<Option<EditVersion>, ReviewError> {
        let version = {
            let mut store = self.store();
            self.gate().ensure_editable()?;
            store.edit_field(platform, edit)
        };
        if version.is_some() {
            self.orchestrator.schedule(platform);
        }
        Ok(version)
    }

    /// Add a suggested hashtag, refusing once the platform's cap is reached.
    pub fn add_hashtag_suggestion(
        &self,
        platform: &PlatformKey,
        tag: &str,
    ) -> Result<bool, ReviewError> {
        let limit = self
            .catalog
            .get(platform)
            .map_or(0, |p| p.limits.hashtag_limit);
        let version = {
            let mut store = self.store();
            self.gate().ensure_editable()?;
            store.add_hashtag_suggestion(platform, tag, limit)
        };
        if version.is_some() {
            self.orchestrator.schedule(platform);
        }
        Ok(version.is_some())
    }

    pub fn remove_hashtag(&self, platform: &PlatformKey, tag: &str) -> Result<bool, ReviewError> {
        let version = {
            let mut store = self.store();
            self.gate().ensure_editable()?;
            store.remove_hashtag(platform, tag)
        };
        if version.is_some() {
            self.orchestrator.schedule(platform);
        }
        Ok(version.is_some())
    }

    pub fn toggle_edit_mode(&self) -> bool {
        self.store().toggle_edit_mode()
    }

    /// Validate one platform now instead of waiting for the quiet period.
    pub async fn validate_now(&self, platform: &PlatformKey) -> bool {
        self.orchestrator.validate_now(platform).await
    }

    /// Wait for pending and in-flight validations to finish.
    pub async fn settle(&self) {
        self.orchestrator.settle().await;
    }

    pub fn phase(&self) -> GatePhase {
        self.gate().phase()
    }

    pub fn readiness(&self) -> Readiness {
        let store = self.store();
        self.gate().readiness(&store)
    }

    pub fn state(&self) -> ReviewState {
        self.store().state().clone()
    }

    pub fn reports(&self) -> Vec<PlatformReport> {
        let store = self.store();
        store
            .platforms()
            .filter_map(|platform| {
                Some(PlatformReport {
                    platform: platform.clone(),
                    selected: store.is_selected(platform),
                    version: store.version(platform)?,
                    status: store.validation_status(platform)?,
                    draft: store.draft(platform)?.clone(),
                    result: store.validation_result(platform).cloned(),
                    error: store.validation_error(platform).map(str::to_string),
                })
            })
            .collect()
    }

    /// Hand the selected drafts to the publisher. On failure the session is
    /// back in `Reviewing` with every edit and selection preserved.
    pub async fn approve(&self) -> Result<ApprovalPayload, ReviewError> {
        let payload = {
            let store = self.store();
            self.gate().begin(GateAction::Approve, &store)?;
            store.build_approval_payload()
        };

        match self.publisher.approve(&payload).await {
            Ok(()) => {
                self.orchestrator.cancel_all();
                self.gate().finish(true);
                tracing::info!(session = %self.id, platforms = payload.len(), "content approved");
                Ok(payload)
            }
            Err(error) => {
                self.gate().finish(false);
                tracing::warn!(session = %self.id, %error, "approval failed; edits kept");
                Err(ReviewError::Submission(error))
            }
        }
    }

    pub async fn reject(&self) -> Result<(), ReviewError> {
        self.dispatch_discard(GateAction::Reject).await
    }

    pub async fn regenerate(&self) -> Result<(), ReviewError> {
        self.dispatch_discard(GateAction::Regenerate).await
    }

    /// Reject and regenerate discard the review state once the collaborator
    /// accepts them.
    async fn dispatch_discard(&self, action: GateAction) -> Result<(), ReviewError> {
        {
            let store = self.store();
            self.gate().begin(action, &store)?;
        }

        let outcome = if action == GateAction::Reject {
            self.publisher.reject().await
        } else {
            self.publisher.regenerate().await
        };

        match outcome {
            Ok(()) => {
                self.orchestrator.cancel_all();
                let mut store = self.store();
                store.reset();
                self.gate().finish(true);
                tracing::info!(session = %self.id, %action, "review discarded");
                Ok(())
            }
            Err(error) => {
                self.gate().finish(false);
                tracing::warn!(session = %self.id, %action, %error, "action failed; edits kept");
                Err(ReviewError::Submission(error))
            }
        }
    }
}
