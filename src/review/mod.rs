pub mod catalog;
pub mod gate;
pub mod orchestrator;
pub mod session;
pub mod store;
pub mod validation;

pub use catalog::{PlatformCatalog, StaticPlatformSource, builtin_platforms};
pub use gate::{ApprovalBlocker, ApprovalGate, GateAction, GatePhase, Readiness};
pub use orchestrator::ValidationOrchestrator;
pub use session::{PlatformReport, ReviewSession};
pub use store::{ContentStore, EditVersion, ReviewState, ValidationStatus};
pub use validation::{CharacterCounts, LocalValidator, ValidationIssue, ValidationResult, validate};
