use thiserror::Error;

use crate::content::PlatformKey;
use crate::review::gate::ApprovalBlocker;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `copydesk`.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide recovery strategy; the binary continues to use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum CopydeskError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Remote API ───────────────────────────────────────────────────────
    #[error("api: {0}")]
    Api(#[from] ApiError),

    // ── Platform catalog ────────────────────────────────────────────────
    #[error("catalog: {0}")]
    Catalog(#[from] CatalogError),

    // ── Review workflow ─────────────────────────────────────────────────
    #[error("review: {0}")]
    Review(#[from] ReviewError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Remote API errors ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{endpoint} request failed: {message}")]
    Request { endpoint: String, message: String },

    #[error("{endpoint} returned {status}: {message}")]
    Status {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("{endpoint} response could not be decoded: {message}")]
    Decode { endpoint: String, message: String },

    #[error("{endpoint} rejected the request: {message}")]
    Rejected { endpoint: String, message: String },

    #[error("session expired; log in again")]
    SessionExpired,

    #[error("no API token configured")]
    Unauthenticated,
}

// ─── Platform catalog errors ─────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("platform catalog unavailable: {0}")]
    Unavailable(#[source] ApiError),

    #[error("unknown platform: {0}")]
    UnknownPlatform(PlatformKey),

    #[error("platform catalog is empty")]
    Empty,
}

impl CatalogError {
    /// Whether reloading the catalog may succeed without user intervention.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Unavailable(source) => !matches!(
                source,
                ApiError::SessionExpired | ApiError::Unauthenticated
            ),
            Self::Empty => true,
            Self::UnknownPlatform(_) => false,
        }
    }
}

// ─── Review workflow errors ──────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("another action is already in progress")]
    Busy,

    #[error("review session is closed; load new content first")]
    Closed,

    #[error("approval blocked: {}", format_blockers(.0))]
    NotReady(Vec<ApprovalBlocker>),

    #[error("submission failed: {0}")]
    Submission(#[source] ApiError),
}

fn format_blockers(blockers: &[ApprovalBlocker]) -> String {
    blockers
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T, E = CopydeskError> = std::result::Result<T, E>;
