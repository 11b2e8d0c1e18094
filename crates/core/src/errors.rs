use thiserror::Error;

/// Unified error type for the entire vault-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
///
/// A zero denominator in a return calculation is NOT an error: those
/// functions return [`Percentage::Undefined`](crate::models::aggregate::Percentage).
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Quotes / Reconciliation ─────────────────────────────────────
    #[error("Invalid quote for {identifier}: {price} (must be finite and non-negative)")]
    InvalidQuote { identifier: String, price: f64 },

    #[error("Quote provider unavailable ({provider}): {message}")]
    QuoteProviderUnavailable { provider: String, message: String },

    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api { provider: String, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("No provider available for: {0}")]
    NoProvider(String),

    // ── Derivation (programmer errors) ──────────────────────────────
    #[error("Field '{0}' cannot be used for sorting these records")]
    UnsortableField(String),

    #[error("Unknown or inapplicable category key: {0}")]
    UnknownCategoryKey(String),

    #[error("Events must be in chronological order: {previous} is followed by {next}")]
    ChronologyViolation {
        previous: chrono::NaiveDate,
        next: chrono::NaiveDate,
    },

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    // ── Serialization ───────────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl CoreError {
    /// Whether a failed fetch is worth one more attempt.
    /// Only transport-level failures qualify; bad payloads will not improve on retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CoreError::Network(_) | CoreError::QuoteProviderUnavailable { .. }
        )
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors carry the full URL; strip the query so API keys never reach logs.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
