//! Error taxonomy shared by every controller operation.
//!
//! ERROR HANDLING
//! ==============
//! Every async action (guest session, submission, listing, voting) returns
//! `Result<_, BagError>`. The `Configurator` catches these at the point of the
//! user-triggered action and turns them into a status line through
//! [`BagError::status_message`]; nothing propagates past it.
//!
//! Field input never produces an error. Normalizers correct the value and
//! the correction is only logged.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use crate::config::ConfigError;

/// Stable machine-readable code plus retry hint for an error.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

// =============================================================================
// REMOTE OPERATIONS
// =============================================================================

/// The remote API call an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiOperation {
    StartSession,
    ListDesigns,
    SubmitDesign,
    CastVote,
}

impl ApiOperation {
    /// Localized message shown when the server gave no usable error text.
    #[must_use]
    pub fn fallback_message(self) -> &'static str {
        match self {
            Self::StartSession => "Kon niet starten",
            Self::ListDesigns => "Kon inzendingen niet laden",
            Self::SubmitDesign => "Fout bij opslaan",
            Self::CastVote => "Stemmen faalde",
        }
    }
}

impl std::fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::StartSession => "start session",
            Self::ListDesigns => "list designs",
            Self::SubmitDesign => "submit design",
            Self::CastVote => "cast vote",
        };
        f.write_str(name)
    }
}

// =============================================================================
// GUEST INPUT
// =============================================================================

/// Rejected identity input on the auth step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GuestInputError {
    #[error("Gebruikersnaam is verplicht")]
    MissingName,
    #[error("Email is verplicht")]
    MissingEmail,
    #[error("Email is niet geldig")]
    InvalidEmail,
}

// =============================================================================
// BAG ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BagError {
    /// No session token; the auth step has not been completed.
    #[error("not authenticated")]
    Unauthenticated,

    /// Voting requires the caller's own design to be in the pool first.
    #[error("own design must be submitted before voting")]
    MustSubmitFirst,

    /// The server rejected a vote the caller already cast.
    #[error("vote already cast for this design")]
    DuplicateVote,

    /// The server answered with a non-success status.
    #[error("{op} failed: status {status}")]
    Remote { op: ApiOperation, status: u16, message: Option<String> },

    /// The request never produced a response.
    #[error("{op} request failed: {message}")]
    Transport { op: ApiOperation, message: String },

    /// The response body did not match the expected shape.
    #[error("{op} response parse failed: {message}")]
    Parse { op: ApiOperation, message: String },

    /// The guest session response carried no token.
    #[error("no token in session response")]
    MissingToken,

    #[error("guest input rejected: {0}")]
    GuestInput(#[from] GuestInputError),

    #[error("session storage failed: {0}")]
    Storage(String),

    #[error("configuration invalid: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl BagError {
    /// User-facing status text for this failure.
    #[must_use]
    pub fn status_message(&self) -> String {
        match self {
            Self::Unauthenticated => "Vul je gegevens in stap 1 in".to_owned(),
            Self::MustSubmitFirst => "Dien eerst je eigen chipszak in".to_owned(),
            Self::DuplicateVote => "Je hebt al op deze chipszak gestemd".to_owned(),
            Self::Remote { op, message, .. } => match message.as_deref().map(str::trim) {
                Some(text) if !text.is_empty() => text.to_owned(),
                _ => op.fallback_message().to_owned(),
            },
            Self::Transport { op, .. } | Self::Parse { op, .. } => op.fallback_message().to_owned(),
            Self::MissingToken => "Geen token ontvangen".to_owned(),
            Self::GuestInput(e) => e.to_string(),
            Self::Storage(_) => "Kon sessie niet bewaren".to_owned(),
            Self::Config(_) | Self::HttpClientBuild(_) => "Configuratie ongeldig".to_owned(),
        }
    }
}

impl ErrorCode for BagError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "E_UNAUTHENTICATED",
            Self::MustSubmitFirst => "E_MUST_SUBMIT_FIRST",
            Self::DuplicateVote => "E_DUPLICATE_VOTE",
            Self::Remote { .. } => "E_REMOTE",
            Self::Transport { .. } => "E_TRANSPORT",
            Self::Parse { .. } => "E_PARSE",
            Self::MissingToken => "E_MISSING_TOKEN",
            Self::GuestInput(_) => "E_GUEST_INPUT",
            Self::Storage(_) => "E_STORAGE",
            Self::Config(_) => "E_CONFIG",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Remote { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// DUPLICATE VOTE CLASSIFICATION
// =============================================================================

/// MongoDB duplicate-key error code as it appears in server messages.
const DUPLICATE_KEY_CODE: &str = "E11000";
const DUPLICATE_KEY_TEXT: &str = "duplicate key";
const CONFLICT_STATUS: u16 = 409;

/// Map a failed vote call onto [`BagError::DuplicateVote`] when the server
/// reported a uniqueness violation. Any other error passes through unchanged.
#[must_use]
pub fn classify_vote_error(err: BagError) -> BagError {
    match &err {
        BagError::Remote { status: CONFLICT_STATUS, .. } => BagError::DuplicateVote,
        BagError::Remote { message: Some(text), .. } if is_duplicate_key_message(text) => BagError::DuplicateVote,
        _ => err,
    }
}

fn is_duplicate_key_message(text: &str) -> bool {
    text.contains(DUPLICATE_KEY_CODE) || text.to_lowercase().contains(DUPLICATE_KEY_TEXT)
}
