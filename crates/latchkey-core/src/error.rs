use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Input errors
    #[error("Invalid code: {0}")]
    InvalidCode(String),

    #[error("Invalid key id: {0}")]
    InvalidKeyId(u8),

    // State machine errors
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a submitted code was refused.
///
/// Rejections are ordinary outcomes of the access flow, not failures of the
/// system: each one is handled by the responsible mode handler and always
/// resolves back to the locked state. They are reported for logging and
/// diagnostics, never propagated as `Err`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Admin new-code input was not exactly four digits.
    #[error("admin code must be exactly 4 digits")]
    InvalidAdminFormat,

    /// Admin confirmation did not match the staged code.
    #[error("admin confirmation does not match staged code")]
    AdminConfirmMismatch,

    /// Submitted code matched nothing.
    #[error("unknown code")]
    UnknownCode,

    /// Guest code submitted after it was already used.
    #[error("guest code already used")]
    GuestCodeReused,

    /// Guest code submitted after its validity window.
    #[error("guest code expired")]
    GuestCodeExpired,

    /// Panic trigger while a panic sequence is already running.
    #[error("panic sequence already active")]
    PanicReentry,
}

impl Rejection {
    /// Returns `true` if this rejection counts towards lockdown.
    #[must_use]
    pub fn counts_as_failure(self) -> bool {
        matches!(
            self,
            Rejection::UnknownCode | Rejection::GuestCodeReused | Rejection::GuestCodeExpired
        )
    }
}
