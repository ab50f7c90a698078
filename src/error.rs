use thiserror::Error;

#[derive(Error, Debug)]
pub enum EconomiaError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Not signed in. Run `economia login` or `economia signup` first.")]
    NotSignedIn,

    #[error("No shared space linked. Run `economia pair create` or `economia pair join <CODE>`.")]
    NoSharedSpace,

    #[error("The combined view is read-only. Pick --view personal or --view shared.")]
    CombinedViewReadOnly,

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Unknown payment method: {0}")]
    UnknownPaymentMethod(String),

    #[error("Unknown savings goal: {0}")]
    UnknownGoal(String),

    #[error("Invalid invite code.")]
    InvalidInviteCode,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid month: {0}")]
    InvalidMonth(String),

    #[error("{0}")]
    Validation(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Confirmation text did not match; nothing was deleted.")]
    ConfirmationMismatch,

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, EconomiaError>;
