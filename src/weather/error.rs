use thiserror::Error;

/// Why a single observation or forecast fetch produced no record.
///
/// Every variant is scoped to one station and one request; none of them
/// aborts a decision run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("No data available for {0}")]
    NotAvailable(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Timed out after {seconds}s fetching {station}")]
    Timeout { station: String, seconds: u64 },
}

impl FetchError {
    /// Absence of data rather than a failure worth warning about
    #[must_use]
    pub fn is_not_available(&self) -> bool {
        matches!(self, FetchError::NotAvailable(_))
    }
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;
