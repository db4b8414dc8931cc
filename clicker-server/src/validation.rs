//! Input validation for untrusted data.
//!
//! Every path parameter and request body field is checked here before it
//! reaches the engine.

use thiserror::Error;

/// Maximum length for session IDs.
pub const MAX_SESSION_ID_LEN: usize = 64;
/// Maximum length for upgrade IDs.
pub const MAX_UPGRADE_ID_LEN: usize = 64;
/// Maximum clicks accepted in one request.
pub const MAX_CLICKS_PER_REQUEST: u64 = 10_000;

/// Validation error types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Session ID exceeds maximum length.
    #[error("session_id too long (max {MAX_SESSION_ID_LEN} chars)")]
    SessionIdTooLong,
    /// Session ID is empty or contains invalid characters.
    #[error("session_id contains invalid characters")]
    SessionIdInvalidChars,
    /// Upgrade ID exceeds maximum length.
    #[error("upgrade_id too long (max {MAX_UPGRADE_ID_LEN} chars)")]
    UpgradeIdTooLong,
    /// Upgrade ID is empty or contains invalid characters.
    #[error("upgrade_id contains invalid characters")]
    UpgradeIdInvalidChars,
    /// Click count outside `1..=MAX_CLICKS_PER_REQUEST`.
    #[error("clicks must be between 1 and {MAX_CLICKS_PER_REQUEST}, got {0}")]
    ClickCountOutOfRange(u64),
    /// Request body is not the expected JSON.
    #[error("malformed request body: {0}")]
    MalformedBody(String),
}

impl ValidationError {
    /// Short label for the field that failed, used as a metric label.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::SessionIdTooLong | Self::SessionIdInvalidChars => "session_id",
            Self::UpgradeIdTooLong | Self::UpgradeIdInvalidChars => "upgrade_id",
            Self::ClickCountOutOfRange(_) => "clicks",
            Self::MalformedBody(_) => "body",
        }
    }
}

/// Check if a character is valid for IDs (alphanumeric, hyphen, or underscore).
fn is_valid_id_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

/// Validate a session ID.
///
/// Valid session IDs:
/// - 1-64 characters
/// - Alphanumeric, hyphen, underscore only (UUIDs are valid)
///
/// # Errors
///
/// Returns [`ValidationError::SessionIdTooLong`] if the ID exceeds 64 characters.
/// Returns [`ValidationError::SessionIdInvalidChars`] if the ID is empty or contains
/// invalid characters.
pub fn validate_session_id(id: &str) -> Result<(), ValidationError> {
    if id.len() > MAX_SESSION_ID_LEN {
        return Err(ValidationError::SessionIdTooLong);
    }
    if id.is_empty() || !id.chars().all(is_valid_id_char) {
        return Err(ValidationError::SessionIdInvalidChars);
    }
    Ok(())
}

/// Validate an upgrade ID.
///
/// # Errors
///
/// Returns [`ValidationError::UpgradeIdTooLong`] if the ID exceeds 64 characters.
/// Returns [`ValidationError::UpgradeIdInvalidChars`] if the ID is empty or contains
/// invalid characters.
pub fn validate_upgrade_id(id: &str) -> Result<(), ValidationError> {
    if id.len() > MAX_UPGRADE_ID_LEN {
        return Err(ValidationError::UpgradeIdTooLong);
    }
    if id.is_empty() || !id.chars().all(is_valid_id_char) {
        return Err(ValidationError::UpgradeIdInvalidChars);
    }
    Ok(())
}

/// Validate the number of clicks in one request.
///
/// # Errors
///
/// Returns [`ValidationError::ClickCountOutOfRange`] for zero or more than
/// [`MAX_CLICKS_PER_REQUEST`].
pub fn validate_click_count(clicks: u64) -> Result<(), ValidationError> {
    if clicks == 0 || clicks > MAX_CLICKS_PER_REQUEST {
        return Err(ValidationError::ClickCountOutOfRange(clicks));
    }
    Ok(())
}
