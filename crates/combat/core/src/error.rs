//! Common error infrastructure for combat-core.
//!
//! Domain-specific errors (e.g. [`crate::action::Rejection`],
//! [`crate::engine::CombatError`]) live next to the code that raises them and
//! implement [`GameError`] so hosts can classify them uniformly.

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the declaration can be retried or another option chosen
/// - **Validation**: invalid input, reject without retrying unchanged
/// - **Internal**: unexpected inconsistency, investigate
/// - **Fatal**: the encounter cannot continue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all combat-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
/// - Error codes are stable strings suitable for logs and tests
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
