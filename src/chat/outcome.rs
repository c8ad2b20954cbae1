// ABOUTME: StageOutcome type - a value plus whether its stage degraded
// ABOUTME: Lets tests assert degradation reasons while responses stay unchanged
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Summit Coach

/// Result of one pipeline stage
///
/// Every stage produces a usable value; `Degraded` records that the value is
/// a fallback and why. The product-visible response is identical either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome<T> {
    /// The stage completed normally
    Ok(T),
    /// The stage fell back to a default
    Degraded {
        /// The fallback value the pipeline continues with
        value: T,
        /// Why the stage degraded, for logs and tests
        reason: String,
    },
}

impl<T> StageOutcome<T> {
    /// Wrap a fallback value with its reason
    pub fn degraded(value: T, reason: impl Into<String>) -> Self {
        Self::Degraded {
            value,
            reason: reason.into(),
        }
    }

    /// Extract the value, dropping degradation information
    pub fn into_value(self) -> T {
        match self {
            Self::Ok(value) | Self::Degraded { value, .. } => value,
        }
    }

    /// Borrow the value regardless of outcome
    pub const fn value(&self) -> &T {
        match self {
            Self::Ok(value) | Self::Degraded { value, .. } => value,
        }
    }

    /// Degradation reason, if any
    #[must_use]
    pub fn degradation_reason(&self) -> Option<&str> {
        match self {
            Self::Ok(_) => None,
            Self::Degraded { reason, .. } => Some(reason),
        }
    }

    /// Whether the stage degraded
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// Map the carried value, preserving the outcome kind
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> StageOutcome<U> {
        match self {
            Self::Ok(value) => StageOutcome::Ok(f(value)),
            Self::Degraded { value, reason } => StageOutcome::Degraded {
                value: f(value),
                reason,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_has_no_reason() {
        let outcome = StageOutcome::Ok(7);
        assert!(!outcome.is_degraded());
        assert!(outcome.degradation_reason().is_none());
        assert_eq!(outcome.into_value(), 7);
    }

    #[test]
    fn test_degraded_keeps_reason() {
        let outcome = StageOutcome::degraded(vec!["fallback"], "search unavailable");
        assert!(outcome.is_degraded());
        assert_eq!(outcome.degradation_reason(), Some("search unavailable"));
        assert_eq!(outcome.into_value(), vec!["fallback"]);
    }

    #[test]
    fn test_map_preserves_kind() {
        let outcome = StageOutcome::degraded(2, "why").map(|n| n * 10);
        assert_eq!(outcome, StageOutcome::degraded(20, "why"));
    }
}
