//! Outcome of steps whose failure is allowed.
//!
//! Cosmetic steps (banner dismissal, the "latest" copy, the network idle wait)
//! return a [`BestEffort`] instead of a `Result`, so the set of failures the
//! pipeline is willing to ignore is visible in the types.

use std::fmt;

/// A failure that was absorbed instead of propagated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ignored {
    /// Step that failed, e.g. "latest_copy".
    pub step: &'static str,
    /// Human-readable reason.
    pub reason: String,
}

impl fmt::Display for Ignored {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} skipped: {}", self.step, self.reason)
    }
}

/// Result of a best-effort step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BestEffort<T> {
    Done(T),
    Ignored(Ignored),
}

impl<T> BestEffort<T> {
    /// Record a sanctioned failure. Logging is left to the caller, which
    /// knows whether the failure is routine.
    pub fn ignored(step: &'static str, reason: impl Into<String>) -> Self {
        Self::Ignored(Ignored {
            step,
            reason: reason.into(),
        })
    }

    /// Absorb the error side of a result.
    pub fn from_result<E: fmt::Display>(step: &'static str, result: Result<T, E>) -> Self {
        match result {
            Ok(v) => Self::Done(v),
            Err(e) => Self::ignored(step, e.to_string()),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    pub fn done(self) -> Option<T> {
        match self {
            Self::Done(v) => Some(v),
            Self::Ignored(_) => None,
        }
    }

    pub fn as_ref(&self) -> BestEffort<&T> {
        match self {
            Self::Done(v) => BestEffort::Done(v),
            Self::Ignored(i) => BestEffort::Ignored(i.clone()),
        }
    }
}
