//! Error types used by streams and schedulers.
//!
//! This module defines two main error enums:
//!
//! - [`StreamError`]: the failure delivered through `on_error` to a consumer.
//! - [`SchedulerError`]: errors raised while creating or submitting to a scheduler.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging.

use std::fmt;
use std::io;

use thiserror::Error;

/// # Failure delivered to a consumer through `on_error`.
///
/// A failure reported explicitly by a producer and a failure returned (or raised)
/// by an operator's function are observationally identical downstream.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// Reported by a producer or returned by a fallible operator function.
    #[error("stream failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// An operator function panicked; the panic was caught at the operator boundary.
    #[error("operator panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// A scheduler refused to accept a unit of work.
    #[error("scheduler '{scheduler}' rejected work: {reason}")]
    Rejected {
        /// Name of the scheduler that refused the submission.
        scheduler: &'static str,
        /// Why the submission failed.
        reason: String,
    },
}

impl StreamError {
    /// Builds a [`StreamError::Failed`] from anything printable.
    ///
    /// # Example
    /// ```
    /// use rxflow::StreamError;
    ///
    /// let err = StreamError::failed("boom");
    /// assert_eq!(err.to_string(), "stream failed: boom");
    /// ```
    pub fn failed(error: impl fmt::Display) -> Self {
        StreamError::Failed {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            StreamError::Failed { .. } => "stream_failed",
            StreamError::Panicked { .. } => "stream_panicked",
            StreamError::Rejected { .. } => "stream_rejected",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            StreamError::Failed { error } => format!("error: {error}"),
            StreamError::Panicked { info } => format!("panic: {info}"),
            StreamError::Rejected { scheduler, reason } => {
                format!("rejected by {scheduler}: {reason}")
            }
        }
    }
}

impl From<String> for StreamError {
    fn from(error: String) -> Self {
        StreamError::Failed { error }
    }
}

impl From<&str> for StreamError {
    fn from(error: &str) -> Self {
        StreamError::failed(error)
    }
}

impl From<SchedulerError> for StreamError {
    fn from(err: SchedulerError) -> Self {
        StreamError::Rejected {
            scheduler: err.scheduler(),
            reason: err.as_message(),
        }
    }
}

/// # Errors produced by schedulers.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// Worker threads could not be started.
    #[error("scheduler '{scheduler}' failed to start workers: {source}")]
    Spawn {
        /// Name of the scheduler being built.
        scheduler: &'static str,
        /// The underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The worker that would run the submission is gone.
    #[error("scheduler '{scheduler}' is closed")]
    Closed {
        /// Name of the closed scheduler.
        scheduler: &'static str,
    },
}

impl SchedulerError {
    /// Name of the scheduler this error came from.
    pub fn scheduler(&self) -> &'static str {
        match self {
            SchedulerError::Spawn { scheduler, .. } | SchedulerError::Closed { scheduler } => {
                scheduler
            }
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use rxflow::SchedulerError;
    ///
    /// let err = SchedulerError::Closed { scheduler: "single" };
    /// assert_eq!(err.as_label(), "scheduler_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SchedulerError::Spawn { .. } => "scheduler_spawn_failed",
            SchedulerError::Closed { .. } => "scheduler_closed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SchedulerError::Spawn { source, .. } => format!("spawn failed: {source}"),
            SchedulerError::Closed { .. } => "worker closed".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_conversions_are_failed() {
        assert_eq!(
            StreamError::from("boom"),
            StreamError::Failed {
                error: "boom".into()
            }
        );
        assert_eq!(
            StreamError::from(String::from("x")),
            StreamError::failed("x")
        );
    }

    #[test]
    fn test_scheduler_error_maps_to_rejected() {
        let err: StreamError = SchedulerError::Closed { scheduler: "single" }.into();
        assert_eq!(
            err,
            StreamError::Rejected {
                scheduler: "single",
                reason: "worker closed".into()
            }
        );
        assert_eq!(err.as_label(), "stream_rejected");
    }

    #[test]
    fn test_spawn_error_keeps_source() {
        let err = SchedulerError::Spawn {
            scheduler: "io",
            source: io::Error::other("no threads"),
        };
        assert_eq!(err.as_label(), "scheduler_spawn_failed");
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.scheduler(), "io");
    }
}
