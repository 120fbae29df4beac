//! Notification contract: user-facing feedback and the durable submission
//! trail.
//!
//! Template approval happens out-of-band on the provider's side, usually on
//! a 24-48 hour cycle. The durable [`SubmissionRecord`] lets an embedder
//! correlate a later approval event with the submission that caused it.

use std::error::Error as StdError;

use chrono::{DateTime, Utc};

use crate::BoxFuture;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Visual weight of a notification.
pub enum Severity {
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One user-facing notification.
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notification {
    /// A default-severity notification.
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Default,
        }
    }

    /// A destructive-severity notification.
    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Destructive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Durable record of one successful submission.
pub struct SubmissionRecord {
    pub template_name: String,
    pub language: String,
    pub provider_id: String,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification backend error: {0}")]
    Backend(#[source] Box<dyn StdError + Send + Sync>),
}

/// Object-safe notification sink the workflow reports into.
///
/// Both operations are treated as best-effort by the workflow: a failing
/// sink never rolls back a submission that already succeeded remotely.
pub trait Notifier: Send + Sync {
    fn notify<'a>(&'a self, notification: Notification) -> BoxFuture<'a, Result<(), NotifyError>>;

    fn record_submission<'a>(
        &'a self,
        record: SubmissionRecord,
    ) -> BoxFuture<'a, Result<(), NotifyError>>;
}
