//! Task and offer lifecycle rules.
//!
//! The transition tables are pure functions so the legal edges can be
//! checked without a store. The store operations in [`crate::db`] consult
//! them inside their transactions.
//!
//! ```text
//! open ──offer accepted──▶ in_progress ──provider completes──▶ completed_pending_review
//!                              ▲                                     │        │
//!                              └────────requester rejects────────────┘        │
//!                                                        requester accepts ──▶ closed
//! ```

use crate::error::ApiError;
use crate::types::{OfferStatus, TaskStatus};

/// Something that happens to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskEvent {
    OfferAccepted,
    ProviderCompleted,
    CompletionAccepted,
    CompletionRejected,
}

impl TaskEvent {
    /// The status a task must be in for this event to apply.
    pub fn required_status(self) -> TaskStatus {
        match self {
            TaskEvent::OfferAccepted => TaskStatus::Open,
            TaskEvent::ProviderCompleted => TaskStatus::InProgress,
            TaskEvent::CompletionAccepted | TaskEvent::CompletionRejected => {
                TaskStatus::CompletedPendingReview
            }
        }
    }
}

/// Apply `event` to a task in `from`, or `None` if the edge does not exist.
pub fn next_status(from: TaskStatus, event: TaskEvent) -> Option<TaskStatus> {
    use TaskEvent::*;
    use TaskStatus::*;

    match (from, event) {
        (Open, OfferAccepted) => Some(InProgress),
        (InProgress, ProviderCompleted) => Some(CompletedPendingReview),
        (CompletedPendingReview, CompletionAccepted) => Some(Closed),
        (CompletedPendingReview, CompletionRejected) => Some(InProgress),
        _ => None,
    }
}

/// Like [`next_status`] but reports a bad-request error for illegal edges.
pub fn transition(from: TaskStatus, event: TaskEvent) -> Result<TaskStatus, ApiError> {
    next_status(from, event).ok_or_else(|| {
        ApiError::invalid_state("Task", from.as_str(), event.required_status().as_str())
    })
}

/// Whether an offer still counts against the one-live-offer-per-provider rule.
pub fn offer_is_live(status: OfferStatus) -> bool {
    matches!(status, OfferStatus::Pending | OfferStatus::Accepted)
}

/// Offers may only be decided while pending.
pub fn ensure_offer_pending(status: OfferStatus) -> Result<(), ApiError> {
    if status != OfferStatus::Pending {
        return Err(ApiError::invalid_state("Offer", status.as_str(), "pending"));
    }
    Ok(())
}

/// Tasks accept offers and edits only while open.
pub fn ensure_task_open(status: TaskStatus) -> Result<(), ApiError> {
    if status != TaskStatus::Open {
        return Err(ApiError::invalid_state("Task", status.as_str(), "open"));
    }
    Ok(())
}

/// Progress may be logged only while the task is being worked.
pub fn ensure_task_in_progress(status: TaskStatus) -> Result<(), ApiError> {
    if status != TaskStatus::InProgress {
        return Err(ApiError::invalid_state("Task", status.as_str(), "in_progress"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    const EVENTS: [TaskEvent; 4] = [
        TaskEvent::OfferAccepted,
        TaskEvent::ProviderCompleted,
        TaskEvent::CompletionAccepted,
        TaskEvent::CompletionRejected,
    ];

    #[test]
    fn happy_path_reaches_closed() {
        let mut status = TaskStatus::Open;
        for event in [
            TaskEvent::OfferAccepted,
            TaskEvent::ProviderCompleted,
            TaskEvent::CompletionRejected,
            TaskEvent::ProviderCompleted,
            TaskEvent::CompletionAccepted,
        ] {
            status = transition(status, event).unwrap();
        }
        assert_eq!(status, TaskStatus::Closed);
    }

    #[test]
    fn closed_is_terminal() {
        for event in EVENTS {
            assert_eq!(next_status(TaskStatus::Closed, event), None);
        }
    }

    #[test]
    fn only_table_edges_exist() {
        let mut edges = Vec::new();
        for from in TaskStatus::ALL {
            for event in EVENTS {
                if let Some(to) = next_status(*from, event) {
                    assert_eq!(*from, event.required_status());
                    edges.push((*from, to));
                }
            }
        }
        assert_eq!(
            edges,
            vec![
                (TaskStatus::Open, TaskStatus::InProgress),
                (TaskStatus::InProgress, TaskStatus::CompletedPendingReview),
                (TaskStatus::CompletedPendingReview, TaskStatus::Closed),
                (TaskStatus::CompletedPendingReview, TaskStatus::InProgress),
            ]
        );
    }

    #[test]
    fn illegal_edge_is_bad_request() {
        let err = transition(TaskStatus::Open, TaskEvent::CompletionAccepted).unwrap_err();
        assert_eq!(err.code, ErrorCode::Validation);
        assert_eq!(err.message, "Task is open; expected completed_pending_review");
    }

    #[test]
    fn live_offers() {
        assert!(offer_is_live(OfferStatus::Pending));
        assert!(offer_is_live(OfferStatus::Accepted));
        assert!(!offer_is_live(OfferStatus::Rejected));
        assert!(!offer_is_live(OfferStatus::Withdrawn));
        assert!(ensure_offer_pending(OfferStatus::Rejected).is_err());
    }
}
