//! Integration tests for offers, the task lifecycle and progress logging.

use task_market::db::Database;
use task_market::error::{ApiError, ErrorCode};
use task_market::types::{NewOffer, NewTask, NewUser, OfferStatus, Role, TaskStatus, UserType};

/// Helper to create a fresh in-memory database for testing.
fn setup_db() -> Database {
    Database::open_in_memory().expect("Failed to create in-memory database")
}

fn code(err: anyhow::Error) -> ErrorCode {
    ApiError::from(err).code
}

fn add_user(db: &Database, email: &str, role: Role) -> String {
    let input = NewUser {
        email: email.to_string(),
        password: "password123".to_string(),
        role: Some(role),
        user_type: Some(UserType::Individual),
        first_name: Some("Kim".to_string()),
        last_name: Some("Ng".to_string()),
        ..Default::default()
    };
    db.create_user(&input, role, UserType::Individual, "hash")
        .expect("Failed to create user")
        .id
}

fn offer(rate: f64) -> NewOffer {
    NewOffer {
        offered_rate: rate,
        rate_currency: "USD".to_string(),
        message: None,
    }
}

/// A requester, two providers and one open task.
struct Market {
    db: Database,
    requester: String,
    p1: String,
    p2: String,
    task: String,
}

fn market() -> Market {
    let db = setup_db();
    let requester = add_user(&db, "req@example.com", Role::Requester);
    let p1 = add_user(&db, "p1@example.com", Role::Provider);
    let p2 = add_user(&db, "p2@example.com", Role::Provider);
    let task = db
        .create_task(
            &requester,
            &NewTask {
                category: "Cleaning".to_string(),
                name: "T1".to_string(),
                description: "Deep clean after move-out".to_string(),
                start_date: "2026-11-20".to_string(),
                expected_working_hours: 5,
                hourly_rate: 45.0,
                rate_currency: "USD".to_string(),
            },
        )
        .expect("Failed to create task")
        .id;
    Market {
        db,
        requester,
        p1,
        p2,
        task,
    }
}

/// Market where P1's offer has been accepted.
fn started() -> Market {
    let m = market();
    let o = m.db.make_offer(&m.task, &m.p1, &offer(50.0)).unwrap();
    m.db.accept_offer(&o.id, &m.requester).unwrap();
    m
}

fn task_status(m: &Market) -> TaskStatus {
    m.db.get_task(&m.task).unwrap().unwrap().status
}

mod offer_tests {
    use super::*;

    #[test]
    fn accepting_one_offer_rejects_the_rest() {
        let m = market();
        let o1 = m.db.make_offer(&m.task, &m.p1, &offer(50.0)).unwrap();
        let o2 = m.db.make_offer(&m.task, &m.p2, &offer(60.0)).unwrap();
        assert_eq!(o1.status, OfferStatus::Pending);

        let accepted = m.db.accept_offer(&o1.id, &m.requester).unwrap();
        assert_eq!(accepted.status, OfferStatus::Accepted);
        assert_eq!(task_status(&m), TaskStatus::InProgress);
        assert_eq!(
            m.db.get_offer(&o2.id).unwrap().unwrap().status,
            OfferStatus::Rejected
        );
        assert_eq!(
            m.db.get_accepted_provider(&m.task).unwrap().as_deref(),
            Some(m.p1.as_str())
        );

        let all = m.db.list_offers_for_task(&m.task, &m.requester).unwrap();
        let accepted_count = all
            .iter()
            .filter(|o| o.status == OfferStatus::Accepted)
            .count();
        assert_eq!(accepted_count, 1);

        // The task is no longer open for bids
        let err = m.db.make_offer(&m.task, &m.p2, &offer(55.0)).unwrap_err();
        assert_eq!(code(err), ErrorCode::Validation);
    }

    #[test]
    fn second_accept_on_same_task_fails() {
        let m = market();
        let o1 = m.db.make_offer(&m.task, &m.p1, &offer(50.0)).unwrap();
        let o2 = m.db.make_offer(&m.task, &m.p2, &offer(60.0)).unwrap();
        m.db.accept_offer(&o1.id, &m.requester).unwrap();

        let err = m.db.accept_offer(&o2.id, &m.requester).unwrap_err();
        assert_eq!(code(err), ErrorCode::Validation);
        assert_eq!(
            m.db.get_offer(&o1.id).unwrap().unwrap().status,
            OfferStatus::Accepted
        );
    }

    #[test]
    fn provider_cannot_bid_twice() {
        let m = market();
        m.db.make_offer(&m.task, &m.p1, &offer(50.0)).unwrap();
        let err = m.db.make_offer(&m.task, &m.p1, &offer(45.0)).unwrap_err();
        assert_eq!(code(err), ErrorCode::Conflict);
    }

    #[test]
    fn rejected_offer_cannot_be_resubmitted() {
        let m = market();
        let o = m.db.make_offer(&m.task, &m.p1, &offer(50.0)).unwrap();
        let rejected = m.db.reject_offer(&o.id, &m.requester).unwrap();
        assert_eq!(rejected.status, OfferStatus::Rejected);
        assert_eq!(task_status(&m), TaskStatus::Open);

        let err = m.db.make_offer(&m.task, &m.p1, &offer(40.0)).unwrap_err();
        assert_eq!(code(err), ErrorCode::Conflict);

        // Deciding it again is a state error
        let err = m.db.reject_offer(&o.id, &m.requester).unwrap_err();
        assert_eq!(code(err), ErrorCode::Validation);
    }

    #[test]
    fn only_owner_decides_offers() {
        let m = market();
        let other = add_user(&m.db, "other@example.com", Role::Requester);
        let o = m.db.make_offer(&m.task, &m.p1, &offer(50.0)).unwrap();

        let err = m.db.accept_offer(&o.id, &other).unwrap_err();
        assert_eq!(code(err), ErrorCode::Forbidden);
        let err = m.db.reject_offer(&o.id, &other).unwrap_err();
        assert_eq!(code(err), ErrorCode::Forbidden);
        let err = m.db.list_offers_for_task(&m.task, &other).unwrap_err();
        assert_eq!(code(err), ErrorCode::Forbidden);

        // Failed attempts changed nothing
        assert_eq!(task_status(&m), TaskStatus::Open);
        assert_eq!(
            m.db.get_offer(&o.id).unwrap().unwrap().status,
            OfferStatus::Pending
        );
    }

    #[test]
    fn missing_records_are_not_found() {
        let m = market();
        let err = m.db.make_offer("nope", &m.p1, &offer(50.0)).unwrap_err();
        assert_eq!(code(err), ErrorCode::NotFound);
        let err = m.db.accept_offer("nope", &m.requester).unwrap_err();
        assert_eq!(code(err), ErrorCode::NotFound);
    }

    #[test]
    fn invalid_offer_is_rejected() {
        let m = market();
        let err = m.db.make_offer(&m.task, &m.p1, &offer(0.0)).unwrap_err();
        assert_eq!(code(err), ErrorCode::Validation);
    }

    #[test]
    fn offer_rate_that_rounds_to_zero_is_rejected() {
        let m = market();
        let err = m.db.make_offer(&m.task, &m.p1, &offer(0.001)).unwrap_err();
        assert_eq!(code(err), ErrorCode::Validation);
        assert!(m.db.list_provider_offers(&m.p1).unwrap().is_empty());
    }

    #[test]
    fn provider_lists_own_offers() {
        let m = market();
        m.db.make_offer(&m.task, &m.p1, &offer(50.0)).unwrap();
        m.db.make_offer(&m.task, &m.p2, &offer(60.0)).unwrap();

        let mine = m.db.list_provider_offers(&m.p1).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].offered_rate, "50");
    }
}

mod completion_tests {
    use super::*;

    #[test]
    fn full_lifecycle_reaches_closed() {
        let m = started();

        let task = m.db.mark_task_completed(&m.task, &m.p1).unwrap();
        assert_eq!(task.status, TaskStatus::CompletedPendingReview);

        let task = m.db.reject_completion(&m.task, &m.requester).unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);

        m.db.mark_task_completed(&m.task, &m.p1).unwrap();
        let task = m.db.accept_completion(&m.task, &m.requester).unwrap();
        assert_eq!(task.status, TaskStatus::Closed);

        // Nothing leaves closed
        let err = m.db.reject_completion(&m.task, &m.requester).unwrap_err();
        assert_eq!(code(err), ErrorCode::Validation);
        let err = m.db.mark_task_completed(&m.task, &m.p1).unwrap_err();
        assert_eq!(code(err), ErrorCode::Validation);
    }

    #[test]
    fn only_accepted_provider_marks_complete() {
        let m = started();
        let err = m.db.mark_task_completed(&m.task, &m.p2).unwrap_err();
        assert_eq!(code(err), ErrorCode::Forbidden);
        assert_eq!(task_status(&m), TaskStatus::InProgress);
    }

    #[test]
    fn review_requires_pending_review() {
        let m = started();
        let err = m.db.accept_completion(&m.task, &m.requester).unwrap_err();
        let err = ApiError::from(err);
        assert_eq!(err.code, ErrorCode::Validation);
        assert_eq!(
            err.message,
            "Task is in_progress; expected completed_pending_review"
        );
    }

    #[test]
    fn only_owner_reviews() {
        let m = started();
        m.db.mark_task_completed(&m.task, &m.p1).unwrap();
        let err = m.db.accept_completion(&m.task, &m.p1).unwrap_err();
        assert_eq!(code(err), ErrorCode::Forbidden);
    }

    #[test]
    fn open_task_cannot_be_completed() {
        let m = market();
        let err = m.db.mark_task_completed(&m.task, &m.p1).unwrap_err();
        assert_eq!(code(err), ErrorCode::Forbidden);
    }

    #[test]
    fn edits_are_refused_once_started() {
        let m = started();
        let err = m
            .db
            .update_task(
                &m.task,
                &m.requester,
                &task_market::types::TaskUpdate {
                    name: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(code(err), ErrorCode::Validation);
    }
}

mod progress_tests {
    use super::*;

    #[test]
    fn progress_allowed_only_while_in_progress() {
        let m = started();

        let entry = m
            .db
            .add_task_progress(&m.task, &m.p1, "Kitchen done")
            .unwrap();
        assert_eq!(entry.provider_id, m.p1);
        assert_eq!(entry.description, "Kitchen done");

        m.db.mark_task_completed(&m.task, &m.p1).unwrap();
        m.db.accept_completion(&m.task, &m.requester).unwrap();

        let err = m
            .db
            .add_task_progress(&m.task, &m.p1, "Bathroom done")
            .unwrap_err();
        assert_eq!(code(err), ErrorCode::Validation);

        let log = m.db.list_task_progress(&m.task, &m.requester).unwrap();
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn progress_is_listed_oldest_first() {
        let m = started();
        m.db.add_task_progress(&m.task, &m.p1, "first").unwrap();
        m.db.add_task_progress(&m.task, &m.p1, "second").unwrap();

        let log = m.db.list_task_progress(&m.task, &m.p1).unwrap();
        let descriptions: Vec<_> = log.iter().map(|p| p.description.as_str()).collect();
        assert_eq!(descriptions, vec!["first", "second"]);
    }

    #[test]
    fn strangers_cannot_post_or_read_progress() {
        let m = started();
        let err = m.db.add_task_progress(&m.task, &m.p2, "sneaky").unwrap_err();
        assert_eq!(code(err), ErrorCode::Forbidden);

        let err = m.db.list_task_progress(&m.task, &m.p2).unwrap_err();
        assert_eq!(code(err), ErrorCode::Forbidden);

        let err = m.db.add_task_progress("nope", &m.p1, "x").unwrap_err();
        assert_eq!(code(err), ErrorCode::NotFound);
    }

    #[test]
    fn blank_progress_is_rejected() {
        let m = started();
        let err = m.db.add_task_progress(&m.task, &m.p1, "   ").unwrap_err();
        assert_eq!(code(err), ErrorCode::Validation);
    }
}
