//! Task CRUD and completion-review transitions.

use super::fields::task_update_set;
use super::{Database, new_id, now_ms, query_opt};
use crate::error::ApiError;
use crate::lifecycle::{self, TaskEvent};
use crate::types::{NewTask, OfferStatus, TaskRow, TaskStatus, TaskUpdate, decimal_text, parse_column};
use crate::validate;
use anyhow::Result;
use rusqlite::{Connection, Row, params};

pub fn parse_task_row(row: &Row) -> rusqlite::Result<TaskRow> {
    Ok(TaskRow {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        category: row.get("category")?,
        name: row.get("name")?,
        description: row.get("description")?,
        start_date: row.get("start_date")?,
        expected_working_hours: row.get("expected_working_hours")?,
        hourly_rate: row.get("hourly_rate")?,
        rate_currency: row.get("rate_currency")?,
        status: parse_column("status", row.get("status")?)?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// Internal helper to get a task using an existing connection (avoids deadlock).
pub(crate) fn get_task_internal(conn: &Connection, task_id: &str) -> Result<Option<TaskRow>> {
    query_opt(conn, "SELECT * FROM tasks WHERE id = ?1", params![task_id], parse_task_row)
}

/// Fetch a task or fail with not-found.
pub(crate) fn require_task(conn: &Connection, task_id: &str) -> Result<TaskRow> {
    get_task_internal(conn, task_id)?.ok_or_else(|| ApiError::not_found("Task").into())
}

/// Provider holding the task's accepted offer, if any.
pub(crate) fn accepted_provider(conn: &Connection, task_id: &str) -> Result<Option<String>> {
    query_opt(
        conn,
        "SELECT provider_id FROM offers WHERE task_id = ?1 AND status = ?2",
        params![task_id, OfferStatus::Accepted.as_str()],
        |row| row.get(0),
    )
}

/// Fail with forbidden unless `provider_id` holds the accepted offer.
pub(crate) fn ensure_accepted_provider(
    conn: &Connection,
    task_id: &str,
    provider_id: &str,
) -> Result<()> {
    match accepted_provider(conn, task_id)? {
        Some(p) if p == provider_id => Ok(()),
        _ => Err(ApiError::forbidden("Only the provider with the accepted offer may do this").into()),
    }
}

/// Fail with forbidden unless `user_id` owns the task.
pub(crate) fn ensure_task_owner(task: &TaskRow, user_id: &str) -> Result<()> {
    if task.user_id != user_id {
        return Err(ApiError::forbidden("You do not own this task").into());
    }
    Ok(())
}

/// Move a task along one lifecycle edge.
///
/// The UPDATE is conditional on the current status so a concurrent writer
/// that already moved the task makes this call fail instead of overwriting.
pub(crate) fn apply_task_event(conn: &Connection, task: &TaskRow, event: TaskEvent) -> Result<TaskStatus> {
    let next = lifecycle::transition(task.status, event)?;
    let changed = conn.execute(
        "UPDATE tasks SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
        params![next.as_str(), now_ms(), &task.id, task.status.as_str()],
    )?;
    if changed == 0 {
        return Err(ApiError::conflict("Task status changed concurrently; retry").into());
    }
    tracing::info!(task_id = %task.id, from = %task.status, to = %next, "Task status changed");
    Ok(next)
}

impl Database {
    /// Create an open task owned by `owner_id`.
    pub fn create_task(&self, owner_id: &str, input: &NewTask) -> Result<TaskRow> {
        validate::new_task(input)?;
        let id = new_id();
        let now = now_ms();

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tasks (
                    id, user_id, category, name, description, start_date,
                    expected_working_hours, hourly_rate, rate_currency, status, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    &id,
                    owner_id,
                    input.category.trim(),
                    input.name.trim(),
                    input.description.trim(),
                    &input.start_date,
                    decimal_text(f64::from(input.expected_working_hours)),
                    decimal_text(input.hourly_rate),
                    &input.rate_currency,
                    TaskStatus::Open.as_str(),
                    now,
                    now,
                ],
            )?;
            tracing::info!(task_id = %id, owner_id, "Created task");
            require_task(conn, &id)
        })
    }

    /// Get a task by ID.
    pub fn get_task(&self, task_id: &str) -> Result<Option<TaskRow>> {
        self.with_conn(|conn| get_task_internal(conn, task_id))
    }

    /// Tasks owned by a requester, newest first, optionally filtered by status.
    pub fn list_tasks_for_owner(
        &self,
        owner_id: &str,
        status: Option<TaskStatus>,
    ) -> Result<Vec<TaskRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM tasks
                 WHERE user_id = ?1 AND (?2 IS NULL OR status = ?2)
                 ORDER BY created_at DESC, id DESC",
            )?;
            let tasks = stmt
                .query_map(params![owner_id, status.map(|s| s.as_str())], parse_task_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tasks)
        })
    }

    /// Open tasks available for offers, newest first, optionally by category.
    pub fn list_open_tasks(&self, category: Option<&str>) -> Result<Vec<TaskRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM tasks
                 WHERE status = ?1 AND (?2 IS NULL OR category = ?2 COLLATE NOCASE)
                 ORDER BY created_at DESC, id DESC",
            )?;
            let tasks = stmt
                .query_map(params![TaskStatus::Open.as_str(), category], parse_task_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tasks)
        })
    }

    /// Partially update a task's details.
    ///
    /// Only the owner may edit, and only while the task is open.
    pub fn update_task(&self, task_id: &str, owner_id: &str, update: &TaskUpdate) -> Result<TaskRow> {
        validate::task_update(update)?;
        let set = task_update_set(update);

        self.with_conn(|conn| {
            let task = require_task(conn, task_id)?;
            ensure_task_owner(&task, owner_id)?;
            lifecycle::ensure_task_open(task.status)?;

            let (sql, values) = set.build("tasks", task_id, now_ms())?;
            conn.execute(&sql, rusqlite::params_from_iter(values.iter()))?;
            require_task(conn, task_id)
        })
    }

    /// Provider reports the work done; the task awaits owner review.
    pub fn mark_task_completed(&self, task_id: &str, provider_id: &str) -> Result<TaskRow> {
        self.with_tx(|tx| {
            let task = require_task(tx, task_id)?;
            ensure_accepted_provider(tx, task_id, provider_id)?;
            apply_task_event(tx, &task, TaskEvent::ProviderCompleted)?;
            require_task(tx, task_id)
        })
    }

    /// Owner signs off on the completed work and closes the task.
    pub fn accept_completion(&self, task_id: &str, owner_id: &str) -> Result<TaskRow> {
        self.review_completion(task_id, owner_id, TaskEvent::CompletionAccepted)
    }

    /// Owner sends the task back to the provider.
    pub fn reject_completion(&self, task_id: &str, owner_id: &str) -> Result<TaskRow> {
        self.review_completion(task_id, owner_id, TaskEvent::CompletionRejected)
    }

    fn review_completion(&self, task_id: &str, owner_id: &str, event: TaskEvent) -> Result<TaskRow> {
        self.with_tx(|tx| {
            let task = require_task(tx, task_id)?;
            ensure_task_owner(&task, owner_id)?;
            apply_task_event(tx, &task, event)?;
            require_task(tx, task_id)
        })
    }

    /// Provider of the accepted offer on a task, if any.
    pub fn get_accepted_provider(&self, task_id: &str) -> Result<Option<String>> {
        self.with_conn(|conn| accepted_provider(conn, task_id))
    }
}
