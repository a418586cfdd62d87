//! Append-only task progress log.

use super::tasks::{accepted_provider, ensure_accepted_provider, require_task};
use super::{Database, new_id, now_ms, query_opt};
use crate::error::ApiError;
use crate::lifecycle;
use crate::validate;
use crate::types::ProgressRow;
use anyhow::Result;
use rusqlite::{Row, params};

pub fn parse_progress_row(row: &Row) -> rusqlite::Result<ProgressRow> {
    Ok(ProgressRow {
        id: row.get("id")?,
        task_id: row.get("task_id")?,
        provider_id: row.get("provider_id")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
    })
}

impl Database {
    /// Log a progress note on a task.
    ///
    /// Only the provider holding the accepted offer may write, and only
    /// while the task is `in_progress`.
    pub fn add_task_progress(
        &self,
        task_id: &str,
        provider_id: &str,
        description: &str,
    ) -> Result<ProgressRow> {
        let description = validate::required("description", description)?.to_string();
        let id = new_id();
        let now = now_ms();

        self.with_conn(|conn| {
            let task = require_task(conn, task_id)?;
            ensure_accepted_provider(conn, task_id, provider_id)?;
            lifecycle::ensure_task_in_progress(task.status)?;

            conn.execute(
                "INSERT INTO task_progress (id, task_id, provider_id, description, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![&id, task_id, provider_id, &description, now],
            )?;
            tracing::debug!(task_id, provider_id, "Progress logged");

            query_opt(
                conn,
                "SELECT * FROM task_progress WHERE id = ?1",
                params![&id],
                parse_progress_row,
            )?
            .ok_or_else(|| anyhow::anyhow!("progress entry {} missing after insert", id))
        })
    }

    /// Progress entries for a task, oldest first.
    ///
    /// Readable by the task owner and the provider of the accepted offer.
    pub fn list_task_progress(&self, task_id: &str, user_id: &str) -> Result<Vec<ProgressRow>> {
        self.with_conn(|conn| {
            let task = require_task(conn, task_id)?;
            let is_provider = accepted_provider(conn, task_id)?.as_deref() == Some(user_id);
            if task.user_id != user_id && !is_provider {
                return Err(ApiError::forbidden("You cannot view progress for this task").into());
            }

            let mut stmt = conn.prepare(
                "SELECT * FROM task_progress WHERE task_id = ?1 ORDER BY created_at ASC, id ASC",
            )?;
            let entries = stmt
                .query_map(params![task_id], parse_progress_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(entries)
        })
    }
}
