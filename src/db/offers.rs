//! Offers and the accept/reject half of the task lifecycle.

use super::tasks::{apply_task_event, ensure_task_owner, require_task};
use super::{Database, new_id, now_ms, query_opt};
use crate::error::ApiError;
use crate::lifecycle::{self, TaskEvent};
use crate::types::{NewOffer, OfferRow, OfferStatus, decimal_text, parse_column};
use crate::validate;
use anyhow::Result;
use rusqlite::{Connection, Row, params};

pub fn parse_offer_row(row: &Row) -> rusqlite::Result<OfferRow> {
    Ok(OfferRow {
        id: row.get("id")?,
        task_id: row.get("task_id")?,
        provider_id: row.get("provider_id")?,
        offered_rate: row.get("offered_rate")?,
        rate_currency: row.get("rate_currency")?,
        message: row.get("message")?,
        status: parse_column("status", row.get("status")?)?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn get_offer_internal(conn: &Connection, offer_id: &str) -> Result<Option<OfferRow>> {
    query_opt(conn, "SELECT * FROM offers WHERE id = ?1", params![offer_id], parse_offer_row)
}

fn require_offer(conn: &Connection, offer_id: &str) -> Result<OfferRow> {
    get_offer_internal(conn, offer_id)?.ok_or_else(|| ApiError::not_found("Offer").into())
}

fn offers_where(conn: &Connection, clause: &str, key: &str) -> Result<Vec<OfferRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT * FROM offers WHERE {} ORDER BY created_at DESC, id DESC",
        clause
    ))?;
    let offers = stmt
        .query_map(params![key], parse_offer_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(offers)
}

fn set_offer_status(conn: &Connection, offer_id: &str, status: OfferStatus) -> Result<()> {
    conn.execute(
        "UPDATE offers SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), now_ms(), offer_id],
    )?;
    Ok(())
}

impl Database {
    /// Place a provider's bid on an open task.
    ///
    /// A provider with a pending or accepted offer on the task is refused
    /// with a conflict. The `(task_id, provider_id)` unique constraint
    /// backs this up; its violation is reported as a conflict too.
    pub fn make_offer(&self, task_id: &str, provider_id: &str, input: &NewOffer) -> Result<OfferRow> {
        validate::new_offer(input)?;
        let id = new_id();
        let now = now_ms();
        let message = input
            .message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty());

        self.with_tx(|tx| {
            let task = require_task(tx, task_id)?;
            lifecycle::ensure_task_open(task.status)?;

            let existing = offers_where(tx, "task_id = ?1", task_id)?;
            if existing
                .iter()
                .any(|o| o.provider_id == provider_id && lifecycle::offer_is_live(o.status))
            {
                return Err(ApiError::conflict("You already have an offer on this task").into());
            }

            tx.execute(
                "INSERT INTO offers (
                    id, task_id, provider_id, offered_rate, rate_currency, message, status, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    &id,
                    task_id,
                    provider_id,
                    decimal_text(input.offered_rate),
                    &input.rate_currency,
                    message,
                    OfferStatus::Pending.as_str(),
                    now,
                    now,
                ],
            )?;
            tracing::info!(offer_id = %id, task_id, provider_id, "Offer placed");
            require_offer(tx, &id)
        })
    }

    /// Get an offer by ID.
    pub fn get_offer(&self, offer_id: &str) -> Result<Option<OfferRow>> {
        self.with_conn(|conn| get_offer_internal(conn, offer_id))
    }

    /// Accept one offer on an open task.
    ///
    /// In a single transaction: every other pending offer on the task is
    /// rejected, the chosen offer is accepted and the task moves to
    /// `in_progress`. Any failure rolls all three back.
    pub fn accept_offer(&self, offer_id: &str, owner_id: &str) -> Result<OfferRow> {
        self.with_tx(|tx| {
            let offer = require_offer(tx, offer_id)?;
            let task = require_task(tx, &offer.task_id)?;
            ensure_task_owner(&task, owner_id)?;
            lifecycle::ensure_task_open(task.status)?;
            lifecycle::ensure_offer_pending(offer.status)?;

            let now = now_ms();
            let rejected = tx.execute(
                "UPDATE offers SET status = ?1, updated_at = ?2
                 WHERE task_id = ?3 AND id != ?4 AND status = ?5",
                params![
                    OfferStatus::Rejected.as_str(),
                    now,
                    &task.id,
                    offer_id,
                    OfferStatus::Pending.as_str(),
                ],
            )?;
            set_offer_status(tx, offer_id, OfferStatus::Accepted)?;
            apply_task_event(tx, &task, TaskEvent::OfferAccepted)?;

            tracing::info!(offer_id, task_id = %task.id, rejected, "Offer accepted");
            require_offer(tx, offer_id)
        })
    }

    /// Decline a single pending offer.
    pub fn reject_offer(&self, offer_id: &str, owner_id: &str) -> Result<OfferRow> {
        self.with_tx(|tx| {
            let offer = require_offer(tx, offer_id)?;
            let task = require_task(tx, &offer.task_id)?;
            ensure_task_owner(&task, owner_id)?;
            lifecycle::ensure_offer_pending(offer.status)?;

            set_offer_status(tx, offer_id, OfferStatus::Rejected)?;
            tracing::info!(offer_id, task_id = %task.id, "Offer rejected");
            require_offer(tx, offer_id)
        })
    }

    /// All offers on a task, visible to the task owner only.
    pub fn list_offers_for_task(&self, task_id: &str, owner_id: &str) -> Result<Vec<OfferRow>> {
        self.with_conn(|conn| {
            let task = require_task(conn, task_id)?;
            ensure_task_owner(&task, owner_id)?;
            offers_where(conn, "task_id = ?1", task_id)
        })
    }

    /// A provider's own offers, newest first.
    pub fn list_provider_offers(&self, provider_id: &str) -> Result<Vec<OfferRow>> {
        self.with_conn(|conn| offers_where(conn, "provider_id = ?1", provider_id))
    }
}
