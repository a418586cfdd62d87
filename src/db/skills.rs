//! Skill catalog, scoped to the owning provider.

use super::fields::skill_update_set;
use super::{Database, new_id, now_ms, query_opt};
use crate::error::ApiError;
use crate::types::{NewSkill, SkillRow, SkillUpdate, decimal_text, parse_column};
use crate::validate;
use anyhow::Result;
use rusqlite::{Connection, Row, params};

pub fn parse_skill_row(row: &Row) -> rusqlite::Result<SkillRow> {
    Ok(SkillRow {
        id: row.get("id")?,
        provider_id: row.get("provider_id")?,
        category: row.get("category")?,
        experience: row.get("experience")?,
        nature_of_work: parse_column("nature_of_work", row.get("nature_of_work")?)?,
        hourly_rate: row.get("hourly_rate")?,
        rate_currency: row.get("rate_currency")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// A skill owned by `provider_id`; anything else reads as not found.
fn get_owned_skill(conn: &Connection, skill_id: &str, provider_id: &str) -> Result<Option<SkillRow>> {
    query_opt(
        conn,
        "SELECT * FROM skills WHERE id = ?1 AND provider_id = ?2",
        params![skill_id, provider_id],
        parse_skill_row,
    )
}

fn require_owned_skill(conn: &Connection, skill_id: &str, provider_id: &str) -> Result<SkillRow> {
    get_owned_skill(conn, skill_id, provider_id)?.ok_or_else(|| ApiError::not_found("Skill").into())
}

impl Database {
    pub fn create_skill(&self, provider_id: &str, input: &NewSkill) -> Result<SkillRow> {
        validate::new_skill(input)?;
        let id = new_id();
        let now = now_ms();

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO skills (
                    id, provider_id, category, experience, nature_of_work,
                    hourly_rate, rate_currency, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    &id,
                    provider_id,
                    input.category.trim(),
                    input.experience.trim(),
                    input.nature_of_work.as_str(),
                    decimal_text(input.hourly_rate),
                    &input.rate_currency,
                    now,
                    now,
                ],
            )?;
            require_owned_skill(conn, &id, provider_id)
        })
    }

    /// Get one of the provider's skills.
    pub fn get_skill(&self, skill_id: &str, provider_id: &str) -> Result<Option<SkillRow>> {
        self.with_conn(|conn| get_owned_skill(conn, skill_id, provider_id))
    }

    /// All of a provider's skills, newest first.
    pub fn list_skills(&self, provider_id: &str) -> Result<Vec<SkillRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM skills WHERE provider_id = ?1 ORDER BY created_at DESC, id DESC",
            )?;
            let skills = stmt
                .query_map(params![provider_id], parse_skill_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(skills)
        })
    }

    pub fn update_skill(&self, skill_id: &str, provider_id: &str, update: &SkillUpdate) -> Result<SkillRow> {
        validate::skill_update(update)?;
        let set = skill_update_set(update);

        self.with_conn(|conn| {
            require_owned_skill(conn, skill_id, provider_id)?;
            let (sql, values) = set.build("skills", skill_id, now_ms())?;
            conn.execute(&sql, rusqlite::params_from_iter(values.iter()))?;
            require_owned_skill(conn, skill_id, provider_id)
        })
    }

    /// Delete a skill. Non-owned and missing skills are both not found.
    pub fn delete_skill(&self, skill_id: &str, provider_id: &str) -> Result<()> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM skills WHERE id = ?1 AND provider_id = ?2",
                params![skill_id, provider_id],
            )?;
            if deleted == 0 {
                return Err(ApiError::not_found("Skill").into());
            }
            tracing::info!(skill_id, provider_id, "Deleted skill");
            Ok(())
        })
    }
}
