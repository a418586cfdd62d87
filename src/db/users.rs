//! User persistence.

use super::{Database, new_id, now_ms, query_opt};
use crate::error::ApiError;
use crate::types::{NewUser, Role, UserRow, UserType, parse_column};
use crate::validate;
use anyhow::Result;
use rusqlite::{Row, params};

const USER_COLUMNS: &str = "id, email, password_hash, role, user_type, mobile_phone,
    first_name, last_name, company_name, business_tax_number,
    representative_first_name, representative_last_name,
    street_address, city, state, postal_code, country, created_at, updated_at";

pub fn parse_user_row(row: &Row) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get("id")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        role: parse_column("role", row.get("role")?)?,
        user_type: parse_column("user_type", row.get("user_type")?)?,
        mobile_phone: row.get("mobile_phone")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        company_name: row.get("company_name")?,
        business_tax_number: row.get("business_tax_number")?,
        representative_first_name: row.get("representative_first_name")?,
        representative_last_name: row.get("representative_last_name")?,
        street_address: row.get("street_address")?,
        city: row.get("city")?,
        state: row.get("state")?,
        postal_code: row.get("postal_code")?,
        country: row.get("country")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl Database {
    /// Create a user with an already-hashed password.
    ///
    /// Runs as one transaction: the email check, insert and read-back either
    /// all happen or none do. A taken email is a conflict.
    pub fn create_user(
        &self,
        input: &NewUser,
        role: Role,
        user_type: UserType,
        password_hash: &str,
    ) -> Result<UserRow> {
        let email = validate::email(&input.email)?;
        let address = validate::normalize_address(input.address.as_ref());
        let id = new_id();
        let now = now_ms();

        self.with_tx(|tx| {
            let taken = query_opt(
                tx,
                "SELECT 1 FROM users WHERE email = ?1 COLLATE NOCASE",
                params![&email],
                |_| Ok(()),
            )?
            .is_some();
            if taken {
                return Err(ApiError::conflict("Email is already registered").into());
            }

            tx.execute(
                "INSERT INTO users (
                    id, email, password_hash, role, user_type, mobile_phone,
                    first_name, last_name, company_name, business_tax_number,
                    representative_first_name, representative_last_name,
                    street_address, city, state, postal_code, country, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
                params![
                    &id,
                    &email,
                    password_hash,
                    role.as_str(),
                    user_type.as_str(),
                    trimmed(&input.mobile_phone),
                    trimmed(&input.first_name),
                    trimmed(&input.last_name),
                    trimmed(&input.company_name),
                    trimmed(&input.business_tax_number),
                    trimmed(&input.representative_first_name),
                    trimmed(&input.representative_last_name),
                    address.street_address,
                    address.city,
                    address.state,
                    address.postal_code,
                    address.country,
                    now,
                    now,
                ],
            )?;

            let user = query_opt(
                tx,
                &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
                params![&id],
                parse_user_row,
            )?
            .ok_or_else(|| anyhow::anyhow!("user {} missing after insert", id))?;

            tracing::info!(user_id = %user.id, role = %role, "Created user");
            Ok(user)
        })
    }

    /// Get a user by ID.
    pub fn get_user(&self, user_id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            query_opt(
                conn,
                &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
                params![user_id],
                parse_user_row,
            )
        })
    }

    /// Get a user by email, ignoring case.
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        let email = email.trim();
        self.with_conn(|conn| {
            query_opt(
                conn,
                &format!(
                    "SELECT {} FROM users WHERE email = ?1 COLLATE NOCASE",
                    USER_COLUMNS
                ),
                params![email],
                parse_user_row,
            )
        })
    }
}
