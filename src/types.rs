//! Core types for the task marketplace.
//!
//! Row structs mirror the storage layout (snake_case, decimal text, epoch
//! milliseconds); the API shapes built from them live in [`crate::mapper`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declares a string-backed enum with `as_str`, `Display` and `FromStr`.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("unknown {}: {}", stringify!($name), other)),
                }
            }
        }
    };
}

string_enum! {
    /// Marketplace role, fixed at signup.
    pub enum Role {
        Requester => "requester",
        Provider => "provider",
    }
}

string_enum! {
    /// Which profile field set a user carries.
    pub enum UserType {
        Individual => "individual",
        Company => "company",
    }
}

string_enum! {
    /// Task status.
    ///
    /// `Assigned`, `Cancelled` and `Rejected` are part of the stored domain
    /// but no operation currently produces them.
    pub enum TaskStatus {
        Open => "open",
        Assigned => "assigned",
        InProgress => "in_progress",
        CompletedPendingReview => "completed_pending_review",
        Closed => "closed",
        Cancelled => "cancelled",
        Rejected => "rejected",
    }
}

string_enum! {
    /// Offer status. `Withdrawn` is never produced by any operation.
    pub enum OfferStatus {
        Pending => "pending",
        Accepted => "accepted",
        Rejected => "rejected",
        Withdrawn => "withdrawn",
    }
}

string_enum! {
    /// Where a skill is performed.
    pub enum NatureOfWork {
        Onsite => "onsite",
        Online => "online",
    }
}

/// Parse a stored enum column, surfacing bad data as a conversion error.
pub(crate) fn parse_column<T: FromStr<Err = String>>(
    column: &str,
    value: String,
) -> rusqlite::Result<T> {
    value.parse().map_err(|e: String| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            format!("{}: {}", column, e).into(),
        )
    })
}

// =============================================================================
// Storage rows
// =============================================================================

/// A `users` row.
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub user_type: UserType,
    pub mobile_phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub business_tax_number: Option<String>,
    pub representative_first_name: Option<String>,
    pub representative_last_name: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A `tasks` row.
#[derive(Debug, Clone)]
pub struct TaskRow {
    pub id: String,
    pub user_id: String,
    pub category: String,
    pub name: String,
    pub description: String,
    pub start_date: String,
    pub expected_working_hours: String,
    pub hourly_rate: String,
    pub rate_currency: String,
    pub status: TaskStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A `skills` row.
#[derive(Debug, Clone)]
pub struct SkillRow {
    pub id: String,
    pub provider_id: String,
    pub category: String,
    pub experience: String,
    pub nature_of_work: NatureOfWork,
    pub hourly_rate: String,
    pub rate_currency: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// An `offers` row.
#[derive(Debug, Clone)]
pub struct OfferRow {
    pub id: String,
    pub task_id: String,
    pub provider_id: String,
    pub offered_rate: String,
    pub rate_currency: String,
    pub message: Option<String>,
    pub status: OfferStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A `task_progress` row.
#[derive(Debug, Clone)]
pub struct ProgressRow {
    pub id: String,
    pub task_id: String,
    pub provider_id: String,
    pub description: String,
    pub created_at: i64,
}

// =============================================================================
// Request inputs
// =============================================================================

/// Postal address as sent by clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Signup payload. Missing fields deserialize empty and are rejected by validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
    pub user_type: Option<UserType>,
    pub mobile_phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub business_tax_number: Option<String>,
    pub representative_first_name: Option<String>,
    pub representative_last_name: Option<String>,
    pub address: Option<Address>,
}

/// Task creation payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub category: String,
    pub name: String,
    pub description: String,
    pub start_date: String,
    pub expected_working_hours: u32,
    pub hourly_rate: f64,
    pub rate_currency: String,
}

/// Partial task update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    pub category: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub expected_working_hours: Option<u32>,
    pub hourly_rate: Option<f64>,
    pub rate_currency: Option<String>,
}

/// Skill creation payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSkill {
    pub category: String,
    pub experience: String,
    pub nature_of_work: NatureOfWork,
    pub hourly_rate: f64,
    pub rate_currency: String,
}

/// Partial skill update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillUpdate {
    pub category: Option<String>,
    pub experience: Option<String>,
    pub nature_of_work: Option<NatureOfWork>,
    pub hourly_rate: Option<f64>,
    pub rate_currency: Option<String>,
}

/// Offer payload; the task comes from the path.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOffer {
    pub offered_rate: f64,
    pub rate_currency: String,
    pub message: Option<String>,
}

/// Format a rate or hour count for a decimal text column.
pub fn decimal_text(value: f64) -> String {
    let text = format!("{:.2}", value);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_status_round_trips_through_text() {
        for status in TaskStatus::ALL {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), *status);
        }
        assert!("done".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn enums_serialize_as_snake_case_text() {
        let json = serde_json::to_string(&TaskStatus::CompletedPendingReview).unwrap();
        assert_eq!(json, "\"completed_pending_review\"");
        let role: Role = serde_json::from_str("\"provider\"").unwrap();
        assert_eq!(role, Role::Provider);
    }

    #[test]
    fn decimal_text_trims_trailing_zeros() {
        assert_eq!(decimal_text(50.0), "50");
        assert_eq!(decimal_text(62.5), "62.5");
        assert_eq!(decimal_text(19.999), "20");
        assert_eq!(decimal_text(0.25), "0.25");
    }
}
