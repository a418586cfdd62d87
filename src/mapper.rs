//! Storage rows to API shapes.
//!
//! Every function here is pure and total: decimal text that fails to parse
//! becomes `0.0`, out-of-range timestamps fall back to the epoch, and
//! blank optional text is dropped rather than sent as an empty string.

use crate::types::{
    Address, NatureOfWork, OfferRow, OfferStatus, ProgressRow, Role, SkillRow, TaskRow, TaskStatus,
    UserRow, UserType,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub user_type: UserType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_tax_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub representative_first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub representative_last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub category: String,
    pub name: String,
    pub description: String,
    pub start_date: String,
    pub expected_working_hours: f64,
    pub hourly_rate: f64,
    pub rate_currency: String,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: String,
    pub provider_id: String,
    pub category: String,
    pub experience: String,
    pub nature_of_work: NatureOfWork,
    pub hourly_rate: f64,
    pub rate_currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: String,
    pub task_id: String,
    pub provider_id: String,
    pub offered_rate: f64,
    pub rate_currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub status: OfferStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskProgress {
    pub id: String,
    pub task_id: String,
    pub provider_id: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

fn number(text: &str) -> f64 {
    text.trim().parse().unwrap_or(0.0)
}

fn timestamp(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Flat address columns to a nested object; `None` when every part is blank.
pub fn address(
    street_address: Option<String>,
    city: Option<String>,
    state: Option<String>,
    postal_code: Option<String>,
    country: Option<String>,
) -> Option<Address> {
    let address = Address {
        street_address: non_blank(street_address),
        city: non_blank(city),
        state: non_blank(state),
        postal_code: non_blank(postal_code),
        country: non_blank(country),
    };
    (address != Address::default()).then_some(address)
}

pub fn user(row: UserRow) -> User {
    User {
        id: row.id,
        email: row.email,
        role: row.role,
        user_type: row.user_type,
        mobile_phone: non_blank(row.mobile_phone),
        first_name: non_blank(row.first_name),
        last_name: non_blank(row.last_name),
        company_name: non_blank(row.company_name),
        business_tax_number: non_blank(row.business_tax_number),
        representative_first_name: non_blank(row.representative_first_name),
        representative_last_name: non_blank(row.representative_last_name),
        address: address(row.street_address, row.city, row.state, row.postal_code, row.country),
        created_at: timestamp(row.created_at),
        updated_at: timestamp(row.updated_at),
    }
}

pub fn task(row: TaskRow) -> Task {
    Task {
        expected_working_hours: number(&row.expected_working_hours),
        hourly_rate: number(&row.hourly_rate),
        id: row.id,
        user_id: row.user_id,
        category: row.category,
        name: row.name,
        description: row.description,
        start_date: row.start_date,
        rate_currency: row.rate_currency,
        status: row.status,
        created_at: timestamp(row.created_at),
        updated_at: timestamp(row.updated_at),
    }
}

pub fn skill(row: SkillRow) -> Skill {
    Skill {
        hourly_rate: number(&row.hourly_rate),
        id: row.id,
        provider_id: row.provider_id,
        category: row.category,
        experience: row.experience,
        nature_of_work: row.nature_of_work,
        rate_currency: row.rate_currency,
        created_at: timestamp(row.created_at),
        updated_at: timestamp(row.updated_at),
    }
}

pub fn offer(row: OfferRow) -> Offer {
    Offer {
        offered_rate: number(&row.offered_rate),
        id: row.id,
        task_id: row.task_id,
        provider_id: row.provider_id,
        rate_currency: row.rate_currency,
        message: non_blank(row.message),
        status: row.status,
        created_at: timestamp(row.created_at),
        updated_at: timestamp(row.updated_at),
    }
}

pub fn progress(row: ProgressRow) -> TaskProgress {
    TaskProgress {
        id: row.id,
        task_id: row.task_id,
        provider_id: row.provider_id,
        description: row.description,
        created_at: timestamp(row.created_at),
    }
}
