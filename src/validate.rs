//! Input validation shared by the store and the HTTP layer.
//!
//! Every function returns an [`ApiError`] with a validation code so callers
//! can propagate with `?`.

use crate::error::{ApiError, ApiResult};
use crate::types::{
    Address, NewOffer, NewSkill, NewTask, NewUser, Role, SkillUpdate, TaskUpdate, UserType,
    decimal_text,
};
use chrono::NaiveDate;

/// Trimmed, non-empty text or a "required" error.
pub fn required<'a>(field: &str, value: &'a str) -> ApiResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::missing_field(field));
    }
    Ok(trimmed)
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

pub fn email(value: &str) -> ApiResult<String> {
    let value = required("email", value)?;
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(ApiError::invalid_value("email", "not an email address"));
    }
    Ok(value.to_lowercase())
}

pub fn password(value: &str, min_len: usize) -> ApiResult<()> {
    if value.chars().count() < min_len {
        return Err(ApiError::invalid_value(
            "password",
            &format!("must be at least {} characters", min_len),
        ));
    }
    Ok(())
}

/// Three-letter uppercase currency code.
pub fn currency(value: &str) -> ApiResult<()> {
    if value.len() != 3 || !value.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(ApiError::invalid_value(
            "rateCurrency",
            "must be a three-letter uppercase code",
        ));
    }
    Ok(())
}

/// Finite and still positive once stored at two decimal places.
pub fn positive_rate(field: &str, value: f64) -> ApiResult<()> {
    if !value.is_finite() || value <= 0.0 || decimal_text(value) == "0" {
        return Err(ApiError::invalid_value(field, "must be a positive number"));
    }
    Ok(())
}

/// Calendar date in `YYYY-MM-DD` form.
pub fn date(field: &str, value: &str) -> ApiResult<()> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| ApiError::invalid_value(field, "expected YYYY-MM-DD"))
}

/// Check the signup payload and return its role and user type.
///
/// Individual users need first and last name and must not carry company
/// fields; company users need the company set and must not carry
/// individual names.
pub fn new_user(input: &NewUser, min_password_len: usize) -> ApiResult<(Role, UserType)> {
    email(&input.email)?;
    password(&input.password, min_password_len)?;
    let role = input.role.ok_or_else(|| ApiError::missing_field("role"))?;
    let user_type = input
        .user_type
        .ok_or_else(|| ApiError::missing_field("userType"))?;

    let individual = [&input.first_name, &input.last_name];
    let company = [
        &input.company_name,
        &input.business_tax_number,
        &input.representative_first_name,
        &input.representative_last_name,
    ];

    match user_type {
        UserType::Individual => {
            if !present(&input.first_name) {
                return Err(ApiError::missing_field("firstName"));
            }
            if !present(&input.last_name) {
                return Err(ApiError::missing_field("lastName"));
            }
            if company.iter().any(|f| present(f)) {
                return Err(ApiError::validation(
                    "Company fields are not allowed for individual users",
                ));
            }
        }
        UserType::Company => {
            let names = [
                "companyName",
                "businessTaxNumber",
                "representativeFirstName",
                "representativeLastName",
            ];
            for (field, value) in names.iter().zip(company.iter()) {
                if !present(value) {
                    return Err(ApiError::missing_field(field));
                }
            }
            if individual.iter().any(|f| present(f)) {
                return Err(ApiError::validation(
                    "Individual name fields are not allowed for company users",
                ));
            }
        }
    }

    Ok((role, user_type))
}

pub fn new_task(input: &NewTask) -> ApiResult<()> {
    required("category", &input.category)?;
    required("name", &input.name)?;
    required("description", &input.description)?;
    date("startDate", &input.start_date)?;
    if input.expected_working_hours == 0 {
        return Err(ApiError::invalid_value(
            "expectedWorkingHours",
            "must be a positive integer",
        ));
    }
    positive_rate("hourlyRate", input.hourly_rate)?;
    currency(&input.rate_currency)
}

pub fn task_update(input: &TaskUpdate) -> ApiResult<()> {
    for (field, value) in [
        ("category", &input.category),
        ("name", &input.name),
        ("description", &input.description),
    ] {
        if let Some(v) = value {
            required(field, v)?;
        }
    }
    if let Some(d) = &input.start_date {
        date("startDate", d)?;
    }
    if input.expected_working_hours == Some(0) {
        return Err(ApiError::invalid_value(
            "expectedWorkingHours",
            "must be a positive integer",
        ));
    }
    if let Some(rate) = input.hourly_rate {
        positive_rate("hourlyRate", rate)?;
    }
    if let Some(c) = &input.rate_currency {
        currency(c)?;
    }
    Ok(())
}

pub fn new_skill(input: &NewSkill) -> ApiResult<()> {
    required("category", &input.category)?;
    required("experience", &input.experience)?;
    positive_rate("hourlyRate", input.hourly_rate)?;
    currency(&input.rate_currency)
}

pub fn skill_update(input: &SkillUpdate) -> ApiResult<()> {
    if let Some(v) = &input.category {
        required("category", v)?;
    }
    if let Some(v) = &input.experience {
        required("experience", v)?;
    }
    if let Some(rate) = input.hourly_rate {
        positive_rate("hourlyRate", rate)?;
    }
    if let Some(c) = &input.rate_currency {
        currency(c)?;
    }
    Ok(())
}

pub fn new_offer(input: &NewOffer) -> ApiResult<()> {
    positive_rate("offeredRate", input.offered_rate)?;
    currency(&input.rate_currency)
}

/// Blank address components are stored as NULL.
pub fn normalize_address(address: Option<&Address>) -> Address {
    let clean = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    match address {
        Some(a) => Address {
            street_address: clean(&a.street_address),
            city: clean(&a.city),
            state: clean(&a.state),
            postal_code: clean(&a.postal_code),
            country: clean(&a.country),
        },
        None => Address::default(),
    }
}
