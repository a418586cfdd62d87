//! Partial-update statement building.
//!
//! Each entity lists its updatable fields against fixed column names, so the
//! SQL text is assembled from `&'static str` only and values always travel
//! as bound parameters.

use crate::error::ApiError;
use crate::types::{SkillUpdate, TaskUpdate, decimal_text};
use anyhow::Result;
use rusqlite::ToSql;
use rusqlite::types::ToSqlOutput;

/// Owned bind value for an update column.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
}

impl ToSql for FieldValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            FieldValue::Text(s) => s.to_sql(),
            FieldValue::Integer(i) => i.to_sql(),
        }
    }
}

/// Column assignments collected from a partial update.
#[derive(Debug, Default)]
pub struct UpdateSet {
    columns: Vec<(&'static str, FieldValue)>,
}

impl UpdateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `column = value` when the field was supplied. Text is stored trimmed.
    pub fn set_text(&mut self, column: &'static str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value {
            self.columns.push((column, FieldValue::Text(v.trim().to_string())));
        }
        self
    }

    pub fn set_decimal(&mut self, column: &'static str, value: Option<f64>) -> &mut Self {
        if let Some(v) = value {
            self.columns.push((column, FieldValue::Text(decimal_text(v))));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    #[cfg(test)]
    fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|(c, _)| *c)
    }

    /// Build `UPDATE <table> SET ..., updated_at = ? WHERE id = ?`.
    ///
    /// Fails with "No fields to update" when nothing was supplied.
    pub fn build(
        &self,
        table: &'static str,
        id: &str,
        updated_at: i64,
    ) -> Result<(String, Vec<FieldValue>)> {
        if self.is_empty() {
            return Err(ApiError::nothing_to_update().into());
        }

        let mut assignments: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("{} = ?{}", column, i + 1))
            .collect();
        let n = self.columns.len();
        assignments.push(format!("updated_at = ?{}", n + 1));

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            table,
            assignments.join(", "),
            n + 2
        );

        let mut values: Vec<FieldValue> = self.columns.iter().map(|(_, v)| v.clone()).collect();
        values.push(FieldValue::Integer(updated_at));
        values.push(FieldValue::Text(id.to_string()));

        Ok((sql, values))
    }
}

/// Field-to-column table for tasks.
pub fn task_update_set(update: &TaskUpdate) -> UpdateSet {
    let mut set = UpdateSet::new();
    set.set_text("category", update.category.as_deref())
        .set_text("name", update.name.as_deref())
        .set_text("description", update.description.as_deref())
        .set_text("start_date", update.start_date.as_deref())
        .set_decimal(
            "expected_working_hours",
            update.expected_working_hours.map(f64::from),
        )
        .set_decimal("hourly_rate", update.hourly_rate)
        .set_text("rate_currency", update.rate_currency.as_deref());
    set
}

/// Field-to-column table for skills.
pub fn skill_update_set(update: &SkillUpdate) -> UpdateSet {
    let mut set = UpdateSet::new();
    set.set_text("category", update.category.as_deref())
        .set_text("experience", update.experience.as_deref())
        .set_text(
            "nature_of_work",
            update.nature_of_work.as_ref().map(|n| n.as_str()),
        )
        .set_decimal("hourly_rate", update.hourly_rate)
        .set_text("rate_currency", update.rate_currency.as_deref());
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn builds_only_supplied_columns() {
        let update = TaskUpdate {
            name: Some("Paint fence".into()),
            hourly_rate: Some(42.5),
            ..Default::default()
        };
        let set = task_update_set(&update);
        assert_eq!(set.columns().collect::<Vec<_>>(), vec!["name", "hourly_rate"]);

        let (sql, values) = set.build("tasks", "t1", 99).unwrap();
        assert_eq!(
            sql,
            "UPDATE tasks SET name = ?1, hourly_rate = ?2, updated_at = ?3 WHERE id = ?4"
        );
        assert_eq!(
            values,
            vec![
                FieldValue::Text("Paint fence".into()),
                FieldValue::Text("42.5".into()),
                FieldValue::Integer(99),
                FieldValue::Text("t1".into()),
            ]
        );
    }

    #[test]
    fn text_values_are_trimmed() {
        let update = SkillUpdate {
            category: Some("  Carpentry ".into()),
            ..Default::default()
        };
        let (_, values) = skill_update_set(&update).build("skills", "s1", 1).unwrap();
        assert_eq!(values[0], FieldValue::Text("Carpentry".into()));
    }

    #[test]
    fn empty_update_is_a_validation_error() {
        let err = skill_update_set(&SkillUpdate::default())
            .build("skills", "s1", 0)
            .unwrap_err();
        let api: ApiError = err.into();
        assert_eq!(api.code, ErrorCode::Validation);
        assert_eq!(api.message, "No fields to update");
    }
}
