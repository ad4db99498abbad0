use crate::error::ValidationError;
use serde_json::{Map, Value};
use sqlx::FromRow;

/// A single persisted row.
///
/// The in-process names are neutral (`label`, `flag`); the names a client
/// sees are decided per resource by [`FieldNames`]. Statements alias the
/// configured columns to `label` and `flag` so this derives `FromRow`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Record {
    /// Assigned by storage on insert, never changed afterwards.
    pub id: i32,
    pub label: String,
    pub flag: bool,
}

/// The fields of a record that passed validation, ready to be written.
///
/// There is no public struct literal for this type: it comes out of
/// [`crate::validate`] or [`NewRecord::try_new`], so `label` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    label: String,
    flag: bool,
}

impl NewRecord {
    /// Builds a write payload from already-typed values, enforcing the
    /// non-empty label rule. `fields` only supplies the name for the error.
    pub fn try_new(
        label: impl Into<String>,
        flag: bool,
        fields: &FieldNames,
    ) -> Result<Self, ValidationError> {
        let label = label.into();
        if label.is_empty() {
            return Err(ValidationError::Empty {
                field: fields.label.clone(),
            });
        }
        Ok(Self { label, flag })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn flag(&self) -> bool {
        self.flag
    }

    /// Attaches a storage-assigned id.
    pub fn into_record(self, id: i32) -> Record {
        Record {
            id,
            label: self.label,
            flag: self.flag,
        }
    }
}

/// Wire names of the label and flag fields for one resource,
/// e.g. `title`/`watched` for movies or `description`/`completed` for todos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNames {
    pub label: String,
    pub flag: String,
}

impl FieldNames {
    pub fn new(label: impl Into<String>, flag: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            flag: flag.into(),
        }
    }

    /// Renders a record as the JSON object clients receive:
    /// `{ "id": .., "<label>": .., "<flag>": .. }`.
    pub fn render(&self, record: &Record) -> Value {
        let mut object = Map::with_capacity(3);
        object.insert("id".to_string(), Value::from(record.id));
        object.insert(self.label.clone(), Value::from(record.label.clone()));
        object.insert(self.flag.clone(), Value::from(record.flag));
        Value::Object(object)
    }

    pub fn render_all(&self, records: &[Record]) -> Value {
        Value::Array(records.iter().map(|r| self.render(r)).collect())
    }
}

impl Default for FieldNames {
    fn default() -> Self {
        Self::new("title", "watched")
    }
}
