use crate::error::ValidationError;
use crate::record::{FieldNames, NewRecord};
use serde_json::Value;

/// Checks an inbound write payload and extracts the record fields from it.
///
/// Fields are checked in declaration order, label first, and the first
/// violation is returned. Keys other than the two record fields are ignored,
/// so a client echoing back `id` in a PUT body is accepted.
pub fn validate(payload: &Value, fields: &FieldNames) -> Result<NewRecord, ValidationError> {
    let object = payload.as_object().ok_or(ValidationError::NotAnObject)?;

    let label = match object.get(&fields.label) {
        None => {
            return Err(ValidationError::Required {
                field: fields.label.clone(),
            });
        }
        Some(Value::String(label)) => label.clone(),
        Some(_) => {
            return Err(ValidationError::NotAString {
                field: fields.label.clone(),
            });
        }
    };
    if label.is_empty() {
        return Err(ValidationError::Empty {
            field: fields.label.clone(),
        });
    }

    let flag = match object.get(&fields.flag) {
        None => {
            return Err(ValidationError::Required {
                field: fields.flag.clone(),
            });
        }
        Some(Value::Bool(flag)) => *flag,
        Some(_) => {
            return Err(ValidationError::NotABoolean {
                field: fields.flag.clone(),
            });
        }
    };

    NewRecord::try_new(label, flag, fields)
}
