use thiserror::Error;

/// A write payload that does not have the shape of a record.
///
/// The `Display` text is what clients see, so it names the offending field
/// using its wire name (e.g. `"title" is required`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("\"value\" must be of type object")]
    NotAnObject,

    #[error("\"{field}\" is required")]
    Required { field: String },

    #[error("\"{field}\" must be a string")]
    NotAString { field: String },

    #[error("\"{field}\" is not allowed to be empty")]
    Empty { field: String },

    #[error("\"{field}\" must be a boolean")]
    NotABoolean { field: String },
}

impl ValidationError {
    /// The wire name of the field that failed, if the failure is field-specific.
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::NotAnObject => None,
            ValidationError::Required { field }
            | ValidationError::NotAString { field }
            | ValidationError::Empty { field }
            | ValidationError::NotABoolean { field } => Some(field.as_str()),
        }
    }
}
