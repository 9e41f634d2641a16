use sea_orm::DbErr;
use std::fmt;

/// Failures reported by a [`crate::Collection`] backend.
#[derive(Debug)]
pub enum CollectionError {
    /// No document with this id
    NotFound { collection: String, id: Option<String> },
    /// An id that cannot be read as the collection's id type
    Cast { collection: String, value: String },
    /// A unique field already holds this value
    Duplicate { field: String },
    /// Document failed the collection's schema checks
    Validation { errors: Vec<String> },
    /// The backend cannot perform this kind of request
    Unsupported { operation: String },
    /// Field name the backend refuses to address
    InvalidField { field: String },
    /// Error from a sea-orm connection
    Database(DbErr),
    /// Anything else; details are logged, not shown
    Internal(String),
}

impl fmt::Display for CollectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { collection, id: Some(id) } => {
                write!(f, "No document with id '{id}' in {collection}")
            }
            Self::NotFound { collection, id: None } => write!(f, "No document found in {collection}"),
            Self::Cast { collection, value } => {
                write!(f, "'{value}' is not a valid id for {collection}")
            }
            Self::Duplicate { field } => write!(f, "Duplicate value for unique field '{field}'"),
            Self::Validation { errors } => write!(f, "Validation failed: {}", errors.join(", ")),
            Self::Unsupported { operation } => write!(f, "Unsupported operation: {operation}"),
            Self::InvalidField { field } => write!(f, "Invalid field name '{field}'"),
            Self::Database(err) => write!(f, "Database error: {err}"),
            Self::Internal(details) => write!(f, "Internal collection error: {details}"),
        }
    }
}

impl std::error::Error for CollectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbErr> for CollectionError {
    fn from(err: DbErr) -> Self {
        Self::Database(err)
    }
}
